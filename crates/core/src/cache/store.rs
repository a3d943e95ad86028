//! Named cache generations and their entries.
//!
//! A `CacheStore` is a handle to one generation (one row in `cache_stores`).
//! Entries are keyed by the canonical request URL. Each operation is a single
//! statement on the connection thread, so concurrent `put`/`match_request`
//! calls never observe a half-written entry; racing puts for the same key
//! resolve to the last writer.

use super::connection::CacheDb;
use super::hash::body_digest;
use crate::{CapturedResponse, Error, ResponseKind};
use bytes::Bytes;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use tokio_rusqlite::params;
use tokio_rusqlite::rusqlite;

/// Per-store listing used by diagnostics.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct StoreSummary {
    pub name: String,
    pub entries: u64,
    pub created_at: String,
}

/// Handle to one named cache generation.
#[derive(Clone, Debug)]
pub struct CacheStore {
    db: CacheDb,
    name: String,
}

/// Raw column values of an entry row, decoded outside the connection thread.
struct EntryRow {
    status: i64,
    status_text: String,
    response_type: String,
    headers_json: String,
    body: Vec<u8>,
    body_sha256: String,
}

impl CacheDb {
    /// Open the store called `name`, creating it if it does not exist.
    pub async fn open_store(&self, name: &str) -> Result<CacheStore, Error> {
        let store_name = name.to_string();
        let created_at = chrono::Utc::now().to_rfc3339();
        self.conn
            .call(move |conn| -> Result<(), Error> {
                conn.execute(
                    "INSERT OR IGNORE INTO cache_stores (name, created_at) VALUES (?1, ?2)",
                    params![store_name, created_at],
                )?;
                Ok(())
            })
            .await
            .map_err(Error::from)?;

        Ok(CacheStore { db: self.clone(), name: name.to_string() })
    }

    /// Names of every persisted store, oldest first.
    pub async fn list_store_tags(&self) -> Result<Vec<String>, Error> {
        self.conn
            .call(|conn| -> Result<Vec<String>, Error> {
                let mut stmt = conn.prepare("SELECT name FROM cache_stores ORDER BY rowid")?;
                let names = stmt
                    .query_map([], |row| row.get(0))?
                    .collect::<Result<Vec<String>, _>>()?;
                Ok(names)
            })
            .await
            .map_err(Error::from)
    }

    /// Delete a store and all of its entries.
    ///
    /// Returns false if no store had that name.
    pub async fn delete_store(&self, name: &str) -> Result<bool, Error> {
        let name = name.to_string();
        self.conn
            .call(move |conn| -> Result<bool, Error> {
                let deleted = conn.execute("DELETE FROM cache_stores WHERE name = ?1", params![name])?;
                Ok(deleted > 0)
            })
            .await
            .map_err(Error::from)
    }

    /// Name, entry count and creation time of every store, oldest first.
    pub async fn store_summaries(&self) -> Result<Vec<StoreSummary>, Error> {
        self.conn
            .call(|conn| -> Result<Vec<StoreSummary>, Error> {
                let mut stmt = conn.prepare(
                    "SELECT s.name, s.created_at, COUNT(e.request_id)
                     FROM cache_stores s
                     LEFT JOIN cache_entries e ON e.store = s.name
                     GROUP BY s.name
                     ORDER BY s.rowid",
                )?;
                let summaries = stmt
                    .query_map([], |row| {
                        Ok(StoreSummary {
                            name: row.get(0)?,
                            entries: row.get::<_, i64>(2)? as u64,
                            created_at: row.get(1)?,
                        })
                    })?
                    .collect::<Result<Vec<_>, _>>()?;
                Ok(summaries)
            })
            .await
            .map_err(Error::from)
    }
}

impl CacheStore {
    /// The generation name this handle writes to.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Store a response under `request_id`, replacing any previous entry.
    ///
    /// Takes the response by value: a caller that also needs to hand the
    /// response on must clone it first.
    pub async fn put(&self, request_id: &str, response: CapturedResponse) -> Result<(), Error> {
        let store = self.name.clone();
        let request_id = request_id.to_string();
        let headers_json = serde_json::to_string(&response.headers)
            .map_err(|e| Error::InvalidInput(format!("failed to encode headers: {e}")))?;
        let digest = body_digest(&response.body);
        let stored_at = chrono::Utc::now().to_rfc3339();

        self.db
            .conn
            .call(move |conn| -> Result<(), Error> {
                conn.execute(
                    "INSERT INTO cache_entries (
                        store, request_id, status, status_text, response_type,
                        headers_json, body, body_sha256, stored_at
                    ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
                    ON CONFLICT(store, request_id) DO UPDATE SET
                        status = excluded.status,
                        status_text = excluded.status_text,
                        response_type = excluded.response_type,
                        headers_json = excluded.headers_json,
                        body = excluded.body,
                        body_sha256 = excluded.body_sha256,
                        stored_at = excluded.stored_at",
                    params![
                        store,
                        request_id,
                        response.status as i64,
                        response.status_text,
                        response.kind.as_str(),
                        headers_json,
                        &response.body[..],
                        digest,
                        stored_at,
                    ],
                )?;
                Ok(())
            })
            .await
            .map_err(Error::from)
    }

    /// Look up the response stored under `request_id`.
    ///
    /// # Errors
    ///
    /// Returns `Error::CacheCorrupt` if the stored body no longer matches its
    /// digest or the row cannot be decoded.
    pub async fn match_request(&self, request_id: &str) -> Result<Option<CapturedResponse>, Error> {
        let store = self.name.clone();
        let key = request_id.to_string();
        let row = self
            .db
            .conn
            .call(move |conn| -> Result<Option<EntryRow>, Error> {
                let mut stmt = conn.prepare(
                    "SELECT status, status_text, response_type, headers_json, body, body_sha256
                     FROM cache_entries WHERE store = ?1 AND request_id = ?2",
                )?;

                let result = stmt.query_row(params![store, key], |row| {
                    Ok(EntryRow {
                        status: row.get(0)?,
                        status_text: row.get(1)?,
                        response_type: row.get(2)?,
                        headers_json: row.get(3)?,
                        body: row.get(4)?,
                        body_sha256: row.get(5)?,
                    })
                });

                match result {
                    Ok(row) => Ok(Some(row)),
                    Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
                    Err(e) => Err(e.into()),
                }
            })
            .await
            .map_err(Error::from)?;

        row.map(|row| decode_entry(request_id, row)).transpose()
    }

    /// Request identifiers stored in this generation, in key order.
    pub async fn keys(&self) -> Result<Vec<String>, Error> {
        let store = self.name.clone();
        self.db
            .conn
            .call(move |conn| -> Result<Vec<String>, Error> {
                let mut stmt =
                    conn.prepare("SELECT request_id FROM cache_entries WHERE store = ?1 ORDER BY request_id")?;
                let keys = stmt
                    .query_map(params![store], |row| row.get(0))?
                    .collect::<Result<Vec<String>, _>>()?;
                Ok(keys)
            })
            .await
            .map_err(Error::from)
    }
}

fn decode_entry(request_id: &str, row: EntryRow) -> Result<CapturedResponse, Error> {
    if body_digest(&row.body) != row.body_sha256 {
        return Err(Error::CacheCorrupt(format!("body digest mismatch for {request_id}")));
    }

    let status = u16::try_from(row.status)
        .map_err(|_| Error::CacheCorrupt(format!("invalid status {} for {request_id}", row.status)))?;

    let kind = ResponseKind::parse(&row.response_type)
        .ok_or_else(|| Error::CacheCorrupt(format!("unknown response type {} for {request_id}", row.response_type)))?;

    let headers: Vec<(String, String)> = serde_json::from_str(&row.headers_json)
        .map_err(|e| Error::CacheCorrupt(format!("invalid headers for {request_id}: {e}")))?;

    Ok(CapturedResponse { status, status_text: row.status_text, headers, body: Bytes::from(row.body), kind })
}
