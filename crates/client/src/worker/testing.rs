//! Scripted network for worker tests.

use crate::fetch::{AssetRequest, Fetcher};
use async_trait::async_trait;
use hoard_core::{CapturedResponse, Error, ResponseKind};
use std::collections::HashMap;
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use url::Url;

pub const APP: &str = "https://app.test/";

pub fn app_url(path: &str) -> Url {
    Url::parse(APP).unwrap().join(path).unwrap()
}

/// A `Fetcher` that answers from a routing table and counts every call.
#[derive(Default)]
pub struct ScriptedFetcher {
    routes: Mutex<HashMap<String, CapturedResponse>>,
    requests: Mutex<Vec<AssetRequest>>,
    calls: AtomicUsize,
    offline: AtomicBool,
}

impl ScriptedFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Answer `url` with `status` and `body`; the response type follows the origin.
    pub fn respond(&self, url: &str, status: u16, body: &'static str) -> &Self {
        let kind = if Url::parse(url).unwrap().origin() == Url::parse(APP).unwrap().origin() {
            ResponseKind::Basic
        } else {
            ResponseKind::Cors
        };
        self.respond_with(url, CapturedResponse::new(status, "", Vec::new(), body, kind))
    }

    pub fn respond_with(&self, url: &str, response: CapturedResponse) -> &Self {
        self.routes.lock().unwrap().insert(url.to_string(), response);
        self
    }

    /// Make `url` fail at the transport level.
    pub fn unroute(&self, url: &str) -> &Self {
        self.routes.lock().unwrap().remove(url);
        self
    }

    /// Fail every request until switched back.
    pub fn set_offline(&self, offline: bool) {
        self.offline.store(offline, Ordering::SeqCst);
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn requests(&self) -> Vec<AssetRequest> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl Fetcher for ScriptedFetcher {
    async fn fetch(&self, request: &AssetRequest) -> Result<CapturedResponse, Error> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.requests.lock().unwrap().push(request.clone());

        if self.offline.load(Ordering::SeqCst) {
            return Err(Error::FetchFailed(format!("{}: offline", request.url)));
        }

        self.routes
            .lock()
            .unwrap()
            .get(request.key())
            .cloned()
            .ok_or_else(|| Error::FetchFailed(format!("{}: connection refused", request.url)))
    }
}
