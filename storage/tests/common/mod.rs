//! Shared fixtures for storage integration tests.
//!
//! [`FakeZone`] is a stateful stand-in for the storage-zone HTTP API mounted
//! on a wiremock server. It enforces the same authentication placement as the
//! real API: a header on upload, delete and listing, a query parameter on
//! download.

#![allow(dead_code)]

use std::collections::BTreeMap;
use std::sync::{Arc, Mutex};

use cdnfs_storage::{CachingStorageAdapter, Config, MemoryShardStore, ShardStore};
use serde_json::json;
use wiremock::matchers::any;
use wiremock::{Mock, MockServer, Request, Respond, ResponseTemplate};

pub const ZONE_PREFIX: &str = "/zone/";
pub const ACCESS_KEY: &str = "test-access-key";
pub const LAST_MODIFIED: &str = "Wed, 21 Oct 2015 07:28:00 GMT";
pub const LAST_MODIFIED_SECS: i64 = 1_445_412_480;

/// Objects keyed by their path inside the zone, without a leading slash.
#[derive(Clone, Default)]
pub struct FakeZone {
    objects: Arc<Mutex<BTreeMap<String, Vec<u8>>>>,
}

impl FakeZone {
    pub fn insert(&self, path: &str, contents: &[u8]) {
        self.objects
            .lock()
            .expect("lock poisoned")
            .insert(path.trim_start_matches('/').to_owned(), contents.to_vec());
    }

    /// Drop an object behind the adapter's back.
    pub fn remove(&self, path: &str) {
        self.objects
            .lock()
            .expect("lock poisoned")
            .remove(path.trim_start_matches('/'));
    }

    pub fn get(&self, path: &str) -> Option<Vec<u8>> {
        self.objects
            .lock()
            .expect("lock poisoned")
            .get(path.trim_start_matches('/'))
            .cloned()
    }

    fn has_header_key(request: &Request, name: &str) -> bool {
        request
            .headers
            .get(name)
            .and_then(|value| value.to_str().ok())
            == Some(ACCESS_KEY)
    }

    fn has_query_key(request: &Request) -> bool {
        request
            .url
            .query_pairs()
            .any(|(name, value)| name == "AccessKey" && value == ACCESS_KEY)
    }

    fn list(&self, dir: &str) -> ResponseTemplate {
        let prefix = if dir.is_empty() {
            String::new()
        } else {
            format!("{dir}/")
        };

        let objects = self.objects.lock().expect("lock poisoned");
        let mut files = Vec::new();
        let mut dirs = Vec::new();
        for key in objects.keys() {
            let Some(rest) = key.strip_prefix(&prefix) else {
                continue;
            };
            match rest.split_once('/') {
                Some((name, _)) if !dirs.contains(&name) => dirs.push(name),
                Some(_) => {}
                None => files.push(rest),
            }
        }

        // Files first, then directories; each entry carries fields the
        // adapter does not read.
        let entries: Vec<_> = files
            .iter()
            .map(|name| (name, false))
            .chain(dirs.iter().map(|name| (name, true)))
            .map(|(name, is_directory)| {
                json!({
                    "Guid": "00000000-0000-0000-0000-000000000000",
                    "StorageZoneName": "zone",
                    "Path": format!("{ZONE_PREFIX}{prefix}"),
                    "ObjectName": name,
                    "Length": 0,
                    "IsDirectory": is_directory,
                    "LastChanged": "2015-10-21T07:28:00.000",
                })
            })
            .collect();

        ResponseTemplate::new(200).set_body_json(entries)
    }
}

impl Respond for FakeZone {
    fn respond(&self, request: &Request) -> ResponseTemplate {
        let Some(path) = request.url.path().strip_prefix(ZONE_PREFIX) else {
            return ResponseTemplate::new(404);
        };

        match request.method.as_str() {
            "PUT" => {
                if !Self::has_header_key(request, "accesskey") {
                    return ResponseTemplate::new(401);
                }
                self.insert(path, &request.body);
                ResponseTemplate::new(201)
            }
            "DELETE" => {
                if !Self::has_header_key(request, "AccessKey") {
                    return ResponseTemplate::new(401);
                }
                let target = path.trim_end_matches('/');
                let prefix = format!("{target}/");
                let mut objects = self.objects.lock().expect("lock poisoned");
                let before = objects.len();
                objects.retain(|key, _| key != target && !key.starts_with(&prefix));
                if objects.len() == before {
                    ResponseTemplate::new(404)
                } else {
                    ResponseTemplate::new(200)
                }
            }
            "GET" if path.is_empty() || path.ends_with('/') => {
                if !Self::has_header_key(request, "accesskey") {
                    return ResponseTemplate::new(401);
                }
                self.list(path.trim_end_matches('/'))
            }
            "GET" => {
                if !Self::has_query_key(request) {
                    return ResponseTemplate::new(401);
                }
                match self.get(path) {
                    Some(contents) => {
                        let mime = mime_guess::from_path(path).first_or_octet_stream();
                        ResponseTemplate::new(200)
                            .set_body_raw(contents, mime.essence_str())
                            .insert_header("Last-Modified", LAST_MODIFIED)
                    }
                    None => ResponseTemplate::new(404),
                }
            }
            _ => ResponseTemplate::new(405),
        }
    }
}

/// Mock server with a [`FakeZone`] mounted under [`ZONE_PREFIX`].
///
/// The zone is mounted at a low priority so tests can override single
/// requests with failure mocks.
pub async fn start_zone() -> (MockServer, FakeZone) {
    let server = MockServer::start().await;
    let zone = FakeZone::default();

    Mock::given(any())
        .respond_with(zone.clone())
        .with_priority(10)
        .mount(&server)
        .await;

    (server, zone)
}

pub fn config_for(server: &MockServer) -> Config {
    Config::new_for_test(format!("{}{ZONE_PREFIX}", server.uri()))
}

pub fn adapter_with<S: ShardStore>(server: &MockServer, store: S) -> CachingStorageAdapter<S> {
    CachingStorageAdapter::from_config(&config_for(server), store)
        .expect("client should build")
}

pub fn adapter_for(server: &MockServer) -> CachingStorageAdapter<MemoryShardStore> {
    adapter_with(server, MemoryShardStore::new())
}

/// Download requests (`GET` with the key in the query) received for `path`.
///
/// Existence probes and metadata lookups are download requests whose body is
/// never read, so this counts them too.
pub async fn downloads_of(server: &MockServer, path: &str) -> usize {
    let expected = format!("{ZONE_PREFIX}{}", path.trim_start_matches('/'));
    server
        .received_requests()
        .await
        .unwrap_or_default()
        .iter()
        .filter(|r| r.method.as_str() == "GET" && r.url.path() == expected)
        .filter(|r| r.url.query().is_some())
        .count()
}

pub async fn requests_with_method(server: &MockServer, method: &str) -> usize {
    server
        .received_requests()
        .await
        .unwrap_or_default()
        .iter()
        .filter(|r| r.method.as_str() == method)
        .count()
}
