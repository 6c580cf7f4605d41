//! Mock storage zone for CLI command tests.
//!
//! Uploads, deletes and listings authenticate with a header, downloads with
//! the `AccessKey` query parameter, like the real zone.

#![allow(dead_code)]

use std::collections::BTreeMap;
use std::sync::{Arc, Mutex};

use cdnfs_cli::context::{Adapter, build_adapter_with};
use cdnfs_storage::Config;
use serde_json::json;
use tempfile::TempDir;
use wiremock::matchers::any;
use wiremock::{Mock, MockServer, Request, Respond, ResponseTemplate};

pub const ACCESS_KEY: &str = "test-access-key";

#[derive(Clone, Default)]
pub struct Zone {
    objects: Arc<Mutex<BTreeMap<String, Vec<u8>>>>,
}

impl Zone {
    pub fn insert(&self, path: &str, contents: &[u8]) {
        self.objects
            .lock()
            .expect("lock poisoned")
            .insert(path.to_owned(), contents.to_vec());
    }

    pub fn get(&self, path: &str) -> Option<Vec<u8>> {
        self.objects.lock().expect("lock poisoned").get(path).cloned()
    }

    fn header_key(request: &Request, name: &str) -> bool {
        request
            .headers
            .get(name)
            .and_then(|value| value.to_str().ok())
            == Some(ACCESS_KEY)
    }

    fn query_key(request: &Request) -> bool {
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
        let mut entries = Vec::new();
        let mut seen_dirs = Vec::new();
        for key in objects.keys() {
            let Some(rest) = key.strip_prefix(&prefix) else {
                continue;
            };
            match rest.split_once('/') {
                Some((name, _)) if !seen_dirs.contains(&name) => {
                    seen_dirs.push(name);
                    entries.push(json!({ "ObjectName": name, "IsDirectory": true }));
                }
                Some(_) => {}
                None => entries.push(json!({ "ObjectName": rest, "IsDirectory": false })),
            }
        }

        ResponseTemplate::new(200).set_body_json(entries)
    }
}

impl Respond for Zone {
    fn respond(&self, request: &Request) -> ResponseTemplate {
        let Some(path) = request.url.path().strip_prefix("/zone/") else {
            return ResponseTemplate::new(404);
        };

        match request.method.as_str() {
            "PUT" if Self::header_key(request, "accesskey") => {
                self.insert(path, &request.body);
                ResponseTemplate::new(201)
            }
            "DELETE" if Self::header_key(request, "AccessKey") => {
                let target = path.trim_end_matches('/');
                let prefix = format!("{target}/");
                let mut objects = self.objects.lock().expect("lock poisoned");
                let before = objects.len();
                objects.retain(|key, _| key != target && !key.starts_with(&prefix));
                ResponseTemplate::new(if objects.len() == before { 404 } else { 200 })
            }
            "GET" if path.is_empty() || path.ends_with('/') => {
                if !Self::header_key(request, "accesskey") {
                    return ResponseTemplate::new(401);
                }
                self.list(path.trim_end_matches('/'))
            }
            "GET" if Self::query_key(request) => match self.get(path) {
                Some(contents) => ResponseTemplate::new(200)
                    .set_body_raw(contents, "application/octet-stream")
                    .insert_header("Last-Modified", "Wed, 21 Oct 2015 07:28:00 GMT"),
                None => ResponseTemplate::new(404),
            },
            _ => ResponseTemplate::new(401),
        }
    }
}

/// Mock server, its zone, and an adapter whose shard files live in a
/// temporary directory.
pub struct CliTestContext {
    pub server: MockServer,
    pub zone: Zone,
    pub adapter: Adapter,
    pub cache_dir: TempDir,
}

impl CliTestContext {
    pub async fn new() -> Self {
        let server = MockServer::start().await;
        let zone = Zone::default();

        // Low priority so single-request failure mocks take precedence.
        Mock::given(any())
            .respond_with(zone.clone())
            .with_priority(10)
            .mount(&server)
            .await;

        let cache_dir = tempfile::tempdir().expect("tempdir");
        let adapter = build_adapter_with(&Self::config(&server, &cache_dir))
            .expect("adapter should build");

        Self {
            server,
            zone,
            adapter,
            cache_dir,
        }
    }

    pub fn config(server: &MockServer, cache_dir: &TempDir) -> Config {
        Config::new_for_test(format!("{}/zone/", server.uri())).with_cache_dir(cache_dir.path())
    }

    pub async fn requests(&self, method: &str) -> Vec<Request> {
        self.server
            .received_requests()
            .await
            .unwrap_or_default()
            .into_iter()
            .filter(|r| r.method.as_str() == method)
            .collect()
    }
}
