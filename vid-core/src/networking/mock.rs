use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use serde_json::Value;

use super::{HttpClient, HttpResponse};

#[derive(Debug, Clone)]
pub(crate) struct RecordedRequest {
    pub method: &'static str,
    pub url: String,
    pub body: Vec<u8>,
    pub headers: Vec<(String, String)>,
}

impl RecordedRequest {
    pub fn has_header(&self, name: &str, value: &str) -> bool {
        self.headers
            .iter()
            .any(|(n, v)| n.eq_ignore_ascii_case(name) && v == value)
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(n, _)| n.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    pub fn body_text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }

    pub fn body_json(&self) -> Value {
        serde_json::from_slice(&self.body).unwrap()
    }

    /// Decoded `application/x-www-form-urlencoded` body.
    pub fn form(&self) -> HashMap<String, String> {
        url::form_urlencoded::parse(&self.body)
            .into_owned()
            .collect()
    }
}

/// Canned responses keyed by URL, each served once in order.
#[derive(Clone, Default)]
pub(crate) struct MockHttpClient {
    routes: Arc<Mutex<HashMap<String, VecDeque<HttpResponse>>>>,
    requests: Arc<Mutex<Vec<RecordedRequest>>>,
}

fn route_key(url: &str) -> String {
    url.trim_end_matches('/').to_string()
}

impl MockHttpClient {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn respond(&self, url: &str, status: u16, body: impl Into<Vec<u8>>) {
        self.routes
            .lock()
            .unwrap()
            .entry(route_key(url))
            .or_default()
            .push_back(HttpResponse::new(status, body));
    }

    pub fn respond_json(&self, url: &str, body: Value) {
        self.respond(url, 200, body.to_string());
    }

    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.requests.lock().unwrap().clone()
    }

    pub fn requests_to(&self, url: &str) -> Vec<RecordedRequest> {
        let key = route_key(url);
        self.requests()
            .into_iter()
            .filter(|request| route_key(&request.url) == key)
            .collect()
    }

    fn next(&self, method: &'static str, url: &str, body: Vec<u8>, headers: &[(String, String)]) -> Result<HttpResponse> {
        self.requests.lock().unwrap().push(RecordedRequest {
            method,
            url: url.to_string(),
            body,
            headers: headers.to_vec(),
        });

        self.routes
            .lock()
            .unwrap()
            .get_mut(&route_key(url))
            .and_then(|queue| queue.pop_front())
            .ok_or_else(|| anyhow!("connection refused: {}", url))
    }
}

#[async_trait]
impl HttpClient for MockHttpClient {
    async fn get(&self, url: &str, headers: &[(String, String)]) -> Result<HttpResponse> {
        self.next("GET", url, Vec::new(), headers)
    }

    async fn post(
        &self,
        url: &str,
        body: Vec<u8>,
        headers: &[(String, String)],
    ) -> Result<HttpResponse> {
        self.next("POST", url, body, headers)
    }
}
