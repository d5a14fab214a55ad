#![allow(dead_code)]

use std::io::Read;
use std::sync::{Arc, Mutex};
use std::thread;
use tiny_http::{Header, Response, Server};
use url::Url;

#[derive(Debug, Clone)]
pub struct Captured {
    pub method: String,
    pub url: String,
    pub headers: Vec<(String, String)>,
    pub body: String,
}

impl Captured {
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    pub fn path(&self) -> &str {
        self.url.split('?').next().unwrap_or(&self.url)
    }

    pub fn query_pairs(&self) -> Vec<(String, String)> {
        Url::parse(&format!("http://x{}", self.url))
            .unwrap()
            .query_pairs()
            .map(|(k, v)| (k.into_owned(), v.into_owned()))
            .collect()
    }

    pub fn json(&self) -> serde_json::Value {
        serde_json::from_str(&self.body).unwrap()
    }
}

/// A throw-away HTTP server on a random local port answering with `respond`.
pub struct FakeServer {
    pub base: Url,
    pub captured: Arc<Mutex<Vec<Captured>>>,
}

impl FakeServer {
    pub fn start<F>(respond: F) -> Self
    where
        F: Fn(&Captured) -> (u16, String) + Send + 'static,
    {
        let server = Server::http("127.0.0.1:0").unwrap();
        let base = Url::parse(&format!("http://{}", server.server_addr())).unwrap();
        let captured = Arc::new(Mutex::new(Vec::new()));
        let log = captured.clone();

        thread::spawn(move || {
            for mut request in server.incoming_requests() {
                let mut body = String::new();
                let _ = request.as_reader().read_to_string(&mut body);
                let seen = Captured {
                    method: request.method().to_string(),
                    url: request.url().to_string(),
                    headers: request
                        .headers()
                        .iter()
                        .map(|h| (h.field.to_string(), h.value.to_string()))
                        .collect(),
                    body,
                };
                let (status, payload) = respond(&seen);
                log.lock().unwrap().push(seen);
                let content_type =
                    Header::from_bytes(&b"Content-Type"[..], &b"application/json"[..]).unwrap();
                let _ = request.respond(
                    Response::from_string(payload)
                        .with_status_code(status)
                        .with_header(content_type),
                );
            }
        });

        Self { base, captured }
    }

    pub fn requests(&self) -> Vec<Captured> {
        self.captured.lock().unwrap().clone()
    }

    pub fn url(&self, path: &str) -> Url {
        self.base.join(path).unwrap()
    }
}
