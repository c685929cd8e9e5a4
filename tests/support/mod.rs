//! In-process stand-in for poe.ninja and the wiki
//!
//! Serves canned HTTP/1.1 responses chosen by a routing closure and records
//! every request line so tests can count upstream fetches.

#![allow(dead_code)]

use std::sync::{Arc, Mutex};

use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;

/// A response the fake upstream sends back
#[derive(Debug, Clone)]
pub struct Canned {
    pub status: u16,
    pub headers: Vec<(String, String)>,
    pub body: String,
}

impl Canned {
    pub fn ok(body: impl Into<String>) -> Self {
        Self {
            status: 200,
            headers: Vec::new(),
            body: body.into(),
        }
    }

    pub fn redirect(location: &str) -> Self {
        Self {
            status: 302,
            headers: vec![("Location".to_string(), location.to_string())],
            body: String::new(),
        }
    }

    pub fn not_found() -> Self {
        Self {
            status: 404,
            headers: Vec::new(),
            body: "not found".to_string(),
        }
    }
}

fn reason(status: u16) -> &'static str {
    match status {
        200 => "OK",
        302 => "Found",
        404 => "Not Found",
        500 => "Internal Server Error",
        _ => "Unknown",
    }
}

type Router = dyn Fn(&str, &str) -> Canned + Send + Sync;

/// A running fake upstream bound to a local port
pub struct FakeUpstream {
    pub base_url: String,
    requests: Arc<Mutex<Vec<String>>>,
}

impl FakeUpstream {
    /// Starts serving; `route` gets the method and the request target
    pub async fn start<F>(route: F) -> Self
    where
        F: Fn(&str, &str) -> Canned + Send + Sync + 'static,
    {
        let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind fake upstream");
        let addr = listener.local_addr().expect("local addr");
        let requests = Arc::new(Mutex::new(Vec::new()));
        let route: Arc<Router> = Arc::new(route);

        let seen = requests.clone();
        tokio::spawn(async move {
            while let Ok((mut socket, _)) = listener.accept().await {
                let route = route.clone();
                let seen = seen.clone();
                tokio::spawn(async move {
                    let mut buf = Vec::new();
                    let mut chunk = [0u8; 1024];
                    loop {
                        match socket.read(&mut chunk).await {
                            Ok(0) | Err(_) => return,
                            Ok(n) => buf.extend_from_slice(&chunk[..n]),
                        }
                        if buf.windows(4).any(|w| w == b"\r\n\r\n") {
                            break;
                        }
                    }

                    let request = String::from_utf8_lossy(&buf).to_string();
                    let mut parts = request.lines().next().unwrap_or_default().split_whitespace();
                    let method = parts.next().unwrap_or_default().to_string();
                    let target = parts.next().unwrap_or_default().to_string();
                    seen.lock().unwrap().push(format!("{} {}", method, target));

                    let canned = route(&method, &target);
                    let mut response = format!(
                        "HTTP/1.1 {} {}\r\nContent-Length: {}\r\nConnection: close\r\n",
                        canned.status,
                        reason(canned.status),
                        canned.body.len()
                    );
                    for (name, value) in &canned.headers {
                        response.push_str(&format!("{}: {}\r\n", name, value));
                    }
                    response.push_str("\r\n");
                    if method != "HEAD" {
                        response.push_str(&canned.body);
                    }
                    let _ = socket.write_all(response.as_bytes()).await;
                    let _ = socket.shutdown().await;
                });
            }
        });

        Self {
            base_url: format!("http://{}", addr),
            requests,
        }
    }

    /// Every request line seen so far, as "METHOD target"
    pub fn requests(&self) -> Vec<String> {
        self.requests.lock().unwrap().clone()
    }

    /// Number of requests whose line contains `needle`
    pub fn count(&self, needle: &str) -> usize {
        self.requests()
            .iter()
            .filter(|line| line.contains(needle))
            .count()
    }
}

/// The poe.ninja front page with an embedded league list
pub fn ninja_front_page(leagues_json: &str) -> String {
    format!(
        "<!DOCTYPE html>\n<html><head>\n<script>window.leagues = {};</script>\n</head><body></body></html>\n",
        leagues_json
    )
}

/// An item overview body with (name, chaos, exalted, links) lines
pub fn overview(lines: &[(&str, f64, f64, u32)]) -> String {
    let lines: Vec<serde_json::Value> = lines
        .iter()
        .map(|(name, chaos, exalted, links)| {
            serde_json::json!({
                "name": name,
                "chaosValue": chaos,
                "exaltedValue": exalted,
                "links": links,
            })
        })
        .collect();
    serde_json::json!({ "lines": lines }).to_string()
}

/// A pagevalues document containing an item table with the given cells
pub fn pagevalues(cells: &[(&str, &str)]) -> String {
    let rows = cells
        .iter()
        .map(|(key, value)| format!("{}</td><td>{}", key, value))
        .collect::<Vec<_>>()
        .join("</td></tr><tr><td style=\"vertical-align: top;\">");
    format!(
        "<html><body>\n<h2>Table: items</h2>\n<table class=\"wikitable mw-page-info\"><tr><td style=\"vertical-align: top;\">{}</td></tr></table>\n</body></html>\n",
        rows
    )
}
