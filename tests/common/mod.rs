//! Minimal HTTP/1.1 armory stand-in for integration tests.
//!
//! Serves fixed bodies keyed by request target (path and query). Unknown targets get 404.
//! Every request target and User-Agent seen is recorded.

#![allow(dead_code)]

use std::collections::HashMap;
use std::io::{Read, Write};
use std::net::TcpListener;
use std::sync::{Arc, Mutex};
use std::thread;

#[derive(Debug, Clone, Default)]
pub struct Seen {
    pub targets: Vec<String>,
    pub user_agents: Vec<String>,
}

pub struct ArmoryServer {
    pub base_url: String,
    seen: Arc<Mutex<Seen>>,
}

impl ArmoryServer {
    pub fn seen(&self) -> Seen {
        self.seen.lock().unwrap().clone()
    }
}

/// Starts a server in a background thread. `routes` maps e.g.
/// "/item-info.xml?i=1" to the body served for it. Runs until the process exits.
pub fn start(routes: &[(&str, &str)]) -> ArmoryServer {
    let routes: Arc<HashMap<String, Vec<u8>>> = Arc::new(
        routes
            .iter()
            .map(|(k, v)| (k.to_string(), v.as_bytes().to_vec()))
            .collect(),
    );
    let seen = Arc::new(Mutex::new(Seen::default()));
    let listener = TcpListener::bind("127.0.0.1:0").expect("bind");
    let port = listener.local_addr().unwrap().port();
    let thread_seen = Arc::clone(&seen);
    thread::spawn(move || {
        for stream in listener.incoming().flatten() {
            let routes = Arc::clone(&routes);
            let seen = Arc::clone(&thread_seen);
            thread::spawn(move || handle(stream, &routes, &seen));
        }
    });
    ArmoryServer {
        base_url: format!("http://127.0.0.1:{}/", port),
        seen,
    }
}

fn handle(mut stream: std::net::TcpStream, routes: &HashMap<String, Vec<u8>>, seen: &Mutex<Seen>) {
    let _ = stream.set_read_timeout(Some(std::time::Duration::from_secs(2)));
    let _ = stream.set_write_timeout(Some(std::time::Duration::from_secs(2)));
    let mut buf = [0u8; 8192];
    let mut n = 0;
    // Read until the end of the request headers.
    loop {
        match stream.read(&mut buf[n..]) {
            Ok(0) => break,
            Ok(m) => {
                n += m;
                if buf[..n].windows(4).any(|w| w == b"\r\n\r\n") || n == buf.len() {
                    break;
                }
            }
            Err(_) => return,
        }
    }
    let request = match std::str::from_utf8(&buf[..n]) {
        Ok(s) => s,
        Err(_) => return,
    };
    let (target, user_agent) = parse_request(request);
    {
        let mut seen = seen.lock().unwrap();
        seen.targets.push(target.to_string());
        seen.user_agents.push(user_agent.to_string());
    }
    let (status, body): (&str, &[u8]) = match routes.get(target) {
        Some(body) => ("200 OK", body.as_slice()),
        None => ("404 Not Found", b"<error/>"),
    };
    let response = format!(
        "HTTP/1.1 {}\r\nContent-Type: text/xml; charset=utf-8\r\nContent-Length: {}\r\nConnection: close\r\n\r\n",
        status,
        body.len()
    );
    let _ = stream.write_all(response.as_bytes());
    let _ = stream.write_all(body);
}

/// Returns (request target, User-Agent).
fn parse_request(request: &str) -> (&str, &str) {
    let mut target = "";
    let mut user_agent = "";
    for (i, line) in request.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() {
            break;
        }
        if i == 0 {
            target = line.split_whitespace().nth(1).unwrap_or("");
            continue;
        }
        if let Some((name, value)) = line.split_once(':') {
            if name.trim().eq_ignore_ascii_case("user-agent") {
                user_agent = value.trim();
            }
        }
    }
    (target, user_agent)
}
