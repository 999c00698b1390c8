//! In-process stand-in for the collection endpoint.

#![allow(dead_code)]

use std::io::{Read, Write};
use std::net::{TcpListener, TcpStream};
use std::sync::mpsc::{self, Receiver};
use std::thread::JoinHandle;
use std::time::Duration;

/// How the stub answers the single request it accepts
pub enum Reply {
    /// Answer with `status` and `body`
    Respond { status: u16, body: &'static str },
    /// Read the request, then stay silent for the given time
    Hang(Duration),
}

pub struct StubEndpoint {
    pub url: String,
    requests: Receiver<String>,
    handle: Option<JoinHandle<()>>,
}

impl StubEndpoint {
    /// Accept one request and answer it with `reply`
    pub fn serve_once(reply: Reply) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let url = format!("http://{}/stats", listener.local_addr().unwrap());
        let (tx, rx) = mpsc::channel();

        let handle = std::thread::spawn(move || {
            let Ok((mut stream, _)) = listener.accept() else {
                return;
            };
            let body = read_request_body(&mut stream);
            let _ = tx.send(body);

            match reply {
                Reply::Respond { status, body } => {
                    let response = format!(
                        "HTTP/1.1 {} Stub\r\nContent-Type: text/plain; charset=utf-8\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                        status,
                        body.len(),
                        body
                    );
                    let _ = stream.write_all(response.as_bytes());
                    let _ = stream.flush();
                }
                Reply::Hang(wait) => std::thread::sleep(wait),
            }
        });

        Self {
            url,
            requests: rx,
            handle: Some(handle),
        }
    }

    /// Form body of the request the stub received, decoded into pairs
    pub fn received_form(&self) -> Vec<(String, String)> {
        let body = self
            .requests
            .recv_timeout(Duration::from_secs(5))
            .expect("stub endpoint received no request");
        let url = reqwest::Url::parse(&format!("http://stub/?{}", body)).unwrap();
        url.query_pairs()
            .map(|(k, v)| (k.into_owned(), v.into_owned()))
            .collect()
    }

    /// True if a request arrived within a short grace period
    pub fn was_called(&self) -> bool {
        self.requests.recv_timeout(Duration::from_millis(200)).is_ok()
    }
}

impl Drop for StubEndpoint {
    fn drop(&mut self) {
        // Unblock a listener that never saw a request.
        if let Some(handle) = self.handle.take() {
            if !handle.is_finished() {
                let addr = self.url.trim_start_matches("http://").trim_end_matches("/stats");
                let _ = TcpStream::connect(addr);
            }
            let _ = handle.join();
        }
    }
}

fn read_request_body(stream: &mut TcpStream) -> String {
    stream
        .set_read_timeout(Some(Duration::from_secs(5)))
        .unwrap();

    let mut buf = Vec::new();
    let mut chunk = [0u8; 4096];
    let header_end = loop {
        let n = stream.read(&mut chunk).unwrap_or(0);
        if n == 0 {
            return String::new();
        }
        buf.extend_from_slice(&chunk[..n]);
        if let Some(pos) = find(&buf, b"\r\n\r\n") {
            break pos + 4;
        }
    };

    let headers = String::from_utf8_lossy(&buf[..header_end]).to_ascii_lowercase();
    let content_length = headers
        .lines()
        .find_map(|line| line.strip_prefix("content-length:"))
        .and_then(|v| v.trim().parse::<usize>().ok())
        .unwrap_or(0);

    while buf.len() < header_end + content_length {
        let n = stream.read(&mut chunk).unwrap_or(0);
        if n == 0 {
            break;
        }
        buf.extend_from_slice(&chunk[..n]);
    }

    String::from_utf8_lossy(&buf[header_end..]).into_owned()
}

fn find(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    haystack.windows(needle.len()).position(|w| w == needle)
}
