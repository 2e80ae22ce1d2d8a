//! In-process mock backend for pipeline tests.
//!
//! Speaks just enough HTTP/1.1 for reqwest: one request per
//! connection, `Connection: close` on every response. Shared with the
//! end-to-end suite through the `test-util` feature.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use tokio::io::AsyncWriteExt;
use tokio::net::TcpListener;

pub use droplift_api_client::test_util::{body_of, read_request};

/// Knobs for failure-path tests.
#[derive(Debug, Clone, Default)]
pub struct Behavior {
    /// Phase 1 answers `{"success":false,...}`.
    pub reject_phase1: bool,
    /// Phase 1 answers HTTP 401.
    pub auth_expired: bool,
    /// Status for the raw PUT (0 means 200).
    pub put_status: u16,
    /// Phase 2 answers `{"success":false,...}`.
    pub reject_phase2: bool,
    /// Artificial delay while holding a PUT open.
    pub put_delay: Duration,
}

/// Mock file-hosting backend covering all three pipeline calls.
pub struct MockBackend {
    pub url: String,
    requests: Arc<Mutex<Vec<String>>>,
    max_active_puts: Arc<AtomicUsize>,
    handle: tokio::task::JoinHandle<()>,
}

impl MockBackend {
    pub async fn spawn(behavior: Behavior) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();
        let url = format!("http://127.0.0.1:{port}");

        let requests: Arc<Mutex<Vec<String>>> = Arc::new(Mutex::new(Vec::new()));
        let active_puts = Arc::new(AtomicUsize::new(0));
        let max_active_puts = Arc::new(AtomicUsize::new(0));
        let key_counter = Arc::new(AtomicUsize::new(0));

        let reqs = Arc::clone(&requests);
        let active = Arc::clone(&active_puts);
        let max_active = Arc::clone(&max_active_puts);
        let base = url.clone();

        let handle = tokio::spawn(async move {
            loop {
                let Ok((mut stream, _)) = listener.accept().await else {
                    break;
                };
                let behavior = behavior.clone();
                let reqs = Arc::clone(&reqs);
                let active = Arc::clone(&active);
                let max_active = Arc::clone(&max_active);
                let key_counter = Arc::clone(&key_counter);
                let base = base.clone();

                tokio::spawn(async move {
                    let raw = read_request(&mut stream).await;
                    let line = raw.lines().next().unwrap_or_default().to_string();
                    reqs.lock().unwrap().push(raw);

                    let (status, body) = if line.starts_with("POST /files/presigned-url") {
                        if behavior.auth_expired {
                            (401, r#"{"success":false,"error":"unauthorized"}"#.to_string())
                        } else if behavior.reject_phase1 {
                            (
                                200,
                                r#"{"success":false,"error":"storage quota exceeded"}"#.to_string(),
                            )
                        } else {
                            let key = key_counter.fetch_add(1, Ordering::SeqCst);
                            (
                                200,
                                format!(
                                    r#"{{"success":true,"data":{{"presignedUrl":"{base}/put/k-{key}","fileKey":"k-{key}"}}}}"#
                                ),
                            )
                        }
                    } else if line.starts_with("PUT /put/") {
                        let now = active.fetch_add(1, Ordering::SeqCst) + 1;
                        max_active.fetch_max(now, Ordering::SeqCst);
                        if !behavior.put_delay.is_zero() {
                            tokio::time::sleep(behavior.put_delay).await;
                        }
                        active.fetch_sub(1, Ordering::SeqCst);

                        let status = if behavior.put_status == 0 {
                            200
                        } else {
                            behavior.put_status
                        };
                        (status, "ok".to_string())
                    } else if line.starts_with("POST /files/complete-upload/") {
                        if behavior.reject_phase2 {
                            (
                                200,
                                r#"{"success":false,"error":"finalize refused"}"#.to_string(),
                            )
                        } else {
                            (
                                200,
                                r#"{"success":true,"data":{"remoteId":"f_1","url":"https://cdn.example/f_1","finalSizeBytes":0,"mimeType":"application/octet-stream"}}"#
                                    .to_string(),
                            )
                        }
                    } else {
                        (404, "not found".to_string())
                    };

                    let resp = format!(
                        "HTTP/1.1 {status} X\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                        body.len(),
                        body
                    );
                    let _ = stream.write_all(resp.as_bytes()).await;
                    let _ = stream.shutdown().await;
                });
            }
        });

        Self {
            url,
            requests,
            max_active_puts,
            handle,
        }
    }

    /// Raw captured requests, in arrival order.
    pub fn requests(&self) -> Vec<String> {
        self.requests.lock().unwrap().clone()
    }

    /// Request lines in arrival order.
    pub fn request_lines(&self) -> Vec<String> {
        self.requests()
            .iter()
            .map(|r| r.lines().next().unwrap_or_default().to_string())
            .collect()
    }

    /// First raw request whose request line starts with `prefix`.
    pub fn find(&self, prefix: &str) -> Option<String> {
        self.requests()
            .into_iter()
            .find(|r| r.lines().next().unwrap_or_default().starts_with(prefix))
    }

    pub fn count_matching(&self, prefix: &str) -> usize {
        self.request_lines()
            .iter()
            .filter(|l| l.starts_with(prefix))
            .count()
    }

    /// Highest number of PUTs held open at once.
    pub fn max_active_puts(&self) -> usize {
        self.max_active_puts.load(Ordering::SeqCst)
    }
}

impl Drop for MockBackend {
    fn drop(&mut self) {
        self.handle.abort();
    }
}
