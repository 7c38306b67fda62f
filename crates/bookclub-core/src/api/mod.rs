//! REST API access for the book club backend.
//!
//! `Gateway` performs single HTTP calls with bearer-token authentication
//! and uniform error handling; `BookClub` layers one typed method per
//! endpoint on top of it. The network itself sits behind `Transport`.

pub mod client;
pub mod error;
pub mod gateway;
pub mod transport;

pub use client::BookClub;
pub use error::{ApiError, MISSING_TOKEN_MESSAGE, UNREACHABLE_MESSAGE};
pub use gateway::{Gateway, GatewayConfig, RequestOptions};
pub use transport::{Body, FormField, HttpRequest, HttpResponse, HttpTransport, Transport, TransportError};

#[cfg(test)]
pub(crate) mod testing {
    use std::collections::VecDeque;
    use std::sync::{Arc, Mutex};

    use async_trait::async_trait;
    use serde_json::Value;

    use super::*;
    use crate::auth::{MemoryTokenStore, TokenStore};
    use crate::navigation::Navigator;

    /// Transport that replays queued responses and records every request.
    #[derive(Default)]
    pub struct ScriptedTransport {
        responses: Mutex<VecDeque<Result<HttpResponse, TransportError>>>,
        requests: Mutex<Vec<HttpRequest>>,
    }

    impl ScriptedTransport {
        pub fn push_json(&self, status: u16, body: Value) {
            self.push_raw(status, body.to_string().into_bytes());
        }

        pub fn push_raw(&self, status: u16, body: Vec<u8>) {
            self.responses
                .lock()
                .unwrap()
                .push_back(Ok(HttpResponse { status, body }));
        }

        pub fn push_failure(&self, error: TransportError) {
            self.responses.lock().unwrap().push_back(Err(error));
        }

        pub fn requests(&self) -> Vec<HttpRequest> {
            self.requests.lock().unwrap().clone()
        }

        pub fn request_count(&self) -> usize {
            self.requests.lock().unwrap().len()
        }

        pub fn last_request(&self) -> HttpRequest {
            self.requests
                .lock()
                .unwrap()
                .last()
                .cloned()
                .expect("no request was sent")
        }
    }

    #[async_trait]
    impl Transport for ScriptedTransport {
        async fn send(&self, request: HttpRequest) -> Result<HttpResponse, TransportError> {
            self.requests.lock().unwrap().push(request);
            self.responses
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or_else(|| Err(TransportError("no scripted response".to_string())))
        }
    }

    /// Navigator pinned to one location that records navigation requests.
    pub struct RecordingNavigator {
        current: String,
        visits: Mutex<Vec<String>>,
    }

    impl RecordingNavigator {
        pub fn new(current: &str) -> Self {
            Self {
                current: current.to_string(),
                visits: Mutex::new(Vec::new()),
            }
        }

        pub fn visits(&self) -> Vec<String> {
            self.visits.lock().unwrap().clone()
        }
    }

    impl Navigator for RecordingNavigator {
        fn current_path(&self) -> String {
            self.current.clone()
        }

        fn navigate(&self, href: &str) {
            self.visits.lock().unwrap().push(href.to_string());
        }
    }

    pub struct Harness {
        pub transport: Arc<ScriptedTransport>,
        pub tokens: Arc<MemoryTokenStore>,
        pub navigator: Arc<RecordingNavigator>,
        pub gateway: Gateway,
    }

    impl Harness {
        pub fn client(&self) -> BookClub {
            BookClub::new(self.gateway.clone())
        }
    }

    /// A gateway on the default base URL and token key, "located" at `current`.
    pub fn harness(current: &str) -> Harness {
        let transport = Arc::new(ScriptedTransport::default());
        let tokens = Arc::new(MemoryTokenStore::new());
        let navigator = Arc::new(RecordingNavigator::new(current));
        let config = GatewayConfig {
            base_url: "http://localhost:8000".to_string(),
            token_key: "auth_token".to_string(),
        };
        let gateway = Gateway::new(
            &config,
            transport.clone(),
            tokens.clone() as Arc<dyn TokenStore>,
            navigator.clone(),
        );
        Harness {
            transport,
            tokens,
            navigator,
            gateway,
        }
    }
}
