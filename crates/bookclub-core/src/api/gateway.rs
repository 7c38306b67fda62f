//! The request gateway: one HTTP call with consistent authentication,
//! content typing and error semantics for every caller.

use std::sync::Arc;

use reqwest::header::{HeaderMap, HeaderName, HeaderValue, AUTHORIZATION, CONTENT_TYPE};
use reqwest::{Method, Url};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, warn};

use crate::auth::{TokenSlot, TokenStore};
use crate::navigation::{Navigator, Page, Route, REDIRECT_PARAM};

use super::transport::{Body, HttpRequest, Transport};
use super::ApiError;

/// Connection settings injected into the gateway
#[derive(Debug, Clone, PartialEq)]
pub struct GatewayConfig {
    pub base_url: String,
    pub token_key: String,
}

/// Per-call options: method, body, headers and query parameters.
#[derive(Debug, Clone, Default)]
pub struct RequestOptions {
    pub method: Method,
    pub body: Option<Body>,
    pub headers: HeaderMap,
    pub query: Vec<(String, String)>,
}

impl RequestOptions {
    pub fn get() -> Self {
        Self::default()
    }

    pub fn method(method: Method) -> Self {
        Self {
            method,
            ..Self::default()
        }
    }

    pub fn json<T: Serialize>(mut self, value: &T) -> Result<Self, ApiError> {
        let body = Body::json(value).map_err(|e| ApiError::InvalidRequest(e.to_string()))?;
        self.body = Some(body);
        Ok(self)
    }

    pub fn body(mut self, body: Body) -> Self {
        self.body = Some(body);
        self
    }

    pub fn header(mut self, name: HeaderName, value: HeaderValue) -> Self {
        self.headers.insert(name, value);
        self
    }

    pub fn query(mut self, key: &str, value: impl ToString) -> Self {
        self.query.push((key.to_string(), value.to_string()));
        self
    }
}

/// Cloning shares the transport, token storage and navigator.
#[derive(Clone)]
pub struct Gateway {
    transport: Arc<dyn Transport>,
    token: TokenSlot,
    navigator: Arc<dyn Navigator>,
    base_url: String,
}

impl Gateway {
    pub fn new(
        config: &GatewayConfig,
        transport: Arc<dyn Transport>,
        store: Arc<dyn TokenStore>,
        navigator: Arc<dyn Navigator>,
    ) -> Self {
        Self {
            transport,
            token: TokenSlot::new(store, config.token_key.clone()),
            navigator,
            base_url: config.base_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn token(&self) -> &TokenSlot {
        &self.token
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Build the absolute URL for a relative path; a missing leading slash
    /// is added.
    pub fn url_for(&self, path: &str, query: &[(String, String)]) -> Result<Url, ApiError> {
        let path = if path.starts_with('/') {
            path.to_string()
        } else {
            format!("/{}", path)
        };
        let mut url = Url::parse(&format!("{}{}", self.base_url, path))
            .map_err(|e| ApiError::InvalidRequest(format!("{}{}: {}", self.base_url, path, e)))?;
        if !query.is_empty() {
            let mut pairs = url.query_pairs_mut();
            for (key, value) in query {
                pairs.append_pair(key, value);
            }
        }
        Ok(url)
    }

    /// Perform one call and return the parsed JSON payload.
    ///
    /// `Ok(None)` means the response had no usable body: a 204, an empty
    /// body, or a body that is not JSON.
    pub async fn send(&self, path: &str, options: RequestOptions) -> Result<Option<Value>, ApiError> {
        let url = self.url_for(path, &options.query)?;
        let mut headers = options.headers;

        if let Some(token) = self.token.load() {
            let value = HeaderValue::from_str(&format!("Bearer {}", token))
                .map_err(|e| ApiError::InvalidRequest(format!("token is not a valid header value: {}", e)))?;
            headers.insert(AUTHORIZATION, value);
        }

        if let Some(ref body) = options.body {
            if !body.is_multipart() && !headers.contains_key(CONTENT_TYPE) {
                headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
            }
        }

        let method = options.method;
        debug!(%method, %url, "API request");

        let request = HttpRequest {
            method: method.clone(),
            url,
            headers,
            body: options.body,
        };

        let response = match self.transport.send(request).await {
            Ok(response) => response,
            Err(e) => {
                warn!(%method, path, error = %e, "Backend unreachable");
                return Err(ApiError::network(e.0));
            }
        };

        if response.status == 204 {
            return Ok(None);
        }

        if response.is_success() {
            return Ok(parse_payload(&response.body));
        }

        let error = ApiError::from_status(response.status, &response.body);
        debug!(%method, path, status = response.status, error = %error, "API error");
        if response.status == 401 {
            self.handle_unauthorized();
        }
        Err(error)
    }

    /// Perform one call and deserialize the payload into `T`.
    /// A missing payload is presented to `T` as JSON `null`.
    pub async fn request<T: DeserializeOwned>(
        &self,
        path: &str,
        options: RequestOptions,
    ) -> Result<T, ApiError> {
        let payload = self.send(path, options).await?.unwrap_or(Value::Null);
        serde_json::from_value(payload)
            .map_err(|e| ApiError::InvalidResponse(format!("{}: {}", path, e)))
    }

    /// Perform one call and ignore whatever payload comes back.
    pub async fn execute(&self, path: &str, options: RequestOptions) -> Result<(), ApiError> {
        self.send(path, options).await.map(|_| ())
    }

    /// Drop the stored token and send the user to sign in, unless they
    /// are already there.
    fn handle_unauthorized(&self) {
        warn!(key = self.token.key(), "Received 401, clearing session token");
        if let Err(e) = self.token.clear() {
            warn!(error = %e, "Failed to clear session token");
        }

        let current = self.navigator.current_path();
        if Route::parse(&current).page == Page::SignIn {
            return;
        }

        let from = current
            .split('?')
            .next()
            .unwrap_or_default()
            .trim_start_matches('/');
        let from = if from.is_empty() { Page::Home.path() } else { from };
        let href = format!("{}?{}={}", Page::SignIn.path(), REDIRECT_PARAM, from);
        debug!(%href, "Redirecting to sign-in");
        self.navigator.navigate(&href);
    }
}

fn parse_payload(body: &[u8]) -> Option<Value> {
    if body.is_empty() {
        return None;
    }
    match serde_json::from_slice::<Value>(body) {
        Ok(Value::Null) => None,
        Ok(value) => Some(value),
        Err(e) => {
            debug!(error = %e, "Response body is not JSON, treating as empty");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::testing::{harness, ScriptedTransport};
    use crate::api::{TransportError, UNREACHABLE_MESSAGE};
    use serde_json::json;

    #[tokio::test]
    async fn test_bearer_header_matches_stored_token() {
        let h = harness("index");
        h.tokens.set("auth_token", "secret-token").unwrap();
        h.transport.push_json(200, json!({ "ok": true }));

        h.gateway.send("/books/current", RequestOptions::get()).await.unwrap();

        let sent = h.transport.last_request();
        assert_eq!(
            sent.headers.get(AUTHORIZATION).unwrap().to_str().unwrap(),
            "Bearer secret-token"
        );
    }

    #[tokio::test]
    async fn test_no_token_no_authorization_header() {
        let h = harness("index");
        h.transport.push_json(200, json!([]));

        h.gateway.send("books", RequestOptions::get()).await.unwrap();

        let sent = h.transport.last_request();
        assert!(sent.headers.get(AUTHORIZATION).is_none());
        assert_eq!(sent.url.as_str(), "http://localhost:8000/books");
    }

    #[tokio::test]
    async fn test_query_parameters_are_encoded() {
        let h = harness("index");
        h.transport.push_json(200, json!({}));

        let options = RequestOptions::get()
            .query("page", 2)
            .query("search", "war & peace");
        h.gateway.send("/books", options).await.unwrap();

        assert_eq!(
            h.transport.last_request().url.as_str(),
            "http://localhost:8000/books?page=2&search=war+%26+peace"
        );
    }

    #[tokio::test]
    async fn test_json_content_type_added_for_body() {
        let h = harness("index");
        h.transport.push_json(201, json!({ "id": 1 }));

        let options = RequestOptions::method(Method::POST)
            .json(&json!({ "title": "Dune" }))
            .unwrap();
        h.gateway.send("/books", options).await.unwrap();

        let sent = h.transport.last_request();
        assert_eq!(sent.method, Method::POST);
        assert_eq!(sent.headers.get(CONTENT_TYPE).unwrap(), "application/json");
    }

    #[tokio::test]
    async fn test_explicit_content_type_is_kept() {
        let h = harness("index");
        h.transport.push_json(200, json!({}));

        let options = RequestOptions::method(Method::POST)
            .body(Body::Text("plain".to_string()))
            .header(CONTENT_TYPE, HeaderValue::from_static("text/plain"));
        h.gateway.send("/notes", options).await.unwrap();

        assert_eq!(h.transport.last_request().headers.get(CONTENT_TYPE).unwrap(), "text/plain");
    }

    #[tokio::test]
    async fn test_multipart_gets_no_json_content_type() {
        let h = harness("index");
        h.transport.push_json(200, json!({}));

        let options = RequestOptions::method(Method::POST).body(Body::Multipart(vec![]));
        h.gateway.send("/upload", options).await.unwrap();

        assert!(h.transport.last_request().headers.get(CONTENT_TYPE).is_none());
    }

    #[tokio::test]
    async fn test_no_body_no_content_type() {
        let h = harness("index");
        h.transport.push_json(200, json!({}));

        h.gateway.send("/me", RequestOptions::get()).await.unwrap();

        assert!(h.transport.last_request().headers.get(CONTENT_TYPE).is_none());
    }

    #[tokio::test]
    async fn test_no_content_returns_none_without_parsing() {
        let h = harness("index");
        // A 204 with a garbage body must not be parsed
        h.transport.push_raw(204, b"{{{not json".to_vec());

        let result = h
            .gateway
            .send("/books/3", RequestOptions::method(Method::DELETE))
            .await
            .unwrap();
        assert!(result.is_none());
    }

    #[tokio::test]
    async fn test_unparseable_success_body_is_absent() {
        let h = harness("index");
        h.transport.push_raw(200, b"OK".to_vec());

        let result = h.gateway.send("/health", RequestOptions::get()).await.unwrap();
        assert!(result.is_none());
    }

    #[tokio::test]
    async fn test_http_error_carries_status_and_detail() {
        let h = harness("index");
        h.transport.push_json(400, json!({ "detail": "You are already registered" }));

        let err = h
            .gateway
            .send("/meetings/register/1", RequestOptions::method(Method::POST))
            .await
            .unwrap_err();
        assert_eq!(err.status(), Some(400));
        assert_eq!(err.message(), "You are already registered");
    }

    #[tokio::test]
    async fn test_unauthorized_clears_token_and_redirects() {
        let h = harness("profile");
        h.tokens.set("auth_token", "expired").unwrap();
        h.transport.push_json(401, json!({ "detail": "Token expired" }));

        let err = h.gateway.send("/me", RequestOptions::get()).await.unwrap_err();

        assert_eq!(err.status(), Some(401));
        assert_eq!(h.tokens.get("auth_token").unwrap(), None);
        assert_eq!(h.navigator.visits(), vec!["auth?redirect=profile".to_string()]);
    }

    #[tokio::test]
    async fn test_unauthorized_on_sign_in_page_does_not_redirect() {
        let h = harness("auth?redirect=admin");
        h.tokens.set("auth_token", "expired").unwrap();
        h.transport.push_raw(401, Vec::new());

        let err = h.gateway.send("/me", RequestOptions::get()).await.unwrap_err();

        assert_eq!(err.message(), "Error 401");
        assert_eq!(h.tokens.get("auth_token").unwrap(), None);
        assert!(h.navigator.visits().is_empty());
    }

    #[tokio::test]
    async fn test_other_errors_keep_token() {
        let h = harness("admin");
        h.tokens.set("auth_token", "still-valid").unwrap();
        h.transport.push_json(403, json!({ "detail": "Admins only" }));

        let err = h.gateway.send("/users", RequestOptions::get()).await.unwrap_err();

        assert!(err.is_forbidden());
        assert_eq!(h.tokens.get("auth_token").unwrap().as_deref(), Some("still-valid"));
        assert!(h.navigator.visits().is_empty());
    }

    #[tokio::test]
    async fn test_network_failure_has_fixed_message() {
        for detail in ["Connection refused (os error 111)", "dns error: no record found"] {
            let h = harness("index");
            h.transport.push_failure(TransportError(detail.to_string()));

            let err = h.gateway.send("/books/current", RequestOptions::get()).await.unwrap_err();
            assert_eq!(err.message(), UNREACHABLE_MESSAGE);
            assert_eq!(err.status(), None);
        }
    }

    #[tokio::test]
    async fn test_request_decodes_typed_payload() {
        #[derive(serde::Deserialize, Debug, PartialEq)]
        struct Receipt {
            message: String,
        }

        let h = harness("index");
        h.transport.push_json(200, json!({ "message": "Code sent" }));

        let receipt: Receipt = h.gateway.request("/auth/send-code", RequestOptions::get()).await.unwrap();
        assert_eq!(receipt.message, "Code sent");
    }

    #[tokio::test]
    async fn test_request_reports_shape_mismatch() {
        #[derive(serde::Deserialize, Debug)]
        #[allow(dead_code)]
        struct Receipt {
            message: String,
        }

        let h = harness("index");
        h.transport.push_raw(204, Vec::new());

        let err = h
            .gateway
            .request::<Receipt>("/auth/send-code", RequestOptions::get())
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::InvalidResponse(_)));
    }

    #[test]
    fn test_base_url_trailing_slash_is_trimmed() {
        let config = GatewayConfig {
            base_url: "http://books.example:9000/".to_string(),
            token_key: "auth_token".to_string(),
        };
        let gateway = Gateway::new(
            &config,
            Arc::new(ScriptedTransport::default()),
            Arc::new(crate::auth::MemoryTokenStore::new()),
            Arc::new(crate::navigation::DetachedNavigator::default()),
        );
        assert_eq!(
            gateway.url_for("me", &[]).unwrap().as_str(),
            "http://books.example:9000/me"
        );
    }
}
