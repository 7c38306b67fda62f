//! The network primitive underneath the request gateway.
//!
//! `Transport` takes a fully built request and returns the raw status and
//! body. It knows nothing about tokens or error shapes; that is the
//! gateway's job. Production code uses `HttpTransport` (reqwest), tests
//! substitute a scripted implementation.

use async_trait::async_trait;
use reqwest::header::HeaderMap;
use reqwest::{Client, Method, Url};
use thiserror::Error;
use tracing::debug;

/// A form field in a multipart payload
#[derive(Debug, Clone, PartialEq)]
pub struct FormField {
    pub name: String,
    pub value: String,
}

/// Request body as handed to the gateway.
#[derive(Debug, Clone, PartialEq)]
pub enum Body {
    /// Serialized JSON text
    Json(String),
    /// Arbitrary text; content type must be supplied by the caller
    Text(String),
    /// Multipart form; the transport sets the boundary content type itself
    Multipart(Vec<FormField>),
}

impl Body {
    pub fn json<T: serde::Serialize>(value: &T) -> Result<Self, serde_json::Error> {
        Ok(Body::Json(serde_json::to_string(value)?))
    }

    pub fn is_multipart(&self) -> bool {
        matches!(self, Body::Multipart(_))
    }
}

#[derive(Debug, Clone)]
pub struct HttpRequest {
    pub method: Method,
    pub url: Url,
    pub headers: HeaderMap,
    pub body: Option<Body>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct HttpResponse {
    pub status: u16,
    pub body: Vec<u8>,
}

impl HttpResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// The request never produced a response.
#[derive(Error, Debug, Clone)]
#[error("{0}")]
pub struct TransportError(pub String);

#[async_trait]
pub trait Transport: Send + Sync {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, TransportError>;
}

/// reqwest-backed transport.
/// Clone is cheap - reqwest::Client uses Arc internally for connection pooling.
#[derive(Clone, Default)]
pub struct HttpTransport {
    client: Client,
}

impl HttpTransport {
    /// No request timeout is configured: a call runs until the server
    /// answers or the connection fails.
    pub fn new() -> Result<Self, TransportError> {
        let client = Client::builder()
            .build()
            .map_err(|e| TransportError(e.to_string()))?;
        Ok(Self { client })
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, TransportError> {
        debug!(method = %request.method, url = %request.url, "Sending request");

        let mut builder = self
            .client
            .request(request.method, request.url)
            .headers(request.headers);

        builder = match request.body {
            Some(Body::Json(text)) | Some(Body::Text(text)) => builder.body(text),
            Some(Body::Multipart(fields)) => {
                let form = fields
                    .into_iter()
                    .fold(reqwest::multipart::Form::new(), |form, field| {
                        form.text(field.name, field.value)
                    });
                builder.multipart(form)
            }
            None => builder,
        };

        let response = builder
            .send()
            .await
            .map_err(|e| TransportError(e.to_string()))?;

        let status = response.status().as_u16();
        let body = response
            .bytes()
            .await
            .map_err(|e| TransportError(e.to_string()))?;

        Ok(HttpResponse {
            status,
            body: body.to_vec(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_body_json_serializes() {
        let body = Body::json(&serde_json::json!({ "role": "admin" })).unwrap();
        assert_eq!(body, Body::Json(r#"{"role":"admin"}"#.to_string()));
        assert!(!body.is_multipart());
    }

    #[test]
    fn test_multipart_flag() {
        let body = Body::Multipart(vec![FormField {
            name: "cover".to_string(),
            value: "x".to_string(),
        }]);
        assert!(body.is_multipart());
    }

    #[test]
    fn test_response_success_range() {
        let ok = HttpResponse { status: 204, body: vec![] };
        let redirect = HttpResponse { status: 304, body: vec![] };
        assert!(ok.is_success());
        assert!(!redirect.is_success());
    }
}
