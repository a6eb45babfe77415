use std::fmt::{Display, Formatter};
use std::time::Duration;

use reqwest::blocking::Client;
use reqwest::header::CONTENT_TYPE;
pub use reqwest::{StatusCode, Url};
use tracing::debug;

use crate::config::ClientConfig;
use crate::error::Result;
use crate::models::Server;

pub const JSON_CONTENT_TYPE: &str = "application/json";

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Method {
    Get,
    Post,
    Put,
    Delete,
}

impl Method {
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Get => "GET",
            Self::Post => "POST",
            Self::Put => "PUT",
            Self::Delete => "DELETE",
        }
    }
}

impl Display for Method {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Request {
    pub method: Method,
    pub url: Url,
    pub content_type: Option<String>,
    pub body: Option<Vec<u8>>,
}

impl Request {
    #[must_use]
    pub const fn new(method: Method, url: Url) -> Self {
        Self {
            method,
            url,
            content_type: None,
            body: None,
        }
    }

    #[must_use]
    pub const fn get(url: Url) -> Self {
        Self::new(Method::Get, url)
    }

    #[must_use]
    pub const fn delete(url: Url) -> Self {
        Self::new(Method::Delete, url)
    }

    #[must_use]
    pub fn with_body(mut self, content_type: impl Into<String>, body: Vec<u8>) -> Self {
        self.content_type = Some(content_type.into());
        self.body = Some(body);
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Response {
    pub status: StatusCode,
    pub body: String,
}

impl Response {
    pub fn new(status: StatusCode, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }
}

/// One blocking request/response exchange with the repository server.
///
/// Implementations own authentication and timeouts. Whatever connection backs a call must be
/// released before `send` returns, on success and on error.
pub trait Transport: Send + Sync {
    fn send(&self, server: &Server, request: Request) -> Result<Response>;
}

impl<T: Transport + ?Sized> Transport for &T {
    fn send(&self, server: &Server, request: Request) -> Result<Response> {
        (**self).send(server, request)
    }
}

#[derive(Clone)]
pub struct HttpTransport {
    http: Client,
}

impl std::fmt::Debug for HttpTransport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpTransport").finish_non_exhaustive()
    }
}

impl HttpTransport {
    pub fn new(config: &ClientConfig) -> Result<Self> {
        let http = Client::builder()
            .timeout(Duration::from_millis(config.timeout_ms))
            .user_agent(config.user_agent.clone())
            .build()?;
        Ok(Self { http })
    }
}

impl Transport for HttpTransport {
    fn send(&self, server: &Server, request: Request) -> Result<Response> {
        debug!(method = %request.method, url = %request.url, "sending request");
        let method = match request.method {
            Method::Get => reqwest::Method::GET,
            Method::Post => reqwest::Method::POST,
            Method::Put => reqwest::Method::PUT,
            Method::Delete => reqwest::Method::DELETE,
        };

        let mut builder = self
            .http
            .request(method, request.url)
            .basic_auth(server.user(), Some(server.password()));
        if let Some(content_type) = request.content_type {
            builder = builder.header(CONTENT_TYPE, content_type);
        }
        if let Some(body) = request.body {
            builder = builder.body(body);
        }

        let resp = builder.send()?;
        let status = resp.status();
        let body = resp.text()?;
        debug!(status = status.as_u16(), bytes = body.len(), "received response");
        Ok(Response { status, body })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn with_body_sets_content_type_and_bytes() {
        let url = Url::parse("http://localhost/resources/").expect("url");
        let request = Request::new(Method::Post, url).with_body(JSON_CONTENT_TYPE, b"{}".to_vec());
        assert_eq!(request.content_type.as_deref(), Some(JSON_CONTENT_TYPE));
        assert_eq!(request.body.as_deref(), Some(&b"{}"[..]));
    }

    #[test]
    fn http_transport_builds_from_default_config() {
        let transport = HttpTransport::new(&ClientConfig::default()).expect("transport");
        assert!(format!("{transport:?}").contains("HttpTransport"));
    }
}
