//! Upstream fetch.
//!
//! `UpstreamSource` is the seam between the orchestrator and the network so
//! targets can be driven from memory in tests. `HttpUpstream` does a plain
//! HTTP/1 GET over a fresh TCP connection per scrape, bounded by a timeout.

use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use http_body_util::{BodyExt, Empty, Limited};
use hyper::header::{ACCEPT, HOST, USER_AGENT};
use hyper::{Method, Request, StatusCode};
use hyper_util::rt::TokioIo;
use tokio::net::TcpStream;

use stalefilter_core::error::{Result, StaleFilterError};

use crate::config::UpstreamSection;

#[async_trait]
pub trait UpstreamSource: Send + Sync {
    /// Human-readable location, used in logs.
    fn describe(&self) -> &str;

    /// Fetch one exposition payload.
    async fn fetch(&self) -> Result<String>;
}

#[derive(Debug, Clone)]
pub struct HttpUpstream {
    authority: String,
    path: String,
    uri: String,
    timeout: Duration,
    max_body_bytes: usize,
}

impl HttpUpstream {
    pub fn new(section: &UpstreamSection, port: u16) -> Self {
        let authority = format!("{}:{}", section.host, port);
        let uri = format!("http://{authority}{}", section.path);
        Self {
            authority,
            path: section.path.clone(),
            uri,
            timeout: Duration::from_millis(section.timeout_ms),
            max_body_bytes: section.max_body_bytes,
        }
    }

    async fn get(&self) -> Result<String> {
        let stream = TcpStream::connect(&self.authority).await.map_err(|e| {
            StaleFilterError::Upstream(format!("connect {} failed: {e}", self.authority))
        })?;

        let io = TokioIo::new(stream);
        let (mut sender, conn) = hyper::client::conn::http1::handshake(io)
            .await
            .map_err(|e| StaleFilterError::Upstream(format!("handshake failed: {e}")))?;

        // Drive the connection in the background.
        tokio::spawn(async move {
            if let Err(e) = conn.await {
                tracing::debug!(error = %e, "upstream connection ended with error");
            }
        });

        let req = Request::builder()
            .method(Method::GET)
            .uri(self.path.as_str())
            .header(HOST, self.authority.as_str())
            .header(USER_AGENT, concat!("stalefilter/", env!("CARGO_PKG_VERSION")))
            .header(ACCEPT, "text/plain")
            .body(Empty::<Bytes>::new())
            .map_err(|e| StaleFilterError::Internal(format!("build upstream request: {e}")))?;

        let resp = sender
            .send_request(req)
            .await
            .map_err(|e| StaleFilterError::Upstream(format!("request failed: {e}")))?;

        if resp.status() != StatusCode::OK {
            return Err(StaleFilterError::UpstreamStatus(resp.status().as_u16()));
        }

        let body = Limited::new(resp.into_body(), self.max_body_bytes)
            .collect()
            .await
            .map_err(|e| StaleFilterError::Upstream(format!("read body failed: {e}")))?
            .to_bytes();

        Ok(decode_lines(&body))
    }
}

/// Decode an exposition body, dropping any line that is not valid UTF-8.
fn decode_lines(body: &[u8]) -> String {
    if let Ok(text) = std::str::from_utf8(body) {
        return text.to_owned();
    }

    let mut dropped = 0usize;
    let kept: Vec<&str> = body
        .split(|b| *b == b'\n')
        .filter_map(|line| match std::str::from_utf8(line) {
            Ok(line) => Some(line),
            Err(_) => {
                dropped += 1;
                None
            }
        })
        .collect();
    tracing::debug!(dropped, "dropped non-utf-8 exposition lines");
    kept.join("\n")
}

#[async_trait]
impl UpstreamSource for HttpUpstream {
    fn describe(&self) -> &str {
        &self.uri
    }

    async fn fetch(&self) -> Result<String> {
        match tokio::time::timeout(self.timeout, self.get()).await {
            Ok(res) => res,
            Err(_) => Err(StaleFilterError::UpstreamTimeout),
        }
    }
}
