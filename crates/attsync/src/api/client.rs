//! HTTP transport for the attendance API
//!
//! One shared reqwest client with the configured timeout performs every
//! request. Sending is total: transport failures come back as tagged
//! [`ApiReply`] values, never as errors, so the sync cycle can classify
//! every attempt and keep going.

use crate::error::Result;
use crate::response::ApiReply;
use async_trait::async_trait;
use reqwest::Client;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// Sends one request to the attendance API.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Perform a single GET against the fully built URL
    async fn send(&self, url: &str) -> ApiReply;
}

#[async_trait]
impl<T: Transport + ?Sized> Transport for Arc<T> {
    async fn send(&self, url: &str) -> ApiReply {
        (**self).send(url).await
    }
}

/// reqwest-backed API client
pub struct ApiClient {
    client: Client,
}

impl ApiClient {
    /// Create a new API client with the given request timeout
    pub fn new(timeout: Duration) -> Result<Self> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self { client })
    }
}

#[async_trait]
impl Transport for ApiClient {
    async fn send(&self, url: &str) -> ApiReply {
        let response = match self.client.get(url).send().await {
            Ok(response) => response,
            Err(e) if e.is_timeout() => return ApiReply::TimedOut,
            Err(e) if e.is_connect() => return ApiReply::ConnectionFailed,
            Err(_) => return ApiReply::Failed,
        };

        let status = response.status();
        if !status.is_success() {
            return ApiReply::HttpError(status.as_u16());
        }

        match response.text().await {
            Ok(body) => ApiReply::Body(body),
            Err(e) if e.is_timeout() => ApiReply::TimedOut,
            Err(_) => ApiReply::Failed,
        }
    }
}

/// A scriptable transport for tests.
///
/// Queued replies are served in order; when the queue is empty the default
/// reply (initially [`ApiReply::Failed`]) is returned. Every URL sent is
/// recorded for assertions.
#[derive(Debug, Default)]
pub struct MockTransport {
    replies: Mutex<VecDeque<ApiReply>>,
    default_reply: Mutex<Option<ApiReply>>,
    requests: Mutex<Vec<String>>,
}

impl MockTransport {
    /// Creates a new mock transport.
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue the reply for the next unscripted request.
    pub fn push_reply(&self, reply: ApiReply) {
        self.replies.lock().unwrap().push_back(reply);
    }

    /// Set the reply returned once the queue is exhausted.
    pub fn set_default_reply(&self, reply: ApiReply) {
        *self.default_reply.lock().unwrap() = Some(reply);
    }

    /// URLs sent so far, in order.
    pub fn requests(&self) -> Vec<String> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl Transport for MockTransport {
    async fn send(&self, url: &str) -> ApiReply {
        self.requests.lock().unwrap().push(url.to_string());

        if let Some(reply) = self.replies.lock().unwrap().pop_front() {
            return reply;
        }
        self.default_reply
            .lock()
            .unwrap()
            .clone()
            .unwrap_or(ApiReply::Failed)
    }
}
