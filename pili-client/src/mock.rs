// Mock HttpRequester for testing without a network

use std::collections::VecDeque;

use async_trait::async_trait;
use http::StatusCode;
use pili_core::ApiError;
use tokio::sync::Mutex;

use crate::error::ClientError;
use crate::transport::{HttpRequest, HttpRequester, HttpResponse};

/// Replays queued responses in order and records every request it sees.
#[derive(Debug, Default)]
pub struct MockRequester {
    responses: Mutex<VecDeque<Result<HttpResponse, ClientError>>>,
    requests: Mutex<Vec<HttpRequest>>,
}

impl MockRequester {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn push(&self, status: StatusCode, body: &'static str) {
        self.responses
            .lock()
            .await
            .push_back(Ok(HttpResponse::new(status, body)));
    }

    pub async fn push_json(&self, status: StatusCode, body: serde_json::Value) {
        self.responses
            .lock()
            .await
            .push_back(Ok(HttpResponse::new(status, body.to_string())));
    }

    pub async fn push_transport_error(&self, message: &str) {
        self.responses
            .lock()
            .await
            .push_back(Err(ApiError::Transport(message.to_string()).into()));
    }

    pub async fn requests(&self) -> Vec<HttpRequest> {
        self.requests.lock().await.clone()
    }

    /// Body of the `index`th request, parsed as JSON.
    pub async fn request_json(&self, index: usize) -> serde_json::Value {
        let requests = self.requests.lock().await;
        let body = requests[index].body.clone().unwrap_or_default();
        serde_json::from_slice(&body).unwrap()
    }
}

#[async_trait]
impl HttpRequester for MockRequester {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, ClientError> {
        self.requests.lock().await.push(request);
        self.responses
            .lock()
            .await
            .pop_front()
            .unwrap_or_else(|| Ok(HttpResponse::new(StatusCode::OK, "{}")))
    }
}
