// src/bidding/endpoint_client.rs

use futures::future::join_all;
use reqwest::{Client, StatusCode};
use std::time::Instant;
use tokio::time::{timeout, Duration};
use tracing::debug;

use crate::adapter::{ServerRequest, ServerResponse};
use crate::error::{AdapterError, AdapterResult};

/// 单次请求结果：请求下标、结果、耗时
#[derive(Debug)]
pub struct EndpointCall {
    pub index: usize,
    pub result: AdapterResult<ServerResponse>,
    pub elapsed_ms: u128,
}

/// 把构建好的请求发往 endpoint 的传输层
pub struct EndpointClient {
    client: Client,
    timeout: Duration,
}

impl EndpointClient {
    pub fn new(timeout_ms: u64) -> Self {
        Self {
            client: Client::new(),
            timeout: Duration::from_millis(timeout_ms),
        }
    }

    /// 发送单个请求，204 或空 body 视为空响应
    pub async fn send(&self, request: &ServerRequest) -> AdapterResult<ServerResponse> {
        let response = timeout(
            self.timeout,
            self.client
                .post(&request.url)
                .header("Content-Type", "application/json")
                .json(&request.data)
                .send(),
        )
        .await
        .map_err(|_| AdapterError::Timeout {
            url: request.url.clone(),
            timeout_ms: self.timeout.as_millis() as u64,
        })??
        .error_for_status()?;

        if response.status() == StatusCode::NO_CONTENT {
            return Ok(ServerResponse::empty());
        }
        let mut body = response.bytes().await?.to_vec();
        if body.iter().all(u8::is_ascii_whitespace) {
            return Ok(ServerResponse::empty());
        }
        let value: serde_json::Value = simd_json::serde::from_slice(&mut body)?;
        Ok(ServerResponse::new(value))
    }

    /// 并发发送所有请求，结果顺序与输入一致
    pub async fn send_all(&self, requests: &[ServerRequest]) -> Vec<EndpointCall> {
        let tasks = requests.iter().enumerate().map(|(index, request)| async move {
            let start = Instant::now();
            let result = self.send(request).await;
            let elapsed_ms = start.elapsed().as_millis();
            debug!(url = %request.url, elapsed_ms = elapsed_ms as u64, ok = result.is_ok(), "endpoint call finished");
            EndpointCall { index, result, elapsed_ms }
        });
        join_all(tasks).await
    }
}
