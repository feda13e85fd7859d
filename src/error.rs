use thiserror::Error;

pub type AdapterResult<T> = Result<T, AdapterError>;

/// 适配器错误类型
///
/// 校验失败不走这里（直接返回 false），这里只覆盖响应解析、传输和配置加载。
#[derive(Error, Debug)]
pub enum AdapterError {
    #[error("Response decode error: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("Fast JSON decode error: {0}")]
    FastDecode(#[from] simd_json::Error),

    /// 响应非空，但 `seatbid[0].bid[0]` 不存在
    #[error("Response {response_id:?} has no seatbid[0].bid[0]")]
    MissingBid { response_id: Option<String> },

    #[error("Transport error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Endpoint {url} timed out after {timeout_ms}ms")]
    Timeout { url: String, timeout_ms: u64 },

    #[error("Configuration error: {0}")]
    Config(String),
}
