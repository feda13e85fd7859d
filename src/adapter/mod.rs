//! saambaa 竞价适配器：校验 → 构建请求 →（传输）→ 解析响应

pub mod builder;
pub mod device;
pub mod interpreter;
pub mod params;
pub mod validator;

use serde::{Deserialize, Serialize};

use crate::config::AdapterConfig;
use crate::error::AdapterResult;
use crate::model::{BidDescriptor, BidderRequestContext, Environment, MediaType};
use crate::openrtb::request::OutboundAdRequest;
use crate::openrtb::response::NormalizedBidResult;

pub const BIDDER_CODE: &str = "saambaa";
pub const ADAPTER_VERSION: &str = "1.0";
pub const SUPPORTED_MEDIA_TYPES: [MediaType; 2] = [MediaType::Banner, MediaType::Video];

pub const VIDEO_ENDPOINT: &str = "https://nep.advangelists.com/xp/get?pubid=";
pub const BANNER_ENDPOINT: &str = "https://nep.advangelists.com/xp/get?pubid=";

/// 允许从 `params.video` 透传到请求的视频定向字段
pub const VIDEO_TARGETING: [&str; 6] = ["mimes", "playbackmethod", "maxduration", "skip", "playerSize", "context"];
pub const DEFAULT_MIMES: [&str; 2] = ["video/mp4", "application/javascript"];

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "UPPERCASE")]
pub enum HttpMethod {
    Post,
}

/// 交给外部传输层发送的请求描述
#[derive(Serialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct ServerRequest {
    pub method: HttpMethod,
    pub url: String,
    pub data: OutboundAdRequest,
    /// 原始 descriptor，解析响应时用来判断格式
    pub bid_request: BidDescriptor,
    #[serde(skip)]
    pub media_type: MediaType,
}

/// 传输层拿到的响应：`body` 为 `None` 表示空响应（例如 204）
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ServerResponse {
    pub body: Option<serde_json::Value>,
}

impl ServerResponse {
    pub fn new(body: serde_json::Value) -> Self {
        Self { body: Some(body) }
    }

    pub fn empty() -> Self {
        Self::default()
    }
}

/// 适配器本体
///
/// 只持有只读的配置和浏览环境，没有可变状态，可以在多个竞价周期之间共享。
#[derive(Debug, Clone, Default)]
pub struct SaambaaAdapter {
    config: AdapterConfig,
    env: Environment,
}

impl SaambaaAdapter {
    pub fn new(config: AdapterConfig, env: Environment) -> Self {
        Self { config, env }
    }

    pub fn code(&self) -> &'static str {
        BIDDER_CODE
    }

    pub fn supported_media_types(&self) -> &'static [MediaType] {
        &SUPPORTED_MEDIA_TYPES
    }

    pub fn config(&self) -> &AdapterConfig {
        &self.config
    }

    pub fn environment(&self) -> &Environment {
        &self.env
    }

    pub fn is_bid_request_valid(&self, bid: Option<&BidDescriptor>) -> bool {
        validator::is_bid_request_valid(bid)
    }

    pub fn build_requests(&self, bids: &[BidDescriptor], ctx: &BidderRequestContext) -> Vec<ServerRequest> {
        builder::RequestBuilder::new(&self.config, &self.env).build_requests(bids, ctx)
    }

    pub fn interpret_response(
        &self,
        response: &ServerResponse,
        bid_request: &BidDescriptor,
    ) -> AdapterResult<Option<NormalizedBidResult>> {
        interpreter::interpret_response(response, bid_request)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn registers_banner_and_video() {
        let adapter = SaambaaAdapter::default();
        assert_eq!(adapter.code(), "saambaa");
        assert_eq!(adapter.supported_media_types(), &[MediaType::Banner, MediaType::Video]);
        assert!(adapter.environment().user_agent.is_empty());
    }

    #[test]
    fn endpoint_override_applies_to_both_formats() {
        let config = AdapterConfig::default().with_endpoint("http://127.0.0.1:9001/xp/get?pubid=");
        let adapter = SaambaaAdapter::new(config, Environment::default());
        let bid: BidDescriptor = serde_json::from_value(json!({
            "params": { "pubid": "7", "placement": "p" },
            "mediaTypes": { "banner": { "sizes": "300x250" }, "video": { "playerSize": [640, 480] } }
        }))
        .unwrap();

        let requests = adapter.build_requests(&[bid], &BidderRequestContext::default());
        assert!(requests.iter().all(|r| r.url == "http://127.0.0.1:9001/xp/get?pubid=7"));
        assert!(requests.iter().all(|r| r.method == HttpMethod::Post));
    }
}
