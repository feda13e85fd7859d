// src/model/bid.rs

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

/// 广告格式，适配器只支持 banner 和 video
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum MediaType {
    Banner,
    Video,
}

impl MediaType {
    pub fn as_str(&self) -> &'static str {
        match self {
            MediaType::Banner => "banner",
            MediaType::Video => "video",
        }
    }
}

impl fmt::Display for MediaType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 尺寸输入：`"300x250"` / `"300x250,728x90"` 字符串，`[300, 250]` 单个尺寸，
/// 或 `[[300, 250], [728, 90]]` 尺寸列表
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(untagged)]
pub enum SizeInput {
    Text(String),
    List(Vec<Value>),
}

/// 单个格式（或共享层）的适配器参数
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
pub struct FormatParams {
    #[serde(default, deserialize_with = "de_opt_id", skip_serializing_if = "Option::is_none")]
    pub pubid: Option<String>,
    #[serde(default, deserialize_with = "de_opt_id", skip_serializing_if = "Option::is_none")]
    pub placement: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bidfloor: Option<f64>,
}

/// `params.video`：格式参数之外还可能带视频定向属性（mimes、skip 等）
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
pub struct VideoParams {
    #[serde(flatten)]
    pub format: FormatParams,
    #[serde(flatten)]
    pub attributes: Map<String, Value>,
}

#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
pub struct BidParams {
    #[serde(flatten)]
    pub shared: FormatParams,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub video: Option<VideoParams>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub banner: Option<FormatParams>,
}

#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
pub struct BannerMediaType {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sizes: Option<SizeInput>,
}

#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct VideoMediaType {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub player_size: Option<SizeInput>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub context: Option<String>,
    /// 其它调用方声明的视频属性（protocols、minduration ...）
    #[serde(flatten)]
    pub attributes: Map<String, Value>,
}

#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
pub struct MediaTypes {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub banner: Option<BannerMediaType>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub video: Option<VideoMediaType>,
}

/// 底价查询参数
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FloorQuery {
    pub currency: &'static str,
    pub media_type: MediaType,
    pub size: &'static str,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct FloorInfo {
    pub floor: Option<f64>,
    pub currency: Option<String>,
}

/// host 提供的底价解析能力（price floors）
pub trait FloorProvider: fmt::Debug + Send + Sync {
    fn get_floor(&self, query: &FloorQuery) -> Option<FloorInfo>;
}

/// 按格式配置的固定底价
#[derive(Debug, Clone, Default)]
pub struct StaticFloors {
    pub floors: HashMap<MediaType, f64>,
}

impl StaticFloors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, media_type: MediaType, floor: f64) -> Self {
        self.floors.insert(media_type, floor);
        self
    }
}

impl FloorProvider for StaticFloors {
    fn get_floor(&self, query: &FloorQuery) -> Option<FloorInfo> {
        self.floors.get(&query.media_type).map(|floor| FloorInfo {
            floor: Some(*floor),
            currency: Some(query.currency.to_string()),
        })
    }
}

/// host 传入的单个广告位竞价请求
#[derive(Serialize, Deserialize, Debug, Clone, Default)]
#[serde(rename_all = "camelCase")]
pub struct BidDescriptor {
    #[serde(default)]
    pub bidder: String,
    #[serde(default)]
    pub bid_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub params: Option<BidParams>,
    #[serde(default)]
    pub media_types: MediaTypes,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sizes: Option<SizeInput>,
    #[serde(skip)]
    pub floor_provider: Option<Arc<dyn FloorProvider>>,
}

impl BidDescriptor {
    pub fn with_floor_provider(mut self, provider: Arc<dyn FloorProvider>) -> Self {
        self.floor_provider = Some(provider);
        self
    }

    /// 声明了 `mediaTypes.video` 即视为视频请求
    pub fn is_video(&self) -> bool {
        self.media_types.video.is_some()
    }

    pub fn is_banner(&self) -> bool {
        self.media_types.banner.is_some() || !self.is_video()
    }
}

/// pubid / placement 在配置里既可能是字符串也可能是数字
fn de_opt_id<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Option::<Value>::deserialize(deserializer)? {
        Some(Value::String(s)) => Some(s),
        Some(Value::Number(n)) => Some(n.to_string()),
        _ => None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn deserializes_prebid_shaped_descriptor() {
        let bid: BidDescriptor = serde_json::from_value(json!({
            "bidder": "saambaa",
            "bidId": "b-1",
            "params": {
                "pubid": 121,
                "placement": "slot-1",
                "video": { "placement": "vslot", "mimes": ["video/webm"], "skip": 1 }
            },
            "mediaTypes": {
                "video": { "playerSize": [640, 480], "context": "instream", "protocols": [2, 3] }
            },
            "sizes": [[300, 250]]
        }))
        .unwrap();

        let params = bid.params.as_ref().unwrap();
        assert_eq!(params.shared.pubid.as_deref(), Some("121"));
        let video = params.video.as_ref().unwrap();
        assert_eq!(video.format.placement.as_deref(), Some("vslot"));
        assert_eq!(video.attributes.get("skip"), Some(&json!(1)));
        assert!(!video.attributes.contains_key("placement"));

        let media = bid.media_types.video.as_ref().unwrap();
        assert_eq!(media.context.as_deref(), Some("instream"));
        assert_eq!(media.player_size, Some(SizeInput::List(vec![json!(640), json!(480)])));
        assert_eq!(media.attributes.get("protocols"), Some(&json!([2, 3])));
        assert!(bid.is_video());
        assert!(!bid.is_banner());
    }

    #[test]
    fn banner_is_the_fallback_format() {
        let bid: BidDescriptor = serde_json::from_value(json!({ "bidder": "saambaa" })).unwrap();
        assert!(bid.is_banner());
        assert!(!bid.is_video());

        let both: BidDescriptor = serde_json::from_value(json!({
            "mediaTypes": { "banner": { "sizes": "300x250" }, "video": {} }
        }))
        .unwrap();
        assert!(both.is_banner());
        assert!(both.is_video());
    }

    #[test]
    fn static_floors_answer_per_media_type() {
        let floors = StaticFloors::new().with(MediaType::Video, 2.5);
        let query = FloorQuery { currency: "USD", media_type: MediaType::Video, size: "*" };
        assert_eq!(floors.get_floor(&query).and_then(|f| f.floor), Some(2.5));

        let banner = FloorQuery { media_type: MediaType::Banner, ..query };
        assert!(floors.get_floor(&banner).is_none());
    }
}
