//! 参数解析：按格式优先、共享层兜底的取值规则，尺寸解析，底价解析

use serde_json::{Map, Value};

use crate::adapter::VIDEO_TARGETING;
use crate::model::{BidDescriptor, FloorQuery, FormatParams, MediaType, SizeInput};

pub const FLOOR_CURRENCY: &str = "USD";
pub const DEFAULT_VIDEO_FLOOR: f64 = 0.5;
pub const DEFAULT_BANNER_FLOOR: f64 = 0.1;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParamKey {
    PubId,
    Placement,
    Size,
}

/// 解析后的尺寸，宽高解析失败时为 `None`
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Size {
    pub w: Option<u32>,
    pub h: Option<u32>,
}

impl Size {
    fn from_ints(w: Option<i64>, h: Option<i64>) -> Self {
        let positive = |v: Option<i64>| v.filter(|v| *v > 0).and_then(|v| u32::try_from(v).ok());
        Self { w: positive(w), h: positive(h) }
    }
}

fn lookup(params: &FormatParams, key: ParamKey) -> Option<&str> {
    let value = match key {
        ParamKey::PubId => params.pubid.as_deref(),
        ParamKey::Placement => params.placement.as_deref(),
        ParamKey::Size => params.size.as_deref(),
    };
    value.filter(|v| !v.is_empty())
}

fn nested_params(bid: &BidDescriptor, media_type: MediaType) -> Option<&FormatParams> {
    let params = bid.params.as_ref()?;
    match media_type {
        MediaType::Video => params.video.as_ref().map(|video| &video.format),
        MediaType::Banner => params.banner.as_ref(),
    }
}

/// 先取 `params.<format>.<key>`，为空再取 `params.<key>`
pub fn format_param(bid: &BidDescriptor, media_type: MediaType, key: ParamKey) -> Option<&str> {
    let shared = &bid.params.as_ref()?.shared;
    nested_params(bid, media_type)
        .and_then(|nested| lookup(nested, key))
        .or_else(|| lookup(shared, key))
}

fn truthy(value: f64) -> bool {
    value != 0.0 && !value.is_nan()
}

fn floor_param(bid: &BidDescriptor, media_type: MediaType) -> Option<f64> {
    let shared = bid.params.as_ref()?.shared.bidfloor;
    nested_params(bid, media_type)
        .and_then(|nested| nested.bidfloor)
        .filter(|floor| truthy(*floor))
        .or(shared)
}

pub fn default_floor(media_type: MediaType) -> f64 {
    match media_type {
        MediaType::Video => DEFAULT_VIDEO_FLOOR,
        MediaType::Banner => DEFAULT_BANNER_FLOOR,
    }
}

/// 底价：floor provider > `bidfloor` 参数 > 格式默认值
pub fn resolve_floor(bid: &BidDescriptor, media_type: MediaType) -> f64 {
    let query = FloorQuery { currency: FLOOR_CURRENCY, media_type, size: "*" };
    bid.floor_provider
        .as_ref()
        .and_then(|provider| provider.get_floor(&query))
        .and_then(|info| info.floor)
        .filter(|floor| truthy(*floor))
        .or_else(|| floor_param(bid, media_type))
        .unwrap_or_else(|| default_floor(media_type))
}

/// 与 `parseInt(s, 10)` 一致：跳过前导空白，读取可选符号和连续数字
fn parse_leading_int(s: &str) -> Option<i64> {
    let s = s.trim_start();
    let (negative, rest) = match s.as_bytes().first() {
        Some(b'-') => (true, &s[1..]),
        Some(b'+') => (false, &s[1..]),
        _ => (false, s),
    };
    let end = rest.bytes().take_while(u8::is_ascii_digit).count();
    let value: i64 = rest[..end].parse().ok()?;
    Some(if negative { -value } else { value })
}

fn js_int(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n.as_i64().or_else(|| n.as_f64().filter(|f| f.is_finite()).map(|f| f.trunc() as i64)),
        Value::String(s) => parse_leading_int(s),
        _ => None,
    }
}

fn is_size_token(token: &str) -> bool {
    match token.split_once(['x', 'X']) {
        Some((w, h)) => {
            !w.is_empty() && !h.is_empty() && w.bytes().all(|b| b.is_ascii_digit()) && h.bytes().all(|b| b.is_ascii_digit())
        }
        None => false,
    }
}

fn token_size(token: &str) -> Size {
    let mut parts = token.split('x');
    let w = parts.next().and_then(parse_leading_int);
    let h = parts.next().and_then(parse_leading_int);
    Size::from_ints(w, h)
}

fn pair_size(value: &Value) -> Size {
    match value.as_array().map(Vec::as_slice) {
        Some([w, h]) => match (js_int(w), js_int(h)) {
            (Some(w), Some(h)) => Size::from_ints(Some(w), Some(h)),
            _ => Size::default(),
        },
        _ => Size::default(),
    }
}

/// 解析尺寸输入
///
/// 字符串只保留形如 `WxH` 的片段；数组里无法识别的元素会得到一个宽高都为空的尺寸。
pub fn parse_sizes(input: &SizeInput) -> Vec<Size> {
    match input {
        SizeInput::Text(text) => text.split(',').filter(|t| is_size_token(t)).map(token_size).collect(),
        SizeInput::List(items) => match items.as_slice() {
            [w, h] if w.is_number() && h.is_number() => vec![Size::from_ints(js_int(w), js_int(h))],
            _ => items.iter().map(pair_size).collect(),
        },
    }
}

fn declared(input: Option<&SizeInput>) -> Option<&SizeInput> {
    input.filter(|size| !matches!(size, SizeInput::Text(text) if text.is_empty()))
}

/// 候选尺寸：`size` 参数 > 格式自身声明的尺寸 > descriptor 的 `sizes`
pub fn resolve_sizes(bid: &BidDescriptor, media_type: MediaType) -> Vec<Size> {
    if let Some(size) = format_param(bid, media_type, ParamKey::Size) {
        return parse_sizes(&SizeInput::Text(size.to_string()));
    }
    let format_sizes = match media_type {
        MediaType::Video => bid.media_types.video.as_ref().and_then(|v| v.player_size.as_ref()),
        MediaType::Banner => bid.media_types.banner.as_ref().and_then(|b| b.sizes.as_ref()),
    };
    declared(format_sizes)
        .or_else(|| declared(bid.sizes.as_ref()))
        .map(parse_sizes)
        .unwrap_or_default()
}

/// 视频定向属性：`mediaTypes.video`（去掉 playerSize/context/w/h）叠加
/// `params.video` 中白名单内的字段
pub fn video_targeting(bid: &BidDescriptor) -> Map<String, Value> {
    let mut result = Map::new();
    if let Some(video) = &bid.media_types.video {
        for (key, value) in &video.attributes {
            if key != "w" && key != "h" {
                result.insert(key.clone(), value.clone());
            }
        }
    }
    if let Some(video) = bid.params.as_ref().and_then(|p| p.video.as_ref()) {
        for key in VIDEO_TARGETING {
            if let Some(value) = video.attributes.get(key) {
                result.insert(key.to_string(), value.clone());
            }
        }
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::StaticFloors;
    use proptest::prelude::*;
    use serde_json::json;
    use std::sync::Arc;

    fn bid(value: Value) -> BidDescriptor {
        serde_json::from_value(value).unwrap()
    }

    fn size(w: u32, h: u32) -> Size {
        Size { w: Some(w), h: Some(h) }
    }

    #[test]
    fn nested_param_wins_and_empty_falls_through() {
        let b = bid(json!({
            "params": {
                "pubid": "shared", "placement": "p",
                "video": { "pubid": "video-pub", "placement": "" },
                "banner": { "pubid": "" }
            }
        }));
        assert_eq!(format_param(&b, MediaType::Video, ParamKey::PubId), Some("video-pub"));
        assert_eq!(format_param(&b, MediaType::Video, ParamKey::Placement), Some("p"));
        assert_eq!(format_param(&b, MediaType::Banner, ParamKey::PubId), Some("shared"));
        assert_eq!(format_param(&b, MediaType::Banner, ParamKey::Size), None);
    }

    #[test]
    fn parses_string_sizes() {
        let parsed = parse_sizes(&SizeInput::Text("300x250,728x90,bogus,1x".into()));
        assert_eq!(parsed, vec![size(300, 250), size(728, 90)]);
    }

    #[test]
    fn uppercase_separator_only_yields_width() {
        let parsed = parse_sizes(&SizeInput::Text("300X250".into()));
        assert_eq!(parsed, vec![Size { w: Some(300), h: None }]);
    }

    #[test]
    fn parses_single_and_listed_pairs() {
        assert_eq!(parse_sizes(&SizeInput::List(vec![json!(640), json!(480)])), vec![size(640, 480)]);

        let listed = parse_sizes(&SizeInput::List(vec![json!([300, 250]), json!(["a", 1]), json!([0, 90])]));
        assert_eq!(listed, vec![size(300, 250), Size::default(), Size { w: None, h: Some(90) }]);
    }

    #[test]
    fn size_param_overrides_declared_sizes() {
        let b = bid(json!({
            "params": { "size": "300x250" },
            "mediaTypes": { "banner": { "sizes": [[728, 90]] } },
            "sizes": [[160, 600]]
        }));
        assert_eq!(resolve_sizes(&b, MediaType::Banner), vec![size(300, 250)]);
    }

    #[test]
    fn falls_back_to_generic_sizes() {
        let b = bid(json!({ "mediaTypes": { "video": {} }, "sizes": [[640, 360]] }));
        assert_eq!(resolve_sizes(&b, MediaType::Video), vec![size(640, 360)]);

        let empty = bid(json!({ "mediaTypes": { "video": {} } }));
        assert!(resolve_sizes(&empty, MediaType::Video).is_empty());
    }

    #[test]
    fn floor_resolution_order() {
        let none = bid(json!({ "params": {} }));
        assert_eq!(resolve_floor(&none, MediaType::Video), 0.5);
        assert_eq!(resolve_floor(&none, MediaType::Banner), 0.1);

        let param = bid(json!({ "params": { "bidfloor": 1.25, "video": { "bidfloor": 2.0 } } }));
        assert_eq!(resolve_floor(&param, MediaType::Video), 2.0);
        assert_eq!(resolve_floor(&param, MediaType::Banner), 1.25);

        let provided = param.with_floor_provider(Arc::new(StaticFloors::new().with(MediaType::Banner, 3.0)));
        assert_eq!(resolve_floor(&provided, MediaType::Banner), 3.0);
        assert_eq!(resolve_floor(&provided, MediaType::Video), 2.0);
    }

    #[test]
    fn zero_provider_floor_falls_back_to_param() {
        let b = bid(json!({ "params": { "bidfloor": 0.75 } }))
            .with_floor_provider(Arc::new(StaticFloors::new().with(MediaType::Banner, 0.0)));
        assert_eq!(resolve_floor(&b, MediaType::Banner), 0.75);
    }

    #[test]
    fn video_targeting_merges_and_filters() {
        let b = bid(json!({
            "params": {
                "video": { "pubid": "1", "mimes": ["video/webm"], "skip": 1, "startdelay": 5, "context": "outstream" }
            },
            "mediaTypes": {
                "video": { "playerSize": [640, 480], "context": "instream", "w": 1, "h": 2,
                           "mimes": ["video/mp4"], "protocols": [2] }
            }
        }));
        let targeting = video_targeting(&b);
        assert_eq!(targeting.get("mimes"), Some(&json!(["video/webm"])));
        assert_eq!(targeting.get("protocols"), Some(&json!([2])));
        assert_eq!(targeting.get("skip"), Some(&json!(1)));
        assert_eq!(targeting.get("context"), Some(&json!("outstream")));
        assert!(!targeting.contains_key("startdelay"));
        assert!(!targeting.contains_key("pubid"));
        assert!(!targeting.contains_key("playerSize"));
        assert!(!targeting.contains_key("w"));
    }

    proptest! {
        #[test]
        fn well_formed_size_strings_parse_back(w in 1u32..5000, h in 1u32..5000) {
            let parsed = parse_sizes(&SizeInput::Text(format!("{}x{}", w, h)));
            prop_assert_eq!(parsed, vec![size(w, h)]);
        }

        #[test]
        fn parse_sizes_never_panics(text in "\\PC{0,40}") {
            let _ = parse_sizes(&SizeInput::Text(text));
        }
    }
}
