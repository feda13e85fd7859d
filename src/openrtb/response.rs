use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use crate::model::MediaType;

/// endpoint 返回的 OpenRTB Bid Response
///
/// 字段都按可缺省处理，结构是否完整由解释器决定。
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
pub struct BidResponse {
    #[serde(default, deserialize_with = "de_opt_string")]
    pub id: Option<String>,
    #[serde(default)]
    pub cur: Option<String>,
    #[serde(default)]
    pub seatbid: Vec<SeatBid>,
}

#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
pub struct SeatBid {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub seat: Option<String>,
    #[serde(default)]
    pub bid: Vec<Bid>,
}

#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
pub struct Bid {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub impid: Option<String>,
    #[serde(default, deserialize_with = "de_price")]
    pub price: f64,
    #[serde(default, deserialize_with = "de_opt_u32", skip_serializing_if = "Option::is_none")]
    pub w: Option<u32>,
    #[serde(default, deserialize_with = "de_opt_u32", skip_serializing_if = "Option::is_none")]
    pub h: Option<u32>,
    /// Ad markup（HTML 或 VAST XML）
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub adm: Option<String>,
    /// Win notice URL，视频没有 adm 时作为 VAST 地址
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nurl: Option<String>,
    #[serde(default, deserialize_with = "de_opt_u64", skip_serializing_if = "Option::is_none")]
    pub ttl: Option<u64>,
    #[serde(default, deserialize_with = "de_opt_string", skip_serializing_if = "Option::is_none")]
    pub crid: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub adomain: Option<Vec<String>>,
}

#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct BidMeta {
    pub advertiser_domains: Option<Vec<String>>,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct AdResponse {
    pub content: String,
}

/// 交给 host 的标准化出价结果
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct NormalizedBidResult {
    pub request_id: Option<String>,
    pub bidder_code: String,
    pub cpm: f64,
    pub width: Option<u32>,
    pub height: Option<u32>,
    pub ttl: u64,
    pub creative_id: Option<String>,
    pub currency: Option<String>,
    pub meta: BidMeta,
    pub media_type: MediaType,
    pub net_revenue: bool,
    /// Banner 素材
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ad: Option<String>,
    /// 内联 VAST
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vast_xml: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ad_response: Option<AdResponse>,
    /// VAST 地址
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vast_url: Option<String>,
}

/// `id` / `crid` 有的 DSP 返回数字
fn de_opt_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Option::<Value>::deserialize(deserializer)? {
        Some(Value::String(s)) => Some(s),
        Some(Value::Number(n)) => Some(n.to_string()),
        _ => None,
    })
}

/// 数字字段原样透传：整数、浮点、数字字符串都接受，null 视为缺省
fn lenient_number(value: Option<Value>) -> Option<f64> {
    let number = match value? {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    };
    number.filter(|n| n.is_finite())
}

fn de_price<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(lenient_number(Option::<Value>::deserialize(deserializer)?).unwrap_or_default())
}

fn de_opt_u32<'de, D>(deserializer: D) -> Result<Option<u32>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(lenient_number(Option::<Value>::deserialize(deserializer)?)
        .filter(|n| *n >= 0.0 && *n <= f64::from(u32::MAX))
        .map(|n| n as u32))
}

fn de_opt_u64<'de, D>(deserializer: D) -> Result<Option<u64>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(lenient_number(Option::<Value>::deserialize(deserializer)?)
        .filter(|n| *n >= 0.0)
        .map(|n| n as u64))
}
