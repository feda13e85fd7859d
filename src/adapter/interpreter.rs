use serde::Deserialize;
use serde_json::Value;
use tracing::debug;

use crate::adapter::{ServerResponse, BIDDER_CODE};
use crate::error::{AdapterError, AdapterResult};
use crate::model::{BidDescriptor, MediaType};
use crate::openrtb::response::{AdResponse, BidMeta, BidResponse, NormalizedBidResult};

pub const DEFAULT_TTL: u64 = 60;

/// 空响应：null、数字、布尔、空对象、空数组、空字符串
fn is_empty_body(body: &Value) -> bool {
    match body {
        Value::Null | Value::Number(_) | Value::Bool(_) => true,
        Value::Object(map) => map.is_empty(),
        Value::Array(items) => items.is_empty(),
        Value::String(s) => s.is_empty(),
    }
}

/// 解析 endpoint 响应
///
/// 空响应返回 `Ok(None)`（无填充）。非空但缺少 `seatbid[0].bid[0]` 的响应不做兜底，
/// 以 [`AdapterError::MissingBid`] 返回给调用方。
pub fn interpret_response(
    response: &ServerResponse,
    bid_request: &BidDescriptor,
) -> AdapterResult<Option<NormalizedBidResult>> {
    let Some(body) = response.body.as_ref().filter(|body| !is_empty_body(body)) else {
        debug!(bid_id = %bid_request.bid_id, "empty response, no fill");
        return Ok(None);
    };

    let response = BidResponse::deserialize(body)?;
    let bid = response
        .seatbid
        .first()
        .and_then(|seatbid| seatbid.bid.first())
        .ok_or_else(|| AdapterError::MissingBid { response_id: response.id.clone() })?;

    let media_type = if bid_request.is_video() { MediaType::Video } else { MediaType::Banner };
    let mut result = NormalizedBidResult {
        request_id: response.id.clone(),
        bidder_code: BIDDER_CODE.to_string(),
        cpm: bid.price,
        width: bid.w,
        height: bid.h,
        ttl: bid.ttl.filter(|ttl| *ttl != 0).unwrap_or(DEFAULT_TTL),
        creative_id: bid.crid.clone(),
        currency: response.cur.clone(),
        meta: BidMeta { advertiser_domains: bid.adomain.clone() },
        media_type,
        net_revenue: true,
        ad: None,
        vast_xml: None,
        ad_response: None,
        vast_url: None,
    };

    match media_type {
        MediaType::Video => match bid.adm.as_ref().filter(|adm| !adm.is_empty()) {
            Some(adm) => {
                result.vast_xml = Some(adm.clone());
                result.ad_response = Some(AdResponse { content: adm.clone() });
            }
            None => result.vast_url = bid.nurl.clone(),
        },
        MediaType::Banner => result.ad = bid.adm.clone(),
    }

    debug!(
        bid_id = %bid_request.bid_id,
        cpm = result.cpm,
        %media_type,
        "interpreted saambaa response"
    );
    Ok(Some(result))
}
