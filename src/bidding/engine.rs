use tracing::{info, warn};

use crate::adapter::{SaambaaAdapter, BIDDER_CODE};
use crate::bidding::endpoint_client::EndpointClient;
use crate::error::AdapterError;
use crate::logging::{AuctionLog, EndpointCallLog};
use crate::model::{BidDescriptor, BidderRequestContext};
use crate::openrtb::response::NormalizedBidResult;

/// 一个竞价周期的产出
#[derive(Debug)]
pub struct CycleOutcome {
    pub results: Vec<NormalizedBidResult>,
    pub log: AuctionLog,
}

/// 执行一个完整的竞价周期：准入校验 → 构建请求 → 发送 → 解析响应
///
/// 单个请求失败只记录日志，不影响其它请求。
pub async fn run_cycle(
    adapter: &SaambaaAdapter,
    client: &EndpointClient,
    bids: &[BidDescriptor],
    ctx: &BidderRequestContext,
) -> CycleOutcome {
    let admitted: Vec<BidDescriptor> = bids
        .iter()
        .filter(|bid| adapter.is_bid_request_valid(Some(*bid)))
        .cloned()
        .collect();
    let mut log = AuctionLog::new(BIDDER_CODE, bids.len(), admitted.len());

    let requests = adapter.build_requests(&admitted, ctx);
    let calls = client.send_all(&requests).await;

    let mut results = Vec::new();
    for call in calls {
        let request = &requests[call.index];
        let outcome = call
            .result
            .and_then(|response| adapter.interpret_response(&response, &request.bid_request));

        let (cpm, status) = match outcome {
            Ok(Some(result)) => {
                let cpm = result.cpm;
                results.push(result);
                (Some(cpm), "filled")
            }
            Ok(None) => (None, "no_fill"),
            Err(e) => {
                warn!(url = %request.url, bid_id = %request.bid_request.bid_id, error = %e, "saambaa request failed");
                let status = match e {
                    AdapterError::MissingBid { .. } => "missing_bid",
                    AdapterError::Timeout { .. } => "timeout",
                    _ => "error",
                };
                (None, status)
            }
        };

        log.add_call(EndpointCallLog {
            bid_id: request.bid_request.bid_id.clone(),
            media_type: request.media_type,
            url: request.url.clone(),
            cpm,
            status: status.to_string(),
            elapsed_ms: call.elapsed_ms,
        });
    }

    match serde_json::to_string(&log) {
        Ok(summary) => info!(auction_log = %summary, "saambaa cycle finished"),
        Err(e) => warn!(error = %e, "unable to serialize auction log"),
    }

    CycleOutcome { results, log }
}
