use tracing::debug;

use crate::adapter::BIDDER_CODE;
use crate::model::BidDescriptor;

/// 粗粒度的准入校验，严格的按格式检查在构建请求时再做
pub fn is_bid_request_valid(bid: Option<&BidDescriptor>) -> bool {
    let Some(bid) = bid else {
        return false;
    };
    if bid.bidder != BIDDER_CODE && bid.params.is_none() {
        debug!(bid_id = %bid.bid_id, bidder = %bid.bidder, "rejecting bid without params");
        return false;
    }
    if let Some(params) = &bid.params {
        let empty = |value: &Option<String>| value.as_deref() == Some("");
        if empty(&params.shared.placement) || empty(&params.shared.pubid) {
            debug!(bid_id = %bid.bid_id, "rejecting bid with empty placement or pubid");
            return false;
        }
    }
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use serde_json::json;

    fn bid(value: serde_json::Value) -> BidDescriptor {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn undefined_bid_is_rejected() {
        assert!(!is_bid_request_valid(None));
    }

    #[test]
    fn foreign_bidder_without_params_is_rejected() {
        assert!(!is_bid_request_valid(Some(&bid(json!({ "bidder": "other" })))));
    }

    #[test]
    fn own_bidder_without_params_is_admitted() {
        assert!(is_bid_request_valid(Some(&bid(json!({ "bidder": "saambaa" })))));
    }

    #[test]
    fn empty_placement_or_pubid_is_rejected() {
        let no_placement = bid(json!({ "bidder": "saambaa", "params": { "pubid": "1", "placement": "" } }));
        let no_pubid = bid(json!({ "bidder": "saambaa", "params": { "pubid": "", "placement": "p" } }));
        assert!(!is_bid_request_valid(Some(&no_placement)));
        assert!(!is_bid_request_valid(Some(&no_pubid)));
    }

    #[test]
    fn nested_only_params_are_admitted() {
        let nested = bid(json!({
            "bidder": "saambaa",
            "params": { "video": { "pubid": "1", "placement": "v" } }
        }));
        assert!(is_bid_request_valid(Some(&nested)));
    }

    proptest! {
        #[test]
        fn non_empty_params_are_always_admitted(pubid in "[a-z0-9]{1,12}", placement in "[a-z0-9]{1,12}") {
            let descriptor = bid(json!({
                "bidder": "saambaa",
                "params": { "pubid": pubid, "placement": placement }
            }));
            prop_assert!(is_bid_request_valid(Some(&descriptor)));
        }
    }
}
