use axum::extract::Query;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::{routing::post, Json, Router};
use rand::Rng;
use serde::Deserialize;
use tokio::net::TcpListener;
use tokio::time::{sleep, Duration};
use tracing::info;

use crate::openrtb::request::OutboundAdRequest;
use crate::openrtb::response::{Bid, BidResponse, SeatBid};

/// 约定：pubid 为该值时返回 204（无填充）
pub const NO_FILL_PUBID: &str = "nofill";

#[derive(Deserialize, Debug)]
pub struct EndpointQuery {
    #[serde(default)]
    pub pubid: String,
}

/// 模拟 saambaa endpoint 的竞价响应
/// 只对第一条 imp 出价，价格为底价乘以随机系数；视频 imp 交替返回内联 VAST 和 VAST 地址。
async fn handle_bid(Query(query): Query<EndpointQuery>, Json(request): Json<OutboundAdRequest>) -> Response {
    info!(
        "Mock endpoint received request: id={}, pubid={}, imp_count={}",
        request.id,
        query.pubid,
        request.imp.len()
    );

    // 模拟处理延迟
    let delay_ms = rand::thread_rng().gen_range(5..30);
    sleep(Duration::from_millis(delay_ms)).await;

    let Some(imp) = request.imp.first() else {
        return StatusCode::NO_CONTENT.into_response();
    };
    if query.pubid == NO_FILL_PUBID {
        return StatusCode::NO_CONTENT.into_response();
    }

    let multiplier = if imp.video.is_some() {
        rand::thread_rng().gen_range(1.0..2.5)
    } else {
        rand::thread_rng().gen_range(1.0..2.0)
    };
    let price = imp.bidfloor * multiplier;
    let bid_id = format!("bid-{}-{}", request.id, imp.id);

    let mut bid = Bid {
        id: Some(bid_id.clone()),
        impid: Some(imp.id.clone()),
        price,
        crid: Some(format!("crid-{}", query.pubid)),
        adomain: Some(vec!["mock-advertiser.example".to_string()]),
        ..Bid::default()
    };

    if imp.video.is_some() {
        let (w, h) = imp.video_size();
        bid.w = w.and_then(|w| u32::try_from(w).ok());
        bid.h = h.and_then(|h| u32::try_from(h).ok());
        if rand::thread_rng().gen_bool(0.5) {
            bid.adm = Some(format!(
                "<VAST version=\"3.0\"><Ad id=\"{bid_id}\"><InLine><AdSystem>mock</AdSystem></InLine></Ad></VAST>"
            ));
        } else {
            bid.nurl = Some(format!("http://mock-endpoint.local/vast?bid={bid_id}"));
        }
    } else if let Some(banner) = &imp.banner {
        bid.w = banner.w;
        bid.h = banner.h;
        bid.ttl = Some(300);
        bid.adm = Some(format!(
            "<html><body>Mock saambaa banner<img src=\"http://mock-endpoint.local/imp?bid={bid_id}\" style=\"display:none;\" /></body></html>"
        ));
    }

    Json(BidResponse {
        id: Some(request.id.clone()),
        cur: Some("USD".to_string()),
        seatbid: vec![SeatBid { seat: Some("mock".to_string()), bid: vec![bid] }],
    })
    .into_response()
}

pub fn router() -> Router {
    Router::new().route("/xp/get", post(handle_bid))
}

pub async fn serve(listener: TcpListener) -> std::io::Result<()> {
    if let Ok(addr) = listener.local_addr() {
        info!("Mock saambaa endpoint running at http://{}", addr);
    }
    axum::serve(listener, router()).await
}

/// mock endpoint 对应的 endpoint 前缀
pub fn endpoint_base(port: u16) -> String {
    format!("http://127.0.0.1:{}/xp/get?pubid=", port)
}
