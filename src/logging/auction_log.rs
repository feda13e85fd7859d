use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::model::MediaType;

/// **单个竞价周期的汇总日志**
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct AuctionLog {
    pub timestamp: String,             // 记录时间
    pub log_type: String,              // 日志类型，固定 "saambaa_cycle"
    pub bidder_code: String,           // 适配器 bidder code
    pub descriptors: usize,            // host 传入的 descriptor 数
    pub admitted: usize,               // 通过准入校验的数量
    pub request_attempts: usize,       // 实际发出的请求数
    pub status: String,                // "filled" or "no_fill"
    pub best_cpm: f64,                 // 本周期最高出价
    pub endpoint_log: Vec<EndpointCallLog>, // 每个请求的结果
}

/// **单个 endpoint 请求日志**
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct EndpointCallLog {
    pub bid_id: String,
    pub media_type: MediaType,
    pub url: String,
    pub cpm: Option<f64>,
    pub status: String,                // "filled", "no_fill", "missing_bid", "timeout", "error"
    pub elapsed_ms: u128,
}

impl AuctionLog {
    pub fn new(bidder_code: &str, descriptors: usize, admitted: usize) -> Self {
        Self {
            timestamp: Utc::now().to_rfc3339(),
            log_type: "saambaa_cycle".to_string(),
            bidder_code: bidder_code.to_string(),
            descriptors,
            admitted,
            request_attempts: 0,
            status: "no_fill".to_string(), // 默认无填充，有出价时更新
            best_cpm: 0.0,
            endpoint_log: Vec::new(),
        }
    }

    /// **记录一次 endpoint 请求**
    pub fn add_call(&mut self, call: EndpointCallLog) {
        if let Some(cpm) = call.cpm {
            self.status = "filled".to_string();
            if cpm > self.best_cpm {
                self.best_cpm = cpm;
            }
        }
        self.endpoint_log.push(call);
        self.request_attempts += 1;
    }

    pub fn filled(&self) -> usize {
        self.endpoint_log.iter().filter(|call| call.cpm.is_some()).count()
    }
}
