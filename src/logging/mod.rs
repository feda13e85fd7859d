pub mod auction_log;

pub use auction_log::{AuctionLog, EndpointCallLog};
