pub mod adapter;
pub mod bidding;
pub mod config;
pub mod error;
pub mod logging;
pub mod mock_dsp;
pub mod model;
pub mod openrtb;

pub use adapter::{SaambaaAdapter, ServerRequest, ServerResponse, BIDDER_CODE};
pub use error::{AdapterError, AdapterResult};
