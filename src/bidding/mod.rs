pub mod endpoint_client;
pub mod engine;

pub use endpoint_client::{EndpointCall, EndpointClient};
pub use engine::{run_cycle, CycleOutcome};
