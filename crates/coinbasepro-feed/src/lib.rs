/*
[INPUT]:  Crate modules and public type definitions
[OUTPUT]: Public Coinbase Pro feed check crate surface
[POS]:    Crate root - module wiring
[UPDATE]: When public modules or exports change
*/

pub mod error;
pub mod scenario;
pub mod types;
pub mod validate;
pub mod ws;

pub use error::{FeedError, Result};

// Re-export commonly used types from scenario
pub use scenario::{
    FollowUp,
    RunOptions,
    Scenario,
    ScenarioKind,
    ScenarioReport,
    run_and_close,
    run_on_transport,
    run_scenario,
};

// Re-export all types
pub use types::*;

pub use validate::{MessageField, ensure_properties};

// Re-export commonly used types from ws
pub use ws::{
    FeedConnection,
    FeedTransport,
    SANDBOX_FEED_URL,
    next_message,
    start_subscribe,
};
