//! Decision workflow: prompt building, the recommendation call, and the
//! persisted history of accepted recommendations.
//!
//! One cycle runs `Idle → Requesting → {Succeeded → Appended → Idle} |
//! {Failed → Idle}`; see [`service::DecisionService`].

pub mod client;
pub mod history;
pub mod model;
pub mod prompts;
pub mod quotes;
pub mod service;

pub use client::RecommendationClient;
pub use history::{HistoryManager, HistoryStats};
pub use model::{
    DecisionMode, DecisionRecord, DecisionReply, FileDescriptor, RequestContext, Role, TimeBucket,
};
pub use prompts::DecisionRequestBuilder;
pub use service::{CycleOutcome, CycleState, DecisionService};
