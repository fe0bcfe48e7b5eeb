//! DeciMate: activity recommendations from a generative-language model,
//! with locally stored preferences and decision history.

pub mod cli;
pub mod config;
pub mod decision;
pub mod error;
pub mod llm;
pub mod preferences;
pub mod store;
