//! Local preferences: personality mode, custom instructions, toggles and
//! nickname, each persisted under its own key.
//!
//! Reads never fail: a missing or undecodable value yields the field's
//! default. Writes report success as a `bool` and log failures.

pub mod model;
pub mod store;

pub use model::{PersonalityMode, Preferences, keys};
pub use store::PreferenceStore;
