//! The routing and escalation core.
//!
//! Owns per-session conversational state, classifies each incoming
//! message into exactly one route, and dispatches to the escalation
//! dialogue, document Q&A, record lookup, or the general completion
//! fallback — merging sub-results into a single reply string.

pub mod classify;
pub mod engine;
pub mod escalation;
pub mod keywords;
pub mod session;
pub mod store;

pub use classify::Route;
pub use engine::Router;
pub use session::{PendingStage, Session};
pub use store::SessionStore;
