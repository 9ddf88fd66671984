//! Shared types for the supportdesk workspace: the error taxonomy, the
//! configuration model, and provider-agnostic chat message types.

pub mod chat;
pub mod config;
pub mod error;
