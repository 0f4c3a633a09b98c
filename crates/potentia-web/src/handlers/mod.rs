//! Request handlers.

pub mod potency;
pub mod root;
