//! potentia-web — Axum HTTP surface for the potency predictor.

pub mod handlers;
pub mod router;
pub mod state;
