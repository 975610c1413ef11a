//! Utility modules: backoff and cancellation-aware waiting.

pub mod backoff;
pub mod cancel;
