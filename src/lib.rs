//! roci-fallback: retry and fallback across a chain of model providers
//!
//! Wraps an ordered list of interchangeable [`ModelProvider`]s in a
//! [`FallbackModel`] that is itself a `ModelProvider`. Transient failures are
//! retried with jittered exponential backoff, rate limits move on to the next
//! model, fatal errors are returned unchanged, and exhausting the chain yields
//! a single error listing every model's failure.
//!
//! # Quick Start
//!
//! ```no_run
//! use std::sync::Arc;
//! use roci_fallback::prelude::*;
//!
//! # async fn example(
//! #     primary: Arc<dyn ModelProvider>,
//! #     backup: Arc<dyn ModelProvider>,
//! # ) -> roci_fallback::error::Result<()> {
//! let model = FallbackModel::new(
//!     vec![primary, backup],
//!     FallbackOptions::builder().max_retries_per_model(1).build(),
//! )?;
//!
//! let request = ProviderRequest::new(vec![ModelMessage::user("Hello!")]);
//! let response = model.generate_text(&request).await?;
//! println!("{}", response.text);
//! # Ok(())
//! # }
//! ```
//!
//! [`ModelProvider`]: provider::ModelProvider
//! [`FallbackModel`]: fallback::FallbackModel

pub mod config;
pub mod error;
pub mod fallback;
pub mod models;
pub mod prelude;
pub mod provider;
pub mod types;
pub mod util;
