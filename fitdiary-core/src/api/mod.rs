//! HTTP boundary to the FitDiary backend.
//!
//! Every call is JSON over HTTP against a single base URL. Authenticated
//! calls carry `Authorization: Bearer <token>`.

mod client;
mod error;
pub(crate) mod wire;

pub use client::{ApiClient, RecommendKind, DEFAULT_TIMEOUT};
pub use error::ApiError;
