//! Service layer for the crawler application.
//!
//! This module contains the business logic for:
//! - Page fetching (`Fetcher`, `HttpFetcher`)
//! - Request pacing (`RateLimiter`)
//! - Markup extraction (`Schemas`)
//! - Record normalization (`normalize`)
//! - Asset mirroring (`AssetMirror`)

pub mod assets;
pub mod extract;
pub mod fetch;
pub mod limiter;
pub mod normalize;

pub use assets::AssetMirror;
pub use extract::Schemas;
pub use fetch::{FetchKind, Fetcher, HttpFetcher, Payload};
pub use limiter::RateLimiter;
