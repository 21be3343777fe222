//! # reef-core
//!
//! Domain primitives for the Reef compute marketplace.
//!
//! This crate provides:
//!
//! - [`Principal`] — Authenticated identity for providers, clients, and the owner
//! - [`Score`] — Validated job rating in `[1, 100]`
//! - [`Reputation`] — Running-average trust scoring for providers

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod error;
pub mod principal;
pub mod reputation;
pub mod score;

pub use error::CoreError;
pub use principal::Principal;
pub use reputation::Reputation;
pub use score::Score;
