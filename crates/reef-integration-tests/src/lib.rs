//! Integration test crate for the Reef marketplace ledger.
//!
//! This crate exists solely to run integration tests that span multiple Reef crates.
//! It has no public API - all functionality is in the test modules.

#![forbid(unsafe_code)]
