//! Testing utilities for code that inspects schema state.
//!
//! Enabled for this crate's own tests and, for downstream crates, through the
//! `testing` feature.

pub mod mock_driver;

pub use mock_driver::{MockResponse, MockVersionDriver};
