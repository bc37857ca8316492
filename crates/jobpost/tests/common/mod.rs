//! Shared test utilities for jobpost integration tests.
//!
//! - `ScriptedApi`: in-memory [`jobpost::JobsApi`] that records every call
//! - `RecordingPreviews`: preview provider counting create/release
//! - builders for form input and stored jobs

pub mod builders;
pub mod harness;

pub use builders::*;
pub use harness::*;
