//! Liftlog Domain Layer
//!
//! Core data model shared by every other crate in the workspace.
//!
//! ## Key Concepts
//!
//! - **Set**: one weight/rep combination extracted from a line of workout notes
//! - **Assisted reps**: reps completed with help, written as `8(2)` in raw notes
//! - **Completion request**: the provider-neutral system/user message pair
//!
//! ## Architecture
//!
//! - Plain data types with serde derives for the HTTP surface
//! - Trait definitions for the external inference service
//! - Infrastructure implementations live in other crates

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod set;
pub mod traits;

// Re-exports for convenience
pub use set::{ParseRequest, ParseResponse, ParsedSet};
pub use traits::{CompletionRequest, LlmProvider};
