//! Liftlog Extractor
//!
//! Converts free-form workout notes into validated set records using a hosted LLM.
//!
//! # Architecture
//!
//! ```text
//! ParseRequest → blank check → PromptBuilder → LlmProvider → normalize → ParseResponse
//! ```
//!
//! # Key Features
//!
//! - **Blank short-circuit**: whitespace-only input never reaches the model
//! - **Injectable prompt**: the extraction contract lives in configuration
//! - **Lenient decoding**: strict JSON, then fence-stripped JSON, then empty
//! - **Per-element validation**: a bad set is dropped, the batch survives
//!
//! # Example Usage
//!
//! ```no_run
//! use liftlog_domain::ParseRequest;
//! use liftlog_extractor::{Extractor, ExtractorConfig};
//! use liftlog_llm::MockProvider;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let llm = MockProvider::new(r#"{"sets": []}"#);
//! let extractor = Extractor::new(llm, ExtractorConfig::default())?;
//!
//! let response = extractor.parse(ParseRequest::new("DB Bench 50x8(2)")).await?;
//! println!("Extracted {} sets", response.sets.len());
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]

mod config;
mod error;
mod extractor;
pub mod parser;
mod prompt;


pub use config::ExtractorConfig;
pub use error::ExtractorError;
pub use extractor::Extractor;
pub use parser::{normalize, Decoded, EmptyReason, Normalized, Rung};
pub use prompt::{PromptBuilder, DEFAULT_SYSTEM_PROMPT, EXTRACTION_TEMPERATURE};
