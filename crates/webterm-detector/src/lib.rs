//! # webterm-detector
//!
//! Prompt detection and line classification for the webterm client.
//!
//! This crate provides:
//! - Prompt strategies for common shell conventions (bracketed, colon-path, Windows)
//! - Priority-ordered prompt pipeline with user-defined strategies
//! - Chunk classification into transcript lines with prompt-echo suppression
//! - Display segmentation (prompt / command name / arguments, listing rows)
//!
//! ## Architecture
//!
//! This is Layer 1 in the architecture - it depends only on webterm-core
//! and is pure: no IO, no clocks beyond line timestamps.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod classifier;
pub mod detection;
pub mod segment;
pub mod strategies;

// Re-export commonly used types
pub use classifier::{strip_control_sequences, ChunkOutcome, LineClassifier};
pub use detection::{normalize_prompt, PromptMatch, PromptPipeline, PromptStrategy};
pub use segment::{is_listing, parse_listing_line, split_prompt_line, ListingLine, PromptSegments};
pub use strategies::{
    BracketedPromptStrategy, ColonPathPromptStrategy, PatternPromptStrategy,
    WindowsPromptStrategy,
};
