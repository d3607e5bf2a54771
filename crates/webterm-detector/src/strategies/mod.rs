//! Built-in and configurable prompt strategies.

pub mod bracketed;
pub mod colon_path;
pub mod pattern;
pub mod windows;

pub use bracketed::BracketedPromptStrategy;
pub use colon_path::ColonPathPromptStrategy;
pub use pattern::PatternPromptStrategy;
pub use windows::WindowsPromptStrategy;
