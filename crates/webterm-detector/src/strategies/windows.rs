//! Windows prompts: `C:\path>` (cmd.exe) and `PS C:\path>` (PowerShell).

use lazy_static::lazy_static;
use regex::Regex;

use crate::detection::{last_prompt_match, PromptMatch, PromptStrategy};

lazy_static! {
    static ref WINDOWS_PROMPT: Regex =
        Regex::new(r#"(?m)^(?P<prompt>(?:PS )?[A-Za-z]:\\[^<>|:*?"\n]*>)(?:[ \t]|$)"#).unwrap();
}

/// Windows prompt strategy.
pub struct WindowsPromptStrategy;

impl WindowsPromptStrategy {
    /// Create a new Windows prompt strategy.
    pub fn new() -> Self {
        Self
    }
}

impl Default for WindowsPromptStrategy {
    fn default() -> Self {
        Self::new()
    }
}

impl PromptStrategy for WindowsPromptStrategy {
    fn name(&self) -> &str {
        "windows"
    }

    fn priority(&self) -> u32 {
        10
    }

    fn detect(&self, text: &str) -> Option<PromptMatch> {
        last_prompt_match(&WINDOWS_PROMPT, text, self.name())
    }
}
