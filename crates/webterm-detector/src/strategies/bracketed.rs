//! Bracketed prompts as printed by RHEL/CentOS bash: `[user@host path]#`.

use lazy_static::lazy_static;
use regex::Regex;

use crate::detection::{last_prompt_match, PromptMatch, PromptStrategy};

lazy_static! {
    static ref BRACKETED_PROMPT: Regex = Regex::new(
        r"(?m)^(?P<prompt>\[[^\[\]\s@]+@[^\[\]\s]+(?:[ \t]+[^\[\]\n]*)?\][#$])(?:[ \t]|$)"
    )
    .unwrap();
}

/// Bracketed prompt strategy.
pub struct BracketedPromptStrategy;

impl BracketedPromptStrategy {
    /// Create a new bracketed prompt strategy.
    pub fn new() -> Self {
        Self
    }
}

impl Default for BracketedPromptStrategy {
    fn default() -> Self {
        Self::new()
    }
}

impl PromptStrategy for BracketedPromptStrategy {
    fn name(&self) -> &str {
        "bracketed"
    }

    fn priority(&self) -> u32 {
        100
    }

    fn detect(&self, text: &str) -> Option<PromptMatch> {
        last_prompt_match(&BRACKETED_PROMPT, text, self.name())
    }
}
