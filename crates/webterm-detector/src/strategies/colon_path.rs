//! Colon-path prompts as printed by Debian/Ubuntu bash: `user@host:path$`.

use lazy_static::lazy_static;
use regex::Regex;

use crate::detection::{last_prompt_match, PromptMatch, PromptStrategy};

lazy_static! {
    static ref COLON_PATH_PROMPT: Regex =
        Regex::new(r"(?m)^(?P<prompt>[A-Za-z_][\w.-]*@[\w.-]+:[^\s#$]*[#$])(?:[ \t]|$)").unwrap();
}

/// Colon-path prompt strategy.
pub struct ColonPathPromptStrategy;

impl ColonPathPromptStrategy {
    /// Create a new colon-path prompt strategy.
    pub fn new() -> Self {
        Self
    }
}

impl Default for ColonPathPromptStrategy {
    fn default() -> Self {
        Self::new()
    }
}

impl PromptStrategy for ColonPathPromptStrategy {
    fn name(&self) -> &str {
        "colon_path"
    }

    fn priority(&self) -> u32 {
        90
    }

    fn detect(&self, text: &str) -> Option<PromptMatch> {
        last_prompt_match(&COLON_PATH_PROMPT, text, self.name())
    }
}
