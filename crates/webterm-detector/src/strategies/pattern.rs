//! User-defined prompt strategy backed by a configured regex.

use regex::Regex;

use webterm_core::{CustomPromptConfig, Error, Result};

use crate::detection::{last_prompt_match, PromptMatch, PromptStrategy};

/// Prompt strategy built from configuration.
#[derive(Debug)]
pub struct PatternPromptStrategy {
    name: String,
    priority: u32,
    regex: Regex,
}

impl PatternPromptStrategy {
    /// Create a strategy from a name, priority and regex source.
    pub fn new(name: impl Into<String>, priority: u32, pattern: &str) -> Result<Self> {
        let name = name.into();
        let regex = Regex::new(pattern)
            .map_err(|e| Error::Config(format!("Invalid regex pattern '{name}': {e}")))?;
        Ok(Self {
            name,
            priority,
            regex,
        })
    }

    /// Create a strategy from a `detection.custom_prompts` entry.
    pub fn from_config(config: &CustomPromptConfig) -> Result<Self> {
        Self::new(config.name.clone(), config.priority, &config.pattern)
    }
}

impl PromptStrategy for PatternPromptStrategy {
    fn name(&self) -> &str {
        &self.name
    }

    fn priority(&self) -> u32 {
        self.priority
    }

    fn detect(&self, text: &str) -> Option<PromptMatch> {
        last_prompt_match(&self.regex, text, &self.name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_named_group() {
        let strategy =
            PatternPromptStrategy::new("fish", 50, r"(?m)^(?P<prompt>\w+@\w+ [^>\n]*>)").unwrap();
        let found = strategy.detect("alice@laptop ~/src> ").unwrap();
        assert_eq!(found.prompt, "alice@laptop ~/src> ");
        assert_eq!(found.strategy, "fish");
    }

    #[test]
    fn test_whole_match_without_group() {
        let strategy = PatternPromptStrategy::new("percent", 50, r"(?m)^\w+%").unwrap();
        assert_eq!(strategy.detect("host%").unwrap().prompt, "host% ");
    }

    #[test]
    fn test_invalid_regex() {
        let err = PatternPromptStrategy::new("bad", 50, "([").unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }

    #[test]
    fn test_from_config() {
        let config = CustomPromptConfig {
            name: "busybox".to_string(),
            pattern: r"(?m)^/[^\s#]*\s?#".to_string(),
            priority: 20,
        };
        let strategy = PatternPromptStrategy::from_config(&config).unwrap();
        assert_eq!(strategy.priority(), 20);
        assert_eq!(strategy.detect("/ #").unwrap().prompt, "/ # ");
    }
}
