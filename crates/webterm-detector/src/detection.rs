//! Core prompt detection types and traits.

use std::sync::Arc;

use regex::Regex;
use tracing::debug;

use webterm_core::{DetectionSettings, Result};

use crate::strategies::{
    BracketedPromptStrategy, ColonPathPromptStrategy, PatternPromptStrategy,
    WindowsPromptStrategy,
};

/// A prompt found in a chunk of shell output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PromptMatch {
    /// Prompt text, normalized with a single trailing space
    pub prompt: String,
    /// Byte offset of the prompt within the searched text
    pub start: usize,
    /// Byte offset just past the raw prompt match
    pub end: usize,
    /// Name of the strategy that recognized it
    pub strategy: String,
}

/// Normalize a captured prompt: trailing whitespace collapsed to one space.
///
/// ```
/// use webterm_detector::normalize_prompt;
///
/// assert_eq!(normalize_prompt("[root@server1 ~]#"), "[root@server1 ~]# ");
/// assert_eq!(normalize_prompt("user@host:~$   "), "user@host:~$ ");
/// ```
pub fn normalize_prompt(raw: &str) -> String {
    format!("{} ", raw.trim_end())
}

/// Find the last match of `regex` in `text`.
///
/// Uses the `prompt` capture group when present, otherwise the whole match.
/// The last occurrence wins because shells print the fresh prompt after the
/// output of the previous command.
pub(crate) fn last_prompt_match(regex: &Regex, text: &str, strategy: &str) -> Option<PromptMatch> {
    let caps = regex.captures_iter(text).last()?;
    let m = caps.name("prompt").or_else(|| caps.get(0))?;
    if m.as_str().trim().is_empty() {
        return None;
    }
    Some(PromptMatch {
        prompt: normalize_prompt(m.as_str()),
        start: m.start(),
        end: m.end(),
        strategy: strategy.to_string(),
    })
}

/// Trait for shell prompt conventions.
pub trait PromptStrategy: Send + Sync {
    /// Strategy name for debugging/logging.
    fn name(&self) -> &str;

    /// Priority (higher = evaluated first).
    ///
    /// Built-in priorities:
    /// - 100: bracketed `[user@host path]#`
    /// - 90: colon-path `user@host:path$`
    /// - 10: Windows `C:\path>`
    fn priority(&self) -> u32;

    /// Find the prompt in a chunk of sanitized output.
    fn detect(&self, text: &str) -> Option<PromptMatch>;

    /// Whether this strategy is enabled.
    fn enabled(&self) -> bool {
        true
    }
}

/// Prompt pipeline that evaluates strategies in priority order.
///
/// The prompt that starts latest in the text wins. Strategies matching at
/// the same offset are resolved by priority.
#[derive(Clone)]
pub struct PromptPipeline {
    strategies: Vec<Arc<dyn PromptStrategy>>,
}

impl PromptPipeline {
    /// Create an empty pipeline.
    pub fn new() -> Self {
        Self {
            strategies: Vec::new(),
        }
    }

    /// Pipeline with the built-in strategies.
    pub fn with_defaults() -> Self {
        let mut pipeline = Self::new();
        pipeline.add_strategy(Arc::new(BracketedPromptStrategy::new()));
        pipeline.add_strategy(Arc::new(ColonPathPromptStrategy::new()));
        pipeline.add_strategy(Arc::new(WindowsPromptStrategy::new()));
        pipeline
    }

    /// Built-in strategies plus the configured custom ones.
    pub fn from_settings(settings: &DetectionSettings) -> Result<Self> {
        let mut pipeline = Self::with_defaults();
        for custom in &settings.custom_prompts {
            pipeline.add_strategy(Arc::new(PatternPromptStrategy::from_config(custom)?));
        }
        Ok(pipeline)
    }

    /// Add a strategy to the pipeline.
    pub fn add_strategy(&mut self, strategy: Arc<dyn PromptStrategy>) {
        self.strategies.push(strategy);
        // Stable sort keeps insertion order among equal priorities
        self.strategies
            .sort_by_key(|s| std::cmp::Reverse(s.priority()));
    }

    /// Names of the strategies in evaluation order.
    pub fn strategy_names(&self) -> Vec<&str> {
        self.strategies.iter().map(|s| s.name()).collect()
    }

    /// Find the last prompt in `text` across all enabled strategies.
    pub fn detect(&self, text: &str) -> Option<PromptMatch> {
        let mut best: Option<PromptMatch> = None;
        for strategy in self.strategies.iter().filter(|s| s.enabled()) {
            let Some(found) = strategy.detect(text) else {
                continue;
            };
            // Strictly later only, so higher priority keeps ties
            if best.as_ref().map_or(true, |b| found.start > b.start) {
                best = Some(found);
            }
        }

        if let Some(found) = &best {
            debug!(strategy = %found.strategy, prompt = %found.prompt, "prompt detected");
        }
        best
    }
}

impl Default for PromptPipeline {
    fn default() -> Self {
        Self::with_defaults()
    }
}

impl std::fmt::Debug for PromptPipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PromptPipeline")
            .field("strategies", &self.strategy_names())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct FixedStrategy {
        name: &'static str,
        priority: u32,
        prompt: Option<&'static str>,
        enabled: bool,
    }

    impl PromptStrategy for FixedStrategy {
        fn name(&self) -> &str {
            self.name
        }

        fn priority(&self) -> u32 {
            self.priority
        }

        fn detect(&self, _text: &str) -> Option<PromptMatch> {
            self.prompt.map(|p| PromptMatch {
                prompt: normalize_prompt(p),
                start: 0,
                end: p.len(),
                strategy: self.name.to_string(),
            })
        }

        fn enabled(&self) -> bool {
            self.enabled
        }
    }

    fn fixed(name: &'static str, priority: u32, prompt: Option<&'static str>) -> Arc<FixedStrategy> {
        Arc::new(FixedStrategy {
            name,
            priority,
            prompt,
            enabled: true,
        })
    }

    #[test]
    fn test_normalize_prompt() {
        assert_eq!(normalize_prompt("$"), "$ ");
        assert_eq!(normalize_prompt("$ \t"), "$ ");
    }

    #[test]
    fn test_pipeline_priority_ordering() {
        let mut pipeline = PromptPipeline::new();
        pipeline.add_strategy(fixed("low", 10, None));
        pipeline.add_strategy(fixed("high", 100, None));
        pipeline.add_strategy(fixed("medium", 50, None));

        assert_eq!(pipeline.strategy_names(), vec!["high", "medium", "low"]);
    }

    #[test]
    fn test_priority_breaks_ties_at_same_offset() {
        let mut pipeline = PromptPipeline::new();
        pipeline.add_strategy(fixed("second", 10, Some("b>")));
        pipeline.add_strategy(fixed("first", 20, Some("a>")));

        let found = pipeline.detect("anything").unwrap();
        assert_eq!(found.strategy, "first");
        assert_eq!(found.prompt, "a> ");
    }

    #[test]
    fn test_latest_prompt_beats_priority() {
        let pipeline = PromptPipeline::with_defaults();
        let found = pipeline
            .detect("[root@centos ~]# exit\nlogout\nubuntu@box:~$ ")
            .unwrap();
        assert_eq!(found.strategy, "colon_path");
        assert_eq!(found.prompt, "ubuntu@box:~$ ");

        let found = pipeline
            .detect("ubuntu@box:~$ sudo -i\n[root@box ~]# ")
            .unwrap();
        assert_eq!(found.prompt, "[root@box ~]# ");
    }

    #[test]
    fn test_disabled_strategy_skipped() {
        let mut pipeline = PromptPipeline::new();
        pipeline.add_strategy(Arc::new(FixedStrategy {
            name: "off",
            priority: 100,
            prompt: Some("x>"),
            enabled: false,
        }));
        pipeline.add_strategy(fixed("on", 1, Some("y>")));

        assert_eq!(pipeline.detect("").unwrap().strategy, "on");
    }

    #[test]
    fn test_no_match() {
        let pipeline = PromptPipeline::with_defaults();
        assert_eq!(pipeline.detect("total 0\nfile.txt"), None);
    }

    #[test]
    fn test_default_strategy_order() {
        let pipeline = PromptPipeline::with_defaults();
        assert_eq!(
            pipeline.strategy_names(),
            vec!["bracketed", "colon_path", "windows"]
        );
    }

    #[test]
    fn test_from_settings_adds_custom() {
        let settings = DetectionSettings {
            custom_prompts: vec![webterm_core::CustomPromptConfig {
                name: "percent".to_string(),
                pattern: r"(?m)^(?P<prompt>\w+%)".to_string(),
                priority: 95,
            }],
        };
        let pipeline = PromptPipeline::from_settings(&settings).unwrap();
        assert_eq!(
            pipeline.strategy_names(),
            vec!["bracketed", "percent", "colon_path", "windows"]
        );
    }
}
