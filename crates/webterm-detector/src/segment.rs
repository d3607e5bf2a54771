//! Display segmentation of transcript lines.
//!
//! Nothing here changes stored lines; renderers use it to style the prompt,
//! the command name and directory listings differently.

use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    static ref LISTING_ENTRY: Regex =
        Regex::new(r"^(?P<perms>[dl-][rwxsStT-]{9}[.+@]?)(?P<rest>\s.*)?$").unwrap();
    static ref LISTING_TOTAL: Regex = Regex::new(r"^total\s+(?P<blocks>\d+)").unwrap();
}

/// A prompt-prefixed line split for display.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PromptSegments<'a> {
    /// Prompt text including the separating whitespace
    pub prompt: &'a str,
    /// First token after the prompt
    pub command: &'a str,
    /// Everything after the first space following the command
    pub rest: &'a str,
}

/// Split `line` into prompt, command name and remainder.
///
/// Returns `None` unless `line` starts with `prompt` (trailing whitespace of
/// the prompt is not required). The command is delimited by the first space.
///
/// ```
/// use webterm_detector::split_prompt_line;
///
/// let s = split_prompt_line("user@host:~$ git log -n 3", "user@host:~$ ").unwrap();
/// assert_eq!((s.prompt, s.command, s.rest), ("user@host:~$ ", "git", "log -n 3"));
/// ```
pub fn split_prompt_line<'a>(line: &'a str, prompt: &str) -> Option<PromptSegments<'a>> {
    let prompt = prompt.trim_end();
    if prompt.is_empty() || !line.starts_with(prompt) {
        return None;
    }

    let body = line[prompt.len()..].trim_start();
    let prompt_len = line.len() - body.len();
    let (command, rest) = body.split_once(' ').unwrap_or((body, ""));

    Some(PromptSegments {
        prompt: &line[..prompt_len],
        command,
        rest,
    })
}

/// One row of `ls -l` style output.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListingLine<'a> {
    /// `total <n>` header
    Total {
        /// Block count
        blocks: &'a str,
    },
    /// File entry
    Entry {
        /// Type and permission bits, e.g. `drwxr-xr-x`
        permissions: &'a str,
        /// Links, owner, size, date and name
        rest: &'a str,
    },
}

/// Recognize a directory-listing row.
pub fn parse_listing_line(line: &str) -> Option<ListingLine<'_>> {
    if let Some(caps) = LISTING_TOTAL.captures(line) {
        return Some(ListingLine::Total {
            blocks: caps.name("blocks")?.as_str(),
        });
    }

    let caps = LISTING_ENTRY.captures(line)?;
    Some(ListingLine::Entry {
        permissions: caps.name("perms")?.as_str(),
        rest: caps.name("rest").map_or("", |m| m.as_str()),
    })
}

/// Whether any row of `text` is a directory-listing row.
pub fn is_listing(text: &str) -> bool {
    text.lines().any(|line| parse_listing_line(line).is_some())
}
