//! Rule matchers
//!
//! Matchers are a closed set of kinds rather than arbitrary code. All of them
//! sit on the `regex` crate, which matches in linear time, so a hostile
//! custom pattern cannot trigger catastrophic backtracking. Compiled program
//! size is capped as well.

use regex::{Regex, RegexBuilder};
use std::fmt;

/// Upper bound on the compiled size of a single pattern
const PATTERN_SIZE_LIMIT: usize = 2 * 1024 * 1024;

/// Half-open byte span produced by a matcher
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Span {
    pub start: usize,
    pub end: usize,
}

/// A pattern together with its compilation outcome
///
/// User-supplied patterns are allowed to fail compilation; the failure is
/// reported each time the owning rule runs instead of when it is registered.
#[derive(Clone)]
pub struct CompiledPattern {
    source: String,
    regex: Result<Regex, String>,
}

impl CompiledPattern {
    /// Compile `source`, keeping the error if it is malformed
    pub fn compile(source: impl Into<String>) -> Self {
        let source = source.into();
        let regex = build_regex(&source).map_err(|e| e.to_string());
        Self { source, regex }
    }

    /// Compile `source`, failing immediately if it is malformed
    pub fn compile_strict(source: impl Into<String>) -> Result<Self, regex::Error> {
        let source = source.into();
        let regex = build_regex(&source)?;
        Ok(Self {
            source,
            regex: Ok(regex),
        })
    }

    /// Compilation error, if any
    pub fn error(&self) -> Option<&str> {
        self.regex.as_ref().err().map(String::as_str)
    }

    fn regex(&self) -> Result<&Regex, String> {
        self.regex
            .as_ref()
            .map_err(|e| format!("pattern failed to compile: {e}"))
    }
}

impl fmt::Debug for CompiledPattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CompiledPattern")
            .field("source", &self.source)
            .field("valid", &self.regex.is_ok())
            .finish()
    }
}

fn build_regex(source: &str) -> Result<Regex, regex::Error> {
    RegexBuilder::new(source)
        .size_limit(PATTERN_SIZE_LIMIT)
        .build()
}

/// Matcher kinds
#[derive(Debug, Clone)]
pub enum Matcher {
    /// Fixed pattern; the span is capture group `group` (0 = whole match)
    Pattern {
        pattern: CompiledPattern,
        group: usize,
    },
    /// `keyword <sep> value` template; the span covers the value only
    Template { pattern: CompiledPattern },
    /// Pattern candidates filtered by a pure predicate, delimited by
    /// non-word characters on both sides
    Predicate {
        pattern: CompiledPattern,
        accept: fn(&str) -> bool,
    },
}

impl Matcher {
    /// Whole-match pattern
    pub fn pattern(source: &str) -> Result<Self, regex::Error> {
        Ok(Self::Pattern {
            pattern: CompiledPattern::compile_strict(source)?,
            group: 0,
        })
    }

    /// Pattern whose reported span is capture group `group`
    pub fn pattern_group(source: &str, group: usize) -> Result<Self, regex::Error> {
        Ok(Self::Pattern {
            pattern: CompiledPattern::compile_strict(source)?,
            group,
        })
    }

    /// Whole-match pattern from user input; compile errors surface at match time
    pub fn user_pattern(source: &str) -> Self {
        Self::Pattern {
            pattern: CompiledPattern::compile(source),
            group: 0,
        }
    }

    /// Case-insensitive `keyword [:=] value` template
    ///
    /// `keywords` and `value` are regex fragments. An optional opening quote
    /// before the value is skipped.
    pub fn template(keywords: &[&str], value: &str) -> Result<Self, regex::Error> {
        let source = format!(
            r#"(?i)(?:{})\s*[:=]\s*["']?({})"#,
            keywords.join("|"),
            value
        );
        Ok(Self::Template {
            pattern: CompiledPattern::compile_strict(source)?,
        })
    }

    /// Candidates from `source` kept only when `accept` returns true
    pub fn predicate(source: &str, accept: fn(&str) -> bool) -> Result<Self, regex::Error> {
        Ok(Self::Predicate {
            pattern: CompiledPattern::compile_strict(source)?,
            accept,
        })
    }

    /// Underlying compiled pattern
    pub fn compiled(&self) -> &CompiledPattern {
        match self {
            Self::Pattern { pattern, .. }
            | Self::Template { pattern, .. }
            | Self::Predicate { pattern, .. } => pattern,
        }
    }

    /// Short name of the matcher kind
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Pattern { .. } => "pattern",
            Self::Template { .. } => "template",
            Self::Predicate { .. } => "predicate",
        }
    }

    /// Find candidate spans in `text`
    ///
    /// Returns sorted, deduplicated, non-empty spans. Fails if the pattern did
    /// not compile or more than `budget` candidates are produced.
    pub fn find(&self, text: &str, budget: usize) -> Result<Vec<Span>, String> {
        let mut spans = Vec::new();
        let mut push = |start: usize, end: usize| -> Result<(), String> {
            if start == end {
                return Ok(());
            }
            if spans.len() >= budget {
                return Err(format!("match budget of {budget} candidates exceeded"));
            }
            spans.push(Span { start, end });
            Ok(())
        };

        match self {
            Self::Pattern { pattern, group } => {
                for caps in pattern.regex()?.captures_iter(text) {
                    if let Some(m) = caps.get(*group) {
                        push(m.start(), m.end())?;
                    }
                }
            }
            Self::Template { pattern, .. } => {
                for caps in pattern.regex()?.captures_iter(text) {
                    if let Some(m) = caps.get(1) {
                        push(m.start(), m.end())?;
                    }
                }
            }
            Self::Predicate { pattern, accept } => {
                for m in pattern.regex()?.find_iter(text) {
                    if is_delimited(text, m.start(), m.end()) && accept(m.as_str()) {
                        push(m.start(), m.end())?;
                    }
                }
            }
        }

        spans.sort();
        spans.dedup();
        Ok(spans)
    }
}

fn is_word_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_'
}

/// True if the span is not glued to word characters on either side
fn is_delimited(text: &str, start: usize, end: usize) -> bool {
    let before = text[..start].chars().next_back();
    let after = text[end..].chars().next();
    !before.is_some_and(is_word_char) && !after.is_some_and(is_word_char)
}
