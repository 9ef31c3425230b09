//! Declarative smalltalk rules and their compilation into intent matchers.
//!
//! A [`Rule`] lists raw pattern fragments and the positions they may occupy.
//! Compilation turns each rule into one case-insensitive regex:
//!
//! 1. Each pattern is wrapped in a non-capturing group and gets a `\b`
//!    on each side that begins or ends with a word character, so `hi`
//!    never matches inside `this` or `chip`.
//! 2. Each bounded pattern is repeated once per declared position:
//!    `alone` becomes `^p$`, `beginning` becomes `^p`, `ending` becomes `p$`.
//!    Unknown positions contribute nothing.
//! 3. All variants are joined with `|` in declaration order.

use std::fmt;
use std::sync::LazyLock;

use regex::{Regex, RegexBuilder};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::{Result, SmallTalksError};

static STARTS_WITH_WORD: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\w").expect("Invalid regex"));

static ENDS_WITH_WORD: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\w$").expect("Invalid regex"));

/// Where in the input a pattern is allowed to match.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum PositionKind {
    /// The pattern must be the entire input.
    Alone,
    /// The pattern must start the input.
    Beginning,
    /// The pattern must end the input.
    Ending,
    /// Any other tag; ignored at compile time.
    Unknown(String),
}

impl PositionKind {
    /// Wraps a bounded pattern with this position's anchors.
    ///
    /// Returns `None` for unknown positions.
    fn anchor(&self, pattern: &str) -> Option<String> {
        match self {
            PositionKind::Alone => Some(format!("^{pattern}$")),
            PositionKind::Beginning => Some(format!("^{pattern}")),
            PositionKind::Ending => Some(format!("{pattern}$")),
            PositionKind::Unknown(_) => None,
        }
    }

    /// Returns the tag used in rule files.
    pub fn as_str(&self) -> &str {
        match self {
            PositionKind::Alone => "alone",
            PositionKind::Beginning => "beginning",
            PositionKind::Ending => "ending",
            PositionKind::Unknown(tag) => tag,
        }
    }
}

impl From<String> for PositionKind {
    fn from(tag: String) -> Self {
        match tag.as_str() {
            "alone" => PositionKind::Alone,
            "beginning" => PositionKind::Beginning,
            "ending" => PositionKind::Ending,
            _ => PositionKind::Unknown(tag),
        }
    }
}

impl From<PositionKind> for String {
    fn from(position: PositionKind) -> Self {
        position.as_str().to_string()
    }
}

impl fmt::Display for PositionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A smalltalk rule as it appears in an intents file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rule {
    /// Intent name reported on match.
    pub name: String,
    /// Regex fragments, any of which identifies the intent.
    pub patterns: Vec<String>,
    /// Positions the patterns may occupy.
    #[serde(alias = "position", default)]
    pub positions: Vec<PositionKind>,
    /// Scan precedence; lower values scan first.
    #[serde(default)]
    pub priority: i32,
}

impl Rule {
    /// Creates a rule.
    pub fn new(
        name: impl Into<String>,
        patterns: impl IntoIterator<Item = impl Into<String>>,
        positions: impl IntoIterator<Item = PositionKind>,
        priority: i32,
    ) -> Self {
        Self {
            name: name.into(),
            patterns: patterns.into_iter().map(Into::into).collect(),
            positions: positions.into_iter().collect(),
            priority,
        }
    }

    /// Builds the full alternation source for this rule.
    pub fn to_regex_pattern(&self) -> String {
        let bounded: Vec<String> = self.patterns.iter().map(|p| with_word_boundaries(p)).collect();

        self.positions
            .iter()
            .flat_map(|position| bounded.iter().filter_map(|p| position.anchor(p)))
            .collect::<Vec<_>>()
            .join("|")
    }
}

/// Adds `\b` on each side of `pattern` that starts or ends with a word character.
pub(crate) fn with_word_boundaries(pattern: &str) -> String {
    let prefix = if STARTS_WITH_WORD.is_match(pattern) { r"\b" } else { "" };
    let suffix = if ENDS_WITH_WORD.is_match(pattern) { r"\b" } else { "" };
    format!("{prefix}(?:{pattern}){suffix}")
}

/// A rule compiled into a matcher.
#[derive(Debug, Clone)]
pub struct CompiledIntent {
    name: String,
    /// `None` when the rule has no usable position, so it can never match.
    matcher: Option<Regex>,
    priority: i32,
}

impl CompiledIntent {
    /// Compiles a rule into an intent matcher.
    pub fn compile(rule: &Rule) -> Result<Self> {
        let pattern = rule.to_regex_pattern();

        let matcher = if pattern.is_empty() {
            warn!(rule = %rule.name, "Rule has no usable positions and will never match");
            None
        } else {
            let regex = RegexBuilder::new(&pattern)
                .case_insensitive(true)
                .build()
                .map_err(|source| SmallTalksError::InvalidPattern {
                    rule: rule.name.clone(),
                    source,
                })?;
            Some(regex)
        };

        debug!(rule = %rule.name, priority = rule.priority, %pattern, "Compiled intent");

        Ok(Self {
            name: rule.name.clone(),
            matcher,
            priority: rule.priority,
        })
    }

    /// Intent name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Scan precedence.
    pub fn priority(&self) -> i32 {
        self.priority
    }

    /// Compiled regex source, if the intent can match at all.
    pub fn pattern(&self) -> Option<&str> {
        self.matcher.as_ref().map(Regex::as_str)
    }

    /// Returns true if the intent matches anywhere in `text`.
    pub fn is_match(&self, text: &str) -> bool {
        self.matcher.as_ref().is_some_and(|re| re.is_match(text))
    }

    /// Iterates over non-overlapping, non-empty matches in `text`.
    pub fn find_iter<'r, 't>(&'r self, text: &'t str) -> impl Iterator<Item = regex::Match<'t>> + 'r
    where
        't: 'r,
    {
        self.matcher
            .as_ref()
            .map(|re| re.find_iter(text))
            .into_iter()
            .flatten()
            .filter(|m| !m.is_empty())
    }
}

/// Compiled intents owned by a detector.
#[derive(Debug, Clone, Default)]
pub struct DetectorData {
    intents: Vec<CompiledIntent>,
}

impl DetectorData {
    /// Compiles every rule, preserving source order.
    pub fn compile_all(rules: &[Rule]) -> Result<Self> {
        let intents = rules
            .iter()
            .map(CompiledIntent::compile)
            .collect::<Result<Vec<_>>>()?;
        Ok(Self { intents })
    }

    /// Orders intents by ascending priority. Ties keep their source order.
    pub fn sort_by_priority(&mut self) {
        self.intents.sort_by_key(CompiledIntent::priority);
    }

    /// Returns this data ordered for scanning.
    pub fn into_scan_order(mut self) -> Self {
        self.sort_by_priority();
        self
    }

    /// Returns true if intents are in ascending priority order.
    pub fn is_scan_ordered(&self) -> bool {
        self.intents
            .windows(2)
            .all(|pair| pair[0].priority <= pair[1].priority)
    }

    /// The compiled intents.
    pub fn intents(&self) -> &[CompiledIntent] {
        &self.intents
    }

    /// Returns the number of intents.
    pub fn len(&self) -> usize {
        self.intents.len()
    }

    /// Returns true if there are no intents.
    pub fn is_empty(&self) -> bool {
        self.intents.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use super::PositionKind::*;

    fn compile(patterns: &[&str], positions: &[PositionKind]) -> CompiledIntent {
        let rule = Rule::new("test", patterns.iter().copied(), positions.iter().cloned(), 1);
        CompiledIntent::compile(&rule).unwrap()
    }

    #[test]
    fn adds_word_boundaries_only_next_to_word_characters() {
        assert_eq!(with_word_boundaries("hi"), r"\b(?:hi)\b");
        assert_eq!(with_word_boundaries(":)"), "(?::))");
        assert_eq!(with_word_boundaries("hi!"), r"\b(?:hi!)");
    }

    #[test]
    fn builds_alternation_in_declaration_order() {
        let rule = Rule::new("greeting", ["hello", "hi"], [Alone, Beginning], 1);
        assert_eq!(
            rule.to_regex_pattern(),
            r"^\b(?:hello)\b$|^\b(?:hi)\b$|^\b(?:hello)\b|^\b(?:hi)\b"
        );
    }

    #[test]
    fn alone_matches_only_whole_input() {
        let intent = compile(&["hello", "good morning"], &[Alone]);
        assert!(intent.is_match("hello"));
        assert!(intent.is_match("Good Morning"));
        assert!(!intent.is_match("hello there"));
        assert!(!intent.is_match("well, good morning"));
    }

    #[test]
    fn beginning_and_ending_anchor_and_respect_boundaries() {
        let beginning = compile(&["hi"], &[Beginning]);
        assert!(beginning.is_match("hi there"));
        assert!(!beginning.is_match("chip shop"));
        assert!(!beginning.is_match("this is it"));
        assert!(!beginning.is_match("say hi"));

        let ending = compile(&["hi"], &[Ending]);
        assert!(ending.is_match("say hi"));
        assert!(!ending.is_match("potato chip"));
        assert!(!ending.is_match("hi there"));
    }

    #[test]
    fn matching_is_case_insensitive() {
        let intent = compile(&["thanks"], &[Alone]);
        assert!(intent.is_match("THANKS"));
    }

    #[test]
    fn pattern_alternation_stays_inside_anchors() {
        let intent = compile(&["hi|hello"], &[Alone]);
        assert!(intent.is_match("hello"));
        assert!(!intent.is_match("hi there"));
        assert!(!intent.is_match("well hello"));
    }

    #[test]
    fn unknown_positions_are_ignored() {
        let rule = Rule::new("greeting", ["hi"], [Unknown("middle".into()), Ending], 1);
        assert_eq!(rule.to_regex_pattern(), r"\b(?:hi)\b$");
    }

    #[test]
    fn rule_without_positions_never_matches() {
        let intent = compile(&["hi"], &[Unknown("middle".into())]);
        assert!(intent.pattern().is_none());
        assert!(!intent.is_match("hi"));
        assert_eq!(intent.find_iter("hi").count(), 0);
    }

    #[test]
    fn invalid_pattern_is_reported_with_rule_name() {
        let rule = Rule::new("broken", ["(unclosed"], [Alone], 1);
        let err = CompiledIntent::compile(&rule).unwrap_err();
        assert!(matches!(err, SmallTalksError::InvalidPattern { ref rule, .. } if rule == "broken"));
    }

    #[test]
    fn compile_all_fails_on_any_bad_rule() {
        let rules = vec![
            Rule::new("ok", ["hi"], [Alone], 1),
            Rule::new("bad", ["[z-a]"], [Alone], 2),
        ];
        assert!(DetectorData::compile_all(&rules).is_err());
    }

    #[test]
    fn compile_all_keeps_source_order_until_sorted() {
        let rules = vec![
            Rule::new("third", ["c"], [Alone], 3),
            Rule::new("first", ["a"], [Alone], 1),
            Rule::new("second", ["b"], [Alone], 2),
            Rule::new("first-tie", ["d"], [Alone], 1),
        ];
        let data = DetectorData::compile_all(&rules).unwrap();
        let names: Vec<_> = data.intents().iter().map(CompiledIntent::name).collect();
        assert_eq!(names, ["third", "first", "second", "first-tie"]);
        assert!(!data.is_scan_ordered());

        let data = data.into_scan_order();
        let names: Vec<_> = data.intents().iter().map(CompiledIntent::name).collect();
        assert_eq!(names, ["first", "first-tie", "second", "third"]);
        assert!(data.is_scan_ordered());
    }

    #[test]
    fn deserializes_rule_file_entries() {
        let json = r#"[
            {"name": "greeting", "patterns": ["hi"], "positions": ["alone", "sideways"], "priority": 2},
            {"name": "bye", "patterns": ["bye"], "position": ["ending"]}
        ]"#;
        let rules: Vec<Rule> = serde_json::from_str(json).unwrap();
        assert_eq!(rules[0].positions, vec![Alone, Unknown("sideways".into())]);
        assert_eq!(rules[1].positions, vec![Ending]);
        assert_eq!(rules[1].priority, 0);
    }

    #[test]
    fn find_iter_skips_empty_matches() {
        let intent = compile(&["x*"], &[Beginning]);
        assert_eq!(intent.find_iter("abc").count(), 0);
        assert_eq!(intent.find_iter("xxabc").count(), 1);
    }
}
