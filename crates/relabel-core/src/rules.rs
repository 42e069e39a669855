//! Rename rules and ordered rule sets.
//!
//! A [`Rule`] is an immutable `(search, replace)` pair. A [`RuleSet`] is the
//! ordered sequence applied in one run. Order is significant: later rules see
//! the text left behind by earlier ones, so compound names must be renamed
//! before the generic `Normal -> Gaussian` rule runs.
//!
//! Rule sets come from one of three sources (see [`RuleSource`]):
//!
//! - the built-in set ([`RuleSet::builtin`])
//! - a JSON file holding an array of `{"search": .., "replace": ..}` objects
//! - inline `OLD=NEW` pairs from the command line

use std::fmt;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Built-in rule set, in application order.
pub const BUILTIN_RULES: &[(&str, &str)] = &[
    ("UnknownNoiseLogLikelihood", "GaussianLogLikelihood"),
    ("KnownNoiseLogLikelihood", "GaussianKnownSigmaLogLikelihood"),
    ("MultimodalNormalLogPDF", "MultimodalGaussianLogPDF"),
    ("NormalLogPDF", "GaussianLogPDF"),
    ("HighDimensionalNormalLogPDF", "HighDimensionalGaussianLogPDF"),
    ("MultivariateNormalLogPrior", "MultivariateGaussianLogPrior"),
    ("NormalLogPrior", "GaussianLogPrior"),
    ("Normal", "Gaussian"),
];

/// Error type for rule construction and loading.
#[derive(Debug, Error)]
pub enum RuleError {
    /// A rule has an empty search text (it would match at every position).
    #[error("rule {index} has an empty search text")]
    EmptySearchText { index: usize },

    /// An inline pair was not in `OLD=NEW` form.
    #[error("invalid rule '{input}', expected 'OLD=NEW'")]
    MalformedPair { input: String },

    /// A rules file could not be read or parsed.
    #[error("cannot load rules file {path}: {reason}")]
    RulesFile { path: String, reason: String },

    /// An override produced no rules.
    #[error("rule set is empty")]
    EmptyRuleSet,
}

/// A single substitution pass: every occurrence of `search` becomes `replace`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Rule {
    pub search: String,
    pub replace: String,
}

impl Rule {
    pub fn new(search: impl Into<String>, replace: impl Into<String>) -> Self {
        Rule {
            search: search.into(),
            replace: replace.into(),
        }
    }

    /// Parse an inline `OLD=NEW` pair.
    ///
    /// Splits on the first `=`, so the replacement may itself contain `=`.
    /// An empty replacement (`OLD=`) deletes every occurrence.
    pub fn parse_pair(input: &str) -> Result<Self, RuleError> {
        match input.split_once('=') {
            Some((search, replace)) => Ok(Rule::new(search, replace)),
            None => Err(RuleError::MalformedPair {
                input: input.to_string(),
            }),
        }
    }
}

impl fmt::Display for Rule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} -> {}", self.search, self.replace)
    }
}

/// Where the effective rule set came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RuleSource {
    Builtin,
    File,
    Inline,
}

impl fmt::Display for RuleSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RuleSource::Builtin => write!(f, "builtin"),
            RuleSource::File => write!(f, "file"),
            RuleSource::Inline => write!(f, "inline"),
        }
    }
}

/// Ordered, validated sequence of rules.
///
/// Every rule in a `RuleSet` has a non-empty search text. Rule numbering in
/// errors and reports is 1-based.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct RuleSet {
    rules: Vec<Rule>,
}

impl RuleSet {
    /// Build a rule set, rejecting empty search texts.
    pub fn new(rules: Vec<Rule>) -> Result<Self, RuleError> {
        if let Some(pos) = rules.iter().position(|r| r.search.is_empty()) {
            return Err(RuleError::EmptySearchText { index: pos + 1 });
        }
        Ok(RuleSet { rules })
    }

    /// The built-in rule set.
    pub fn builtin() -> Self {
        RuleSet {
            rules: BUILTIN_RULES
                .iter()
                .map(|(search, replace)| Rule::new(*search, *replace))
                .collect(),
        }
    }

    /// Build a rule set from inline `OLD=NEW` pairs, keeping their order.
    pub fn from_pairs(pairs: &[String]) -> Result<Self, RuleError> {
        if pairs.is_empty() {
            return Err(RuleError::EmptyRuleSet);
        }
        let rules = pairs
            .iter()
            .map(|p| Rule::parse_pair(p.as_str()))
            .collect::<Result<Vec<_>, _>>()?;
        RuleSet::new(rules)
    }

    /// Parse a JSON array of `{"search": .., "replace": ..}` objects.
    pub fn from_json_str(json: &str) -> Result<Self, RuleError> {
        let rules: Vec<Rule> = serde_json::from_str(json).map_err(|e| RuleError::RulesFile {
            path: "<inline>".to_string(),
            reason: e.to_string(),
        })?;
        if rules.is_empty() {
            return Err(RuleError::EmptyRuleSet);
        }
        RuleSet::new(rules)
    }

    /// Load a JSON rules file.
    pub fn load(path: &Path) -> Result<Self, RuleError> {
        let display = path.display().to_string();
        let json = fs::read_to_string(path).map_err(|e| RuleError::RulesFile {
            path: display.clone(),
            reason: e.to_string(),
        })?;
        RuleSet::from_json_str(&json).map_err(|err| match err {
            RuleError::RulesFile { reason, .. } => RuleError::RulesFile {
                path: display,
                reason,
            },
            other => other,
        })
    }

    pub fn rules(&self) -> &[Rule] {
        &self.rules
    }

    pub fn iter(&self) -> impl Iterator<Item = &Rule> {
        self.rules.iter()
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}

impl Default for RuleSet {
    fn default() -> Self {
        RuleSet::builtin()
    }
}

impl<'a> IntoIterator for &'a RuleSet {
    type Item = &'a Rule;
    type IntoIter = std::slice::Iter<'a, Rule>;

    fn into_iter(self) -> Self::IntoIter {
        self.rules.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    mod builtin {
        use super::*;

        #[test]
        fn builtin_has_eight_rules_in_order() {
            let set = RuleSet::builtin();
            assert_eq!(set.len(), 8);
            assert_eq!(
                set.rules()[0],
                Rule::new("UnknownNoiseLogLikelihood", "GaussianLogLikelihood")
            );
            assert_eq!(set.rules()[7], Rule::new("Normal", "Gaussian"));
        }

        #[test]
        fn generic_normal_rule_runs_last() {
            let set = RuleSet::builtin();
            let generic = set
                .iter()
                .position(|r| r.search == "Normal")
                .expect("generic rule present");
            // Every other rule that mentions Normal must come before it.
            for (i, rule) in set.iter().enumerate() {
                if rule.search.contains("Normal") && rule.search != "Normal" {
                    assert!(i < generic, "{} must precede the generic rule", rule);
                }
            }
        }

        #[test]
        fn multimodal_precedes_plain_normal_log_pdf() {
            let set = RuleSet::builtin();
            let pos = |s: &str| set.iter().position(|r| r.search == s).unwrap();
            assert!(pos("MultimodalNormalLogPDF") < pos("NormalLogPDF"));
            assert!(pos("MultivariateNormalLogPrior") < pos("NormalLogPrior"));
        }

        #[test]
        fn default_is_builtin() {
            assert_eq!(RuleSet::default(), RuleSet::builtin());
        }
    }

    mod parsing {
        use super::*;

        #[test]
        fn parse_pair_splits_on_first_equals() {
            let rule = Rule::parse_pair("a=b=c").unwrap();
            assert_eq!(rule.search, "a");
            assert_eq!(rule.replace, "b=c");
        }

        #[test]
        fn parse_pair_allows_empty_replacement() {
            let rule = Rule::parse_pair("Deprecated=").unwrap();
            assert_eq!(rule.replace, "");
        }

        #[test]
        fn parse_pair_without_equals_fails() {
            let err = Rule::parse_pair("NormalGaussian").unwrap_err();
            assert!(matches!(err, RuleError::MalformedPair { .. }));
        }

        #[test]
        fn from_pairs_rejects_empty_search() {
            let err = RuleSet::from_pairs(&["A=B".to_string(), "=X".to_string()]).unwrap_err();
            match err {
                RuleError::EmptySearchText { index } => assert_eq!(index, 2),
                other => panic!("expected EmptySearchText, got {other:?}"),
            }
        }

        #[test]
        fn from_pairs_rejects_empty_list() {
            assert!(matches!(
                RuleSet::from_pairs(&[]),
                Err(RuleError::EmptyRuleSet)
            ));
        }

        #[test]
        fn from_json_keeps_order() {
            let set = RuleSet::from_json_str(
                r#"[{"search":"Foo","replace":"Bar"},{"search":"Bar","replace":"Baz"}]"#,
            )
            .unwrap();
            assert_eq!(set.len(), 2);
            assert_eq!(set.rules()[1], Rule::new("Bar", "Baz"));
        }

        #[test]
        fn from_json_rejects_garbage() {
            let err = RuleSet::from_json_str("{not json").unwrap_err();
            assert!(matches!(err, RuleError::RulesFile { .. }));
        }

        #[test]
        fn from_json_rejects_empty_array() {
            assert!(matches!(
                RuleSet::from_json_str("[]"),
                Err(RuleError::EmptyRuleSet)
            ));
        }
    }

    mod loading {
        use super::*;

        #[test]
        fn load_reads_file() {
            let dir = TempDir::new().unwrap();
            let path = dir.path().join("rules.json");
            fs::write(&path, r#"[{"search":"Old","replace":"New"}]"#).unwrap();

            let set = RuleSet::load(&path).unwrap();
            assert_eq!(set.rules(), &[Rule::new("Old", "New")]);
        }

        #[test]
        fn load_reports_path_on_parse_error() {
            let dir = TempDir::new().unwrap();
            let path = dir.path().join("rules.json");
            fs::write(&path, "[1, 2]").unwrap();

            match RuleSet::load(&path).unwrap_err() {
                RuleError::RulesFile { path: p, .. } => assert!(p.ends_with("rules.json")),
                other => panic!("expected RulesFile, got {other:?}"),
            }
        }

        #[test]
        fn load_missing_file_fails() {
            let dir = TempDir::new().unwrap();
            let err = RuleSet::load(&dir.path().join("absent.json")).unwrap_err();
            assert!(matches!(err, RuleError::RulesFile { .. }));
        }
    }

    #[test]
    fn rule_display() {
        assert_eq!(
            Rule::new("NormalLogPrior", "GaussianLogPrior").to_string(),
            "NormalLogPrior -> GaussianLogPrior"
        );
    }

    #[test]
    fn rule_set_serializes_as_array() {
        let set = RuleSet::from_pairs(&["A=B".to_string()]).unwrap();
        let json = serde_json::to_value(&set).unwrap();
        assert_eq!(json, serde_json::json!([{"search": "A", "replace": "B"}]));
    }
}
