//! Definition scripts and their classification by object kind.

use serde::{Deserialize, Serialize};

/// Kind of schema object a script declares.
///
/// The declaration order is the replay order: domains before the tables that
/// use them, tables before the procedures that reference them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScriptKind {
    Domain,
    Table,
    Procedure,
    Unknown,
}

const KIND_PREFIXES: [(&str, ScriptKind); 3] = [
    ("CREATE DOMAIN", ScriptKind::Domain),
    ("CREATE TABLE", ScriptKind::Table),
    ("CREATE PROCEDURE", ScriptKind::Procedure),
];

/// Classify script text by its leading keywords (case-insensitive).
///
/// Only the literal prefix is inspected: leading whitespace or comments make a
/// script `Unknown`.
pub fn classify(text: &str) -> ScriptKind {
    KIND_PREFIXES
        .iter()
        .find(|(prefix, _)| starts_with_ignore_case(text, prefix))
        .map(|(_, kind)| *kind)
        .unwrap_or(ScriptKind::Unknown)
}

fn starts_with_ignore_case(text: &str, prefix: &str) -> bool {
    text.get(..prefix.len())
        .is_some_and(|head| head.eq_ignore_ascii_case(prefix))
}

/// One definition script: where it came from, its trimmed text and its kind.
///
/// The kind is derived once at construction and never recomputed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScriptUnit {
    origin: String,
    content: String,
    kind: ScriptKind,
}

impl ScriptUnit {
    /// Build a unit from raw text; the text is trimmed before classification.
    pub fn new(origin: impl Into<String>, raw: &str) -> Self {
        let content = raw.trim().to_string();
        let kind = classify(&content);
        Self {
            origin: origin.into(),
            content,
            kind,
        }
    }

    /// File name or synthetic name identifying the script.
    pub fn origin(&self) -> &str {
        &self.origin
    }

    /// Trimmed script text.
    pub fn content(&self) -> &str {
        &self.content
    }

    pub fn kind(&self) -> ScriptKind {
        self.kind
    }
}

/// Stable sort by kind: Domain < Table < Procedure < Unknown.
///
/// Scripts of the same kind keep their incoming order, so callers that sort
/// by file name first get alphabetical order within each kind.
pub fn order_by_kind(units: &mut [ScriptUnit]) {
    units.sort_by_key(ScriptUnit::kind);
}
