//! Fact stream: the normalized observations emitted by language front-ends.
//!
//! Front-ends (out of scope for this crate) extract structural facts from
//! source code and hand them over as [`RawFact`] records grouped in
//! [`FactBatch`]es, typically one batch per source file or project. The
//! ingestor validates and normalizes them into immutable [`Fact`]s.

pub mod ingest;
pub mod reader;

pub use ingest::{ingest, IngestedFacts, IngestionSummary, SkippedFact};
pub use reader::{read_fact_batch, read_fact_file};

use crate::errors::{AssessmentError, ErrorCode};
use crate::graph::UnitKind;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Well-known metadata keys.
pub mod meta {
    /// Declaration: `project`, `namespace` or `class`
    pub const UNIT_KIND: &str = "unit_kind";
    /// Declaration: owning team of the unit
    pub const TEAM: &str = "team";
    /// Declaration: `true` for interface/contract-only declarations
    pub const ABSTRACT: &str = "abstract";
    /// Declaration: declared symbol name
    pub const SYMBOL: &str = "symbol";
    /// TableAccess: table identifier
    pub const TABLE: &str = "table";
    /// SharedState: kind of shared state (static, session, cache, ...)
    pub const STATE: &str = "state";
    /// Call: external system being called
    pub const INTEGRATION: &str = "integration";
}

/// Kind of structural observation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FactKind {
    Declaration,
    Reference,
    TableAccess,
    SharedState,
    Call,
}

impl FactKind {
    /// Parse a front-end kind string, tolerating case and separator variants.
    pub fn parse(kind: &str) -> Option<Self> {
        let normalized: String = kind
            .trim()
            .chars()
            .filter(|c| !matches!(c, '_' | '-' | ' '))
            .flat_map(char::to_lowercase)
            .collect();
        match normalized.as_str() {
            "declaration" => Some(Self::Declaration),
            "reference" => Some(Self::Reference),
            "tableaccess" => Some(Self::TableAccess),
            "sharedstate" => Some(Self::SharedState),
            "call" => Some(Self::Call),
            _ => None,
        }
    }
}

/// A front-end record before validation.
///
/// `kind` is free text and metadata values may be any JSON value, because
/// front-ends are written in other ecosystems and cannot be trusted to agree
/// on a schema beyond the field names.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawFact {
    pub kind: String,
    #[serde(default, alias = "source")]
    pub source_unit: String,
    #[serde(default, alias = "target", skip_serializing_if = "Option::is_none")]
    pub target_unit: Option<String>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub metadata: BTreeMap<String, serde_json::Value>,
}

impl RawFact {
    pub fn new(kind: impl Into<String>, source_unit: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            source_unit: source_unit.into(),
            target_unit: None,
            metadata: BTreeMap::new(),
        }
    }

    pub fn declaration(unit: impl Into<String>) -> Self {
        Self::new("declaration", unit)
    }

    pub fn reference(source: impl Into<String>, target: impl Into<String>) -> Self {
        Self::new("reference", source).target(target)
    }

    pub fn call(source: impl Into<String>, target: impl Into<String>) -> Self {
        Self::new("call", source).target(target)
    }

    pub fn table_access(unit: impl Into<String>, table: impl Into<String>) -> Self {
        let table: String = table.into();
        Self::new("table_access", unit).meta(meta::TABLE, table)
    }

    pub fn shared_state(unit: impl Into<String>, state: impl Into<String>) -> Self {
        let state: String = state.into();
        Self::new("shared_state", unit).meta(meta::STATE, state)
    }

    pub fn target(mut self, target: impl Into<String>) -> Self {
        self.target_unit = Some(target.into());
        self
    }

    pub fn meta(mut self, key: &str, value: impl Into<serde_json::Value>) -> Self {
        self.metadata.insert(key.to_string(), value.into());
        self
    }
}

/// One entry of a batch as delivered by a reader.
#[derive(Debug, Clone, PartialEq)]
pub enum RawEntry {
    Fact(RawFact),
    /// The front-end emitted something that is not a fact record at all
    Unparsable(String),
}

/// Facts from one front-end input (a source file, a project, ...).
#[derive(Debug, Clone, PartialEq)]
pub struct FactBatch {
    pub name: String,
    pub entries: Vec<RawEntry>,
}

impl FactBatch {
    pub fn new(name: impl Into<String>, facts: impl IntoIterator<Item = RawFact>) -> Self {
        Self {
            name: name.into(),
            entries: facts.into_iter().map(RawEntry::Fact).collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// A validated, normalized observation. Immutable once created.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct Fact {
    pub kind: FactKind,
    pub source_unit: String,
    pub target_unit: Option<String>,
    pub metadata: BTreeMap<String, String>,
}

impl Fact {
    pub fn meta(&self, key: &str) -> Option<&str> {
        self.metadata.get(key).map(String::as_str)
    }

    /// Declared unit kind, if any.
    pub fn unit_kind(&self) -> Option<UnitKind> {
        self.meta(meta::UNIT_KIND).and_then(UnitKind::parse)
    }

    /// Whether this declaration is interface/contract-only.
    pub fn is_abstract(&self) -> bool {
        self.meta(meta::ABSTRACT).and_then(parse_bool).unwrap_or(false)
    }

    /// Validate and normalize a raw record.
    ///
    /// `batch` and `index` identify the record in error messages.
    pub fn from_raw(raw: &RawFact, batch: &str, index: usize) -> Result<Self, AssessmentError> {
        let malformed = |code, reason: String| AssessmentError::malformed(code, batch, index, reason);

        let kind = FactKind::parse(&raw.kind).ok_or_else(|| {
            malformed(
                ErrorCode::FACT_UNKNOWN_KIND,
                format!("unrecognized fact kind '{}'", raw.kind),
            )
        })?;

        let source_unit = raw.source_unit.trim();
        if source_unit.is_empty() {
            return Err(malformed(
                ErrorCode::FACT_EMPTY_SOURCE,
                "source unit is empty".to_string(),
            ));
        }

        let target_unit = match raw.target_unit.as_deref().map(str::trim) {
            Some("") => {
                return Err(malformed(
                    ErrorCode::FACT_MISSING_FIELD,
                    "target unit is present but empty".to_string(),
                ))
            }
            other => other.map(str::to_string),
        };

        let metadata: BTreeMap<String, String> = raw
            .metadata
            .iter()
            .filter(|(_, value)| !value.is_null())
            .map(|(key, value)| (key.trim().to_ascii_lowercase(), stringify(value)))
            .collect();

        let fact = Fact {
            kind,
            source_unit: source_unit.to_string(),
            target_unit,
            metadata,
        };
        fact.check_kind_requirements()
            .map_err(|(code, reason)| malformed(code, reason))?;
        Ok(fact)
    }

    fn check_kind_requirements(&self) -> Result<(), (ErrorCode, String)> {
        let missing = |what: &str| -> Result<(), (ErrorCode, String)> {
            Err((
                ErrorCode::FACT_MISSING_FIELD,
                format!("{:?} fact requires {what}", self.kind),
            ))
        };

        match self.kind {
            FactKind::Reference if self.target_unit.is_none() => missing("a target unit"),
            FactKind::Call if self.target_unit.is_none() && self.meta(meta::INTEGRATION).is_none() => {
                missing("a target unit or 'integration' metadata")
            }
            FactKind::TableAccess if self.meta(meta::TABLE).is_none() => missing("'table' metadata"),
            FactKind::SharedState if self.meta(meta::STATE).is_none() => missing("'state' metadata"),
            FactKind::Declaration => self.check_declaration_metadata(),
            _ => Ok(()),
        }
    }

    fn check_declaration_metadata(&self) -> Result<(), (ErrorCode, String)> {
        if let Some(kind) = self.meta(meta::UNIT_KIND) {
            if UnitKind::parse(kind).is_none() {
                return Err((
                    ErrorCode::FACT_INVALID_METADATA,
                    format!("unknown unit_kind '{kind}' (expected project, namespace or class)"),
                ));
            }
        }
        if let Some(flag) = self.meta(meta::ABSTRACT) {
            if parse_bool(flag).is_none() {
                return Err((
                    ErrorCode::FACT_INVALID_METADATA,
                    format!("'abstract' must be a boolean, got '{flag}'"),
                ));
            }
        }
        Ok(())
    }
}

fn stringify(value: &serde_json::Value) -> String {
    match value {
        serde_json::Value::String(s) => s.trim().to_string(),
        other => other.to_string(),
    }
}

fn parse_bool(value: &str) -> Option<bool> {
    match value.to_ascii_lowercase().as_str() {
        "true" | "yes" | "1" => Some(true),
        "false" | "no" | "0" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn normalize(raw: RawFact) -> Result<Fact, AssessmentError> {
        Fact::from_raw(&raw, "test", 0)
    }

    #[test]
    fn test_kind_spellings() {
        assert_eq!(FactKind::parse("TableAccess"), Some(FactKind::TableAccess));
        assert_eq!(FactKind::parse("table-access"), Some(FactKind::TableAccess));
        assert_eq!(FactKind::parse("shared_state"), Some(FactKind::SharedState));
        assert_eq!(FactKind::parse(" CALL "), Some(FactKind::Call));
        assert_eq!(FactKind::parse("import"), None);
    }

    #[test]
    fn test_empty_source_rejected() {
        let err = normalize(RawFact::reference("  ", "Billing")).unwrap_err();
        assert_eq!(err.code(), ErrorCode::FACT_EMPTY_SOURCE);
    }

    #[test]
    fn test_unknown_kind_rejected() {
        let err = normalize(RawFact::new("inherits", "Orders")).unwrap_err();
        assert_eq!(err.code(), ErrorCode::FACT_UNKNOWN_KIND);
        assert!(err.to_string().contains("inherits"));
    }

    #[test]
    fn test_kind_specific_requirements() {
        let cases = [
            RawFact::new("reference", "A"),
            RawFact::new("call", "A"),
            RawFact::new("table_access", "A"),
            RawFact::new("shared_state", "A"),
            RawFact::reference("A", ""),
        ];
        for raw in cases {
            let err = normalize(raw.clone()).unwrap_err();
            assert_eq!(err.code(), ErrorCode::FACT_MISSING_FIELD, "{raw:?}");
        }
    }

    #[test]
    fn test_call_to_external_integration_needs_no_target() {
        let fact = normalize(RawFact::new("call", "Payments").meta(meta::INTEGRATION, "stripe"))
            .unwrap();
        assert_eq!(fact.target_unit, None);
        assert_eq!(fact.meta(meta::INTEGRATION), Some("stripe"));
    }

    #[test]
    fn test_metadata_is_stringified() {
        let fact = normalize(
            RawFact::declaration("Orders.IOrderRepository")
                .meta(meta::ABSTRACT, true)
                .meta("arity", 3)
                .meta("ignored", serde_json::Value::Null),
        )
        .unwrap();
        assert!(fact.is_abstract());
        assert_eq!(fact.meta("arity"), Some("3"));
        assert_eq!(fact.meta("ignored"), None);
    }

    #[test]
    fn test_invalid_declaration_metadata() {
        let err = normalize(RawFact::declaration("A").meta(meta::UNIT_KIND, "widget")).unwrap_err();
        assert_eq!(err.code(), ErrorCode::FACT_INVALID_METADATA);

        let err = normalize(RawFact::declaration("A").meta(meta::ABSTRACT, "maybe")).unwrap_err();
        assert_eq!(err.code(), ErrorCode::FACT_INVALID_METADATA);
    }
}
