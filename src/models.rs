//! Core data models for typetree
//!
//! These structures represent the normalized, deterministic output format
//! that typetree produces for programmatic consumers: the recursive type
//! tree (`TypeNode`) and the flat declaration listing (`Declaration`).

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// Represents a source code location span (line:col range)
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct Span {
    /// Starting line number (1-indexed)
    pub start_line: usize,
    /// Starting column number (0-indexed)
    pub start_col: usize,
    /// Ending line number (1-indexed)
    pub end_line: usize,
    /// Ending column number (0-indexed)
    pub end_col: usize,
}

impl Span {
    pub fn new(start_line: usize, start_col: usize, end_line: usize, end_col: usize) -> Self {
        Self {
            start_line,
            start_col,
            end_line,
            end_col,
        }
    }
}

/// Kind of C++ declaration found in a header
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, EnumString, Display)]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
#[serde(rename_all = "lowercase")]
pub enum DeclKind {
    Class,
    Struct,
    Enum,
    Typedef,
}

/// Member access level inside a class or struct
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, EnumString, Display)]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
#[serde(rename_all = "lowercase")]
pub enum Access {
    Public,
    Protected,
    Private,
}

/// A declaration row as reported by `ttx list`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Declaration {
    /// Declared name (unqualified)
    pub name: String,
    /// Declaration kind
    pub kind: DeclKind,
    /// Location in the source file
    pub span: Span,
    /// Number of member variables (classes/structs) or enumerators (enums)
    pub members: usize,
    /// False for forward declarations without a body
    pub defined: bool,
}

/// Cache protocol marker attached to a `TypeNode` that resolved via the
/// type-detail cache instead of a fresh analysis.
///
/// `InProcess` means the type is currently being analyzed further up the
/// recursion (a cycle); `Done` means a completed analysis exists under
/// `cache_k` in the dependence output.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Display)]
pub enum CacheState {
    InProcess,
    Done,
}

fn is_false(v: &bool) -> bool {
    !*v
}

/// One node of the recursive type tree.
///
/// Boolean classification flags are serialized only when true, and child
/// links only when present, so the JSON stays sparse: a fundamental member
/// renders as `{"type": "int", "decl_type": "int", "name": "id",
/// "is_fundamental": true}`.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct TypeNode {
    /// Normalized type name (qualifiers stripped)
    #[serde(rename = "type")]
    pub type_name: String,
    /// Original declaration string as written in the source
    pub decl_type: String,
    /// Member variable name, present on nodes inside `variables`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    // Classification flags
    #[serde(default, skip_serializing_if = "is_false")]
    pub is_fundamental: bool,
    #[serde(default, skip_serializing_if = "is_false")]
    pub is_enum: bool,
    #[serde(default, skip_serializing_if = "is_false")]
    pub is_typedef: bool,
    #[serde(default, skip_serializing_if = "is_false")]
    pub is_pointer: bool,
    #[serde(default, skip_serializing_if = "is_false")]
    pub is_smart_pointer: bool,
    #[serde(default, skip_serializing_if = "is_false")]
    pub is_array: bool,
    #[serde(default, skip_serializing_if = "is_false")]
    pub is_container: bool,
    #[serde(default, skip_serializing_if = "is_false")]
    pub is_class: bool,
    #[serde(default, skip_serializing_if = "is_false")]
    pub is_unknown: bool,

    // Cache hits carry a marker and the cache key instead of a re-analysis
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cached: Option<CacheState>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cache_k: Option<String>,

    // Typedef resolution
    #[serde(skip_serializing_if = "Option::is_none")]
    pub typedef_decl_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub typedef_type: Option<String>,

    // Pointers and smart pointers
    #[serde(skip_serializing_if = "Option::is_none")]
    pub depointer_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub depointer: Option<Box<TypeNode>>,

    // Fixed-size arrays
    #[serde(skip_serializing_if = "Option::is_none")]
    pub element_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub array_len: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub element: Option<Box<TypeNode>>,

    // Containers
    #[serde(skip_serializing_if = "Option::is_none")]
    pub container_k_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub container_v_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub container_k: Option<Box<TypeNode>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub container_v: Option<Box<TypeNode>>,

    // Enums
    #[serde(skip_serializing_if = "Option::is_none")]
    pub enumerators: Option<Vec<String>>,

    // Classes and structs
    #[serde(skip_serializing_if = "Option::is_none")]
    pub variables: Option<Vec<TypeNode>>,
}

impl TypeNode {
    pub fn new(type_name: impl Into<String>, decl_type: impl Into<String>) -> Self {
        Self {
            type_name: type_name.into(),
            decl_type: decl_type.into(),
            ..Default::default()
        }
    }

    /// A marker node reserves a cache slot while its type is being analyzed
    pub fn is_marker(&self) -> bool {
        self.type_name.is_empty()
    }

    /// Member variable nodes, empty slice when this is not a resolved class
    pub fn members(&self) -> &[TypeNode] {
        self.variables.as_deref().unwrap_or(&[])
    }

    /// Find a member variable node by name
    pub fn member(&self, name: &str) -> Option<&TypeNode> {
        self.members()
            .iter()
            .find(|v| v.name.as_deref() == Some(name))
    }
}

/// Counters for index lookups performed during one analysis run
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct LookupStats {
    pub class_lookups: usize,
    pub class_misses: usize,
    pub typedef_lookups: usize,
    pub enum_lookups: usize,
}

/// Human/JSON report describing one completed analysis
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisSummary {
    /// Path of the analyzed header
    pub input: String,
    /// Name of the analyzed class/struct
    pub class: String,
    /// RFC 3339 timestamp of report generation
    pub generated_at: String,
    /// Wall-clock analysis duration in milliseconds
    pub duration_ms: u128,
    /// Root-node characteristics (e.g. "class/struct", "container")
    pub characteristics: Vec<String>,
    /// Total member variables on the root node
    pub member_total: usize,
    pub fundamental_members: usize,
    pub pointer_members: usize,
    pub container_members: usize,
    pub class_members: usize,
    pub enum_members: usize,
    /// Entries accumulated in the type-detail cache
    pub cached_types: usize,
    pub lookups: LookupStats,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sparse_serialization() {
        let mut node = TypeNode::new("int", "int");
        node.name = Some("id".to_string());
        node.is_fundamental = true;

        let json = serde_json::to_value(&node).unwrap();
        let obj = json.as_object().unwrap();

        assert_eq!(obj["type"], "int");
        assert_eq!(obj["decl_type"], "int");
        assert_eq!(obj["name"], "id");
        assert_eq!(obj["is_fundamental"], true);
        // False flags and absent children must not be serialized
        assert!(!obj.contains_key("is_pointer"));
        assert!(!obj.contains_key("variables"));
        assert!(!obj.contains_key("cached"));
    }

    #[test]
    fn test_cache_state_roundtrip() {
        let json = serde_json::to_string(&CacheState::InProcess).unwrap();
        assert_eq!(json, "\"InProcess\"");
        let back: CacheState = serde_json::from_str(&json).unwrap();
        assert_eq!(back, CacheState::InProcess);
    }

    #[test]
    fn test_decl_kind_from_string() {
        use std::str::FromStr;
        assert_eq!(DeclKind::from_str("class").unwrap(), DeclKind::Class);
        assert_eq!(DeclKind::from_str("Struct").unwrap(), DeclKind::Struct);
        assert!(DeclKind::from_str("union").is_err());
    }

    #[test]
    fn test_member_lookup() {
        let mut child = TypeNode::new("double", "double");
        child.name = Some("weight".to_string());
        let mut root = TypeNode::new("Thing", "Thing");
        root.variables = Some(vec![child]);

        assert!(root.member("weight").is_some());
        assert!(root.member("missing").is_none());
    }
}
