//! Declaration index built from one parsed header
//!
//! The index is the semantic side of the analyzer: name tables for
//! classes/structs (with their member variables), enums, and type aliases.
//! Lookups accept qualified names and fall back to the last `::` segment,
//! and refuse standard/third-party library namespaces so `std::vector`
//! never resolves to a local declaration by accident.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::models::{Access, DeclKind, Declaration, Span};

/// Namespaces the index never claims to know
const NAMESPACE_BLACKLIST: &[&str] = &["std::", "tsl::", "boost::", "absl::"];

/// One member variable of a class or struct
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FieldDecl {
    pub name: String,
    /// Declaration string rendered from the syntax tree (`UserInfo *`,
    /// `int[10]`, `std::map<std::string, int>`, ...)
    pub decl_type: String,
    pub access: Access,
}

/// A class or struct definition (or forward declaration)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClassDecl {
    pub name: String,
    /// `DeclKind::Class` or `DeclKind::Struct`
    pub kind: DeclKind,
    pub span: Span,
    pub fields: Vec<FieldDecl>,
    /// False when only a forward declaration was seen
    pub defined: bool,
}

/// An enum definition, plain or scoped
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EnumDecl {
    pub name: String,
    pub span: Span,
    /// True for `enum class`
    pub scoped: bool,
    pub enumerators: Vec<String>,
}

/// A `typedef` or `using` alias
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TypedefDecl {
    pub name: String,
    /// The aliased declaration string
    pub aliased: String,
    pub span: Span,
}

/// Name tables for everything declared in one header
#[derive(Debug, Clone, Default)]
pub struct DeclIndex {
    classes: HashMap<String, ClassDecl>,
    enums: HashMap<String, EnumDecl>,
    typedefs: HashMap<String, TypedefDecl>,
}

impl DeclIndex {
    /// Register a class/struct. A definition always wins over a previously
    /// seen forward declaration; a forward declaration never downgrades a
    /// definition.
    pub fn insert_class(&mut self, decl: ClassDecl) {
        match self.classes.get(&decl.name) {
            Some(existing) if existing.defined && !decl.defined => {}
            _ => {
                self.classes.insert(decl.name.clone(), decl);
            }
        }
    }

    pub fn insert_enum(&mut self, decl: EnumDecl) {
        self.enums.insert(decl.name.clone(), decl);
    }

    pub fn insert_typedef(&mut self, decl: TypedefDecl) {
        self.typedefs.insert(decl.name.clone(), decl);
    }

    /// Look up a class/struct by name.
    ///
    /// Qualified names fall back to their last segment (`Outer::Inner` is
    /// found via `Inner`), and template instantiations to their head
    /// (`Buffer<int>` is found via `Buffer`). Blacklisted namespaces are
    /// never resolved.
    pub fn find_class(&self, name: &str) -> Option<&ClassDecl> {
        let key = lookup_key(name)?;
        self.classes.get(key)
    }

    pub fn find_enum(&self, name: &str) -> Option<&EnumDecl> {
        let key = lookup_key(name)?;
        self.enums.get(key)
    }

    pub fn find_typedef(&self, name: &str) -> Option<&TypedefDecl> {
        let key = lookup_key(name)?;
        self.typedefs.get(key)
    }

    pub fn class_count(&self) -> usize {
        self.classes.len()
    }

    pub fn enum_count(&self) -> usize {
        self.enums.len()
    }

    pub fn typedef_count(&self) -> usize {
        self.typedefs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.classes.is_empty() && self.enums.is_empty() && self.typedefs.is_empty()
    }

    /// Flat declaration listing, ordered by source position
    pub fn declarations(&self) -> Vec<Declaration> {
        let mut rows: Vec<Declaration> = self
            .classes
            .values()
            .map(|c| Declaration {
                name: c.name.clone(),
                kind: c.kind,
                span: c.span,
                members: c.fields.len(),
                defined: c.defined,
            })
            .chain(self.enums.values().map(|e| Declaration {
                name: e.name.clone(),
                kind: DeclKind::Enum,
                span: e.span,
                members: e.enumerators.len(),
                defined: true,
            }))
            .chain(self.typedefs.values().map(|t| Declaration {
                name: t.name.clone(),
                kind: DeclKind::Typedef,
                span: t.span,
                members: 0,
                defined: true,
            }))
            .collect();

        rows.sort_by_key(|d| (d.span.start_line, d.span.start_col));
        rows
    }
}

/// Normalize a type name into an index key, or None for blacklisted
/// namespaces.
fn lookup_key(name: &str) -> Option<&str> {
    let mut key = name.trim();
    key = key.strip_prefix("::").unwrap_or(key);
    if NAMESPACE_BLACKLIST.iter().any(|ns| key.starts_with(ns)) {
        return None;
    }
    if let Some(open) = key.find('<') {
        key = key[..open].trim_end();
    }
    if let Some(pos) = key.rfind("::") {
        key = &key[pos + 2..];
    }
    let key = key.trim();
    if key.is_empty() { None } else { Some(key) }
}
