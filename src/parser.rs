//! C++ header parsing using Tree-sitter
//!
//! Builds a [`DeclIndex`] from one translation unit's syntax: class/struct
//! definitions with their member variables, forward declarations, enums
//! with enumerators, and type aliases. Declaration strings for members are
//! reconstructed from the declarator tree (`UserInfo *`, `int[10]`,
//! `int (*)(int, double)`), since the string-driven analyzer works on the
//! same spellings a compiler frontend would report.
//!
//! The preprocessor is not run: `#include`d files are never seen, which is
//! why forward-declared types stay memberless in the index.

use anyhow::{Context, Result};
use streaming_iterator::StreamingIterator;
use tree_sitter::{Node, Parser, Query, QueryCursor};

use crate::index::{ClassDecl, DeclIndex, EnumDecl, FieldDecl, TypedefDecl};
use crate::models::{Access, DeclKind, Span};

/// Parse C++ header source and build the declaration index
pub fn parse_header(source: &str) -> Result<DeclIndex> {
    let mut parser = Parser::new();
    let language: tree_sitter::Language = tree_sitter_cpp::LANGUAGE.into();

    parser
        .set_language(&language)
        .context("Failed to set C++ language")?;

    let tree = parser
        .parse(source, None)
        .context("Failed to parse C++ source")?;

    let root = tree.root_node();

    let mut index = DeclIndex::default();
    collect_classes(source, &root, &language, &mut index)?;
    collect_enums(source, &root, &language, &mut index)?;
    collect_typedefs(source, &root, &language, &mut index)?;

    log::debug!(
        "indexed {} classes, {} enums, {} typedefs",
        index.class_count(),
        index.enum_count(),
        index.typedef_count()
    );

    Ok(index)
}

/// Collect class and struct declarations, including nested and
/// forward-declared ones
fn collect_classes(
    source: &str,
    root: &Node,
    language: &tree_sitter::Language,
    index: &mut DeclIndex,
) -> Result<()> {
    let query_str = r#"
        (class_specifier
            name: (type_identifier) @name) @class

        (struct_specifier
            name: (type_identifier) @name) @struct
    "#;

    let query = Query::new(language, query_str).context("Failed to create class query")?;

    let mut cursor = QueryCursor::new();
    let mut matches = cursor.matches(&query, *root, source.as_bytes());

    while let Some(match_) = matches.next() {
        let mut name = None;
        let mut full_node = None;
        let mut kind = DeclKind::Class;

        for capture in match_.captures {
            let capture_name: &str = &query.capture_names()[capture.index as usize];
            match capture_name {
                "name" => name = Some(node_text(source, &capture.node).to_string()),
                "class" => {
                    kind = DeclKind::Class;
                    full_node = Some(capture.node);
                }
                "struct" => {
                    kind = DeclKind::Struct;
                    full_node = Some(capture.node);
                }
                _ => {}
            }
        }

        let (Some(name), Some(node)) = (name, full_node) else {
            continue;
        };

        // Structs default to public members, classes to private
        let default_access = match kind {
            DeclKind::Struct => Access::Public,
            _ => Access::Private,
        };

        let decl = match node.child_by_field_name("body") {
            Some(body) => ClassDecl {
                name,
                kind,
                span: node_to_span(&node),
                fields: collect_members(source, &body, default_access),
                defined: true,
            },
            None => ClassDecl {
                name,
                kind,
                span: node_to_span(&node),
                fields: vec![],
                defined: false,
            },
        };
        index.insert_class(decl);
    }

    Ok(())
}

/// Walk a field_declaration_list, tracking the current access level
fn collect_members(source: &str, body: &Node, default_access: Access) -> Vec<FieldDecl> {
    let mut fields = Vec::new();
    let mut access = default_access;

    let mut cursor = body.walk();
    for child in body.children(&mut cursor) {
        match child.kind() {
            "access_specifier" => {
                access = match node_text(source, &child).trim_end_matches(':').trim() {
                    "public" => Access::Public,
                    "protected" => Access::Protected,
                    _ => Access::Private,
                };
            }
            "field_declaration" => extract_fields(source, &child, access, &mut fields),
            _ => {}
        }
    }

    fields
}

/// Extract member variables from one field_declaration.
///
/// A single declaration can carry several declarators (`double x, y, z;`),
/// and method declarations share the same node kind as data members, so
/// each declarator is rendered individually and non-variables rejected.
fn extract_fields(source: &str, decl: &Node, access: Access, out: &mut Vec<FieldDecl>) {
    let Some(type_node) = decl.child_by_field_name("type") else {
        return;
    };
    let Some(base) = base_type_text(source, &type_node) else {
        return;
    };

    let mut is_const = false;
    {
        let mut cursor = decl.walk();
        for child in decl.children(&mut cursor) {
            if child.kind() == "type_qualifier"
                && child.start_byte() < type_node.start_byte()
                && node_text(source, &child) == "const"
            {
                is_const = true;
            }
        }
    }
    let base = if is_const {
        format!("const {base}")
    } else {
        base
    };

    let mut cursor = decl.walk();
    for declarator in decl.children_by_field_name("declarator", &mut cursor) {
        if let Some((name, decl_type)) = render_declarator(source, declarator, &base) {
            out.push(FieldDecl {
                name,
                decl_type,
                access,
            });
        }
    }
}

/// Base type spelling of a field declaration.
///
/// Inline nested definitions (`struct Authentication { ... } auth;`) render
/// as their type name; the definition itself is indexed separately by the
/// class query. Anonymous inline definitions have no usable spelling.
fn base_type_text(source: &str, node: &Node) -> Option<String> {
    match node.kind() {
        "struct_specifier" | "class_specifier" | "enum_specifier" | "union_specifier" => node
            .child_by_field_name("name")
            .map(|n| node_text(source, &n).to_string()),
        _ => Some(node_text(source, node).to_string()),
    }
}

/// Render one declarator into (member name, declaration string).
///
/// Returns None for declarators that are not data members, in particular
/// plain method declarations (`double distance() const;`).
fn render_declarator(source: &str, node: Node, base: &str) -> Option<(String, String)> {
    match node.kind() {
        "field_identifier" | "identifier" => {
            Some((node_text(source, &node).to_string(), base.to_string()))
        }
        "pointer_declarator" => {
            let inner = node.child_by_field_name("declarator")?;
            render_declarator(source, inner, &format!("{base} *"))
        }
        "array_declarator" => {
            let inner = node.child_by_field_name("declarator")?;
            let size = node
                .child_by_field_name("size")
                .map(|s| node_text(source, &s).to_string())
                .unwrap_or_default();
            render_declarator(source, inner, &format!("{base}[{size}]"))
        }
        "function_declarator" => {
            // Function-pointer members have a parenthesized pointer
            // declarator; anything else here is a method declaration.
            let inner = node.child_by_field_name("declarator")?;
            if inner.kind() != "parenthesized_declarator" {
                return None;
            }
            let name_node = find_identifier(inner)?;
            let params = node
                .child_by_field_name("parameters")
                .map(|p| node_text(source, &p).to_string())
                .unwrap_or_else(|| "()".to_string());
            let inner_params = params
                .strip_prefix('(')
                .and_then(|p| p.strip_suffix(')'))
                .unwrap_or(&params)
                .trim()
                .to_string();
            Some((
                node_text(source, &name_node).to_string(),
                format!("{base} (*)({inner_params})"),
            ))
        }
        "init_declarator" => {
            let inner = node.child_by_field_name("declarator")?;
            render_declarator(source, inner, base)
        }
        _ => None,
    }
}

/// First identifier nested under a declarator node
fn find_identifier<'tree>(node: Node<'tree>) -> Option<Node<'tree>> {
    if node.kind() == "field_identifier" || node.kind() == "identifier" {
        return Some(node);
    }
    let mut cursor = node.walk();
    for child in node.children(&mut cursor) {
        if let Some(found) = find_identifier(child) {
            return Some(found);
        }
    }
    None
}

/// Collect enum definitions (plain and `enum class`) with enumerator names
fn collect_enums(
    source: &str,
    root: &Node,
    language: &tree_sitter::Language,
    index: &mut DeclIndex,
) -> Result<()> {
    let query_str = r#"
        (enum_specifier
            name: (type_identifier) @name) @enum
    "#;

    let query = Query::new(language, query_str).context("Failed to create enum query")?;

    let mut cursor = QueryCursor::new();
    let mut matches = cursor.matches(&query, *root, source.as_bytes());

    while let Some(match_) = matches.next() {
        let mut name = None;
        let mut full_node = None;

        for capture in match_.captures {
            let capture_name: &str = &query.capture_names()[capture.index as usize];
            if capture_name == "name" {
                name = Some(node_text(source, &capture.node).to_string());
            } else {
                full_node = Some(capture.node);
            }
        }

        let (Some(name), Some(node)) = (name, full_node) else {
            continue;
        };
        let Some(body) = node.child_by_field_name("body") else {
            continue;
        };

        let mut enumerators = Vec::new();
        let mut body_cursor = body.walk();
        for child in body.children(&mut body_cursor) {
            if child.kind() == "enumerator" {
                if let Some(n) = child.child_by_field_name("name") {
                    enumerators.push(node_text(source, &n).to_string());
                }
            }
        }

        let text = node_text(source, &node);
        let scoped = text
            .strip_prefix("enum")
            .map(|rest| rest.trim_start().starts_with("class") || rest.trim_start().starts_with("struct"))
            .unwrap_or(false);

        index.insert_enum(EnumDecl {
            name,
            span: node_to_span(&node),
            scoped,
            enumerators,
        });
    }

    Ok(())
}

/// Collect type aliases (`typedef` and `using`)
fn collect_typedefs(
    source: &str,
    root: &Node,
    language: &tree_sitter::Language,
    index: &mut DeclIndex,
) -> Result<()> {
    let query_str = r#"
        (type_definition
            declarator: (type_identifier) @name) @typedef

        (type_definition
            declarator: (pointer_declarator
                declarator: (type_identifier) @name)) @typedef_ptr

        (alias_declaration
            name: (type_identifier) @name) @using
    "#;

    let query = Query::new(language, query_str).context("Failed to create typedef query")?;

    let mut cursor = QueryCursor::new();
    let mut matches = cursor.matches(&query, *root, source.as_bytes());

    while let Some(match_) = matches.next() {
        let mut name = None;
        let mut full_node = None;
        let mut pointer = false;
        let mut using = false;

        for capture in match_.captures {
            let capture_name: &str = &query.capture_names()[capture.index as usize];
            match capture_name {
                "name" => name = Some(node_text(source, &capture.node).to_string()),
                "typedef" => full_node = Some(capture.node),
                "typedef_ptr" => {
                    pointer = true;
                    full_node = Some(capture.node);
                }
                "using" => {
                    using = true;
                    full_node = Some(capture.node);
                }
                _ => {}
            }
        }

        let (Some(name), Some(node)) = (name, full_node) else {
            continue;
        };

        let aliased = if using {
            node.child_by_field_name("type")
                .map(|t| node_text(source, &t).to_string())
        } else {
            node.child_by_field_name("type")
                .and_then(|t| base_type_text(source, &t))
                .map(|base| if pointer { format!("{base} *") } else { base })
        };
        let Some(aliased) = aliased else { continue };

        index.insert_typedef(TypedefDecl {
            name,
            aliased,
            span: node_to_span(&node),
        });
    }

    Ok(())
}

/// Convert a Tree-sitter node to a Span
fn node_to_span(node: &Node) -> Span {
    let start = node.start_position();
    let end = node.end_position();

    Span::new(
        start.row + 1, // Convert 0-indexed to 1-indexed
        start.column,
        end.row + 1,
        end.column,
    )
}

fn node_text<'a>(source: &'a str, node: &Node) -> &'a str {
    node.utf8_text(source.as_bytes()).unwrap_or("")
}
