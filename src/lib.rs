//! typetree: structure-aware C++ type tree analysis
//!
//! typetree parses a single C++ header with Tree-sitter, indexes its
//! declarations, and produces a recursive JSON analysis of a named
//! class/struct: every member classified as fundamental, enum, pointer,
//! container, class, or typedef, with nested types expanded and repeated
//! types deduplicated through a type-detail cache.
//!
//! # Architecture
//!
//! - **Parser**: Extracts classes, enums, and aliases with Tree-sitter
//! - **Index**: Name tables the analyzer resolves custom types against
//! - **Analyzer**: Recursive classification over declaration strings
//! - **Cache**: Per-run type-detail store; breaks recursive type graphs
//!   and becomes the `_dependence.json` output
//!
//! # Example Usage
//!
//! ```no_run
//! use typetree::{Analyzer, AnalyzerOptions, parse_header};
//!
//! let source = std::fs::read_to_string("types.h").unwrap();
//! let index = parse_header(&source).unwrap();
//!
//! let mut analyzer = Analyzer::new(&index, AnalyzerOptions::default());
//! let tree = analyzer.analyze("ComplexDataStructure");
//!
//! println!("{}", serde_json::to_string_pretty(&tree).unwrap());
//! ```

pub mod analyzer;
pub mod cache;
pub mod catalog;
pub mod cli;
pub mod index;
pub mod models;
pub mod output;
pub mod parser;
pub mod typestr;

// Re-export commonly used types
pub use analyzer::{Analyzer, AnalyzerOptions, summarize};
pub use cache::{CacheHit, TypeCache};
pub use index::DeclIndex;
pub use models::{Access, CacheState, DeclKind, Declaration, LookupStats, Span, TypeNode};
pub use parser::parse_header;
