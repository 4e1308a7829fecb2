//! Recursive type analysis
//!
//! `Analyzer` walks declaration strings against the declaration index and
//! produces the recursive [`TypeNode`] tree: fundamentals, enums, typedef
//! resolution, pointers and smart pointers, fixed arrays, containers (with
//! key/value payloads analyzed in turn), and classes with their member
//! variables. The type-detail cache short-circuits repeated references and
//! breaks cycles in self-referential type graphs.

use std::time::Duration;

use crate::cache::{CacheHit, TypeCache};
use crate::index::DeclIndex;
use crate::models::{Access, AnalysisSummary, CacheState, LookupStats, TypeNode};
use crate::typestr;

/// Knobs for one analysis run
#[derive(Debug, Clone, Copy)]
pub struct AnalyzerOptions {
    /// Skip private/protected member variables
    pub only_public: bool,
    /// Iterations allowed when chasing typedef-of-typedef chains
    pub typedef_depth: usize,
}

impl Default for AnalyzerOptions {
    fn default() -> Self {
        Self {
            only_public: true,
            typedef_depth: 2,
        }
    }
}

/// Recursive analyzer over one header's declaration index
pub struct Analyzer<'a> {
    index: &'a DeclIndex,
    cache: TypeCache,
    options: AnalyzerOptions,
    stats: LookupStats,
}

impl<'a> Analyzer<'a> {
    pub fn new(index: &'a DeclIndex, options: AnalyzerOptions) -> Self {
        Self {
            index,
            cache: TypeCache::default(),
            options,
            stats: LookupStats::default(),
        }
    }

    /// Analyze a class name or declaration string into a type tree
    pub fn analyze(&mut self, decl_type: &str) -> TypeNode {
        self.analyze_type(decl_type, None)
    }

    pub fn stats(&self) -> LookupStats {
        self.stats
    }

    pub fn cache(&self) -> &TypeCache {
        &self.cache
    }

    pub fn into_cache(self) -> TypeCache {
        self.cache
    }

    fn analyze_type(&mut self, decl_type: &str, name: Option<&str>) -> TypeNode {
        let norm = typestr::strip_qualifiers(decl_type);
        let mut node = TypeNode::new(norm.clone(), decl_type);
        node.name = name.map(str::to_string);

        match self.cache.begin(decl_type) {
            CacheHit::InProgress => {
                log::debug!("cache hit (in process) for {decl_type}");
                node.cached = Some(CacheState::InProcess);
                node.cache_k = Some(crate::cache::key(decl_type).to_string());
                return node;
            }
            CacheHit::Done => {
                log::debug!("cache hit (done) for {decl_type}");
                node.cached = Some(CacheState::Done);
                node.cache_k = Some(crate::cache::key(decl_type).to_string());
                return node;
            }
            CacheHit::Miss => {}
        }

        log::debug!("analyzing {decl_type}");
        self.classify(&mut node, &norm);

        // Cached entries describe the type itself, not the member slot that
        // referenced it first.
        let mut for_cache = node.clone();
        for_cache.name = None;
        self.cache.complete(decl_type, for_cache);

        node
    }

    fn classify(&mut self, node: &mut TypeNode, norm: &str) {
        if typestr::is_fundamental(norm) {
            node.is_fundamental = true;
            return;
        }
        if let Some(enumerators) = self.lookup_enum(norm) {
            node.is_enum = true;
            node.enumerators = Some(enumerators);
            return;
        }

        let mut effective = norm.to_string();
        if let Some((raw, stripped)) = self.resolve_typedef(norm) {
            node.is_typedef = true;
            node.typedef_decl_type = Some(raw);
            node.typedef_type = Some(stripped.clone());
            effective = stripped;

            // The alias target may itself be fundamental or an enum
            if typestr::is_fundamental(&effective) {
                node.is_fundamental = true;
                return;
            }
            if let Some(enumerators) = self.lookup_enum(&effective) {
                node.is_enum = true;
                node.enumerators = Some(enumerators);
                return;
            }
        }

        if let Some(rest) = effective.strip_suffix('*') {
            node.is_pointer = true;
            let target = rest.trim_end().to_string();
            node.depointer = Some(Box::new(self.analyze_type(&target, None)));
            node.depointer_type = Some(target);
            return;
        }

        if let Some((element_type, len)) = typestr::array_suffix(&effective) {
            node.is_array = true;
            node.element = Some(Box::new(self.analyze_type(&element_type, None)));
            node.element_type = Some(element_type);
            node.array_len = len;
            return;
        }

        if typestr::is_smart_pointer(&effective) {
            node.is_smart_pointer = true;
            if let Some(target) = typestr::smart_pointer_target(&effective) {
                node.depointer = Some(Box::new(self.analyze_type(&target, None)));
                node.depointer_type = Some(target);
            }
            return;
        }

        if let Some((key, value)) = typestr::container_payload(&effective) {
            node.is_class = true;
            node.is_container = true;
            if let Some(key) = key {
                node.container_k = Some(Box::new(self.analyze_type(&key, None)));
                node.container_k_type = Some(key);
            }
            node.container_v = Some(Box::new(self.analyze_type(&value, None)));
            node.container_v_type = Some(value);
            return;
        }

        // String types are classes whose members are never expanded
        if effective == "std::string" || effective == "std::wstring" {
            node.is_class = true;
            return;
        }

        self.stats.class_lookups += 1;
        let index = self.index;
        match index.find_class(&effective) {
            Some(cls) => {
                node.is_class = true;
                let fields: Vec<_> = cls
                    .fields
                    .iter()
                    .filter(|f| !self.options.only_public || f.access == Access::Public)
                    .map(|f| (f.name.clone(), f.decl_type.clone()))
                    .collect();
                let variables = fields
                    .iter()
                    .map(|(name, decl)| self.analyze_type(decl, Some(name)))
                    .collect();
                node.variables = Some(variables);
            }
            None => {
                log::debug!("no declaration found for {effective}");
                self.stats.class_misses += 1;
                node.is_unknown = true;
            }
        }
    }

    fn lookup_enum(&mut self, type_str: &str) -> Option<Vec<String>> {
        if type_str.contains("std::") || type_str.contains('<') || type_str.contains('*') {
            return None;
        }
        self.stats.enum_lookups += 1;
        self.index.find_enum(type_str).map(|e| e.enumerators.clone())
    }

    /// Chase a typedef chain up to `typedef_depth` hops.
    ///
    /// Returns the final alias target as (raw, normalized). Standard-library
    /// and pointer spellings are never typedef candidates.
    fn resolve_typedef(&mut self, type_str: &str) -> Option<(String, String)> {
        if type_str.contains("std::") || type_str.contains("tsl::") || type_str.contains('*') {
            return None;
        }

        let mut current = type_str.to_string();
        let mut raw = None;
        for _ in 0..self.options.typedef_depth {
            if typestr::container_kind(&current).is_some() {
                break;
            }
            self.stats.typedef_lookups += 1;
            match self.index.find_typedef(&current) {
                Some(td) => {
                    log::debug!("{current} is a typedef of {}", td.aliased);
                    raw = Some(td.aliased.clone());
                    current = typestr::strip_qualifiers(&td.aliased);
                }
                None => break,
            }
        }
        raw.map(|r| (r, current))
    }
}

/// Build the human/JSON report for a completed analysis
pub fn summarize(
    node: &TypeNode,
    stats: LookupStats,
    cached_types: usize,
    input: &str,
    class: &str,
    duration: Duration,
) -> AnalysisSummary {
    let mut characteristics = Vec::new();
    if node.is_fundamental {
        characteristics.push("fundamental type".to_string());
    }
    if node.is_enum {
        characteristics.push("enum type".to_string());
    }
    if node.is_typedef {
        characteristics.push("type alias".to_string());
    }
    if node.is_pointer {
        characteristics.push("pointer type".to_string());
    }
    if node.is_smart_pointer {
        characteristics.push("smart pointer".to_string());
    }
    if node.is_array {
        characteristics.push("array".to_string());
    }
    if node.is_container {
        characteristics.push("container".to_string());
    } else if node.is_class {
        characteristics.push("class/struct".to_string());
    }
    if node.is_unknown {
        characteristics.push("unknown".to_string());
    }

    let members = node.members();
    AnalysisSummary {
        input: input.to_string(),
        class: class.to_string(),
        generated_at: chrono::Local::now().to_rfc3339(),
        duration_ms: duration.as_millis(),
        characteristics,
        member_total: members.len(),
        fundamental_members: members.iter().filter(|m| m.is_fundamental).count(),
        pointer_members: members
            .iter()
            .filter(|m| m.is_pointer || m.is_smart_pointer)
            .count(),
        container_members: members.iter().filter(|m| m.is_container).count(),
        class_members: members
            .iter()
            .filter(|m| m.is_class && !m.is_container)
            .count(),
        enum_members: members.iter().filter(|m| m.is_enum).count(),
        cached_types,
        lookups: stats,
    }
}
