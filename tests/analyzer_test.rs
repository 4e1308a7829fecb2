//! Integration tests for typetree
//!
//! Parses the full fixture header (the member-shape battery: raw and smart
//! pointers, fixed arrays, sequence/associative/set containers, nested
//! containers, enums, function pointers, typedefs, nested struct instances,
//! and a recursive configuration tree) and checks the analysis end to end.

use typetree::models::DeclKind;
use typetree::{Analyzer, AnalyzerOptions, CacheState, parse_header};

const FIXTURE: &str = include_str!("fixtures/complex_types.h");

#[test]
fn test_fixture_index_contents() {
    let index = parse_header(FIXTURE).unwrap();

    // Nested definitions are indexed alongside the top-level ones
    for class in [
        "Point3D",
        "UserInfo",
        "Buffer",
        "NetworkConfig",
        "Authentication",
        "Timeouts",
        "ComplexDataStructure",
        "SystemConfiguration",
        "DatabaseSettings",
        "ReplicationConfig",
        "CacheSettings",
        "LoggingSettings",
    ] {
        assert!(index.find_class(class).is_some(), "missing class {class}");
    }

    assert!(index.find_enum("Priority").unwrap().scoped);
    assert!(!index.find_enum("Status").unwrap().scoped);
    assert!(index.find_enum("LogLevel").is_some());

    assert_eq!(
        index.find_typedef("UserGroupMap").unwrap().aliased,
        "std::map<std::string, std::vector<UserInfo*>>"
    );

    // Listing comes back in source order. The NetworkConfig forward
    // declaration is superseded by its definition, so the first rows are
    // the DatabaseConnection stub and the enums.
    let rows = index.declarations();
    assert_eq!(rows[0].name, "DatabaseConnection");
    assert_eq!(rows[0].kind, DeclKind::Class);
    assert!(!rows[0].defined);
    assert_eq!(rows[1].name, "Priority");
    assert_eq!(rows[1].kind, DeclKind::Enum);
    for pair in rows.windows(2) {
        assert!(pair[0].span.start_line <= pair[1].span.start_line);
    }
}

#[test]
fn test_forward_declared_type_stays_memberless() {
    let index = parse_header(FIXTURE).unwrap();
    let fwd = index.find_class("DatabaseConnection").unwrap();
    assert!(!fwd.defined);
    assert!(fwd.fields.is_empty());

    // Through a pointer member it still analyzes as a class, just empty
    let mut analyzer = Analyzer::new(&index, AnalyzerOptions::default());
    let node = analyzer.analyze("ComplexDataStructure");
    let conn = node.member("db_connection").unwrap();
    assert!(conn.is_pointer);
    let pointee = conn.depointer.as_ref().unwrap();
    assert!(pointee.is_class);
    assert!(pointee.members().is_empty());
}

#[test]
fn test_complex_data_structure_member_classifications() {
    let index = parse_header(FIXTURE).unwrap();
    let mut analyzer = Analyzer::new(&index, AnalyzerOptions::default());
    let node = analyzer.analyze("ComplexDataStructure");
    assert!(node.is_class);
    assert!(!node.is_container);

    // owner appears first, so its pointee gets the full analysis
    let owner = node.member("owner").unwrap();
    assert!(owner.is_pointer);
    assert_eq!(owner.depointer_type.as_deref(), Some("UserInfo"));
    assert!(owner.depointer.as_ref().unwrap().is_class);

    // same type referenced again resolves through the cache
    let users = node.member("users").unwrap();
    assert!(users.is_container);
    assert_eq!(users.container_v_type.as_deref(), Some("UserInfo"));
    let element = users.container_v.as_ref().unwrap();
    assert_eq!(element.cached, Some(CacheState::Done));
    assert_eq!(element.cache_k.as_deref(), Some("UserInfo"));

    let fixed = node.member("fixed_array").unwrap();
    assert!(fixed.is_array);
    assert_eq!(fixed.array_len, Some(10));
    // "int" was already analyzed for the id member
    let element = fixed.element.as_ref().unwrap();
    assert_eq!(element.cached, Some(CacheState::Done));
    assert_eq!(element.cache_k.as_deref(), Some("int"));

    let measurements = node.member("measurements").unwrap();
    assert!(measurements.is_container);
    assert_eq!(measurements.container_v_type.as_deref(), Some("float"));

    let metrics = node.member("metrics").unwrap();
    assert!(metrics.is_container);
    assert_eq!(metrics.container_k_type.as_deref(), Some("std::string"));
    assert_eq!(metrics.container_v_type.as_deref(), Some("double"));

    // priority_tasks is the first Priority reference, so the key node
    // carries the enumerators; current_priority then hits the cache
    let tasks = node.member("priority_tasks").unwrap();
    assert!(tasks.is_container);
    let key = tasks.container_k.as_ref().unwrap();
    assert!(key.is_enum);
    assert_eq!(
        key.enumerators.as_deref().unwrap(),
        ["LOW", "MEDIUM", "HIGH", "CRITICAL"]
    );

    let priority = node.member("current_priority").unwrap();
    assert_eq!(priority.cached, Some(CacheState::Done));
    assert_eq!(priority.cache_k.as_deref(), Some("Priority"));

    let status = node.member("current_status").unwrap();
    assert!(status.is_enum);
    assert_eq!(status.enumerators.as_deref().unwrap().len(), 4);

    let callback = node.member("callback_function").unwrap();
    assert!(callback.is_unknown);
    assert!(!callback.is_pointer);

    let modifier = node.member("last_modifier").unwrap();
    assert!(modifier.is_smart_pointer);
    assert_eq!(modifier.depointer_type.as_deref(), Some("UserInfo"));

    // user_registry's value node carries the pointer analysis for the
    // UserInfo* spelling; later references resolve through the cache
    let registry = node.member("user_registry").unwrap();
    assert!(registry.is_container);
    let registry_value = registry.container_v.as_ref().unwrap();
    assert!(registry_value.is_pointer);
    assert_eq!(registry_value.depointer_type.as_deref(), Some("UserInfo"));

    let groups = node.member("user_groups").unwrap();
    assert!(groups.is_typedef);
    assert!(groups.is_container);
    assert_eq!(
        groups.typedef_type.as_deref(),
        Some("std::map<std::string, std::vector<UserInfo*>>")
    );
    let group_value = groups.container_v.as_ref().unwrap();
    assert!(group_value.is_container);
    let inner = group_value.container_v.as_ref().unwrap();
    assert!(!inner.is_pointer);
    assert_eq!(inner.cached, Some(CacheState::Done));
    assert_eq!(inner.cache_k.as_deref(), Some("UserInfo*"));

    // NetworkConfig expands under the shared pointer, where it is seen
    // first; the inline instance later resolves through the cache
    let config = node.member("network_config").unwrap();
    assert!(config.is_smart_pointer);
    let pointee = config.depointer.as_ref().unwrap();
    assert!(pointee.is_class);
    let auth = pointee.member("auth").unwrap();
    assert!(auth.is_class);
    assert!(auth.member("two_factor_enabled").is_some());

    let settings = node.member("network_settings").unwrap();
    assert_eq!(settings.cached, Some(CacheState::Done));
    assert_eq!(settings.cache_k.as_deref(), Some("NetworkConfig"));
}

#[test]
fn test_nested_containers_expand_recursively() {
    let index = parse_header(FIXTURE).unwrap();
    let mut analyzer = Analyzer::new(&index, AnalyzerOptions::default());
    let node = analyzer.analyze("ComplexDataStructure");

    let matrix = node.member("matrix").unwrap();
    let row = matrix.container_v.as_ref().unwrap();
    assert!(row.is_container);
    assert_eq!(row.container_v_type.as_deref(), Some("int"));
    // the element itself is a cache marker, int was seen long before
    assert_eq!(row.container_v.as_ref().unwrap().cached, Some(CacheState::Done));

    let nested = node.member("nested_metrics").unwrap();
    assert_eq!(nested.container_k_type.as_deref(), Some("int"));
    let inner = nested.container_v.as_ref().unwrap();
    assert!(inner.is_container);
    assert_eq!(inner.container_k_type.as_deref(), Some("std::string"));
    assert_eq!(inner.container_v_type.as_deref(), Some("double"));
}

#[test]
fn test_recursive_subsystems_terminate_in_process() {
    let index = parse_header(FIXTURE).unwrap();
    let mut analyzer = Analyzer::new(&index, AnalyzerOptions::default());
    let node = analyzer.analyze("SystemConfiguration");

    let subsystems = node.member("subsystems").unwrap();
    assert!(subsystems.is_container);
    let owned = subsystems.container_v.as_ref().unwrap();
    assert!(owned.is_smart_pointer);

    // The pointee is the type under analysis, so the cache breaks the cycle
    let inner = owned.depointer.as_ref().unwrap();
    assert_eq!(inner.cached, Some(CacheState::InProcess));
    assert_eq!(inner.cache_k.as_deref(), Some("SystemConfiguration"));
    assert!(inner.variables.is_none());
}

#[test]
fn test_shared_structures_analyzed_once() {
    let index = parse_header(FIXTURE).unwrap();
    let mut analyzer = Analyzer::new(&index, AnalyzerOptions::default());
    let node = analyzer.analyze("SystemConfiguration");

    let collections = node.member("data_collections").unwrap();
    let shared = collections.container_v.as_ref().unwrap();
    assert!(shared.is_container);
    let ptr = shared.container_v.as_ref().unwrap();
    assert!(ptr.is_smart_pointer);

    let data = ptr.depointer.as_ref().unwrap();
    assert!(data.cached.is_none());
    assert!(data.is_class);
    assert_eq!(data.members().len(), 36);

    // A second analysis of the same type is served from the cache
    let again = analyzer.analyze("ComplexDataStructure");
    assert_eq!(again.cached, Some(CacheState::Done));
    assert_eq!(again.cache_k.as_deref(), Some("ComplexDataStructure"));
}

#[test]
fn test_only_public_members_by_default() {
    let index = parse_header(FIXTURE).unwrap();

    let mut analyzer = Analyzer::new(&index, AnalyzerOptions::default());
    let node = analyzer.analyze("UserInfo");
    assert!(node.is_class);
    assert!(node.members().is_empty());

    let mut analyzer = Analyzer::new(
        &index,
        AnalyzerOptions {
            only_public: false,
            ..Default::default()
        },
    );
    let node = analyzer.analyze("UserInfo");
    let names: Vec<_> = node
        .members()
        .iter()
        .filter_map(|m| m.name.as_deref())
        .collect();
    assert_eq!(names, ["username_", "user_id_", "is_admin_"]);
}

#[test]
fn test_summary_breakdown_over_fixture() {
    let index = parse_header(FIXTURE).unwrap();
    let mut analyzer = Analyzer::new(&index, AnalyzerOptions::default());
    let node = analyzer.analyze("ComplexDataStructure");

    let summary = typetree::summarize(
        &node,
        analyzer.stats(),
        analyzer.cache().len(),
        "complex_types.h",
        "ComplexDataStructure",
        std::time::Duration::from_millis(1),
    );

    assert_eq!(summary.characteristics, vec!["class/struct"]);
    assert_eq!(summary.member_total, 36);
    assert_eq!(summary.fundamental_members, 5);
    assert_eq!(summary.pointer_members, 6);
    // current_status only; current_priority resolved via the cache and
    // counts as a marker, not an enum member
    assert_eq!(summary.enum_members, 1);
    assert_eq!(summary.container_members, 16);
    assert!(summary.cached_types > summary.member_total);
}

#[test]
fn test_dependence_file_round_trip() {
    let index = parse_header(FIXTURE).unwrap();
    let mut analyzer = Analyzer::new(&index, AnalyzerOptions::default());
    analyzer.analyze("ComplexDataStructure");

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("complex_types_dependence.json");
    analyzer.into_cache().save(&path, false).unwrap();

    let text = std::fs::read_to_string(&path).unwrap();
    let value: serde_json::Value = serde_json::from_str(&text).unwrap();
    let obj = value.as_object().unwrap();

    let cds = obj.get("ComplexDataStructure").unwrap();
    assert_eq!(cds["type"], "ComplexDataStructure");
    assert_eq!(cds["is_class"], true);
    // Cache entries describe the type, never a member slot
    assert!(cds.get("name").is_none());

    let user = obj.get("UserInfo").unwrap();
    assert_eq!(user["is_class"], true);

    // Pointer and pointee spellings are distinct entries
    assert!(obj.contains_key("UserInfo *"));
    assert!(obj.contains_key("int"));
    assert!(obj.get("int").unwrap()["is_fundamental"] == true);
}
