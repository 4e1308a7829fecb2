//! Type-string utilities
//!
//! Classification of C++ declaration strings: qualifier stripping, the
//! fundamental-type battery, container tables, and depth-aware template
//! argument splitting. Everything here works on source text only; semantic
//! questions (is this name an enum? a known class?) belong to the
//! declaration index.

/// Fundamental C/C++ types and the common platform typedefs that behave
/// like them for analysis purposes.
pub const FUNDAMENTALS: &[&str] = &[
    "void",
    "bool",
    // Character types
    "char",
    "signed char",
    "unsigned char",
    "wchar_t",
    "char8_t",
    "char16_t",
    "char32_t",
    // Signed integers
    "int",
    "signed int",
    "short",
    "short int",
    "signed short",
    "signed short int",
    "long",
    "long int",
    "signed long",
    "signed long int",
    "long long",
    "long long int",
    "signed long long",
    "signed long long int",
    // Unsigned integers
    "unsigned",
    "unsigned int",
    "unsigned short",
    "unsigned short int",
    "unsigned long",
    "unsigned long int",
    "unsigned long long",
    "unsigned long long int",
    // Fixed-width integers
    "int8_t",
    "int16_t",
    "int32_t",
    "int64_t",
    "uint8_t",
    "uint16_t",
    "uint32_t",
    "uint64_t",
    "intptr_t",
    "uintptr_t",
    "intmax_t",
    "uintmax_t",
    // Fast and least variants
    "int_fast8_t",
    "int_fast16_t",
    "int_fast32_t",
    "int_fast64_t",
    "uint_fast8_t",
    "uint_fast16_t",
    "uint_fast32_t",
    "uint_fast64_t",
    "int_least8_t",
    "int_least16_t",
    "int_least32_t",
    "int_least64_t",
    "uint_least8_t",
    "uint_least16_t",
    "uint_least32_t",
    "uint_least64_t",
    // Floating point
    "float",
    "double",
    "long double",
    // Common typedefs
    "size_t",
    "ssize_t",
    "ptrdiff_t",
    "nullptr_t",
    "time_t",
    "clock_t",
    "off_t",
    "pid_t",
    "uid_t",
    "gid_t",
];

/// Containers with a single payload type parameter
pub const VALUE_CONTAINERS: &[&str] = &[
    // Sequence containers
    "std::vector",
    "std::deque",
    "std::list",
    "std::forward_list",
    "std::array",
    // Associative sets
    "std::set",
    "std::multiset",
    "std::unordered_set",
    "std::unordered_multiset",
    // Adaptors
    "std::stack",
    "std::queue",
    "std::priority_queue",
    // Third-party equivalents
    "tsl::sparse_set",
    "tsl::robin_set",
    "tsl::hopscotch_set",
    "boost::container::vector",
    "boost::container::list",
    "boost::container::set",
    "absl::flat_hash_set",
    "absl::node_hash_set",
];

/// Containers keyed by their first two type parameters (key and value)
pub const KV_CONTAINERS: &[&str] = &[
    "std::pair",
    "std::tuple",
    "std::map",
    "std::multimap",
    "std::unordered_map",
    "std::unordered_multimap",
    "tsl::sparse_map",
    "tsl::robin_map",
    "tsl::hopscotch_map",
    "boost::container::map",
    "boost::container::multimap",
    "boost::unordered_map",
    "boost::unordered_multimap",
    "absl::flat_hash_map",
    "absl::node_hash_map",
    "absl::btree_map",
];

/// Smart pointer templates; analyzed like pointers, with the first template
/// argument as the pointee.
pub const SMART_POINTERS: &[&str] = &[
    "std::unique_ptr",
    "std::shared_ptr",
    "std::weak_ptr",
    "boost::shared_ptr",
    "boost::scoped_ptr",
    "boost::weak_ptr",
    "boost::intrusive_ptr",
];

/// Distinguishes containers holding one payload type from containers keyed
/// by a key/value pair
pub enum ContainerKind {
    /// One payload type (vector, set, array, ...)
    Value,
    /// Key and value types (map, pair, ...)
    KeyValue,
}

/// Strip `const` qualifiers and a leading `::` from a declaration string.
///
/// Handles the forms a declaration renderer produces: `const T`, `T const`,
/// `T const *`, `::T`.
pub fn strip_qualifiers(raw: &str) -> String {
    let mut t = raw.trim();

    if let Some(rest) = t.strip_prefix("const") {
        if rest.starts_with(char::is_whitespace) {
            t = rest.trim_start();
        }
    }
    let trimmed: String;
    if let Some(rest) = t.strip_suffix("const") {
        if rest.is_empty() || rest.ends_with(char::is_whitespace) {
            t = rest.trim_end();
        }
    } else if let Some(rest) = t.strip_suffix("const *") {
        trimmed = format!("{} *", rest.trim_end());
        return trimmed.strip_prefix("::").unwrap_or(&trimmed).to_string();
    }
    t = t.strip_prefix("::").unwrap_or(t);
    t.trim().to_string()
}

/// Check a normalized type string against the fundamental battery.
///
/// Leading `signed`/`unsigned` words are peeled so spellings like
/// `unsigned size_t`-style oddities still resolve.
pub fn is_fundamental(type_str: &str) -> bool {
    if FUNDAMENTALS.contains(&type_str) {
        return true;
    }
    let peeled = type_str
        .strip_prefix("signed ")
        .or_else(|| type_str.strip_prefix("unsigned "))
        .map(str::trim_start);
    match peeled {
        Some(rest) => FUNDAMENTALS.contains(&rest),
        None => false,
    }
}

/// Template head of a type, e.g. `std::vector` for `std::vector<int>`
pub fn template_head(type_str: &str) -> Option<&str> {
    let open = type_str.find('<')?;
    if !type_str.trim_end().ends_with('>') {
        return None;
    }
    Some(type_str[..open].trim_end())
}

/// Raw template argument text, e.g. `int, double` for `std::map<int, double>`
fn template_args(type_str: &str) -> Option<&str> {
    let open = type_str.find('<')?;
    let close = type_str.rfind('>')?;
    if close <= open {
        return None;
    }
    Some(&type_str[open + 1..close])
}

/// Classify a type string as a value or key-value container
pub fn container_kind(type_str: &str) -> Option<ContainerKind> {
    let head = template_head(type_str)?;
    if VALUE_CONTAINERS.contains(&head) {
        Some(ContainerKind::Value)
    } else if KV_CONTAINERS.contains(&head) {
        Some(ContainerKind::KeyValue)
    } else {
        None
    }
}

/// Whether a type string is a known smart pointer instantiation
pub fn is_smart_pointer(type_str: &str) -> bool {
    template_head(type_str).is_some_and(|head| SMART_POINTERS.contains(&head))
}

/// Pointee type of a smart pointer, the first template argument
pub fn smart_pointer_target(type_str: &str) -> Option<String> {
    if !is_smart_pointer(type_str) {
        return None;
    }
    split_template_args(template_args(type_str)?).into_iter().next()
}

/// Key and value types of a container.
///
/// Value containers yield `(None, payload)`; key-value containers yield
/// their first two template arguments. Allocator/comparator arguments past
/// the payload are ignored, as are malformed argument lists.
pub fn container_payload(type_str: &str) -> Option<(Option<String>, String)> {
    let kind = container_kind(type_str)?;
    let args = split_template_args(template_args(type_str)?);
    match kind {
        ContainerKind::Value => args.into_iter().next().map(|v| (None, v)),
        ContainerKind::KeyValue => {
            let mut it = args.into_iter();
            let k = it.next()?;
            let v = it.next()?;
            Some((Some(k), v))
        }
    }
}

/// Split a template argument list on commas at bracket depth zero.
///
/// `long, Order *, std::less<long>, alloc<std::pair<const long, Order *>>`
/// splits into four arguments; the nested commas stay intact.
pub fn split_template_args(args: &str) -> Vec<String> {
    let mut depth = 0i32;
    let mut start = 0usize;
    let mut parts = Vec::new();

    for (pos, ch) in args.char_indices() {
        match ch {
            '<' | '(' | '[' | '{' => depth += 1,
            '>' | ')' | ']' | '}' => depth -= 1,
            ',' if depth == 0 => {
                parts.push(args[start..pos].trim().to_string());
                start = pos + 1;
            }
            _ => {}
        }
    }
    let tail = args[start..].trim();
    if !tail.is_empty() {
        parts.push(tail.to_string());
    }
    parts
}

/// Parse a fixed-array suffix: `int[10]` yields `("int", Some(10))`,
/// `char[]` yields `("char", None)`.
pub fn array_suffix(type_str: &str) -> Option<(String, Option<usize>)> {
    let t = type_str.trim_end();
    if !t.ends_with(']') {
        return None;
    }
    let open = t.rfind('[')?;
    // Reject template text like `std::array<int, 3>[` never produced, but a
    // lone `[]` with nothing in front is also not an array member.
    let element = t[..open].trim_end();
    if element.is_empty() {
        return None;
    }
    let len_str = &t[open + 1..t.len() - 1];
    let len = if len_str.trim().is_empty() {
        None
    } else {
        Some(len_str.trim().parse().ok()?)
    };
    Some((element.to_string(), len))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strip_qualifiers() {
        assert_eq!(strip_qualifiers("const std::string"), "std::string");
        assert_eq!(strip_qualifiers("std::string const"), "std::string");
        assert_eq!(strip_qualifiers("UserInfo const *"), "UserInfo *");
        assert_eq!(strip_qualifiers("::NetworkConfig"), "NetworkConfig");
        assert_eq!(strip_qualifiers("  int  "), "int");
        // A name merely starting with "const" is untouched
        assert_eq!(strip_qualifiers("constants_table"), "constants_table");
    }

    #[test]
    fn test_is_fundamental() {
        assert!(is_fundamental("int"));
        assert!(is_fundamental("unsigned long long"));
        assert!(is_fundamental("size_t"));
        assert!(is_fundamental("long double"));
        assert!(!is_fundamental("std::string"));
        assert!(!is_fundamental("UserInfo"));
    }

    #[test]
    fn test_container_kind() {
        assert!(matches!(
            container_kind("std::vector<UserInfo>"),
            Some(ContainerKind::Value)
        ));
        assert!(matches!(
            container_kind("std::map<std::string, int>"),
            Some(ContainerKind::KeyValue)
        ));
        assert!(container_kind("std::string").is_none());
        assert!(container_kind("Buffer<int>").is_none());
    }

    #[test]
    fn test_container_payload_value() {
        let (k, v) = container_payload("std::vector<Point3D *>").unwrap();
        assert!(k.is_none());
        assert_eq!(v, "Point3D *");
    }

    #[test]
    fn test_container_payload_kv() {
        let (k, v) = container_payload("std::multimap<Priority, std::string>").unwrap();
        assert_eq!(k.as_deref(), Some("Priority"));
        assert_eq!(v, "std::string");
    }

    #[test]
    fn test_container_payload_ignores_allocator() {
        let decl = "std::map<long, Order *, std::less<long>, std::allocator<std::pair<const long, Order *>>>";
        let (k, v) = container_payload(decl).unwrap();
        assert_eq!(k.as_deref(), Some("long"));
        assert_eq!(v, "Order *");
    }

    #[test]
    fn test_split_template_args_nested() {
        let parts = split_template_args(
            "long, Order *, std::less<long>, alloc<std::pair<const long, Order *> >",
        );
        assert_eq!(parts.len(), 4);
        assert_eq!(parts[0], "long");
        assert_eq!(parts[1], "Order *");
        assert_eq!(parts[2], "std::less<long>");
        assert_eq!(parts[3], "alloc<std::pair<const long, Order *> >");
    }

    #[test]
    fn test_std_array_is_value_container() {
        let (k, v) = container_payload("std::array<float, 5>").unwrap();
        assert!(k.is_none());
        assert_eq!(v, "float");
    }

    #[test]
    fn test_smart_pointer() {
        assert!(is_smart_pointer("std::unique_ptr<SystemConfiguration>"));
        assert!(is_smart_pointer("std::shared_ptr<NetworkConfig>"));
        assert!(!is_smart_pointer("std::vector<int>"));
        assert_eq!(
            smart_pointer_target("std::unique_ptr<Widget, Deleter>").as_deref(),
            Some("Widget")
        );
    }

    #[test]
    fn test_array_suffix() {
        assert_eq!(array_suffix("int[10]"), Some(("int".to_string(), Some(10))));
        assert_eq!(array_suffix("char[]"), Some(("char".to_string(), None)));
        assert_eq!(array_suffix("double"), None);
        assert_eq!(array_suffix("std::vector<int>"), None);
    }
}
