//! Type Mapper
//!
//! Maps native (Rust) type names onto the small closed set of types the
//! scripting side understands. The mapper works on type-name strings so the
//! capability catalog can declare members without any runtime reflection.
//!
//! Only one level of container nesting is supported: a `Vec<T>` or
//! `HashMap<String, V>` is mappable only when the element type is itself a
//! scalar. Nested containers are rejected rather than flattened.

// ─────────────────────────────────────────────────────────────────────────────
// Target type descriptors
// ─────────────────────────────────────────────────────────────────────────────

/// A type on the scripting side of the bridge.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TypeDescriptor {
    /// No value (method returns nothing)
    Void,
    /// Boolean value
    Boolean,
    /// Any numeric value (all integer and float kinds collapse to this)
    Number,
    /// String value
    String,
    /// Opaque JSON-like value, accepts anything
    Any,
    /// Homogeneous list of a scalar element type
    List(Box<TypeDescriptor>),
    /// String-keyed map of a scalar value type
    StringMap(Box<TypeDescriptor>),
}

impl TypeDescriptor {
    /// Render as a TypeScript type string. Byte-stable for equal descriptors.
    pub fn ts_type(&self) -> String {
        match self {
            TypeDescriptor::Void => "void".to_string(),
            TypeDescriptor::Boolean => "boolean".to_string(),
            TypeDescriptor::Number => "number".to_string(),
            TypeDescriptor::String => "string".to_string(),
            TypeDescriptor::Any => "any".to_string(),
            TypeDescriptor::List(element) => format!("{}[]", element.ts_type()),
            TypeDescriptor::StringMap(value) => {
                format!("Record<string, {}>", value.ts_type())
            }
        }
    }

    /// Whether this descriptor is the void type.
    pub fn is_void(&self) -> bool {
        matches!(self, TypeDescriptor::Void)
    }
}

/// Errors from type mapping.
#[derive(Debug, Clone, thiserror::Error)]
pub enum MapError {
    #[error("unsupported native type: {0}")]
    Unsupported(String),
}

// ─────────────────────────────────────────────────────────────────────────────
// Normalization
// ─────────────────────────────────────────────────────────────────────────────

/// Strip reference/pointer/mutability qualifiers and the `serde_json::` path
/// prefix from a native type name before matching.
pub fn normalize_type(type_name: &str) -> String {
    let mut name = type_name.to_string();
    for qualifier in ["*const ", "*mut ", "&mut ", "&", "const ", "mut "] {
        name = name.replace(qualifier, "");
    }
    name = name.replace("serde_json::", "");
    name.trim().to_string()
}

/// Split the template arguments of `Outer<A, B, ...>` at the top nesting
/// level. Returns `None` when the name has no well-formed argument list.
fn split_template_args(type_name: &str) -> Option<Vec<String>> {
    let start = type_name.find('<')?;
    let end = type_name.rfind('>')?;
    if start == 0 || end <= start {
        return None;
    }

    let inner = &type_name[start + 1..end];
    let mut args = Vec::new();
    let mut depth = 0usize;
    let mut current = String::new();
    for ch in inner.chars() {
        match ch {
            '<' => {
                depth += 1;
                current.push(ch);
            }
            '>' => {
                depth = depth.saturating_sub(1);
                current.push(ch);
            }
            ',' if depth == 0 => {
                args.push(current.trim().to_string());
                current.clear();
            }
            _ => current.push(ch),
        }
    }
    if !current.trim().is_empty() {
        args.push(current.trim().to_string());
    }

    if args.is_empty() { None } else { Some(args) }
}

// ─────────────────────────────────────────────────────────────────────────────
// Mapping rules
// ─────────────────────────────────────────────────────────────────────────────

const NUMERIC_KINDS: &[&str] = &[
    "i8", "i16", "i32", "i64", "u8", "u16", "u32", "u64", "isize", "usize", "f32", "f64",
];

const LIST_CONTAINERS: &[&str] = &["Vec<", "VecDeque<", "HashSet<"];
const MAP_CONTAINERS: &[&str] = &["HashMap<", "BTreeMap<"];

/// Map a normalized scalar (non-container) type name. Opaque JSON value
/// types count as scalars here, so one level of `Vec<Value>`-style nesting
/// is reachable through the container rules.
fn map_scalar(normalized: &str) -> Option<TypeDescriptor> {
    match normalized {
        "bool" => Some(TypeDescriptor::Boolean),
        "String" | "str" => Some(TypeDescriptor::String),
        "Value" => Some(TypeDescriptor::Any),
        "Map<String, Value>" => Some(TypeDescriptor::StringMap(Box::new(TypeDescriptor::Any))),
        name if NUMERIC_KINDS.contains(&name) => Some(TypeDescriptor::Number),
        _ => None,
    }
}

/// Map a native type name to a target descriptor, or report it unmappable.
///
/// Unmappable types produce no descriptor at all; the caller is expected to
/// drop the owning member from the schema rather than emit a partial mapping.
pub fn map_type(type_name: &str) -> Result<TypeDescriptor, MapError> {
    let normalized = normalize_type(type_name);

    if normalized == "()" || normalized == "void" {
        return Ok(TypeDescriptor::Void);
    }

    if let Some(descriptor) = map_scalar(&normalized) {
        return Ok(descriptor);
    }

    if LIST_CONTAINERS.iter().any(|c| normalized.starts_with(c)) {
        let args = split_template_args(&normalized)
            .ok_or_else(|| MapError::Unsupported(type_name.to_string()))?;
        if args.len() != 1 {
            return Err(MapError::Unsupported(type_name.to_string()));
        }
        let element = map_scalar(&normalize_type(&args[0]))
            .ok_or_else(|| MapError::Unsupported(type_name.to_string()))?;
        return Ok(TypeDescriptor::List(Box::new(element)));
    }

    if MAP_CONTAINERS.iter().any(|c| normalized.starts_with(c)) {
        let args = split_template_args(&normalized)
            .ok_or_else(|| MapError::Unsupported(type_name.to_string()))?;
        if args.len() != 2 {
            return Err(MapError::Unsupported(type_name.to_string()));
        }
        let key = normalize_type(&args[0]);
        if key != "String" && key != "str" {
            return Err(MapError::Unsupported(type_name.to_string()));
        }
        let value = map_scalar(&normalize_type(&args[1]))
            .ok_or_else(|| MapError::Unsupported(type_name.to_string()))?;
        return Ok(TypeDescriptor::StringMap(Box::new(value)));
    }

    Err(MapError::Unsupported(type_name.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_strips_qualifiers() {
        assert_eq!(normalize_type("&str"), "str");
        assert_eq!(normalize_type("&mut String"), "String");
        assert_eq!(normalize_type("*const i64"), "i64");
        assert_eq!(normalize_type("serde_json::Value"), "Value");
        assert_eq!(normalize_type("  Vec<String> "), "Vec<String>");
    }

    #[test]
    fn test_map_scalars() {
        assert_eq!(map_type("()").unwrap(), TypeDescriptor::Void);
        assert_eq!(map_type("void").unwrap(), TypeDescriptor::Void);
        assert_eq!(map_type("bool").unwrap(), TypeDescriptor::Boolean);
        assert_eq!(map_type("i64").unwrap(), TypeDescriptor::Number);
        assert_eq!(map_type("f32").unwrap(), TypeDescriptor::Number);
        assert_eq!(map_type("&str").unwrap(), TypeDescriptor::String);
        assert_eq!(map_type("String").unwrap(), TypeDescriptor::String);
        assert_eq!(map_type("serde_json::Value").unwrap(), TypeDescriptor::Any);
    }

    #[test]
    fn test_map_json_aggregates() {
        assert_eq!(
            map_type("Map<String, Value>").unwrap().ts_type(),
            "Record<string, any>"
        );
        assert_eq!(map_type("Vec<Value>").unwrap().ts_type(), "any[]");
    }

    #[test]
    fn test_map_lists_of_scalars() {
        assert_eq!(map_type("Vec<String>").unwrap().ts_type(), "string[]");
        assert_eq!(map_type("VecDeque<i32>").unwrap().ts_type(), "number[]");
        assert_eq!(map_type("HashSet<bool>").unwrap().ts_type(), "boolean[]");
    }

    #[test]
    fn test_map_string_keyed_maps() {
        assert_eq!(
            map_type("HashMap<String, f64>").unwrap().ts_type(),
            "Record<string, number>"
        );
        assert_eq!(
            map_type("BTreeMap<String, String>").unwrap().ts_type(),
            "Record<string, string>"
        );
    }

    #[test]
    fn test_nested_containers_rejected() {
        assert!(map_type("Vec<Vec<String>>").is_err());
        assert!(map_type("HashMap<String, Vec<i64>>").is_err());
        assert!(map_type("HashMap<String, HashMap<String, i64>>").is_err());
    }

    #[test]
    fn test_non_string_map_keys_rejected() {
        assert!(map_type("HashMap<i64, String>").is_err());
        assert!(map_type("BTreeMap<u32, bool>").is_err());
    }

    #[test]
    fn test_unknown_types_rejected() {
        assert!(map_type("MyStruct").is_err());
        assert!(map_type("Option<String>").is_err());
        assert!(map_type("Vec<MyStruct>").is_err());
    }

    #[test]
    fn test_ts_rendering_is_stable() {
        let descriptor = map_type("HashMap<String, Value>").unwrap();
        assert_eq!(descriptor.ts_type(), descriptor.ts_type());
        assert_eq!(descriptor.ts_type(), "Record<string, any>");
    }
}
