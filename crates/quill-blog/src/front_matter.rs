use std::collections::BTreeMap;

use quill_core::{Absence, Extracted};
use serde_yaml::Value;

/// Line that opens and closes a front matter block.
pub const DELIMITER: &str = "---";

/// Key/value pairs declared in a post's front matter block.
///
/// # Examples
///
/// ```
/// use quill_blog::front_matter::parse_front_matter;
///
/// let doc = "---\ntitle: Hello\ntags: [a, b]\n---\nbody";
/// let fm = parse_front_matter(doc).unwrap_or_default();
/// assert_eq!(fm.string("title").as_deref(), Some("Hello"));
/// assert_eq!(fm.string_list("tags"), vec!["a", "b"]);
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FrontMatter {
    fields: BTreeMap<String, Value>,
}

impl FrontMatter {
    /// Declared keys, in sorted order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.fields.keys().map(String::as_str)
    }

    /// Number of declared keys.
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Returns `true` if no keys were declared.
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Raw YAML value of `key`.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.fields.get(key)
    }

    /// Scalar value of `key` rendered as a string. `null` counts as missing.
    pub fn string(&self, key: &str) -> Option<String> {
        self.fields.get(key).and_then(scalar_to_string)
    }

    /// List value of `key`. A lone scalar becomes a one-item list; anything
    /// else (missing, `null`, mappings) yields an empty list.
    pub fn string_list(&self, key: &str) -> Vec<String> {
        match self.fields.get(key) {
            Some(Value::Sequence(items)) => items.iter().filter_map(scalar_to_string).collect(),
            Some(other) => scalar_to_string(other).into_iter().collect(),
            None => Vec::new(),
        }
    }
}

/// Parse the front matter block at the top of a markdown document.
///
/// The document must start with [`DELIMITER`]. It is split on the delimiter
/// into at most three parts and the middle one is parsed as YAML. A block
/// that is empty parses to an empty [`FrontMatter`]; anything that is not a
/// mapping is reported as absent, never as an error.
///
/// # Examples
///
/// ```
/// use quill_blog::front_matter::parse_front_matter;
/// use quill_core::Absence;
///
/// let missing = parse_front_matter("# Just a heading");
/// assert_eq!(missing.absence(), Some(&Absence::NoDelimiter));
/// ```
pub fn parse_front_matter(content: &str) -> Extracted<FrontMatter> {
    if !content.starts_with(DELIMITER) {
        return Extracted::Absent(Absence::NoDelimiter);
    }

    let mut parts = content.splitn(3, DELIMITER);
    let _leading = parts.next();
    let block = parts.next().unwrap_or_default();
    if parts.next().is_none() {
        return Extracted::Absent(Absence::Unterminated);
    }

    if block.trim().is_empty() {
        return Extracted::Present(FrontMatter::default());
    }

    let value: Value = match serde_yaml::from_str(block) {
        Ok(v) => v,
        Err(e) => return Extracted::Absent(Absence::Malformed(e.to_string())),
    };

    match value {
        Value::Mapping(mapping) => {
            let fields = mapping
                .into_iter()
                .filter_map(|(k, v)| scalar_to_string(&k).map(|k| (k, v)))
                .collect();
            Extracted::Present(FrontMatter { fields })
        }
        Value::Null => Extracted::Present(FrontMatter::default()),
        other => Extracted::Absent(Absence::Malformed(format!(
            "expected a mapping, found {}",
            kind_name(&other)
        ))),
    }
}

fn scalar_to_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Tagged(tagged) => scalar_to_string(&tagged.value),
        _ => None,
    }
}

fn kind_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Sequence(_) => "a sequence",
        Value::Mapping(_) => "a mapping",
        Value::Tagged(_) => "a tagged value",
    }
}
