//! Annotation instances attached to declarations.
//!
//! The annotation type name is normalized to an [`AnnotationId`] when the instance is built, so the analyzer never
//! compares qualified names itself.

use std::collections::BTreeMap;

use metagen_core::lang::annotations::{self, AnnotationId};
use serde::Deserialize;

/// A single annotation member value.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum AnnotationValue {
    Bool(bool),
    Int(i64),
    Str(String),
    List(Vec<AnnotationValue>),
    Nested(Box<Annotation>),
}

/// An annotation instance: its qualified type name, the registry id (when recognized) and member values.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(from = "AnnotationSpec")]
pub struct Annotation {
    pub name: String,
    pub id: Option<AnnotationId>,
    pub values: BTreeMap<String, AnnotationValue>,
}

#[derive(Deserialize)]
struct AnnotationSpec {
    name: String,
    #[serde(default)]
    values: BTreeMap<String, AnnotationValue>,
}

impl From<AnnotationSpec> for Annotation {
    fn from(spec: AnnotationSpec) -> Self {
        Annotation {
            id: annotations::from_str(&spec.name),
            name: spec.name,
            values: spec.values,
        }
    }
}

impl Annotation {
    /// A recognized annotation with no member values.
    pub fn marker(id: AnnotationId) -> Self {
        Annotation {
            name: annotations::as_str(id).to_string(),
            id: Some(id),
            values: BTreeMap::new(),
        }
    }

    pub fn with_value(mut self, member: &str, value: AnnotationValue) -> Self {
        self.values.insert(member.to_string(), value);
        self
    }

    pub fn with_str(self, member: &str, value: &str) -> Self {
        self.with_value(member, AnnotationValue::Str(value.to_string()))
    }

    pub fn is(&self, id: AnnotationId) -> bool {
        self.id == Some(id)
    }

    pub fn value(&self, member: &str) -> Option<&AnnotationValue> {
        self.values.get(member)
    }

    pub fn string_value(&self, member: &str) -> Option<&str> {
        match self.value(member)? {
            AnnotationValue::Str(s) => Some(s),
            _ => None,
        }
    }

    pub fn bool_value(&self, member: &str) -> Option<bool> {
        match self.value(member)? {
            AnnotationValue::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// String members declared as arrays; a single string counts as a one-element array.
    pub fn string_list(&self, member: &str) -> Vec<&str> {
        match self.value(member) {
            Some(AnnotationValue::Str(s)) => vec![s.as_str()],
            Some(AnnotationValue::List(items)) => items
                .iter()
                .filter_map(|item| match item {
                    AnnotationValue::Str(s) => Some(s.as_str()),
                    _ => None,
                })
                .collect(),
            _ => Vec::new(),
        }
    }

    /// Nested annotation members (`@OrderBy.List({...})`).
    pub fn nested_list(&self, member: &str) -> Vec<&Annotation> {
        match self.value(member) {
            Some(AnnotationValue::Nested(a)) => vec![a.as_ref()],
            Some(AnnotationValue::List(items)) => items
                .iter()
                .filter_map(|item| match item {
                    AnnotationValue::Nested(a) => Some(a.as_ref()),
                    _ => None,
                })
                .collect(),
            _ => Vec::new(),
        }
    }

    /// Whether any string member value still holds the host's unresolved placeholder.
    pub fn has_placeholder(&self) -> bool {
        self.values.values().any(value_has_placeholder)
    }
}

fn value_has_placeholder(value: &AnnotationValue) -> bool {
    match value {
        AnnotationValue::Str(s) => metagen_core::is_placeholder(s),
        AnnotationValue::List(items) => items.iter().any(value_has_placeholder),
        AnnotationValue::Nested(a) => a.has_placeholder(),
        AnnotationValue::Bool(_) | AnnotationValue::Int(_) => false,
    }
}

/// Find the first annotation with the given id.
pub fn find(annotations: &[Annotation], id: AnnotationId) -> Option<&Annotation> {
    annotations.iter().find(|a| a.is(id))
}

pub fn has(annotations: &[Annotation], id: AnnotationId) -> bool {
    find(annotations, id).is_some()
}

pub fn has_any(annotations: &[Annotation], ids: &[AnnotationId]) -> bool {
    annotations.iter().any(|a| a.id.is_some_and(|id| ids.contains(&id)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use metagen_core::lang::annotations::{ENABLED_FETCH_PROFILES_MEMBER, VALUE_MEMBER};

    #[test]
    fn test_deserialize_normalizes_name() {
        let a: Annotation = serde_json::from_str(r#"{"name": "javax.persistence.Id"}"#).unwrap();
        assert_eq!(a.id, Some(AnnotationId::Id));
        let a: Annotation = serde_json::from_str(r#"{"name": "com.acme.Custom"}"#).unwrap();
        assert_eq!(a.id, None);
    }

    #[test]
    fn test_string_list_accepts_scalar_and_array() {
        let a: Annotation = serde_json::from_str(
            r#"{"name": "org.hibernate.annotations.processing.Find",
                "values": {"enabledFetchProfiles": ["a", "b"]}}"#,
        )
        .unwrap();
        assert_eq!(a.string_list(ENABLED_FETCH_PROFILES_MEMBER), vec!["a", "b"]);
        let a = Annotation::marker(AnnotationId::Find).with_str(ENABLED_FETCH_PROFILES_MEMBER, "one");
        assert_eq!(a.string_list(ENABLED_FETCH_PROFILES_MEMBER), vec!["one"]);
    }

    #[test]
    fn test_nested_annotations_and_placeholders() {
        let a: Annotation = serde_json::from_str(
            r#"{"name": "jakarta.data.repository.OrderBy.List",
                "values": {"value": [{"name": "jakarta.data.repository.OrderBy", "values": {"value": "<error>"}}]}}"#,
        )
        .unwrap();
        let nested = a.nested_list(VALUE_MEMBER);
        assert_eq!(nested.len(), 1);
        assert!(nested[0].is(AnnotationId::OrderBy));
        assert!(a.has_placeholder());
    }
}
