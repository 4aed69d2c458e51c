//! JSON Schema text → property tree.
//!
//! Reads the vocabulary the generators write back out: `type`, `format`,
//! `title`, `description`, `properties`, `required`, `pattern`, `enum`,
//! `minLength`/`maxLength`, `minimum`/`maximum`, `items`,
//! `minItems`/`maxItems`, `oneOf` and local `#/definitions/...` references.
//! A missing or unknown `type` yields a string node.
use std::collections::HashSet;

use indexmap::IndexMap;
use regex::Regex;
use serde::Deserialize;
use serde::de::Deserializer;
use serde_json::Value;

use crate::error::ParseError;
use crate::path_de;
use crate::property::{
    ArrayProperty, BooleanProperty, ChoiceProperty, FloatProperty, IntegerProperty,
    ObjectProperty, Property, StringProperty, TemporalFormat, TemporalProperty,
};

/// Name given to the root node when the schema has no `title`.
pub const DEFAULT_ROOT_NAME: &str = "record";

const DEFINITIONS_PREFIX: &str = "#/definitions/";

// ————————————————————————————————————————————————————————————————————————————
// RAW SHAPE
// ————————————————————————————————————————————————————————————————————————————

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct RawSchema {
    #[serde(rename = "type")]
    type_: Option<TypeDecl>,
    title: Option<String>,
    description: Option<String>,
    format: Option<String>,
    #[serde(default)]
    properties: IndexMap<String, RawSchema>,
    required: Option<RequiredDecl>,
    pattern: Option<String>,
    #[serde(rename = "enum")]
    enum_: Option<Vec<Value>>,
    min_length: Option<usize>,
    max_length: Option<usize>,
    minimum: Option<f64>,
    maximum: Option<f64>,
    items: Option<Box<RawSchema>>,
    min_items: Option<usize>,
    max_items: Option<usize>,
    one_of: Option<Vec<RawSchema>>,
    #[serde(rename = "$ref")]
    reference: Option<String>,
    #[serde(default)]
    definitions: IndexMap<String, RawSchema>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum TypeDecl {
    One(String),
    Many(Vec<String>),
}

/// Draft 4 lists names on the parent; draft 3 flags the child itself.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum RequiredDecl {
    Names(Vec<String>),
    Flag(bool),
}

impl RawSchema {
    fn type_name(&self) -> Option<&str> {
        match self.type_.as_ref()? {
            TypeDecl::One(t) => Some(t.as_str()),
            TypeDecl::Many(ts) => ts.iter().map(String::as_str).find(|t| *t != "null"),
        }
    }

    fn required_names(&self) -> &[String] {
        match &self.required {
            Some(RequiredDecl::Names(names)) => names,
            _ => &[],
        }
    }

    fn required_flag(&self) -> bool {
        matches!(self.required, Some(RequiredDecl::Flag(true)))
    }
}

// ————————————————————————————————————————————————————————————————————————————
// FRONT API
// ————————————————————————————————————————————————————————————————————————————

pub struct JsonSchemaParser;

impl JsonSchemaParser {
    pub fn parse(text: &str) -> Result<Property, ParseError> {
        let raw: RawSchema = path_de::from_str_with_path(text)?;
        Self::build(&raw)
    }

    /// Parses a schema held in any self-describing form (e.g. a YAML mapping).
    pub fn parse_deserializer<'de, D>(de: D) -> Result<Property, ParseError>
    where
        D: Deserializer<'de>,
        D::Error: std::fmt::Display,
    {
        let raw: RawSchema = path_de::deserialize_with_path(de)?;
        Self::build(&raw)
    }

    fn build(raw: &RawSchema) -> Result<Property, ParseError> {
        let name = raw.title.as_deref().unwrap_or(DEFAULT_ROOT_NAME);
        let mut builder = Builder { definitions: &raw.definitions, resolving: HashSet::new() };
        let root = builder.build(name, raw, false)?;
        tracing::debug!(root = name, id = %root.id(), "parsed json schema");
        Ok(root)
    }
}

// ————————————————————————————————————————————————————————————————————————————
// IMPLEMENTATION
// ————————————————————————————————————————————————————————————————————————————

struct Builder<'a> {
    definitions: &'a IndexMap<String, RawSchema>,
    resolving: HashSet<String>,
}

impl<'a> Builder<'a> {
    fn build(&mut self, name: &str, raw: &'a RawSchema, required: bool) -> Result<Property, ParseError> {
        if let Some(reference) = &raw.reference {
            return self.resolve(name, reference, required);
        }

        let property: Property = if let Some(alternatives) = &raw.one_of {
            let mut choice = ChoiceProperty::new(name);
            for (i, alt) in alternatives.iter().enumerate() {
                let alt_name = alt.title.clone().unwrap_or_else(|| format!("{name}{i}"));
                choice = choice.alternative(self.build(&alt_name, alt, false)?);
            }
            choice.into()
        } else {
            match raw.type_name() {
                Some("object") => {
                    let mut object = ObjectProperty::new(name);
                    let names = raw.required_names();
                    for (key, child) in &raw.properties {
                        let child_required = names.contains(key) || child.required_flag();
                        object = object.property(self.build(key, child, child_required)?);
                    }
                    object.into()
                }
                Some("array") => {
                    let items = match &raw.items {
                        Some(items) => self.build(name, items, false)?,
                        None => StringProperty::new(name).into(),
                    };
                    let mut array = ArrayProperty::new(name, items);
                    array.min_items = raw.min_items;
                    array.max_items = raw.max_items;
                    array.into()
                }
                Some("integer") => {
                    let mut p = IntegerProperty::new(name);
                    p.simple.pattern = pattern(name, raw)?;
                    p.simple.enumeration = raw.enum_.as_deref().map(|v| integer_enum(name, v)).transpose()?;
                    p.min = raw.minimum.map(|v| integral(name, "minimum", v)).transpose()?;
                    p.max = raw.maximum.map(|v| integral(name, "maximum", v)).transpose()?;
                    p.into()
                }
                Some("number") => {
                    let mut p = FloatProperty::new(name);
                    p.simple.pattern = pattern(name, raw)?;
                    p.simple.enumeration = raw
                        .enum_
                        .as_deref()
                        .map(|v| float_enum(name, v))
                        .transpose()?;
                    p.min = raw.minimum.map(Into::into);
                    p.max = raw.maximum.map(Into::into);
                    p.into()
                }
                Some("boolean") => BooleanProperty::new(name).into(),
                _ => match raw.format.as_deref().and_then(TemporalFormat::from_json_format) {
                    Some(format) => {
                        let mut p = TemporalProperty::new(name, format);
                        p.simple.pattern = pattern(name, raw)?;
                        p.simple.enumeration = raw.enum_.as_deref().map(text_enum);
                        p.into()
                    }
                    None => {
                        let mut p = StringProperty::new(name);
                        p.simple.pattern = pattern(name, raw)?;
                        p.simple.enumeration = raw.enum_.as_deref().map(text_enum);
                        p.min_length = raw.min_length;
                        p.max_length = raw.max_length;
                        p.into()
                    }
                },
            }
        };

        let property = property.with_required(required);
        Ok(match &raw.description {
            Some(description) => property.with_description(description.as_str()),
            None => property,
        })
    }

    fn resolve(&mut self, name: &str, reference: &str, required: bool) -> Result<Property, ParseError> {
        let unresolved = || ParseError::UnresolvedReference { reference: reference.to_string() };
        let key = reference.strip_prefix(DEFINITIONS_PREFIX).ok_or_else(unresolved)?;
        let definitions = self.definitions;
        let target = definitions.get(key).ok_or_else(unresolved)?;
        if !self.resolving.insert(key.to_string()) {
            return Err(ParseError::RecursiveReference { reference: reference.to_string() });
        }
        let resolved = self.build(name, target, required);
        self.resolving.remove(key);
        resolved
    }
}

fn pattern(name: &str, raw: &RawSchema) -> Result<Option<String>, ParseError> {
    checked_pattern(name, raw.pattern.as_deref())
}

/// Rejects patterns the validator could never compile.
pub(crate) fn checked_pattern(name: &str, pattern: Option<&str>) -> Result<Option<String>, ParseError> {
    match pattern {
        None => Ok(None),
        Some(p) => match Regex::new(&format!("^(?:{p})$")) {
            Ok(_) => Ok(Some(p.to_string())),
            Err(_) => Err(ParseError::InvalidPattern {
                property: name.to_string(),
                pattern: p.to_string(),
            }),
        },
    }
}

pub(crate) fn integral(name: &str, field: &str, value: f64) -> Result<i64, ParseError> {
    if value.fract() == 0.0 && value.abs() < i64::MAX as f64 {
        Ok(value as i64)
    } else {
        Err(ParseError::InvalidConstraint {
            property: name.to_string(),
            message: format!("{field} must be an integer, got {value}"),
        })
    }
}

pub(crate) fn text_enum(values: &[Value]) -> Vec<String> {
    values
        .iter()
        .map(|v| match v {
            Value::String(s) => s.clone(),
            other => other.to_string(),
        })
        .collect()
}

pub(crate) fn integer_enum(name: &str, values: &[Value]) -> Result<Vec<i64>, ParseError> {
    values
        .iter()
        .map(|v| {
            v.as_i64().ok_or_else(|| ParseError::InvalidConstraint {
                property: name.to_string(),
                message: format!("enumeration value {v} is not an integer"),
            })
        })
        .collect()
}

pub(crate) fn float_enum(
    name: &str,
    values: &[Value],
) -> Result<Vec<ordered_float::OrderedFloat<f64>>, ParseError> {
    values
        .iter()
        .map(|v| {
            v.as_f64().map(Into::into).ok_or_else(|| ParseError::InvalidConstraint {
                property: name.to_string(),
                message: format!("enumeration value {v} is not a number"),
            })
        })
        .collect()
}

// ————————————————————————————————————————————————————————————————————————————
// TESTS
// ————————————————————————————————————————————————————————————————————————————

#[cfg(test)]
mod tests {
    use super::*;
    use crate::property::Kind;
    use crate::validate::{Constraint, validate};
    use serde_json::json;

    const NEWS: &str = r#"{
        "type": "object",
        "properties": {
            "title": {"type": "string", "minLength": 3, "maxLength": 16, "pattern": "[A-z]+"}
        },
        "required": ["title"]
    }"#;

    #[test]
    fn parse_then_validate_title() {
        let schema = JsonSchemaParser::parse(NEWS).unwrap();
        assert_eq!(schema.name(), DEFAULT_ROOT_NAME);
        let err = validate(&schema, &json!({ "title": "ab" })).unwrap_err();
        let failure = err.first().unwrap();
        assert_eq!(failure.name, "title");
        assert_eq!(failure.constraint, Constraint::MinLength);
        assert!(validate(&schema, &json!({ "title": "abcdef" })).is_ok());
    }

    #[test]
    fn kinds_follow_type_and_format() {
        let schema = JsonSchemaParser::parse(
            r#"{
                "title": "news",
                "type": "object",
                "properties": {
                    "id": {"type": "integer", "minimum": 1},
                    "price": {"type": "number", "maximum": 99.5},
                    "read": {"type": "boolean"},
                    "date": {"type": "string", "format": "date-time"},
                    "day": {"type": "string", "format": "date"},
                    "at": {"type": "string", "format": "time"},
                    "ttl": {"type": "string", "format": "duration"},
                    "tags": {"type": "array", "items": {"type": "string"}, "maxItems": 4},
                    "nick": {"type": ["string", "null"]},
                    "blob": {}
                }
            }"#,
        )
        .unwrap();
        let Property::Object(o) = &schema else { panic!("expected object") };
        let kinds: Vec<Kind> = o.iter().map(|p| p.kind()).collect();
        assert_eq!(
            kinds,
            [
                Kind::Integer,
                Kind::Float,
                Kind::Boolean,
                Kind::DateTime,
                Kind::Date,
                Kind::Time,
                Kind::Duration,
                Kind::Array,
                Kind::String,
                Kind::String
            ]
        );
        assert_eq!(schema.name(), "news");
        let Some(Property::Array(tags)) = o.get("tags") else { panic!("expected array") };
        assert_eq!(tags.max_items, Some(4));
    }

    #[test]
    fn draft3_required_flag() {
        let schema = JsonSchemaParser::parse(
            r#"{"type": "object", "properties": {"id": {"type": "integer", "required": true}}}"#,
        )
        .unwrap();
        let Property::Object(o) = &schema else { panic!("expected object") };
        assert!(o.get("id").unwrap().is_required());
    }

    #[test]
    fn definitions_are_inlined_by_reference() {
        let schema = JsonSchemaParser::parse(
            r##"{
                "type": "object",
                "definitions": {
                    "location": {"type": "object", "properties": {"lat": {"type": "integer"}}}
                },
                "properties": {
                    "origin": {"$ref": "#/definitions/location"},
                    "target": {"$ref": "#/definitions/location"}
                },
                "required": ["target"]
            }"##,
        )
        .unwrap();
        let Property::Object(o) = &schema else { panic!("expected object") };
        let origin = o.get("origin").unwrap();
        let target = o.get("target").unwrap();
        assert_eq!(origin.kind(), Kind::Object);
        assert!(target.is_required());
        assert_eq!(origin.clone().with_required(true).id(), target.id());
    }

    #[test]
    fn recursive_and_dangling_references_fail() {
        let recursive = r##"{
            "type": "object",
            "definitions": {"node": {"type": "object", "properties": {"next": {"$ref": "#/definitions/node"}}}},
            "properties": {"head": {"$ref": "#/definitions/node"}}
        }"##;
        assert!(matches!(
            JsonSchemaParser::parse(recursive),
            Err(ParseError::RecursiveReference { .. })
        ));
        let dangling = r##"{"type": "object", "properties": {"a": {"$ref": "#/definitions/x"}}}"##;
        assert!(matches!(
            JsonSchemaParser::parse(dangling),
            Err(ParseError::UnresolvedReference { .. })
        ));
    }

    #[test]
    fn malformed_input_is_reported_with_path() {
        let err = JsonSchemaParser::parse(r#"{"type": "object", "properties": {"a": {"minLength": "x"}}}"#)
            .unwrap_err();
        match err {
            ParseError::Json { path, .. } => assert_eq!(path, "properties.a.minLength"),
            other => panic!("unexpected error {other:?}"),
        }
        assert!(matches!(
            JsonSchemaParser::parse(r#"{"type": "string", "pattern": "[a-"}"#),
            Err(ParseError::InvalidPattern { .. })
        ));
        assert!(matches!(
            JsonSchemaParser::parse(r#"{"type": "integer", "minimum": 1.5}"#),
            Err(ParseError::InvalidConstraint { .. })
        ));
    }

    #[test]
    fn one_of_builds_a_choice() {
        let schema = JsonSchemaParser::parse(
            r#"{"oneOf": [
                {"title": "person", "type": "object", "properties": {"name": {"type": "string"}}},
                {"title": "place", "type": "object", "properties": {"lat": {"type": "number"}}}
            ]}"#,
        )
        .unwrap();
        let Property::Choice(c) = &schema else { panic!("expected choice") };
        let names: Vec<&str> = c.alternatives.iter().map(|a| a.name()).collect();
        assert_eq!(names, ["person", "place"]);
    }

    #[test]
    fn yaml_mappings_parse_too() {
        let yaml: serde_yaml::Value =
            serde_yaml::from_str("type: object\nproperties:\n  limit:\n    type: integer\n").unwrap();
        let schema = JsonSchemaParser::parse_deserializer(yaml).unwrap();
        let Property::Object(o) = &schema else { panic!("expected object") };
        assert_eq!(o.get("limit").unwrap().kind(), Kind::Integer);
    }
}
