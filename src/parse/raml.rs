//! RAML route documents → [`Resource`].
//!
//! Only the parts needed to document one resource are read: the resource's
//! methods, their traits, uri and query parameters, and the
//! `application/json` schemas of request and response bodies. Body schemas
//! are JSON Schema, given inline, through `!include`, or by name from the
//! top-level `schemas` section.
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use indexmap::IndexMap;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::Deserialize;
use serde_yaml::{Mapping, Value};

use crate::error::ParseError;
use crate::parse::include::IncludeResolver;
use crate::parse::json_schema::{
    JsonSchemaParser, checked_pattern, float_enum, integer_enum, integral, text_enum,
};
use crate::path_de;
use crate::property::{
    BooleanProperty, FloatProperty, IntegerProperty, Property, StringProperty, TemporalProperty,
};
use crate::resource::{Resource, ResourceMethod};
use crate::view::Method;

const JSON_MEDIA_TYPE: &str = "application/json";

static COLON_PARAMETER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r":([A-Za-z0-9_]+)").expect("static regex"));

// ————————————————————————————————————————————————————————————————————————————
// FRONT API
// ————————————————————————————————————————————————————————————————————————————

pub struct RamlParser;

impl RamlParser {
    /// Reads `file` and extracts the resource declared for `path`.
    pub fn parse_file(file: &Path, path: &str) -> Result<Resource, ParseError> {
        let source = fs::read_to_string(file)
            .map_err(|source| ParseError::Io { path: file.to_path_buf(), source })?;
        let base_dir = file.parent().map(Path::to_path_buf).unwrap_or_default();
        Document::load(&source, file.to_path_buf(), &base_dir, Some(file))?.resource(path)
    }

    /// Like [`RamlParser::parse_file`] for a document held in memory.
    /// Includes are resolved against `base_dir`.
    pub fn parse_str(source: &str, base_dir: &Path, path: &str) -> Result<Resource, ParseError> {
        Document::load(source, base_dir.to_path_buf(), base_dir, None)?.resource(path)
    }
}

/// `/foo/:id` → `/foo/{id}`.
pub fn normalize_route(path: &str) -> String {
    COLON_PARAMETER.replace_all(path, "{$1}").into_owned()
}

// ————————————————————————————————————————————————————————————————————————————
// RAW SHAPE
// ————————————————————————————————————————————————————————————————————————————

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawParameter {
    #[serde(rename = "type")]
    type_: Option<String>,
    description: Option<String>,
    required: Option<bool>,
    #[serde(rename = "enum")]
    enum_: Option<Vec<serde_json::Value>>,
    pattern: Option<String>,
    min_length: Option<usize>,
    max_length: Option<usize>,
    minimum: Option<f64>,
    maximum: Option<f64>,
}

// ————————————————————————————————————————————————————————————————————————————
// IMPLEMENTATION
// ————————————————————————————————————————————————————————————————————————————

struct Document {
    file: PathBuf,
    base_dir: PathBuf,
    root: Value,
    traits: IndexMap<String, Value>,
    schemas: IndexMap<String, Value>,
    resolver: IncludeResolver,
}

impl Document {
    fn load(
        source: &str,
        file: PathBuf,
        base_dir: &Path,
        origin: Option<&Path>,
    ) -> Result<Self, ParseError> {
        let root: Value = serde_yaml::from_str(source)
            .map_err(|err| ParseError::Yaml { file: file.clone(), message: err.to_string() })?;
        let mut document = Document {
            file,
            base_dir: base_dir.to_path_buf(),
            root,
            traits: IndexMap::new(),
            schemas: IndexMap::new(),
            resolver: IncludeResolver::new(origin),
        };
        document.traits = document.named_section("traits", false)?;
        document.schemas = document.named_section("schemas", true)?;
        Ok(document)
    }

    fn malformed(&self, message: impl Into<String>) -> ParseError {
        ParseError::Malformed { file: self.file.clone(), message: message.into() }
    }

    /// Reads a top-level section written either as a map of names
    /// (RAML 1.0) or as a list of single-entry maps (RAML 0.8).
    /// `schema_values` also expands plain `"!include file"` strings.
    fn named_section(&mut self, key: &str, schema_values: bool) -> Result<IndexMap<String, Value>, ParseError> {
        let entries: Vec<(Value, Value)> = match self.root.get(key) {
            None | Some(Value::Null) => return Ok(IndexMap::new()),
            Some(Value::Mapping(m)) => m.iter().map(|(k, v)| (k.clone(), v.clone())).collect(),
            Some(Value::Sequence(items)) => {
                let mut entries = Vec::new();
                for item in items {
                    let Value::Mapping(m) = item else {
                        return Err(self.malformed(format!("`{key}` entries must be maps")));
                    };
                    entries.extend(m.iter().map(|(k, v)| (k.clone(), v.clone())));
                }
                entries
            }
            Some(_) => return Err(self.malformed(format!("`{key}` must be a map or a list"))),
        };

        let mut section = IndexMap::with_capacity(entries.len());
        for (name, body) in entries {
            let name = name
                .as_str()
                .ok_or_else(|| self.malformed(format!("`{key}` names must be strings")))?
                .to_string();
            let body = self.resolver.resolve(body, &self.base_dir)?;
            let included = match &body {
                Value::String(text) if schema_values => {
                    self.resolver.resolve_directive(text, &self.base_dir)?
                }
                _ => None,
            };
            section.insert(name, included.unwrap_or(body));
        }
        Ok(section)
    }

    fn resource(mut self, path: &str) -> Result<Resource, ParseError> {
        let route = normalize_route(path);
        let node = find_resource(&self.root, &route)
            .cloned()
            .ok_or_else(|| ParseError::ResourceNotFound { path: route.clone(), file: self.file.clone() })?;
        let node = match self.resolver.resolve(node, &self.base_dir)? {
            Value::Null => Mapping::new(),
            Value::Mapping(mapping) => mapping,
            _ => return Err(self.malformed(format!("resource `{route}` must be a map"))),
        };

        let resource_traits = self.applied_traits(node.get("is"))?;
        let mut resource = Resource {
            path: route.clone(),
            title: node.get("displayName").and_then(Value::as_str).map(str::to_string),
            description: node.get("description").and_then(Value::as_str).map(str::to_string),
            api_title: self.root.get("title").and_then(Value::as_str).map(str::to_string),
            version: api_version(&self.root),
            path_parameters: self.parameters(node.get("uriParameters"), true)?,
            methods: BTreeMap::new(),
        };

        for (key, body) in &node {
            let Some(method) = key.as_str().and_then(Method::parse) else { continue };
            let mut definition = match body {
                Value::Null => Value::Mapping(Mapping::new()),
                Value::Mapping(_) => body.clone(),
                _ => return Err(self.malformed(format!("method `{method}` must be a map"))),
            };
            let own_traits = self.applied_traits(definition.get("is"))?;
            merge_additive(&mut definition, &own_traits);
            merge_additive(&mut definition, &resource_traits);
            let method_definition = self.method(&route, method, &definition)?;
            resource.methods.insert(method, method_definition);
        }

        tracing::debug!(
            path = %resource.path,
            version = resource.version,
            methods = resource.methods.len(),
            "parsed raml resource"
        );
        Ok(resource)
    }

    /// Merges every trait named in an `is:` list, earlier traits winning.
    fn applied_traits(&self, is: Option<&Value>) -> Result<Value, ParseError> {
        let references: Vec<&Value> = match is {
            None | Some(Value::Null) => return Ok(Value::Null),
            Some(Value::Sequence(items)) => items.iter().collect(),
            Some(single) => vec![single],
        };

        let mut merged = Value::Null;
        for reference in references {
            let name = match reference {
                Value::String(name) => Some(name.as_str()),
                Value::Mapping(m) => m.iter().next().and_then(|(k, _)| k.as_str()),
                _ => None,
            }
            .ok_or_else(|| self.malformed(format!("invalid trait reference {reference:?}")))?;
            let body = self
                .traits
                .get(name)
                .ok_or_else(|| self.malformed(format!("unknown trait `{name}`")))?;
            tracing::debug!(name, "applying trait");
            merge_additive(&mut merged, body);
        }
        Ok(merged)
    }

    fn method(&mut self, route: &str, method: Method, definition: &Value) -> Result<ResourceMethod, ParseError> {
        let mut parsed = ResourceMethod {
            description: definition.get("description").and_then(Value::as_str).map(str::to_string),
            query_parameters: self.parameters(definition.get("queryParameters"), false)?,
            request: self.body_schema(
                definition.get("body"),
                &format!("{method} {route} request"),
            )?,
            responses: BTreeMap::new(),
        };

        if let Some(Value::Mapping(rows)) = definition.get("responses") {
            for (code, row) in rows {
                let status = status_code(code)
                    .ok_or_else(|| self.malformed(format!("invalid response code {code:?}")))?;
                let location = format!("{method} {route} response {status}");
                if let Some(schema) = self.body_schema(row.get("body"), &location)? {
                    parsed.responses.insert(status, schema);
                }
            }
        }
        Ok(parsed)
    }

    fn parameters(&self, node: Option<&Value>, default_required: bool) -> Result<Vec<Property>, ParseError> {
        let Some(Value::Mapping(mapping)) = node else {
            return Ok(Vec::new());
        };
        mapping
            .iter()
            .map(|(name, definition)| {
                let name = name
                    .as_str()
                    .ok_or_else(|| self.malformed(format!("invalid parameter name {name:?}")))?;
                parameter(name, definition, default_required).map_err(|source| ParseError::Schema {
                    location: format!("parameter `{name}`"),
                    source: Box::new(source),
                })
            })
            .collect()
    }

    fn body_schema(&mut self, body: Option<&Value>, location: &str) -> Result<Option<Property>, ParseError> {
        let Some(body) = body else {
            return Ok(None);
        };
        let media = body.get(JSON_MEDIA_TYPE).unwrap_or(body);
        let parsed = match media.get("schema") {
            None | Some(Value::Null) => return Ok(None),
            Some(Value::String(text)) => match self.resolver.resolve_directive(text, &self.base_dir)? {
                Some(included) => schema_from_value(&included),
                None => match self.schemas.get(text.trim()) {
                    Some(named) => schema_from_value(named),
                    None => JsonSchemaParser::parse(text),
                },
            },
            Some(inline) => schema_from_value(inline),
        };
        parsed.map(Some).map_err(|source| ParseError::Schema {
            location: location.to_string(),
            source: Box::new(source),
        })
    }
}

// ————————————————————————————————————————————————————————————————————————————
// INTERNAL HELPERS
// ————————————————————————————————————————————————————————————————————————————

fn find_resource<'a>(node: &'a Value, route: &str) -> Option<&'a Value> {
    for (key, child) in node.as_mapping()? {
        let Some(key) = key.as_str().filter(|k| k.starts_with('/')) else { continue };
        let key = normalize_route(key);
        if key == route {
            return Some(child);
        }
        if let Some(rest) = route.strip_prefix(key.as_str()) {
            if rest.starts_with('/') {
                if let Some(found) = find_resource(child, rest) {
                    return Some(found);
                }
            }
        }
    }
    None
}

/// Fields already present on `target` win; `null` counts as absent.
fn merge_additive(target: &mut Value, source: &Value) {
    if target.is_null() {
        *target = source.clone();
        return;
    }
    let (Some(target), Some(source)) = (target.as_mapping_mut(), source.as_mapping()) else {
        return;
    };
    for (key, value) in source {
        match target.get_mut(key) {
            Some(existing) => merge_additive(existing, value),
            None => {
                target.insert(key.clone(), value.clone());
            }
        }
    }
}

fn schema_from_value(value: &Value) -> Result<Property, ParseError> {
    match value {
        Value::String(text) => JsonSchemaParser::parse(text),
        other => JsonSchemaParser::parse_deserializer(other.clone()),
    }
}

fn parameter(name: &str, definition: &Value, default_required: bool) -> Result<Property, ParseError> {
    let raw: RawParameter = match definition {
        Value::Null => RawParameter::default(),
        other => path_de::deserialize_with_path(other.clone())?,
    };
    let pattern = checked_pattern(name, raw.pattern.as_deref())?;

    let property: Property = match raw.type_.as_deref() {
        Some("integer") => {
            let mut p = IntegerProperty::new(name);
            p.simple.pattern = pattern;
            p.simple.enumeration = raw.enum_.as_deref().map(|v| integer_enum(name, v)).transpose()?;
            p.min = raw.minimum.map(|v| integral(name, "minimum", v)).transpose()?;
            p.max = raw.maximum.map(|v| integral(name, "maximum", v)).transpose()?;
            p.into()
        }
        Some("number") => {
            let mut p = FloatProperty::new(name);
            p.simple.pattern = pattern;
            p.simple.enumeration = raw.enum_.as_deref().map(|v| float_enum(name, v)).transpose()?;
            p.min = raw.minimum.map(Into::into);
            p.max = raw.maximum.map(Into::into);
            p.into()
        }
        Some("boolean") => BooleanProperty::new(name).into(),
        Some("date") => {
            let mut p = TemporalProperty::datetime(name);
            p.simple.pattern = pattern;
            p.simple.enumeration = raw.enum_.as_deref().map(text_enum);
            p.into()
        }
        _ => {
            let mut p = StringProperty::new(name);
            p.simple.pattern = pattern;
            p.simple.enumeration = raw.enum_.as_deref().map(text_enum);
            p.min_length = raw.min_length;
            p.max_length = raw.max_length;
            p.into()
        }
    };

    let property = property.with_required(raw.required.unwrap_or(default_required));
    Ok(match raw.description {
        Some(description) => property.with_description(description),
        None => property,
    })
}

fn status_code(code: &Value) -> Option<u16> {
    match code {
        Value::Number(n) => n.as_u64().and_then(|n| u16::try_from(n).ok()),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

/// `"v2"`, `"v2.1"` and `2.0` → 2. The leading integer counts; absent, zero
/// or non-numeric versions fall back to 1.
fn api_version(root: &Value) -> u32 {
    let parsed = match root.get("version") {
        Some(Value::Number(n)) => match n.as_u64() {
            Some(n) => u32::try_from(n).ok(),
            None => n.as_f64().filter(|f| f.is_finite() && *f >= 0.0).map(|f| f.trunc() as u32),
        },
        Some(Value::String(s)) => {
            let s = s.trim();
            let s = s.strip_prefix(['v', 'V']).unwrap_or(s);
            let digits = s.find(|c: char| !c.is_ascii_digit()).unwrap_or(s.len());
            s[..digits].parse().ok()
        }
        _ => None,
    };
    match parsed {
        Some(version) if version > 0 => version,
        _ => {
            tracing::debug!(declared = ?root.get("version"), "defaulting api version to 1");
            1
        }
    }
}

// ————————————————————————————————————————————————————————————————————————————
// TESTS
// ————————————————————————————————————————————————————————————————————————————
