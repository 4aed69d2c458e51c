//! Property tree → JSON Schema (draft 4) text.
//!
//! Writes the same vocabulary [`crate::parse::JsonSchemaParser`] reads, so a
//! generated document parses back to a tree with the same ids. Object shapes
//! that occur more than once below the root go to `definitions` under
//! `ref<id>` and are referenced by `$ref`; the definition carries the
//! description of the first occurrence.
use std::collections::{HashMap, HashSet};

use serde_json::{Map, Value, json};

use crate::error::GenerationError;
use crate::generate::{SchemaGenerator, check_names, scalar_schema, walk};
use crate::property::{ArrayProperty, ChoiceProperty, ObjectProperty, Property};

pub const DRAFT: &str = "http://json-schema.org/draft-04/schema#";

#[derive(Debug, Default, Clone, Copy)]
pub struct JsonSchemaGenerator;

impl JsonSchemaGenerator {
    pub fn new() -> Self {
        Self
    }

    /// The generated document as a JSON value.
    pub fn to_value(&self, root: &Property) -> Result<Value, GenerationError> {
        check_names(root)?;
        let mut emitter = Emitter { shared: repeated_objects(root), definitions: Map::new() };
        let body = emitter.schema(root, true);

        let mut doc = Map::new();
        doc.insert("$schema".into(), Value::from(DRAFT));
        doc.insert("title".into(), Value::from(root.name()));
        if let Value::Object(body) = body {
            doc.extend(body);
        }
        if !emitter.definitions.is_empty() {
            doc.insert("definitions".into(), Value::Object(emitter.definitions));
        }
        Ok(Value::Object(doc))
    }
}

impl SchemaGenerator for JsonSchemaGenerator {
    fn generate(&self, schema: &Property) -> Result<String, GenerationError> {
        Ok(serde_json::to_string_pretty(&self.to_value(schema)?)?)
    }
}

// ————————————————————————————————————————————————————————————————————————————
// IMPLEMENTATION
// ————————————————————————————————————————————————————————————————————————————

struct Emitter {
    shared: HashSet<String>,
    definitions: Map<String, Value>,
}

impl Emitter {
    fn schema(&mut self, property: &Property, inline: bool) -> Value {
        match property {
            Property::Object(object) => {
                let id = object.id();
                if inline || !self.shared.contains(&id) {
                    return self.object(object);
                }
                let key = format!("ref{id}");
                if !self.definitions.contains_key(&key) {
                    let body = self.object(object);
                    self.definitions.insert(key.clone(), body);
                }
                json!({ "$ref": format!("#/definitions/{key}") })
            }
            Property::Array(array) => self.array(array),
            Property::Choice(choice) => self.choice(choice),
            scalar => Value::Object(scalar_schema(scalar)),
        }
    }

    fn object(&mut self, object: &ObjectProperty) -> Value {
        let mut out = Map::new();
        out.insert("type".into(), Value::from("object"));
        if let Some(description) = &object.meta.description {
            out.insert("description".into(), Value::from(description.as_str()));
        }
        let mut properties = Map::new();
        for child in &object.properties {
            properties.insert(child.name().to_string(), self.schema(child, false));
        }
        out.insert("properties".into(), Value::Object(properties));
        let required: Vec<Value> = object
            .properties
            .iter()
            .filter(|p| p.is_required())
            .map(|p| Value::from(p.name()))
            .collect();
        if !required.is_empty() {
            out.insert("required".into(), Value::Array(required));
        }
        Value::Object(out)
    }

    fn array(&mut self, array: &ArrayProperty) -> Value {
        let mut o = json!({ "type": "array" });
        if let Some(description) = &array.meta.description {
            o["description"] = Value::from(description.as_str());
        }
        o["items"] = self.schema(&array.items, false);
        if let Some(n) = array.min_items { o["minItems"] = Value::from(n); }
        if let Some(n) = array.max_items { o["maxItems"] = Value::from(n); }
        o
    }

    fn choice(&mut self, choice: &ChoiceProperty) -> Value {
        let alternatives: Vec<Value> = choice
            .alternatives
            .iter()
            .map(|alt| {
                let mut schema = self.schema(alt, false);
                schema["title"] = Value::from(alt.name());
                schema
            })
            .collect();
        let mut o = json!({ "oneOf": alternatives });
        if let Some(description) = &choice.meta.description {
            o["description"] = Value::from(description.as_str());
        }
        o
    }
}

/// Ids of object shapes occurring more than once below the root.
fn repeated_objects(root: &Property) -> HashSet<String> {
    let mut counts: HashMap<String, usize> = HashMap::new();
    walk(root, &mut |p| {
        if matches!(p, Property::Object(_)) && !std::ptr::eq(p, root) {
            *counts.entry(p.id()).or_default() += 1;
        }
    });
    counts.into_iter().filter(|(_, n)| *n > 1).map(|(id, _)| id).collect()
}

// ————————————————————————————————————————————————————————————————————————————
// TESTS
// ————————————————————————————————————————————————————————————————————————————
