//! Projections of property trees into other schema languages.
//!
//! Every generator walks the tree itself but shares the helpers below:
//! [`walk`] for declaration-order traversal, [`distinct`] to collect one
//! node per id, and [`Facets`] for the scalar constraints.
//!
//! Shapes are deduplicated by id. A shared type takes its name and
//! description from the first node of that id in declaration order.
pub mod html;
pub mod json_schema;
pub(crate) mod markup;
pub mod swagger;
pub mod xsd;

use indexmap::IndexMap;
use serde_json::{Map, Value};

use crate::error::GenerationError;
use crate::property::{Kind, Property};
use crate::view::ResourceView;

pub use html::HtmlGenerator;
pub use json_schema::JsonSchemaGenerator;
pub use swagger::{SwaggerGenerator, SwaggerOptions};
pub use xsd::{XsdGenerator, XsdOptions};

// ————————————————————————————————————————————————————————————————————————————
// CONTRACTS
// ————————————————————————————————————————————————————————————————————————————

/// Renders one root schema.
pub trait SchemaGenerator {
    fn generate(&self, schema: &Property) -> Result<String, GenerationError>;
}

/// Renders every operation of one resource.
pub trait ViewGenerator {
    fn generate_view(&self, view: &ResourceView) -> Result<String, GenerationError>;
}

// ————————————————————————————————————————————————————————————————————————————
// TRAVERSAL
// ————————————————————————————————————————————————————————————————————————————

/// Visits `root` and every descendant, parents first, children in
/// declaration order.
pub(crate) fn walk<'a, F>(root: &'a Property, visit: &mut F)
where
    F: FnMut(&'a Property),
{
    visit(root);
    match root {
        Property::Object(object) => {
            for child in &object.properties {
                walk(child, visit);
            }
        }
        Property::Array(array) => walk(&array.items, visit),
        Property::Choice(choice) => {
            for alternative in &choice.alternatives {
                walk(alternative, visit);
            }
        }
        _ => {}
    }
}

/// Fails on the first object that declares a child name twice.
pub(crate) fn check_names(root: &Property) -> Result<(), GenerationError> {
    let mut duplicate = None;
    walk(root, &mut |p| {
        if duplicate.is_some() {
            return;
        }
        if let Property::Object(object) = p {
            if let Some(name) = object.duplicate_name() {
                duplicate = Some(GenerationError::DuplicateProperty {
                    parent: object.meta.name.clone(),
                    name: name.to_string(),
                });
            }
        }
    });
    duplicate.map_or(Ok(()), Err)
}

/// One node per id among those matching `keep`, in first-visit order.
///
/// Ids ignore names and descriptions, so the first node visited for an id
/// supplies both for every emitted type of that shape.
pub(crate) fn distinct<'a>(
    root: &'a Property,
    keep: impl Fn(&Property) -> bool,
) -> IndexMap<String, &'a Property> {
    let mut found = IndexMap::new();
    walk(root, &mut |p| {
        if keep(p) {
            found.entry(p.id()).or_insert(p);
        }
    });
    tracing::trace!(root = root.name(), types = found.len(), "collected distinct types");
    found
}

// ————————————————————————————————————————————————————————————————————————————
// SCALAR CONSTRAINTS
// ————————————————————————————————————————————————————————————————————————————

/// The constraints of a scalar node as JSON values, whatever its kind.
#[derive(Debug, Default)]
pub(crate) struct Facets<'a> {
    pub pattern: Option<&'a str>,
    pub enumeration: Option<Vec<Value>>,
    pub min_length: Option<usize>,
    pub max_length: Option<usize>,
    pub minimum: Option<Value>,
    pub maximum: Option<Value>,
}

impl<'a> Facets<'a> {
    pub(crate) fn of(property: &'a Property) -> Self {
        match property {
            Property::String(p) => Facets {
                pattern: p.simple.pattern.as_deref(),
                enumeration: p.simple.enumeration.as_ref().map(|v| v.iter().cloned().map(Value::from).collect()),
                min_length: p.min_length,
                max_length: p.max_length,
                ..Facets::default()
            },
            Property::Integer(p) => Facets {
                pattern: p.simple.pattern.as_deref(),
                enumeration: p.simple.enumeration.as_ref().map(|v| v.iter().copied().map(Value::from).collect()),
                minimum: p.min.map(Value::from),
                maximum: p.max.map(Value::from),
                ..Facets::default()
            },
            Property::Float(p) => Facets {
                pattern: p.simple.pattern.as_deref(),
                enumeration: p.simple.enumeration.as_ref().map(|v| v.iter().map(|f| Value::from(f.0)).collect()),
                minimum: p.min.map(|f| Value::from(f.0)),
                maximum: p.max.map(|f| Value::from(f.0)),
                ..Facets::default()
            },
            Property::Temporal(p) => Facets {
                pattern: p.simple.pattern.as_deref(),
                enumeration: p.simple.enumeration.as_ref().map(|v| v.iter().cloned().map(Value::from).collect()),
                ..Facets::default()
            },
            _ => Facets::default(),
        }
    }

    /// Lower bound of any flavour: length, value.
    pub(crate) fn lower(&self) -> Option<String> {
        self.min_length.map(|n| n.to_string()).or_else(|| self.minimum.as_ref().map(plain))
    }

    pub(crate) fn upper(&self) -> Option<String> {
        self.max_length.map(|n| n.to_string()).or_else(|| self.maximum.as_ref().map(plain))
    }
}

/// A JSON value as display text, strings without their quotes.
pub(crate) fn plain(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// JSON Schema vocabulary for a scalar: `type`, `format`, `description`
/// and whatever constraints are set.
pub(crate) fn scalar_schema(property: &Property) -> Map<String, Value> {
    let mut out = Map::new();
    let kind = property.kind();
    let type_name = match kind {
        Kind::Integer => "integer",
        Kind::Float => "number",
        Kind::Boolean => "boolean",
        _ => "string",
    };
    out.insert("type".into(), Value::from(type_name));
    if let Property::Temporal(t) = property {
        out.insert("format".into(), Value::from(t.format.json_format()));
    }
    if let Some(description) = property.description() {
        out.insert("description".into(), Value::from(description));
    }

    let facets = Facets::of(property);
    if let Some(pattern) = facets.pattern {
        out.insert("pattern".into(), Value::from(pattern));
    }
    if let Some(values) = facets.enumeration {
        out.insert("enum".into(), Value::Array(values));
    }
    if let Some(n) = facets.min_length {
        out.insert("minLength".into(), Value::from(n));
    }
    if let Some(n) = facets.max_length {
        out.insert("maxLength".into(), Value::from(n));
    }
    if let Some(v) = facets.minimum {
        out.insert("minimum".into(), v);
    }
    if let Some(v) = facets.maximum {
        out.insert("maximum".into(), v);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::property::{ArrayProperty, FloatProperty, ObjectProperty, StringProperty};

    fn author() -> ObjectProperty {
        ObjectProperty::new("author").property(StringProperty::new("title"))
    }

    #[test]
    fn distinct_keeps_first_visit_order_and_one_per_id() {
        let root: Property = ObjectProperty::new("news")
            .property(ArrayProperty::new("receiver", author()))
            .property(author())
            .property(ObjectProperty::new("meta").property(FloatProperty::new("score")))
            .into();
        let objects = distinct(&root, |p| p.kind() == Kind::Object);
        let names: Vec<&str> = objects.values().map(|p| p.name()).collect();
        assert_eq!(names, ["news", "author", "meta"]);
    }

    #[test]
    fn shared_shapes_take_the_first_description() {
        let root: Property = ObjectProperty::new("news")
            .property(author().describe("Who wrote it"))
            .property(author().describe("Who edited it"))
            .into();
        let objects = distinct(&root, |p| p.kind() == Kind::Object);
        assert_eq!(objects.len(), 2);
        assert_eq!(objects[&author().id()].description(), Some("Who wrote it"));
    }

    #[test]
    fn duplicate_children_are_rejected() {
        let root: Property = ObjectProperty::new("news")
            .property(ObjectProperty::new("inner").property(StringProperty::new("a")).property(StringProperty::new("a")))
            .into();
        match check_names(&root) {
            Err(GenerationError::DuplicateProperty { parent, name }) => {
                assert_eq!(parent, "inner");
                assert_eq!(name, "a");
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn scalar_vocabulary() {
        let title: Property = StringProperty::new("title").min_length(3).pattern("[A-z]+").into();
        let schema = Value::Object(scalar_schema(&title));
        assert_eq!(schema, serde_json::json!({"type": "string", "pattern": "[A-z]+", "minLength": 3}));

        let price: Property = FloatProperty::new("price").min(1.5).into();
        let facets = Facets::of(&price);
        assert_eq!(facets.lower().as_deref(), Some("1.5"));
        assert_eq!(facets.upper(), None);
    }
}
