//! Property tree / resource view → XML Schema.
//!
//! Objects, choices and constrained scalars become named types `type<id>`,
//! emitted once per id. Arrays are flattened into repeated elements unless
//! they are used as a type themselves (a root, or the items of another
//! array), in which case they get a wrapper complex type.
//!
//! A named type is annotated with the description of the first node of its
//! id. Element annotations always come from the element's own node.
use indexmap::IndexMap;

use crate::error::GenerationError;
use crate::generate::markup::Markup;
use crate::generate::{Facets, SchemaGenerator, ViewGenerator, check_names, plain};
use crate::property::{Kind, Property};
use crate::view::{OperationKey, ResourceView, Role};

const XS_NAMESPACE: &str = "http://www.w3.org/2001/XMLSchema";

#[derive(Debug, Clone)]
pub struct XsdOptions {
    pub target_namespace: String,
}

impl Default for XsdOptions {
    fn default() -> Self {
        Self { target_namespace: "urn:restschema".to_string() }
    }
}

#[derive(Debug, Clone, Default)]
pub struct XsdGenerator {
    options: XsdOptions,
}

impl XsdGenerator {
    pub fn new(options: XsdOptions) -> Self {
        Self { options }
    }

    fn open_schema(&self) -> Markup {
        let namespace = self.options.target_namespace.as_str();
        let mut doc = Markup::xml();
        doc.open(
            "xs:schema",
            &[
                ("xmlns:xs", XS_NAMESPACE),
                ("xmlns:tns", namespace),
                ("targetNamespace", namespace),
                ("elementFormDefault", "qualified"),
            ],
        );
        doc
    }
}

impl SchemaGenerator for XsdGenerator {
    fn generate(&self, schema: &Property) -> Result<String, GenerationError> {
        check_names(schema)?;
        let mut doc = self.open_schema();
        doc.empty("xs:element", &[("name", schema.name()), ("type", type_ref(schema).as_str())]);
        let mut types = Types::default();
        types.collect(schema, true);
        types.write(&mut doc);
        doc.close("xs:schema");
        Ok(doc.finish())
    }
}

impl ViewGenerator for XsdGenerator {
    fn generate_view(&self, view: &ResourceView) -> Result<String, GenerationError> {
        let mut doc = self.open_schema();
        let mut types = Types::default();
        for (key, schema) in view.operations() {
            check_names(schema)?;
            doc.empty("xs:element", &[("name", key.prefix().as_str()), ("type", type_ref(schema).as_str())]);
            types.collect(schema, true);
        }

        for method in view.methods() {
            for role in [Role::Request, Role::Response] {
                if view.get(method, role).is_none() {
                    let name = OperationKey::new(method, role).prefix();
                    doc.empty("xs:element", &[("name", name.as_str()), ("type", "tns:void")]);
                }
            }
        }

        types.write(&mut doc);
        write_fault_types(&mut doc);
        doc.close("xs:schema");
        tracing::debug!(path = %view.path, "generated xsd view");
        Ok(doc.finish())
    }
}

// ————————————————————————————————————————————————————————————————————————————
// IMPLEMENTATION
// ————————————————————————————————————————————————————————————————————————————

#[derive(Default)]
struct Types<'a> {
    named: IndexMap<String, &'a Property>,
}

impl<'a> Types<'a> {
    /// `referenced` marks nodes used as an element type rather than as a
    /// sequence member.
    fn collect(&mut self, property: &'a Property, referenced: bool) {
        match property {
            Property::Object(object) => {
                if self.insert(property) {
                    for child in &object.properties {
                        self.collect(child, false);
                    }
                }
            }
            Property::Choice(choice) => {
                if self.insert(property) {
                    for alternative in &choice.alternatives {
                        self.collect(alternative, true);
                    }
                }
            }
            Property::Array(array) => {
                if referenced {
                    self.insert(property);
                }
                self.collect(&array.items, true);
            }
            scalar => {
                if scalar.is_constrained() {
                    self.insert(scalar);
                }
            }
        }
    }

    fn insert(&mut self, property: &'a Property) -> bool {
        let id = property.id();
        if self.named.contains_key(&id) {
            return false;
        }
        self.named.insert(id, property);
        true
    }

    fn write(&self, doc: &mut Markup) {
        for (id, property) in &self.named {
            let name = format!("type{id}");
            match property {
                Property::Object(object) => {
                    doc.open("xs:complexType", &[("name", name.as_str())]);
                    annotation(doc, property.description());
                    doc.open("xs:sequence", &[]);
                    for child in &object.properties {
                        member(doc, child);
                    }
                    doc.close("xs:sequence");
                    doc.close("xs:complexType");
                }
                Property::Choice(choice) => {
                    doc.open("xs:complexType", &[("name", name.as_str())]);
                    annotation(doc, property.description());
                    doc.open("xs:choice", &[]);
                    for alternative in &choice.alternatives {
                        member(doc, alternative);
                    }
                    doc.close("xs:choice");
                    doc.close("xs:complexType");
                }
                Property::Array(array) => {
                    doc.open("xs:complexType", &[("name", name.as_str())]);
                    annotation(doc, property.description());
                    doc.open("xs:sequence", &[]);
                    let min = array.min_items.unwrap_or(0).to_string();
                    let max = array.max_items.map_or_else(|| "unbounded".to_string(), |n| n.to_string());
                    doc.empty(
                        "xs:element",
                        &[
                            ("name", array.items.name()),
                            ("type", type_ref(&array.items).as_str()),
                            ("minOccurs", min.as_str()),
                            ("maxOccurs", max.as_str()),
                        ],
                    );
                    doc.close("xs:sequence");
                    doc.close("xs:complexType");
                }
                scalar => restriction(doc, &name, scalar),
            }
        }
    }
}

/// An element inside a sequence or choice.
fn member(doc: &mut Markup, property: &Property) {
    let required = usize::from(property.is_required());
    let (type_name, min, max) = match property {
        // an optional array may be absent whatever its item bounds
        Property::Array(array) => (
            type_ref(&array.items),
            if property.is_required() { array.min_items.unwrap_or(1) } else { 0 }.to_string(),
            array.max_items.map_or_else(|| "unbounded".to_string(), |n| n.to_string()),
        ),
        other => (type_ref(other), required.to_string(), "1".to_string()),
    };
    let attrs = [
        ("name", property.name()),
        ("type", type_name.as_str()),
        ("minOccurs", min.as_str()),
        ("maxOccurs", max.as_str()),
    ];
    match property.description() {
        Some(description) => {
            doc.open("xs:element", &attrs);
            annotation(doc, Some(description));
            doc.close("xs:element");
        }
        None => doc.empty("xs:element", &attrs),
    }
}

fn restriction(doc: &mut Markup, name: &str, scalar: &Property) {
    let facets = Facets::of(scalar);
    doc.open("xs:simpleType", &[("name", name)]);
    annotation(doc, scalar.description());
    doc.open("xs:restriction", &[("base", builtin(scalar.kind()))]);
    if let Some(pattern) = facets.pattern {
        doc.empty("xs:pattern", &[("value", pattern)]);
    }
    for value in facets.enumeration.iter().flatten() {
        doc.empty("xs:enumeration", &[("value", plain(value).as_str())]);
    }
    if let Some(n) = facets.min_length {
        doc.empty("xs:minLength", &[("value", n.to_string().as_str())]);
    }
    if let Some(n) = facets.max_length {
        doc.empty("xs:maxLength", &[("value", n.to_string().as_str())]);
    }
    if let Some(v) = &facets.minimum {
        doc.empty("xs:minInclusive", &[("value", plain(v).as_str())]);
    }
    if let Some(v) = &facets.maximum {
        doc.empty("xs:maxInclusive", &[("value", plain(v).as_str())]);
    }
    doc.close("xs:restriction");
    doc.close("xs:simpleType");
}

fn annotation(doc: &mut Markup, description: Option<&str>) {
    if let Some(description) = description {
        doc.open("xs:annotation", &[]);
        doc.text("xs:documentation", &[], description);
        doc.close("xs:annotation");
    }
}

fn type_ref(property: &Property) -> String {
    if property.is_constrained() {
        format!("tns:type{}", property.id())
    } else {
        builtin(property.kind()).to_string()
    }
}

fn builtin(kind: Kind) -> &'static str {
    match kind {
        Kind::String => "xs:string",
        Kind::Integer => "xs:integer",
        Kind::Float => "xs:float",
        Kind::Boolean => "xs:boolean",
        Kind::Date => "xs:date",
        Kind::DateTime => "xs:dateTime",
        Kind::Time => "xs:time",
        Kind::Duration => "xs:duration",
        Kind::Object | Kind::Array | Kind::Choice => "xs:anyType",
    }
}

/// `fault` and `void` complex types plus the `exceptionRecord` element.
fn write_fault_types(doc: &mut Markup) {
    doc.open("xs:complexType", &[("name", "fault")]);
    doc.open("xs:sequence", &[]);
    for (name, type_name, min) in [
        ("success", "xs:boolean", "1"),
        ("title", "xs:string", "0"),
        ("message", "xs:string", "1"),
        ("trace", "xs:string", "0"),
        ("context", "xs:string", "0"),
    ] {
        doc.empty(
            "xs:element",
            &[("name", name), ("type", type_name), ("minOccurs", min), ("maxOccurs", "1")],
        );
    }
    doc.close("xs:sequence");
    doc.close("xs:complexType");

    doc.open("xs:complexType", &[("name", "void")]);
    doc.empty("xs:sequence", &[]);
    doc.close("xs:complexType");

    doc.empty("xs:element", &[("name", "exceptionRecord"), ("type", "tns:fault")]);
}
