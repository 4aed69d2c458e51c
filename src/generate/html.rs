//! Property tree / resource view → HTML documentation fragment.
//!
//! Every distinct object shape gets one `div.type` section with a property
//! table; object-typed cells link to the section by `#type-<id>`. The
//! section heading and description come from the first node of that id,
//! while table rows keep each property's own description.
use std::collections::HashSet;

use crate::error::GenerationError;
use crate::generate::markup::{Markup, element, escape};
use crate::generate::{Facets, SchemaGenerator, ViewGenerator, check_names, distinct, plain};
use crate::property::{Kind, Property};
use crate::view::ResourceView;

const RFC3339: &str = "http://tools.ietf.org/html/rfc3339#section-5.6";
const COLUMN_WIDTHS: [&str; 4] = ["20%", "20%", "40%", "20%"];
const HEADERS: [&str; 4] = ["Property", "Type", "Description", "Constraints"];

#[derive(Debug, Default, Clone, Copy)]
pub struct HtmlGenerator;

impl HtmlGenerator {
    pub fn new() -> Self {
        Self
    }
}

impl SchemaGenerator for HtmlGenerator {
    fn generate(&self, schema: &Property) -> Result<String, GenerationError> {
        check_names(schema)?;
        let mut doc = Markup::new();
        doc.open("div", &[]);
        write_types(&mut doc, schema, &mut HashSet::new());
        doc.close("div");
        Ok(doc.finish())
    }
}

impl ViewGenerator for HtmlGenerator {
    fn generate_view(&self, view: &ResourceView) -> Result<String, GenerationError> {
        let mut doc = Markup::new();
        let mut rendered = HashSet::new();
        doc.open("div", &[("class", "view")]);
        doc.text("h1", &[], view.title.as_deref().unwrap_or(&view.path));
        if let Some(description) = &view.description {
            doc.text("div", &[("class", "view-description")], description);
        }

        for (key, schema) in view.operations() {
            check_names(schema)?;
            let anchor = format!("operation-{}", key.prefix());
            doc.open("div", &[("id", anchor.as_str()), ("class", "operation")]);
            doc.text("h2", &[], &key.to_string());
            doc.raw("div", &[("class", "operation-schema")], &type_cell(schema));
            write_types(&mut doc, schema, &mut rendered);
            doc.close("div");
        }
        for method in view.methods() {
            let parameters = view.path_parameters().iter().chain(view.query_parameters(method));
            let rows: Vec<&Property> = parameters.collect();
            if rows.is_empty() {
                continue;
            }
            let anchor = format!("parameters-{}", method.lowercase());
            doc.open("div", &[("id", anchor.as_str()), ("class", "operation-parameters")]);
            doc.text("h2", &[], &format!("{method} Parameters"));
            write_table(&mut doc, rows);
            doc.close("div");
        }

        doc.close("div");
        Ok(doc.finish())
    }
}

// ————————————————————————————————————————————————————————————————————————————
// IMPLEMENTATION
// ————————————————————————————————————————————————————————————————————————————

/// Sections for every object shape below `root` not yet in `rendered`.
fn write_types(doc: &mut Markup, root: &Property, rendered: &mut HashSet<String>) {
    if root.kind() != Kind::Object && rendered.insert(root.id()) {
        write_section(doc, root, vec![root]);
    }
    for (id, property) in distinct(root, |p| p.kind() == Kind::Object) {
        if !rendered.insert(id) {
            continue;
        }
        if let Property::Object(object) = property {
            write_section(doc, property, object.properties.iter().collect());
        }
    }
}

fn write_section(doc: &mut Markup, owner: &Property, rows: Vec<&Property>) {
    let anchor = format!("type-{}", owner.id());
    doc.open("div", &[("id", anchor.as_str()), ("class", "type")]);
    doc.text("h1", &[], owner.name());
    if let Some(description) = owner.description() {
        doc.text("div", &[("class", "type-description")], description);
    }
    write_table(doc, rows);
    doc.close("div");
}

fn write_table(doc: &mut Markup, rows: Vec<&Property>) {
    doc.open("table", &[("class", "table type-properties")]);
    doc.open("colgroup", &[]);
    for width in COLUMN_WIDTHS {
        doc.empty("col", &[("width", width)]);
    }
    doc.close("colgroup");
    doc.open("thead", &[]);
    doc.open("tr", &[]);
    for header in HEADERS {
        doc.text("th", &[], header);
    }
    doc.close("tr");
    doc.close("thead");

    doc.open("tbody", &[]);
    for property in rows {
        let presence = if property.is_required() { "property-required" } else { "property-optional" };
        let name_class = format!("property-name {presence}");
        doc.open("tr", &[]);
        doc.raw("td", &[], &element("span", &[("class", name_class.as_str())], &escape(property.name())));
        doc.raw("td", &[], &type_cell(property));
        doc.raw(
            "td",
            &[],
            &element(
                "span",
                &[("class", "property-description")],
                &escape(property.description().unwrap_or_default()),
            ),
        );
        doc.raw("td", &[], &constraints_cell(property));
        doc.close("tr");
    }
    doc.close("tbody");
    doc.close("table");
}

fn type_cell(property: &Property) -> String {
    let scalar_class = format!("property-type property-type-{}", property.kind());
    let scalar = |label: &str| element("span", &[("class", scalar_class.as_str())], label);
    match property {
        Property::Object(object) => {
            let href = format!("#type-{}", object.id());
            let link = element("a", &[("href", href.as_str())], &escape(property.name()));
            element("span", &[("class", "property-type type-object")], &link)
        }
        Property::Array(array) => element(
            "span",
            &[("class", "property-type type-array")],
            &format!("Array&lt;{}&gt;", type_cell(&array.items)),
        ),
        Property::Choice(choice) => {
            let alternatives: Vec<String> = choice.alternatives.iter().map(type_cell).collect();
            element(
                "span",
                &[("class", "property-type type-choice")],
                &format!("Choice&lt;{}&gt;", alternatives.join(" | ")),
            )
        }
        _ => match property.kind() {
            Kind::Date => scalar(&element("a", &[("href", RFC3339), ("title", "RFC3339")], "Date")),
            Kind::DateTime => scalar(&element("a", &[("href", RFC3339), ("title", "RFC3339")], "DateTime")),
            Kind::Duration => scalar(&element("span", &[("title", "ISO 8601")], "Duration")),
            Kind::String => scalar("String"),
            Kind::Integer => scalar("Integer"),
            Kind::Float => scalar("Float"),
            Kind::Boolean => scalar("Boolean"),
            Kind::Time => scalar("Time"),
            Kind::Object | Kind::Array | Kind::Choice => String::new(),
        },
    }
}

fn constraints_cell(property: &Property) -> String {
    let facets = Facets::of(property);
    let mut entries: Vec<(&str, String)> = Vec::new();
    if let Some(pattern) = facets.pattern {
        entries.push(("Pattern", constraint("pattern", &escape(pattern))));
    }
    if let Some(values) = &facets.enumeration {
        let items: String = values
            .iter()
            .map(|v| {
                let value = element("span", &[("class", "constraint-enumeration-value")], &escape(&plain(v)));
                element("li", &[], &value)
            })
            .collect();
        let list = element("ul", &[("class", "property-enumeration")], &items);
        entries.push(("Enumeration", constraint("enumeration", &list)));
    }

    let (lower, upper) = match property {
        Property::Array(array) => {
            (array.min_items.map(|n| n.to_string()), array.max_items.map(|n| n.to_string()))
        }
        _ => (facets.lower(), facets.upper()),
    };
    if let Some(lower) = lower {
        entries.push(("Minimum", constraint("minimum", &escape(&lower))));
    }
    if let Some(upper) = upper {
        entries.push(("Maximum", constraint("maximum", &escape(&upper))));
    }

    if entries.is_empty() {
        return String::new();
    }
    let body: String = entries
        .iter()
        .map(|(title, value)| format!("{}{}", element("dt", &[], title), element("dd", &[], value)))
        .collect();
    element("dl", &[("class", "property-constraint")], &body)
}

fn constraint(name: &str, inner: &str) -> String {
    let class = format!("constraint-{name}");
    element("span", &[("class", class.as_str())], inner)
}
