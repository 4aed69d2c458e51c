//! Resource view → Swagger 1.2 API declaration.
//!
//! Each operation root must be an object; it becomes a model named after
//! the first operation that uses its shape (`getResponse`, `postRequest`,
//! ...). Nested object shapes become `ref<id>` models. Models are keyed by
//! id, so operations sharing a shape share one model.
use std::collections::{HashMap, HashSet};

use serde_json::{Map, Value, json};

use crate::error::GenerationError;
use crate::generate::{ViewGenerator, check_names, scalar_schema};
use crate::property::{Kind, ObjectProperty, Property};
use crate::view::{Method, OperationKey, ResourceView, Role};

pub const SWAGGER_VERSION: &str = "1.2";
const VOID: &str = "void";

#[derive(Debug, Clone)]
pub struct SwaggerOptions {
    pub api_version: u32,
    pub base_path: String,
}

impl Default for SwaggerOptions {
    fn default() -> Self {
        Self { api_version: 1, base_path: "/".to_string() }
    }
}

#[derive(Debug, Clone, Default)]
pub struct SwaggerGenerator {
    options: SwaggerOptions,
}

impl SwaggerGenerator {
    pub fn new(options: SwaggerOptions) -> Self {
        Self { options }
    }

    /// The declaration as a JSON value.
    pub fn to_value(&self, view: &ResourceView) -> Result<Value, GenerationError> {
        let mut models = Models::default();
        // a request schema of a body-less method is never referenced
        let referenced: Vec<(OperationKey, &Property)> = view
            .operations()
            .filter(|(key, _)| key.role == Role::Response || key.method.has_body())
            .collect();
        for &(key, schema) in &referenced {
            check_names(schema)?;
            let Property::Object(object) = schema else {
                return Err(GenerationError::UnsupportedRoot {
                    key: key.prefix(),
                    kind: schema.kind().to_string(),
                });
            };
            models.claim(object, key.prefix());
        }
        for &(_, schema) in &referenced {
            if let Property::Object(object) = schema {
                models.register(object);
            }
        }

        let operations: Vec<Value> = view
            .methods()
            .map(|method| self.operation(view, method, &mut models))
            .collect();
        if models.uses_void {
            models.entries.insert(VOID.into(), json!({ "id": VOID, "properties": {} }));
        }

        let mut api = Map::new();
        api.insert("path".into(), Value::from(view.path.as_str()));
        if let Some(description) = &view.description {
            api.insert("description".into(), Value::from(description.as_str()));
        }
        api.insert("operations".into(), Value::Array(operations));

        tracing::debug!(path = %view.path, models = models.entries.len(), "generated swagger declaration");
        Ok(json!({
            "swaggerVersion": SWAGGER_VERSION,
            "apiVersion": self.options.api_version,
            "basePath": self.options.base_path,
            "resourcePath": view.path,
            "apis": [Value::Object(api)],
            "models": Value::Object(models.entries),
        }))
    }

    fn operation(&self, view: &ResourceView, method: Method, models: &mut Models) -> Value {
        let mut parameters: Vec<Value> = Vec::new();
        for parameter in view.path_parameters() {
            parameters.push(simple_parameter("path", parameter, true));
        }
        for parameter in view.query_parameters(method) {
            parameters.push(simple_parameter("query", parameter, parameter.is_required()));
        }
        if method.has_body() {
            let model = models.model_for(view.get(method, Role::Request));
            parameters.push(json!({
                "paramType": "body",
                "name": "body",
                "required": true,
                "type": model,
            }));
        }

        let response = models.model_for(view.get(method, Role::Response));
        json!({
            "method": method.as_str(),
            "nickname": method.nickname(),
            "parameters": parameters,
            "responseMessages": [
                { "code": 200, "message": "Response", "responseModel": response }
            ],
        })
    }
}

impl ViewGenerator for SwaggerGenerator {
    fn generate_view(&self, view: &ResourceView) -> Result<String, GenerationError> {
        Ok(serde_json::to_string_pretty(&self.to_value(view)?)?)
    }
}

// ————————————————————————————————————————————————————————————————————————————
// MODELS
// ————————————————————————————————————————————————————————————————————————————

#[derive(Default)]
struct Models {
    names: HashMap<String, String>,
    entries: Map<String, Value>,
    done: HashSet<String>,
    uses_void: bool,
}

impl Models {
    /// Reserves `name` (and its slot in the output) for a root shape.
    fn claim(&mut self, object: &ObjectProperty, name: String) {
        let name = self.names.entry(object.id()).or_insert(name).clone();
        if !self.entries.contains_key(&name) {
            self.entries.insert(name, Value::Null);
        }
    }

    fn model_for(&mut self, schema: Option<&Property>) -> String {
        match schema {
            Some(Property::Object(object)) => self.register(object),
            _ => {
                self.uses_void = true;
                VOID.to_string()
            }
        }
    }

    fn register(&mut self, object: &ObjectProperty) -> String {
        let id = object.id();
        let name = self.names.entry(id.clone()).or_insert_with(|| format!("ref{id}")).clone();
        if !self.done.insert(name.clone()) {
            return name;
        }

        let mut properties = Map::new();
        for child in &object.properties {
            properties.insert(child.name().to_string(), self.property(child));
        }
        let required: Vec<Value> = object
            .properties
            .iter()
            .filter(|p| p.is_required())
            .map(|p| Value::from(p.name()))
            .collect();

        let mut model = Map::new();
        model.insert("id".into(), Value::from(name.as_str()));
        if let Some(description) = &object.meta.description {
            model.insert("description".into(), Value::from(description.as_str()));
        }
        if !required.is_empty() {
            model.insert("required".into(), Value::Array(required));
        }
        model.insert("properties".into(), Value::Object(properties));
        self.entries.insert(name.clone(), Value::Object(model));
        name
    }

    fn property(&mut self, property: &Property) -> Value {
        match property {
            Property::Object(object) => json!({ "$ref": self.register(object) }),
            Property::Array(array) => {
                let mut o = json!({ "type": "array", "items": self.property(&array.items) });
                if let Some(description) = &array.meta.description {
                    o["description"] = Value::from(description.as_str());
                }
                if let Some(n) = array.min_items { o["minItems"] = Value::from(n); }
                if let Some(n) = array.max_items { o["maxItems"] = Value::from(n); }
                o
            }
            Property::Choice(choice) => {
                let alternatives: Vec<Value> =
                    choice.alternatives.iter().map(|alt| self.property(alt)).collect();
                json!({ "type": "object", "x-oneOf": alternatives })
            }
            scalar => Value::Object(swagger_scalar(scalar)),
        }
    }
}

fn swagger_scalar(property: &Property) -> Map<String, Value> {
    let mut schema = scalar_schema(property);
    if property.kind() == Kind::Float {
        schema.insert("format".into(), Value::from("float"));
    }
    schema
}

fn simple_parameter(param_type: &str, parameter: &Property, required: bool) -> Value {
    let mut out = Map::new();
    out.insert("paramType".into(), Value::from(param_type));
    out.insert("name".into(), Value::from(parameter.name()));
    out.insert("required".into(), Value::from(required));
    if parameter.kind().is_container() || parameter.kind() == Kind::Choice {
        out.insert("type".into(), Value::from("string"));
    } else {
        out.extend(swagger_scalar(parameter));
    }
    Value::Object(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::property::{ArrayProperty, BooleanProperty, IntegerProperty, StringProperty};

    fn entry() -> ObjectProperty {
        ObjectProperty::new("entry")
            .property(IntegerProperty::new("id"))
            .property(IntegerProperty::new("userId"))
            .property(StringProperty::new("title").min_length(3).max_length(16).pattern("[A-z]+"))
            .property(StringProperty::new("date"))
    }

    fn message() -> ObjectProperty {
        ObjectProperty::new("message")
            .property(BooleanProperty::new("success"))
            .property(StringProperty::new("message"))
    }

    fn view() -> ResourceView {
        let item = entry().property(StringProperty::new("link"));
        let collection = ObjectProperty::new("collection").property(ArrayProperty::new("entry", item));
        ResourceView::new("/foo/bar")
            .with_response(Method::Get, collection)
            .with_request(Method::Post, entry())
            .with_response(Method::Post, message())
            .with_request(Method::Put, entry())
            .with_response(Method::Put, message())
            .with_request(Method::Delete, entry())
            .with_response(Method::Delete, message())
    }

    fn options() -> SwaggerOptions {
        SwaggerOptions { api_version: 1, base_path: "http://api.phpsx.org".into() }
    }

    #[test]
    fn four_operations_with_shared_models() {
        let doc = SwaggerGenerator::new(options()).to_value(&view()).unwrap();
        assert_eq!(doc["swaggerVersion"], "1.2");
        assert_eq!(doc["resourcePath"], "/foo/bar");
        assert_eq!(doc["basePath"], "http://api.phpsx.org");

        let operations = doc["apis"][0]["operations"].as_array().unwrap();
        let nicknames: Vec<&str> = operations.iter().map(|o| o["nickname"].as_str().unwrap()).collect();
        assert_eq!(nicknames, ["getCollection", "postItem", "putItem", "deleteItem"]);
        assert_eq!(operations[0]["parameters"], json!([]));
        assert_eq!(
            operations[2]["parameters"],
            json!([{"paramType": "body", "name": "body", "required": true, "type": "postRequest"}])
        );
        assert_eq!(operations[3]["responseMessages"][0]["responseModel"], "postResponse");

        let models = doc["models"].as_object().unwrap();
        let names: Vec<&str> = models.keys().map(String::as_str).collect();
        let nested = format!("ref{}", entry().property(StringProperty::new("link")).id());
        assert_eq!(names, ["getResponse", "postRequest", "postResponse", nested.as_str()]);
        assert_eq!(models["getResponse"]["properties"]["entry"]["items"]["$ref"], nested.as_str());
        assert_eq!(models["postRequest"]["properties"]["title"]["minLength"], 3);
        assert!(models["postRequest"].get("required").is_none());
    }

    #[test]
    fn missing_schemas_use_void() {
        let view = ResourceView::new("/foo/{id}")
            .with_path_parameter(IntegerProperty::new("id"))
            .with_query_parameter(Method::Get, IntegerProperty::new("limit"))
            .with_method(Method::Delete);
        let doc = SwaggerGenerator::default().to_value(&view).unwrap();
        let operations = doc["apis"][0]["operations"].as_array().unwrap();
        assert_eq!(operations[0]["parameters"][0]["paramType"], "path");
        assert_eq!(operations[0]["parameters"][0]["required"], true);
        assert_eq!(operations[0]["parameters"][1]["paramType"], "query");
        assert_eq!(operations[0]["parameters"][1]["type"], "integer");
        assert_eq!(operations[1]["parameters"][1]["type"], "void");
        assert_eq!(operations[1]["responseMessages"][0]["responseModel"], "void");
        assert_eq!(doc["models"]["void"], json!({"id": "void", "properties": {}}));
    }

    #[test]
    fn shapes_differing_only_in_description_share_a_model() {
        let view = ResourceView::new("/foo")
            .with_request(Method::Post, entry().describe("New entry"))
            .with_response(Method::Post, entry().describe("Stored entry"));
        let doc = SwaggerGenerator::default().to_value(&view).unwrap();
        let models = doc["models"].as_object().unwrap();
        assert_eq!(models.keys().collect::<Vec<_>>(), ["postRequest"]);
        assert_eq!(models["postRequest"]["description"], "New entry");
        assert_eq!(doc["apis"][0]["operations"][0]["responseMessages"][0]["responseModel"], "postRequest");
    }

    #[test]
    fn get_request_schemas_are_not_models() {
        let view = ResourceView::new("/foo")
            .with_request(Method::Get, message())
            .with_response(Method::Get, entry());
        let doc = SwaggerGenerator::default().to_value(&view).unwrap();
        let models = doc["models"].as_object().unwrap();
        assert_eq!(models.keys().collect::<Vec<_>>(), ["getResponse"]);
        assert_eq!(doc["apis"][0]["operations"][0]["parameters"], json!([]));
    }

    #[test]
    fn scalar_roots_are_rejected() {
        let view = ResourceView::new("/count").with_response(Method::Get, IntegerProperty::new("count"));
        let err = SwaggerGenerator::default().generate_view(&view).unwrap_err();
        assert!(matches!(err, GenerationError::UnsupportedRoot { ref key, .. } if key == "getResponse"));
    }
}
