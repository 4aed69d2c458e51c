//! Per-operation schemas of one API resource.
//!
//! A [`ResourceView`] maps `(method, role)` pairs to root schemas. A method
//! can be declared without any schema; generators then fill in `void`.
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use crate::property::Property;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Method {
    Get,
    Post,
    Put,
    Delete,
}

impl Method {
    pub const ALL: [Method; 4] = [Method::Get, Method::Post, Method::Put, Method::Delete];

    pub fn as_str(&self) -> &'static str {
        match self {
            Method::Get => "GET",
            Method::Post => "POST",
            Method::Put => "PUT",
            Method::Delete => "DELETE",
        }
    }

    pub fn lowercase(&self) -> &'static str {
        match self {
            Method::Get => "get",
            Method::Post => "post",
            Method::Put => "put",
            Method::Delete => "delete",
        }
    }

    pub fn parse(name: &str) -> Option<Self> {
        Method::ALL.into_iter().find(|m| m.as_str().eq_ignore_ascii_case(name))
    }

    /// Whether the operation carries a request body.
    pub fn has_body(&self) -> bool {
        !matches!(self, Method::Get)
    }

    /// `getCollection`, `postItem`, `putItem`, `deleteItem`.
    pub fn nickname(&self) -> String {
        let target = if self.has_body() { "Item" } else { "Collection" };
        format!("{}{target}", self.lowercase())
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Role {
    Request,
    Response,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Request => "Request",
            Role::Response => "Response",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct OperationKey {
    pub method: Method,
    pub role: Role,
}

impl OperationKey {
    pub fn new(method: Method, role: Role) -> Self {
        Self { method, role }
    }

    /// `getResponse`, `postRequest`, ...
    pub fn prefix(&self) -> String {
        format!("{}{}", self.method.lowercase(), self.role.as_str())
    }
}

impl fmt::Display for OperationKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.method, self.role.as_str())
    }
}

#[derive(Debug, Clone, Default)]
pub struct ResourceView {
    /// Used verbatim as the document's root identifier.
    pub path: String,
    pub title: Option<String>,
    pub description: Option<String>,
    methods: BTreeSet<Method>,
    schemas: BTreeMap<OperationKey, Property>,
    path_parameters: Vec<Property>,
    query_parameters: BTreeMap<Method, Vec<Property>>,
}

impl ResourceView {
    pub fn new(path: impl Into<String>) -> Self {
        Self { path: path.into(), ..Self::default() }
    }

    pub fn with_method(mut self, method: Method) -> Self {
        self.methods.insert(method);
        self
    }

    pub fn with_request(mut self, method: Method, schema: impl Into<Property>) -> Self {
        self.methods.insert(method);
        self.schemas.insert(OperationKey::new(method, Role::Request), schema.into());
        self
    }

    pub fn with_response(mut self, method: Method, schema: impl Into<Property>) -> Self {
        self.methods.insert(method);
        self.schemas.insert(OperationKey::new(method, Role::Response), schema.into());
        self
    }

    pub fn with_path_parameter(mut self, parameter: impl Into<Property>) -> Self {
        self.path_parameters.push(parameter.into());
        self
    }

    pub fn with_query_parameter(mut self, method: Method, parameter: impl Into<Property>) -> Self {
        self.methods.insert(method);
        self.query_parameters.entry(method).or_default().push(parameter.into());
        self
    }

    pub fn has_method(&self, method: Method) -> bool {
        self.methods.contains(&method)
    }

    /// Declared methods in GET, POST, PUT, DELETE order.
    pub fn methods(&self) -> impl Iterator<Item = Method> + '_ {
        self.methods.iter().copied()
    }

    pub fn get(&self, method: Method, role: Role) -> Option<&Property> {
        self.schemas.get(&OperationKey::new(method, role))
    }

    /// Every schema in method order, request before response.
    pub fn operations(&self) -> impl Iterator<Item = (OperationKey, &Property)> + '_ {
        self.schemas.iter().map(|(k, p)| (*k, p))
    }

    pub fn path_parameters(&self) -> &[Property] {
        &self.path_parameters
    }

    pub fn query_parameters(&self, method: Method) -> &[Property] {
        self.query_parameters.get(&method).map(Vec::as_slice).unwrap_or(&[])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::property::{ObjectProperty, StringProperty};

    #[test]
    fn nicknames_and_prefixes() {
        let nicknames: Vec<String> = Method::ALL.iter().map(Method::nickname).collect();
        assert_eq!(nicknames, ["getCollection", "postItem", "putItem", "deleteItem"]);
        assert_eq!(OperationKey::new(Method::Delete, Role::Request).prefix(), "deleteRequest");
        assert_eq!(Method::parse("put"), Some(Method::Put));
        assert_eq!(Method::parse("patch"), None);
    }

    #[test]
    fn operations_are_ordered_and_methods_tracked() {
        let entry = ObjectProperty::new("entry").property(StringProperty::new("title"));
        let view = ResourceView::new("/foo/bar")
            .with_response(Method::Post, entry.clone())
            .with_request(Method::Post, entry.clone())
            .with_response(Method::Get, entry)
            .with_method(Method::Delete);
        let keys: Vec<String> = view.operations().map(|(k, _)| k.prefix()).collect();
        assert_eq!(keys, ["getResponse", "postRequest", "postResponse"]);
        let methods: Vec<Method> = view.methods().collect();
        assert_eq!(methods, [Method::Get, Method::Post, Method::Delete]);
        assert!(view.get(Method::Delete, Role::Response).is_none());
        assert!(view.query_parameters(Method::Get).is_empty());
    }
}
