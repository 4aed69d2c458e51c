//! A documented API resource as read from a route description.
use std::collections::BTreeMap;

use crate::property::Property;
use crate::view::{Method, ResourceView};

#[derive(Debug, Clone, Default)]
pub struct Resource {
    /// Route path with `{name}` placeholders.
    pub path: String,
    pub title: Option<String>,
    pub description: Option<String>,
    /// Title of the whole API document.
    pub api_title: Option<String>,
    pub version: u32,
    pub path_parameters: Vec<Property>,
    pub methods: BTreeMap<Method, ResourceMethod>,
}

#[derive(Debug, Clone, Default)]
pub struct ResourceMethod {
    pub description: Option<String>,
    pub query_parameters: Vec<Property>,
    pub request: Option<Property>,
    pub responses: BTreeMap<u16, Property>,
}

impl ResourceMethod {
    /// The success schema: status 200, else the lowest 2xx, else the lowest status.
    pub fn response(&self) -> Option<&Property> {
        self.responses
            .get(&200)
            .or_else(|| self.responses.range(200..300).next().map(|(_, p)| p))
            .or_else(|| self.responses.values().next())
    }
}

impl Resource {
    pub fn to_view(&self) -> ResourceView {
        let mut view = ResourceView::new(self.path.clone());
        view.title = self.title.clone();
        view.description = self.description.clone();
        for parameter in &self.path_parameters {
            view = view.with_path_parameter(parameter.clone());
        }
        for (method, definition) in &self.methods {
            view = view.with_method(*method);
            for parameter in &definition.query_parameters {
                view = view.with_query_parameter(*method, parameter.clone());
            }
            if let Some(request) = &definition.request {
                view = view.with_request(*method, request.clone());
            }
            if let Some(response) = definition.response() {
                view = view.with_response(*method, response.clone());
            }
        }
        view
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::property::{IntegerProperty, StringProperty};
    use crate::view::Role;

    #[test]
    fn success_response_selection() {
        let mut method = ResourceMethod::default();
        method.responses.insert(500, StringProperty::new("error").into());
        assert_eq!(method.response().map(|p| p.name()), Some("error"));
        method.responses.insert(201, StringProperty::new("created").into());
        assert_eq!(method.response().map(|p| p.name()), Some("created"));
        method.responses.insert(200, StringProperty::new("ok").into());
        assert_eq!(method.response().map(|p| p.name()), Some("ok"));
    }

    #[test]
    fn view_carries_methods_and_parameters() {
        let mut resource = Resource { path: "/foo/{id}".into(), version: 1, ..Resource::default() };
        resource.path_parameters.push(IntegerProperty::new("id").into());
        let mut get = ResourceMethod::default();
        get.query_parameters.push(IntegerProperty::new("limit").into());
        resource.methods.insert(Method::Get, get);
        resource.methods.insert(Method::Delete, ResourceMethod::default());

        let view = resource.to_view();
        assert_eq!(view.path, "/foo/{id}");
        assert!(view.has_method(Method::Delete));
        assert!(view.get(Method::Delete, Role::Request).is_none());
        assert_eq!(view.query_parameters(Method::Get).len(), 1);
        assert_eq!(view.path_parameters().len(), 1);
    }
}
