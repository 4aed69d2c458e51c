//! Front ends that build property trees from external descriptions.
pub(crate) mod include;
pub mod json_schema;
pub mod raml;

pub use json_schema::JsonSchemaParser;
pub use raml::RamlParser;
