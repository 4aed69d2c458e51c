//! Schema-driven data layer for REST APIs.
//!
//! Build a [`Property`] tree by hand or with a parser
//! ([`JsonSchemaParser`], [`RamlParser`]), check request payloads against it
//! with the [`Validator`], and project it into JSON Schema, XSD, HTML or
//! Swagger with the generators in [`generate`].
pub mod error;
pub mod generate;
pub mod parse;
pub mod property;
pub mod resource;
pub mod validate;
pub mod view;

mod path_de;

pub use error::{GenerationError, ParseError};
pub use generate::{
    HtmlGenerator, JsonSchemaGenerator, SchemaGenerator, SwaggerGenerator, SwaggerOptions,
    ViewGenerator, XsdGenerator, XsdOptions,
};
pub use parse::{JsonSchemaParser, RamlParser};
pub use property::{Kind, Property};
pub use resource::{Resource, ResourceMethod};
pub use validate::{
    BoolCoercion, Constraint, ValidationFailure, ValidationReport, Validator, ValidatorOptions,
};
pub use view::{Method, OperationKey, ResourceView, Role};
