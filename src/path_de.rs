//! Deserialization with JSON-path context in error messages.
use serde::Deserialize;
use serde::de::{DeserializeOwned, Deserializer};

use crate::error::ParseError;

pub fn from_str_with_path<T: DeserializeOwned>(src: &str) -> Result<T, ParseError> {
    let de = &mut serde_json::Deserializer::from_str(src);
    deserialize_with_path(de)
}

/// Works over any self-describing deserializer: JSON text, a
/// `serde_json::Value`, or a `serde_yaml::Value` taken from a route document.
pub fn deserialize_with_path<'de, D, T>(de: D) -> Result<T, ParseError>
where
    D: Deserializer<'de>,
    D::Error: std::fmt::Display,
    T: Deserialize<'de>,
{
    serde_path_to_error::deserialize::<_, T>(de).map_err(|err| {
        let path = err.path().to_string();
        ParseError::Json { path, message: err.into_inner().to_string() }
    })
}
