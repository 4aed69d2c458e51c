//! `!include` resolution for route documents.
//!
//! Includes are resolved relative to the directory of the file that contains
//! them. YAML-like targets (`.raml`, `.yaml`, `.yml`) are parsed and resolved
//! recursively; anything else is inlined as a string. The `!include` tag is
//! honoured anywhere in a document, the plain `"!include file"` string only
//! through [`IncludeResolver::resolve_directive`]. A file that includes
//! itself, directly or through other files, is a [`ParseError::IncludeCycle`].
use std::fs;
use std::path::{Path, PathBuf};

use serde_yaml::Value;
use serde_yaml::value::TaggedValue;

use crate::error::ParseError;

const DIRECTIVE: &str = "!include";

pub(crate) struct IncludeResolver {
    stack: Vec<PathBuf>,
}

impl IncludeResolver {
    /// `origin` is the document the includes start from, if it lives on disk.
    pub(crate) fn new(origin: Option<&Path>) -> Self {
        let stack = origin
            .map(|p| fs::canonicalize(p).unwrap_or_else(|_| p.to_path_buf()))
            .into_iter()
            .collect();
        Self { stack }
    }

    pub(crate) fn resolve(&mut self, value: Value, base_dir: &Path) -> Result<Value, ParseError> {
        match value {
            Value::Tagged(tagged) => {
                let TaggedValue { tag, value } = *tagged;
                if tag != "include" {
                    let value = self.resolve(value, base_dir)?;
                    return Ok(Value::Tagged(Box::new(TaggedValue { tag, value })));
                }
                match value {
                    Value::String(target) => self.include(&target, base_dir),
                    other => Err(ParseError::Malformed {
                        file: base_dir.to_path_buf(),
                        message: format!("!include expects a file name, found {other:?}"),
                    }),
                }
            }
            Value::Mapping(mapping) => {
                let mut out = serde_yaml::Mapping::with_capacity(mapping.len());
                for (k, v) in mapping {
                    out.insert(k, self.resolve(v, base_dir)?);
                }
                Ok(Value::Mapping(out))
            }
            Value::Sequence(items) => items
                .into_iter()
                .map(|v| self.resolve(v, base_dir))
                .collect::<Result<Vec<_>, _>>()
                .map(Value::Sequence),
            other => Ok(other),
        }
    }

    /// The plain-string form `"!include file"`. Only schema values are read
    /// this way; anywhere else such a string is ordinary text.
    pub(crate) fn resolve_directive(
        &mut self,
        text: &str,
        base_dir: &Path,
    ) -> Result<Option<Value>, ParseError> {
        match text.strip_prefix(DIRECTIVE) {
            Some(target) if target.starts_with(char::is_whitespace) => {
                self.include(target, base_dir).map(Some)
            }
            _ => Ok(None),
        }
    }

    fn include(&mut self, target: &str, base_dir: &Path) -> Result<Value, ParseError> {
        let path = base_dir.join(target.trim());
        if !path.is_file() {
            return Err(ParseError::MissingInclude { path });
        }
        let canonical = fs::canonicalize(&path)
            .map_err(|source| ParseError::Io { path: path.clone(), source })?;
        if self.stack.contains(&canonical) {
            let chain = self
                .stack
                .iter()
                .chain(std::iter::once(&canonical))
                .map(|p| p.display().to_string())
                .collect::<Vec<_>>()
                .join(" -> ");
            return Err(ParseError::IncludeCycle { chain });
        }

        let text = fs::read_to_string(&canonical)
            .map_err(|source| ParseError::Io { path: canonical.clone(), source })?;
        tracing::debug!(file = %canonical.display(), "resolved include");

        if !is_yaml(&canonical) {
            return Ok(Value::String(text));
        }
        let parsed: Value = serde_yaml::from_str(&text).map_err(|err| ParseError::Yaml {
            file: canonical.clone(),
            message: err.to_string(),
        })?;
        let dir = canonical.parent().map(Path::to_path_buf).unwrap_or_default();
        self.stack.push(canonical);
        let resolved = self.resolve(parsed, &dir);
        self.stack.pop();
        resolved
    }
}

fn is_yaml(path: &Path) -> bool {
    matches!(
        path.extension().and_then(|e| e.to_str()),
        Some("raml" | "yaml" | "yml")
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn write(dir: &TempDir, name: &str, body: &str) -> PathBuf {
        let path = dir.path().join(name);
        fs::write(&path, body).unwrap();
        path
    }

    #[test]
    fn tagged_includes_resolve_anywhere() {
        let dir = TempDir::new().unwrap();
        write(&dir, "schema.json", r#"{"type": "string"}"#);
        let doc: Value = serde_yaml::from_str("a: !include schema.json\nb: [!include schema.json]\n").unwrap();
        let resolved = IncludeResolver::new(None).resolve(doc, dir.path()).unwrap();
        assert_eq!(resolved["a"].as_str(), Some(r#"{"type": "string"}"#));
        assert_eq!(resolved["b"][0].as_str(), Some(r#"{"type": "string"}"#));
    }

    #[test]
    fn plain_string_directives_are_left_to_the_caller() {
        let dir = TempDir::new().unwrap();
        write(&dir, "schema.json", r#"{"type": "string"}"#);
        let doc: Value = serde_yaml::from_str("b: \"!include schema.json\"\n").unwrap();
        let mut resolver = IncludeResolver::new(None);
        let resolved = resolver.resolve(doc, dir.path()).unwrap();
        assert_eq!(resolved["b"].as_str(), Some("!include schema.json"));

        let included = resolver.resolve_directive("!include schema.json", dir.path()).unwrap();
        assert_eq!(included.as_ref().and_then(Value::as_str), Some(r#"{"type": "string"}"#));
        assert_eq!(resolver.resolve_directive("!included", dir.path()).unwrap(), None);
        assert_eq!(resolver.resolve_directive("plain text", dir.path()).unwrap(), None);
    }

    #[test]
    fn nested_yaml_includes_resolve_relative_to_themselves() {
        let dir = TempDir::new().unwrap();
        fs::create_dir(dir.path().join("types")).unwrap();
        write(&dir, "types/body.yaml", "schema: !include inner.json\n");
        write(&dir, "types/inner.json", "{}");
        let doc: Value = serde_yaml::from_str("body: !include types/body.yaml\n").unwrap();
        let resolved = IncludeResolver::new(None).resolve(doc, dir.path()).unwrap();
        assert_eq!(resolved["body"]["schema"].as_str(), Some("{}"));
    }

    #[test]
    fn missing_target_fails() {
        let dir = TempDir::new().unwrap();
        let doc: Value = serde_yaml::from_str("a: !include nope.json\n").unwrap();
        let err = IncludeResolver::new(None).resolve(doc, dir.path()).unwrap_err();
        assert!(matches!(err, ParseError::MissingInclude { .. }));
    }

    #[test]
    fn cycles_are_detected() {
        let dir = TempDir::new().unwrap();
        let a = write(&dir, "a.yaml", "next: !include b.yaml\n");
        write(&dir, "b.yaml", "next: !include a.yaml\n");
        let doc: Value = serde_yaml::from_str(&fs::read_to_string(&a).unwrap()).unwrap();
        let err = IncludeResolver::new(Some(a.as_path())).resolve(doc, dir.path()).unwrap_err();
        assert!(matches!(err, ParseError::IncludeCycle { .. }));
    }
}
