//! Validating JSON values against a property tree.
//!
//! Validation never fails with an error for bad input data. Every problem is
//! reported as a [`ValidationFailure`]; one per offending field, so a whole
//! document can be checked in a single pass.
//!
//! Per field the checks run in a fixed order and the first failing one wins:
//! presence → type → pattern → enumeration → length → bounds. Arrays check
//! their item count before any element.
pub mod coerce;

use std::collections::HashMap;
use std::fmt;
use std::sync::RwLock;

use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::Value;
use thiserror::Error;

use crate::property::{ArrayProperty, ObjectProperty, Property, Simple};

// ————————————————————————————————————————————————————————————————————————————
// TYPES
// ————————————————————————————————————————————————————————————————————————————

/// How boolean fields treat the strings `"true"` and `"false"`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum BoolCoercion {
    /// Only JSON `true`/`false`.
    Strict,
    /// Also the exact strings `"true"` and `"false"` (query strings, form data).
    #[default]
    Lenient,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct ValidatorOptions {
    pub bool_coercion: BoolCoercion,
}

/// The kind of rule a value broke.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Constraint {
    Required,
    Type,
    Pattern,
    Enumeration,
    MinLength,
    MaxLength,
    Minimum,
    Maximum,
    MinItems,
    MaxItems,
    Choice,
}

impl Constraint {
    pub fn as_str(&self) -> &'static str {
        match self {
            Constraint::Required => "required",
            Constraint::Type => "type",
            Constraint::Pattern => "pattern",
            Constraint::Enumeration => "enumeration",
            Constraint::MinLength => "minLength",
            Constraint::MaxLength => "maxLength",
            Constraint::Minimum => "minimum",
            Constraint::Maximum => "maximum",
            Constraint::MinItems => "minItems",
            Constraint::MaxItems => "maxItems",
            Constraint::Choice => "choice",
        }
    }
}

impl fmt::Display for Constraint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationFailure {
    /// JSON pointer to the offending value; empty for the root.
    pub path: String,
    /// Name of the property that rejected the value.
    pub name: String,
    pub constraint: Constraint,
    pub message: String,
}

impl fmt::Display for ValidationFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let path = if self.path.is_empty() { "/" } else { self.path.as_str() };
        write!(f, "{path}: {} ({})", self.message, self.constraint)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{} validation failure(s), first: {}", .failures.len(), .failures.first().map(ToString::to_string).unwrap_or_default())]
pub struct ValidationReport {
    pub failures: Vec<ValidationFailure>,
}

impl ValidationReport {
    pub fn first(&self) -> Option<&ValidationFailure> {
        self.failures.first()
    }

    pub fn for_path(&self, path: &str) -> Option<&ValidationFailure> {
        self.failures.iter().find(|f| f.path == path)
    }
}

// ————————————————————————————————————————————————————————————————————————————
// FRONT API
// ————————————————————————————————————————————————————————————————————————————

#[derive(Debug, Clone, Default)]
pub struct Validator {
    options: ValidatorOptions,
}

/// Validates with [`ValidatorOptions::default`].
pub fn validate(property: &Property, value: &Value) -> Result<(), ValidationReport> {
    Validator::default().validate(property, value)
}

impl Validator {
    pub fn new(options: ValidatorOptions) -> Self {
        Self { options }
    }

    pub fn validate(&self, property: &Property, value: &Value) -> Result<(), ValidationReport> {
        self.validate_field(property, Some(value))
    }

    /// Like [`Validator::validate`], with `None` standing for an absent field.
    pub fn validate_field(
        &self,
        property: &Property,
        value: Option<&Value>,
    ) -> Result<(), ValidationReport> {
        let mut failures = Vec::new();
        self.check(property, value, "", &mut failures);
        if failures.is_empty() {
            Ok(())
        } else {
            tracing::debug!(count = failures.len(), property = property.name(), "validation failed");
            Err(ValidationReport { failures })
        }
    }
}

// ————————————————————————————————————————————————————————————————————————————
// IMPLEMENTATION
// ————————————————————————————————————————————————————————————————————————————

fn fail(property: &Property, path: &str, constraint: Constraint, message: String) -> ValidationFailure {
    ValidationFailure {
        path: path.to_string(),
        name: property.name().to_string(),
        constraint,
        message,
    }
}

fn child_path(path: &str, key: &str) -> String {
    // JSON pointer escaping
    let key = key.replace('~', "~0").replace('/', "~1");
    format!("{path}/{key}")
}

impl Validator {
    fn check(&self, property: &Property, value: Option<&Value>, path: &str, out: &mut Vec<ValidationFailure>) {
        let value = match value {
            None | Some(Value::Null) => {
                if property.is_required() {
                    out.push(fail(
                        property,
                        path,
                        Constraint::Required,
                        format!("{} is required", property.name()),
                    ));
                }
                return;
            }
            Some(v) => v,
        };

        let failure = match property {
            Property::Object(o) => return self.check_object(property, o, value, path, out),
            Property::Array(a) => return self.check_array(property, a, value, path, out),
            Property::Choice(c) => {
                let matched = c.alternatives.iter().any(|alt| {
                    let mut scratch = Vec::new();
                    self.check(alt, Some(value), path, &mut scratch);
                    scratch.is_empty()
                });
                (!matched).then(|| {
                    fail(
                        property,
                        path,
                        Constraint::Choice,
                        format!("{} matches none of the allowed types", property.name()),
                    )
                })
            }
            Property::String(p) => match coerce::text(value) {
                None => Some(type_failure(property, path, "a string")),
                Some(text) => check_simple(property, path, &p.simple, &text, &text).or_else(|| {
                    let len = text.chars().count();
                    if let Some(min) = p.min_length.filter(|min| len < *min) {
                        return Some(fail(
                            property,
                            path,
                            Constraint::MinLength,
                            format!("{} must contain at least {min} characters", property.name()),
                        ));
                    }
                    p.max_length.filter(|max| len > *max).map(|max| {
                        fail(
                            property,
                            path,
                            Constraint::MaxLength,
                            format!("{} must contain at most {max} characters", property.name()),
                        )
                    })
                }),
            },
            Property::Integer(p) => match coerce::integer(value) {
                None => Some(type_failure(property, path, "an integer")),
                Some(n) => check_simple(property, path, &p.simple, &literal(value), &n)
                    .or_else(|| check_bounds(property, path, n, p.min, p.max)),
            },
            Property::Float(p) => match coerce::float(value) {
                None => Some(type_failure(property, path, "a number")),
                Some(f) => {
                    let n = ordered_float::OrderedFloat(f);
                    check_simple(property, path, &p.simple, &literal(value), &n)
                        .or_else(|| check_bounds(property, path, n, p.min, p.max))
                }
            },
            Property::Boolean(_) => coerce::boolean(value, self.options.bool_coercion)
                .is_none()
                .then(|| type_failure(property, path, "a boolean")),
            Property::Temporal(p) => match coerce::temporal(value, p.format) {
                None => Some(type_failure(
                    property,
                    path,
                    &format!("a valid {} literal", p.format.kind()),
                )),
                Some(text) => {
                    let text = text.to_string();
                    check_simple(property, path, &p.simple, &text, &text)
                }
            },
        };
        out.extend(failure);
    }

    fn check_object(
        &self,
        property: &Property,
        object: &ObjectProperty,
        value: &Value,
        path: &str,
        out: &mut Vec<ValidationFailure>,
    ) {
        let Some(map) = value.as_object() else {
            out.push(type_failure(property, path, "an object"));
            return;
        };
        // undeclared keys are ignored
        for child in &object.properties {
            let child_path = child_path(path, child.name());
            self.check(child, map.get(child.name()), &child_path, out);
        }
    }

    fn check_array(
        &self,
        property: &Property,
        array: &ArrayProperty,
        value: &Value,
        path: &str,
        out: &mut Vec<ValidationFailure>,
    ) {
        let Some(elements) = value.as_array() else {
            out.push(type_failure(property, path, "an array"));
            return;
        };
        let count = elements.len();
        if let Some(min) = array.min_items.filter(|min| count < *min) {
            out.push(fail(
                property,
                path,
                Constraint::MinItems,
                format!("{} must contain at least {min} items", property.name()),
            ));
            return;
        }
        if let Some(max) = array.max_items.filter(|max| count > *max) {
            out.push(fail(
                property,
                path,
                Constraint::MaxItems,
                format!("{} must contain at most {max} items", property.name()),
            ));
            return;
        }
        for (i, element) in elements.iter().enumerate() {
            self.check(&array.items, Some(element), &child_path(path, &i.to_string()), out);
        }
    }
}

fn type_failure(property: &Property, path: &str, expected: &str) -> ValidationFailure {
    fail(property, path, Constraint::Type, format!("{} must be {expected}", property.name()))
}

fn literal(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Compiled anchored patterns, keyed by source pattern.
static PATTERNS: Lazy<RwLock<HashMap<String, Regex>>> = Lazy::new(|| RwLock::new(HashMap::new()));

fn anchored(pattern: &str) -> Result<Regex, regex::Error> {
    if let Some(rx) = PATTERNS.read().unwrap_or_else(|e| e.into_inner()).get(pattern) {
        return Ok(rx.clone());
    }
    let rx = Regex::new(&format!("^(?:{pattern})$"))?;
    PATTERNS
        .write()
        .unwrap_or_else(|e| e.into_inner())
        .insert(pattern.to_string(), rx.clone());
    Ok(rx)
}

/// Anchored pattern match on `text`, then enumeration membership of `value`.
fn check_simple<T: PartialEq>(
    property: &Property,
    path: &str,
    simple: &Simple<T>,
    text: &str,
    value: &T,
) -> Option<ValidationFailure> {
    if let Some(pattern) = &simple.pattern {
        let matched = anchored(pattern).map(|rx| rx.is_match(text));
        match matched {
            Ok(true) => {}
            Ok(false) => {
                return Some(fail(
                    property,
                    path,
                    Constraint::Pattern,
                    format!("{} does not match pattern", property.name()),
                ));
            }
            Err(_) => {
                return Some(fail(
                    property,
                    path,
                    Constraint::Pattern,
                    format!("{} has an invalid pattern `{pattern}`", property.name()),
                ));
            }
        }
    }
    if let Some(values) = &simple.enumeration {
        if !values.contains(value) {
            return Some(fail(
                property,
                path,
                Constraint::Enumeration,
                format!("{} is not in enumeration", property.name()),
            ));
        }
    }
    None
}

fn check_bounds<T: PartialOrd + fmt::Display + Copy>(
    property: &Property,
    path: &str,
    value: T,
    min: Option<T>,
    max: Option<T>,
) -> Option<ValidationFailure> {
    if let Some(min) = min.filter(|min| value < *min) {
        return Some(fail(
            property,
            path,
            Constraint::Minimum,
            format!("{} must be greater or equal to {min}", property.name()),
        ));
    }
    max.filter(|max| value > *max).map(|max| {
        fail(
            property,
            path,
            Constraint::Maximum,
            format!("{} must be lower or equal to {max}", property.name()),
        )
    })
}

// ————————————————————————————————————————————————————————————————————————————
// TESTS
// ————————————————————————————————————————————————————————————————————————————

#[cfg(test)]
mod tests {
    use super::*;
    use crate::property::{
        BooleanProperty, ChoiceProperty, FloatProperty, IntegerProperty, StringProperty,
        TemporalProperty,
    };
    use serde_json::json;

    fn news() -> Property {
        ObjectProperty::new("news")
            .property(IntegerProperty::new("id"))
            .property(
                StringProperty::new("title")
                    .min_length(3)
                    .max_length(16)
                    .pattern("[A-z]+")
                    .required(true),
            )
            .property(IntegerProperty::new("rating").min(1).max(5))
            .property(FloatProperty::new("price").min(1.0).max(100.0))
            .property(BooleanProperty::new("read"))
            .property(TemporalProperty::datetime("date"))
            .property(ArrayProperty::new("tags", StringProperty::new("tag")).max_items(2))
            .into()
    }

    #[test]
    fn string_length_boundaries() {
        let p: Property = StringProperty::new("title").min_length(3).max_length(16).into();
        let err = validate(&p, &json!("ab")).unwrap_err();
        assert_eq!(err.first().unwrap().constraint, Constraint::MinLength);
        let err = validate(&p, &json!("a".repeat(17))).unwrap_err();
        assert_eq!(err.first().unwrap().constraint, Constraint::MaxLength);
        assert!(validate(&p, &json!("abc")).is_ok());
        assert!(validate(&p, &json!("a".repeat(16))).is_ok());
    }

    #[test]
    fn missing_required_field_names_the_field() {
        let err = validate(&news(), &json!({ "id": 1 })).unwrap_err();
        let failure = err.first().unwrap();
        assert_eq!(failure.constraint, Constraint::Required);
        assert_eq!(failure.name, "title");
        assert_eq!(failure.path, "/title");
    }

    #[test]
    fn optional_absent_and_null_are_fine() {
        assert!(validate(&news(), &json!({ "title": "foo", "rating": null })).is_ok());
    }

    #[test]
    fn unknown_keys_are_ignored() {
        assert!(validate(&news(), &json!({ "title": "foo", "extra": [1, 2, 3] })).is_ok());
    }

    #[test]
    fn pattern_runs_before_length() {
        let err = validate(&news(), &json!({ "title": "1" })).unwrap_err();
        assert_eq!(err.first().unwrap().constraint, Constraint::Pattern);
    }

    #[test]
    fn pattern_is_anchored() {
        let p: Property = StringProperty::new("code").pattern("[a-z]+").into();
        assert!(validate(&p, &json!("abc")).is_ok());
        assert!(validate(&p, &json!("abc1")).is_err());
    }

    #[test]
    fn compiled_patterns_are_reused() {
        let first = anchored("[0-9]{2}-cache").unwrap();
        let second = anchored("[0-9]{2}-cache").unwrap();
        assert_eq!(first.as_str(), "^(?:[0-9]{2}-cache)$");
        assert_eq!(first.as_str(), second.as_str());
        assert!(PATTERNS.read().unwrap().contains_key("[0-9]{2}-cache"));
        assert!(anchored("(").is_err());
    }

    #[test]
    fn enumeration_runs_before_bounds() {
        let p: Property = IntegerProperty::new("n").enumeration([1, 10]).max(5).into();
        assert_eq!(validate(&p, &json!(3)).unwrap_err().first().unwrap().constraint, Constraint::Enumeration);
        assert_eq!(validate(&p, &json!(10)).unwrap_err().first().unwrap().constraint, Constraint::Maximum);
        assert!(validate(&p, &json!(1)).is_ok());
    }

    #[test]
    fn numeric_bounds_are_inclusive() {
        let doc = |rating: i64| json!({ "title": "foo", "rating": rating });
        assert!(validate(&news(), &doc(1)).is_ok());
        assert!(validate(&news(), &doc(5)).is_ok());
        let err = validate(&news(), &doc(6)).unwrap_err();
        assert_eq!(err.first().unwrap().constraint, Constraint::Maximum);
        let err = validate(&news(), &json!({ "title": "foo", "price": 0.5 })).unwrap_err();
        assert_eq!(err.first().unwrap().constraint, Constraint::Minimum);
    }

    #[test]
    fn numeric_strings_coerce() {
        assert!(validate(&news(), &json!({ "title": "foo", "rating": "4" })).is_ok());
        let err = validate(&news(), &json!({ "title": "foo", "rating": "four" })).unwrap_err();
        assert_eq!(err.first().unwrap().constraint, Constraint::Type);
    }

    #[test]
    fn boolean_coercion_is_configurable() {
        let doc = json!({ "title": "foo", "read": "true" });
        assert!(validate(&news(), &doc).is_ok());
        let strict = Validator::new(ValidatorOptions { bool_coercion: BoolCoercion::Strict });
        let err = strict.validate(&news(), &doc).unwrap_err();
        assert_eq!(err.first().unwrap().path, "/read");
        assert!(strict.validate(&news(), &json!({ "title": "foo", "read": false })).is_ok());
    }

    #[test]
    fn dates_must_be_iso_8601() {
        assert!(validate(&news(), &json!({ "title": "foo", "date": "2014-03-01T12:00:00Z" })).is_ok());
        let err = validate(&news(), &json!({ "title": "foo", "date": "yesterday" })).unwrap_err();
        assert_eq!(err.first().unwrap().constraint, Constraint::Type);
    }

    #[test]
    fn item_count_checked_before_elements() {
        let err = validate(&news(), &json!({ "title": "foo", "tags": [1, [], {}] })).unwrap_err();
        assert_eq!(err.failures.len(), 1);
        assert_eq!(err.first().unwrap().constraint, Constraint::MaxItems);

        let err = validate(&news(), &json!({ "title": "foo", "tags": ["a", {}] })).unwrap_err();
        assert_eq!(err.first().unwrap().path, "/tags/1");
        assert_eq!(err.first().unwrap().constraint, Constraint::Type);
    }

    #[test]
    fn every_bad_field_is_reported() {
        let err = validate(&news(), &json!({ "title": "x", "rating": 9, "read": 3 })).unwrap_err();
        let paths: Vec<&str> = err.failures.iter().map(|f| f.path.as_str()).collect();
        assert_eq!(paths, ["/title", "/rating", "/read"]);
        assert!(err.for_path("/rating").is_some());
    }

    #[test]
    fn validation_is_deterministic() {
        let doc = json!({ "title": "x", "rating": 9 });
        assert_eq!(validate(&news(), &doc), validate(&news(), &doc));
    }

    #[test]
    fn choice_accepts_any_alternative() {
        let choice: Property = ChoiceProperty::new("target")
            .alternative(ObjectProperty::new("person").property(StringProperty::new("name").required(true)))
            .alternative(ObjectProperty::new("place").property(FloatProperty::new("lat").required(true)))
            .into();
        assert!(validate(&choice, &json!({ "name": "Ada" })).is_ok());
        assert!(validate(&choice, &json!({ "lat": 1.5 })).is_ok());
        let err = validate(&choice, &json!({ "zip": 1 })).unwrap_err();
        assert_eq!(err.first().unwrap().constraint, Constraint::Choice);
    }

    #[test]
    fn required_root_rejects_null() {
        let p: Property = StringProperty::new("title").required(true).into();
        assert!(validate(&p, &Value::Null).is_err());
        assert!(Validator::default().validate_field(&p, None).is_err());
        assert!(validate(&StringProperty::new("t").into(), &Value::Null).is_ok());
    }
}
