use super::id::IdBuilder;
use super::{Kind, Meta, Simple};

/// Which ISO-8601 flavour a [`TemporalProperty`] expects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TemporalFormat {
    Date,
    DateTime,
    Time,
    Duration,
}

impl TemporalFormat {
    pub fn kind(&self) -> Kind {
        match self {
            TemporalFormat::Date => Kind::Date,
            TemporalFormat::DateTime => Kind::DateTime,
            TemporalFormat::Time => Kind::Time,
            TemporalFormat::Duration => Kind::Duration,
        }
    }

    /// The `format` keyword used by JSON Schema and Swagger.
    pub fn json_format(&self) -> &'static str {
        match self {
            TemporalFormat::Date => "date",
            TemporalFormat::DateTime => "date-time",
            TemporalFormat::Time => "time",
            TemporalFormat::Duration => "duration",
        }
    }

    pub fn from_json_format(format: &str) -> Option<Self> {
        match format {
            "date" => Some(TemporalFormat::Date),
            "date-time" | "datetime" => Some(TemporalFormat::DateTime),
            "time" => Some(TemporalFormat::Time),
            "duration" => Some(TemporalFormat::Duration),
            _ => None,
        }
    }
}

/// Date, date-time, time or duration literal. Pattern and enumeration are
/// checked against the literal text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TemporalProperty {
    pub meta: Meta,
    pub simple: Simple<String>,
    pub format: TemporalFormat,
}

impl TemporalProperty {
    pub fn new(name: impl Into<String>, format: TemporalFormat) -> Self {
        Self { meta: Meta::new(name), simple: Simple::default(), format }
    }

    pub fn date(name: impl Into<String>) -> Self {
        Self::new(name, TemporalFormat::Date)
    }

    pub fn datetime(name: impl Into<String>) -> Self {
        Self::new(name, TemporalFormat::DateTime)
    }

    pub fn time(name: impl Into<String>) -> Self {
        Self::new(name, TemporalFormat::Time)
    }

    pub fn duration(name: impl Into<String>) -> Self {
        Self::new(name, TemporalFormat::Duration)
    }

    pub fn id(&self) -> String {
        let mut id = IdBuilder::new(self.format.kind());
        self.meta.hash_into(&mut id);
        self.simple.hash_into(&mut id);
        id.finish()
    }
}

meta_builders!(TemporalProperty);
simple_builders!(TemporalProperty, String);
