//! Typed property tree.
//!
//! A schema is a tree of [`Property`] nodes. Every kind has its own struct
//! carrying exactly the constraints that are legal for it, so a
//! [`StringProperty`] has no `min` and a [`BooleanProperty`] has no
//! `pattern`. [`Property`] is the sum over those structs.
//!
//! Nodes are built once (by a parser or by hand through the chainable
//! builders) and afterwards only read. Each node has a content-addressed
//! [`Property::id`] which ignores the node's own name, so two identically
//! shaped sub-trees share one id wherever they appear.

macro_rules! meta_builders {
    ($ty:ty) => {
        impl $ty {
            pub fn describe(mut self, description: impl Into<String>) -> Self {
                self.meta.description = Some(description.into());
                self
            }

            pub fn required(mut self, required: bool) -> Self {
                self.meta.required = required;
                self
            }
        }
    };
}

macro_rules! simple_builders {
    ($ty:ty, $item:ty) => {
        impl $ty {
            pub fn pattern(mut self, pattern: impl Into<String>) -> Self {
                self.simple.pattern = Some(pattern.into());
                self
            }

            pub fn enumeration<I, V>(mut self, values: I) -> Self
            where
                I: IntoIterator<Item = V>,
                V: Into<$item>,
            {
                self.simple.enumeration = Some(values.into_iter().map(Into::into).collect());
                self
            }
        }
    };
}

pub mod array;
pub mod choice;
pub mod id;
pub mod number;
pub mod object;
pub mod string;
pub mod temporal;

use std::fmt;

pub use array::ArrayProperty;
pub use choice::ChoiceProperty;
pub use number::{FloatProperty, IntegerProperty};
pub use object::ObjectProperty;
pub use string::StringProperty;
pub use temporal::{TemporalFormat, TemporalProperty};

use id::IdBuilder;

// ————————————————————————————————————————————————————————————————————————————
// SHARED PARTS
// ————————————————————————————————————————————————————————————————————————————

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Kind {
    String,
    Integer,
    Float,
    Boolean,
    Date,
    DateTime,
    Time,
    Duration,
    Object,
    Array,
    Choice,
}

impl Kind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Kind::String => "string",
            Kind::Integer => "integer",
            Kind::Float => "float",
            Kind::Boolean => "boolean",
            Kind::Date => "date",
            Kind::DateTime => "datetime",
            Kind::Time => "time",
            Kind::Duration => "duration",
            Kind::Object => "object",
            Kind::Array => "array",
            Kind::Choice => "choice",
        }
    }

    pub fn is_container(&self) -> bool {
        matches!(self, Kind::Object | Kind::Array)
    }
}

impl fmt::Display for Kind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Attributes every node has regardless of kind.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Meta {
    pub name: String,
    pub description: Option<String>,
    pub required: bool,
}

impl Meta {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into(), description: None, required: false }
    }

    // name and description are documentation, not shape
    pub(crate) fn hash_into(&self, id: &mut IdBuilder) {
        id.flag("required", self.required);
    }
}

/// Pattern and enumeration, shared by the scalar kinds.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Simple<T> {
    pub pattern: Option<String>,
    pub enumeration: Option<Vec<T>>,
}

impl<T> Default for Simple<T> {
    fn default() -> Self {
        Self { pattern: None, enumeration: None }
    }
}

impl<T: fmt::Display> Simple<T> {
    pub fn is_constrained(&self) -> bool {
        self.pattern.is_some() || self.enumeration.is_some()
    }

    pub(crate) fn hash_into(&self, id: &mut IdBuilder) {
        id.opt_str("pattern", self.pattern.as_deref());
        id.opt_list("enumeration", self.enumeration.as_deref());
    }
}

// ————————————————————————————————————————————————————————————————————————————
// BOOLEAN
// ————————————————————————————————————————————————————————————————————————————

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BooleanProperty {
    pub meta: Meta,
}

impl BooleanProperty {
    pub fn new(name: impl Into<String>) -> Self {
        Self { meta: Meta::new(name) }
    }

    pub fn id(&self) -> String {
        let mut id = IdBuilder::new(Kind::Boolean);
        self.meta.hash_into(&mut id);
        id.finish()
    }
}

meta_builders!(BooleanProperty);

// ————————————————————————————————————————————————————————————————————————————
// THE SUM TYPE
// ————————————————————————————————————————————————————————————————————————————

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Property {
    String(StringProperty),
    Integer(IntegerProperty),
    Float(FloatProperty),
    Boolean(BooleanProperty),
    Temporal(TemporalProperty),
    Object(ObjectProperty),
    Array(ArrayProperty),
    Choice(ChoiceProperty),
}

macro_rules! property_from {
    ($($variant:ident => $ty:ty),* $(,)?) => {
        $(
            impl From<$ty> for Property {
                fn from(value: $ty) -> Self {
                    Property::$variant(value)
                }
            }
        )*
    };
}

property_from! {
    String => StringProperty,
    Integer => IntegerProperty,
    Float => FloatProperty,
    Boolean => BooleanProperty,
    Temporal => TemporalProperty,
    Object => ObjectProperty,
    Array => ArrayProperty,
    Choice => ChoiceProperty,
}

impl Property {
    pub fn meta(&self) -> &Meta {
        match self {
            Property::String(p) => &p.meta,
            Property::Integer(p) => &p.meta,
            Property::Float(p) => &p.meta,
            Property::Boolean(p) => &p.meta,
            Property::Temporal(p) => &p.meta,
            Property::Object(p) => &p.meta,
            Property::Array(p) => &p.meta,
            Property::Choice(p) => &p.meta,
        }
    }

    fn meta_mut(&mut self) -> &mut Meta {
        match self {
            Property::String(p) => &mut p.meta,
            Property::Integer(p) => &mut p.meta,
            Property::Float(p) => &mut p.meta,
            Property::Boolean(p) => &mut p.meta,
            Property::Temporal(p) => &mut p.meta,
            Property::Object(p) => &mut p.meta,
            Property::Array(p) => &mut p.meta,
            Property::Choice(p) => &mut p.meta,
        }
    }

    pub fn name(&self) -> &str {
        &self.meta().name
    }

    pub fn description(&self) -> Option<&str> {
        self.meta().description.as_deref()
    }

    pub fn is_required(&self) -> bool {
        self.meta().required
    }

    pub fn kind(&self) -> Kind {
        match self {
            Property::String(_) => Kind::String,
            Property::Integer(_) => Kind::Integer,
            Property::Float(_) => Kind::Float,
            Property::Boolean(_) => Kind::Boolean,
            Property::Temporal(p) => p.format.kind(),
            Property::Object(_) => Kind::Object,
            Property::Array(_) => Kind::Array,
            Property::Choice(_) => Kind::Choice,
        }
    }

    /// Content-addressed identifier: 32 hex chars, independent of `name`.
    pub fn id(&self) -> String {
        match self {
            Property::String(p) => p.id(),
            Property::Integer(p) => p.id(),
            Property::Float(p) => p.id(),
            Property::Boolean(p) => p.id(),
            Property::Temporal(p) => p.id(),
            Property::Object(p) => p.id(),
            Property::Array(p) => p.id(),
            Property::Choice(p) => p.id(),
        }
    }

    /// Same node under a different name. The id is unaffected.
    pub fn renamed(mut self, name: impl Into<String>) -> Self {
        self.meta_mut().name = name.into();
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.meta_mut().description = Some(description.into());
        self
    }

    pub fn with_required(mut self, required: bool) -> Self {
        self.meta_mut().required = required;
        self
    }

    /// True when a scalar carries any constraint beyond its kind.
    pub fn is_constrained(&self) -> bool {
        match self {
            Property::String(p) => {
                p.simple.is_constrained() || p.min_length.is_some() || p.max_length.is_some()
            }
            Property::Integer(p) => p.simple.is_constrained() || p.min.is_some() || p.max.is_some(),
            Property::Float(p) => p.simple.is_constrained() || p.min.is_some() || p.max.is_some(),
            Property::Temporal(p) => p.simple.is_constrained(),
            Property::Boolean(_) => false,
            Property::Object(_) | Property::Array(_) | Property::Choice(_) => true,
        }
    }
}

// ————————————————————————————————————————————————————————————————————————————
// TESTS
// ————————————————————————————————————————————————————————————————————————————
