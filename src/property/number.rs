use ordered_float::OrderedFloat;

use super::id::IdBuilder;
use super::{Kind, Meta, Simple};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IntegerProperty {
    pub meta: Meta,
    pub simple: Simple<i64>,
    pub min: Option<i64>,
    pub max: Option<i64>,
}

impl IntegerProperty {
    pub fn new(name: impl Into<String>) -> Self {
        Self { meta: Meta::new(name), simple: Simple::default(), min: None, max: None }
    }

    pub fn min(mut self, min: i64) -> Self {
        self.min = Some(min);
        self
    }

    pub fn max(mut self, max: i64) -> Self {
        self.max = Some(max);
        self
    }

    pub fn id(&self) -> String {
        let mut id = IdBuilder::new(Kind::Integer);
        self.meta.hash_into(&mut id);
        self.simple.hash_into(&mut id);
        id.opt("min", self.min).opt("max", self.max);
        id.finish()
    }
}

meta_builders!(IntegerProperty);
simple_builders!(IntegerProperty, i64);

/// Floating point numbers. Bounds are [`OrderedFloat`] so the node stays `Eq`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FloatProperty {
    pub meta: Meta,
    pub simple: Simple<OrderedFloat<f64>>,
    pub min: Option<OrderedFloat<f64>>,
    pub max: Option<OrderedFloat<f64>>,
}

impl FloatProperty {
    pub fn new(name: impl Into<String>) -> Self {
        Self { meta: Meta::new(name), simple: Simple::default(), min: None, max: None }
    }

    pub fn min(mut self, min: f64) -> Self {
        self.min = Some(OrderedFloat(min));
        self
    }

    pub fn max(mut self, max: f64) -> Self {
        self.max = Some(OrderedFloat(max));
        self
    }

    pub fn id(&self) -> String {
        let mut id = IdBuilder::new(Kind::Float);
        self.meta.hash_into(&mut id);
        self.simple.hash_into(&mut id);
        id.opt("min", self.min).opt("max", self.max);
        id.finish()
    }
}

meta_builders!(FloatProperty);
simple_builders!(FloatProperty, OrderedFloat<f64>);
