use super::id::IdBuilder;
use super::{Kind, Meta, Simple};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StringProperty {
    pub meta: Meta,
    pub simple: Simple<String>,
    pub min_length: Option<usize>,
    pub max_length: Option<usize>,
}

impl StringProperty {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            meta: Meta::new(name),
            simple: Simple::default(),
            min_length: None,
            max_length: None,
        }
    }

    pub fn min_length(mut self, min_length: usize) -> Self {
        self.min_length = Some(min_length);
        self
    }

    pub fn max_length(mut self, max_length: usize) -> Self {
        self.max_length = Some(max_length);
        self
    }

    pub fn id(&self) -> String {
        let mut id = IdBuilder::new(Kind::String);
        self.meta.hash_into(&mut id);
        self.simple.hash_into(&mut id);
        id.opt("minLength", self.min_length).opt("maxLength", self.max_length);
        id.finish()
    }
}

meta_builders!(StringProperty);
simple_builders!(StringProperty, String);
