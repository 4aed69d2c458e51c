use super::id::IdBuilder;
use super::{Kind, Meta, Property};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArrayProperty {
    pub meta: Meta,
    pub items: Box<Property>,
    pub min_items: Option<usize>,
    pub max_items: Option<usize>,
}

impl ArrayProperty {
    pub fn new(name: impl Into<String>, items: impl Into<Property>) -> Self {
        Self {
            meta: Meta::new(name),
            items: Box::new(items.into()),
            min_items: None,
            max_items: None,
        }
    }

    pub fn min_items(mut self, min_items: usize) -> Self {
        self.min_items = Some(min_items);
        self
    }

    pub fn max_items(mut self, max_items: usize) -> Self {
        self.max_items = Some(max_items);
        self
    }

    pub fn id(&self) -> String {
        let mut id = IdBuilder::new(Kind::Array);
        self.meta.hash_into(&mut id);
        id.opt("minItems", self.min_items).opt("maxItems", self.max_items);
        // element names carry no meaning, only their shape does
        id.child("", &self.items.id());
        id.finish()
    }
}

meta_builders!(ArrayProperty);
