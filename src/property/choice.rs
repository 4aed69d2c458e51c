use super::id::IdBuilder;
use super::{Kind, Meta, Property};

/// A value matching any one of several alternative types.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChoiceProperty {
    pub meta: Meta,
    pub alternatives: Vec<Property>,
}

impl ChoiceProperty {
    pub fn new(name: impl Into<String>) -> Self {
        Self { meta: Meta::new(name), alternatives: Vec::new() }
    }

    pub fn alternative(mut self, alternative: impl Into<Property>) -> Self {
        self.alternatives.push(alternative.into());
        self
    }

    pub fn id(&self) -> String {
        let mut id = IdBuilder::new(Kind::Choice);
        self.meta.hash_into(&mut id);
        for alt in &self.alternatives {
            id.child(alt.name(), &alt.id());
        }
        id.finish()
    }
}

meta_builders!(ChoiceProperty);
