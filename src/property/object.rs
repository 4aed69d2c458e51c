use super::id::IdBuilder;
use super::{Kind, Meta, Property};

/// Named children in declaration order.
///
/// Children are kept in a `Vec` so declaration order survives untouched;
/// [`ObjectProperty::duplicate_name`] reports a repeated child name, which
/// generators refuse to emit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObjectProperty {
    pub meta: Meta,
    pub properties: Vec<Property>,
}

impl ObjectProperty {
    pub fn new(name: impl Into<String>) -> Self {
        Self { meta: Meta::new(name), properties: Vec::new() }
    }

    pub fn property(mut self, property: impl Into<Property>) -> Self {
        self.properties.push(property.into());
        self
    }

    pub fn get(&self, name: &str) -> Option<&Property> {
        self.properties.iter().find(|p| p.name() == name)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Property> {
        self.properties.iter()
    }

    pub fn duplicate_name(&self) -> Option<&str> {
        self.properties.iter().enumerate().find_map(|(i, p)| {
            self.properties[..i]
                .iter()
                .any(|earlier| earlier.name() == p.name())
                .then(|| p.name())
        })
    }

    pub fn id(&self) -> String {
        let mut id = IdBuilder::new(Kind::Object);
        self.meta.hash_into(&mut id);
        for p in &self.properties {
            id.child(p.name(), &p.id());
        }
        id.finish()
    }
}

meta_builders!(ObjectProperty);

#[cfg(test)]
mod tests {
    use super::*;
    use crate::property::{IntegerProperty, StringProperty};

    #[test]
    fn lookup_and_order() {
        let o = ObjectProperty::new("location")
            .property(IntegerProperty::new("lat"))
            .property(IntegerProperty::new("long"));
        let names: Vec<&str> = o.iter().map(|p| p.name()).collect();
        assert_eq!(names, ["lat", "long"]);
        assert!(o.get("long").is_some());
        assert!(o.get("alt").is_none());
        assert_eq!(o.duplicate_name(), None);
    }

    #[test]
    fn duplicate_names_are_reported() {
        let o = ObjectProperty::new("news")
            .property(StringProperty::new("title"))
            .property(IntegerProperty::new("id"))
            .property(IntegerProperty::new("title"));
        assert_eq!(o.duplicate_name(), Some("title"));
    }
}
