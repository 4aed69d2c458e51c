//! Structural hash combinator behind [`super::Property::id`].
//!
//! Every field is written as `tag, value` with a length prefix, so the
//! encoding is order-sensitive and free of concatenation ambiguities
//! (`["ab","c"]` and `["a","bc"]` hash differently, absent differs from empty).
use std::fmt::Display;

use sha2::{Digest, Sha256};

use super::Kind;

/// Number of digest bytes kept in an id (rendered as twice as many hex chars).
const ID_BYTES: usize = 16;

const ABSENT: u64 = u64::MAX;

pub(crate) struct IdBuilder {
    hasher: Sha256,
}

impl IdBuilder {
    pub(crate) fn new(kind: Kind) -> Self {
        let mut id = Self { hasher: Sha256::new() };
        id.str("kind", kind.as_str());
        id
    }

    fn chunk(&mut self, bytes: &[u8]) {
        self.hasher.update((bytes.len() as u64).to_le_bytes());
        self.hasher.update(bytes);
    }

    fn absent(&mut self, tag: &str) {
        self.chunk(tag.as_bytes());
        self.hasher.update(ABSENT.to_le_bytes());
    }

    pub(crate) fn str(&mut self, tag: &str, value: &str) -> &mut Self {
        self.chunk(tag.as_bytes());
        self.chunk(value.as_bytes());
        self
    }

    pub(crate) fn flag(&mut self, tag: &str, value: bool) -> &mut Self {
        self.str(tag, if value { "1" } else { "0" })
    }

    pub(crate) fn opt_str(&mut self, tag: &str, value: Option<&str>) -> &mut Self {
        match value {
            Some(v) => self.str(tag, v),
            None => {
                self.absent(tag);
                self
            }
        }
    }

    pub(crate) fn opt<T: Display>(&mut self, tag: &str, value: Option<T>) -> &mut Self {
        match value {
            Some(v) => self.str(tag, &v.to_string()),
            None => {
                self.absent(tag);
                self
            }
        }
    }

    pub(crate) fn opt_list<T: Display>(&mut self, tag: &str, values: Option<&[T]>) -> &mut Self {
        match values {
            Some(values) => {
                self.str(tag, &values.len().to_string());
                for v in values {
                    self.chunk(v.to_string().as_bytes());
                }
                self
            }
            None => {
                self.absent(tag);
                self
            }
        }
    }

    /// Folds a child in under the key its parent knows it by.
    pub(crate) fn child(&mut self, key: &str, child_id: &str) -> &mut Self {
        self.str("child", key);
        self.chunk(child_id.as_bytes());
        self
    }

    pub(crate) fn finish(self) -> String {
        let digest = self.hasher.finalize();
        hex::encode(&digest[..ID_BYTES])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn absent_and_empty_differ() {
        let mut a = IdBuilder::new(Kind::String);
        a.opt_str("pattern", None);
        let mut b = IdBuilder::new(Kind::String);
        b.opt_str("pattern", Some(""));
        assert_ne!(a.finish(), b.finish());
    }

    #[test]
    fn list_boundaries_matter() {
        let mut a = IdBuilder::new(Kind::String);
        a.opt_list("enumeration", Some(&["ab", "c"][..]));
        let mut b = IdBuilder::new(Kind::String);
        b.opt_list("enumeration", Some(&["a", "bc"][..]));
        assert_ne!(a.finish(), b.finish());
    }

    #[test]
    fn ids_are_lowercase_hex() {
        let id = IdBuilder::new(Kind::Boolean).finish();
        assert_eq!(id.len(), ID_BYTES * 2);
        assert!(id.chars().all(|c| c.is_ascii_hexdigit() && !c.is_ascii_uppercase()));
    }
}
