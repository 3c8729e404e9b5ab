//! Per-request attribute store.
//!
//! Created fresh for every inbound request and dropped once the response
//! has been produced. Filters put values in; later filters and the
//! endpoint read them back. It is never shared between requests.

use std::any::Any;
use std::collections::HashMap;
use std::fmt;

/// Attribute name to arbitrary value.
#[derive(Default)]
pub struct RequestContext {
    attributes: HashMap<String, Box<dyn Any + Send + Sync>>,
}

impl RequestContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store `value` under `key`, replacing any earlier value.
    pub fn set_attribute<T: Any + Send + Sync>(&mut self, key: impl Into<String>, value: T) {
        self.attributes.insert(key.into(), Box::new(value));
    }

    /// Value under `key`, if present and of type `T`.
    pub fn attribute<T: Any>(&self, key: &str) -> Option<&T> {
        self.attributes.get(key)?.downcast_ref::<T>()
    }

    pub fn attribute_mut<T: Any>(&mut self, key: &str) -> Option<&mut T> {
        self.attributes.get_mut(key)?.downcast_mut::<T>()
    }

    pub fn contains(&self, key: &str) -> bool {
        self.attributes.contains_key(key)
    }

    pub fn remove(&mut self, key: &str) -> bool {
        self.attributes.remove(key).is_some()
    }

    pub fn len(&self) -> usize {
        self.attributes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.attributes.is_empty()
    }
}

impl fmt::Debug for RequestContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut keys: Vec<_> = self.attributes.keys().collect();
        keys.sort();
        f.debug_struct("RequestContext").field("attributes", &keys).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn typed_round_trip() {
        let mut ctx = RequestContext::new();
        ctx.set_attribute("user", "fred@example.com".to_string());
        ctx.set_attribute("tier", 3u8);

        assert_eq!(ctx.attribute::<String>("user").map(String::as_str), Some("fred@example.com"));
        assert_eq!(ctx.attribute::<u8>("tier"), Some(&3));
        assert_eq!(ctx.len(), 2);
    }

    #[test]
    fn wrong_type_or_missing_key_is_none() {
        let mut ctx = RequestContext::new();
        ctx.set_attribute("tier", 3u8);
        assert!(ctx.attribute::<String>("tier").is_none());
        assert!(ctx.attribute::<u8>("missing").is_none());
    }

    #[test]
    fn replace_and_remove() {
        let mut ctx = RequestContext::new();
        ctx.set_attribute("n", 1u32);
        ctx.set_attribute("n", 2u32);
        if let Some(n) = ctx.attribute_mut::<u32>("n") {
            *n += 1;
        }
        assert_eq!(ctx.attribute::<u32>("n"), Some(&3));
        assert!(ctx.remove("n"));
        assert!(!ctx.remove("n"));
        assert!(ctx.is_empty());
    }

    #[test]
    fn fresh_contexts_share_nothing() {
        let mut first = RequestContext::new();
        first.set_attribute("user", "fred".to_string());
        let second = RequestContext::new();
        assert!(!second.contains("user"));
    }
}
