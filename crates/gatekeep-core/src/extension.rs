//! Type-indexed extension objects owned by a module.

use std::any::{Any, TypeId};
use std::collections::HashMap;

/// Per-module container holding at most one instance of each extension type.
///
/// Conventions that configure the same type share the same instance, so a
/// composed convention extends what its base convention set up instead of
/// creating a second copy.
#[derive(Default)]
pub struct Extensions {
    items: HashMap<TypeId, Box<dyn Any + Send + Sync>>,
}

impl std::fmt::Debug for Extensions {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Extensions")
            .field("count", &self.items.len())
            .finish()
    }
}

impl Extensions {
    /// Creates an empty container.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Mutates the extension of type `T`, creating `T::default()` first if absent.
    pub fn configure<T, F>(&mut self, mutator: F) -> &T
    where
        T: Any + Default + Send + Sync,
        F: FnOnce(&mut T),
    {
        let entry = self
            .items
            .entry(TypeId::of::<T>())
            .or_insert_with(|| Box::new(T::default()) as Box<dyn Any + Send + Sync>);
        // The map is keyed by the TypeId of the boxed value.
        let Some(value) = (**entry).downcast_mut::<T>() else {
            unreachable!("extension stored under a foreign TypeId");
        };
        mutator(value);
        value
    }

    /// Returns the extension of type `T`, if it was configured.
    #[must_use]
    pub fn get<T: Any + Send + Sync>(&self) -> Option<&T> {
        self.items
            .get(&TypeId::of::<T>())
            .and_then(|b| b.downcast_ref::<T>())
    }

    /// Returns `true` if an extension of type `T` exists.
    #[must_use]
    pub fn contains<T: Any + Send + Sync>(&self) -> bool {
        self.items.contains_key(&TypeId::of::<T>())
    }

    /// Number of configured extensions.
    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Returns `true` if no extension was configured.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Default, PartialEq)]
    struct Sample {
        version: String,
        max: usize,
    }

    #[test]
    fn configure_creates_then_reuses_instance() {
        let mut ext = Extensions::new();
        ext.configure::<Sample, _>(|s| s.version = "1.0".to_string());
        ext.configure::<Sample, _>(|s| s.max = 3);

        assert_eq!(ext.len(), 1);
        assert_eq!(
            ext.get::<Sample>(),
            Some(&Sample {
                version: "1.0".to_string(),
                max: 3
            })
        );
    }

    #[test]
    fn get_missing_extension() {
        let ext = Extensions::new();
        assert!(ext.get::<Sample>().is_none());
        assert!(!ext.contains::<Sample>());
    }
}
