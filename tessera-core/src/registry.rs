//! Bounded registration table
//!
//! Entrants are registered once at start-up and visited in insertion order
//! on every pass. A slot index is assigned at registration and never
//! changes; nothing is ever removed or overwritten.

use core::ptr;

use heapless::Vec;

/// Registration errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum RegistryError {
    /// Every slot is taken
    Full,
    /// The same entrant is already registered
    AlreadyRegistered,
}

/// Fixed-capacity, insertion-ordered table of borrowed entrants
pub struct Registry<'a, T: ?Sized, const N: usize> {
    slots: Vec<&'a T, N>,
    limit: usize,
}

impl<'a, T: ?Sized, const N: usize> Registry<'a, T, N> {
    /// Create an empty table holding up to `N` entrants
    pub const fn new() -> Self {
        Self {
            slots: Vec::new(),
            limit: N,
        }
    }

    /// Create an empty table holding up to `min(limit, N)` entrants
    pub fn with_limit(limit: usize) -> Self {
        Self {
            slots: Vec::new(),
            limit: limit.min(N),
        }
    }

    /// Append an entrant and return its slot index
    ///
    /// Fails without touching existing slots when the table is full or the
    /// entrant (by address) is already present.
    pub fn register(&mut self, entrant: &'a T) -> Result<usize, RegistryError> {
        if self.slots.iter().any(|slot| ptr::addr_eq(*slot, entrant)) {
            return Err(RegistryError::AlreadyRegistered);
        }
        if self.slots.len() >= self.limit {
            return Err(RegistryError::Full);
        }

        let index = self.slots.len();
        self.slots
            .push(entrant)
            .map_err(|_| RegistryError::Full)?;
        Ok(index)
    }

    /// Number of registered entrants
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    /// Check if nothing is registered
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Effective capacity
    pub fn capacity(&self) -> usize {
        self.limit
    }

    /// Check if no further entrant fits
    pub fn is_full(&self) -> bool {
        self.slots.len() >= self.limit
    }

    /// Entrant at `index`
    pub fn get(&self, index: usize) -> Option<&'a T> {
        self.slots.get(index).copied()
    }

    /// Entrants with their slot index, in registration order
    pub fn iter(&self) -> impl Iterator<Item = (usize, &'a T)> + '_ {
        self.slots.iter().copied().enumerate()
    }
}

impl<T: ?Sized, const N: usize> Default for Registry<'_, T, N> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    trait Named {
        fn name(&self) -> &str;
    }

    struct Entrant(&'static str);

    impl Named for Entrant {
        fn name(&self) -> &str {
            self.0
        }
    }

    #[test]
    fn test_indices_follow_insertion_order() {
        let a = Entrant("a");
        let b = Entrant("b");
        let c = Entrant("c");
        let mut registry: Registry<'_, dyn Named, 4> = Registry::new();

        assert_eq!(registry.register(&a), Ok(0));
        assert_eq!(registry.register(&b), Ok(1));
        assert_eq!(registry.register(&c), Ok(2));

        let names: Vec<_, 4> = registry.iter().map(|(_, e)| e.name()).collect();
        assert_eq!(names.as_slice(), &["a", "b", "c"]);
        assert_eq!(registry.get(1).map(|e| e.name()), Some("b"));
        assert!(registry.get(3).is_none());
    }

    #[test]
    fn test_full_leaves_slots_unchanged() {
        let entrants = [Entrant("a"), Entrant("b"), Entrant("c")];
        let extra = Entrant("extra");
        let mut registry: Registry<'_, dyn Named, 3> = Registry::new();

        for (i, entrant) in entrants.iter().enumerate() {
            assert_eq!(registry.register(entrant), Ok(i));
        }
        assert!(registry.is_full());
        assert_eq!(registry.register(&extra), Err(RegistryError::Full));
        assert_eq!(registry.len(), 3);
        assert_eq!(registry.get(2).map(|e| e.name()), Some("c"));
    }

    #[test]
    fn test_duplicate_rejected() {
        let a = Entrant("a");
        let mut registry: Registry<'_, dyn Named, 3> = Registry::new();

        assert_eq!(registry.register(&a), Ok(0));
        assert_eq!(registry.register(&a), Err(RegistryError::AlreadyRegistered));
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_with_limit_clamps() {
        let entrants = [Entrant("a"), Entrant("b"), Entrant("c")];
        let mut registry: Registry<'_, dyn Named, 9> = Registry::with_limit(2);
        assert_eq!(registry.capacity(), 2);

        assert_eq!(registry.register(&entrants[0]), Ok(0));
        assert_eq!(registry.register(&entrants[1]), Ok(1));
        assert_eq!(registry.register(&entrants[2]), Err(RegistryError::Full));

        let registry: Registry<'_, dyn Named, 4> = Registry::with_limit(100);
        assert_eq!(registry.capacity(), 4);
    }

    #[test]
    fn test_empty() {
        let registry: Registry<'_, dyn Named, 4> = Registry::default();
        assert!(registry.is_empty());
        assert_eq!(registry.iter().count(), 0);
    }

    proptest! {
        #[test]
        fn prop_registration_is_monotonic(count in 0usize..20) {
            let values: std::vec::Vec<u32> = (0..count as u32).collect();
            let mut registry: Registry<'_, u32, 9> = Registry::new();

            for (i, value) in values.iter().enumerate() {
                let result = registry.register(value);
                if i < 9 {
                    prop_assert_eq!(result, Ok(i));
                } else {
                    prop_assert_eq!(result, Err(RegistryError::Full));
                }
            }
            prop_assert_eq!(registry.len(), count.min(9));
            for (i, entrant) in registry.iter() {
                prop_assert_eq!(*entrant, values[i]);
            }
        }
    }
}
