//! The catalog of available codelets.

use crate::error::Error;
use crate::features::{Features, SimdLevel};
use fourier_algorithms::{CodeletFn, PermutationFn};
use std::collections::BTreeMap;

/// Algorithm families.
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Family {
    /// Radix-2 decimation in time.
    Dit,
    /// Stockham autosort.
    Stockham,
    /// Six-step transpose algorithm.
    SixStep,
    /// Eight-step transpose algorithm.
    EightStep,
    /// Chirp-z convolution.
    Bluestein,
    /// Recursive decomposition over leaf codelets.
    Recursive,
}

impl Family {
    /// Every family, in a fixed order.
    pub const ALL: [Family; 6] = [
        Family::Dit,
        Family::Stockham,
        Family::SixStep,
        Family::EightStep,
        Family::Bluestein,
        Family::Recursive,
    ];

    /// The name recorded in wisdom.
    pub fn name(self) -> &'static str {
        match self {
            Self::Dit => "dit",
            Self::Stockham => "stockham",
            Self::SixStep => "sixstep",
            Self::EightStep => "eightstep",
            Self::Bluestein => "bluestein",
            Self::Recursive => "recursive",
        }
    }

    /// Parses a wisdom name, including the legacy DIT names.
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "dit" | "dit64" | "dit_fallback" => Some(Self::Dit),
            "stockham" => Some(Self::Stockham),
            "sixstep" => Some(Self::SixStep),
            "eightstep" => Some(Self::EightStep),
            "bluestein" => Some(Self::Bluestein),
            "recursive" => Some(Self::Recursive),
            _ => None,
        }
    }
}

impl std::fmt::Display for Family {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// A registered codelet.
pub struct CodeletEntry<T> {
    size: usize,
    name: &'static str,
    family: Family,
    level: SimdLevel,
    priority: i32,
    scratch_len: usize,
    permutation: Option<PermutationFn>,
    forward: CodeletFn<T>,
    inverse: CodeletFn<T>,
}

impl<T> Clone for CodeletEntry<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for CodeletEntry<T> {}

impl<T> std::fmt::Debug for CodeletEntry<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> Result<(), std::fmt::Error> {
        f.debug_struct("CodeletEntry")
            .field("size", &self.size)
            .field("name", &self.name)
            .field("family", &self.family)
            .field("level", &self.level)
            .field("priority", &self.priority)
            .finish()
    }
}

impl<T> CodeletEntry<T> {
    /// Creates a generic-tier entry with priority 0 and no scratch or permutation.
    pub fn new(size: usize, family: Family, forward: CodeletFn<T>, inverse: CodeletFn<T>) -> Self {
        Self {
            size,
            name: family.name(),
            family,
            level: SimdLevel::Generic,
            priority: 0,
            scratch_len: 0,
            permutation: None,
            forward,
            inverse,
        }
    }

    pub fn with_name(mut self, name: &'static str) -> Self {
        self.name = name;
        self
    }

    pub fn with_level(mut self, level: SimdLevel) -> Self {
        self.level = level;
        self
    }

    pub fn with_priority(mut self, priority: i32) -> Self {
        self.priority = priority;
        self
    }

    /// Sets the number of scratch elements the codelet needs.
    pub fn with_scratch_len(mut self, scratch_len: usize) -> Self {
        self.scratch_len = scratch_len;
        self
    }

    pub fn with_permutation(mut self, permutation: PermutationFn) -> Self {
        self.permutation = Some(permutation);
        self
    }

    pub fn size(&self) -> usize {
        self.size
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn family(&self) -> Family {
        self.family
    }

    pub fn level(&self) -> SimdLevel {
        self.level
    }

    pub fn priority(&self) -> i32 {
        self.priority
    }

    pub fn scratch_len(&self) -> usize {
        self.scratch_len
    }

    pub fn permutation(&self) -> Option<PermutationFn> {
        self.permutation
    }

    pub fn forward(&self) -> CodeletFn<T> {
        self.forward
    }

    pub fn inverse(&self) -> CodeletFn<T> {
        self.inverse
    }
}

/// Codelets for one precision, grouped by size.
///
/// Registration takes `&mut self` and lookups take `&self`: build the registry, then share it
/// (usually behind an `Arc`) with any number of readers.
pub struct Registry<T> {
    by_size: BTreeMap<usize, Vec<CodeletEntry<T>>>,
    len: usize,
}

impl<T> Default for Registry<T> {
    fn default() -> Self {
        Self {
            by_size: BTreeMap::new(),
            len: 0,
        }
    }
}

impl<T> std::fmt::Debug for Registry<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> Result<(), std::fmt::Error> {
        f.debug_map().entries(self.by_size.iter()).finish()
    }
}

impl<T> Registry<T> {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a codelet for its declared size.
    pub fn register(&mut self, entry: CodeletEntry<T>) -> Result<(), Error> {
        if entry.size == 0 {
            return Err(Error::InvalidLength(0));
        }
        self.insert(entry);
        Ok(())
    }

    /// Inserts after every entry of equal or higher priority, keeping ties in registration order.
    pub(crate) fn insert(&mut self, entry: CodeletEntry<T>) {
        let group = self.by_size.entry(entry.size).or_insert_with(Vec::new);
        let position = group
            .iter()
            .position(|existing| existing.priority < entry.priority)
            .unwrap_or_else(|| group.len());
        group.insert(position, entry);
        self.len += 1;
    }

    /// The highest priority entry for `size` that `features` can run.
    pub fn lookup(&self, size: usize, features: &Features) -> Option<&CodeletEntry<T>> {
        self.candidates(size, *features, None).next()
    }

    /// Every runnable entry for `size`, best first, optionally restricted to one family.
    pub fn candidates(
        &self,
        size: usize,
        features: Features,
        family: Option<Family>,
    ) -> impl Iterator<Item = &CodeletEntry<T>> + '_ {
        self.by_size
            .get(&size)
            .into_iter()
            .flatten()
            .filter(move |entry| features.supports(entry.level))
            .filter(move |entry| family.map_or(true, |family| entry.family == family))
    }

    /// Sizes with at least one registered entry, ascending.
    pub fn sizes(&self) -> impl Iterator<Item = usize> + '_ {
        self.by_size.keys().copied()
    }

    /// Sizes with at least one entry that `features` can run, ascending.
    pub fn leaf_sizes(&self, features: &Features) -> Vec<usize> {
        self.by_size
            .iter()
            .filter(|(_, entries)| entries.iter().any(|entry| features.supports(entry.level)))
            .map(|(size, _)| *size)
            .collect()
    }

    /// The number of registered entries.
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use fourier_algorithms::{autosort, leaf};

    fn entry(size: usize, priority: i32, name: &'static str) -> CodeletEntry<f64> {
        CodeletEntry::new(size, Family::Stockham, autosort::codelet, autosort::codelet)
            .with_priority(priority)
            .with_name(name)
    }

    #[test]
    fn orders_by_priority_then_registration() {
        let mut registry = Registry::new();
        registry.register(entry(16, 1, "a")).unwrap();
        registry.register(entry(16, 5, "b")).unwrap();
        registry.register(entry(16, 1, "c")).unwrap();
        registry.register(entry(16, 5, "d")).unwrap();
        let names = registry
            .candidates(16, Features::generic(), None)
            .map(CodeletEntry::name)
            .collect::<Vec<_>>();
        assert_eq!(names, vec!["b", "d", "a", "c"]);
        assert_eq!(registry.len(), 4);
    }

    #[test]
    fn lookup_respects_capabilities() {
        let mut registry = Registry::new();
        registry.register(entry(8, 1, "generic")).unwrap();
        registry
            .register(entry(8, 9, "wide").with_level(SimdLevel::Avx2))
            .unwrap();

        let avx2 = Features {
            avx2: true,
            ..Features::generic()
        };
        assert_eq!(registry.lookup(8, &avx2).unwrap().name(), "wide");
        assert_eq!(
            registry.lookup(8, &Features::generic()).unwrap().name(),
            "generic"
        );
        assert_eq!(
            registry
                .lookup(8, &avx2.with_force_generic(true))
                .unwrap()
                .name(),
            "generic"
        );
        assert!(registry.lookup(4, &avx2).is_none());
    }

    #[test]
    fn filters_by_family() {
        let mut registry = Registry::new();
        registry.register(entry(4, 1, "stockham")).unwrap();
        registry
            .register(CodeletEntry::new(4, Family::Recursive, leaf::leaf4, leaf::leaf4))
            .unwrap();
        let families = registry
            .candidates(4, Features::generic(), Some(Family::Recursive))
            .map(CodeletEntry::family)
            .collect::<Vec<_>>();
        assert_eq!(families, vec![Family::Recursive]);
    }

    #[test]
    fn leaf_sizes_follow_capabilities() {
        let mut registry = Registry::new();
        registry.register(entry(4, 1, "generic")).unwrap();
        registry
            .register(entry(8, 1, "wide").with_level(SimdLevel::Avx512))
            .unwrap();
        assert_eq!(registry.leaf_sizes(&Features::generic()), vec![4]);
        assert_eq!(registry.sizes().collect::<Vec<_>>(), vec![4, 8]);
    }

    #[test]
    fn rejects_size_zero() {
        let mut registry = Registry::<f64>::new();
        assert!(matches!(
            registry.register(entry(0, 1, "empty")),
            Err(Error::InvalidLength(0))
        ));
        assert!(registry.is_empty());
    }

    #[test]
    fn family_names_round_trip() {
        for family in Family::ALL.iter().copied() {
            assert_eq!(Family::from_name(family.name()), Some(family));
        }
        assert_eq!(Family::from_name("dit64"), Some(Family::Dit));
        assert_eq!(Family::from_name("fastest"), None);
    }
}
