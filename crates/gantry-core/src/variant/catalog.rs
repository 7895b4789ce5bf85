//! Variant catalog

use tracing::debug;

use crate::error::VariantError;

use super::descriptor::VariantDescriptor;

/// Built-in release matrix, in build order.
///
/// The plain `linux/amd64` entry is still compiled at the default amd64 level
/// by the normalizer; the explicit `GOAMD64` entries pick their own level.
pub const BUILTIN_VARIANTS: &[&[(&str, &str)]] = &[
    &[("GOOS", "darwin"), ("GOARCH", "amd64")],
    &[("GOOS", "darwin"), ("GOARCH", "arm64")],
    &[("GOOS", "linux"), ("GOARCH", "amd64")],
    &[("GOOS", "linux"), ("GOARCH", "amd64"), ("GOAMD64", "v3")],
    &[("GOOS", "linux"), ("GOARCH", "amd64"), ("GOAMD64", "v4")],
    &[("GOOS", "linux"), ("GOARCH", "arm64")],
    &[("GOOS", "linux"), ("GOARCH", "mipsle"), ("GOMIPS", "softfloat")],
    &[("GOOS", "linux"), ("GOARCH", "mips64le"), ("GOMIPS64", "hardfloat")],
    &[("GOOS", "linux"), ("GOARCH", "ppc64le")],
    &[("GOOS", "freebsd"), ("GOARCH", "amd64")],
    &[("GOOS", "windows"), ("GOARCH", "amd64")],
];

/// Built-in variants as descriptors
pub(crate) fn builtin_descriptors() -> Vec<VariantDescriptor> {
    BUILTIN_VARIANTS
        .iter()
        .map(|pairs| VariantDescriptor::from_static(pairs))
        .collect()
}

/// An ordered, non-empty list of variants.
///
/// Every entry remembers its position in the full catalog, so a narrowed
/// catalog still reports the index the user selected.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Catalog {
    entries: Vec<(usize, VariantDescriptor)>,
}

impl Catalog {
    /// Create a catalog from descriptors
    pub fn new(variants: Vec<VariantDescriptor>) -> Result<Self, VariantError> {
        if variants.is_empty() {
            return Err(VariantError::EmptyCatalog);
        }

        Ok(Self {
            entries: variants.into_iter().enumerate().collect(),
        })
    }

    /// The built-in release matrix
    pub fn builtin() -> Self {
        Self {
            entries: builtin_descriptors().into_iter().enumerate().collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Descriptor at a position of this catalog
    pub fn get(&self, position: usize) -> Option<&VariantDescriptor> {
        self.entries.get(position).map(|(_, d)| d)
    }

    /// Descriptors in catalog order
    pub fn iter(&self) -> impl Iterator<Item = &VariantDescriptor> {
        self.entries.iter().map(|(_, d)| d)
    }

    /// `(original index, descriptor)` pairs in catalog order
    pub fn entries(&self) -> impl Iterator<Item = (usize, &VariantDescriptor)> {
        self.entries.iter().map(|(i, d)| (*i, d))
    }

    /// Narrow the catalog to the single variant at a zero-based index
    pub fn select(&self, index: usize) -> Result<Self, VariantError> {
        let entry = self
            .entries
            .get(index)
            .cloned()
            .ok_or(VariantError::IndexOutOfRange {
                index,
                len: self.entries.len(),
            })?;

        debug!(index, variant = %entry.1.label(), "selected single variant");
        Ok(Self {
            entries: vec![entry],
        })
    }

    /// Narrow to `index` when given, otherwise keep the full catalog
    pub fn narrow(&self, index: Option<usize>) -> Result<Self, VariantError> {
        match index {
            Some(index) => self.select(index),
            None => Ok(self.clone()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_table_is_valid() {
        for pairs in BUILTIN_VARIANTS {
            let checked = VariantDescriptor::new(pairs.iter().copied()).unwrap();
            assert_eq!(checked, VariantDescriptor::from_static(pairs));
        }
    }

    #[test]
    fn test_builtin_order() {
        let catalog = Catalog::builtin();
        assert_eq!(catalog.len(), 11);
        assert_eq!(catalog.get(0).unwrap().label(), "darwin/amd64");
        assert_eq!(catalog.get(3).unwrap().label(), "linux/amd64/v3");
        assert_eq!(catalog.get(10).unwrap().label(), "windows/amd64");
    }

    #[test]
    fn test_select_keeps_original_index() {
        let catalog = Catalog::builtin();
        let selected = catalog.select(3).unwrap();
        assert_eq!(selected.len(), 1);

        let (index, descriptor) = selected.entries().next().unwrap();
        assert_eq!(index, 3);
        assert_eq!(descriptor.get("GOAMD64"), Some("v3"));
    }

    #[test]
    fn test_select_index_zero() {
        let selected = Catalog::builtin().select(0).unwrap();
        assert_eq!(selected.get(0).unwrap().label(), "darwin/amd64");
    }

    #[test]
    fn test_select_out_of_range() {
        let catalog = Catalog::builtin();
        assert_eq!(
            catalog.select(11).unwrap_err(),
            VariantError::IndexOutOfRange { index: 11, len: 11 }
        );
    }

    #[test]
    fn test_narrow_without_index_keeps_everything() {
        let catalog = Catalog::builtin();
        assert_eq!(catalog.narrow(None).unwrap(), catalog);
    }

    #[test]
    fn test_empty_catalog_rejected() {
        assert_eq!(Catalog::new(vec![]).unwrap_err(), VariantError::EmptyCatalog);
    }
}
