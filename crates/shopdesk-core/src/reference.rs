//! Selector options for the product form.
//!
//! Each list is fetched independently; a failed fetch leaves that one
//! selector [`Selector::Unavailable`] and the rest of the form usable.

use crate::catalog::{NamedRef, Variation, VariationTemplate};
use crate::category::CategoryNode;
use crate::context::RequestContext;
use crate::error::ReferenceDataError;
use crate::pipeline::ReferenceData;

/// Options of one selector.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Selector<T> {
    Loaded(Vec<T>),
    Unavailable,
}

impl<T> Selector<T> {
    fn from_result(result: Result<Vec<T>, ReferenceDataError>) -> Self {
        match result {
            Ok(items) => Selector::Loaded(items),
            Err(e) => {
                tracing::warn!(resource = e.resource, error = %e, "reference data unavailable");
                Selector::Unavailable
            }
        }
    }

    /// Loaded options, or an empty slice when the fetch failed.
    #[must_use]
    pub fn options(&self) -> &[T] {
        match self {
            Selector::Loaded(items) => items,
            Selector::Unavailable => &[],
        }
    }

    #[must_use]
    pub fn is_available(&self) -> bool {
        matches!(self, Selector::Loaded(_))
    }
}

impl<T> Default for Selector<T> {
    fn default() -> Self {
        Selector::Unavailable
    }
}

/// All selector lists the product and category forms need.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReferenceSet {
    pub variations: Selector<Variation>,
    pub categories: Selector<CategoryNode>,
    pub units: Selector<NamedRef>,
    pub taxes: Selector<NamedRef>,
    pub brands: Selector<NamedRef>,
    pub barcodes: Selector<NamedRef>,
    pub locations: Selector<NamedRef>,
}

impl ReferenceSet {
    /// Fetches every list concurrently. Never fails as a whole.
    pub async fn load<R: ReferenceData>(source: &R, ctx: &RequestContext) -> Self {
        let (variations, categories, units, taxes, brands, barcodes, locations) = futures::join!(
            source.list_variations(ctx),
            source.list_categories(ctx),
            source.list_units(ctx),
            source.list_taxes(ctx),
            source.list_brands(ctx),
            source.list_barcodes(ctx),
            source.list_locations(ctx),
        );

        let set = Self {
            variations: Selector::from_result(variations),
            categories: Selector::from_result(categories),
            units: Selector::from_result(units),
            taxes: Selector::from_result(taxes),
            brands: Selector::from_result(brands),
            barcodes: Selector::from_result(barcodes),
            locations: Selector::from_result(locations),
        };
        tracing::debug!(unavailable = ?set.unavailable(), "reference data loaded");
        set
    }

    /// Names of the selectors whose fetch failed.
    #[must_use]
    pub fn unavailable(&self) -> Vec<&'static str> {
        [
            ("variations", self.variations.is_available()),
            ("categories", self.categories.is_available()),
            ("units", self.units.is_available()),
            ("taxes", self.taxes.is_available()),
            ("brands", self.brands.is_available()),
            ("barcodes", self.barcodes.is_available()),
            ("locations", self.locations.is_available()),
        ]
        .into_iter()
        .filter_map(|(name, ok)| (!ok).then_some(name))
        .collect()
    }

    /// Template entries of `variation_id`, empty if unknown or unavailable.
    #[must_use]
    pub fn templates_for(&self, variation_id: i64) -> &[VariationTemplate] {
        self.variations
            .options()
            .iter()
            .find(|v| v.id == variation_id)
            .map_or(&[], |v| v.templates.as_slice())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct StubCatalog {
        broken: &'static str,
    }

    impl StubCatalog {
        fn list(&self, resource: &'static str) -> Result<Vec<NamedRef>, ReferenceDataError> {
            if resource == self.broken {
                return Err(ReferenceDataError::new(resource, "503 Service Unavailable"));
            }
            Ok(vec![NamedRef {
                id: 1,
                name: format!("{resource}-1"),
            }])
        }
    }

    impl ReferenceData for StubCatalog {
        async fn list_variations(
            &self,
            _ctx: &RequestContext,
        ) -> Result<Vec<Variation>, ReferenceDataError> {
            if self.broken == "variations" {
                return Err(ReferenceDataError::new("variations", "timeout"));
            }
            Ok(vec![Variation {
                id: 3,
                name: "Size".to_string(),
                templates: vec![
                    VariationTemplate {
                        id: 10,
                        name: "Small".to_string(),
                    },
                    VariationTemplate {
                        id: 11,
                        name: "Large".to_string(),
                    },
                ],
            }])
        }

        async fn list_categories(
            &self,
            _ctx: &RequestContext,
        ) -> Result<Vec<CategoryNode>, ReferenceDataError> {
            Ok(vec![CategoryNode::new_root(1)])
        }

        async fn list_units(
            &self,
            _ctx: &RequestContext,
        ) -> Result<Vec<NamedRef>, ReferenceDataError> {
            self.list("units")
        }

        async fn list_taxes(
            &self,
            _ctx: &RequestContext,
        ) -> Result<Vec<NamedRef>, ReferenceDataError> {
            self.list("taxes")
        }

        async fn list_brands(
            &self,
            _ctx: &RequestContext,
        ) -> Result<Vec<NamedRef>, ReferenceDataError> {
            self.list("brands")
        }

        async fn list_barcodes(
            &self,
            _ctx: &RequestContext,
        ) -> Result<Vec<NamedRef>, ReferenceDataError> {
            self.list("barcodes")
        }

        async fn list_locations(
            &self,
            _ctx: &RequestContext,
        ) -> Result<Vec<NamedRef>, ReferenceDataError> {
            self.list("locations")
        }
    }

    #[tokio::test]
    async fn failed_list_degrades_only_its_selector() {
        let ctx = RequestContext::new(1, None);
        let set = ReferenceSet::load(&StubCatalog { broken: "brands" }, &ctx).await;

        assert_eq!(set.brands, Selector::Unavailable);
        assert!(set.brands.options().is_empty());
        assert_eq!(set.units.options()[0].name, "units-1");
        assert_eq!(set.unavailable(), vec!["brands"]);
    }

    #[tokio::test]
    async fn templates_come_from_loaded_variations() {
        let ctx = RequestContext::new(1, None);
        let set = ReferenceSet::load(&StubCatalog { broken: "" }, &ctx).await;
        let names: Vec<&str> = set.templates_for(3).iter().map(|t| t.name.as_str()).collect();
        assert_eq!(names, vec!["Small", "Large"]);
        assert!(set.templates_for(99).is_empty());
        assert!(set.unavailable().is_empty());

        let broken = ReferenceSet::load(&StubCatalog { broken: "variations" }, &ctx).await;
        assert!(broken.templates_for(3).is_empty());
    }
}
