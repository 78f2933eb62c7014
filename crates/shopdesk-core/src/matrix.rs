//! Variation price matrix.
//!
//! Selecting a variation on a variable product fetches that variation's
//! template entries; each entry gets one [`PriceRow`]. The transition is a
//! pure function over the current rows so it can be exercised without any
//! network or UI in place. Rows are only ever appended by the generator;
//! removal is a user action and row 0 is kept.

use std::collections::HashSet;

use crate::catalog::{PriceRow, ProductDraft, Variation, VariationTemplate};

/// Result of applying a fetched template list to a draft.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatrixUpdate {
    /// The rows were synchronized; `appended` new rows were added.
    Applied { appended: usize },
    /// The response belonged to a variation that is no longer selected.
    Stale,
}

/// Appends one seeded row per template entry not yet represented.
///
/// Rows are matched by [`PriceRow::template_key`], so edits to a row's
/// display value do not cause a second row for the same entry. Existing rows keep their order
/// and content; new rows follow in template order. Duplicate names within
/// `templates` produce a single row.
#[must_use]
pub fn apply_template_selection(
    rows: &[PriceRow],
    templates: &[VariationTemplate],
) -> Vec<PriceRow> {
    let mut seen: HashSet<&str> = rows.iter().map(PriceRow::template_key).collect();
    let mut next = rows.to_vec();
    for template in templates {
        if seen.insert(template.name.as_str()) {
            next.push(PriceRow::seeded(&template.name));
        }
    }
    next
}

/// Records `variation_id` as the draft's current selection.
///
/// Returns `true` when the selection changed. Existing rows are left alone.
pub fn select_variation(draft: &mut ProductDraft, variation_id: i64) -> bool {
    if draft.selected_variation() == Some(variation_id) {
        return false;
    }
    draft.variation_id = Some(variation_id.to_string());
    true
}

/// Applies the template entries fetched for `variation_id`.
///
/// The result is keyed to the reference it was fetched for: if the draft has
/// since moved to another variation the response is dropped.
pub fn apply_fetched(
    draft: &mut ProductDraft,
    variation_id: i64,
    templates: &[VariationTemplate],
) -> MatrixUpdate {
    if draft.selected_variation() != Some(variation_id) {
        tracing::debug!(
            variation_id,
            selected = ?draft.variation_id,
            "ignoring template entries for a variation that is no longer selected"
        );
        return MatrixUpdate::Stale;
    }

    let before = draft.price_rows.len();
    draft.price_rows = apply_template_selection(&draft.price_rows, templates);
    let appended = draft.price_rows.len() - before;
    tracing::debug!(
        variation_id,
        appended,
        rows = draft.price_rows.len(),
        "price rows synchronized"
    );
    MatrixUpdate::Applied { appended }
}

/// Looks up the selected variation in a fetched list and applies its entries.
///
/// An unknown variation id leaves the rows untouched.
pub fn apply_from_variations(
    draft: &mut ProductDraft,
    variation_id: i64,
    variations: &[Variation],
) -> MatrixUpdate {
    let templates = variations
        .iter()
        .find(|v| v.id == variation_id)
        .map_or(&[][..], |v| v.templates.as_slice());
    apply_fetched(draft, variation_id, templates)
}

/// Removes row `index`. Row 0 is never removed so one editable row remains.
pub fn remove_row(draft: &mut ProductDraft, index: usize) -> Option<PriceRow> {
    if index == 0 || index >= draft.price_rows.len() {
        return None;
    }
    Some(draft.price_rows.remove(index))
}

/// Drops rows whose template is not in `templates`, returning how many were
/// removed.
///
/// Rows left over from a previously selected variation are otherwise kept
/// until the user removes them; this is the explicit way to discard them.
pub fn prune_to(draft: &mut ProductDraft, templates: &[VariationTemplate]) -> usize {
    let keep: HashSet<&str> = templates.iter().map(|t| t.name.as_str()).collect();
    let before = draft.price_rows.len();
    draft
        .price_rows
        .retain(|row| keep.contains(row.template_key()));
    before - draft.price_rows.len()
}
