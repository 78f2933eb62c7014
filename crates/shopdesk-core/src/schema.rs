//! Mode-conditional validation of product drafts.
//!
//! Every mode shares the same set of required descriptive fields; the
//! pricing requirements are chosen by [`ProductType`] and produce the
//! matching [`Pricing`] variant. Validation never stops at the first
//! problem: all violated fields are returned together.

use std::str::FromStr;

use rust_decimal::Decimal;

use crate::catalog::{CatalogEntry, PriceRow, Pricing, ProductDraft, ProductType, SinglePrice};
use crate::error::{FieldError, ValidationErrors};

/// Validates a draft using the product type it declares.
///
/// # Errors
///
/// Returns [`ValidationErrors`] listing every violated field. A missing or
/// unknown `type` is reported alongside the common-field violations.
pub fn validate_draft(draft: &ProductDraft) -> Result<CatalogEntry, ValidationErrors> {
    if draft.product_type.trim().is_empty() {
        return Err(common_only(draft, "Type is required."));
    }
    match ProductType::from_str(&draft.product_type) {
        Ok(mode) => validate(draft, mode),
        Err(_) => Err(common_only(
            draft,
            "Type must be one of single, variable or combo.",
        )),
    }
}

fn common_only(draft: &ProductDraft, type_message: &str) -> ValidationErrors {
    let mut checker = Checker::default();
    checker.errors.push(FieldError::new("type", type_message));
    checker.common(draft);
    ValidationErrors(checker.errors)
}

/// Validates `draft` under `mode`.
///
/// # Errors
///
/// Returns [`ValidationErrors`] listing every violated field.
pub fn validate(draft: &ProductDraft, mode: ProductType) -> Result<CatalogEntry, ValidationErrors> {
    let mut checker = Checker::default();
    checker.common(draft);

    let pricing = match mode {
        ProductType::Single => checker.single(&draft.single).map(Pricing::Single),
        ProductType::Variable => checker.variable(draft),
        ProductType::Combo => Some(Pricing::Combo),
    };

    if !checker.errors.is_empty() {
        return Err(ValidationErrors(checker.errors));
    }
    // Every branch that yields `None` has recorded at least one error.
    let Some(pricing) = pricing else {
        return Err(ValidationErrors(checker.errors));
    };

    Ok(CatalogEntry {
        id: draft.id,
        name: draft.name.clone(),
        description: draft.description.clone(),
        sku: non_blank(draft.sku.as_deref()),
        unit_id: draft.unit_id.clone(),
        tax_type: draft.tax_type.clone(),
        location_id: draft.location_id.clone(),
        category_id: draft.category_id.clone(),
        brand_id: draft.brand_id.clone(),
        barcode_id: draft.barcode_id.clone(),
        tax_id: draft.tax_id.clone(),
        weight: draft.weight.clone(),
        manage_stock: draft.manage_stock,
        quantity: non_blank(draft.quantity.as_deref()),
        images: draft.images.clone(),
        pricing,
        business_id: draft.business_id,
    })
}

fn non_blank(value: Option<&str>) -> Option<String> {
    value
        .filter(|v| !v.trim().is_empty())
        .map(str::to_string)
}

#[derive(Default)]
struct Checker {
    errors: Vec<FieldError>,
}

impl Checker {
    fn required(&mut self, field: &str, value: &str, message: &str) -> bool {
        if value.trim().is_empty() {
            self.errors.push(FieldError::new(field, message));
            false
        } else {
            true
        }
    }

    fn number(&mut self, field: &str, value: &str, label: &str) -> bool {
        if !self.required(field, value, &format!("{label} is required.")) {
            return false;
        }
        self.decimal(field, value, label)
    }

    fn decimal(&mut self, field: &str, value: &str, label: &str) -> bool {
        if Decimal::from_str(value.trim()).is_ok() {
            true
        } else {
            self.errors
                .push(FieldError::new(field, format!("{label} must be a number.")));
            false
        }
    }

    fn common(&mut self, draft: &ProductDraft) {
        self.required("name", &draft.name, "Name is required.");
        self.required("description", &draft.description, "Description is required.");
        self.required("unit_id", &draft.unit_id, "Unit is required.");
        self.required("tax_type", &draft.tax_type, "Tax Type is required.");
        self.required("location_id", &draft.location_id, "Location is required.");
        self.required("category_id", &draft.category_id, "Category is required.");
        self.required("brand_id", &draft.brand_id, "Brand is required.");
        self.required("barcode_id", &draft.barcode_id, "Barcode is required.");
        self.required("tax_id", &draft.tax_id, "Tax is required.");
        self.required("weight", &draft.weight, "Weight is required.");

        let quantity = draft.quantity.as_deref().unwrap_or_default();
        if draft.manage_stock {
            self.number("quantity", quantity, "Quantity");
        } else if !quantity.trim().is_empty() {
            self.decimal("quantity", quantity, "Quantity");
        }
    }

    fn single(&mut self, price: &SinglePrice) -> Option<SinglePrice> {
        let before = self.errors.len();
        self.number("selling_price", &price.selling_price, "Selling Price");
        self.number(
            "price_exclusive_tax",
            &price.price_exclusive_tax,
            "Price exclusive tax",
        );
        self.number(
            "price_inclusive_tax",
            &price.price_inclusive_tax,
            "Price inclusive tax",
        );
        self.number("profit_margin", &price.profit_margin, "Profit Margin");

        let inc_tax = non_blank(price.selling_price_inc_tax.as_deref());
        if let Some(value) = &inc_tax {
            self.decimal("selling_price_inc_tax", value, "Selling Price Inc Tax");
        }

        (self.errors.len() == before).then(|| SinglePrice {
            selling_price_inc_tax: inc_tax,
            ..price.clone()
        })
    }

    fn variable(&mut self, draft: &ProductDraft) -> Option<Pricing> {
        let before = self.errors.len();
        let variation_id = draft.variation_id.as_deref().unwrap_or_default();
        self.required("variation_id", variation_id, "Variation is required.");

        if draft.price_rows.is_empty() {
            self.errors.push(FieldError::new(
                "variation_list",
                "At least one variation row is required.",
            ));
        }
        for (index, row) in draft.price_rows.iter().enumerate() {
            self.row(index, row);
        }

        (self.errors.len() == before).then(|| Pricing::Variable {
            variation_id: variation_id.trim().to_string(),
            rows: draft.price_rows.clone(),
        })
    }

    fn row(&mut self, index: usize, row: &PriceRow) {
        let field = |name: &str| format!("variation_list.{index}.{name}");
        self.required(&field("value"), &row.value, "Value is required.");
        self.number(
            &field("price_exclusive_tax"),
            &row.price_exclusive_tax,
            "Price exclusive tax",
        );
        self.number(
            &field("price_inclusive_tax"),
            &row.price_inclusive_tax,
            "Price inclusive tax",
        );
        self.number(&field("profit_margin"), &row.profit_margin, "Profit Margin");
        self.number(&field("selling_price"), &row.selling_price, "Selling Price");
        if let Some(inc_tax) = &row.selling_price_inc_tax {
            self.number(
                &field("selling_price_inc_tax"),
                inc_tax,
                "Selling Price Inc Tax",
            );
        }
    }
}

#[cfg(test)]
#[path = "schema_test.rs"]
mod tests;
