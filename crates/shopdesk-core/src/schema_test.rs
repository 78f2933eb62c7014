use super::*;

fn base_draft(product_type: &str) -> ProductDraft {
    ProductDraft {
        name: "Flat White".to_string(),
        description: "Double shot with steamed milk".to_string(),
        product_type: product_type.to_string(),
        unit_id: "1".to_string(),
        tax_type: "inclusive".to_string(),
        location_id: "3".to_string(),
        category_id: "5".to_string(),
        brand_id: "2".to_string(),
        barcode_id: "8".to_string(),
        tax_id: "4".to_string(),
        weight: "0.3".to_string(),
        ..ProductDraft::new(1)
    }
}

fn single_draft() -> ProductDraft {
    let mut draft = base_draft("single");
    draft.single = SinglePrice {
        selling_price: "400".to_string(),
        selling_price_inc_tax: Some("468".to_string()),
        price_exclusive_tax: "400".to_string(),
        price_inclusive_tax: "468".to_string(),
        profit_margin: "329".to_string(),
    };
    draft
}

fn filled_row(name: &str) -> PriceRow {
    PriceRow {
        price_exclusive_tax: "100".to_string(),
        price_inclusive_tax: "117".to_string(),
        profit_margin: "25".to_string(),
        selling_price: "125".to_string(),
        selling_price_inc_tax: Some("146.25".to_string()),
        ..PriceRow::seeded(name)
    }
}

fn variable_draft() -> ProductDraft {
    let mut draft = base_draft("variable");
    draft.variation_id = Some("3".to_string());
    draft.price_rows = vec![filled_row("Small"), filled_row("Large")];
    draft
}

#[test]
fn single_draft_validates_into_single_pricing() {
    let entry = validate_draft(&single_draft()).expect("single draft is valid");
    assert_eq!(entry.product_type(), ProductType::Single);
    let Pricing::Single(price) = entry.pricing else {
        panic!("expected single pricing");
    };
    assert_eq!(price.selling_price, "400");
    assert_eq!(price.selling_price_inc_tax.as_deref(), Some("468"));
}

#[test]
fn single_fails_iff_a_pricing_field_is_empty() {
    let fields: [(&str, fn(&mut SinglePrice) -> &mut String); 4] = [
        ("selling_price", |p| &mut p.selling_price),
        ("price_exclusive_tax", |p| &mut p.price_exclusive_tax),
        ("price_inclusive_tax", |p| &mut p.price_inclusive_tax),
        ("profit_margin", |p| &mut p.profit_margin),
    ];

    assert!(validate(&single_draft(), ProductType::Single).is_ok());

    for (name, field) in fields {
        let mut draft = single_draft();
        field(&mut draft.single).clear();
        let errors = validate(&draft, ProductType::Single).unwrap_err();
        assert_eq!(errors.fields().len(), 1, "only {name} should fail");
        assert!(errors.contains(name), "{name} should be reported");
    }
}

#[test]
fn single_ignores_price_rows() {
    let mut draft = single_draft();
    draft.price_rows = vec![PriceRow::seeded("Stale")];
    let entry = validate(&draft, ProductType::Single).expect("rows are ignored");
    assert!(matches!(entry.pricing, Pricing::Single(_)));
}

#[test]
fn single_blank_inc_tax_becomes_none() {
    let mut draft = single_draft();
    draft.single.selling_price_inc_tax = Some("  ".to_string());
    let entry = validate_draft(&draft).unwrap();
    let Pricing::Single(price) = entry.pricing else {
        panic!("expected single pricing");
    };
    assert!(price.selling_price_inc_tax.is_none());
}

#[test]
fn non_numeric_price_is_rejected() {
    let mut draft = single_draft();
    draft.single.profit_margin = "lots".to_string();
    let errors = validate_draft(&draft).unwrap_err();
    assert_eq!(
        errors.message_for("profit_margin"),
        Some("Profit Margin must be a number.")
    );
}

#[test]
fn variable_draft_validates_into_rows() {
    let entry = validate_draft(&variable_draft()).expect("variable draft is valid");
    let Pricing::Variable { variation_id, rows } = entry.pricing else {
        panic!("expected variable pricing");
    };
    assert_eq!(variation_id, "3");
    assert_eq!(rows.len(), 2);
}

#[test]
fn variable_ignores_single_pricing_fields() {
    let mut draft = variable_draft();
    draft.single = SinglePrice::default();
    assert!(validate_draft(&draft).is_ok());
}

#[test]
fn variable_requires_variation_and_rows() {
    let mut draft = base_draft("variable");
    draft.variation_id = Some(" ".to_string());
    let errors = validate_draft(&draft).unwrap_err();
    assert_eq!(errors.message_for("variation_id"), Some("Variation is required."));
    assert!(errors.contains("variation_list"));
}

#[test]
fn variable_reports_every_blank_row_field() {
    let mut draft = variable_draft();
    draft.price_rows.push(PriceRow::seeded("Medium"));
    draft.price_rows[0].value.clear();

    let errors = validate_draft(&draft).unwrap_err();
    let fields: Vec<&str> = errors.fields().iter().map(|e| e.field.as_str()).collect();
    assert_eq!(
        fields,
        vec![
            "variation_list.0.value",
            "variation_list.2.price_exclusive_tax",
            "variation_list.2.price_inclusive_tax",
            "variation_list.2.profit_margin",
            "variation_list.2.selling_price",
            "variation_list.2.selling_price_inc_tax",
        ]
    );
    assert_eq!(
        errors.message_for("variation_list.2.selling_price"),
        Some("Selling Price is required.")
    );
}

#[test]
fn variable_row_without_inc_tax_field_is_accepted() {
    let mut draft = variable_draft();
    draft.price_rows[1].selling_price_inc_tax = None;
    assert!(validate_draft(&draft).is_ok());
}

#[test]
fn combo_passes_without_pricing() {
    let draft = base_draft("combo");
    let entry = validate_draft(&draft).expect("combo has no pricing requirements");
    assert_eq!(entry.pricing, Pricing::Combo);
}

#[test]
fn common_fields_are_all_reported_together() {
    let draft = ProductDraft {
        product_type: "combo".to_string(),
        ..ProductDraft::new(1)
    };
    let errors = validate_draft(&draft).unwrap_err();
    let fields: Vec<&str> = errors.fields().iter().map(|e| e.field.as_str()).collect();
    assert_eq!(
        fields,
        vec![
            "name",
            "description",
            "unit_id",
            "tax_type",
            "location_id",
            "category_id",
            "brand_id",
            "barcode_id",
            "tax_id",
            "weight",
        ]
    );
    assert_eq!(errors.message_for("name"), Some("Name is required."));
}

#[test]
fn missing_type_is_reported_with_common_fields() {
    let mut draft = single_draft();
    draft.product_type.clear();
    draft.name.clear();
    let errors = validate_draft(&draft).unwrap_err();
    assert_eq!(errors.message_for("type"), Some("Type is required."));
    assert!(errors.contains("name"));
}

#[test]
fn unknown_type_is_rejected() {
    let draft = base_draft("bundle");
    let errors = validate_draft(&draft).unwrap_err();
    assert!(errors.contains("type"));
    assert_eq!(errors.fields().len(), 1);
}

#[test]
fn quantity_required_only_when_managing_stock() {
    let mut draft = single_draft();
    draft.manage_stock = true;
    let errors = validate_draft(&draft).unwrap_err();
    assert_eq!(errors.message_for("quantity"), Some("Quantity is required."));

    draft.quantity = Some("25".to_string());
    let entry = validate_draft(&draft).unwrap();
    assert_eq!(entry.quantity.as_deref(), Some("25"));

    draft.manage_stock = false;
    draft.quantity = None;
    assert!(validate_draft(&draft).is_ok());
}

#[test]
fn blank_sku_is_dropped() {
    let mut draft = single_draft();
    draft.sku = Some(String::new());
    assert!(validate_draft(&draft).unwrap().sku.is_none());
    draft.sku = Some("P302".to_string());
    assert_eq!(validate_draft(&draft).unwrap().sku.as_deref(), Some("P302"));
}
