use serde::{Deserialize, Deserializer, Serialize};

use crate::lenient;

/// Product kind; decides which pricing fields are required.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProductType {
    Single,
    Variable,
    Combo,
}

impl ProductType {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            ProductType::Single => "single",
            ProductType::Variable => "variable",
            ProductType::Combo => "combo",
        }
    }
}

impl std::fmt::Display for ProductType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for ProductType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "single" => Ok(ProductType::Single),
            "variable" => Ok(ProductType::Variable),
            "combo" => Ok(ProductType::Combo),
            other => Err(format!("unknown product type '{other}'")),
        }
    }
}

/// One entry of a variation axis, e.g. `"Large"` under `"Size"`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VariationTemplate {
    pub id: i64,
    #[serde(rename = "tem_name", alias = "name")]
    pub name: String,
}

/// A named variation axis and its template entries.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Variation {
    pub id: i64,
    pub name: String,
    #[serde(rename = "variation_template", default)]
    pub templates: Vec<VariationTemplate>,
}

/// Any reference entity the form only needs by id and display name
/// (units, taxes, brands, barcodes, locations).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NamedRef {
    pub id: i64,
    pub name: String,
}

/// One priced variant line, tied to a template entry by `template_ref`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PriceRow {
    pub template_ref: String,
    #[serde(deserialize_with = "lenient::text")]
    pub value: String,
    #[serde(deserialize_with = "lenient::text")]
    pub price_exclusive_tax: String,
    #[serde(deserialize_with = "lenient::text")]
    pub price_inclusive_tax: String,
    #[serde(deserialize_with = "lenient::text")]
    pub profit_margin: String,
    #[serde(deserialize_with = "lenient::text")]
    pub selling_price: String,
    #[serde(deserialize_with = "lenient::opt_text")]
    pub selling_price_inc_tax: Option<String>,
}

impl PriceRow {
    /// A fresh row for `template_name`: display value pre-filled, prices blank.
    #[must_use]
    pub fn seeded(template_name: &str) -> Self {
        Self {
            template_ref: template_name.to_string(),
            value: template_name.to_string(),
            selling_price_inc_tax: Some(String::new()),
            ..Self::default()
        }
    }

    /// The template entry this row stands for.
    ///
    /// Rows loaded from files or server records carry only their display
    /// value, which was seeded from the entry name.
    #[must_use]
    pub fn template_key(&self) -> &str {
        if self.template_ref.is_empty() {
            &self.value
        } else {
            &self.template_ref
        }
    }
}

/// Price fields of a single-type product.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SinglePrice {
    #[serde(deserialize_with = "lenient::text")]
    pub selling_price: String,
    #[serde(deserialize_with = "lenient::opt_text")]
    pub selling_price_inc_tax: Option<String>,
    #[serde(deserialize_with = "lenient::text")]
    pub price_exclusive_tax: String,
    #[serde(deserialize_with = "lenient::text")]
    pub price_inclusive_tax: String,
    #[serde(deserialize_with = "lenient::text")]
    pub profit_margin: String,
}

/// An image attached to a product: freshly selected bytes or an already
/// hosted URL.
#[derive(Clone, PartialEq, Eq)]
pub enum ImagePart {
    File {
        file_name: String,
        content_type: String,
        bytes: Vec<u8>,
    },
    Url(String),
}

impl std::fmt::Debug for ImagePart {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ImagePart::File {
                file_name,
                content_type,
                bytes,
            } => f
                .debug_struct("File")
                .field("file_name", file_name)
                .field("content_type", content_type)
                .field("len", &bytes.len())
                .finish(),
            ImagePart::Url(url) => f.debug_tuple("Url").field(url).finish(),
        }
    }
}

/// Mutable product form state, exactly as the user has typed it.
///
/// Field names follow the backend so drafts can be loaded from files and
/// pre-filled from server records without a mapping layer.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProductDraft {
    /// Set when editing an existing product.
    pub id: Option<i64>,
    pub name: String,
    pub description: String,
    #[serde(deserialize_with = "lenient::opt_text")]
    pub sku: Option<String>,
    #[serde(rename = "type")]
    pub product_type: String,
    #[serde(deserialize_with = "lenient::text")]
    pub unit_id: String,
    pub tax_type: String,
    #[serde(deserialize_with = "lenient::text")]
    pub location_id: String,
    #[serde(deserialize_with = "lenient::text")]
    pub category_id: String,
    #[serde(deserialize_with = "lenient::text")]
    pub brand_id: String,
    #[serde(deserialize_with = "lenient::text")]
    pub barcode_id: String,
    #[serde(deserialize_with = "lenient::text")]
    pub tax_id: String,
    #[serde(deserialize_with = "lenient::text")]
    pub weight: String,
    #[serde(rename = "manage_stock_status")]
    pub manage_stock: bool,
    #[serde(deserialize_with = "lenient::opt_text")]
    pub quantity: Option<String>,
    #[serde(skip)]
    pub images: Vec<ImagePart>,
    #[serde(flatten)]
    pub single: SinglePrice,
    #[serde(deserialize_with = "lenient::opt_text")]
    pub variation_id: Option<String>,
    #[serde(rename = "variation_list")]
    pub price_rows: Vec<PriceRow>,
    pub business_id: i64,
}

impl ProductDraft {
    /// An empty draft scoped to `business_id`.
    #[must_use]
    pub fn new(business_id: i64) -> Self {
        Self {
            business_id,
            ..Self::default()
        }
    }

    /// A draft pre-filled from an existing product for editing.
    ///
    /// Only the fields the product listing carries are copied; pricing and
    /// reference selections start blank.
    #[must_use]
    pub fn from_existing(product: &Product, business_id: i64) -> Self {
        Self {
            id: Some(product.id),
            name: product.name.clone(),
            description: product.description.clone().unwrap_or_default(),
            sku: product.sku.clone().filter(|s| !s.is_empty()),
            product_type: product.product_type.clone(),
            unit_id: product.unit_id.map(|id| id.to_string()).unwrap_or_default(),
            tax_type: product.tax_type.clone().unwrap_or_default(),
            manage_stock: product.manage_stock_status,
            images: product
                .images
                .iter()
                .map(|img| ImagePart::Url(img.image_url.clone()))
                .collect(),
            ..Self::new(business_id)
        }
    }

    /// The selected variation id, when the selector holds a valid number.
    #[must_use]
    pub fn selected_variation(&self) -> Option<i64> {
        self.variation_id
            .as_deref()
            .and_then(|v| v.trim().parse::<i64>().ok())
    }
}

/// Validated pricing, one variant per product type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Pricing {
    Single(SinglePrice),
    Variable {
        variation_id: String,
        rows: Vec<PriceRow>,
    },
    Combo,
}

impl Pricing {
    #[must_use]
    pub fn product_type(&self) -> ProductType {
        match self {
            Pricing::Single(_) => ProductType::Single,
            Pricing::Variable { .. } => ProductType::Variable,
            Pricing::Combo => ProductType::Combo,
        }
    }
}

/// A product record that has passed validation and is ready to encode.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogEntry {
    pub id: Option<i64>,
    pub name: String,
    pub description: String,
    pub sku: Option<String>,
    pub unit_id: String,
    pub tax_type: String,
    pub location_id: String,
    pub category_id: String,
    pub brand_id: String,
    pub barcode_id: String,
    pub tax_id: String,
    pub weight: String,
    pub manage_stock: bool,
    pub quantity: Option<String>,
    pub images: Vec<ImagePart>,
    pub pricing: Pricing,
    pub business_id: i64,
}

impl CatalogEntry {
    #[must_use]
    pub fn product_type(&self) -> ProductType {
        self.pricing.product_type()
    }
}

/// A hosted product image as returned by the product listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductImage {
    pub id: i64,
    pub image_url: String,
}

/// A product as returned by the product listing, used to pre-fill edits.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    pub id: i64,
    pub name: String,
    #[serde(default)]
    pub sku: Option<String>,
    #[serde(rename = "type", default)]
    pub product_type: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub tax_type: Option<String>,
    #[serde(default)]
    pub unit_id: Option<i64>,
    #[serde(default, deserialize_with = "flag")]
    pub manage_stock_status: bool,
    #[serde(default, rename = "product_images")]
    pub images: Vec<ProductImage>,
}

/// Accepts `true`/`false`, `0`/`1` and `"0"`/`"1"`.
fn flag<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Flag {
        Bool(bool),
        Int(i64),
        Text(String),
    }

    Ok(match Option::<Flag>::deserialize(deserializer)? {
        Some(Flag::Bool(b)) => b,
        Some(Flag::Int(n)) => n != 0,
        Some(Flag::Text(s)) => matches!(s.trim(), "1" | "true"),
        None => false,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn product_type_parses_case_insensitively() {
        assert_eq!("Single".parse::<ProductType>(), Ok(ProductType::Single));
        assert_eq!(" variable ".parse::<ProductType>(), Ok(ProductType::Variable));
        assert_eq!("combo".parse::<ProductType>(), Ok(ProductType::Combo));
        assert!("bundle".parse::<ProductType>().is_err());
    }

    #[test]
    fn seeded_row_prefills_display_value_only() {
        let row = PriceRow::seeded("Large");
        assert_eq!(row.template_ref, "Large");
        assert_eq!(row.value, "Large");
        assert!(row.selling_price.is_empty());
        assert_eq!(row.selling_price_inc_tax.as_deref(), Some(""));
    }

    #[test]
    fn variation_deserializes_backend_template_names() {
        let json = serde_json::json!({
            "id": 3,
            "name": "Size",
            "variation_template": [
                { "id": 10, "tem_name": "Small" },
                { "id": 11, "tem_name": "Large" }
            ]
        });
        let variation: Variation = serde_json::from_value(json).unwrap();
        let names: Vec<&str> = variation.templates.iter().map(|t| t.name.as_str()).collect();
        assert_eq!(names, vec!["Small", "Large"]);
    }

    #[test]
    fn draft_deserializes_form_field_names() {
        let yaml = r"
name: Latte
type: single
manage_stock_status: true
quantity: '12'
selling_price: '400'
variation_list:
  - value: Small
    selling_price: '300'
business_id: 2
";
        let draft: ProductDraft = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(draft.product_type, "single");
        assert!(draft.manage_stock);
        assert_eq!(draft.single.selling_price, "400");
        assert_eq!(draft.price_rows[0].value, "Small");
        assert_eq!(draft.business_id, 2);
    }

    #[test]
    fn draft_accepts_unquoted_numbers() {
        let yaml = r"
name: Mocha
unit_id: 1
weight: 0.25
selling_price: 400
quantity: 12
variation_id: 3
variation_list:
  - value: 12
    selling_price: 300
";
        let draft: ProductDraft = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(draft.unit_id, "1");
        assert_eq!(draft.weight, "0.25");
        assert_eq!(draft.single.selling_price, "400");
        assert_eq!(draft.quantity.as_deref(), Some("12"));
        assert_eq!(draft.selected_variation(), Some(3));
        assert_eq!(draft.price_rows[0].value, "12");
        assert_eq!(draft.price_rows[0].selling_price, "300");
    }

    #[test]
    fn template_key_falls_back_to_display_value() {
        let loaded = PriceRow {
            value: "Small".to_string(),
            ..PriceRow::default()
        };
        assert_eq!(loaded.template_key(), "Small");

        let mut seeded = PriceRow::seeded("Small");
        seeded.value = "Petite".to_string();
        assert_eq!(seeded.template_key(), "Small");
    }

    #[test]
    fn from_existing_prefills_listing_fields() {
        let json = serde_json::json!({
            "id": 77,
            "name": "Mocha",
            "sku": "",
            "type": "variable",
            "description": "Chocolate coffee",
            "tax_type": "inclusive",
            "unit_id": 4,
            "manage_stock_status": 1,
            "product_images": [{ "id": 1, "image_url": "https://cdn.example/mocha.png" }]
        });
        let product: Product = serde_json::from_value(json).unwrap();
        let draft = ProductDraft::from_existing(&product, 9);

        assert_eq!(draft.id, Some(77));
        assert_eq!(draft.product_type, "variable");
        assert_eq!(draft.unit_id, "4");
        assert!(draft.sku.is_none());
        assert!(draft.manage_stock);
        assert_eq!(draft.business_id, 9);
        assert_eq!(
            draft.images,
            vec![ImagePart::Url("https://cdn.example/mocha.png".to_string())]
        );
    }

    #[test]
    fn selected_variation_ignores_non_numeric_values() {
        let mut draft = ProductDraft::new(1);
        assert_eq!(draft.selected_variation(), None);
        draft.variation_id = Some("12".to_string());
        assert_eq!(draft.selected_variation(), Some(12));
        draft.variation_id = Some("size".to_string());
        assert_eq!(draft.selected_variation(), None);
    }
}
