//! Bracket-indexed multipart encoding.
//!
//! The backend reads nested form fields using the PHP-style convention:
//!
//! | shape                         | key          |
//! |-------------------------------|--------------|
//! | scalar `f`                    | `f`          |
//! | object `f`, sub-field `s`     | `f[s]`       |
//! | array of objects, index `i`   | `f[i][s]`    |
//! | plain array                   | `f[]` (repeated) |
//!
//! Output order is fixed by the encoder, never by map iteration, so the same
//! entry always produces the same part sequence.

use serde_json::Value;

use crate::catalog::{CatalogEntry, ImagePart, Pricing, SinglePrice};
use crate::category::CategoryNode;

/// Value of one multipart field.
#[derive(Clone, PartialEq, Eq)]
pub enum PartValue {
    Text(String),
    File {
        file_name: String,
        content_type: String,
        bytes: Vec<u8>,
    },
}

impl std::fmt::Debug for PartValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PartValue::Text(text) => f.debug_tuple("Text").field(text).finish(),
            PartValue::File {
                file_name,
                content_type,
                bytes,
            } => f
                .debug_struct("File")
                .field("file_name", file_name)
                .field("content_type", content_type)
                .field("len", &bytes.len())
                .finish(),
        }
    }
}

/// One `(key, value)` pair of the encoded submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormPart {
    pub key: String,
    pub value: PartValue,
}

impl FormPart {
    pub fn text(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            value: PartValue::Text(value.into()),
        }
    }

    /// The text value, or `None` for file parts.
    #[must_use]
    pub fn as_text(&self) -> Option<&str> {
        match &self.value {
            PartValue::Text(text) => Some(text),
            PartValue::File { .. } => None,
        }
    }
}

/// Accumulates parts in call order.
#[derive(Debug, Default)]
pub struct FormEncoder {
    parts: Vec<FormPart>,
}

impl FormEncoder {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// `f = v`
    pub fn scalar(&mut self, field: &str, value: impl Into<String>) -> &mut Self {
        self.push(FormPart::text(field, value))
    }

    /// `f[s] = v`
    pub fn object(&mut self, field: &str, sub: &str, value: impl Into<String>) -> &mut Self {
        self.push(FormPart::text(format!("{field}[{sub}]"), value))
    }

    /// `f[i][s] = v`
    pub fn indexed(
        &mut self,
        field: &str,
        index: usize,
        sub: &str,
        value: impl Into<String>,
    ) -> &mut Self {
        self.push(FormPart::text(format!("{field}[{index}][{sub}]"), value))
    }

    /// `f[] = v`
    pub fn list_item(&mut self, field: &str, value: impl Into<String>) -> &mut Self {
        self.push(FormPart::text(format!("{field}[]"), value))
    }

    /// `f[] = <file>` for binary images, `f[] = <url>` for hosted ones.
    pub fn image(&mut self, field: &str, image: &ImagePart) -> &mut Self {
        let key = format!("{field}[]");
        match image {
            ImagePart::File {
                file_name,
                content_type,
                bytes,
            } => self.push(FormPart {
                key,
                value: PartValue::File {
                    file_name: file_name.clone(),
                    content_type: content_type.clone(),
                    bytes: bytes.clone(),
                },
            }),
            ImagePart::Url(url) => self.push(FormPart::text(key, url.clone())),
        }
    }

    /// Flattens an arbitrary JSON value under `prefix`.
    ///
    /// Objects become `prefix[k]`, arrays of scalars `prefix[]`, other arrays
    /// `prefix[i]`. Booleans encode as `"1"`/`"0"`. Nulls and a keyless root
    /// scalar produce nothing. Object keys follow the map's own order.
    pub fn json(&mut self, prefix: &str, value: &Value) -> &mut Self {
        let mut stack = vec![(prefix.to_string(), value)];
        while let Some((key, value)) = stack.pop() {
            match value {
                Value::Null => {}
                Value::Bool(b) => {
                    if !key.is_empty() {
                        self.scalar(&key, if *b { "1" } else { "0" });
                    }
                }
                Value::Number(n) => {
                    if !key.is_empty() {
                        self.scalar(&key, n.to_string());
                    }
                }
                Value::String(s) => {
                    if !key.is_empty() {
                        self.scalar(&key, s.clone());
                    }
                }
                Value::Array(items) => {
                    let plain = items
                        .iter()
                        .all(|v| !matches!(v, Value::Array(_) | Value::Object(_)));
                    for (index, item) in items.iter().enumerate().rev() {
                        let child = if plain {
                            format!("{key}[]")
                        } else {
                            format!("{key}[{index}]")
                        };
                        stack.push((child, item));
                    }
                }
                Value::Object(map) => {
                    let children: Vec<_> = map
                        .iter()
                        .map(|(k, v)| {
                            let child = if key.is_empty() {
                                k.clone()
                            } else {
                                format!("{key}[{k}]")
                            };
                            (child, v)
                        })
                        .collect();
                    stack.extend(children.into_iter().rev());
                }
            }
        }
        self
    }

    pub fn push(&mut self, part: FormPart) -> &mut Self {
        self.parts.push(part);
        self
    }

    #[must_use]
    pub fn finish(self) -> Vec<FormPart> {
        self.parts
    }
}

const PRICE: &str = "product_price";

/// Encodes a validated product for the create/edit multipart request.
#[must_use]
pub fn encode(entry: &CatalogEntry) -> Vec<FormPart> {
    let mut enc = FormEncoder::new();

    enc.scalar("name", entry.name.as_str())
        .scalar("description", entry.description.as_str());
    if let Some(sku) = &entry.sku {
        enc.scalar("sku", sku.as_str());
    }
    enc.scalar("type", entry.product_type().as_str())
        .scalar("unit_id", entry.unit_id.as_str())
        .scalar("business_id", entry.business_id.to_string())
        .scalar(
            "manage_stock_status",
            if entry.manage_stock { "1" } else { "0" },
        );

    match &entry.pricing {
        Pricing::Single(price) => encode_single(&mut enc, entry, price),
        Pricing::Variable { rows, .. } => {
            for (i, row) in rows.iter().enumerate() {
                enc.indexed(PRICE, i, "price_exclusive_tax", row.price_exclusive_tax.as_str())
                    .indexed(PRICE, i, "price_inclusive_tax", row.price_inclusive_tax.as_str())
                    .indexed(PRICE, i, "profit_margin", row.profit_margin.as_str())
                    .indexed(PRICE, i, "selling_price", row.selling_price.as_str());
                if let Some(inc_tax) = &row.selling_price_inc_tax {
                    enc.indexed(PRICE, i, "selling_price_inc_tax", inc_tax.as_str());
                }
            }
        }
        Pricing::Combo => {}
    }

    enc.list_item("product_locations", entry.location_id.as_str());
    for image in &entry.images {
        enc.image("product_images", image);
    }
    enc.scalar("brand_id", entry.brand_id.as_str())
        .scalar("barcode_id", entry.barcode_id.as_str())
        .scalar("tax_id", entry.tax_id.as_str())
        .scalar("weight", entry.weight.as_str());

    if let Some(quantity) = &entry.quantity {
        enc.scalar(
            &format!("opening_stock[{}][quantity][0]", entry.location_id),
            quantity.as_str(),
        );
    }
    enc.scalar("category_id", entry.category_id.as_str());

    enc.finish()
}

fn encode_single(enc: &mut FormEncoder, entry: &CatalogEntry, price: &SinglePrice) {
    enc.object(PRICE, "tax_type", entry.tax_type.as_str())
        .indexed(PRICE, 0, "selling_price", price.selling_price.as_str())
        .indexed(PRICE, 0, "price_exclusive_tax", price.price_exclusive_tax.as_str())
        .indexed(PRICE, 0, "price_inclusive_tax", price.price_inclusive_tax.as_str())
        .indexed(PRICE, 0, "profit_margin", price.profit_margin.as_str());
    if let Some(inc_tax) = &price.selling_price_inc_tax {
        enc.indexed(PRICE, 0, "selling_price_inc_tax", inc_tax.as_str());
    }
    enc.object(PRICE, "business_id", entry.business_id.to_string());
}

/// Flattens any JSON value with the bracket rules. See [`FormEncoder::json`].
#[must_use]
pub fn flatten_json(prefix: &str, value: &Value) -> Vec<FormPart> {
    let mut enc = FormEncoder::new();
    enc.json(prefix, value);
    enc.finish()
}

/// Encodes a category tree as form fields (`sub_category[0][name]`, ...).
///
/// # Errors
///
/// Returns an error if the tree cannot be represented as JSON.
pub fn encode_category(node: &CategoryNode) -> Result<Vec<FormPart>, serde_json::Error> {
    let value = serde_json::to_value(node)?;
    Ok(flatten_json("", &value))
}

#[cfg(test)]
#[path = "encode_test.rs"]
mod tests;
