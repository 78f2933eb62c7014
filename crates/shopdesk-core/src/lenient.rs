//! Deserializers for form fields that arrive as either text or numbers.
//!
//! The console keeps ids and prices as text, but hand-written drafts and
//! some API responses carry bare numbers (`unit_id: 1`, `"final_total": 9`).

use serde::{Deserialize, Deserializer};

#[derive(Deserialize)]
#[serde(untagged)]
enum Raw {
    Text(String),
    Number(serde_json::Number),
    Null,
}

impl Raw {
    fn into_text(self) -> Option<String> {
        match self {
            Raw::Text(s) => Some(s),
            Raw::Number(n) => Some(n.to_string()),
            Raw::Null => None,
        }
    }
}

/// Accepts a string or a number and keeps it as text; `null` becomes `""`.
///
/// # Errors
///
/// Fails for values that are neither text, numbers nor null.
pub fn text<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Raw::deserialize(deserializer)?
        .into_text()
        .unwrap_or_default())
}

/// Like [`text`], for optional fields; `null` stays `None`.
///
/// # Errors
///
/// Fails for values that are neither text, numbers nor null.
pub fn opt_text<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Raw::deserialize(deserializer)?.into_text())
}
