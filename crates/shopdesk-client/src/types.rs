//! Console API response and request types not owned by the catalog engine.
//!
//! List endpoints wrap their rows in `{ "data": [...] }`; [`ListEnvelope`]
//! captures that.

use serde::{Deserialize, Deserializer, Serialize};
use shopdesk_core::{
    lenient, CategoryNode, FieldError, NamedRef, Product, ValidationErrors, Variation,
};

#[derive(Debug, Deserialize)]
#[serde(bound(deserialize = "T: Deserialize<'de>"))]
pub struct ListEnvelope<T> {
    #[serde(default = "Vec::new", deserialize_with = "null_as_empty")]
    pub data: Vec<T>,
}

fn null_as_empty<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Ok(Option::<Vec<T>>::deserialize(deserializer)?.unwrap_or_default())
}

/// A staff role.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Role {
    pub id: i64,
    pub name: String,
    #[serde(rename = "bussines_id", alias = "business_id", default)]
    pub business_id: i64,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub updated_at: Option<String>,
}

/// Body of a role create/update request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RoleDraft {
    pub name: String,
    /// The backend spells this field `bussines_id`.
    #[serde(rename = "bussines_id")]
    pub business_id: i64,
}

impl RoleDraft {
    /// # Errors
    ///
    /// Returns [`ValidationErrors`] when the name is blank.
    pub fn validate(&self) -> Result<(), ValidationErrors> {
        if self.name.trim().is_empty() {
            return Err(ValidationErrors(vec![FieldError::new(
                "name",
                "Name is required.",
            )]));
        }
        Ok(())
    }
}

/// A storefront customer as listed by `/customers`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Customer {
    pub id: i64,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
}

/// Body of a customer register/update request.
#[derive(Clone, PartialEq, Eq, Serialize)]
pub struct CustomerDraft {
    pub name: String,
    pub email: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    /// Required when registering; omitted on update to keep the current one.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
    pub business_id: i64,
}

impl std::fmt::Debug for CustomerDraft {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CustomerDraft")
            .field("name", &self.name)
            .field("email", &self.email)
            .field("phone", &self.phone)
            .field("password", &self.password.as_ref().map(|_| "[redacted]"))
            .field("business_id", &self.business_id)
            .finish()
    }
}

impl CustomerDraft {
    /// Checks the fields a register request needs; `registering` also
    /// requires a password.
    ///
    /// # Errors
    ///
    /// Returns every missing field as one [`ValidationErrors`].
    pub fn validate(&self, registering: bool) -> Result<(), ValidationErrors> {
        let mut errors = Vec::new();
        if self.name.trim().is_empty() {
            errors.push(FieldError::new("name", "Name is required."));
        }
        if self.email.trim().is_empty() {
            errors.push(FieldError::new("email", "Email is required."));
        } else if !self.email.contains('@') {
            errors.push(FieldError::new("email", "Email is invalid."));
        }
        if registering && self.password.as_deref().is_none_or(|p| p.is_empty()) {
            errors.push(FieldError::new("password", "Password is required."));
        }
        if errors.is_empty() {
            Ok(())
        } else {
            Err(ValidationErrors(errors))
        }
    }
}

/// An order row as listed by `/orders`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Order {
    pub id: i64,
    #[serde(default)]
    pub order_no: String,
    #[serde(default, deserialize_with = "lenient::text")]
    pub final_total: String,
    #[serde(default, deserialize_with = "lenient::text")]
    pub order_type: String,
    #[serde(default)]
    pub order_status: String,
    #[serde(default)]
    pub payment_status: String,
}

/// Rows that list endpoints return newest-first.
pub(crate) trait Keyed {
    fn key(&self) -> i64;
}

macro_rules! keyed {
    ($($ty:ty),* $(,)?) => {
        $(impl Keyed for $ty {
            fn key(&self) -> i64 {
                self.id
            }
        })*
    };
}

keyed!(Variation, CategoryNode, NamedRef, Product, Role, Customer, Order);
