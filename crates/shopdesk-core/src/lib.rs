//! Catalog-entry engine for the shopdesk admin console: category trees,
//! mode-conditional product validation, the variation price matrix and the
//! bracket-indexed multipart encoder, plus the submission pipeline that ties
//! them to the backend.

pub mod app_config;
pub mod catalog;
pub mod category;
pub mod config;
pub mod context;
pub mod drafts;
pub mod encode;
pub mod error;
pub mod lenient;
pub mod matrix;
pub mod pipeline;
pub mod reference;
pub mod schema;

pub use app_config::{AppConfig, Environment};
pub use catalog::{
    CatalogEntry, ImagePart, NamedRef, PriceRow, Pricing, Product, ProductDraft, ProductImage,
    ProductType, SinglePrice, Variation, VariationTemplate,
};
pub use category::CategoryNode;
pub use config::{load_app_config, load_app_config_from_env, DEFAULT_API_BASE_URL};
pub use context::RequestContext;
pub use encode::{encode, encode_category, flatten_json, FormEncoder, FormPart, PartValue};
pub use error::{
    BoxError, ConfigError, FieldError, ReferenceDataError, SubmitError, TransportError, TreeError,
    ValidationErrors,
};
pub use pipeline::{
    settle_category, settle_product, Notice, Receipt, ReferenceData, SubmissionPipeline, Target,
    Transport, FAILURE_NOTICE,
};
pub use reference::{ReferenceSet, Selector};
pub use schema::validate_draft;
