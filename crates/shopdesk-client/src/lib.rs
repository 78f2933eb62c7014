//! reqwest-backed implementation of the console API collaborators.

pub mod client;
pub mod error;
pub(crate) mod retry;
pub mod types;

pub use client::ConsoleClient;
pub use error::ClientError;
pub use types::{Customer, CustomerDraft, Order, Role, RoleDraft};
