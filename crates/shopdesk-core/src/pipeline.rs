//! Submission pipeline and the collaborators it talks to.
//!
//! `validate -> encode -> transport`, with at most one request in flight per
//! pipeline. A second submit while the first is pending returns
//! [`SubmitError::InFlight`] and never reaches the transport.

use std::future::Future;
use std::sync::atomic::{AtomicBool, Ordering};

use crate::catalog::{NamedRef, ProductDraft, Variation};
use crate::category::{self, CategoryNode};
use crate::context::RequestContext;
use crate::encode::{encode, FormPart};
use crate::error::{ReferenceDataError, SubmitError, TransportError, TreeError};
use crate::schema::validate_draft;

/// Generic notice shown when the transport fails.
pub const FAILURE_NOTICE: &str = "Something went wrong.";

/// Read-only catalog lists used to populate the form's selectors.
///
/// Every call fetches the complete list for `ctx.business_id`.
pub trait ReferenceData: Send + Sync {
    fn list_variations(
        &self,
        ctx: &RequestContext,
    ) -> impl Future<Output = Result<Vec<Variation>, ReferenceDataError>> + Send;

    fn list_categories(
        &self,
        ctx: &RequestContext,
    ) -> impl Future<Output = Result<Vec<CategoryNode>, ReferenceDataError>> + Send;

    fn list_units(
        &self,
        ctx: &RequestContext,
    ) -> impl Future<Output = Result<Vec<NamedRef>, ReferenceDataError>> + Send;

    fn list_taxes(
        &self,
        ctx: &RequestContext,
    ) -> impl Future<Output = Result<Vec<NamedRef>, ReferenceDataError>> + Send;

    fn list_brands(
        &self,
        ctx: &RequestContext,
    ) -> impl Future<Output = Result<Vec<NamedRef>, ReferenceDataError>> + Send;

    fn list_barcodes(
        &self,
        ctx: &RequestContext,
    ) -> impl Future<Output = Result<Vec<NamedRef>, ReferenceDataError>> + Send;

    fn list_locations(
        &self,
        ctx: &RequestContext,
    ) -> impl Future<Output = Result<Vec<NamedRef>, ReferenceDataError>> + Send;
}

/// Whether a submission creates a new record or replaces an existing one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Target {
    Create,
    Update(i64),
}

impl Target {
    fn for_id(id: Option<i64>) -> Self {
        id.filter(|&id| id != 0).map_or(Target::Create, Target::Update)
    }
}

/// Server acknowledgement. `id` is the stable identifier when the server
/// returns one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Receipt {
    pub id: Option<i64>,
}

/// Sends encoded submissions to the backend.
pub trait Transport: Send + Sync {
    /// Sends one product as a single multipart request.
    fn send_product(
        &self,
        ctx: &RequestContext,
        target: Target,
        parts: Vec<FormPart>,
    ) -> impl Future<Output = Result<Receipt, TransportError>> + Send;

    /// Sends a category tree.
    fn send_category(
        &self,
        ctx: &RequestContext,
        target: Target,
        node: &CategoryNode,
    ) -> impl Future<Output = Result<Receipt, TransportError>> + Send;
}

/// Releases the in-flight flag when the submission finishes or is dropped.
struct FlightGuard<'a>(&'a AtomicBool);

impl Drop for FlightGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

/// Drives submissions for one form instance.
#[derive(Debug)]
pub struct SubmissionPipeline<T> {
    transport: T,
    in_flight: AtomicBool,
}

impl<T: Transport> SubmissionPipeline<T> {
    pub fn new(transport: T) -> Self {
        Self {
            transport,
            in_flight: AtomicBool::new(false),
        }
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    #[must_use]
    pub fn is_in_flight(&self) -> bool {
        self.in_flight.load(Ordering::Acquire)
    }

    fn acquire(&self) -> Result<FlightGuard<'_>, SubmitError> {
        self.in_flight
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .map(|_| FlightGuard(&self.in_flight))
            .map_err(|_| SubmitError::InFlight)
    }

    /// Validates, encodes and sends a product draft.
    ///
    /// # Errors
    ///
    /// - [`SubmitError::InFlight`] if another submission is pending.
    /// - [`SubmitError::Invalid`] with every violated field; nothing is sent.
    /// - [`SubmitError::Transport`] if the request failed.
    pub async fn submit_product(
        &self,
        ctx: &RequestContext,
        draft: &ProductDraft,
    ) -> Result<Receipt, SubmitError> {
        let _guard = self.acquire()?;

        let entry = validate_draft(draft)?;
        let target = Target::for_id(entry.id);
        let parts = encode(&entry);
        tracing::debug!(
            product_type = %entry.product_type(),
            ?target,
            parts = parts.len(),
            "sending product"
        );

        match self.transport.send_product(ctx, target, parts).await {
            Ok(receipt) => {
                tracing::info!(id = ?receipt.id, name = %entry.name, "product saved");
                Ok(receipt)
            }
            Err(e) => {
                tracing::warn!(error = %e, name = %entry.name, "product submission failed");
                Err(e.into())
            }
        }
    }

    /// Validates and sends a category tree.
    ///
    /// # Errors
    ///
    /// - [`SubmitError::InFlight`] if another submission is pending.
    /// - [`SubmitError::InvalidTree`] if a name is blank or an id repeats
    ///   along a path.
    /// - [`SubmitError::Transport`] if the request failed.
    pub async fn submit_category(
        &self,
        ctx: &RequestContext,
        node: &CategoryNode,
    ) -> Result<Receipt, SubmitError> {
        let _guard = self.acquire()?;

        category::validate(node)?;
        let target = Target::for_id(Some(node.id));
        tracing::debug!(?target, nodes = node.node_count(), "sending category");

        match self.transport.send_category(ctx, target, node).await {
            Ok(receipt) => {
                tracing::info!(id = ?receipt.id, name = %node.name, "category saved");
                Ok(receipt)
            }
            Err(e) => {
                tracing::warn!(error = %e, name = %node.name, "category submission failed");
                Err(e.into())
            }
        }
    }
}

/// What the form shows after a submission attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notice {
    Saved { id: Option<i64> },
    /// Field-scoped messages; the form stays populated.
    Invalid(Vec<crate::error::FieldError>),
    /// A submission was already pending; nothing happened.
    Busy,
    /// Generic failure; the form stays populated for retry.
    Failed(String),
}

/// Applies a submission outcome to the form state.
///
/// On success `state` is replaced by `fresh(&state)`; on any failure it is
/// left untouched so the user can retry.
pub fn settle<S>(
    state: &mut S,
    fresh: impl FnOnce(&S) -> S,
    outcome: &Result<Receipt, SubmitError>,
) -> Notice {
    match outcome {
        Ok(receipt) => {
            *state = fresh(state);
            Notice::Saved { id: receipt.id }
        }
        Err(
            SubmitError::Invalid(errors) | SubmitError::InvalidTree(TreeError::Invalid(errors)),
        ) => Notice::Invalid(errors.fields().to_vec()),
        Err(SubmitError::InvalidTree(e @ TreeError::Cycle { .. })) => Notice::Failed(e.to_string()),
        Err(SubmitError::InFlight) => Notice::Busy,
        Err(SubmitError::Transport(_)) => Notice::Failed(FAILURE_NOTICE.to_string()),
    }
}

/// [`settle`] for product drafts: success resets to an empty draft for the
/// same business.
pub fn settle_product(draft: &mut ProductDraft, outcome: &Result<Receipt, SubmitError>) -> Notice {
    settle(draft, |d| ProductDraft::new(d.business_id), outcome)
}

/// [`settle`] for category trees: success resets to the default form tree.
pub fn settle_category(node: &mut CategoryNode, outcome: &Result<Receipt, SubmitError>) -> Notice {
    settle(node, |n| CategoryNode::new_root(n.business_id), outcome)
}
