//! HTTP client for the console REST API.
//!
//! Every request carries `Accept: application/json` and, when the
//! [`RequestContext`] holds one, a bearer token. List endpoints are scoped by
//! `business_id`, fetched with `per_page=-1` and returned newest-first.

use std::time::Duration;

use reqwest::multipart::{Form, Part};
use reqwest::{Client, RequestBuilder, Url};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use shopdesk_core::{
    AppConfig, CategoryNode, FormPart, NamedRef, PartValue, Product, Receipt, ReferenceData,
    ReferenceDataError, RequestContext, Target, Transport, TransportError, Variation,
};

use crate::error::ClientError;
use crate::retry::retry_with_backoff;
use crate::types::{Customer, CustomerDraft, Keyed, ListEnvelope, Order, Role, RoleDraft};

const DEFAULT_USER_AGENT: &str = "shopdesk/0.1";
const FETCH_ALL: &str = "-1";

/// Client for the console REST API.
///
/// Use [`ConsoleClient::new`] with the loaded configuration or
/// [`ConsoleClient::with_base_url`] to point at a mock server in tests.
#[derive(Debug, Clone)]
pub struct ConsoleClient {
    client: Client,
    base_url: Url,
    max_retries: u32,
    backoff_base_ms: u64,
}

impl ConsoleClient {
    /// Creates a client from application configuration.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::Http`] if the `reqwest::Client` cannot be built
    /// or [`ClientError::InvalidBaseUrl`] if the configured URL does not parse.
    pub fn new(config: &AppConfig) -> Result<Self, ClientError> {
        Self::build(
            &config.api_base_url,
            config.request_timeout_secs,
            &config.user_agent,
        )
        .map(|c| c.with_retry(config.max_retries, config.retry_backoff_base_ms))
    }

    /// Creates a client against `base_url` with default retry settings.
    ///
    /// # Errors
    ///
    /// Same as [`ConsoleClient::new`].
    pub fn with_base_url(base_url: &str, timeout_secs: u64) -> Result<Self, ClientError> {
        Self::build(base_url, timeout_secs, DEFAULT_USER_AGENT)
    }

    fn build(base_url: &str, timeout_secs: u64, user_agent: &str) -> Result<Self, ClientError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .user_agent(user_agent)
            .build()?;

        // A trailing slash makes `Url::join` append to the API prefix rather
        // than replace its last segment.
        let normalised = format!("{}/", base_url.trim_end_matches('/'));
        let base_url =
            Url::parse(&normalised).map_err(|_| ClientError::InvalidBaseUrl(base_url.to_owned()))?;

        Ok(Self {
            client,
            base_url,
            max_retries: 3,
            backoff_base_ms: 500,
        })
    }

    #[must_use]
    pub fn with_retry(mut self, max_retries: u32, backoff_base_ms: u64) -> Self {
        self.max_retries = max_retries;
        self.backoff_base_ms = backoff_base_ms;
        self
    }

    fn build_url(&self, path: &str, query: &[(&str, &str)]) -> Result<Url, ClientError> {
        let mut url = self
            .base_url
            .join(path.trim_start_matches('/'))
            .map_err(|_| ClientError::InvalidBaseUrl(format!("{}{path}", self.base_url)))?;
        if !query.is_empty() {
            let mut pairs = url.query_pairs_mut();
            for (k, v) in query {
                pairs.append_pair(k, v);
            }
        }
        Ok(url)
    }

    fn authorize(builder: RequestBuilder, ctx: &RequestContext) -> RequestBuilder {
        let builder = builder.header(reqwest::header::ACCEPT, "application/json");
        match &ctx.auth_token {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        }
    }

    /// Sends a request, asserts a 2xx status and parses the body as JSON.
    ///
    /// An empty body parses as `null`. A body with `"success": false` is an
    /// [`ClientError::Api`] even on 2xx.
    async fn send_json(&self, request: RequestBuilder, url: &Url) -> Result<Value, ClientError> {
        let response = request.send().await?;
        let status = response.status();
        let body = response.text().await?;
        if !status.is_success() {
            return Err(ClientError::UnexpectedStatus {
                status: status.as_u16(),
                url: url.to_string(),
                body,
            });
        }
        if body.trim().is_empty() {
            return Ok(Value::Null);
        }
        let value: Value = serde_json::from_str(&body).map_err(|e| ClientError::Deserialize {
            context: url.to_string(),
            source: e,
        })?;
        check_api_error(&value)?;
        Ok(value)
    }

    async fn get_json(&self, ctx: &RequestContext, url: &Url) -> Result<Value, ClientError> {
        retry_with_backoff(self.max_retries, self.backoff_base_ms, || {
            let request = Self::authorize(self.client.get(url.clone()), ctx);
            self.send_json(request, url)
        })
        .await
    }

    /// Fetches every row of a business-scoped list, newest first.
    async fn list<T>(
        &self,
        ctx: &RequestContext,
        path: &str,
        extra: &[(&str, &str)],
    ) -> Result<Vec<T>, ClientError>
    where
        T: DeserializeOwned + Keyed,
    {
        let business_id = ctx.business_id.to_string();
        let mut query = vec![("business_id", business_id.as_str()), ("per_page", FETCH_ALL)];
        query.extend_from_slice(extra);
        let url = self.build_url(path, &query)?;

        let body = self.get_json(ctx, &url).await?;
        let envelope: ListEnvelope<T> =
            serde_json::from_value(body).map_err(|e| ClientError::Deserialize {
                context: format!("GET {path}"),
                source: e,
            })?;

        let mut rows = envelope.data;
        rows.sort_by_key(|row| std::cmp::Reverse(row.key()));
        tracing::debug!(path, rows = rows.len(), "list fetched");
        Ok(rows)
    }

    async fn post_form(
        &self,
        ctx: &RequestContext,
        path: &str,
        form: Form,
    ) -> Result<Receipt, ClientError> {
        let url = self.build_url(path, &[])?;
        let request = Self::authorize(self.client.post(url.clone()), ctx).multipart(form);
        let body = self.send_json(request, &url).await?;
        Ok(receipt_from(&body))
    }

    async fn post_json<B: Serialize + ?Sized>(
        &self,
        ctx: &RequestContext,
        path: &str,
        body: &B,
    ) -> Result<Receipt, ClientError> {
        let url = self.build_url(path, &[])?;
        let request = Self::authorize(self.client.post(url.clone()), ctx).json(body);
        let body = self.send_json(request, &url).await?;
        Ok(receipt_from(&body))
    }

    /// Sends encoded product parts to `/products/create` or
    /// `/products/edit/{id}` as one multipart request.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError`] on network failure, a non-2xx status, or an
    /// API-level failure body.
    pub async fn save_product(
        &self,
        ctx: &RequestContext,
        target: Target,
        parts: Vec<FormPart>,
    ) -> Result<Receipt, ClientError> {
        let path = match target {
            Target::Create => "products/create".to_owned(),
            Target::Update(id) => format!("products/edit/{id}"),
        };
        let form = to_form(parts)?;
        self.post_form(ctx, &path, form).await
    }

    /// Sends a category tree as JSON to `/category/create` or
    /// `/category/update/{id}`.
    ///
    /// # Errors
    ///
    /// See [`ConsoleClient::save_product`].
    pub async fn save_category(
        &self,
        ctx: &RequestContext,
        target: Target,
        node: &CategoryNode,
    ) -> Result<Receipt, ClientError> {
        let path = match target {
            Target::Create => "category/create".to_owned(),
            Target::Update(id) => format!("category/update/{id}"),
        };
        self.post_json(ctx, &path, node).await
    }

    /// # Errors
    ///
    /// See [`ConsoleClient::save_product`].
    pub async fn delete_product(&self, ctx: &RequestContext, id: i64) -> Result<(), ClientError> {
        let url = self.build_url(&format!("products/delete/{id}"), &[])?;
        let request = Self::authorize(self.client.post(url.clone()), ctx);
        self.send_json(request, &url).await.map(|_| ())
    }

    /// Uploads a spreadsheet of products to `/import` as a single `file` part.
    ///
    /// # Errors
    ///
    /// See [`ConsoleClient::save_product`].
    pub async fn import_products(
        &self,
        ctx: &RequestContext,
        file_name: &str,
        bytes: Vec<u8>,
    ) -> Result<Receipt, ClientError> {
        let part = Part::bytes(bytes).file_name(file_name.to_owned());
        self.post_form(ctx, "import", Form::new().part("file", part))
            .await
    }

    /// # Errors
    ///
    /// Returns [`ClientError`] on network, status or decoding failure.
    pub async fn list_products(&self, ctx: &RequestContext) -> Result<Vec<Product>, ClientError> {
        self.list(ctx, "products", &[]).await
    }

    /// # Errors
    ///
    /// Returns [`ClientError`] on network, status or decoding failure.
    pub async fn list_roles(&self, ctx: &RequestContext) -> Result<Vec<Role>, ClientError> {
        self.list(ctx, "role", &[]).await
    }

    /// Creates or renames a role.
    ///
    /// # Errors
    ///
    /// See [`ConsoleClient::save_product`].
    pub async fn save_role(
        &self,
        ctx: &RequestContext,
        target: Target,
        role: &RoleDraft,
    ) -> Result<Receipt, ClientError> {
        match target {
            Target::Create => self.post_json(ctx, "role/create", role).await,
            Target::Update(id) => {
                let body = WithId { id, body: role };
                self.post_json(ctx, &format!("role/update/{id}"), &body)
                    .await
            }
        }
    }

    /// # Errors
    ///
    /// Returns [`ClientError`] on network, status or decoding failure.
    pub async fn list_customers(&self, ctx: &RequestContext) -> Result<Vec<Customer>, ClientError> {
        self.list(ctx, "customers", &[]).await
    }

    /// Registers a customer at `/customer/register` or updates one at
    /// `/customer/update/{id}`.
    ///
    /// # Errors
    ///
    /// See [`ConsoleClient::save_product`].
    pub async fn save_customer(
        &self,
        ctx: &RequestContext,
        target: Target,
        customer: &CustomerDraft,
    ) -> Result<Receipt, ClientError> {
        match target {
            Target::Create => self.post_json(ctx, "customer/register", customer).await,
            Target::Update(id) => {
                let body = WithId { id, body: customer };
                self.post_json(ctx, &format!("customer/update/{id}"), &body)
                    .await
            }
        }
    }

    /// Lists orders, optionally for one customer.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError`] on network, status or decoding failure.
    pub async fn list_orders(
        &self,
        ctx: &RequestContext,
        customer_id: Option<i64>,
    ) -> Result<Vec<Order>, ClientError> {
        match customer_id {
            Some(id) => {
                let id = id.to_string();
                self.list(ctx, "orders", &[("customer_id", id.as_str())])
                    .await
            }
            None => self.list(ctx, "orders", &[]).await,
        }
    }
}

/// Update bodies repeat the record id next to the edited fields.
#[derive(Serialize)]
struct WithId<'a, B: Serialize> {
    id: i64,
    #[serde(flatten)]
    body: &'a B,
}

/// Converts encoded parts into a reqwest multipart form, preserving order.
fn to_form(parts: Vec<FormPart>) -> Result<Form, ClientError> {
    parts.into_iter().try_fold(Form::new(), |form, part| -> Result<Form, ClientError> {
        Ok(match part.value {
            PartValue::Text(text) => form.text(part.key, text),
            PartValue::File {
                file_name,
                content_type,
                bytes,
            } => {
                let file = Part::bytes(bytes)
                    .file_name(file_name)
                    .mime_str(&content_type)?;
                form.part(part.key, file)
            }
        })
    })
}

fn check_api_error(body: &Value) -> Result<(), ClientError> {
    if body.get("success").and_then(Value::as_bool) == Some(false) {
        let msg = body
            .get("message")
            .and_then(Value::as_str)
            .unwrap_or("request was not successful")
            .to_owned();
        return Err(ClientError::Api(msg));
    }
    Ok(())
}

/// Picks the saved record's id from `data.id` or a top-level `id`.
fn receipt_from(body: &Value) -> Receipt {
    let id = body
        .get("data")
        .and_then(|d| d.get("id"))
        .or_else(|| body.get("id"))
        .and_then(Value::as_i64);
    Receipt { id }
}

impl From<ClientError> for TransportError {
    fn from(err: ClientError) -> Self {
        TransportError::new(err)
    }
}

impl ReferenceData for ConsoleClient {
    async fn list_variations(
        &self,
        ctx: &RequestContext,
    ) -> Result<Vec<Variation>, ReferenceDataError> {
        self.list(ctx, "variations", &[])
            .await
            .map_err(|e| ReferenceDataError::new("variations", e))
    }

    async fn list_categories(
        &self,
        ctx: &RequestContext,
    ) -> Result<Vec<CategoryNode>, ReferenceDataError> {
        self.list(ctx, "categories", &[])
            .await
            .map_err(|e| ReferenceDataError::new("categories", e))
    }

    async fn list_units(&self, ctx: &RequestContext) -> Result<Vec<NamedRef>, ReferenceDataError> {
        self.list(ctx, "units", &[])
            .await
            .map_err(|e| ReferenceDataError::new("units", e))
    }

    async fn list_taxes(&self, ctx: &RequestContext) -> Result<Vec<NamedRef>, ReferenceDataError> {
        self.list(ctx, "taxrates", &[])
            .await
            .map_err(|e| ReferenceDataError::new("taxes", e))
    }

    async fn list_brands(&self, ctx: &RequestContext) -> Result<Vec<NamedRef>, ReferenceDataError> {
        self.list(ctx, "brands", &[])
            .await
            .map_err(|e| ReferenceDataError::new("brands", e))
    }

    async fn list_barcodes(
        &self,
        ctx: &RequestContext,
    ) -> Result<Vec<NamedRef>, ReferenceDataError> {
        self.list(ctx, "barcodes", &[])
            .await
            .map_err(|e| ReferenceDataError::new("barcodes", e))
    }

    async fn list_locations(
        &self,
        ctx: &RequestContext,
    ) -> Result<Vec<NamedRef>, ReferenceDataError> {
        self.list(ctx, "locations", &[])
            .await
            .map_err(|e| ReferenceDataError::new("locations", e))
    }
}

impl Transport for ConsoleClient {
    async fn send_product(
        &self,
        ctx: &RequestContext,
        target: Target,
        parts: Vec<FormPart>,
    ) -> Result<Receipt, TransportError> {
        Ok(self.save_product(ctx, target, parts).await?)
    }

    async fn send_category(
        &self,
        ctx: &RequestContext,
        target: Target,
        node: &CategoryNode,
    ) -> Result<Receipt, TransportError> {
        Ok(self.save_category(ctx, target, node).await?)
    }
}

#[cfg(test)]
#[path = "client_test.rs"]
mod tests;
