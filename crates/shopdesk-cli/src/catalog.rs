//! Draft commands: `validate`, `encode` and `submit`.
//!
//! Drafts are YAML files using the form's field names. A draft without a
//! `business_id` is scoped to the configured business.

use std::path::Path;

use anyhow::{bail, Context};
use shopdesk_client::ConsoleClient;
use shopdesk_core::category::{self, CategoryNode};
use shopdesk_core::matrix::{self, MatrixUpdate};
use shopdesk_core::{
    drafts, encode, encode_category, settle_category, settle_product, validate_draft, AppConfig,
    FieldError, FormPart, Notice, PartValue, ProductDraft, ReferenceData, RequestContext,
    SubmissionPipeline, TreeError,
};

use crate::DraftKind;

pub(crate) fn load_product_draft(file: &Path, business_id: i64) -> anyhow::Result<ProductDraft> {
    let mut draft = drafts::load_product(file)
        .with_context(|| format!("failed to load product draft {}", file.display()))?;
    if draft.business_id == 0 {
        draft.business_id = business_id;
    }
    Ok(draft)
}

pub(crate) fn load_category_draft(file: &Path, business_id: i64) -> anyhow::Result<CategoryNode> {
    let mut tree = drafts::load_category(file)
        .with_context(|| format!("failed to load category draft {}", file.display()))?;
    fill_business_id(&mut tree, business_id);
    Ok(tree)
}

fn fill_business_id(root: &mut CategoryNode, business_id: i64) {
    let mut stack = vec![root];
    while let Some(node) = stack.pop() {
        if node.business_id == 0 {
            node.business_id = business_id;
        }
        stack.extend(node.children.iter_mut());
    }
}

fn print_field_errors(errors: &[FieldError]) {
    for error in errors {
        eprintln!("  {error}");
    }
}

/// Renders one part per line; file parts show their name and size only.
pub(crate) fn render_part(part: &FormPart) -> String {
    match &part.value {
        PartValue::Text(text) => format!("{}={text}", part.key),
        PartValue::File {
            file_name,
            content_type,
            bytes,
        } => format!(
            "{}=<{file_name} {content_type}, {} bytes>",
            part.key,
            bytes.len()
        ),
    }
}

/// Validates a draft file without contacting the API.
///
/// # Errors
///
/// Returns an error if the file cannot be loaded or the draft is invalid.
pub(crate) fn run_validate(file: &Path, kind: DraftKind, business_id: i64) -> anyhow::Result<()> {
    match kind {
        DraftKind::Product => {
            let draft = load_product_draft(file, business_id)?;
            match validate_draft(&draft) {
                Ok(entry) => {
                    println!("ok: {} product '{}'", entry.product_type(), entry.name);
                    Ok(())
                }
                Err(errors) => {
                    print_field_errors(errors.fields());
                    bail!("{errors}")
                }
            }
        }
        DraftKind::Category => {
            let tree = load_category_draft(file, business_id)?;
            check_category(&tree)?;
            println!(
                "ok: category '{}' ({} nodes, depth {})",
                tree.name,
                tree.node_count(),
                tree.depth()
            );
            Ok(())
        }
    }
}

fn check_category(tree: &CategoryNode) -> anyhow::Result<()> {
    match category::validate(tree) {
        Ok(()) => Ok(()),
        Err(TreeError::Invalid(errors)) => {
            print_field_errors(errors.fields());
            bail!("{errors}")
        }
        Err(e) => Err(e.into()),
    }
}

/// Price rows only exist on product drafts.
fn check_sync_rows(kind: DraftKind, sync_rows: bool) -> anyhow::Result<()> {
    if sync_rows && kind == DraftKind::Category {
        bail!("--sync-rows only applies to product drafts");
    }
    Ok(())
}

/// Adds a price row for every template entry of the draft's variation.
async fn sync_price_rows<R: ReferenceData>(
    source: &R,
    ctx: &RequestContext,
    draft: &mut ProductDraft,
) -> anyhow::Result<()> {
    let Some(variation_id) = draft.selected_variation() else {
        bail!("--sync-rows needs a numeric variation_id in the draft");
    };
    let variations = source.list_variations(ctx).await?;
    if let MatrixUpdate::Applied { appended } =
        matrix::apply_from_variations(draft, variation_id, &variations)
    {
        tracing::info!(variation_id, appended, rows = draft.price_rows.len(), "price rows synced");
    }
    Ok(())
}

/// Prints the multipart fields a draft encodes to.
///
/// # Errors
///
/// Returns an error if the draft cannot be loaded or is invalid, or if
/// syncing rows fails.
pub(crate) async fn run_encode(
    config: &AppConfig,
    file: &Path,
    kind: DraftKind,
    sync_rows: bool,
) -> anyhow::Result<()> {
    check_sync_rows(kind, sync_rows)?;
    let parts = match kind {
        DraftKind::Product => {
            let mut draft = load_product_draft(file, config.business_id)?;
            if sync_rows {
                let client = ConsoleClient::new(config)?;
                sync_price_rows(&client, &config.request_context(), &mut draft).await?;
            }
            let entry = validate_draft(&draft).map_err(|errors| {
                print_field_errors(errors.fields());
                anyhow::Error::new(errors)
            })?;
            encode(&entry)
        }
        DraftKind::Category => {
            let tree = load_category_draft(file, config.business_id)?;
            check_category(&tree)?;
            encode_category(&tree)?
        }
    };

    for part in &parts {
        println!("{}", render_part(part));
    }
    Ok(())
}

/// Validates, encodes and sends a draft.
///
/// # Errors
///
/// Returns an error if the draft is invalid or the API rejects it. Failed
/// submissions can be retried by running the command again.
pub(crate) async fn run_submit(
    config: &AppConfig,
    file: &Path,
    kind: DraftKind,
    sync_rows: bool,
    dry_run: bool,
) -> anyhow::Result<()> {
    check_sync_rows(kind, sync_rows)?;
    let client = ConsoleClient::new(config)?;
    let ctx = config.request_context();

    let notice = match kind {
        DraftKind::Product => {
            let mut draft = load_product_draft(file, config.business_id)?;
            if sync_rows {
                sync_price_rows(&client, &ctx, &mut draft).await?;
            }
            if dry_run {
                let entry = validate_draft(&draft)?;
                println!("dry run: {} fields would be sent", encode(&entry).len());
                return Ok(());
            }
            let pipeline = SubmissionPipeline::new(client);
            let outcome = pipeline.submit_product(&ctx, &draft).await;
            if let Err(e) = &outcome {
                tracing::debug!(error = %e, "product submission did not complete");
            }
            settle_product(&mut draft, &outcome)
        }
        DraftKind::Category => {
            let mut tree = load_category_draft(file, config.business_id)?;
            if dry_run {
                check_category(&tree)?;
                println!("dry run: {} categories would be sent", tree.node_count());
                return Ok(());
            }
            let pipeline = SubmissionPipeline::new(client);
            let outcome = pipeline.submit_category(&ctx, &tree).await;
            settle_category(&mut tree, &outcome)
        }
    };

    report(notice)
}

fn report(notice: Notice) -> anyhow::Result<()> {
    match notice {
        Notice::Saved { id: Some(id) } => {
            println!("saved (id {id})");
            Ok(())
        }
        Notice::Saved { id: None } => {
            println!("saved");
            Ok(())
        }
        Notice::Invalid(fields) => {
            print_field_errors(&fields);
            bail!("{} field(s) failed validation", fields.len())
        }
        Notice::Busy => bail!("a submission is already in flight"),
        Notice::Failed(message) => bail!(message),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn render_part_hides_file_bytes() {
        let text = FormPart::text("product_price[0][selling_price]", "400");
        assert_eq!(render_part(&text), "product_price[0][selling_price]=400");

        let file = FormPart {
            key: "product_images[]".to_owned(),
            value: PartValue::File {
                file_name: "front.png".to_owned(),
                content_type: "image/png".to_owned(),
                bytes: vec![0; 12],
            },
        };
        assert_eq!(
            render_part(&file),
            "product_images[]=<front.png image/png, 12 bytes>"
        );
    }

    #[test]
    fn fill_business_id_reaches_every_unscoped_node() {
        let mut tree = CategoryNode::new_root(0);
        tree.children[0].business_id = 5;
        category::append_at(&mut tree, &[]);
        fill_business_id(&mut tree, 9);

        assert_eq!(tree.business_id, 9);
        assert_eq!(tree.children[0].business_id, 5);
        assert_eq!(tree.children[1].business_id, 9);
    }

    #[test]
    fn sync_rows_is_rejected_for_category_drafts() {
        let err = check_sync_rows(DraftKind::Category, true).unwrap_err();
        assert!(err.to_string().contains("--sync-rows"));
        assert!(check_sync_rows(DraftKind::Category, false).is_ok());
        assert!(check_sync_rows(DraftKind::Product, true).is_ok());
    }

    #[test]
    fn report_fails_on_generic_notice() {
        let err = report(Notice::Failed("Something went wrong.".to_owned())).unwrap_err();
        assert_eq!(err.to_string(), "Something went wrong.");
        assert!(report(Notice::Saved { id: Some(1) }).is_ok());
    }
}
