//! `reference` and `import` command handlers.

use std::path::Path;

use anyhow::{bail, Context};
use shopdesk_client::ConsoleClient;
use shopdesk_core::{AppConfig, ReferenceSet, Selector};

fn summarize<T>(name: &str, selector: &Selector<T>) -> String {
    match selector {
        Selector::Loaded(items) => format!("{name:<11} {}", items.len()),
        Selector::Unavailable => format!("{name:<11} unavailable"),
    }
}

/// Prints how many options each selector has, or the template entries of
/// one variation.
///
/// # Errors
///
/// Returns an error if the client cannot be built. Failed lists are shown as
/// unavailable rather than failing the command.
pub(crate) async fn run_reference(
    config: &AppConfig,
    variation: Option<i64>,
) -> anyhow::Result<()> {
    let client = ConsoleClient::new(config)?;
    let set = ReferenceSet::load(&client, &config.request_context()).await;

    if let Some(id) = variation {
        let templates = set.templates_for(id);
        if templates.is_empty() {
            bail!("variation {id} has no template entries (or variations are unavailable)");
        }
        for template in templates {
            println!("{}\t{}", template.id, template.name);
        }
        return Ok(());
    }

    for line in [
        summarize("variations", &set.variations),
        summarize("categories", &set.categories),
        summarize("units", &set.units),
        summarize("taxes", &set.taxes),
        summarize("brands", &set.brands),
        summarize("barcodes", &set.barcodes),
        summarize("locations", &set.locations),
    ] {
        println!("{line}");
    }
    Ok(())
}

pub(crate) fn is_spreadsheet(file: &Path) -> bool {
    file.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("xls") || e.eq_ignore_ascii_case("xlsx"))
}

/// Uploads a product spreadsheet.
///
/// # Errors
///
/// Returns an error if the file is not a spreadsheet, cannot be read, or the
/// upload fails.
pub(crate) async fn run_import(config: &AppConfig, file: &Path) -> anyhow::Result<()> {
    if !is_spreadsheet(file) {
        bail!("{} is not an .xls or .xlsx file", file.display());
    }
    let bytes = std::fs::read(file).with_context(|| format!("failed to read {}", file.display()))?;
    let file_name = file
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();

    let client = ConsoleClient::new(config)?;
    client
        .import_products(&config.request_context(), &file_name, bytes)
        .await
        .context("product import failed")?;
    println!("imported {file_name}");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use shopdesk_core::NamedRef;

    #[test]
    fn spreadsheet_extensions_are_case_insensitive() {
        assert!(is_spreadsheet(Path::new("products.XLSX")));
        assert!(is_spreadsheet(Path::new("legacy.xls")));
        assert!(!is_spreadsheet(Path::new("products.csv")));
        assert!(!is_spreadsheet(Path::new("products")));
    }

    #[test]
    fn summary_marks_unavailable_lists() {
        let loaded = Selector::Loaded(vec![NamedRef {
            id: 1,
            name: "Cup".to_owned(),
        }]);
        assert_eq!(summarize("units", &loaded), "units       1");
        assert_eq!(
            summarize::<NamedRef>("brands", &Selector::Unavailable),
            "brands      unavailable"
        );
    }
}
