//! Product and category drafts stored as YAML files.
//!
//! A product file uses the form's field names plus an `images` list whose
//! entries are either `path:` (read from disk, relative to the YAML file) or
//! `url:` (already hosted):
//!
//! ```yaml
//! name: Flat White
//! type: single
//! unit_id: 1
//! selling_price: 400
//! images:
//!   - path: images/front.png
//!   - url: https://cdn.example/back.png
//! ```

use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::catalog::{ImagePart, ProductDraft};
use crate::category::CategoryNode;
use crate::error::ConfigError;

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum ImageSource {
    Path {
        path: PathBuf,
        #[serde(default)]
        content_type: Option<String>,
    },
    Url {
        url: String,
    },
}

#[derive(Debug, Deserialize)]
struct ProductFile {
    #[serde(default)]
    images: Vec<ImageSource>,
    #[serde(flatten)]
    draft: ProductDraft,
}

/// Loads a product draft, reading any referenced image files.
///
/// # Errors
///
/// Returns `ConfigError` if the file or an image cannot be read, or the YAML
/// does not parse.
pub fn load_product(path: &Path) -> Result<ProductDraft, ConfigError> {
    let file: ProductFile = read_yaml(path)?;
    let base = path.parent().unwrap_or_else(|| Path::new("."));

    let mut draft = file.draft;
    draft.images = file
        .images
        .into_iter()
        .map(|source| resolve_image(base, source))
        .collect::<Result<_, _>>()?;
    Ok(draft)
}

/// Loads a category tree.
///
/// # Errors
///
/// Returns `ConfigError` if the file cannot be read or parsed.
pub fn load_category(path: &Path) -> Result<CategoryNode, ConfigError> {
    read_yaml(path)
}

fn read_yaml<T: serde::de::DeserializeOwned>(path: &Path) -> Result<T, ConfigError> {
    let content = std::fs::read_to_string(path).map_err(|e| ConfigError::FileIo {
        path: path.display().to_string(),
        source: e,
    })?;
    serde_yaml::from_str(&content).map_err(|e| ConfigError::FileParse {
        path: path.display().to_string(),
        source: e,
    })
}

fn resolve_image(base: &Path, source: ImageSource) -> Result<ImagePart, ConfigError> {
    match source {
        ImageSource::Url { url } => Ok(ImagePart::Url(url)),
        ImageSource::Path { path, content_type } => {
            let full = if path.is_absolute() {
                path
            } else {
                base.join(path)
            };
            let bytes = std::fs::read(&full).map_err(|e| ConfigError::FileIo {
                path: full.display().to_string(),
                source: e,
            })?;
            let file_name = full
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_default();
            let content_type =
                content_type.unwrap_or_else(|| guess_content_type(&full).to_string());
            Ok(ImagePart::File {
                file_name,
                content_type,
                bytes,
            })
        }
    }
}

fn guess_content_type(path: &Path) -> &'static str {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase);
    match ext.as_deref() {
        Some("png") => "image/png",
        Some("jpg" | "jpeg") => "image/jpeg",
        Some("gif") => "image/gif",
        Some("webp") => "image/webp",
        Some("svg") => "image/svg+xml",
        _ => "application/octet-stream",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scratch_dir(name: &str) -> PathBuf {
        let dir = std::env::temp_dir()
            .join(format!("shopdesk-drafts-{name}-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        dir
    }

    #[test]
    fn product_file_reads_fields_and_images() {
        let dir = scratch_dir("product");
        std::fs::write(dir.join("front.PNG"), [0x89, b'P', b'N', b'G']).unwrap();
        let yaml = dir.join("latte.yaml");
        std::fs::write(
            &yaml,
            r"
name: Latte
type: single
selling_price: '400'
images:
  - path: front.PNG
  - url: https://cdn.example/back.png
",
        )
        .unwrap();

        let draft = load_product(&yaml).unwrap();
        assert_eq!(draft.name, "Latte");
        assert_eq!(draft.single.selling_price, "400");
        assert_eq!(draft.images.len(), 2);
        assert!(matches!(
            &draft.images[0],
            ImagePart::File { file_name, content_type, bytes }
                if file_name == "front.PNG" && content_type == "image/png" && bytes.len() == 4
        ));
        assert_eq!(
            draft.images[1],
            ImagePart::Url("https://cdn.example/back.png".to_string())
        );
    }

    #[test]
    fn product_file_accepts_unquoted_numbers() {
        let dir = scratch_dir("numbers");
        let yaml = dir.join("mocha.yaml");
        std::fs::write(
            &yaml,
            "name: Mocha\nunit_id: 1\nweight: 0.3\nselling_price: 400\nvariation_id: 3\n",
        )
        .unwrap();

        let draft = load_product(&yaml).unwrap();
        assert_eq!(draft.unit_id, "1");
        assert_eq!(draft.weight, "0.3");
        assert_eq!(draft.single.selling_price, "400");
        assert_eq!(draft.selected_variation(), Some(3));
    }

    #[test]
    fn missing_image_is_reported_with_its_path() {
        let dir = scratch_dir("missing");
        let yaml = dir.join("p.yaml");
        std::fs::write(&yaml, "name: X\nimages:\n  - path: nope.jpg\n").unwrap();

        let err = load_product(&yaml).unwrap_err();
        assert!(matches!(err, ConfigError::FileIo { ref path, .. } if path.ends_with("nope.jpg")));
    }

    #[test]
    fn category_file_parses_nested_rows() {
        let dir = scratch_dir("category");
        let yaml = dir.join("drinks.yaml");
        std::fs::write(
            &yaml,
            r"
name: Drinks
business_id: 1
sub_category:
  - name: Hot
    sub_category:
      - name: Tea
  - name: Cold
",
        )
        .unwrap();

        let tree = load_category(&yaml).unwrap();
        assert_eq!(tree.depth(), 3);
        assert_eq!(tree.node_count(), 4);
        assert_eq!(tree.node_at(&[0, 0]).unwrap().name, "Tea");
    }

    #[test]
    fn malformed_yaml_is_a_parse_error() {
        let dir = scratch_dir("malformed");
        let yaml = dir.join("bad.yaml");
        std::fs::write(&yaml, "name: [unclosed").unwrap();
        assert!(matches!(load_category(&yaml), Err(ConfigError::FileParse { .. })));
    }

    #[test]
    fn unknown_extension_falls_back_to_octet_stream() {
        assert_eq!(guess_content_type(Path::new("a.bin")), "application/octet-stream");
        assert_eq!(guess_content_type(Path::new("a.JPEG")), "image/jpeg");
    }
}
