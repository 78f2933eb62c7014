use super::*;

fn test_client(base_url: &str) -> ConsoleClient {
    ConsoleClient::with_base_url(base_url, 30).expect("client construction should not fail")
}

#[test]
fn build_url_appends_to_api_prefix() {
    let client = test_client("https://demo.example.com/api");
    let url = client.build_url("products/create", &[]).unwrap();
    assert_eq!(url.as_str(), "https://demo.example.com/api/products/create");
}

#[test]
fn build_url_tolerates_slashes_and_encodes_query() {
    let client = test_client("https://demo.example.com/api/");
    let url = client
        .build_url("/units", &[("business_id", "1"), ("per_page", "-1"), ("q", "a & b")])
        .unwrap();
    assert!(url
        .as_str()
        .starts_with("https://demo.example.com/api/units?business_id=1&per_page=-1&q="));
    assert!(!url.as_str().contains(" & "), "query must be encoded: {url}");
}

#[test]
fn invalid_base_url_is_rejected() {
    assert!(matches!(
        ConsoleClient::with_base_url("not a url", 30),
        Err(ClientError::InvalidBaseUrl(_))
    ));
}

#[test]
fn receipt_reads_nested_or_top_level_id() {
    assert_eq!(receipt_from(&serde_json::json!({ "data": { "id": 9 } })).id, Some(9));
    assert_eq!(receipt_from(&serde_json::json!({ "id": 4 })).id, Some(4));
    assert_eq!(receipt_from(&Value::Null).id, None);
}

#[test]
fn success_false_is_an_api_error() {
    let body = serde_json::json!({ "success": false, "message": "SKU already exists" });
    assert!(matches!(
        check_api_error(&body),
        Err(ClientError::Api(m)) if m == "SKU already exists"
    ));
    assert!(check_api_error(&serde_json::json!({ "success": true })).is_ok());
}

#[test]
fn to_form_accepts_text_and_file_parts() {
    let parts = vec![
        FormPart::text("name", "Latte"),
        FormPart {
            key: "product_images[]".to_owned(),
            value: PartValue::File {
                file_name: "a.png".to_owned(),
                content_type: "image/png".to_owned(),
                bytes: vec![1, 2],
            },
        },
    ];
    assert!(to_form(parts).is_ok());
}

#[test]
fn to_form_rejects_malformed_content_type() {
    let parts = vec![FormPart {
        key: "product_images[]".to_owned(),
        value: PartValue::File {
            file_name: "a.png".to_owned(),
            content_type: "not a mime".to_owned(),
            bytes: vec![],
        },
    }];
    assert!(matches!(to_form(parts), Err(ClientError::Http(_))));
}
