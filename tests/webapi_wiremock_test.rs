//! Web API fetcher tests using wiremock for isolated HTTP mocking

use autotext::{
    render, EntityReference, FetchError, FieldValue, InputSnapshot, RecordFetcher, WebApiFetcher,
};
use serde_json::json;
use wiremock::matchers::{header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

// =============================================================================
// HELPERS
// =============================================================================

fn fetcher_for(server: &MockServer) -> WebApiFetcher {
    WebApiFetcher::new(&format!("{}/api/data/v9.2", server.uri()))
        .unwrap()
        .with_token("test-token")
}

// =============================================================================
// SUCCESS
// =============================================================================

#[tokio::test]
async fn fetches_selected_attribute() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/data/v9.2/accounts(42)"))
        .and(query_param("$select", "telephone1"))
        .and(header("Authorization", "Bearer test-token"))
        .and(header("OData-Version", "4.0"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({"@odata.etag": "W/\"1\"", "telephone1": "555-0100"})),
        )
        .expect(1)
        .mount(&server)
        .await;

    let value = fetcher_for(&server)
        .fetch_attribute("account", "42", "telephone1")
        .await
        .unwrap();
    assert_eq!(value, "555-0100");
}

#[tokio::test]
async fn numeric_attribute_is_rendered_as_text() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/data/v9.2/cities(7)"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"population": 2100000})))
        .mount(&server)
        .await;

    let fetcher = fetcher_for(&server).with_entity_set("city", "cities");
    let value = fetcher.fetch_attribute("city", "7", "population").await.unwrap();
    assert_eq!(value, "2100000");
}

// =============================================================================
// FAILURES
// =============================================================================

#[tokio::test]
async fn not_found_maps_to_not_found() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let err = fetcher_for(&server)
        .fetch_attribute("account", "missing", "name")
        .await
        .unwrap_err();
    assert!(matches!(err, FetchError::NotFound { .. }));
}

#[tokio::test]
async fn server_error_maps_to_status() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
        .mount(&server)
        .await;

    let err = fetcher_for(&server)
        .fetch_attribute("account", "42", "name")
        .await
        .unwrap_err();
    assert_eq!(
        err,
        FetchError::Status {
            status: 500,
            body: "boom".into()
        }
    );
}

#[tokio::test]
async fn null_attribute_is_missing() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"telephone1": null})))
        .mount(&server)
        .await;

    let err = fetcher_for(&server)
        .fetch_attribute("account", "42", "telephone1")
        .await
        .unwrap_err();
    assert!(matches!(err, FetchError::AttributeMissing { .. }));
}

// =============================================================================
// END TO END
// =============================================================================

#[tokio::test]
async fn render_with_web_api_and_failure_placeholder() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/data/v9.2/accounts(42)"))
        .and(query_param("$select", "telephone1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"telephone1": "555-0100"})))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/data/v9.2/accounts(42)"))
        .and(query_param("$select", "fax"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;

    let snapshot = InputSnapshot::new().with(
        "customer",
        FieldValue::reference(EntityReference::new("account", "42").with_name("Contoso")),
    );
    let output = render(
        "lookup,customer,name|tel|lookup,customer,telephone1|fax|lookup,customer,fax",
        &snapshot,
        &fetcher_for(&server),
    )
    .await;

    assert_eq!(output, "Contoso tel 555-0100 fax [Error retrieving fax for customer]");
}
