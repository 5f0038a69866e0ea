use async_trait::async_trait;
use serde_json::{json, Value};
use std::sync::Arc;
use zentinel_mock_adapter::request::RequestBody;
use zentinel_mock_adapter::{
    AdapterConfig, EngineFailure, EngineOutput, HeaderMap, HttpRequest, MockAdapter, MockConfig,
    MockEngine, NormalizedRequest, Severity, Validations, Violation,
};

struct Operation {
    method: &'static str,
    path: &'static str,
}

/// Tiny pet store engine: enough behavior to drive the adapter end to end.
struct PetStore;

#[async_trait]
impl MockEngine for PetStore {
    type Operation = Operation;

    async fn invoke(
        &self,
        request: &NormalizedRequest,
        operations: &[Operation],
        config: &MockConfig,
    ) -> Result<EngineOutput, EngineFailure> {
        let operation = operations
            .iter()
            .find(|op| op.method == request.method && op.path == request.url.path)
            .ok_or_else(|| {
                EngineFailure::new(format!("No operation for {} {}", request.method, request.url.path))
                    .with_status(404)
                    .with_code("NO_PATH_MATCHED_ERROR")
                    .with_title("Route not resolved")
            })?;

        let mut headers = HeaderMap::new();
        let mut validations = Validations::default();

        let body = match (operation.method, config.example_key.as_deref()) {
            ("get", Some("xml")) => {
                headers.append("Content-Type", "application/xml");
                json!({"pet": {"name": "Rex"}})
            }
            ("get", _) => {
                headers.append("Content-Type", "application/json");
                if config.dynamic {
                    json!([{"id": 7, "name": "generated"}])
                } else {
                    json!([{"id": 1, "name": "Rex"}])
                }
            }
            _ => {
                headers.append("Content-Type", "application/json");
                let name = match &request.body {
                    Some(RequestBody::Json(body)) => body.get("name").cloned(),
                    _ => None,
                };
                if name.is_none() && config.validate_request {
                    validations.input.push(Violation::new(
                        &["body"],
                        Severity::Error,
                        "required",
                        "must have required property 'name'",
                    ));
                }
                // The example is missing `id`, which the schema requires.
                validations.output.push(Violation::new(
                    &["body"],
                    Severity::Error,
                    "required",
                    "must have required property 'id'",
                ));
                json!({"name": name.unwrap_or(Value::Null)})
            }
        };

        Ok(EngineOutput {
            status_code: config.code.unwrap_or(200),
            headers,
            body: Some(body),
            validations,
        })
    }
}

fn operations() -> Vec<Operation> {
    vec![
        Operation {
            method: "get",
            path: "/pets",
        },
        Operation {
            method: "post",
            path: "/pets",
        },
    ]
}

fn adapter(config: AdapterConfig) -> MockAdapter<PetStore> {
    MockAdapter::new(config, PetStore, operations())
}

fn json_body(body: Option<&str>) -> Value {
    serde_json::from_str(body.expect("body present")).expect("valid json")
}

#[tokio::test]
async fn static_example_is_served() {
    let response = adapter(AdapterConfig::default())
        .handle(HttpRequest::new("GET", "/pets"))
        .await;

    assert_eq!(response.status, 200);
    assert_eq!(json_body(response.body.as_deref()), json!([{"id": 1, "name": "Rex"}]));
}

#[tokio::test]
async fn prefer_header_selects_code_and_dynamic_mode() {
    let request = HttpRequest::new("GET", "/pets?__code=500").with_header("Prefer", "code=201, dynamic=true");
    let response = adapter(AdapterConfig::default()).handle(request).await;

    assert_eq!(response.status, 201);
    assert_eq!(json_body(response.body.as_deref())[0]["name"], "generated");
}

#[tokio::test]
async fn xml_example_is_wrapped() {
    let response = adapter(AdapterConfig::default())
        .handle(HttpRequest::new("GET", "/pets?__example=xml"))
        .await;

    assert_eq!(response.body.as_deref(), Some("<xml><pet><name>Rex</name></pet></xml>"));
}

#[tokio::test]
async fn unknown_route_is_a_problem_detail() {
    let response = adapter(AdapterConfig::default())
        .handle(HttpRequest::new("DELETE", "/pets"))
        .await;

    assert_eq!(response.status, 404);
    assert_eq!(response.headers.get("content-type"), Some("application/problem+json"));
    let problem = json_body(response.body.as_deref());
    assert_eq!(problem["title"], "Route not resolved");
    assert_eq!(problem["detail"], "No operation for delete /pets");
}

#[tokio::test]
async fn violations_are_reported_in_header() {
    let request = HttpRequest::new("POST", "/pets")
        .with_header("Content-Type", "application/json")
        .with_body("{}");
    let adapter = adapter(AdapterConfig::default());
    let response = adapter.handle(request).await;

    assert_eq!(response.status, 200);
    let header = response.headers.get("x-mock-violations").expect("violations header");
    let violations: Value = serde_json::from_str(header).unwrap();
    assert_eq!(violations[0]["location"], json!(["request", "body"]));
    assert_eq!(violations[1]["location"], json!(["response", "body"]));
    assert_eq!(adapter.total_violations(), 2);
}

#[tokio::test]
async fn strict_mode_discards_engine_response() {
    let config = AdapterConfig::from_yaml("mock:\n  errors: true\nsettings:\n  violations_status: 502\n").unwrap();
    let request = HttpRequest::new("POST", "/pets?__code=201")
        .with_header("Content-Type", "application/json")
        .with_body(r#"{"name":"Rex"}"#);
    let response = adapter(config).handle(request).await;

    assert_eq!(response.status, 502);
    let problem = json_body(response.body.as_deref());
    assert_eq!(problem["type"], "VIOLATIONS");
    assert_eq!(problem["validation"][0]["message"], "must have required property 'id'");
}

#[tokio::test]
async fn malformed_json_body_is_rejected() {
    let request = HttpRequest::new("POST", "/pets")
        .with_header("Content-Type", "application/json")
        .with_body("{");
    let response = adapter(AdapterConfig::default()).handle(request).await;

    assert_eq!(response.status, 400);
    assert_eq!(json_body(response.body.as_deref())["type"], "BAD_REQUEST");
}

#[tokio::test]
async fn concurrent_requests_are_independent() {
    let adapter = Arc::new(adapter(AdapterConfig::default()));

    let handles: Vec<_> = (0..16)
        .map(|i| {
            let adapter = Arc::clone(&adapter);
            tokio::spawn(async move {
                let code = if i % 2 == 0 { "200" } else { "20" };
                adapter
                    .handle(HttpRequest::new("GET", &format!("/pets?__code={code}")))
                    .await
                    .status
            })
        })
        .collect();

    let mut statuses = Vec::new();
    for handle in handles {
        statuses.push(handle.await.unwrap());
    }

    assert_eq!(statuses.iter().filter(|s| **s == 200).count(), 8);
    assert_eq!(statuses.iter().filter(|s| **s == 422).count(), 8);
    assert_eq!(adapter.total_requests(), 16);
    assert_eq!(adapter.total_failed(), 8);
    assert_eq!(adapter.config().mock.code, None);
}

#[test]
fn handle_can_be_driven_without_a_runtime_macro() {
    let adapter = adapter(AdapterConfig::default());
    let response = tokio_test::block_on(adapter.handle(HttpRequest::new("get", "/pets?__dynamic=maybe")));
    assert_eq!(response.status, 422);
}
