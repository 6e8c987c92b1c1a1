use httpmock::prelude::*;
use postal_core::{
    FailurePolicy, GeocodeProvider, LookupError, LookupOutcome, LookupRunner, OneMapProvider,
    POSTAL_CODES, PostalCode,
};
use serde_json::json;

fn found_body(address: &str, lon: &str, lat: &str) -> serde_json::Value {
    json!({
        "found": 1,
        "totalNumPages": 1,
        "pageNum": 1,
        "results": [{
            "SEARCHVAL": address,
            "BLK_NO": "1",
            "ROAD_NAME": "EXAMPLE ST",
            "BUILDING": "NIL",
            "ADDRESS": address,
            "POSTAL": "000000",
            "X": "28000.0",
            "Y": "45000.0",
            "LATITUDE": lat,
            "LONGITUDE": lon
        }]
    })
}

fn not_found_body() -> serde_json::Value {
    json!({ "found": 0, "totalNumPages": 0, "pageNum": 1, "results": [] })
}

fn provider(server: &MockServer) -> OneMapProvider {
    OneMapProvider::new(server.url("/api/common/elastic/search"))
}

/// Answer every fixed code, except those in `skip`, with a match whose address names the code.
fn mock_found_except(server: &MockServer, skip: &[&str]) {
    for postal in POSTAL_CODES {
        let code = postal.to_string();
        if skip.contains(&code.as_str()) {
            continue;
        }
        server.mock(|when, then| {
            when.method(GET)
                .path("/api/common/elastic/search")
                .query_param("searchVal", code.as_str());
            then.status(200).json_body(found_body(&format!("BLK {code}"), "103.8", "1.4"));
        });
    }
}

async fn run_to_string(
    provider: &OneMapProvider,
    policy: FailurePolicy,
) -> (Result<postal_core::RunSummary, LookupError>, String) {
    let mut out = Vec::new();
    let res = LookupRunner::new(provider, policy).run(POSTAL_CODES, &mut out).await;
    (res, String::from_utf8(out).unwrap())
}

#[tokio::test]
async fn sends_expected_query_parameters() {
    let server = MockServer::start();
    let mock = server.mock(|when, then| {
        when.method(GET)
            .path("/api/common/elastic/search")
            .query_param("searchVal", "760674")
            .query_param("returnGeom", "Y")
            .query_param("getAddrDetails", "Y")
            .query_param("pageNum", "1");
        then.status(200).json_body(found_body("1 EXAMPLE ST", "103.1", "1.3"));
    });

    let outcome = provider(&server).search(PostalCode(760674)).await.unwrap();

    mock.assert();
    assert_eq!(outcome.render_line(PostalCode(760674)), "760674|1 EXAMPLE ST|103.1|1.3");
}

#[tokio::test]
async fn one_line_per_code_in_input_order() {
    let server = MockServer::start();
    mock_found_except(&server, &[]);

    let (res, output) = run_to_string(&provider(&server), FailurePolicy::FailFast).await;
    let summary = res.unwrap();

    assert_eq!(summary.found, 21);
    let lines: Vec<&str> = output.lines().collect();
    assert_eq!(lines.len(), POSTAL_CODES.len());
    for (line, postal) in lines.iter().zip(POSTAL_CODES) {
        assert_eq!(*line, format!("{postal}|BLK {postal}|103.8|1.4"));
    }
}

#[tokio::test]
async fn found_and_not_found_lines() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(GET).query_param("searchVal", "760674");
        then.status(200).json_body(found_body("1 EXAMPLE ST", "103.1", "1.3"));
    });
    server.mock(|when, then| {
        when.method(GET).query_param("searchVal", "762507");
        then.status(200).json_body(not_found_body());
    });

    let mut out = Vec::new();
    let codes = [PostalCode(760674), PostalCode(762507)];
    let summary = LookupRunner::new(&provider(&server), FailurePolicy::FailFast)
        .run(&codes, &mut out)
        .await
        .unwrap();

    assert_eq!(summary.found, 1);
    assert_eq!(summary.not_found, 1);
    assert_eq!(
        String::from_utf8(out).unwrap(),
        "760674|1 EXAMPLE ST|103.1|1.3\n762507|No results found\n"
    );
}

#[tokio::test]
async fn multiple_results_use_the_first() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(GET).query_param("searchVal", "760813");
        then.status(200).json_body(json!({
            "found": 2,
            "totalNumPages": 1,
            "pageNum": 1,
            "results": [
                { "ADDRESS": "FIRST", "LONGITUDE": "103.1", "LATITUDE": "1.3" },
                { "ADDRESS": "SECOND", "LONGITUDE": "104.0", "LATITUDE": "2.0" }
            ]
        }));
    });

    let outcome = provider(&server).search(PostalCode(760813)).await.unwrap();
    match outcome {
        LookupOutcome::Found(r) => assert_eq!(r.address, "FIRST"),
        LookupOutcome::NotFound => panic!("expected a match"),
    }
}

#[tokio::test]
async fn repeated_runs_are_identical() {
    let server = MockServer::start();
    mock_found_except(&server, &[]);
    let provider = provider(&server);

    let (_, first) = run_to_string(&provider, FailurePolicy::FailFast).await;
    let (_, second) = run_to_string(&provider, FailurePolicy::FailFast).await;

    assert!(!first.is_empty());
    assert_eq!(first, second);
}

#[tokio::test]
async fn malformed_json_aborts_at_that_code() {
    let server = MockServer::start();
    // Third code in the list.
    server.mock(|when, then| {
        when.method(GET).query_param("searchVal", "760813");
        then.status(200).body("{\"found\": ");
    });
    mock_found_except(&server, &["760813"]);

    let (res, output) = run_to_string(&provider(&server), FailurePolicy::FailFast).await;

    let err = res.unwrap_err();
    assert!(matches!(err, LookupError::Decode { .. }));
    assert_eq!(err.postal(), Some(PostalCode(760813)));
    assert_eq!(output.lines().count(), 2);
    assert!(!output.contains("760813"));
}

#[tokio::test]
async fn missing_found_key_aborts_at_that_code() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(GET).query_param("searchVal", "760674");
        then.status(200).json_body(json!({ "results": [] }));
    });
    mock_found_except(&server, &["760674"]);

    let (res, output) = run_to_string(&provider(&server), FailurePolicy::FailFast).await;

    assert!(matches!(res, Err(LookupError::Decode { .. })));
    assert!(output.is_empty());
}

#[tokio::test]
async fn error_status_is_reported() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(GET).query_param("searchVal", "760674");
        then.status(503).body("upstream unavailable");
    });

    let err = provider(&server).search(PostalCode(760674)).await.unwrap_err();
    match err {
        LookupError::Status { status, body, .. } => {
            assert_eq!(status.as_u16(), 503);
            assert_eq!(body, "upstream unavailable");
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[tokio::test]
async fn isolate_keeps_later_codes() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(GET).query_param("searchVal", "760813");
        then.status(500);
    });
    mock_found_except(&server, &["760813"]);

    let (res, output) = run_to_string(&provider(&server), FailurePolicy::Isolate).await;
    let summary = res.unwrap();

    assert_eq!(summary.failed, 1);
    assert_eq!(summary.found, 20);
    assert_eq!(output.lines().count(), 20);
    assert!(!output.contains("760813|"));
    assert!(output.ends_with("751364|BLK 751364|103.8|1.4\n"));
}

#[tokio::test]
async fn unreachable_endpoint_is_request_error() {
    // Nothing listens on the discard port.
    let provider = OneMapProvider::new("http://127.0.0.1:9/search");
    let err = provider.search(PostalCode(760674)).await.unwrap_err();
    assert!(matches!(err, LookupError::Request { .. }));
}
