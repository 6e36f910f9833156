use std::collections::BTreeMap;

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use gateway_shim::api::helpers::to_platform_response;
use gateway_shim::api::parsing::{get_header_value, incoming_request_from_event};
use gateway_shim::core::config::AdapterConfig;
use gateway_shim::core::models::OutgoingResponse;
use gateway_shim::gateway::{
    GatewayAdapter, GatewayContext, PlainTextApplication, chunks, from_fn,
};
use lambda_runtime::{Context, LambdaEvent};
use serde_json::json;

#[test]
fn test_http_api_event_is_parsed() {
    let event = json!({
        "rawPath": "/orders",
        "rawQueryString": "page=2",
        "requestContext": { "http": { "method": "POST" } },
        "headers": { "host": "shop.example.com", "content-type": "application/json" },
        "body": "{\"sku\":1}",
        "isBase64Encoded": false
    });

    let request = incoming_request_from_event(&event);
    assert_eq!(request.method.as_deref(), Some("POST"));
    assert_eq!(request.path.as_deref(), Some("/orders"));
    assert_eq!(request.query_string.as_deref(), Some("page=2"));
    assert_eq!(request.body.as_deref(), Some(&b"{\"sku\":1}"[..]));
    let headers = request.headers.unwrap();
    assert_eq!(headers.get("Host"), Some("shop.example.com"));
}

#[test]
fn test_rest_api_event_rebuilds_query_string() {
    let event = json!({
        "httpMethod": "GET",
        "path": "/search",
        "queryStringParameters": { "q": "rust lang", "lang": "en" }
    });

    let request = incoming_request_from_event(&event);
    assert_eq!(request.method.as_deref(), Some("GET"));
    assert_eq!(request.query_string.as_deref(), Some("lang=en&q=rust%20lang"));
}

#[test]
fn test_multi_value_query_parameters_are_expanded() {
    let event = json!({
        "multiValueQueryStringParameters": { "tag": ["a", "b"] },
        "queryStringParameters": { "tag": "b" }
    });

    let request = incoming_request_from_event(&event);
    assert_eq!(request.query_string.as_deref(), Some("tag=a&tag=b"));
}

#[test]
fn test_empty_event_leaves_fields_unset() {
    let request = incoming_request_from_event(&json!({}));
    assert!(request.method.is_none());
    assert!(request.path.is_none());
    assert!(request.query_string.is_none());
    assert!(request.headers.is_none());
    assert!(request.body.is_none());

    let request = incoming_request_from_event(&json!({ "headers": null, "body": null }));
    assert!(request.headers.unwrap().is_empty());
    assert!(request.body.is_none());
}

#[test]
fn test_base64_body_is_decoded() {
    let event = json!({
        "body": STANDARD.encode([0u8, 159, 146, 150]),
        "isBase64Encoded": true
    });

    let request = incoming_request_from_event(&event);
    assert_eq!(request.body, Some(vec![0u8, 159, 146, 150]));
}

#[test]
fn test_invalid_base64_body_falls_back_to_raw_text() {
    let event = json!({ "body": "not base64!", "isBase64Encoded": true });
    let request = incoming_request_from_event(&event);
    assert_eq!(request.body, Some(b"not base64!".to_vec()));
}

#[test]
fn test_get_header_value_is_case_insensitive() {
    let headers = json!({ "x-forwarded-proto": "https" });
    assert_eq!(get_header_value(&headers, "X-Forwarded-Proto"), Some("https"));
    assert_eq!(get_header_value(&headers, "Host"), None);
}

#[test]
fn test_text_response_is_serialized_as_text() {
    let mut headers = BTreeMap::new();
    headers.insert("Content-Type".to_string(), "text/html".to_string());
    let response = OutgoingResponse::new(b"<h1>hi</h1>".to_vec(), 201, headers);

    let v = to_platform_response(&response);
    assert_eq!(v["statusCode"], 201);
    assert_eq!(v["body"], "<h1>hi</h1>");
    assert_eq!(v["isBase64Encoded"], false);
    assert_eq!(v["headers"]["Content-Type"], "text/html");
}

#[test]
fn test_http_api_cookies_become_cookie_header() {
    let event = json!({
        "rawPath": "/account",
        "requestContext": { "http": { "method": "GET" } },
        "headers": { "host": "shop.example.com" },
        "cookies": ["sessionid=abc", "csrftoken=xyz"]
    });

    let request = incoming_request_from_event(&event);
    let ctx = GatewayContext::from_request(request, &AdapterConfig::default());
    assert_eq!(ctx.get("HTTP_COOKIE"), Some("sessionid=abc; csrftoken=xyz"));
}

#[test]
fn test_cookies_without_headers_object() {
    let event = json!({ "rawPath": "/", "cookies": ["theme=dark"] });

    let request = incoming_request_from_event(&event);
    assert_eq!(request.headers.unwrap().get("Cookie"), Some("theme=dark"));
}

#[test]
fn test_existing_cookie_header_is_kept() {
    let event = json!({
        "rawPath": "/",
        "headers": { "cookie": "from=header" },
        "cookies": ["from=array"]
    });

    let headers = incoming_request_from_event(&event).headers.unwrap();
    assert_eq!(headers.get("Cookie"), Some("from=header"));
    assert_eq!(headers.len(), 1);
}

#[test]
fn test_empty_cookies_array_adds_nothing() {
    let event = json!({ "rawPath": "/", "headers": {}, "cookies": [] });

    let headers = incoming_request_from_event(&event).headers.unwrap();
    assert!(headers.is_empty());
}

#[test]
fn test_binary_response_is_base64_encoded() {
    let response = OutgoingResponse::new(vec![0xff, 0xd8, 0xff], 200, BTreeMap::new());

    let v = to_platform_response(&response);
    assert_eq!(v["isBase64Encoded"], true);
    assert_eq!(v["body"], STANDARD.encode([0xff, 0xd8, 0xff]));
}

#[tokio::test]
async fn test_handler_round_trips_an_event() {
    let adapter = GatewayAdapter::new(AdapterConfig::default(), || {
        Ok(from_fn(|ctx, resp| {
            resp.start_response("200 OK", [("Content-Type", "text/plain")]);
            Ok(chunks([format!(
                "{} {}://{}:{}{}?{}",
                ctx.request_method,
                ctx.url_scheme,
                ctx.server_name,
                ctx.server_port,
                ctx.path_info,
                ctx.query_string
            )
            .into_bytes()]))
        }))
    });
    let event = LambdaEvent::new(
        json!({
            "httpMethod": "PATCH",
            "path": "items",
            "rawQueryString": "x=1",
            "headers": { "Host": "api.example.com:8443", "X-Forwarded-Proto": "https" }
        }),
        Context::default(),
    );

    let v = gateway_shim::api::handler(&adapter, event).await.unwrap();
    assert_eq!(v["statusCode"], 200);
    assert_eq!(v["body"], "PATCH https://api.example.com:8443/items?x=1");
}

#[tokio::test]
async fn test_handler_reports_failures_as_500() {
    let adapter: GatewayAdapter<PlainTextApplication> =
        GatewayAdapter::new(AdapterConfig::default(), || {
            Err(anyhow::anyhow!("no such settings module"))
        });
    let event = LambdaEvent::new(json!({ "path": "/" }), Context::default());

    let v = gateway_shim::api::handler(&adapter, event).await.unwrap();
    assert_eq!(v["statusCode"], 500);
    assert!(v["body"].as_str().unwrap().contains("no such settings module"));
}
