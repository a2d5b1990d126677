use super::outcome::http_date;
use super::*;
use crate::error::HttpError;
use crate::ids::RequestId;
use crate::request::Request;
use http::Method;
use serde_json::{json, Map, Value};
use std::sync::Arc;
use time::macros::datetime;
use time::OffsetDateTime;

fn ctx(method: Method) -> Context {
    Context::new(
        Arc::new(Request::new(method, "/kitchen/42")),
        RequestId::new(),
        vec![json!("42")],
        json!({ "fries": "golden" }),
        None,
    )
}

fn finalize(reply: Reply, method: &Method) -> Outcome {
    reply
        .draw(Draft::base(method))
        .finalize(OffsetDateTime::now_utc())
}

#[test]
fn test_http_date_format() {
    let date = http_date(datetime!(1994-11-06 08:49:37 UTC));
    assert_eq!(date, "Sun, 06 Nov 1994 08:49:37 GMT");
}

#[test]
fn test_default_reply() {
    let get = finalize(Reply::Default, &Method::GET);
    assert_eq!(get.status, 200);
    assert_eq!(get.body, "");
    assert!(get.header("content-type").is_none());
    assert!(get.header("content-length").is_none());
    assert_eq!(get.header("server"), Some(SERVER));
    assert!(get.header("date").is_some());

    let post = finalize(Reply::Default, &Method::POST);
    assert_eq!(post.status, 201);
}

#[test]
fn test_text_reply_is_wrapped() {
    let out = finalize(Reply::text("Hello"), &Method::GET);
    assert_eq!(out.status, 200);
    assert_eq!(out.json(), Some(json!({ "journey": "Hello" })));
    assert_eq!(out.header("content-type"), Some("application/json"));
    assert_eq!(out.header("content-length"), Some("19"));
}

#[test]
fn test_status_reply() {
    let out = finalize(Reply::from(204), &Method::DELETE);
    assert_eq!(out.status, 204);
    assert_eq!(out.body, "");
}

#[test]
fn test_object_reply() {
    let out = finalize(
        Reply::object(&json!({ "big": "mac" })).unwrap(),
        &Method::POST,
    );
    assert_eq!(out.status, 201);
    assert_eq!(out.json(), Some(json!({ "big": "mac" })));
}

#[test]
fn test_object_reply_rejects_non_objects() {
    let err = Reply::object(&vec![1, 2, 3]).unwrap_err();
    assert_eq!(err.message(), "wrong response type");
}

#[test]
fn test_full_reply_bypasses_defaults() {
    let reply = Reply::full(
        418,
        [("Content-Type", "text/plain"), ("X-Kettle", "short")],
        "I'm a teapot",
    );
    let out = finalize(reply, &Method::POST);
    assert_eq!(out.status, 418);
    assert_eq!(out.header("content-type"), Some("text/plain"));
    assert_eq!(out.header("x-kettle"), Some("short"));
    assert_eq!(out.body, "I'm a teapot");
    assert_eq!(out.header("content-length"), Some("12"));
}

#[test]
fn test_full_reply_with_structured_body_forces_json() {
    let reply = Reply::full(200, [("Content-Type", "text/plain")], json!([1, 2]));
    let out = finalize(reply, &Method::GET);
    assert_eq!(out.header("content-type"), Some("application/json"));
    assert_eq!(out.body, "[1,2]");
}

#[test]
fn test_null_and_empty_bodies_are_absent() {
    for body in [Body::Empty, Body::from(""), Body::Json(Value::Null)] {
        let out = finalize(Reply::full(200, Headers::new(), body), &Method::GET);
        assert_eq!(out.body, "");
        assert!(out.header("content-length").is_none());
        assert!(out.header("content-type").is_none());
    }
}

#[test]
fn test_content_length_counts_bytes() {
    let out = finalize(Reply::body("héllo"), &Method::GET);
    assert_eq!(out.header("content-length"), Some("6"));
}

#[test]
fn test_headers_reply_keeps_no_body() {
    let reply = Reply::headers(302, [("Location", "/home")]);
    let out = finalize(reply, &Method::GET);
    assert_eq!(out.status, 302);
    assert_eq!(out.header("location"), Some("/home"));
    assert_eq!(out.body, "");
}

#[test]
fn test_jsonp_reply() {
    let out = finalize(Reply::jsonp("cb", json!({ "a": 1 })), &Method::POST);
    assert_eq!(out.status, 200);
    assert_eq!(out.header("content-type"), Some("text/javascript"));
    assert_eq!(out.body, r#"cb({"a":1})"#);
}

#[test]
fn test_error_draft() {
    let draft = Draft::from_error(&HttpError::MethodNotAllowed(vec![Method::GET, Method::POST]));
    let out = draft.finalize(OffsetDateTime::now_utc());
    assert_eq!(out.status, 405);
    assert_eq!(out.header("allow"), Some("GET,POST"));
    assert_eq!(out.json(), Some(json!({ "error": "method not allowed." })));
}

#[test]
fn test_headers_set_replaces_case_insensitively() {
    let mut headers = Headers::from([("Content-Type", "text/plain")]);
    headers.set("content-type", "application/json");
    assert_eq!(headers.len(), 1);
    assert_eq!(headers.get("CONTENT-TYPE"), Some("application/json"));
    assert_eq!(headers.iter().next(), Some(("Content-Type", "application/json")));
}

#[tokio::test]
async fn test_go_sync_handler() {
    let handler: Arc<dyn Handler> = Arc::new(|ctx: Context| -> Result<Reply, HandlerError> {
        let mut map = Map::new();
        map.insert("id".into(), ctx.captures()[0].clone());
        map.insert("fries".into(), ctx.param("fries").cloned().unwrap_or_default());
        Ok(map.into())
    });
    let out = go(handler, ctx(Method::GET))
        .await
        .finalize(OffsetDateTime::now_utc());
    assert_eq!(out.status, 200);
    assert_eq!(out.json(), Some(json!({ "id": "42", "fries": "golden" })));
}

#[tokio::test]
async fn test_go_async_handler() {
    let handler: Arc<dyn Handler> = Arc::new(async_handler(|ctx: Context| async move {
        tokio::task::yield_now().await;
        Ok(Reply::text(ctx.request().path().to_string()))
    }));
    let out = go(handler, ctx(Method::POST))
        .await
        .finalize(OffsetDateTime::now_utc());
    assert_eq!(out.status, 201);
    assert_eq!(out.json(), Some(json!({ "journey": "/kitchen/42" })));
}

#[tokio::test]
async fn test_go_handler_error_uses_its_status() {
    let handler: Arc<dyn Handler> = Arc::new(|_ctx: Context| -> Result<Reply, HandlerError> {
        Err(HandlerError::new("kitchen on fire").with_status(503))
    });
    let out = go(handler, ctx(Method::GET))
        .await
        .finalize(OffsetDateTime::now_utc());
    assert_eq!(out.status, 503);
    let body = out.json().unwrap();
    assert_eq!(body["error"], "kitchen on fire");
    assert!(body["stack"].is_array());
}

#[tokio::test]
async fn test_go_handler_error_defaults_to_500() {
    let handler: Arc<dyn Handler> = Arc::new(|_ctx: Context| -> Result<Reply, HandlerError> {
        Err(anyhow::anyhow!("boom").into())
    });
    let out = go(handler, ctx(Method::GET))
        .await
        .finalize(OffsetDateTime::now_utc());
    assert_eq!(out.status, 500);
    assert_eq!(out.json().unwrap()["error"], "boom");
}

#[tokio::test]
async fn test_go_catches_panics() {
    let handler: Arc<dyn Handler> = Arc::new(|_ctx: Context| -> Result<Reply, HandlerError> {
        panic!("handler exploded");
    });
    let out = go(handler, ctx(Method::GET))
        .await
        .finalize(OffsetDateTime::now_utc());
    assert_eq!(out.status, 500);
    let error = out.json().unwrap()["error"].as_str().unwrap().to_string();
    assert!(error.contains("handler exploded"));
}
