use http::Method;
use serde_json::json;

use trailhead::{async_handler, Context, HandlerError, Headers, Reply, Request, Router};

async fn serve(method: Method, reply: Reply) -> trailhead::Outcome {
    let allowed = method.clone();
    let router = Router::new(move |map| {
        map.route((allowed, "dish"))?
            .bind(move |_ctx: Context| -> Result<Reply, HandlerError> { Ok(reply.clone()) });
        Ok(())
    })
    .unwrap();
    router
        .route(Request::new(method, "/dish"), "")
        .await
        .unwrap()
}

#[tokio::test]
async fn test_full_reply_bypasses_defaults() {
    let outcome = serve(Method::POST, Reply::full(201, [("X", "y")], "body")).await;

    assert_eq!(outcome.status, 201);
    assert_eq!(outcome.header("X"), Some("y"));
    assert_eq!(outcome.body, "body");
    assert!(outcome.header("Content-Type").is_none());
    assert_eq!(outcome.header("Content-Length"), Some("4"));
    assert!(outcome.header("Date").is_some());
    assert_eq!(outcome.header("Server"), Some(trailhead::response::SERVER));
}

#[tokio::test]
async fn test_object_reply_on_get_is_json_200() {
    let meal = json!({ "main": "roast", "sides": ["fries"] });
    let outcome = serve(Method::GET, Reply::object(&meal).unwrap()).await;

    assert_eq!(outcome.status, 200);
    assert_eq!(outcome.header("Content-Type"), Some("application/json"));
    assert_eq!(outcome.json(), Some(meal));
}

#[tokio::test]
async fn test_default_reply_follows_method() {
    let posted = serve(Method::POST, Reply::Default).await;
    assert_eq!(posted.status, 201);
    assert!(posted.body.is_empty());
    assert!(posted.header("Content-Type").is_none());
    assert!(posted.header("Content-Length").is_none());

    let fetched = serve(Method::GET, Reply::Default).await;
    assert_eq!(fetched.status, 200);
}

#[tokio::test]
async fn test_text_and_status_replies_merge_over_defaults() {
    let text = serve(Method::GET, Reply::text("I'm a teapot")).await;
    assert_eq!(text.body, r#"{"journey":"I'm a teapot"}"#);
    assert_eq!(text.header("Content-Length"), Some("26"));

    let status = serve(Method::POST, Reply::Status(202)).await;
    assert_eq!(status.status, 202);
    assert!(status.body.is_empty());
}

#[tokio::test]
async fn test_headers_reply_keeps_status_and_headers() {
    let outcome = serve(
        Method::GET,
        Reply::headers(302, Headers::from([("Location", "/menu")])),
    )
    .await;
    assert_eq!(outcome.status, 302);
    assert_eq!(outcome.header("location"), Some("/menu"));
    assert!(outcome.body.is_empty());
}

#[tokio::test]
async fn test_jsonp_reply_wraps_callback() {
    let outcome = serve(Method::GET, Reply::jsonp("serve", json!({ "hot": true }))).await;
    assert_eq!(outcome.status, 200);
    assert_eq!(outcome.header("Content-Type"), Some("text/javascript"));
    assert_eq!(outcome.body, r#"serve({"hot":true})"#);
}

#[tokio::test]
async fn test_handler_error_status_is_kept() {
    let router = Router::new(|map| {
        map.get("teapot")?
            .bind(async_handler(|_ctx: Context| async {
                Err::<Reply, HandlerError>(HandlerError::new("short and stout").with_status(418))
            }));
        map.get("soup")?.bind(|_ctx: Context| -> Result<Reply, HandlerError> {
            Reply::object(&"just a string")
        });
        Ok(())
    })
    .unwrap();

    let teapot = router
        .route(Request::new(Method::GET, "/teapot"), "")
        .await
        .unwrap();
    assert_eq!(teapot.status, 418);
    let body = teapot.json().unwrap();
    assert_eq!(body["error"], "short and stout");
    assert!(body["stack"].is_array());

    let soup = router
        .route(Request::new(Method::GET, "/soup"), "")
        .await
        .unwrap();
    assert_eq!(soup.status, 500);
    assert_eq!(soup.json().unwrap()["error"], "wrong response type");
}
