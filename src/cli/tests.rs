//! Unit tests for CLI commands

use crate::cli::{execute, parse_rule, Cli, Commands};
use crate::router::Methods;
use clap::Parser;
use http::Method;
use serde_json::Value;

#[test]
fn test_parse_rule() {
    let (methods, pattern) = parse_rule(r"get,POST kitchen/(\d+)").unwrap();
    assert_eq!(methods, Methods::of([Method::GET, Method::POST]));
    assert_eq!(pattern, r"kitchen/(\d+)");

    let (methods, pattern) = parse_rule("* (.*)").unwrap();
    assert_eq!(methods, Methods::Any);
    assert_eq!(pattern, "(.*)");

    let (_, pattern) = parse_rule("GET").unwrap();
    assert_eq!(pattern, "");

    assert!(parse_rule(", pets").is_err());
}

#[test]
fn test_dispatch_command_parses() {
    let cli = Cli::try_parse_from([
        "trailhead-probe",
        "dispatch",
        "--route",
        "GET pets",
        "--route",
        "POST pets",
        "--url",
        "/pets",
        "-H",
        "X-Trace: 1",
        "--strict",
    ])
    .unwrap();

    match cli.command {
        Commands::Dispatch {
            table,
            method,
            url,
            headers,
            ..
        } => {
            assert_eq!(table.routes.len(), 2);
            assert!(table.strict);
            assert_eq!(method, "GET");
            assert_eq!(url, "/pets");
            assert_eq!(headers, vec!["X-Trace: 1"]);
        }
        Commands::Routes { .. } => panic!("Expected Dispatch command"),
    }
}

#[tokio::test]
async fn test_execute_dispatch_echoes() {
    let cli = Cli::try_parse_from([
        "trailhead-probe",
        "dispatch",
        "--route",
        r"GET kitchen/(\d+)",
        "--url",
        "/kitchen/7?fries=golden",
    ])
    .unwrap();

    let printed = execute(cli).await.unwrap();
    let outcome: Value = serde_json::from_str(&printed).unwrap();
    assert_eq!(outcome["status"], 200);

    let body: Value = serde_json::from_str(outcome["body"].as_str().unwrap()).unwrap();
    assert_eq!(body["captures"][0], "7");
    assert_eq!(body["params"]["fries"], "golden");
    assert_eq!(body["method"], "GET");
}

#[tokio::test]
async fn test_execute_routes() {
    let cli = Cli::try_parse_from([
        "trailhead-probe",
        "routes",
        "--route",
        "GET a",
        "--route",
        "* b",
    ])
    .unwrap();
    let printed = execute(cli).await.unwrap();
    let lines: Vec<&str> = printed.lines().collect();
    assert_eq!(lines.len(), 2);
    assert!(lines[0].starts_with("GET ^a"));
    assert!(lines[1].starts_with("* ^b"));
}
