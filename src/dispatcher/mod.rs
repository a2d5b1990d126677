//! # Dispatcher Module
//!
//! Glues the resolver to the response drawer. For every request the
//! dispatcher:
//!
//! 1. negotiates the content type from `Accept` (before any route is tried)
//! 2. resolves the request against the route table
//! 3. decodes the raw body by `Content-Type` (JSON or form)
//! 4. merges query parameters and body fields into the handler's params
//! 5. invokes the handler and returns the drawn outcome
//!
//! ## Content Negotiation
//!
//! The router only speaks JSON. The `Accept` header is split into tokens on
//! `,` or `;`:
//!
//! | mode       | header                        | result |
//! |------------|-------------------------------|--------|
//! | strict     | missing or empty              | 406    |
//! | strict     | lists `application/json`      | ok     |
//! | strict     | `*/*` only                    | 406    |
//! | non-strict | missing or empty              | ok     |
//! | non-strict | `application/json` or `*/*`   | ok     |
//! | non-strict | anything else                 | 406    |
//!
//! ## Parameters
//!
//! Query string values are defaults; fields of an object body override them.
//! An array body becomes the parameters as-is. Keys repeated in a query string
//! or form body are collected into arrays.
//!
//! ```rust
//! use serde_json::json;
//! use trailhead::dispatcher::{decode_body, merge_params};
//! use trailhead::request::parse_form;
//!
//! let body = decode_body(r#"{"fries": "crispy"}"#, Some("application/json")).unwrap();
//! let params = merge_params(parse_form("fries=golden&drink=coke"), body.as_ref());
//! assert_eq!(params, json!({ "fries": "crispy", "drink": "coke" }));
//! ```

mod core;

pub use core::{captures_to_values, decode_body, merge_params, negotiate, JSON};

pub(crate) use core::Dispatcher;
