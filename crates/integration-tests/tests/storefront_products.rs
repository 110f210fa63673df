//! Integration tests for the product route.
//!
//! Run with: cargo test -p hustlestack-integration-tests

#![allow(clippy::unwrap_used)]

use axum::http::StatusCode;
use hustlestack_integration_tests::{app, get, product, shirt_backend, variant};
use serde_json::json;

#[tokio::test]
async fn test_redirects_to_first_variant() {
    let app = app(shirt_backend());
    let resp = get(&app, "/products/shirt").await;

    assert_eq!(resp.status, StatusCode::FOUND);
    assert_eq!(
        resp.header("location"),
        Some("/products/shirt?Color=Red&Size=S")
    );
}

#[tokio::test]
async fn test_redirect_keeps_unrelated_params() {
    let app = app(shirt_backend());
    let resp = get(&app, "/products/shirt?ref=home&utm_source=mail").await;

    assert_eq!(resp.status, StatusCode::FOUND);
    assert_eq!(
        resp.header("location"),
        Some("/products/shirt?Color=Red&Size=S&ref=home&utm_source=mail")
    );
}

#[tokio::test]
async fn test_unknown_combination_redirects() {
    let app = app(shirt_backend());
    let resp = get(&app, "/products/shirt?Size=XL").await;

    assert_eq!(resp.status, StatusCode::FOUND);
    assert_eq!(
        resp.header("location"),
        Some("/products/shirt?Color=Red&Size=S")
    );
}

#[tokio::test]
async fn test_selected_variant_page() {
    let app = app(shirt_backend());
    let resp = get(&app, "/products/shirt?Size=S&Color=Blue").await;
    assert_eq!(resp.status, StatusCode::OK);

    let view = resp.json();
    assert_eq!(view["pageTitle"], "Shirt | HustleStack");
    assert_eq!(view["selectedVariantId"], "gid://shopify/ProductVariant/3");
    assert_eq!(view["price"], json!({"price": "$22.50", "compareAtPrice": null}));
    assert_eq!(view["variantsError"], serde_json::Value::Null);
    assert_eq!(view["addToCart"]["enabled"], true);
    assert_eq!(view["addToCart"]["label"], "Add to cart");
    assert_eq!(
        view["addToCart"]["intent"],
        json!({
            "action": "LinesAdd",
            "inputs": {"lines": [{"merchandiseId": "gid://shopify/ProductVariant/3", "quantity": 1}]}
        })
    );

    let size = &view["options"][0];
    assert_eq!(size["name"], "Size");
    assert_eq!(
        size["values"][1],
        json!({
            "value": "M",
            "to": "/products/shirt?Color=Blue&Size=M",
            "isActive": false,
            "isAvailable": true
        })
    );
    assert_eq!(size["values"][0]["isActive"], true);
}

#[tokio::test]
async fn test_sold_out_variant() {
    let app = app(shirt_backend());
    let view = get(&app, "/products/shirt?Size=M&Color=Red").await.json();

    assert_eq!(view["addToCart"]["enabled"], false);
    assert_eq!(view["addToCart"]["label"], "Sold out");
    assert_eq!(view["addToCart"]["intent"], serde_json::Value::Null);
}

#[tokio::test]
async fn test_default_variant_product() {
    let app = app(shirt_backend());
    let resp = get(&app, "/products/mug").await;
    assert_eq!(resp.status, StatusCode::OK);

    let view = resp.json();
    assert_eq!(view["selectedVariantId"], "gid://shopify/ProductVariant/10");
    assert_eq!(view["options"], json!([]));
    assert_eq!(view["price"]["price"], "$12.00");
}

#[tokio::test]
async fn test_missing_product_is_not_found() {
    let app = app(shirt_backend());
    let resp = get(&app, "/products/hat").await;
    assert_eq!(resp.status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_variants_failure_degrades() {
    let backend = shirt_backend();
    backend.fail_variants(true);
    let app = app(backend);

    let resp = get(&app, "/products/shirt?Size=S&Color=Red").await;
    assert_eq!(resp.status, StatusCode::OK);

    let view = resp.json();
    assert_eq!(
        view["variantsError"],
        "There was a problem loading product variants"
    );
    let all_unavailable = view["options"]
        .as_array()
        .unwrap()
        .iter()
        .flat_map(|option| option["values"].as_array().unwrap())
        .all(|value| value["isAvailable"] == false);
    assert!(all_unavailable);
    // The page itself still renders.
    assert_eq!(view["addToCart"]["enabled"], true);
}

#[tokio::test]
async fn test_redirect_encodes_handle() {
    let backend = shirt_backend().with_product(
        product("summer tee", "Summer Tee", &[("Size", &["S", "M"])]),
        vec![
            variant(20, &[("Size", "S")], true, "15.00"),
            variant(21, &[("Size", "M")], true, "15.00"),
        ],
    );
    let app = app(backend);

    let resp = get(&app, "/products/summer%20tee").await;
    assert_eq!(resp.status, StatusCode::FOUND);
    assert_eq!(resp.header("location"), Some("/products/summer%20tee?Size=S"));
}
