mod common;

use axum::http::{Method, StatusCode};
use common::{mint_token, read_json, TestApp};
use serde_json::{json, Value};

async fn create_product(app: &TestApp, body: Value) -> Value {
    let (status, created) = app
        .admin(Method::POST, "/api/v1/admin/products", Some(body))
        .await;
    assert_eq!(status, StatusCode::CREATED, "{created}");
    created["data"].clone()
}

#[tokio::test]
async fn admin_routes_require_an_admin_bearer_token() {
    let app = TestApp::new();

    let (status, body) =
        read_json(app.request(Method::GET, "/api/v1/admin/products", None, None).await).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"]["code"], "UNAUTHORIZED");

    let (status, _) = read_json(
        app.request(Method::GET, "/api/v1/admin/products", None, Some("garbage"))
            .await,
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let expired = mint_token(&["admin"], -3600);
    let (status, _) = read_json(
        app.request(Method::GET, "/api/v1/admin/products", None, Some(&expired))
            .await,
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let shopper = mint_token(&["customer"], 3600);
    let (status, body) = read_json(
        app.request(
            Method::POST,
            "/api/v1/admin/product-statuses",
            Some(json!({ "name": "HIDDEN" })),
            Some(&shopper),
        )
        .await,
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["error"]["code"], "FORBIDDEN");
}

#[tokio::test]
async fn product_lifecycle() {
    let app = TestApp::new();

    let product = create_product(
        &app,
        json!({
            "title": "Merino Crew Sweater",
            "shortDescription": "Fine gauge knit",
            "metadata": { "category": "knitwear" }
        }),
    )
    .await;
    assert_eq!(product["slug"], "merino-crew-sweater");
    assert_eq!(product["status"], "PUBLISHED");
    assert_eq!(product["metadata"]["category"], "knitwear");
    let id = product["id"].as_str().unwrap().to_string();

    let (status, fetched) = app
        .admin(Method::GET, &format!("/api/v1/admin/products/{id}"), None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(fetched["data"]["title"], "Merino Crew Sweater");

    let (status, updated) = app
        .admin(
            Method::PATCH,
            &format!("/api/v1/admin/products/{id}"),
            Some(json!({ "title": "Merino Cardigan", "status": "DRAFT" })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["data"]["slug"], "merino-cardigan");
    assert_eq!(updated["data"]["status"], "DRAFT");

    // drafts disappear from the storefront
    let (_, listing) = app.get("/api/v1/products").await;
    assert_eq!(listing["data"]["total"], 0);

    let (status, drafts) = app
        .admin(Method::GET, "/api/v1/admin/products?status=DRAFT", None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(drafts["data"]["total"], 1);

    let (status, body) = app
        .admin(Method::DELETE, &format!("/api/v1/admin/products/{id}"), None)
        .await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    assert_eq!(body, Value::Null);

    let (status, body) = app
        .admin(Method::GET, &format!("/api/v1/admin/products/{id}"), None)
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"]["message"], format!("Product {id} not found"));
}

#[tokio::test]
async fn product_validation_and_conflicts() {
    let app = TestApp::new();
    create_product(&app, json!({ "title": "Canvas Tote" })).await;

    let (status, body) = app
        .admin(
            Method::POST,
            "/api/v1/admin/products",
            Some(json!({ "title": "Canvas Tote" })),
        )
        .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"]["code"], "CONFLICT");

    let (status, body) = app
        .admin(
            Method::POST,
            "/api/v1/admin/products",
            Some(json!({ "title": "X" })),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], "PRODUCT_TITLE_TOO_SHORT");

    let (status, body) = app
        .admin(
            Method::POST,
            "/api/v1/admin/products",
            Some(json!({ "title": "Weekender", "status": "bogus status!" })),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST, "{body}");

    let (status, body) = app
        .admin(
            Method::POST,
            "/api/v1/admin/products",
            Some(json!({ "title": "Weekender", "categoryId": uuid::Uuid::new_v4() })),
        )
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"]["code"], "NOT_FOUND");
}

#[tokio::test]
async fn variants_inventory_and_images() {
    let app = TestApp::new();
    let product = create_product(&app, json!({ "title": "Field Jacket" })).await;
    let product_id = product["id"].as_str().unwrap().to_string();

    let (status, variant) = app
        .admin(
            Method::POST,
            &format!("/api/v1/admin/variants/{product_id}"),
            Some(json!({
                "name": "Olive / M",
                "skuPrefix": "FJ",
                "colorName": "Olive",
                "material": "Waxed Cotton",
                "price": "189.00"
            })),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED, "{variant}");
    let variant_id = variant["data"]["id"].as_str().unwrap().to_string();

    let (status, body) = app
        .admin(
            Method::POST,
            &format!("/api/v1/admin/variants/{product_id}"),
            Some(json!({ "name": "Broken", "price": "-1" })),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], "VALIDATION_ERROR");

    let (status, stock) = app
        .admin(
            Method::PATCH,
            &format!("/api/v1/admin/variants/{variant_id}/inventory"),
            Some(json!({ "quantity": 12, "reserved": 2 })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(stock["data"]["available"], 10);
    assert!(stock["data"]["sku"].as_str().unwrap().starts_with("FJ-"));

    let (status, _) = app
        .admin(
            Method::PATCH,
            &format!("/api/v1/admin/variants/{variant_id}/inventory"),
            Some(json!({ "quantity": 1, "reserved": 5 })),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, repriced) = app
        .admin(
            Method::PATCH,
            &format!("/api/v1/admin/variants/{variant_id}"),
            Some(json!({ "price": "159.00" })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(repriced["data"]["price"], "159.00");

    let images_uri = format!("/api/v1/admin/images/{product_id}");
    let (status, first) = app
        .admin(
            Method::POST,
            &images_uri,
            Some(json!({ "url": "https://cdn.example.com/fj-front.jpg" })),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(first["data"]["isPrimary"], true);

    let (_, second) = app
        .admin(
            Method::POST,
            &images_uri,
            Some(json!({ "url": "https://cdn.example.com/fj-back.jpg" })),
        )
        .await;
    assert_eq!(second["data"]["isPrimary"], false);
    let second_id = second["data"]["id"].as_str().unwrap().to_string();

    let (status, _) = app
        .admin(
            Method::PATCH,
            &format!("{images_uri}/{second_id}/primary"),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::OK);

    let (_, detail) = app.get("/api/v1/products/by-slug/field-jacket").await;
    assert_eq!(
        detail["data"]["primaryImage"]["url"],
        "https://cdn.example.com/fj-back.jpg"
    );
    assert_eq!(detail["data"]["priceMin"], "159.00");
    assert_eq!(detail["data"]["variants"][0]["inventory"][0]["quantity"], 12);

    let (status, _) = app
        .admin(Method::DELETE, &format!("{images_uri}/{second_id}"), None)
        .await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    let (_, images) = app.admin(Method::GET, &images_uri, None).await;
    assert_eq!(images["data"].as_array().unwrap().len(), 1);

    let (status, _) = app
        .admin(
            Method::DELETE,
            &format!("/api/v1/admin/variants/{variant_id}"),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    let (status, _) = app
        .admin(
            Method::DELETE,
            &format!("/api/v1/admin/variants/{variant_id}"),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn category_management() {
    let app = TestApp::new();

    let (status, created) = app
        .admin(
            Method::POST,
            "/api/v1/admin/categories",
            Some(json!({ "name": "Home Goods" })),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(created["data"]["slug"], "home-goods");
    let id = created["data"]["id"].as_str().unwrap().to_string();

    let (status, body) = app
        .admin(
            Method::POST,
            "/api/v1/admin/categories",
            Some(json!({ "name": "Home Goods" })),
        )
        .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(
        body["error"]["message"],
        "Category with name \"Home Goods\" already exists"
    );

    let (status, body) = app
        .admin(
            Method::POST,
            "/api/v1/admin/categories",
            Some(json!({ "name": "A" })),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], "CATEGORY_NAME_TOO_SHORT");

    let (status, renamed) = app
        .admin(
            Method::PATCH,
            &format!("/api/v1/admin/categories/{id}"),
            Some(json!({ "name": "Homeware" })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(renamed["data"]["slug"], "homeware");

    let (status, public) = app.get("/api/v1/categories/homeware").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(public["data"]["name"], "Homeware");

    let (_, list) = app.get("/api/v1/categories?limit=10").await;
    assert_eq!(list["data"]["total"], 1);
    assert_eq!(list["data"]["limit"], 10);

    create_product(&app, json!({ "title": "Stoneware Bowl", "categoryId": id })).await;

    let (status, _) = app
        .admin(Method::DELETE, &format!("/api/v1/admin/categories/{id}"), None)
        .await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, _) = app.get("/api/v1/categories/homeware").await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    // the product survives without a category
    let (status, detail) = app.get("/api/v1/products/by-slug/stoneware-bowl").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(detail["data"]["category"], Value::Null);
}

#[tokio::test]
async fn product_statuses() {
    let app = TestApp::new();

    let (status, body) = app.get("/api/v1/product-statuses").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"], json!(["ARCHIVED", "DRAFT", "PUBLISHED"]));

    let (status, created) = app
        .admin(
            Method::POST,
            "/api/v1/admin/product-statuses",
            Some(json!({ "name": "preorder" })),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(created["data"], "PREORDER");

    let (status, _) = app
        .admin(
            Method::POST,
            "/api/v1/admin/product-statuses",
            Some(json!({ "name": "PREORDER" })),
        )
        .await;
    assert_eq!(status, StatusCode::CONFLICT);

    let product = create_product(&app, json!({ "title": "Pre-order Boots", "status": "PREORDER" })).await;
    assert_eq!(product["status"], "PREORDER");
}
