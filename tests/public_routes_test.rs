mod common;

use actix_web::test;
use serde_json::json;
use serial_test::serial;

use common::TestApp;

#[actix_rt::test]
#[serial]
async fn test_health_endpoint() {
    let test_app = TestApp::new();
    let app = test::init_service(test_app.create_app()).await;

    let req = test::TestRequest::get().uri("/health").to_request();

    let resp = test::call_service(&app, req).await;
    assert!(resp.status().is_success());
}

#[actix_rt::test]
#[serial]
async fn test_list_categories_returns_array() {
    let test_app = TestApp::new();
    let app = test::init_service(test_app.create_app()).await;

    let req = test::TestRequest::get().uri("/api/categories").to_request();

    let resp = test::call_service(&app, req).await;
    assert!(resp.status().is_success());

    let body: serde_json::Value = test::read_body_json(resp).await;
    assert!(body.is_array());
}

#[actix_rt::test]
#[serial]
async fn test_list_categories_accepts_lang_param() {
    let test_app = TestApp::new();
    let app = test::init_service(test_app.create_app()).await;

    for lang in ["en", "fr", "es", "de"] {
        let req = test::TestRequest::get()
            .uri(&format!("/api/categories?lang={}", lang))
            .to_request();

        let resp = test::call_service(&app, req).await;
        assert!(resp.status().is_success());
    }
}

#[actix_rt::test]
#[serial]
async fn test_unknown_category_slug_is_not_found() {
    let test_app = TestApp::new();
    let app = test::init_service(test_app.create_app()).await;

    let req = test::TestRequest::get()
        .uri("/api/categories/no-such-category")
        .to_request();

    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 404);
}

#[actix_rt::test]
#[serial]
async fn test_tour_and_package_detail_routes_exist() {
    let test_app = TestApp::new();
    let app = test::init_service(test_app.create_app()).await;

    for uri in [
        "/api/tours/3-day-sahara",
        "/api/packages/shared-camp",
    ] {
        let req = test::TestRequest::get().uri(uri).to_request();
        let resp = test::call_service(&app, req).await;
        // Route exists; only the document is missing.
        assert_eq!(resp.status(), 404);
    }
}

#[actix_rt::test]
#[serial]
async fn test_booking_submission_requires_fields() {
    let test_app = TestApp::new();
    let app = test::init_service(test_app.create_app()).await;

    let req = test::TestRequest::post()
        .uri("/api/bookings")
        .set_json(&json!({}))
        .to_request();

    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 400);
}

#[actix_rt::test]
#[serial]
async fn test_admin_mutations_are_not_on_public_paths() {
    let test_app = TestApp::new();
    let app = test::init_service(test_app.create_app()).await;

    let req = test::TestRequest::post()
        .uri("/api/categories")
        .set_json(&json!({"slug": "desert-tours"}))
        .to_request();

    let resp = test::call_service(&app, req).await;
    // Only GET is wired on the public categories path.
    assert!(resp.status() == 404 || resp.status() == 405);
}
