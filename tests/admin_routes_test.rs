mod common;

use actix_web::{cookie::Cookie, http::header, test, web, App, HttpResponse, Responder};
use mongodb::bson::oid::ObjectId;
use serial_test::serial;

use atlas_tours_api::middleware::auth::AuthMiddleware;
use atlas_tours_api::middleware::role_auth::RequireRole;
use atlas_tours_api::models::account::UserRole;
use atlas_tours_api::routes::auth::generate_token;

use common::TestApp;

async fn ok_handler() -> impl Responder {
    HttpResponse::Ok().json(serde_json::json!({"status": "OK"}))
}

// The real middleware stack in front of mock handlers, so token handling is
// tested end to end without a database.
fn protected_app() -> App<
    impl actix_web::dev::ServiceFactory<
        actix_web::dev::ServiceRequest,
        Config = (),
        Response = actix_web::dev::ServiceResponse,
        Error = actix_web::Error,
        InitError = (),
    >,
> {
    App::new().service(
        web::scope("/api/admin")
            .wrap(AuthMiddleware)
            .service(
                web::scope("/users")
                    .wrap(RequireRole::new(UserRole::Admin))
                    .route("", web::get().to(ok_handler)),
            )
            .service(
                web::scope("")
                    .wrap(RequireRole::new(UserRole::Editor))
                    .route("/categories", web::post().to(ok_handler)),
            ),
    )
}

fn token_for(role: &str) -> String {
    std::env::set_var("JWT_SECRET", "test_secret");
    generate_token("admin@example.com", ObjectId::new(), role).expect("token generation")
}

#[actix_rt::test]
#[serial]
async fn test_admin_routes_reject_missing_token() {
    let test_app = TestApp::new();
    let app = test::init_service(test_app.create_app()).await;

    for uri in ["/api/admin/users", "/api/admin/bookings"] {
        let req = test::TestRequest::get().uri(uri).to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), 401);
    }
}

#[actix_rt::test]
#[serial]
async fn test_middleware_rejects_missing_and_garbage_tokens() {
    std::env::set_var("JWT_SECRET", "test_secret");
    let app = test::init_service(protected_app()).await;

    let req = test::TestRequest::get().uri("/api/admin/users").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 401);

    let req = test::TestRequest::get()
        .uri("/api/admin/users")
        .insert_header((header::AUTHORIZATION, "Bearer not-a-jwt"))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 401);
}

#[actix_rt::test]
#[serial]
async fn test_editor_cannot_manage_users() {
    let app = test::init_service(protected_app()).await;
    let token = token_for("editor");

    let req = test::TestRequest::get()
        .uri("/api/admin/users")
        .insert_header((header::AUTHORIZATION, format!("Bearer {}", token)))
        .to_request();

    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 403);
}

#[actix_rt::test]
#[serial]
async fn test_admin_can_manage_users() {
    let app = test::init_service(protected_app()).await;
    let token = token_for("admin");

    let req = test::TestRequest::get()
        .uri("/api/admin/users")
        .insert_header((header::AUTHORIZATION, format!("Bearer {}", token)))
        .to_request();

    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 200);
}

#[actix_rt::test]
#[serial]
async fn test_editor_can_manage_catalog() {
    let app = test::init_service(protected_app()).await;
    let token = token_for("editor");

    let req = test::TestRequest::post()
        .uri("/api/admin/categories")
        .insert_header((header::AUTHORIZATION, format!("Bearer {}", token)))
        .set_json(&serde_json::json!({"slug": "desert-tours"}))
        .to_request();

    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 200);
}

#[actix_rt::test]
#[serial]
async fn test_cookie_token_is_accepted() {
    let app = test::init_service(protected_app()).await;
    let token = token_for("admin");

    let req = test::TestRequest::get()
        .uri("/api/admin/users")
        .cookie(Cookie::new("auth_token", token))
        .to_request();

    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 200);
}
