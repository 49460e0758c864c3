use actix_cors::Cors;
use actix_web::{middleware::Logger, web, App, HttpResponse, Responder};

// Mock route tree mirroring src/main.rs so route-shape and auth tests run
// without a live MongoDB or media store.
pub struct TestApp;

impl TestApp {
    pub fn new() -> Self {
        Self
    }

    pub fn create_app(
        &self,
    ) -> App<
        impl actix_web::dev::ServiceFactory<
            actix_web::dev::ServiceRequest,
            Config = (),
            Response = actix_web::dev::ServiceResponse<impl actix_web::body::MessageBody>,
            Error = actix_web::Error,
            InitError = (),
        >,
    > {
        App::new()
            .wrap(
                Cors::default()
                    .allow_any_origin()
                    .allow_any_method()
                    .allow_any_header()
                    .max_age(3600),
            )
            .wrap(Logger::default())
            .route("/health", web::get().to(health_check))
            .route("/api/categories", web::get().to(empty_list))
            .route("/api/categories/{slug}", web::get().to(not_found))
            .route("/api/categories/{slug}/tours", web::get().to(empty_list))
            .route("/api/tours", web::get().to(empty_list))
            .route("/api/tours/{slug}", web::get().to(not_found))
            .route("/api/tours/{slug}/packages", web::get().to(empty_list))
            .route("/api/packages/{slug}", web::get().to(not_found))
            .route("/api/bookings", web::post().to(bad_request))
            .service(
                web::scope("/api/auth")
                    .route("/signin", web::post().to(unauthorized_handler))
                    .route("/signout", web::post().to(ok_handler))
                    .route("/forgot-password", web::post().to(ok_handler))
                    .route("/reset-password", web::post().to(bad_request))
                    .route("/session", web::get().to(unauthorized_handler)),
            )
            .service(
                web::scope("/api/admin")
                    .route("/users", web::get().to(unauthorized_handler))
                    .route("/users", web::post().to(unauthorized_handler))
                    .route("/users/{id}", web::delete().to(unauthorized_handler))
                    .route("/catalog/reconcile", web::post().to(unauthorized_handler))
                    .route("/categories", web::post().to(unauthorized_handler))
                    .route("/categories/{id}", web::put().to(unauthorized_handler))
                    .route("/categories/{id}", web::delete().to(unauthorized_handler))
                    .route("/tours", web::post().to(unauthorized_handler))
                    .route("/tours/{id}", web::put().to(unauthorized_handler))
                    .route("/tours/{id}", web::delete().to(unauthorized_handler))
                    .route("/packages", web::post().to(unauthorized_handler))
                    .route("/packages/{id}", web::put().to(unauthorized_handler))
                    .route("/packages/{id}", web::delete().to(unauthorized_handler))
                    .route("/bookings", web::get().to(unauthorized_handler))
                    .route("/bookings/{id}/status", web::put().to(unauthorized_handler))
                    .route("/bookings/{id}", web::delete().to(unauthorized_handler)),
            )
    }
}

async fn health_check() -> impl Responder {
    HttpResponse::Ok().body("OK")
}

async fn ok_handler() -> impl Responder {
    HttpResponse::Ok().body("OK")
}

async fn empty_list() -> impl Responder {
    HttpResponse::Ok().json(serde_json::json!([]))
}

async fn not_found() -> impl Responder {
    HttpResponse::NotFound().json(serde_json::json!({"error": "Not found"}))
}

async fn bad_request() -> impl Responder {
    HttpResponse::BadRequest().json(serde_json::json!({"error": "Bad request"}))
}

async fn unauthorized_handler() -> impl Responder {
    HttpResponse::Unauthorized().json(serde_json::json!({"error": "Unauthorized"}))
}
