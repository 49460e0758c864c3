use std::{env, path::PathBuf};

use actix_cors::Cors;
use actix_web::{middleware::Logger, web, App, HttpServer};
use env_logger::Env;

use atlas_tours_api::db;
use atlas_tours_api::middleware;
use atlas_tours_api::routes;
use atlas_tours_api::services::catalog_service::CatalogService;

const HOST: &str = "0.0.0.0";
const PORT: u16 = 8080;

#[cfg(debug_assertions)]
fn setup_credentials() {
    let credentials_path = PathBuf::from("credentials/service-account.json");
    if credentials_path.exists() {
        env::set_var(
            "GOOGLE_APPLICATION_CREDENTIALS",
            credentials_path.to_str().unwrap(),
        );
    }
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    println!("Application starting...");

    if cfg!(debug_assertions) {
        dotenv::dotenv().ok();
    }

    #[cfg(debug_assertions)]
    setup_credentials();

    env_logger::init_from_env(Env::default().default_filter_or("info"));

    let host = std::env::var("HOST").unwrap_or_else(|_| HOST.to_string());
    let port: u16 = std::env::var("PORT")
        .unwrap_or_else(|_| PORT.to_string())
        .parse()
        .unwrap_or(PORT);
    println!("Attempting to bind to {}:{}", host, port);

    let mongo_uri = std::env::var("MONGODB_URI").expect("MONGODB_URI must be set");
    let client = db::mongo::create_mongo_client(&mongo_uri).await;
    println!("MongoDB connection established");

    let catalog = web::Data::new(CatalogService::new(client.clone()).await);

    println!("Starting HTTP server...");

    HttpServer::new(move || {
        App::new()
            .wrap(Logger::default())
            .wrap(
                Cors::default()
                    .allow_any_origin()
                    .allow_any_method()
                    .allow_any_header()
                    .supports_credentials()
                    .max_age(3600),
            )
            .route("/health", web::get().to(|| async { "OK" }))
            .app_data(web::Data::new(client.clone()))
            .app_data(catalog.clone())
            .service(
                web::scope("/api")
                    .service(
                        web::scope("/auth")
                            .route("/signin", web::post().to(routes::auth::signin))
                            .route("/signout", web::post().to(routes::auth::signout))
                            .route(
                                "/forgot-password",
                                web::post().to(routes::auth::forgot_password),
                            )
                            .route(
                                "/reset-password",
                                web::post().to(routes::auth::reset_password),
                            )
                            .service(
                                web::scope("")
                                    .wrap(middleware::auth::AuthMiddleware)
                                    .route("/session", web::get().to(routes::auth::user_session)),
                            ),
                    )
                    .configure(routes::admin::config)
                    .service(
                        web::scope("")
                            .route("/categories", web::get().to(routes::category::get_categories))
                            .route(
                                "/categories/{slug}",
                                web::get().to(routes::category::get_category_by_slug),
                            )
                            .route(
                                "/categories/{slug}/tours",
                                web::get().to(routes::category::get_category_tours),
                            )
                            .route("/tours", web::get().to(routes::tour::get_tours))
                            .route(
                                "/tours/{slug}",
                                web::get().to(routes::tour::get_tour_by_slug),
                            )
                            .route(
                                "/tours/{slug}/packages",
                                web::get().to(routes::tour::get_tour_packages),
                            )
                            .route(
                                "/packages/{slug}",
                                web::get().to(routes::package::get_package_by_slug),
                            )
                            .route("/bookings", web::post().to(routes::booking::create_booking)),
                    ),
            )
    })
    .bind((host, port))?
    .run()
    .await
}
