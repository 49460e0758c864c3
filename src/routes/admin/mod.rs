use actix_web::{web, HttpResponse, Responder};

use crate::middleware::auth::AuthMiddleware;
use crate::middleware::role_auth::RequireRole;
use crate::models::account::UserRole;
use crate::routes::{booking, catalog_error_response, category, package, tour};
use crate::services::catalog_service::CatalogService;

pub mod users;

pub fn config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/admin")
            .wrap(AuthMiddleware)
            .service(
                web::scope("/users")
                    .wrap(RequireRole::new(UserRole::Admin))
                    .route("", web::get().to(users::list_users))
                    .route("", web::post().to(users::create_user))
                    .route("/{id}", web::delete().to(users::delete_user)),
            )
            .service(
                web::scope("/catalog")
                    .wrap(RequireRole::new(UserRole::Admin))
                    .route("/reconcile", web::post().to(reconcile)),
            )
            .service(
                web::scope("")
                    .wrap(RequireRole::new(UserRole::Editor))
                    .route("/categories", web::post().to(category::create_category))
                    .route("/categories/{id}", web::put().to(category::update_category))
                    .route("/categories/{id}", web::delete().to(category::delete_category))
                    .route("/tours", web::post().to(tour::create_tour))
                    .route("/tours/{id}", web::put().to(tour::update_tour))
                    .route("/tours/{id}", web::delete().to(tour::delete_tour))
                    .route("/packages", web::post().to(package::create_package))
                    .route("/packages/{id}", web::put().to(package::update_package))
                    .route("/packages/{id}", web::delete().to(package::delete_package))
                    .route("/bookings", web::get().to(booking::get_bookings))
                    .route(
                        "/bookings/{id}/status",
                        web::put().to(booking::update_booking_status),
                    )
                    .route("/bookings/{id}", web::delete().to(booking::delete_booking)),
            ),
    );
}

/*
    POST /api/admin/catalog/reconcile
*/
async fn reconcile(catalog: web::Data<CatalogService>) -> impl Responder {
    match catalog.reconcile_references().await {
        Ok(report) => HttpResponse::Ok().json(report),
        Err(err) => catalog_error_response(err),
    }
}
