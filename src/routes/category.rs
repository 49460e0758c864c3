use actix_web::{web, HttpResponse, Responder};
use futures::TryStreamExt;
use mongodb::{bson::doc, Client};
use std::sync::Arc;

use crate::db::mongo::database_name;
use crate::models::category::{Category, CategoryView};
use crate::models::tour::{Tour, TourView};
use crate::routes::{catalog_error_response, LangQuery};
use crate::services::catalog_service::{parse_object_id, CatalogService, CATEGORIES, TOURS};

/*
    GET /api/categories?lang=
*/
pub async fn get_categories(
    data: web::Data<Arc<Client>>,
    query: web::Query<LangQuery>,
) -> impl Responder {
    let client = data.into_inner();
    let collection: mongodb::Collection<Category> =
        client.database(&database_name()).collection(CATEGORIES);

    match collection.find(doc! {}).await {
        Ok(cursor) => match cursor.try_collect::<Vec<Category>>().await {
            Ok(categories) => {
                let lang = query.lang();
                let views: Vec<CategoryView> =
                    categories.iter().map(|c| c.localize(lang)).collect();
                HttpResponse::Ok().json(views)
            }
            Err(err) => {
                eprintln!("Failed to collect documents: {:?}", err);
                HttpResponse::InternalServerError().body("Failed to collect categories.")
            }
        },
        Err(err) => {
            eprintln!("Failed to find documents: {:?}", err);
            HttpResponse::InternalServerError().body("Failed to find categories.")
        }
    }
}

/*
    GET /api/categories/{slug}?lang=
*/
pub async fn get_category_by_slug(
    path: web::Path<String>,
    data: web::Data<Arc<Client>>,
    query: web::Query<LangQuery>,
) -> impl Responder {
    let client = data.into_inner();
    let collection: mongodb::Collection<Category> =
        client.database(&database_name()).collection(CATEGORIES);

    match collection.find_one(doc! { "slug": path.into_inner() }).await {
        Ok(Some(category)) => HttpResponse::Ok().json(category.localize(query.lang())),
        Ok(None) => HttpResponse::NotFound().body("Category not found"),
        Err(err) => {
            eprintln!("Failed to retrieve category: {:?}", err);
            HttpResponse::InternalServerError().body("Failed to retrieve category")
        }
    }
}

/*
    GET /api/categories/{slug}/tours?lang=
*/
pub async fn get_category_tours(
    path: web::Path<String>,
    data: web::Data<Arc<Client>>,
    query: web::Query<LangQuery>,
) -> impl Responder {
    let client = data.into_inner();
    let db = client.database(&database_name());
    let categories: mongodb::Collection<Category> = db.collection(CATEGORIES);

    let category = match categories.find_one(doc! { "slug": path.into_inner() }).await {
        Ok(Some(category)) => category,
        Ok(None) => return HttpResponse::NotFound().body("Category not found"),
        Err(err) => {
            eprintln!("Failed to retrieve category: {:?}", err);
            return HttpResponse::InternalServerError().body("Failed to retrieve category");
        }
    };

    let tours: mongodb::Collection<Tour> = db.collection(TOURS);
    match tours
        .find(doc! { "category_id": category.id.unwrap_or_default() })
        .await
    {
        Ok(cursor) => match cursor.try_collect::<Vec<Tour>>().await {
            Ok(tours) => {
                let lang = query.lang();
                let views: Vec<TourView> = tours.iter().map(|t| t.localize(lang)).collect();
                HttpResponse::Ok().json(views)
            }
            Err(err) => {
                eprintln!("Failed to collect documents: {:?}", err);
                HttpResponse::InternalServerError().body("Failed to collect tours.")
            }
        },
        Err(err) => {
            eprintln!("Failed to find documents: {:?}", err);
            HttpResponse::InternalServerError().body("Failed to find tours.")
        }
    }
}

/*
    POST /api/admin/categories
*/
pub async fn create_category(
    catalog: web::Data<CatalogService>,
    input: web::Json<Category>,
) -> impl Responder {
    match catalog.create_category(input.into_inner()).await {
        Ok(category) => HttpResponse::Ok().json(category),
        Err(err) => catalog_error_response(err),
    }
}

/*
    PUT /api/admin/categories/{id}
*/
pub async fn update_category(
    path: web::Path<String>,
    catalog: web::Data<CatalogService>,
    input: web::Json<Category>,
) -> impl Responder {
    let id = match parse_object_id(&path.into_inner()) {
        Ok(id) => id,
        Err(err) => return catalog_error_response(err),
    };

    match catalog.update_category(id, input.into_inner()).await {
        Ok(category) => HttpResponse::Ok().json(category),
        Err(err) => catalog_error_response(err),
    }
}

/*
    DELETE /api/admin/categories/{id}
*/
pub async fn delete_category(
    path: web::Path<String>,
    catalog: web::Data<CatalogService>,
) -> impl Responder {
    let id = match parse_object_id(&path.into_inner()) {
        Ok(id) => id,
        Err(err) => return catalog_error_response(err),
    };

    match catalog.delete_category(id).await {
        Ok(category) => HttpResponse::Ok().json(category),
        Err(err) => catalog_error_response(err),
    }
}
