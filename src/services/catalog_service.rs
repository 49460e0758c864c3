use chrono::Utc;
use futures::TryStreamExt;
use mongodb::bson::{doc, oid::ObjectId, to_bson};
use mongodb::error::WriteError;
use mongodb::{Client, Collection};
use serde::Serialize;
use std::sync::Arc;

use crate::db::mongo::database_name;
use crate::models::category::Category;
use crate::models::locale::LocalizedText;
use crate::models::package::TourPackage;
use crate::models::tour::Tour;
use crate::services::image_service::{GcsMediaStore, ImageService, MediaOperations};

pub const CATEGORIES: &str = "categories";
pub const TOURS: &str = "tours";
pub const PACKAGES: &str = "packages";

#[derive(Debug)]
pub enum CatalogError {
    NotFound(String),
    Conflict(String),
    InvalidInput(String),
    InvalidId(String),
    Database(mongodb::error::Error),
}

impl std::fmt::Display for CatalogError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CatalogError::NotFound(what) => write!(f, "{} not found", what),
            CatalogError::Conflict(msg) => write!(f, "Conflict: {}", msg),
            CatalogError::InvalidInput(msg) => write!(f, "Invalid input: {}", msg),
            CatalogError::InvalidId(raw) => write!(f, "Invalid id: {}", raw),
            CatalogError::Database(err) => write!(f, "Database error: {}", err),
        }
    }
}

impl std::error::Error for CatalogError {}

impl From<mongodb::error::Error> for CatalogError {
    fn from(err: mongodb::error::Error) -> Self {
        // A duplicate-key write on the unique slug index is a caller error,
        // not a server fault.
        if let mongodb::error::ErrorKind::Write(mongodb::error::WriteFailure::WriteError(
            WriteError { code: 11000, .. },
        )) = *err.kind
        {
            return CatalogError::Conflict("slug already in use".to_string());
        }
        CatalogError::Database(err)
    }
}

pub fn parse_object_id(raw: &str) -> Result<ObjectId, CatalogError> {
    ObjectId::parse_str(raw).map_err(|_| CatalogError::InvalidId(raw.to_string()))
}

/// Lowercase letters, digits and hyphens, non-empty, no leading/trailing
/// hyphen.
pub fn is_valid_slug(slug: &str) -> bool {
    !slug.is_empty()
        && !slug.starts_with('-')
        && !slug.ends_with('-')
        && slug
            .chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-')
}

#[derive(Debug, Serialize, Default, PartialEq, Eq)]
pub struct ReconcileReport {
    pub categories_repaired: u64,
    pub tours_repaired: u64,
}

/// Keeps the Category -> Tour -> Package hierarchy consistent: slug
/// uniqueness, parent existence on create, and the parent-side child-id
/// arrays that mirror each child's parent reference.
///
/// Writes are two sequential document updates, not a transaction. A failure
/// after the primary document mutation is logged and the operation still
/// succeeds; `reconcile_references` repairs whatever that leaves behind.
///
/// Both external handles are injected at construction: the mongo client,
/// and the media store used for best-effort image release on delete.
pub struct CatalogService<M: MediaOperations = GcsMediaStore> {
    client: Arc<Client>,
    db_name: String,
    cascade_delete: bool,
    images: Option<ImageService<M>>,
}

impl CatalogService {
    pub async fn new(client: Arc<Client>) -> Self {
        let cascade_delete = std::env::var("CATALOG_CASCADE_DELETE")
            .map(|v| v == "true" || v == "1")
            .unwrap_or(false);

        let images = match ImageService::new().await {
            Ok(images) => Some(images),
            Err(e) => {
                log::warn!("Media store not configured; image cleanup disabled: {}", e);
                None
            }
        };

        Self {
            client,
            db_name: database_name(),
            cascade_delete,
            images,
        }
    }
}

impl<M: MediaOperations> CatalogService<M> {
    pub fn with_options(
        client: Arc<Client>,
        db_name: &str,
        cascade_delete: bool,
        images: Option<ImageService<M>>,
    ) -> Self {
        Self {
            client,
            db_name: db_name.to_string(),
            cascade_delete,
            images,
        }
    }

    fn categories(&self) -> Collection<Category> {
        self.client.database(&self.db_name).collection(CATEGORIES)
    }

    fn tours(&self) -> Collection<Tour> {
        self.client.database(&self.db_name).collection(TOURS)
    }

    fn packages(&self) -> Collection<TourPackage> {
        self.client.database(&self.db_name).collection(PACKAGES)
    }

    async fn release_images_best_effort(&self, urls: &[String]) {
        if urls.is_empty() {
            return;
        }
        match &self.images {
            Some(images) => images.release_images(urls).await,
            None => log::warn!("No media store, leaving {} image(s) in place", urls.len()),
        }
    }

    // ---- Categories ----

    pub async fn create_category(&self, mut category: Category) -> Result<Category, CatalogError> {
        validate_catalog_text(&category.title, &category.short_description, &category.description)?;
        if !is_valid_slug(&category.slug) {
            return Err(CatalogError::InvalidInput(format!(
                "slug '{}' is not URL-safe",
                category.slug
            )));
        }

        if self
            .categories()
            .find_one(doc! { "slug": &category.slug })
            .await?
            .is_some()
        {
            return Err(CatalogError::Conflict(format!(
                "a category with slug '{}' already exists",
                category.slug
            )));
        }

        let now = Utc::now();
        category.id = None;
        category.tours = Vec::new();
        category.created_at = Some(now);
        category.updated_at = Some(now);

        let result = self.categories().insert_one(&category).await?;
        category.id = result.inserted_id.as_object_id();
        Ok(category)
    }

    pub async fn update_category(
        &self,
        id: ObjectId,
        input: Category,
    ) -> Result<Category, CatalogError> {
        validate_catalog_text(&input.title, &input.short_description, &input.description)?;
        if !is_valid_slug(&input.slug) {
            return Err(CatalogError::InvalidInput(format!(
                "slug '{}' is not URL-safe",
                input.slug
            )));
        }

        let mut existing = self
            .categories()
            .find_one(doc! { "_id": id })
            .await?
            .ok_or_else(|| CatalogError::NotFound("Category".to_string()))?;

        // Keeping one's own slug is not a collision.
        if self
            .categories()
            .find_one(doc! { "slug": &input.slug, "_id": { "$ne": id } })
            .await?
            .is_some()
        {
            return Err(CatalogError::Conflict(format!(
                "a category with slug '{}' already exists",
                input.slug
            )));
        }

        let now = Utc::now();
        let update = doc! { "$set": {
            "title": to_bson(&input.title).map_err(db_from_bson)?,
            "short_description": to_bson(&input.short_description).map_err(db_from_bson)?,
            "description": to_bson(&input.description).map_err(db_from_bson)?,
            "slug": &input.slug,
            "images": input.images.clone(),
            "updated_at": to_bson(&now).map_err(db_from_bson)?,
        }};
        self.categories().update_one(doc! { "_id": id }, update).await?;

        existing.title = input.title;
        existing.short_description = input.short_description;
        existing.description = input.description;
        existing.slug = input.slug;
        existing.images = input.images;
        existing.updated_at = Some(now);
        Ok(existing)
    }

    pub async fn delete_category(&self, id: ObjectId) -> Result<Category, CatalogError> {
        let category = self
            .categories()
            .find_one(doc! { "_id": id })
            .await?
            .ok_or_else(|| CatalogError::NotFound("Category".to_string()))?;

        if self.cascade_delete {
            let tour_ids: Vec<ObjectId> = self
                .tours()
                .find(doc! { "category_id": id })
                .await?
                .try_collect::<Vec<Tour>>()
                .await?
                .into_iter()
                .filter_map(|t| t.id)
                .collect();

            for tour_id in tour_ids {
                if let Err(e) = self.delete_tour(tour_id).await {
                    log::warn!("Cascade delete of tour {} failed: {}", tour_id, e);
                }
            }
        }

        self.release_images_best_effort(&category.images).await;
        self.categories().delete_one(doc! { "_id": id }).await?;
        Ok(category)
    }

    // ---- Tours ----

    pub async fn create_tour(&self, mut tour: Tour) -> Result<Tour, CatalogError> {
        validate_catalog_text(&tour.title, &tour.short_description, &tour.description)?;
        if !is_valid_slug(&tour.slug) {
            return Err(CatalogError::InvalidInput(format!(
                "slug '{}' is not URL-safe",
                tour.slug
            )));
        }

        if self
            .categories()
            .find_one(doc! { "_id": tour.category_id })
            .await?
            .is_none()
        {
            return Err(CatalogError::NotFound("Category".to_string()));
        }

        if self
            .tours()
            .find_one(doc! { "slug": &tour.slug })
            .await?
            .is_some()
        {
            return Err(CatalogError::Conflict(format!(
                "a tour with slug '{}' already exists",
                tour.slug
            )));
        }

        let now = Utc::now();
        tour.id = None;
        tour.packages = Vec::new();
        tour.created_at = Some(now);
        tour.updated_at = Some(now);

        let result = self.tours().insert_one(&tour).await?;
        tour.id = result.inserted_id.as_object_id();

        // Second write of the two-step create. Demoted to best-effort once
        // the tour document exists; reconciliation repairs a miss.
        if let Some(tour_id) = tour.id {
            if let Err(e) = self
                .categories()
                .update_one(
                    doc! { "_id": tour.category_id },
                    doc! { "$addToSet": { "tours": tour_id } },
                )
                .await
            {
                log::warn!(
                    "Tour {} created but category back-reference update failed: {}",
                    tour_id,
                    e
                );
            }
        }

        Ok(tour)
    }

    pub async fn update_tour(&self, id: ObjectId, input: Tour) -> Result<Tour, CatalogError> {
        validate_catalog_text(&input.title, &input.short_description, &input.description)?;
        if !is_valid_slug(&input.slug) {
            return Err(CatalogError::InvalidInput(format!(
                "slug '{}' is not URL-safe",
                input.slug
            )));
        }

        let mut existing = self
            .tours()
            .find_one(doc! { "_id": id })
            .await?
            .ok_or_else(|| CatalogError::NotFound("Tour".to_string()))?;

        if self
            .tours()
            .find_one(doc! { "slug": &input.slug, "_id": { "$ne": id } })
            .await?
            .is_some()
        {
            return Err(CatalogError::Conflict(format!(
                "a tour with slug '{}' already exists",
                input.slug
            )));
        }

        let now = Utc::now();
        let update = doc! { "$set": {
            "title": to_bson(&input.title).map_err(db_from_bson)?,
            "short_description": to_bson(&input.short_description).map_err(db_from_bson)?,
            "description": to_bson(&input.description).map_err(db_from_bson)?,
            "slug": &input.slug,
            "images": input.images.clone(),
            "updated_at": to_bson(&now).map_err(db_from_bson)?,
        }};
        self.tours().update_one(doc! { "_id": id }, update).await?;

        existing.title = input.title;
        existing.short_description = input.short_description;
        existing.description = input.description;
        existing.slug = input.slug;
        existing.images = input.images;
        existing.updated_at = Some(now);
        Ok(existing)
    }

    pub async fn delete_tour(&self, id: ObjectId) -> Result<Tour, CatalogError> {
        let tour = self
            .tours()
            .find_one(doc! { "_id": id })
            .await?
            .ok_or_else(|| CatalogError::NotFound("Tour".to_string()))?;

        // Detach from the owning category first. A missing category (already
        // deleted) matches nothing and is a no-op, not an error.
        if let Err(e) = self
            .categories()
            .update_one(
                doc! { "_id": tour.category_id },
                doc! { "$pull": { "tours": id } },
            )
            .await
        {
            log::warn!("Could not detach tour {} from its category: {}", id, e);
        }

        if self.cascade_delete {
            let package_ids: Vec<ObjectId> = self
                .packages()
                .find(doc! { "tour_id": id })
                .await?
                .try_collect::<Vec<TourPackage>>()
                .await?
                .into_iter()
                .filter_map(|p| p.id)
                .collect();

            for package_id in package_ids {
                if let Err(e) = self.delete_package(package_id).await {
                    log::warn!("Cascade delete of package {} failed: {}", package_id, e);
                }
            }
        }

        self.release_images_best_effort(&tour.images).await;
        self.tours().delete_one(doc! { "_id": id }).await?;
        Ok(tour)
    }

    // ---- Packages ----

    pub async fn create_package(&self, mut pkg: TourPackage) -> Result<TourPackage, CatalogError> {
        validate_catalog_text(&pkg.title, &pkg.short_description, &pkg.description)?;
        if !is_valid_slug(&pkg.slug) {
            return Err(CatalogError::InvalidInput(format!(
                "slug '{}' is not URL-safe",
                pkg.slug
            )));
        }

        if self
            .tours()
            .find_one(doc! { "_id": pkg.tour_id })
            .await?
            .is_none()
        {
            return Err(CatalogError::NotFound("Tour".to_string()));
        }

        if self
            .packages()
            .find_one(doc! { "slug": &pkg.slug })
            .await?
            .is_some()
        {
            return Err(CatalogError::Conflict(format!(
                "a package with slug '{}' already exists",
                pkg.slug
            )));
        }

        let now = Utc::now();
        pkg.id = None;
        pkg.created_at = Some(now);
        pkg.updated_at = Some(now);

        let result = self.packages().insert_one(&pkg).await?;
        pkg.id = result.inserted_id.as_object_id();

        if let Some(pkg_id) = pkg.id {
            if let Err(e) = self
                .tours()
                .update_one(
                    doc! { "_id": pkg.tour_id },
                    doc! { "$addToSet": { "packages": pkg_id } },
                )
                .await
            {
                log::warn!(
                    "Package {} created but tour back-reference update failed: {}",
                    pkg_id,
                    e
                );
            }
        }

        Ok(pkg)
    }

    pub async fn update_package(
        &self,
        id: ObjectId,
        input: TourPackage,
    ) -> Result<TourPackage, CatalogError> {
        validate_catalog_text(&input.title, &input.short_description, &input.description)?;
        if !is_valid_slug(&input.slug) {
            return Err(CatalogError::InvalidInput(format!(
                "slug '{}' is not URL-safe",
                input.slug
            )));
        }

        let mut existing = self
            .packages()
            .find_one(doc! { "_id": id })
            .await?
            .ok_or_else(|| CatalogError::NotFound("Package".to_string()))?;

        if self
            .packages()
            .find_one(doc! { "slug": &input.slug, "_id": { "$ne": id } })
            .await?
            .is_some()
        {
            return Err(CatalogError::Conflict(format!(
                "a package with slug '{}' already exists",
                input.slug
            )));
        }

        let now = Utc::now();
        let update = doc! { "$set": {
            "title": to_bson(&input.title).map_err(db_from_bson)?,
            "short_description": to_bson(&input.short_description).map_err(db_from_bson)?,
            "description": to_bson(&input.description).map_err(db_from_bson)?,
            "slug": &input.slug,
            "itinerary": to_bson(&input.itinerary).map_err(db_from_bson)?,
            "tours_included": to_bson(&input.tours_included).map_err(db_from_bson)?,
            "tours_excluded": to_bson(&input.tours_excluded).map_err(db_from_bson)?,
            "share_trip": input.share_trip,
            "private_trip": input.private_trip,
            "departure_time": to_bson(&input.departure_time).map_err(db_from_bson)?,
            "images": input.images.clone(),
            "updated_at": to_bson(&now).map_err(db_from_bson)?,
        }};
        self.packages().update_one(doc! { "_id": id }, update).await?;

        existing.title = input.title;
        existing.short_description = input.short_description;
        existing.description = input.description;
        existing.slug = input.slug;
        existing.itinerary = input.itinerary;
        existing.tours_included = input.tours_included;
        existing.tours_excluded = input.tours_excluded;
        existing.share_trip = input.share_trip;
        existing.private_trip = input.private_trip;
        existing.departure_time = input.departure_time;
        existing.images = input.images;
        existing.updated_at = Some(now);
        Ok(existing)
    }

    pub async fn delete_package(&self, id: ObjectId) -> Result<TourPackage, CatalogError> {
        let pkg = self
            .packages()
            .find_one(doc! { "_id": id })
            .await?
            .ok_or_else(|| CatalogError::NotFound("Package".to_string()))?;

        if let Err(e) = self
            .tours()
            .update_one(
                doc! { "_id": pkg.tour_id },
                doc! { "$pull": { "packages": id } },
            )
            .await
        {
            log::warn!("Could not detach package {} from its tour: {}", id, e);
        }

        self.release_images_best_effort(&pkg.images).await;
        self.packages().delete_one(doc! { "_id": id }).await?;
        Ok(pkg)
    }

    // ---- Reconciliation ----

    /// Rebuilds every parent's child-id array to exactly match the children
    /// whose parent reference points back at it. Repairs both halves of a
    /// torn two-step write: missing back-references and dangling ids.
    /// Idempotent; a second run right after a first reports zero repairs.
    pub async fn reconcile_references(&self) -> Result<ReconcileReport, CatalogError> {
        let mut report = ReconcileReport::default();

        let categories: Vec<Category> = self
            .categories()
            .find(doc! {})
            .await?
            .try_collect()
            .await?;
        for category in categories {
            let Some(category_id) = category.id else { continue };
            let actual: Vec<ObjectId> = self
                .tours()
                .find(doc! { "category_id": category_id })
                .await?
                .try_collect::<Vec<Tour>>()
                .await?
                .into_iter()
                .filter_map(|t| t.id)
                .collect();

            if !same_id_set(&category.tours, &actual) {
                self.categories()
                    .update_one(
                        doc! { "_id": category_id },
                        doc! { "$set": { "tours": actual.clone() } },
                    )
                    .await?;
                report.categories_repaired += 1;
            }
        }

        let tours: Vec<Tour> = self.tours().find(doc! {}).await?.try_collect().await?;
        for tour in tours {
            let Some(tour_id) = tour.id else { continue };
            let actual: Vec<ObjectId> = self
                .packages()
                .find(doc! { "tour_id": tour_id })
                .await?
                .try_collect::<Vec<TourPackage>>()
                .await?
                .into_iter()
                .filter_map(|p| p.id)
                .collect();

            if !same_id_set(&tour.packages, &actual) {
                self.tours()
                    .update_one(doc! { "_id": tour_id }, doc! { "$set": { "packages": actual.clone() } })
                    .await?;
                report.tours_repaired += 1;
            }
        }

        Ok(report)
    }
}

fn validate_catalog_text(
    title: &LocalizedText,
    short_description: &LocalizedText,
    description: &LocalizedText,
) -> Result<(), CatalogError> {
    if !title.has_english() {
        return Err(CatalogError::InvalidInput(
            "title must have an English entry".to_string(),
        ));
    }
    if !short_description.has_english() {
        return Err(CatalogError::InvalidInput(
            "short_description must have an English entry".to_string(),
        ));
    }
    if !description.has_english() {
        return Err(CatalogError::InvalidInput(
            "description must have an English entry".to_string(),
        ));
    }
    Ok(())
}

fn db_from_bson(err: mongodb::bson::ser::Error) -> CatalogError {
    CatalogError::InvalidInput(format!("unserializable field: {}", err))
}

fn same_id_set(stored: &[ObjectId], actual: &[ObjectId]) -> bool {
    let mut a: Vec<[u8; 12]> = stored.iter().map(|id| id.bytes()).collect();
    let mut b: Vec<[u8; 12]> = actual.iter().map(|id| id.bytes()).collect();
    a.sort();
    a.dedup();
    b.sort();
    b.dedup();
    a == b
}
