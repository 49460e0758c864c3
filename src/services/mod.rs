pub mod catalog_service;
pub mod email_service;
pub mod image_service;
