pub mod account;
pub mod booking;
pub mod category;
pub mod locale;
pub mod package;
pub mod tour;
