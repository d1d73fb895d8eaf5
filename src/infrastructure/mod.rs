pub mod client;
pub mod database;
pub mod repositories;
pub mod thumbnails;
pub mod unsplash;
