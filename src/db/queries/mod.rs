pub mod categories;
pub mod chapters;
pub mod contacts;
pub mod questions;
pub mod sessions;
