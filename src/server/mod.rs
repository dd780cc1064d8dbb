pub mod app;
pub mod auth;
pub mod deserializers;
pub mod error;
mod routes;
