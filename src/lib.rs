#[macro_use]
extern crate diesel;

pub mod auth;
pub mod breaker;
pub mod cache;
pub mod config;
pub mod error;
pub mod membership;
pub mod models;
pub mod pagination;
pub mod query;
pub mod render;
pub mod repository;
pub mod routes;
pub mod schema;
pub mod shopping_list;
