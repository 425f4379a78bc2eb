#![doc = "The `tasknest` library crate."]
#![doc = ""]
#![doc = "Core business logic for a multi-user task tracking backend: credential"]
#![doc = "storage, per-device session management, owner-scoped task queries, and"]
#![doc = "the error handling and request guards tying them to the HTTP layer."]

pub mod auth;
pub mod config;
pub mod error;
pub mod models;
pub mod routes;
pub mod services;
