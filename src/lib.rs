pub mod api;
pub mod auth;
pub mod config;
pub mod db;
pub mod error;
pub mod models;
pub mod search;
pub mod service;
pub mod state;
pub mod store;
pub mod validation;
