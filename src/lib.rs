pub mod app;
pub mod auth;
pub mod cli;
pub mod client;
pub mod config;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod pagination;
pub mod records;
pub mod services;
pub mod state;
pub mod store;
pub mod types;
