pub mod auth;
pub mod config;
pub mod error;
pub mod language;
pub mod model;
pub mod orchestrator;
pub mod resources;
pub mod security;
pub mod server;
pub mod settings;
pub mod store;
pub mod translator;
