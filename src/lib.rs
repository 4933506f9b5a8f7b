pub mod app;
pub mod auth;
pub mod backend;
pub mod cli;
pub mod config;
pub mod error;
pub mod gate;
pub mod handlers;
pub mod middleware;
pub mod telemetry;
