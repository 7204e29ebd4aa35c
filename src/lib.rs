pub mod app;
pub mod auth;
pub mod backend;
pub mod cli;
pub mod config;
pub mod database;
pub mod error;
pub mod filter;
pub mod handlers;
pub mod middleware;
pub mod services;
pub mod types;
pub mod views;

#[cfg(test)]
pub mod testing;
