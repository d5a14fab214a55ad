pub mod agent;
pub mod auth;
pub mod config;
pub mod domain;
pub mod http;
pub mod mail;
pub mod server;
pub mod session;
pub mod terminal;
