pub mod agents;
pub mod config;
pub mod connection;
pub mod credentials;
pub mod errors;
pub mod gateway;
pub mod models;
