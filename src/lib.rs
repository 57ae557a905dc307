// Library exports for the server binary, the CLI and tests
pub mod ai;
pub mod client;
pub mod config;
pub mod errors;
pub mod models;
pub mod routes;
pub mod share;
pub mod state;
pub mod storage;
