// src/lib.rs
pub mod audit;
pub mod config;
pub mod drift;
pub mod errors;
pub mod features;
pub mod model;
pub mod routes;
pub mod service;

// Re-export the main entry points for clean API
pub use routes::build_router;
pub use service::ServiceContext;
