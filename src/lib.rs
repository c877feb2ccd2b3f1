pub mod app;
pub mod config;
pub mod domain;
pub mod error;
pub mod json_path;
pub mod metadata;
pub mod organism;
pub mod output;
pub mod rcsb;
pub mod search;
