pub mod api;
pub mod config;
pub mod data_models;
pub mod db;
pub mod filter;
pub mod query_engine;
pub mod query_params;
pub mod store;
