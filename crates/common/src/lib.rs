pub mod config;
pub mod error;
pub mod lookup;
pub mod models;
pub mod network;
pub mod station;
