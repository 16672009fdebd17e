// Library crate exposing modules for integration tests

pub mod cli;
pub mod config;
pub mod error;
pub mod model;
pub mod progress;
pub mod repository;
pub mod search;
pub mod util;
pub mod view;
