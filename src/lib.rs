pub mod api;
pub mod args;
pub mod error;
pub mod model;
pub mod scoring;
pub mod utils;
