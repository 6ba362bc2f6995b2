pub mod analyzer;
pub mod catalog;
pub mod models;
pub mod service;
pub mod substitutions;
