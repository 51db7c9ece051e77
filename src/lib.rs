pub mod config;
pub mod converter;
pub mod error;
pub mod file_types;
pub mod maven;
pub mod scanner;
pub mod storage;
