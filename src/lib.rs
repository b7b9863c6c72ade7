pub mod app;
pub mod cli;
pub mod config;
pub mod error;
pub mod export;
pub mod form;
pub mod photos;
pub mod scanner;
pub mod store;
pub mod weather;
