pub mod catalog;
pub mod config;
pub mod feed;
pub mod logging;
pub mod portal;
pub mod viewer;
