//! Task Tracker Library
//!
//! A JSON-file record store with a small task service on top. The binary in
//! `main.rs` is a thin CLI over [`service::TaskService`].

pub mod cli;
pub mod config;
pub mod error;
pub mod format;
pub mod service;
pub mod store;
pub mod types;
