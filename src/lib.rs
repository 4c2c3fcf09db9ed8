pub mod auth;
pub mod config;
pub mod consts;
pub mod error;
pub mod events;
pub mod paste;
pub mod query;
pub mod ui;
pub mod watcher;
