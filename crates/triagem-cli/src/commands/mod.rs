//! Command handlers

pub mod auth;
pub mod config;
pub mod list;
pub mod review;
pub mod show;
pub mod stats;
pub mod watch;
