//! Read-only localization API: localized strings per key and translation
//! completion per project, served over HTTP from a relational store.

pub mod config;
pub mod models;
pub mod queries;
pub mod server;
pub mod store;
