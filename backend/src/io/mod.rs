//! # IO Module
//!
//! Interface layer between the browser front-end and the dashboard engine.
//!
//! Translates HTTP requests into coordinator operations and hands back the
//! snapshots, option lists and exports the front-end renders. No filtering
//! or aggregation happens here.
//!
//! ## Current Implementation
//!
//! - **Web Framework**: Axum handlers grouped per concern
//! - **Serialization**: Serde DTOs from the `shared` crate
//! - **State Management**: [`crate::AppState`] injected through axum's `State` extractor
//! - **Error Handling**: status codes plus `tracing` logs, never a panic

pub mod rest;

pub use rest::*;
