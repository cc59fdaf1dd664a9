//! Vigía - incident and crime statistics dashboard for Santander, Colombia.
//!
//! # Overview
//!
//! Vigía sits between the Santander security analytics API and the browser.
//! It wraps the upstream endpoints in one typed client, shapes the raw JSON
//! into chart-ready series, classified map markers, table rows, and stat
//! cards, and serves those view models over HTTP. Nothing is persisted; the
//! crate is a stateless shaping layer plus a small in-memory chat
//! transcript.
//!
//! # View model
//!
//! Each sidebar tab maps to one view. A view fetches everything it needs
//! from the analytics API (concurrently when it needs several resources),
//! waits for all requests to settle, and renders either the populated model
//! or a single error panel listing every failed request. Partial success
//! never renders; the error panel's retry re-runs all of the view's
//! fetches.
//!
//! # Modules
//!
//! - [`client`]: typed HTTP client for the analytics API
//! - [`cache`]: short-lived memoization of GET responses
//! - [`model`]: severity/status classification and navigation tabs
//! - [`aggregation`]: period grouping and pagination for the charts
//! - [`views`]: per-tab view composition
//! - [`chat`]: chat assistant transcript and upstream plumbing
//! - [`api`]: HTTP API handlers

pub mod aggregation;
pub mod api;
pub mod cache;
pub mod chat;
pub mod client;
pub mod model;
pub mod views;
