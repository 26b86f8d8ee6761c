//! Client for a self-hosted feed and unrestrict panel.
//!
//! The [`actions::Panel`] type bundles an HTTP client, the shared
//! [`alert::AlertTray`] and the presentation seams from [`ui`], and exposes
//! one async method per user action.

pub mod actions;
pub mod alert;
pub mod api;
pub mod config;
pub mod ui;
