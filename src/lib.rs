//! sitecms - segment-based page content service.
//!
//! Pages are stored as per-language `page_segments`/`tab_order` blobs plus flat
//! text rows. This crate assembles them into ordered, localized segments,
//! renders them to HTML, and keeps the segment registry and image mappings
//! that back the admin surfaces.

#![allow(clippy::should_implement_trait)]

pub mod cli;
pub mod config;
pub mod content;
pub mod i18n;
pub mod models;
pub mod render;
pub mod repository;
pub mod schema;
pub mod server;
pub mod storage;
pub mod translate;
pub mod utils;
