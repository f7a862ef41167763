//! Shared test utilities for the photo-sync workspace.
//!
//! Dev-dependency only, never published.
//!
//! # Modules
//!
//! - [`git`]: git repository fixtures
//! - [`library`]: [`PhotoLibrary`](library::PhotoLibrary) builder producing a
//!   folder-provider photo library with real, decodable images
//! - [`site`]: [`TestSite`](site::TestSite): a site repository plus config file

pub mod git;
pub mod library;
pub mod site;
