//! Service layer for the news cache.
//!
//! This module contains the business logic for:
//! - Upstream access (`UpstreamNewsClient`)
//! - Hero thumbnail resolution (`ThumbnailResolver`, `ThumbnailCache`)
//! - Request handling over stored snapshots (`QueryService`)

mod query;
mod thumbnails;
mod upstream;

pub use query::{QueryService, paginate};
pub use thumbnails::{EnrichOutcome, ThumbnailCache, ThumbnailResolver, extract_first_image};
pub use upstream::{ListPage, NewsUpstream, UpstreamNewsClient};
