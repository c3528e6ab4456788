//! Item page scraping and description enrichment.
//!
//! - [`images`] - fetch an item's page and pull the post images out of it
//! - [`enrich`] - append `<img>` tags for those images to the description

mod enrich;
mod images;

pub use enrich::enrich;
pub use images::{
    extract_image_urls, image_selector, normalize_image_url, ImageExtractor,
    DEFAULT_CONTENT_SELECTOR, DEFAULT_IMAGE_BASE_URL,
};
