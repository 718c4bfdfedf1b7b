//! Plumbing shared by the deck and set fetchers: identifier checks, the HTTP
//! transport, image caching under `public/` and manifest output.

pub mod files;
pub mod guid;
pub mod http;
pub mod images;
