//! The content-extraction pipeline.
//!
//! Layered leaves-first: [`clean`] normalizes raw text, [`article`] picks the
//! best full-article body among competing strategies, [`weather`] pattern-
//! matches structured readings out of weather pages, and [`items`] drives
//! them all for one listing page and site descriptor.

pub mod article;
pub mod clean;
pub mod items;
pub mod weather;
