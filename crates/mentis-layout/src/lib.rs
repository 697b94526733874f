//! mentis-layout
//!
//! Geometry-only layout segmentation: positioned tokens in, header /
//! row / table segments out. Knows nothing about instruments; content
//! interpretation happens downstream.

pub mod config;
pub mod lines;
pub mod segments;

pub use crate::config::SegmenterConfig;
pub use crate::segments::segment_page;
