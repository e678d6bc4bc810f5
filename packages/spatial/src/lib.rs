#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Planar geometry for listing analysis.
//!
//! Converts WGS84 coordinates to Web Mercator meters with closed-form
//! formulas ([`projection`]) and provides an R-tree backed radius
//! neighbor index over projected points ([`index`]). Used by the
//! proximity and tiered clustering stages.

pub mod index;
pub mod projection;

pub use index::NeighborIndex;
pub use projection::{CoordinateReference, PlanarProjection, ProjectionError, WebMercator};
