//! Shared test utilities for the terrain GIS ingest workspace.
//!
//! This crate provides common testing infrastructure including:
//! - Terrain-RGB and colour tile generators
//! - Synthetic elevation and colour grids
//! - World-file raster writers for on-disk fixtures
//! - Approximate-equality assertion macros
//!
//! # Usage
//!
//! Add to your crate's `Cargo.toml`:
//!
//! ```toml
//! [dev-dependencies]
//! test-utils = { path = "../test-utils" }
//! ```

pub mod fixtures;
pub mod generators;

// Re-export commonly used items at the crate root
pub use fixtures::*;
pub use generators::*;

/// Macro for approximate floating-point equality assertions.
///
/// # Usage
///
/// ```ignore
/// use test_utils::assert_approx_eq;
///
/// assert_approx_eq!(1.0001_f64, 1.0_f64, 0.001_f64); // passes
/// assert_approx_eq!(1.1_f32, 1.0_f32, 0.001_f32);    // fails
/// ```
#[macro_export]
macro_rules! assert_approx_eq {
    ($left:expr, $right:expr, $epsilon:expr) => {{
        let left: f64 = $left as f64;
        let right: f64 = $right as f64;
        let epsilon: f64 = $epsilon as f64;
        let diff = (left - right).abs();
        if diff > epsilon {
            panic!(
                "assertion failed: `(left ≈ right)`\n  left: `{:?}`,\n right: `{:?}`,\n  diff: `{:?}` > epsilon `{:?}`",
                left, right, diff, epsilon
            );
        }
    }};
}

/// Macro for approximate equality of a [`gis_common::Coord`] and an `(x, y)` pair.
///
/// ```ignore
/// use test_utils::assert_coord_approx_eq;
///
/// assert_coord_approx_eq!(Coord::new(1.0001, 2.0001), (1.0, 2.0), 0.001);
/// ```
#[macro_export]
macro_rules! assert_coord_approx_eq {
    ($coord:expr, ($x:expr, $y:expr), $epsilon:expr) => {{
        let coord = $coord;
        $crate::assert_approx_eq!(coord.x, $x, $epsilon);
        $crate::assert_approx_eq!(coord.y, $y, $epsilon);
    }};
}
