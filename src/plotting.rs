//! Panels and the request API.
//!
//! Each panel is first built as a scene (sampled grid, styled contour sets, markers)
//! and only then drawn into a PNG with plotters, so the geometry can be checked
//! without decoding images.
//!
//! Example
//! ```no_run
//! use RustedContours::plotting::png_output::PlotStyle;
//! use RustedContours::plotting::render_api::{RenderContourRequest, RenderRequest};
//! let request = RenderContourRequest {
//!     expression: "x**2 + y**2".to_string(),
//!     step: 0.05,
//!     show_center: true,
//!     ..Default::default()
//! };
//! let response = request.render(&PlotStyle::default()).unwrap();
//! println!("{:?}", response.summary);
//! ```
pub mod colormaps;
pub mod continuity_plot;
pub mod contour_plot;
pub mod heatmap;
pub mod png_output;
pub mod render_api;
pub mod scene;
pub mod surface3d;
pub mod symlog;
pub mod tangent_plot;
