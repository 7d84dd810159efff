//! Sampling and geometry behind the plots: windows and grids, the contour level
//! ladder, marching squares, the tangent/secant construction and the continuity
//! catalog.
//!
//! Example
//! ```
//! use RustedContours::numerical::grid::SampleWindow;
//! use RustedContours::numerical::level_ladder::LevelLadder;
//! use RustedContours::numerical::marching_squares::contour_lines;
//! use RustedContours::symbolic::symbolic_lambdify::EvaluableFunction;
//! let f = EvaluableFunction::parse("x**2 + y**2", &["x", "y"]).unwrap();
//! let grid = SampleWindow::new(0.0, 0.0, 1.0).unwrap().sample(&f).unwrap();
//! let ladder = LevelLadder::new(0.0, 0.1).unwrap();
//! for level in ladder.above() {
//!     let lines = contour_lines(&grid, level);
//!     println!("level {}: {} lines", level, lines.len());
//! }
//! ```
pub mod continuity;
pub mod grid;
pub mod level_ladder;
pub mod marching_squares;
pub mod tangent_secant;
