// Copyright (c)  by Gleb E. Zaslavkiy
//MIT License
#![allow(non_camel_case_types)]
#![allow(non_snake_case)]
//! # RustedContours
//!
//! Level curves, symlog heatmaps and 3-D surfaces of `f(x, y)` typed as text, plus the
//! tangent-as-limit-of-secants and epsilon/delta continuity pictures of single-variable
//! functions.
//!
//! * [`symbolic`] parses and simplifies expressions, differentiates them and turns them
//!   into functions evaluable on points and on whole grids;
//! * [`numerical`] samples grids and curves, builds level ladders and traces contours;
//! * [`plotting`] colours, composes and rasterises the panels behind one request type each;
//! * [`Utils`] reads task files, exports grids and sets up logging.
pub mod Utils;
pub mod errors;
pub mod numerical;
pub mod plotting;
pub mod symbolic;
