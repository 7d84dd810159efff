//! Level sets `{z = level}` of a sampled grid by marching squares.
//!
//! Crossings are interpolated linearly along cell edges in world coordinates.
//! Cells with a non-finite corner produce nothing. Saddle cells are resolved with the
//! mean of the four corners. Segments are linked into polylines through the grid
//! edges they share, so no distance tolerance is involved.
use crate::numerical::grid::Grid2D;
use log::debug;
use std::collections::HashMap;

/// A grid edge: `H(i, j)` joins nodes `(i, j)` and `(i, j + 1)`,
/// `V(i, j)` joins nodes `(i, j)` and `(i + 1, j)`; `i` indexes rows (y), `j` columns (x).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
enum EdgeId {
    H(usize, usize),
    V(usize, usize),
}

/// One connected piece of a level set.
#[derive(Debug, Clone, PartialEq)]
pub struct ContourLine {
    pub level: f64,
    /// world coordinates; a closed line repeats its first point at the end
    pub points: Vec<(f64, f64)>,
    pub closed: bool,
}

fn edge_point(grid: &Grid2D, edge: EdgeId, level: f64) -> (f64, f64) {
    let ((xa, ya, va), (xb, yb, vb)) = match edge {
        EdgeId::H(i, j) => (
            (grid.xs[j], grid.ys[i], grid.z[[i, j]]),
            (grid.xs[j + 1], grid.ys[i], grid.z[[i, j + 1]]),
        ),
        EdgeId::V(i, j) => (
            (grid.xs[j], grid.ys[i], grid.z[[i, j]]),
            (grid.xs[j], grid.ys[i + 1], grid.z[[i + 1, j]]),
        ),
    };
    let t = (level - va) / (vb - va);
    let t = if t.is_finite() { t.clamp(0.0, 1.0) } else { 0.5 };
    (xa + t * (xb - xa), ya + t * (yb - ya))
}

/// Segments of one cell, as pairs of crossed edges.
fn cell_segments(grid: &Grid2D, i: usize, j: usize, level: f64, out: &mut Vec<(EdgeId, EdgeId)>) {
    let bl = grid.z[[i, j]];
    let br = grid.z[[i, j + 1]];
    let tr = grid.z[[i + 1, j + 1]];
    let tl = grid.z[[i + 1, j]];
    if !(bl.is_finite() && br.is_finite() && tr.is_finite() && tl.is_finite()) {
        return;
    }
    let case = (bl >= level) as u8
        | ((br >= level) as u8) << 1
        | ((tr >= level) as u8) << 2
        | ((tl >= level) as u8) << 3;

    let bottom = EdgeId::H(i, j);
    let top = EdgeId::H(i + 1, j);
    let left = EdgeId::V(i, j);
    let right = EdgeId::V(i, j + 1);

    match case {
        0 | 15 => {}
        1 | 14 => out.push((left, bottom)),
        2 | 13 => out.push((bottom, right)),
        3 | 12 => out.push((left, right)),
        4 | 11 => out.push((right, top)),
        6 | 9 => out.push((bottom, top)),
        7 | 8 => out.push((left, top)),
        5 | 10 => {
            let centre_above = (bl + br + tr + tl) / 4.0 >= level;
            // case 5 has bl and tr above; with the centre above they stay connected
            if (case == 5) == centre_above {
                out.push((bottom, right));
                out.push((left, top));
            } else {
                out.push((left, bottom));
                out.push((right, top));
            }
        }
        _ => {}
    }
}

/// All connected pieces of `{z = level}`. Empty when the level is never crossed
/// or is not finite.
pub fn contour_lines(grid: &Grid2D, level: f64) -> Vec<ContourLine> {
    if !level.is_finite() || grid.nx() < 2 || grid.ny() < 2 {
        return Vec::new();
    }
    let mut segments = Vec::new();
    for i in 0..grid.ny() - 1 {
        for j in 0..grid.nx() - 1 {
            cell_segments(grid, i, j, level, &mut segments);
        }
    }
    let lines = link_segments(&segments)
        .into_iter()
        .map(|(edges, closed)| ContourLine {
            level,
            points: edges
                .into_iter()
                .map(|edge| edge_point(grid, edge, level))
                .collect(),
            closed,
        })
        .collect::<Vec<_>>();
    debug!(
        "level {}: {} segments linked into {} lines",
        level,
        segments.len(),
        lines.len()
    );
    lines
}

fn link_segments(segments: &[(EdgeId, EdgeId)]) -> Vec<(Vec<EdgeId>, bool)> {
    let mut incident: HashMap<EdgeId, Vec<usize>> = HashMap::new();
    for (idx, (a, b)) in segments.iter().enumerate() {
        incident.entry(*a).or_default().push(idx);
        incident.entry(*b).or_default().push(idx);
    }
    // open lines are walked from one of their ends so they come out in one piece
    let is_end = |edge: &EdgeId| incident.get(edge).map_or(0, |v| v.len()) == 1;
    let (open_starts, others): (Vec<usize>, Vec<usize>) = (0..segments.len())
        .partition(|&idx| is_end(&segments[idx].0) || is_end(&segments[idx].1));

    let mut used = vec![false; segments.len()];
    let mut lines = Vec::new();
    for start in open_starts.into_iter().chain(others) {
        if used[start] {
            continue;
        }
        used[start] = true;
        let (a, b) = segments[start];
        // orient the first segment so that the walk leaves from the open end
        let (first, mut current) = if is_end(&b) && !is_end(&a) { (b, a) } else { (a, b) };
        let mut chain = vec![first, current];
        loop {
            let next = incident
                .get(&current)
                .and_then(|candidates| candidates.iter().copied().find(|&idx| !used[idx]));
            match next {
                Some(idx) => {
                    used[idx] = true;
                    let (p, q) = segments[idx];
                    current = if p == current { q } else { p };
                    chain.push(current);
                }
                None => break,
            }
        }
        let closed = chain.len() > 3 && chain.first() == chain.last();
        lines.push((chain, closed));
    }
    lines
}
