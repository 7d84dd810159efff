// numeric helpers shared by the samplers

/// `num_values` evenly spaced points on `[start, end]`, both ends included.
/// The last point is `end` exactly, so grids centred on integers stay integral.
pub fn linspace(start: f64, end: f64, num_values: usize) -> Vec<f64> {
    match num_values {
        0 => Vec::new(),
        1 => vec![start],
        _ => {
            let step = (end - start) / (num_values as f64 - 1.0);
            let mut values: Vec<f64> = (0..num_values).map(|i| start + i as f64 * step).collect();
            values[num_values - 1] = end;
            values
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_linspace_includes_both_ends() {
        let xs = linspace(-1.0, 1.0, 5);
        assert_eq!(xs, vec![-1.0, -0.5, 0.0, 0.5, 1.0]);
        let xs = linspace(-0.1, 0.1, 100);
        assert_eq!(xs.len(), 100);
        assert_eq!(xs[99], 0.1);
    }

    #[test]
    fn test_linspace_degenerate() {
        assert!(linspace(0.0, 1.0, 0).is_empty());
        assert_eq!(linspace(3.0, 5.0, 1), vec![3.0]);
    }
}
