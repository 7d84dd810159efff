//! The fixed ladder of contour levels around the basepoint value `f0`.
use crate::errors::RenderResult;
use crate::numerical::grid::{check_finite, check_positive};
use tabled::Tabled;

/// levels on each side of the basepoint
pub const LEVELS_PER_SIDE: i32 = 15;

/// `f0 + 2*step*k` for `k = -15..=15`; `k = 0` is the basepoint level.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LevelLadder {
    basepoint: f64,
    step: f64,
}

impl LevelLadder {
    pub fn new(basepoint: f64, step: f64) -> RenderResult<Self> {
        check_finite("f0", basepoint)?;
        check_positive("step", step)?;
        Ok(LevelLadder { basepoint, step })
    }

    pub fn basepoint(&self) -> f64 {
        self.basepoint
    }

    pub fn step(&self) -> f64 {
        self.step
    }

    pub fn level(&self, k: i32) -> f64 {
        self.basepoint + 2.0 * self.step * k as f64
    }

    /// k = 1..=15, nearest to `f0` first
    pub fn above(&self) -> Vec<f64> {
        (1..=LEVELS_PER_SIDE).map(|k| self.level(k)).collect()
    }

    /// k = -15..=-1, ascending, so the level nearest to `f0` comes last
    pub fn below(&self) -> Vec<f64> {
        (-LEVELS_PER_SIDE..=-1).map(|k| self.level(k)).collect()
    }

    /// one row per level, top of the ladder first
    pub fn rows(&self) -> Vec<LadderRow> {
        (-LEVELS_PER_SIDE..=LEVELS_PER_SIDE)
            .rev()
            .map(|k| LadderRow {
                k,
                level: format!("{:.6}", self.level(k)),
                band: match k {
                    0 => "basepoint",
                    k if k > 0 => "above",
                    _ => "below",
                },
            })
            .collect()
    }
}

#[derive(Debug, Clone, Tabled)]
pub struct LadderRow {
    pub k: i32,
    pub level: String,
    pub band: &'static str,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::RenderError;
    use approx::assert_relative_eq;

    #[test]
    fn test_ladder_values() {
        let ladder = LevelLadder::new(2.0, 0.01).unwrap();
        let above = ladder.above();
        let below = ladder.below();
        assert_eq!(above.len(), 15);
        assert_eq!(below.len(), 15);
        for (i, level) in above.iter().enumerate() {
            assert_relative_eq!(*level, 2.02 + 0.02 * i as f64, epsilon = 1e-12);
        }
        for (i, level) in below.iter().enumerate() {
            assert_relative_eq!(*level, 1.70 + 0.02 * i as f64, epsilon = 1e-12);
        }
        assert_relative_eq!(above[14], 2.30, epsilon = 1e-12);
        assert_relative_eq!(below[14], 1.98, epsilon = 1e-12);
        assert_eq!(ladder.basepoint(), 2.0);
    }

    #[test]
    fn test_ladder_is_fixed_size_for_any_step() {
        for step in [1e-9, 0.5, 1e6] {
            let ladder = LevelLadder::new(-3.0, step).unwrap();
            assert_eq!(ladder.above().len(), 15);
            assert_eq!(ladder.below().len(), 15);
            assert!(ladder.above().windows(2).all(|w| w[0] < w[1]));
            assert!(ladder.below().windows(2).all(|w| w[0] < w[1]));
        }
    }

    #[test]
    fn test_ladder_validation() {
        assert!(matches!(
            LevelLadder::new(0.0, 0.0),
            Err(RenderError::InvalidParameter { ref name, .. }) if name == "step"
        ));
        assert!(LevelLadder::new(0.0, -0.1).is_err());
        assert!(LevelLadder::new(f64::NAN, 0.1).is_err());
    }

    #[test]
    fn test_rows() {
        let rows = LevelLadder::new(0.0, 0.5).unwrap().rows();
        assert_eq!(rows.len(), 31);
        assert_eq!(rows[0].k, 15);
        assert_eq!(rows[0].level, "15.000000");
        assert_eq!(rows[15].band, "basepoint");
        assert_eq!(rows[30].band, "below");
    }
}
