use crate::errors::RenderResult;
use crate::numerical::grid::Grid2D;
use csv::Writer;
use log::info;
use std::fs::File;
use std::path::Path;

/// corner cell of the header row
pub const GRID_CORNER: &str = "y \\ x";

/// Writes a sampled grid as CSV: a header row `y \ x, x_0, x_1, ...`, then one row per y
/// starting with that y. Non-finite samples are written as `NaN`, `inf` or `-inf`.
pub fn save_grid_to_csv(grid: &Grid2D, path: &Path) -> RenderResult<()> {
    let file = File::create(path)?;
    let mut writer = Writer::from_writer(file);

    let mut header = Vec::with_capacity(grid.nx() + 1);
    header.push(GRID_CORNER.to_string());
    header.extend(grid.xs.iter().map(|x| x.to_string()));
    writer.write_record(&header)?;

    for (i, row) in grid.z.rows().into_iter().enumerate() {
        let mut row_data = Vec::with_capacity(grid.nx() + 1);
        row_data.push(grid.ys[i].to_string());
        row_data.extend(row.iter().map(|&val| val.to_string()));
        writer.write_record(&row_data)?;
    }

    writer.flush()?;
    info!(
        "grid {}x{} saved to {}",
        grid.nx(),
        grid.ny(),
        path.display()
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::numerical::grid::SampleWindow;
    use crate::symbolic::symbolic_lambdify::EvaluableFunction;
    use approx::assert_relative_eq;

    #[test]
    fn test_grid_csv_layout() {
        let f = EvaluableFunction::parse("x + 10*y", &["x", "y"]).unwrap();
        let grid = SampleWindow::new(0.0, 0.0, 1.0)
            .unwrap()
            .with_resolution(3)
            .unwrap()
            .sample(&f)
            .unwrap();
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("grid.csv");
        save_grid_to_csv(&grid, &path).unwrap();

        let mut reader = csv::Reader::from_path(&path).unwrap();
        let header: Vec<String> = reader.headers().unwrap().iter().map(String::from).collect();
        assert_eq!(header, vec!["y \\ x", "-1", "0", "1"]);
        let rows: Vec<Vec<f64>> = reader
            .records()
            .map(|r| r.unwrap().iter().map(|v| v.parse::<f64>().unwrap()).collect())
            .collect();
        assert_eq!(rows.len(), 3);
        // first column is y, the rest is f along that row
        assert_relative_eq!(rows[0][0], -1.0);
        assert_relative_eq!(rows[0][1], -11.0);
        assert_relative_eq!(rows[2][3], 11.0);
    }

    #[test]
    fn test_non_finite_values_are_written() {
        let f = EvaluableFunction::parse("1/x + 0*y", &["x", "y"]).unwrap();
        let grid = SampleWindow::new(0.0, 0.0, 1.0)
            .unwrap()
            .with_resolution(3)
            .unwrap()
            .sample(&f)
            .unwrap();
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("pole.csv");
        save_grid_to_csv(&grid, &path).unwrap();
        let text = std::fs::read_to_string(&path).unwrap();
        assert!(text.contains("inf") || text.contains("NaN"));
        assert_eq!(text.lines().count(), 4);
    }
}
