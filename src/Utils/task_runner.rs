//! Turns parsed task sections into render jobs and writes their results to disk.
//!
//! Section titles: `heatmap`, `contour`, `surface` (a heatmap with its 3-D surface),
//! `tangent`, `continuity` and at most one `output`. Keys left out take the defaults
//! of the matching request type; keys a section does not know are rejected.
//!
//! `output` keys and defaults:
//! `directory: output`, `width: 800`, `height: 700`, `annotate: true`, `csv: false`,
//! `log_level: info`, `log_file` (none).
use crate::Utils::logger::save_grid_to_csv;
use crate::Utils::task_parser::{TaskSection, parse_task};
use crate::errors::{RenderError, RenderResult};
use crate::numerical::grid::{Grid2D, SampleWindow};
use crate::plotting::colormaps::Colormap;
use crate::plotting::png_output::PlotStyle;
use crate::plotting::render_api::{
    FunctionChoice, RenderContinuityRequest, RenderContourRequest, RenderHeatmapRequest,
    RenderRequest, RenderTangentRequest,
};
use crate::symbolic::symbolic_lambdify::EvaluableFunction;
use log::{LevelFilter, error, info};
use std::fs;
use std::path::{Path, PathBuf};
use tabled::Tabled;

const HEATMAP_KEYS: [&str; 10] = [
    "expression",
    "constraint",
    "center",
    "half_width",
    "colormap",
    "show_center",
    "show_level",
    "level",
    "surface",
    "resolution",
];
const SURFACE_KEYS: [&str; 9] = [
    "expression",
    "constraint",
    "center",
    "half_width",
    "colormap",
    "show_center",
    "show_level",
    "level",
    "resolution",
];
const CONTOUR_KEYS: [&str; 9] = [
    "expression",
    "constraint",
    "center",
    "half_width",
    "step",
    "show_center",
    "show_level",
    "level",
    "resolution",
];
const TANGENT_KEYS: [&str; 4] = ["expression", "x0", "h", "half_width"];
const CONTINUITY_KEYS: [&str; 5] = ["function", "seed", "x0", "epsilon", "r"];
const OUTPUT_KEYS: [&str; 7] = [
    "directory",
    "width",
    "height",
    "annotate",
    "csv",
    "log_level",
    "log_file",
];

/// One render job of a task.
#[derive(Debug, Clone, PartialEq)]
pub enum TaskJob {
    Heatmap(RenderHeatmapRequest),
    Contour(RenderContourRequest),
    Tangent(RenderTangentRequest),
    Continuity(RenderContinuityRequest),
}

impl TaskJob {
    pub fn request(&self) -> &dyn RenderRequest {
        match self {
            TaskJob::Heatmap(r) => r,
            TaskJob::Contour(r) => r,
            TaskJob::Tangent(r) => r,
            TaskJob::Continuity(r) => r,
        }
    }

    /// The `f(x, y)` grid behind a two-variable job, sampled the way the render samples it.
    pub fn sampled_grid(&self) -> RenderResult<Option<Grid2D>> {
        let (expression, center, half_width, resolution) = match self {
            TaskJob::Heatmap(r) => (&r.expression, r.center, r.half_width, r.resolution),
            TaskJob::Contour(r) => (&r.expression, r.center, r.half_width, r.resolution),
            _ => return Ok(None),
        };
        let mut window = SampleWindow::new(center.0, center.1, half_width)?;
        if let Some(n) = resolution {
            window = window.with_resolution(n)?;
        }
        let f = EvaluableFunction::parse(expression, &["x", "y"])?;
        Ok(Some(window.sample(&f)?))
    }
}

/// Where and how results are written.
#[derive(Debug, Clone, PartialEq)]
pub struct OutputSettings {
    pub directory: PathBuf,
    pub style: PlotStyle,
    /// also export the sampled grid of heatmap and contour jobs
    pub csv: bool,
    pub log_level: LevelFilter,
    pub log_file: Option<PathBuf>,
}

impl Default for OutputSettings {
    fn default() -> Self {
        OutputSettings {
            directory: PathBuf::from("output"),
            style: PlotStyle::default(),
            csv: false,
            log_level: LevelFilter::Info,
            log_file: None,
        }
    }
}

/// Outcome of one job, one table row in the CLI.
#[derive(Debug, Clone, PartialEq, Tabled)]
pub struct JobReport {
    #[tabled(rename = "#")]
    pub index: usize,
    pub kind: String,
    pub status: String,
    pub summary: String,
    pub files: String,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct TaskPlan {
    pub jobs: Vec<TaskJob>,
    pub output: OutputSettings,
}

fn heatmap_request(section: &TaskSection, keys: &[&str]) -> RenderResult<RenderHeatmapRequest> {
    section.check_keys(keys)?;
    let defaults = RenderHeatmapRequest::default();
    Ok(RenderHeatmapRequest {
        expression: section.text("expression")?.unwrap_or(defaults.expression),
        constraint_expression: section.text("constraint")?,
        center: section.pair("center")?.unwrap_or(defaults.center),
        half_width: section.number("half_width")?.unwrap_or(defaults.half_width),
        colormap: match section.text("colormap")? {
            Some(name) => Colormap::by_name(&name)?,
            None => defaults.colormap,
        },
        show_center: section.boolean("show_center")?.unwrap_or(defaults.show_center),
        show_level: section.boolean("show_level")?.unwrap_or(defaults.show_level),
        level: section.number("level")?,
        surface: section.boolean("surface")?.unwrap_or(defaults.surface),
        resolution: section.count("resolution")?,
    })
}

fn contour_request(section: &TaskSection) -> RenderResult<RenderContourRequest> {
    section.check_keys(&CONTOUR_KEYS)?;
    let defaults = RenderContourRequest::default();
    Ok(RenderContourRequest {
        expression: section.text("expression")?.unwrap_or(defaults.expression),
        constraint_expression: section.text("constraint")?,
        center: section.pair("center")?.unwrap_or(defaults.center),
        half_width: section.number("half_width")?.unwrap_or(defaults.half_width),
        step: section.number("step")?.unwrap_or(defaults.step),
        show_center: section.boolean("show_center")?.unwrap_or(defaults.show_center),
        show_level: section.boolean("show_level")?.unwrap_or(defaults.show_level),
        level: section.number("level")?,
        resolution: section.count("resolution")?,
    })
}

fn tangent_request(section: &TaskSection) -> RenderResult<RenderTangentRequest> {
    section.check_keys(&TANGENT_KEYS)?;
    let defaults = RenderTangentRequest::default();
    Ok(RenderTangentRequest {
        expression: section.text("expression")?.unwrap_or(defaults.expression),
        x0: section.number("x0")?.unwrap_or(defaults.x0),
        h: section.number("h")?,
        half_width: section.number("half_width")?.unwrap_or(defaults.half_width),
    })
}

fn continuity_request(section: &TaskSection) -> RenderResult<RenderContinuityRequest> {
    section.check_keys(&CONTINUITY_KEYS)?;
    let defaults = RenderContinuityRequest::default();
    let function = match (section.text("function")?, section.count("seed")?) {
        (Some(_), Some(seed)) => {
            return Err(RenderError::invalid(
                "seed",
                seed,
                "give either a function or a seed",
            ));
        }
        (Some(name), None) => name.parse::<FunctionChoice>()?,
        (None, Some(seed)) => FunctionChoice::Seed(seed as u64),
        (None, None) => defaults.function,
    };
    Ok(RenderContinuityRequest {
        function,
        x0: section.number("x0")?.unwrap_or(defaults.x0),
        epsilon: section.number("epsilon")?.unwrap_or(defaults.epsilon),
        radius: section.number("r")?.unwrap_or(defaults.radius),
    })
}

fn output_settings(section: &TaskSection) -> RenderResult<OutputSettings> {
    section.check_keys(&OUTPUT_KEYS)?;
    let defaults = OutputSettings::default();
    let pixels = |key: &str, default: u32| -> RenderResult<u32> {
        match section.count(key)? {
            None => Ok(default),
            Some(0) => Err(RenderError::invalid(key, 0, "must be positive")),
            Some(n) => u32::try_from(n).map_err(|_| RenderError::invalid(key, n, "too large")),
        }
    };
    let log_level = match section.text("log_level")? {
        None => defaults.log_level,
        Some(text) => text
            .parse::<LevelFilter>()
            .map_err(|_| RenderError::invalid("log_level", &text, "not a log level"))?,
    };
    Ok(OutputSettings {
        directory: section
            .text("directory")?
            .map(PathBuf::from)
            .unwrap_or(defaults.directory),
        style: PlotStyle {
            width: pixels("width", defaults.style.width)?,
            height: pixels("height", defaults.style.height)?,
            annotate: section.boolean("annotate")?.unwrap_or(defaults.style.annotate),
        },
        csv: section.boolean("csv")?.unwrap_or(defaults.csv),
        log_level,
        log_file: section.text("log_file")?.map(PathBuf::from),
    })
}

impl TaskPlan {
    pub fn from_sections(sections: &[TaskSection]) -> RenderResult<Self> {
        let mut plan = TaskPlan::default();
        let mut seen_output = false;
        for section in sections {
            let job = match section.title.as_str() {
                "heatmap" => TaskJob::Heatmap(heatmap_request(section, &HEATMAP_KEYS)?),
                "surface" => {
                    let request = heatmap_request(section, &SURFACE_KEYS)?;
                    TaskJob::Heatmap(RenderHeatmapRequest {
                        surface: true,
                        ..request
                    })
                }
                "contour" => TaskJob::Contour(contour_request(section)?),
                "tangent" => TaskJob::Tangent(tangent_request(section)?),
                "continuity" => TaskJob::Continuity(continuity_request(section)?),
                "output" => {
                    if seen_output {
                        return Err(RenderError::Task(
                            "more than one output section".to_string(),
                        ));
                    }
                    seen_output = true;
                    plan.output = output_settings(section)?;
                    continue;
                }
                other => {
                    return Err(RenderError::Task(format!("unknown section '{}'", other)));
                }
            };
            plan.jobs.push(job);
        }
        info!("task plan with {} job(s)", plan.jobs.len());
        Ok(plan)
    }

    pub fn from_text(text: &str) -> RenderResult<Self> {
        Self::from_sections(&parse_task(text)?)
    }

    pub fn from_file(path: &Path) -> RenderResult<Self> {
        Self::from_text(&fs::read_to_string(path)?)
    }

    /// Renders every job into the output directory. A failing job is reported and the
    /// rest still run; only trouble with the directory itself is an error.
    pub fn run(&self) -> RenderResult<Vec<JobReport>> {
        fs::create_dir_all(&self.output.directory)?;
        let mut reports = Vec::with_capacity(self.jobs.len());
        for (i, job) in self.jobs.iter().enumerate() {
            let index = i + 1;
            let report = match self.run_job(index, job) {
                Ok(report) => report,
                Err(e) => {
                    error!("job {} ({}) failed: {}", index, job.request().kind(), e);
                    JobReport {
                        index,
                        kind: job.request().kind().to_string(),
                        status: format!("error: {}", e),
                        summary: String::new(),
                        files: String::new(),
                    }
                }
            };
            reports.push(report);
        }
        Ok(reports)
    }

    fn run_job(&self, index: usize, job: &TaskJob) -> RenderResult<JobReport> {
        let request = job.request();
        let dir = &self.output.directory;
        let prefix = format!("{:02}_{}_", index, request.kind());
        let response = request.render(&self.output.style)?;

        let mut files = Vec::new();
        for image in &response.images {
            files.push(image.save(dir, &prefix)?);
        }
        if let Some(mesh) = &response.surface {
            let path = dir.join(format!("{}surface.json", prefix));
            fs::write(&path, mesh.to_json()?)?;
            files.push(path);
        }
        if self.output.csv && !response.images.is_empty() {
            if let Some(grid) = job.sampled_grid()? {
                let path = dir.join(format!("{}grid.csv", prefix));
                save_grid_to_csv(&grid, &path)?;
                files.push(path);
            }
        }

        let status = if response.warnings.is_empty() {
            "ok".to_string()
        } else {
            let warnings: Vec<String> = response.warnings.iter().map(|w| w.to_string()).collect();
            format!("skipped: {}", warnings.join("; "))
        };
        let mut summary = response.summary.unwrap_or_default();
        if let Some(explanation) = response.explanation {
            summary = format!("{} | {}", summary, explanation);
        }
        info!("job {} ({}) wrote {} file(s)", index, request.kind(), files.len());
        Ok(JobReport {
            index,
            kind: request.kind().to_string(),
            status,
            summary,
            files: files
                .iter()
                .filter_map(|p| p.file_name())
                .map(|n| n.to_string_lossy().into_owned())
                .collect::<Vec<_>>()
                .join(", "),
        })
    }
}
