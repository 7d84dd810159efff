use crate::Utils::task_parser::{Value, parse_task};
use crate::Utils::task_runner::{TaskJob, TaskPlan};
use crate::errors::RenderError;
use crate::numerical::continuity::CatalogFunction;
use crate::plotting::colormaps::Colormap;
use crate::plotting::render_api::FunctionChoice;
use approx::assert_relative_eq;
use log::LevelFilter;
use std::path::PathBuf;

const FULL_TASK: &str = r#"
// every job kind once
heatmap
  expression: "exp(x*y + x**2)"
  constraint: "x**2 + y**2 - 1"
  center: 0, 0
  half_width: 1
  colormap: coolwarm
  show_center: true
  show_level: true
  level: 2.5

# level curves
contour
  expression: "x**2 + y**2"
  step: 0.05
  resolution: 120

surface
  expression: x*y
  center: 1, -1

tangent
  expression: "sin(x)"
  x0: 0.5
  h: 0.25

continuity
  function: tangent
  x0: 0.2
  epsilon: 0.1
  r: 0.3

output
  directory: "renders/run 1"
  width: 640
  height: 480
  csv: true
  log_level: debug
"#;

#[test]
fn test_parse_full_task() {
    let sections = parse_task(FULL_TASK).unwrap();
    let titles: Vec<&str> = sections.iter().map(|s| s.title.as_str()).collect();
    assert_eq!(
        titles,
        vec!["heatmap", "contour", "surface", "tangent", "continuity", "output"]
    );
    assert_eq!(
        sections[0].entries["constraint"],
        vec![Value::String("x**2 + y**2 - 1".to_string())]
    );
    assert_eq!(
        sections[0].entries["center"],
        vec![Value::Integer(0), Value::Integer(0)]
    );
    assert_eq!(sections[1].entries["resolution"], vec![Value::Integer(120)]);
}

#[test]
fn test_same_section_twice_keeps_both() {
    let sections = parse_task("contour\n step: 0.1\ncontour\n step: 0.2").unwrap();
    assert_eq!(sections.len(), 2);
    assert_eq!(sections[1].entries["step"], vec![Value::Float(0.2)]);
}

#[test]
fn test_parse_errors() {
    assert!(matches!(parse_task("// nothing\n\n"), Err(RenderError::Task(_))));
    assert!(matches!(
        parse_task("heatmap\n expression: \"x + y"),
        Err(RenderError::Task(_))
    ));
    assert!(matches!(parse_task("1heatmap\n"), Err(RenderError::Task(_))));
}

#[test]
fn test_plan_from_full_task() {
    let plan = TaskPlan::from_text(FULL_TASK).unwrap();
    assert_eq!(plan.jobs.len(), 5);
    match &plan.jobs[0] {
        TaskJob::Heatmap(r) => {
            assert_eq!(r.colormap, Colormap::Coolwarm);
            assert_eq!(r.constraint_expression.as_deref(), Some("x**2 + y**2 - 1"));
            assert!(r.show_center && r.show_level);
            assert_eq!(r.level, Some(2.5));
            assert!(!r.surface);
        }
        other => panic!("unexpected job {:?}", other),
    }
    match &plan.jobs[1] {
        TaskJob::Contour(r) => {
            assert_eq!(r.step, 0.05);
            assert_eq!(r.resolution, Some(120));
            assert_eq!(r.center, (0.0, 0.0));
        }
        other => panic!("unexpected job {:?}", other),
    }
    match &plan.jobs[2] {
        TaskJob::Heatmap(r) => {
            assert!(r.surface);
            assert_eq!(r.expression, "x*y");
            assert_eq!(r.center, (1.0, -1.0));
        }
        other => panic!("unexpected job {:?}", other),
    }
    match &plan.jobs[3] {
        TaskJob::Tangent(r) => {
            assert_eq!(r.x0, 0.5);
            assert_eq!(r.h, Some(0.25));
            assert_eq!(r.half_width, 1.0);
        }
        other => panic!("unexpected job {:?}", other),
    }
    match &plan.jobs[4] {
        TaskJob::Continuity(r) => {
            assert_eq!(r.function, FunctionChoice::Named(CatalogFunction::Tangent));
            assert_eq!(r.radius, 0.3);
        }
        other => panic!("unexpected job {:?}", other),
    }
    assert_eq!(plan.output.directory, PathBuf::from("renders/run 1"));
    assert_eq!((plan.output.style.width, plan.output.style.height), (640, 480));
    assert!(plan.output.style.annotate);
    assert!(plan.output.csv);
    assert_eq!(plan.output.log_level, LevelFilter::Debug);
    assert_eq!(plan.output.log_file, None);
}

#[test]
fn test_missing_keys_take_defaults() {
    let plan = TaskPlan::from_text("contour\ntangent\ncontinuity\n seed: 42").unwrap();
    match &plan.jobs[0] {
        TaskJob::Contour(r) => {
            assert_eq!(r.expression, "exp(x*y + x**2)");
            assert_eq!(r.step, 0.01);
            assert_eq!(r.half_width, 1.0);
            assert_eq!(r.constraint_expression, None);
        }
        other => panic!("unexpected job {:?}", other),
    }
    match &plan.jobs[1] {
        TaskJob::Tangent(r) => assert_eq!(r.h, None),
        other => panic!("unexpected job {:?}", other),
    }
    match &plan.jobs[2] {
        TaskJob::Continuity(r) => assert_eq!(r.function, FunctionChoice::Seed(42)),
        other => panic!("unexpected job {:?}", other),
    }
    assert_eq!(plan.output.directory, PathBuf::from("output"));
}

#[test]
fn test_numbers_may_be_constant_formulas() {
    let plan = TaskPlan::from_text(
        "contour\n  center: pi/4, 0\n  level: sqrt(2)\n  half_width: \"2 * pi\"\n\
         tangent\n  x0: -pi/2\n  h: 1/8\n",
    )
    .unwrap();
    match &plan.jobs[0] {
        TaskJob::Contour(r) => {
            assert_eq!(r.center, (std::f64::consts::FRAC_PI_4, 0.0));
            assert_relative_eq!(r.level.unwrap(), 2.0f64.sqrt());
            assert_eq!(r.half_width, 2.0 * std::f64::consts::PI);
        }
        other => panic!("unexpected job {:?}", other),
    }
    match &plan.jobs[1] {
        TaskJob::Tangent(r) => {
            assert_eq!(r.x0, -std::f64::consts::FRAC_PI_2);
            assert_eq!(r.h, Some(0.125));
        }
        other => panic!("unexpected job {:?}", other),
    }
    // a formula with a free symbol is still a bad number
    match TaskPlan::from_text("contour\n level: 2*t") {
        Err(RenderError::InvalidParameter { name, .. }) => assert_eq!(name, "level"),
        other => panic!("unexpected {:?}", other),
    }
}

#[test]
fn test_unknown_key_is_rejected() {
    match TaskPlan::from_text("heatmap\n colour: red") {
        Err(RenderError::InvalidParameter { name, .. }) => assert_eq!(name, "colour"),
        other => panic!("unexpected {:?}", other),
    }
    // `surface` sections are surfaces already
    assert!(matches!(
        TaskPlan::from_text("surface\n surface: false"),
        Err(RenderError::InvalidParameter { .. })
    ));
    // `step` belongs to contours only
    assert!(TaskPlan::from_text("heatmap\n step: 0.1").is_err());
}

#[test]
fn test_bad_values_name_their_key() {
    let cases = [
        ("contour\n center: 1", "center"),
        ("contour\n step: fast", "step"),
        ("heatmap\n show_center: yes", "show_center"),
        ("heatmap\n resolution: -5", "resolution"),
        ("heatmap\n colormap: jet", "colormap"),
        ("heatmap\n half_width: 1, 2", "half_width"),
        ("continuity\n function: sine\n seed: 1", "seed"),
        ("output\n width: 0", "width"),
        ("output\n log_level: loud", "log_level"),
    ];
    for (text, key) in cases {
        match TaskPlan::from_text(text) {
            Err(RenderError::InvalidParameter { name, .. }) => assert_eq!(name, key, "{}", text),
            other => panic!("{}: unexpected {:?}", text, other),
        }
    }
}

#[test]
fn test_task_level_errors() {
    assert!(matches!(
        TaskPlan::from_text("histogram\n bins: 3"),
        Err(RenderError::Task(_))
    ));
    assert!(matches!(
        TaskPlan::from_text("output\n csv: true\noutput\n csv: false"),
        Err(RenderError::Task(_))
    ));
    assert!(matches!(
        TaskPlan::from_file(std::path::Path::new("/definitely/not/here.task")),
        Err(RenderError::Io(_))
    ));
}

#[test]
fn test_run_writes_files() {
    let dir = tempfile::tempdir().unwrap();
    let out = dir.path().join("out");
    let text = format!(
        "heatmap\n expression: \"x + y\"\n resolution: 20\n surface: true\n\
         contour\n expression: \"ln(x) + y\"\n\
         contour\n expression: \"x + z\"\n\
         tangent\n\
         output\n directory: \"{}\"\n width: 120\n height: 100\n annotate: false\n csv: true\n",
        out.display()
    );
    let plan = TaskPlan::from_text(&text).unwrap();
    let reports = plan.run().unwrap();
    assert_eq!(reports.len(), 4);

    assert_eq!(reports[0].status, "ok");
    assert_eq!(reports[0].summary, "f(x0, y0) = 0");
    assert_eq!(
        reports[0].files,
        "01_heatmap_heatmap.png, 01_heatmap_surface.png, 01_heatmap_surface.json, 01_heatmap_grid.csv"
    );
    assert!(out.join("01_heatmap_surface.json").exists());
    assert!(out.join("01_heatmap_grid.csv").exists());

    // non-finite basepoint: skipped, nothing written
    assert!(reports[1].status.starts_with("skipped"));
    assert!(reports[1].files.is_empty());

    // a failing job does not stop the others
    assert!(reports[2].status.starts_with("error"));
    assert_eq!(reports[3].status, "ok");
    assert!(out.join("04_tangent_tangent.png").exists());
}
