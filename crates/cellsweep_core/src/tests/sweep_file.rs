//! Sweep file and entity list tests

use std::fs;
use std::path::{Path, PathBuf};

use jiff::SignedDuration;

use crate::config::SweepFile;
use crate::context::SubmissionContext;
use crate::entities::EntityList;
use crate::error::{ConfigError, PlanError};
use crate::model::AxisValue;
use crate::plan::{SweepMode, SweepPlanner};

fn sweeps_dir() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("../../sweeps")
}

const MINIMAL: &str = r#"
output: "{stim_type}-{stim_idx}.h5"
axes:
  - name: stim_type
    values: [ramp, step]
  - name: stim_idx
    range: { start: 0, end: 3 }
launcher:
  args: [--outfile, "{outfile}"]
"#;

#[test]
fn test_minimal_file_uses_defaults() {
    let file = SweepFile::from_yaml(MINIMAL).unwrap();
    assert_eq!(file.run_root, PathBuf::from("runs"));
    assert_eq!(file.mode, SweepMode::CrossProduct);
    assert_eq!(file.tasks_per_job, 1);
    assert_eq!(file.metadata_suffix, "-meta.yaml");
    assert!(file.samples.is_none());
    assert!(file.scheduler.is_none());
    assert!(file.launcher.command.is_empty());

    let config = file.resolve(Path::new(".")).unwrap();
    let planner = SweepPlanner::new(config, SubmissionContext::new("7")).unwrap();
    assert_eq!(planner.total_jobs(), 6);
}

#[test]
fn test_linear_mode_from_yaml() {
    let yaml = r#"
mode: linear
output: "{stim_type}-{stim_idx}.h5"
axes:
  - name: stim_type
    values: [ramp, step, noise]
  - name: stim_idx
    values: ["4", "5", "6"]
launcher:
  args: []
"#;
    let config = SweepFile::from_yaml(yaml)
        .unwrap()
        .resolve(Path::new("."))
        .unwrap();
    assert_eq!(config.mode, SweepMode::Linear);

    let planner = SweepPlanner::new(config, SubmissionContext::new("7")).unwrap();
    let names: Vec<_> = planner
        .jobs()
        .map(|job| job.unwrap().output_path)
        .collect();
    assert_eq!(
        names,
        vec![
            PathBuf::from("runs/7/ramp-4.h5"),
            PathBuf::from("runs/7/step-5.h5"),
            PathBuf::from("runs/7/noise-6.h5"),
        ]
    );
}

#[test]
fn test_axis_needs_exactly_one_source() {
    let yaml = r#"
output: "{stim_type}.h5"
axes:
  - name: stim_type
    values: [ramp]
    range: { start: 0, end: 2 }
launcher:
  args: []
"#;
    let err = SweepFile::from_yaml(yaml)
        .unwrap()
        .resolve(Path::new("."))
        .unwrap_err();
    assert!(matches!(err, PlanError::Config(ConfigError::AxisSource(name)) if name == "stim_type"));

    let yaml = r#"
output: "x.h5"
axes:
  - name: stim_type
launcher:
  args: []
"#;
    let err = SweepFile::from_yaml(yaml)
        .unwrap()
        .resolve(Path::new("."))
        .unwrap_err();
    assert!(matches!(err, PlanError::Config(ConfigError::AxisSource(_))));
}

#[test]
fn test_malformed_yaml_is_a_parse_error() {
    assert!(matches!(
        SweepFile::from_yaml("axes: [1, 2"),
        Err(ConfigError::Parse(_))
    ));
    // `output` is required
    assert!(matches!(
        SweepFile::from_yaml("axes: []\nlauncher:\n  args: []\n"),
        Err(ConfigError::Parse(_))
    ));
    // Templates are checked while parsing
    assert!(matches!(
        SweepFile::from_yaml("output: \"{unclosed\"\naxes: []\nlauncher:\n  args: []\n"),
        Err(ConfigError::Parse(_))
    ));
}

#[test]
fn test_entity_axis_relative_to_sweep_file() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(
        dir.path().join("cells.csv"),
        "L1_DAC,L1,cNAC\nL23_BP,L23,cNAC\nL4_SS,L4,cADpyr\n",
    )
    .unwrap();
    let sweep = dir.path().join("sweep.yaml");
    fs::write(
        &sweep,
        r#"
output: "{cell}.h5"
partition: cell
axes:
  - name: cell
    entities: { csv: cells.csv, start: 1, count: 2 }
launcher:
  args: [--cori-start, "{cell.row}", --cori-end, "{cell.row_end}"]
"#,
    )
    .unwrap();

    let config = SweepFile::load(&sweep).unwrap();
    assert_eq!(config.axes[0].len(), 2);
    assert_eq!(
        config.axes[0].values()[0],
        AxisValue::Entity {
            name: "L23_BP".to_string(),
            row: 1
        }
    );
}

#[test]
fn test_missing_entity_list_is_a_filesystem_error() {
    let yaml = r#"
output: "{cell}.h5"
axes:
  - name: cell
    entities: { csv: no-such-file.csv, start: 0, count: 1 }
launcher:
  args: []
"#;
    let dir = tempfile::tempdir().unwrap();
    let err = SweepFile::from_yaml(yaml)
        .unwrap()
        .resolve(dir.path())
        .unwrap_err();
    match err {
        PlanError::Filesystem(err) => {
            assert_eq!(err.path, dir.path().join("no-such-file.csv"));
        }
        other => panic!("expected a filesystem error, got {other:?}"),
    }
}

#[test]
fn test_stimulus_demo_sweep() {
    let file = SweepFile::from_yaml(include_str!("../../../../sweeps/stim_sweep.yaml")).unwrap();
    let scheduler = file.scheduler.clone().unwrap();
    assert_eq!(scheduler.nodes, 4);
    assert_eq!(scheduler.time, SignedDuration::from_hours(4));

    let config = file.resolve(&sweeps_dir()).unwrap();
    let planner = SweepPlanner::new(config, SubmissionContext::new("1234")).unwrap();
    // 1 model x 3 stimulus types x 8 indices x 4 runs
    assert_eq!(planner.total_jobs(), 96);

    let first = planner.jobs().next().unwrap().unwrap();
    assert_eq!(
        first.output_path,
        PathBuf::from("runs/1234/hh_point_5param-ramp-00-0.h5")
    );
    assert!(first.args.windows(2).any(|w| w == ["--num", "2500"]));
    assert_eq!(first.command[..3], ["srun", "-n", "64"]);
    let prepare = first.prepare_command_line().unwrap();
    assert_eq!(prepare[..3], ["python", "run.py", "--create"]);
}

#[test]
fn test_cell_demo_sweep_shards_over_nodes() {
    let config = SweepFile::load(&sweeps_dir().join("cell_sweep.yaml")).unwrap();
    let context = SubmissionContext::new("9001").with_node(3, 24);
    let planner = SweepPlanner::new(config, context).unwrap();

    assert_eq!(planner.total_jobs(), 24);
    assert_eq!(planner.shard_jobs(), 1);

    let jobs: Vec<_> = planner.jobs().map(Result::unwrap).collect();
    assert_eq!(jobs.len(), 1);
    let job = &jobs[0];
    assert_eq!(job.sequence, 3);
    assert_eq!(
        job.output_path,
        PathBuf::from("runs/9001/L5_NBC_cNAC209_4/L5_NBC_cNAC209_4-chirp16a-3-0.h5")
    );
    assert!(job.args.windows(2).any(|w| w == ["--cori-start", "88"]));
    assert!(job.args.windows(2).any(|w| w == ["--cori-end", "89"]));
    assert!(job.args.windows(2).any(|w| w == ["--num", "40"]));
}

// ============================================================================
// Entity lists
// ============================================================================

#[test]
fn test_entity_list_uses_first_field() {
    let list = EntityList::parse("L1_DAC,L1,cNAC\n  L23_BP , L23\nL4_SS\n");
    let names: Vec<_> = list
        .select(0, 3)
        .unwrap()
        .iter()
        .map(ToString::to_string)
        .collect();
    assert_eq!(names, ["L1_DAC", "L23_BP", "L4_SS"]);
}

#[test]
fn test_entity_list_ignores_trailing_blank_lines() {
    let list = EntityList::parse("a\nb\n\n\n");
    assert_eq!(list.len(), 2);
    assert!(EntityList::parse("").is_empty());
}

#[test]
fn test_entity_selection_out_of_bounds() {
    let list = EntityList::parse("a\nb\nc\n");
    assert!(list.select(1, 2).is_ok());
    assert!(matches!(
        list.select(2, 2),
        Err(ConfigError::EntityRangeOutOfBounds {
            start: 2,
            end: 4,
            len: 3
        })
    ));
}

#[test]
fn test_empty_entity_name_reports_row() {
    let list = EntityList::parse("a\n,orphan\nc\n");
    assert!(matches!(
        list.select(0, 3),
        Err(ConfigError::EmptyEntityName(2))
    ));
}

#[test]
fn test_demo_entity_list() {
    let list = EntityList::load(&sweeps_dir().join("cells.csv")).unwrap();
    assert!(list.len() >= 109);
    let cells = list.select(85, 24).unwrap();
    assert_eq!(cells[0].row(), Some(85));
    assert_eq!(cells[23].row(), Some(108));
}
