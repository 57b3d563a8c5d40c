//! Directory layout tests
//!
//! Planned directories, idempotent creation, permissions and the manifest.

use std::fs;
use std::path::{Path, PathBuf};

use crate::config::SweepBuilder;
use crate::context::SubmissionContext;
use crate::entities::EntityList;
use crate::error::PlanError;
use crate::manifest::MANIFEST_FILE;
use crate::model::SweepAxis;
use crate::plan::SweepPlanner;

/// 120 rows named cell_001 .. cell_120 (row number, 1-indexed)
fn entity_list() -> EntityList {
    let text: String = (1..=120)
        .map(|row| format!("cell_{row:03},layer,etype\n"))
        .collect();
    EntityList::parse(&text)
}

fn cell_sweep(run_root: &Path) -> SweepPlanner {
    let config = SweepBuilder::new("{cell}-{stim_type}-{node_id}-{run}.h5")
        .axis(SweepAxis::labels("stim_type", ["ramp", "step"]).unwrap())
        .axis(SweepAxis::entities("cell", &entity_list(), 85, 24).unwrap())
        .partition("cell")
        .samples(40, 1)
        .run_root(run_root)
        .build()
        .unwrap();
    SweepPlanner::new(config, SubmissionContext::new("9001")).unwrap()
}

/// START_CELL=85, NCELLS=24: rows 86..=109 plus the root
#[test]
fn test_cell_range_directories() {
    let planner = cell_sweep(Path::new("runs"));
    let dirs = planner.plan_directories();

    assert_eq!(dirs.len(), 25);
    assert!(dirs.contains(&PathBuf::from("runs/9001")));

    let expected: Vec<PathBuf> = (86..=109)
        .map(|row| PathBuf::from(format!("runs/9001/cell_{row:03}")))
        .collect();
    for dir in &expected {
        assert!(dirs.contains(dir), "missing {}", dir.display());
    }
    assert!(!dirs.contains(&PathBuf::from("runs/9001/cell_085")));
    assert!(!dirs.contains(&PathBuf::from("runs/9001/cell_110")));
}

/// Every output path sits in a planned directory
#[test]
fn test_outputs_inside_planned_directories() {
    let planner = cell_sweep(Path::new("runs"));
    let dirs = planner.plan_directories();

    for job in planner.jobs() {
        let job = job.unwrap();
        let parent = job.output_path.parent().unwrap().to_path_buf();
        assert!(dirs.contains(&parent));
        assert_eq!(job.metadata_path.parent(), job.output_path.parent());
    }
}

#[test]
fn test_no_partition_plans_only_root() {
    let config = SweepBuilder::new("{stim_type}.h5")
        .axis(SweepAxis::labels("stim_type", ["ramp", "step"]).unwrap())
        .run_root("/scratch/runs")
        .build()
        .unwrap();
    let planner = SweepPlanner::new(config, SubmissionContext::new("12")).unwrap();

    let dirs: Vec<_> = planner.plan_directories().into_iter().collect();
    assert_eq!(dirs, vec![PathBuf::from("/scratch/runs/12")]);
}

/// Creating twice succeeds and yields the same directories
#[test]
fn test_create_directories_is_idempotent() {
    let temp = tempfile::tempdir().unwrap();
    let planner = cell_sweep(&temp.path().join("runs"));

    let first = planner.create_directories().unwrap();
    let second = planner.create_directories().unwrap();

    assert_eq!(first, second);
    assert_eq!(first, planner.plan_directories());
    for dir in &first {
        assert!(dir.is_dir(), "{} was not created", dir.display());
    }
}

#[cfg(unix)]
#[test]
fn test_directories_are_group_readable() {
    use std::os::unix::fs::PermissionsExt;

    let temp = tempfile::tempdir().unwrap();
    let planner = cell_sweep(&temp.path().join("runs"));

    // An existing directory without the bits gains them
    let root = planner.run_dir().to_path_buf();
    fs::create_dir_all(&root).unwrap();
    fs::set_permissions(&root, fs::Permissions::from_mode(0o700)).unwrap();

    for dir in planner.create_directories().unwrap() {
        let mode = fs::metadata(&dir).unwrap().permissions().mode();
        assert_eq!(mode & 0o055, 0o055, "{} has mode {mode:o}", dir.display());
    }
}

/// A run root that is a file aborts the submission
#[test]
fn test_create_directories_failure() {
    let temp = tempfile::tempdir().unwrap();
    let blocker = temp.path().join("runs");
    fs::write(&blocker, "not a directory").unwrap();

    let planner = cell_sweep(&blocker);
    let err = planner.create_directories().unwrap_err();

    assert_eq!(err.operation, "create directory");
    assert!(err.path.starts_with(&blocker));
}

#[test]
fn test_write_manifest() {
    let temp = tempfile::tempdir().unwrap();
    let planner = cell_sweep(&temp.path().join("runs"));
    planner.create_directories().unwrap();

    let path = planner.write_manifest().unwrap();
    assert_eq!(path, planner.run_dir().join(MANIFEST_FILE));

    let text = fs::read_to_string(&path).unwrap();
    assert!(text.contains("job_id"));
    assert!(text.contains("9001"));
    assert!(text.contains("cell_086"));

    let manifest = planner.manifest(jiff::Timestamp::UNIX_EPOCH);
    assert_eq!(manifest.total_jobs, 2 * 24);
    assert_eq!(manifest.directories.len(), 25);
    assert_eq!(manifest.axes.len(), 3);
    assert_eq!(manifest.samples.as_ref().unwrap().per_run, 40);
}

/// Without its run directory the manifest cannot be written
#[test]
fn test_write_manifest_requires_directories() {
    let temp = tempfile::tempdir().unwrap();
    let planner = cell_sweep(&temp.path().join("missing"));

    let err = planner.write_manifest().unwrap_err();
    assert!(matches!(err, PlanError::Filesystem(_)));
}
