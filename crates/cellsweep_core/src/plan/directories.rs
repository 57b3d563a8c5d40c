use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};

use super::SweepPlanner;
use crate::error::FilesystemError;

/// Read and list permission for group and other
#[cfg(unix)]
const GROUP_OTHER_RX: u32 = 0o055;

impl SweepPlanner {
    /// Directories that must exist before any job is dispatched: the run
    /// directory plus one per distinct value of the partition axis.
    pub fn plan_directories(&self) -> BTreeSet<PathBuf> {
        let mut dirs = BTreeSet::new();
        dirs.insert(self.run_dir.clone());
        if let Some(axis) = self.partition_axis() {
            for value in axis.values() {
                dirs.insert(self.run_dir.join(value.to_string()));
            }
        }
        dirs
    }

    /// Create every planned directory, readable and listable by group and
    /// other. Existing directories are left as they are apart from gaining
    /// those permission bits.
    pub fn create_directories(&self) -> Result<BTreeSet<PathBuf>, FilesystemError> {
        let dirs = self.plan_directories();
        for dir in &dirs {
            create_shared_dir(dir)?;
        }
        tracing::info!(
            run_dir = %self.run_dir.display(),
            count = dirs.len(),
            "run directories ready"
        );
        Ok(dirs)
    }
}

fn create_shared_dir(path: &Path) -> Result<(), FilesystemError> {
    fs::create_dir_all(path).map_err(|e| FilesystemError::new("create directory", path, e))?;

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;

        let mut permissions = fs::metadata(path)
            .map_err(|e| FilesystemError::new("inspect directory", path, e))?
            .permissions();
        let mode = permissions.mode();
        if mode & GROUP_OTHER_RX != GROUP_OTHER_RX {
            permissions.set_mode(mode | GROUP_OTHER_RX);
            fs::set_permissions(path, permissions)
                .map_err(|e| FilesystemError::new("set permissions on", path, e))?;
        }
    }

    tracing::debug!(path = %path.display(), "directory ready");
    Ok(())
}
