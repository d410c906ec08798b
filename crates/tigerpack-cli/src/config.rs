//! Build configuration

use std::path::{Path, PathBuf};

/// Paths a build operates on
///
/// The composer itself never sees these; they bound the filesystem glue
/// around it. The backup archive is the pristine input read during every
/// build, the master archive is the file the engine loads and the one each
/// build rewrites from scratch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildConfig {
    /// Archive file the engine loads; rewritten by every build
    pub master_archive_path: PathBuf,
    /// Pristine copy of the archive; read, never written
    pub master_archive_backup_path: PathBuf,
    /// Directory receiving staged payload copies for inspection
    pub staging_directory: PathBuf,
}

impl Default for BuildConfig {
    fn default() -> Self {
        Self {
            master_archive_path: PathBuf::from("patch3.000.tiger"),
            master_archive_backup_path: PathBuf::from("patch3.000.orig.tiger"),
            staging_directory: PathBuf::from("customlevel_bin"),
        }
    }
}

impl BuildConfig {
    /// Set the master archive path
    #[must_use]
    pub fn with_master_archive<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.master_archive_path = path.as_ref().to_path_buf();
        self
    }

    /// Set the pristine backup archive path
    #[must_use]
    pub fn with_master_backup<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.master_archive_backup_path = path.as_ref().to_path_buf();
        self
    }

    /// Set the staging directory
    #[must_use]
    pub fn with_staging_directory<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.staging_directory = path.as_ref().to_path_buf();
        self
    }
}
