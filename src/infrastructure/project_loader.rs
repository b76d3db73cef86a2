use crate::domain::diagnostic::FileFailure;
use crate::domain::source::SourceUnit;
use anyhow::{Context, Result};
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

/// Sources read from the command line inputs, and the inputs that could
/// not be read.
#[derive(Debug, Default)]
pub struct LoadedSources {
    pub units: Vec<SourceUnit>,
    pub failures: Vec<FileFailure>,
}

pub struct ProjectLoader;

impl ProjectLoader {
    /// Load every input path. Files are taken as given; directories are
    /// walked for `.go` files. A path that cannot be read is recorded as a
    /// failure and does not stop the others. Each file is loaded once.
    pub fn load(paths: &[PathBuf]) -> LoadedSources {
        let mut loaded = LoadedSources::default();
        let mut seen = HashSet::new();

        for path in paths {
            let files = if path.is_dir() {
                match Self::collect_go_files(path) {
                    Ok(files) => files,
                    Err(e) => {
                        log::warn!("{:#}", e);
                        loaded.failures.push(FileFailure {
                            path: path.display().to_string(),
                            error: format!("{:#}", e),
                        });
                        continue;
                    }
                }
            } else {
                vec![path.clone()]
            };

            for file in files {
                if !seen.insert(file.clone()) {
                    continue;
                }
                match Self::read_unit(&file) {
                    Ok(unit) => loaded.units.push(unit),
                    Err(e) => {
                        log::warn!("{:#}", e);
                        loaded.failures.push(FileFailure {
                            path: file.display().to_string(),
                            error: format!("{:#}", e),
                        });
                    }
                }
            }
        }

        log::info!(
            "loaded {} Go files ({} failed)",
            loaded.units.len(),
            loaded.failures.len()
        );
        loaded
    }

    /// All `.go` files under `dir`, sorted by path.
    pub fn collect_go_files(dir: &Path) -> Result<Vec<PathBuf>> {
        let mut files = Vec::new();
        Self::collect_go_recursive(dir, &mut files)?;
        files.sort();
        Ok(files)
    }

    /// Directories the go tool ignores, plus build output.
    pub fn is_skipped_dir(name: &str) -> bool {
        matches!(name, "vendor" | "testdata" | "target")
            || name.starts_with('.')
            || name.starts_with('_')
    }

    fn collect_go_recursive(dir: &Path, out: &mut Vec<PathBuf>) -> Result<()> {
        let entries = fs::read_dir(dir)
            .with_context(|| format!("Failed to read directory {}", dir.display()))?;

        for entry in entries {
            let entry =
                entry.with_context(|| format!("Failed to read directory {}", dir.display()))?;
            let path = entry.path();
            let name = entry.file_name();
            let name = name.to_string_lossy();

            if path.is_dir() {
                if Self::is_skipped_dir(&name) {
                    log::debug!("skipping {}", path.display());
                    continue;
                }
                Self::collect_go_recursive(&path, out)?;
            } else if path.extension().is_some_and(|ext| ext == "go") {
                out.push(path);
            }
        }
        Ok(())
    }

    fn read_unit(path: &Path) -> Result<SourceUnit> {
        let source = fs::read_to_string(path)
            .with_context(|| format!("Failed to read file {}", path.display()))?;
        Ok(SourceUnit::new(path.display().to_string(), source))
    }
}
