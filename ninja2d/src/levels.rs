use std::path::{Path, PathBuf};

use anyhow::{bail, Result};

/// The numbered level files of a game: `0.json`, `1.json`, ...
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LevelSet {
    dir: PathBuf,
    count: usize,
}

impl LevelSet {
    /// Count the contiguous run of level files starting at `0.json`.
    ///
    /// A gap ends the run, so `0.json, 1.json, 3.json` is two levels.
    pub fn discover(dir: impl Into<PathBuf>) -> Result<Self> {
        let dir = dir.into();
        let count = (0..)
            .take_while(|&level| level_path(&dir, level).is_file())
            .count();
        if count == 0 {
            bail!("no levels found in {} (expected 0.json)", dir.display());
        }
        log::info!("found {} levels in {}", count, dir.display());
        Ok(Self { dir, count })
    }

    /// Directory the levels were found in.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Number of levels.
    pub fn len(&self) -> usize {
        self.count
    }

    /// Always false for a discovered set.
    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    /// File holding level `level`.
    pub fn path(&self, level: usize) -> PathBuf {
        level_path(&self.dir, level)
    }

    /// The level after `level`, staying on the last one once reached.
    pub fn next(&self, level: usize) -> usize {
        (level + 1).min(self.count - 1)
    }
}

fn level_path(dir: &Path, level: usize) -> PathBuf {
    dir.join(format!("{level}.json"))
}
