//! Directory resource

use anyhow::{Context, Result, bail};
use declarative::{ApplyContext, Resource, ResourceKind};
use std::fs;
use std::path::PathBuf;

use super::{mode_matches, set_mode};

/// A directory that must exist, optionally with a permission mode
#[derive(Debug, Clone)]
pub struct Directory {
    pub path: PathBuf,
    /// Create missing parents too
    pub recursive: bool,
    pub mode: Option<u32>,
}

impl Directory {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            recursive: true,
            mode: None,
        }
    }

    pub fn recursive(mut self, recursive: bool) -> Self {
        self.recursive = recursive;
        self
    }

    pub fn with_mode(mut self, mode: Option<u32>) -> Self {
        self.mode = mode;
        self
    }
}

impl Resource for Directory {
    fn kind(&self) -> ResourceKind {
        ResourceKind::DirectoryExists
    }

    fn description(&self) -> String {
        match self.mode {
            Some(mode) => format!("Create directory {} (mode {mode:o})", self.path.display()),
            None => format!("Create directory {}", self.path.display()),
        }
    }

    fn is_satisfied(&self, _ctx: &ApplyContext) -> Result<bool> {
        match fs::metadata(&self.path) {
            Ok(meta) => Ok(meta.is_dir() && mode_matches(&meta, self.mode)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(e).with_context(|| format!("Failed to stat {}", self.path.display())),
        }
    }

    fn apply(&self, _ctx: &ApplyContext) -> Result<()> {
        if self.path.exists() && !self.path.is_dir() {
            bail!("{} exists and is not a directory", self.path.display());
        }

        if !self.path.is_dir() {
            let created = if self.recursive {
                fs::create_dir_all(&self.path)
            } else {
                fs::create_dir(&self.path)
            };
            created.with_context(|| format!("Failed to create {}", self.path.display()))?;
        }

        if let Some(mode) = self.mode {
            set_mode(&self.path, mode)?;
        }
        Ok(())
    }
}
