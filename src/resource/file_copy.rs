//! File copy resource - places a local file at a destination

use anyhow::{Context, Result, bail};
use declarative::{ApplyContext, Resource, ResourceKind};
use std::fs::{self, File};
use std::io;
use std::path::{Path, PathBuf};

use super::{mode_matches, set_mode};

/// A local file copied to `dest`, optionally with a permission mode
#[derive(Debug, Clone)]
pub struct FileCopy {
    pub source: PathBuf,
    pub dest: PathBuf,
    pub mode: Option<u32>,
}

impl FileCopy {
    pub fn new(source: impl Into<PathBuf>, dest: impl Into<PathBuf>) -> Self {
        Self {
            source: source.into(),
            dest: dest.into(),
            mode: None,
        }
    }

    pub fn with_mode(mut self, mode: Option<u32>) -> Self {
        self.mode = mode;
        self
    }
}

fn digest(path: &Path) -> Result<blake3::Hash> {
    let mut file = File::open(path).with_context(|| format!("Failed to open {}", path.display()))?;
    let mut hasher = blake3::Hasher::new();
    io::copy(&mut file, &mut hasher).with_context(|| format!("Failed to read {}", path.display()))?;
    Ok(hasher.finalize())
}

/// Copy through a temp file next to `dest`, so `dest` is either the old
/// file or the complete new one
fn place(source: &Path, dest: &Path, mode: Option<u32>) -> Result<()> {
    let dir = match dest.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };

    let mut input = File::open(source)?;
    let mut tmp = tempfile::NamedTempFile::new_in(dir)?;
    io::copy(&mut input, &mut tmp)?;
    tmp.as_file().sync_all()?;

    match mode {
        Some(mode) => set_mode(tmp.path(), mode)?,
        None => fs::set_permissions(tmp.path(), input.metadata()?.permissions())?,
    }
    tmp.persist(dest).map_err(|e| e.error)?;
    Ok(())
}

impl Resource for FileCopy {
    fn kind(&self) -> ResourceKind {
        ResourceKind::FileCopy
    }

    fn description(&self) -> String {
        format!("Copy {} to {}", self.source.display(), self.dest.display())
    }

    fn is_satisfied(&self, _ctx: &ApplyContext) -> Result<bool> {
        let meta = match fs::metadata(&self.dest) {
            Ok(meta) if meta.is_file() => meta,
            Ok(_) => return Ok(false),
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(false),
            Err(e) => {
                return Err(e).with_context(|| format!("Failed to stat {}", self.dest.display()));
            }
        };
        if !mode_matches(&meta, self.mode) {
            return Ok(false);
        }
        Ok(digest(&self.source)? == digest(&self.dest)?)
    }

    fn apply(&self, _ctx: &ApplyContext) -> Result<()> {
        if !self.source.is_file() {
            bail!("Source does not exist: {}", self.source.display());
        }
        if self.dest.is_dir() {
            bail!("{} is a directory", self.dest.display());
        }

        place(&self.source, &self.dest, self.mode).with_context(|| {
            format!(
                "Failed to copy {} to {}",
                self.source.display(),
                self.dest.display()
            )
        })
    }
}
