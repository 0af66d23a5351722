//! File download resource

use anyhow::Result;
use declarative::{ApplyContext, Resource, ResourceKind};
use std::path::PathBuf;

/// A file fetched from a URL to a fixed path
///
/// With a checksum, the file is only considered present when its SHA-256
/// matches. Without one, existence is enough.
#[derive(Debug, Clone)]
pub struct Download {
    pub url: String,
    pub dest: PathBuf,
    pub checksum: Option<String>,
}

impl Download {
    pub fn new(url: impl Into<String>, dest: impl Into<PathBuf>) -> Self {
        Self {
            url: url.into(),
            dest: dest.into(),
            checksum: None,
        }
    }

    pub fn with_checksum(mut self, checksum: Option<String>) -> Self {
        self.checksum = checksum;
        self
    }
}

impl Resource for Download {
    fn kind(&self) -> ResourceKind {
        ResourceKind::FileDownload
    }

    fn description(&self) -> String {
        format!("Download {} to {}", self.url, self.dest.display())
    }

    fn is_satisfied(&self, ctx: &ApplyContext) -> Result<bool> {
        ctx.fetcher.matches(&self.dest, self.checksum.as_deref())
    }

    fn apply(&self, ctx: &ApplyContext) -> Result<()> {
        ctx.fetcher
            .fetch(&self.url, &self.dest, self.checksum.as_deref())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resource::testing::Fakes;
    use std::fs;
    use tempfile::TempDir;

    // sha256("font bytes\n")
    const FONT_SHA: &str = "sha256:2531f0f63e5eab918ae51525b1fd7b2a2af02ed16271b9c0e828b3ba23b9b04d";

    fn source(dir: &TempDir, content: &str) -> String {
        let path = dir.path().join("source.ttf");
        fs::write(&path, content).unwrap();
        format!("file://{}", path.display())
    }

    #[test]
    fn test_download_without_checksum_checks_existence() {
        let dir = TempDir::new().unwrap();
        let url = source(&dir, "font bytes\n");
        let dest = dir.path().join("Fonts").join("Font.ttf");
        fs::create_dir_all(dest.parent().unwrap()).unwrap();

        let fakes = Fakes::default();
        let ctx = fakes.context();
        let download = Download::new(url, &dest);

        assert!(!download.is_satisfied(&ctx).unwrap());
        download.apply(&ctx).unwrap();
        assert!(download.is_satisfied(&ctx).unwrap());
        assert_eq!(fs::read_to_string(&dest).unwrap(), "font bytes\n");
    }

    #[test]
    fn test_verified_download_converges() {
        let dir = TempDir::new().unwrap();
        let url = source(&dir, "font bytes\n");
        let dest = dir.path().join("Font.ttf");

        let fakes = Fakes::default();
        let ctx = fakes.context();
        let download = Download::new(url, &dest).with_checksum(Some(FONT_SHA.to_string()));

        download.apply(&ctx).unwrap();
        assert!(download.is_satisfied(&ctx).unwrap());
    }

    #[test]
    fn test_wrong_checksum_fails_and_leaves_nothing() {
        let dir = TempDir::new().unwrap();
        let url = source(&dir, "tampered\n");
        let dest = dir.path().join("Font.ttf");

        let fakes = Fakes::default();
        let ctx = fakes.context();
        let download = Download::new(url, &dest).with_checksum(Some(FONT_SHA.to_string()));

        let err = download.apply(&ctx).unwrap_err();
        assert!(format!("{err:#}").contains("checksum"), "{err:#}");
        assert!(!dest.exists());
        assert!(!download.is_satisfied(&ctx).unwrap());
    }

    #[test]
    fn test_existing_file_with_other_content_is_not_satisfied() {
        let dir = TempDir::new().unwrap();
        let dest = dir.path().join("Font.ttf");
        fs::write(&dest, "old font\n").unwrap();

        let fakes = Fakes::default();
        let download = Download::new("https://example.com/Font.ttf", &dest)
            .with_checksum(Some(FONT_SHA.to_string()));

        assert!(!download.is_satisfied(&fakes.context()).unwrap());
    }
}
