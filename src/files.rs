use crate::errors::{AppError, AppResult};
use crate::models::FileLink;
use std::fs;
use std::path::Path;
use std::process::{Command, Stdio};

/// Turns picker results into links, keeping the picker's order.
pub fn links_from_selection<I, P>(selection: I, is_folder: bool) -> Vec<FileLink>
where
    I: IntoIterator<Item = P>,
    P: AsRef<Path>,
{
    selection
        .into_iter()
        .map(|path| FileLink::from_selection(path, is_folder))
        .collect()
}

/// Existence and metadata check for a dropped or typed path.
pub fn inspect_path(path: &Path) -> Option<FileLink> {
    match fs::metadata(path) {
        Ok(metadata) => Some(FileLink::from_selection(path, metadata.is_dir())),
        Err(error) => {
            tracing::debug!(path = %path.display(), error = %error, "path not inspectable");
            None
        }
    }
}

/// Opens a path with whatever the desktop considers its default handler.
pub trait Opener: Send + Sync {
    fn open(&self, path: &Path) -> AppResult<()>;
}

#[derive(Debug, Clone, Default)]
pub struct SystemOpener;

impl Opener for SystemOpener {
    fn open(&self, path: &Path) -> AppResult<()> {
        if !path.exists() {
            let name = path
                .file_name()
                .map(|value| value.to_string_lossy().to_string())
                .unwrap_or_else(|| path.to_string_lossy().to_string());
            return Err(AppError::NotFound(format!("file or folder does not exist: {name}")));
        }

        let mut command = open_command(path);
        command
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null());
        command.spawn().map_err(|error| {
            AppError::StorageIo(format!("failed to open {}: {error}", path.display()))
        })?;
        tracing::debug!(path = %path.display(), "opened with default application");
        Ok(())
    }
}

fn open_command(path: &Path) -> Command {
    if cfg!(target_os = "windows") {
        let mut command = Command::new("cmd");
        command.arg("/c").arg("start").arg("").arg(path);
        command
    } else if cfg!(target_os = "macos") {
        let mut command = Command::new("open");
        command.arg(path);
        command
    } else {
        let mut command = Command::new("xdg-open");
        command.arg(path);
        command
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn inspect_path_reports_files_and_folders() {
        let dir = tempfile::tempdir().expect("tempdir");
        let file_path = dir.path().join("pleading.docx");
        fs::write(&file_path, b"draft").expect("write");

        let file = inspect_path(&file_path).expect("file exists");
        assert_eq!(file.name, "pleading.docx");
        assert_eq!(file.extension, ".docx");
        assert!(!file.is_folder);

        let folder = inspect_path(dir.path()).expect("folder exists");
        assert!(folder.is_folder);
        assert_eq!(folder.extension, "");

        assert!(inspect_path(&dir.path().join("missing.pdf")).is_none());
    }

    #[test]
    fn selection_keeps_order() {
        let links = links_from_selection(["/a/one.pdf", "/a/two.txt"], false);
        let names: Vec<_> = links.iter().map(|link| link.name.as_str()).collect();
        assert_eq!(names, ["one.pdf", "two.txt"]);
    }

    #[test]
    fn opening_a_missing_path_is_not_found() {
        let dir = tempfile::tempdir().expect("tempdir");
        let error = SystemOpener
            .open(&dir.path().join("gone.pdf"))
            .expect_err("missing path");
        assert!(matches!(error, AppError::NotFound(message) if message.contains("gone.pdf")));
    }
}
