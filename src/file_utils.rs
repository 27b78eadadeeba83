use anyhow::{Result, Context};
use std::fs;
use std::path::{Path, PathBuf};

// @module: File and directory utilities

// @struct: File operations utility
pub struct FileManager;

impl FileManager {
    // @checks: File existence
    pub fn file_exists<P: AsRef<Path>>(path: P) -> bool {
        path.as_ref().exists() && path.as_ref().is_file()
    }

    // @checks: Directory existence
    pub fn dir_exists<P: AsRef<Path>>(path: P) -> bool {
        path.as_ref().exists() && path.as_ref().is_dir()
    }

    // @creates: Directory and parents if needed
    pub fn ensure_dir<P: AsRef<Path>>(path: P) -> Result<()> {
        let path = path.as_ref();
        if !path.exists() {
            fs::create_dir_all(path)?;
        }
        Ok(())
    }

    /// Read a file to a string
    pub fn read_to_string<P: AsRef<Path>>(path: P) -> Result<String> {
        fs::read_to_string(&path)
            .with_context(|| format!("Failed to read file: {:?}", path.as_ref()))
    }

    /// Write a string to a file
    pub fn write_to_file<P: AsRef<Path>>(path: P, content: &str) -> Result<()> {
        // Ensure the parent directory exists
        if let Some(parent) = path.as_ref().parent() {
            Self::ensure_dir(parent)?;
        }

        fs::write(&path, content)
            .with_context(|| format!("Failed to write to file: {:?}", path.as_ref()))?;

        Ok(())
    }

    /// Copy a file from one location to another, ensuring the target directory exists
    pub fn copy_file<P1: AsRef<Path>, P2: AsRef<Path>>(from: P1, to: P2) -> Result<()> {
        let from = from.as_ref();
        let to = to.as_ref();

        if !from.exists() {
            return Err(anyhow::anyhow!("Source file does not exist: {:?}", from));
        }

        // Ensure the target directory exists
        if let Some(parent) = to.parent() {
            Self::ensure_dir(parent)?;
        }

        // Perform the copy
        fs::copy(from, to)?;

        Ok(())
    }

    /// Per-session scratch directory for manifests and intermediate audio
    ///
    /// Concurrently rendering sessions must not share work files, so every
    /// manifest path is scoped under the session identifier.
    pub fn session_work_dir<P: AsRef<Path>>(work_dir: P, session_id: &str) -> PathBuf {
        work_dir.as_ref().join("sessions").join(session_id)
    }

    /// Output path for a session's rendered video
    pub fn video_output_path<P: AsRef<Path>>(work_dir: P, session_id: &str) -> PathBuf {
        work_dir.as_ref().join("videos").join(format!("{}.mp4", session_id))
    }

    /// Output path for a session's serialized project document
    pub fn project_output_path<P: AsRef<Path>>(work_dir: P, session_id: &str) -> PathBuf {
        work_dir.as_ref().join("projects").join(format!("{}.json", session_id))
    }

    /// Write a concat-demuxer manifest listing the given media files
    ///
    /// Each entry may carry a per-entry duration directive (used by the
    /// slide pipeline). Single quotes inside paths are escaped for the
    /// demuxer's quoting rules.
    pub fn write_concat_manifest<P: AsRef<Path>>(
        path: P,
        entries: &[(PathBuf, Option<f64>)],
    ) -> Result<()> {
        let mut content = String::new();
        for (file, duration) in entries {
            let quoted = file.to_string_lossy().replace('\'', "'\\''");
            content.push_str(&format!("file '{}'\n", quoted));
            if let Some(secs) = duration {
                content.push_str(&format!("duration {}\n", secs));
            }
        }

        Self::write_to_file(path, &content)
    }
}
