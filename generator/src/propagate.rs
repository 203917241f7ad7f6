//! Mirroring of the definition tree into the runtime artifact.
//!
//! [`plan`] walks the source tree and classifies every entry without
//! writing anything; [`propagate`] executes the plan. Definition files get
//! [`COPY_BANNER`] prepended, compiled or cache artifacts are skipped, and
//! everything else is byte-copied with its modification and access times.
//! Symbolic links to directories are not followed. Nothing in the
//! destination is ever deleted, so files removed from the source stay
//! behind in the mirror.

use std::ffi::OsStr;
use std::fs::{self, File, FileTimes};
use std::path::{Path, PathBuf};

use tracing::{debug, info};
use walkdir::WalkDir;

use crate::error::{GenerateError, Result};
use crate::writer::write_file;

/// Banner prepended to every propagated definition file.
pub const COPY_BANNER: &str = "\
// ==============================================================
// This file was automatically copied from spec.
// DO NOT EDIT - changes here will be overwritten.
// ==============================================================

";

/// Classification rules for propagated entries.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PropagationRules {
    pub definition_extensions: Vec<String>,
    pub artifact_extensions: Vec<String>,
    pub artifact_dirs: Vec<String>,
    pub banner: String,
}

impl Default for PropagationRules {
    fn default() -> Self {
        Self {
            definition_extensions: vec!["rs".into()],
            artifact_extensions: ["rlib", "rmeta", "o", "d", "pyc"]
                .into_iter()
                .map(String::from)
                .collect(),
            artifact_dirs: vec!["target".into(), "__pycache__".into()],
            banner: COPY_BANNER.to_string(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileClass {
    /// Text definition; copied with the banner.
    Definition,
    /// Compiled or cache output; never copied.
    Artifact,
    /// Anything else; copied byte for byte.
    Other,
}

impl PropagationRules {
    pub fn classify(&self, path: &Path) -> FileClass {
        let Some(ext) = path.extension().and_then(OsStr::to_str) else {
            return FileClass::Other;
        };
        if self.definition_extensions.iter().any(|e| e == ext) {
            FileClass::Definition
        } else if self.artifact_extensions.iter().any(|e| e == ext) {
            FileClass::Artifact
        } else {
            FileClass::Other
        }
    }

    pub fn is_artifact_dir(&self, name: &OsStr) -> bool {
        name.to_str()
            .is_some_and(|name| self.artifact_dirs.iter().any(|d| d == name))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    CreateDir,
    WriteWithBanner,
    Copy,
    /// Artifact file, artifact directory together with its contents, or
    /// symbolic link to a directory.
    Skip,
}

/// One planned entry, relative to the source and destination roots.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlannedEntry {
    pub relative: PathBuf,
    pub action: Action,
}

/// Counts of executed actions.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PropagationSummary {
    pub dirs: usize,
    pub with_banner: usize,
    pub copied: usize,
    pub skipped: usize,
}

/// Walks `source` in file name order and decides what happens to each entry.
///
/// Directories always precede their contents.
pub fn plan(source: &Path, rules: &PropagationRules) -> Result<Vec<PlannedEntry>> {
    let mut entries = Vec::new();
    let mut walker = WalkDir::new(source)
        .min_depth(1)
        .sort_by_file_name()
        .into_iter();

    while let Some(entry) = walker.next() {
        let entry = entry?;
        let Ok(relative) = entry.path().strip_prefix(source) else {
            continue;
        };
        let relative = relative.to_path_buf();

        let action = if entry.path_is_symlink() && entry.path().is_dir() {
            Action::Skip
        } else if entry.file_type().is_dir() {
            if rules.is_artifact_dir(entry.file_name()) {
                walker.skip_current_dir();
                Action::Skip
            } else {
                Action::CreateDir
            }
        } else {
            match rules.classify(&relative) {
                FileClass::Definition => Action::WriteWithBanner,
                FileClass::Artifact => Action::Skip,
                FileClass::Other => Action::Copy,
            }
        };
        entries.push(PlannedEntry { relative, action });
    }
    Ok(entries)
}

/// Mirrors `source` into `destination`.
///
/// # Errors
///
/// Returns [`Io`](GenerateError::Io) on any read or write failure, including
/// a definition file that is not valid UTF-8, and
/// [`WalkError`](GenerateError::WalkError) if the source cannot be walked.
pub fn propagate(
    source: &Path,
    destination: &Path,
    rules: &PropagationRules,
) -> Result<PropagationSummary> {
    let entries = plan(source, rules)?;
    fs::create_dir_all(destination).map_err(GenerateError::io(destination))?;

    let mut summary = PropagationSummary::default();
    for entry in &entries {
        let from = source.join(&entry.relative);
        let to = destination.join(&entry.relative);
        match entry.action {
            Action::CreateDir => {
                fs::create_dir_all(&to).map_err(GenerateError::io(&to))?;
                summary.dirs += 1;
            }
            Action::WriteWithBanner => {
                write_file(&to, &with_banner(&from, rules)?)?;
                summary.with_banner += 1;
            }
            Action::Copy => {
                copy_with_times(&from, &to)?;
                summary.copied += 1;
            }
            Action::Skip => {
                debug!(path = %entry.relative.display(), "Skipped artifact");
                summary.skipped += 1;
            }
        }
    }

    info!(
        source = %source.display(),
        destination = %destination.display(),
        with_banner = summary.with_banner,
        copied = summary.copied,
        skipped = summary.skipped,
        "Definitions propagated"
    );
    Ok(summary)
}

/// Relative path and expected bytes of every file [`propagate`] would write.
pub fn expected_files(source: &Path, rules: &PropagationRules) -> Result<Vec<(PathBuf, Vec<u8>)>> {
    let mut files = Vec::new();
    for entry in plan(source, rules)? {
        let from = source.join(&entry.relative);
        let contents = match entry.action {
            Action::WriteWithBanner => with_banner(&from, rules)?,
            Action::Copy => fs::read(&from).map_err(GenerateError::io(&from))?,
            Action::CreateDir | Action::Skip => continue,
        };
        files.push((entry.relative, contents));
    }
    Ok(files)
}

/// Byte-copies `from` to `to`, then carries over its modification and
/// access times where the platform reports them.
fn copy_with_times(from: &Path, to: &Path) -> Result<()> {
    fs::copy(from, to).map_err(GenerateError::io(from))?;
    let metadata = fs::metadata(from).map_err(GenerateError::io(from))?;

    let mut times = FileTimes::new();
    if let Ok(modified) = metadata.modified() {
        times = times.set_modified(modified);
    }
    if let Ok(accessed) = metadata.accessed() {
        times = times.set_accessed(accessed);
    }
    let file = File::options()
        .write(true)
        .open(to)
        .or_else(|_| File::open(to))
        .map_err(GenerateError::io(to))?;
    file.set_times(times).map_err(GenerateError::io(to))
}

fn with_banner(path: &Path, rules: &PropagationRules) -> Result<Vec<u8>> {
    let original = fs::read_to_string(path).map_err(GenerateError::io(path))?;
    let mut out = String::with_capacity(rules.banner.len() + original.len());
    out.push_str(&rules.banner);
    out.push_str(&original);
    Ok(out.into_bytes())
}
