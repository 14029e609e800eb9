//! Output files: fixed layout under an output root, overwrite policy, optional pretty-printing.

use crate::xml;
use std::fs::{self, File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use thiserror::Error;

pub const ITEMS_DIR: &str = "items";
pub const CHARS_DIR: &str = "chars";
pub const GUILDS_DIR: &str = "guilds";

/// Indentation used for pretty-printed XML.
pub const PRETTY_INDENT: &str = "    ";

#[derive(Debug, Error)]
pub enum OutputError {
    #[error("Cannot write {path}: directory {dir} does not exist (create it or pass --mkdir).")]
    MissingDirectory { path: PathBuf, dir: PathBuf },

    #[error("Failed to write output: {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Cannot pretty-print {path}: response is not UTF-8.")]
    NotUtf8 { path: PathBuf },

    #[error("Cannot pretty-print {path}: {source}")]
    MalformedXml {
        path: PathBuf,
        #[source]
        source: roxmltree::Error,
    },
}

/// One artifact this tool writes, relative to the output root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OutputFile {
    ItemInfo { id: String },
    ItemTooltip { id: String },
    CharacterSheet { name: String },
    GuildInfo { realm: String, guild: String },
    Outline { guild: String, realm: String },
}

impl OutputFile {
    pub fn relative_path(&self) -> PathBuf {
        match self {
            OutputFile::ItemInfo { id } => {
                Path::new(ITEMS_DIR).join(format!("{}.xml", file_component(id)))
            }
            OutputFile::ItemTooltip { id } => {
                Path::new(ITEMS_DIR).join(format!("{}-tooltip.xml", file_component(id)))
            }
            OutputFile::CharacterSheet { name } => {
                Path::new(CHARS_DIR).join(format!("{}.xml", file_component(name)))
            }
            OutputFile::GuildInfo { realm, guild } => Path::new(GUILDS_DIR).join(format!(
                "{} - {}.xml",
                file_component(realm),
                file_component(guild)
            )),
            OutputFile::Outline { guild, realm } => PathBuf::from(format!(
                "opml-{}-{}.xml",
                file_component(guild),
                file_component(realm)
            )),
        }
    }
}

/// Keep names as-is except for path separators, which would escape the layout.
fn file_component(s: &str) -> String {
    s.replace(['/', '\\'], "_")
}

/// What to do when the target file already exists.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Overwrite {
    /// Leave the existing file alone and report it as skipped.
    #[default]
    Keep,
    /// Replace the existing file (`--force`).
    Replace,
}

#[derive(Debug, Clone)]
pub struct OutputOptions {
    pub root: PathBuf,
    pub overwrite: Overwrite,
    /// Create missing `items/`, `chars/`, `guilds/` directories instead of failing.
    pub create_dirs: bool,
    pub pretty: bool,
}

impl Default for OutputOptions {
    fn default() -> Self {
        Self {
            root: PathBuf::from("."),
            overwrite: Overwrite::Keep,
            create_dirs: false,
            pretty: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WriteOutcome {
    Written(PathBuf),
    /// File existed and overwrite was not forced.
    Skipped(PathBuf),
}

impl OutputOptions {
    pub fn path_for(&self, file: &OutputFile) -> PathBuf {
        self.root.join(file.relative_path())
    }

    /// Write `body` to the location of `file`, honoring the overwrite and pretty options.
    pub fn write(&self, file: &OutputFile, body: &[u8]) -> Result<WriteOutcome, OutputError> {
        let path = self.path_for(file);
        self.ensure_parent(&path)?;
        if self.overwrite == Overwrite::Keep && path.exists() {
            tracing::debug!(path = %path.display(), "exists, not overwriting");
            return Ok(WriteOutcome::Skipped(path));
        }

        let pretty;
        let content: &[u8] = if self.pretty {
            pretty = render_pretty(&path, body)?;
            pretty.as_bytes()
        } else {
            body
        };

        let mut f = match self.open(&path) {
            Ok(f) => f,
            Err(e) if e.kind() == io::ErrorKind::AlreadyExists => {
                tracing::debug!(path = %path.display(), "exists, not overwriting");
                return Ok(WriteOutcome::Skipped(path));
            }
            Err(e) => return Err(OutputError::Io { path, source: e }),
        };
        f.write_all(content)
            .and_then(|_| f.flush())
            .map_err(|e| OutputError::Io {
                path: path.clone(),
                source: e,
            })?;
        tracing::debug!(path = %path.display(), bytes = content.len(), "wrote");
        Ok(WriteOutcome::Written(path))
    }

    fn ensure_parent(&self, path: &Path) -> Result<(), OutputError> {
        let Some(parent) = path.parent() else {
            return Ok(());
        };
        if parent.as_os_str().is_empty() || parent.is_dir() {
            return Ok(());
        }
        if !self.create_dirs {
            return Err(OutputError::MissingDirectory {
                path: path.to_path_buf(),
                dir: parent.to_path_buf(),
            });
        }
        fs::create_dir_all(parent).map_err(|e| OutputError::Io {
            path: parent.to_path_buf(),
            source: e,
        })
    }

    fn open(&self, path: &Path) -> io::Result<File> {
        match self.overwrite {
            Overwrite::Replace => File::create(path),
            Overwrite::Keep => OpenOptions::new().write(true).create_new(true).open(path),
        }
    }
}

/// Pretty-print an XML body for display or writing. `path` names the target in errors.
pub fn render_pretty(path: &Path, body: &[u8]) -> Result<String, OutputError> {
    let text = std::str::from_utf8(body).map_err(|_| OutputError::NotUtf8 {
        path: path.to_path_buf(),
    })?;
    xml::pretty_print(text, PRETTY_INDENT).map_err(|e| OutputError::MalformedXml {
        path: path.to_path_buf(),
        source: e,
    })
}
