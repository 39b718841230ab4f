use std::fs;
use std::path::{Path, PathBuf};

use include_dir::{include_dir, Dir};
use itertools::Itertools;
use tracing::{debug, warn};

use crate::error::PassageLoadError;

static PASSAGE_DIR: Dir = include_dir!("passages");

const LABEL_PREFIX: &str = "# ";

/// A reference text and its attribution
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Passage {
    pub text: String,
    pub label: String,
}

impl Passage {
    pub fn new(text: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            label: label.into(),
        }
    }

    /// Length in characters, the amount credited when the passage is completed
    pub fn len(&self) -> usize {
        self.text.chars().count()
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    /// Parse a passage file: an optional `# label` first line, then the text.
    /// Whitespace runs, line breaks included, collapse to one space so the
    /// passage is typable on a single line.
    pub fn parse(name: &str, raw: &str) -> Result<Self, PassageLoadError> {
        let raw = raw.trim();
        let (label, body) = match raw.split_once('\n') {
            Some((first, rest)) if first.starts_with(LABEL_PREFIX) => {
                (first[LABEL_PREFIX.len()..].trim().to_string(), rest)
            }
            None if raw.starts_with(LABEL_PREFIX) => (raw[LABEL_PREFIX.len()..].to_string(), ""),
            _ => (default_label(name), raw),
        };

        let text = body.split_whitespace().join(" ");
        if text.is_empty() {
            return Err(PassageLoadError::Empty(name.to_string()));
        }

        Ok(Self { text, label })
    }
}

/// Supplier of the ordered passages for a session
pub trait PassageSource {
    fn load(&self) -> Result<Vec<Passage>, PassageLoadError>;
}

/// The three passages shipped inside the binary
#[derive(Clone, Copy, Debug, Default)]
pub struct BuiltinPassages;

impl PassageSource for BuiltinPassages {
    fn load(&self) -> Result<Vec<Passage>, PassageLoadError> {
        let files = PASSAGE_DIR
            .files()
            .filter_map(|file| {
                let name = file.path().file_name()?.to_str()?;
                passage_number(name).map(|n| (n, name, file))
            })
            .sorted_by_key(|(n, _, _)| *n)
            .collect::<Vec<_>>();

        if files.is_empty() {
            return Err(PassageLoadError::NoPassages("built-in passages".to_string()));
        }
        ensure_unique_numbers(files.iter().map(|(n, name, _)| (*n, *name)))?;

        files
            .into_iter()
            .map(|(_, name, file)| {
                let raw = file
                    .contents_utf8()
                    .ok_or_else(|| PassageLoadError::NotUtf8(file.path().to_path_buf()))?;
                Passage::parse(name, raw)
            })
            .collect()
    }
}

/// Passages read from `passage1.txt`, `passage2.txt`, ... in a directory
#[derive(Clone, Debug)]
pub struct DirectoryPassages {
    dir: PathBuf,
}

impl DirectoryPassages {
    pub fn new<P: AsRef<Path>>(dir: P) -> Self {
        Self {
            dir: dir.as_ref().to_path_buf(),
        }
    }
}

impl PassageSource for DirectoryPassages {
    fn load(&self) -> Result<Vec<Passage>, PassageLoadError> {
        let entries = fs::read_dir(&self.dir).map_err(|source| PassageLoadError::Io {
            path: self.dir.clone(),
            source,
        })?;

        let files = entries
            .filter_map(Result::ok)
            .filter_map(|entry| {
                let name = entry.file_name().into_string().ok()?;
                passage_number(&name).map(|n| (n, name, entry.path()))
            })
            .sorted_by_key(|(n, _, _)| *n)
            .collect::<Vec<_>>();

        if files.is_empty() {
            warn!(dir = %self.dir.display(), "no passage files found");
            return Err(PassageLoadError::NoPassages(self.dir.display().to_string()));
        }
        ensure_unique_numbers(files.iter().map(|(n, name, _)| (*n, name.as_str())))?;

        files
            .into_iter()
            .map(|(_, name, path)| {
                let bytes = fs::read(&path).map_err(|source| PassageLoadError::Io {
                    path: path.clone(),
                    source,
                })?;
                let raw = String::from_utf8(bytes).map_err(|_| PassageLoadError::NotUtf8(path))?;
                debug!(file = %name, "loaded passage");
                Passage::parse(&name, &raw)
            })
            .collect()
    }
}

/// `passage12.txt` -> `Some(12)`
fn passage_number(file_name: &str) -> Option<usize> {
    file_name
        .strip_prefix("passage")?
        .strip_suffix(".txt")?
        .parse()
        .ok()
}

/// `passage1.txt` and `passage01.txt` would both be passage 1.
/// Expects `(number, file name)` pairs sorted by number.
fn ensure_unique_numbers<'a>(
    numbered: impl Iterator<Item = (usize, &'a str)>,
) -> Result<(), PassageLoadError> {
    match numbered.tuple_windows().find(|((a, _), (b, _))| a == b) {
        Some(((number, first), (_, second))) => Err(PassageLoadError::DuplicateNumber {
            number,
            first: first.to_string(),
            second: second.to_string(),
        }),
        None => Ok(()),
    }
}

fn default_label(name: &str) -> String {
    name.strip_suffix(".txt").unwrap_or(name).to_string()
}
