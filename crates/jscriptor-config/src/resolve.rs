//! Source file resolution
//!
//! Include entries are either glob patterns or plain paths. Globs are
//! expanded by walking from their literal prefix directory; a plain path
//! names a `.js` file or a directory searched recursively. Exclude entries
//! are always globs, matched against paths relative to the project root.
//!
//! Glob syntax: `**` matches any number of path segments, `*` matches within
//! one segment and `?` matches a single character other than `/`.

use crate::{ConfigError, ConfigResult};
use regex::Regex;
use std::path::{Component, Path, PathBuf};
use tracing::{debug, trace};
use walkdir::WalkDir;

const SOURCE_EXTENSION: &str = "js";

/// A compiled glob pattern
#[derive(Debug, Clone)]
pub struct Pattern {
    source: String,
    regex: Regex,
}

impl Pattern {
    pub fn new(glob: &str) -> ConfigResult<Self> {
        let regex = Regex::new(&glob_to_regex(glob)).map_err(|error| ConfigError::InvalidPattern {
            pattern: glob.to_string(),
            error,
        })?;
        Ok(Self {
            source: glob.to_string(),
            regex,
        })
    }

    pub fn as_str(&self) -> &str {
        &self.source
    }

    /// Whether the pattern contains wildcards
    pub fn is_glob(&self) -> bool {
        is_glob(&self.source)
    }

    /// Match a path relative to the project root
    pub fn matches(&self, relative: &Path) -> bool {
        self.regex.is_match(&normalize(relative))
    }

    /// Leading segments without wildcards, e.g. `src/lib` for `src/lib/**/*.js`
    pub fn literal_prefix(&self) -> PathBuf {
        self.source
            .split('/')
            .take_while(|segment| !is_glob(segment))
            .filter(|segment| !segment.is_empty() && *segment != ".")
            .collect()
    }
}

fn is_glob(text: &str) -> bool {
    text.contains(['*', '?'])
}

/// Translate a glob into an anchored regular expression
fn glob_to_regex(glob: &str) -> String {
    let glob = glob.strip_prefix("./").unwrap_or(glob);
    let mut out = String::with_capacity(glob.len() * 2 + 2);
    out.push('^');

    let mut rest = glob;
    while let Some(ch) = rest.chars().next() {
        if let Some(after) = rest.strip_prefix("**/") {
            out.push_str("(?:.*/)?");
            rest = after;
        } else if let Some(after) = rest.strip_prefix("**") {
            out.push_str(".*");
            rest = after;
        } else {
            match ch {
                '*' => out.push_str("[^/]*"),
                '?' => out.push_str("[^/]"),
                _ => out.push_str(&regex::escape(ch.encode_utf8(&mut [0; 4]))),
            }
            rest = &rest[ch.len_utf8()..];
        }
    }

    out.push('$');
    out
}

/// `/`-separated form of a relative path
fn normalize(path: &Path) -> String {
    path.components()
        .filter_map(|component| match component {
            Component::Normal(part) => Some(part.to_string_lossy()),
            _ => None,
        })
        .collect::<Vec<_>>()
        .join("/")
}

fn is_source_file(path: &Path) -> bool {
    path.extension().is_some_and(|ext| ext == SOURCE_EXTENSION)
}

fn walk_sources(dir: &Path, out: &mut Vec<PathBuf>) -> ConfigResult<()> {
    for entry in WalkDir::new(dir).sort_by_file_name() {
        let entry = entry?;
        if entry.file_type().is_file() && is_source_file(entry.path()) {
            out.push(entry.into_path());
        }
    }
    Ok(())
}

/// Resolve include and exclude patterns under `root`
///
/// The result is sorted and free of duplicates. Include entries that name
/// nothing on disk are skipped.
pub fn resolve_files(root: &Path, include: &[String], exclude: &[String]) -> ConfigResult<Vec<PathBuf>> {
    let excludes = exclude
        .iter()
        .map(|glob| Pattern::new(glob))
        .collect::<ConfigResult<Vec<_>>>()?;

    let mut candidates = Vec::new();
    for entry in include {
        let pattern = Pattern::new(entry)?;

        if pattern.is_glob() {
            let base = root.join(pattern.literal_prefix());
            if !base.is_dir() {
                trace!(pattern = entry.as_str(), "include base does not exist");
                continue;
            }
            let mut found = Vec::new();
            walk_sources(&base, &mut found)?;
            candidates.extend(found.into_iter().filter(|path| {
                path.strip_prefix(root)
                    .map(|relative| pattern.matches(relative))
                    .unwrap_or(false)
            }));
        } else {
            let path = root.join(entry);
            if path.is_dir() {
                walk_sources(&path, &mut candidates)?;
            } else if path.is_file() && is_source_file(&path) {
                candidates.push(path);
            }
        }
    }

    candidates.retain(|path| {
        let relative = path.strip_prefix(root).unwrap_or(path.as_path());
        match excludes.iter().find(|pattern| pattern.matches(relative)) {
            Some(pattern) => {
                trace!(path = %relative.display(), pattern = pattern.as_str(), "excluded");
                false
            }
            None => true,
        }
    });
    candidates.sort();
    candidates.dedup();

    debug!(root = %root.display(), count = candidates.len(), "resolved source files");
    Ok(candidates)
}
