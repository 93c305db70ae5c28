//! Markdown vault source: one record per note, metadata from YAML frontmatter.
//!
//! Only the frontmatter block is read. The markdown body is left to the
//! rendering pipeline.

use serde_json::Value;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};
use walkdir::WalkDir;

use super::ContentSource;
use crate::entities::{ContentRecord, Metadata, TAGS_KEY};
use crate::error::{ModelError, ModelResult};

const DEFAULT_EXTENSIONS: &[&str] = &["md", "mdx"];
const FRONTMATTER_FENCE: &str = "---";

/// Reads every note under a root directory.
#[derive(Debug, Clone)]
pub struct VaultSource {
    root: PathBuf,
    extensions: Vec<String>,
    strict_frontmatter: bool,
}

impl VaultSource {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            extensions: DEFAULT_EXTENSIONS.iter().map(|e| e.to_string()).collect(),
            strict_frontmatter: false,
        }
    }

    /// Replace the accepted note extensions (without the dot).
    pub fn with_extensions<I, S>(mut self, extensions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.extensions = extensions.into_iter().map(Into::into).collect();
        self
    }

    /// Fail on unreadable frontmatter or a note that is not UTF-8, instead of
    /// loading the note without metadata or skipping it.
    pub fn with_strict_frontmatter(mut self, strict: bool) -> Self {
        self.strict_frontmatter = strict;
        self
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn accepts(&self, path: &Path) -> bool {
        path.extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| {
                self.extensions
                    .iter()
                    .any(|accepted| accepted.eq_ignore_ascii_case(ext))
            })
    }

    /// Read one note. `None` when a lenient vault skips an undecodable file.
    fn read_note(&self, path: &Path) -> ModelResult<Option<ContentRecord>> {
        let rel_path = relative_path(&self.root, path);
        let content = match String::from_utf8(std::fs::read(path)?) {
            Ok(content) => content,
            Err(source) if !self.strict_frontmatter => {
                warn!(path = %rel_path, error = %source, "note is not valid UTF-8, skipping");
                return Ok(None);
            }
            Err(source) => {
                return Err(ModelError::Encoding {
                    path: path.to_path_buf(),
                    source,
                })
            }
        };

        let metadata = match parse_frontmatter(&content) {
            Ok(metadata) => metadata,
            Err(source) if !self.strict_frontmatter => {
                warn!(path = %rel_path, error = %source, "unreadable frontmatter, loading note without metadata");
                Metadata::new()
            }
            Err(source) => {
                return Err(ModelError::Yaml {
                    path: path.to_path_buf(),
                    source,
                })
            }
        };

        let tags: Vec<String> = metadata
            .get_str_list(TAGS_KEY)
            .into_iter()
            .map(|tag| tag.trim_start_matches('#').to_string())
            .filter(|tag| !tag.is_empty())
            .collect();

        Ok(Some(
            ContentRecord::from_source_path(rel_path)
                .with_tags(tags)
                .with_metadata(metadata),
        ))
    }
}

impl ContentSource for VaultSource {
    fn list_records(&self) -> ModelResult<Vec<ContentRecord>> {
        let mut records = Vec::new();

        for entry in WalkDir::new(&self.root).sort_by_file_name() {
            let entry = entry?;
            if !entry.file_type().is_file() || !self.accepts(entry.path()) {
                continue;
            }
            if let Some(record) = self.read_note(entry.path())? {
                records.push(record);
            }
        }

        debug!(root = %self.root.display(), count = records.len(), "loaded vault notes");
        Ok(records)
    }
}

/// Path relative to the vault root, always `/`-separated.
fn relative_path(root: &Path, path: &Path) -> String {
    let rel = path.strip_prefix(root).unwrap_or(path);
    rel.components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/")
}

/// Extract the YAML block between the opening and closing `---` fences.
fn frontmatter_block(content: &str) -> Option<&str> {
    let content = content.strip_prefix('\u{feff}').unwrap_or(content);
    let mut lines = content.split_inclusive('\n');
    let first = lines.next()?;
    if first.trim_end() != FRONTMATTER_FENCE {
        return None;
    }

    let start = first.len();
    let mut offset = start;
    for line in lines {
        if line.trim_end() == FRONTMATTER_FENCE {
            return Some(&content[start..offset]);
        }
        offset += line.len();
    }
    None
}

fn parse_frontmatter(content: &str) -> Result<Metadata, serde_yaml::Error> {
    let Some(block) = frontmatter_block(content) else {
        return Ok(Metadata::new());
    };
    if block.trim().is_empty() {
        return Ok(Metadata::new());
    }
    let fields: Option<BTreeMap<String, Value>> = serde_yaml::from_str(block)?;
    Ok(fields.map(Metadata::from).unwrap_or_default())
}
