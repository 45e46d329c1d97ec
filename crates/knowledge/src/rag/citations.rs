//! Citation aggregation and rendering.
//!
//! Passages are grouped by normalized source path in first-seen order. Each
//! group keeps every `(page, offset)` pair of its passages, duplicates
//! included, in retrieval order.

use crate::types::Passage;
use serde::Serialize;
use std::collections::HashMap;
use std::fmt;

/// Location of one passage inside its source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Occurrence {
    pub page: Option<u32>,
    pub offset: Option<u64>,
}

impl Occurrence {
    fn is_empty(&self) -> bool {
        self.page.is_none() && self.offset.is_none()
    }
}

/// All occurrences of one source.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CitationGroup {
    /// Normalized path (forward slashes only)
    pub path: String,
    pub occurrences: Vec<Occurrence>,
}

impl CitationGroup {
    /// File name after the last `/`.
    pub fn name(&self) -> &str {
        self.path.rsplit('/').next().unwrap_or(&self.path)
    }
}

/// Replace Windows separators so one file maps to one group.
pub fn normalize_source_path(path: &str) -> String {
    path.replace('\\', "/")
}

/// Group passages by source path.
///
/// Passages without a source are skipped. The result depends only on the
/// passage list.
pub fn aggregate(passages: &[Passage]) -> Vec<CitationGroup> {
    let mut positions: HashMap<String, usize> = HashMap::new();
    let mut groups: Vec<CitationGroup> = Vec::new();

    for passage in passages {
        let Some(source) = passage.source.as_deref() else {
            continue;
        };
        let path = normalize_source_path(source);
        let occurrence = Occurrence {
            page: passage.page,
            offset: passage.offset,
        };

        match positions.get(&path) {
            Some(&idx) => groups[idx].occurrences.push(occurrence),
            None => {
                positions.insert(path.clone(), groups.len());
                groups.push(CitationGroup {
                    path,
                    occurrences: vec![occurrence],
                });
            }
        }
    }

    groups
}

/// Display strings for the citation block.
///
/// `offset` labels the passage's character offset within the extracted
/// source text. The Italian default keeps the word "riga" that readers of
/// the page know, but the number is never a line number.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CitationLabels {
    pub page: String,
    pub offset: String,
    /// Placed between occurrences of the same source
    pub separator: String,
    /// Shown when no passage carried a source
    pub no_sources: String,
}

impl Default for CitationLabels {
    fn default() -> Self {
        Self {
            page: "pagina".to_string(),
            offset: "riga".to_string(),
            separator: " - ".to_string(),
            no_sources: "Nessuna fonte disponibile.".to_string(),
        }
    }
}

/// One rendered source entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RenderedCitation {
    /// Link text (file name)
    pub name: String,
    /// Link target (normalized path)
    pub href: String,
    /// Parenthesized location list, without the parentheses
    pub suffix: Option<String>,
}

impl fmt::Display for RenderedCitation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.suffix {
            Some(suffix) => write!(f, "{} ({})", self.name, suffix),
            None => write!(f, "{}", self.name),
        }
    }
}

/// Rendered citation section.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CitationBlock {
    NoSources(String),
    Entries(Vec<RenderedCitation>),
}

fn render_occurrence(occurrence: &Occurrence, labels: &CitationLabels) -> String {
    let mut parts = Vec::with_capacity(2);
    if let Some(page) = occurrence.page {
        parts.push(format!("{} {}", labels.page, page));
    }
    if let Some(offset) = occurrence.offset {
        parts.push(format!("{} {}", labels.offset, offset));
    }
    parts.join(", ")
}

/// Render groups into display entries.
pub fn render_citations(groups: &[CitationGroup], labels: &CitationLabels) -> CitationBlock {
    if groups.is_empty() {
        return CitationBlock::NoSources(labels.no_sources.clone());
    }

    let entries = groups
        .iter()
        .map(|group| {
            let locations: Vec<String> = group
                .occurrences
                .iter()
                .filter(|o| !o.is_empty())
                .map(|o| render_occurrence(o, labels))
                .collect();

            RenderedCitation {
                name: group.name().to_string(),
                href: group.path.clone(),
                suffix: (!locations.is_empty()).then(|| locations.join(&labels.separator)),
            }
        })
        .collect();

    CitationBlock::Entries(entries)
}
