//! Grouping of analyzer output into a renderable changeset.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::{ReleasePostError, Result};
use crate::scanner::{TemplateChange, TemplateChangeReport};

/// One entry of the analyzer's change list.
///
/// Only `category` is required. Fields the renderer does not know about are
/// kept in `extra`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChangeEntry {
    pub category: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pull_request: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub link: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl ChangeEntry {
    /// Best available one-line summary of the change
    pub fn summary(&self) -> &str {
        self.title
            .as_deref()
            .or(self.description.as_deref())
            .unwrap_or("(no description)")
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChangeGroup {
    pub category: String,
    pub entries: Vec<ChangeEntry>,
}

/// Display-ready grouping of a release's changes.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Changeset {
    /// Groups in order of first appearance of their category
    pub groups: Vec<ChangeGroup>,
    /// Template diagnostics, sorted by path
    pub template_changes: Vec<TemplateChange>,
}

impl Changeset {
    pub fn total_entries(&self) -> usize {
        self.groups.iter().map(|g| g.entries.len()).sum()
    }
}

fn parse_entry(index: usize, raw: &Value) -> Result<ChangeEntry> {
    let malformed = |reason: String| ReleasePostError::MalformedChangeEntry { index, reason };

    let object = raw
        .as_object()
        .ok_or_else(|| malformed("entry is not a JSON object".to_string()))?;

    match object.get("category") {
        Some(Value::String(_)) => {}
        Some(_) => return Err(malformed("field 'category' is not a string".to_string())),
        None => return Err(malformed("missing required field 'category'".to_string())),
    }

    serde_json::from_value(raw.clone()).map_err(|e| malformed(e.to_string()))
}

/// Group raw analyzer entries by category and attach template diagnostics.
///
/// Every raw entry ends up in exactly one group; template changes are attached
/// once, never per group.
pub fn aggregate(
    raw_changes: &[Value],
    template_changes: &HashMap<String, TemplateChange>,
) -> Result<Changeset> {
    let mut groups: Vec<ChangeGroup> = Vec::new();
    let mut positions: HashMap<String, usize> = HashMap::new();

    for (index, raw) in raw_changes.iter().enumerate() {
        let entry = parse_entry(index, raw)?;

        let position = *positions.entry(entry.category.clone()).or_insert_with(|| {
            groups.push(ChangeGroup {
                category: entry.category.clone(),
                entries: Vec::new(),
            });
            groups.len() - 1
        });
        groups[position].entries.push(entry);
    }

    Ok(Changeset {
        groups,
        template_changes: TemplateChangeReport::from_scan(template_changes).changes,
    })
}
