use std::sync::OnceLock;

use regex::Regex;

/// Line prefix that starts a per-file section of a unified git diff.
pub const DIFF_MARKER: &str = "diff --git ";

/// A single file's section of a diff document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PatchFragment {
    /// Canonical (new-side) path of the file
    pub file_path: String,
    /// Lines of the fragment, starting with its marker line
    pub raw_lines: Vec<String>,
}

/// Paths with a `templates/` directory component anywhere in them.
pub fn template_path_pattern() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?:^|/)templates/.+").expect("template pattern compiles"))
}

/// Splits a diff into fragments whose path matches `path_pattern`.
///
/// A fragment starts at a [`DIFF_MARKER`] line and runs until the next marker
/// or the end of the document. Text before the first marker is ignored. No
/// matching marker simply yields no fragments.
///
/// The path is taken from the fragment's `+++ b/` or `rename to` line when it
/// has one, since unquoted headers are ambiguous for paths containing ` b/`.
pub fn extract_fragments(diff: &str, path_pattern: &Regex) -> Vec<PatchFragment> {
    split_sections(diff)
        .into_iter()
        .filter_map(|raw_lines| {
            let file_path = section_path(&raw_lines);
            path_pattern.is_match(&file_path).then_some(PatchFragment {
                file_path,
                raw_lines,
            })
        })
        .collect()
}

fn split_sections(diff: &str) -> Vec<Vec<String>> {
    let mut sections: Vec<Vec<String>> = Vec::new();

    for line in diff.lines() {
        if line.starts_with(DIFF_MARKER) {
            sections.push(vec![line.to_string()]);
        } else if let Some(section) = sections.last_mut() {
            section.push(line.to_string());
        }
    }

    sections
}

fn section_path(raw_lines: &[String]) -> String {
    let extended_header = raw_lines
        .iter()
        .skip(1)
        .take_while(|line| !line.starts_with("@@"));

    for line in extended_header {
        if let Some(path) = line.strip_prefix("rename to ") {
            return path.trim_matches('"').to_string();
        }
        if let Some(path) = line.strip_prefix("+++ ") {
            // git appends a tab to names containing spaces
            let path = path.trim_end_matches('\t').trim_matches('"');
            if let Some(path) = path.strip_prefix("b/") {
                return path.to_string();
            }
        }
    }

    raw_lines
        .first()
        .map(|header| filename_of(header))
        .unwrap_or_default()
}

/// Extracts the new-side file path from a fragment header.
///
/// Accepts both `diff --git a/old b/new` and the bare `a/old b/new` form.
/// Renames resolve to the new path.
///
/// ```
/// # use release_post::diff::filename_of;
/// assert_eq!(filename_of("diff --git a/templates/a.php b/templates/b.php"), "templates/b.php");
/// assert_eq!(filename_of("a/x/templates/y.php"), "x/templates/y.php");
/// ```
pub fn filename_of(header_line: &str) -> String {
    let unquoted = header_line.replace('"', "");
    let sides = unquoted
        .strip_prefix(DIFF_MARKER)
        .unwrap_or(&unquoted)
        .trim();

    if let Some(path) = symmetric_path(sides) {
        return path.to_string();
    }

    if let Some(index) = sides.rfind(" b/") {
        return sides[index + 3..].to_string();
    }

    sides
        .strip_prefix("b/")
        .or_else(|| sides.strip_prefix("a/"))
        .unwrap_or(sides)
        .to_string()
}

/// `a/X b/X`, the usual unrenamed header, split at its midpoint.
fn symmetric_path(sides: &str) -> Option<&str> {
    let rest = sides.strip_prefix("a/")?;
    let half = rest.len().checked_sub(3)?;
    if half % 2 != 0 {
        return None;
    }
    let half = half / 2;

    let old = rest.get(..half)?;
    let new = rest.get(half..)?.strip_prefix(" b/")?;
    (old == new).then_some(new)
}
