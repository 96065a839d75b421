//! Template change detection.
//!
//! Every edited template is treated as a compatibility risk unless the edit also
//! bumps the template's `@version` docblock annotation to the release being
//! prepared. The scanner never fails: unreadable input degrades to warnings.

use std::collections::HashMap;
use std::fmt;
use std::sync::OnceLock;

use regex::Regex;
use serde::Serialize;

use crate::diff::{extract_fragments, template_path_pattern, PatchFragment};
use crate::domain::Version;

pub const WARNING_MESSAGE: &str = "This template may require a version bump!";
pub const NOTICE_MESSAGE: &str = "Version bump found";

/// Classification of a template change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ChangeCode {
    /// The template's version annotation was bumped to the release
    Notice,
    /// No matching annotation; site overrides may break
    Warning,
}

impl fmt::Display for ChangeCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ChangeCode::Notice => write!(f, "notice"),
            ChangeCode::Warning => write!(f, "warning"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TemplateChange {
    pub file_path: String,
    pub code: ChangeCode,
    pub message: String,
}

impl TemplateChange {
    pub fn warning(file_path: impl Into<String>) -> Self {
        TemplateChange {
            file_path: file_path.into(),
            code: ChangeCode::Warning,
            message: WARNING_MESSAGE.to_string(),
        }
    }

    pub fn notice(file_path: impl Into<String>) -> Self {
        TemplateChange {
            file_path: file_path.into(),
            code: ChangeCode::Notice,
            message: NOTICE_MESSAGE.to_string(),
        }
    }
}

fn template_marker_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(?m)^diff --git .*templates/").expect("template marker pattern compiles")
    })
}

/// Added line, some prefix, a docblock `*`, then `@version <target>`.
fn annotation_regex(target: &Version) -> Option<Regex> {
    let pattern = format!(
        r"^\+.+\*.+@version\s+{}(?:\s|$)",
        regex::escape(&target.to_string())
    );
    Regex::new(&pattern).ok()
}

fn classify(fragment: &PatchFragment, annotation: Option<&Regex>) -> TemplateChange {
    let bumped = annotation.is_some_and(|re| {
        fragment
            .raw_lines
            .iter()
            .skip(1)
            .any(|line| re.is_match(line))
    });

    if bumped {
        TemplateChange::notice(fragment.file_path.clone())
    } else {
        TemplateChange::warning(fragment.file_path.clone())
    }
}

/// Classify every template touched by `diff` against the release `target`.
///
/// Keyed by file path; when a file appears in several fragments the last one
/// decides its classification.
pub fn scan(diff: &str, target: &Version) -> HashMap<String, TemplateChange> {
    let mut changes = HashMap::new();

    if !template_marker_regex().is_match(diff) {
        return changes;
    }

    let annotation = annotation_regex(target);
    for fragment in extract_fragments(diff, template_path_pattern()) {
        let change = classify(&fragment, annotation.as_ref());
        changes.insert(change.file_path.clone(), change);
    }

    changes
}

/// Path-ordered view of a scan result, for display and serialization.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct TemplateChangeReport {
    pub changes: Vec<TemplateChange>,
}

impl TemplateChangeReport {
    pub fn from_scan(changes: &HashMap<String, TemplateChange>) -> Self {
        let mut changes: Vec<TemplateChange> = changes.values().cloned().collect();
        changes.sort_by(|a, b| a.file_path.cmp(&b.file_path));
        TemplateChangeReport { changes }
    }

    pub fn warnings(&self) -> impl Iterator<Item = &TemplateChange> {
        self.changes
            .iter()
            .filter(|c| c.code == ChangeCode::Warning)
    }

    pub fn notices(&self) -> impl Iterator<Item = &TemplateChange> {
        self.changes.iter().filter(|c| c.code == ChangeCode::Notice)
    }

    pub fn is_empty(&self) -> bool {
        self.changes.is_empty()
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(&self.changes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hunk(path: &str, added: &str) -> String {
        format!(
            "diff --git a/{path} b/{path}\n\
             index 1111111..2222222 100644\n\
             --- a/{path}\n\
             +++ b/{path}\n\
             @@ -1,4 +1,4 @@\n \
             /**\n\
             {added}\n \
             */\n"
        )
    }

    fn target() -> Version {
        Version::parse("6.8.0").unwrap()
    }

    #[test]
    fn test_scan_no_template_marker() {
        let diff = hunk("src/Cart.php", "+ * @version 6.8.0");
        assert!(scan(&diff, &target()).is_empty());
    }

    #[test]
    fn test_scan_version_bump_found() {
        let diff = hunk("templates/foo.php", "+ * @version 6.8.0");
        let changes = scan(&diff, &target());

        assert_eq!(changes.len(), 1);
        assert_eq!(changes["templates/foo.php"], TemplateChange::notice("templates/foo.php"));
    }

    #[test]
    fn test_scan_missing_annotation_warns() {
        let diff = hunk("templates/foo.php", "+ * A new paragraph of docs");
        let changes = scan(&diff, &target());

        let change = &changes["templates/foo.php"];
        assert_eq!(change.code, ChangeCode::Warning);
        assert_eq!(change.message, WARNING_MESSAGE);
    }

    #[test]
    fn test_scan_removed_annotation_is_not_a_bump() {
        let diff = hunk("templates/foo.php", "- * @version 6.8.0");
        assert_eq!(scan(&diff, &target())["templates/foo.php"].code, ChangeCode::Warning);
    }

    #[test]
    fn test_scan_annotation_must_equal_target() {
        for line in ["+ * @version 6.7.0", "+ * @version 6.8.01", "+ * @version 6x8x0"] {
            let diff = hunk("templates/foo.php", line);
            assert_eq!(
                scan(&diff, &target())["templates/foo.php"].code,
                ChangeCode::Warning,
                "line {:?} should not count as a bump",
                line
            );
        }
    }

    #[test]
    fn test_scan_requires_docblock_star() {
        let diff = hunk("templates/foo.php", "+ @version 6.8.0");
        assert_eq!(scan(&diff, &target())["templates/foo.php"].code, ChangeCode::Warning);
    }

    #[test]
    fn test_scan_prerelease_target() {
        let target = Version::parse("6.8.0-beta.1").unwrap();
        let diff = hunk("templates/foo.php", "+ * @version 6.8.0-beta.1");
        assert_eq!(scan(&diff, &target)["templates/foo.php"].code, ChangeCode::Notice);
    }

    #[test]
    fn test_scan_last_fragment_wins() {
        let matching = hunk("templates/foo.php", "+ * @version 6.8.0");
        let plain = hunk("templates/foo.php", "+ * tweak");

        let diff = format!("{matching}{plain}");
        assert_eq!(scan(&diff, &target())["templates/foo.php"].code, ChangeCode::Warning);

        let diff = format!("{plain}{matching}");
        assert_eq!(scan(&diff, &target())["templates/foo.php"].code, ChangeCode::Notice);
    }

    #[test]
    fn test_scan_ignores_non_template_files_in_mixed_diff() {
        let diff = format!(
            "{}{}",
            hunk("src/Cart.php", "+ * @version 6.8.0"),
            hunk("plugins/woo/templates/cart/cart.php", "+ * @version 6.8.0")
        );
        let changes = scan(&diff, &target());
        assert_eq!(changes.len(), 1);
        assert!(changes.contains_key("plugins/woo/templates/cart/cart.php"));
    }

    #[test]
    fn test_scan_garbage_input_never_fails() {
        let diff = "diff --git templates/\n\u{0}\u{1}+++\n@@ garbage";
        let changes = scan(diff, &target());
        assert!(changes.values().all(|c| c.code == ChangeCode::Warning));
    }

    #[test]
    fn test_report_sorted_and_split() {
        let mut map = HashMap::new();
        map.insert("templates/b.php".to_string(), TemplateChange::warning("templates/b.php"));
        map.insert("templates/a.php".to_string(), TemplateChange::notice("templates/a.php"));

        let report = TemplateChangeReport::from_scan(&map);
        assert_eq!(report.changes[0].file_path, "templates/a.php");
        assert_eq!(report.warnings().count(), 1);
        assert_eq!(report.notices().count(), 1);

        let json = report.to_json().unwrap();
        assert!(json.contains("\"code\": \"notice\""));
        assert!(json.contains("\"file_path\": \"templates/b.php\""));
    }
}
