//! Document rendering collaborator and the built-in HTML renderer.

use std::fs;
use std::path::PathBuf;
use std::sync::OnceLock;

use html_escape::{encode_double_quoted_attribute, encode_text};
use regex::{Captures, Regex};
use serde::Serialize;

use crate::changeset::Changeset;
use crate::error::{ReleasePostError, Result};
use crate::pipeline::Stage;

/// Name of the release post template.
pub const RELEASE_TEMPLATE: &str = "release.html";

/// Layout used when no templates directory is configured.
const DEFAULT_LAYOUT: &str = r#"<h2>{title}</h2>
<p>Version {display_version} is now available.</p>
{changes}
<h3>Template changes</h3>
{template_changes}
<h3>Contributors</h3>
<p>{contributors}</p>
"#;

/// Values a release template can refer to.
#[derive(Debug, Serialize)]
pub struct RenderContext<'a> {
    pub contributors: &'a [String],
    pub title: &'a str,
    pub changes: &'a Changeset,
    pub display_version: &'a str,
}

pub trait Renderer {
    /// Render the template called `template_name` with `context`.
    fn render(&self, template_name: &str, context: &RenderContext<'_>) -> Result<String>;
}

/// Placeholder-substitution renderer producing HTML.
///
/// Templates refer to `{title}`, `{display_version}`, `{changes}`,
/// `{template_changes}` and `{contributors}`. Unknown placeholders are left as
/// they are.
#[derive(Debug, Clone, Default)]
pub struct HtmlRenderer {
    templates_dir: Option<PathBuf>,
}

impl HtmlRenderer {
    pub fn new(templates_dir: Option<PathBuf>) -> Self {
        HtmlRenderer { templates_dir }
    }

    fn load_template(&self, template_name: &str) -> Result<String> {
        let Some(dir) = &self.templates_dir else {
            return Ok(DEFAULT_LAYOUT.to_string());
        };

        let path = dir.join(template_name);
        fs::read_to_string(&path).map_err(|e| {
            ReleasePostError::collaborator(
                Stage::Render,
                format!("Cannot read template {}: {}", path.display(), e),
            )
        })
    }
}

fn placeholder_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\{([a-z_]+)\}").expect("placeholder pattern compiles"))
}

fn render_changes(changeset: &Changeset) -> String {
    if changeset.groups.is_empty() {
        return "<p>No changes were recorded for this release.</p>\n".to_string();
    }

    let mut html = String::new();
    for group in &changeset.groups {
        html.push_str(&format!("<h3>{}</h3>\n<ul>\n", encode_text(&group.category)));
        for entry in &group.entries {
            let summary = encode_text(entry.summary());
            match &entry.link {
                Some(link) => html.push_str(&format!(
                    "<li><a href=\"{}\">{}</a></li>\n",
                    encode_double_quoted_attribute(link),
                    summary
                )),
                None => html.push_str(&format!("<li>{}</li>\n", summary)),
            }
        }
        html.push_str("</ul>\n");
    }
    html
}

fn render_template_changes(changeset: &Changeset) -> String {
    if changeset.template_changes.is_empty() {
        return "<p>No template files changed.</p>\n".to_string();
    }

    let mut html = String::from("<ul>\n");
    for change in &changeset.template_changes {
        html.push_str(&format!(
            "<li class=\"{}\"><code>{}</code>: {}</li>\n",
            change.code,
            encode_text(&change.file_path),
            encode_text(&change.message)
        ));
    }
    html.push_str("</ul>\n");
    html
}

impl Renderer for HtmlRenderer {
    fn render(&self, template_name: &str, context: &RenderContext<'_>) -> Result<String> {
        let template = self.load_template(template_name)?;

        let changes = render_changes(context.changes);
        let template_changes = render_template_changes(context.changes);
        let contributors = context
            .contributors
            .iter()
            .map(|c| encode_text(c))
            .collect::<Vec<_>>()
            .join(", ");

        // Single pass, so substituted text is never scanned for placeholders again.
        let rendered = placeholder_regex().replace_all(&template, |caps: &Captures| {
            match &caps[1] {
                "title" => encode_text(context.title).into_owned(),
                "display_version" => encode_text(context.display_version).into_owned(),
                "changes" => changes.clone(),
                "template_changes" => template_changes.clone(),
                "contributors" => contributors.clone(),
                _ => caps[0].to_string(),
            }
        });

        Ok(rendered.into_owned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::changeset::aggregate;
    use crate::scanner::TemplateChange;
    use serde_json::json;
    use std::collections::HashMap;
    use tempfile::TempDir;

    fn changeset() -> Changeset {
        let mut templates = HashMap::new();
        templates.insert(
            "templates/cart.php".to_string(),
            TemplateChange::warning("templates/cart.php"),
        );
        aggregate(
            &[
                json!({"category": "fix", "title": "Fix <cart>", "link": "https://example.com/1"}),
                json!({"category": "feature", "description": "Blocks"}),
            ],
            &templates,
        )
        .unwrap()
    }

    #[test]
    fn test_default_layout() {
        let changes = changeset();
        let contributors = vec!["Ada".to_string(), "Grace".to_string()];
        let context = RenderContext {
            contributors: &contributors,
            title: "WooCommerce 6.8.0 Released",
            changes: &changes,
            display_version: "6.8.0",
        };

        let html = HtmlRenderer::default().render(RELEASE_TEMPLATE, &context).unwrap();
        assert!(html.contains("<h2>WooCommerce 6.8.0 Released</h2>"));
        assert!(html.contains("<a href=\"https://example.com/1\">Fix &lt;cart&gt;</a>"));
        assert!(html.contains("<li>Blocks</li>"));
        assert!(html.contains("<li class=\"warning\"><code>templates/cart.php</code>"));
        assert!(html.contains("Ada, Grace"));
    }

    #[test]
    fn test_custom_template_and_unknown_placeholder() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("post.html"), "{title} | {unknown} | {contributors}").unwrap();

        let changes = Changeset::default();
        let contributors = vec!["{title}".to_string()];
        let context = RenderContext {
            contributors: &contributors,
            title: "T",
            changes: &changes,
            display_version: "1.0.0",
        };

        let html = HtmlRenderer::new(Some(dir.path().to_path_buf()))
            .render("post.html", &context)
            .unwrap();
        assert_eq!(html, "T | {unknown} | {title}");
    }

    #[test]
    fn test_missing_template_fails() {
        let dir = TempDir::new().unwrap();
        let changes = Changeset::default();
        let context = RenderContext {
            contributors: &[],
            title: "T",
            changes: &changes,
            display_version: "1.0.0",
        };

        let err = HtmlRenderer::new(Some(dir.path().to_path_buf()))
            .render(RELEASE_TEMPLATE, &context)
            .unwrap_err();
        assert!(matches!(
            err,
            ReleasePostError::CollaboratorFailure {
                stage: Stage::Render,
                ..
            }
        ));
    }

    #[test]
    fn test_entries_are_escaped() {
        let changes = aggregate(
            &[json!({
                "category": "fix & polish",
                "title": "<b>bold</b>",
                "link": "https://example.com/?a=1&b=\"2\""
            })],
            &HashMap::new(),
        )
        .unwrap();
        let context = RenderContext {
            contributors: &[],
            title: "Tom & Jerry",
            changes: &changes,
            display_version: "1.0.0",
        };

        let html = HtmlRenderer::default().render(RELEASE_TEMPLATE, &context).unwrap();
        assert!(html.contains("<h2>Tom &amp; Jerry</h2>"));
        assert!(html.contains("<h3>fix &amp; polish</h3>"));
        assert!(html.contains(
            "<a href=\"https://example.com/?a=1&amp;b=&quot;2&quot;\">&lt;b&gt;bold&lt;/b&gt;</a>"
        ));
    }
}
