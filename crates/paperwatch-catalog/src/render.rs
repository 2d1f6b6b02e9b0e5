//! Markdown rendering of a catalog

use std::fmt::Write;

use chrono::NaiveDate;
use paperwatch_core::{CatalogEntry, field};
use serde::{Deserialize, Serialize};

use crate::catalog::Catalog;

/// How each topic's papers are laid out.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RenderStyle {
    /// One Markdown table row per paper.
    #[default]
    Table,
    /// Styled HTML cards with alternating item classes.
    List,
}

/// Layout switches for [`render_markdown`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderOptions {
    /// Output path, relative to the working directory.
    pub markdown: String,
    /// Second output for GitHub Pages, rendered with [`RenderOptions::for_gitpage`].
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gitpage: Option<String>,
    pub style: RenderStyle,
    /// Jekyll front matter and aligned table header.
    pub web: bool,
    /// `## Updated on` heading instead of a `>` quote line.
    pub title: bool,
    pub table_of_contents: bool,
    pub show_abstract: bool,
    pub back_to_top: bool,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            markdown: "README.md".to_string(),
            gitpage: None,
            style: RenderStyle::Table,
            web: false,
            title: true,
            table_of_contents: true,
            show_abstract: false,
            back_to_top: true,
        }
    }
}

impl RenderOptions {
    /// Layout of the GitHub Pages document: front matter, plain table,
    /// no navigation and no abstracts. `None` when no gitpage output is set.
    pub fn for_gitpage(&self) -> Option<Self> {
        let path = self.gitpage.clone()?;
        Some(Self {
            markdown: path,
            gitpage: None,
            style: RenderStyle::Table,
            web: true,
            title: true,
            table_of_contents: false,
            show_abstract: false,
            back_to_top: false,
        })
    }
}

const LIST_CSS: &str = r#"
<style>
.paper-list { list-style-type: none; padding: 0; margin: 0; }
.paper-item { padding: 12px 15px; margin: 15px 0; border-radius: 8px; border-left: 4px solid #ddd; }
.paper-item-odd { background-color: #f8f9fa; border-left-color: #4285f4; }
.paper-item-even { background-color: #ffffff; border-left-color: #34a853; }
.paper-header { display: flex; justify-content: space-between; align-items: flex-start; margin-bottom: 8px; }
.paper-title { font-weight: bold; font-size: 1.05em; margin: 0; flex: 1; }
.paper-date { color: #666; font-size: 0.9em; white-space: nowrap; margin-left: 15px; }
.paper-authors { color: #555; font-style: italic; margin-bottom: 5px; }
.paper-meta { display: flex; justify-content: space-between; align-items: center; font-size: 0.9em; color: #666; }
.paper-categories { font-family: monospace; background-color: #e9ecef; padding: 2px 6px; border-radius: 4px; }
.paper-link { color: #1a73e8; text-decoration: none; }
.paper-link:hover { text-decoration: underline; }
.paper-comments { color: #d93025; font-size: 0.85em; margin-top: 4px; white-space: pre-wrap; word-wrap: break-word; }
.paper-abstract { margin-top: 10px; font-size: 0.9em; line-height: 1.4; color: #555; white-space: pre-wrap; word-wrap: break-word; }
.abstract-label { font-weight: bold; color: #666; margin-bottom: 3px; }
</style>

"#;

/// GitHub-style heading anchor.
fn anchor(text: &str) -> String {
    text.trim()
        .to_lowercase()
        .chars()
        .filter_map(|c| match c {
            ' ' => Some('-'),
            c if c.is_alphanumeric() || c == '-' || c == '_' => Some(c),
            _ => None,
        })
        .collect()
}

/// Make text safe for a table cell: no newlines, no bare `|`.
fn cell(text: &str) -> String {
    text.split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .replace('|', "\\|")
}

/// Put spaces around the first `$...$` span when it is glued to its
/// neighbours, so Markdown renderers pick it up as math.
fn pretty_math(s: &str) -> String {
    let Some(open) = s.find('$') else {
        return s.to_string();
    };
    let Some(close) = s.rfind('$').filter(|&c| c > open) else {
        return s.to_string();
    };
    let before = &s[..open];
    let math = s[open + 1..close].trim();
    let after = &s[close + 1..];

    let glued = |c: Option<char>| c.is_some_and(|c| !c.is_whitespace() && c != '*');
    let mut out = String::with_capacity(s.len() + 2);
    out.push_str(before);
    if glued(before.chars().next_back()) {
        out.push(' ');
    }
    out.push('$');
    out.push_str(math);
    out.push('$');
    if glued(after.chars().next()) {
        out.push(' ');
    }
    out.push_str(after);
    out
}

fn meta<'a>(entry: &'a CatalogEntry, key: &str) -> &'a str {
    entry.record.metadata.get(key).map_or("", String::as_str)
}

fn html(text: &str) -> String {
    text.split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

fn date_text(entry: &CatalogEntry) -> String {
    entry
        .published()
        .map_or_else(|| "-".to_string(), |d| d.to_string())
}

fn paper_url(entry: &CatalogEntry) -> Option<&str> {
    let links = &entry.record.links;
    links
        .get(field::LINK_PDF)
        .or_else(|| links.get(field::LINK_ABS))
        .map(String::as_str)
}

fn write_row(out: &mut String, entry: &CatalogEntry, show_abstract: bool) {
    let record = &entry.record;
    let link = paper_url(entry)
        .map_or_else(|| cell(&record.id), |url| format!("[{}]({url})", cell(&record.id)));

    let mut row = format!(
        "|**{}**|**{}**|{}|{}|{link}|{}|",
        date_text(entry),
        cell(&record.title),
        cell(meta(entry, field::LAST_AUTHOR)),
        cell(meta(entry, field::CATEGORIES)),
        cell(meta(entry, field::COMMENT)),
    );
    if show_abstract {
        row.push_str(&cell(record.abstract_text.as_deref().unwrap_or("")));
        row.push('|');
    }
    let _ = writeln!(out, "{}", pretty_math(&row));
}

fn write_table(out: &mut String, entries: &[CatalogEntry], options: &RenderOptions) {
    let header = match (options.web, options.show_abstract) {
        (false, false) => "|Publish Date|Title|Last Author|Categories|PDF|Comments|\n|---|---|---|---|---|---|\n",
        (false, true) => "|Publish Date|Title|Last Author|Categories|PDF|Comments|Abstract|\n|---|---|---|---|---|---|---|\n",
        (true, false) => "| Publish Date | Title | Last Author | Categories | PDF | Comments |\n|:---------|:-----------------------|:---------|:----------|:------|:----------|\n",
        (true, true) => "| Publish Date | Title | Last Author | Categories | PDF | Comments | Abstract |\n|:---------|:-----------------------|:---------|:----------|:------|:----------|:----------|\n",
    };
    out.push_str(header);
    for entry in entries {
        write_row(out, entry, options.show_abstract);
    }
    out.push('\n');
}

fn write_item(out: &mut String, entry: &CatalogEntry, index: usize, show_abstract: bool) {
    let record = &entry.record;
    let class = if index % 2 == 1 { "paper-item-odd" } else { "paper-item-even" };
    let _ = writeln!(out, "<div class=\"paper-item {class}\">");
    out.push_str("  <div class=\"paper-header\">\n");
    let _ = writeln!(
        out,
        "    <div class=\"paper-title\">{}</div>",
        pretty_math(&html(&record.title))
    );
    let _ = writeln!(out, "    <div class=\"paper-date\">{}</div>", date_text(entry));
    out.push_str("  </div>\n");

    let last_author = meta(entry, field::LAST_AUTHOR);
    if !last_author.is_empty() {
        let _ = writeln!(
            out,
            "  <div class=\"paper-authors\">{} (last author)</div>",
            html(last_author)
        );
    }

    out.push_str("  <div class=\"paper-meta\">\n");
    let categories = meta(entry, field::CATEGORIES);
    if !categories.is_empty() {
        let _ = writeln!(
            out,
            "    <span class=\"paper-categories\">{}</span>",
            html(categories)
        );
    }
    let _ = writeln!(
        out,
        "    <a class=\"paper-link\" href=\"{}\" target=\"_blank\">📄 PDF: {}</a>",
        paper_url(entry).unwrap_or("#"),
        html(&record.id)
    );
    out.push_str("  </div>\n");

    let comment = meta(entry, field::COMMENT);
    if !comment.is_empty() {
        let _ = writeln!(out, "  <div class=\"paper-comments\">💬 {}</div>", html(comment));
    }
    if show_abstract && record.has_abstract() {
        out.push_str("  <div class=\"paper-abstract\">\n");
        out.push_str("    <div class=\"abstract-label\">📖 Abstract:</div>\n");
        let abstract_text = record.abstract_text.as_deref().unwrap_or("");
        let _ = writeln!(out, "    {}", pretty_math(&html(abstract_text)));
        out.push_str("  </div>\n");
    }
    out.push_str("</div>\n");
}

fn write_list(out: &mut String, entries: &[CatalogEntry], show_abstract: bool) {
    out.push_str("<div class=\"paper-list\">\n");
    for (i, entry) in entries.iter().enumerate() {
        write_item(out, entry, i + 1, show_abstract);
        if i + 1 < entries.len() {
            out.push_str("<div style=\"height: 10px;\"></div>\n");
        }
    }
    out.push_str("</div>\n\n");
}

/// Render the catalog as a Markdown document dated `today`.
///
/// Topics without entries are left out.
pub fn render_markdown(catalog: &Catalog, options: &RenderOptions, today: NaiveDate) -> String {
    let stamp = today.format("%Y.%m.%d").to_string();
    let heading = format!("Updated on {stamp}");
    let mut out = String::new();

    if options.web && options.title {
        out.push_str("---\nlayout: default\n---\n\n");
    }
    if options.title {
        let _ = writeln!(out, "## {heading}\n");
    } else {
        let _ = writeln!(out, "> {heading}\n");
    }

    let topics: Vec<_> = catalog.topics().filter(|(_, e)| !e.is_empty()).collect();

    if options.table_of_contents && !topics.is_empty() {
        out.push_str("## Table of Contents\n<ol>\n");
        for (name, _) in &topics {
            let _ = writeln!(out, "<li><a href=#{}>{name}</a></li>", anchor(name));
        }
        out.push_str("</ol>\n\n");
    }

    if options.style == RenderStyle::List && !options.web {
        out.push_str(LIST_CSS);
    }

    for (name, entries) in &topics {
        let _ = writeln!(out, "## {name}\n");
        match options.style {
            RenderStyle::Table => write_table(&mut out, entries, options),
            RenderStyle::List => write_list(&mut out, entries, options.show_abstract),
        }

        if options.back_to_top && options.title {
            let _ = writeln!(
                out,
                "<p align=right>(<a href=#{}>back to top</a>)</p>\n",
                anchor(&heading)
            );
        }
    }

    out
}
