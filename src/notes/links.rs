use std::collections::BTreeSet;
use std::ops::Range;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

static WIKILINK: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\[\[([^\[\]]+)\]\]").expect("valid regex"));

// `![alt](src)` is captured through the leading `!` so image embeds can be told apart.
static MARKDOWN_LINK: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(!?)\[[^\[\]]*\]\(\s*(?:<([^<>\n]+)>|([^()\s]+))(?:\s+"[^"]*")?\s*\)"#)
        .expect("valid regex")
});

static TAG: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?:^|[^\w/#&\[(])#(\w[\w-]*)").expect("valid regex"));

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LinkKind {
    Wikilink,
    #[serde(rename = "mdlink")]
    Markdown,
}

/// A link target as written in a note, before resolution.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RawLink {
    pub target: String,
    pub kind: LinkKind,
}

impl RawLink {
    fn new(target: impl Into<String>, kind: LinkKind) -> Self {
        Self {
            target: target.into(),
            kind,
        }
    }
}

/// Extracts wikilinks and Markdown links from a note body in document order.
///
/// Wikilink targets drop any `#section` or `|alias` suffix. Markdown links
/// to `http://` or `https://` URLs and image embeds are skipped.
pub fn extract_links(content: &str) -> Vec<RawLink> {
    let mut found: Vec<(usize, RawLink)> = Vec::new();
    let mut wikilink_spans: Vec<Range<usize>> = Vec::new();

    for captures in WIKILINK.captures_iter(content) {
        let (Some(whole), Some(inner)) = (captures.get(0), captures.get(1)) else {
            continue;
        };
        wikilink_spans.push(whole.range());

        let target = wikilink_target(inner.as_str());
        if !target.is_empty() {
            found.push((whole.start(), RawLink::new(target, LinkKind::Wikilink)));
        }
    }

    for captures in MARKDOWN_LINK.captures_iter(content) {
        let Some(whole) = captures.get(0) else {
            continue;
        };
        if wikilink_spans.iter().any(|span| span.contains(&whole.start())) {
            continue;
        }
        if captures.get(1).is_some_and(|bang| !bang.as_str().is_empty()) {
            continue;
        }

        let raw = captures
            .get(2)
            .or_else(|| captures.get(3))
            .map(|target| target.as_str())
            .unwrap_or_default();
        if let Some(target) = markdown_target(raw) {
            found.push((whole.start(), RawLink::new(target, LinkKind::Markdown)));
        }
    }

    found.sort_by_key(|(offset, _)| *offset);
    found.into_iter().map(|(_, link)| link).collect()
}

/// Collects `#tag` markers from a note body, marker stripped.
pub fn extract_tags(content: &str) -> BTreeSet<String> {
    TAG.captures_iter(content)
        .filter_map(|captures| captures.get(1))
        .map(|tag| tag.as_str().to_owned())
        .collect()
}

fn wikilink_target(inner: &str) -> &str {
    let end = inner.find(['#', '|']).unwrap_or(inner.len());
    inner[..end].trim()
}

fn markdown_target(raw: &str) -> Option<String> {
    let raw = raw.trim();
    let lowered = raw.to_ascii_lowercase();
    if lowered.starts_with("http://") || lowered.starts_with("https://") {
        return None;
    }

    let without_fragment = raw.split('#').next().unwrap_or(raw);
    let target = without_fragment.replace("%20", " ");
    let target = target.trim();
    if target.is_empty() {
        None
    } else {
        Some(target.to_owned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn targets(content: &str) -> Vec<(String, LinkKind)> {
        extract_links(content)
            .into_iter()
            .map(|link| (link.target, link.kind))
            .collect()
    }

    #[test]
    fn test_wikilink_forms() {
        let links = targets("[[Plain]] [[With Section#Intro]] [[Aliased|shown text]] [[ Spaced ]]");
        assert_eq!(
            links,
            vec![
                ("Plain".to_owned(), LinkKind::Wikilink),
                ("With Section".to_owned(), LinkKind::Wikilink),
                ("Aliased".to_owned(), LinkKind::Wikilink),
                ("Spaced".to_owned(), LinkKind::Wikilink),
            ]
        );
    }

    #[test]
    fn test_empty_wikilink_targets_are_dropped() {
        assert!(targets("[[#only-a-section]] [[|alias]] [[   ]]").is_empty());
    }

    #[test]
    fn test_markdown_links_skip_external_urls() {
        let links = targets(
            "[plan](./project-plan.md) [site](https://example.com) [old](HTTP://example.com/x) [roadmap](docs/roadmap.md#goals)",
        );
        assert_eq!(
            links,
            vec![
                ("./project-plan.md".to_owned(), LinkKind::Markdown),
                ("docs/roadmap.md".to_owned(), LinkKind::Markdown),
            ]
        );
    }

    #[test]
    fn test_markdown_link_variants() {
        let links = targets(
            r#"![diagram](diagram.png) [a](<my note.md>) [b](b.md "Title") [c](#local) [d](Some%20Note.md)"#,
        );
        assert_eq!(
            links,
            vec![
                ("my note.md".to_owned(), LinkKind::Markdown),
                ("b.md".to_owned(), LinkKind::Markdown),
                ("Some Note.md".to_owned(), LinkKind::Markdown),
            ]
        );
    }

    #[test]
    fn test_mixed_links_keep_document_order() {
        let links = targets("first [md](one.md) then [[two]] and [again](three)");
        let order = links.iter().map(|(target, _)| target.as_str()).collect::<Vec<_>>();
        assert_eq!(order, vec!["one.md", "two", "three"]);
    }

    #[test]
    fn test_no_links_in_plain_text() {
        assert!(targets("no links here, just [brackets] and (parens)").is_empty());
        assert!(targets("").is_empty());
    }

    #[test]
    fn test_extract_tags() {
        let tags = extract_tags("#project notes about #rust-lang and #project again\n#todo");
        let tags = tags.into_iter().collect::<Vec<_>>();
        assert_eq!(tags, vec!["project", "rust-lang", "todo"]);
    }

    #[test]
    fn test_tags_ignore_headings_anchors_and_links() {
        let content = "# Heading\n## Sub\n[[Note#section]] [x](page.md#frag) [y](#local) a#b &#39; url/#x";
        assert!(extract_tags(content).is_empty());
    }
}
