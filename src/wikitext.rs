//! The subset of wikitext the portrait pipeline reads.
//!
//! * A heading is a line `={n} title ={m}` with `1 <= n, m <= 6`; its level
//!   is `min(n, m)`.
//! * A section starts at its heading and runs up to the next heading of the
//!   same or a higher level, so it includes its subsections. Headings inside
//!   comments do not count.
//! * A heading's title is matched as rendered text: `<ref>`s, tags, inline
//!   templates and `''` emphasis are dropped, links reduced to their label.
//! * A template is `{{name|param|...}}`. Templates nest, and so do `[[...]]`
//!   links; a `|` or `=` inside either does not split the enclosing template.
//! * A parameter containing a top-level `=` is named, otherwise it is
//!   positional and numbered from 1.
//! * `<!-- ... -->` comments are dropped before templates are read.
//!
//! Everything else (tables, tags, `{{{...}}}` arguments) is plain text.

use regex::Regex;
use std::sync::LazyLock;

static HEADING: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?m)^(={1,6})(.+?)(={1,6})[ \t\r]*$").expect("valid regex"));
static COMMENT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)<!--.*?(?:-->|\z)").expect("valid regex"));
static REF: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?s)<ref\b[^>]*?/>|<ref\b[^>]*>.*?</ref\s*>").expect("valid regex")
});
static TAG: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"<[^<>]+>").expect("valid regex"));
static LINK: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\[\[(?:[^\[\]|]*\|)?([^\[\]]*)\]\]").expect("valid regex")
});
static INNER_TEMPLATE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\{\{[^{}]*\}\}").expect("valid regex"));
static QUOTES: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"'{2,}").expect("valid regex"));

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Heading {
    pub level: usize,
    /// Title as rendered text: refs, tags, templates and emphasis dropped,
    /// links replaced by their label.
    pub title: String,
    start: usize,
}

/// Headings of `text`, skipping any that sit inside a comment.
pub fn headings(text: &str) -> Vec<Heading> {
    let comments: Vec<_> = COMMENT.find_iter(text).map(|m| m.range()).collect();
    HEADING
        .captures_iter(text)
        .filter_map(|caps| {
            let whole = caps.get(0)?;
            if comments.iter().any(|comment| comment.contains(&whole.start())) {
                return None;
            }
            let level = caps[1].len().min(caps[3].len());
            Some(Heading {
                level,
                title: plain_text(caps.get(2)?.as_str()),
                start: whole.start(),
            })
        })
        .collect()
}

fn plain_text(markup: &str) -> String {
    let text = COMMENT.replace_all(markup, "");
    let text = REF.replace_all(&text, "");
    let text = TAG.replace_all(&text, "");
    let text = INNER_TEMPLATE.replace_all(&text, "");
    let text = LINK.replace_all(&text, "$1");
    QUOTES.replace_all(&text, "").trim().to_owned()
}

/// Every section whose heading title contains `title`, ignoring case.
/// Each section starts with its heading line.
pub fn sections<'a>(text: &'a str, title: &str) -> Vec<&'a str> {
    let wanted = title.trim().to_lowercase();
    let headings = headings(text);
    headings
        .iter()
        .enumerate()
        .filter(|(_, heading)| heading.title.to_lowercase().contains(&wanted))
        .map(|(i, heading)| {
            let end = headings[i + 1..]
                .iter()
                .find(|next| next.level <= heading.level)
                .map_or(text.len(), |next| next.start);
            &text[heading.start..end]
        })
        .collect()
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Param {
    pub name: String,
    pub value: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Template {
    pub name: String,
    pub params: Vec<Param>,
}
impl Template {
    fn parse(inner: &str) -> Template {
        let mut parts = split_top_level(inner, b'|').into_iter();
        let name = parts.next().unwrap_or("").trim().to_owned();
        let mut position = 0;
        let params = parts
            .map(|part| match top_level(part, b'=').first() {
                Some(&eq) => Param {
                    name: part[..eq].trim().to_owned(),
                    value: part[eq + 1..].to_owned(),
                },
                None => {
                    position += 1;
                    Param {
                        name: position.to_string(),
                        value: part.to_owned(),
                    }
                }
            })
            .collect();
        Template { name, params }
    }
    /// The name with case, underscores and surrounding whitespace folded
    /// the way MediaWiki treats them as equivalent.
    pub fn normalized_name(&self) -> String {
        self.name.replace('_', " ").trim().to_lowercase()
    }
    /// Raw value of the parameter `name`. A repeated parameter resolves to
    /// its last occurrence.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.params
            .iter()
            .rev()
            .find(|param| param.name == name)
            .map(|param| param.value.as_str())
    }
}

/// All templates in `text`, nested ones included, outer before inner.
pub fn templates(text: &str) -> Vec<Template> {
    let text = COMMENT.replace_all(text, "");
    let mut found = Vec::new();
    collect_templates(&text, &mut found);
    found
}

fn collect_templates(text: &str, found: &mut Vec<Template>) {
    let mut pos = 0;
    while let Some(offset) = text[pos..].find("{{") {
        let start = pos + offset;
        match closing_braces(text, start) {
            Some(end) => {
                let inner = &text[start + 2..end - 2];
                found.push(Template::parse(inner));
                collect_templates(inner, found);
                pos = end;
            }
            // unbalanced, try the next opening
            None => pos = start + 2,
        }
    }
}

/// Index just past the `}}` closing the `{{` at `start`.
fn closing_braces(text: &str, start: usize) -> Option<usize> {
    let bytes = text.as_bytes();
    let mut depth = 0usize;
    let mut i = start;
    while i + 1 < bytes.len() {
        match &bytes[i..i + 2] {
            b"{{" => {
                depth += 1;
                i += 2;
            }
            b"}}" => {
                depth -= 1;
                i += 2;
                if depth == 0 {
                    return Some(i);
                }
            }
            _ => i += 1,
        }
    }
    None
}

/// Byte offsets of `sep` outside any nested template or link.
fn top_level(text: &str, sep: u8) -> Vec<usize> {
    let bytes = text.as_bytes();
    let (mut braces, mut brackets) = (0usize, 0usize);
    let mut found = Vec::new();
    let mut i = 0;
    while i < bytes.len() {
        match bytes.get(i..i + 2) {
            Some(b"{{") => braces += 1,
            Some(b"}}") if braces > 0 => braces -= 1,
            Some(b"[[") => brackets += 1,
            Some(b"]]") if brackets > 0 => brackets -= 1,
            _ => {
                if bytes[i] == sep && braces == 0 && brackets == 0 {
                    found.push(i);
                }
                i += 1;
                continue;
            }
        }
        i += 2;
    }
    found
}

fn split_top_level(text: &str, sep: u8) -> Vec<&str> {
    let mut parts = Vec::new();
    let mut from = 0;
    for at in top_level(text, sep) {
        parts.push(&text[from..at]);
        from = at + 1;
    }
    parts.push(&text[from..]);
    parts
}
