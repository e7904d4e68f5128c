//! Class-based element lookup over racecard HTML
//!
//! Deliberately small: locate elements by one class name, find the matching
//! close tag by depth counting, and reduce the inner HTML to text.

use regex::Regex;

/// Regex for an opening tag whose class list contains `class`. Capture 1 is
/// the tag name.
fn open_tag_pattern(class: &str) -> Option<Regex> {
    let c = regex::escape(class);
    let pattern = format!(
        r#"(?i)<([a-z][a-z0-9]*)\b[^>]*?\bclass\s*=\s*(?:"(?:[^"]*\s)?{c}(?:\s[^"]*)?"|'(?:[^']*\s)?{c}(?:\s[^']*)?')[^>]*>"#
    );
    Regex::new(&pattern).ok()
}

/// An element located in a document: `outer` spans the open tag through the
/// close tag, `inner` spans the content between them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ElementSpan {
    pub outer: (usize, usize),
    pub inner: (usize, usize),
}

/// Find where the element opened just before `content_start` closes.
/// Returns `(inner_end, outer_end)`.
fn close_of(html: &str, tag: &str, content_start: usize) -> Option<(usize, usize)> {
    let tags = Regex::new(&format!(r"(?i)<(/?){}\b[^>]*?(/?)>", regex::escape(tag))).ok()?;
    let mut depth = 1usize;
    for caps in tags.captures_iter(&html[content_start..]) {
        let m = caps.get(0)?;
        let closing = caps.get(1).map_or(false, |c| !c.as_str().is_empty());
        let self_closing = caps.get(2).map_or(false, |c| !c.as_str().is_empty());
        if closing {
            depth -= 1;
            if depth == 0 {
                return Some((content_start + m.start(), content_start + m.end()));
            }
        } else if !self_closing {
            depth += 1;
        }
    }
    None
}

/// All elements carrying `class`, in document order. An element whose close
/// tag is missing extends to the next match (or the end of the document).
pub fn find_by_class(html: &str, class: &str) -> Vec<ElementSpan> {
    let Some(re) = open_tag_pattern(class) else {
        return Vec::new();
    };
    let opens: Vec<(usize, usize, String)> = re
        .captures_iter(html)
        .filter_map(|caps| {
            let m = caps.get(0)?;
            let tag = caps.get(1)?.as_str().to_lowercase();
            Some((m.start(), m.end(), tag))
        })
        .collect();

    let mut spans = Vec::with_capacity(opens.len());
    let mut from = 0;
    for (i, (start, content_start, tag)) in opens.iter().enumerate() {
        // Skip matches nested inside the previous element
        if *start < from {
            continue;
        }
        let span = match close_of(html, tag, *content_start) {
            Some((inner_end, outer_end)) => ElementSpan {
                outer: (*start, outer_end),
                inner: (*content_start, inner_end),
            },
            None => {
                let end = opens.get(i + 1).map_or(html.len(), |next| next.0);
                ElementSpan {
                    outer: (*start, end),
                    inner: (*content_start, end),
                }
            }
        };
        from = span.outer.1;
        spans.push(span);
    }
    spans
}

/// Inner HTML of every element carrying `class`.
pub fn blocks_by_class<'a>(html: &'a str, class: &str) -> Vec<&'a str> {
    find_by_class(html, class)
        .into_iter()
        .map(|span| &html[span.inner.0..span.inner.1])
        .collect()
}

/// Text of the first element carrying `class`, if present.
pub fn text_by_class(fragment: &str, class: &str) -> Option<String> {
    let span = find_by_class(fragment, class).into_iter().next()?;
    Some(to_text(&fragment[span.inner.0..span.inner.1]))
}

/// Strip tags, decode common entities and collapse whitespace.
pub fn to_text(html: &str) -> String {
    normalize_ws(&decode_entities(&strip_tags(html)))
}

/// Tags that break a line when rendered. Inline tags (`b`, `i`, `a`, `span`)
/// join their text with the surrounding words.
const BLOCK_TAGS: &[&str] = &[
    "address", "article", "br", "dd", "div", "dl", "dt", "footer", "h1", "h2", "h3", "h4", "h5",
    "h6", "header", "hr", "li", "ol", "p", "section", "table", "td", "th", "tr", "ul",
];

fn is_block_tag(tag: &str) -> bool {
    let name: String = tag
        .trim_start_matches('/')
        .chars()
        .take_while(|c| c.is_ascii_alphanumeric())
        .collect::<String>()
        .to_ascii_lowercase();
    BLOCK_TAGS.contains(&name.as_str())
}

pub fn strip_tags(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut tag = String::new();
    let mut in_tag = false;
    for ch in s.chars() {
        match ch {
            '<' if !in_tag => {
                in_tag = true;
                tag.clear();
            }
            '>' if in_tag => {
                in_tag = false;
                if is_block_tag(&tag) {
                    out.push(' ');
                }
            }
            _ if in_tag => tag.push(ch),
            _ => out.push(ch),
        }
    }
    out
}

pub fn decode_entities(s: &str) -> String {
    s.replace("&nbsp;", " ")
        .replace("&#39;", "'")
        .replace("&#x27;", "'")
        .replace("&apos;", "'")
        .replace("&quot;", "\"")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&amp;", "&")
}

pub fn normalize_ws(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_find_by_class_nested() {
        let html = r#"<div class="RC-runnerRow"><div class="inner"><span>A</span></div></div><div class="RC-runnerRow x">B</div>"#;
        let blocks = blocks_by_class(html, "RC-runnerRow");
        assert_eq!(blocks.len(), 2);
        assert_eq!(blocks[0], r#"<div class="inner"><span>A</span></div>"#);
        assert_eq!(blocks[1], "B");
    }

    #[test]
    fn test_class_must_match_whole_word() {
        let html = r#"<div class="RC-runnerRowWrapper">no</div><div class='foo RC-runnerRow'>yes</div>"#;
        let blocks = blocks_by_class(html, "RC-runnerRow");
        assert_eq!(blocks, vec!["yes"]);
    }

    #[test]
    fn test_unclosed_element_runs_to_next() {
        let html = r#"<li class="row">one<li class="row">two"#;
        let blocks = blocks_by_class(html, "row");
        assert_eq!(blocks, vec!["one", "two"]);
    }

    #[test]
    fn test_text_by_class() {
        let html = r#"<a class="RC-runnerName" href="/horse/1">  Galileo&#39;s
            Dream </a><span class="RC-topspeed">78</span>"#;
        assert_eq!(text_by_class(html, "RC-runnerName").as_deref(), Some("Galileo's Dream"));
        assert_eq!(text_by_class(html, "RC-topspeed").as_deref(), Some("78"));
        assert_eq!(text_by_class(html, "RC-cardComment"), None);
    }

    #[test]
    fn test_to_text_separates_block_tags() {
        assert_eq!(to_text("<p>Led</p><p>early</p> &amp; kept on"), "Led early & kept on");
        assert_eq!(to_text("Led<br/>kept on"), "Led kept on");
    }

    #[test]
    fn test_to_text_joins_inline_tags() {
        let html = r#"<div class="RC-cardComment">Made all <b>last time</b>. Won at Ascot<i>(soft)</i>.</div>"#;
        assert_eq!(
            text_by_class(html, "RC-cardComment").as_deref(),
            Some("Made all last time. Won at Ascot(soft).")
        );
    }
}
