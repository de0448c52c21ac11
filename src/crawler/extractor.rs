//! Readable-text extraction from rendered pages
//!
//! Text is gathered only from content-bearing elements (`p`, `div`, `span`,
//! `a`). Anything inside `script`, `style`, `noscript`, `template` or an
//! element carrying the `jquery-script` widget class is dropped. Each text
//! node is taken once, so nested content elements do not repeat their text.
//! Inline markup joins its text with the surrounding text; block elements
//! start a new line.

use scraper::{ElementRef, Html, Node, Selector};

const CONTENT_TAGS: &[&str] = &["p", "div", "span", "a"];
const STRIPPED_TAGS: &[&str] = &["script", "style", "noscript", "template"];
const STRIPPED_CLASS: &str = "jquery-script";
const INLINE_TAGS: &[&str] = &[
    "a", "abbr", "b", "cite", "code", "em", "font", "i", "label", "mark", "q", "s", "small",
    "span", "strong", "sub", "sup", "time", "u",
];

/// Title and cleaned text of one page
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractedContent {
    /// Trimmed `<title>` text, `None` if the document has no title
    pub title: Option<String>,
    /// Cleaned, whitespace-normalized text
    pub text: String,
}

/// Extracts the title and cleaned text of an HTML document
///
/// # Example
///
/// ```
/// use sitegrab::crawler::extract;
///
/// let page = extract("<title>Home</title><p>Hello <span>world</span></p><script>x()</script>");
/// assert_eq!(page.title.as_deref(), Some("Home"));
/// assert_eq!(page.text, "Hello world");
/// ```
pub fn extract(html: &str) -> ExtractedContent {
    let document = Html::parse_document(html);

    let title = extract_title(&document);

    let mut raw = String::new();
    collect_text(document.root_element(), false, &mut raw);

    ExtractedContent {
        title,
        text: clean_text(&raw),
    }
}

/// Appends the text under `element` to `out`
///
/// Text nodes are appended as-is, so words split across inline markup stay
/// whole. Block elements and dropped text are bounded by line breaks, which
/// `clean_text` later folds into single spaces.
fn collect_text(element: ElementRef<'_>, in_content: bool, out: &mut String) {
    let name = element.value().name();
    if STRIPPED_TAGS.contains(&name) || has_class(&element, STRIPPED_CLASS) {
        out.push('\n');
        return;
    }

    let in_content = in_content || CONTENT_TAGS.contains(&name);
    let block = !INLINE_TAGS.contains(&name);
    if block {
        out.push('\n');
    }

    for child in element.children() {
        match child.value() {
            Node::Text(text) if in_content => out.push_str(text),
            Node::Text(_) => out.push('\n'),
            Node::Element(_) => {
                if let Some(child) = ElementRef::wrap(child) {
                    collect_text(child, in_content, out);
                }
            }
            _ => {}
        }
    }

    if block {
        out.push('\n');
    }
}

fn extract_title(document: &Html) -> Option<String> {
    let selector = Selector::parse("title").ok()?;
    document
        .select(&selector)
        .next()
        .map(|element| element.text().collect::<String>().trim().to_string())
        .filter(|s| !s.is_empty())
}

fn has_class(element: &ElementRef<'_>, class: &str) -> bool {
    element
        .value()
        .attr("class")
        .map(|classes| classes.split_whitespace().any(|c| c == class))
        .unwrap_or(false)
}

/// Normalizes whitespace in extracted text
///
/// Trims the whole text, drops lines that are blank after trimming, then
/// collapses every remaining whitespace run into a single space. Applying it
/// twice gives the same result as applying it once.
pub fn clean_text(text: &str) -> String {
    let trimmed = text.trim();
    let without_blank_lines = remove_blank_lines(trimmed);
    remove_extra_spaces(&without_blank_lines)
}

fn remove_blank_lines(text: &str) -> String {
    text.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}

fn remove_extra_spaces(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}
