use jarvis_types::RichTextRun;
use regex::Regex;
use std::sync::LazyLock;

/// `[label](url)` on a single line, shortest match first.
static MARKDOWN_LINK_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\[(.*?)\]\((.*?)\)").expect("markdown link regex is valid")
});

/// Split text into plain and hyperlink runs, in source order.
///
/// Only Markdown inline links are recognised. Anything that does not match,
/// including unbalanced brackets, stays inside the surrounding plain run.
/// Zero-length plain runs are never produced, so empty input yields no runs.
pub fn segment_markdown(text: &str) -> Vec<RichTextRun> {
    let mut runs = Vec::new();
    let mut cursor = 0;

    for caps in MARKDOWN_LINK_RE.captures_iter(text) {
        let (Some(whole), Some(label), Some(url)) = (caps.get(0), caps.get(1), caps.get(2)) else {
            continue;
        };

        if whole.start() > cursor {
            runs.push(RichTextRun::plain(&text[cursor..whole.start()]));
        }
        runs.push(RichTextRun::link(label.as_str(), url.as_str()));
        cursor = whole.end();
    }

    if cursor < text.len() {
        runs.push(RichTextRun::plain(&text[cursor..]));
    }

    runs
}
