use jarvis_types::{ChatMessage, DashboardLinks, NormalizedMessage};
use regex::Regex;
use std::sync::LazyLock;

/// Host whose URLs are collected as dashboard links unless configured otherwise
pub const DEFAULT_DASHBOARD_HOST: &str = "app.podscribe.ai";

/// `<URL|LABEL>` rich-link markup. The URL part stops at `|` or `>` so one
/// token never swallows its neighbour.
static RICH_LINK_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"<(https?://[^|>]+)\|([^>]+)>").expect("rich link regex is valid")
});

/// Harvests dashboard URLs and strips chat rich-link markup from message text.
///
/// Both operations are pure: each message is handled on its own and the
/// output keeps thread order.
#[derive(Debug, Clone)]
pub struct LinkExtractor {
    dashboard_re: Regex,
}

impl LinkExtractor {
    /// Build an extractor for URLs on `host` (matched literally, case-sensitive).
    pub fn new(host: &str) -> Result<Self, regex::Error> {
        let pattern = format!(r"https?://{}\S*", regex::escape(host));
        Ok(Self {
            dashboard_re: Regex::new(&pattern)?,
        })
    }

    /// Every dashboard URL substring in `text`, as found (no cleanup).
    pub fn dashboard_links<'a>(&'a self, text: &'a str) -> impl Iterator<Item = &'a str> + 'a {
        self.dashboard_re.find_iter(text).map(|m| m.as_str())
    }

    /// Rewrite `<URL|LABEL>` to `URL`, dropping the label.
    pub fn strip_rich_links(text: &str) -> String {
        RICH_LINK_RE.replace_all(text, "$1").into_owned()
    }

    /// Normalize a thread and collect its dashboard links.
    ///
    /// Messages without text become empty entries rather than being dropped.
    /// Links are harvested from the raw text, before markup is rewritten.
    pub fn process(&self, messages: &[ChatMessage]) -> (Vec<NormalizedMessage>, DashboardLinks) {
        let mut links = DashboardLinks::new();
        let normalized = messages
            .iter()
            .map(|message| {
                let text = message.text.as_deref().unwrap_or("");
                for link in self.dashboard_links(text) {
                    links.insert(link);
                }
                NormalizedMessage::new(Self::strip_rich_links(text))
            })
            .collect();

        (normalized, links)
    }
}

impl Default for LinkExtractor {
    fn default() -> Self {
        Self::new(DEFAULT_DASHBOARD_HOST).expect("default dashboard host forms a valid regex")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn extractor() -> LinkExtractor {
        LinkExtractor::default()
    }

    #[test]
    fn test_plain_text_is_untouched() {
        let messages = vec![ChatMessage::new("nothing to see here, see https://example.com/x")];
        let (normalized, links) = extractor().process(&messages);

        assert_eq!(normalized[0].text, "nothing to see here, see https://example.com/x");
        assert!(links.is_empty());
    }

    #[test]
    fn test_rich_link_rewritten_to_url() {
        let out = LinkExtractor::strip_rich_links("see <https://x.com|Label> now");
        assert_eq!(out, "see https://x.com now");
    }

    #[test]
    fn test_adjacent_rich_links_rewritten_separately() {
        let out = LinkExtractor::strip_rich_links("<https://a.com|A> and <https://b.com|B>");
        assert_eq!(out, "https://a.com and https://b.com");
    }

    #[test]
    fn test_bare_angle_link_left_alone() {
        let out = LinkExtractor::strip_rich_links("<https://a.com> <mailto:x@y.z|x>");
        assert_eq!(out, "<https://a.com> <mailto:x@y.z|x>");
    }

    #[test]
    fn test_dashboard_links_extracted_and_deduped() {
        let messages = vec![
            ChatMessage::new("broken: https://app.podscribe.ai/campaign/1 see also"),
            ChatMessage::new("same https://app.podscribe.ai/campaign/1\nand http://app.podscribe.ai/x?y=1"),
        ];
        let (_, links) = extractor().process(&messages);

        assert_eq!(links.len(), 2);
        assert!(links.contains("https://app.podscribe.ai/campaign/1"));
        assert!(links.contains("http://app.podscribe.ai/x?y=1"));
    }

    #[test]
    fn test_trailing_punctuation_is_kept() {
        let (_, links) = extractor().process(&[ChatMessage::new("at https://app.podscribe.ai/a.")]);
        assert!(links.contains("https://app.podscribe.ai/a."));
    }

    #[test]
    fn test_extraction_runs_on_original_text() {
        // The rich-link token ends with `|label>`, which the raw match keeps.
        let (normalized, links) = extractor().process(&[ChatMessage::new(
            "<https://app.podscribe.ai/d/7|dashboard>",
        )]);

        assert_eq!(normalized[0].text, "https://app.podscribe.ai/d/7");
        assert!(links.contains("https://app.podscribe.ai/d/7|dashboard>"));
    }

    #[test]
    fn test_rich_link_to_other_domain_contributes_no_links() {
        let (normalized, links) =
            extractor().process(&[ChatMessage::new("<https://loom.com/v|Loom Video>")]);
        assert_eq!(normalized[0].text, "https://loom.com/v");
        assert!(links.is_empty());
    }

    #[test]
    fn test_missing_text_keeps_position() {
        let messages = vec![
            ChatMessage::new("first"),
            ChatMessage::empty(),
            ChatMessage::new("third"),
        ];
        let (normalized, _) = extractor().process(&messages);

        assert_eq!(normalized.len(), 3);
        assert!(normalized[1].is_empty());
        assert_eq!(normalized[2].text, "third");
    }

    #[test]
    fn test_host_is_matched_literally() {
        let extractor = LinkExtractor::new("app.example.com").unwrap();
        let found: Vec<_> = extractor
            .dashboard_links("https://appxexample.com/a https://app.example.com/b")
            .collect();
        assert_eq!(found, vec!["https://app.example.com/b"]);
    }

    #[test]
    fn test_extraction_idempotent_on_normalized_output() {
        let extractor = extractor();
        let messages = vec![ChatMessage::new(
            "see <https://loom.com/v|video> and https://app.podscribe.ai/z",
        )];
        let (normalized, links) = extractor.process(&messages);
        let rerun: Vec<ChatMessage> = normalized.iter().map(|m| ChatMessage::new(m.text.clone())).collect();
        let (renormalized, relinks) = extractor.process(&rerun);

        assert_eq!(links, relinks);
        assert_eq!(normalized, renormalized);
    }
}
