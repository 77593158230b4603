use jarvis_types::{DashboardLinks, NormalizedMessage, ThreadDocument};

/// Render a normalized thread as the text sent to the language model.
///
/// Layout:
///
/// ```text
/// Reported by: <name>
/// - <message>
/// - <message>
///
/// - Dashboard Link: <url>
/// ```
///
/// Empty messages are skipped. The link block, and the blank line before it,
/// appear only when there is at least one link.
pub fn format_thread(
    messages: &[NormalizedMessage],
    links: &DashboardLinks,
    reporter: &str,
) -> ThreadDocument {
    let body = messages
        .iter()
        .filter(|message| !message.is_empty())
        .map(|message| format!("- {}", message.text))
        .collect::<Vec<_>>()
        .join("\n");

    let mut document = format!("Reported by: {reporter}\n{body}");

    if !links.is_empty() {
        let link_block = links
            .iter()
            .map(|link| format!("- Dashboard Link: {link}"))
            .collect::<Vec<_>>()
            .join("\n");
        document.push_str("\n\n");
        document.push_str(&link_block);
    }

    ThreadDocument::new(document)
}
