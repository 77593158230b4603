use jarvis_pipeline::{segment_markdown, NewTicket, RichTextRun};
use serde::Serialize;

/// Longest `text.content` Notion accepts in one rich-text object
pub const MAX_TEXT_CHARS: usize = 2000;

/// Split `text` into pieces of at most [`MAX_TEXT_CHARS`] characters.
fn split_text(text: &str) -> Vec<String> {
    let chars: Vec<char> = text.chars().collect();
    chars
        .chunks(MAX_TEXT_CHARS)
        .map(|chunk| chunk.iter().collect())
        .collect()
}

/// Styling flags attached to a rich-text run; the default is unstyled text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Annotations {
    pub bold: bool,
    pub italic: bool,
    pub strikethrough: bool,
    pub underline: bool,
    pub code: bool,
    pub color: String,
}

impl Default for Annotations {
    fn default() -> Self {
        Self {
            bold: false,
            italic: false,
            strikethrough: false,
            underline: false,
            code: false,
            color: "default".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Link {
    pub url: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TextContent {
    pub content: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub link: Option<Link>,
}

/// A Notion rich-text object of type `text`
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RichText {
    #[serde(rename = "type")]
    pub kind: &'static str,
    pub text: TextContent,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub annotations: Option<Annotations>,
}

impl RichText {
    pub fn plain(content: impl Into<String>) -> Self {
        Self {
            kind: "text",
            text: TextContent {
                content: content.into(),
                link: None,
            },
            annotations: None,
        }
    }

    pub fn annotated(mut self) -> Self {
        self.annotations = Some(Annotations::default());
        self
    }
}

impl RichText {
    /// Unstyled runs for a property value; an empty value keeps one empty run.
    pub fn plain_runs(text: &str) -> Vec<Self> {
        let runs: Vec<Self> = split_text(text).into_iter().map(Self::plain).collect();
        if runs.is_empty() {
            vec![Self::plain("")]
        } else {
            runs
        }
    }

    /// Annotated runs for one body segment; every piece of a link keeps its url.
    pub fn from_run(run: &RichTextRun) -> Vec<Self> {
        split_text(run.text())
            .into_iter()
            .map(|content| {
                let mut rich = Self::plain(content);
                rich.text.link = run.url().map(|url| Link {
                    url: url.to_string(),
                });
                rich.annotated()
            })
            .collect()
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct Parent {
    pub database_id: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct TitleProperty {
    pub title: Vec<RichText>,
}

#[derive(Debug, Clone, Serialize)]
pub struct StatusRef {
    pub id: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct StatusProperty {
    pub status: StatusRef,
}

#[derive(Debug, Clone, Serialize)]
pub struct RichTextProperty {
    pub rich_text: Vec<RichText>,
}

#[derive(Debug, Clone, Serialize)]
pub struct TicketProperties {
    #[serde(rename = "Name")]
    pub name: TitleProperty,
    #[serde(rename = "Status")]
    pub status: StatusProperty,
    #[serde(rename = "Reported By")]
    pub reported_by: RichTextProperty,
}

#[derive(Debug, Clone, Serialize)]
pub struct Paragraph {
    pub rich_text: Vec<RichText>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ParagraphBlock {
    pub object: &'static str,
    #[serde(rename = "type")]
    pub kind: &'static str,
    pub paragraph: Paragraph,
}

impl ParagraphBlock {
    pub fn new(rich_text: Vec<RichText>) -> Self {
        Self {
            object: "block",
            kind: "paragraph",
            paragraph: Paragraph { rich_text },
        }
    }
}

/// Body of `POST /pages` for one ticket.
#[derive(Debug, Clone, Serialize)]
pub struct PageRequest {
    pub parent: Parent,
    pub properties: TicketProperties,
    pub children: Vec<ParagraphBlock>,
}

impl PageRequest {
    /// Build the page for `ticket` under `database_id`.
    ///
    /// The body is split into plain and link runs; markdown links become
    /// clickable text in a single paragraph block. Runs longer than
    /// [`MAX_TEXT_CHARS`] are cut into consecutive runs.
    pub fn for_ticket(database_id: &str, ticket: &NewTicket) -> Self {
        let body: Vec<RichText> = segment_markdown(&ticket.body)
            .iter()
            .flat_map(RichText::from_run)
            .collect();

        Self {
            parent: Parent {
                database_id: database_id.to_string(),
            },
            properties: TicketProperties {
                name: TitleProperty {
                    title: RichText::plain_runs(&ticket.title),
                },
                status: StatusProperty {
                    status: StatusRef {
                        id: ticket.status_id.clone(),
                    },
                },
                reported_by: RichTextProperty {
                    rich_text: RichText::plain_runs(&ticket.reporter),
                },
            },
            children: vec![ParagraphBlock::new(body)],
        }
    }
}
