/// An upstream RSS channel and its items.
///
/// Parsed once per run. Enrichment only replaces item descriptions; the
/// channel metadata and item order are carried through to the output as-is.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Feed {
    pub title: String,
    pub link: String,
    pub description: String,
    /// `version` attribute of the `<rss>` root, if present.
    pub version: Option<String>,
    pub last_build_date: Option<String>,
    pub docs: Option<String>,
    pub language: Option<String>,
    pub items: Vec<Item>,
}

/// One syndicated post.
///
/// The link doubles as the entry ID in the emitted feed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Item {
    pub title: String,
    pub link: String,
    /// May contain HTML markup.
    pub description: String,
}

impl Item {
    pub fn new(
        title: impl Into<String>,
        link: impl Into<String>,
        description: impl Into<String>,
    ) -> Self {
        Self {
            title: title.into(),
            link: link.into(),
            description: description.into(),
        }
    }
}
