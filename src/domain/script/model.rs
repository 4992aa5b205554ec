/// One speaker turn to be synthesized as a single unit.
///
/// `tag` is the combined `[speaker][style]` marker and `text` is the cleaned
/// utterance. Both are fixed once the segmenter emits the segment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Segment {
    tag: String,
    text: String,
}

impl Segment {
    /// Returns `None` when either part is blank.
    pub fn new(tag: impl Into<String>, text: impl Into<String>) -> Option<Self> {
        let tag = tag.into();
        let text = text.into();
        if tag.trim().is_empty() || text.trim().is_empty() {
            return None;
        }
        Some(Self { tag, text })
    }

    pub fn tag(&self) -> &str {
        &self.tag
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    /// Number of characters (not bytes) in the text.
    pub fn char_len(&self) -> usize {
        self.text.chars().count()
    }

    /// Short preview for log lines.
    pub fn preview(&self) -> String {
        const PREVIEW_CHARS: usize = 20;
        let mut preview: String = self.text.chars().take(PREVIEW_CHARS).collect();
        if self.char_len() > PREVIEW_CHARS {
            preview.push_str("...");
        }
        preview
    }
}

/// Extract the first bracketed group (`[name]`) from a combined tag.
pub fn speaker_marker(tag: &str) -> Option<&str> {
    if !tag.starts_with('[') {
        return None;
    }
    let end = tag.find(']')?;
    if end <= 1 {
        return None;
    }
    Some(&tag[..=end])
}
