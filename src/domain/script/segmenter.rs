use super::model::Segment;
use regex::Regex;

/// Default per-segment character budget.
pub const DEFAULT_MAX_SEGMENT_CHARS: usize = 250;

/// Stage directions the script generator sprinkles into lines. They are not
/// speaker/style tags and must never reach the TTS engine.
pub const DEFAULT_DECORATIVE_TAGS: &[&str] = &[
    "解説", "疑問", "驚き", "理解", "落ち着き", "納得", "断定", "呼びかけ", "まとめ", "通常",
    "喜び", "怒り", "ノーマル", "あまあま", "ツンツン", "セクシー", "ヒソヒソ", "ささやき",
];

/// Characters that end a sentence; preferred split points when a segment overflows.
const SENTENCE_TERMINATORS: &[char] = &['。', '．', '！', '？', '.', '!', '?'];

#[derive(Debug, Clone)]
pub struct SegmenterConfig {
    /// Maximum characters (not bytes) per emitted segment. Must be at least 1.
    pub max_chars: usize,
    /// Tag used for untagged text when the script never names a speaker.
    pub fallback_tag: Option<String>,
    /// Bracket contents (without brackets) stripped anywhere in a line.
    pub decorative_tags: Vec<String>,
}

impl Default for SegmenterConfig {
    fn default() -> Self {
        Self {
            max_chars: DEFAULT_MAX_SEGMENT_CHARS,
            fallback_tag: None,
            decorative_tags: DEFAULT_DECORATIVE_TAGS
                .iter()
                .map(|tag| tag.to_string())
                .collect(),
        }
    }
}

/// Turns an annotated `[speaker][style] text` script into ordered segments.
pub struct ScriptSegmenter {
    config: SegmenterConfig,
    tagged_line: Regex,
    decorative_markers: Vec<String>,
}

impl ScriptSegmenter {
    pub fn new(config: SegmenterConfig) -> Result<Self, regex::Error> {
        let tagged_line = Regex::new(r"^(\[[^\[\]]+\])\s*(\[[^\[\]]+\])\s*(.*)$")?;
        let decorative_markers = config
            .decorative_tags
            .iter()
            .filter(|tag| !tag.is_empty())
            .map(|tag| format!("[{}]", tag))
            .collect();

        Ok(Self {
            config: SegmenterConfig {
                max_chars: config.max_chars.max(1),
                ..config
            },
            tagged_line,
            decorative_markers,
        })
    }

    pub fn segment(&self, script: &str) -> Vec<Segment> {
        let mut acc = Accumulator::new(self.config.max_chars);
        let mut orphan = String::new();

        for raw_line in script.lines() {
            let line = raw_line.trim();
            if line.is_empty() {
                continue;
            }

            match self.split_tagged(line) {
                Some((tag, body)) => {
                    acc.open(&tag);
                    let mut body = self.clean(body);
                    if !orphan.is_empty() {
                        tracing::warn!(
                            tag = %tag,
                            orphan_chars = orphan.chars().count(),
                            "Untagged text before the first tag joined to the next tagged line"
                        );
                        body = join_text(&std::mem::take(&mut orphan), &body);
                    }
                    acc.append(&body);
                }
                None => {
                    let body = self.clean(line);
                    if acc.is_open() {
                        acc.append(&body);
                    } else {
                        tracing::warn!(text = %line, "Untagged line with no open segment buffered");
                        orphan = join_text(&orphan, &body);
                    }
                }
            }
        }

        acc.flush();

        if !orphan.is_empty() {
            self.attach_trailing(&mut acc, &orphan);
        }

        acc.segments
    }

    /// Give leftover untagged text the last emitted tag, or the fallback tag
    /// when nothing has been emitted yet.
    fn attach_trailing(&self, acc: &mut Accumulator, orphan: &str) {
        let last_tag = acc.segments.last().map(|segment| segment.tag().to_string());
        match last_tag.or_else(|| self.config.fallback_tag.clone()) {
            Some(tag) => {
                tracing::warn!(
                    tag = %tag,
                    orphan_chars = orphan.chars().count(),
                    "Trailing untagged text synthesized with a borrowed tag"
                );
                acc.open(&tag);
                acc.append(orphan);
                acc.flush();
            }
            None => {
                tracing::error!(
                    lost_text = %orphan,
                    "Script has no tags and no fallback tag is configured; text dropped"
                );
            }
        }
    }

    /// Split a line into its combined `[speaker][style]` tag and the remaining text.
    ///
    /// A third bracket group goes through the same allow-list as the rest of the
    /// body in `clean`. Unknown groups stay in the text, since an emitted segment
    /// may legitimately start with one (orphan prefix or split remainder) and
    /// re-segmenting it must not drop it.
    fn split_tagged<'a>(&self, line: &'a str) -> Option<(String, &'a str)> {
        let captures = self.tagged_line.captures(line)?;
        let speaker = captures.get(1)?.as_str();
        let style = captures.get(2)?.as_str();
        let body = captures.get(3).map_or("", |m| m.as_str());
        Some((format!("{}{}", speaker, style), body))
    }

    /// Remove decorative markers and collapse whitespace.
    fn clean(&self, text: &str) -> String {
        let mut cleaned = text.to_string();
        for marker in &self.decorative_markers {
            if cleaned.contains(marker.as_str()) {
                cleaned = cleaned.replace(marker.as_str(), " ");
            }
        }
        cleaned.split_whitespace().collect::<Vec<_>>().join(" ")
    }
}

/// Open segment being filled under one tag.
struct Accumulator {
    max_chars: usize,
    segments: Vec<Segment>,
    tag: Option<String>,
    text: String,
    text_chars: usize,
}

impl Accumulator {
    fn new(max_chars: usize) -> Self {
        Self {
            max_chars,
            segments: Vec::new(),
            tag: None,
            text: String::new(),
            text_chars: 0,
        }
    }

    fn is_open(&self) -> bool {
        self.tag.is_some()
    }

    /// Switch to `tag`, flushing the open segment if the tag changes.
    fn open(&mut self, tag: &str) {
        if self.tag.as_deref() != Some(tag) {
            self.flush();
            self.tag = Some(tag.to_string());
        }
    }

    fn append(&mut self, addition: &str) {
        let mut rest = addition.trim();

        while !rest.is_empty() {
            let separator = usize::from(!self.text.is_empty());
            let rest_chars = rest.chars().count();

            if self.text_chars + separator + rest_chars <= self.max_chars {
                self.push(rest, rest_chars);
                return;
            }

            let capacity = self.max_chars.saturating_sub(self.text_chars + separator);
            if let Some(at) = split_point(rest, capacity, self.text.is_empty()) {
                let (head, tail) = rest.split_at(at);
                let head = head.trim_end();
                self.push(head, head.chars().count());
                rest = tail.trim_start();
            }

            tracing::warn!(
                tag = ?self.tag,
                max_chars = self.max_chars,
                "Segment reached the character budget; continuing in a new segment"
            );
            self.flush();
        }
    }

    fn push(&mut self, text: &str, chars: usize) {
        if text.is_empty() {
            return;
        }
        if !self.text.is_empty() {
            self.text.push(' ');
            self.text_chars += 1;
        }
        self.text.push_str(text);
        self.text_chars += chars;
    }

    /// Emit the open segment (if any) and keep the tag open for continuation text.
    fn flush(&mut self) {
        let text = std::mem::take(&mut self.text);
        self.text_chars = 0;

        if let Some(tag) = &self.tag {
            if let Some(segment) = Segment::new(tag.clone(), text) {
                self.segments.push(segment);
            }
        }
    }
}

/// Byte offset at which to cut `text` so the head fits in `capacity` characters.
///
/// Prefers the position just after the last sentence terminator inside the budget.
/// Without one, an empty segment takes an exact character cut while a partially
/// filled segment returns `None` so the caller starts a fresh segment instead.
fn split_point(text: &str, capacity: usize, segment_empty: bool) -> Option<usize> {
    if capacity == 0 {
        return None;
    }

    let window_end = text
        .char_indices()
        .nth(capacity)
        .map_or(text.len(), |(index, _)| index);

    let sentence_end = text[..window_end]
        .char_indices()
        .filter(|(_, c)| SENTENCE_TERMINATORS.contains(c))
        .last()
        .map(|(index, c)| index + c.len_utf8());

    match sentence_end {
        Some(end) => Some(end),
        None if segment_empty => Some(window_end),
        None => None,
    }
}

fn join_text(head: &str, tail: &str) -> String {
    match (head.is_empty(), tail.is_empty()) {
        (true, _) => tail.to_string(),
        (_, true) => head.to_string(),
        _ => format!("{} {}", head, tail),
    }
}
