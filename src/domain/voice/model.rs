use super::error::VoiceTableError;
use std::collections::HashMap;

/// Numeric voice/style identifier understood by the TTS engine.
pub type StyleId = u32;

/// Supported `[speaker][style]` tags and their engine style ids.
///
/// Read-only after construction; share it behind an `Arc`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VoiceTable {
    style_id_by_tag: HashMap<String, StyleId>,
    default_tag_by_speaker: HashMap<String, String>,
}

impl VoiceTable {
    /// Every default tag must itself have a style id.
    pub fn new(
        style_id_by_tag: HashMap<String, StyleId>,
        default_tag_by_speaker: HashMap<String, String>,
    ) -> Result<Self, VoiceTableError> {
        for (speaker, default_tag) in &default_tag_by_speaker {
            if !style_id_by_tag.contains_key(default_tag) {
                return Err(VoiceTableError::DanglingDefault {
                    speaker: speaker.clone(),
                    default_tag: default_tag.clone(),
                });
            }
        }

        Ok(Self {
            style_id_by_tag,
            default_tag_by_speaker,
        })
    }

    pub fn style_id(&self, tag: &str) -> Option<StyleId> {
        self.style_id_by_tag.get(tag).copied()
    }

    pub fn default_tag(&self, speaker: &str) -> Option<&str> {
        self.default_tag_by_speaker.get(speaker).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.style_id_by_tag.len()
    }

    pub fn is_empty(&self) -> bool {
        self.style_id_by_tag.is_empty()
    }

    /// Speakers that have a default style, sorted for stable log output.
    pub fn speakers(&self) -> Vec<&str> {
        let mut speakers: Vec<&str> = self
            .default_tag_by_speaker
            .keys()
            .map(String::as_str)
            .collect();
        speakers.sort_unstable();
        speakers
    }
}
