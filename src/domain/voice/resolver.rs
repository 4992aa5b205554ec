use super::error::StyleResolutionError;
use super::model::{StyleId, VoiceTable};
use crate::domain::script::model::speaker_marker;
use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::Arc;

/// Maps segment tags to style ids, falling back to the speaker's default style.
///
/// Resolutions (including fallbacks) are memoised per requested tag. Safe to
/// share across workers.
pub struct StyleResolver {
    table: Arc<VoiceTable>,
    cache: RwLock<HashMap<String, StyleId>>,
}

impl StyleResolver {
    pub fn new(table: Arc<VoiceTable>) -> Self {
        Self {
            table,
            cache: RwLock::new(HashMap::new()),
        }
    }

    /// Resolve `tag` for the segment at `index`.
    pub fn resolve(&self, tag: &str, index: usize) -> Result<StyleId, StyleResolutionError> {
        if let Some(id) = self.cache.read().get(tag) {
            return Ok(*id);
        }

        let id = self.lookup(tag, index)?;
        self.cache.write().insert(tag.to_string(), id);
        Ok(id)
    }

    pub fn cached_len(&self) -> usize {
        self.cache.read().len()
    }

    fn lookup(&self, tag: &str, index: usize) -> Result<StyleId, StyleResolutionError> {
        if let Some(id) = self.table.style_id(tag) {
            return Ok(id);
        }

        let fallback = speaker_marker(tag)
            .and_then(|speaker| self.table.default_tag(speaker))
            .and_then(|default_tag| {
                self.table
                    .style_id(default_tag)
                    .map(|id| (default_tag, id))
            });

        match fallback {
            Some((default_tag, id)) => {
                tracing::warn!(
                    tag = %tag,
                    fallback_tag = %default_tag,
                    style_id = id,
                    segment = index,
                    "Style not supported, using speaker default"
                );
                Ok(id)
            }
            None => Err(StyleResolutionError::UnknownStyle {
                tag: tag.to_string(),
                index,
            }),
        }
    }
}
