pub mod model;
pub mod segmenter;

pub use model::Segment;
pub use segmenter::{ScriptSegmenter, SegmenterConfig, DEFAULT_DECORATIVE_TAGS, DEFAULT_MAX_SEGMENT_CHARS};
