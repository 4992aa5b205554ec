pub mod error;
pub mod model;
pub mod resolver;

pub use error::{StyleResolutionError, VoiceTableError};
pub use model::{StyleId, VoiceTable};
pub use resolver::StyleResolver;
