pub mod error;
pub mod wav;

pub use error::WavError;
pub use wav::{combine, extract_payload, WAV_HEADER_SIZE};
