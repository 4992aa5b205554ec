pub mod output_writer;
pub mod synthesis_client;
pub mod voice_table_loader;
pub mod voicevox_repository;

pub use output_writer::{LocalFileWriter, OutputError, OutputWriter};
pub use synthesis_client::{ClientError, SynthesisClient};
pub use voice_table_loader::{LoaderError, VoiceTableLoader};
pub use voicevox_repository::{SpeakerCatalog, VoicevoxClient};
