use clap::Parser;
use std::path::{Path, PathBuf};

/// Minimum script size, in bytes after trimming.
pub const MIN_SCRIPT_BYTES: usize = 10;

/// Narrate a `[speaker][style] text` script with a VOICEVOX engine into one WAV file.
#[derive(Parser, Debug, Clone)]
#[command(name = "voicevox-narrator")]
#[command(author, version, long_about = None)]
pub struct Cli {
    /// Script file to narrate; `-` or omitted reads stdin
    #[arg(long, short = 'f', env = "SCRIPT_FILE")]
    pub script_file: Option<PathBuf>,

    /// Destination WAV file
    #[arg(long, short = 'o')]
    pub output: String,

    /// Post the script to POST_API_URL after a successful run
    #[arg(long, short = 'p', env = "POST_API")]
    pub post_api: bool,

    /// Mode label forwarded to the webhook
    #[arg(long, short = 'm', env = "NARRATION_MODE", default_value = "solo")]
    pub mode: String,

    /// Enable debug logging
    #[arg(long, short = 'v')]
    pub verbose: bool,
}

impl Cli {
    /// Script path to read, or `None` for stdin.
    pub fn script_path(&self) -> Option<&Path> {
        self.script_file
            .as_deref()
            .filter(|path| path.as_os_str() != "-")
    }

    /// Title sent to the webhook: the output file name without extension.
    pub fn title(&self) -> String {
        Path::new(&self.output)
            .file_stem()
            .map(|stem| stem.to_string_lossy().into_owned())
            .unwrap_or_else(|| self.output.clone())
    }
}
