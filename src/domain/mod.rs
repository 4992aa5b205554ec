pub mod audio;
pub mod script;
pub mod synthesis;
pub mod voice;
