// End-to-end tests for the narration pipeline.
//
// Each test starts an in-process fake VOICEVOX engine (axum, random port) and
// drives the real `VoicevoxClient` and `SynthesisEngine` against it. Output
// files go to a per-test temporary directory.

mod helpers;
mod test_speakers;
mod test_webhook;
