//! Minimal RIFF/WAVE handling for the canonical 44-byte header layout returned
//! by the TTS engine.
//!
//! ```text
//! offset  size  field
//!      0     4  "RIFF"
//!      4     4  RIFF chunk size (file size - 8), little-endian
//!      8     4  "WAVE"
//!     12     4  "fmt "
//!     16     4  fmt chunk size (16)
//!     20    16  fmt parameters
//!     36     4  "data"
//!     40     4  data size, little-endian
//!     44     -  PCM payload
//! ```

use super::error::WavError;

const RIFF_HEADER_SIZE: usize = 12;
const FMT_CHUNK_SIZE: usize = 24;
const DATA_HEADER_SIZE: usize = 8;

/// RIFF header plus fmt chunk, copied verbatim from the first input.
pub const FORMAT_HEADER_SIZE: usize = RIFF_HEADER_SIZE + FMT_CHUNK_SIZE;

/// Full fixed header that precedes the payload.
pub const WAV_HEADER_SIZE: usize = FORMAT_HEADER_SIZE + DATA_HEADER_SIZE;

const RIFF_SIZE_OFFSET: usize = 4;
const DATA_SIZE_OFFSET: usize = WAV_HEADER_SIZE - 4;
const DATA_CHUNK_ID: &[u8; 4] = b"data";

/// Return the payload slice of a single WAV buffer together with its declared size.
///
/// `index` only feeds error messages so a bad buffer can be traced back to its segment.
pub fn extract_payload(buffer: &[u8], index: usize) -> Result<(&[u8], u32), WavError> {
    if buffer.len() < WAV_HEADER_SIZE {
        return Err(WavError::HeaderTooShort {
            index,
            len: buffer.len(),
            required: WAV_HEADER_SIZE,
        });
    }

    let declared = read_u32_le(buffer, DATA_SIZE_OFFSET);
    let available = buffer.len() - WAV_HEADER_SIZE;
    if declared as usize > available {
        return Err(WavError::PayloadSizeMismatch {
            index,
            declared,
            actual: available,
        });
    }

    let end = WAV_HEADER_SIZE + declared as usize;
    Ok((&buffer[WAV_HEADER_SIZE..end], declared))
}

/// Concatenate the payloads of `buffers` in order under a single rebuilt header.
///
/// All inputs must share the sample format of the first buffer; that is not re-checked here.
pub fn combine<B: AsRef<[u8]>>(buffers: &[B]) -> Result<Vec<u8>, WavError> {
    let first = buffers.first().ok_or(WavError::NoInput)?.as_ref();

    let mut payloads = Vec::with_capacity(buffers.len());
    let mut total: u64 = 0;
    for (index, buffer) in buffers.iter().enumerate() {
        let (payload, size) = extract_payload(buffer.as_ref(), index)?;
        total += u64::from(size);
        payloads.push(payload);
    }

    if total == 0 {
        return Err(WavError::EmptyPayload);
    }

    // The RIFF size field also covers the 36 header bytes after it.
    let total_payload = u32::try_from(total)
        .ok()
        .filter(|size| size.checked_add((WAV_HEADER_SIZE - 8) as u32).is_some())
        .ok_or(WavError::PayloadTooLarge(total))?;

    let mut combined = Vec::with_capacity(WAV_HEADER_SIZE + total_payload as usize);
    combined.extend_from_slice(&first[..FORMAT_HEADER_SIZE]);
    combined.extend_from_slice(DATA_CHUNK_ID);
    combined.extend_from_slice(&total_payload.to_le_bytes());
    for payload in payloads {
        combined.extend_from_slice(payload);
    }

    let riff_size = (WAV_HEADER_SIZE - 8) as u32 + total_payload;
    write_u32_le(&mut combined, RIFF_SIZE_OFFSET, riff_size);

    Ok(combined)
}

fn read_u32_le(buffer: &[u8], offset: usize) -> u32 {
    let mut bytes = [0u8; 4];
    bytes.copy_from_slice(&buffer[offset..offset + 4]);
    u32::from_le_bytes(bytes)
}

fn write_u32_le(buffer: &mut [u8], offset: usize, value: u32) {
    buffer[offset..offset + 4].copy_from_slice(&value.to_le_bytes());
}
