//! External control protocol.
//!
//! Third parties drive the effect by writing byte-array properties on their
//! own windows: one carries a target desktop number, the other a list of
//! window identifiers to present as a group. Payloads are sequences of
//! little-endian 32-bit words.

use thiserror::Error;

use crate::host::WindowId;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum PropertyError {
    #[error("property payload of {0} bytes is not a whole number of 32-bit words")]
    RaggedPayload(usize),
    #[error("desktop {requested} out of range, host has {available}")]
    DesktopOutOfRange { requested: i64, available: i32 },
}

/// What a desktop-target property write asks for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DesktopRequest {
    /// Empty or zero payload: stop the effect.
    Deactivate,
    AllDesktops,
    Desktop(i32),
}

fn decode_words(data: &[u8]) -> Result<Vec<u32>, PropertyError> {
    if data.len() % 4 != 0 {
        return Err(PropertyError::RaggedPayload(data.len()));
    }
    Ok(data
        .chunks_exact(4)
        .map(|chunk| u32::from_le_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]))
        .collect())
}

/// Decodes a desktop-target payload. `-1` (all bits set) selects every
/// desktop; anything past the host's desktop count is rejected.
pub fn parse_desktop_request(
    data: &[u8],
    desktop_count: i32,
) -> Result<DesktopRequest, PropertyError> {
    let words = decode_words(data)?;
    let Some(&first) = words.first() else {
        return Ok(DesktopRequest::Deactivate);
    };
    if first == 0 {
        return Ok(DesktopRequest::Deactivate);
    }
    let desktop = first as i32;
    if desktop == -1 {
        return Ok(DesktopRequest::AllDesktops);
    }
    if desktop < 0 || desktop > desktop_count {
        return Err(PropertyError::DesktopOutOfRange {
            requested: desktop as i64,
            available: desktop_count,
        });
    }
    Ok(DesktopRequest::Desktop(desktop))
}

/// Decodes a window-group payload into raw window ids. The caller resolves
/// them against the windows it knows and skips the rest. An empty list means
/// deactivate.
pub fn parse_window_group(data: &[u8]) -> Result<Vec<WindowId>, PropertyError> {
    let words = decode_words(data)?;
    Ok(words.into_iter().map(|w| WindowId(w as u64)).collect())
}

/// Builds a payload from 32-bit words; used by the demo driver and tests.
pub fn encode_words(words: &[u32]) -> Vec<u8> {
    words.iter().flat_map(|w| w.to_le_bytes()).collect()
}
