//! Video frame types

use serde::{Deserialize, Serialize};

/// Frame dimensions in pixels.
///
/// All the geometry downstream needs from a frame; pixel data never crosses
/// into the pose or attention crates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FrameSize {
    /// Frame width in pixels
    pub width: u32,
    /// Frame height in pixels
    pub height: u32,
}

impl FrameSize {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }
}

/// Decoded RGB video frame
#[derive(Debug, Clone)]
pub struct VideoFrame {
    /// RGB pixel data (width * height * 3 bytes)
    pub data: Vec<u8>,
    /// Frame width in pixels
    pub width: u32,
    /// Frame height in pixels
    pub height: u32,
    /// Capture timestamp, nanoseconds on the stream's monotonic clock
    pub timestamp_ns: u64,
    /// Frame sequence number
    pub sequence: u32,
}

impl VideoFrame {
    /// Create a new video frame from raw RGB data
    pub fn new(data: Vec<u8>, width: u32, height: u32, timestamp_ns: u64, sequence: u32) -> Self {
        Self {
            data,
            width,
            height,
            timestamp_ns,
            sequence,
        }
    }

    /// Create an all-black frame, used by synthetic streams that carry
    /// geometry but no real pixels
    pub fn blank(width: u32, height: u32, timestamp_ns: u64, sequence: u32) -> Self {
        Self::new(
            vec![0; width as usize * height as usize * 3],
            width,
            height,
            timestamp_ns,
            sequence,
        )
    }

    /// Dimensions of this frame
    pub fn size(&self) -> FrameSize {
        FrameSize::new(self.width, self.height)
    }
}
