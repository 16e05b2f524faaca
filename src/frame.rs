//! Message assembly from fixed-size bus frames.

use alloc::vec;
use alloc::vec::Vec;
use embedded_hal::delay::DelayNs;

use crate::json::Value;

/// Errors that can occur while assembling one message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum AssembleError {
    /// The stripped message bytes are not valid UTF-8.
    InvalidEncoding,
    /// The decoded text is not valid JSON.
    InvalidJson,
}

impl core::fmt::Display for AssembleError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            AssembleError::InvalidEncoding => {
                write!(f, "message is not valid UTF-8")
            }
            AssembleError::InvalidJson => {
                write!(f, "message is not valid JSON")
            }
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for AssembleError {}

/// Accumulates fixed-size frames into one JSON message.
///
/// A host message arrives as `frame_count` frames of `frame_size` bytes
/// each. Short frames are NUL-padded by the transport, and SMBus block
/// writes carry the register byte (`0x00`) in front of the payload, so one
/// pass stripping every NUL removes both the padding and the register
/// byte. Valid JSON text never contains a raw NUL.
///
/// Both sides of the link must agree on the frame budget. Deployments
/// have run the same protocol at 10, 30, and 75 frames per message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameAssembler {
    /// Frames per message.
    pub frame_count: usize,
    /// Bytes per frame.
    pub frame_size: usize,
    /// Pause between consecutive frame reads.
    pub inter_frame_delay_ms: u32,
}

impl Default for FrameAssembler {
    fn default() -> Self {
        Self {
            frame_count: 75,
            frame_size: 32,
            inter_frame_delay_ms: 1,
        }
    }
}

impl FrameAssembler {
    /// Creates an assembler with an explicit frame budget.
    pub fn new(frame_count: usize, frame_size: usize, inter_frame_delay_ms: u32) -> Self {
        Self {
            frame_count,
            frame_size,
            inter_frame_delay_ms,
        }
    }

    /// Reads one full message and decodes it.
    ///
    /// `read_frame` fills the buffer it is handed and returns the byte
    /// count it produced; zero (nothing pending right now) contributes
    /// nothing and is not an error. All `frame_count` reads happen in
    /// transport order regardless, so a call occupies the loop for at most
    /// `(frame_count - 1) * inter_frame_delay_ms` milliseconds plus the
    /// reads themselves.
    pub fn assemble<R, D>(&self, mut read_frame: R, delay: &mut D) -> Result<Value, AssembleError>
    where
        R: FnMut(&mut [u8]) -> usize,
        D: DelayNs,
    {
        let mut raw = Vec::with_capacity(self.frame_count * self.frame_size);
        let mut frame = vec![0u8; self.frame_size];

        for i in 0..self.frame_count {
            let n = read_frame(&mut frame).min(self.frame_size);
            raw.extend_from_slice(&frame[..n]);

            if i + 1 < self.frame_count {
                delay.delay_ms(self.inter_frame_delay_ms);
            }
        }

        raw.retain(|&byte| byte != 0);

        let text = core::str::from_utf8(&raw).map_err(|_| AssembleError::InvalidEncoding)?;
        serde_json::from_str(text).map_err(|_| AssembleError::InvalidJson)
    }
}
