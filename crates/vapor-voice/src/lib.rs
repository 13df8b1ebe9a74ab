//! Microphone capture and voice decoding.
//!
//! Captured voice comes out of [`Voice::read_compressed`] in an opaque
//! compressed format, travels to peers however the application likes, and
//! is turned back into 16-bit mono PCM by [`Voice::decompress`].

mod error;

use std::fmt;

use tracing::{debug, trace};
use vapor_native::VoiceResult;
use vapor_runtime::Context;

pub use error::{DecompressError, VoiceError};

/// Starting decode buffer size in bytes.
pub const INITIAL_DECOMPRESS_BUFFER: usize = 20 << 10;

/// Microphone capture and decoding for the local user.
#[derive(Clone)]
pub struct Voice {
    ctx: Context,
}

impl Voice {
    pub fn new(ctx: Context) -> Self {
        Self { ctx }
    }

    /// Starts capturing from the microphone.
    pub fn start_recording(&self) {
        let _guard = self.ctx.guard();
        self.ctx.native().start_voice_recording();
        debug!("voice recording started");
    }

    /// Stops capturing. The platform keeps recording briefly afterwards, so
    /// keep reading until [`read_compressed`](Self::read_compressed) returns
    /// [`VoiceError::NotRecording`].
    pub fn stop_recording(&self) {
        let _guard = self.ctx.guard();
        self.ctx.native().stop_voice_recording();
        debug!("voice recording stop requested");
    }

    /// Tells the platform the user is talking in game, which mutes the
    /// microphone for the platform's own voice chat.
    pub fn set_in_game_speaking(&self, speaking: bool) {
        let _guard = self.ctx.guard();
        self.ctx.native().set_in_game_voice_speaking(speaking);
    }

    /// The decoder's native sample rate. Decoding at this rate costs the
    /// least CPU.
    pub fn optimal_sample_rate(&self) -> u32 {
        self.ctx.native().voice_optimal_sample_rate()
    }

    /// Bytes of compressed voice ready to be read.
    pub fn available(&self) -> Result<usize, VoiceError> {
        let _guard = self.ctx.guard();
        let (result, available) = self.ctx.native().available_voice();
        VoiceError::check(result)?;
        Ok(available as usize)
    }

    /// Reads captured voice into `buf` without blocking.
    ///
    /// Returns `Ok(0)` when nothing has been captured since the last read.
    /// Read once per frame; an 8 KiB buffer is plenty.
    pub fn read_compressed(&self, buf: &mut [u8]) -> Result<usize, VoiceError> {
        if buf.is_empty() {
            return Ok(0);
        }
        let _guard = self.ctx.guard();
        let (result, written) = self.ctx.native().get_voice(buf);
        VoiceError::check(result)?;
        trace!(len = written, "compressed voice read");
        Ok(written as usize)
    }

    /// Decodes compressed voice into mono 16-bit PCM at `sample_rate`
    /// (11025 to 48000 Hz).
    ///
    /// The output buffer starts at [`INITIAL_DECOMPRESS_BUFFER`] bytes and
    /// doubles until the decoder has room. If the decoder fails, the
    /// samples it wrote before failing travel with the error.
    pub fn decompress(&self, compressed: &[u8], sample_rate: u32) -> Result<Vec<i16>, DecompressError> {
        if compressed.is_empty() {
            return Ok(Vec::new());
        }

        let _guard = self.ctx.guard();
        let native = self.ctx.native();
        let mut out = vec![0u8; INITIAL_DECOMPRESS_BUFFER];
        let (result, written) = loop {
            let (result, written) = native.decompress_voice(compressed, &mut out, sample_rate);
            if result != VoiceResult::BufferTooSmall {
                break (result, written as usize);
            }
            let grown = out.len() * 2;
            trace!(size = grown, "growing voice decode buffer");
            out.resize(grown, 0);
        };

        let samples = to_samples(&out[..written.min(out.len())]);
        match VoiceError::check(result) {
            Ok(()) => Ok(samples),
            Err(kind) => {
                debug!(%kind, partial = samples.len(), "voice decoding failed");
                Err(DecompressError::new(kind, samples))
            }
        }
    }
}

fn to_samples(bytes: &[u8]) -> Vec<i16> {
    bytes
        .chunks_exact(2)
        .map(|pair| i16::from_ne_bytes([pair[0], pair[1]]))
        .collect()
}

impl fmt::Debug for Voice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Voice").finish_non_exhaustive()
    }
}
