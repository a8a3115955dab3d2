//! Construction-time error reporting.
//!
//! Configuration problems (bad channel count, a scaling factor that no
//! longer fits the window) are never fatal: they're reported here and the
//! caller decides whether to retry with different parameters. Contract
//! violations (null/mismatched buffers, using an invalid resampler) are a
//! different story -- those are collaborator bugs and are handled with
//! `assert!`/`debug_assert!` at the call site instead of a `Result`.

use std::fmt;

/// Why a [`crate::ResamplerConfig`] was rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigError {
    /// `channels_num` computed from the channel mask was zero.
    ZeroChannels,
    /// `channel_len` doesn't fit the integer range a Q8.24 cursor can
    /// address (`channel_len << FRACT_BITS` would wrap a `u32`).
    FrameSizeOverflow { channel_len: usize },
    /// `window_interp` isn't a power of two.
    InterpNotPowerOfTwo { window_interp: usize },
    /// `window_len * scaling` would not leave room inside one `channel_len`
    /// window, i.e. a single output sample would need samples outside the
    /// three-frame window.
    ScalingExceedsWindow { window_len: usize, scaling: f32, channel_len: usize },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::ZeroChannels => write!(f, "resampler: invalid channel mask: zero channels"),
            ConfigError::FrameSizeOverflow { channel_len } => write!(
                f,
                "resampler: channel_len is too large for Q8.24 arithmetic: channel_len={channel_len}"
            ),
            ConfigError::InterpNotPowerOfTwo { window_interp } => write!(
                f,
                "resampler: window_interp is not a power of two: window_interp={window_interp}"
            ),
            ConfigError::ScalingExceedsWindow {
                window_len,
                scaling,
                channel_len,
            } => write!(
                f,
                "resampler: scaling does not fit frame size: window_len={window_len} scaling={scaling:.5} channel_len={channel_len}"
            ),
        }
    }
}

impl std::error::Error for ConfigError {}
