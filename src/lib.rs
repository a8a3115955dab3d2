//! A streaming, windowed-sinc audio resampler.
//!
//! This crate converts a continuous stream of interleaved PCM audio frames
//! from one sample rate to another -- or, equivalently, applies a slowly
//! varying time-scaling factor driven by an external clock-skew estimator --
//! with low latency and bounded per-sample cost.
//!
//! ## Design
//!
//! The resampler convolves each output sample against a precomputed,
//! Hamming-windowed sinc table (see [`SincTable`]). The hot path does only
//! integer table lookups and one linear interpolation per sample; all
//! sub-sample time bookkeeping is done in Q8.24 fixed point (see
//! [`fixed`]) to avoid the cost of repeated floating-point `ceil`/`floor`.
//!
//! The caller owns three equal-size, interleaved input buffers (`prev`,
//! `curr`, `next`) and hands them to the resampler via
//! [`Resampler::renew_buffers`]; [`Resampler::resample_buff`] then writes
//! resampled output samples until `curr`'s window is exhausted, at which
//! point the caller rotates its ring (`next` becomes `curr`, `curr` becomes
//! `prev`, a freshly filled buffer becomes `next`) and calls
//! `renew_buffers` again.
//!
//! ## Example
//!
//! ```
//! use sincstream::{ChannelMask, Resampler, ResamplerConfig};
//!
//! let config = ResamplerConfig {
//!     channel_len: 64,
//!     window_len: 16,
//!     window_interp: 128,
//! };
//! let mut resampler = Resampler::new(config, ChannelMask::MONO);
//! assert!(resampler.is_valid());
//!
//! let prev = vec![0.0f32; 64];
//! let curr = vec![0.0f32; 64];
//! let next = vec![0.0f32; 64];
//! resampler.renew_buffers(&prev, &curr, &next);
//!
//! let mut out = vec![0.0f32; 64];
//! let finished = resampler.resample_buff(&mut out);
//! assert!(finished);
//! ```
//!
//! ## Scope
//!
//! This crate is single-threaded and synchronous: no operation suspends,
//! there are no internal locks, and the only allocation is the sinc table
//! built once at construction. It does not do packet reassembly, forward
//! error correction, network I/O, or audio device I/O -- those are external
//! collaborators that produce the three input buffers and consume the
//! output frames this crate writes into.
//!
//! Offline/batch resampling, multiple interpolation qualities, polyphase
//! decomposition, arbitrary filter kernels, channel remixing, and
//! sample-format conversion are out of scope; this crate always operates on
//! interleaved `f32` samples with one fixed channel layout per instance.

pub mod channels;
pub mod error;
pub mod fixed;
pub mod kernel;
pub mod sinc;
pub mod streaming;

pub use crate::channels::ChannelMask;
pub use crate::error::ConfigError;
pub use crate::sinc::SincTable;
pub use crate::streaming::{Resampler, ResamplerConfig, CUTOFF_FREQ};
