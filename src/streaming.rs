//! The streaming driver: a three-buffer sliding-window state machine that
//! turns a sequence of `renew_buffers`/`resample_buff` calls into a
//! continuous resampled output stream.

use crate::channels::{channelize_index, ChannelMask};
use crate::error::ConfigError;
use crate::fixed::{QTime, FRACT_BITS, ONE};
use crate::kernel::sinc_value;
use crate::sinc::SincTable;

/// Design-constant cutoff frequency: a fraction of Nyquist, leaving a 10%
/// guard band. Not configurable; see spec's design notes for why.
pub const CUTOFF_FREQ: f32 = 0.9;

/// Sample-agnostic configuration for a [`Resampler`].
///
/// `channel_len` is samples-per-channel-per-frame; `window_len` is the
/// half-width of the sinc window, in input samples; `window_interp` is the
/// oversampling factor of the sinc table and must be a power of two.
#[derive(Debug, Clone, Copy)]
pub struct ResamplerConfig {
    pub channel_len: usize,
    pub window_len: usize,
    pub window_interp: usize,
}

impl ResamplerConfig {
    /// Check everything spec §4.4 requires before a [`Resampler`] is built,
    /// without touching any state. Returns the first violated rule.
    pub fn validate(&self, channels: ChannelMask) -> Result<(), ConfigError> {
        let channels_num = channels.channels_num();
        if channels_num < 1 {
            return Err(ConfigError::ZeroChannels);
        }
        // channel_len << FRACT_BITS must fit in a u32.
        if self.channel_len > ((u32::MAX as usize) >> FRACT_BITS) {
            return Err(ConfigError::FrameSizeOverflow {
                channel_len: self.channel_len,
            });
        }
        if !self.window_interp.is_power_of_two() {
            return Err(ConfigError::InterpNotPowerOfTwo {
                window_interp: self.window_interp,
            });
        }
        Ok(())
    }
}

/// Streaming windowed-sinc resampler.
///
/// `'a` is the lifetime of the three input buffers handed to
/// [`Resampler::renew_buffers`]; they must stay valid (and unmodified) until
/// the next call to `renew_buffers`, per spec's invariants.
pub struct Resampler<'a> {
    channels: ChannelMask,
    channels_num: usize,
    channel_len: usize,
    window_len: usize,
    window_interp_bits: u32,
    cutoff_freq: f32,

    sinc_table: SincTable,

    scaling: f32,
    qt_sample: QTime,
    qt_dt: QTime,
    qt_sinc_step: QTime,
    qt_half_window_len: QTime,
    qt_window_size: QTime,

    prev: Option<&'a [f32]>,
    curr: Option<&'a [f32]>,
    next: Option<&'a [f32]>,

    out_frame_i: usize,
    valid: bool,
    config_error: Option<ConfigError>,
}

impl<'a> Resampler<'a> {
    /// Build a new resampler. Never panics on bad configuration: check
    /// [`Resampler::is_valid`] (and [`Resampler::last_error`] for the
    /// reason) before using it.
    pub fn new(config: ResamplerConfig, channels: ChannelMask) -> Resampler<'a> {
        let mut this = Resampler {
            channels,
            channels_num: channels.channels_num().max(1),
            channel_len: config.channel_len,
            window_len: config.window_len,
            window_interp_bits: config.window_interp.trailing_zeros(),
            cutoff_freq: CUTOFF_FREQ,
            sinc_table: SincTable::new(config.window_len.max(1), config.window_interp.max(1)),
            scaling: 1.0,
            qt_sample: QTime::ZERO,
            qt_dt: QTime::ZERO,
            qt_sinc_step: QTime::ZERO,
            qt_half_window_len: QTime::ZERO,
            qt_window_size: QTime(((config.channel_len as u32) << FRACT_BITS) as u32),
            prev: None,
            curr: None,
            next: None,
            out_frame_i: 0,
            valid: false,
            config_error: None,
        };

        if let Err(e) = config.validate(channels) {
            log::error!("resampler: invalid configuration: {e}");
            this.config_error = Some(e);
            return this;
        }

        if !this.set_scaling(1.0) {
            // set_scaling already logged the reason and left config_error unset
            // (it isn't a ConfigError variant in this path, but the resampler
            // must still be reported invalid).
            this.config_error = Some(ConfigError::ScalingExceedsWindow {
                window_len: this.window_len,
                scaling: 1.0,
                channel_len: this.channel_len,
            });
            return this;
        }

        this.valid = true;
        this
    }

    pub fn is_valid(&self) -> bool {
        self.valid
    }

    pub fn last_error(&self) -> Option<&ConfigError> {
        self.config_error.as_ref()
    }

    pub fn channels(&self) -> ChannelMask {
        self.channels
    }

    pub fn channels_num(&self) -> usize {
        self.channels_num
    }

    pub fn channel_len(&self) -> usize {
        self.channel_len
    }

    pub fn scaling(&self) -> f32 {
        self.scaling
    }

    /// Update the time-scaling factor. Fails (and leaves all state
    /// unchanged) if `window_len * scaling` would no longer fit inside a
    /// `channel_len` window. The change only takes effect for sample
    /// production after the *next* [`Resampler::renew_buffers`] call --
    /// `qt_dt` is latched there, not here, so a mid-frame update never
    /// causes a discontinuity.
    pub fn set_scaling(&mut self, scaling: f32) -> bool {
        if self.window_len as f32 * scaling >= self.channel_len as f32 {
            log::error!(
                "resampler: scaling does not fit frame size: window={} frame={} scaling={:.5}",
                self.window_len,
                self.channel_len,
                scaling
            );
            return false;
        }

        self.scaling = scaling;
        if scaling > 1.0 {
            self.qt_sinc_step = QTime::from_float(self.cutoff_freq / scaling);
            self.qt_half_window_len =
                QTime::from_float(self.window_len as f32 * scaling / self.cutoff_freq);
        } else {
            self.qt_sinc_step = QTime::from_float(self.cutoff_freq);
            self.qt_half_window_len = QTime::from_float(self.window_len as f32 / self.cutoff_freq);
        }
        true
    }

    fn frame_size(&self) -> usize {
        self.channel_len * self.channels_num
    }

    /// Hand the driver three fresh, equal-size, interleaved buffers. `prev`
    /// becomes the new history, `curr` the window currently being
    /// resampled, `next` the lookahead for taps crossing the right edge.
    ///
    /// Panics if the resampler is invalid or a buffer's length doesn't
    /// match `channel_len * channels_num` -- these are collaborator bugs,
    /// not recoverable configuration errors.
    pub fn renew_buffers(&mut self, prev: &'a [f32], curr: &'a [f32], next: &'a [f32]) {
        assert!(self.valid, "resampler: renew_buffers called on invalid resampler");
        let frame_size = self.frame_size();
        assert_eq!(prev.len(), frame_size, "resampler: prev buffer size mismatch");
        assert_eq!(curr.len(), frame_size, "resampler: curr buffer size mismatch");
        assert_eq!(next.len(), frame_size, "resampler: next buffer size mismatch");

        if self.qt_sample >= self.qt_window_size {
            self.qt_sample = self.qt_sample.wrapping_sub(self.qt_window_size);
            log::trace!("resampler: cursor rotated past window, buffers shifting");
        }

        // Latched here, not in set_scaling, so a mid-frame ratio change
        // never introduces a per-sample discontinuity.
        self.qt_dt = QTime::from_float(self.scaling);

        self.prev = Some(prev);
        self.curr = Some(curr);
        self.next = Some(next);
    }

    /// Resume filling `out` at `out_frame_i`. Returns `false` (retaining
    /// `out_frame_i` for the next call) once `curr` is exhausted and the
    /// caller must rotate its buffers and call `renew_buffers` again;
    /// returns `true` once `out` is completely filled.
    pub fn resample_buff(&mut self, out: &mut [f32]) -> bool {
        assert!(self.valid, "resampler: resample_buff called on invalid resampler");
        assert!(
            self.prev.is_some() && self.curr.is_some() && self.next.is_some(),
            "resampler: resample_buff called before renew_buffers"
        );
        assert!(
            out.len() % self.channels_num == 0,
            "resampler: output frame size is not a multiple of channels_num"
        );

        const EPSILON_FLOAT: f32 = 5e-8;
        let qt_epsilon = QTime::from_float(EPSILON_FLOAT);
        let qt_one = QTime(ONE);

        let mut i = self.out_frame_i;
        while i < out.len() {
            if self.qt_sample >= self.qt_window_size {
                self.out_frame_i = i;
                return false;
            }

            let fract = QTime(self.qt_sample.0 & (ONE - 1));
            if fract < qt_epsilon {
                self.qt_sample = self.qt_sample.qfloor();
            } else if (qt_one - fract) < qt_epsilon {
                self.qt_sample = self.qt_sample.qfloor() + qt_one;
            }

            for channel in 0..self.channels_num {
                out[i + channel] = self.sample_for_channel(channel);
            }
            self.qt_sample = self.qt_sample.wrapping_add(self.qt_dt);
            i += self.channels_num;
        }

        self.out_frame_i = 0;
        true
    }

    /// Produce one output sample for `channel` at the current `qt_sample`,
    /// convolving the windowed sinc against the three borrowed frames.
    fn sample_for_channel(&self, channel: usize) -> f32 {
        let prev = self.prev.expect("renew_buffers not called");
        let curr = self.curr.expect("renew_buffers not called");
        let next = self.next.expect("renew_buffers not called");

        let qhw = self.qt_half_window_len;
        let qws = self.qt_window_size;
        let qt_sample = self.qt_sample;

        let ind_begin_prev = if qt_sample >= qhw {
            self.channel_len
        } else {
            (qt_sample + qws - qhw).qceil().to_size()
        };
        debug_assert!(ind_begin_prev <= self.channel_len);

        let ind_begin_cur = if qt_sample >= qhw {
            (qt_sample - qhw).qceil().to_size()
        } else {
            0
        };
        debug_assert!(ind_begin_cur <= self.channel_len);

        let ind_end_cur = if qt_sample + qhw > qws {
            self.channel_len - 1
        } else {
            (qt_sample + qhw).qfloor().to_size()
        };
        debug_assert!(ind_end_cur <= self.channel_len);

        let ind_end_next = if qt_sample + qhw > qws {
            (qt_sample + qhw - qws).qfloor().to_size() + 1
        } else {
            0
        };
        debug_assert!(ind_end_next <= self.channel_len);

        let qt_cur = qws + qt_sample - (qws + qt_sample - qhw).qceil();
        let mut qt_sinc_cur = crate::fixed::qmul(qt_cur, self.qt_sinc_step);
        let qt_sinc_inc = self.qt_sinc_step;

        let mut f_fract = qt_sinc_cur.shl(self.window_interp_bits).fractional();

        let mut accumulator = 0.0f32;
        let sinc = |table: &SincTable, x: QTime, f: f32, scaling: f32| {
            sinc_value(table, self.window_interp_bits, FRACT_BITS, x, f, scaling)
        };

        // Previous frame.
        let end_prev = channelize_index(self.channel_len, channel, self.channels_num);
        let mut i = channelize_index(ind_begin_prev, channel, self.channels_num);
        while i < end_prev {
            accumulator += prev[i] * sinc(&self.sinc_table, qt_sinc_cur, f_fract, self.scaling);
            qt_sinc_cur = qt_sinc_cur - qt_sinc_inc;
            i += self.channels_num;
        }

        // Current frame, left side of the window (qt_sinc_cur decreasing).
        i = channelize_index(ind_begin_cur, channel, self.channels_num);
        accumulator += curr[i] * sinc(&self.sinc_table, qt_sinc_cur, f_fract, self.scaling);
        while qt_sinc_cur >= qt_sinc_inc {
            i += self.channels_num;
            qt_sinc_cur = qt_sinc_cur - qt_sinc_inc;
            accumulator += curr[i] * sinc(&self.sinc_table, qt_sinc_cur, f_fract, self.scaling);
        }
        i += self.channels_num;
        debug_assert!(i <= channelize_index(self.channel_len, channel, self.channels_num));

        // Origin reflection: the table only covers the positive half-plane.
        qt_sinc_cur = qt_sinc_inc - qt_sinc_cur;
        f_fract = qt_sinc_cur.shl(self.window_interp_bits).fractional();

        // Current frame, right side of the window (qt_sinc_cur increasing).
        let end_cur = channelize_index(ind_end_cur, channel, self.channels_num);
        while i <= end_cur {
            accumulator += curr[i] * sinc(&self.sinc_table, qt_sinc_cur, f_fract, self.scaling);
            qt_sinc_cur = qt_sinc_cur + qt_sinc_inc;
            i += self.channels_num;
        }

        // Next frame.
        let end_next = channelize_index(ind_end_next, channel, self.channels_num);
        i = channelize_index(0, channel, self.channels_num);
        while i < end_next {
            accumulator += next[i] * sinc(&self.sinc_table, qt_sinc_cur, f_fract, self.scaling);
            qt_sinc_cur = qt_sinc_cur + qt_sinc_inc;
            i += self.channels_num;
        }

        accumulator
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cfg() -> ResamplerConfig {
        ResamplerConfig {
            channel_len: 64,
            window_len: 16,
            window_interp: 128,
        }
    }

    #[test]
    fn valid_mono_config_constructs() {
        let r = Resampler::new(cfg(), ChannelMask::MONO);
        assert!(r.is_valid());
        assert_eq!(r.channels_num(), 1);
    }

    #[test]
    fn zero_channel_mask_is_invalid() {
        let r = Resampler::new(cfg(), ChannelMask(0));
        assert!(!r.is_valid());
        assert!(r.last_error().is_some());
    }

    #[test]
    fn non_power_of_two_interp_is_invalid() {
        let bad = ResamplerConfig {
            window_interp: 100,
            ..cfg()
        };
        let r = Resampler::new(bad, ChannelMask::MONO);
        assert!(!r.is_valid());
    }

    #[test]
    fn set_scaling_rejects_oversized_window() {
        let mut r = Resampler::new(cfg(), ChannelMask::MONO);
        let before = r.scaling();
        assert!(!r.set_scaling(10.0));
        assert_eq!(r.scaling(), before);
    }

    #[test]
    fn set_scaling_accepts_small_change() {
        let mut r = Resampler::new(cfg(), ChannelMask::MONO);
        assert!(r.set_scaling(1.02));
        assert_eq!(r.scaling(), 1.02);
    }

    #[test]
    fn impulse_response_peaks_near_origin() {
        let mut r = Resampler::new(cfg(), ChannelMask::MONO);
        assert!(r.is_valid());

        let prev = vec![0.0f32; 64];
        let mut curr = vec![0.0f32; 64];
        curr[8] = 1.0;
        let next = vec![0.0f32; 64];
        r.renew_buffers(&prev, &curr, &next);

        let mut out = vec![0.0f32; 64];
        assert!(r.resample_buff(&mut out));

        let (peak_i, peak_v) = out
            .iter()
            .enumerate()
            .max_by(|a, b| a.1.abs().partial_cmp(&b.1.abs()).unwrap())
            .unwrap();
        assert_eq!(peak_i, 8);
        assert!((peak_v - 1.0).abs() < 0.01);
    }

    #[test]
    fn stereo_impulse_on_left_leaves_right_silent() {
        let cfg = ResamplerConfig {
            channel_len: 64,
            window_len: 16,
            window_interp: 128,
        };
        let mut r = Resampler::new(cfg, ChannelMask::STEREO);
        assert!(r.is_valid());

        let prev = vec![0.0f32; 128];
        let mut curr = vec![0.0f32; 128];
        curr[8 * 2] = 1.0; // left channel, input sample 8
        let next = vec![0.0f32; 128];
        r.renew_buffers(&prev, &curr, &next);

        let mut out = vec![0.0f32; 128];
        assert!(r.resample_buff(&mut out));

        for i in 0..64 {
            assert_eq!(out[i * 2 + 1], 0.0, "right channel should stay silent");
        }
    }

    #[test]
    fn resume_partial_output_frame_across_buffer_rotation() {
        // An out buffer bigger than one channel_len forces resample_buff to
        // stop partway (curr exhausted) and resume after the caller rotates
        // buffers, without losing its place in `out`.
        let mut r = Resampler::new(cfg(), ChannelMask::MONO);
        let zeros = vec![0.0f32; 64];
        r.renew_buffers(&zeros, &zeros, &zeros);

        let mut out = vec![0.0f32; 100];
        assert!(!r.resample_buff(&mut out));

        r.renew_buffers(&zeros, &zeros, &zeros);
        assert!(r.resample_buff(&mut out));
    }

    #[test]
    fn scaling_two_to_one_exhausts_one_window_for_32_outputs() {
        // P3: with scaling = 2.0 and channel_len = 64, 32 output samples
        // should advance the cursor by exactly one channel_len of input
        // (qt_dt = 2.0 per sample, 32 samples => 64 input-sample units).
        let mut r = Resampler::new(cfg(), ChannelMask::MONO);
        assert!(r.set_scaling(2.0));
        let zeros = vec![0.0f32; 64];
        r.renew_buffers(&zeros, &zeros, &zeros);

        let mut out = vec![0.0f32; 32];
        assert!(r.resample_buff(&mut out));
        assert_eq!(r.qt_sample, r.qt_window_size);
    }
}
