//! Minimal demonstration of the streaming resampler driven against a
//! synthetic three-buffer input stream. Run with `RUST_LOG=trace` to see
//! the crate's own diagnostics (buffer rotation, rejected scaling changes).

use sincstream::{ChannelMask, Resampler, ResamplerConfig};

/// Generate a pool of sine-wave frames up front so the resampler can borrow
/// slices out of a collection that never reallocates, instead of juggling
/// ownership of three separately-named buffers across rotations.
fn make_frame_pool(count: usize, channel_len: usize, freq_rel_nyquist: f32) -> Vec<Vec<f32>> {
    let mut phase = 0.0f32;
    let mut pool = Vec::with_capacity(count);
    for _ in 0..count {
        let mut frame = vec![0.0f32; channel_len * 2];
        for i in 0..channel_len {
            let s = phase.sin();
            frame[i * 2] = s;
            frame[i * 2 + 1] = s;
            phase += std::f32::consts::PI * freq_rel_nyquist;
        }
        pool.push(frame);
    }
    pool
}

fn main() {
    env_logger::init();

    let config = ResamplerConfig {
        channel_len: 256,
        window_len: 32,
        window_interp: 128,
    };
    let mut resampler = Resampler::new(config, ChannelMask::STEREO);
    if !resampler.is_valid() {
        eprintln!("bad resampler config: {:?}", resampler.last_error());
        return;
    }

    let pool = make_frame_pool(8, config.channel_len, 0.1);
    let mut out = vec![0.0f32; config.channel_len * 2];

    for skew_step in 0..4usize {
        // A skew controller would call this periodically with a ratio
        // derived from clock drift; here we nudge it a little each
        // iteration to show it only takes effect on the next buffer, not
        // mid-frame.
        let scaling = 1.0 + 0.01 * skew_step as f32;
        if !resampler.set_scaling(scaling) {
            log::warn!("scaling {scaling} rejected, keeping previous value");
        }

        let base = skew_step.min(pool.len() - 3);
        resampler.renew_buffers(&pool[base], &pool[base + 1], &pool[base + 2]);
        while !resampler.resample_buff(&mut out) {
            // Out of lookahead frames in this toy demo; in a real pipeline
            // the frame source would keep producing `next` buffers.
            break;
        }

        println!("skew_step {skew_step}: out[0..4] = {:?}", &out[0..4]);
    }
}
