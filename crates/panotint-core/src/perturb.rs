//! Collision-avoiding random color perturbation.
//!
//! Multiple instances of one thing class all start from the same base
//! color; this module jitters that base until the result is distinct
//! from every color already claimed for the class. The generator is
//! always caller-supplied and explicitly seeded — there is no hidden
//! global randomness, so a fixed seed reproduces the same colors.

use std::collections::BTreeSet;

use rand::Rng;

use crate::types::Rgb;

/// Default per-channel jitter amplitude.
pub const DEFAULT_NOISE_AMPLITUDE: u8 = 60;

/// Default retry budget before accepting a non-unique color.
pub const DEFAULT_MAX_TRIALS: u32 = 50;

/// Outcome of one perturbation, including whether uniqueness degraded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Perturbation {
    /// The color to paint with.
    pub color: Rgb,
    /// `true` when the retry budget was exhausted and `color` may
    /// duplicate an already-claimed color.
    pub degraded: bool,
}

/// Perturb `base` into a color distinct from everything in `used_colors`.
///
/// Up to `max_trials` times, three integers are drawn independently and
/// uniformly from `[-noise_amplitude, +noise_amplitude]`, added
/// channel-wise to `base`, and clamped to `[0, 255]`. The first
/// candidate not already in `used_colors` is inserted there and
/// returned.
///
/// If every trial collides, the last candidate is returned with
/// `degraded = true` and a warning is logged. The duplicate is *not*
/// inserted again: the set already holds that triple, so re-inserting
/// would be a no-op, and the registry keeps one entry per distinct
/// color by construction.
pub fn perturb<R: Rng>(
    base: Rgb,
    noise_amplitude: u8,
    used_colors: &mut BTreeSet<Rgb>,
    max_trials: u32,
    rng: &mut R,
) -> Perturbation {
    let mut candidate = base;
    for _ in 0..max_trials {
        candidate = jitter(base, noise_amplitude, rng);
        if used_colors.insert(candidate) {
            return Perturbation {
                color: candidate,
                degraded: false,
            };
        }
    }

    log::warn!(
        "degraded uniqueness: exhausted {max_trials} trials perturbing {base:?} \
         against {} used colors; reusing a non-unique color",
        used_colors.len(),
    );
    Perturbation {
        color: candidate,
        degraded: true,
    }
}

/// Like [`perturb`], returning just the color.
pub fn perturb_color<R: Rng>(
    base: Rgb,
    noise_amplitude: u8,
    used_colors: &mut BTreeSet<Rgb>,
    max_trials: u32,
    rng: &mut R,
) -> Rgb {
    perturb(base, noise_amplitude, used_colors, max_trials, rng).color
}

/// One jittered candidate: independent per-channel offsets in
/// `[-noise, +noise]`, clamped to the valid channel range.
///
/// Channels are drawn in R, G, B order; the draw order is part of the
/// determinism contract.
fn jitter<R: Rng>(base: Rgb, noise_amplitude: u8, rng: &mut R) -> Rgb {
    let noise = i16::from(noise_amplitude);
    let mut channel = |value: u8| {
        let delta = rng.gen_range(-noise..=noise);
        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        let clamped = (i16::from(value) + delta).clamp(0, 255) as u8;
        clamped
    };
    Rgb {
        r: channel(base.r),
        g: channel(base.g),
        b: channel(base.b),
    }
}
