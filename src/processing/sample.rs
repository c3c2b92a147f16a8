/// Largest width or height a decoded wallpaper may have.
pub const MAX_WALLPAPER_DIM: u32 = 1920;

/// Smallest power-of-two divisor that brings both `width / s` and
/// `height / s` (integer division) down to `max_dim` or below.
#[must_use]
pub fn sample_size(width: u32, height: u32, max_dim: u32) -> u32 {
    let max_dim = max_dim.max(1);
    let mut sample = 1u32;
    // width / 2^31 <= 1 for any u32, so this never overflows.
    while width / sample > max_dim || height / sample > max_dim {
        sample *= 2;
    }
    sample
}

/// Output dimensions for a decode at `sample`, never below 1x1.
#[must_use]
pub fn sampled_dimensions(width: u32, height: u32, sample: u32) -> (u32, u32) {
    let sample = sample.max(1);
    ((width / sample).max(1), (height / sample).max(1))
}
