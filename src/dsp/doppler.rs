use crate::types::DataPoint;

/// Metres per second to knots.
pub const MPS_TO_KNOTS: f64 = 1.94384;

/// Source speed from a Doppler pass measured on a spectrogram.
///
/// `f_plus` and `f_minus` are the steady tones heard before and after closest
/// approach (either order), `f_zero` the tone at closest approach. First-order
/// approximation, valid while the source is much slower than `sound_speed`:
///
///   v = c · |f₊ − f₋| / (2 · f₀)
///
/// Returns `None` if f₀ is not a positive, finite frequency.
pub fn doppler_speed(f_plus: DataPoint, f_minus: DataPoint, f_zero: DataPoint, sound_speed: f64) -> Option<f64> {
    let f0 = f_zero.freq;
    if !f0.is_finite() || f0 <= 0.0 || !sound_speed.is_finite() || sound_speed <= 0.0 {
        return None;
    }
    let delta = (f_plus.freq - f_minus.freq).abs();
    if !delta.is_finite() {
        return None;
    }
    Some(sound_speed * delta / (2.0 * f0))
}

pub fn mps_to_knots(speed_mps: f64) -> f64 {
    speed_mps * MPS_TO_KNOTS
}
