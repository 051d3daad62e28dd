// ===============================
// src/slider.rs
// ===============================
//
// Bidirectional mapping between the linear guess slider [0,100] and the
// rent domain [MIN_PRICE, MAX_PRICE]. Log scale plus a sub-unity exponent,
// so the slider spends most of its travel around typical NYC rents instead
// of the luxury tail.

pub const MIN_PRICE: f64 = 500.0;
pub const MAX_PRICE: f64 = 30_000.0;

/// Guesses snap to $25 increments.
pub const PRICE_STEP: u32 = 25;

const CURVE_EXPONENT: f64 = 0.88;

/// Map a rent to a slider position in [0, 100]. Out-of-domain prices clamp.
pub fn price_to_slider(price: f64) -> f64 {
    let p = price.clamp(MIN_PRICE, MAX_PRICE);
    let norm = (p.ln() - MIN_PRICE.ln()) / (MAX_PRICE.ln() - MIN_PRICE.ln());
    norm.powf(CURVE_EXPONENT) * 100.0
}

/// Map a slider position back to a rent, rounded to the nearest $25.
/// Out-of-range positions clamp to the ends of the track.
pub fn slider_to_price(pos: f64) -> u32 {
    let norm = (pos.clamp(0.0, 100.0) / 100.0).powf(1.0 / CURVE_EXPONENT);
    let ln_p = MIN_PRICE.ln() + norm * (MAX_PRICE.ln() - MIN_PRICE.ln());
    let step = PRICE_STEP as f64;
    ((ln_p.exp() / step).round() * step) as u32
}
