//src/util.rs

/* ---------------- CONSTANTES ---------------- */

// Conversion factor kilometers → miles.
pub const KM_TO_MILES: f64 = 0.621371;

/* ---------------- NUMERIC UTILS -------------- */

// Rounding of a floating-point number to N decimal places (max 10).
// Halves round away from zero (f64::round).
// Only applied to presented values, never inside a calculation.
pub fn round(value: f64, decimals: u32) -> f64 {
    let precision = decimals.min(10);
    let factor = 10_f64.powi(precision as i32);
    (value * factor).round() / factor
}

/* ---------------- TEST ---------------- */
