const SUFFIXES: [&str; 5] = ["bytes", "Kb", "Mb", "Gb", "Tb"];

/// Human-readable size, e.g. `123 Kb`.
///
/// Divides by 1024 while the value is strictly above 1024, then rounds to
/// three significant figures. Values still at or above 1024 after reaching
/// the largest suffix are printed unrounded.
pub fn format_bytes(bytes: u64) -> String {
    let mut current = bytes as f64;
    let mut idx = 0;
    while current > 1024.0 && idx < SUFFIXES.len() - 1 {
        idx += 1;
        current /= 1024.0;
    }

    let numeric = if current < 1024.0 {
        round_significant(current, 3)
    } else {
        current
    };

    format!("{} {}", numeric, SUFFIXES[idx])
}

fn round_significant(value: f64, digits: i32) -> f64 {
    if value == 0.0 || !value.is_finite() {
        return value;
    }

    let magnitude = value.abs().log10().floor() as i32;
    let shift = digits - 1 - magnitude;
    if shift >= 0 {
        let factor = 10f64.powi(shift);
        (value * factor).round() / factor
    } else {
        let factor = 10f64.powi(-shift);
        (value / factor).round() * factor
    }
}
