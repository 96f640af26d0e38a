//! Pure session metrics. Recomputed from scratch on every call, so they can
//! run on every keystroke without accumulating state.

/// Percentage of target characters matched by the typed input at the same
/// position, rounded to the nearest integer.
///
/// An empty target is defined as 0 rather than a division by zero; the
/// catalog never produces one, but the function must not panic either way.
pub fn accuracy(target: &str, typed: &str) -> u8 {
    let target_len = target.chars().count();
    if target_len == 0 || typed.is_empty() {
        return 0;
    }

    let matching = typed
        .chars()
        .zip(target.chars())
        .filter(|(typed_char, target_char)| typed_char == target_char)
        .count();

    ((matching as f64 / target_len as f64) * 100.0).round() as u8
}

/// Words per minute: whitespace-delimited tokens of the trimmed input,
/// scaled to a minute. Zero elapsed time is defined as 0.
pub fn words_per_minute(typed: &str, elapsed_secs: u64) -> u32 {
    if elapsed_secs == 0 {
        return 0;
    }

    let words = typed.split_whitespace().count();
    ((words as f64 / elapsed_secs as f64) * 60.0).round() as u32
}

pub fn mean(data: &[f64]) -> Option<f64> {
    let sum = data.iter().sum::<f64>();
    let count = data.len();

    match count {
        positive if positive > 0 => Some(sum / count as f64),
        _ => None,
    }
}
