use std::time::Duration;

/// Percent of the run reached when showing step `step` (0-indexed) of `count`
pub fn progress_percent(step: usize, count: usize) -> u16 {
    if count == 0 {
        return 0;
    }
    (((step + 1) * 100) / count).min(100) as u16
}

pub fn step_label(step: usize, count: usize) -> String {
    format!("Step {} of {}", (step + 1).min(count), count)
}

/// Seconds with one decimal, rounded up so a pending delay never reads 0.0s
pub fn format_countdown(remaining: Duration) -> String {
    let tenths = remaining.as_millis().div_ceil(100);
    format!("{}.{}s", tenths / 10, tenths % 10)
}
