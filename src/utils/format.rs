//! Time-left and label formatting

/// Split seconds into hours, minutes and seconds
fn split(total_seconds: u64) -> (u64, u64, u64) {
    let hours = total_seconds / 3600;
    let minutes = (total_seconds % 3600) / 60;
    let seconds = total_seconds % 60;
    (hours, minutes, seconds)
}

/// Format as zero-padded `HH:MM:SS`
pub fn format_hms(total_seconds: u64) -> String {
    let (hours, minutes, seconds) = split(total_seconds);
    format!("{:02}:{:02}:{:02}", hours, minutes, seconds)
}

/// Compact `HH:MM` variant; seconds are truncated
pub fn format_hm(total_seconds: u64) -> String {
    let (hours, minutes, _) = split(total_seconds);
    format!("{:02}:{:02}", hours, minutes)
}

/// Picker label, e.g. "1 minute" or "15 minutes"
pub fn minutes_label(minutes: u32) -> String {
    format!("{} minute{}", minutes, if minutes == 1 { "" } else { "s" })
}
