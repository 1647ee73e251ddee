//! Human-readable byte sizes.

/// Format a byte count using binary units (`1.50 MB`, `512 B`).
///
/// # Example
///
/// ```
/// assert_eq!(bulkcopy::format_bytes(1536), "1.50 KB");
/// assert_eq!(bulkcopy::format_bytes(12), "12 B");
/// ```
pub fn format_bytes(bytes: u64) -> String {
    const KB: u64 = 1024;
    const MB: u64 = KB * 1024;
    const GB: u64 = MB * 1024;
    const TB: u64 = GB * 1024;

    if bytes >= TB {
        format!("{:.2} TB", bytes as f64 / TB as f64)
    } else if bytes >= GB {
        format!("{:.2} GB", bytes as f64 / GB as f64)
    } else if bytes >= MB {
        format!("{:.2} MB", bytes as f64 / MB as f64)
    } else if bytes >= KB {
        format!("{:.2} KB", bytes as f64 / KB as f64)
    } else {
        format!("{} B", bytes)
    }
}

/// Format a rate in bytes per second.
pub fn format_rate(bytes_per_sec: f64) -> String {
    if !bytes_per_sec.is_finite() || bytes_per_sec <= 0.0 {
        return format_bytes(0);
    }
    format_bytes(bytes_per_sec as u64)
}
