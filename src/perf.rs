//! Timing, throughput and memory figures for run reports.

use std::time::Duration;

/// HH:MM:SS.d
#[must_use]
pub fn format_elapsed(d: Duration) -> String {
    let total_secs = d.as_secs();
    let hours = total_secs / 3600;
    let minutes = (total_secs % 3600) / 60;
    let seconds = total_secs % 60;
    let tenths = d.subsec_millis() / 100;
    format!("{hours:02}:{minutes:02}:{seconds:02}.{tenths}")
}

/// Items per second, e.g. `"12.3k reads/s"`. Sub-millisecond runs report no rate.
#[must_use]
pub fn format_rate(count: usize, elapsed: Duration, unit: &str) -> String {
    let secs = elapsed.as_secs_f64();
    if secs < 1e-3 {
        return format!("- {unit}/s");
    }
    let rate = count as f64 / secs;
    if rate >= 1e6 {
        format!("{:.1}M {unit}/s", rate / 1e6)
    } else if rate >= 1e3 {
        format!("{:.1}k {unit}/s", rate / 1e3)
    } else {
        format!("{rate:.0} {unit}/s")
    }
}

/// Peak resident set size of this process in bytes.
#[must_use]
pub fn peak_memory_bytes() -> Option<u64> {
    #[cfg(any(target_os = "macos", target_os = "linux"))]
    {
        use std::mem::MaybeUninit;
        let mut usage = MaybeUninit::<libc::rusage>::uninit();
        // SAFETY: RUSAGE_SELF with a pointer to properly sized and aligned storage.
        let ret = unsafe { libc::getrusage(libc::RUSAGE_SELF, usage.as_mut_ptr()) };
        if ret == 0 {
            // SAFETY: a zero return means the struct was filled in.
            let usage = unsafe { usage.assume_init() };
            let max_rss = usage.ru_maxrss as u64;
            // ru_maxrss is bytes on macOS and kilobytes on Linux.
            return Some(if cfg!(target_os = "macos") {
                max_rss
            } else {
                max_rss * 1024
            });
        }
    }
    None
}

#[must_use]
pub fn format_bytes(bytes: u64) -> String {
    const UNITS: [(&str, u64); 3] = [("GB", 1 << 30), ("MB", 1 << 20), ("KB", 1 << 10)];
    for (unit, size) in UNITS {
        if bytes >= size {
            return format!("{:.1} {unit}", bytes as f64 / size as f64);
        }
    }
    format!("{bytes} B")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn elapsed_formatting() {
        assert_eq!(format_elapsed(Duration::from_millis(4400)), "00:00:04.4");
        assert_eq!(format_elapsed(Duration::from_secs(3661)), "01:01:01.0");
    }

    #[test]
    fn rate_formatting() {
        assert_eq!(format_rate(500, Duration::from_secs(1), "reads"), "500 reads/s");
        assert_eq!(format_rate(12_300, Duration::from_secs(1), "reads"), "12.3k reads/s");
        assert_eq!(format_rate(3_000_000, Duration::from_secs(2), "reads"), "1.5M reads/s");
        assert_eq!(format_rate(10, Duration::ZERO, "hits"), "- hits/s");
    }

    #[test]
    fn byte_units() {
        assert_eq!(format_bytes(500), "500 B");
        assert_eq!(format_bytes(1536), "1.5 KB");
        assert_eq!(format_bytes(3 * 1024 * 1024 * 1024), "3.0 GB");
    }

    #[test]
    fn peak_memory_available() {
        if cfg!(any(target_os = "macos", target_os = "linux")) {
            assert!(peak_memory_bytes().is_some_and(|m| m > 0));
        }
    }
}
