/// `10:42 AM`-style label shown beside messages and in the sidebar.
pub const DISPLAY_TIME_FORMAT: &str = "%I:%M %p";

/// Source of display timestamps, injected so the store stays deterministic under test.
pub trait Clock: Send + Sync {
    fn now_label(&self) -> String;
}

/// Wall clock in the local timezone.
#[derive(Debug, Clone, Copy, Default)]
pub struct LocalClock;

impl Clock for LocalClock {
    fn now_label(&self) -> String {
        chrono::Local::now().format(DISPLAY_TIME_FORMAT).to_string()
    }
}

#[cfg(test)]
pub(crate) struct FixedClock(pub &'static str);

#[cfg(test)]
impl Clock for FixedClock {
    fn now_label(&self) -> String {
        self.0.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn local_clock_renders_twelve_hour_labels() {
        let label = LocalClock.now_label();
        assert_eq!(label.len(), "10:42 AM".len());
        assert!(label.ends_with("AM") || label.ends_with("PM"));
    }
}
