//! Busy indicator port

/// Visible "loading" state shown while an upload is in flight
pub trait BusyIndicator: Send + Sync {
    fn show(&self, message: &str);

    /// Clear the indicator. Calling it when nothing is shown is a no-op.
    fn clear(&self);
}

/// Clears the indicator when dropped, so every exit path hides it
pub struct BusyGuard<'a, B: BusyIndicator + ?Sized> {
    indicator: &'a B,
}

impl<'a, B: BusyIndicator + ?Sized> BusyGuard<'a, B> {
    pub fn show(indicator: &'a B, message: &str) -> Self {
        indicator.show(message);
        Self { indicator }
    }
}

impl<B: BusyIndicator + ?Sized> Drop for BusyGuard<'_, B> {
    fn drop(&mut self) {
        self.indicator.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicBool, Ordering};

    #[derive(Default)]
    struct Flag(AtomicBool);

    impl BusyIndicator for Flag {
        fn show(&self, _message: &str) {
            self.0.store(true, Ordering::SeqCst);
        }

        fn clear(&self) {
            self.0.store(false, Ordering::SeqCst);
        }
    }

    #[test]
    fn guard_clears_on_drop() {
        let flag = Flag::default();
        {
            let _guard = BusyGuard::show(&flag, "Uploading...");
            assert!(flag.0.load(Ordering::SeqCst));
        }
        assert!(!flag.0.load(Ordering::SeqCst));
    }
}
