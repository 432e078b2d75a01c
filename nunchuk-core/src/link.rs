//! Host link state shared between the USB stack and the bridge.
//!
//! The USB device callbacks write into a [`LinkState`]; the transport and
//! the control loop read it. Nothing here touches a USB peripheral, so the
//! bookkeeping is tested on the host with a [`NoopRawMutex`].
//!
//! [`NoopRawMutex`]: embassy_sync::blocking_mutex::raw::NoopRawMutex

use embassy_sync::blocking_mutex::raw::RawMutex;
use embassy_sync::signal::Signal;
use portable_atomic::{AtomicBool, Ordering};

/// Configured/suspended flags plus the suspend-change and wake-request
/// signals.
pub struct LinkState<M: RawMutex> {
    configured: AtomicBool,
    suspended: AtomicBool,
    remote_wakeup_enabled: AtomicBool,
    suspend_changed: Signal<M, bool>,
    wake_request: Signal<M, ()>,
}

impl<M: RawMutex> LinkState<M> {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            configured: AtomicBool::new(false),
            suspended: AtomicBool::new(false),
            remote_wakeup_enabled: AtomicBool::new(false),
            suspend_changed: Signal::new(),
            wake_request: Signal::new(),
        }
    }

    #[inline]
    pub fn is_configured(&self) -> bool {
        self.configured.load(Ordering::Relaxed)
    }

    #[inline]
    pub fn is_suspended(&self) -> bool {
        self.suspended.load(Ordering::Relaxed)
    }

    #[inline]
    pub fn remote_wakeup_enabled(&self) -> bool {
        self.remote_wakeup_enabled.load(Ordering::Relaxed)
    }

    pub fn set_configured(&self, configured: bool) {
        self.configured.store(configured, Ordering::Relaxed);
    }

    pub fn set_remote_wakeup_enabled(&self, enabled: bool) {
        self.remote_wakeup_enabled.store(enabled, Ordering::Relaxed);
    }

    /// Record a suspend or resume and publish it to the control loop.
    ///
    /// A resume drops any wake request still pending: the host is awake,
    /// and a leftover request would wake it again right after the next
    /// suspend.
    pub fn set_suspended(&self, suspended: bool) {
        self.suspended.store(suspended, Ordering::Relaxed);
        if !suspended {
            self.wake_request.reset();
        }
        self.suspend_changed.signal(suspended);
    }

    /// Latest suspend/resume transition not yet seen by the control loop.
    pub fn take_suspend_change(&self) -> Option<bool> {
        self.suspend_changed.try_take()
    }

    /// Ask the USB task to signal remote wakeup.
    ///
    /// Returns `false` without raising a request when the host has not
    /// enabled remote wakeup.
    pub fn request_wake(&self) -> bool {
        if !self.remote_wakeup_enabled() {
            return false;
        }
        self.wake_request.signal(());
        true
    }

    #[inline]
    pub fn wake_pending(&self) -> bool {
        self.wake_request.signaled()
    }

    /// Wait until a wake request is raised, consuming it.
    pub async fn wait_wake_request(&self) {
        self.wake_request.wait().await;
    }
}

impl<M: RawMutex> Default for LinkState<M> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use embassy_futures::block_on;
    use embassy_sync::blocking_mutex::raw::NoopRawMutex;

    type TestLink = LinkState<NoopRawMutex>;

    #[test]
    fn test_starts_unconfigured_and_awake() {
        let link = TestLink::new();
        assert!(!link.is_configured());
        assert!(!link.is_suspended());
        assert!(!link.remote_wakeup_enabled());
        assert_eq!(link.take_suspend_change(), None);
        assert!(!link.wake_pending());
    }

    #[test]
    fn test_suspend_change_taken_once() {
        let link = TestLink::new();
        link.set_suspended(true);
        assert!(link.is_suspended());
        assert_eq!(link.take_suspend_change(), Some(true));
        assert_eq!(link.take_suspend_change(), None);

        // Only the latest transition is kept.
        link.set_suspended(false);
        link.set_suspended(true);
        assert_eq!(link.take_suspend_change(), Some(true));
    }

    #[test]
    fn test_wake_request_needs_host_permission() {
        let link = TestLink::new();
        link.set_suspended(true);
        assert!(!link.request_wake());
        assert!(!link.wake_pending());

        link.set_remote_wakeup_enabled(true);
        assert!(link.request_wake());
        assert!(link.wake_pending());
        block_on(link.wait_wake_request());
        assert!(!link.wake_pending());
    }

    #[test]
    fn test_resume_drops_stale_wake_request() {
        let link = TestLink::new();
        link.set_remote_wakeup_enabled(true);
        link.set_suspended(true);
        assert!(link.request_wake());

        // Host resumes on its own before the USB task acts on the request.
        link.set_suspended(false);
        assert!(!link.wake_pending());

        link.set_suspended(true);
        assert!(!link.wake_pending());
    }
}
