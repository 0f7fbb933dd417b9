//! Port lifecycle: interrupt dispatch against concurrent teardown.
//!
//! A port is torn down while its interrupt line may still fire. Dispatch
//! enters the port through [`PortLifecycle::try_begin_access`] and teardown
//! waits for in-flight dispatches to drain before the port is dropped.
//!
//! State and in-flight count share one `AtomicU32`, so "is the port active"
//! and "count me in" happen in a single CAS.
//!
//! Layout: `[state(8 bits) | in_flight(24 bits)]`

use core::sync::atomic::{AtomicU32, Ordering};

/// Port lifecycle states.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum PortState {
    /// Port is live and dispatches interrupts.
    Active = 0,
    /// Teardown has started; new interrupts are dropped.
    Removing = 1,
    /// Teardown finished.
    Removed = 2,
}

impl PortState {
    #[inline]
    fn from_raw(raw: u32) -> Self {
        match raw {
            0 => Self::Active,
            1 => Self::Removing,
            _ => Self::Removed,
        }
    }
}

/// Tracks the lifecycle state of a port and the dispatches running on it.
///
/// ```text
/// ┌────────┐ begin_removal() ┌──────────┐ complete_removal() ┌─────────┐
/// │ Active │ ──────────────> │ Removing │ ─────────────────> │ Removed │
/// └────────┘ <────────────── └──────────┘                    └─────────┘
///             abort_removal()
/// ```
pub struct PortLifecycle(AtomicU32);

impl PortLifecycle {
    const STATE_SHIFT: u32 = 24;
    const COUNT_MASK: u32 = (1 << Self::STATE_SHIFT) - 1;

    /// Creates a lifecycle in Active state with nothing in flight.
    pub const fn new() -> Self {
        Self(AtomicU32::new((PortState::Active as u32) << Self::STATE_SHIFT))
    }

    /// Gets the current lifecycle state.
    #[inline]
    pub fn state(&self) -> PortState {
        PortState::from_raw(self.0.load(Ordering::Acquire) >> Self::STATE_SHIFT)
    }

    /// Number of dispatches currently inside the port.
    #[inline]
    pub fn in_flight(&self) -> u32 {
        self.0.load(Ordering::Acquire) & Self::COUNT_MASK
    }

    /// Enters the port if it is Active.
    ///
    /// Every successful call must be paired with [`end_access`](Self::end_access).
    pub fn try_begin_access(&self) -> bool {
        self.0
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |current| {
                let state = current >> Self::STATE_SHIFT;
                let count = current & Self::COUNT_MASK;
                (state == PortState::Active as u32 && count < Self::COUNT_MASK)
                    .then_some(current + 1)
            })
            .is_ok()
    }

    /// Leaves the port.
    #[inline]
    pub fn end_access(&self) {
        let prev = self.0.fetch_sub(1, Ordering::AcqRel);
        assert!(prev & Self::COUNT_MASK != 0, "unbalanced port access");
    }

    /// Moves Active to Removing.
    ///
    /// Returns `false` if teardown already started.
    pub fn begin_removal(&self) -> bool {
        self.0
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |current| {
                (current >> Self::STATE_SHIFT == PortState::Active as u32).then_some(
                    ((PortState::Removing as u32) << Self::STATE_SHIFT)
                        | (current & Self::COUNT_MASK),
                )
            })
            .is_ok()
    }

    /// Spins until no dispatch is in flight, for at most `max_spins` spins.
    ///
    /// Returns `false` on timeout. A dispatch that tears down its own port
    /// never drains, so callers must not wait without a bound.
    pub fn wait_idle_timeout(&self, max_spins: usize) -> bool {
        let mut spins = 0;
        while self.in_flight() != 0 {
            if spins >= max_spins {
                return false;
            }
            for _ in 0..100 {
                core::hint::spin_loop();
            }
            spins += 100;
        }
        true
    }

    /// Moves Removing back to Active, keeping the in-flight count.
    ///
    /// Returns `false` if the port was not in Removing state.
    pub fn abort_removal(&self) -> bool {
        self.0
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |current| {
                (current >> Self::STATE_SHIFT == PortState::Removing as u32).then_some(
                    ((PortState::Active as u32) << Self::STATE_SHIFT)
                        | (current & Self::COUNT_MASK),
                )
            })
            .is_ok()
    }

    /// Marks teardown as finished. Call once
    /// [`wait_idle_timeout`](Self::wait_idle_timeout) succeeded.
    pub fn complete_removal(&self) {
        self.0
            .store((PortState::Removed as u32) << Self::STATE_SHIFT, Ordering::Release);
    }
}

impl Default for PortLifecycle {
    fn default() -> Self {
        Self::new()
    }
}

impl core::fmt::Debug for PortLifecycle {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("PortLifecycle")
            .field("state", &self.state())
            .field("in_flight", &self.in_flight())
            .finish()
    }
}
