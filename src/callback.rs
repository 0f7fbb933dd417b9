//! Notification kinds and the per-port callback slot.

use alloc::sync::Arc;
use core::fmt;

use kspin::SpinNoIrq;

/// Identifies which kind of notification a callback is registered for.
///
/// The value space is open (it comes straight from the caller), but only the
/// associated constants are recognized by [`HdcpPort::set_callback`]. Values
/// below [`HandlerType::AUTHENTICATE`] are never valid.
///
/// [`HdcpPort::set_callback`]: crate::HdcpPort::set_callback
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(transparent)]
pub struct HandlerType(pub u32);

impl HandlerType {
    /// Authentication state of the port changed.
    pub const AUTHENTICATE: Self = Self(1);

    /// Returns `true` if this kind is one the port knows how to store.
    #[inline]
    pub const fn is_valid(self) -> bool {
        matches!(self, Self::AUTHENTICATE)
    }
}

impl From<u32> for HandlerType {
    fn from(raw: u32) -> Self {
        Self(raw)
    }
}

impl fmt::Debug for HandlerType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            Self::AUTHENTICATE => f.write_str("Authenticate"),
            Self(raw) => write!(f, "Unknown({raw})"),
        }
    }
}

/// A registered notification handler.
///
/// The closure carries its own context, so a stored callback always has both
/// a call target and the state it was registered with.
pub type PortCallback = Arc<dyn Fn() + Send + Sync>;

/// Storage for one notification kind.
///
/// The slot is either empty or holds a complete callback. Readers and the
/// writer meet under an IRQ-saving spin lock, so a registration can't be
/// preempted on its own CPU by the interrupt path that reads the slot.
/// Readers see the old callback or the new one, never a mix.
pub struct CallbackSlot {
    inner: SpinNoIrq<Option<PortCallback>>,
}

impl CallbackSlot {
    /// Creates an empty slot.
    pub const fn new() -> Self {
        Self {
            inner: SpinNoIrq::new(None),
        }
    }

    /// Stores `callback`, dropping whatever was registered before.
    pub fn store(&self, callback: PortCallback) {
        let old = self.inner.lock().replace(callback);
        // The old closure's destructor runs with interrupts enabled.
        drop(old);
    }

    /// Returns the registered callback, if any.
    pub fn get(&self) -> Option<PortCallback> {
        self.inner.lock().clone()
    }

    /// Returns `true` if a callback is registered.
    #[inline]
    pub fn is_set(&self) -> bool {
        self.inner.lock().is_some()
    }

    /// Calls the registered callback outside the lock.
    ///
    /// Returns `false` when the slot is empty.
    pub fn invoke(&self) -> bool {
        match self.get() {
            Some(callback) => {
                callback();
                true
            }
            None => false,
        }
    }
}

impl Default for CallbackSlot {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for CallbackSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CallbackSlot")
            .field("is_set", &self.is_set())
            .finish()
    }
}
