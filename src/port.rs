//! HDCP port instance with callback registration, interrupt dispatch and statistics.

use alloc::sync::Arc;
use core::sync::atomic::{AtomicU64, Ordering};

use axerrno::{ax_err, AxResult};

use crate::adaptor::PhyIfAdaptor;
use crate::callback::{CallbackSlot, HandlerType, PortCallback};
use crate::config::PortConfig;

/// Unique identifier for a port.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct PortId(pub usize);

/// Statistics for a port.
///
/// Read-only outside the crate; only interrupt dispatch bumps the counters.
///
/// ```rust,compile_fail
/// use axhdcp::{HdcpPort, PhyInterface, PortConfig, PortDirection, PortId};
///
/// let config = PortConfig::new(0, PortDirection::Rx, PhyInterface::Hdmi);
/// let port = HdcpPort::new(PortId(1), config, None);
/// port.stats().record_interrupt();
/// ```
#[derive(Debug, Default)]
pub struct PortStats {
    /// Number of interrupts forwarded to the adaptor.
    pub(crate) int_count: AtomicU64,
}

impl PortStats {
    /// Creates a new statistics tracker.
    pub fn new() -> Self {
        Self::default()
    }

    /// Records an interrupt forwarded to the adaptor.
    #[inline]
    pub(crate) fn record_interrupt(&self) {
        self.int_count.fetch_add(1, Ordering::Relaxed);
    }

    /// Gets the total number of forwarded interrupts.
    #[inline]
    pub fn interrupts(&self) -> u64 {
        self.int_count.load(Ordering::Relaxed)
    }
}

/// One HDCP-capable physical connection.
///
/// The port owns:
/// - **Adaptor**: the physical-interface adaptor bound at construction, if any.
///   It is never rebound.
/// - **Callback slot**: the handler for [`HandlerType::AUTHENTICATE`].
/// - **Statistics**: counters mutated only by [`HdcpPort::handle_interrupt`].
///
/// `handle_interrupt` runs in interrupt context and `set_callback` in task
/// context; neither blocks beyond a short spin lock around the slot.
pub struct HdcpPort {
    id: PortId,
    config: PortConfig,
    adaptor: Option<Arc<dyn PhyIfAdaptor>>,
    auth: CallbackSlot,
    stats: PortStats,
}

impl HdcpPort {
    /// Creates a port bound to `adaptor`.
    pub fn new(id: PortId, config: PortConfig, adaptor: Option<Arc<dyn PhyIfAdaptor>>) -> Self {
        Self {
            id,
            config,
            adaptor,
            auth: CallbackSlot::new(),
            stats: PortStats::new(),
        }
    }

    /// Gets the port ID.
    #[inline]
    pub fn id(&self) -> PortId {
        self.id
    }

    /// Gets the configuration the port was created with.
    #[inline]
    pub fn config(&self) -> &PortConfig {
        &self.config
    }

    /// Name of the bound adaptor, or `None` if the port is unbound.
    pub fn adaptor_name(&self) -> Option<&'static str> {
        self.adaptor.as_ref().map(|adaptor| adaptor.name())
    }

    /// Gets a reference to the statistics.
    #[inline]
    pub fn stats(&self) -> &PortStats {
        &self.stats
    }

    /// Installs `callback` for the notification `kind`.
    ///
    /// A callback already installed for `kind` is replaced, not combined.
    ///
    /// # Errors
    ///
    /// Returns [`InvalidInput`](axerrno::AxError::InvalidInput) if `kind` is
    /// not a recognized [`HandlerType`]. Nothing is modified in that case.
    ///
    /// # Panics
    ///
    /// Panics if `kind` is below [`HandlerType::AUTHENTICATE`].
    pub fn set_callback(&self, kind: HandlerType, callback: PortCallback) -> AxResult {
        assert!(
            kind >= HandlerType::AUTHENTICATE,
            "HDCP port handler type {:?} out of range",
            kind
        );
        match kind {
            HandlerType::AUTHENTICATE => {
                self.auth.store(callback);
                debug!("HDCP port {:?}: {:?} callback installed", self.id, kind);
                Ok(())
            }
            _ => ax_err!(InvalidInput, "unknown HDCP port handler type"),
        }
    }

    /// Returns the registered authentication callback.
    pub fn auth_callback(&self) -> Option<PortCallback> {
        self.auth.get()
    }

    /// Returns `true` if an authentication callback is registered.
    #[inline]
    pub fn is_auth_callback_set(&self) -> bool {
        self.auth.is_set()
    }

    /// Delivers a notification of `kind` to the upper layer.
    ///
    /// Called by adaptors. Returns `true` if a callback ran; an empty slot or
    /// an unrecognized kind means no notification is delivered.
    pub fn notify(&self, kind: HandlerType) -> bool {
        let delivered = match kind {
            HandlerType::AUTHENTICATE => self.auth.invoke(),
            _ => false,
        };
        debug!(
            "HDCP port {:?}: notify {:?}, delivered={}",
            self.id, kind, delivered
        );
        delivered
    }

    /// Handles an interrupt generated by the port hardware.
    ///
    /// If the bound adaptor has an interrupt handler, the interrupt counter is
    /// bumped once and `cause` is forwarded unmodified. Otherwise nothing
    /// happens.
    pub fn handle_interrupt(&self, cause: u32) {
        let Some(handler) = self.adaptor.as_ref().and_then(|a| a.intr_handler()) else {
            trace!("HDCP port {:?}: no interrupt handler, cause {:#x} dropped", self.id, cause);
            return;
        };

        self.stats.record_interrupt();
        trace!("HDCP port {:?}: interrupt cause {:#x}", self.id, cause);
        handler.handle_interrupt(self, cause);
    }
}

impl core::fmt::Debug for HdcpPort {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("HdcpPort")
            .field("id", &self.id)
            .field("config", &self.config)
            .field("adaptor", &self.adaptor_name())
            .field("auth", &self.auth)
            .field("int_count", &self.stats.interrupts())
            .finish()
    }
}
