//! Port registry: owned table of HDCP ports indexed by [`PortId`].
//!
//! This replaces a process-wide driver table. Ports exist between
//! [`PortRegistry::init_port`] and [`PortRegistry::teardown`]; interrupts for
//! a port outside that window are dropped.

use alloc::collections::BTreeMap;
use alloc::sync::Arc;
use alloc::vec::Vec;
use core::sync::atomic::{AtomicUsize, Ordering};

use axerrno::{ax_err, AxResult};
use kspin::SpinNoIrq;

use crate::adaptor::{select_adaptor, PhyIfAdaptor};
use crate::callback::{HandlerType, PortCallback};
use crate::config::PortConfig;
use crate::lifecycle::{PortLifecycle, PortState};
use crate::port::{HdcpPort, PortId};

#[derive(Clone)]
struct PortEntry {
    port: Arc<HdcpPort>,
    lifecycle: Arc<PortLifecycle>,
}

/// Table of HDCP ports.
///
/// The table sits behind an IRQ-saving spin lock: task-context updates run
/// with local interrupts off, so the dispatch path on the same CPU can never
/// spin on a holder it preempted. Lookups clone the entry out, so dispatch
/// never holds the table lock while adaptor code runs.
pub struct PortRegistry {
    ports: SpinNoIrq<BTreeMap<PortId, PortEntry>>,

    /// Counter for generating unique port IDs.
    next_id: AtomicUsize,
}

impl PortRegistry {
    /// Spin budget [`teardown`](Self::teardown) gives in-flight dispatches.
    pub const TEARDOWN_MAX_SPINS: usize = 1 << 20;

    /// Creates a new empty registry.
    pub fn new() -> Self {
        Self {
            ports: SpinNoIrq::new(BTreeMap::new()),
            next_id: AtomicUsize::new(1),
        }
    }

    fn next_port_id(&self) -> PortId {
        PortId(self.next_id.fetch_add(1, Ordering::Relaxed))
    }

    fn entry(&self, id: PortId) -> Option<PortEntry> {
        self.ports.lock().get(&id).cloned()
    }

    /// Creates a port for `config`, bound to the built-in adaptor for its
    /// interface and direction.
    ///
    /// # Errors
    ///
    /// Returns `AlreadyExists` if a port with the same device ID is registered.
    pub fn init_port(&self, config: PortConfig) -> AxResult<PortId> {
        self.init_port_with_adaptor(config, Some(select_adaptor(&config)))
    }

    /// Creates a port for `config`, bound to `adaptor` (or to nothing).
    ///
    /// # Errors
    ///
    /// Returns `AlreadyExists` if a port with the same device ID is registered.
    pub fn init_port_with_adaptor(
        &self,
        config: PortConfig,
        adaptor: Option<Arc<dyn PhyIfAdaptor>>,
    ) -> AxResult<PortId> {
        let id = self.next_port_id();
        let entry = PortEntry {
            port: Arc::new(HdcpPort::new(id, config, adaptor)),
            lifecycle: Arc::new(PortLifecycle::new()),
        };
        let adaptor_name = entry.port.adaptor_name();

        {
            let mut ports = self.ports.lock();
            if ports
                .values()
                .any(|entry| entry.port.config().device_id == config.device_id)
            {
                return ax_err!(AlreadyExists, "HDCP port device ID already registered");
            }
            ports.insert(id, entry);
        }

        info!(
            "HDCP port {:?} initialized: device {} adaptor {:?}",
            id, config.device_id, adaptor_name
        );
        Ok(id)
    }

    /// Installs `callback` for `kind` on port `id`.
    ///
    /// # Errors
    ///
    /// - `NotFound` if no such port exists
    /// - `BadState` if the port is being torn down
    /// - `InvalidInput` if `kind` is not recognized
    ///
    /// # Panics
    ///
    /// Panics if `kind` is below [`HandlerType::AUTHENTICATE`].
    pub fn set_callback(&self, id: PortId, kind: HandlerType, callback: PortCallback) -> AxResult {
        let Some(entry) = self.entry(id) else {
            return ax_err!(NotFound, "HDCP port not found");
        };
        if entry.lifecycle.state() != PortState::Active {
            return ax_err!(BadState, "HDCP port is not active");
        }
        entry.port.set_callback(kind, callback)
    }

    /// Dispatches an interrupt for port `id`.
    ///
    /// Never fails: interrupts for unknown or inactive ports are logged and
    /// dropped.
    pub fn handle_interrupt(&self, id: PortId, cause: u32) {
        let Some(entry) = self.entry(id) else {
            warn!("HDCP interrupt for unknown port {:?}, cause {:#x}", id, cause);
            return;
        };

        if !entry.lifecycle.try_begin_access() {
            warn!(
                "HDCP interrupt for inactive port {:?} ({:?}), cause {:#x}",
                id,
                entry.lifecycle.state(),
                cause
            );
            return;
        }

        entry.port.handle_interrupt(cause);
        entry.lifecycle.end_access();
    }

    /// Tears down port `id`.
    ///
    /// New interrupts are refused immediately; the call returns once every
    /// dispatch already running on the port has finished. If they don't
    /// drain within [`TEARDOWN_MAX_SPINS`](Self::TEARDOWN_MAX_SPINS), as
    /// when a callback tears down the port that is dispatching it, the port
    /// goes back to Active and stays registered.
    ///
    /// # Errors
    ///
    /// - `NotFound` if the port does not exist
    /// - `BadState` if teardown is already in progress
    /// - `ResourceBusy` if in-flight dispatches did not drain
    pub fn teardown(&self, id: PortId) -> AxResult {
        let Some(entry) = self.entry(id) else {
            return ax_err!(NotFound, "HDCP port not found");
        };

        if !entry.lifecycle.begin_removal() {
            return ax_err!(BadState, "HDCP port is already being torn down");
        }

        if !entry.lifecycle.wait_idle_timeout(Self::TEARDOWN_MAX_SPINS) {
            entry.lifecycle.abort_removal();
            return ax_err!(ResourceBusy, "HDCP port interrupt dispatch still in flight");
        }

        let removed = self.ports.lock().remove(&id);
        entry.lifecycle.complete_removal();
        drop(removed);

        info!(
            "HDCP port {:?} torn down after {} interrupts",
            id,
            entry.port.stats().interrupts()
        );
        Ok(())
    }

    /// Gets a port by its ID.
    pub fn get_port(&self, id: PortId) -> Option<Arc<HdcpPort>> {
        self.entry(id).map(|entry| entry.port)
    }

    /// Lists all registered port IDs.
    pub fn list_ports(&self) -> Vec<PortId> {
        self.ports.lock().keys().copied().collect()
    }

    /// Gets the interrupt count of a port.
    pub fn get_port_stats(&self, id: PortId) -> Option<u64> {
        self.entry(id).map(|entry| entry.port.stats().interrupts())
    }

    /// Gets the number of registered ports.
    pub fn port_count(&self) -> usize {
        self.ports.lock().len()
    }
}

impl Default for PortRegistry {
    fn default() -> Self {
        Self::new()
    }
}
