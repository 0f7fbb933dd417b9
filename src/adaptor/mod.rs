//! Physical-interface adaptors.
//!
//! An adaptor holds everything that depends on the transport the port sits
//! on: which interrupt cause bits exist, what they mean, and when they should
//! turn into a notification for the authentication layer. The port itself
//! only ever asks one question of its adaptor, namely whether it supplies an
//! interrupt handler.
//!
//! ```text
//! ISR ──> PortRegistry::handle_interrupt(id, cause)
//!              │
//!              ▼
//!         HdcpPort::handle_interrupt(cause)
//!              │  adaptor.intr_handler()?
//!              ▼
//!         IntrHandler::handle_interrupt(port, cause)
//!              │  decodes cause
//!              ▼
//!         HdcpPort::notify(HandlerType::AUTHENTICATE)
//! ```

mod dp;
mod hdmi;

use alloc::sync::Arc;

use crate::config::{PhyInterface, PortConfig, PortDirection};
use crate::port::HdcpPort;

pub use dp::{DpRxAdaptor, DpTxAdaptor};
pub use hdmi::{HdmiRxAdaptor, HdmiTxAdaptor};

/// Interrupt-handling capability of an adaptor.
pub trait IntrHandler: Send + Sync {
    /// Handles one interrupt for `port`.
    ///
    /// `cause` is passed through from the ISR untouched; its bits are
    /// defined by the adaptor. Called from interrupt context, so it must not
    /// block.
    fn handle_interrupt(&self, port: &HdcpPort, cause: u32);
}

/// A physical-interface adaptor bound to an HDCP port.
pub trait PhyIfAdaptor: Send + Sync {
    /// Short human-readable name, used in logs.
    fn name(&self) -> &'static str;

    /// Returns the adaptor's interrupt handler, if it has one.
    fn intr_handler(&self) -> Option<&dyn IntrHandler> {
        None
    }
}

/// Picks the built-in adaptor matching `config`.
pub fn select_adaptor(config: &PortConfig) -> Arc<dyn PhyIfAdaptor> {
    match (config.interface, config.direction) {
        (PhyInterface::Hdmi, PortDirection::Rx) => Arc::new(HdmiRxAdaptor),
        (PhyInterface::Hdmi, PortDirection::Tx) => Arc::new(HdmiTxAdaptor),
        (PhyInterface::DisplayPort, PortDirection::Rx) => Arc::new(DpRxAdaptor),
        (PhyInterface::DisplayPort, PortDirection::Tx) => Arc::new(DpTxAdaptor),
    }
}
