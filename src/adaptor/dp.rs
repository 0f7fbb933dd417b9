//! DisplayPort adaptors. HDCP 1.x runs over the AUX channel on DisplayPort.

use crate::callback::HandlerType;
use crate::port::HdcpPort;

use super::{IntrHandler, PhyIfAdaptor};

/// DisplayPort RX adaptor.
#[derive(Debug, Clone, Copy, Default)]
pub struct DpRxAdaptor;

impl DpRxAdaptor {
    /// Interrupt cause: the transmitter wrote Aksv over AUX.
    pub const AKSV_WRITE: u32 = 1 << 20;
}

impl PhyIfAdaptor for DpRxAdaptor {
    fn name(&self) -> &'static str {
        "dp-rx"
    }

    fn intr_handler(&self) -> Option<&dyn IntrHandler> {
        Some(self)
    }
}

impl IntrHandler for DpRxAdaptor {
    fn handle_interrupt(&self, port: &HdcpPort, cause: u32) {
        if cause & Self::AKSV_WRITE != 0 {
            port.notify(HandlerType::AUTHENTICATE);
        }
    }
}

/// DisplayPort TX adaptor.
///
/// A sink reports a link integrity failure through an HPD IRQ pulse; the
/// authentication layer is told so it can read Bstatus and re-authenticate.
#[derive(Debug, Clone, Copy, Default)]
pub struct DpTxAdaptor;

impl DpTxAdaptor {
    /// Interrupt cause: HPD IRQ pulse from the sink.
    pub const HPD_IRQ: u32 = 1 << 1;
}

impl PhyIfAdaptor for DpTxAdaptor {
    fn name(&self) -> &'static str {
        "dp-tx"
    }

    fn intr_handler(&self) -> Option<&dyn IntrHandler> {
        Some(self)
    }
}

impl IntrHandler for DpTxAdaptor {
    fn handle_interrupt(&self, port: &HdcpPort, cause: u32) {
        if cause & Self::HPD_IRQ != 0 {
            trace!("HDCP port {:?}: HPD IRQ, checking link integrity", port.id());
            port.notify(HandlerType::AUTHENTICATE);
        }
    }
}
