//! HDMI adaptors. HDCP 1.x runs over the DDC channel on HDMI.

use crate::callback::HandlerType;
use crate::port::HdcpPort;

use super::{IntrHandler, PhyIfAdaptor};

/// HDMI RX adaptor.
///
/// The source writing its Aksv over DDC is what starts an authentication
/// attempt, so that event is forwarded as [`HandlerType::AUTHENTICATE`].
#[derive(Debug, Clone, Copy, Default)]
pub struct HdmiRxAdaptor;

impl HdmiRxAdaptor {
    /// DDC status: the transmitter wrote Aksv.
    pub const DDC_AKSV_EVENT: u32 = 1 << 4;
}

impl PhyIfAdaptor for HdmiRxAdaptor {
    fn name(&self) -> &'static str {
        "hdmi-rx"
    }

    fn intr_handler(&self) -> Option<&dyn IntrHandler> {
        Some(self)
    }
}

impl IntrHandler for HdmiRxAdaptor {
    fn handle_interrupt(&self, port: &HdcpPort, cause: u32) {
        if cause & Self::DDC_AKSV_EVENT != 0 {
            port.notify(HandlerType::AUTHENTICATE);
        }
    }
}

/// HDMI TX adaptor.
///
/// The transmitter polls the sink over DDC and has no interrupt path.
#[derive(Debug, Clone, Copy, Default)]
pub struct HdmiTxAdaptor;

impl PhyIfAdaptor for HdmiTxAdaptor {
    fn name(&self) -> &'static str {
        "hdmi-tx"
    }
}
