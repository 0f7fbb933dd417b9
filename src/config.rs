/// Direction of the HDCP link as seen from this port.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PortDirection {
    /// Receiver (sink side).
    Rx,
    /// Transmitter (source side).
    Tx,
}

/// Physical interface the port is attached to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PhyInterface {
    /// HDMI, with HDCP messages carried over DDC.
    Hdmi,
    /// DisplayPort, with HDCP messages carried over AUX.
    DisplayPort,
}

/// The configuration of one HDCP port
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PortConfig {
    /// Hardware device ID, unique among the ports of a registry
    pub device_id: u16,
    /// RX or TX
    pub direction: PortDirection,
    /// HDMI or DisplayPort
    pub interface: PhyInterface,
}

/// The implemention for PortConfig
impl PortConfig {
    /// The new function for PortConfig
    pub const fn new(device_id: u16, direction: PortDirection, interface: PhyInterface) -> Self {
        Self {
            device_id,
            direction,
            interface,
        }
    }
}
