#![no_std]

//! # HDCP Port Interrupt and Callback Layer
//!
//! This crate provides the port layer of an HDCP 1.x transceiver driver: it
//! routes raw interrupt causes to the physical-interface adaptor bound to a
//! port and holds the callbacks through which adaptors notify the
//! authentication layer. It is designed for `no_std` environments and uses
//! the `alloc` crate for dynamic memory allocation.
//!
//! ## Architecture
//!
//! - [`HdcpPort`]: one HDCP-capable link with its adaptor, callback slot and
//!   statistics
//! - [`PhyIfAdaptor`] / [`IntrHandler`]: transport-specific behaviour
//!   (HDMI or DisplayPort, RX or TX)
//! - [`CallbackSlot`] / [`HandlerType`]: notification registration
//! - [`PortRegistry`]: owned table of ports with init/teardown and
//!   interrupt dispatch by [`PortId`]
//! - [`PortLifecycle`]: keeps teardown from racing in-flight interrupts
//!
//! ## Control Flow
//!
//! ```text
//! hardware IRQ ─> driver ISR ─> PortRegistry::handle_interrupt
//!                                  └─> HdcpPort::handle_interrupt
//!                                        └─> IntrHandler::handle_interrupt
//!                                              └─> HdcpPort::notify ─> callback
//! ```
//!
//! ## Examples
//!
//! ```rust,ignore
//! use axhdcp::{HandlerType, PhyInterface, PortConfig, PortDirection, PortRegistry};
//!
//! let registry = PortRegistry::new();
//! let id = registry.init_port(PortConfig::new(0, PortDirection::Rx, PhyInterface::Hdmi))?;
//!
//! registry.set_callback(id, HandlerType::AUTHENTICATE, Arc::new(move || {
//!     auth_state.kick();
//! }))?;
//!
//! // From the HDCP interrupt line:
//! registry.handle_interrupt(id, read_cause_register());
//! ```

extern crate alloc;
#[macro_use]
extern crate log;

mod adaptor;
mod callback;
mod config;
mod lifecycle;
mod port;
mod registry;

pub use adaptor::{
    select_adaptor, DpRxAdaptor, DpTxAdaptor, HdmiRxAdaptor, HdmiTxAdaptor, IntrHandler,
    PhyIfAdaptor,
};
pub use callback::{CallbackSlot, HandlerType, PortCallback};
pub use config::{PhyInterface, PortConfig, PortDirection};
pub use lifecycle::{PortLifecycle, PortState};
pub use port::{HdcpPort, PortId, PortStats};
pub use registry::PortRegistry;
