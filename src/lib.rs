#![cfg_attr(not(test), no_std)]
#![warn(missing_docs)]
//!
//! Implements the Cypress FX2-series vendor bootloader protocol for a
//! USB device.
//!
//! ## About
//!
//! Cypress EZ-USB controllers boot from a small serial EEPROM, and the
//! stock "Cypress-class" firmware exposes a handful of vendor control
//! requests on endpoint 0 that host-side programming tools use to
//! inspect and reprogram the device. This library implements that
//! protocol: it classifies incoming vendor requests, runs the chunked
//! data stages packet by packet, and drives the bootloader side effects
//! (EEPROM access, external memory access, bus re-enumeration).
//!
//! This library is a protocol implementation only. Actual code that
//! moves packets through the control endpoint, clocks bytes to the
//! EEPROM, or copies external memory is not part of the library and is
//! expected to be provided by the library user through the
//! [`ControlEndpoint`], [`BusControl`], [`Eeprom`] and [`ExternalRam`]
//! traits.
//!
//! ### Supported requests
//!
//! | Code   | Direction | Effect                                        |
//! |--------|-----------|-----------------------------------------------|
//! | `0xA2` | IN/OUT    | EEPROM read/write, single-byte addressing     |
//! | `0xA9` | IN/OUT    | EEPROM read/write, dual-byte addressing       |
//! | `0xA3` | IN/OUT    | External RAM read/write                       |
//! | `0xA8` | OUT       | Disconnect and re-enumerate                   |
//! | `0xB0` | OUT       | Set the EEPROM write page size                |
//!
//! Any other request reaching the handler stalls the control endpoint.
//!
//! ### Concurrency
//!
//! Setup packets arrive at interrupt priority, but the data stage of a
//! transfer may block for milliseconds on EEPROM timing, so the two are
//! decoupled: the interrupt handler only raises a [`SetupGate`], and
//! the main loop services the pending request with
//! [`Bootloader::service_pending`]. The gate guarantees that at most
//! one request is pending at any time; a setup packet that arrives
//! while another request is still waiting to be classified must be
//! answered with a stall from the interrupt handler.
//!
//! ## Example
//!
//! The shims below are backed by plain arrays; on hardware they would
//! be thin wrappers around the USB core registers and the EEPROM
//! driver.
//!
//! ```
//! use usb_device::control::{Recipient, Request, RequestType};
//! use usb_device::UsbDirection;
//! use fx2boot::*;
//!
//! struct DemoEp0 {
//!     setup: Request,
//!     buf: [u8; 64],
//! }
//!
//! impl ControlEndpoint for DemoEp0 {
//!     fn setup(&self) -> Request {
//!         self.setup
//!     }
//!     fn is_busy(&self) -> bool {
//!         false
//!     }
//!     fn buffer(&mut self) -> &mut [u8] {
//!         &mut self.buf
//!     }
//!     fn arm_in(&mut self, _len: usize) {}
//!     fn arm_out(&mut self) {}
//!     fn ack(&mut self) {}
//!     fn stall(&mut self) {}
//! }
//!
//! struct DemoBus;
//!
//! impl BusControl for DemoBus {
//!     fn set_disconnect(&mut self, _disconnect: bool) {}
//!     fn delay_ms(&mut self, _ms: u16) {}
//! }
//!
//! struct DemoEeprom {
//!     mem: [u8; 1024],
//! }
//!
//! impl Eeprom for DemoEeprom {
//!     fn read(
//!         &mut self,
//!         _chip: u8,
//!         addr: u16,
//!         buf: &mut [u8],
//!         _width: AddressWidth,
//!     ) -> Result<(), EepromError> {
//!         let addr = addr as usize;
//!         buf.copy_from_slice(&self.mem[addr..addr + buf.len()]);
//!         Ok(())
//!     }
//!
//!     fn write(
//!         &mut self,
//!         _chip: u8,
//!         addr: u16,
//!         data: &[u8],
//!         _width: AddressWidth,
//!         _page_size: u8,
//!         _timeout_ms: u16,
//!     ) -> Result<(), EepromError> {
//!         let addr = addr as usize;
//!         self.mem[addr..addr + data.len()].copy_from_slice(data);
//!         Ok(())
//!     }
//! }
//!
//! struct DemoRam {
//!     mem: [u8; 1024],
//! }
//!
//! impl ExternalRam for DemoRam {
//!     fn read_into(&mut self, addr: u16, buf: &mut [u8]) {
//!         let addr = addr as usize;
//!         buf.copy_from_slice(&self.mem[addr..addr + buf.len()]);
//!     }
//!     fn write_from(&mut self, addr: u16, data: &[u8]) {
//!         let addr = addr as usize;
//!         self.mem[addr..addr + data.len()].copy_from_slice(data);
//!     }
//! }
//!
//! // One gate per device, shared between the setup interrupt and the
//! // main loop.
//! static GATE: SetupGate = SetupGate::new();
//!
//! // In the EP0 setup interrupt handler:
//! //
//! //     if !GATE.notify() {
//! //         /* stall EP0, a request is already pending */
//! //     }
//! assert!(GATE.notify());
//!
//! // The host asked for a write page size of 8 bytes (request 0xB0).
//! let mut ep0 = DemoEp0 {
//!     setup: Request {
//!         direction: UsbDirection::Out,
//!         request_type: RequestType::Vendor,
//!         recipient: Recipient::Device,
//!         request: 0xB0,
//!         value: 0x0008,
//!         index: 0,
//!         length: 0,
//!     },
//!     buf: [0; 64],
//! };
//! let mut bus = DemoBus;
//! let mut boot = Bootloader::new(
//!     DemoEeprom { mem: [0xFF; 1024] },
//!     DemoRam { mem: [0; 1024] },
//! );
//!
//! // Main loop body.
//! if boot.service_pending(&GATE, &mut ep0, &mut bus) {
//!     assert_eq!(boot.page_size(), 8);
//! }
//! ```
//!

/// Bootloader protocol module
pub mod proto;

/// Control endpoint interface module
pub mod ep0;

/// Storage interface module
pub mod mem;

#[doc(inline)]
pub use crate::ep0::{BusControl, ControlEndpoint, SetupGate};
#[doc(inline)]
pub use crate::mem::{AddressWidth, Eeprom, EepromError, ExternalRam};
#[doc(inline)]
pub use crate::proto::{Bootloader, PACKET_SIZE};
