use core::cmp::min;
use usb_device::control::{Recipient, Request, RequestType};
use usb_device::UsbDirection;

use crate::ep0::{BusControl, ControlEndpoint, SetupGate};
use crate::mem::{AddressWidth, Eeprom, ExternalRam};

const REQ_EEPROM_SB: u8 = 0xA2;
const REQ_EXT_RAM: u8 = 0xA3;
const REQ_RENUMERATE: u8 = 0xA8;
const REQ_EEPROM_DB: u8 = 0xA9;
const REQ_PAGE_SIZE: u8 = 0xB0;

/// Maximum packet size of the default control endpoint.
///
/// Chunked data stages never move more than this many bytes per
/// packet.
pub const PACKET_SIZE: usize = 64;

/// Per-page completion poll limit for EEPROM writes, in milliseconds.
const EEPROM_WRITE_TIMEOUT_MS: u16 = 166;

/// How long the device stays disconnected during re-enumeration.
const RENUM_SETTLE_MS: u16 = 10;

/// Vendor bootloader request handler.
///
/// Owns the storage collaborators and the negotiated page-size
/// setting, and services one control request end-to-end per
/// invocation: classify, clear the [`SetupGate`], run the data stage,
/// finish with exactly one terminal action (completion, acknowledge,
/// or stall).
pub struct Bootloader<E: Eeprom, X: ExternalRam> {
    eeprom: E,
    xram: X,
    page_size: u8,
}

impl<E: Eeprom, X: ExternalRam> Bootloader<E, X> {
    /// Creates a new [`Bootloader`] around the provided storage
    /// drivers.
    ///
    /// The page size starts at 0; a host that intends to issue
    /// page-timed EEPROM writes must set it first with request
    /// `0xB0`.
    pub fn new(eeprom: E, xram: X) -> Self {
        Bootloader {
            eeprom,
            xram,
            page_size: 0,
        }
    }

    /// Consumes self and returns the owned storage drivers.
    pub fn release(self) -> (E, X) {
        (self.eeprom, self.xram)
    }

    /// The EEPROM write page size last set by the host, 0 if never
    /// set.
    pub fn page_size(&self) -> u8 {
        self.page_size
    }

    /// Main-loop polling step.
    ///
    /// Services the pending request if the gate is raised. Returns
    /// `true` if a request was serviced.
    pub fn service_pending<C, B>(&mut self, gate: &SetupGate, ep0: &mut C, bus: &mut B) -> bool
    where
        C: ControlEndpoint,
        B: BusControl,
    {
        if !gate.is_pending() {
            return false;
        }
        self.service(gate, ep0, bus);
        true
    }

    /// Classify and run the pending control request.
    ///
    /// Must only be called while `gate` is raised. The gate is cleared
    /// as soon as the request is recognized, before any blocking I/O,
    /// so the interrupt handler stops rejecting new setup packets once
    /// this request's data stage begins.
    ///
    /// May block on endpoint readiness and on EEPROM timing.
    pub fn service<C, B>(&mut self, gate: &SetupGate, ep0: &mut C, bus: &mut B)
    where
        C: ControlEndpoint,
        B: BusControl,
    {
        let req = ep0.setup();

        if req.request_type != RequestType::Vendor || req.recipient != Recipient::Device {
            gate.clear();
            ep0.stall();
            return;
        }

        match (req.direction, req.request) {
            (UsbDirection::Out, REQ_RENUMERATE) => {
                gate.clear();
                // No acknowledge: the disconnect itself terminates the
                // transfer.
                bus.set_disconnect(true);
                bus.delay_ms(RENUM_SETTLE_MS);
                bus.set_disconnect(false);
            }
            (UsbDirection::Out, REQ_PAGE_SIZE) => {
                self.page_size = req.value as u8;
                gate.clear();
                ep0.ack();
            }
            (_, REQ_EEPROM_SB) | (_, REQ_EEPROM_DB) => {
                let width = if req.request == REQ_EEPROM_DB {
                    AddressWidth::Double
                } else {
                    AddressWidth::Single
                };
                gate.clear();
                self.eeprom_transfer(ep0, req, width);
            }
            (_, REQ_EXT_RAM) => {
                gate.clear();
                self.xram_transfer(ep0, req);
            }
            _ => {
                gate.clear();
                ep0.stall();
            }
        }
    }

    /// Chunked EEPROM data stage.
    ///
    /// One EEPROM call per packet. A driver error stalls the endpoint
    /// and abandons the remainder of the transfer; packets already
    /// moved stay applied.
    fn eeprom_transfer<C: ControlEndpoint>(
        &mut self,
        ep0: &mut C,
        req: Request,
        width: AddressWidth,
    ) {
        let chip = width.chip_address();
        let mut addr = req.value;
        let mut remaining = req.length;

        if remaining == 0 {
            ep0.ack();
            return;
        }

        while remaining > 0 {
            let len = min(remaining, PACKET_SIZE as u16);
            let n = usize::from(len);

            match req.direction {
                UsbDirection::In => {
                    ep0.wait_idle();
                    if self
                        .eeprom
                        .read(chip, addr, &mut ep0.buffer()[..n], width)
                        .is_err()
                    {
                        ep0.stall();
                        break;
                    }
                    ep0.arm_in(n);
                }
                UsbDirection::Out => {
                    ep0.arm_out();
                    ep0.wait_idle();
                    if self
                        .eeprom
                        .write(
                            chip,
                            addr,
                            &ep0.buffer()[..n],
                            width,
                            self.page_size,
                            EEPROM_WRITE_TIMEOUT_MS,
                        )
                        .is_err()
                    {
                        ep0.stall();
                        break;
                    }
                    ep0.ack();
                }
            }

            addr = addr.wrapping_add(len);
            remaining -= len;
        }
    }

    /// Chunked external RAM data stage.
    ///
    /// Same packet discipline as the EEPROM path, but the per-packet
    /// copy cannot fail. The last packet of an OUT transfer may be
    /// short; only that packet's worth of bytes is copied out.
    fn xram_transfer<C: ControlEndpoint>(&mut self, ep0: &mut C, req: Request) {
        let mut addr = req.value;
        let mut remaining = req.length;

        if remaining == 0 {
            ep0.ack();
            return;
        }

        while remaining > 0 {
            let len = min(remaining, PACKET_SIZE as u16);
            let n = usize::from(len);

            match req.direction {
                UsbDirection::In => {
                    ep0.wait_idle();
                    self.xram.read_into(addr, &mut ep0.buffer()[..n]);
                    ep0.arm_in(n);
                }
                UsbDirection::Out => {
                    ep0.arm_out();
                    ep0.wait_idle();
                    self.xram.write_from(addr, &ep0.buffer()[..n]);
                    ep0.ack();
                }
            }

            addr = addr.wrapping_add(len);
            remaining -= len;
        }
    }
}
