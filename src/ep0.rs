//! Default control endpoint primitive and the deferred setup gate.

use core::sync::atomic::{AtomicBool, Ordering};
use usb_device::control::Request;

/// Interface to the hardware's default control endpoint.
///
/// The endpoint is driven one packet at a time: the handler arms a
/// single IN or OUT transfer, busy-waits for the hardware to complete
/// it, and only then arms the next one. Implementations are not
/// required to support more than one outstanding arm/ack/stall
/// operation, and the protocol handler never issues one.
pub trait ControlEndpoint {
    /// Returns the decoded contents of the setup packet slot.
    ///
    /// The slot is overwritten in place by the hardware on every new
    /// setup packet; the [`SetupGate`](crate::SetupGate) discipline is
    /// what makes reading it sound.
    fn setup(&self) -> Request;

    /// `true` while a previously armed transfer is still in flight.
    fn is_busy(&self) -> bool;

    /// The endpoint packet buffer. At least [`PACKET_SIZE`] bytes.
    ///
    /// For IN transfers the handler fills this buffer before calling
    /// [`arm_in`](ControlEndpoint::arm_in); for OUT transfers the
    /// hardware fills it and the handler reads it once
    /// [`is_busy`](ControlEndpoint::is_busy) clears.
    ///
    /// [`PACKET_SIZE`]: crate::PACKET_SIZE
    fn buffer(&mut self) -> &mut [u8];

    /// Arm the endpoint to transmit `len` bytes from the buffer.
    fn arm_in(&mut self, len: usize);

    /// Arm the endpoint to receive up to one packet into the buffer.
    fn arm_out(&mut self);

    /// Acknowledge a zero-length status stage.
    fn ack(&mut self);

    /// Stall the endpoint, terminating the current control transfer.
    fn stall(&mut self);

    /// Spin until the endpoint is no longer busy.
    ///
    /// This is the only suspension point of the protocol handler, and
    /// it is strictly polling: control never yields to other work
    /// while a packet is in flight.
    fn wait_idle(&self) {
        while self.is_busy() {
            core::hint::spin_loop();
        }
    }
}

/// Interface to the USB bus connection state.
///
/// Used by the re-enumeration request only: the handler drives the
/// disconnect bit and holds it for a settle delay so the host sees a
/// real unplug.
pub trait BusControl {
    /// Assert or release the bus disconnect control.
    fn set_disconnect(&mut self, disconnect: bool);

    /// Block for at least `ms` milliseconds.
    fn delay_ms(&mut self, ms: u16);
}

/// One-slot admission gate between the setup interrupt and the main
/// loop.
///
/// The setup packet slot is shared, unsynchronized storage that the
/// hardware overwrites on every arrival, so at most one request may be
/// awaiting classification at any time. The gate enforces that with a
/// single atomic flag: the interrupt handler calls
/// [`notify`](SetupGate::notify) and stalls the endpoint if it returns
/// `false`; the main loop polls [`is_pending`](SetupGate::is_pending)
/// and hands the request to the protocol handler, which clears the
/// gate as soon as the request is classified. A second arrival is
/// rejected, never queued.
pub struct SetupGate(AtomicBool);

impl SetupGate {
    /// Creates a gate with no request pending. Usable in a `static`.
    pub const fn new() -> Self {
        SetupGate(AtomicBool::new(false))
    }

    /// Record that a setup packet arrived.
    ///
    /// Returns `false` if a request is already pending; the caller
    /// must stall the endpoint and must not treat the new packet as
    /// accepted. Safe to call at interrupt priority, never blocks.
    #[must_use]
    pub fn notify(&self) -> bool {
        self.0
            .compare_exchange(false, true, Ordering::Acquire, Ordering::Relaxed)
            .is_ok()
    }

    /// `true` while a request is pending and not yet classified.
    pub fn is_pending(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }

    /// Drop the pending request.
    ///
    /// The protocol handler calls this as soon as it recognizes a
    /// request, before starting the data stage. An integrator may also
    /// call it to abandon a pending request on bus reset.
    pub fn clear(&self) {
        self.0.store(false, Ordering::Release);
    }
}

impl Default for SetupGate {
    fn default() -> Self {
        SetupGate::new()
    }
}
