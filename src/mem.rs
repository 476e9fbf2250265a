//! Storage collaborator interfaces: the boot EEPROM and external RAM.

/// EEPROM addressing width.
///
/// The protocol exposes two request codes for EEPROM access, one per
/// addressing width, and each width maps to a fixed I2C device
/// address: small parts that take a single address byte answer at
/// `0x50`, larger dual-byte parts at `0x51`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt-03", derive(defmt::Format))]
pub enum AddressWidth {
    /// One address byte per operation.
    Single,
    /// Two address bytes per operation.
    Double,
}

impl AddressWidth {
    /// The I2C device address the bootloader uses for this width.
    pub fn chip_address(self) -> u8 {
        match self {
            AddressWidth::Single => 0x50,
            AddressWidth::Double => 0x51,
        }
    }
}

/// Errors the EEPROM driver may report.
///
/// The protocol handler does not distinguish between them: any error
/// aborts the transfer and stalls the control endpoint. There is no
/// retry at any layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt-03", derive(defmt::Format))]
pub enum EepromError {
    /// The device did not acknowledge its address or a data byte.
    NoAck,
    /// A page write did not complete within the allotted poll time.
    Timeout,
}

/// Interface to the serial EEPROM block driver.
///
/// Implementations perform byte-level I2C-style transfers and handle
/// page-write completion polling internally; both calls block until
/// the operation finishes or fails.
pub trait Eeprom {
    /// Read `buf.len()` bytes starting at `addr` into `buf`.
    fn read(
        &mut self,
        chip: u8,
        addr: u16,
        buf: &mut [u8],
        width: AddressWidth,
    ) -> Result<(), EepromError>;

    /// Write `data` starting at `addr`.
    ///
    /// `page_size` is the write-page granularity previously negotiated
    /// by the host, or 0 if it never was; `timeout_ms` bounds the
    /// per-page completion poll.
    fn write(
        &mut self,
        chip: u8,
        addr: u16,
        data: &[u8],
        width: AddressWidth,
        page_size: u8,
        timeout_ms: u16,
    ) -> Result<(), EepromError>;
}

/// Interface to the auxiliary (external RAM) memory space.
///
/// Plain byte copies with no failure path.
pub trait ExternalRam {
    /// Copy `buf.len()` bytes starting at `addr` into `buf`.
    fn read_into(&mut self, addr: u16, buf: &mut [u8]);

    /// Copy `data` into memory starting at `addr`.
    fn write_from(&mut self, addr: u16, data: &[u8]);
}
