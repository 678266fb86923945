//! The downward interface this core consumes from the platform kernel
//! layer: physical mapping, port I/O, and PCI configuration access.
//!
//! Modeled as traits (rather than free functions, the way
//! `slopos_drivers::pci`'s `pci_config_read32`/`outl`/`inl` are called
//! directly) so unit tests can substitute fakes instead of touching real
//! hardware.

use slopos_abi::addr::{PhysAddr, VirtAddr};

use crate::error::HandlerError;
use crate::width::AccessWidth;

/// A resolved PCI bus address: segment, bus, device, function.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub struct PciAddress {
    pub segment: u16,
    pub bus: u8,
    pub device: u8,
    pub function: u8,
}

/// Physical-memory mapping primitives backing the MMIO handler.
///
/// `phys`/`virt` are typed through `slopos_abi::addr` the same way
/// `slopos_mm::mmio::MmioRegion::map` and
/// `slopos_drivers::acpi_platform::KernelPlatformMemory` are, so a physical
/// base can't be passed where a virtual one is expected.
pub trait PlatformMemory {
    /// Map `[phys, phys+size)` into a readable/writable virtual range.
    fn map(&self, phys: PhysAddr, size: u64) -> Result<VirtAddr, HandlerError>;

    /// Unmap a range previously returned by `map`.
    fn unmap(&self, virt: VirtAddr, size: u64);
}

/// Port-I/O primitives backing the port-I/O handler.
pub trait PlatformIo {
    /// Opaque handle returned by `io_map`, presented back on every other
    /// call. Concrete platforms typically make this the port base itself.
    type Handle: Copy;

    /// Reserve `[base, base+size)` for port access.
    fn io_map(&self, base: u64, size: u64) -> Result<Self::Handle, HandlerError>;

    /// Release a handle previously returned by `io_map`.
    fn io_unmap(&self, handle: Self::Handle);

    /// Read `width` bytes at `offset` within the reserved range.
    fn io_read(&self, handle: Self::Handle, offset: u64, width: AccessWidth) -> Result<u64, HandlerError>;

    /// Write `width` bytes at `offset` within the reserved range.
    fn io_write(
        &self,
        handle: Self::Handle,
        offset: u64,
        width: AccessWidth,
        value: u64,
    ) -> Result<(), HandlerError>;
}

/// PCI configuration-space access primitives backing the PCI handler.
pub trait PlatformPci {
    /// Read `width` bytes at `offset` in `address`'s configuration space.
    fn pci_read(&self, address: &PciAddress, offset: u16, width: AccessWidth) -> Result<u64, HandlerError>;

    /// Write `width` bytes at `offset` in `address`'s configuration space.
    fn pci_write(
        &self,
        address: &PciAddress,
        offset: u16,
        width: AccessWidth,
        value: u64,
    ) -> Result<(), HandlerError>;
}
