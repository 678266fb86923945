//! Wires `slopos_acpi`'s default address-space handlers onto this kernel's
//! real hardware-access primitives: HHDM-backed MMIO mapping, port I/O, and
//! Type-1 PCI configuration access.
//!
//! Kept separate from `pci::pci_config_read32` and friends, which remain
//! the concrete implementation these `Platform*` impls call through to.

use slopos_abi::addr::{PhysAddr, VirtAddr};
use slopos_acpi::{AccessWidth, HandlerError, PciAddress, PlatformIo, PlatformMemory, PlatformPci};
use slopos_lib::io;
use slopos_mm::mmio::MmioRegion;

use crate::pci;

/// [`PlatformMemory`] backed by the HHDM direct mapping.
pub struct KernelPlatformMemory;

impl PlatformMemory for KernelPlatformMemory {
    fn map(&self, phys: PhysAddr, size: u64) -> Result<VirtAddr, HandlerError> {
        MmioRegion::map(phys, size as usize)
            .map(|region| VirtAddr::new(region.virt_base()))
            .ok_or(HandlerError::MappingFailed)
    }

    fn unmap(&self, _virt: VirtAddr, _size: u64) {
        // HHDM mappings are permanent for the lifetime of the kernel; there
        // is nothing to tear down.
    }
}

/// [`PlatformIo`] backed by the legacy port-I/O primitives in `slopos_lib::io`.
pub struct KernelPlatformIo;

impl PlatformIo for KernelPlatformIo {
    /// The port base itself; port I/O needs no separate reservation step.
    type Handle = u16;

    fn io_map(&self, base: u64, _size: u64) -> Result<Self::Handle, HandlerError> {
        u16::try_from(base).map_err(|_| HandlerError::InvalidArgument)
    }

    fn io_unmap(&self, _handle: Self::Handle) {}

    fn io_read(&self, handle: Self::Handle, offset: u64, width: AccessWidth) -> Result<u64, HandlerError> {
        let port = handle.wrapping_add(offset as u16);
        let value = unsafe {
            match width {
                AccessWidth::Byte => io::inb(port) as u64,
                AccessWidth::Word => io::inw(port) as u64,
                AccessWidth::Dword | AccessWidth::Qword => return Err(HandlerError::InvalidArgument),
            }
        };
        Ok(value)
    }

    fn io_write(&self, handle: Self::Handle, offset: u64, width: AccessWidth, value: u64) -> Result<(), HandlerError> {
        let port = handle.wrapping_add(offset as u16);
        unsafe {
            match width {
                AccessWidth::Byte => io::outb(port, value as u8),
                AccessWidth::Word => io::outw(port, value as u16),
                AccessWidth::Dword | AccessWidth::Qword => return Err(HandlerError::InvalidArgument),
            }
        }
        Ok(())
    }
}

/// [`PlatformPci`] backed by `pci::pci_config_read32`/`pci_config_write32`
/// and their width-narrowed variants.
///
/// ACPI PCI-config operation regions never carry a segment other than 0 on
/// this kernel (no multi-segment host bridges are modeled yet), so a
/// nonzero segment is reported as invalid rather than silently ignored.
pub struct KernelPlatformPci;

impl PlatformPci for KernelPlatformPci {
    fn pci_read(&self, address: &PciAddress, offset: u16, width: AccessWidth) -> Result<u64, HandlerError> {
        if address.segment != 0 {
            return Err(HandlerError::InvalidArgument);
        }
        let offset = offset as u8;
        let value = match width {
            AccessWidth::Byte => pci::pci_config_read8(address.bus, address.device, address.function, offset) as u64,
            AccessWidth::Word => pci::pci_config_read16(address.bus, address.device, address.function, offset) as u64,
            AccessWidth::Dword => pci::pci_config_read32(address.bus, address.device, address.function, offset) as u64,
            AccessWidth::Qword => return Err(HandlerError::InvalidArgument),
        };
        Ok(value)
    }

    fn pci_write(&self, address: &PciAddress, offset: u16, width: AccessWidth, value: u64) -> Result<(), HandlerError> {
        if address.segment != 0 {
            return Err(HandlerError::InvalidArgument);
        }
        let offset = offset as u8;
        match width {
            AccessWidth::Byte => pci::pci_config_write8(address.bus, address.device, address.function, offset, value as u8),
            AccessWidth::Word => pci::pci_config_write16(address.bus, address.device, address.function, offset, value as u16),
            AccessWidth::Dword => pci::pci_config_write32(address.bus, address.device, address.function, offset, value as u32),
            AccessWidth::Qword => return Err(HandlerError::InvalidArgument),
        }
        Ok(())
    }
}
