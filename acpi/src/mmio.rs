//! The `SystemMemory` address-space backing.
//!
//! Maps a region's full physical extent at attach (see SPEC_FULL.md §9 on
//! the full-range-mapping limitation) and translates absolute addresses
//! against that mapping on every access, the same shape as
//! `slopos_mm::mmio::MmioRegion` but surfaced through the handler-dispatch
//! trait instead of inherent `read<T>`/`write<T>` methods.

use slopos_abi::addr::{PhysAddr, VirtAddr};
use slopos_lib::{klog_debug, klog_warn};

use crate::access::{read_volatile_width, write_volatile_width};
use crate::error::HandlerError;
use crate::namespace::NamespaceTree;
use crate::op::AddressSpaceHandler;
use crate::platform::PlatformMemory;
use crate::width::AccessWidth;

/// Per-region state for an MMIO operation region.
#[derive(Clone, Copy, Debug)]
pub struct MmioContext {
    phys: PhysAddr,
    virt: VirtAddr,
    size: u64,
}

/// The `SystemMemory` backing, parameterized over the platform's mapping
/// primitive so tests can substitute a fake.
pub struct MmioHandler<M> {
    platform: M,
}

impl<M: PlatformMemory> MmioHandler<M> {
    pub const fn new(platform: M) -> Self {
        Self { platform }
    }
}

impl<T: NamespaceTree, M: PlatformMemory> AddressSpaceHandler<T> for MmioHandler<M> {
    type Context = MmioContext;

    fn attach(&mut self, tree: &T, node: T::Node) -> Result<MmioContext, HandlerError> {
        let descriptor = tree
            .region_descriptor(node)
            .ok_or(HandlerError::InvalidArgument)?;
        let phys = PhysAddr::new(descriptor.offset);
        let size = descriptor.length;

        match self.platform.map(phys, size) {
            Ok(virt) => {
                klog_debug!(
                    "acpi: mmio attach phys=0x{:x} size=0x{:x} virt=0x{:x}",
                    phys.as_u64(),
                    size,
                    virt.as_u64()
                );
                Ok(MmioContext { phys, virt, size })
            }
            Err(_) => {
                klog_warn!(
                    "acpi: mmio mapping failed phys=0x{:x} size=0x{:x}",
                    phys.as_u64(),
                    size
                );
                Err(HandlerError::MappingFailed)
            }
        }
    }

    fn detach(&mut self, context: MmioContext) -> Result<(), HandlerError> {
        self.platform.unmap(context.virt, context.size);
        Ok(())
    }

    fn read(
        &mut self,
        context: &MmioContext,
        address: u64,
        _offset: u64,
        width: AccessWidth,
    ) -> Result<u64, HandlerError> {
        let ptr = translate(context, address)?;
        Ok(unsafe { read_volatile_width(ptr, width) })
    }

    fn write(
        &mut self,
        context: &MmioContext,
        address: u64,
        _offset: u64,
        width: AccessWidth,
        value: u64,
    ) -> Result<(), HandlerError> {
        let ptr = translate(context, address)?;
        unsafe { write_volatile_width(ptr, width, value) };
        Ok(())
    }
}

/// `virt + (address - phys)`, bounds-checked against the mapped extent.
fn translate(context: &MmioContext, address: u64) -> Result<u64, HandlerError> {
    let phys = context.phys.as_u64();
    if address < phys || address >= phys.saturating_add(context.size) {
        return Err(HandlerError::InvalidArgument);
    }
    Ok(context.virt.as_u64() + (address - phys))
}
