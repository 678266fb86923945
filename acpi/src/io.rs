//! The `SystemIO` address-space backing.
//!
//! Unlike MMIO, port I/O has no compiler-visible volatile access of its
//! own to perform — the platform's `io_read`/`io_write` already own that
//! (mirroring `slopos_lib::io::outb`/`inb`'s inline-asm primitives). This
//! backing's job is purely translating an absolute address to a
//! range-relative offset before calling through.

use slopos_lib::klog_warn;

use crate::error::HandlerError;
use crate::namespace::NamespaceTree;
use crate::op::AddressSpaceHandler;
use crate::platform::PlatformIo;
use crate::width::AccessWidth;

/// Per-region state for a port-I/O operation region.
#[derive(Clone, Copy, Debug)]
pub struct IoContext<Handle> {
    base: u64,
    handle: Handle,
}

/// The `SystemIO` backing, parameterized over the platform's port-I/O
/// primitive so tests can substitute a fake.
pub struct IoHandler<P> {
    platform: P,
}

impl<P: PlatformIo> IoHandler<P> {
    pub const fn new(platform: P) -> Self {
        Self { platform }
    }
}

impl<T: NamespaceTree, P: PlatformIo> AddressSpaceHandler<T> for IoHandler<P> {
    type Context = IoContext<P::Handle>;

    fn attach(&mut self, tree: &T, node: T::Node) -> Result<Self::Context, HandlerError> {
        let descriptor = tree
            .region_descriptor(node)
            .ok_or(HandlerError::InvalidArgument)?;
        let base = descriptor.offset;

        match self.platform.io_map(base, descriptor.length) {
            Ok(handle) => Ok(IoContext { base, handle }),
            Err(_) => {
                klog_warn!("acpi: io mapping failed base=0x{:x} len=0x{:x}", base, descriptor.length);
                Err(HandlerError::MappingFailed)
            }
        }
    }

    fn detach(&mut self, context: Self::Context) -> Result<(), HandlerError> {
        self.platform.io_unmap(context.handle);
        Ok(())
    }

    fn read(
        &mut self,
        context: &Self::Context,
        address: u64,
        _offset: u64,
        width: AccessWidth,
    ) -> Result<u64, HandlerError> {
        let offset = address.saturating_sub(context.base);
        self.platform.io_read(context.handle, offset, width)
    }

    fn write(
        &mut self,
        context: &Self::Context,
        address: u64,
        _offset: u64,
        width: AccessWidth,
        value: u64,
    ) -> Result<(), HandlerError> {
        let offset = address.saturating_sub(context.base);
        self.platform.io_write(context.handle, offset, width, value)
    }
}
