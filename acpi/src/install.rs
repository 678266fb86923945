//! The handler installer: registers the three default backings at the
//! namespace root.

use slopos_lib::klog_info;

use crate::namespace::NamespaceTree;
use crate::op::AddressSpaceHandler;

/// One of the three address-space identifiers this core serves.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AddressSpaceId {
    SystemMemory,
    SystemIo,
    PciConfig,
}

/// One of the three default handlers, as handed to a registry for
/// installation. The registry only needs to place it; it doesn't need to
/// know which concrete platform types back it.
pub enum DefaultHandler<M, I, P> {
    Mmio(M),
    Io(I),
    Pci(P),
}

/// The upward registration sink: `install_address_space_handler(node,
/// space_id, handler)` from SPEC_FULL.md §6, owned by the namespace layer
/// and out of scope here beyond this interface.
pub trait HandlerInstaller<T: NamespaceTree> {
    type Mmio: AddressSpaceHandler<T>;
    type Io: AddressSpaceHandler<T>;
    type Pci: AddressSpaceHandler<T>;

    fn install_address_space_handler(
        &mut self,
        node: T::Node,
        space_id: AddressSpaceId,
        handler: DefaultHandler<Self::Mmio, Self::Io, Self::Pci>,
    );
}

/// Register the MMIO, port-I/O, and PCI-config backings at `tree`'s
/// namespace root, so every region beneath inherits them unless
/// overridden. No user data is associated with the registrations.
pub fn install_default_handlers<T, R>(
    tree: &T,
    registry: &mut R,
    mmio: R::Mmio,
    io: R::Io,
    pci: R::Pci,
) where
    T: NamespaceTree,
    R: HandlerInstaller<T>,
{
    let root = tree.root();
    registry.install_address_space_handler(root, AddressSpaceId::SystemMemory, DefaultHandler::Mmio(mmio));
    registry.install_address_space_handler(root, AddressSpaceId::SystemIo, DefaultHandler::Io(io));
    registry.install_address_space_handler(root, AddressSpaceId::PciConfig, DefaultHandler::Pci(pci));
    klog_info!("acpi: installed default address-space handlers at namespace root");
}
