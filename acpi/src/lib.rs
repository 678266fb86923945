//! Default address-space handlers for the ACPI interpreter's operation
//! regions: system memory (MMIO), system I/O ports, and PCI
//! configuration space.
//!
//! The interpreter, namespace, and object model are out of scope here —
//! this crate only implements the three built-in backings, the
//! handler-dispatch protocol they share, and the PCI topology walk that
//! resolves a region's bus address at attach time.

#![no_std]

pub mod access;
pub mod error;
pub mod install;
pub mod io;
pub mod mmio;
pub mod namespace;
pub mod op;
pub mod pci;
pub mod platform;
pub mod pnp;
pub mod width;

pub mod tests;

pub use error::HandlerError;
pub use install::{install_default_handlers, AddressSpaceId, DefaultHandler, HandlerInstaller};
pub use io::{IoContext, IoHandler};
pub use mmio::{MmioContext, MmioHandler};
pub use namespace::{NamespaceTree, ObjectType, OperationRegionDescriptor};
pub use op::{AddressSpaceHandler, RawRegionOp, RegionOp};
pub use pci::{PciContext, PciHandler};
pub use platform::{PciAddress, PlatformIo, PlatformMemory, PlatformPci};
pub use pnp::{PnpId, PnpIdList, MAX_PNP_IDS, MAX_PNP_ID_LEN};
pub use width::AccessWidth;
pub use tests::{run_acpi_handler_tests, run_acpi_handler_tests_summary};
