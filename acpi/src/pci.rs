//! The `PciConfig` address-space backing and the namespace walk that
//! resolves a region's `(segment, bus, device, function)` tuple.
//!
//! The walk is the bulk of this crate: two independent ancestor searches
//! (PCI root bridge, controlling device) anchored at different nodes, per
//! SPEC_FULL.md §4.4 and §9 ("Ownership of resolved device vs. PCI
//! root"). Both searches are bounded iterators over `parent()`, not
//! recursion, matching the walk style used for ancestor/component lookup
//! elsewhere in the workspace (e.g. `slopos_fs::vfs::path::resolve_path`).

use slopos_lib::{klog_info, klog_warn};

use crate::error::HandlerError;
use crate::namespace::{NamespaceTree, ObjectType};
use crate::op::AddressSpaceHandler;
use crate::platform::{PciAddress, PlatformPci};
use crate::width::AccessWidth;

/// Upper bound on ancestor-walk depth. No real ACPI namespace nests this
/// deep; this only guards against a malformed or cyclic mock tree.
const MAX_WALK_DEPTH: usize = 64;

/// Well-known `_HID`/`_CID` values identifying a PCI root bridge.
const PCI_ROOT_HIDS: [&str; 2] = ["PNP0A03", "PNP0A08"];

fn is_pci_root_id(id: &str) -> bool {
    PCI_ROOT_HIDS.iter().any(|candidate| *candidate == id)
}

/// Per-region state for a PCI-config operation region: just the resolved
/// address, since resolution happens once at attach and nothing further
/// needs to be owned or released.
pub type PciContext = PciAddress;

/// Step 1: ascend from `region_node` looking for a `_HID`/`_CID` match
/// against a known PCI-root-bridge identifier. Falls back to
/// `region_node` itself if none is found before the namespace root.
fn find_pci_root<T: NamespaceTree>(tree: &T, region_node: T::Node) -> T::Node {
    let mut current = region_node;
    for _ in 0..MAX_WALK_DEPTH {
        let Some(parent) = tree.parent(current) else {
            break;
        };

        if let Some(hid) = tree.eval_hid(parent) {
            if is_pci_root_id(hid.as_str()) {
                return parent;
            }
        }
        if tree.eval_cid(parent).iter().any(|id| is_pci_root_id(id.as_str())) {
            return parent;
        }

        current = parent;
    }

    klog_warn!("acpi: pci root not found, falling back to region node");
    region_node
}

/// Step 2: ascend from `region_node` looking for the nearest `Device`
/// ancestor. Fails with `NotFound` if the namespace root is reached
/// first.
fn find_controlling_device<T: NamespaceTree>(
    tree: &T,
    region_node: T::Node,
) -> Result<T::Node, HandlerError> {
    let mut current = region_node;
    for _ in 0..MAX_WALK_DEPTH {
        let Some(parent) = tree.parent(current) else {
            break;
        };
        if tree.object_type(parent) == ObjectType::Device {
            return Ok(parent);
        }
        current = parent;
    }

    klog_warn!("acpi: no controlling device found for pci region");
    Err(HandlerError::NotFound)
}

/// Steps 3-4: evaluate `_ADR` on the controlling device and `_SEG`/`_BBN`
/// on the PCI root to produce the full address tuple.
fn resolve_pci_address<T: NamespaceTree>(
    tree: &T,
    region_node: T::Node,
) -> Result<PciAddress, HandlerError> {
    let root = find_pci_root(tree, region_node);
    let device_node = find_controlling_device(tree, region_node)?;

    let (device, function) = match tree.eval_adr(device_node) {
        Some(adr) => (((adr >> 16) & 0xFF) as u8, (adr & 0xFF) as u8),
        None => (0, 0),
    };
    let segment = tree.eval_seg(root).unwrap_or(0);
    let bus = tree.eval_bbn(root).unwrap_or(0);

    klog_info!(
        "acpi: pci resolved seg={} bus=0x{:x} dev=0x{:x} func={}",
        segment,
        bus,
        device,
        function
    );

    Ok(PciAddress { segment, bus, device, function })
}

/// The `PciConfig` backing, parameterized over the platform's
/// configuration-space access primitive so tests can substitute a fake.
pub struct PciHandler<P> {
    platform: P,
}

impl<P: PlatformPci> PciHandler<P> {
    pub const fn new(platform: P) -> Self {
        Self { platform }
    }
}

impl<T: NamespaceTree, P: PlatformPci> AddressSpaceHandler<T> for PciHandler<P> {
    type Context = PciContext;

    fn attach(&mut self, tree: &T, node: T::Node) -> Result<PciContext, HandlerError> {
        resolve_pci_address(tree, node)
    }

    fn detach(&mut self, _context: PciContext) -> Result<(), HandlerError> {
        Ok(())
    }

    fn read(
        &mut self,
        context: &PciContext,
        _address: u64,
        offset: u64,
        width: AccessWidth,
    ) -> Result<u64, HandlerError> {
        self.platform.pci_read(context, offset as u16, width)
    }

    fn write(
        &mut self,
        context: &PciContext,
        _address: u64,
        offset: u64,
        width: AccessWidth,
        value: u64,
    ) -> Result<(), HandlerError> {
        self.platform.pci_write(context, offset as u16, width, value)
    }
}
