//! The upward interface this core consumes from the ACPI namespace layer.
//!
//! The namespace, object model, and interpreter are out of scope for this
//! crate (they're a separate, much larger component); this module only
//! names the shape of what the core needs from them.

use crate::pnp::{PnpId, PnpIdList};

/// The kind of ACPI object a namespace node holds.
///
/// Only `Device` is load-bearing for the PCI topology walk; every other
/// object kind the real namespace can hold collapses to `Other`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ObjectType {
    Device,
    Other,
}

/// The `(space_id, offset, length)` fields of an operation-region
/// declaration, as consumed at attach time.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct OperationRegionDescriptor {
    /// Physical base for MMIO, port base for IO, unused for PCI-config.
    pub offset: u64,
    /// Extent of the region in bytes.
    pub length: u64,
}

/// A traversable ACPI namespace, as seen by the core.
///
/// `Node` is an opaque, `Copy` handle (an arena index in a real
/// implementation) rather than a reference, so ancestor walks can hold
/// many of them at once without borrowing the tree mutably. A `dyn`-safe
/// design isn't possible here regardless, since `parent` would need to
/// return `Self` by value.
pub trait NamespaceTree {
    type Node: Copy + Eq;

    /// The namespace root node.
    fn root(&self) -> Self::Node;

    /// The immediate parent of `node`, or `None` if `node` is the root.
    fn parent(&self, node: Self::Node) -> Option<Self::Node>;

    /// The ACPI object kind at `node`.
    fn object_type(&self, node: Self::Node) -> ObjectType;

    /// The operation-region descriptor at `node`, if it declares one.
    fn region_descriptor(&self, node: Self::Node) -> Option<OperationRegionDescriptor>;

    /// Evaluate `_HID` at `node`.
    fn eval_hid(&self, node: Self::Node) -> Option<PnpId>;

    /// Evaluate `_CID` at `node`.
    fn eval_cid(&self, node: Self::Node) -> PnpIdList;

    /// Evaluate `_ADR` at `node`.
    fn eval_adr(&self, node: Self::Node) -> Option<u64>;

    /// Evaluate `_SEG` at `node`.
    fn eval_seg(&self, node: Self::Node) -> Option<u16>;

    /// Evaluate `_BBN` at `node`.
    fn eval_bbn(&self, node: Self::Node) -> Option<u8>;
}
