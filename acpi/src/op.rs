//! The handler-dispatch protocol: `(op, op_data) -> status`, reshaped as
//! an enum plus a trait with a default-implemented dispatcher.

use crate::error::HandlerError;
use crate::namespace::NamespaceTree;
use crate::width::AccessWidth;

/// One call into a backing's `handle()` entry point.
///
/// Carries op-specific payload directly rather than through an untyped
/// `op_data` pointer; `Attach`/`Detach` own or release a `Context`,
/// `Read`/`Write` borrow one.
pub enum RegionOp<'a, T: NamespaceTree, Context> {
    Attach {
        tree: &'a T,
        node: T::Node,
        out: &'a mut Option<Context>,
    },
    Detach {
        context: Context,
    },
    Read {
        context: &'a Context,
        address: u64,
        offset: u64,
        width: AccessWidth,
        out: &'a mut u64,
    },
    Write {
        context: &'a Context,
        address: u64,
        offset: u64,
        width: AccessWidth,
        value: u64,
    },
}

/// One address-space backing: MMIO, port-I/O, or PCI-config.
///
/// Implementors provide the four per-op routines; `handle` is the single
/// dispatch entry point the interpreter actually calls, matching on the
/// op and routing to them. Attach failures must not leave partial state
/// in `Context` reachable from `out` — `attach` returning `Err` leaves
/// `out` untouched.
pub trait AddressSpaceHandler<T: NamespaceTree> {
    type Context;

    fn attach(&mut self, tree: &T, node: T::Node) -> Result<Self::Context, HandlerError>;

    fn detach(&mut self, context: Self::Context) -> Result<(), HandlerError>;

    fn read(
        &mut self,
        context: &Self::Context,
        address: u64,
        offset: u64,
        width: AccessWidth,
    ) -> Result<u64, HandlerError>;

    fn write(
        &mut self,
        context: &Self::Context,
        address: u64,
        offset: u64,
        width: AccessWidth,
        value: u64,
    ) -> Result<(), HandlerError>;

    fn handle(&mut self, op: RegionOp<'_, T, Self::Context>) -> Result<(), HandlerError> {
        match op {
            RegionOp::Attach { tree, node, out } => {
                let context = self.attach(tree, node)?;
                *out = Some(context);
                Ok(())
            }
            RegionOp::Detach { context } => self.detach(context),
            RegionOp::Read { context, address, offset, width, out } => {
                *out = self.read(context, address, offset, width)?;
                Ok(())
            }
            RegionOp::Write { context, address, offset, width, value } => {
                self.write(context, address, offset, width, value)
            }
        }
    }
}

/// The four op codes an FFI-style caller may still pass as a raw integer,
/// preserving the original ABI's "any other value" invalid-argument
/// clause for callers that haven't been redesigned onto [`RegionOp`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RawRegionOp {
    Attach = 0,
    Detach = 1,
    Read = 2,
    Write = 3,
}

impl RawRegionOp {
    /// Decode a raw numeric op code, reporting anything outside 0..=3 as
    /// invalid rather than silently defaulting.
    pub fn from_code(code: u32) -> Result<Self, HandlerError> {
        match code {
            0 => Ok(Self::Attach),
            1 => Ok(Self::Detach),
            2 => Ok(Self::Read),
            3 => Ok(Self::Write),
            _ => Err(HandlerError::InvalidArgument),
        }
    }
}
