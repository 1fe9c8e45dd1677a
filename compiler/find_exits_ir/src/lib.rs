//! The in-memory IR surface consumed and mutated by the exit-instrumentation
//! passes.
//!
//! A [`Module`] owns a list of [`Function`]s plus a table of external
//! [`FnDecl`]s. Each function body is a list of basic blocks over a
//! per-function instruction arena: blocks hold orderings of stable [`Inst`]
//! ids, so splicing a new instruction in front of an existing one never
//! invalidates a reference to any other instruction. Every block ends in
//! exactly one terminator, and a terminator's successor list is purely
//! structural (read off the instruction, never derived from analysis).

use std::fmt;

mod function;
mod instruction;
mod module;
pub mod pretty;

pub use function::{BasicBlockData, Function};
pub use instruction::{
    ConstInt, InstData, InstKind, Operand, SourceInfo, Span, SwitchTargets, Ty,
};
pub use module::{FnAttrs, FnDecl, FnSig, Module};

macro_rules! ir_index {
    ($(#[$attr:meta])* $name:ident) => {
        $(#[$attr])*
        #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
        pub struct $name(u32);

        impl $name {
            #[inline]
            pub fn new(index: usize) -> Self {
                $name(u32::try_from(index).expect("IR index overflowed u32"))
            }

            #[inline]
            pub fn index(self) -> usize {
                self.0 as usize
            }
        }
    };
}

ir_index! {
    /// A basic block of some [`Function`].
    BasicBlock
}

ir_index! {
    /// An instruction in a [`Function`]'s arena. Stable across splices.
    Inst
}

ir_index! {
    /// A function defined in a [`Module`].
    Func
}

ir_index! {
    /// A function declaration owned by a [`Module`].
    Decl
}

impl fmt::Display for BasicBlock {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "bb{}", self.0)
    }
}
