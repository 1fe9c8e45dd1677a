use std::iter;

use either::Either;
use smallvec::SmallVec;

use crate::{BasicBlock, Decl, Inst};

/// A source region, measured in bytes of the original input.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Span {
    pub lo: u32,
    pub hi: u32,
}

impl Span {
    pub const DUMMY: Span = Span { lo: 0, hi: 0 };

    pub fn new(lo: u32, hi: u32) -> Self {
        Span { lo, hi }
    }
}

/// Debug metadata attached to every instruction.
///
/// `Copy`, so cloning the metadata of one instruction onto another is a plain
/// field copy; the instrumentation passes rely on this when they attach a new
/// instruction to an existing terminator's location.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct SourceInfo {
    pub span: Span,
    /// Lexical scope; 0 is the whole function.
    pub scope: u32,
}

impl SourceInfo {
    /// Metadata pointing at `span` in the outermost scope.
    pub fn outermost(span: Span) -> Self {
        SourceInfo { span, scope: 0 }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Ty {
    Void,
    /// An integer of the given bit width.
    Int(u32),
}

impl Ty {
    pub const I1: Ty = Ty::Int(1);
    pub const I32: Ty = Ty::Int(32);
}

/// An integer constant, stored as raw bits.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ConstInt {
    pub ty: Ty,
    pub value: u64,
}

impl ConstInt {
    pub fn new(ty: Ty, value: u64) -> Self {
        ConstInt { ty, value }
    }

    pub fn i32(value: u32) -> Self {
        ConstInt { ty: Ty::I32, value: u64::from(value) }
    }

    pub fn bool(value: bool) -> Self {
        ConstInt { ty: Ty::I1, value: u64::from(value) }
    }
}

/// An argument or condition: either a constant or the value produced by
/// another instruction.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Operand {
    Const(ConstInt),
    Inst(Inst),
}

/// Branch table of a `SwitchInt` terminator.
///
/// `targets` has one more entry than `values`: the final entry is the
/// `otherwise` block taken when no value matches.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SwitchTargets {
    values: SmallVec<[u64; 4]>,
    targets: SmallVec<[BasicBlock; 4]>,
}

impl SwitchTargets {
    pub fn new(branches: impl Iterator<Item = (u64, BasicBlock)>, otherwise: BasicBlock) -> Self {
        let (values, mut targets): (SmallVec<_>, SmallVec<_>) = branches.unzip();
        targets.push(otherwise);
        SwitchTargets { values, targets }
    }

    pub fn otherwise(&self) -> BasicBlock {
        *self.targets.last().unwrap()
    }

    /// All targets, with the `otherwise` block last.
    pub fn all_targets(&self) -> &[BasicBlock] {
        &self.targets
    }

    pub fn iter(&self) -> impl Iterator<Item = (u64, BasicBlock)> + '_ {
        self.values.iter().copied().zip(self.targets.iter().copied())
    }
}

/// An instruction: either a mid-block operation or a terminator.
///
/// Exactly the last instruction of every basic block is a terminator, and
/// only terminators carry successor targets.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum InstKind {
    /// Call `callee` with `args`. Mid-block; control continues to the next
    /// instruction even when the callee is attributed never-returning.
    Call { callee: Decl, args: Vec<Operand> },

    /// Unconditional branch.
    Goto { target: BasicBlock },

    /// Two-way branch on a boolean condition.
    CondBr { cond: Operand, then_bb: BasicBlock, else_bb: BasicBlock },

    /// Multi-way branch on an integer discriminant.
    SwitchInt { discr: Operand, targets: SwitchTargets },

    /// Return from the function.
    Ret(Option<Operand>),

    /// End of a path the program can never reach.
    Unreachable,
}

impl InstKind {
    pub fn is_terminator(&self) -> bool {
        match self {
            InstKind::Call { .. } => false,
            InstKind::Goto { .. }
            | InstKind::CondBr { .. }
            | InstKind::SwitchInt { .. }
            | InstKind::Ret(_)
            | InstKind::Unreachable => true,
        }
    }

    /// The successor blocks this instruction declares, in branch order.
    ///
    /// Purely structural: a target is reported even if it is dead code, and
    /// `Ret`/`Unreachable` report none regardless of reachability.
    pub fn successors(&self) -> impl Iterator<Item = BasicBlock> + '_ {
        match self {
            InstKind::Goto { target } => Either::Left(Either::Left(iter::once(*target))),
            InstKind::CondBr { then_bb, else_bb, .. } => {
                Either::Left(Either::Right([*then_bb, *else_bb].into_iter()))
            }
            InstKind::SwitchInt { targets, .. } => {
                Either::Right(Either::Left(targets.all_targets().iter().copied()))
            }
            InstKind::Call { .. } | InstKind::Ret(_) | InstKind::Unreachable => {
                Either::Right(Either::Right(iter::empty()))
            }
        }
    }
}

/// An instruction together with its debug metadata.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct InstData {
    pub kind: InstKind,
    pub source_info: SourceInfo,
}

impl InstData {
    pub fn new(kind: InstKind, source_info: SourceInfo) -> Self {
        InstData { kind, source_info }
    }
}

#[cfg(test)]
mod tests {
    use test_case::test_case;

    use super::*;

    fn bb(index: usize) -> BasicBlock {
        BasicBlock::new(index)
    }

    #[test_case(InstKind::Ret(None) => Vec::<usize>::new(); "ret void")]
    #[test_case(InstKind::Ret(Some(Operand::Const(ConstInt::i32(5)))) => Vec::<usize>::new(); "ret value")]
    #[test_case(InstKind::Unreachable => Vec::<usize>::new(); "unreachable")]
    #[test_case(InstKind::Goto { target: bb(3) } => vec![3]; "goto")]
    #[test_case(
        InstKind::CondBr { cond: Operand::Const(ConstInt::bool(true)), then_bb: bb(1), else_bb: bb(2) }
        => vec![1, 2];
        "cond br"
    )]
    fn successors(kind: InstKind) -> Vec<usize> {
        kind.successors().map(BasicBlock::index).collect()
    }

    #[test]
    fn switch_targets_keep_otherwise_last() {
        let targets = SwitchTargets::new([(0, bb(1)), (7, bb(2))].into_iter(), bb(3));
        assert_eq!(targets.otherwise(), bb(3));
        assert_eq!(targets.all_targets(), &[bb(1), bb(2), bb(3)]);
        assert_eq!(targets.iter().collect::<Vec<_>>(), vec![(0, bb(1)), (7, bb(2))]);

        let kind = InstKind::SwitchInt {
            discr: Operand::Const(ConstInt::i32(0)),
            targets,
        };
        assert!(kind.is_terminator());
        assert_eq!(kind.successors().count(), 3);
    }

    #[test]
    fn call_is_not_a_terminator() {
        let kind = InstKind::Call { callee: Decl::new(0), args: vec![] };
        assert!(!kind.is_terminator());
        assert_eq!(kind.successors().count(), 0);
    }
}
