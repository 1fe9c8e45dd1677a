//! Structural well-formedness checks for a module.
//!
//! Violations are reported as values rather than panics so the pass manager
//! can turn them into a fatal error with context about which pass broke the
//! IR. The checks mirror the invariants the transformations rely on: every
//! block ends in exactly one terminator, every branch target exists, every
//! call names a declaration of the module, and every instruction id belongs
//! to exactly one block of its function's arena.

use std::fmt;

use find_exits_ir::{BasicBlock, Function, Inst, InstKind, Module};
use rustc_hash::FxHashSet;

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ValidationError {
    MissingTerminator { func: String, block: BasicBlock },
    MisplacedTerminator { func: String, block: BasicBlock, inst: Inst },
    TargetOutOfRange { func: String, block: BasicBlock, target: BasicBlock },
    InstOutOfRange { func: String, block: BasicBlock, inst: Inst },
    ReusedInst { func: String, block: BasicBlock, inst: Inst },
    UnknownCallee { func: String, block: BasicBlock, inst: Inst },
    CalleeArityMismatch { func: String, callee: String, expected: usize, found: usize },
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValidationError::MissingTerminator { func, block } => {
                write!(f, "{block} in `{func}` does not end in a terminator")
            }
            ValidationError::MisplacedTerminator { func, block, inst } => {
                write!(f, "terminator {inst:?} is not the last instruction of {block} in `{func}`")
            }
            ValidationError::TargetOutOfRange { func, block, target } => {
                write!(f, "{block} in `{func}` branches to nonexistent {target}")
            }
            ValidationError::InstOutOfRange { func, block, inst } => {
                write!(f, "{block} in `{func}` references {inst:?} outside the arena")
            }
            ValidationError::ReusedInst { func, block, inst } => {
                write!(f, "{inst:?} appears in more than one block, including {block} in `{func}`")
            }
            ValidationError::UnknownCallee { func, block, inst } => {
                write!(f, "call {inst:?} in {block} of `{func}` targets an undeclared function")
            }
            ValidationError::CalleeArityMismatch { func, callee, expected, found } => {
                write!(
                    f,
                    "call to `{callee}` in `{func}` passes {found} arguments, declaration takes {expected}"
                )
            }
        }
    }
}

impl std::error::Error for ValidationError {}

/// Checks a whole module; `when` labels the findings with the point in the
/// pipeline the check ran at.
pub struct Validator {
    pub when: String,
}

impl Validator {
    pub fn new(when: impl Into<String>) -> Self {
        Validator { when: when.into() }
    }

    pub fn run(&self, module: &Module) -> Result<(), Vec<ValidationError>> {
        let mut errors = Vec::new();
        for func in module.func_ids() {
            check_function(module, module.function(func), &mut errors);
        }
        if errors.is_empty() { Ok(()) } else { Err(errors) }
    }
}

fn check_function(module: &Module, func: &Function, errors: &mut Vec<ValidationError>) {
    let mut seen: FxHashSet<Inst> = FxHashSet::default();

    for bb in func.block_ids() {
        let insts = func.block_insts(bb);
        if insts.is_empty() {
            errors.push(ValidationError::MissingTerminator { func: func.name.clone(), block: bb });
            continue;
        }

        for (position, &inst) in insts.iter().enumerate() {
            if inst.index() >= func.num_insts() {
                errors.push(ValidationError::InstOutOfRange {
                    func: func.name.clone(),
                    block: bb,
                    inst,
                });
                continue;
            }
            if !seen.insert(inst) {
                errors.push(ValidationError::ReusedInst {
                    func: func.name.clone(),
                    block: bb,
                    inst,
                });
            }

            let kind = &func.inst(inst).kind;
            let is_last = position + 1 == insts.len();
            match (kind.is_terminator(), is_last) {
                (true, false) => errors.push(ValidationError::MisplacedTerminator {
                    func: func.name.clone(),
                    block: bb,
                    inst,
                }),
                (false, true) => errors.push(ValidationError::MissingTerminator {
                    func: func.name.clone(),
                    block: bb,
                }),
                _ => {}
            }

            for target in kind.successors() {
                if target.index() >= func.num_blocks() {
                    errors.push(ValidationError::TargetOutOfRange {
                        func: func.name.clone(),
                        block: bb,
                        target,
                    });
                }
            }

            if let InstKind::Call { callee, args } = kind {
                if callee.index() >= module.num_decls() {
                    errors.push(ValidationError::UnknownCallee {
                        func: func.name.clone(),
                        block: bb,
                        inst,
                    });
                } else {
                    let decl = module.decl(*callee);
                    if decl.sig.params.len() != args.len() {
                        errors.push(ValidationError::CalleeArityMismatch {
                            func: func.name.clone(),
                            callee: decl.name.clone(),
                            expected: decl.sig.params.len(),
                            found: args.len(),
                        });
                    }
                }
            }
        }
    }
}
