//! Instrument every exit path out of a function.
//!
//! A basic block whose terminator declares no successors is the last thing
//! that runs before control leaves the function, whether through `ret` or
//! `unreachable`. This pass splices a `call @__VERIFIER_silent_exit(i32 0)`
//! immediately before each such terminator, so a downstream verification
//! tool observes every program exit. The callee is declared once per module,
//! `(i32) -> void` and never-returning, and reused by name on every later
//! insertion.

use find_exits_ir::{
    BasicBlock, ConstInt, Decl, FnAttrs, FnSig, Func, Function, InstData, InstKind, Module,
    Operand, Ty,
};
use tracing::debug;

use crate::{FunctionPass, PassOptions};

/// Name of the instrumentation hook inserted before every exit.
pub const SILENT_EXIT: &str = "__VERIFIER_silent_exit";

pub struct FindExits;

impl FunctionPass for FindExits {
    fn name(&self) -> &'static str {
        "find-exits"
    }

    fn description(&self) -> &'static str {
        "Put calls to __VERIFIER_silent_exit into bitcode before any exit from the program."
    }

    fn is_enabled(&self, _options: &PassOptions) -> bool {
        true
    }

    fn run_pass(&self, module: &mut Module, func: Func) -> bool {
        // Classification is purely structural and mutating one block never
        // changes another block's successor list, so collect the terminal
        // blocks up front.
        let terminal: Vec<BasicBlock> = {
            let func = module.function(func);
            func.block_ids().filter(|&bb| func.successors(bb).next().is_none()).collect()
        };
        if terminal.is_empty() {
            return false;
        }

        // Lazy: a module whose functions have no terminal blocks never gains
        // the declaration.
        let exit = module.get_or_insert_function(
            SILENT_EXIT,
            FnSig::new(vec![Ty::I32], Ty::Void),
            FnAttrs::NORETURN,
        );

        let func = module.function_mut(func);
        let mut modified = false;
        for bb in terminal {
            if already_instrumented(func, bb, exit) {
                continue;
            }
            let terminator = func.terminator(bb);
            // The new call inherits the terminator's debug metadata, so the
            // exit is reported at the location control actually leaves from.
            let source_info = func.inst(terminator).source_info;
            let call = InstData::new(
                InstKind::Call { callee: exit, args: vec![Operand::Const(ConstInt::i32(0))] },
                source_info,
            );
            func.insert_before(bb, terminator, call);
            debug!(function = %func.name, block = %bb, "inserted silent-exit call");
            modified = true;
        }
        modified
    }
}

/// Whether `bb` already ends in `[call exit, terminator]`. Keeps the pass
/// idempotent: re-running it never stacks a second call.
fn already_instrumented(func: &Function, bb: BasicBlock, exit: Decl) -> bool {
    let insts = func.block_insts(bb);
    let [.., prev, _terminator] = insts else {
        return false;
    };
    matches!(&func.inst(*prev).kind, InstKind::Call { callee, .. } if *callee == exit)
}
