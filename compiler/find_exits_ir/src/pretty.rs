//! Human-readable text form of a [`Module`], in an LLVM-flavored syntax.
//!
//! The output is deterministic: functions and blocks print in id order and
//! declarations in creation order, so tests can compare dumps verbatim.

use std::fmt::Write as _;

use itertools::Itertools;

use crate::{FnAttrs, FnDecl, Function, Inst, InstKind, Module, Operand, Ty};

const INDENT: &str = "  ";

pub fn write_module(module: &Module) -> String {
    let mut out = String::new();
    for (i, func) in module.func_ids().enumerate() {
        if i > 0 {
            out.push('\n');
        }
        write_function(module, module.function(func), &mut out);
    }
    for (i, (_, decl)) in module.decls().enumerate() {
        if i == 0 {
            out.push('\n');
        }
        write_decl(decl, &mut out);
    }
    out
}

pub fn write_function(module: &Module, func: &Function, out: &mut String) {
    let _ = writeln!(out, "define @{}() {{", func.name);
    for bb in func.block_ids() {
        let _ = writeln!(out, "{bb}:");
        for &inst in func.block_insts(bb) {
            let _ = writeln!(out, "{INDENT}{}", fmt_inst(module, func, inst));
        }
    }
    let _ = writeln!(out, "}}");
}

fn write_decl(decl: &FnDecl, out: &mut String) {
    let params = decl.sig.params.iter().map(|&ty| fmt_ty(ty)).format(", ");
    let mut line = format!("declare {} @{}({params})", fmt_ty(decl.sig.ret), decl.name);
    if decl.attrs.contains(FnAttrs::NORETURN) {
        line.push_str(" noreturn");
    }
    if decl.attrs.contains(FnAttrs::NOUNWIND) {
        line.push_str(" nounwind");
    }
    let _ = writeln!(out, "{line}");
}

fn fmt_inst(module: &Module, func: &Function, inst: Inst) -> String {
    match &func.inst(inst).kind {
        InstKind::Call { callee, args } => {
            let args = args.iter().map(|&arg| fmt_operand(arg)).format(", ");
            format!("call @{}({args})", module.decl(*callee).name)
        }
        InstKind::Goto { target } => format!("br label {target}"),
        InstKind::CondBr { cond, then_bb, else_bb } => {
            format!("br {}, label {then_bb}, label {else_bb}", fmt_operand(*cond))
        }
        InstKind::SwitchInt { discr, targets } => {
            let arms = targets.iter().map(|(value, bb)| format!("{value} -> {bb}")).format(", ");
            format!("switch {}, label {} [{arms}]", fmt_operand(*discr), targets.otherwise())
        }
        InstKind::Ret(None) => "ret void".to_owned(),
        InstKind::Ret(Some(value)) => format!("ret {}", fmt_operand(*value)),
        InstKind::Unreachable => "unreachable".to_owned(),
    }
}

fn fmt_operand(operand: Operand) -> String {
    match operand {
        Operand::Const(c) => format!("{} {}", fmt_ty(c.ty), c.value),
        Operand::Inst(inst) => format!("%{}", inst.index()),
    }
}

fn fmt_ty(ty: Ty) -> String {
    match ty {
        Ty::Void => "void".to_owned(),
        Ty::Int(width) => format!("i{width}"),
    }
}
