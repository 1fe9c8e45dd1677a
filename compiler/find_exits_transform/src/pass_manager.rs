//! Drives a list of [`FunctionPass`]es over every function of a module.

use std::fmt;

use find_exits_ir::Module;
use tracing::trace;

use crate::{FunctionPass, ValidationError, Validator};

/// Driver-level configuration for a pass pipeline.
#[derive(Clone, Debug, Default)]
pub struct PassOptions {
    /// Name-keyed overrides: `(name, true)` forces a pass on, `(name, false)`
    /// forces it off. The last matching entry wins.
    pub enable_passes: Vec<(String, bool)>,
    /// Validate the module after each pass, aborting the pipeline on the
    /// first ill-formed result.
    pub validate_each: bool,
}

#[derive(Debug)]
pub enum PassError {
    /// A pass left the module structurally ill-formed. Fatal; the module may
    /// be partially transformed.
    Validation { when: String, errors: Vec<ValidationError> },
}

impl fmt::Display for PassError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PassError::Validation { when, errors } => {
                writeln!(f, "broken IR {when}:")?;
                for error in errors {
                    writeln!(f, "  {error}")?;
                }
                Ok(())
            }
        }
    }
}

impl std::error::Error for PassError {}

pub fn should_run_pass(pass: &dyn FunctionPass, options: &PassOptions) -> bool {
    let name = pass.name();

    let overridden =
        options.enable_passes.iter().rev().find(|(s, _)| s == name).map(|(_name, polarity)| {
            trace!(
                pass = %name,
                "{} as requested by override",
                if *polarity { "running" } else { "not running" },
            );
            *polarity
        });
    overridden.unwrap_or_else(|| pass.is_enabled(options))
}

/// Runs `passes` in order, each over every function of `module`. Returns
/// whether any pass modified any function.
pub fn run_passes(
    module: &mut Module,
    passes: &[&dyn FunctionPass],
    options: &PassOptions,
) -> Result<bool, PassError> {
    let mut modified = false;

    for &pass in passes {
        if !should_run_pass(pass, options) {
            continue;
        }
        let name = pass.name();

        let mut pass_modified = false;
        let funcs: Vec<_> = module.func_ids().collect();
        for func in funcs {
            pass_modified |= pass.run_pass(module, func);
        }
        trace!(pass = %name, modified = pass_modified, "pass finished");
        modified |= pass_modified;

        if options.validate_each {
            validate_module(module, format!("after pass {name}"))?;
        }
    }

    Ok(modified)
}

pub fn validate_module(module: &Module, when: String) -> Result<(), PassError> {
    let validator = Validator::new(when);
    validator.run(module).map_err(|errors| PassError::Validation { when: validator.when, errors })
}

#[cfg(test)]
mod tests {
    use find_exits_ir::{Func, Function, InstData, InstKind, SourceInfo, Span};

    use super::*;

    struct PushUnreachable;

    impl FunctionPass for PushUnreachable {
        fn description(&self) -> &'static str {
            "appends an unreachable terminator to every block"
        }

        fn run_pass(&self, module: &mut Module, func: Func) -> bool {
            let func = module.function_mut(func);
            let data = InstData::new(InstKind::Unreachable, SourceInfo::outermost(Span::DUMMY));
            for bb in func.block_ids().collect::<Vec<_>>() {
                func.push_inst(bb, data.clone());
            }
            true
        }
    }

    fn one_block_module() -> Module {
        let mut module = Module::new();
        let mut func = Function::new("f");
        let bb0 = func.new_block();
        func.push_inst(bb0, InstData::new(InstKind::Ret(None), SourceInfo::outermost(Span::DUMMY)));
        module.add_function(func);
        module
    }

    #[test]
    fn override_disables_a_pass() {
        let options = PassOptions {
            enable_passes: vec![("PushUnreachable".to_owned(), false)],
            ..PassOptions::default()
        };
        assert!(!should_run_pass(&PushUnreachable, &options));
        assert!(should_run_pass(&PushUnreachable, &PassOptions::default()));
    }

    #[test]
    fn last_matching_override_wins() {
        let options = PassOptions {
            enable_passes: vec![
                ("PushUnreachable".to_owned(), false),
                ("PushUnreachable".to_owned(), true),
            ],
            ..PassOptions::default()
        };
        assert!(should_run_pass(&PushUnreachable, &options));
    }

    #[test]
    fn disabled_pass_leaves_the_module_alone() {
        let mut module = one_block_module();
        let options = PassOptions {
            enable_passes: vec![("PushUnreachable".to_owned(), false)],
            validate_each: true,
        };
        let modified = run_passes(&mut module, &[&PushUnreachable], &options).unwrap();
        assert!(!modified);
    }

    #[test]
    fn validation_failure_is_fatal() {
        // PushUnreachable appends a second terminator, which validate_each
        // must catch right after the pass runs.
        let mut module = one_block_module();
        let options = PassOptions { enable_passes: vec![], validate_each: true };
        let err = run_passes(&mut module, &[&PushUnreachable], &options).unwrap_err();
        let PassError::Validation { when, errors } = err;
        assert_eq!(when, "after pass PushUnreachable");
        assert!(!errors.is_empty());
    }
}
