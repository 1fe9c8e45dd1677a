//! Function-level IR transformations and the glue that schedules them.
//!
//! A [`FunctionPass`] is invoked once per function of a module and reports
//! whether it mutated anything. [`pass_manager`] runs a pass list over every
//! function, honoring name-keyed enable/disable overrides and optionally
//! validating the module after each pass. The only transformation registered
//! today is [`FindExits`], which instruments every exit path out of a
//! function with a call to `__VERIFIER_silent_exit`.

use find_exits_ir::{Func, Module};

mod find_exits;
pub mod pass_manager;
pub mod validate;

pub use find_exits::{FindExits, SILENT_EXIT};
pub use pass_manager::{PassError, PassOptions, run_passes, should_run_pass};
pub use validate::{ValidationError, Validator};

/// A transformation applied to one function at a time.
pub trait FunctionPass {
    /// Stable name the driver uses to select this pass.
    fn name(&self) -> &'static str {
        let name = std::any::type_name::<Self>();
        name.rsplit("::").next().unwrap_or(name)
    }

    /// One-line description for the driver's pass listing.
    fn description(&self) -> &'static str;

    fn is_enabled(&self, _options: &PassOptions) -> bool {
        true
    }

    /// Transform `func` within `module`, returning whether anything changed.
    fn run_pass(&self, module: &mut Module, func: Func) -> bool;
}

/// All passes this crate registers, in their default running order.
pub fn passes() -> Vec<Box<dyn FunctionPass>> {
    vec![Box::new(FindExits)]
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Nop;

    impl FunctionPass for Nop {
        fn description(&self) -> &'static str {
            "does nothing"
        }

        fn run_pass(&self, _module: &mut Module, _func: Func) -> bool {
            false
        }
    }

    #[test]
    fn name_defaults_to_the_type_name() {
        assert_eq!(Nop.name(), "Nop");
    }

    #[test]
    fn find_exits_is_registered() {
        let registered = passes();
        assert!(registered.iter().any(|pass| pass.name() == "find-exits"));
    }
}
