use rustc_hash::FxHashMap;

use crate::{Decl, Func, Function, Ty};

bitflags::bitflags! {
    /// Attributes of a function declaration.
    #[derive(Clone, Copy, Debug, PartialEq, Eq)]
    pub struct FnAttrs: u8 {
        /// A call to this function does not return control to its caller.
        const NORETURN = 1 << 0;
        const NOUNWIND = 1 << 1;
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FnSig {
    pub params: Vec<Ty>,
    pub ret: Ty,
}

impl FnSig {
    pub fn new(params: Vec<Ty>, ret: Ty) -> Self {
        FnSig { params, ret }
    }
}

/// An external function declaration, owned by the enclosing [`Module`] and
/// identified by name.
#[derive(Clone, Debug)]
pub struct FnDecl {
    pub name: String,
    pub sig: FnSig,
    pub attrs: FnAttrs,
}

/// The top-level compilation unit: defined functions plus a table of
/// external declarations indexed by name.
#[derive(Clone, Debug, Default)]
pub struct Module {
    functions: Vec<Function>,
    decls: Vec<FnDecl>,
    decl_names: FxHashMap<String, Decl>,
}

impl Module {
    pub fn new() -> Self {
        Module::default()
    }

    pub fn add_function(&mut self, function: Function) -> Func {
        let func = Func::new(self.functions.len());
        self.functions.push(function);
        func
    }

    pub fn func_ids(&self) -> impl Iterator<Item = Func> {
        (0..self.functions.len()).map(Func::new)
    }

    pub fn function(&self, func: Func) -> &Function {
        &self.functions[func.index()]
    }

    pub fn function_mut(&mut self, func: Func) -> &mut Function {
        &mut self.functions[func.index()]
    }

    pub fn num_decls(&self) -> usize {
        self.decls.len()
    }

    pub fn decl(&self, decl: Decl) -> &FnDecl {
        &self.decls[decl.index()]
    }

    pub fn decls(&self) -> impl Iterator<Item = (Decl, &FnDecl)> {
        self.decls.iter().enumerate().map(|(i, d)| (Decl::new(i), d))
    }

    pub fn decl_by_name(&self, name: &str) -> Option<Decl> {
        self.decl_names.get(name).copied()
    }

    /// Look up the declaration named `name`, creating it with `sig` and
    /// `attrs` if absent.
    ///
    /// An existing declaration is reused by name alone; its signature and
    /// attributes are not checked against the requested ones. Repeated calls
    /// with the same name always return the same [`Decl`].
    pub fn get_or_insert_function(&mut self, name: &str, sig: FnSig, attrs: FnAttrs) -> Decl {
        if let Some(&decl) = self.decl_names.get(name) {
            return decl;
        }
        let decl = Decl::new(self.decls.len());
        self.decls.push(FnDecl { name: name.to_owned(), sig, attrs });
        self.decl_names.insert(name.to_owned(), decl);
        decl
    }
}
