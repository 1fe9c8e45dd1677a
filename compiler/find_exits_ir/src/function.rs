use crate::{BasicBlock, Inst, InstData};

/// A basic block: an ordering of instruction ids into the enclosing
/// function's arena. The last instruction is the block's terminator.
#[derive(Clone, Debug, Default)]
pub struct BasicBlockData {
    insts: Vec<Inst>,
}

impl BasicBlockData {
    pub fn insts(&self) -> &[Inst] {
        &self.insts
    }
}

/// A function body: basic blocks over a per-function instruction arena.
///
/// Instructions live in the arena and keep their [`Inst`] id for the life of
/// the function; blocks only store orderings, so [`Function::insert_before`]
/// never moves or renumbers existing instructions.
#[derive(Clone, Debug)]
pub struct Function {
    pub name: String,
    blocks: Vec<BasicBlockData>,
    insts: Vec<InstData>,
}

impl Function {
    pub fn new(name: impl Into<String>) -> Self {
        Function { name: name.into(), blocks: Vec::new(), insts: Vec::new() }
    }

    pub fn new_block(&mut self) -> BasicBlock {
        let bb = BasicBlock::new(self.blocks.len());
        self.blocks.push(BasicBlockData::default());
        bb
    }

    pub fn num_blocks(&self) -> usize {
        self.blocks.len()
    }

    pub fn num_insts(&self) -> usize {
        self.insts.len()
    }

    pub fn block_ids(&self) -> impl Iterator<Item = BasicBlock> {
        (0..self.blocks.len()).map(BasicBlock::new)
    }

    pub fn block_insts(&self, bb: BasicBlock) -> &[Inst] {
        &self.blocks[bb.index()].insts
    }

    pub fn inst(&self, inst: Inst) -> &InstData {
        &self.insts[inst.index()]
    }

    pub fn inst_mut(&mut self, inst: Inst) -> &mut InstData {
        &mut self.insts[inst.index()]
    }

    /// Append `data` to the end of `bb`.
    pub fn push_inst(&mut self, bb: BasicBlock, data: InstData) -> Inst {
        let inst = self.alloc(data);
        self.blocks[bb.index()].insts.push(inst);
        inst
    }

    /// Splice `data` into `bb` immediately before `before`.
    ///
    /// Existing instructions keep their ids and their relative order; only
    /// the new instruction is added. Panics if `before` is not in `bb`.
    pub fn insert_before(&mut self, bb: BasicBlock, before: Inst, data: InstData) -> Inst {
        let inst = self.alloc(data);
        let insts = &mut self.blocks[bb.index()].insts;
        let at = insts
            .iter()
            .position(|&i| i == before)
            .unwrap_or_else(|| panic!("{before:?} is not an instruction of {bb}"));
        insts.insert(at, inst);
        inst
    }

    /// The terminator of `bb`: its last instruction.
    ///
    /// Panics on an empty block; well-formed IR never has one.
    pub fn terminator(&self, bb: BasicBlock) -> Inst {
        *self.blocks[bb.index()]
            .insts
            .last()
            .unwrap_or_else(|| panic!("{bb} has no terminator"))
    }

    /// The successor blocks `bb`'s terminator declares.
    pub fn successors(&self, bb: BasicBlock) -> impl Iterator<Item = BasicBlock> + '_ {
        self.inst(self.terminator(bb)).kind.successors()
    }

    fn alloc(&mut self, data: InstData) -> Inst {
        let inst = Inst::new(self.insts.len());
        self.insts.push(data);
        inst
    }
}
