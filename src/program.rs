//! A parsed program bound to its memory, ready to run once.

use tracing::debug;

use crate::ast::Block;
use crate::core::{
    CellId, CellSnapshot, CellTree, Memory, Num, ProgramState, Result, SpherehornError,
};
use crate::parser;
use crate::runtime::IOContext;
use crate::vm::{Abort, Executor, ExecutorConfig, Status};

/// Instruction tree, memory tree and registers of one program.
#[derive(Debug, Clone)]
pub struct Program {
    root: Block,
    memory: Memory,
    memory_root: CellId,
    state: ProgramState,
    has_run: bool,
    steps: u64,
    abort: Option<Abort>,
}

impl Program {
    /// Parse source text into a runnable program.
    pub fn parse(source: &str) -> Result<Self> {
        let parsed = parser::parse(source)?;
        Self::from_parts(
            parsed.root,
            parsed.memory,
            parsed.accumulator.unwrap_or(0),
            parsed.condition.unwrap_or(false),
        )
    }

    /// Assemble a program from an already built tree.
    ///
    /// Without a memory literal the default `(0)` is used. The tape head starts
    /// on the first child of the memory root, so the root must have a positive
    /// value.
    pub fn from_parts(root: Block, memory: Option<CellTree>, acc: Num, cond: bool) -> Result<Self> {
        let tree = memory.unwrap_or_else(CellTree::default_memory);
        if tree.value() <= 0 {
            return Err(SpherehornError::EmptyMemory);
        }
        let (mut memory, memory_root) = tree.into_parts();
        let active = memory.child(memory_root)?;

        Ok(Self {
            root,
            memory,
            memory_root,
            state: ProgramState::with_registers(active, acc, cond),
            has_run: false,
            steps: 0,
            abort: None,
        })
    }

    pub fn run(&mut self, io: &mut IOContext) -> Result<Status> {
        self.run_with(io, ExecutorConfig::default())
    }

    /// Run the root block to completion.
    ///
    /// Returns `Status::Abort` on a fatal error and `Status::Exit` otherwise.
    /// A program runs at most once.
    pub fn run_with(&mut self, io: &mut IOContext, config: ExecutorConfig) -> Result<Status> {
        if self.has_run {
            return Err(SpherehornError::AlreadyRun);
        }
        self.has_run = true;

        let mut executor = Executor::with_config(config, &mut self.memory, io);
        let status = executor.run_block(&self.root, &mut self.state);
        self.steps = executor.steps();
        self.abort = executor.take_abort();

        let mut status = match status {
            Status::Abort => Status::Abort,
            _ => Status::Exit,
        };
        if let Err(err) = io.flush() {
            if self.abort.is_none() {
                self.abort = Some(Abort {
                    reason: err.into(),
                    location: Default::default(),
                });
            }
            status = Status::Abort;
        }

        let stats = io.stats();
        debug!(
            %status,
            steps = self.steps,
            bytes_read = stats.bytes_read,
            bytes_written = stats.bytes_written,
            "run finished"
        );
        Ok(status)
    }

    pub fn has_run(&self) -> bool {
        self.has_run
    }

    pub fn state(&self) -> &ProgramState {
        &self.state
    }

    pub fn memory(&self) -> &Memory {
        &self.memory
    }

    pub fn memory_root(&self) -> CellId {
        self.memory_root
    }

    /// Structural image of the whole memory tree.
    pub fn snapshot(&self) -> CellSnapshot {
        CellSnapshot::capture(&self.memory, self.memory_root)
    }

    pub fn root(&self) -> &Block {
        &self.root
    }

    /// Instructions visited by the last run.
    pub fn steps(&self) -> u64 {
        self.steps
    }

    /// Why the last run aborted.
    pub fn abort(&self) -> Option<&Abort> {
        self.abort.as_ref()
    }
}
