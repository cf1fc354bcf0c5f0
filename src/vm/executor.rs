//! Tree-walking executor for Spherehorn instruction trees.
//!
//! Every container reports one of four [`Status`] values. `Okay` keeps the
//! enclosing block going, `Break` stops the nearest block (which absorbs it),
//! and `Exit`/`Abort` unwind through every block to the caller untouched.

use std::fmt;

use tracing::{debug, trace};

use crate::ast::{ArithOp, Block, Container, EditOp, Instruction, IoFormat, NavOp, Op};
use crate::core::{AbortReason, CellTree, Memory, MemoryError, Num, ProgramState, SourceLocation};
use crate::runtime::IOContext;

/// Outcome of running a container.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Status {
    /// Continue with the next container.
    Okay,
    /// Leave the nearest enclosing block.
    Break,
    /// End the program gracefully.
    Exit,
    /// End the program with a fatal error.
    Abort,
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Status::Okay => write!(f, "OKAY"),
            Status::Break => write!(f, "BREAK"),
            Status::Exit => write!(f, "EXIT"),
            Status::Abort => write!(f, "ABORT"),
        }
    }
}

/// Why and where a run aborted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Abort {
    pub reason: AbortReason,
    pub location: SourceLocation,
}

impl fmt::Display for Abort {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.location.is_known() {
            write!(f, "{} ({})", self.reason, self.location)
        } else {
            write!(f, "{}", self.reason)
        }
    }
}

/// Configuration for the executor.
#[derive(Debug, Clone, Default)]
pub struct ExecutorConfig {
    /// Maximum instructions visited before the run aborts; `None` is unlimited.
    pub max_steps: Option<u64>,
}

impl ExecutorConfig {
    pub fn with_max_steps(max_steps: u64) -> Self {
        Self {
            max_steps: Some(max_steps),
        }
    }
}

/// Runs containers against one memory tree and one I/O context.
pub struct Executor<'a> {
    config: ExecutorConfig,
    memory: &'a mut Memory,
    io: &'a mut IOContext,
    steps: u64,
    abort: Option<Abort>,
}

impl<'a> Executor<'a> {
    pub fn new(memory: &'a mut Memory, io: &'a mut IOContext) -> Self {
        Self::with_config(ExecutorConfig::default(), memory, io)
    }

    pub fn with_config(config: ExecutorConfig, memory: &'a mut Memory, io: &'a mut IOContext) -> Self {
        Self {
            config,
            memory,
            io,
            steps: 0,
            abort: None,
        }
    }

    /// Instructions visited so far, including ones whose condition failed.
    pub fn steps(&self) -> u64 {
        self.steps
    }

    /// The most recent abort, if any.
    pub fn abort(&self) -> Option<&Abort> {
        self.abort.as_ref()
    }

    pub fn take_abort(&mut self) -> Option<Abort> {
        self.abort.take()
    }

    pub fn run(&mut self, container: &Container, state: &mut ProgramState) -> Status {
        match container {
            Container::Instruction(instruction) => self.run_instruction(instruction, state),
            Container::Block(block) => self.run_block(block, state),
        }
    }

    /// Loop over the block's members until one of them stops it.
    ///
    /// `Break` is absorbed here and becomes `Okay`.
    pub fn run_block(&mut self, block: &Block, state: &mut ProgramState) -> Status {
        if !block.condition().admits(state.cond) {
            return Status::Okay;
        }
        for container in block.body().iter().cycle() {
            match self.run(container, state) {
                Status::Okay => {}
                Status::Break => return Status::Okay,
                status => return status,
            }
        }
        Status::Okay
    }

    pub fn run_instruction(&mut self, instruction: &Instruction, state: &mut ProgramState) -> Status {
        self.steps += 1;
        if let Some(limit) = self.config.max_steps {
            if self.steps > limit {
                return self.fail(AbortReason::StepLimit { limit }, instruction.location);
            }
        }

        if !instruction.condition.admits(state.cond) {
            return Status::Okay;
        }

        trace!(
            op = instruction.op.name(),
            acc = state.acc,
            cond = state.cond,
            active = %state.active,
            "execute"
        );
        match self.execute(&instruction.op, state) {
            Ok(status) => status,
            Err(reason) => self.fail(reason, instruction.location),
        }
    }

    fn fail(&mut self, reason: AbortReason, location: SourceLocation) -> Status {
        debug!(%reason, %location, steps = self.steps, "abort");
        self.abort = Some(Abort { reason, location });
        Status::Abort
    }

    // ═══════════════════════════════════════════════════════════════════
    // Instruction Semantics
    // ═══════════════════════════════════════════════════════════════════

    fn execute(&mut self, op: &Op, state: &mut ProgramState) -> Result<Status, AbortReason> {
        match op {
            Op::Break => return Ok(Status::Break),
            Op::Increment => state.acc = state.acc.wrapping_add(1),
            Op::Decrement => {
                if state.acc <= 0 {
                    return Err(AbortReason::DecrementPastZero);
                }
                state.acc -= 1;
            }
            Op::Invert => state.cond = !state.cond,

            Op::SetAccumulator(arg) => state.acc = arg.get(state, self.memory),
            Op::SetCondition(arg) => state.cond = arg.get(state, self.memory) != 0,
            Op::SetValue(arg) => {
                let value = arg.get(state, self.memory);
                self.memory.set_value(state.active, value);
            }
            Op::SetMemory(tree) => self.set_memory(tree, state),

            Op::Arith(op, arg) => {
                let operand = arg.get(state, self.memory);
                state.acc = arith(*op, state.acc, operand)?;
            }
            Op::Logic(op, arg) => {
                let operand = arg.get(state, self.memory);
                state.cond = op.apply(state.cond, operand);
            }
            Op::Compare(op, arg) => {
                let operand = arg.get(state, self.memory);
                state.cond = op.holds(state.acc, operand);
            }

            Op::Navigate(nav) => return self.navigate(nav, state),
            Op::Edit(edit) => return self.edit(*edit, state),
            Op::Input(format) => self.input(*format, state)?,
            Op::Output(format) => self.output(*format, state)?,
        }
        Ok(Status::Okay)
    }

    fn set_memory(&mut self, tree: &CellTree, state: &ProgramState) {
        self.memory.copy_from(state.active, tree.memory(), tree.root());
    }

    fn navigate(&mut self, nav: &NavOp, state: &mut ProgramState) -> Result<Status, AbortReason> {
        let memory = &mut *self.memory;
        let active = state.active;
        match nav {
            NavOp::Up => {
                let Some(parent) = memory.parent(active) else {
                    return Ok(Status::Exit);
                };
                state.active = parent;
                if memory.is_top(parent) {
                    return Ok(Status::Exit);
                }
            }
            NavOp::Down => {
                let value = memory.value(active);
                if value <= 0 {
                    return Err(AbortReason::EmptyDescent { value });
                }
                state.active = memory.child(active)?;
            }
            NavOp::Prev => state.active = memory.prev(active)?,
            NavOp::Next => state.active = memory.next(active)?,
            NavOp::Back(arg) => {
                let n = arg.get(state, memory);
                state.active = memory.shift_back(active, n)?;
            }
            NavOp::Forward(arg) => {
                let n = arg.get(state, memory);
                state.active = memory.shift_forward(active, n)?;
            }
            NavOp::Restart => {
                let parent = memory
                    .parent(active)
                    .ok_or(MemoryError::Detached { cell: active })?;
                state.active = memory.child(parent)?;
            }
            NavOp::Rotate => memory.make_first(active)?,
        }
        Ok(Status::Okay)
    }

    fn edit(&mut self, edit: EditOp, state: &mut ProgramState) -> Result<Status, AbortReason> {
        let memory = &mut *self.memory;
        let active = state.active;
        state.active = match edit {
            EditOp::InsertBefore => memory.insert_before(active, 0)?,
            EditOp::InsertAfter => memory.insert_after(active, 0)?,
            EditOp::DeleteBefore => memory.delete_before(active)?,
            EditOp::DeleteAfter => memory.delete_after(active)?,
        };
        // deleting the last member of a top-level ring leaves nothing to stand on
        if memory.is_top(state.active) {
            return Ok(Status::Exit);
        }
        Ok(Status::Okay)
    }

    // ═══════════════════════════════════════════════════════════════════
    // I/O
    // ═══════════════════════════════════════════════════════════════════

    fn input(&mut self, format: IoFormat, state: &ProgramState) -> Result<(), AbortReason> {
        match format {
            IoFormat::Char => {
                let byte = self.io.read_byte()?;
                self.memory
                    .set_value(state.active, byte.map_or(0, Num::from));
            }
            IoFormat::Number => {
                let value = self.io.read_number()?;
                self.memory.set_value(state.active, value);
            }
            IoFormat::String => {
                let line = CellTree::from_bytes(&self.io.read_line()?);
                self.memory
                    .copy_from(state.active, line.memory(), line.root());
            }
        }
        Ok(())
    }

    fn output(&mut self, format: IoFormat, state: &ProgramState) -> Result<(), AbortReason> {
        let value = self.memory.value(state.active);
        match format {
            IoFormat::Char => {
                let byte =
                    u8::try_from(value).map_err(|_| AbortReason::InvalidCharacter { value })?;
                self.io.write_bytes(&[byte])?;
            }
            IoFormat::Number => self.io.write_bytes(value.to_string().as_bytes())?,
            IoFormat::String => {
                if value <= 0 {
                    return Ok(());
                }
                let mut bytes = Vec::new();
                let mut cell = self.memory.child(state.active)?;
                for i in 0..value {
                    if i > 0 {
                        cell = self.memory.next(cell)?;
                    }
                    // low byte only
                    bytes.push(self.memory.value(cell) as u8);
                }
                self.io.write_bytes(&bytes)?;
            }
        }
        Ok(())
    }
}

fn arith(op: ArithOp, acc: Num, operand: Num) -> Result<Num, AbortReason> {
    let result = match op {
        ArithOp::Add => acc.wrapping_add(operand),
        ArithOp::Mul => acc.wrapping_mul(operand),
        ArithOp::Sub => match acc.checked_sub(operand) {
            Some(diff) if diff >= 0 => diff,
            _ => {
                return Err(AbortReason::NegativeDifference {
                    minuend: acc,
                    subtrahend: operand,
                })
            }
        },
        ArithOp::RSub => match operand.checked_sub(acc) {
            Some(diff) if diff >= 0 => diff,
            _ => {
                return Err(AbortReason::NegativeDifference {
                    minuend: operand,
                    subtrahend: acc,
                })
            }
        },
        ArithOp::Div => {
            if operand == 0 {
                return Err(AbortReason::DivisionByZero { dividend: acc });
            }
            acc.wrapping_div(operand)
        }
        ArithOp::RDiv => {
            if acc == 0 {
                return Err(AbortReason::DivisionByZero { dividend: operand });
            }
            operand.wrapping_div(acc)
        }
        ArithOp::Mod => {
            if operand == 0 {
                return Err(AbortReason::ModuloByZero { dividend: acc });
            }
            acc.wrapping_rem(operand)
        }
        ArithOp::RMod => {
            if acc == 0 {
                return Err(AbortReason::ModuloByZero { dividend: operand });
            }
            operand.wrapping_rem(acc)
        }
    };
    Ok(result)
}
