//! Instruction tree for Spherehorn.
//!
//! A program is one root [`Block`]. Blocks hold an ordered, non-empty list of
//! [`Container`]s, each of which is either a single [`Instruction`] or a nested
//! block. Every container carries a [`Condition`] that gates it against the
//! condition register.

use std::fmt;

use crate::core::{CellTree, Memory, Num, ProgramState, SourceLocation, SpherehornError};

/// Execution gate tested against the condition register.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Condition {
    /// Terminator `;` (or none).
    #[default]
    Always,
    /// Terminator `?`.
    WhenTrue,
    /// Terminator `!`.
    WhenFalse,
}

impl Condition {
    /// Whether a container with this gate runs when the register holds `cond`.
    pub fn admits(self, cond: bool) -> bool {
        match self {
            Condition::Always => true,
            Condition::WhenTrue => cond,
            Condition::WhenFalse => !cond,
        }
    }

    pub fn from_terminator(ch: char) -> Option<Self> {
        match ch {
            ';' => Some(Condition::Always),
            '?' => Some(Condition::WhenTrue),
            '!' => Some(Condition::WhenFalse),
            _ => None,
        }
    }

    pub fn terminator(self) -> char {
        match self {
            Condition::Always => ';',
            Condition::WhenTrue => '?',
            Condition::WhenFalse => '!',
        }
    }
}

/// Read-only operand resolved at the moment an instruction runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Argument {
    Constant(Num),
    /// `a`
    Accumulator,
    /// `m`
    ActiveCell,
}

impl Argument {
    pub fn get(&self, state: &ProgramState, memory: &Memory) -> Num {
        match self {
            Argument::Constant(value) => *value,
            Argument::Accumulator => state.acc,
            Argument::ActiveCell => memory.value(state.active),
        }
    }
}

impl fmt::Display for Argument {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Argument::Constant(value) => write!(f, "{}", value),
            Argument::Accumulator => write!(f, "a"),
            Argument::ActiveCell => write!(f, "m"),
        }
    }
}

// ═══════════════════════════════════════════════════════════════════════════
// Operations
// ═══════════════════════════════════════════════════════════════════════════

/// Accumulator arithmetic. `R*` variants compute `operand OP accumulator`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ArithOp {
    Add,
    Sub,
    RSub,
    Mul,
    Div,
    RDiv,
    Mod,
    RMod,
}

/// Condition register combined with a truthy operand.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LogicOp {
    And,
    Or,
    Xor,
}

impl LogicOp {
    pub fn apply(self, cond: bool, operand: Num) -> bool {
        let truthy = operand != 0;
        match self {
            LogicOp::And => cond && truthy,
            LogicOp::Or => cond || truthy,
            LogicOp::Xor => cond != truthy,
        }
    }
}

/// `accumulator OP operand`, stored in the condition register.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CompareOp {
    Greater,
    Equal,
    Less,
    GreaterEq,
    LessEq,
    NotEqual,
}

impl CompareOp {
    pub fn holds(self, acc: Num, operand: Num) -> bool {
        match self {
            CompareOp::Greater => acc > operand,
            CompareOp::Equal => acc == operand,
            CompareOp::Less => acc < operand,
            CompareOp::GreaterEq => acc >= operand,
            CompareOp::LessEq => acc <= operand,
            CompareOp::NotEqual => acc != operand,
        }
    }
}

/// Tape head movement.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NavOp {
    Up,
    Down,
    Prev,
    Next,
    Back(Argument),
    Forward(Argument),
    /// Jump to the parent's ring anchor.
    Restart,
    /// Make the active cell its parent's ring anchor.
    Rotate,
}

/// Ring editing around the active cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EditOp {
    InsertBefore,
    InsertAfter,
    DeleteBefore,
    DeleteAfter,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IoFormat {
    /// One raw byte.
    Char,
    /// Decimal text.
    Number,
    /// A line in, or `value` bytes out.
    String,
}

/// Every effect an instruction can have.
#[derive(Debug, Clone)]
pub enum Op {
    Break,
    Increment,
    Decrement,
    Invert,
    SetAccumulator(Argument),
    SetCondition(Argument),
    SetValue(Argument),
    /// Overwrite the active cell with a deep copy of a literal.
    SetMemory(CellTree),
    Arith(ArithOp, Argument),
    Logic(LogicOp, Argument),
    Compare(CompareOp, Argument),
    Navigate(NavOp),
    Edit(EditOp),
    Input(IoFormat),
    Output(IoFormat),
}

impl Op {
    /// Source keyword.
    pub fn name(&self) -> &'static str {
        match self {
            Op::Break => "break",
            Op::Increment => "++",
            Op::Decrement => "--",
            Op::Invert => "not",
            Op::SetAccumulator(_) => "A",
            Op::SetCondition(_) => "C",
            Op::SetValue(_) | Op::SetMemory(_) => ".",
            Op::Arith(op, _) => match op {
                ArithOp::Add => "+",
                ArithOp::Sub => "-",
                ArithOp::RSub => "r-",
                ArithOp::Mul => "*",
                ArithOp::Div => "/",
                ArithOp::RDiv => "r/",
                ArithOp::Mod => "%",
                ArithOp::RMod => "r%",
            },
            Op::Logic(op, _) => match op {
                LogicOp::And => "and",
                LogicOp::Or => "or",
                LogicOp::Xor => "xor",
            },
            Op::Compare(op, _) => match op {
                CompareOp::Greater => ">>",
                CompareOp::Equal => "=",
                CompareOp::Less => "<<",
                CompareOp::GreaterEq => ">=",
                CompareOp::LessEq => "<=",
                CompareOp::NotEqual => "/=",
            },
            Op::Navigate(nav) => match nav {
                NavOp::Up => "^",
                NavOp::Down => "v",
                NavOp::Prev | NavOp::Back(_) => "<",
                NavOp::Next | NavOp::Forward(_) => ">",
                NavOp::Restart => "R",
                NavOp::Rotate => "rot",
            },
            Op::Edit(edit) => match edit {
                EditOp::InsertBefore => "<+",
                EditOp::InsertAfter => "+>",
                EditOp::DeleteBefore => "<-",
                EditOp::DeleteAfter => "->",
            },
            Op::Input(format) => match format {
                IoFormat::Char => "chin",
                IoFormat::Number => "numin",
                IoFormat::String => "strin",
            },
            Op::Output(format) => match format {
                IoFormat::Char => "chout",
                IoFormat::Number => "numout",
                IoFormat::String => "strout",
            },
        }
    }

    /// The operand, for instructions that take one.
    pub fn argument(&self) -> Option<Argument> {
        match self {
            Op::SetAccumulator(arg)
            | Op::SetCondition(arg)
            | Op::SetValue(arg)
            | Op::Arith(_, arg)
            | Op::Logic(_, arg)
            | Op::Compare(_, arg)
            | Op::Navigate(NavOp::Back(arg))
            | Op::Navigate(NavOp::Forward(arg)) => Some(*arg),
            _ => None,
        }
    }
}

// ═══════════════════════════════════════════════════════════════════════════
// Containers
// ═══════════════════════════════════════════════════════════════════════════

/// A single gated operation.
#[derive(Debug, Clone)]
pub struct Instruction {
    pub op: Op,
    pub condition: Condition,
    pub location: SourceLocation,
}

impl Instruction {
    pub fn new(op: Op, condition: Condition) -> Self {
        Self {
            op,
            condition,
            location: SourceLocation::default(),
        }
    }

    pub fn at(mut self, location: SourceLocation) -> Self {
        self.location = location;
        self
    }
}

impl fmt::Display for Instruction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.op.name())?;
        if let Some(arg) = self.op.argument() {
            write!(f, " {}", arg)?;
        }
        write!(f, "{}", self.condition.terminator())
    }
}

/// A gated loop over a non-empty list of containers.
#[derive(Debug, Clone)]
pub struct Block {
    condition: Condition,
    body: Vec<Container>,
    pub location: SourceLocation,
}

impl Block {
    pub fn new(condition: Condition, body: Vec<Container>) -> Result<Self, SpherehornError> {
        if body.is_empty() {
            return Err(SpherehornError::EmptyBlock);
        }
        Ok(Self {
            condition,
            body,
            location: SourceLocation::default(),
        })
    }

    pub fn at(mut self, location: SourceLocation) -> Self {
        self.location = location;
        self
    }

    pub fn condition(&self) -> Condition {
        self.condition
    }

    pub fn body(&self) -> &[Container] {
        &self.body
    }

    pub fn len(&self) -> usize {
        self.body.len()
    }

    /// Never true for a constructed block.
    pub fn is_empty(&self) -> bool {
        self.body.is_empty()
    }
}

/// A node of the instruction tree.
#[derive(Debug, Clone)]
pub enum Container {
    Instruction(Instruction),
    Block(Block),
}

impl Container {
    pub fn condition(&self) -> Condition {
        match self {
            Container::Instruction(instr) => instr.condition,
            Container::Block(block) => block.condition,
        }
    }
}

impl From<Instruction> for Container {
    fn from(instr: Instruction) -> Self {
        Container::Instruction(instr)
    }
}

impl From<Block> for Container {
    fn from(block: Block) -> Self {
        Container::Block(block)
    }
}
