//! Keyword lookup for instruction parsing.
//!
//! An instruction followed by an argument token is looked up in the unary
//! table, otherwise in the nullary table. `<` and `>` appear in both: bare they
//! step one cell, with an argument they shift.

use crate::ast::{Argument, ArithOp, CompareOp, EditOp, IoFormat, LogicOp, NavOp, Op};

/// Keywords that take no argument.
pub const NULLARY: &[&str] = &[
    "break", "++", "--", "not", "chin", "numin", "strin", "chout", "numout", "strout", "^", "v",
    "<", ">", "R", "rot", "<+", "+>", "<-", "->",
];

/// Keywords that take one argument.
pub const UNARY: &[&str] = &[
    "A", "C", "+", "-", "r-", "*", "/", "r/", "%", "r%", "and", "or", "xor", ">>", "=", "<<", ">=",
    "<=", "/=", "<", ">",
];

pub fn nullary(keyword: &str) -> Option<Op> {
    let op = match keyword {
        "break" => Op::Break,
        "++" => Op::Increment,
        "--" => Op::Decrement,
        "not" => Op::Invert,
        "chin" => Op::Input(IoFormat::Char),
        "numin" => Op::Input(IoFormat::Number),
        "strin" => Op::Input(IoFormat::String),
        "chout" => Op::Output(IoFormat::Char),
        "numout" => Op::Output(IoFormat::Number),
        "strout" => Op::Output(IoFormat::String),
        "^" => Op::Navigate(NavOp::Up),
        "v" => Op::Navigate(NavOp::Down),
        "<" => Op::Navigate(NavOp::Prev),
        ">" => Op::Navigate(NavOp::Next),
        "R" => Op::Navigate(NavOp::Restart),
        "rot" => Op::Navigate(NavOp::Rotate),
        "<+" => Op::Edit(EditOp::InsertBefore),
        "+>" => Op::Edit(EditOp::InsertAfter),
        "<-" => Op::Edit(EditOp::DeleteBefore),
        "->" => Op::Edit(EditOp::DeleteAfter),
        _ => return None,
    };
    Some(op)
}

pub fn unary(keyword: &str, arg: Argument) -> Option<Op> {
    let op = match keyword {
        "A" => Op::SetAccumulator(arg),
        "C" => Op::SetCondition(arg),
        "+" => Op::Arith(ArithOp::Add, arg),
        "-" => Op::Arith(ArithOp::Sub, arg),
        "r-" => Op::Arith(ArithOp::RSub, arg),
        "*" => Op::Arith(ArithOp::Mul, arg),
        "/" => Op::Arith(ArithOp::Div, arg),
        "r/" => Op::Arith(ArithOp::RDiv, arg),
        "%" => Op::Arith(ArithOp::Mod, arg),
        "r%" => Op::Arith(ArithOp::RMod, arg),
        "and" => Op::Logic(LogicOp::And, arg),
        "or" => Op::Logic(LogicOp::Or, arg),
        "xor" => Op::Logic(LogicOp::Xor, arg),
        ">>" => Op::Compare(CompareOp::Greater, arg),
        "=" => Op::Compare(CompareOp::Equal, arg),
        "<<" => Op::Compare(CompareOp::Less, arg),
        ">=" => Op::Compare(CompareOp::GreaterEq, arg),
        "<=" => Op::Compare(CompareOp::LessEq, arg),
        "/=" => Op::Compare(CompareOp::NotEqual, arg),
        "<" => Op::Navigate(NavOp::Back(arg)),
        ">" => Op::Navigate(NavOp::Forward(arg)),
        _ => return None,
    };
    Some(op)
}

/// Suggest a known word keyword for a likely typo.
///
/// Only alphabetic keywords are considered; the symbolic ones are too short
/// for a near-miss to mean anything.
pub fn suggest(unknown: &str) -> Option<&'static str> {
    let words = NULLARY
        .iter()
        .chain(UNARY.iter())
        .copied()
        .filter(|k| k.len() > 1 && k.chars().all(|c| c.is_ascii_alphabetic()));

    let mut best = None;
    for keyword in words {
        if keyword.eq_ignore_ascii_case(unknown) {
            return Some(keyword);
        }
        if best.is_none() && differs_by_one(unknown, keyword) {
            best = Some(keyword);
        }
    }
    best
}

/// One substitution, insertion or deletion apart.
fn differs_by_one(a: &str, b: &str) -> bool {
    let (a, b): (Vec<char>, Vec<char>) = (a.chars().collect(), b.chars().collect());
    let (short, long) = if a.len() <= b.len() { (&a, &b) } else { (&b, &a) };
    match long.len() - short.len() {
        0 => short.iter().zip(long.iter()).filter(|(x, y)| x != y).count() == 1,
        1 => (0..long.len()).any(|skip| {
            long.iter()
                .enumerate()
                .filter(|(i, _)| *i != skip)
                .map(|(_, c)| c)
                .eq(short.iter())
        }),
        _ => false,
    }
}
