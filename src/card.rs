use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};
use thiserror::Error;

/// The four arithmetic operations a card can ask about. Closed set.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    strum_macros::Display,
    clap::ValueEnum,
)]
pub enum Operation {
    Addition,
    Subtraction,
    Multiplication,
    Division,
}

impl Operation {
    pub const ALL: [Operation; 4] = [
        Operation::Addition,
        Operation::Subtraction,
        Operation::Multiplication,
        Operation::Division,
    ];

    /// Display symbol used on cards. Subtraction and negative numbers use
    /// U+2212 MINUS SIGN, matching what a math textbook prints.
    pub fn symbol(&self) -> &'static str {
        match self {
            Operation::Addition => "+",
            Operation::Subtraction => "−",
            Operation::Multiplication => "×",
            Operation::Division => "÷",
        }
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum CardError {
    #[error("division by zero: {0} ÷ 0")]
    DivisionByZero(i32),
}

/// How a submitted answer relates to the card.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Correctness {
    Correct,
    Incorrect,
    /// The submitted value equals the value already stored; callers can use
    /// this to suppress duplicate feedback.
    Unchanged,
}

/// Stable identity for a card, assigned at creation. Used for lookup and
/// equality, never for ordering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CardId(u64);

static NEXT_CARD_ID: AtomicU64 = AtomicU64::new(1);

impl CardId {
    fn next() -> Self {
        CardId(NEXT_CARD_ID.fetch_add(1, Ordering::Relaxed))
    }
}

/// One arithmetic problem: two operands, an operation, and the player's
/// recorded answer (if any). The problem itself is immutable.
#[derive(Debug, Clone)]
pub struct Card {
    id: CardId,
    pub first_number: i32,
    pub second_number: i32,
    pub operation: Operation,
    pub answer: Option<i32>,
}

fn format_operand(n: i32) -> String {
    if n < 0 {
        format!("−{}", -n)
    } else {
        n.to_string()
    }
}

impl Card {
    pub fn new(first_number: i32, second_number: i32, operation: Operation) -> Self {
        Self {
            id: CardId::next(),
            first_number,
            second_number,
            operation,
            answer: None,
        }
    }

    pub fn id(&self) -> CardId {
        self.id
    }

    /// The question text, e.g. `7 × 3` or `4 − (−2)`. A negative second
    /// operand of an addition or subtraction is parenthesized so the sign is
    /// not mistaken for the operator.
    pub fn question(&self) -> String {
        let first = format_operand(self.first_number);
        let mut second = format_operand(self.second_number);
        if self.second_number < 0
            && matches!(self.operation, Operation::Addition | Operation::Subtraction)
        {
            second = format!("({second})");
        }
        format!("{} {} {}", first, self.operation.symbol(), second)
    }

    /// Division truncates toward zero (integer division). A zero denominator
    /// can only happen if the generator invariant is broken.
    pub fn correct_answer(&self) -> Result<i32, CardError> {
        match self.operation {
            Operation::Addition => Ok(self.first_number + self.second_number),
            Operation::Subtraction => Ok(self.first_number - self.second_number),
            Operation::Multiplication => Ok(self.first_number * self.second_number),
            Operation::Division => self
                .first_number
                .checked_div(self.second_number)
                .ok_or(CardError::DivisionByZero(self.first_number)),
        }
    }

    /// Record an answer and grade it. Re-submitting the stored value reports
    /// `Unchanged` and leaves the card as-is.
    pub fn submit_answer(&mut self, value: i32) -> Result<Correctness, CardError> {
        let correct = self.correct_answer()?;
        if self.answer == Some(value) {
            return Ok(Correctness::Unchanged);
        }
        self.answer = Some(value);
        if value == correct {
            Ok(Correctness::Correct)
        } else {
            Ok(Correctness::Incorrect)
        }
    }

    pub fn is_solved(&self) -> bool {
        match (self.answer, self.correct_answer()) {
            (Some(a), Ok(c)) => a == c,
            _ => false,
        }
    }
}
