//! Confirmation capability used before destructive link operations.
use std::io::{self, BufRead as _, Write as _};

/// Asks the user whether a destructive action may proceed.
///
/// The link engine only consults this when not running quiet; automated
/// callers inject [`AlwaysAllow`] or [`AlwaysDeny`].
pub trait Confirm: Send + Sync + std::fmt::Debug {
    /// Return `true` if the action described by `question` may proceed.
    fn confirm(&self, question: &str) -> bool;
}

/// Prompts on the terminal and accepts only a literal `yes`.
#[derive(Debug, Default, Clone, Copy)]
pub struct ConsoleConfirm;

impl Confirm for ConsoleConfirm {
    fn confirm(&self, question: &str) -> bool {
        print!("{question} yes/[no]: ");
        if io::stdout().flush().is_err() {
            return false;
        }
        let mut answer = String::new();
        if io::stdin().lock().read_line(&mut answer).is_err() {
            return false;
        }
        is_yes(&answer)
    }
}

/// Approves every request.
#[derive(Debug, Default, Clone, Copy)]
pub struct AlwaysAllow;

impl Confirm for AlwaysAllow {
    fn confirm(&self, _question: &str) -> bool {
        true
    }
}

/// Refuses every request.
#[derive(Debug, Default, Clone, Copy)]
pub struct AlwaysDeny;

impl Confirm for AlwaysDeny {
    fn confirm(&self, _question: &str) -> bool {
        false
    }
}

/// Answers are case-insensitive and surrounding whitespace is ignored.
fn is_yes(answer: &str) -> bool {
    answer.trim().eq_ignore_ascii_case("yes")
}
