//! Encoder command tokens.

use serde::Serialize;
use std::fmt;
use std::path::Path;

/// A single encoder argument.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(untagged)]
pub enum Arg {
    /// Flag, value or path.
    Text(String),
    /// Numeric value (pass index, thread count, channel count, ...).
    Int(i64),
}

impl Arg {
    /// Returns the text value, if this is a text token.
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(s) => Some(s),
            Self::Int(_) => None,
        }
    }

    /// Returns the integer value, if this is a numeric token.
    pub fn as_int(&self) -> Option<i64> {
        match self {
            Self::Text(_) => None,
            Self::Int(n) => Some(*n),
        }
    }
}

impl fmt::Display for Arg {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Text(s) => f.write_str(s),
            Self::Int(n) => write!(f, "{}", n),
        }
    }
}

impl From<&str> for Arg {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<String> for Arg {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<&String> for Arg {
    fn from(value: &String) -> Self {
        Self::Text(value.clone())
    }
}

impl From<&Path> for Arg {
    fn from(value: &Path) -> Self {
        Self::Text(value.to_string_lossy().to_string())
    }
}

impl From<i64> for Arg {
    fn from(value: i64) -> Self {
        Self::Int(value)
    }
}

impl From<u32> for Arg {
    fn from(value: u32) -> Self {
        Self::Int(i64::from(value))
    }
}

impl From<i32> for Arg {
    fn from(value: i32) -> Self {
        Self::Int(i64::from(value))
    }
}

impl PartialEq<&str> for Arg {
    fn eq(&self, other: &&str) -> bool {
        self.as_text() == Some(*other)
    }
}

/// One encoder invocation, as an ordered list of arguments.
///
/// Commands are plain values: every pass gets its own clone.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Command {
    args: Vec<Arg>,
}

impl Command {
    /// Creates an empty command.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends one argument.
    pub fn push(&mut self, arg: impl Into<Arg>) -> &mut Self {
        self.args.push(arg.into());
        self
    }

    /// Appends arguments in order.
    pub fn extend<I, A>(&mut self, args: I) -> &mut Self
    where
        I: IntoIterator<Item = A>,
        A: Into<Arg>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    pub fn args(&self) -> &[Arg] {
        &self.args
    }

    pub fn into_args(self) -> Vec<Arg> {
        self.args
    }

    pub fn len(&self) -> usize {
        self.args.len()
    }

    pub fn is_empty(&self) -> bool {
        self.args.is_empty()
    }

    pub fn last(&self) -> Option<&Arg> {
        self.args.last()
    }

    /// Whether a text token equal to `flag` is present.
    pub fn contains(&self, flag: &str) -> bool {
        self.args.iter().any(|a| a == &flag)
    }

    /// Position of the first text token equal to `flag`.
    pub fn position(&self, flag: &str) -> Option<usize> {
        self.args.iter().position(|a| a == &flag)
    }

    /// The token following the first occurrence of `flag`.
    pub fn value_of(&self, flag: &str) -> Option<&Arg> {
        self.position(flag).and_then(|i| self.args.get(i + 1))
    }

    /// Renders every token for handing to a process builder.
    pub fn to_strings(&self) -> Vec<String> {
        self.args.iter().map(ToString::to_string).collect()
    }
}

impl From<Vec<Arg>> for Command {
    fn from(args: Vec<Arg>) -> Self {
        Self { args }
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, arg) in self.args.iter().enumerate() {
            if i > 0 {
                f.write_str(" ")?;
            }
            write!(f, "{}", arg)?;
        }
        Ok(())
    }
}
