//! Stack frame data structure

use crate::names::{package_name, qualify};
use serde::{Deserialize, Serialize};
use std::fmt;

/// A single activation record on the calling thread's stack
#[derive(Debug, Clone, Default, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub struct Frame {
    /// Instruction pointer (return address)
    pub ip: u64,

    /// Qualified function name, e.g. `my_app/log.Logger.info`.
    /// Empty when the address could not be symbolized.
    pub function: String,

    /// Demangled symbol path as reported by the symbolizer
    pub symbol: Option<String>,

    /// File name (if available)
    pub file: Option<String>,

    /// Line number (if available)
    pub line: Option<u32>,
}

impl Frame {
    /// Create a new unresolved frame
    pub fn new_unresolved(ip: u64) -> Self {
        Self {
            ip,
            ..Self::default()
        }
    }

    /// Create a frame from a demangled symbol path
    pub fn from_symbol(ip: u64, symbol: &str, file: Option<String>, line: Option<u32>) -> Self {
        Self {
            ip,
            function: qualify(symbol),
            symbol: Some(symbol.to_string()),
            file,
            line,
        }
    }

    /// Check if the frame has been symbolized
    pub fn is_symbolized(&self) -> bool {
        !self.function.is_empty()
    }

    /// Package the frame's function belongs to; empty if unknown
    pub fn package(&self) -> &str {
        package_name(&self.function)
    }
}

impl fmt::Display for Frame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_symbolized() {
            write!(f, "{}", self.function)?;
        } else {
            write!(f, "<unknown> {:#x}", self.ip)?;
        }
        match (&self.file, self.line) {
            (Some(file), Some(line)) => write!(f, " ({}:{})", file, line),
            (Some(file), None) => write!(f, " ({})", file),
            _ => Ok(()),
        }
    }
}
