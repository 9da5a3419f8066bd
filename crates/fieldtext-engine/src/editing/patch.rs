use std::ops::Range;

/// Result of applying a command
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Patch {
    /// Physical range now occupied by inserted content; empty at the
    /// deletion point for deletes
    pub changed: Range<usize>,
    /// Physical caret position after the edit
    pub caret: usize,
    pub version: u64,
}
