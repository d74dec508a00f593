//! Source locations for the flowscript front end.
use std::fmt;

/// A position in a source file. Nodes synthesized by compiler passes carry
/// [Pos::UNKNOWN]; everything else keeps the position of the node it was
/// derived from.
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct Pos {
    pos: P,
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum P {
    Known { line: u32, column: u32 },
    Unknown,
}

impl Pos {
    pub fn new(line: u32, column: u32) -> Pos {
        Pos {
            pos: P::Known { line, column },
        }
    }

    pub const UNKNOWN: Pos = Pos { pos: P::Unknown };
}

impl Default for Pos {
    fn default() -> Pos {
        Pos { pos: P::Unknown }
    }
}

impl fmt::Debug for Pos {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // No point seeing the internal structure of a `Pos`.
        fmt::Display::fmt(self, f)
    }
}

impl fmt::Display for Pos {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.pos {
            P::Known { line, column } => write!(f, "line {}, column {}", line, column),
            P::Unknown => write!(f, "unknown position"),
        }
    }
}
