use core::fmt::{self, Write};

/// Choice of the operator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Selection {
    OutputCompare,
    InputCapture,
    Exit,
}

impl Selection {
    /// Translate a typed key, `None` for keys with no meaning.
    #[must_use]
    pub fn from_key(key: u8) -> Option<Self> {
        match key {
            b'1' => Some(Self::OutputCompare),
            b'2' => Some(Self::InputCapture),
            b'x' => Some(Self::Exit),
            _ => None,
        }
    }
}

pub(crate) fn print_banner<W: Write>(console: &mut W) -> fmt::Result {
    write!(console, "Start GPT diagnostics:")
}

pub(crate) fn print_options<W: Write>(console: &mut W) -> fmt::Result {
    writeln!(console)?;
    writeln!(console, "  1 - for output compare test.")?;
    writeln!(console, "  2 - for input capture test.")?;
    writeln!(console, "  x - to exit.")?;
    writeln!(console)
}
