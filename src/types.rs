use std::fmt::{self, Display};

/// A collector for non-fatal findings produced while converting script text
/// into domain records. The extractors are deliberately permissive: an
/// unresolved variable, a skipped malformed record or an unparsable file is
/// worth reporting, but never worth aborting the whole conversion over.
/// An instance is threaded through each extraction call and inspected by the
/// caller afterwards; there is no process-wide side channel.
#[derive(Debug, Default)]
pub struct Diagnostics {
    warnings: Vec<String>,
}

impl Diagnostics {
    /// Record a warning.
    pub fn warn<S: Into<String>>(&mut self, message: S) {
        self.warnings.push(message.into());
    }

    /// The number of recorded warnings.
    pub fn len(&self) -> usize {
        self.warnings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.warnings.is_empty()
    }

    /// Iterate over the recorded warnings in the order they were raised.
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.warnings.iter().map(|s| s.as_str())
    }

    /// Move all warnings out of another collector into this one.
    pub fn absorb(&mut self, other: &mut Diagnostics) {
        self.warnings.append(&mut other.warnings);
    }
}

impl Display for Diagnostics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for warning in &self.warnings {
            writeln!(f, "{}", warning)?;
        }
        Ok(())
    }
}
