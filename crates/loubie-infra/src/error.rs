use std::fmt::{self, Display};

/// Push a formatted finding onto an [`ErrorTree`].
#[macro_export]
macro_rules! err {
    ($errs:expr, $($arg:tt)*) => {
        $errs.add(format!($($arg)*))
    };
}

///
/// ErrorTree
///
/// Accumulates every validation finding instead of failing on the first,
/// so one pass reports the complete set of violations.
///

#[derive(Clone, Debug, Default)]
pub struct ErrorTree {
    findings: Vec<String>,
}

impl ErrorTree {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            findings: Vec::new(),
        }
    }

    pub fn add(&mut self, finding: impl Into<String>) {
        self.findings.push(finding.into());
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.findings.is_empty()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.findings.len()
    }

    /// Resolve the accumulated findings: `Ok(())` when none were added.
    pub fn result(self) -> Result<(), Self> {
        if self.is_empty() { Ok(()) } else { Err(self) }
    }
}

impl Display for ErrorTree {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for finding in &self.findings {
            if !first {
                write!(f, "; ")?;
            }
            write!(f, "{finding}")?;
            first = false;
        }

        Ok(())
    }
}

impl std::error::Error for ErrorTree {}
