use std::fmt;

/// Whether an extension's requirements can be satisfied.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Availability {
    /// Not yet determined; the initial state of every dependency state.
    #[default]
    Undetermined,
    /// The extension and everything it transitively requires can be used.
    Available,
    /// The extension cannot be used. The owning reference carries the reasons.
    Error,
}

impl Availability {
    pub fn is_available(&self) -> bool {
        matches!(self, Availability::Available)
    }

    pub fn is_error(&self) -> bool {
        matches!(self, Availability::Error)
    }

    pub fn is_determined(&self) -> bool {
        !matches!(self, Availability::Undetermined)
    }
}

impl fmt::Display for Availability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Availability::Undetermined => write!(f, "Undetermined"),
            Availability::Available => write!(f, "Available"),
            Availability::Error => write!(f, "Error"),
        }
    }
}
