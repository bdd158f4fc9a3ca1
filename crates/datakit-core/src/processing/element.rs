use std::any::Any;
use std::fmt;

/// Context a source parser passes along with each data element.
pub type ElementContext = dyn Any + Send + Sync;

/// A keyed data element produced by a source parser.
pub trait DataElement: Any + Send + Sync {
    /// The key used to route this element to subscribed cookers.
    fn key(&self) -> &str;

    /// Cast to Any for downcasting inside cookers
    fn as_any(&self) -> &dyn Any;
}

/// Outcome of handing one data element to a cooker, or to a whole session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DataProcessingResult {
    /// The element was consumed.
    Processed,
    /// The element was not of interest.
    Ignored,
    /// The element was malformed. Terminal for that element.
    CorruptData,
}

impl DataProcessingResult {
    pub fn is_corrupt(&self) -> bool {
        matches!(self, DataProcessingResult::CorruptData)
    }
}

impl fmt::Display for DataProcessingResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DataProcessingResult::Processed => write!(f, "Processed"),
            DataProcessingResult::Ignored => write!(f, "Ignored"),
            DataProcessingResult::CorruptData => write!(f, "CorruptData"),
        }
    }
}
