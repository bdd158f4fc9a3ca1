//! # Datakit Source Processing
//!
//! Drives source cookers over the keyed data elements a source parser emits.
//!
//! ## Key Submodules and Responsibilities:
//!
//! - **[`element`]**: The [`DataElement`] contract and per-element
//!   [`DataProcessingResult`].
//! - **[`cancellation`]**: The cooperative [`CancellationToken`].
//! - **[`session`]**: [`SourceProcessingSession`], routing each element to the
//!   active cookers subscribed to its key and to receive-all cookers.
//! - **[`cooked`]**: [`CookedSourceData`], serving finished cookers' outputs
//!   to the retrieval layer.
//! - **[`plan`]**: [`ProcessingPlan`], choosing which source cookers a run
//!   needs for a set of tables, processors and composite cookers.
//! - **[`error`]**: [`ProcessingError`](error::ProcessingError).
pub mod cancellation;
pub mod cooked;
pub mod element;
pub mod error;
pub mod plan;
pub mod session;

pub use cancellation::CancellationToken;
pub use cooked::CookedSourceData;
pub use element::{DataElement, DataProcessingResult, ElementContext};
pub use error::ProcessingError;
pub use plan::ProcessingPlan;
pub use session::{SessionPhase, SourceProcessingSession};
