//! Section Refinement Engine
//!
//! After generation succeeds the engine is the only thing that mutates the
//! working set. Each unit can be refined, tagged with feedback and commented
//! on independently; failures on one unit leave every other unit alone and
//! never change the failing unit's content.

mod engine;
pub mod inflight;


pub use engine::RefinementEngine;
pub use inflight::{InFlightKey, InFlightRegistry, UnitOperation};

use crate::models::UnitId;
use crate::service::ServiceError;
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RefinementError {
    #[error("Please enter a refinement instruction")]
    EmptyInstruction,

    #[error("Comment text is empty")]
    EmptyComment,

    #[error("No unit with id {0}")]
    UnitNotFound(UnitId),

    #[error("A {operation} request for unit {unit_id} is already in progress")]
    OperationInFlight {
        unit_id: UnitId,
        operation: UnitOperation,
    },

    #[error("An export is already in progress")]
    ExportInFlight,

    #[error("Failed to {operation}: {source}")]
    Service {
        operation: UnitOperation,
        #[source]
        source: ServiceError,
    },

    #[error("Failed to load project: {0}")]
    Load(#[source] ServiceError),

    #[error("Project {0} has no content")]
    EmptyProject(String),

    #[error("Failed to save export: {0}")]
    Storage(String),
}
