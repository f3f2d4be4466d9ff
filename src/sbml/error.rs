use thiserror::Error;

use crate::{model::TreeError, validation::consistency::Report};

/// Errors that abort an SBML export
#[derive(Debug, Error)]
pub enum SBMLError {
    /// Error when the model path does not resolve to an element of the tree
    #[error("Model path not found: {0}")]
    PathNotFound(String),

    /// Error when the model contains no compartment at all
    #[error("Model {0} has no compartment")]
    NoCompartment(String),

    /// Error when an endo compartment is translated before its surround
    #[error("Compartment {compartment} is enclosed by {surround}, which has not been translated")]
    UnresolvedSurround {
        compartment: String,
        surround: String,
    },

    /// Error when a pool has no translated compartment above it
    #[error("Pool {0} has no translated compartment")]
    MissingCompartment(String),

    /// Error when the assembled document fails structural validation
    #[error("Document failed validation with {} error(s)", .0.error_count())]
    ValidationFailed(Report),

    /// Error when writing the document to disk fails
    #[error("Failed to write SBML file: {0}")]
    WriteError(#[from] std::io::Error),

    /// Error when serializing an annotation fails
    #[error("Failed to serialize annotation: {0}")]
    SerializeError(#[from] quick_xml::SeError),

    /// Error when the XML written by libsbml cannot be read back
    #[error("Failed to read SBML output: {0}")]
    XmlError(#[from] quick_xml::Error),

    /// Error when the model tree itself is inconsistent
    #[error("Invalid model tree: {0}")]
    Tree(#[from] TreeError),
}
