//! Compartmental reaction-network to SBML exporter
//!
//! This library exports chemical kinetic models held in a hierarchical model
//! tree to SBML Level 3 documents, including:
//! - Compartments, species, mass-action reactions, enzymes and channels
//! - Assignment rules from function expressions
//! - Groups and layout annotations in the simulator namespace
//! - Consistency checks of the assembled document with libsbml
//! - Automatic layout for models without coordinates

#![warn(unused_imports)]

/// Commonly used types and functionality re-exported for convenience
pub mod prelude {
    pub use crate::io::*;
    pub use crate::model::*;
    pub use crate::sbml::error::SBMLError;
    pub use crate::sbml::groups::Group;
    pub use crate::sbml::layout::{LayeredLayout, LayoutEngine, Position};
    pub use crate::sbml::translate::context::{Diagnostic, DiagnosticSeverity};
    pub use crate::sbml::writer::*;
    pub use crate::validation::consistency::{check_consistency, Report, Severity, ValidationResult};
}

/// The model tree the exporter reads from
pub mod model {
    pub use crate::model::element::*;
    pub use crate::model::tree::*;

    /// Elements, their kinds and connection roles
    pub mod element;
    /// Arena tree with structural queries
    pub mod tree;
}

/// SBML translation and output
pub mod sbml {
    /// Annotation fragments in the simulator namespace
    pub mod annotations;
    /// Export errors
    pub mod error;
    /// Groups package and model unit attributes in the written XML
    pub mod groups;
    /// Identifier sanitization
    pub mod ident;
    /// Coordinate resolution and automatic layout
    pub mod layout;
    /// Rate terms from participant multisets
    pub mod ratelaw;
    /// Unit definitions
    pub mod units;
    /// Export entry points
    pub mod writer;

    /// Per-entity translation phases
    pub mod translate {
        pub mod channels;
        pub mod compartments;
        pub mod context;
        pub mod enzymes;
        pub mod functions;
        pub mod groups;
        pub mod reactions;
        pub mod species;
    }
}

/// Validation of assembled SBML documents
pub mod validation {
    /// Main consistency interface
    pub mod consistency;
}

/// IO functionality
pub mod io;
