//! Consistency checks of assembled SBML documents.
//!
//! This module runs the libsbml consistency checks on an [`SBMLDocument`]
//! before it is written and maps the error log into a [`Report`]:
//! - Errors and fatal errors make the report invalid
//! - Warnings and everything else are kept for display only
//!
//! The main entry point is the `check_consistency` function which returns a
//! `Report` with the results.

use std::fmt;

use colored::Colorize;
use sbml::{prelude::SBMLErrorSeverity, SBMLDocument};

/// Location reported for libsbml findings, which refer to the whole document.
const DOCUMENT_LOCATION: &str = "/sbml";

/// The `check_consistency` function is used to check the consistency of an `SBMLDocument`.
/// It returns a `Report` containing the results of the checks.
///
/// # Arguments
///
/// * `document` - A reference to the libsbml document to be checked.
///
/// # Returns
///
/// Returns a `Report` containing the results of the consistency checks.
pub fn check_consistency(document: &SBMLDocument) -> Report {
    let mut report = Report::new();

    for error in document.check_consistency().errors {
        report.add_result(ValidationResult::new(
            DOCUMENT_LOCATION.to_string(),
            error.message.trim().to_string(),
            map_severity(&error.severity),
            None,
        ));
    }

    report
}

fn map_severity(severity: &SBMLErrorSeverity) -> Severity {
    if *severity == SBMLErrorSeverity::Error {
        return Severity::Error;
    }
    match format!("{severity:?}").as_str() {
        "Fatal" => Severity::Error,
        "Warning" => Severity::Warning,
        _ => Severity::Info,
    }
}

/// The `Report` struct is used to store the results of the validation checks.
///
/// Contains a boolean indicating overall validity and a vector of individual validation results.
/// The document is considered invalid if any validation results have Error severity.
#[derive(Debug, serde::Serialize, serde::Deserialize, Clone, PartialEq)]
pub struct Report {
    /// Whether the document is valid overall. False if any errors were found.
    pub is_valid: bool,
    /// Vector of individual validation results found during checks.
    pub errors: Vec<ValidationResult>,
}

impl Report {
    pub(crate) fn new() -> Self {
        Self {
            is_valid: true,
            errors: Vec::new(),
        }
    }

    /// Adds a validation result to the report.
    ///
    /// If the result has Error severity, marks the overall report as invalid.
    pub fn add_result(&mut self, result: ValidationResult) {
        if result.severity == Severity::Error {
            self.is_valid = false;
        }
        self.errors.push(result);
    }

    /// Number of results with Error severity.
    pub fn error_count(&self) -> usize {
        self.errors
            .iter()
            .filter(|result| result.severity == Severity::Error)
            .count()
    }

    /// Filters the results by the identifier.
    ///
    /// # Arguments
    ///
    /// * `identifier` - The identifier of the object.
    ///
    /// # Returns
    ///
    /// Returns a vector of `ValidationResult`s with the given identifier.
    pub fn filter_results(&self, identifier: &str) -> Vec<ValidationResult> {
        self.errors
            .iter()
            .filter(|result| result.identifier.as_deref() == Some(identifier))
            .cloned()
            .collect()
    }
}

/// The `ValidationResult` struct represents a single validation issue found during checking.
///
/// Contains the location where the issue was found, a descriptive message, and the severity level.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct ValidationResult {
    /// Path to the offending element, e.g. `/reactions/0/reactants/1`
    location: String,
    /// Human readable description of the validation issue
    message: String,
    /// Severity level of the validation issue
    severity: Severity,
    /// The identifier of the object, if any
    identifier: Option<String>,
}

impl ValidationResult {
    /// Creates a new `ValidationResult`.
    ///
    /// # Arguments
    ///
    /// * `location` - The location of the validation issue.
    /// * `message` - A message describing the validation issue.
    /// * `severity` - The severity of the validation issue.
    /// * `identifier` - The identifier of the offending object, if any.
    pub fn new(
        location: String,
        message: String,
        severity: Severity,
        identifier: Option<String>,
    ) -> Self {
        Self {
            location,
            message,
            severity,
            identifier,
        }
    }

    pub fn location(&self) -> &str {
        &self.location
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn severity(&self) -> &Severity {
        &self.severity
    }

    pub fn identifier(&self) -> &Option<String> {
        &self.identifier
    }
}

impl fmt::Display for ValidationResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let message = match self.severity {
            Severity::Error => self.message.bold().red(),
            Severity::Warning => self.message.bold().yellow(),
            Severity::Info => self.message.bold().green(),
        };

        let severity = match self.severity {
            Severity::Error => "Error".bold().red(),
            Severity::Warning => "Warning".bold().yellow(),
            Severity::Info => "Info".bold().green(),
        };

        write!(
            f,
            "[{}] {}:\n\t└── {}",
            self.location.bold(),
            severity,
            message
        )
    }
}

/// Severity levels for validation issues.
///
/// - Error: The document is invalid and must not be written
/// - Warning: The document may have issues but is still valid
/// - Info: Informational message
#[derive(Debug, Clone, PartialEq, Copy, serde::Serialize, serde::Deserialize)]
pub enum Severity {
    /// Critical issue that makes the document invalid
    Error,
    /// Non-critical issue that should be reviewed
    Warning,
    /// Informational message
    Info,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Error => write!(f, "Error"),
            Severity::Warning => write!(f, "Warning"),
            Severity::Info => write!(f, "Info"),
        }
    }
}
