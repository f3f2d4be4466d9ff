use std::path::PathBuf;

use thiserror::Error;

use crate::model::ModelTree;

/// Loads a model tree from a JSON file.
///
/// The file holds the simulation clock and a flat list of elements that refer
/// to their parents and neighbours by id. The tree is checked for duplicate
/// ids, missing parents, dangling neighbours and parent cycles while loading.
///
/// # Arguments
///
/// * `path` - Path to the JSON file
///
/// # Errors
///
/// This function will return an error if:
/// * The file cannot be found or opened (`IOError::FileNotFound`)
/// * The contents are not valid JSON or do not form a valid tree (`IOError::JsonParseError`)
pub fn load_model(path: impl Into<PathBuf>) -> Result<ModelTree, IOError> {
    let path = path.into();
    let file = std::fs::File::open(path).map_err(IOError::FileNotFound)?;
    serde_json::from_reader(file).map_err(IOError::JsonParseError)
}

/// Saves a model tree to a JSON file.
///
/// # Arguments
///
/// * `path` - Path of the JSON file to create
/// * `tree` - The model tree to save
pub fn save_model(path: impl Into<PathBuf>, tree: &ModelTree) -> Result<(), IOError> {
    let path = path.into();
    let file = std::fs::File::create(path).map_err(IOError::FileNotFound)?;
    serde_json::to_writer_pretty(file, tree).map_err(IOError::JsonParseError)
}

/// Represents errors that can occur while reading or writing model files.
#[derive(Error, Debug)]
pub enum IOError {
    /// Indicates that the specified file could not be found or opened.
    #[error("File not found: {0}")]
    FileNotFound(#[from] std::io::Error),

    /// Indicates that the file contents could not be parsed into a model tree.
    #[error("Failed to parse JSON: {0}")]
    JsonParseError(#[from] serde_json::Error),
}
