//! Export of a model tree to an SBML Level 3 document.
//!
//! The export walks the subtree below a model path in a fixed sequence of
//! phases, each responsible for one entity kind:
//!
//! 1. **Compartments** assign the compartment ids every later phase refers to
//!    and register the groups found inside them.
//! 2. **Species** are written next and remember which buffered pools stay
//!    constant.
//! 3. **Functions** become assignment rules on the pools they drive.
//! 4. **Channels**, **reactions** and **enzymes** become reactions with
//!    mass-action, flux or saturating kinetic laws.
//! 5. **Groups** are collected last, once every phase has recorded its members.
//!
//! The core document is built with libsbml. Groups and the model's unit
//! attributes are added to its XML when the document is serialized, and the
//! final XML is read back and checked by libsbml before it is written.
//!
//! Problems local to one entity skip that entity and are reported as
//! [`Diagnostic`]s. Structural problems abort the export with an
//! [`SBMLError`] before anything is written.
//!
//! ## Example
//!
//! ```no_run
//! use chemsbml::prelude::*;
//!
//! let tree = load_model("model.json").unwrap();
//! let outcome = write_sbml(&tree, "/model", "out/model.xml", &ExportOptions::default()).unwrap();
//! println!("Wrote {}", outcome.path.display());
//! ```

use std::{
    collections::HashMap,
    fmt, fs,
    path::{Path, PathBuf},
};

use derive_builder::Builder;
use log::{debug, info, warn};
use sbml::{reader::SBMLReader, Annotation, SBMLDocument};
use tempfile::NamedTempFile;

use crate::{
    model::{Capability, Element, ModelTree, ObjId, Role},
    sbml::{
        annotations::ModelAnnotation,
        error::SBMLError,
        groups::{finish_document, Group},
        layout::{resolve_positions, LayeredLayout, Position},
        translate::{
            channels::translate_channels,
            compartments::translate_compartments,
            context::{notes_of, Diagnostic, TranslationContext},
            enzymes::translate_enzymes,
            functions::translate_functions,
            groups::translate_groups,
            reactions::translate_reactions,
            species::translate_species,
        },
    },
    validation::consistency::{check_consistency, Report},
};

/// Settings of an export.
#[derive(Debug, Clone, PartialEq, Builder)]
#[builder(default)]
pub struct ExportOptions {
    /// Coordinates from an interactive scene. When present they are used as is.
    pub scene_items: HashMap<ObjId, Position>,

    /// Width of the box stored coordinates are rescaled into.
    pub scene_width: f64,

    /// Height of the box stored coordinates are rescaled into.
    pub scene_height: f64,
}

impl Default for ExportOptions {
    fn default() -> Self {
        Self {
            scene_items: HashMap::new(),
            scene_width: 1000.0,
            scene_height: 800.0,
        }
    }
}

/// An in-memory export and the problems met while producing it.
pub struct Translation {
    /// The core document, without groups.
    pub document: SBMLDocument,
    pub groups: Vec<Group>,
    pub diagnostics: Vec<Diagnostic>,
}

impl Translation {
    /// The complete document as SBML XML, groups included.
    ///
    /// # Errors
    /// * `SBMLError::XmlError` if libsbml produced malformed XML
    /// * `SBMLError::SerializeError` if a group annotation cannot be serialized
    pub fn to_xml_string(&self) -> Result<String, SBMLError> {
        finish_document(&self.document.to_xml_string(), &self.groups)
    }

    /// Reads the complete document back with libsbml and checks its consistency.
    ///
    /// # Errors
    /// Everything [`Translation::to_xml_string`] returns
    pub fn validate(&self) -> Result<Report, SBMLError> {
        let document = SBMLReader::from_xml_string(&self.to_xml_string()?);
        Ok(check_consistency(&document))
    }
}

impl fmt::Debug for Translation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Translation")
            .field("groups", &self.groups)
            .field("diagnostics", &self.diagnostics)
            .finish_non_exhaustive()
    }
}

/// Result of a successful [`write_sbml`].
#[derive(Debug)]
pub struct ExportOutcome {
    /// Path of the written file.
    pub path: PathBuf,
    pub diagnostics: Vec<Diagnostic>,
}

/// Translates the model below `model_path` into an SBML document.
///
/// # Arguments
/// * `tree` - The model tree to export
/// * `model_path` - Path of the model root inside the tree, e.g. `/model`
/// * `model_id` - Identifier of the SBML model
/// * `options` - Scene coordinates and scene size
///
/// # Returns
/// The document, its groups and the diagnostics of skipped or approximated
/// entities
///
/// # Errors
/// * `SBMLError::PathNotFound` if `model_path` does not exist
/// * `SBMLError::NoCompartment` if the model has no compartment
/// * `SBMLError::UnresolvedSurround` if an endo compartment precedes its surround
/// * `SBMLError::MissingCompartment` if a pool has no translated compartment
/// * `SBMLError::SerializeError` if an annotation cannot be serialized
pub fn to_sbml(
    tree: &ModelTree,
    model_path: &str,
    model_id: &str,
    options: &ExportOptions,
) -> Result<Translation, SBMLError> {
    let root = tree
        .find_path(model_path)
        .ok_or_else(|| SBMLError::PathNotFound(model_path.to_string()))?;

    // Level 3 Version 1, the version the groups package is defined for.
    let sbmldoc = SBMLDocument::new(3, 1, vec![]);
    let model = sbmldoc.create_model(model_id);
    model.set_name(model_id);
    if let Some(annotation) = model_annotation(tree, root) {
        model.set_annotation_serde::<ModelAnnotation>(&annotation)?;
    }

    let positions = resolve_positions(tree, root, options, &LayeredLayout::default());
    debug!(
        "Resolved {} positions from {:?}",
        positions.len(),
        positions.source
    );

    let mut ctx = TranslationContext::new(tree, positions);
    ctx.units.add_base_units(&model);

    translate_compartments(&mut ctx, &model, root)?;
    translate_species(&mut ctx, &model, root)?;
    translate_functions(&mut ctx, &model, root);
    translate_channels(&mut ctx, &model, root)?;
    translate_reactions(&mut ctx, &model, root)?;
    translate_enzymes(&mut ctx, &model, root)?;
    let groups = translate_groups(&mut ctx);

    info!(
        "Translated {}: {} compartment(s), {} species, {} reaction(s), {} rule(s), {} group(s)",
        model_path,
        model.list_of_compartments().iter().count(),
        model.list_of_species().iter().count(),
        model.list_of_reactions().iter().count(),
        model.list_of_assignment_rules().iter().count(),
        groups.len()
    );

    Ok(Translation {
        document: sbmldoc,
        groups,
        diagnostics: ctx.diagnostics,
    })
}

/// Exports the model below `model_path` to an SBML file.
///
/// The file is named after the part of `filename` before its first `.` with an
/// `.xml` extension. If the directory of `filename` is missing or read-only, the
/// file is written to the current directory instead.
///
/// # Arguments
/// * `tree` - The model tree to export
/// * `model_path` - Path of the model root inside the tree
/// * `filename` - Requested output file
/// * `options` - Scene coordinates and scene size
///
/// # Errors
/// Everything [`to_sbml`] returns, plus
/// * `SBMLError::ValidationFailed` if libsbml reports errors for the document
/// * `SBMLError::XmlError` if the XML cannot be completed with the groups
/// * `SBMLError::WriteError` if the file cannot be written
pub fn write_sbml(
    tree: &ModelTree,
    model_path: &str,
    filename: impl AsRef<Path>,
    options: &ExportOptions,
) -> Result<ExportOutcome, SBMLError> {
    let (path, model_id) = resolve_output_path(filename.as_ref());
    let translation = to_sbml(tree, model_path, &model_id, options)?;

    let xml = translation.to_xml_string()?;
    let report = check_consistency(&SBMLReader::from_xml_string(&xml));
    if !report.is_valid {
        return Err(SBMLError::ValidationFailed(report));
    }

    fs::write(&path, xml)?;
    info!("Wrote {}", path.display());

    Ok(ExportOutcome {
        path,
        diagnostics: translation.diagnostics,
    })
}

/// Output file and model id for a requested filename.
pub fn resolve_output_path(filename: &Path) -> (PathBuf, String) {
    let name = filename
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default();
    let stem = match name.split_once('.') {
        Some((stem, _)) => stem.to_string(),
        None => name,
    };

    let requested = filename.parent().unwrap_or_else(|| Path::new(""));
    let directory = if is_writable_dir(requested) {
        requested.to_path_buf()
    } else {
        let fallback = std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."));
        if !requested.as_os_str().is_empty() {
            warn!(
                "{} is not writable, writing to {}",
                requested.display(),
                fallback.display()
            );
        }
        fallback
    };

    (directory.join(format!("{stem}.xml")), stem)
}

/// Whether a file can be created in `directory`.
fn is_writable_dir(directory: &Path) -> bool {
    !directory.as_os_str().is_empty() && NamedTempFile::new_in(directory).is_ok()
}

/// Run settings and plotted elements, written when the model root has info.
fn model_annotation(tree: &ModelTree, root: &Element) -> Option<ModelAnnotation> {
    let info = root.info.as_ref()?;
    let clock = tree.clock();

    let plots: Vec<String> = tree
        .descendants(root, Capability::PlotTable)
        .into_iter()
        .filter_map(|table| tree.neighbors(table, Role::PlotTarget).into_iter().next())
        .filter_map(|target| plot_path(tree, target))
        .collect();

    Some(ModelAnnotation {
        notes: notes_of(root),
        run_time: info.runtime,
        solver: info.solver.clone(),
        simdt: Some(clock.simdt),
        plotdt: Some(clock.plotdt),
        plots: (!plots.is_empty()).then(|| plots.join("; ")),
        ..ModelAnnotation::new()
    })
}

/// Path of a plotted element starting at its compartment, e.g. `/cyto/A`.
fn plot_path(tree: &ModelTree, target: &Element) -> Option<String> {
    let compartment = tree.find_compartment(target)?;
    if compartment.oid() == target.oid() {
        return None;
    }

    let mut names = vec![target.name.as_str()];
    for ancestor in tree.ancestors(target) {
        names.push(ancestor.name.as_str());
        if ancestor.oid() == compartment.oid() {
            break;
        }
    }
    names.reverse();

    Some(format!("/{}", names.join("/")))
}
