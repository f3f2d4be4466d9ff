//! Annotations in the simulator namespace.
//!
//! Layout, geometry, notes and bookkeeping that SBML core has no place for
//! travels in `<annotation>` blocks. Each block is a serde struct whose elements
//! carry the `moose:` prefix and which binds that prefix itself, so the fragment
//! is well-formed wherever libsbml places it.
//!
//! | Annotation               | Attached to                                   |
//! |--------------------------|-----------------------------------------------|
//! | [`CompartmentAnnotation`]| compartments                                  |
//! | [`ModelAnnotation`]      | the model, species and reactions              |
//! | [`EnzymaticReaction`]    | both stages of explicit enzymes, MM enzymes   |
//! | [`ConcChannel`]          | channels                                      |
//! | [`GroupAnnotation`]      | groups                                        |
//!
//! ```text
//! <moose:ConcChannel xmlns:moose="http://www.moose.ncbs.res.in">
//!   <moose:Permeability>0.2</moose:Permeability>
//! </moose:ConcChannel>
//! ```

use serde::{Deserialize, Serialize};

use crate::{model::Info, sbml::error::SBMLError};

/// Namespace of the annotations written by this crate.
pub const MOOSE_NS: &str = "http://www.moose.ncbs.res.in";

fn default_xmlns() -> String {
    MOOSE_NS.to_string()
}

/// Serializes an annotation struct into an XML fragment.
pub fn to_fragment<T: Serialize>(annotation: &T) -> Result<String, SBMLError> {
    Ok(quick_xml::se::to_string(annotation)?)
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename = "moose:CompartmentAnnotation")]
pub struct CompartmentAnnotation {
    #[serde(rename = "@xmlns:moose", default = "default_xmlns")]
    pub xmlns: String,

    /// Class name of the mesh, e.g. `CubeMesh`.
    #[serde(rename = "moose:Mesh")]
    pub mesh: String,

    #[serde(rename = "moose:totLength", skip_serializing_if = "Option::is_none")]
    pub tot_length: Option<f64>,

    #[serde(rename = "moose:diffLength", skip_serializing_if = "Option::is_none")]
    pub diff_length: Option<f64>,

    /// Identifier of the enclosing compartment of an endo mesh.
    #[serde(rename = "moose:surround", skip_serializing_if = "Option::is_none")]
    pub surround: Option<String>,

    #[serde(rename = "moose:isMembraneBound")]
    pub is_membrane_bound: bool,

    #[serde(rename = "moose:Notes", skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

impl CompartmentAnnotation {
    pub fn new(mesh: &str, is_membrane_bound: bool) -> Self {
        Self {
            xmlns: default_xmlns(),
            mesh: mesh.to_string(),
            tot_length: None,
            diff_length: None,
            surround: None,
            is_membrane_bound,
            notes: None,
        }
    }
}

/// Placement and simulation metadata of species, reactions and the model.
///
/// Species use the coordinate and transport fields, reactions only the
/// coordinates, and the model the run settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(rename = "moose:ModelAnnotation")]
pub struct ModelAnnotation {
    #[serde(rename = "@xmlns:moose", default = "default_xmlns")]
    pub xmlns: String,

    #[serde(rename = "moose:runTime", skip_serializing_if = "Option::is_none")]
    pub run_time: Option<f64>,

    #[serde(rename = "moose:solver", skip_serializing_if = "Option::is_none")]
    pub solver: Option<String>,

    #[serde(rename = "moose:simdt", skip_serializing_if = "Option::is_none")]
    pub simdt: Option<f64>,

    #[serde(rename = "moose:plotdt", skip_serializing_if = "Option::is_none")]
    pub plotdt: Option<f64>,

    /// `; `-separated paths of the plotted elements.
    #[serde(rename = "moose:plots", skip_serializing_if = "Option::is_none")]
    pub plots: Option<String>,

    #[serde(rename = "moose:xCord", skip_serializing_if = "Option::is_none")]
    pub x_cord: Option<f64>,

    #[serde(rename = "moose:yCord", skip_serializing_if = "Option::is_none")]
    pub y_cord: Option<f64>,

    #[serde(rename = "moose:bgColor", skip_serializing_if = "Option::is_none")]
    pub bg_color: Option<String>,

    #[serde(rename = "moose:textColor", skip_serializing_if = "Option::is_none")]
    pub text_color: Option<String>,

    #[serde(rename = "moose:diffConstant", skip_serializing_if = "Option::is_none")]
    pub diff_constant: Option<f64>,

    #[serde(rename = "moose:motorConstant", skip_serializing_if = "Option::is_none")]
    pub motor_constant: Option<f64>,

    #[serde(rename = "moose:Notes", skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

impl ModelAnnotation {
    pub fn new() -> Self {
        Self {
            xmlns: default_xmlns(),
            ..Default::default()
        }
    }

    /// Sets the coordinates and takes the colours from the element's info.
    pub fn placed(mut self, (x, y): (f64, f64), info: Option<&Info>) -> Self {
        self.x_cord = Some(x);
        self.y_cord = Some(y);
        if let Some(info) = info {
            self.bg_color = info.color.clone().filter(|c| !c.is_empty());
            self.text_color = info.text_color.clone().filter(|c| !c.is_empty());
        }
        self
    }
}

/// Bookkeeping of an enzyme that was split into plain reactions.
///
/// The first stage lists `enzyme`, `substrates` and `product` (the complex),
/// the second lists `complex`, `enzyme` and `product`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(rename = "moose:EnzymaticReaction")]
pub struct EnzymaticReaction {
    #[serde(rename = "@xmlns:moose", default = "default_xmlns")]
    pub xmlns: String,

    #[serde(rename = "moose:complex", default, skip_serializing_if = "Vec::is_empty")]
    pub complex: Vec<String>,

    #[serde(rename = "moose:enzyme", default, skip_serializing_if = "Vec::is_empty")]
    pub enzyme: Vec<String>,

    #[serde(rename = "moose:substrates", default, skip_serializing_if = "Vec::is_empty")]
    pub substrates: Vec<String>,

    #[serde(rename = "moose:product", default, skip_serializing_if = "Vec::is_empty")]
    pub product: Vec<String>,

    /// Identifier of the enzyme both stages were derived from.
    #[serde(rename = "moose:groupName", skip_serializing_if = "Option::is_none")]
    pub group_name: Option<String>,

    #[serde(rename = "moose:stage", skip_serializing_if = "Option::is_none")]
    pub stage: Option<u8>,

    #[serde(rename = "moose:xCord", skip_serializing_if = "Option::is_none")]
    pub x_cord: Option<f64>,

    #[serde(rename = "moose:yCord", skip_serializing_if = "Option::is_none")]
    pub y_cord: Option<f64>,

    #[serde(rename = "moose:bgColor", skip_serializing_if = "Option::is_none")]
    pub bg_color: Option<String>,

    #[serde(rename = "moose:textColor", skip_serializing_if = "Option::is_none")]
    pub text_color: Option<String>,

    #[serde(rename = "moose:Notes", skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

impl EnzymaticReaction {
    pub fn new() -> Self {
        Self {
            xmlns: default_xmlns(),
            ..Default::default()
        }
    }

    pub fn placed(mut self, placement: Option<&ModelAnnotation>) -> Self {
        if let Some(placement) = placement {
            self.x_cord = placement.x_cord;
            self.y_cord = placement.y_cord;
            self.bg_color = placement.bg_color.clone();
            self.text_color = placement.text_color.clone();
        }
        self
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename = "moose:ConcChannel")]
pub struct ConcChannel {
    #[serde(rename = "@xmlns:moose", default = "default_xmlns")]
    pub xmlns: String,

    #[serde(rename = "moose:xCord", skip_serializing_if = "Option::is_none")]
    pub x_cord: Option<f64>,

    #[serde(rename = "moose:yCord", skip_serializing_if = "Option::is_none")]
    pub y_cord: Option<f64>,

    #[serde(rename = "moose:Permeability")]
    pub permeability: f64,

    #[serde(rename = "moose:Notes", skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

impl ConcChannel {
    pub fn new(permeability: f64, position: Option<(f64, f64)>) -> Self {
        Self {
            xmlns: default_xmlns(),
            x_cord: position.map(|(x, _)| x),
            y_cord: position.map(|(_, y)| y),
            permeability,
            notes: None,
        }
    }
}

/// Placement of a group and its position in the compartment hierarchy.
///
/// A group nested in another group names its parent group in both `Group` and
/// `Parent`; a top-level group names its compartment as `Parent`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(rename = "moose:GroupAnnotation")]
pub struct GroupAnnotation {
    #[serde(rename = "@xmlns:moose", default = "default_xmlns")]
    pub xmlns: String,

    #[serde(rename = "moose:Compartment")]
    pub compartment: String,

    #[serde(rename = "moose:Group", skip_serializing_if = "Option::is_none")]
    pub group: Option<String>,

    #[serde(rename = "moose:Parent")]
    pub parent: String,

    #[serde(rename = "moose:x", skip_serializing_if = "Option::is_none")]
    pub x: Option<f64>,

    #[serde(rename = "moose:y", skip_serializing_if = "Option::is_none")]
    pub y: Option<f64>,

    #[serde(rename = "moose:width", skip_serializing_if = "Option::is_none")]
    pub width: Option<f64>,

    #[serde(rename = "moose:height", skip_serializing_if = "Option::is_none")]
    pub height: Option<f64>,

    #[serde(rename = "moose:bgColor", skip_serializing_if = "Option::is_none")]
    pub bg_color: Option<String>,

    #[serde(rename = "moose:Notes", skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

impl GroupAnnotation {
    pub fn new(compartment: String, parent: String) -> Self {
        Self {
            xmlns: default_xmlns(),
            compartment,
            parent,
            ..Default::default()
        }
    }
}
