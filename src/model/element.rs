//! Element types of the simulation model tree.
//!
//! The exporter reads a hierarchical model in which every node is an
//! [`Element`] identified by an [`ObjId`] (numeric id plus data index). The
//! kind of a node is a closed [`ElementKind`] variant, so upward walks and
//! capability queries match on variants instead of probing class names.

use std::{collections::BTreeMap, fmt::Display};

use derive_builder::Builder;
use serde::{Deserialize, Serialize};
use variantly::Variantly;

/// Identity of an element: numeric id and data index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(from = "ObjIdRepr", rename_all = "camelCase")]
pub struct ObjId {
    pub id: u32,
    pub data_index: u32,
}

impl ObjId {
    pub fn new(id: u32) -> Self {
        Self { id, data_index: 0 }
    }

    pub fn with_index(id: u32, data_index: u32) -> Self {
        Self { id, data_index }
    }
}

impl From<u32> for ObjId {
    fn from(id: u32) -> Self {
        ObjId::new(id)
    }
}

impl Display for ObjId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}[{}]", self.id, self.data_index)
    }
}

/// References in model files may be a bare id or a full `{id, dataIndex}` object.
#[derive(Deserialize)]
#[serde(untagged)]
enum ObjIdRepr {
    Bare(u32),
    #[serde(rename_all = "camelCase")]
    Full {
        id: u32,
        #[serde(default)]
        data_index: u32,
    },
}

impl From<ObjIdRepr> for ObjId {
    fn from(repr: ObjIdRepr) -> Self {
        match repr {
            ObjIdRepr::Bare(id) => ObjId::new(id),
            ObjIdRepr::Full { id, data_index } => ObjId::with_index(id, data_index),
        }
    }
}

/// Connection roles between elements.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Role {
    /// Reactant of a reaction or enzyme, input pool of a channel.
    Substrate,
    /// Product of a reaction or enzyme, output pool of a channel.
    Product,
    /// The pool acting as the enzyme of an explicit enzyme (`enzOut`).
    EnzymeParent,
    /// The enzyme-substrate complex of an explicit enzyme (`cplxDest`).
    Complex,
    /// Enzyme pool of a Michaelis-Menten enzyme or channel count pool.
    Modifier,
    /// Pool driven by a function (`valueOut`).
    FunctionOutput,
    /// Positional summation inputs of a function.
    Input,
    /// Element recorded by a plot table (`requestOut`).
    PlotTarget,
}

impl Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Role::Substrate => "substrate",
            Role::Product => "product",
            Role::EnzymeParent => "enzyme parent",
            Role::Complex => "complex",
            Role::Modifier => "modifier",
            Role::FunctionOutput => "function output",
            Role::Input => "input",
            Role::PlotTarget => "plot target",
        };
        write!(f, "{name}")
    }
}

/// Geometry of a compartment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all_fields = "camelCase")]
pub enum Mesh {
    Cube,
    Cylinder {
        total_length: f64,
        diff_length: f64,
        #[serde(default = "default_voxels")]
        num_diff_compts: u32,
    },
    /// Compartment nested inside `surround`.
    Endo { surround: ObjId },
    Neuro,
}

fn default_voxels() -> u32 {
    1
}

impl Mesh {
    /// Class name written into compartment annotations.
    pub fn class_name(&self) -> &'static str {
        match self {
            Mesh::Cube => "CubeMesh",
            Mesh::Cylinder { .. } => "CylMesh",
            Mesh::Endo { .. } => "EndoMesh",
            Mesh::Neuro => "NeuroMesh",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompartmentSpec {
    /// Volume in cubic metres.
    pub volume: f64,
    #[serde(default = "default_dimensions")]
    pub num_dimensions: u8,
    #[serde(default)]
    pub is_membrane_bound: bool,
    pub mesh: Mesh,
}

fn default_dimensions() -> u8 {
    3
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PoolSpec {
    /// Initial concentration in mM.
    pub conc_init: f64,
    #[serde(default)]
    pub diff_const: f64,
    #[serde(default)]
    pub motor_const: f64,
    /// Buffered pools hold their concentration unless a function drives them.
    #[serde(default)]
    pub buffered: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReactionSpec {
    pub kf: f64,
    #[serde(default)]
    pub kb: f64,
}

/// Rate constants of an explicit (two-step) enzyme.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnzymeSpec {
    pub k1: f64,
    pub k2: f64,
    pub k3: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MmEnzymeSpec {
    pub km: f64,
    pub kcat: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChannelSpec {
    pub permeability: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FunctionSpec {
    /// Expression over positional placeholders `x0`, `x1`, ...
    pub expr: String,
}

/// Kind of a model element.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Variantly)]
#[serde(tag = "type")]
pub enum ElementKind {
    /// Organisational container. Inside a compartment this is a group.
    Neutral,
    Compartment(CompartmentSpec),
    Pool(PoolSpec),
    Reaction(ReactionSpec),
    Enzyme(EnzymeSpec),
    MmEnzyme(MmEnzymeSpec),
    Channel(ChannelSpec),
    Function(FunctionSpec),
    PlotTable,
}

/// Layout and free-text metadata attached to an element.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize, Builder)]
#[serde(default, rename_all = "camelCase")]
#[builder(default)]
pub struct Info {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
    #[builder(setter(into, strip_option))]
    pub color: Option<String>,
    #[builder(setter(into, strip_option))]
    pub text_color: Option<String>,
    #[builder(setter(into, strip_option))]
    pub notes: Option<String>,
    /// Solver name, only meaningful on the model root.
    #[builder(setter(into, strip_option))]
    pub solver: Option<String>,
    /// Run time in seconds, only meaningful on the model root.
    #[builder(setter(strip_option))]
    pub runtime: Option<f64>,
}

impl Info {
    /// Notes with surrounding whitespace removed, if any remain.
    pub fn notes(&self) -> Option<&str> {
        self.notes
            .as_deref()
            .map(str::trim)
            .filter(|notes| !notes.is_empty())
    }
}

/// A node of the model tree.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Builder)]
#[serde(rename_all = "camelCase")]
pub struct Element {
    pub id: u32,

    #[serde(default)]
    #[builder(default)]
    pub data_index: u32,

    #[builder(setter(into))]
    pub name: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[builder(default, setter(into, strip_option))]
    pub parent: Option<ObjId>,

    pub kind: ElementKind,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[builder(default, setter(strip_option))]
    pub info: Option<Info>,

    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    #[builder(default, setter(custom))]
    pub neighbors: BTreeMap<Role, Vec<ObjId>>,
}

impl ElementBuilder {
    /// Appends a connection; repeated targets encode stoichiometry.
    pub fn neighbor(&mut self, role: Role, target: impl Into<ObjId>) -> &mut Self {
        self.neighbors
            .get_or_insert_with(BTreeMap::new)
            .entry(role)
            .or_default()
            .push(target.into());
        self
    }
}

impl Element {
    pub fn oid(&self) -> ObjId {
        ObjId::with_index(self.id, self.data_index)
    }

    pub fn is_transfer_placeholder(&self) -> bool {
        self.kind.is_pool() && self.name.contains(TRANSFER_MARKER)
    }

    /// Stored coordinates, when the element has info with a non-zero position.
    pub fn position(&self) -> Option<(f64, f64)> {
        self.info
            .as_ref()
            .filter(|info| info.x != 0.0 || info.y != 0.0)
            .map(|info| (info.x, info.y))
    }
}

/// Marker in the name of pools that mirror a pool from another compartment.
pub const TRANSFER_MARKER: &str = "_xfer_";

/// Capabilities that descendant queries can filter on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Capability {
    Compartment,
    Pool,
    Reaction,
    /// Both explicit and Michaelis-Menten enzymes.
    Enzyme,
    Channel,
    Function,
    PlotTable,
    Neutral,
}

impl Capability {
    pub fn matches(&self, kind: &ElementKind) -> bool {
        match self {
            Capability::Compartment => kind.is_compartment(),
            Capability::Pool => kind.is_pool(),
            Capability::Reaction => kind.is_reaction(),
            Capability::Enzyme => kind.is_enzyme() || kind.is_mm_enzyme(),
            Capability::Channel => kind.is_channel(),
            Capability::Function => kind.is_function(),
            Capability::PlotTable => kind.is_plot_table(),
            Capability::Neutral => kind.is_neutral(),
        }
    }
}
