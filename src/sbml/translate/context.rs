//! State shared by the translation phases.
//!
//! Phases run in a fixed order, write their entities into the libsbml model
//! and communicate only through the [`TranslationContext`]. Compartment ids
//! assigned in the first phase are looked up by every later one. Species ids
//! and the constant ones among them are recorded by the species phase for the
//! function and rate-law phases. Group members accumulate until the group phase
//! emits them.

use std::collections::{HashMap, HashSet};

use log::{info, warn};

use crate::{
    model::{Element, ModelTree, ObjId, Role, Scope},
    sbml::{
        annotations::ModelAnnotation,
        ident::sanitize_notes,
        layout::{PositionSource, Positions},
        ratelaw::{synthesize, ParticipantRole, RateTerm},
        units::UnitRegistry,
    },
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DiagnosticSeverity {
    /// The entity was left out of the document.
    Skipped,
    /// The entity was written, but under an assumption worth knowing about.
    Advisory,
}

/// A non-fatal problem found while translating one entity.
#[derive(Debug, Clone, PartialEq)]
pub struct Diagnostic {
    pub severity: DiagnosticSeverity,
    /// Tree path of the entity.
    pub entity: String,
    pub message: String,
}

/// Sanitized notes from the element's info.
pub fn notes_of(element: &Element) -> Option<String> {
    element
        .info
        .as_ref()
        .and_then(|info| info.notes())
        .map(sanitize_notes)
}

/// Containers that collect member ids, in registration order.
#[derive(Debug, Default)]
pub struct GroupRegistry<'a> {
    entries: Vec<(&'a Element, Vec<String>)>,
    index: HashMap<ObjId, usize>,
}

impl<'a> GroupRegistry<'a> {
    /// Registers a container without members. Registering twice is a no-op.
    pub fn register(&mut self, group: &'a Element) -> usize {
        if let Some(&position) = self.index.get(&group.oid()) {
            return position;
        }
        self.entries.push((group, Vec::new()));
        self.index.insert(group.oid(), self.entries.len() - 1);
        self.entries.len() - 1
    }

    /// Adds a member id, ignoring ids the group already holds.
    pub fn add_member(&mut self, group: &'a Element, member: impl Into<String>) {
        let member = member.into();
        let position = self.register(group);
        let members = &mut self.entries[position].1;
        if !members.contains(&member) {
            members.push(member);
        }
    }

    pub fn members(&self, group: &Element) -> Option<&[String]> {
        self.index
            .get(&group.oid())
            .map(|&position| self.entries[position].1.as_slice())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&'a Element, &[String])> {
        self.entries
            .iter()
            .map(|(group, members)| (*group, members.as_slice()))
    }
}

/// Everything the translators share besides the libsbml model.
pub struct TranslationContext<'a> {
    pub tree: &'a ModelTree,
    /// Ids of the translated compartments.
    pub compartments: HashMap<ObjId, String>,
    /// Ids of every written species.
    pub species: HashSet<String>,
    /// Ids of buffered species that no function drives.
    pub constant_species: HashSet<String>,
    pub units: UnitRegistry,
    pub groups: GroupRegistry<'a>,
    pub positions: Positions,
    pub diagnostics: Vec<Diagnostic>,
}

impl<'a> TranslationContext<'a> {
    pub fn new(tree: &'a ModelTree, positions: Positions) -> Self {
        Self {
            tree,
            compartments: HashMap::new(),
            species: HashSet::new(),
            constant_species: HashSet::new(),
            units: UnitRegistry::default(),
            groups: GroupRegistry::default(),
            positions,
            diagnostics: Vec::new(),
        }
    }

    /// Whether `id` names a written species or compartment.
    pub fn is_defined(&self, id: &str) -> bool {
        self.species.contains(id) || self.compartments.values().any(|c| c == id)
    }

    /// Id of the translated compartment the element belongs to.
    pub fn compartment_id(&self, element: &Element) -> Option<String> {
        self.tree
            .find_compartment(element)
            .and_then(|compartment| self.compartments.get(&compartment.oid()))
            .cloned()
    }

    /// The group the element sits in, if its nearest container is a group.
    pub fn enclosing_group(&self, element: &'a Element) -> Option<&'a Element> {
        match self.tree.enclosing_scope(element) {
            Scope::Group(group) => Some(group),
            Scope::Compartment(_) | Scope::Root => None,
        }
    }

    /// Records `id` as a member of the element's group, if it has one.
    pub fn record_member(&mut self, element: &'a Element, id: &str) {
        if let Some(group) = self.enclosing_group(element) {
            self.groups.add_member(group, id);
        }
    }

    /// Resolved coordinates, falling back to the element's stored position.
    pub fn position(&self, element: &Element) -> Option<(f64, f64)> {
        self.positions
            .get(element.oid())
            .map(|position| (position.x, position.y))
            .or_else(|| element.info.as_ref().map(|info| (info.x, info.y)))
    }

    /// Placement annotation of a pool or process.
    ///
    /// Written when the element is inside a group, when scene coordinates
    /// were supplied, or when it has a non-zero position.
    pub fn placement(&self, element: &'a Element) -> Option<ModelAnnotation> {
        let position = self.position(element)?;
        let in_group = self.enclosing_group(element).is_some();
        let from_scene = self.positions.source == PositionSource::Scene;
        let non_zero = position.0 != 0.0 || position.1 != 0.0;

        (in_group || from_scene || non_zero)
            .then(|| ModelAnnotation::new().placed(position, element.info.as_ref()))
    }

    /// Rate term of the element's neighbours in `role`.
    pub fn rate_term(&self, element: &Element, role: Role, as_role: ParticipantRole) -> RateTerm {
        let participants = self.tree.neighbors(element, role);
        synthesize(self.tree, &participants, as_role, &self.constant_species)
    }

    /// Records that the element was left out of the document.
    pub fn skip(&mut self, element: &Element, message: impl Into<String>) {
        let diagnostic = Diagnostic {
            severity: DiagnosticSeverity::Skipped,
            entity: self.tree.path(element),
            message: message.into(),
        };
        warn!("Skipping {}: {}", diagnostic.entity, diagnostic.message);
        self.diagnostics.push(diagnostic);
    }

    /// Records an assumption made while translating the element.
    pub fn advise(&mut self, element: &Element, message: impl Into<String>) {
        let diagnostic = Diagnostic {
            severity: DiagnosticSeverity::Advisory,
            entity: self.tree.path(element),
            message: message.into(),
        };
        info!("{}: {}", diagnostic.entity, diagnostic.message);
        self.diagnostics.push(diagnostic);
    }
}
