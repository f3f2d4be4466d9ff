//! Read-only model tree and the queries the exporter needs from it.

use std::collections::{HashMap, HashSet};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::element::{Capability, Element, ElementKind, ObjId, Role, TRANSFER_MARKER};

/// Integration clock of the simulation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Clock {
    pub simdt: f64,
    pub plotdt: f64,
}

impl Default for Clock {
    fn default() -> Self {
        Self {
            simdt: 0.1,
            plotdt: 1.0,
        }
    }
}

/// Nearest organisational boundary above an element.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Scope<'a> {
    /// A container that lives inside a compartment.
    Group(&'a Element),
    Compartment(&'a Element),
    /// Reached the top of the tree without finding either.
    Root,
}

/// Errors raised while assembling a model tree.
#[derive(Debug, Error, PartialEq)]
pub enum TreeError {
    #[error("Duplicate element id {0}")]
    DuplicateId(ObjId),

    #[error("Element {element} references missing parent {parent}")]
    MissingParent { element: ObjId, parent: ObjId },

    #[error("Element {element} has a {role} neighbor {target} that does not exist")]
    DanglingNeighbor {
        element: ObjId,
        role: Role,
        target: ObjId,
    },

    #[error("Element {0} is its own ancestor")]
    ParentCycle(ObjId),
}

/// Serialized form of a [`ModelTree`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TreeSpec {
    #[serde(default)]
    pub clock: Clock,
    pub elements: Vec<Element>,
}

/// Arena of elements with parent/child and id indexes.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(try_from = "TreeSpec", into = "TreeSpec")]
pub struct ModelTree {
    clock: Clock,
    elements: Vec<Element>,
    index: HashMap<ObjId, usize>,
    children: HashMap<ObjId, Vec<usize>>,
}

impl TryFrom<TreeSpec> for ModelTree {
    type Error = TreeError;

    fn try_from(spec: TreeSpec) -> Result<Self, Self::Error> {
        Ok(ModelTree::new(spec.elements)?.with_clock(spec.clock))
    }
}

impl From<ModelTree> for TreeSpec {
    fn from(tree: ModelTree) -> Self {
        TreeSpec {
            clock: tree.clock,
            elements: tree.elements,
        }
    }
}

impl ModelTree {
    /// Builds the tree, checking that ids are unique and every reference resolves.
    ///
    /// Children keep the order in which they appear in `elements`.
    pub fn new(elements: Vec<Element>) -> Result<Self, TreeError> {
        let mut index = HashMap::with_capacity(elements.len());
        for (position, element) in elements.iter().enumerate() {
            if index.insert(element.oid(), position).is_some() {
                return Err(TreeError::DuplicateId(element.oid()));
            }
        }

        let mut children: HashMap<ObjId, Vec<usize>> = HashMap::new();
        for (position, element) in elements.iter().enumerate() {
            if let Some(parent) = element.parent {
                if !index.contains_key(&parent) {
                    return Err(TreeError::MissingParent {
                        element: element.oid(),
                        parent,
                    });
                }
                children.entry(parent).or_default().push(position);
            }

            for (role, targets) in element.neighbors.iter() {
                if let Some(target) = targets.iter().find(|t| !index.contains_key(t)) {
                    return Err(TreeError::DanglingNeighbor {
                        element: element.oid(),
                        role: *role,
                        target: *target,
                    });
                }
            }
        }

        let tree = Self {
            clock: Clock::default(),
            elements,
            index,
            children,
        };
        tree.check_acyclic()?;

        Ok(tree)
    }

    pub fn with_clock(mut self, clock: Clock) -> Self {
        self.clock = clock;
        self
    }

    fn check_acyclic(&self) -> Result<(), TreeError> {
        for element in self.elements.iter() {
            let mut seen = HashSet::new();
            let mut current = Some(element);
            while let Some(node) = current {
                if !seen.insert(node.oid()) {
                    return Err(TreeError::ParentCycle(element.oid()));
                }
                current = self.parent(node);
            }
        }
        Ok(())
    }

    pub fn clock(&self) -> &Clock {
        &self.clock
    }

    pub fn elements(&self) -> impl Iterator<Item = &Element> {
        self.elements.iter()
    }

    pub fn get(&self, oid: ObjId) -> Option<&Element> {
        self.index.get(&oid).map(|&position| &self.elements[position])
    }

    pub fn parent(&self, element: &Element) -> Option<&Element> {
        element.parent.and_then(|parent| self.get(parent))
    }

    pub fn children<'a>(&'a self, element: &Element) -> impl Iterator<Item = &'a Element> + 'a {
        self.children
            .get(&element.oid())
            .into_iter()
            .flatten()
            .map(|&position| &self.elements[position])
    }

    /// Ancestors from the direct parent upwards.
    pub fn ancestors<'a>(&'a self, element: &'a Element) -> impl Iterator<Item = &'a Element> + 'a {
        std::iter::successors(self.parent(element), move |node| self.parent(node))
    }

    /// Slash-separated path from the top of the tree, e.g. `/model/cyto/A`.
    pub fn path(&self, element: &Element) -> String {
        let mut names: Vec<&str> = self.ancestors(element).map(|e| e.name.as_str()).collect();
        names.reverse();
        names.push(&element.name);
        format!("/{}", names.join("/"))
    }

    /// Resolves a slash-separated path to an element.
    pub fn find_path(&self, path: &str) -> Option<&Element> {
        let mut segments = path.split('/').filter(|segment| !segment.is_empty());
        let first = segments.next()?;
        let mut current = self
            .elements
            .iter()
            .find(|e| e.parent.is_none() && e.name == first)?;

        for segment in segments {
            current = self.children(current).find(|child| child.name == segment)?;
        }

        Some(current)
    }

    /// All descendants of `root` with the capability, depth first in child order.
    pub fn descendants<'a>(&'a self, root: &Element, capability: Capability) -> Vec<&'a Element> {
        let mut found = Vec::new();
        let mut stack: Vec<&Element> = self.children(root).collect();
        stack.reverse();

        while let Some(node) = stack.pop() {
            if capability.matches(&node.kind) {
                found.push(node);
            }
            let mut kids: Vec<&Element> = self.children(node).collect();
            kids.reverse();
            stack.extend(kids);
        }

        found
    }

    /// Connected elements in the given role, in stored order (duplicates kept).
    pub fn neighbors(&self, element: &Element, role: Role) -> Vec<&Element> {
        element
            .neighbors
            .get(&role)
            .into_iter()
            .flatten()
            .filter_map(|target| self.get(*target))
            .collect()
    }

    /// The element itself if it is a compartment, else its nearest compartment ancestor.
    pub fn find_compartment<'a>(&'a self, element: &'a Element) -> Option<&'a Element> {
        std::iter::once(element)
            .chain(self.ancestors(element))
            .find(|node| node.kind.is_compartment())
    }

    /// Walks upward from the parent until a group or compartment is found.
    pub fn enclosing_scope<'a>(&'a self, element: &'a Element) -> Scope<'a> {
        for node in self.ancestors(element) {
            match node.kind {
                ElementKind::Compartment(_) => return Scope::Compartment(node),
                ElementKind::Neutral if self.find_compartment(node).is_some() => {
                    return Scope::Group(node)
                }
                ElementKind::Neutral => return Scope::Root,
                _ => {}
            }
        }
        Scope::Root
    }

    /// Maps a transfer placeholder (`A_xfer_dend`) back to the pool it mirrors.
    ///
    /// Falls back to the element itself when no such pool exists.
    pub fn resolve_transfer<'a>(&'a self, element: &'a Element) -> &'a Element {
        if !element.is_transfer_placeholder() {
            return element;
        }

        let Some((pool_name, compartment_name)) = element.name.split_once(TRANSFER_MARKER) else {
            return element;
        };
        let top = self.ancestors(element).last().unwrap_or(element);

        self.descendants(top, Capability::Compartment)
            .into_iter()
            .filter(|compartment| compartment.name == compartment_name)
            .flat_map(|compartment| self.descendants(compartment, Capability::Pool))
            .find(|pool| pool.name == pool_name)
            .unwrap_or(element)
    }
}
