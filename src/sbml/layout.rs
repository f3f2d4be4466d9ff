//! Coordinates of pools and processes in the exported document.
//!
//! Positions come from one of three places, tried in order:
//!
//! 1. Scene coordinates handed over by an editor through
//!    [`ExportOptions::scene_items`](crate::sbml::writer::ExportOptions).
//! 2. Coordinates stored in element info, rescaled into the scene box.
//! 3. A [`LayoutEngine`], called once when no element has stored coordinates.

use std::collections::HashMap;

use log::debug;
use petgraph::{
    algo::{condensation, toposort},
    graph::NodeIndex,
    Directed, Direction, Graph,
};

use crate::{
    model::{Capability, Element, ModelTree, ObjId, Role},
    sbml::writer::ExportOptions,
};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Position {
    pub x: f64,
    pub y: f64,
}

impl Position {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// Computes coordinates for models that carry none.
pub trait LayoutEngine {
    /// Returns a position for every entity it could place.
    ///
    /// # Arguments
    /// * `tree` - The model tree the entities belong to
    /// * `entities` - Pools and processes to place
    fn compute_default_coordinates(
        &self,
        tree: &ModelTree,
        entities: &[&Element],
    ) -> HashMap<ObjId, Position>;
}

/// Where the resolved positions came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PositionSource {
    Scene,
    Stored,
    Computed,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Positions {
    pub source: PositionSource,
    positions: HashMap<ObjId, Position>,
}

impl Positions {
    pub fn get(&self, oid: ObjId) -> Option<Position> {
        self.positions.get(&oid).copied()
    }

    pub fn len(&self) -> usize {
        self.positions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }
}

/// Pools (except enzyme complexes) and processes below `root`.
pub fn layout_entities<'a>(tree: &'a ModelTree, root: &Element) -> Vec<&'a Element> {
    let pools = tree
        .descendants(root, Capability::Pool)
        .into_iter()
        .filter(|pool| !tree.parent(pool).is_some_and(|p| p.kind.is_enzyme()));

    pools
        .chain(tree.descendants(root, Capability::Reaction))
        .chain(tree.descendants(root, Capability::Enzyme))
        .chain(tree.descendants(root, Capability::Channel))
        .collect()
}

/// Resolves the coordinates used for annotations.
///
/// # Arguments
/// * `tree` - The model tree
/// * `root` - Model root element
/// * `options` - Export options carrying scene coordinates and scene size
/// * `engine` - Fallback layout, invoked at most once
///
/// # Returns
/// The positions and where they came from
pub fn resolve_positions(
    tree: &ModelTree,
    root: &Element,
    options: &ExportOptions,
    engine: &dyn LayoutEngine,
) -> Positions {
    if !options.scene_items.is_empty() {
        return Positions {
            source: PositionSource::Scene,
            positions: options.scene_items.clone(),
        };
    }

    let entities = layout_entities(tree, root);

    if entities.iter().any(|entity| entity.position().is_some()) {
        return Positions {
            source: PositionSource::Stored,
            positions: normalize(&entities, options.scene_width, options.scene_height),
        };
    }

    debug!("No stored coordinates, computing a layout for {} entities", entities.len());
    Positions {
        source: PositionSource::Computed,
        positions: engine.compute_default_coordinates(tree, &entities),
    }
}

/// Rescales stored coordinates of elements with info into `width` x `height`.
fn normalize(entities: &[&Element], width: f64, height: f64) -> HashMap<ObjId, Position> {
    let placed: Vec<(ObjId, f64, f64)> = entities
        .iter()
        .filter_map(|entity| entity.info.as_ref().map(|info| (entity.oid(), info.x, info.y)))
        .collect();

    let (xmin, xmax) = bounds(placed.iter().map(|(_, x, _)| *x));
    let (ymin, ymax) = bounds(placed.iter().map(|(_, _, y)| *y));

    placed
        .into_iter()
        .map(|(oid, x, y)| {
            let position = Position::new(
                scale(x, xmin, xmax, width),
                scale(y, ymin, ymax, height),
            );
            (oid, position)
        })
        .collect()
}

fn bounds(values: impl Iterator<Item = f64>) -> (f64, f64) {
    values.fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| {
        (lo.min(v), hi.max(v))
    })
}

fn scale(value: f64, min: f64, max: f64, extent: f64) -> f64 {
    if max > min {
        extent * (value - min) / (max - min)
    } else {
        0.0
    }
}

/// Places processes between their inputs and outputs, layer by layer.
///
/// Pools and processes form a directed bipartite graph (substrate to process
/// to product). Strongly connected parts, such as reversible loops, are
/// collapsed so every node gets a longest-path layer. Layers are spread along
/// x, members of a layer along y.
#[derive(Debug, Clone, PartialEq)]
pub struct LayeredLayout {
    pub width: f64,
    pub height: f64,
}

impl Default for LayeredLayout {
    fn default() -> Self {
        Self {
            width: 1000.0,
            height: 800.0,
        }
    }
}

impl LayoutEngine for LayeredLayout {
    fn compute_default_coordinates(
        &self,
        tree: &ModelTree,
        entities: &[&Element],
    ) -> HashMap<ObjId, Position> {
        let mut graph = Graph::<ObjId, (), Directed>::new();
        let mut nodes: HashMap<ObjId, NodeIndex> = HashMap::new();
        for entity in entities {
            nodes.insert(entity.oid(), graph.add_node(entity.oid()));
        }

        for entity in entities.iter().filter(|e| !e.kind.is_pool()) {
            let process = nodes[&entity.oid()];
            for role in [Role::Substrate, Role::EnzymeParent] {
                for pool in tree.neighbors(entity, role) {
                    let pool = tree.resolve_transfer(pool);
                    if let Some(&source) = nodes.get(&pool.oid()) {
                        graph.add_edge(source, process, ());
                    }
                }
            }
            for role in [Role::Product, Role::Complex] {
                for pool in tree.neighbors(entity, role) {
                    let pool = tree.resolve_transfer(pool);
                    if let Some(&target) = nodes.get(&pool.oid()) {
                        graph.add_edge(process, target, ());
                    }
                }
            }
        }

        let layers = longest_path_layers(graph);
        let depth = layers.iter().map(|(_, layer)| *layer).max().unwrap_or(0);

        let mut per_layer: HashMap<usize, Vec<ObjId>> = HashMap::new();
        for (oid, layer) in layers {
            per_layer.entry(layer).or_default().push(oid);
        }

        let mut positions = HashMap::new();
        for (layer, mut members) in per_layer {
            members.sort();
            let x = self.width * layer as f64 / depth.max(1) as f64;
            let slots = members.len() as f64 + 1.0;
            for (slot, oid) in members.into_iter().enumerate() {
                let y = self.height * (slot as f64 + 1.0) / slots;
                positions.insert(oid, Position::new(x, y));
            }
        }

        positions
    }
}

fn longest_path_layers(graph: Graph<ObjId, (), Directed>) -> Vec<(ObjId, usize)> {
    let condensed = condensation(graph, true);
    let order = toposort(&condensed, None).unwrap_or_default();

    let mut layer = vec![0usize; condensed.node_count()];
    for node in order {
        let next = layer[node.index()] + 1;
        for successor in condensed.neighbors_directed(node, Direction::Outgoing) {
            layer[successor.index()] = layer[successor.index()].max(next);
        }
    }

    condensed
        .node_indices()
        .flat_map(|node| {
            let depth = layer[node.index()];
            condensed[node].iter().map(move |oid| (*oid, depth))
        })
        .collect()
}
