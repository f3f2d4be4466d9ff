//! Mass-action rate terms built from participant multisets.
//!
//! A reaction lists its participants with repetition: `[A, A, B]` means two
//! molecules of `A` and one of `B`. Synthesis groups the list by identity in
//! first-seen order and produces both the stoichiometric participant records
//! and the multiplicative term `A^2 * B` used in the kinetic law.

use std::collections::HashSet;

use itertools::Itertools;
use sbml::{model::Model, prelude::Reaction as SBMLReaction};

use crate::{
    model::{Element, ModelTree},
    sbml::ident::entity_id,
};

/// How the participants take part in the reaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParticipantRole {
    Substrate,
    Product,
    Modifier,
}

/// A reactant or product with its stoichiometry.
#[derive(Debug, Clone, PartialEq)]
pub struct SpeciesRecord {
    pub species: String,
    pub stoichiometry: f64,
    /// Whether the referenced species is a constant boundary species.
    pub constant: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ParticipantRecord {
    Species(SpeciesRecord),
    /// Species that influences the rate without being consumed.
    Modifier(String),
}

/// Result of [`synthesize`].
#[derive(Debug, Clone, PartialEq)]
pub struct RateTerm {
    pub role: ParticipantRole,
    /// Length of the participant multiset.
    pub count: usize,
    /// Product of participant ids, empty when there are no participants.
    pub expression: String,
    pub records: Vec<ParticipantRecord>,
}

impl RateTerm {
    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    /// Distinct participant ids in first-seen order.
    pub fn species(&self) -> Vec<String> {
        self.records
            .iter()
            .map(|record| match record {
                ParticipantRecord::Species(record) => record.species.clone(),
                ParticipantRecord::Modifier(species) => species.clone(),
            })
            .collect()
    }

    /// Adds the participant records to the matching list of the reaction.
    pub fn attach_to(&self, reaction: &SBMLReaction) {
        for record in self.records.iter() {
            match (self.role, record) {
                (ParticipantRole::Substrate, ParticipantRecord::Species(record)) => {
                    let reactant = reaction.create_reactant(&record.species, record.stoichiometry);
                    reactant.set_constant(record.constant);
                }
                (ParticipantRole::Product, ParticipantRecord::Species(record)) => {
                    let product = reaction.create_product(&record.species, record.stoichiometry);
                    product.set_constant(record.constant);
                }
                (ParticipantRole::Modifier, ParticipantRecord::Species(record)) => {
                    reaction.create_modifier(&record.species);
                }
                (_, ParticipantRecord::Modifier(species)) => {
                    reaction.create_modifier(species);
                }
            }
        }
    }
}

/// Groups participants by identity and builds their rate term.
///
/// Transfer placeholder pools are replaced by the pool they mirror before
/// grouping, so `A` and `A_xfer_dend` count as the same participant.
///
/// # Arguments
/// * `tree` - Model tree used to resolve transfer placeholders
/// * `participants` - Participant multiset in stored order
/// * `role` - Role of the participants in the reaction
/// * `constant_species` - Ids of buffered species that no function drives
///
/// # Returns
/// The participant count, the multiplicative expression and one record per
/// distinct participant
pub fn synthesize(
    tree: &ModelTree,
    participants: &[&Element],
    role: ParticipantRole,
    constant_species: &HashSet<String>,
) -> RateTerm {
    let ids: Vec<String> = participants
        .iter()
        .map(|participant| entity_id(tree.resolve_transfer(participant)))
        .collect();

    let mut factors = Vec::new();
    let mut records = Vec::new();

    for id in ids.iter().unique() {
        let occurrences = ids.iter().filter(|other| *other == id).count();

        factors.push(if occurrences > 1 {
            format!("{id}^{occurrences}")
        } else {
            id.clone()
        });

        records.push(match role {
            ParticipantRole::Modifier => ParticipantRecord::Modifier(id.clone()),
            ParticipantRole::Substrate | ParticipantRole::Product => {
                ParticipantRecord::Species(SpeciesRecord {
                    species: id.clone(),
                    stoichiometry: occurrences as f64,
                    constant: constant_species.contains(id),
                })
            }
        });
    }

    RateTerm {
        role,
        count: ids.len(),
        expression: factors.join(" * "),
        records,
    }
}

/// Adds a constant model-level parameter holding a rate constant.
///
/// Rate constants are named after the entity they belong to, e.g.
/// `R_7_0__Kf`, so parameters of different reactions never collide.
pub fn add_rate_constant(model: &Model, id: &str, value: f64, units: String) {
    let parameter = model.create_parameter(id);
    parameter.set_name(id);
    parameter.set_value(value);
    parameter.set_units(units);
    parameter.set_constant(true);
}
