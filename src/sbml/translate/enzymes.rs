//! Explicit and Michaelis-Menten enzymes.
//!
//! An explicit enzyme `E` with substrates `S`, complex `X` and products `P`
//! becomes two plain reactions:
//!
//! ```text
//! ComplexFormation:  E + S <-> X        E_k1 * C * E * S - E_k2 * C * X
//! ProductFormation:  X      -> P + E    E_k3 * C * X
//! ```
//!
//! Each stage checks its own roles, so a broken complex formation does not
//! keep a well-formed product formation out of the document. A
//! Michaelis-Menten enzyme becomes a single reaction with a saturating rate
//! law.

use std::fmt::Display;

use sbml::{model::Model, Annotation};

use crate::{
    model::{Capability, Element, ElementKind, EnzymeSpec, MmEnzymeSpec, Role},
    sbml::{
        annotations::EnzymaticReaction,
        error::SBMLError,
        ident::{entity_id, sanitize_display_name},
        ratelaw::{add_rate_constant, synthesize, ParticipantRole},
        translate::context::{notes_of, TranslationContext},
    },
};

/// One of the two reactions an explicit enzyme is split into.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    ComplexFormation,
    ProductFormation,
}

impl Stage {
    fn number(&self) -> u8 {
        match self {
            Stage::ComplexFormation => 1,
            Stage::ProductFormation => 2,
        }
    }

    /// Suffix appended to the enzyme id to form the reaction id.
    fn suffix(&self) -> &'static str {
        match self {
            Stage::ComplexFormation => "Complex_formation_",
            Stage::ProductFormation => "Product_formation_",
        }
    }
}

impl Display for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Stage::ComplexFormation => write!(f, "complex formation"),
            Stage::ProductFormation => write!(f, "product formation"),
        }
    }
}

/// Roles of an explicit enzyme, read once and shared by both stages.
struct EnzymeRoles<'a> {
    parents: Vec<&'a Element>,
    substrates: Vec<&'a Element>,
    complexes: Vec<&'a Element>,
    products: Vec<&'a Element>,
}

impl EnzymeRoles<'_> {
    /// Every problem that keeps `stage` from being written.
    fn problems(&self, stage: Stage) -> Vec<&'static str> {
        let mut problems = Vec::new();
        match self.parents.len() {
            0 => problems.push("enzyme parent missing"),
            1 => {}
            _ => problems.push("multiple enzyme parents present"),
        }
        match stage {
            Stage::ComplexFormation => {
                if self.substrates.is_empty() {
                    problems.push("substrate missing");
                }
                if self.complexes.is_empty() {
                    problems.push("complex missing");
                }
            }
            Stage::ProductFormation => {
                if self.complexes.is_empty() {
                    problems.push("complex missing");
                }
                if self.products.is_empty() {
                    problems.push("product missing");
                }
            }
        }
        problems
    }
}

/// Translates every explicit and Michaelis-Menten enzyme below `root`.
///
/// # Errors
/// `SBMLError::SerializeError` if an annotation cannot be serialized
pub fn translate_enzymes<'a>(
    ctx: &mut TranslationContext<'a>,
    model: &Model,
    root: &'a Element,
) -> Result<(), SBMLError> {
    for enzyme in ctx.tree.descendants(root, Capability::Enzyme) {
        let Some(compartment) = ctx.compartment_id(enzyme) else {
            ctx.skip(enzyme, "enzyme lies in no translated compartment");
            continue;
        };

        match &enzyme.kind {
            ElementKind::Enzyme(spec) => {
                for stage in [Stage::ComplexFormation, Stage::ProductFormation] {
                    translate_stage(ctx, model, enzyme, spec, stage, &compartment)?;
                }
            }
            ElementKind::MmEnzyme(spec) => {
                translate_mm_enzyme(ctx, model, enzyme, spec, &compartment)?
            }
            _ => {}
        }
    }

    Ok(())
}

/// Kinetic law of complex formation, `k1 * C * E * S - k2 * C * X`.
pub(crate) fn complex_formation_formula(
    compartment: &str,
    k1: &str,
    reactants: &str,
    k2: &str,
    complexes: &str,
) -> String {
    format!("{k1} * {compartment} * {reactants} - {k2} * {compartment} * {complexes}")
}

/// Kinetic law of product formation, `k3 * C * X`.
pub(crate) fn product_formation_formula(compartment: &str, k3: &str, complexes: &str) -> String {
    format!("{k3} * {compartment} * {complexes}")
}

/// Saturating kinetic law of a Michaelis-Menten enzyme.
///
/// With more than one substrate, `Km` is raised to the substrate count.
pub(crate) fn michaelis_menten_formula(
    compartment: &str,
    kcat: &str,
    km: &str,
    substrates: &str,
    substrate_count: usize,
    modifiers: &str,
) -> String {
    let km = if substrate_count > 1 {
        format!("{km}^{substrate_count}")
    } else {
        km.to_string()
    };
    let numerator = if modifiers.is_empty() {
        format!("{compartment} * {kcat} * {substrates}")
    } else {
        format!("{compartment} * {kcat} * {substrates} * {modifiers}")
    };
    format!("{numerator} / ({km} + {substrates})")
}

fn translate_stage<'a>(
    ctx: &mut TranslationContext<'a>,
    model: &Model,
    enzyme: &'a Element,
    spec: &EnzymeSpec,
    stage: Stage,
    compartment: &str,
) -> Result<(), SBMLError> {
    let roles = EnzymeRoles {
        parents: ctx.tree.neighbors(enzyme, Role::EnzymeParent),
        substrates: ctx.tree.neighbors(enzyme, Role::Substrate),
        complexes: ctx.tree.neighbors(enzyme, Role::Complex),
        products: ctx.tree.neighbors(enzyme, Role::Product),
    };

    let problems = roles.problems(stage);
    if !problems.is_empty() {
        ctx.skip(
            enzyme,
            format!("{stage} is not written: {}", problems.join(", ")),
        );
        return Ok(());
    }

    let enzyme_id = entity_id(enzyme);
    let parent = entity_id(ctx.tree.resolve_transfer(roles.parents[0]));
    let constants = &ctx.constant_species;

    let (reactants, products) = match stage {
        Stage::ComplexFormation => {
            let reactants: Vec<&Element> = roles
                .parents
                .iter()
                .chain(&roles.substrates)
                .copied()
                .collect();
            (
                synthesize(ctx.tree, &reactants, ParticipantRole::Substrate, constants),
                synthesize(ctx.tree, &roles.complexes, ParticipantRole::Product, constants),
            )
        }
        Stage::ProductFormation => {
            let products: Vec<&Element> = roles
                .products
                .iter()
                .chain(&roles.parents)
                .copied()
                .collect();
            (
                synthesize(ctx.tree, &roles.complexes, ParticipantRole::Substrate, constants),
                synthesize(ctx.tree, &products, ParticipantRole::Product, constants),
            )
        }
    };

    let mut annotation = EnzymaticReaction::new().placed(ctx.placement(enzyme).as_ref());
    annotation.enzyme = vec![parent.clone()];
    annotation.group_name = Some(enzyme_id.clone());
    annotation.stage = Some(stage.number());
    annotation.notes = notes_of(enzyme);

    let (formula, reversible) = match stage {
        Stage::ComplexFormation => {
            annotation.substrates = ctx
                .rate_term(enzyme, Role::Substrate, ParticipantRole::Substrate)
                .species();
            annotation.product = products.species();

            let (k1, k2) = (format!("{enzyme_id}_k1"), format!("{enzyme_id}_k2"));
            let k1_units = ctx.units.unit_for_order(model, reactants.count - 1);
            let k2_units = ctx.units.unit_for_order(model, products.count - 1);
            add_rate_constant(model, &k1, spec.k1, k1_units);
            add_rate_constant(model, &k2, spec.k2, k2_units);
            (
                complex_formation_formula(
                    compartment,
                    &k1,
                    &reactants.expression,
                    &k2,
                    &products.expression,
                ),
                true,
            )
        }
        Stage::ProductFormation => {
            annotation.complex = reactants.species();
            annotation.product = ctx
                .rate_term(enzyme, Role::Product, ParticipantRole::Product)
                .species();

            let k3 = format!("{enzyme_id}_k3");
            let k3_units = ctx.units.unit_for_order(model, reactants.count - 1);
            add_rate_constant(model, &k3, spec.k3, k3_units);
            (
                product_formation_formula(compartment, &k3, &reactants.expression),
                false,
            )
        }
    };

    let reaction = model.create_reaction(&format!("{enzyme_id}{}", stage.suffix()));
    reaction.set_name(&sanitize_display_name(&enzyme.name));
    reaction.set_reversible(reversible);
    reactants.attach_to(&reaction);
    products.attach_to(&reaction);
    reaction.create_kinetic_law(&formula);
    reaction.set_annotation_serde::<EnzymaticReaction>(&annotation)?;

    // Only complex formation places the parent pool in the enzyme's group.
    if stage == Stage::ComplexFormation {
        ctx.record_member(enzyme, &parent);
    }
    Ok(())
}

fn translate_mm_enzyme<'a>(
    ctx: &mut TranslationContext<'a>,
    model: &Model,
    enzyme: &'a Element,
    spec: &MmEnzymeSpec,
    compartment: &str,
) -> Result<(), SBMLError> {
    let substrates = ctx.rate_term(enzyme, Role::Substrate, ParticipantRole::Substrate);
    let products = ctx.rate_term(enzyme, Role::Product, ParticipantRole::Product);
    let modifiers = ctx.rate_term(enzyme, Role::Modifier, ParticipantRole::Modifier);

    let missing: Vec<&str> = [("substrate", substrates.is_empty()), ("product", products.is_empty())]
        .into_iter()
        .filter_map(|(role, empty)| empty.then_some(role))
        .collect();
    if !missing.is_empty() {
        ctx.skip(enzyme, format!("enzyme is missing {}", missing.join(" and ")));
        return Ok(());
    }

    if substrates.count > 1 {
        ctx.advise(
            enzyme,
            format!(
                "{} substrates, Km is raised to the power of the substrate count \
                 assuming its value already accounts for the order",
                substrates.count
            ),
        );
    }

    let id = entity_id(enzyme);
    let (km, kcat) = (format!("{id}_Km"), format!("{id}_kcat"));
    let km_units = ctx.units.unit_for_concentration(model);
    let kcat_units = ctx.units.unit_for_order(model, 0);
    add_rate_constant(model, &km, spec.km, km_units);
    add_rate_constant(model, &kcat, spec.kcat, kcat_units);

    let formula = michaelis_menten_formula(
        compartment,
        &kcat,
        &km,
        &substrates.expression,
        substrates.count,
        &modifiers.expression,
    );

    let reaction = model.create_reaction(&id);
    reaction.set_name(&sanitize_display_name(&enzyme.name));
    reaction.set_reversible(true);
    substrates.attach_to(&reaction);
    products.attach_to(&reaction);
    modifiers.attach_to(&reaction);
    reaction.create_kinetic_law(&formula);

    let notes = notes_of(enzyme);
    if let Some(placement) = ctx.placement(enzyme) {
        let mut annotation = EnzymaticReaction::new().placed(Some(&placement));
        annotation.notes = notes;
        reaction.set_annotation_serde::<EnzymaticReaction>(&annotation)?;
    } else if let Some(notes) = notes {
        let annotation = EnzymaticReaction {
            notes: Some(notes),
            ..EnzymaticReaction::new()
        };
        reaction.set_annotation_serde::<EnzymaticReaction>(&annotation)?;
    }

    ctx.record_member(enzyme, &id);
    Ok(())
}
