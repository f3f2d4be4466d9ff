//! Mass-action reactions.

use sbml::{model::Model, Annotation};

use crate::{
    model::{Capability, Element, ElementKind, ReactionSpec, Role},
    sbml::{
        annotations::ModelAnnotation,
        error::SBMLError,
        ident::{entity_id, sanitize_display_name},
        ratelaw::{add_rate_constant, ParticipantRole},
        translate::context::{notes_of, TranslationContext},
    },
};

/// Translates every reaction below `root`.
///
/// Reactions without substrates or products, or whose first substrate lies in
/// no translated compartment, are skipped with a diagnostic.
///
/// # Errors
/// `SBMLError::SerializeError` if an annotation cannot be serialized
pub fn translate_reactions<'a>(
    ctx: &mut TranslationContext<'a>,
    model: &Model,
    root: &'a Element,
) -> Result<(), SBMLError> {
    for element in ctx.tree.descendants(root, Capability::Reaction) {
        let ElementKind::Reaction(spec) = &element.kind else {
            continue;
        };
        if let Some(id) = translate_reaction(ctx, model, element, spec)? {
            ctx.record_member(element, &id);
        }
    }

    Ok(())
}

/// Mass-action kinetic law `C * kf * S [- C * kb * P]`.
///
/// # Arguments
/// * `compartment` - Id of the compartment the rate is scaled by
/// * `kf` - Id of the forward rate constant
/// * `forward` - Rate term of the substrates
/// * `backward` - Id of the backward rate constant and the rate term of the
///   products, for reversible reactions
pub(crate) fn mass_action_formula(
    compartment: &str,
    kf: &str,
    forward: &str,
    backward: Option<(&str, &str)>,
) -> String {
    let mut formula = format!("{compartment} * {kf} * {forward}");
    if let Some((kb, backward)) = backward {
        formula.push_str(&format!(" - {compartment} * {kb} * {backward}"));
    }
    formula
}

/// Placement annotation of a process, carrying its notes.
pub(crate) fn process_annotation<'a>(
    ctx: &TranslationContext<'a>,
    element: &'a Element,
) -> Option<ModelAnnotation> {
    let notes = notes_of(element);
    match ctx.placement(element) {
        Some(placement) => Some(ModelAnnotation { notes, ..placement }),
        None => notes.map(|notes| ModelAnnotation {
            notes: Some(notes),
            ..ModelAnnotation::new()
        }),
    }
}

fn translate_reaction<'a>(
    ctx: &mut TranslationContext<'a>,
    model: &Model,
    element: &'a Element,
    spec: &ReactionSpec,
) -> Result<Option<String>, SBMLError> {
    let substrates = ctx.tree.neighbors(element, Role::Substrate);
    let products = ctx.tree.neighbors(element, Role::Product);

    let missing: Vec<&str> = [("substrate", substrates.is_empty()), ("product", products.is_empty())]
        .into_iter()
        .filter_map(|(role, empty)| empty.then_some(role))
        .collect();
    if !missing.is_empty() {
        ctx.skip(element, format!("reaction is missing {}", missing.join(" and ")));
        return Ok(None);
    }

    let compartment = substrates
        .first()
        .map(|first| ctx.tree.resolve_transfer(first))
        .and_then(|first| ctx.compartment_id(first));
    let Some(compartment) = compartment else {
        ctx.skip(element, "compartment of the first substrate is not translated");
        return Ok(None);
    };

    let id = entity_id(element);
    let forward = ctx.rate_term(element, Role::Substrate, ParticipantRole::Substrate);
    let backward = ctx.rate_term(element, Role::Product, ParticipantRole::Product);
    let reversible = spec.kb != 0.0;

    let kf = format!("{id}_Kf");
    let kf_units = ctx.units.unit_for_order(model, forward.count - 1);
    add_rate_constant(model, &kf, spec.kf, kf_units);

    let kb = format!("{id}_Kb");
    if reversible {
        let kb_units = ctx.units.unit_for_order(model, backward.count - 1);
        add_rate_constant(model, &kb, spec.kb, kb_units);
    }

    let formula = mass_action_formula(
        &compartment,
        &kf,
        &forward.expression,
        reversible.then_some((kb.as_str(), backward.expression.as_str())),
    );

    let reaction = model.create_reaction(&id);
    reaction.set_name(&sanitize_display_name(&element.name));
    reaction.set_reversible(reversible);
    forward.attach_to(&reaction);
    backward.attach_to(&reaction);
    reaction.create_kinetic_law(&formula);

    if let Some(annotation) = process_annotation(ctx, element) {
        reaction.set_annotation_serde::<ModelAnnotation>(&annotation)?;
    }

    Ok(Some(id))
}
