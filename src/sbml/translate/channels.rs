//! Concentration channels to flux reactions.

use log::debug;
use sbml::{model::Model, Annotation};

use crate::{
    model::{Capability, Element, ElementKind, Role},
    sbml::{
        annotations::ConcChannel,
        error::SBMLError,
        ident::{entity_id, sanitize_display_name},
        ratelaw::{add_rate_constant, ParticipantRole},
        translate::context::{notes_of, TranslationContext},
    },
};

/// Translates every channel below `root`.
///
/// Channels without input or output pools are left out without a diagnostic.
///
/// # Errors
/// `SBMLError::SerializeError` if an annotation cannot be serialized
pub fn translate_channels<'a>(
    ctx: &mut TranslationContext<'a>,
    model: &Model,
    root: &'a Element,
) -> Result<(), SBMLError> {
    for channel in ctx.tree.descendants(root, Capability::Channel) {
        let ElementKind::Channel(spec) = &channel.kind else {
            continue;
        };

        let inputs = ctx.rate_term(channel, Role::Substrate, ParticipantRole::Substrate);
        let outputs = ctx.rate_term(channel, Role::Product, ParticipantRole::Product);
        if inputs.is_empty() || outputs.is_empty() {
            debug!("Channel {} has no inputs or outputs", ctx.tree.path(channel));
            continue;
        }

        let Some(compartment) = ctx.compartment_id(channel) else {
            ctx.skip(channel, "channel lies in no translated compartment");
            continue;
        };

        let id = entity_id(channel);
        let permeability = format!("{id}_Permeability");
        let units = ctx.units.unit_for_permeability(model);
        add_rate_constant(model, &permeability, spec.permeability, units);

        let modifiers = ctx.rate_term(channel, Role::Modifier, ParticipantRole::Modifier);
        let formula = flux_formula(
            &compartment,
            &permeability,
            &modifiers.expression,
            &inputs.expression,
            &outputs.expression,
        );

        let position = ctx
            .placement(channel)
            .and_then(|placement| placement.x_cord.zip(placement.y_cord));
        let mut annotation = ConcChannel::new(spec.permeability, position);
        annotation.notes = notes_of(channel);

        let reaction = model.create_reaction(&id);
        reaction.set_name(&sanitize_display_name(&channel.name));
        reaction.set_reversible(true);
        inputs.attach_to(&reaction);
        outputs.attach_to(&reaction);
        modifiers.attach_to(&reaction);
        reaction.create_kinetic_law(&formula);
        reaction.set_annotation_serde::<ConcChannel>(&annotation)?;

        ctx.record_member(channel, &id);
    }

    Ok(())
}

/// Flux `C * P [* gate] * (in - out)` through a channel.
fn flux_formula(
    compartment: &str,
    permeability: &str,
    gate: &str,
    inputs: &str,
    outputs: &str,
) -> String {
    if gate.is_empty() {
        format!("{compartment} * {permeability} * ({inputs} - {outputs})")
    } else {
        format!("{compartment} * {permeability} * {gate} * ({inputs} - {outputs})")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_flux_formula_without_gate() {
        assert_eq!(
            flux_formula("dend_2_0_", "chan_9_0__Permeability", "", "Ca_3_0_", "Ca_5_0_"),
            "dend_2_0_ * chan_9_0__Permeability * (Ca_3_0_ - Ca_5_0_)"
        );
    }

    #[test]
    fn test_flux_formula_with_gate() {
        assert_eq!(
            flux_formula("dend_2_0_", "chan_9_0__Permeability", "G_6_0_", "Ca_3_0_", "Ca_5_0_"),
            "dend_2_0_ * chan_9_0__Permeability * G_6_0_ * (Ca_3_0_ - Ca_5_0_)"
        );
    }
}
