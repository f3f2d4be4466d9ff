//! Pools to species.

use std::collections::HashSet;

use sbml::{model::Model, Annotation};

use crate::{
    model::{Capability, Element, ElementKind, ObjId, PoolSpec, Role},
    sbml::{
        annotations::ModelAnnotation,
        error::SBMLError,
        ident::{entity_id, sanitize_display_name},
        translate::context::{notes_of, TranslationContext},
        units::SUBSTANCE,
    },
};

/// Vertical offset of an enzyme complex below its enzyme.
const COMPLEX_OFFSET: f64 = 10.0;

/// Translates every pool below `root`, except transfer placeholders.
///
/// Buffered pools are boundary species. They stay constant unless a function
/// with live inputs drives them; constant ones are remembered so reactions can
/// flag their participant records.
///
/// # Errors
/// * `SBMLError::MissingCompartment` if a pool has no translated compartment
/// * `SBMLError::SerializeError` if an annotation cannot be serialized
pub fn translate_species<'a>(
    ctx: &mut TranslationContext<'a>,
    model: &Model,
    root: &'a Element,
) -> Result<(), SBMLError> {
    let driven = driven_pools(ctx, root);

    for pool in ctx.tree.descendants(root, Capability::Pool) {
        let ElementKind::Pool(spec) = &pool.kind else {
            continue;
        };
        if pool.is_transfer_placeholder() {
            continue;
        }

        let compartment = ctx
            .compartment_id(pool)
            .ok_or_else(|| SBMLError::MissingCompartment(ctx.tree.path(pool)))?;
        let id = entity_id(pool);

        let (boundary_condition, constant) = match (spec.buffered, driven.contains(&pool.oid())) {
            (true, true) => (true, false),
            (true, false) => (true, true),
            (false, _) => (false, false),
        };
        if constant {
            ctx.constant_species.insert(id.clone());
        }

        let species = model.create_species(&id);
        species.set_name(&display_name(ctx, pool));
        species.set_compartment(&compartment);
        species.set_initial_concentration(spec.conc_init);
        species.set_boundary_condition(boundary_condition);
        species.set_constant(constant);
        species.set_has_only_substance_units(false);
        species.set_units(SUBSTANCE.to_string());
        species.set_annotation_serde::<ModelAnnotation>(&annotation(ctx, pool, spec))?;

        ctx.species.insert(id.clone());
        ctx.record_member(pool, &id);
    }

    Ok(())
}

/// Pools that are the target of a function with at least one input.
fn driven_pools(ctx: &TranslationContext, root: &Element) -> HashSet<ObjId> {
    ctx.tree
        .descendants(root, Capability::Function)
        .into_iter()
        .filter(|function| !ctx.tree.neighbors(function, Role::Input).is_empty())
        .flat_map(|function| {
            let outputs = ctx.tree.neighbors(function, Role::FunctionOutput);
            let parent = ctx.tree.parent(function).filter(|p| p.kind.is_pool());
            outputs
                .into_iter()
                .chain(parent)
                .map(|pool| pool.oid())
                .collect::<Vec<_>>()
        })
        .collect()
}

/// The enzyme whose complex this pool is.
fn complex_of<'a>(ctx: &TranslationContext<'a>, pool: &Element) -> Option<&'a Element> {
    ctx.tree.parent(pool).filter(|parent| parent.kind.is_enzyme())
}

fn display_name(ctx: &TranslationContext, pool: &Element) -> String {
    match complex_of(ctx, pool) {
        Some(enzyme) => {
            let enzyme_pool = ctx
                .tree
                .parent(enzyme)
                .map(|p| p.name.as_str())
                .unwrap_or_default();
            sanitize_display_name(&format!("{enzyme_pool}_{}_{}", enzyme.name, pool.name))
        }
        None => sanitize_display_name(&pool.name),
    }
}

fn annotation<'a>(
    ctx: &TranslationContext<'a>,
    pool: &'a Element,
    spec: &PoolSpec,
) -> ModelAnnotation {
    let annotation = match complex_of(ctx, pool) {
        Some(enzyme) if pool.info.is_none() => ctx
            .position(enzyme)
            .map(|(x, y)| ModelAnnotation::new().placed((x, y + COMPLEX_OFFSET), None)),
        _ => ctx.placement(pool),
    }
    .unwrap_or_else(ModelAnnotation::new);

    let (diff_constant, motor_constant) = match pool.info {
        Some(_) => (spec.diff_const, spec.motor_const),
        None => (0.0, 0.0),
    };

    ModelAnnotation {
        diff_constant: Some(diff_constant),
        motor_constant: Some(motor_constant),
        notes: notes_of(pool),
        ..annotation
    }
}
