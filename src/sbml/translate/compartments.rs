//! Compartments, translated before every other entity kind.

use log::debug;
use sbml::{model::Model, Annotation};

use crate::{
    model::{Capability, CompartmentSpec, Element, ElementKind, Mesh},
    sbml::{
        annotations::CompartmentAnnotation,
        error::SBMLError,
        ident::{entity_id, sanitize_id},
        translate::context::{notes_of, TranslationContext},
        units::{AREA, LENGTH, VOLUME},
    },
};

/// Cubic metres to litres.
const LITRES_PER_CUBIC_METRE: f64 = 1e3;

/// Translates every compartment below `root` in tree order.
///
/// Groups inside each compartment are registered here, before any member is
/// known, so later phases can append to them.
///
/// # Errors
/// * `SBMLError::NoCompartment` if the model has no compartment
/// * `SBMLError::UnresolvedSurround` if an endo compartment precedes its surround
/// * `SBMLError::SerializeError` if an annotation cannot be serialized
pub fn translate_compartments<'a>(
    ctx: &mut TranslationContext<'a>,
    model: &Model,
    root: &'a Element,
) -> Result<(), SBMLError> {
    let compartments = ctx.tree.descendants(root, Capability::Compartment);
    if compartments.is_empty() {
        return Err(SBMLError::NoCompartment(ctx.tree.path(root)));
    }

    for element in compartments {
        let ElementKind::Compartment(spec) = &element.kind else {
            continue;
        };

        let id = translate_compartment(ctx, model, element, spec)?;
        ctx.compartments.insert(element.oid(), id);

        for group in ctx.tree.descendants(element, Capability::Neutral) {
            ctx.groups.register(group);
        }
    }

    Ok(())
}

/// Size of the compartment in litres and its annotation.
///
/// A cylinder is written as one of its voxels, so its volume is divided by the
/// number of diffusion compartments.
fn geometry(
    ctx: &TranslationContext,
    element: &Element,
    spec: &CompartmentSpec,
) -> Result<(f64, CompartmentAnnotation), SBMLError> {
    let mut annotation = CompartmentAnnotation::new(spec.mesh.class_name(), spec.is_membrane_bound);

    let size = match &spec.mesh {
        Mesh::Cylinder {
            total_length,
            diff_length,
            num_diff_compts,
        } => {
            annotation.tot_length = Some(*total_length);
            annotation.diff_length = Some(*diff_length);
            spec.volume / f64::from((*num_diff_compts).max(1)) * LITRES_PER_CUBIC_METRE
        }
        Mesh::Endo { surround } => {
            let surround_id = ctx.compartments.get(surround).cloned().ok_or_else(|| {
                SBMLError::UnresolvedSurround {
                    compartment: ctx.tree.path(element),
                    surround: ctx
                        .tree
                        .get(*surround)
                        .map(|s| ctx.tree.path(s))
                        .unwrap_or_else(|| surround.to_string()),
                }
            })?;
            annotation.surround = Some(surround_id);
            spec.volume * LITRES_PER_CUBIC_METRE
        }
        Mesh::Cube | Mesh::Neuro => spec.volume * LITRES_PER_CUBIC_METRE,
    };

    annotation.notes = notes_of(element);
    Ok((size, annotation))
}

fn translate_compartment(
    ctx: &TranslationContext,
    model: &Model,
    element: &Element,
    spec: &CompartmentSpec,
) -> Result<String, SBMLError> {
    let id = entity_id(element);
    let (size, annotation) = geometry(ctx, element, spec)?;
    debug!("Compartment {id} with size {size}");

    let units = match spec.num_dimensions {
        1 => LENGTH,
        2 => AREA,
        _ => VOLUME,
    };

    let compartment = model.create_compartment(&id);
    compartment.set_name(&sanitize_id(&element.name));
    compartment.set_size(size);
    compartment.set_spatial_dimensions(spec.num_dimensions.into());
    compartment.set_unit(units.to_string());
    compartment.set_constant(true);
    if let Some(surround) = &annotation.surround {
        compartment.set_outside(surround);
    }
    compartment.set_annotation_serde::<CompartmentAnnotation>(&annotation)?;

    Ok(id)
}
