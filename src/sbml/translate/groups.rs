//! Groups, assembled once every other phase has recorded its members.

use crate::{
    model::Element,
    sbml::{
        annotations::GroupAnnotation,
        groups::Group,
        ident::{entity_id, prefix_leading_digit},
        translate::context::{notes_of, TranslationContext},
    },
};

/// Collects every registered container that ended up with at least one member.
///
/// Group names follow the id rule for a leading digit, so `2nd` is named
/// `_2nd`.
pub fn translate_groups(ctx: &mut TranslationContext) -> Vec<Group> {
    let populated: Vec<(&Element, Vec<String>)> = ctx
        .groups
        .iter()
        .filter(|(_, members)| !members.is_empty())
        .map(|(group, members)| (group, members.to_vec()))
        .collect();

    let mut groups = Vec::new();
    for (element, members) in populated {
        let Some(compartment) = ctx.compartment_id(element) else {
            ctx.skip(element, "group lies in no translated compartment");
            continue;
        };

        groups.push(Group {
            id: entity_id(element),
            name: prefix_leading_digit(&element.name),
            members,
            annotation: annotation(ctx, element, compartment),
        });
    }

    groups
}

fn annotation(ctx: &TranslationContext, element: &Element, compartment: String) -> GroupAnnotation {
    let mut annotation = match ctx.tree.parent(element) {
        Some(parent) if parent.kind.is_neutral() => {
            let mut annotation = GroupAnnotation::new(compartment, entity_id(parent));
            annotation.group = Some(parent.name.clone());
            annotation
        }
        _ => GroupAnnotation::new(compartment.clone(), compartment),
    };

    if let Some(info) = &element.info {
        if info.width != 0.0 && info.height != 0.0 {
            annotation.x = Some(info.x);
            annotation.y = Some(info.y);
            annotation.width = Some(info.width);
            annotation.height = Some(info.height);
        }
        annotation.bg_color = info.color.clone().filter(|color| !color.is_empty());
        annotation.notes = notes_of(element);
    }

    annotation
}
