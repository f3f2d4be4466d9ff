use approx::assert_relative_eq;
use chemsbml::prelude::*;
use pretty_assertions::assert_eq;
use quick_xml::{events::Event, Reader};
use tempfile::tempdir;

fn root() -> Element {
    ElementBuilder::default()
        .id(1u32)
        .name("model")
        .kind(ElementKind::Neutral)
        .build()
        .unwrap()
}

fn compartment(id: u32, name: &str, parent: u32, mesh: Mesh) -> Element {
    ElementBuilder::default()
        .id(id)
        .name(name)
        .parent(parent)
        .kind(ElementKind::Compartment(CompartmentSpec {
            volume: 1e-15,
            num_dimensions: 3,
            is_membrane_bound: false,
            mesh,
        }))
        .build()
        .unwrap()
}

fn pool(id: u32, name: &str, parent: u32) -> Element {
    ElementBuilder::default()
        .id(id)
        .name(name)
        .parent(parent)
        .kind(ElementKind::Pool(PoolSpec {
            conc_init: 1.0,
            ..Default::default()
        }))
        .build()
        .unwrap()
}

fn buffered_pool(id: u32, name: &str, parent: u32) -> Element {
    ElementBuilder::default()
        .id(id)
        .name(name)
        .parent(parent)
        .kind(ElementKind::Pool(PoolSpec {
            conc_init: 2.0,
            buffered: true,
            ..Default::default()
        }))
        .build()
        .unwrap()
}

fn group(id: u32, name: &str, parent: u32) -> Element {
    ElementBuilder::default()
        .id(id)
        .name(name)
        .parent(parent)
        .kind(ElementKind::Neutral)
        .build()
        .unwrap()
}

fn export(elements: Vec<Element>) -> Translation {
    let tree = ModelTree::new(elements).unwrap();
    to_sbml(&tree, "/model", "model", &ExportOptions::default()).unwrap()
}

fn xml(translation: &Translation) -> String {
    translation.to_xml_string().unwrap()
}

/// Value of `name` on the first `tag` element whose `key` attribute is `value`.
fn attribute(xml: &str, tag: &str, (key, value): (&str, &str), name: &str) -> Option<String> {
    let mut reader = Reader::from_str(xml);
    loop {
        match reader.read_event().unwrap() {
            Event::Start(element) | Event::Empty(element)
                if element.name().as_ref() == tag.as_bytes() =>
            {
                let read = |attr: &str| {
                    element
                        .try_get_attribute(attr)
                        .unwrap()
                        .map(|a| a.unescape_value().unwrap().into_owned())
                };
                if read(key).as_deref() == Some(value) {
                    return read(name);
                }
            }
            Event::Eof => return None,
            _ => {}
        }
    }
}

fn parameter_ids(translation: &Translation) -> Vec<String> {
    let model = translation.document.model().unwrap();
    model
        .list_of_parameters()
        .iter()
        .map(|parameter| parameter.id())
        .collect()
}

fn skipped(translation: &Translation) -> Vec<&Diagnostic> {
    translation
        .diagnostics
        .iter()
        .filter(|d| d.severity == DiagnosticSeverity::Skipped)
        .collect()
}

#[test]
fn test_first_order_reaction() {
    let reaction = ElementBuilder::default()
        .id(5u32)
        .name("R")
        .parent(2u32)
        .kind(ElementKind::Reaction(ReactionSpec { kf: 0.1, kb: 0.0 }))
        .neighbor(Role::Substrate, 3u32)
        .neighbor(Role::Product, 4u32)
        .build()
        .unwrap();
    let translation = export(vec![
        root(),
        compartment(2, "kinetics", 1, Mesh::Cube),
        pool(3, "A", 2),
        pool(4, "B", 2),
        reaction,
    ]);
    let model = translation.document.model().unwrap();

    let compartments = model.list_of_compartments();
    assert_eq!(compartments.iter().count(), 1);
    let size = compartments.iter().next().unwrap().size().unwrap();
    assert_relative_eq!(size, 1e-12, max_relative = 1e-9);
    assert_eq!(model.list_of_species().iter().count(), 2);

    let reactions = model.list_of_reactions();
    let reaction = reactions.iter().next().unwrap();
    assert_eq!(reaction.id(), "R_5_0_");
    assert_eq!(reaction.reversible(), Some(false));

    let formula = reaction.kinetic_law().unwrap().formula();
    assert!(formula.contains("R_5_0__Kf"), "{formula}");
    assert!(formula.contains("kinetics_2_0_"), "{formula}");
    assert_eq!(parameter_ids(&translation), vec!["R_5_0__Kf".to_string()]);

    let reactants: Vec<String> = reaction
        .reactants()
        .borrow()
        .iter()
        .map(|reference| reference.species())
        .collect();
    assert_eq!(reactants, vec!["A_3_0_".to_string()]);

    let xml = xml(&translation);
    assert_eq!(
        attribute(&xml, "parameter", ("id", "R_5_0__Kf"), "units").as_deref(),
        Some("per_second")
    );
    assert!(translation.diagnostics.is_empty());
    assert!(translation.validate().unwrap().is_valid);
}

#[test]
fn test_reversible_reaction_with_repeated_substrate() {
    let reaction = ElementBuilder::default()
        .id(5u32)
        .name("dimerize")
        .parent(2u32)
        .kind(ElementKind::Reaction(ReactionSpec { kf: 1.0, kb: 0.5 }))
        .neighbor(Role::Substrate, 3u32)
        .neighbor(Role::Substrate, 3u32)
        .neighbor(Role::Product, 4u32)
        .build()
        .unwrap();
    let translation = export(vec![
        root(),
        compartment(2, "kinetics", 1, Mesh::Cube),
        pool(3, "A", 2),
        pool(4, "A2", 2),
        reaction,
    ]);
    let model = translation.document.model().unwrap();
    let reactions = model.list_of_reactions();
    let reaction = reactions.iter().next().unwrap();

    assert_eq!(reaction.reversible(), Some(true));
    let formula = reaction.kinetic_law().unwrap().formula();
    assert!(formula.contains("dimerize_5_0__Kb"), "{formula}");

    let stoichiometries: Vec<f64> = reaction
        .reactants()
        .borrow()
        .iter()
        .map(|reference| reference.stoichiometry())
        .collect();
    assert_eq!(stoichiometries, vec![2.0]);

    let xml = xml(&translation);
    assert_eq!(
        attribute(&xml, "parameter", ("id", "dimerize_5_0__Kf"), "units").as_deref(),
        Some("litre_per_mmole_per_second")
    );
    assert_eq!(
        attribute(&xml, "parameter", ("id", "dimerize_5_0__Kb"), "units").as_deref(),
        Some("per_second")
    );
    assert!(translation.validate().unwrap().is_valid);
}

#[test]
fn test_reaction_missing_product_is_skipped() {
    let reaction = ElementBuilder::default()
        .id(5u32)
        .name("R")
        .parent(2u32)
        .kind(ElementKind::Reaction(ReactionSpec { kf: 0.1, kb: 0.0 }))
        .neighbor(Role::Substrate, 3u32)
        .build()
        .unwrap();
    let tree = ModelTree::new(vec![
        root(),
        compartment(2, "kinetics", 1, Mesh::Cube),
        pool(3, "A", 2),
        reaction,
    ])
    .unwrap();

    let dir = tempdir().unwrap();
    let outcome = write_sbml(
        &tree,
        "/model",
        dir.path().join("model.xml"),
        &ExportOptions::default(),
    )
    .unwrap();

    assert_eq!(outcome.path, dir.path().join("model.xml"));
    assert!(outcome.path.exists());
    assert_eq!(outcome.diagnostics.len(), 1);
    assert_eq!(outcome.diagnostics[0].entity, "/model/kinetics/R");
    assert_eq!(outcome.diagnostics[0].message, "reaction is missing product");

    let xml = std::fs::read_to_string(&outcome.path).unwrap();
    assert!(xml.contains(r#"id="A_3_0_""#));
    assert!(!xml.contains("<reaction "));
    assert!(xml.contains(r#"substanceUnits="substance""#));
}

#[test]
fn test_mm_enzyme_with_second_order_substrate() {
    let enzyme = ElementBuilder::default()
        .id(6u32)
        .name("kinase")
        .parent(5u32)
        .kind(ElementKind::MmEnzyme(MmEnzymeSpec { km: 0.01, kcat: 4.0 }))
        .neighbor(Role::Substrate, 3u32)
        .neighbor(Role::Substrate, 3u32)
        .neighbor(Role::Product, 4u32)
        .neighbor(Role::Modifier, 5u32)
        .build()
        .unwrap();
    let translation = export(vec![
        root(),
        compartment(2, "kinetics", 1, Mesh::Cube),
        pool(3, "S1", 2),
        pool(4, "P", 2),
        pool(5, "E", 2),
        enzyme,
    ]);
    let model = translation.document.model().unwrap();
    let reactions = model.list_of_reactions();
    let reaction = reactions.iter().next().unwrap();

    assert_eq!(reaction.id(), "kinase_6_0_");
    let formula = reaction.kinetic_law().unwrap().formula();
    assert!(formula.contains("kinase_6_0__kcat"), "{formula}");
    assert!(formula.contains("kinase_6_0__Km"), "{formula}");

    let modifiers: Vec<String> = reaction
        .modifiers()
        .borrow()
        .iter()
        .map(|reference| reference.species())
        .collect();
    assert_eq!(modifiers, vec!["E_5_0_".to_string()]);
    assert_eq!(
        parameter_ids(&translation),
        vec!["kinase_6_0__Km".to_string(), "kinase_6_0__kcat".to_string()]
    );

    let advisories: Vec<&Diagnostic> = translation
        .diagnostics
        .iter()
        .filter(|d| d.severity == DiagnosticSeverity::Advisory)
        .collect();
    assert_eq!(advisories.len(), 1);
    assert_eq!(advisories[0].entity, "/model/kinetics/E/kinase");
    assert!(translation.validate().unwrap().is_valid);
}

#[test]
fn test_explicit_enzyme_writes_both_stages() {
    let enzyme = ElementBuilder::default()
        .id(6u32)
        .name("enz")
        .parent(5u32)
        .kind(ElementKind::Enzyme(EnzymeSpec {
            k1: 1.0,
            k2: 4.0,
            k3: 1.0,
        }))
        .neighbor(Role::EnzymeParent, 5u32)
        .neighbor(Role::Substrate, 3u32)
        .neighbor(Role::Complex, 7u32)
        .neighbor(Role::Product, 4u32)
        .build()
        .unwrap();
    let translation = export(vec![
        root(),
        compartment(2, "kinetics", 1, Mesh::Cube),
        pool(3, "S", 2),
        pool(4, "P", 2),
        pool(5, "E", 2),
        enzyme,
        pool(7, "cplx", 6),
    ]);
    let model = translation.document.model().unwrap();

    let complex = model.get_species("cplx_7_0_").unwrap();
    assert_eq!(complex.name().as_deref(), Some("E_enz_cplx"));

    let reactions = model.list_of_reactions();
    let ids: Vec<String> = reactions.iter().map(|r| r.id()).collect();
    assert_eq!(
        ids,
        vec![
            "enz_6_0_Complex_formation_".to_string(),
            "enz_6_0_Product_formation_".to_string()
        ]
    );

    let formation = reactions.iter().next().unwrap();
    assert_eq!(formation.reversible(), Some(true));
    let formula = formation.kinetic_law().unwrap().formula();
    assert!(formula.contains("enz_6_0__k1"), "{formula}");
    assert!(formula.contains("enz_6_0__k2"), "{formula}");

    let release = reactions.iter().nth(1).unwrap();
    assert_eq!(release.reversible(), Some(false));
    assert!(release.kinetic_law().unwrap().formula().contains("enz_6_0__k3"));
    let products: Vec<String> = release
        .products()
        .borrow()
        .iter()
        .map(|reference| reference.species())
        .collect();
    assert_eq!(products, vec!["P_4_0_".to_string(), "E_5_0_".to_string()]);

    let xml = xml(&translation);
    assert!(xml.contains("<moose:groupName>enz_6_0_</moose:groupName>"));
    assert!(translation.validate().unwrap().is_valid);
}

#[test]
fn test_enzyme_stages_are_independent() {
    let enzyme = ElementBuilder::default()
        .id(6u32)
        .name("enz")
        .parent(5u32)
        .kind(ElementKind::Enzyme(EnzymeSpec {
            k1: 1.0,
            k2: 4.0,
            k3: 1.0,
        }))
        .neighbor(Role::EnzymeParent, 5u32)
        .neighbor(Role::Complex, 7u32)
        .neighbor(Role::Product, 4u32)
        .build()
        .unwrap();
    let translation = export(vec![
        root(),
        compartment(2, "kinetics", 1, Mesh::Cube),
        pool(4, "P", 2),
        pool(5, "E", 2),
        enzyme,
        pool(7, "cplx", 6),
    ]);
    let model = translation.document.model().unwrap();

    let ids: Vec<String> = model.list_of_reactions().iter().map(|r| r.id()).collect();
    assert_eq!(ids, vec!["enz_6_0_Product_formation_".to_string()]);
    assert_eq!(parameter_ids(&translation), vec!["enz_6_0__k3".to_string()]);

    let skipped = skipped(&translation);
    assert_eq!(skipped.len(), 1);
    assert!(skipped[0].message.contains("substrate missing"));
}

#[test]
fn test_endo_compartment_after_surround() {
    let endo = compartment(
        3,
        "er",
        1,
        Mesh::Endo {
            surround: ObjId::new(2),
        },
    );
    let translation = export(vec![root(), compartment(2, "cyto", 1, Mesh::Cube), endo]);
    let xml = xml(&translation);

    assert_eq!(
        attribute(&xml, "compartment", ("id", "er_3_0_"), "outside").as_deref(),
        Some("cyto_2_0_")
    );
    assert!(xml.contains("<moose:surround>cyto_2_0_</moose:surround>"));
}

#[test]
fn test_cylinder_compartment_is_one_voxel() {
    let mut cylinder = compartment(
        2,
        "dend",
        1,
        Mesh::Cylinder {
            total_length: 1e-5,
            diff_length: 1e-6,
            num_diff_compts: 10,
        },
    );
    if let ElementKind::Compartment(spec) = &mut cylinder.kind {
        spec.volume = 1e-15;
    }
    let translation = export(vec![root(), cylinder, pool(3, "Ca", 2)]);
    let model = translation.document.model().unwrap();

    let size = model
        .list_of_compartments()
        .iter()
        .next()
        .unwrap()
        .size()
        .unwrap();
    assert_relative_eq!(size, 1e-15 / 10.0 * 1e3, max_relative = 1e-9);

    let xml = xml(&translation);
    assert!(xml.contains("<moose:Mesh>CylMesh</moose:Mesh>"));
    assert!(xml.contains("<moose:totLength>"));
    assert!(xml.contains("<moose:diffLength>"));
    assert_eq!(
        attribute(&xml, "compartment", ("id", "dend_2_0_"), "units").as_deref(),
        Some("volume")
    );
}

#[test]
fn test_endo_compartment_before_surround_fails() {
    let endo = compartment(
        3,
        "er",
        1,
        Mesh::Endo {
            surround: ObjId::new(2),
        },
    );
    let tree = ModelTree::new(vec![root(), endo, compartment(2, "cyto", 1, Mesh::Cube)]).unwrap();

    let error = to_sbml(&tree, "/model", "model", &ExportOptions::default()).unwrap_err();

    assert!(matches!(error, SBMLError::UnresolvedSurround { .. }));
}

#[test]
fn test_missing_path_and_compartment() {
    let tree = ModelTree::new(vec![root(), group(2, "loose", 1)]).unwrap();

    let missing = to_sbml(&tree, "/elsewhere", "model", &ExportOptions::default()).unwrap_err();
    assert!(matches!(missing, SBMLError::PathNotFound(_)));

    let empty = to_sbml(&tree, "/model", "model", &ExportOptions::default()).unwrap_err();
    assert!(matches!(empty, SBMLError::NoCompartment(_)));
}

#[test]
fn test_buffered_pools_and_constant_participants() {
    let reaction = ElementBuilder::default()
        .id(6u32)
        .name("R")
        .parent(2u32)
        .kind(ElementKind::Reaction(ReactionSpec { kf: 1.0, kb: 0.0 }))
        .neighbor(Role::Substrate, 3u32)
        .neighbor(Role::Product, 4u32)
        .build()
        .unwrap();
    let function = ElementBuilder::default()
        .id(7u32)
        .name("func")
        .parent(4u32)
        .kind(ElementKind::Function(FunctionSpec {
            expr: "x0 * 2".to_string(),
        }))
        .neighbor(Role::Input, 5u32)
        .build()
        .unwrap();
    let translation = export(vec![
        root(),
        compartment(2, "kinetics", 1, Mesh::Cube),
        buffered_pool(3, "Src", 2),
        buffered_pool(4, "Driven", 2),
        pool(5, "Free", 2),
        reaction,
        function,
    ]);
    let xml = xml(&translation);
    let flags = |id: &str| {
        (
            attribute(&xml, "species", ("id", id), "boundaryCondition").unwrap(),
            attribute(&xml, "species", ("id", id), "constant").unwrap(),
        )
    };

    assert_eq!(flags("Src_3_0_"), ("true".to_string(), "true".to_string()));
    assert_eq!(flags("Driven_4_0_"), ("true".to_string(), "false".to_string()));
    assert_eq!(flags("Free_5_0_"), ("false".to_string(), "false".to_string()));

    assert_eq!(
        attribute(&xml, "speciesReference", ("species", "Src_3_0_"), "constant").as_deref(),
        Some("true")
    );
    assert_eq!(
        attribute(&xml, "speciesReference", ("species", "Driven_4_0_"), "constant").as_deref(),
        Some("false")
    );

    let model = translation.document.model().unwrap();
    let rules = model.list_of_assignment_rules();
    assert_eq!(rules.iter().count(), 1);
    let rule = rules.iter().next().unwrap();
    assert_eq!(rule.variable(), "Driven_4_0_");
    assert!(rule.formula().contains("Free_5_0_"));
    assert!(translation.validate().unwrap().is_valid);
}

#[test]
fn test_function_with_unmatched_placeholder_is_skipped() {
    let function = ElementBuilder::default()
        .id(5u32)
        .name("sum")
        .parent(2u32)
        .kind(ElementKind::Function(FunctionSpec {
            expr: "x0 + x1".to_string(),
        }))
        .neighbor(Role::Input, 3u32)
        .neighbor(Role::FunctionOutput, 4u32)
        .build()
        .unwrap();
    let translation = export(vec![
        root(),
        compartment(2, "kinetics", 1, Mesh::Cube),
        pool(3, "A", 2),
        pool(4, "Total", 2),
        function,
    ]);
    let model = translation.document.model().unwrap();

    assert_eq!(model.list_of_assignment_rules().iter().count(), 0);
    let skipped = skipped(&translation);
    assert_eq!(skipped.len(), 1);
    assert_eq!(skipped[0].entity, "/model/kinetics/sum");
    assert_eq!(skipped[0].message, "placeholders without input: x1");
    assert!(translation.validate().unwrap().is_valid);
}

#[test]
fn test_compartment_level_function_assigns_first_output() {
    let function = ElementBuilder::default()
        .id(5u32)
        .name("sum")
        .parent(2u32)
        .kind(ElementKind::Function(FunctionSpec {
            expr: "x0 + x1".to_string(),
        }))
        .neighbor(Role::Input, 3u32)
        .neighbor(Role::Input, 6u32)
        .neighbor(Role::FunctionOutput, 4u32)
        .build()
        .unwrap();
    let translation = export(vec![
        root(),
        compartment(2, "kinetics", 1, Mesh::Cube),
        pool(3, "A", 2),
        pool(4, "Total", 2),
        pool(6, "B", 2),
        function,
    ]);
    let model = translation.document.model().unwrap();
    let rules = model.list_of_assignment_rules();
    let rule = rules.iter().next().unwrap();

    assert_eq!(rule.variable(), "Total_4_0_");
    assert!(rule.formula().contains("A_3_0_"));
    assert!(rule.formula().contains("B_6_0_"));
    assert!(translation.diagnostics.is_empty());
    assert!(translation.validate().unwrap().is_valid);
}

#[test]
fn test_unparsable_function_does_not_fail_export() {
    let reaction = ElementBuilder::default()
        .id(5u32)
        .name("R")
        .parent(2u32)
        .kind(ElementKind::Reaction(ReactionSpec { kf: 0.1, kb: 0.0 }))
        .neighbor(Role::Substrate, 3u32)
        .neighbor(Role::Product, 4u32)
        .build()
        .unwrap();
    let function = ElementBuilder::default()
        .id(6u32)
        .name("gate")
        .parent(4u32)
        .kind(ElementKind::Function(FunctionSpec {
            expr: "x0 > 1".to_string(),
        }))
        .neighbor(Role::Input, 3u32)
        .build()
        .unwrap();
    let tree = ModelTree::new(vec![
        root(),
        compartment(2, "kinetics", 1, Mesh::Cube),
        pool(3, "A", 2),
        pool(4, "B", 2),
        reaction,
        function,
    ])
    .unwrap();

    let dir = tempdir().unwrap();
    let outcome = write_sbml(
        &tree,
        "/model",
        dir.path().join("model.xml"),
        &ExportOptions::default(),
    )
    .unwrap();

    assert_eq!(outcome.diagnostics.len(), 1);
    assert_eq!(outcome.diagnostics[0].entity, "/model/kinetics/B/gate");
    assert!(outcome.diagnostics[0].message.contains("does not parse"));

    let xml = std::fs::read_to_string(&outcome.path).unwrap();
    assert!(xml.contains(r#"id="R_5_0_""#));
    assert!(!xml.contains("<assignmentRule"));
}

#[test]
fn test_function_calling_unknown_function_is_skipped() {
    let function = ElementBuilder::default()
        .id(5u32)
        .name("f")
        .parent(4u32)
        .kind(ElementKind::Function(FunctionSpec {
            expr: "hill(x0)".to_string(),
        }))
        .neighbor(Role::Input, 3u32)
        .build()
        .unwrap();
    let translation = export(vec![
        root(),
        compartment(2, "kinetics", 1, Mesh::Cube),
        pool(3, "A", 2),
        pool(4, "B", 2),
        function,
    ]);
    let model = translation.document.model().unwrap();

    assert_eq!(model.list_of_assignment_rules().iter().count(), 0);
    let skipped = skipped(&translation);
    assert_eq!(skipped.len(), 1);
    assert_eq!(skipped[0].message, "expression references unknown function hill");
    assert!(translation.validate().unwrap().is_valid);
}

#[test]
fn test_channel_between_compartments() {
    let channel = ElementBuilder::default()
        .id(6u32)
        .name("chan")
        .parent(2u32)
        .kind(ElementKind::Channel(ChannelSpec { permeability: 0.2 }))
        .neighbor(Role::Substrate, 4u32)
        .neighbor(Role::Product, 5u32)
        .build()
        .unwrap();
    let translation = export(vec![
        root(),
        compartment(2, "cyto", 1, Mesh::Cube),
        compartment(3, "er", 1, Mesh::Cube),
        pool(4, "Ca", 2),
        pool(5, "Ca", 3),
        channel,
    ]);
    let model = translation.document.model().unwrap();
    let reactions = model.list_of_reactions();
    let reaction = reactions.iter().next().unwrap();

    assert_eq!(reaction.reversible(), Some(true));
    let formula = reaction.kinetic_law().unwrap().formula();
    assert!(formula.contains("chan_6_0__Permeability"), "{formula}");
    assert_eq!(
        parameter_ids(&translation),
        vec!["chan_6_0__Permeability".to_string()]
    );

    let xml = xml(&translation);
    assert!(xml.contains("<moose:Permeability>0.2</moose:Permeability>"));
    assert!(translation.validate().unwrap().is_valid);
}

#[test]
fn test_nested_groups_and_xml_output() {
    let outer = group(3, "signalling", 2);
    let inner = ElementBuilder::default()
        .id(4u32)
        .name("kinase module")
        .parent(3u32)
        .kind(ElementKind::Neutral)
        .info(
            InfoBuilder::default()
                .x(10.0)
                .y(20.0)
                .width(100.0)
                .height(50.0)
                .color("blue")
                .build()
                .unwrap(),
        )
        .build()
        .unwrap();
    let reaction = ElementBuilder::default()
        .id(7u32)
        .name("R")
        .parent(4u32)
        .kind(ElementKind::Reaction(ReactionSpec { kf: 1.0, kb: 0.0 }))
        .neighbor(Role::Substrate, 5u32)
        .neighbor(Role::Product, 6u32)
        .build()
        .unwrap();
    let translation = export(vec![
        root(),
        compartment(2, "kinetics", 1, Mesh::Cube),
        outer,
        inner,
        pool(5, "A", 3),
        pool(6, "B", 4),
        reaction,
    ]);
    let groups = &translation.groups;

    assert_eq!(groups.len(), 2);
    let outer = groups.iter().find(|g| g.id == "signalling_3_0_").unwrap();
    assert_eq!(outer.members, vec!["A_5_0_".to_string()]);

    let inner = groups.iter().find(|g| g.id == "kinase_module_4_0_").unwrap();
    assert_eq!(inner.name, "kinase module");
    assert_eq!(
        inner.members,
        vec!["B_6_0_".to_string(), "R_7_0_".to_string()]
    );
    assert_eq!(inner.annotation.group.as_deref(), Some("signalling"));
    assert_eq!(inner.annotation.parent, "signalling_3_0_");
    assert_eq!(inner.annotation.bg_color.as_deref(), Some("blue"));

    assert!(translation.validate().unwrap().is_valid);

    let xml = xml(&translation);
    assert!(xml.contains(r#"<groups:group groups:id="kinase_module_4_0_""#));
    assert!(xml.contains(r#"<groups:member groups:idRef="R_7_0_"/>"#));
    assert!(xml.contains("<moose:Group>signalling</moose:Group>"));
}

#[test]
fn test_group_name_with_leading_digit() {
    let translation = export(vec![
        root(),
        compartment(2, "kinetics", 1, Mesh::Cube),
        group(3, "2nd", 2),
        pool(4, "A", 3),
    ]);

    assert_eq!(translation.groups.len(), 1);
    assert_eq!(translation.groups[0].id, "_2nd_3_0_");
    assert_eq!(translation.groups[0].name, "_2nd");

    let xml = xml(&translation);
    assert_eq!(
        attribute(&xml, "groups:group", ("groups:id", "_2nd_3_0_"), "groups:name").as_deref(),
        Some("_2nd")
    );
}

#[test]
fn test_model_annotation_lists_plots() {
    let model_root = ElementBuilder::default()
        .id(1u32)
        .name("model")
        .kind(ElementKind::Neutral)
        .info(
            InfoBuilder::default()
                .runtime(100.0)
                .solver("gsl")
                .notes("A & B")
                .build()
                .unwrap(),
        )
        .build()
        .unwrap();
    let plot = ElementBuilder::default()
        .id(9u32)
        .name("plotA")
        .parent(1u32)
        .kind(ElementKind::PlotTable)
        .neighbor(Role::PlotTarget, 3u32)
        .build()
        .unwrap();
    let translation = export(vec![
        model_root,
        compartment(2, "kinetics", 1, Mesh::Cube),
        pool(3, "A", 2),
        plot,
    ]);
    let xml = xml(&translation);

    assert!(xml.contains("<moose:Notes>A _and B</moose:Notes>"));
    assert!(xml.contains("<moose:runTime>"));
    assert!(xml.contains("<moose:solver>gsl</moose:solver>"));
    assert!(xml.contains("<moose:plots>/kinetics/A</moose:plots>"));
}

#[test]
fn test_grouped_enzyme_records_its_parent_pool() {
    let enzyme = ElementBuilder::default()
        .id(6u32)
        .name("enz")
        .parent(5u32)
        .kind(ElementKind::Enzyme(EnzymeSpec {
            k1: 1.0,
            k2: 4.0,
            k3: 1.0,
        }))
        .neighbor(Role::EnzymeParent, 5u32)
        .neighbor(Role::Substrate, 8u32)
        .neighbor(Role::Complex, 7u32)
        .neighbor(Role::Product, 9u32)
        .build()
        .unwrap();
    let translation = export(vec![
        root(),
        compartment(2, "kinetics", 1, Mesh::Cube),
        group(3, "module", 2),
        pool(5, "E", 3),
        enzyme,
        pool(7, "cplx", 6),
        pool(8, "S", 2),
        pool(9, "P", 2),
    ]);
    let model = translation.document.model().unwrap();

    assert_eq!(model.list_of_reactions().iter().count(), 2);
    assert_eq!(translation.groups.len(), 1);
    assert_eq!(
        translation.groups[0].members,
        vec!["E_5_0_".to_string(), "cplx_7_0_".to_string()]
    );
    assert!(!translation.groups[0]
        .members
        .iter()
        .any(|member| member.ends_with("_formation_")));
    assert!(translation.validate().unwrap().is_valid);
}
