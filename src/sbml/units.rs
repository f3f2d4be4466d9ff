//! SBML unit definitions.
//!
//! Rate constants of a reaction of order `n` carry the unit
//! `litre^n mmole^-n second^-1`. Definitions are written to the libsbml model
//! on demand and at most once per document; the [`UnitRegistry`] remembers
//! which identifiers exist, so every accessor here is idempotent and returns
//! the identifier to reference from a parameter.
//!
//! The model's base units (`volume`, `substance`, `length`, `area`, `time`) are
//! emitted for every document and the model-level unit attributes point at them.

use std::collections::HashSet;

use sbml::{model::Model, prelude::UnitKind as SBMLUnitKind};

/// Identifier of the model's volume unit (litre).
pub const VOLUME: &str = "volume";
/// Identifier of the model's substance unit (mmole).
pub const SUBSTANCE: &str = "substance";
/// Identifier of the model's length unit (metre).
pub const LENGTH: &str = "length";
/// Identifier of the model's area unit (square metre).
pub const AREA: &str = "area";
/// Identifier of the model's time unit (second).
pub const TIME: &str = "time";

const PERMEABILITY: &str = "litre_per_mmole_per_second";
const CONCENTRATION: &str = "mmole_per_litre";

/// A single factor of a unit definition: `(10^scale * kind)^exponent`.
#[derive(Debug)]
pub struct UnitFactor {
    pub kind: SBMLUnitKind,
    pub exponent: i32,
    pub scale: i32,
}

impl UnitFactor {
    pub fn new(kind: SBMLUnitKind, exponent: i32, scale: i32) -> Self {
        Self {
            kind,
            exponent,
            scale,
        }
    }
}

/// Identifier of the rate-constant unit for a reaction of the given order.
pub fn order_unit_id(order: usize) -> String {
    match order {
        0 => "per_second".to_string(),
        1 => "litre_per_mmole_per_second".to_string(),
        2 => "sq_litre_per_mmole_sq_per_second".to_string(),
        n => format!("litre_per_mmole_{n}_per_second"),
    }
}

/// Factors of the rate-constant unit for a reaction of the given order.
pub fn order_factors(order: usize) -> Vec<UnitFactor> {
    let order = order as i32;
    let mut factors = Vec::new();
    if order > 0 {
        factors.push(UnitFactor::new(SBMLUnitKind::Litre, order, 0));
        factors.push(UnitFactor::new(SBMLUnitKind::Mole, -order, -3));
    }
    factors.push(UnitFactor::new(SBMLUnitKind::Second, -1, 0));
    factors
}

/// Unit definitions already written to a model.
#[derive(Debug, Default)]
pub struct UnitRegistry {
    defined: HashSet<String>,
}

impl UnitRegistry {
    /// Adds the base unit definitions the model-level attributes refer to.
    pub fn add_base_units(&mut self, model: &Model) {
        self.ensure(model, VOLUME, vec![UnitFactor::new(SBMLUnitKind::Litre, 1, 0)]);
        self.ensure(model, SUBSTANCE, vec![UnitFactor::new(SBMLUnitKind::Mole, 1, -3)]);
        self.ensure(model, LENGTH, vec![UnitFactor::new(SBMLUnitKind::Metre, 1, 0)]);
        self.ensure(model, AREA, vec![UnitFactor::new(SBMLUnitKind::Metre, 2, 0)]);
        self.ensure(model, TIME, vec![UnitFactor::new(SBMLUnitKind::Second, 1, 0)]);
    }

    /// Returns the unit of a rate constant of the given order, defining it if needed.
    ///
    /// # Arguments
    /// * `model` - The libsbml model that receives the definition
    /// * `order` - Number of participants minus one
    ///
    /// # Returns
    /// The unit identifier, e.g. `per_second` for order 0
    pub fn unit_for_order(&mut self, model: &Model, order: usize) -> String {
        let id = order_unit_id(order);
        if self.is_defined(&id) {
            return id;
        }
        self.ensure(model, &id, order_factors(order))
    }

    /// Returns the unit of a channel permeability.
    pub fn unit_for_permeability(&mut self, model: &Model) -> String {
        self.ensure(
            model,
            PERMEABILITY,
            vec![
                UnitFactor::new(SBMLUnitKind::Litre, 1, 0),
                UnitFactor::new(SBMLUnitKind::Mole, -1, -3),
                UnitFactor::new(SBMLUnitKind::Second, -1, 0),
            ],
        )
    }

    /// Returns the unit of a Michaelis constant.
    pub fn unit_for_concentration(&mut self, model: &Model) -> String {
        self.ensure(
            model,
            CONCENTRATION,
            vec![
                UnitFactor::new(SBMLUnitKind::Mole, 1, -3),
                UnitFactor::new(SBMLUnitKind::Litre, -1, 0),
            ],
        )
    }

    pub fn is_defined(&self, id: &str) -> bool {
        self.defined.contains(id)
    }

    pub fn len(&self) -> usize {
        self.defined.len()
    }

    pub fn is_empty(&self) -> bool {
        self.defined.is_empty()
    }

    fn ensure(&mut self, model: &Model, id: &str, factors: Vec<UnitFactor>) -> String {
        if self.defined.insert(id.to_string()) {
            factors
                .into_iter()
                .fold(model.build_unit_definition(id, id), |builder, factor| {
                    builder.unit(
                        factor.kind,
                        Some(factor.exponent.into()),
                        Some(factor.scale.into()),
                        Some(1.0),
                        None,
                    )
                })
                .build();
        }
        id.to_string()
    }
}
