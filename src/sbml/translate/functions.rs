//! Functions to assignment rules.

use lazy_static::lazy_static;
use meval::{tokenizer::Token, Expr};
use regex::{Captures, Regex};
use sbml::model::Model;

use crate::{
    model::{Capability, Element, ElementKind, Role},
    sbml::{ident::entity_id, translate::context::TranslationContext},
};

lazy_static! {
    /// Positional input placeholders `x0`, `x1`, ... as whole words.
    static ref PLACEHOLDER: Regex = Regex::new(r"\bx(\d+)\b").unwrap();
}

/// Functions an assignment rule may call.
const KNOWN_FUNCTIONS: [&str; 16] = [
    "sqrt", "exp", "ln", "log", "abs", "sin", "cos", "tan", "asin", "acos", "atan", "sinh",
    "cosh", "tanh", "floor", "ceil",
];

/// Constants an assignment rule may reference besides species and compartments.
const KNOWN_CONSTANTS: [&str; 1] = ["pi"];

/// Translates every function below `root` into an assignment rule.
///
/// A function directly under a compartment assigns its first output pool;
/// anywhere else it assigns the pool it is attached to. A function is skipped
/// when a placeholder has no input, when its expression does not parse, or
/// when it references a symbol or calls a function the document cannot
/// resolve.
pub fn translate_functions<'a>(ctx: &mut TranslationContext<'a>, model: &Model, root: &'a Element) {
    for function in ctx.tree.descendants(root, Capability::Function) {
        let ElementKind::Function(spec) = &function.kind else {
            continue;
        };

        if spec.expr.trim().is_empty() {
            ctx.skip(function, "function has no expression");
            continue;
        }

        let Some(target) = assigned_element(ctx, function) else {
            ctx.skip(function, "function has no output to assign");
            continue;
        };
        if !target.kind.is_pool() {
            ctx.skip(function, format!("function is attached to {}, not to a pool", target.name));
            continue;
        }

        let inputs: Vec<String> = ctx
            .tree
            .neighbors(function, Role::Input)
            .into_iter()
            .map(|input| entity_id(ctx.tree.resolve_transfer(input)))
            .collect();

        let (formula, unmatched) = substitute_inputs(spec.expr.trim(), &inputs);
        if !unmatched.is_empty() {
            ctx.skip(
                function,
                format!("placeholders without input: {}", unmatched.join(", ")),
            );
            continue;
        }

        let unresolved = match unresolved_symbols(&formula, |id| ctx.is_defined(id)) {
            Ok(unresolved) => unresolved,
            Err(err) => {
                ctx.skip(function, format!("expression '{formula}' does not parse: {err}"));
                continue;
            }
        };
        if !unresolved.is_empty() {
            ctx.skip(
                function,
                format!("expression references unknown {}", unresolved.join(", ")),
            );
            continue;
        }

        let variable = entity_id(ctx.tree.resolve_transfer(target));
        model.create_assignment_rule(&variable, &formula);
    }
}

/// Symbols and calls in `formula` that neither `is_defined` nor the known
/// functions and constants cover, in order of appearance.
///
/// # Errors
/// The parse error if `formula` is not a valid expression
pub(crate) fn unresolved_symbols(
    formula: &str,
    is_defined: impl Fn(&str) -> bool,
) -> Result<Vec<String>, meval::Error> {
    let expr = formula.parse::<Expr>()?;

    let mut unresolved: Vec<String> = Vec::new();
    for token in expr.iter() {
        let name = match token {
            Token::Var(name) if !is_defined(name) && !KNOWN_CONSTANTS.contains(&name.as_str()) => {
                format!("symbol {name}")
            }
            Token::Func(name, _) if !KNOWN_FUNCTIONS.contains(&name.as_str()) => {
                format!("function {name}")
            }
            _ => continue,
        };
        if !unresolved.contains(&name) {
            unresolved.push(name);
        }
    }

    Ok(unresolved)
}

fn assigned_element<'a>(ctx: &TranslationContext<'a>, function: &Element) -> Option<&'a Element> {
    let parent = ctx.tree.parent(function)?;
    if parent.kind.is_compartment() {
        ctx.tree
            .neighbors(function, Role::FunctionOutput)
            .into_iter()
            .next()
    } else {
        Some(parent)
    }
}

/// Replaces each `x<i>` with the id of the i-th input.
///
/// # Returns
/// The rewritten expression and the placeholders that had no input
pub(crate) fn substitute_inputs(expr: &str, inputs: &[String]) -> (String, Vec<String>) {
    let mut unmatched = Vec::new();
    let formula = PLACEHOLDER
        .replace_all(expr, |caps: &Captures| {
            let input = caps[1]
                .parse::<usize>()
                .ok()
                .and_then(|index| inputs.get(index));
            match input {
                Some(id) => id.clone(),
                None => {
                    unmatched.push(caps[0].to_string());
                    caps[0].to_string()
                }
            }
        })
        .into_owned();

    (formula, unmatched)
}
