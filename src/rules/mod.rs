//! Lexical pattern sets, one module per entity kind.
//!
//! Every rule is a single regex plus a production. Rule order inside a module
//! only matters for same-kind, same-span duplicates with equal priority; the
//! extractor's overlap policy decides everything else.

pub(crate) mod actions;
pub(crate) mod conditions;
pub(crate) mod helpers;
pub(crate) mod measurements;
pub(crate) mod medications;

#[cfg(test)]
mod tests;

use crate::Rule;

/// All rules, grouped by kind in tie-break order.
pub(crate) fn get() -> Vec<Rule> {
    let mut rules = conditions::get();
    rules.extend(measurements::get());
    rules.extend(medications::get());
    rules.extend(actions::get());
    rules
}
