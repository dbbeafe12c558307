//! Resolution of `derivedFrom` references between sibling elements.
//!
//! A deriving node is merged with the already resolved node it names before
//! the element is built: every attribute and every child tag missing from the
//! deriving node is copied from the base. Siblings are resolved in document
//! order, so a chain only resolves through bases that appear earlier.

use std::borrow::Cow;
use std::collections::{HashMap, HashSet};

use svd_xml::Node;
use tracing::debug;

use crate::element::{ElementKind, DERIVED_FROM};
use crate::error::SvdError;

/// Name index over one collection of siblings, filled in document order.
pub(crate) struct DerivationIndex<'s> {
    kind: ElementKind,
    siblings: Vec<&'s Node>,
    referenced: HashSet<&'s str>,
    resolved: HashMap<String, Node>,
}

impl<'s> DerivationIndex<'s> {
    pub(crate) fn new(kind: ElementKind, siblings: &[&'s Node]) -> Self {
        let referenced = siblings
            .iter()
            .filter_map(|node| node.attribute(DERIVED_FROM))
            .collect();
        DerivationIndex {
            kind,
            siblings: siblings.to_vec(),
            referenced,
            resolved: HashMap::new(),
        }
    }

    /// Resolve `node` against the siblings seen so far and record it.
    pub(crate) fn resolve<'n>(&mut self, node: &'n Node) -> Result<Cow<'n, Node>, SvdError> {
        if !self.kind.is_derivable() {
            return Ok(Cow::Borrowed(node));
        }
        let resolved = match node.attribute(DERIVED_FROM) {
            None => Cow::Borrowed(node),
            Some(reference) => {
                let base = self
                    .resolved
                    .get(reference)
                    .ok_or_else(|| self.failure(node, reference))?;
                debug!(
                    element = %self.kind,
                    name = name_of(node).unwrap_or_default(),
                    base = reference,
                    "resolved derivation"
                );
                Cow::Owned(merge(self.kind, base, node))
            }
        };
        if let Some(name) = name_of(&resolved) {
            if self.referenced.contains(name) {
                self.resolved.insert(name.to_string(), resolved.clone().into_owned());
            }
        }
        Ok(resolved)
    }

    fn failure(&self, node: &Node, reference: &str) -> SvdError {
        let name = name_of(node).unwrap_or("<unnamed>").to_string();
        let mut current = reference;
        for _ in 0..=self.siblings.len() {
            if current == name {
                return SvdError::DerivationCycle {
                    element: self.kind,
                    name,
                    reference: reference.to_string(),
                };
            }
            match self
                .sibling(current)
                .and_then(|sibling| sibling.attribute(DERIVED_FROM))
            {
                Some(next) => current = next,
                None => break,
            }
        }
        SvdError::UnresolvedDerivation {
            element: self.kind,
            name,
            reference: reference.to_string(),
        }
    }

    fn sibling(&self, name: &str) -> Option<&'s Node> {
        self.siblings
            .iter()
            .copied()
            .find(|sibling| name_of(sibling) == Some(name))
    }
}

/// Copy everything `derived` leaves unset from `base`.
pub(crate) fn merge(kind: ElementKind, base: &Node, derived: &Node) -> Node {
    let mut merged = derived.clone();
    for (key, value) in base.attributes() {
        if key != DERIVED_FROM && derived.attribute(key).is_none() {
            merged.set_attribute(key, value);
        }
    }
    for child in base.children() {
        if kind.inherits(child.tag()) && !derived.has_child(child.tag()) {
            merged.push_child(child.clone());
        }
    }
    merged
}

/// Resolve the enumerated value sets of one field against `index`, which the
/// enclosing register shares across all of its fields.
pub(crate) fn resolve_enumerated_values<'n>(
    field: Cow<'n, Node>,
    index: &mut DerivationIndex<'_>,
) -> Result<Cow<'n, Node>, SvdError> {
    let tag = ElementKind::EnumeratedValues.tag();
    let mut replacements = Vec::new();
    for (position, child) in field.children().iter().enumerate() {
        if child.tag() != tag {
            continue;
        }
        if let Cow::Owned(resolved) = index.resolve(child)? {
            replacements.push((position, resolved));
        }
    }
    if replacements.is_empty() {
        return Ok(field);
    }

    let mut owned = field.into_owned();
    let mut replacements = replacements.into_iter().peekable();
    for (position, slot) in owned.children_mut().enumerate() {
        if let Some((_, resolved)) = replacements.next_if(|(at, _)| *at == position) {
            *slot = resolved;
        }
    }
    Ok(Cow::Owned(owned))
}

fn name_of(node: &Node) -> Option<&str> {
    node.child("name").map(|name| name.text().trim())
}
