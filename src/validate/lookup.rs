//! Prefix-tolerant element lookup.
//!
//! Producers disagree on prefixes (`cbc:ID`, `ID`, `ns2:ID`), so an element
//! is searched with an ordered list of strategies and the first hit wins.

use super::document::Element;
use crate::core::registry::CONVENTIONAL_PREFIXES;

/// One way of matching an element by local name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Lookup<'a> {
    /// No prefix at all.
    Unprefixed,
    /// Any prefix, as long as it resolves to this namespace.
    Namespaced(&'a str),
    /// This literal prefix, whatever it resolves to.
    Prefixed(&'a str),
}

impl Lookup<'_> {
    fn matches(&self, element: &Element, local_name: &str) -> bool {
        if element.local_name != local_name {
            return false;
        }
        match self {
            Self::Unprefixed => element.prefix.is_none(),
            Self::Namespaced(ns) => element.namespace.as_deref() == Some(*ns),
            Self::Prefixed(p) => element.prefix.as_deref() == Some(*p),
        }
    }
}

/// Strategies in the order they are tried: unprefixed, each namespace,
/// then each conventional prefix.
pub(crate) fn strategies<'a>(namespaces: &[&'a str]) -> Vec<Lookup<'a>> {
    let mut out = Vec::with_capacity(1 + namespaces.len() + CONVENTIONAL_PREFIXES.len());
    out.push(Lookup::Unprefixed);
    out.extend(namespaces.iter().copied().map(Lookup::Namespaced));
    out.extend(CONVENTIONAL_PREFIXES.iter().copied().map(Lookup::Prefixed));
    out
}

/// First descendant of `scope` named `local_name`, trying each strategy in turn.
pub(crate) fn find_element<'d>(
    scope: &'d Element,
    local_name: &str,
    namespaces: &[&str],
) -> Option<&'d Element> {
    strategies(namespaces).into_iter().find_map(|strategy| {
        scope
            .descendants()
            .find(|e| strategy.matches(e, local_name))
    })
}

/// Trimmed text of the first matching descendant; `None` when absent or blank.
pub(crate) fn find_text<'d>(
    scope: &'d Element,
    local_name: &str,
    namespaces: &[&str],
) -> Option<&'d str> {
    find_element(scope, local_name, namespaces)
        .map(|e| e.text.trim())
        .filter(|t| !t.is_empty())
}
