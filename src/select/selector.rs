//! The parsed form of a selector string
//!
//! A [`Selector`] maps each *address* (the dot-joined tokens leading from the
//! tree root to a container, `""` for the root itself) to the ordered picks
//! that apply to the container found there.

use crate::error::Result;
use crate::select::subset::Subset;
use std::collections::HashMap;

/// Whether a pick names a value or a container to walk into
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PickKind {
    /// A field selected or dropped as a whole
    Field,
    /// A child object or array whose own fields are addressed further down
    Descend,
}

/// One selector token at one address
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pick {
    /// Token as written, e.g. `pojos[2:4]`; also the address segment for descents
    token: String,
    /// Field name with any subset suffix stripped
    name: String,
    subset: Option<Subset>,
    kind: PickKind,
}

impl Pick {
    pub fn new(token: &str, kind: PickKind) -> Result<Self> {
        let (name, subset) = match Subset::parse(token)? {
            Some((name, subset)) => (name, Some(subset)),
            None => (token.to_string(), None),
        };

        Ok(Pick {
            token: token.to_string(),
            name,
            subset,
            kind,
        })
    }

    pub fn field(token: &str) -> Result<Self> {
        Self::new(token, PickKind::Field)
    }

    pub fn descend(token: &str) -> Result<Self> {
        Self::new(token, PickKind::Descend)
    }

    pub fn token(&self) -> &str {
        &self.token
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn subset(&self) -> Option<&Subset> {
        self.subset.as_ref()
    }

    pub fn kind(&self) -> PickKind {
        self.kind
    }

    pub fn is_descend(&self) -> bool {
        self.kind == PickKind::Descend
    }

    /// Address of the container this pick descends into, relative to `address`
    pub fn child_address(&self, address: &str) -> String {
        resolve_address(address, &self.token)
    }
}

/// Join a parent address and a child segment
pub fn resolve_address(address: &str, segment: &str) -> String {
    if address.is_empty() {
        segment.to_string()
    } else {
        format!("{}.{}", address, segment)
    }
}

/// Address-indexed selection picks produced by [`crate::select::parse`]
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Selector {
    picks: HashMap<String, Vec<Pick>>,
}

impl Selector {
    /// Picks registered at `address`, fields first
    pub fn picks(&self, address: &str) -> &[Pick] {
        self.picks.get(address).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn addresses(&self) -> impl Iterator<Item = &str> {
        self.picks.keys().map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.picks.values().all(Vec::is_empty)
    }

    /// Number of addresses in the index that lie at or below `address`
    pub fn shared_count(&self, address: &str) -> usize {
        let nested = format!("{}.", address);
        self.picks
            .keys()
            .filter(|key| key.as_str() == address || key.starts_with(&nested))
            .count()
    }
}

/// Accumulates picks during a parse, then applies the ordering tie-break
#[derive(Debug, Default)]
pub(crate) struct SelectorBuilder {
    selector: Selector,
}

impl SelectorBuilder {
    pub(crate) fn push(&mut self, address: &str, pick: Pick) {
        let picks = self.selector.picks.entry(address.to_string()).or_default();
        if !picks.contains(&pick) {
            picks.push(pick);
        }
    }

    /// Order every address: fields first, then descents by how many indexed
    /// addresses share their subtree, fewest first. Ties keep scan order.
    pub(crate) fn build(self) -> Selector {
        let mut selector = self.selector;

        let mut weights: HashMap<(String, String), usize> = HashMap::new();
        for (address, picks) in &selector.picks {
            for pick in picks.iter().filter(|p| p.is_descend()) {
                let shared = selector.shared_count(&pick.child_address(address));
                weights.insert((address.clone(), pick.token.clone()), shared);
            }
        }

        for (address, picks) in selector.picks.iter_mut() {
            picks.sort_by_key(|pick| match pick.kind {
                PickKind::Field => (0, 0),
                PickKind::Descend => {
                    let key = (address.clone(), pick.token.clone());
                    (1, weights.get(&key).copied().unwrap_or(0))
                }
            });
        }

        selector
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pick_strips_subset() {
        let pick = Pick::descend("pojos[2:4]").unwrap();
        assert_eq!(pick.name(), "pojos");
        assert_eq!(pick.token(), "pojos[2:4]");
        assert_eq!(pick.subset(), Some(&Subset::resolve(Some(2), Some(4))));
        assert_eq!(pick.child_address("root"), "root.pojos[2:4]");
    }

    #[test]
    fn test_malformed_bracket_is_literal_name() {
        let pick = Pick::field("notes[draft]").unwrap();
        assert_eq!(pick.name(), "notes[draft]");
        assert!(pick.subset().is_none());
    }

    #[test]
    fn test_builder_orders_fields_before_descents() {
        let mut builder = SelectorBuilder::default();
        builder.push("", Pick::descend("account").unwrap());
        builder.push("", Pick::field("name").unwrap());
        builder.push("account", Pick::field("username").unwrap());

        let selector = builder.build();
        let names: Vec<&str> = selector.picks("").iter().map(Pick::name).collect();
        assert_eq!(names, vec!["name", "account"]);
    }

    #[test]
    fn test_builder_orders_descents_by_shared_subtree() {
        let mut builder = SelectorBuilder::default();
        builder.push("", Pick::descend("deep").unwrap());
        builder.push("", Pick::descend("shallow").unwrap());
        builder.push("deep", Pick::descend("inner").unwrap());
        builder.push("deep.inner", Pick::field("x").unwrap());
        builder.push("shallow", Pick::field("y").unwrap());

        let selector = builder.build();
        let names: Vec<&str> = selector.picks("").iter().map(Pick::name).collect();
        assert_eq!(names, vec!["shallow", "deep"]);
    }

    #[test]
    fn test_duplicate_picks_are_recorded_once() {
        let mut builder = SelectorBuilder::default();
        builder.push("", Pick::descend("purchases").unwrap());
        builder.push("", Pick::descend("purchases").unwrap());
        assert_eq!(builder.build().picks("").len(), 1);
    }

    #[test]
    fn test_shared_count_respects_segment_boundaries() {
        let mut builder = SelectorBuilder::default();
        builder.push("a", Pick::field("x").unwrap());
        builder.push("a.b", Pick::field("y").unwrap());
        builder.push("ab", Pick::field("z").unwrap());

        let selector = builder.build();
        assert_eq!(selector.shared_count("a"), 2);
        assert_eq!(selector.shared_count("ab"), 1);
        assert!(selector.picks("missing").is_empty());
    }
}
