//! Exclude walker: remove or gather the selected fields in place
//!
//! The same walk serves two purposes. Without a collector it deletes every
//! selected field (or the selected window of an array field) from the nodes.
//! With a collector it leaves the nodes alone and appends copies of the
//! selected values instead, which is how a root path is resolved.

use crate::select::selector::{Pick, PickKind, Selector};
use serde_json::{Map, Value};
use tracing::trace;

/// Walk `nodes` with the picks found at `address` and below
///
/// Descents are batched: every matching child across all nodes is visited by
/// one recursive call, and only object children are walked into.
pub fn exclude(
    nodes: &mut [&mut Map<String, Value>],
    address: &str,
    selector: &Selector,
    mut collect: Option<&mut Vec<Value>>,
) {
    for pick in selector.picks(address) {
        match pick.kind() {
            PickKind::Field => {
                for node in nodes.iter_mut() {
                    prune_field(node, pick, collect.as_deref_mut());
                }
            }
            PickKind::Descend => {
                let child = pick.child_address(address);
                let mut children: Vec<&mut Map<String, Value>> = Vec::new();

                for node in nodes.iter_mut() {
                    match node.get_mut(pick.name()) {
                        Some(Value::Object(map)) => children.push(map),
                        Some(Value::Array(items)) => {
                            let items = match pick.subset() {
                                Some(subset) => subset.size(items.len()).slice_mut(items),
                                None => items.as_mut_slice(),
                            };
                            children.extend(items.iter_mut().filter_map(Value::as_object_mut));
                        }
                        _ => {}
                    }
                }

                trace!(address = %child, children = children.len(), "excluding");
                if !children.is_empty() {
                    exclude(&mut children, &child, selector, collect.as_deref_mut());
                }
            }
        }
    }
}

/// Delete every selected field from `nodes`
pub fn prune(nodes: &mut [&mut Map<String, Value>], selector: &Selector) {
    exclude(nodes, "", selector, None);
}

/// Copy out every selected value, leaving `nodes` as they were
pub fn gather(nodes: &mut [&mut Map<String, Value>], selector: &Selector) -> Vec<Value> {
    let mut picks = Vec::new();
    exclude(nodes, "", selector, Some(&mut picks));
    picks
}

fn prune_field(node: &mut Map<String, Value>, pick: &Pick, collect: Option<&mut Vec<Value>>) {
    if let (Some(subset), Some(Value::Array(items))) = (pick.subset(), node.get_mut(pick.name())) {
        let window = subset.size(items.len());
        match collect {
            Some(picks) => window.extract_into(picks, items),
            None => window.remove_from(items),
        }
        return;
    }

    match collect {
        Some(picks) => {
            if let Some(value) = node.get(pick.name()) {
                picks.push(value.clone());
            }
        }
        None => {
            node.shift_remove(pick.name());
        }
    }
}
