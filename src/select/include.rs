//! Include walker: copy only the selected fields into fresh objects
//!
//! The input nodes are never modified. Every input node yields exactly one
//! output object, even when nothing matched.

use crate::select::selector::{Pick, PickKind, Selector};
use crate::select::subset::Subset;
use serde_json::{Map, Value};
use std::collections::HashSet;
use tracing::trace;

/// Project each of `nodes` through the picks found at `address` and below
pub fn include(
    nodes: &[&Map<String, Value>],
    address: &str,
    selector: &Selector,
) -> Vec<Map<String, Value>> {
    nodes
        .iter()
        .map(|node| include_node(node, address, selector))
        .collect()
}

fn include_node(node: &Map<String, Value>, address: &str, selector: &Selector) -> Map<String, Value> {
    let mut copy = Map::new();
    // Keys already copied in full; a descent into one adds nothing new
    let mut whole: HashSet<&str> = HashSet::new();

    for pick in selector.picks(address) {
        let element = match node.get(pick.name()) {
            Some(element) => element,
            None => continue,
        };

        let value = match pick.kind() {
            PickKind::Field => {
                if pick.subset().is_none() {
                    whole.insert(pick.name());
                }
                narrow(element, pick.subset())
            }
            PickKind::Descend if whole.contains(pick.name()) => continue,
            PickKind::Descend => match descend(element, pick, address, selector) {
                Some(value) => value,
                None => continue,
            },
        };

        attach(&mut copy, pick.name(), value);
    }

    copy
}

/// Clone a leaf value, cutting arrays down to the subset when one is given
fn narrow(element: &Value, subset: Option<&Subset>) -> Value {
    match (element, subset) {
        (Value::Array(items), Some(subset)) => {
            Value::Array(subset.size(items.len()).slice(items).to_vec())
        }
        _ => element.clone(),
    }
}

/// Recurse into an object, or into the object elements of an array
///
/// Scalars and nulls under a descending pick are skipped.
fn descend(element: &Value, pick: &Pick, address: &str, selector: &Selector) -> Option<Value> {
    let child = pick.child_address(address);
    trace!(address = %child, "including");

    match element {
        Value::Object(map) => Some(Value::Object(include_node(map, &child, selector))),
        Value::Array(items) => {
            let items = match pick.subset() {
                Some(subset) => subset.size(items.len()).slice(items),
                None => items.as_slice(),
            };
            let nodes: Vec<&Map<String, Value>> =
                items.iter().filter_map(Value::as_object).collect();

            let projected = include(&nodes, &child, selector)
                .into_iter()
                .map(Value::Object)
                .collect();
            Some(Value::Array(projected))
        }
        _ => None,
    }
}

/// Store `value` under `name`, merging with whatever an earlier pick put there
fn attach(copy: &mut Map<String, Value>, name: &str, value: Value) {
    match copy.get_mut(name) {
        Some(existing) => merge(existing, value),
        None => {
            copy.insert(name.to_string(), value);
        }
    }
}

/// Arrays append, objects merge key by key, anything else is replaced
fn merge(existing: &mut Value, incoming: Value) {
    match (existing, incoming) {
        (Value::Array(items), Value::Array(more)) => items.extend(more),
        (Value::Object(map), Value::Object(more)) => {
            for (key, value) in more {
                attach(map, &key, value);
            }
        }
        (slot, incoming) => *slot = incoming,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::select::parser::parse;
    use serde_json::json;

    fn run(tree: Value, dsl: &str) -> Vec<Value> {
        let selector = parse(dsl).unwrap();
        let nodes: Vec<&Map<String, Value>> = match &tree {
            Value::Object(map) => vec![map],
            Value::Array(items) => items.iter().filter_map(Value::as_object).collect(),
            _ => vec![],
        };
        include(&nodes, "", &selector)
            .into_iter()
            .map(Value::Object)
            .collect()
    }

    fn pojos() -> Value {
        json!({
            "name": "root",
            "description": "top",
            "pojos": [
                {"name": "p1", "description": "d1", "pojos": [{"name": "p1a"}, {"name": "p1b"}]},
                {"name": "p2", "description": "d2", "pojos": [{"name": "p2a"}, {"name": "p2b"}, {"name": "p2c"}, {"name": "p2d"}]},
                {"name": "p3", "description": "d3", "pojos": []}
            ]
        })
    }

    #[test]
    fn test_plain_fields() {
        let out = run(json!({"a": 1, "b": 2, "c": 3}), "a c");
        assert_eq!(out, vec![json!({"a": 1, "c": 3})]);
    }

    #[test]
    fn test_missing_fields_yield_empty_object() {
        let out = run(json!([{"a": 1}, {"b": 2}]), "a");
        assert_eq!(out, vec![json!({"a": 1}), json!({})]);
    }

    #[test]
    fn test_nested_subsets() {
        let out = run(pojos(), "pojos[2]{ name pojos[2:3]{ name } }");
        assert_eq!(
            out,
            vec![json!({
                "pojos": [
                    {"name": "p2", "pojos": [{"name": "p2b"}, {"name": "p2c"}]}
                ]
            })]
        );
    }

    #[test]
    fn test_leaf_array_subset() {
        let out = run(json!({"scores": [10, 20, 30, 40]}), "scores[-2:]");
        assert_eq!(out, vec![json!({"scores": [30, 40]})]);
    }

    #[test]
    fn test_descend_into_object() {
        let tree = json!({"account": {"username": "ann", "password": "x"}, "age": 4});
        let out = run(tree, "account.username");
        assert_eq!(out, vec![json!({"account": {"username": "ann"}})]);
    }

    #[test]
    fn test_descend_skips_scalars() {
        let out = run(json!({"account": "closed", "name": "ann"}), "name account{ username }");
        assert_eq!(out, vec![json!({"name": "ann"})]);
    }

    #[test]
    fn test_two_windows_on_one_array_append() {
        let out = run(pojos(), "pojos[1]{ name } pojos[3]{ description }");
        assert_eq!(
            out,
            vec![json!({"pojos": [{"name": "p1"}, {"description": "d3"}]})]
        );
    }

    #[test]
    fn test_field_and_descent_on_same_object_merge() {
        let tree = json!({"account": {"username": "ann", "password": "x", "email": "a@b"}});
        let out = run(tree, "account{ username } account.email");
        assert_eq!(
            out,
            vec![json!({"account": {"username": "ann", "email": "a@b"}})]
        );
    }

    #[test]
    fn test_whole_field_absorbs_descent_into_it() {
        let tree = json!({
            "purchases": [
                {"id": 1, "items": [{"name": "pen", "price": 2}]},
                {"id": 2, "items": []}
            ]
        });

        let out = run(tree.clone(), "purchases purchases.items.name");
        assert_eq!(out, vec![tree]);

        let account = json!({"account": {"username": "ann", "password": "x"}});
        let out = run(account.clone(), "account account.username");
        assert_eq!(out, vec![account]);
    }

    #[test]
    fn test_input_is_untouched() {
        let tree = pojos();
        let before = tree.clone();
        let _ = run(tree.clone(), "name");
        assert_eq!(tree, before);
    }

    #[test]
    fn test_merge_rules() {
        let mut existing = json!([1]);
        merge(&mut existing, json!([2, 3]));
        assert_eq!(existing, json!([1, 2, 3]));

        let mut existing = json!({"a": {"x": 1}});
        merge(&mut existing, json!({"a": {"y": 2}, "b": 3}));
        assert_eq!(existing, json!({"a": {"x": 1, "y": 2}, "b": 3}));

        let mut existing = json!("old");
        merge(&mut existing, json!("new"));
        assert_eq!(existing, json!("new"));
    }
}
