//! Property-based tests for path lookups and sequence operators.

use fnc::{
    flatten_deep, get_path, has_path, intersection, iterate, to_path, union, unzip, xor, Value,
};
use proptest::prelude::*;

// ============================================================================
// Strategies
// ============================================================================

fn leaf_strategy() -> impl Strategy<Value = Value> {
    prop_oneof![
        Just(Value::Null),
        any::<bool>().prop_map(Value::Bool),
        (-20i64..20).prop_map(Value::Int),
        "[a-c]{0,2}".prop_map(Value::from),
    ]
}

/// Nested maps and lists, rooted at a map.
fn document_strategy() -> impl Strategy<Value = Value> {
    let nested = leaf_strategy().prop_recursive(3, 32, 4, |inner| {
        prop_oneof![
            prop::collection::vec(inner.clone(), 0..4).prop_map(Value::from),
            prop::collection::vec(("[a-c]", inner), 0..4).prop_map(Value::map),
        ]
    });
    prop::collection::vec(("[a-c]", nested), 0..4).prop_map(Value::map)
}

/// Small integers and short integer lists, so repeats are likely.
fn element_strategy() -> impl Strategy<Value = Value> {
    prop_oneof![
        3 => (0i64..6).prop_map(Value::Int),
        1 => prop::collection::vec(0i64..3, 0..2).prop_map(Value::list),
    ]
}

fn nested_list_strategy() -> impl Strategy<Value = Value> {
    (0i64..5)
        .prop_map(Value::Int)
        .prop_recursive(4, 32, 4, |inner| {
            prop::collection::vec(inner, 0..4).prop_map(Value::from)
        })
}

// ============================================================================
// Helpers
// ============================================================================

/// Every `(path, value)` reachable from `root`, including the root itself.
fn reachable(root: &Value) -> Vec<(Vec<Value>, Value)> {
    let mut found = vec![(Vec::new(), root.clone())];
    let mut stack = vec![(Vec::new(), root.clone())];
    while let Some((prefix, value)) = stack.pop() {
        if !matches!(value, Value::Map(_) | Value::List(_)) {
            continue;
        }
        for (key, child) in iterate(&value) {
            let mut path = prefix.clone();
            path.push(key);
            found.push((path.clone(), child.clone()));
            stack.push((path, child));
        }
    }
    found
}

fn distinct(items: &[Value]) -> Vec<Value> {
    let mut out: Vec<Value> = Vec::new();
    for item in items {
        if !out.contains(item) {
            out.push(item.clone());
        }
    }
    out
}

proptest! {
    /// A path that resolves is reported by `has_path` and ignores the default.
    #[test]
    fn resolvable_paths_return_their_value(doc in document_strategy(), fallback in leaf_strategy()) {
        for (path, expected) in reachable(&doc) {
            prop_assert!(has_path(path.clone(), &doc));
            prop_assert_eq!(get_path(path, &doc, fallback.clone()), expected);
        }
    }

    /// A path that does not resolve hands back the very default it was given.
    #[test]
    fn missing_paths_return_the_default(doc in document_strategy()) {
        let missing = vec![Value::from("zz"), Value::Int(0)];
        let fallback = Value::list([Value::Int(99)]);

        prop_assert!(!has_path(missing.clone(), &doc));
        let result = get_path(missing, &doc, fallback.clone());
        let (Some(got), Some(given)) = (result.as_slice(), fallback.as_slice()) else {
            panic!("default must be returned as a list");
        };
        prop_assert!(std::ptr::eq(got.as_ptr(), given.as_ptr()));
    }

    /// Converting a parsed path back into a path changes nothing.
    #[test]
    fn to_path_is_idempotent(text in r"[ab0-9.\[\]\\]{0,8}") {
        let once = to_path(&Value::from(text.as_str()));
        let twice = to_path(&Value::from(once.clone()));
        prop_assert_eq!(twice, once);
    }

    /// Intersection keeps the distinct common items in first-sequence order.
    #[test]
    fn intersection_follows_first_sequence(
        a in prop::collection::vec(element_strategy(), 0..12),
        b in prop::collection::vec(element_strategy(), 0..12),
    ) {
        let expected: Vec<Value> = distinct(&a).into_iter().filter(|item| b.contains(item)).collect();
        let result: Vec<Value> = intersection([a, b]).collect();
        prop_assert_eq!(result, expected);
    }

    /// Union of a sequence with itself collapses repeats in first-seen order.
    #[test]
    fn union_with_itself_deduplicates(a in prop::collection::vec(element_strategy(), 0..12)) {
        let doubled: Vec<Value> = union([a.clone(), a.clone()]).collect();
        let single: Vec<Value> = union([a.clone()]).collect();
        prop_assert_eq!(&doubled, &single);
        prop_assert_eq!(single, distinct(&a));
    }

    /// Flattening an already flat sequence changes nothing.
    #[test]
    fn flatten_deep_is_idempotent(x in nested_list_strategy()) {
        let once: Vec<Value> = flatten_deep(x.to_vec()).collect();
        let twice: Vec<Value> = flatten_deep(once.clone()).collect();
        prop_assert_eq!(twice, once);
    }

    /// Symmetric difference holds exactly the items found in one input only.
    #[test]
    fn xor_keeps_items_in_exactly_one(
        a in prop::collection::vec(element_strategy(), 0..12),
        b in prop::collection::vec(element_strategy(), 0..12),
    ) {
        let result: Vec<Value> = xor([a.clone(), b.clone()]).collect();
        let all = distinct(&[a.clone(), b.clone()].concat());
        for item in &all {
            let in_one = a.contains(item) != b.contains(item);
            prop_assert_eq!(result.contains(item), in_one);
        }
        prop_assert_eq!(result.len(), distinct(&result).len());

        let with_itself: Vec<Value> = xor([a.clone(), a]).collect();
        prop_assert!(with_itself.is_empty());
    }

    /// Transposing twice restores rectangular rows.
    #[test]
    fn unzip_twice_restores_rows(
        rows in (1usize..4, 1usize..4).prop_flat_map(|(height, width)| {
            prop::collection::vec(prop::collection::vec(leaf_strategy(), width), height)
        })
    ) {
        let rows: Vec<Value> = rows.into_iter().map(Value::tuple).collect();
        let restored: Vec<Value> = unzip(unzip(rows.clone())).collect();
        prop_assert_eq!(restored, rows);
    }
}
