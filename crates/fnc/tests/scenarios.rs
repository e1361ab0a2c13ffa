//! End-to-end scenarios across paths, iteratees, sequences and retry.

use std::cell::Cell;
use std::rc::Rc;

use fnc::{
    chunk, compose, difference, duplicates, filter, find_index, get_path, group_all, group_by,
    has_path, interleave, intersection, iteratee, map, map_many, merge, partial, pick, to_path,
    try_get_path, union, unzip, xor, FncError, Func, Iteratee, Retry, RetryPolicy, Step, Value,
};
use serde_json::json;

fn items(json: serde_json::Value) -> Vec<Value> {
    Value::from(json).to_vec()
}

#[test]
fn chunk_splits_into_batches() {
    let batches: Vec<Vec<Value>> = chunk(2, items(json!([1, 2, 3, 4, 5]))).unwrap().collect();
    assert_eq!(
        batches,
        vec![items(json!([1, 2])), items(json!([3, 4])), items(json!([5]))]
    );
    assert!(matches!(
        chunk(0, items(json!([1]))).map(|_| ()),
        Err(FncError::InvalidArgument(_))
    ));
}

#[test]
fn get_path_walks_nested_containers() {
    let obj = Value::from(json!({"a": {"b": [{"c": 1}]}}));
    assert_eq!(get_path("a.b[0].c", &obj, Value::Null), Value::Int(1));
    let segments: Vec<Value> = ["a", "b", "0", "c"].map(Value::from).to_vec();
    assert_eq!(get_path(segments, &obj, Value::Null), Value::Int(1));
    assert!(has_path("a.b[0]", &obj));
    assert!(!has_path("a.b[1]", &obj));

    let err = try_get_path("a.x.c", &obj).unwrap_err();
    match err {
        FncError::PathNotFound { path, segment } => {
            assert_eq!(path, to_path(&Value::from("a.x.c")));
            assert_eq!(segment, Value::from("x"));
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[test]
fn map_shorthand_conforms() {
    let it = Iteratee::from(Value::map([("a", 1)]));
    assert!(it.test(&Value::from(json!({"a": 1, "b": 2}))));
    assert!(!it.test(&Value::from(json!({"a": 2}))));
}

#[test]
fn group_by_path_shorthand() {
    let groups = group_by("a", items(json!([{"a": 1, "b": 2}, {"a": 3, "b": 4}])));
    assert_eq!(groups.len(), 2);
    assert_eq!(groups[&Value::Int(1)], items(json!([{"a": 1, "b": 2}])));
    assert_eq!(groups[&Value::Int(3)], items(json!([{"a": 3, "b": 4}])));
}

#[test]
fn group_all_nests_levels() {
    let rows = items(json!([
        {"team": "red", "role": "dev", "name": "ada"},
        {"team": "red", "role": "ops", "name": "bob"},
        {"team": "blue", "role": "dev", "name": "cy"},
    ]));
    let nested = group_all(["team", "role"], rows);
    assert_eq!(
        get_path(Value::list(["red", "ops"]), &nested, Value::Null),
        Value::from(json!([{"team": "red", "role": "ops", "name": "bob"}]))
    );
    assert_eq!(
        get_path("blue.dev[0].name", &nested, Value::Null),
        Value::from("cy")
    );
}

#[test]
fn retry_counts_calls_and_sleeps() {
    let policy = RetryPolicy::builder().attempts(3).delay(0.0).build().unwrap();
    let sleeps = Rc::new(Cell::new(0));
    let counter = sleeps.clone();
    let retry = Retry::new(policy).with_sleep(move |_| counter.set(counter.get() + 1));

    let calls = Cell::new(0);
    let result: Result<(), String> = retry.call(|| {
        calls.set(calls.get() + 1);
        Err(format!("failure {}", calls.get()))
    });

    assert_eq!(result, Err("failure 3".to_string()));
    assert_eq!(calls.get(), 3);
    assert_eq!(sleeps.get(), 2);
}

#[test]
fn interleave_round_robins() {
    let woven: Vec<Value> = interleave([
        items(json!([1, 2, 3])),
        items(json!([4])),
        items(json!([5, 6])),
    ])
    .collect();
    assert_eq!(woven, items(json!([1, 4, 5, 2, 6, 3])));
}

#[test]
fn set_operators_handle_unhashable_items() {
    let a = items(json!([[1], {"k": 1}, [1], 2]));
    let b = items(json!([{"k": 1}, 3]));

    let all: Vec<Value> = union([a.clone(), b.clone()]).collect();
    assert_eq!(all, items(json!([[1], {"k": 1}, 2, 3])));

    let common: Vec<Value> = intersection([a.clone(), b.clone()]).collect();
    assert_eq!(common, items(json!([{"k": 1}])));

    let only_a: Vec<Value> = difference([a.clone(), b.clone()]).collect();
    assert_eq!(only_a, items(json!([[1], 2])));

    let repeated: Vec<Value> = duplicates([a.clone()]).collect();
    assert_eq!(repeated, items(json!([[1]])));

    let either: Vec<Value> = xor([a, b]).collect();
    assert_eq!(either, items(json!([[1], 2, 3])));
}

#[test]
fn booleans_and_integers_stay_distinct() {
    let mixed: Vec<Value> =
        union([vec![Value::Int(1), Value::Bool(true), Value::Float(1.0)]]).collect();
    assert_eq!(mixed, vec![Value::Int(1), Value::Bool(true)]);
}

#[test]
fn operators_stay_lazy_over_infinite_input() {
    let naturals = (0..).map(Value::Int);
    let is_even = Iteratee::predicate(|v| v.as_int().is_some_and(|n| n % 2 == 0));
    let evens: Vec<Value> = filter(is_even, naturals).take(3).collect();
    assert_eq!(evens, vec![Value::Int(0), Value::Int(2), Value::Int(4)]);

    let index = find_index(Iteratee::predicate(|v| v.as_int() == Some(10)), (0..).map(Value::Int));
    assert_eq!(index, Some(10));

    let firsts: Vec<Value> = union([(0..).map(|n| Value::Int(n % 3))]).take(3).collect();
    assert_eq!(firsts, items(json!([0, 1, 2])));
}

#[test]
fn map_many_receives_one_argument_per_sequence() {
    let add = Func::new(|args| Value::Int(args.iter().filter_map(Value::as_int).sum()));
    let sums: Vec<Value> = map_many(add, [items(json!([1, 2, 3])), items(json!([10, 20]))]).collect();
    assert_eq!(sums, items(json!([11, 22])));
}

#[test]
fn unzip_transposes_rows() {
    let rows = items(json!([["a", 1, true], ["b", 2, false]]));
    let columns: Vec<Value> = unzip(rows).collect();
    assert_eq!(
        columns,
        vec![
            Value::tuple(["a", "b"]),
            Value::tuple([1, 2]),
            Value::tuple([true, false]),
        ]
    );
}

#[test]
fn composed_pipeline_over_records() {
    let pipeline = compose([
        Step::Partial(fnc::funcs::filter(), vec![Value::from("active")]),
        Step::Partial(fnc::funcs::map(), vec![Value::tuple(["name", "age"])]),
    ]);
    let people = Value::from(json!([
        {"name": "fred", "age": 40, "active": true},
        {"name": "barney", "age": 36, "active": false},
    ]));
    assert_eq!(
        pipeline.call1(&people),
        Value::list([Value::tuple([Value::from("fred"), Value::Int(40)])])
    );
}

#[test]
fn partial_and_iteratee_handles() {
    let pick_name = partial(
        Func::new(|args| pick(args[0].to_vec(), &args[1])),
        vec![Value::list(["name"])],
    );
    let user = Value::from(json!({"name": "ada", "id": 7}));
    assert_eq!(pick_name.call1(&user), Value::from(json!({"name": "ada"})));

    let get_id = iteratee("id");
    let ids: Vec<Value> = map(get_id, vec![user]).collect();
    assert_eq!(ids, vec![Value::Int(7)]);
}

#[test]
fn merge_keeps_first_key_position() {
    let merged = merge([
        Value::from(json!({"a": 1, "b": 2})),
        Value::from(json!({"b": 3})),
    ]);
    let entries: Vec<(Value, Value)> = fnc::iterate(&merged).collect();
    assert_eq!(
        entries,
        vec![
            (Value::from("a"), Value::Int(1)),
            (Value::from("b"), Value::Int(3)),
        ]
    );
}
