//! Built-in mergers for list, set, map and array return shapes.

use std::collections::{BTreeMap, BTreeSet};

use anyhow::bail;

use crate::value::Value;

/// Concatenates list results in collection order; per-input element order is
/// preserved.
pub(crate) fn merge_lists(inputs: Vec<Value>) -> anyhow::Result<Value> {
    let mut merged = Vec::new();
    for input in inputs {
        match input {
            Value::List(items) => merged.extend(items),
            other => bail!("expected a list result, got {}", other.shape_name()),
        }
    }
    Ok(Value::List(merged))
}

/// Unions set results; duplicate elements collapse by equality.
pub(crate) fn merge_sets(inputs: Vec<Value>) -> anyhow::Result<Value> {
    let mut merged = BTreeSet::new();
    for input in inputs {
        match input {
            Value::Set(items) => merged.extend(items),
            other => bail!("expected a set result, got {}", other.shape_name()),
        }
    }
    Ok(Value::Set(merged))
}

/// Unions map results; on key collision the input visited later wins.
pub(crate) fn merge_maps(inputs: Vec<Value>) -> anyhow::Result<Value> {
    let mut merged = BTreeMap::new();
    for input in inputs {
        match input {
            Value::Map(entries) => merged.extend(entries),
            other => bail!("expected a map result, got {}", other.shape_name()),
        }
    }
    Ok(Value::Map(merged))
}

/// Concatenates array results into one new array, in collection order.
/// Arrays are carried as list values; the distinction is the declared shape.
pub(crate) fn merge_arrays(inputs: Vec<Value>) -> anyhow::Result<Value> {
    let mut merged = Vec::new();
    for input in inputs {
        match input {
            Value::List(items) => merged.extend(items),
            other => bail!("expected an array result, got {}", other.shape_name()),
        }
    }
    Ok(Value::List(merged))
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;

    #[test]
    fn lists_concatenate_preserving_input_order() {
        let merged = merge_lists(vec![
            Value::list([Value::from(1)]),
            Value::list([Value::from(2), Value::from(3)]),
            Value::list([Value::from(4)]),
        ])
        .unwrap();

        assert_eq!(
            merged,
            Value::list([
                Value::from(1),
                Value::from(2),
                Value::from(3),
                Value::from(4)
            ])
        );
    }

    #[test]
    fn sets_union_collapses_duplicates() {
        let merged = merge_sets(vec![
            Value::set([Value::from(1), Value::from(2)]),
            Value::set([Value::from(2), Value::from(3)]),
            Value::set([Value::from(3), Value::from(4)]),
        ])
        .unwrap();

        let expected = Value::set([
            Value::from(1),
            Value::from(2),
            Value::from(3),
            Value::from(4),
        ]);
        assert_eq!(merged, expected);

        // Union is idempotent: merging the result with itself changes nothing.
        let again = merge_sets(vec![merged.clone(), merged]).unwrap();
        assert_eq!(again, expected);
    }

    #[test]
    fn maps_union_with_later_input_overwriting() {
        let merged = merge_maps(vec![
            Value::map([("a", Value::from(1)), ("b", Value::from(2))]),
            Value::map([("a", Value::from(9))]),
        ])
        .unwrap();

        assert_eq!(
            merged,
            Value::map([("a", Value::from(9)), ("b", Value::from(2))])
        );
    }

    #[test]
    fn arrays_concatenate_in_collection_order() {
        let merged = merge_arrays(vec![
            Value::list([Value::from("x")]),
            Value::list([Value::from("y")]),
        ])
        .unwrap();
        assert_eq!(merged, Value::list([Value::from("x"), Value::from("y")]));
    }

    #[test]
    fn shape_mismatch_is_an_error() {
        let err = merge_lists(vec![Value::from(1)]).unwrap_err();
        assert!(err.to_string().contains("expected a list result"));

        assert!(merge_sets(vec![Value::list([])]).is_err());
        assert!(merge_maps(vec![Value::set([])]).is_err());
        assert!(merge_arrays(vec![Value::from("x")]).is_err());
    }

    #[test]
    fn empty_inputs_merge_to_empty_collections() {
        assert_eq!(merge_lists(Vec::new()).unwrap(), Value::list([]));
        assert_eq!(merge_sets(Vec::new()).unwrap(), Value::set([]));
        assert_eq!(merge_maps(Vec::new()).unwrap(), Value::map::<String, _>([]));
    }
}
