//! Merge strategy registry and result merging.
//!
//! Strategy selection for a non-void return shape with a non-empty result
//! set, in order:
//! 1. the custom merger named in the method configuration,
//! 2. the built-in merger registered for the return shape,
//! 3. otherwise the operation fails: no merger is available.
//!
//! The registry replaces the original design's reflective method lookup:
//! built-ins are keyed by shape tag, custom mergers by name, and whether a
//! custom merger folds or mutates in place is declared at registration time.

mod builtin;

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use parking_lot::RwLock;

use crate::descriptor::ReturnShape;
use crate::error::ClusterError;
use crate::value::Value;

/// Merge function backing one built-in return shape.
pub type ShapeMergeFn = fn(Vec<Value>) -> anyhow::Result<Value>;

type FoldFn = dyn Fn(Value, Value) -> anyhow::Result<Value> + Send + Sync;
type MutateFn = dyn Fn(&mut Value, Value) -> anyhow::Result<()> + Send + Sync;

/// Caller-supplied merger resolved by name from the method configuration.
///
/// The first collected result seeds the accumulator; each remaining result
/// is applied left to right.
#[derive(Clone)]
pub enum CustomMerger {
    /// Reduction: the accumulator is replaced by the function's return value.
    Fold(Arc<FoldFn>),
    /// In-place mutation: the accumulator itself absorbs each result.
    Mutate(Arc<MutateFn>),
}

impl fmt::Debug for CustomMerger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CustomMerger::Fold(_) => f.write_str("CustomMerger::Fold"),
            CustomMerger::Mutate(_) => f.write_str("CustomMerger::Mutate"),
        }
    }
}

/// Registry of merge algorithms: shape tags map to built-ins, names map to
/// custom mergers. Re-registering a name overwrites the previous merger.
pub struct MergerRegistry {
    by_shape: HashMap<ReturnShape, ShapeMergeFn>,
    by_name: RwLock<HashMap<String, CustomMerger>>,
}

impl MergerRegistry {
    /// Registry with the four built-in shape mergers, also reachable by the
    /// reserved names `list`, `set`, `map` and `array`.
    pub fn new() -> Self {
        let mut by_shape: HashMap<ReturnShape, ShapeMergeFn> = HashMap::new();
        by_shape.insert(ReturnShape::List, builtin::merge_lists);
        by_shape.insert(ReturnShape::Set, builtin::merge_sets);
        by_shape.insert(ReturnShape::Map, builtin::merge_maps);
        by_shape.insert(ReturnShape::Array, builtin::merge_arrays);

        let registry = Self {
            by_shape,
            by_name: RwLock::new(HashMap::new()),
        };
        registry.register_fold("list", |acc, next| builtin::merge_lists(vec![acc, next]));
        registry.register_fold("set", |acc, next| builtin::merge_sets(vec![acc, next]));
        registry.register_fold("map", |acc, next| builtin::merge_maps(vec![acc, next]));
        registry.register_fold("array", |acc, next| builtin::merge_arrays(vec![acc, next]));
        registry
    }

    /// Registers a fold merger under `name`.
    pub fn register_fold<F>(&self, name: impl Into<String>, f: F)
    where
        F: Fn(Value, Value) -> anyhow::Result<Value> + Send + Sync + 'static,
    {
        self.by_name
            .write()
            .insert(name.into(), CustomMerger::Fold(Arc::new(f)));
    }

    /// Registers an in-place mutation merger under `name`.
    pub fn register_mutating<F>(&self, name: impl Into<String>, f: F)
    where
        F: Fn(&mut Value, Value) -> anyhow::Result<()> + Send + Sync + 'static,
    {
        self.by_name
            .write()
            .insert(name.into(), CustomMerger::Mutate(Arc::new(f)));
    }

    #[must_use]
    pub fn custom(&self, name: &str) -> Option<CustomMerger> {
        self.by_name.read().get(name).cloned()
    }

    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.by_name.read().contains_key(name)
    }

    #[must_use]
    pub fn for_shape(&self, shape: ReturnShape) -> Option<ShapeMergeFn> {
        self.by_shape.get(&shape).copied()
    }
}

impl Default for MergerRegistry {
    fn default() -> Self {
        Self::new()
    }
}

/// Merges collected results according to the selected strategy.
///
/// A void shape or an empty result set short-circuits to [`Value::Null`].
pub(crate) fn merge(
    registry: &MergerRegistry,
    shape: ReturnShape,
    merger: Option<&str>,
    results: Vec<Value>,
) -> Result<Value, ClusterError> {
    if matches!(shape, ReturnShape::Void) || results.is_empty() {
        return Ok(Value::Null);
    }

    if let Some(name) = merger {
        let Some(custom) = registry.custom(name) else {
            return Err(ClusterError::MergerNotFound {
                merger: name.to_owned(),
                shape,
            });
        };
        return apply_custom(name, &custom, results);
    }

    match registry.for_shape(shape) {
        Some(merge_fn) => merge_fn(results).map_err(|source| ClusterError::MergeExecution {
            merger: shape.to_string(),
            source,
        }),
        None => Err(ClusterError::NoMergerForShape { shape }),
    }
}

fn apply_custom(
    name: &str,
    custom: &CustomMerger,
    results: Vec<Value>,
) -> Result<Value, ClusterError> {
    let mut iter = results.into_iter();
    let Some(mut acc) = iter.next() else {
        return Ok(Value::Null);
    };

    match custom {
        CustomMerger::Fold(f) => {
            for next in iter {
                acc = f(acc, next).map_err(|source| ClusterError::MergeExecution {
                    merger: name.to_owned(),
                    source,
                })?;
            }
        }
        CustomMerger::Mutate(f) => {
            for next in iter {
                f(&mut acc, next).map_err(|source| ClusterError::MergeExecution {
                    merger: name.to_owned(),
                    source,
                })?;
            }
        }
    }

    Ok(acc)
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;
    use anyhow::anyhow;

    fn ints(values: impl IntoIterator<Item = i64>) -> Vec<Value> {
        values.into_iter().map(Value::from).collect()
    }

    #[test]
    fn void_shape_merges_to_null() {
        let registry = MergerRegistry::new();
        let merged = merge(
            &registry,
            ReturnShape::Void,
            None,
            vec![Value::list([Value::from(1)])],
        )
        .unwrap();
        assert!(merged.is_null());
    }

    #[test]
    fn empty_results_merge_to_null() {
        let registry = MergerRegistry::new();
        let merged = merge(&registry, ReturnShape::List, None, Vec::new()).unwrap();
        assert!(merged.is_null());
    }

    #[test]
    fn custom_merger_wins_over_shape_rule() {
        let registry = MergerRegistry::new();
        registry.register_fold("keep_first", |acc, _next| Ok(acc));

        let inputs = vec![
            Value::list([Value::from(1)]),
            Value::list([Value::from(2)]),
        ];
        let merged = merge(&registry, ReturnShape::List, Some("keep_first"), inputs).unwrap();
        // The shape rule would have concatenated.
        assert_eq!(merged, Value::list([Value::from(1)]));
    }

    #[test]
    fn fold_seeds_accumulator_from_first_result() {
        let registry = MergerRegistry::new();
        registry.register_fold("sum", |acc, next| {
            let (a, b) = (acc.as_int(), next.as_int());
            match (a, b) {
                (Some(a), Some(b)) => Ok(Value::from(a + b)),
                _ => Err(anyhow!("sum expects int results")),
            }
        });

        let merged = merge(&registry, ReturnShape::Scalar, Some("sum"), ints([1, 2, 3])).unwrap();
        assert_eq!(merged, Value::from(6));
    }

    #[test]
    fn mutating_merger_applies_in_place_to_first_result() {
        let registry = MergerRegistry::new();
        registry.register_mutating("append_all", |acc, next| {
            let Value::List(items) = acc else {
                return Err(anyhow!("append_all expects list results"));
            };
            match next {
                Value::List(more) => {
                    items.extend(more);
                    Ok(())
                }
                other => Err(anyhow!("append_all got {}", other.shape_name())),
            }
        });

        let inputs = vec![
            Value::list([Value::from(1)]),
            Value::list([Value::from(2)]),
            Value::list([Value::from(3)]),
        ];
        let merged = merge(&registry, ReturnShape::List, Some("append_all"), inputs).unwrap();
        assert_eq!(
            merged,
            Value::list([Value::from(1), Value::from(2), Value::from(3)])
        );
    }

    #[test]
    fn merger_failure_wraps_cause() {
        let registry = MergerRegistry::new();
        registry.register_fold("explode", |_, _| Err(anyhow!("boom")));

        let err = merge(
            &registry,
            ReturnShape::Scalar,
            Some("explode"),
            ints([1, 2]),
        )
        .unwrap_err();
        match err {
            ClusterError::MergeExecution { merger, source } => {
                assert_eq!(merger, "explode");
                assert_eq!(source.to_string(), "boom");
            }
            other => panic!("expected MergeExecution, got {other}"),
        }
    }

    #[test]
    fn unknown_named_merger_is_a_configuration_error() {
        let registry = MergerRegistry::new();
        let err = merge(&registry, ReturnShape::List, Some("bogus"), ints([1])).unwrap_err();
        assert!(matches!(
            err,
            ClusterError::MergerNotFound { ref merger, .. } if merger == "bogus"
        ));
    }

    #[test]
    fn scalar_shape_without_merger_has_no_rule() {
        let registry = MergerRegistry::new();
        let err = merge(&registry, ReturnShape::Scalar, None, ints([1, 2])).unwrap_err();
        assert!(matches!(
            err,
            ClusterError::NoMergerForShape {
                shape: ReturnShape::Scalar
            }
        ));
    }

    #[test]
    fn reserved_names_reach_the_builtins() {
        let registry = MergerRegistry::new();
        assert!(registry.contains("list"));
        assert!(registry.contains("set"));
        assert!(registry.contains("map"));
        assert!(registry.contains("array"));

        let inputs = vec![
            Value::set([Value::from(1), Value::from(2)]),
            Value::set([Value::from(2), Value::from(3)]),
        ];
        let merged = merge(&registry, ReturnShape::Set, Some("set"), inputs).unwrap();
        assert_eq!(
            merged,
            Value::set([Value::from(1), Value::from(2), Value::from(3)])
        );
    }

    #[test]
    fn re_registering_a_name_overwrites() {
        let registry = MergerRegistry::new();
        registry.register_fold("pick", |acc, _| Ok(acc));
        registry.register_fold("pick", |_, next| Ok(next));

        let merged = merge(&registry, ReturnShape::Scalar, Some("pick"), ints([1, 2])).unwrap();
        assert_eq!(merged, Value::from(2));
    }
}
