//! Service interface descriptor: declared return shapes per method.
//!
//! The declared shape drives built-in merger selection; an unknown method is
//! a fatal resolution failure before any merge is attempted.

use std::collections::HashMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::call::{Call, MethodSig};

/// Declared return shape of a service method.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReturnShape {
    /// No value; the operation merges to an empty result.
    Void,
    List,
    Set,
    Map,
    /// Fixed-size sequence; merged by concatenation like a list but kept as
    /// a distinct declared shape.
    Array,
    /// Single value with no built-in merge rule.
    Scalar,
}

impl fmt::Display for ReturnShape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let tag = match self {
            ReturnShape::Void => "void",
            ReturnShape::List => "list",
            ReturnShape::Set => "set",
            ReturnShape::Map => "map",
            ReturnShape::Array => "array",
            ReturnShape::Scalar => "scalar",
        };
        f.write_str(tag)
    }
}

/// Interface descriptor for one service: a method-signature to return-shape
/// table consulted once per operation.
#[derive(Clone, Debug, Default)]
pub struct ServiceDescriptor {
    service: String,
    methods: HashMap<MethodSig, ReturnShape>,
}

impl ServiceDescriptor {
    pub fn new(service: impl Into<String>) -> Self {
        Self {
            service: service.into(),
            methods: HashMap::new(),
        }
    }

    /// Declares one method and its return shape.
    #[must_use]
    pub fn with_method<S, I, P>(mut self, name: S, param_types: I, shape: ReturnShape) -> Self
    where
        S: Into<String>,
        I: IntoIterator<Item = P>,
        P: Into<String>,
    {
        self.methods.insert(MethodSig::new(name, param_types), shape);
        self
    }

    #[must_use]
    pub fn service(&self) -> &str {
        &self.service
    }

    /// Resolves the declared return shape for a call's exact signature.
    #[must_use]
    pub fn return_shape(&self, call: &Call) -> Option<ReturnShape> {
        self.methods.get(&call.signature()).copied()
    }

    /// Shape of the first declared overload with this name. Used for eager
    /// merger validation, where the parameter signature is not known yet.
    #[must_use]
    pub fn shape_of_method(&self, name: &str) -> Option<ReturnShape> {
        self.methods
            .iter()
            .find(|(sig, _)| sig.name == name)
            .map(|(_, shape)| *shape)
    }
}
