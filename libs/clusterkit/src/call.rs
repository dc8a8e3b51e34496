//! One logical invocation fanned out to every provider endpoint.

use std::fmt;

use crate::value::Value;

/// Method signature key used for return-shape resolution.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct MethodSig {
    pub name: String,
    pub param_types: Vec<String>,
}

impl MethodSig {
    pub fn new<S, I, P>(name: S, param_types: I) -> Self
    where
        S: Into<String>,
        I: IntoIterator<Item = P>,
        P: Into<String>,
    {
        Self {
            name: name.into(),
            param_types: param_types.into_iter().map(Into::into).collect(),
        }
    }
}

impl fmt::Display for MethodSig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}({})", self.name, self.param_types.join(", "))
    }
}

/// A single logical remote call: method, parameter-type signature and
/// argument values. Immutable; [`Call::retarget`] produces the per-endpoint
/// copy dispatched to one provider.
#[derive(Clone, Debug)]
pub struct Call {
    method: String,
    param_types: Vec<String>,
    args: Vec<Value>,
    target: Option<String>,
}

impl Call {
    pub fn new(method: impl Into<String>) -> Self {
        Self {
            method: method.into(),
            param_types: Vec::new(),
            args: Vec::new(),
            target: None,
        }
    }

    /// Appends one typed argument.
    #[must_use]
    pub fn with_arg(mut self, param_type: impl Into<String>, arg: Value) -> Self {
        self.param_types.push(param_type.into());
        self.args.push(arg);
        self
    }

    #[must_use]
    pub fn method(&self) -> &str {
        &self.method
    }

    #[must_use]
    pub fn param_types(&self) -> &[String] {
        &self.param_types
    }

    #[must_use]
    pub fn args(&self) -> &[Value] {
        &self.args
    }

    /// URI of the endpoint this copy is aimed at, once re-targeted.
    #[must_use]
    pub fn target(&self) -> Option<&str> {
        self.target.as_deref()
    }

    #[must_use]
    pub fn signature(&self) -> MethodSig {
        MethodSig {
            name: self.method.clone(),
            param_types: self.param_types.clone(),
        }
    }

    /// Copy of this call aimed at a specific endpoint URI.
    #[must_use]
    pub fn retarget(&self, uri: impl Into<String>) -> Self {
        Self {
            method: self.method.clone(),
            param_types: self.param_types.clone(),
            args: self.args.clone(),
            target: Some(uri.into()),
        }
    }
}
