//! Host callables and their signatures.
//!
//! A [`Function`] carries an optional [`Signature`]. Functions without a
//! signature behave like native builtins: they can be called, but nothing can
//! be learned about their parameters, so any shape check against them fails.

use std::fmt;
use std::sync::Arc;

use super::value::Value;
use crate::error::CallError;

/// Native body of a host function. Bound receivers arrive as the first argument.
pub type NativeFn = Arc<dyn Fn(&[Value]) -> Result<Value, CallError> + Send + Sync>;

/// A single positional parameter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Param {
    pub name: String,
    pub has_default: bool,
}

/// Formal parameter list of a host function, receiver included.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Signature {
    params: Vec<Param>,
    varargs: Option<String>,
    kwargs: Option<String>,
}

impl Signature {
    /// Create an empty signature.
    pub fn new() -> Self {
        Self::default()
    }

    /// Signature with the given required positional parameters.
    pub fn positional<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        names.into_iter().fold(Self::new(), |sig, name| sig.param(name))
    }

    /// Append a required positional parameter.
    pub fn param(mut self, name: impl Into<String>) -> Self {
        self.params.push(Param {
            name: name.into(),
            has_default: false,
        });
        self
    }

    /// Append a positional parameter with a default value.
    pub fn optional(mut self, name: impl Into<String>) -> Self {
        self.params.push(Param {
            name: name.into(),
            has_default: true,
        });
        self
    }

    /// Capture extra positional arguments (`*args`).
    pub fn varargs(mut self, name: impl Into<String>) -> Self {
        self.varargs = Some(name.into());
        self
    }

    /// Capture extra keyword arguments (`**kwargs`).
    pub fn kwargs(mut self, name: impl Into<String>) -> Self {
        self.kwargs = Some(name.into());
        self
    }

    pub fn params(&self) -> &[Param] {
        &self.params
    }

    pub fn has_varargs(&self) -> bool {
        self.varargs.is_some()
    }

    pub fn has_kwargs(&self) -> bool {
        self.kwargs.is_some()
    }

    /// Portable view of this signature after dropping `skip` receiver parameters.
    ///
    /// Defaults are counted over the full parameter list, so a receiver never
    /// reduces the optional count.
    pub fn view(&self, skip: usize) -> CallableSignature {
        let positional_names: Vec<String> = self
            .params
            .iter()
            .skip(skip)
            .map(|p| p.name.clone())
            .collect();
        let optional_count = self.params.iter().filter(|p| p.has_default).count();

        CallableSignature {
            required_count: positional_names.len().saturating_sub(optional_count),
            positional_names,
            optional_count,
            has_variadic_positional: self.varargs.is_some(),
            has_variadic_keyword: self.kwargs.is_some(),
        }
    }
}

/// Receiver-free summary of a callable's parameters.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CallableSignature {
    pub positional_names: Vec<String>,
    pub required_count: usize,
    pub optional_count: usize,
    pub has_variadic_positional: bool,
    pub has_variadic_keyword: bool,
}

/// A named host function.
pub struct Function {
    name: String,
    signature: Option<Signature>,
    body: Option<NativeFn>,
}

impl Function {
    /// An introspectable function without a body.
    pub fn new(name: impl Into<String>, signature: Signature) -> Self {
        Self {
            name: name.into(),
            signature: Some(signature),
            body: None,
        }
    }

    /// A builtin-style function whose parameters cannot be introspected.
    pub fn opaque(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            signature: None,
            body: None,
        }
    }

    /// Attach a native body.
    pub fn with_body<F>(mut self, body: F) -> Self
    where
        F: Fn(&[Value]) -> Result<Value, CallError> + Send + Sync + 'static,
    {
        self.body = Some(Arc::new(body));
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// `None` when the function cannot be introspected.
    pub fn signature(&self) -> Option<&Signature> {
        self.signature.as_ref()
    }

    /// Invoke the native body with fully-bound arguments.
    ///
    /// Arity is checked against the signature when there is one.
    pub fn call(&self, args: &[Value]) -> Result<Value, CallError> {
        let body = self.body.as_ref().ok_or_else(|| CallError::NoBody {
            name: self.name.clone(),
        })?;

        if let Some(sig) = &self.signature {
            let view = sig.view(0);
            let max = view.positional_names.len();
            let min = view.required_count;
            let too_few = args.len() < min;
            let too_many = args.len() > max && !sig.has_varargs();
            if too_few || too_many {
                return Err(CallError::Arity {
                    name: self.name.clone(),
                    expected: if too_few { min } else { max },
                    given: args.len(),
                });
            }
        }

        body(args)
    }
}

impl fmt::Debug for Function {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Function")
            .field("name", &self.name)
            .field("signature", &self.signature)
            .field("native", &self.body.is_some())
            .finish()
    }
}

/// A function bound to its receiver.
#[derive(Debug)]
pub struct BoundMethod {
    receiver: Value,
    function: Arc<Function>,
}

impl BoundMethod {
    pub fn new(receiver: Value, function: Arc<Function>) -> Self {
        Self { receiver, function }
    }

    pub fn receiver(&self) -> &Value {
        &self.receiver
    }

    pub fn function(&self) -> &Arc<Function> {
        &self.function
    }

    /// Call with the receiver prepended.
    pub fn call(&self, args: &[Value]) -> Result<Value, CallError> {
        let mut bound = Vec::with_capacity(args.len() + 1);
        bound.push(self.receiver.clone());
        bound.extend_from_slice(args);
        self.function.call(&bound)
    }
}
