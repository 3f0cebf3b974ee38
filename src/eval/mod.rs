//! Evaluation of the merged values document
//!
//! The merged document goes through an [`Evaluator`] before it is written
//! out. [`OperatorEvaluator`] resolves spruce-style `(( ... ))` expressions;
//! [`Passthrough`] leaves the document alone.

use serde_yaml::Mapping;

mod engine;
pub mod expr;

pub use expr::{Expr, Operand};

#[derive(Debug, thiserror::Error)]
pub enum EvalError {
    #[error("{path}: {message}")]
    Syntax { path: String, message: String },

    #[error("{path}: unable to resolve `{reference}`")]
    Unresolved { path: String, reference: String },

    #[error("{path}: reference cycle detected via `{reference}`")]
    Cycle { path: String, reference: String },

    #[error("{path}: cannot concatenate non-scalar value of `{reference}`")]
    NotScalar { path: String, reference: String },

    /// A `(( param ))` that no later values file overrode.
    #[error("{path}: {message}")]
    Param { path: String, message: String },
}

pub trait Evaluator {
    fn evaluate(&self, document: Mapping) -> Result<Mapping, EvalError>;
}

/// Returns the document unchanged.
#[derive(Debug, Default, Clone, Copy)]
pub struct Passthrough;

impl Evaluator for Passthrough {
    fn evaluate(&self, document: Mapping) -> Result<Mapping, EvalError> {
        Ok(document)
    }
}

/// Resolves `grab`, `concat`, `param` and `prune` expressions.
#[derive(Debug, Default, Clone, Copy)]
pub struct OperatorEvaluator;

impl Evaluator for OperatorEvaluator {
    fn evaluate(&self, document: Mapping) -> Result<Mapping, EvalError> {
        engine::Engine::new(document).run()
    }
}
