//! Semantic analysis: type inference, structural checks and domain
//! classification.
//!
//! A single top-down pass over the specification. Every data expression
//! gets its `ty` slot filled; the first structural violation aborts the
//! pass.

mod clause;
mod data;

use std::collections::HashMap;

use tracing::debug;

use crate::ast::Specification;
use crate::error::CheckError;
use crate::types::{Domain, ValueType};

/// Result of looking a name up in the type environment.
///
/// Names the specification never binds are not errors: they refer to
/// configuration parameters supplied by the harness, which are scalars.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Binding {
    Bound(ValueType),
    External,
}

impl Binding {
    /// Type of the referenced value, with the external-parameter fallback.
    pub fn ty(&self) -> ValueType {
        match self {
            Binding::Bound(ty) => ty.clone(),
            Binding::External => ValueType::Scalar,
        }
    }
}

/// Lexically scoped name → type map. The bottom scope holds the
/// specification's declarations.
#[derive(Clone, Debug)]
pub struct TypeEnv {
    scopes: Vec<HashMap<String, ValueType>>,
}

impl TypeEnv {
    pub fn new() -> Self {
        Self {
            scopes: vec![HashMap::new()],
        }
    }

    pub fn push_scope(&mut self) {
        self.scopes.push(HashMap::new());
    }

    pub fn pop_scope(&mut self) {
        if self.scopes.len() > 1 {
            self.scopes.pop();
        }
    }

    pub fn define(&mut self, name: &str, ty: ValueType) {
        if let Some(scope) = self.scopes.last_mut() {
            scope.insert(name.to_string(), ty);
        }
    }

    pub fn lookup(&self, name: &str) -> Binding {
        for scope in self.scopes.iter().rev() {
            if let Some(ty) = scope.get(name) {
                return Binding::Bound(ty.clone());
            }
        }
        Binding::External
    }
}

pub struct TypeChecker {
    env: TypeEnv,
}

impl Default for TypeChecker {
    fn default() -> Self {
        Self::new()
    }
}

impl TypeChecker {
    pub fn new() -> Self {
        Self {
            env: TypeEnv::new(),
        }
    }

    pub fn lookup(&self, name: &str) -> Binding {
        self.env.lookup(name)
    }

    /// Annotate `spec` in place and return its probability domain.
    pub fn check_spec(&mut self, spec: &mut Specification) -> Result<Domain, CheckError> {
        spec.require_declarations()?;
        for decl in &spec.decls {
            self.env.define(&decl.name, decl.ty.clone());
        }

        if let Some(acc) = spec.accuracy.as_mut() {
            self.check_bool(acc)?;
        }
        if let Some(time) = spec.time.as_mut() {
            self.check_data(time)?;
        }
        if let Some(space) = spec.space.as_mut() {
            self.check_data(space)?;
        }

        let domain = spec.domain();
        debug!(%domain, decls = spec.decls.len(), "analyzed specification");
        Ok(domain)
    }

    fn push_scope(&mut self) {
        self.env.push_scope();
    }

    fn pop_scope(&mut self) {
        self.env.pop_scope();
    }
}

/// Run the analyzer with a fresh environment.
pub fn analyze(spec: &mut Specification) -> Result<Domain, CheckError> {
    TypeChecker::new().check_spec(spec)
}
