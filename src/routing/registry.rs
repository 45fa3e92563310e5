//! Contract lookup by request path.
//!
//! # Responsibilities
//! - Store compiled contracts in registration order
//! - Look up the contract whose template matches a path
//! - Look up a contract by operation name (client side)
//!
//! # Design Decisions
//! - Immutable after construction (shared via Arc, no locks)
//! - O(n) template scan, first registered match wins
//! - No specificity ordering: `/foo/:id` registered before `/foo/bar` shadows it

use std::sync::Arc;

use thiserror::Error;

use crate::contract::Contract;
use crate::routing::template::TemplateError;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistryError {
    #[error(transparent)]
    Template(#[from] TemplateError),

    #[error("template '{0}' is already registered")]
    DuplicateTemplate(String),

    #[error("operation '{0}' is already registered")]
    DuplicateOperation(String),
}

/// A contract matched against a concrete path.
#[derive(Debug, Clone)]
pub struct RouteMatch<'p> {
    pub contract: Arc<Contract>,
    /// Raw path segments captured by the template's parameters, in template order.
    pub captures: Vec<&'p str>,
}

/// The compiled contracts of one service.
#[derive(Debug, Default)]
pub struct RouteRegistry {
    contracts: Vec<Arc<Contract>>,
}

impl RouteRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a contract. Templates and operation names must be unique.
    pub fn insert(&mut self, contract: Contract) -> Result<Arc<Contract>, RegistryError> {
        if self
            .contracts
            .iter()
            .any(|c| c.template.pattern() == contract.template.pattern())
        {
            return Err(RegistryError::DuplicateTemplate(
                contract.template.pattern().to_string(),
            ));
        }
        if self.get(&contract.operation_name).is_some() {
            return Err(RegistryError::DuplicateOperation(contract.operation_name));
        }

        tracing::debug!(
            operation = %contract.operation_name,
            method = %contract.method,
            template = %contract.template,
            "Registered operation"
        );

        let contract = Arc::new(contract);
        self.contracts.push(contract.clone());
        Ok(contract)
    }

    /// Find the first contract whose template matches `path`.
    pub fn match_path<'p>(&self, path: &'p str) -> Option<RouteMatch<'p>> {
        self.contracts.iter().find_map(|contract| {
            contract.template.captures(path).map(|captures| RouteMatch {
                contract: contract.clone(),
                captures,
            })
        })
    }

    pub fn get(&self, operation_name: &str) -> Option<&Arc<Contract>> {
        self.contracts
            .iter()
            .find(|c| c.operation_name == operation_name)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Arc<Contract>> {
        self.contracts.iter()
    }

    pub fn len(&self) -> usize {
        self.contracts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.contracts.is_empty()
    }
}
