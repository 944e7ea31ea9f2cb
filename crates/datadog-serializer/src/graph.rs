// Copyright 2023-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

//! Per-bootstrap dependency graph of pipeline components.
//!
//! Each provider declares the constructor for one component type together
//! with the set of component types it consumes. [`GraphBuilder::resolve`]
//! validates the declared graph first (duplicates, unsatisfied inputs,
//! cycles), then runs every constructor exactly once in topological order.
//! Nothing with a side effect runs for a graph that fails validation, and a
//! background worker is only started by the caller after resolution has
//! fully succeeded.
//!
//! The builder is a plain value constructed fresh per bootstrap call; there
//! is no ambient registration.

use std::any::{type_name, Any, TypeId};
use std::collections::HashMap;
use std::sync::Arc;

use thiserror::Error;

use crate::bootstrap::BootstrapError;

#[derive(Debug, Error, PartialEq, Eq)]
#[allow(clippy::module_name_repetitions)]
pub enum GraphError {
    #[error("duplicate provider registered for component '{0}'")]
    DuplicateProvider(String),
    #[error("no provider registered for component '{dependency}' (required by '{required_by}')")]
    UnsatisfiedDependency {
        dependency: String,
        required_by: String,
    },
    #[error("dependency cycle detected at component '{0}'")]
    DependencyCycle(String),
    #[error("component '{0}' has not been constructed")]
    MissingComponent(String),
}

/// Declared input edge of a provider.
#[derive(Debug, Clone, Copy)]
pub struct Dependency {
    id: TypeId,
    name: &'static str,
}

/// Declares a dependency on the component of type `T`.
pub fn dependency<T: 'static>() -> Dependency {
    Dependency {
        id: TypeId::of::<T>(),
        name: type_name::<T>(),
    }
}

type BuildFn =
    Box<dyn FnOnce(&ComponentRegistry) -> Result<Arc<dyn Any + Send + Sync>, BootstrapError>>;

struct Provider {
    id: TypeId,
    name: &'static str,
    requires: Vec<Dependency>,
    build: BuildFn,
}

/// Write-once registry of constructed components, keyed by type.
#[derive(Default)]
pub struct ComponentRegistry {
    components: HashMap<TypeId, Arc<dyn Any + Send + Sync>>,
}

impl std::fmt::Debug for ComponentRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ComponentRegistry")
            .field("components", &self.components.len())
            .finish()
    }
}

impl ComponentRegistry {
    /// Returns the constructed component of type `T`.
    ///
    /// Inside a constructor this only succeeds for declared inputs, which is
    /// what verifies each binding at construction time.
    pub fn get<T: Send + Sync + 'static>(&self) -> Result<Arc<T>, GraphError> {
        let component = self
            .components
            .get(&TypeId::of::<T>())
            .ok_or_else(|| GraphError::MissingComponent(type_name::<T>().to_string()))?;
        Arc::clone(component)
            .downcast::<T>()
            .map_err(|_| GraphError::MissingComponent(type_name::<T>().to_string()))
    }
}

/// Declares providers and resolves them into a [`ComponentRegistry`].
#[derive(Default)]
pub struct GraphBuilder {
    providers: Vec<Provider>,
    index: HashMap<TypeId, usize>,
    duplicates: Vec<&'static str>,
}

impl GraphBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a constructor for `T` together with its declared inputs.
    ///
    /// Registration never fails; unsatisfiable inputs and duplicates are
    /// reported by [`GraphBuilder::resolve`].
    pub fn provide<T, F>(&mut self, requires: Vec<Dependency>, build: F) -> &mut Self
    where
        T: Send + Sync + 'static,
        F: FnOnce(&ComponentRegistry) -> Result<T, BootstrapError> + 'static,
    {
        self.register::<T>(
            requires,
            Box::new(move |registry| {
                build(registry).map(|value| Arc::new(value) as Arc<dyn Any + Send + Sync>)
            }),
        )
    }

    /// Registers an already-built value as a provider with no inputs.
    pub fn supply<T: Send + Sync + 'static>(&mut self, value: T) -> &mut Self {
        self.provide(Vec::new(), move |_| Ok(value))
    }

    /// Registers an already-shared value without re-wrapping it.
    pub fn supply_shared<T: Send + Sync + 'static>(&mut self, value: Arc<T>) -> &mut Self {
        self.register::<T>(
            Vec::new(),
            Box::new(move |_| Ok(value as Arc<dyn Any + Send + Sync>)),
        )
    }

    fn register<T: 'static>(&mut self, requires: Vec<Dependency>, build: BuildFn) -> &mut Self {
        let id = TypeId::of::<T>();
        if self.index.contains_key(&id) {
            self.duplicates.push(type_name::<T>());
            return self;
        }
        self.index.insert(id, self.providers.len());
        self.providers.push(Provider {
            id,
            name: type_name::<T>(),
            requires,
            build,
        });
        self
    }

    /// Validates the declared graph and constructs every component, each
    /// exactly once, in an order where a component is never built before its
    /// inputs.
    ///
    /// Validation errors identify the offending component and abort before
    /// any constructor runs.
    pub fn resolve(self) -> Result<ComponentRegistry, BootstrapError> {
        if let Some(name) = self.duplicates.first() {
            return Err(GraphError::DuplicateProvider((*name).to_string()).into());
        }
        for provider in &self.providers {
            for dep in &provider.requires {
                if !self.index.contains_key(&dep.id) {
                    return Err(GraphError::UnsatisfiedDependency {
                        dependency: dep.name.to_string(),
                        required_by: provider.name.to_string(),
                    }
                    .into());
                }
            }
        }
        let order = construction_order(&self.providers, &self.index)?;

        let mut registry = ComponentRegistry::default();
        let mut providers: Vec<Option<Provider>> = self.providers.into_iter().map(Some).collect();
        for position in order {
            let Some(provider) = providers[position].take() else {
                continue;
            };
            let built = (provider.build)(&registry)?;
            registry.components.insert(provider.id, built);
        }
        Ok(registry)
    }
}

#[derive(Clone, Copy, PartialEq)]
enum Mark {
    Unvisited,
    InProgress,
    Done,
}

// Depth-first topological sort over the declared edges. Runs before any
// constructor, so a cycle never leaves partial side effects behind.
fn construction_order(
    providers: &[Provider],
    index: &HashMap<TypeId, usize>,
) -> Result<Vec<usize>, GraphError> {
    fn visit(
        position: usize,
        providers: &[Provider],
        index: &HashMap<TypeId, usize>,
        marks: &mut [Mark],
        order: &mut Vec<usize>,
    ) -> Result<(), GraphError> {
        match marks[position] {
            Mark::Done => return Ok(()),
            Mark::InProgress => {
                return Err(GraphError::DependencyCycle(
                    providers[position].name.to_string(),
                ))
            }
            Mark::Unvisited => {}
        }
        marks[position] = Mark::InProgress;
        for dep in &providers[position].requires {
            if let Some(&next) = index.get(&dep.id) {
                visit(next, providers, index, marks, order)?;
            }
        }
        marks[position] = Mark::Done;
        order.push(position);
        Ok(())
    }

    let mut marks = vec![Mark::Unvisited; providers.len()];
    let mut order = Vec::with_capacity(providers.len());
    for position in 0..providers.len() {
        visit(position, providers, index, &mut marks, &mut order)?;
    }
    Ok(order)
}
