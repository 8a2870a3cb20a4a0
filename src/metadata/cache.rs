//! Metadata cache
//!
//! Types register a definition function once at setup time. The first
//! lookup of a type runs that function, checks the result and stores the
//! descriptor for the life of the cache. Later lookups return the stored
//! descriptor without running the definition again.
//!
//! First resolution is safe to race: two threads may both build a
//! descriptor, but only the first one stored is ever handed out.

use std::collections::HashMap;
use std::fmt;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, RwLock};

use crate::errors::{MapResult, MapperError};
use crate::observability::{log_event_with_fields, Event};

use super::definition::TypeDefinition;
use super::types::{FieldDescriptor, Property, RelationDescriptor, TypeDescriptor};

type DefineFn = Box<dyn Fn() -> TypeDefinition + Send + Sync>;

/// Registry of type definitions plus the memoized descriptors built from them.
pub struct MetadataCache {
    definitions: HashMap<String, DefineFn>,
    resolved: RwLock<HashMap<String, Arc<TypeDescriptor>>>,
    resolutions: AtomicUsize,
}

impl MetadataCache {
    pub fn new() -> Self {
        Self {
            definitions: HashMap::new(),
            resolved: RwLock::new(HashMap::new()),
            resolutions: AtomicUsize::new(0),
        }
    }

    /// Registers the definition function for a type.
    ///
    /// The function is not called until the type is first looked up.
    pub fn register<F>(&mut self, type_name: impl Into<String>, define: F) -> MapResult<()>
    where
        F: Fn() -> TypeDefinition + Send + Sync + 'static,
    {
        let type_name = type_name.into();
        if self.definitions.contains_key(&type_name) {
            return Err(MapperError::TypeAlreadyRegistered(type_name));
        }
        self.definitions.insert(type_name, Box::new(define));
        Ok(())
    }

    /// Registers an already-built definition under its own name.
    pub fn register_definition(&mut self, definition: TypeDefinition) -> MapResult<()> {
        let name = definition.name().to_string();
        self.register(name, move || definition.clone())
    }

    /// Checks if a type name is registered.
    pub fn is_registered(&self, type_name: &str) -> bool {
        self.definitions.contains_key(type_name)
    }

    /// Returns the number of registered types.
    pub fn type_count(&self) -> usize {
        self.definitions.len()
    }

    /// Returns how many times a definition has been resolved into a descriptor.
    pub fn resolutions(&self) -> usize {
        self.resolutions.load(Ordering::Relaxed)
    }

    /// Returns the descriptor for a type, resolving it on first use.
    pub fn descriptor(&self, type_name: &str) -> MapResult<Arc<TypeDescriptor>> {
        {
            let resolved = self.resolved.read().map_err(|_| poisoned(type_name))?;
            if let Some(descriptor) = resolved.get(type_name) {
                return Ok(Arc::clone(descriptor));
            }
        }

        let descriptor = Arc::new(self.resolve(type_name)?);

        let mut resolved = self.resolved.write().map_err(|_| poisoned(type_name))?;
        let stored = resolved
            .entry(type_name.to_string())
            .or_insert(descriptor);
        Ok(Arc::clone(stored))
    }

    /// Column-mapped properties of a type, keyed by property name.
    pub fn field_descriptors(&self, type_name: &str) -> MapResult<Vec<(String, FieldDescriptor)>> {
        let descriptor = self.descriptor(type_name)?;
        Ok(descriptor
            .columns()
            .map(|(property, column)| (property.name.clone(), column.clone()))
            .collect())
    }

    /// Relation properties of a type, keyed by property name.
    pub fn relation_descriptors(
        &self,
        type_name: &str,
    ) -> MapResult<Vec<(String, RelationDescriptor)>> {
        let descriptor = self.descriptor(type_name)?;
        Ok(descriptor
            .relations()
            .map(|(property, relation)| (property.name.clone(), relation.clone()))
            .collect())
    }

    /// Every declared property of a type.
    pub fn all_fields(&self, type_name: &str) -> MapResult<Vec<Property>> {
        Ok(self.descriptor(type_name)?.properties().to_vec())
    }

    fn resolve(&self, type_name: &str) -> MapResult<TypeDescriptor> {
        let define = self.definitions.get(type_name).ok_or_else(|| {
            MapperError::metadata(type_name, "type is not registered")
        })?;

        let result = define().resolve(type_name, |related| self.is_registered(related));
        self.resolutions.fetch_add(1, Ordering::Relaxed);

        match &result {
            Ok(descriptor) => {
                let properties = descriptor.properties().len().to_string();
                log_event_with_fields(
                    Event::MetadataResolved,
                    &[("type", type_name), ("properties", &properties)],
                );
            }
            Err(err) => {
                let reason = err.to_string();
                log_event_with_fields(
                    Event::MetadataResolutionFailed,
                    &[("type", type_name), ("reason", &reason)],
                );
            }
        }

        result
    }
}

impl Default for MetadataCache {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for MetadataCache {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut registered: Vec<_> = self.definitions.keys().collect();
        registered.sort();
        f.debug_struct("MetadataCache")
            .field("registered", &registered)
            .field("resolutions", &self.resolutions())
            .finish()
    }
}

fn poisoned(type_name: &str) -> MapperError {
    MapperError::metadata(type_name, "metadata cache lock poisoned")
}
