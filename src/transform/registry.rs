//! Catalog of transformation units with runtime enable/disable flags.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, Ordering};

use serde::Serialize;
use serde_json::Value;

use crate::error::{RegistryError, RegistryResult};
use crate::transform::units::{
    FilterRows, LowercaseColumn, MapColumn, ReplacePattern, Transformation, TrimColumn,
    UppercaseColumn,
};

/// Public record of one registered unit.
#[derive(Debug, Clone, Serialize)]
pub struct TransformationDescriptor {
    /// Registered name, as referenced by pipeline steps.
    pub name: String,
    /// Current enabled state.
    pub enabled: bool,
    /// JSON Schema for the unit's configuration.
    pub config_schema: Value,
}

struct RegisteredUnit {
    unit: Box<dyn Transformation>,
    enabled: AtomicBool,
}

/// Process-wide catalog of transformation units.
///
/// The unit set is fixed after construction; only the per-unit enabled
/// flags change at runtime. Each flag is a single atomic, so a toggle is
/// one store and concurrent readers observe the old or the new value,
/// never a torn one. The flags carry no associated data, hence relaxed
/// ordering throughout.
pub struct TransformationRegistry {
    units: BTreeMap<String, RegisteredUnit>,
}

impl TransformationRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self {
            units: BTreeMap::new(),
        }
    }

    /// Creates a registry with every built-in unit registered and enabled.
    pub fn with_defaults() -> Self {
        let defaults: [(&str, Box<dyn Transformation>); 6] = [
            ("filter_rows", Box::new(FilterRows)),
            ("map_column", Box::new(MapColumn)),
            ("uppercase_column", Box::new(UppercaseColumn)),
            ("lowercase_column", Box::new(LowercaseColumn)),
            ("trim_column", Box::new(TrimColumn)),
            ("replace_pattern", Box::new(ReplacePattern)),
        ];

        let mut registry = Self::new();
        for (name, unit) in defaults {
            registry
                .register(name, unit, true)
                .expect("built-in transformation names are unique");
        }
        registry
    }

    /// Registers a unit under a unique name.
    pub fn register(
        &mut self,
        name: impl Into<String>,
        unit: Box<dyn Transformation>,
        enabled: bool,
    ) -> RegistryResult<()> {
        let name = name.into();
        if self.units.contains_key(&name) {
            return Err(RegistryError::DuplicateName(name));
        }
        self.units.insert(
            name,
            RegisteredUnit {
                unit,
                enabled: AtomicBool::new(enabled),
            },
        );
        Ok(())
    }

    /// Flips one unit's enabled flag, effective for subsequent executions.
    pub fn set_enabled(&self, name: &str, enabled: bool) -> RegistryResult<()> {
        let unit = self
            .units
            .get(name)
            .ok_or_else(|| RegistryError::UnknownTransformation(name.to_string()))?;
        unit.enabled.store(enabled, Ordering::Relaxed);
        Ok(())
    }

    /// Looks up a unit together with its current enabled state.
    pub fn resolve(&self, name: &str) -> RegistryResult<(&dyn Transformation, bool)> {
        let unit = self
            .units
            .get(name)
            .ok_or_else(|| RegistryError::UnknownTransformation(name.to_string()))?;
        Ok((unit.unit.as_ref(), unit.enabled.load(Ordering::Relaxed)))
    }

    /// Descriptors for every registered unit, in name order.
    pub fn list(&self) -> Vec<TransformationDescriptor> {
        self.units
            .iter()
            .map(|(name, unit)| TransformationDescriptor {
                name: name.clone(),
                enabled: unit.enabled.load(Ordering::Relaxed),
                config_schema: unit.unit.config_schema().clone(),
            })
            .collect()
    }
}

impl Default for TransformationRegistry {
    fn default() -> Self {
        Self::new()
    }
}
