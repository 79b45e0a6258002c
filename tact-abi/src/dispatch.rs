//! Discriminator dispatch over registered top-level schemas

use ahash::AHashMap;
use num_traits::ToPrimitive;
use tact_cell::{Cell, CellSlice};
use tracing::debug;

use crate::codec;
use crate::error::{AbiError, Result};
use crate::schema::{MessageSchema, Record};

/// Leading 32 bits of `cell`, read through a fresh slice
pub fn peek_discriminator(cell: &Cell) -> Result<u32> {
    peek_slice_discriminator(&cell.slice())
}

pub(crate) fn peek_slice_discriminator(slice: &CellSlice) -> Result<u32> {
    let raw = slice.peek_uint(32)?;
    // 32 bits always fit
    Ok(raw.to_u32().unwrap_or_default())
}

/// Set of top-level schemas keyed by discriminator.
///
/// Discriminators are unique within a registry; registering a second schema
/// under the same value is rejected.
#[derive(Debug, Default, Clone)]
pub struct SchemaRegistry {
    by_discriminator: AHashMap<u32, &'static MessageSchema>,
    // registration order, for stable iteration
    order: Vec<&'static MessageSchema>,
}

impl SchemaRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_schemas(
        schemas: impl IntoIterator<Item = &'static MessageSchema>,
    ) -> Result<Self> {
        let mut registry = Self::new();
        for schema in schemas {
            registry.register(schema)?;
        }
        Ok(registry)
    }

    pub fn register(&mut self, schema: &'static MessageSchema) -> Result<()> {
        let discriminator = schema
            .discriminator
            .ok_or(AbiError::MissingDiscriminator(schema.name))?;
        if let Some(existing) = self.by_discriminator.get(&discriminator) {
            return Err(AbiError::DuplicateDiscriminator {
                discriminator,
                schema: schema.name,
                existing: existing.name,
            });
        }
        self.by_discriminator.insert(discriminator, schema);
        self.order.push(schema);
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    pub fn schemas(&self) -> impl Iterator<Item = &'static MessageSchema> + '_ {
        self.order.iter().copied()
    }

    pub fn get(&self, discriminator: u32) -> Option<&'static MessageSchema> {
        self.by_discriminator.get(&discriminator).copied()
    }

    pub fn by_name(&self, name: &str) -> Option<&'static MessageSchema> {
        self.order.iter().copied().find(|schema| schema.name == name)
    }

    /// Whether this exact schema (not merely one with the same name) is registered
    pub fn contains(&self, schema: &MessageSchema) -> bool {
        schema
            .discriminator
            .and_then(|discriminator| self.get(discriminator))
            .is_some_and(|registered| std::ptr::eq(registered, schema))
    }

    /// Pick the schema whose discriminator leads `cell`
    pub fn dispatch(&self, cell: &Cell) -> Result<&'static MessageSchema> {
        let discriminator = peek_discriminator(cell)?;
        match self.get(discriminator) {
            Some(schema) => {
                debug!(discriminator, schema = schema.name, "dispatch");
                Ok(schema)
            }
            None => {
                debug!(discriminator, "dispatch: no registered schema");
                Err(AbiError::UnknownDiscriminator(discriminator))
            }
        }
    }

    /// Dispatch and unpack in one step
    pub fn decode(&self, cell: &Cell) -> Result<(&'static MessageSchema, Record)> {
        let schema = self.dispatch(cell)?;
        let record = codec::unpack(schema, &mut cell.slice())?;
        Ok((schema, record))
    }
}
