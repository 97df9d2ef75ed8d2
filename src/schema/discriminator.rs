//! The discriminator index.
//!
//! Built once when a discriminated union is constructed. Each option
//! registers the literal values its discriminator field accepts; an option
//! that is itself a discriminated union registers the values of all its
//! options. When the discriminator field is an object, its literal fields
//! form nested indexes and an option is selected by the combination of its
//! inner values, so options may share any single inner value as long as
//! some inner field tells them apart.

use indexmap::IndexMap;

use crate::error::SchemaBuildError;
use crate::value::{Primitive, Value};

use super::node::NodeKind;
use super::Schema;

/// Literal value to option lookup for a discriminated union.
#[derive(Debug, Clone, Default)]
pub struct DiscriminatorIndex {
    values: IndexMap<Primitive, Vec<usize>>,
    nested: IndexMap<String, DiscriminatorIndex>,
    /// Options whose field at this level is an object.
    object_members: Vec<usize>,
}

impl DiscriminatorIndex {
    /// Indexes `options` on `discriminator`.
    pub(crate) fn build(discriminator: &str, options: &[Schema]) -> Result<Self, SchemaBuildError> {
        let mut index = Self::default();
        for (member, option) in options.iter().enumerate() {
            if !index.register_option(discriminator, option, member)? {
                return Err(SchemaBuildError::MissingDiscriminator {
                    discriminator: discriminator.to_string(),
                    index: member,
                });
            }
        }
        let members = &index.object_members;
        for (i, &a) in members.iter().enumerate() {
            for &b in &members[i + 1..] {
                if let Some(value) = index.overlap(a, b) {
                    return Err(SchemaBuildError::DuplicateDiscriminator {
                        discriminator: discriminator.to_string(),
                        value,
                    });
                }
            }
        }
        Ok(index)
    }

    fn register_option(
        &mut self,
        key: &str,
        option: &Schema,
        member: usize,
    ) -> Result<bool, SchemaBuildError> {
        match transparent(option).def() {
            NodeKind::Object(def) => match def.shape.get(key) {
                Some(field) => self.register_field(key, field, member, true),
                None => Ok(false),
            },
            NodeKind::DiscriminatedUnion(inner) => {
                let mut registered = false;
                for nested_option in &inner.options {
                    registered |= self.register_option(key, nested_option, member)?;
                }
                Ok(registered)
            }
            _ => Ok(false),
        }
    }

    /// Registers one field. Top-level literals must be unique across
    /// options; nested literals may repeat and are checked as combinations.
    fn register_field(
        &mut self,
        key: &str,
        field: &Schema,
        member: usize,
        unique: bool,
    ) -> Result<bool, SchemaBuildError> {
        if let Some(values) = literal_values(field) {
            for value in values {
                self.insert(key, value, member, unique)?;
            }
            return Ok(true);
        }

        let NodeKind::Object(def) = transparent(field).def() else {
            return Ok(false);
        };
        let mut registered = false;
        for (inner_key, inner_field) in &def.shape {
            if literal_values(inner_field).is_none()
                && !matches!(transparent(inner_field).def(), NodeKind::Object(_))
            {
                continue;
            }
            let nested = self.nested.entry(inner_key.clone()).or_default();
            registered |= nested.register_field(inner_key, inner_field, member, false)?;
        }
        if registered && !self.object_members.contains(&member) {
            self.object_members.push(member);
        }
        Ok(registered)
    }

    fn insert(
        &mut self,
        key: &str,
        value: Primitive,
        member: usize,
        unique: bool,
    ) -> Result<(), SchemaBuildError> {
        let members = self.values.entry(value.clone()).or_default();
        if members.contains(&member) {
            return Ok(());
        }
        if unique && !members.is_empty() {
            return Err(SchemaBuildError::DuplicateDiscriminator {
                discriminator: key.to_string(),
                value,
            });
        }
        members.push(member);
        Ok(())
    }

    fn constrains(&self, member: usize) -> bool {
        self.object_members.contains(&member)
            || self.values.values().any(|members| members.contains(&member))
    }

    /// A value some input could carry that selects both `a` and `b`, if any.
    ///
    /// Object-valued fields overlap unless a nested field constrained by both
    /// options accepts disjoint values.
    fn overlap(&self, a: usize, b: usize) -> Option<Primitive> {
        if let Some((value, _)) = self
            .values
            .iter()
            .find(|(_, members)| members.contains(&a) && members.contains(&b))
        {
            return Some(value.clone());
        }
        if !(self.object_members.contains(&a) && self.object_members.contains(&b)) {
            return None;
        }
        let mut witness = None;
        for nested in self.nested.values() {
            if nested.constrains(a) && nested.constrains(b) {
                let shared = nested.overlap(a, b)?;
                witness.get_or_insert(shared);
            }
        }
        Some(witness.unwrap_or(Primitive::Undefined))
    }

    /// Every option whose discriminator accepts `field_value`.
    fn candidates(&self, field_value: &Value) -> Vec<usize> {
        let field_value = field_value.clone().detach();
        let mut found = Vec::new();
        if let Some(primitive) = field_value.as_primitive() {
            if let Some(members) = self.values.get(&primitive) {
                found.extend(members.iter().copied());
            }
        }
        if let Value::Object(obj) = &field_value {
            let mut matching = self.object_members.clone();
            for (key, nested) in &self.nested {
                let inner = obj.get(key).cloned().unwrap_or(Value::Undefined);
                let accepted = nested.candidates(&inner);
                matching.retain(|m| !nested.constrains(*m) || accepted.contains(m));
            }
            for member in matching {
                if !found.contains(&member) {
                    found.push(member);
                }
            }
        }
        found
    }

    /// The option registered for the discriminator field's value.
    pub fn lookup(&self, field_value: &Value) -> Option<usize> {
        self.candidates(field_value).first().copied()
    }

    /// Every registered value, top level first, in registration order.
    pub fn values(&self) -> Vec<Primitive> {
        let mut values: Vec<Primitive> = self.values.keys().cloned().collect();
        for nested in self.nested.values() {
            for value in nested.values() {
                if !values.contains(&value) {
                    values.push(value);
                }
            }
        }
        values
    }

    pub fn len(&self) -> usize {
        self.values.len() + self.nested.values().map(DiscriminatorIndex::len).sum::<usize>()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

fn transparent(schema: &Schema) -> &Schema {
    match schema.def() {
        NodeKind::Readonly(inner) => transparent(inner),
        _ => schema,
    }
}

/// The literal values a field schema accepts, if it accepts only literals.
fn literal_values(field: &Schema) -> Option<Vec<Primitive>> {
    match field.def() {
        NodeKind::Literal(values) | NodeKind::Enum(values) => Some(values.clone()),
        NodeKind::Null => Some(vec![Primitive::Null]),
        NodeKind::Undefined => Some(vec![Primitive::Undefined]),
        NodeKind::Optional(inner) => literal_values(inner).map(|mut values| {
            values.push(Primitive::Undefined);
            values
        }),
        NodeKind::Nullable(inner) => literal_values(inner).map(|mut values| {
            values.push(Primitive::Null);
            values
        }),
        NodeKind::Readonly(inner) | NodeKind::Catch { inner, .. } => literal_values(inner),
        NodeKind::Pipe(input, _) => literal_values(input),
        _ => None,
    }
}
