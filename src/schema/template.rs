//! Template literal schemas.
//!
//! A template literal is a sequence of literal text and schemas. It is
//! compiled once, at construction, into an anchored regular expression that
//! the whole input string must match.

use regex::Regex;

use crate::error::SchemaBuildError;
use crate::value::Primitive;

use super::node::{NodeKind, TemplateDef, TemplatePart};
use super::numeric::{BigIntSchema, NumberSchema};
use super::string::StringSchema;
use super::Schema;

impl From<Schema> for TemplatePart {
    fn from(schema: Schema) -> Self {
        TemplatePart::Schema(schema)
    }
}

macro_rules! template_schema_part {
    ($($builder:ty),*) => {
        $(impl From<$builder> for TemplatePart {
            fn from(builder: $builder) -> Self {
                TemplatePart::Schema(builder.into())
            }
        })*
    };
}

template_schema_part!(StringSchema, NumberSchema, BigIntSchema);

macro_rules! template_literal_part {
    ($($literal:ty),*) => {
        $(impl From<$literal> for TemplatePart {
            fn from(value: $literal) -> Self {
                TemplatePart::Literal(Primitive::from(value))
            }
        })*
    };
}

template_literal_part!(&str, String, bool, f64, i32, i64);

impl From<Primitive> for TemplatePart {
    fn from(value: Primitive) -> Self {
        TemplatePart::Literal(value)
    }
}

impl Schema {
    /// A string matching the concatenation of `parts`.
    ///
    /// Fails for parts whose accepted strings cannot be expressed as a
    /// pattern (objects, arrays, transforms, ...).
    ///
    /// # Example
    ///
    /// ```rust
    /// use assay::{Schema, SchemaLike};
    ///
    /// let size = Schema::template_literal(vec![Schema::number().into(), "px".into()]).unwrap();
    ///
    /// assert!(size.safe_parse("12px").unwrap().is_success());
    /// assert!(size.safe_parse("12em").unwrap().is_failure());
    /// ```
    pub fn template_literal(parts: Vec<TemplatePart>) -> Result<Schema, SchemaBuildError> {
        let mut source = String::from("^");
        for part in &parts {
            match part {
                TemplatePart::Literal(value) => {
                    source.push_str(&regex::escape(&value.to_template_string()))
                }
                TemplatePart::Schema(schema) => source.push_str(&part_pattern(schema)?),
            }
        }
        source.push('$');
        let regex = Regex::new(&source)?;
        Ok(Schema::from_kind(NodeKind::TemplateLiteral(TemplateDef {
            parts,
            regex,
        })))
    }
}

fn unanchored(pattern: &str) -> &str {
    let pattern = pattern.strip_prefix('^').unwrap_or(pattern);
    pattern.strip_suffix('$').unwrap_or(pattern)
}

fn alternation(values: &[Primitive]) -> String {
    let escaped: Vec<String> = values
        .iter()
        .map(|v| regex::escape(&v.to_template_string()))
        .collect();
    format!("(?:{})", escaped.join("|"))
}

/// The unanchored pattern of strings a schema part accepts.
fn part_pattern(schema: &Schema) -> Result<String, SchemaBuildError> {
    let bag = schema.bag();
    let pattern = match schema.def() {
        NodeKind::String { .. } => match bag.patterns.last() {
            Some(pattern) => format!("(?:{})", unanchored(pattern)),
            None => {
                let min = bag.min_length.unwrap_or(0);
                match bag.max_length {
                    Some(max) => format!("[\\s\\S]{{{min},{max}}}"),
                    None => format!("[\\s\\S]{{{min},}}"),
                }
            }
        },
        NodeKind::Number { .. } => match bag.format {
            Some("uint32") => r"\d+".to_string(),
            Some("safeint") | Some("int32") => r"-?\d+".to_string(),
            _ => r"-?\d+(?:\.\d+)?".to_string(),
        },
        NodeKind::BigInt { .. } => r"-?\d+n?".to_string(),
        NodeKind::Boolean { .. } => "(?:true|false)".to_string(),
        NodeKind::Null => "null".to_string(),
        NodeKind::Undefined => "undefined".to_string(),
        NodeKind::Literal(values) | NodeKind::Enum(values) => alternation(values),
        NodeKind::Optional(inner) => format!("(?:{})?", part_pattern(inner)?),
        NodeKind::Nullable(inner) => format!("(?:{}|null)", part_pattern(inner)?),
        NodeKind::Readonly(inner) => part_pattern(inner)?,
        NodeKind::TemplateLiteral(def) => format!("(?:{})", unanchored(def.regex.as_str())),
        _ => return Err(SchemaBuildError::UnsupportedTemplatePart(schema.kind().as_str())),
    };
    Ok(pattern)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::SchemaLike;

    fn regex_of(schema: &Schema) -> &str {
        match schema.def() {
            NodeKind::TemplateLiteral(def) => def.regex.as_str(),
            _ => panic!("expected template literal"),
        }
    }

    #[test]
    fn test_literal_text_is_escaped() {
        let schema = Schema::template_literal(vec!["a.b".into(), Schema::literal(1).into()]).unwrap();
        assert_eq!(regex_of(&schema), r"^a\.b(?:1)$");
    }

    #[test]
    fn test_string_bounds_become_quantifier() {
        let schema = Schema::template_literal(vec![
            "id_".into(),
            Schema::string().min(2).max(4).into(),
        ])
        .unwrap();
        assert_eq!(regex_of(&schema), r"^id_[\s\S]{2,4}$");
    }

    #[test]
    fn test_unsupported_part() {
        let result = Schema::template_literal(vec![Schema::object().into_schema().into()]);
        assert!(matches!(
            result,
            Err(SchemaBuildError::UnsupportedTemplatePart("object"))
        ));
    }
}
