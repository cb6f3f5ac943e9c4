//! Structural validation of untrusted editor data
//!
//! Each entity shape has a `parse_*` function returning the typed value or a
//! [`ShapeError`] naming the first failed check. The `is_valid_*` predicates
//! are thin wrappers for callers that only need a yes/no answer.
//!
//! Checks run in a fixed order: object check, required keys, field types,
//! then non-emptiness of identity fields. Only direct fields are inspected,
//! so nested or self-referencing content is never traversed.

use serde_json::{Map, Value};
use thiserror::Error;

use crate::coerce::to_safe_date;
use crate::data::{Container, ExternalEditorData, LocalParagraph, Paragraph};

/// Reason a value failed structural validation
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ShapeError {
    #[error("expected an object")]
    NotAnObject,
    #[error("missing required field `{0}`")]
    MissingField(&'static str),
    #[error("field `{field}` must be {expected}")]
    WrongType {
        field: &'static str,
        expected: &'static str,
    },
    #[error("field `{0}` must not be empty")]
    EmptyField(&'static str),
    #[error("field `{0}` is not a valid timestamp")]
    InvalidTimestamp(&'static str),
}

fn as_object(value: &Value) -> Result<&Map<String, Value>, ShapeError> {
    value.as_object().ok_or(ShapeError::NotAnObject)
}

fn require<'a>(obj: &'a Map<String, Value>, field: &'static str) -> Result<&'a Value, ShapeError> {
    obj.get(field).ok_or(ShapeError::MissingField(field))
}

fn string_field(obj: &Map<String, Value>, field: &'static str) -> Result<String, ShapeError> {
    require(obj, field)?
        .as_str()
        .map(str::to_string)
        .ok_or(ShapeError::WrongType {
            field,
            expected: "a string",
        })
}

fn non_empty_string_field(
    obj: &Map<String, Value>,
    field: &'static str,
) -> Result<String, ShapeError> {
    let value = string_field(obj, field)?;
    if value.is_empty() {
        return Err(ShapeError::EmptyField(field));
    }
    Ok(value)
}

fn number_field(obj: &Map<String, Value>, field: &'static str) -> Result<f64, ShapeError> {
    require(obj, field)?.as_f64().ok_or(ShapeError::WrongType {
        field,
        expected: "a number",
    })
}

fn sequence_field(obj: &Map<String, Value>, field: &'static str) -> Result<Vec<Value>, ShapeError> {
    require(obj, field)?
        .as_array()
        .cloned()
        .ok_or(ShapeError::WrongType {
            field,
            expected: "a sequence",
        })
}

pub fn parse_container(value: &Value) -> Result<Container, ShapeError> {
    let obj = as_object(value)?;
    for field in ["id", "name", "order"] {
        require(obj, field)?;
    }
    Ok(Container {
        id: non_empty_string_field(obj, "id")?,
        name: non_empty_string_field(obj, "name")?,
        order: number_field(obj, "order")?,
    })
}

pub fn parse_paragraph(value: &Value) -> Result<Paragraph, ShapeError> {
    let obj = as_object(value)?;
    for field in ["id", "content", "order", "containerId"] {
        require(obj, field)?;
    }
    let container_id = match require(obj, "containerId")? {
        Value::Null => None,
        Value::String(id) => Some(id.clone()),
        _ => {
            return Err(ShapeError::WrongType {
                field: "containerId",
                expected: "a string or null",
            })
        }
    };
    Ok(Paragraph {
        id: non_empty_string_field(obj, "id")?,
        content: string_field(obj, "content")?,
        order: number_field(obj, "order")?,
        container_id,
    })
}

pub fn parse_local_paragraph(value: &Value) -> Result<LocalParagraph, ShapeError> {
    let paragraph = parse_paragraph(value)?;
    let obj = as_object(value)?;
    let created_at = to_safe_date(Some(require(obj, "createdAt")?))
        .ok_or(ShapeError::InvalidTimestamp("createdAt"))?;
    let updated_at = to_safe_date(Some(require(obj, "updatedAt")?))
        .ok_or(ShapeError::InvalidTimestamp("updatedAt"))?;
    Ok(LocalParagraph {
        paragraph,
        created_at,
        updated_at,
    })
}

/// Only the two sequences are checked; their elements are validated later.
pub fn parse_external_data(value: &Value) -> Result<ExternalEditorData, ShapeError> {
    let obj = as_object(value)?;
    Ok(ExternalEditorData {
        local_containers: sequence_field(obj, "localContainers")?,
        local_paragraphs: sequence_field(obj, "localParagraphs")?,
    })
}

pub fn is_valid_container(value: &Value) -> bool {
    parse_container(value).is_ok()
}

pub fn is_valid_paragraph(value: &Value) -> bool {
    parse_paragraph(value).is_ok()
}

pub fn is_valid_local_paragraph(value: &Value) -> bool {
    parse_local_paragraph(value).is_ok()
}

pub fn is_valid_external_data(value: &Value) -> bool {
    parse_external_data(value).is_ok()
}
