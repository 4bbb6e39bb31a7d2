//! Field Validation
//!
//! Same limits the backend enforces, checked before a request goes out.

use crate::error::ValidationError;
use crate::models::{ActionItemFields, NoteFields};

pub const TITLE_MAX_CHARS: usize = 200;
pub const TAG_NAME_MAX_CHARS: usize = 50;

pub fn note_fields(fields: &NoteFields) -> Result<(), ValidationError> {
    required("title", &fields.title)?;
    max_chars("title", &fields.title, TITLE_MAX_CHARS)?;
    required("content", &fields.content)
}

pub fn action_item_fields(fields: &ActionItemFields) -> Result<(), ValidationError> {
    required("description", &fields.description)
}

pub fn tag_name(name: &str) -> Result<(), ValidationError> {
    required("name", name)?;
    max_chars("name", name, TAG_NAME_MAX_CHARS)
}

fn required(field: &'static str, value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        Err(ValidationError::Empty { field })
    } else {
        Ok(())
    }
}

fn max_chars(field: &'static str, value: &str, max: usize) -> Result<(), ValidationError> {
    if value.chars().count() > max {
        Err(ValidationError::TooLong { field, max })
    } else {
        Ok(())
    }
}
