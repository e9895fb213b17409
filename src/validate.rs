//! Input validation for callers of the board API.
//!
//! The mutation API trusts its inputs; front-ends run these checks first.

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;

use crate::error::{Error, Result};
use crate::model::{Deadline, TaskInput};

pub const TASK_NAME_MAX_CHARS: usize = 100;
pub const COLUMN_TITLE_MAX_CHARS: usize = 50;

/// Raw task fields as a front-end collects them.
#[derive(Debug, Clone, Default)]
pub struct TaskForm {
    pub name: String,
    pub description: Option<String>,
    pub deadline: String,
    pub column: String,
    pub favorite: bool,
    pub image: Option<String>,
}

/// Validate a task form and build the input for `add_task`.
pub fn task_input(form: TaskForm) -> Result<TaskInput> {
    let name = task_name(&form.name)?;
    let deadline = deadline(&form.deadline)?;
    let column = column_id(&form.column)?;

    let mut input = TaskInput::new(name, deadline, column).with_favorite(form.favorite);
    if let Some(description) = form.description {
        input = input.with_description(description);
    }
    if let Some(image) = form.image {
        attachment(&image)?;
        input = input.with_image(image);
    }
    Ok(input)
}

pub fn task_name(name: &str) -> Result<String> {
    bounded_text("name", name, TASK_NAME_MAX_CHARS, "Name is required")
}

pub fn deadline(raw: &str) -> Result<Deadline> {
    raw.parse()
}

pub fn column_id(column: &str) -> Result<String> {
    if column.trim().is_empty() {
        return Err(Error::InvalidInput("column: Column is required".to_string()));
    }
    Ok(column.to_string())
}

/// Check an attachment and return its decoded size in bytes.
///
/// Accepts `data:<media type>;base64,<payload>` URLs as well as bare standard
/// base64. The value is checked exactly as it will be stored.
pub fn attachment(image: &str) -> Result<usize> {
    let payload = match image.strip_prefix("data:") {
        Some(rest) => {
            let (header, payload) = rest.split_once(',').ok_or_else(|| {
                Error::InvalidInput("image: data URL has no payload".to_string())
            })?;
            if !header.ends_with(";base64") {
                return Err(Error::InvalidInput(
                    "image: data URL must be base64-encoded".to_string(),
                ));
            }
            payload
        }
        None => image,
    };
    STANDARD
        .decode(payload)
        .map(|bytes| bytes.len())
        .map_err(|err| Error::InvalidInput(format!("image: not valid base64: {err}")))
}

/// Validate a column title; surrounding whitespace is trimmed first.
pub fn column_title(title: &str) -> Result<String> {
    bounded_text("title", title.trim(), COLUMN_TITLE_MAX_CHARS, "Title is required")
}

fn bounded_text(field: &str, value: &str, max: usize, empty_message: &str) -> Result<String> {
    let len = value.chars().count();
    if len == 0 {
        return Err(Error::InvalidInput(format!("{field}: {empty_message}")));
    }
    if len > max {
        return Err(Error::InvalidInput(format!(
            "{field}: must be at most {max} characters (got {len})"
        )));
    }
    Ok(value.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn form() -> TaskForm {
        TaskForm {
            name: "Complete project".to_string(),
            description: Some("Finish the documentation".to_string()),
            deadline: "2024-03-20".to_string(),
            column: "1".to_string(),
            favorite: false,
            image: None,
        }
    }

    #[test]
    fn accepts_well_formed_task() {
        let input = task_input(form()).unwrap();
        assert_eq!(input.name, "Complete project");
        assert_eq!(input.deadline.to_string(), "2024-03-20");
        assert_eq!(input.column, "1");
    }

    #[test]
    fn name_length_is_bounded() {
        let mut at_limit = form();
        at_limit.name = "a".repeat(TASK_NAME_MAX_CHARS);
        assert!(task_input(at_limit).is_ok());

        let mut too_long = form();
        too_long.name = "a".repeat(TASK_NAME_MAX_CHARS + 1);
        let err = task_input(too_long).unwrap_err();
        assert!(err.to_string().contains("at most 100"));

        let mut empty = form();
        empty.name.clear();
        assert!(matches!(task_input(empty), Err(Error::InvalidInput(_))));
    }

    #[test]
    fn name_length_counts_characters_not_bytes() {
        let mut wide = form();
        wide.name = "é".repeat(TASK_NAME_MAX_CHARS);
        assert!(task_input(wide).is_ok());
    }

    #[test]
    fn rejects_bad_deadline_and_blank_column() {
        let mut bad_date = form();
        bad_date.deadline = "not-a-date".to_string();
        assert!(task_input(bad_date).is_err());

        let mut blank_column = form();
        blank_column.column = "  ".to_string();
        let err = task_input(blank_column).unwrap_err();
        assert!(err.to_string().contains("Column is required"));
    }

    #[test]
    fn image_must_be_base64() {
        let mut good = form();
        good.image = Some("iVBORw0KGgo=".to_string());
        assert!(task_input(good).is_ok());

        let mut bad = form();
        bad.image = Some("not base64!".to_string());
        assert!(task_input(bad).is_err());
    }

    #[test]
    fn image_accepts_base64_data_urls() {
        assert_eq!(attachment("data:image/png;base64,iVBORw0KGgo=").unwrap(), 8);
        assert_eq!(attachment("data:;base64,").unwrap(), 0);

        let mut form = form();
        form.image = Some("data:image/png;base64,iVBORw0KGgo=".to_string());
        let input = task_input(form).unwrap();
        assert_eq!(
            input.image.as_deref(),
            Some("data:image/png;base64,iVBORw0KGgo=")
        );
    }

    #[test]
    fn image_rejects_malformed_data_urls() {
        for raw in [
            "data:image/png;base64",
            "data:text/plain,hello",
            "data:image/png;base64,@@@",
        ] {
            assert!(attachment(raw).is_err(), "input: {raw}");
        }
    }

    #[test]
    fn image_is_checked_as_stored() {
        assert!(attachment(" iVBORw0KGgo=").is_err());
        assert!(attachment("iVBORw0KGgo=\n").is_err());
    }

    #[test]
    fn column_title_is_trimmed_and_bounded() {
        assert_eq!(column_title("  Backlog ").unwrap(), "Backlog");
        assert!(column_title("   ").is_err());
        assert!(column_title(&"t".repeat(COLUMN_TITLE_MAX_CHARS)).is_ok());
        assert!(column_title(&"t".repeat(COLUMN_TITLE_MAX_CHARS + 1)).is_err());
    }
}
