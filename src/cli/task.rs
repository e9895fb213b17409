//! taskboard task command implementations
//!
//! Input is validated here before it reaches the board.

use std::path::{Path, PathBuf};

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use serde::Serialize;

use crate::board::Applied;
use crate::error::{Error, Result};
use crate::events::EventKind;
use crate::model::Task;
use crate::output::{emit_success, format_task_line, HumanOutput};
use crate::validate::{self, TaskForm};

use super::Context;

/// Options for `taskboard task add`
pub struct AddOptions {
    pub name: String,
    pub deadline: String,
    pub column: Option<String>,
    pub description: Option<String>,
    pub favorite: bool,
    pub image_file: Option<PathBuf>,
    pub image: Option<String>,
}

/// Options for `taskboard task edit`
pub struct EditOptions {
    pub id: String,
    pub name: Option<String>,
    pub deadline: Option<String>,
    pub column: Option<String>,
    pub description: Option<String>,
    pub clear_description: bool,
    pub favorite: Option<bool>,
    pub image_file: Option<PathBuf>,
    pub image: Option<String>,
    pub clear_image: bool,
}

#[derive(Serialize)]
struct TaskReport {
    changed: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    task: Option<Task>,
    #[serde(skip_serializing_if = "Option::is_none")]
    from_column: Option<String>,
}

/// Media type for an attachment, guessed from the file extension.
fn media_type(path: &Path) -> &'static str {
    let extension = path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(str::to_ascii_lowercase);
    match extension.as_deref() {
        Some("png") => "image/png",
        Some("jpg" | "jpeg") => "image/jpeg",
        Some("gif") => "image/gif",
        Some("webp") => "image/webp",
        Some("svg") => "image/svg+xml",
        Some("bmp") => "image/bmp",
        _ => "application/octet-stream",
    }
}

/// Read a file into a `data:` URL.
fn encode_image_file(path: &Path) -> Result<String> {
    let bytes = std::fs::read(path)?;
    Ok(format!(
        "data:{};base64,{}",
        media_type(path),
        STANDARD.encode(bytes)
    ))
}

fn resolve_image(image_file: Option<&Path>, image: Option<String>) -> Result<Option<String>> {
    match (image_file, image) {
        (Some(path), _) => encode_image_file(path).map(Some),
        (None, Some(encoded)) => Ok(Some(encoded)),
        (None, None) => Ok(None),
    }
}

fn skipped(ctx: &Context, command: &str, header: String) -> Result<()> {
    let report = TaskReport {
        changed: false,
        task: None,
        from_column: None,
    };
    let mut human = HumanOutput::new(header);
    human.push_warning("nothing changed");
    emit_success(ctx.output, command, &report, Some(&human))
}

pub(crate) fn run_add(ctx: &mut Context, options: AddOptions) -> Result<()> {
    let column = match options.column {
        Some(column) => column,
        None => ctx
            .board
            .board()
            .columns
            .first()
            .map(|column| column.id.clone())
            .ok_or_else(|| Error::InvalidInput("column: board has no columns".to_string()))?,
    };

    let input = validate::task_input(TaskForm {
        name: options.name,
        description: options.description,
        deadline: options.deadline,
        column,
        favorite: options.favorite,
        image: resolve_image(options.image_file.as_deref(), options.image)?,
    })?;
    let target = input.column.clone();

    let task = match ctx.board.add_task(input)? {
        Applied::Changed(task) => task,
        Applied::Skipped => {
            return skipped(ctx, "task add", format!("taskboard task add: column {target} not found"))
        }
    };

    let mut human = HumanOutput::new(format!("taskboard task add: {}", task.name));
    human.push_summary("id", task.id.clone());
    human.push_summary("column", task.column.clone());
    human.push_summary("deadline", task.deadline.to_string());
    ctx.note_load_source(&mut human);
    ctx.note_save_outcome(&mut human);
    human.push_next_step(format!("taskboard task move {} <column>", task.id));

    ctx.emit_event(EventKind::TaskAdded, &task)?;

    let report = TaskReport {
        changed: true,
        task: Some(task),
        from_column: None,
    };
    emit_success(ctx.output, "task add", &report, Some(&human))
}

pub(crate) fn run_edit(ctx: &mut Context, options: EditOptions) -> Result<()> {
    let current = ctx.board.task(&options.id)?.clone();
    let mut updated = current.clone();

    if let Some(name) = options.name.as_deref() {
        updated.name = validate::task_name(name)?;
    }
    if let Some(deadline) = options.deadline.as_deref() {
        updated.deadline = validate::deadline(deadline)?;
    }
    if let Some(column) = options.column.as_deref() {
        updated.column = validate::column_id(column)?;
    }
    if options.clear_description {
        updated.description = None;
    } else if let Some(description) = options.description {
        updated.description = Some(description);
    }
    if let Some(favorite) = options.favorite {
        updated.favorite = favorite;
    }
    if options.clear_image {
        updated.image = None;
    } else if let Some(image) = resolve_image(options.image_file.as_deref(), options.image)? {
        validate::attachment(&image)?;
        updated.image = Some(image);
    }

    let task = match ctx.board.edit_task(updated)? {
        Applied::Changed(task) => task,
        Applied::Skipped => {
            return skipped(ctx, "task edit", format!("taskboard task edit: {}", options.id))
        }
    };

    let mut human = HumanOutput::new(format!("taskboard task edit: {}", task.name));
    human.push_summary("id", task.id.clone());
    if task.column != current.column {
        human.push_summary("column", format!("{} -> {}", current.column, task.column));
    } else {
        human.push_summary("column", task.column.clone());
    }
    ctx.note_load_source(&mut human);
    ctx.note_save_outcome(&mut human);

    ctx.emit_event(
        EventKind::TaskEdited,
        serde_json::json!({ "task": &task, "from_column": &current.column }),
    )?;

    let report = TaskReport {
        changed: true,
        task: Some(task),
        from_column: Some(current.column),
    };
    emit_success(ctx.output, "task edit", &report, Some(&human))
}

pub(crate) fn run_delete(ctx: &mut Context, id: &str) -> Result<()> {
    let task = match ctx.board.delete_task(id)? {
        Applied::Changed(task) => task,
        Applied::Skipped => return skipped(ctx, "task delete", format!("taskboard task delete: {id}")),
    };

    let mut human = HumanOutput::new(format!("taskboard task delete: {}", task.name));
    human.push_summary("id", task.id.clone());
    human.push_summary("column", task.column.clone());
    ctx.note_load_source(&mut human);
    ctx.note_save_outcome(&mut human);

    ctx.emit_event(
        EventKind::TaskDeleted,
        serde_json::json!({ "task_id": &task.id, "column": &task.column }),
    )?;

    let report = TaskReport {
        changed: true,
        from_column: Some(task.column.clone()),
        task: Some(task),
    };
    emit_success(ctx.output, "task delete", &report, Some(&human))
}

pub(crate) fn run_move(ctx: &mut Context, id: &str, column: &str) -> Result<()> {
    let from_column = ctx
        .board
        .board()
        .find_task(id)
        .map(|(_, owner)| owner.id.clone());

    let task = match ctx.board.move_task(id, column)? {
        Applied::Changed(task) => task,
        Applied::Skipped => return skipped(ctx, "task move", format!("taskboard task move: {id}")),
    };

    let mut human = HumanOutput::new(format!("taskboard task move: {}", task.name));
    human.push_summary("id", task.id.clone());
    human.push_summary(
        "column",
        format!(
            "{} -> {}",
            from_column.as_deref().unwrap_or("?"),
            task.column
        ),
    );
    ctx.note_load_source(&mut human);
    ctx.note_save_outcome(&mut human);

    ctx.emit_event(
        EventKind::TaskMoved,
        serde_json::json!({ "task_id": &task.id, "from": &from_column, "to": &task.column }),
    )?;

    let report = TaskReport {
        changed: true,
        task: Some(task),
        from_column,
    };
    emit_success(ctx.output, "task move", &report, Some(&human))
}

pub(crate) fn run_show(ctx: &mut Context, id: &str) -> Result<()> {
    let task = ctx.board.task(id)?;

    let mut human = HumanOutput::new(format_task_line(task));
    human.push_summary("column", task.column.clone());
    human.push_summary("deadline", task.deadline.to_string());
    human.push_summary("favorite", task.favorite.to_string());
    if let Some(description) = task.description.as_deref() {
        human.push_detail(description.to_string());
    }
    if let Some(image) = task.image.as_deref() {
        let size = validate::attachment(image)
            .map(|bytes| format!("{bytes} bytes"))
            .unwrap_or_else(|_| "unreadable".to_string());
        human.push_summary("image", size);
    }

    emit_success(ctx.output, "task show", task, Some(&human))
}
