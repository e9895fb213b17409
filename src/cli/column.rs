//! taskboard column command implementations

use serde::Serialize;

use crate::board::Applied;
use crate::error::Result;
use crate::events::EventKind;
use crate::model::Column;
use crate::output::{emit_success, HumanOutput};
use crate::validate;

use super::Context;

#[derive(Serialize)]
struct ColumnReport {
    changed: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    column: Option<Column>,
    columns: usize,
}

pub(crate) fn run_add(ctx: &mut Context, title: &str) -> Result<()> {
    let title = validate::column_title(title)?;
    let column = ctx.board.add_column(title);

    let mut human = HumanOutput::new(format!("taskboard column add: {}", column.title));
    human.push_summary("id", column.id.clone());
    human.push_summary("position", ctx.board.board().columns.len().to_string());
    ctx.note_load_source(&mut human);
    ctx.note_save_outcome(&mut human);
    human.push_next_step(format!(
        "taskboard task add --column {} --name <name> --deadline <date>",
        column.id
    ));

    ctx.emit_event(EventKind::ColumnAdded, &column)?;

    let report = ColumnReport {
        changed: true,
        column: Some(column),
        columns: ctx.board.board().columns.len(),
    };
    emit_success(ctx.output, "column add", &report, Some(&human))
}

pub(crate) fn run_delete(ctx: &mut Context, id: &str) -> Result<()> {
    let applied = ctx.board.delete_column(id)?;
    let columns = ctx.board.board().columns.len();

    let Applied::Changed(column) = applied else {
        let mut human = HumanOutput::new(format!("taskboard column delete: {id}"));
        human.push_warning("nothing changed");
        let report = ColumnReport {
            changed: false,
            column: None,
            columns,
        };
        return emit_success(ctx.output, "column delete", &report, Some(&human));
    };

    let mut human = HumanOutput::new(format!("taskboard column delete: {}", column.title));
    human.push_summary("id", column.id.clone());
    human.push_summary("remaining columns", columns.to_string());
    ctx.note_load_source(&mut human);
    ctx.note_save_outcome(&mut human);

    ctx.emit_event(
        EventKind::ColumnDeleted,
        serde_json::json!({ "column_id": &column.id, "title": &column.title }),
    )?;

    let report = ColumnReport {
        changed: true,
        column: Some(column),
        columns,
    };
    emit_success(ctx.output, "column delete", &report, Some(&human))
}
