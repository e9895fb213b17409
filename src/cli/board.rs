//! taskboard show / refresh

use crate::error::Result;
use crate::events::EventKind;
use crate::output::{emit_success, format_board, HumanOutput};

use super::Context;

pub(crate) fn run_show(ctx: &mut Context) -> Result<()> {
    let board = ctx.board.board();

    let mut human = HumanOutput::new(format_board(board));
    human.push_summary("columns", board.columns.len().to_string());
    human.push_summary("tasks", board.task_count().to_string());
    ctx.note_load_source(&mut human);

    emit_success(ctx.output, "show", board, Some(&human))
}

pub(crate) fn run_refresh(ctx: &mut Context) -> Result<()> {
    let board = ctx.board.refresh_board().clone();

    let mut human = HumanOutput::new("taskboard refresh: board reloaded");
    human.push_summary("columns", board.columns.len().to_string());
    human.push_summary("tasks", board.task_count().to_string());
    ctx.note_load_source(&mut human);
    ctx.note_save_outcome(&mut human);
    human.push_next_step("taskboard show");

    ctx.emit_event(
        EventKind::BoardRefreshed,
        serde_json::json!({
            "columns": board.columns.len(),
            "tasks": board.task_count(),
        }),
    )?;

    emit_success(ctx.output, "refresh", &board, Some(&human))
}
