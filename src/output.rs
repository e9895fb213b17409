//! Shared output formatting for taskboard CLI commands.

use serde::Serialize;

use crate::error::{Error, JsonError, Result};
use crate::model::{Board, Task};

pub const SCHEMA_VERSION: &str = "taskboard.v1";

#[derive(Debug, Clone, Copy)]
pub struct OutputOptions {
    pub json: bool,
    pub quiet: bool,
}

#[derive(Debug, Clone)]
pub struct HumanOutput {
    header: String,
    summary: Vec<(String, String)>,
    details: Vec<String>,
    warnings: Vec<String>,
    next_steps: Vec<String>,
}

impl HumanOutput {
    pub fn new(header: impl Into<String>) -> Self {
        Self {
            header: header.into(),
            summary: Vec::new(),
            details: Vec::new(),
            warnings: Vec::new(),
            next_steps: Vec::new(),
        }
    }

    pub fn push_summary(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.summary.push((key.into(), value.into()));
    }

    pub fn push_detail(&mut self, value: impl Into<String>) {
        self.details.push(value.into());
    }

    pub fn push_warning(&mut self, value: impl Into<String>) {
        self.warnings.push(value.into());
    }

    pub fn push_next_step(&mut self, value: impl Into<String>) {
        self.next_steps.push(value.into());
    }
}

pub fn emit_success<T: Serialize>(
    options: OutputOptions,
    command: &str,
    data: &T,
    human: Option<&HumanOutput>,
) -> Result<()> {
    if options.json {
        let warnings = human.map(|h| h.warnings.clone()).unwrap_or_default();
        let next_steps = human.map(|h| h.next_steps.clone()).unwrap_or_default();

        #[derive(Serialize)]
        struct Envelope<'a, T: Serialize> {
            schema_version: &'static str,
            command: &'a str,
            status: &'static str,
            data: &'a T,
            #[serde(skip_serializing_if = "Vec::is_empty")]
            warnings: Vec<String>,
            #[serde(skip_serializing_if = "Vec::is_empty")]
            next_steps: Vec<String>,
        }

        let payload = Envelope {
            schema_version: SCHEMA_VERSION,
            command,
            status: "success",
            data,
            warnings,
            next_steps,
        };

        println!("{}", serde_json::to_string_pretty(&payload)?);
        return Ok(());
    }

    if options.quiet {
        return Ok(());
    }

    if let Some(human) = human {
        println!("{}", format_human(human));
    }

    Ok(())
}

pub fn emit_error(command: &str, err: &Error, json: bool) -> Result<()> {
    let next_steps = error_next_steps(err);
    let hint = next_steps.first().map(|step| step.as_str());
    if json {
        #[derive(Serialize)]
        struct Envelope<'a> {
            schema_version: &'static str,
            command: &'a str,
            status: &'static str,
            error: JsonError,
            #[serde(skip_serializing_if = "Vec::is_empty")]
            next_steps: Vec<String>,
        }

        let payload = Envelope {
            schema_version: SCHEMA_VERSION,
            command,
            status: "error",
            error: JsonError::from(err),
            next_steps,
        };

        println!("{}", serde_json::to_string_pretty(&payload)?);
        return Ok(());
    }

    eprintln!("error: {err}");
    if let Some(hint) = hint {
        eprintln!("hint: {hint}");
    }
    Ok(())
}

pub fn format_human(output: &HumanOutput) -> String {
    let mut lines = Vec::new();
    lines.push(output.header.clone());

    push_summary(&mut lines, &output.summary);
    push_section(&mut lines, "Details", &output.details);
    push_section(&mut lines, "Warnings", &output.warnings);
    push_section(&mut lines, "Next steps", &output.next_steps);

    lines.join("\n")
}

/// Render the whole board, one block per column.
pub fn format_board(board: &Board) -> String {
    let mut lines = Vec::new();
    for (idx, column) in board.columns.iter().enumerate() {
        if idx > 0 {
            lines.push(String::new());
        }
        let marker = if column.is_default { " (default)" } else { "" };
        lines.push(format!(
            "[{}] {}{} - {} task(s)",
            column.id,
            column.title,
            marker,
            column.tasks.len()
        ));
        for task in &column.tasks {
            lines.push(format!("  {}", format_task_line(task)));
        }
    }
    lines.join("\n")
}

pub fn format_task_line(task: &Task) -> String {
    let star = if task.favorite { "* " } else { "" };
    let attachment = if task.image.is_some() { " [image]" } else { "" };
    format!(
        "{star}{} {} (due {}){attachment}",
        task.id, task.name, task.deadline
    )
}

pub fn infer_command_name_from_args() -> String {
    let mut args = std::env::args().skip(1);
    let mut command = None;
    let mut subcommand = None;

    for arg in args.by_ref() {
        if arg.starts_with('-') {
            continue;
        }
        command = Some(arg);
        break;
    }

    let command = match command {
        Some(cmd) => cmd,
        None => return "taskboard".to_string(),
    };

    if matches!(command.as_str(), "task" | "column") {
        for arg in args.by_ref() {
            if arg.starts_with('-') {
                continue;
            }
            subcommand = Some(arg);
            break;
        }
    }

    if let Some(sub) = subcommand {
        format!("{command} {sub}")
    } else {
        command
    }
}

fn error_next_steps(err: &Error) -> Vec<String> {
    match err {
        Error::ColumnNotEmpty { id, .. } => {
            vec![format!("move or delete the tasks in column {id} first")]
        }
        Error::DefaultColumnProtected(_) => {
            vec!["only user-created columns can be deleted".to_string()]
        }
        Error::TaskNotFound(_) | Error::ColumnNotFound(_) => vec!["taskboard show".to_string()],
        Error::LockFailed(_) => vec!["another taskboard process holds the slot; retry".to_string()],
        Error::InvalidConfig(_) => vec!["fix .taskboard.toml then retry".to_string()],
        _ => Vec::new(),
    }
}

fn push_summary(lines: &mut Vec<String>, summary: &[(String, String)]) {
    if summary.is_empty() {
        return;
    }

    lines.push(String::new());
    lines.push("Summary:".to_string());
    for (key, value) in summary {
        if value.is_empty() {
            lines.push(format!("- {key}"));
        } else {
            lines.push(format!("- {key}: {value}"));
        }
    }
}

fn push_section(lines: &mut Vec<String>, title: &str, items: &[String]) {
    if items.is_empty() {
        return;
    }

    lines.push(String::new());
    lines.push(format!("{title}:"));
    for item in items {
        lines.push(format!("- {item}"));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::TaskInput;

    #[test]
    fn human_output_sections_are_ordered() {
        let mut human = HumanOutput::new("taskboard column add: Backlog");
        human.push_summary("id", "abc");
        human.push_warning("board not saved");
        human.push_next_step("taskboard show");

        let text = format_human(&human);
        assert_eq!(
            text,
            "taskboard column add: Backlog\n\nSummary:\n- id: abc\n\nWarnings:\n- board not saved\n\nNext steps:\n- taskboard show"
        );
    }

    #[test]
    fn board_rendering_lists_columns_and_tasks() {
        let mut board = Board::default();
        let task = TaskInput::new("T1", "2024-03-20".parse().unwrap(), "1")
            .with_favorite(true)
            .into_task();
        let id = task.id.clone();
        board.columns[0].tasks.push(task);

        let text = format_board(&board);
        assert!(text.starts_with("[1] To Do (default) - 1 task(s)"));
        assert!(text.contains(&format!("  * {id} T1 (due 2024-03-20)")));
        assert!(text.contains("[3] Done (default) - 0 task(s)"));
    }
}
