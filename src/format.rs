//! Output formatting for task lists: plain table, markdown and JSON.

use crate::types::Task;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Output format for listing commands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Table,
    Markdown,
    Json,
}

impl OutputFormat {
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "table" => Some(OutputFormat::Table),
            "markdown" | "md" => Some(OutputFormat::Markdown),
            "json" => Some(OutputFormat::Json),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            OutputFormat::Table => "table",
            OutputFormat::Markdown => "markdown",
            OutputFormat::Json => "json",
        }
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Render tasks in the requested format.
pub fn format_tasks(tasks: &[Task], format: OutputFormat) -> serde_json::Result<String> {
    match format {
        OutputFormat::Table => Ok(format_tasks_table(tasks)),
        OutputFormat::Markdown => Ok(format_tasks_markdown(tasks)),
        OutputFormat::Json => serde_json::to_string_pretty(tasks).map(|mut json| {
            json.push('\n');
            json
        }),
    }
}

/// Render a single task in the requested format.
pub fn format_task(task: &Task, format: OutputFormat) -> serde_json::Result<String> {
    match format {
        OutputFormat::Table => Ok(format_tasks_table(std::slice::from_ref(task))),
        OutputFormat::Markdown => Ok(format_task_markdown(task)),
        OutputFormat::Json => serde_json::to_string_pretty(task).map(|mut json| {
            json.push('\n');
            json
        }),
    }
}

/// Three-column table (ID, Status, Description).
///
/// ```text
/// | ID | Status | Description |
/// +----+--------+-------------+
/// | 1  | todo   | buy milk    |
/// ```
pub fn format_tasks_table(tasks: &[Task]) -> String {
    let headers = ["ID", "Status", "Description"];
    let rows: Vec<[String; 3]> = tasks
        .iter()
        .map(|task| {
            [
                task.id.to_string(),
                task.status.clone(),
                task.description.clone(),
            ]
        })
        .collect();

    let mut widths = headers.map(|h| h.chars().count());
    for row in &rows {
        for (width, cell) in widths.iter_mut().zip(row) {
            *width = (*width).max(cell.chars().count());
        }
    }

    let mut out = String::new();
    push_row(&mut out, headers.iter().copied(), &widths);
    for width in &widths {
        out.push_str("+-");
        out.push_str(&"-".repeat(*width));
        out.push('-');
    }
    out.push_str("+\n");
    for row in &rows {
        push_row(&mut out, row.iter().map(String::as_str), &widths);
    }
    out
}

fn push_row<'a>(out: &mut String, cells: impl Iterator<Item = &'a str>, widths: &[usize]) {
    for (cell, width) in cells.zip(widths) {
        out.push_str(&format!("| {:<width$} ", cell, width = *width));
    }
    out.push_str("|\n");
}

/// Format a single task as markdown.
pub fn format_task_markdown(task: &Task) -> String {
    let mut md = String::new();

    md.push_str(&format!("## Task {}: {}\n", task.id, task.description));
    md.push_str(&format!("- **status**: {}\n", task.status));
    md.push_str(&format!(
        "- **created_at**: {}\n",
        task.created_at.format("%Y-%m-%d %H:%M:%S UTC")
    ));
    md.push_str(&format!(
        "- **updated_at**: {}\n",
        task.updated_at.format("%Y-%m-%d %H:%M:%S UTC")
    ));

    md
}

/// Format a list of tasks as markdown, grouped by status in order of first appearance.
pub fn format_tasks_markdown(tasks: &[Task]) -> String {
    let mut md = String::new();

    md.push_str(&format!("# Tasks ({})\n\n", tasks.len()));

    let mut statuses: Vec<&str> = Vec::new();
    for task in tasks {
        if !statuses.contains(&task.status.as_str()) {
            statuses.push(&task.status);
        }
    }

    for status in statuses {
        md.push_str(&format!("## {}\n\n", format_status_name(status)));
        for task in tasks.iter().filter(|t| t.status == status) {
            md.push_str(&format!("- `{}` {}\n", task.id, task.description));
        }
        md.push('\n');
    }

    md
}

/// Format a status for display (capitalize words, hyphens and underscores become spaces).
fn format_status_name(status: &str) -> String {
    status
        .split(['-', '_'])
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                None => String::new(),
                Some(first) => first.to_uppercase().chain(chars).collect(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn task(id: u64, status: &str, description: &str) -> Task {
        Task {
            id,
            status: status.to_string(),
            description: description.to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn test_output_format_from_str() {
        assert_eq!(OutputFormat::from_str("JSON"), Some(OutputFormat::Json));
        assert_eq!(OutputFormat::from_str("md"), Some(OutputFormat::Markdown));
        assert_eq!(OutputFormat::from_str("table"), Some(OutputFormat::Table));
        assert_eq!(OutputFormat::from_str("csv"), None);
    }

    #[test]
    fn test_table_layout() {
        let tasks = vec![task(1, "todo", "buy milk"), task(12, "in-progress", "x")];

        let table = format_tasks_table(&tasks);

        let expected = "\
| ID | Status      | Description |
+----+-------------+-------------+
| 1  | todo        | buy milk    |
| 12 | in-progress | x           |
";
        assert_eq!(table, expected);
    }

    #[test]
    fn test_empty_table_has_header_only() {
        let table = format_tasks_table(&[]);
        assert_eq!(
            table,
            "| ID | Status | Description |\n+----+--------+-------------+\n"
        );
    }

    #[test]
    fn test_table_pads_by_characters() {
        let table = format_tasks_table(&[task(1, "done", "café au lait")]);
        let lines: Vec<&str> = table.lines().collect();
        assert_eq!(lines[0].chars().count(), lines[2].chars().count());
    }

    #[test]
    fn test_markdown_groups_by_status() {
        let tasks = vec![
            task(1, "todo", "a"),
            task(2, "done", "b"),
            task(3, "todo", "c"),
        ];

        let md = format_tasks_markdown(&tasks);

        assert!(md.starts_with("# Tasks (3)\n"));
        let todo = md.find("## Todo").unwrap();
        let done = md.find("## Done").unwrap();
        assert!(todo < done);
        assert!(md.contains("- `1` a\n- `3` c\n"));
    }

    #[test]
    fn test_status_name() {
        assert_eq!(format_status_name("in-progress"), "In Progress");
        assert_eq!(format_status_name("done"), "Done");
    }

    #[test]
    fn test_json_output_keeps_field_names() {
        let json = format_tasks(&[task(4, "done", "ship it")], OutputFormat::Json).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value[0]["id"], 4);
        assert_eq!(value[0]["status"], "done");
    }
}
