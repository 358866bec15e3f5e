//! Terminal presenter for the task board.
//!
//! # Responsibility
//! - Draw render frames as plain text rows.
//! - Show notifications and answer confirmation/edit prompts from input.
//!
//! # Invariants
//! - Only display-safe text (`TaskRow::display_text`) reaches the terminal.
//! - Output write failures are logged, never panicked on.

use chrono::{DateTime, Duration, Local, Utc};
use log::debug;
use std::io::{BufRead, Write};
use taskdeck_core::{Presenter, Priority, RenderFrame, Severity, TaskRow, Theme};

const RESET: &str = "\x1b[0m";

/// Palette for one theme: (high, medium, low, overdue).
fn palette(theme: Theme) -> [&'static str; 4] {
    match theme {
        Theme::Light => ["\x1b[31m", "\x1b[33m", "\x1b[32m", "\x1b[1;31m"],
        Theme::Dark => ["\x1b[91m", "\x1b[93m", "\x1b[92m", "\x1b[1;91m"],
    }
}

pub struct TerminalPresenter<W: Write, I: BufRead> {
    out: W,
    input: I,
    theme: Theme,
    color: bool,
    assume_yes: bool,
    prepared_text: Option<String>,
    errors: usize,
}

impl<W: Write, I: BufRead> TerminalPresenter<W, I> {
    pub fn new(out: W, input: I) -> Self {
        Self {
            out,
            input,
            theme: Theme::default(),
            color: false,
            assume_yes: false,
            prepared_text: None,
            errors: 0,
        }
    }

    /// Enables ANSI colors.
    pub fn with_color(mut self, color: bool) -> Self {
        self.color = color;
        self
    }

    /// Answers every confirmation with yes.
    pub fn assume_yes(&mut self, value: bool) {
        self.assume_yes = value;
    }

    /// Supplies the answer for the next edit prompt instead of reading input.
    pub fn prepare_edit_text(&mut self, text: String) {
        self.prepared_text = Some(text);
    }

    /// Number of error notifications shown so far.
    pub fn error_count(&self) -> usize {
        self.errors
    }

    #[cfg(test)]
    pub fn into_output(self) -> W {
        self.out
    }

    fn emit(&mut self, line: &str) {
        if let Err(err) = writeln!(self.out, "{line}").and_then(|()| self.out.flush()) {
            debug!("event=terminal_write module=cli status=error error={err}");
        }
    }

    fn paint(&self, code: &str, text: &str) -> String {
        if self.color {
            format!("{code}{text}{RESET}")
        } else {
            text.to_string()
        }
    }

    fn ask(&mut self, prompt: &str) -> Option<String> {
        if let Err(err) = write!(self.out, "{prompt} ").and_then(|()| self.out.flush()) {
            debug!("event=terminal_write module=cli status=error error={err}");
        }
        let mut line = String::new();
        match self.input.read_line(&mut line) {
            Ok(0) | Err(_) => None,
            Ok(_) => Some(line.trim_end_matches(['\r', '\n']).to_string()),
        }
    }

    fn format_row(&self, row: &TaskRow, now: DateTime<Utc>) -> String {
        let [high, medium, low, overdue] = palette(self.theme);
        let task = &row.task;
        let check = if task.completed { "[x]" } else { "[ ]" };
        let priority_label = format!("{:<6}", task.priority.as_str().to_uppercase());
        let priority = match task.priority {
            Priority::High => self.paint(high, &priority_label),
            Priority::Medium => self.paint(medium, &priority_label),
            Priority::Low => self.paint(low, &priority_label),
        };

        let mut line = format!(
            "{:>15}  {check} {priority} {}",
            task.id.get(),
            row.display_text
        );
        if let Some(due) = task.due_date {
            line.push_str(&format!("  (due {})", format_due(due, now)));
        }
        if row.overdue {
            line.push_str(&format!("  {}", self.paint(overdue, "OVERDUE")));
        }
        line
    }
}

impl<W: Write, I: BufRead> Presenter for TerminalPresenter<W, I> {
    fn render(&mut self, frame: &RenderFrame) {
        let header = format!(
            "[{}] {} total · {} active · {} completed",
            frame.filter, frame.counts.total, frame.counts.active, frame.counts.completed
        );
        self.emit(&header);

        if frame.rows.is_empty() {
            self.emit("  No tasks here yet.");
            return;
        }
        let lines: Vec<String> = frame
            .rows
            .iter()
            .map(|row| self.format_row(row, frame.now))
            .collect();
        for line in lines {
            self.emit(&line);
        }
    }

    fn notify(&mut self, message: &str, severity: Severity) {
        let marker = match severity {
            Severity::Success => "ok:",
            Severity::Error => {
                self.errors += 1;
                "error:"
            }
            Severity::Info => "note:",
        };
        self.emit(&format!("{marker} {message}"));
    }

    fn request_confirmation(&mut self, prompt: &str) -> bool {
        if self.assume_yes {
            return true;
        }
        self.ask(&format!("{prompt} [y/N]"))
            .map(|answer| matches!(answer.trim().to_ascii_lowercase().as_str(), "y" | "yes"))
            .unwrap_or(false)
    }

    fn request_edited_text(&mut self, prompt: &str, current: &str) -> Option<String> {
        if let Some(text) = self.prepared_text.take() {
            return Some(text);
        }
        self.ask(&format!("{prompt} (was: {current})"))
    }

    fn apply_theme(&mut self, theme: Theme) {
        self.theme = theme;
    }
}

/// Formats a due date relative to `now` in local time:
/// `Today 14:30`, `Tomorrow 09:00`, or `Mar 5, 14:30`.
pub fn format_due(due: DateTime<Utc>, now: DateTime<Utc>) -> String {
    let due_local = due.with_timezone(&Local);
    let today = now.with_timezone(&Local).date_naive();
    let time = due_local.format("%H:%M");

    if due_local.date_naive() == today {
        format!("Today {time}")
    } else if Some(due_local.date_naive()) == today.checked_add_signed(Duration::days(1)) {
        format!("Tomorrow {time}")
    } else {
        due_local.format("%b %-d, %H:%M").to_string()
    }
}
