//! Interactive note shell.
//!
//! A plain line submits the draft; `:`-prefixed lines are commands that
//! drive the edit slot.

use crate::{print_notes, CliResult};
use notetaker_core::{DynNoteListController, EditSlot, Session, SubmitOutcome};
use tokio::io::{AsyncBufReadExt, BufReader};

const HELP: &str = "  <text>      save draft (creates, or updates the note being edited)
  :edit <n>   edit note number n
  :cancel     stop editing
  :rm <n>     delete note number n
  :reload     reload notes from the store
  :quit       leave";

#[derive(Debug, PartialEq, Eq)]
enum ShellCommand {
    Submit(String),
    Edit(usize),
    Cancel,
    Remove(usize),
    Reload,
    Help,
    Quit,
    Invalid(String),
}

fn parse_line(line: &str) -> Option<ShellCommand> {
    let line = line.trim_end_matches(['\r', '\n']);
    if line.trim().is_empty() {
        return None;
    }
    let Some(command) = line.strip_prefix(':') else {
        return Some(ShellCommand::Submit(line.to_string()));
    };

    let mut parts = command.split_whitespace();
    let parsed = match (parts.next(), parts.next(), parts.next()) {
        (Some("edit" | "e"), Some(n), None) => parse_index(n).map(ShellCommand::Edit),
        (Some("rm" | "delete"), Some(n), None) => parse_index(n).map(ShellCommand::Remove),
        (Some("cancel" | "c"), None, None) => Some(ShellCommand::Cancel),
        (Some("reload" | "r"), None, None) => Some(ShellCommand::Reload),
        (Some("help" | "h"), None, None) => Some(ShellCommand::Help),
        (Some("quit" | "q"), None, None) => Some(ShellCommand::Quit),
        _ => None,
    };
    Some(parsed.unwrap_or_else(|| ShellCommand::Invalid(line.to_string())))
}

/// Parses a 1-based list position.
fn parse_index(raw: &str) -> Option<usize> {
    raw.parse::<usize>().ok().filter(|n| *n > 0)
}

pub(crate) async fn run(session: &Session, controller: &DynNoteListController) -> CliResult {
    println!("{}", session.greeting());
    render(controller);

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        let Some(command) = parse_line(&line) else {
            continue;
        };
        if command == ShellCommand::Quit {
            break;
        }
        // Failures are shown and the session continues.
        if let Err(err) = apply(controller, command).await {
            println!("! {err}");
        }
        render(controller);
    }
    Ok(())
}

async fn apply(controller: &DynNoteListController, command: ShellCommand) -> CliResult {
    match command {
        ShellCommand::Submit(text) => match controller.submit(text).await? {
            SubmitOutcome::Created(note) => println!("+ added [{}]", note.id),
            SubmitOutcome::Updated(note) => println!("~ updated [{}]", note.id),
        },
        ShellCommand::Edit(n) => {
            let note = nth_note(controller, n)?;
            controller.begin_edit(&note)?;
        }
        ShellCommand::Cancel => controller.cancel_edit()?,
        ShellCommand::Remove(n) => {
            let note = nth_note(controller, n)?;
            controller.apply_delete(&note.id).await?;
            println!("- deleted [{}]", note.id);
        }
        ShellCommand::Reload => {
            controller.load().await?;
        }
        ShellCommand::Help => println!("{HELP}"),
        ShellCommand::Invalid(line) => return Err(format!("unknown command `{line}`").into()),
        ShellCommand::Quit => {}
    }
    Ok(())
}

fn nth_note(
    controller: &DynNoteListController,
    n: usize,
) -> Result<notetaker_core::Note, String> {
    controller
        .notes()
        .into_iter()
        .nth(n - 1)
        .ok_or_else(|| format!("no note number {n}"))
}

fn render(controller: &DynNoteListController) {
    let state = controller.snapshot();
    println!();
    print_notes(state.notes.as_slice());
    match &state.edit_slot {
        EditSlot::Idle => println!("new note> {}", state.draft),
        EditSlot::Editing(id) => println!("editing [{id}]> {}", state.draft),
    }
}
