//! Command-line surface for the note list.
//!
//! # Responsibility
//! - Resolve configuration, pass the auth gate and drive the controller.
//! - Render controller state as plain text.

mod shell;

use notetaker_core::bootstrap::open_controller;
use notetaker_core::{
    core_version, init_logging_from_config, AppConfig, ControllerError, DynNoteListController,
    Note,
};
use std::error::Error;
use std::process::ExitCode;

const USAGE: &str = "usage: notetaker <command>

commands:
  list                 print all notes
  add <text>           create a note
  edit <id> <text>     replace the text of a note
  delete <id>          delete a note
  shell                interactive session
  version              print version";

type CliResult = Result<(), Box<dyn Error>>;

#[tokio::main]
async fn main() -> ExitCode {
    dotenvy::dotenv().ok();
    let args: Vec<String> = std::env::args().skip(1).collect();

    match run(&args).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            log::error!("event=cli_exit module=cli status=error error={err}");
            eprintln!("error: {err}");
            ExitCode::FAILURE
        }
    }
}

async fn run(args: &[String]) -> CliResult {
    let command = args.first().map(String::as_str).unwrap_or("help");
    if matches!(command, "help" | "-h" | "--help") {
        println!("{USAGE}");
        return Ok(());
    }
    if command == "version" {
        println!("notetaker {}", core_version());
        return Ok(());
    }

    let config = AppConfig::from_env()?;
    init_logging_from_config(&config)?;
    let (session, controller) = open_controller(&config)?;
    controller.load().await?;

    match (command, &args[1..]) {
        ("list", []) => {
            print_notes(&controller.notes());
            Ok(())
        }
        ("add", [_, ..]) => {
            controller.submit(args[1..].join(" ")).await?;
            print_notes(&controller.notes());
            Ok(())
        }
        ("edit", [id, rest @ ..]) if !rest.is_empty() => {
            let note = find_note(&controller, id)?;
            controller.begin_edit(&note)?;
            controller.submit(rest.join(" ")).await?;
            print_notes(&controller.notes());
            Ok(())
        }
        ("delete", [id]) => {
            controller.apply_delete(id).await?;
            print_notes(&controller.notes());
            Ok(())
        }
        ("shell", []) => shell::run(&session, &controller).await,
        _ => Err(USAGE.into()),
    }
}

fn find_note(controller: &DynNoteListController, id: &str) -> Result<Note, ControllerError> {
    controller
        .notes()
        .into_iter()
        .find(|note| note.id == id)
        .ok_or_else(|| ControllerError::NoteNotFound(id.to_string()))
}

pub(crate) fn print_notes(notes: &[Note]) {
    if notes.is_empty() {
        println!("(no notes)");
        return;
    }
    for (index, note) in notes.iter().enumerate() {
        println!("{:>3}. {}  [{}]", index + 1, note.name, note.id);
    }
}
