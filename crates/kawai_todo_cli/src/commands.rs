//! Subcommand execution against a loaded session.

use crate::Command;
use kawai_todo_core::{
    AppConfig, IdPrefixMatch, MemoryGateway, PersistenceGateway, SqliteKvGateway, ToDoId,
    ToDoSession, ToDoStore,
};
use log::{info, warn};
use std::io::Write;

/// Opens storage, loads the list, applies `command` and prints the result.
///
/// An unreadable database does not stop the command; the session runs on
/// an empty in-memory list instead.
pub(crate) fn run(
    config: &AppConfig,
    command: Command,
    out: &mut impl Write,
) -> Result<(), String> {
    let mut session = ToDoSession::new(ToDoStore::new(open_gateway(config)));
    session.load();
    info!(
        "event=cli_command module=cli status=start command={}",
        command_name(&command)
    );

    execute(&mut session, command)?;
    render(&session, out).map_err(|err| format!("failed to write output: {err}"))
}

fn open_gateway(config: &AppConfig) -> Box<dyn PersistenceGateway> {
    match SqliteKvGateway::open(&config.db_path) {
        Ok(gateway) => Box::new(gateway),
        Err(err) => {
            warn!(
                "event=todo_load module=cli status=reset error_code=open_failed error={err}"
            );
            eprintln!(
                "warning: cannot open to-do database `{}` ({err}); changes will not be saved",
                config.db_path.display()
            );
            Box::new(MemoryGateway::new())
        }
    }
}

fn execute<G: PersistenceGateway>(
    session: &mut ToDoSession<G>,
    command: Command,
) -> Result<(), String> {
    let outcome = match command {
        Command::List => return Ok(()),
        Command::Add { text } => {
            session.set_draft(text.join(" "));
            session.submit_draft().map(|_| ())
        }
        Command::Done { id } => {
            let id = resolve_id(session, &id)?;
            session.complete(id).map(|_| ())
        }
        Command::Undo { id } => {
            let id = resolve_id(session, &id)?;
            session.uncomplete(id).map(|_| ())
        }
        Command::Edit { id, text } => {
            let id = resolve_id(session, &id)?;
            session.update_text(id, &text.join(" ")).map(|_| ())
        }
        Command::Rm { id } => {
            let id = resolve_id(session, &id)?;
            session.delete(id).map(|_| ())
        }
    };
    outcome.map_err(|err| err.to_string())
}

fn resolve_id<G: PersistenceGateway>(
    session: &ToDoSession<G>,
    prefix: &str,
) -> Result<ToDoId, String> {
    match session.find_by_id_prefix(prefix) {
        IdPrefixMatch::Unique(id) => Ok(id),
        IdPrefixMatch::Missing => Err(format!("no to-do matches `{prefix}`")),
        IdPrefixMatch::Ambiguous(count) => {
            Err(format!("`{prefix}` matches {count} to-dos; use a longer id"))
        }
    }
}

fn render<G: PersistenceGateway>(
    session: &ToDoSession<G>,
    out: &mut impl Write,
) -> std::io::Result<()> {
    let items = session.display_items();
    if items.is_empty() {
        return writeln!(out, "Nothing to do.");
    }
    for item in items {
        let mark = if item.is_completed { 'x' } else { ' ' };
        writeln!(out, "[{mark}] {}  {}", item.short_id(), item.text)?;
    }
    Ok(())
}

fn command_name(command: &Command) -> &'static str {
    match command {
        Command::List => "list",
        Command::Add { .. } => "add",
        Command::Done { .. } => "done",
        Command::Undo { .. } => "undo",
        Command::Edit { .. } => "edit",
        Command::Rm { .. } => "rm",
    }
}

#[cfg(test)]
mod tests {
    use super::run;
    use crate::Command;
    use kawai_todo_core::AppConfig;
    use std::path::Path;

    fn config_at(dir: &Path) -> AppConfig {
        AppConfig {
            db_path: dir.join("todos.sqlite3"),
            log_dir: dir.join("logs"),
            log_level: "info",
        }
    }

    fn run_to_string(config: &AppConfig, command: Command) -> Result<String, String> {
        let mut out = Vec::new();
        run(config, command, &mut out)?;
        Ok(String::from_utf8(out).unwrap())
    }

    fn first_short_id(listing: &str) -> String {
        listing.chars().skip(4).take(8).collect()
    }

    #[test]
    fn empty_list_prints_placeholder() {
        let dir = tempfile::tempdir().unwrap();
        let output = run_to_string(&config_at(dir.path()), Command::List).unwrap();
        assert_eq!(output, "Nothing to do.\n");
    }

    #[test]
    fn add_done_edit_rm_across_invocations() {
        let dir = tempfile::tempdir().unwrap();
        let config = config_at(dir.path());

        let added = run_to_string(
            &config,
            Command::Add {
                text: vec!["Buy".to_string(), "milk".to_string()],
            },
        )
        .unwrap();
        assert!(added.starts_with("[ ] "));
        assert!(added.trim_end().ends_with("  Buy milk"));
        let short_id = first_short_id(&added);

        let done = run_to_string(&config, Command::Done { id: short_id.clone() }).unwrap();
        assert!(done.starts_with("[x] "));

        let edited = run_to_string(
            &config,
            Command::Edit {
                id: short_id.clone(),
                text: vec!["Buy oat milk".to_string()],
            },
        )
        .unwrap();
        assert!(edited.contains("Buy oat milk"));
        assert!(edited.starts_with("[x] "));

        let removed = run_to_string(&config, Command::Rm { id: short_id }).unwrap();
        assert_eq!(removed, "Nothing to do.\n");
    }

    #[test]
    fn unreadable_database_lists_empty_instead_of_failing() {
        let dir = tempfile::tempdir().unwrap();
        let config = config_at(dir.path());
        std::fs::write(&config.db_path, b"\x00\x01 definitely not sqlite \xff\xfe").unwrap();

        let output = run_to_string(&config, Command::List).unwrap();
        assert_eq!(output, "Nothing to do.\n");
    }

    #[test]
    fn newer_schema_database_still_accepts_commands() {
        let dir = tempfile::tempdir().unwrap();
        let config = config_at(dir.path());
        let conn = rusqlite::Connection::open(&config.db_path).unwrap();
        conn.execute_batch("PRAGMA user_version = 999;").unwrap();
        drop(conn);

        let output = run_to_string(
            &config,
            Command::Add {
                text: vec!["offline".to_string()],
            },
        )
        .unwrap();
        assert!(output.trim_end().ends_with("  offline"));
    }

    #[test]
    fn unknown_id_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let err = run_to_string(
            &config_at(dir.path()),
            Command::Done {
                id: "deadbeef".to_string(),
            },
        )
        .unwrap_err();
        assert!(err.contains("no to-do matches"));
    }
}
