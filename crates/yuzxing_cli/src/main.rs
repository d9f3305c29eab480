//! Command-line front end for the notes store.
//!
//! # Responsibility
//! - Map subcommands onto `NotesStore` operations.
//! - Keep printing and argument parsing out of the core crate.

use clap::{Parser, Subcommand};
use log::{error, info};
use std::error::Error;
use std::path::PathBuf;
use std::process::ExitCode;
use yuzxing_core::{
    default_log_level, init_logging, NewFolder, NewTag, Note, NoteDraft, NoteFilter, NotePatch,
    NotesStore, StoreConfig, DEFAULT_DB_FILE_NAME,
};

#[derive(Debug, Parser)]
#[command(name = "yuzxing", version, about = "Local notes store with trash and backups")]
struct Cli {
    /// SQLite database file.
    #[arg(long, env = "YUZXING_DB", default_value = DEFAULT_DB_FILE_NAME)]
    db: PathBuf,

    /// Absolute directory for rolling log files; logging is off when unset.
    #[arg(long, env = "YUZXING_LOG_DIR")]
    log_dir: Option<PathBuf>,

    #[arg(long)]
    log_level: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// List active notes, pinned first.
    List {
        #[arg(long)]
        folder: Option<i64>,
        #[arg(long)]
        tag: Option<i64>,
        #[arg(long)]
        pinned: bool,
    },
    /// Print one note.
    Show { id: i64 },
    /// Create a note.
    Add {
        #[arg(long, default_value = "")]
        title: String,
        #[arg(long, default_value = "")]
        content: String,
        #[arg(long)]
        folder: Option<i64>,
        #[arg(long = "tag")]
        tags: Vec<i64>,
        #[arg(long)]
        pinned: bool,
    },
    /// Edit fields of an existing note.
    Edit {
        id: i64,
        #[arg(long)]
        title: Option<String>,
        #[arg(long)]
        content: Option<String>,
        #[arg(long, conflicts_with = "no_folder")]
        folder: Option<i64>,
        #[arg(long)]
        no_folder: bool,
        #[arg(long)]
        pin: Option<bool>,
    },
    /// Search active notes by title or content.
    Search { query: String },
    /// Move a note to the trash.
    Delete { id: i64 },
    /// List the trash.
    Trash,
    /// Bring a note back from the trash.
    Restore { id: i64 },
    /// Delete a note permanently.
    Purge { id: i64 },
    /// Permanently delete everything in the trash.
    EmptyTrash,
    /// Import plain-text files, one note per file.
    Import {
        #[arg(required = true)]
        files: Vec<PathBuf>,
    },
    /// Write a full JSON export to a file, or stdout.
    Export {
        #[arg(long)]
        out: Option<PathBuf>,
    },
    /// Load a JSON export into this store.
    RestoreBackup { file: PathBuf },
    /// Manage folders.
    Folder {
        #[command(subcommand)]
        action: CollectionAction,
    },
    /// Manage tags.
    Tag {
        #[command(subcommand)]
        action: CollectionAction,
    },
}

impl Command {
    /// Stable name used in log events.
    fn name(&self) -> &'static str {
        match self {
            Self::List { .. } => "list",
            Self::Show { .. } => "show",
            Self::Add { .. } => "add",
            Self::Edit { .. } => "edit",
            Self::Search { .. } => "search",
            Self::Delete { .. } => "delete",
            Self::Trash => "trash",
            Self::Restore { .. } => "restore",
            Self::Purge { .. } => "purge",
            Self::EmptyTrash => "empty_trash",
            Self::Import { .. } => "import",
            Self::Export { .. } => "export",
            Self::RestoreBackup { .. } => "restore_backup",
            Self::Folder { .. } => "folder",
            Self::Tag { .. } => "tag",
        }
    }
}

#[derive(Debug, Subcommand)]
enum CollectionAction {
    List,
    Add {
        name: String,
        /// Icon for folders, color for tags.
        #[arg(default_value = "")]
        style: String,
    },
    Delete {
        id: i64,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    if let Some(log_dir) = &cli.log_dir {
        let level = cli.log_level.as_deref().unwrap_or(default_log_level());
        if let Err(err) = init_logging(level, log_dir) {
            eprintln!("warning: logging disabled: {err}");
        }
    }

    let store = NotesStore::new(StoreConfig::file(&cli.db));
    let command_name = cli.command.name();
    match run(&store, cli.command) {
        Ok(()) => {
            info!("event=cli_command module=cli status=ok command={command_name}");
            ExitCode::SUCCESS
        }
        Err(err) => {
            error!("event=cli_command module=cli status=error command={command_name}");
            eprintln!("error: {err}");
            ExitCode::FAILURE
        }
    }
}

fn run(store: &NotesStore, command: Command) -> Result<(), Box<dyn Error>> {
    match command {
        Command::List { folder, tag, pinned } => {
            let notes = store.list_notes(&NoteFilter {
                folder_id: folder,
                tag_id: tag,
                pinned_only: pinned,
            })?;
            print_notes(&notes);
        }
        Command::Show { id } => match store.get_note(id)? {
            Some(note) => {
                println!("{}", summary_line(&note));
                println!();
                println!("{}", note.content);
            }
            None => return Err(format!("note {id} not found").into()),
        },
        Command::Add {
            title,
            content,
            folder,
            tags,
            pinned,
        } => {
            let mut draft = NoteDraft::new(title, content).with_tags(tags).pinned(pinned);
            draft.folder_id = folder;
            let id = store.add_note(draft)?;
            println!("created note {id}");
        }
        Command::Edit {
            id,
            title,
            content,
            folder,
            no_folder,
            pin,
        } => {
            let patch = NotePatch {
                title,
                content,
                folder_id: if no_folder { Some(None) } else { folder.map(Some) },
                tags: None,
                is_pinned: pin,
            };
            let note = store.update_note(id, patch)?;
            println!("{}", summary_line(&note));
        }
        Command::Search { query } => print_notes(&store.search_notes(&query)?),
        Command::Delete { id } => {
            store.delete_note(id)?;
            println!("moved note {id} to trash");
        }
        Command::Trash => print_notes(&store.get_deleted_notes()?),
        Command::Restore { id } => {
            store.restore_note(id)?;
            println!("restored note {id}");
        }
        Command::Purge { id } => {
            store.permanently_delete_note(id)?;
            println!("permanently deleted note {id}");
        }
        Command::EmptyTrash => {
            let removed = store.empty_trash()?;
            println!("removed {removed} note(s) from trash");
        }
        Command::Import { files } => {
            let ids = store.import_text_paths(&files)?;
            println!("imported {} note(s)", ids.len());
        }
        Command::Export { out } => {
            let json = store.export_to_json()?;
            match out {
                Some(path) => {
                    std::fs::write(&path, json)?;
                    println!("exported to {}", path.display());
                }
                None => println!("{json}"),
            }
        }
        Command::RestoreBackup { file } => {
            let json = std::fs::read_to_string(&file)?;
            let summary = store.restore_snapshot(&json)?;
            println!(
                "restored {} note(s), {} folder(s), {} tag(s); dropped {} dangling reference(s)",
                summary.notes, summary.folders, summary.tags, summary.dropped_references
            );
        }
        Command::Folder { action } => match action {
            CollectionAction::List => {
                for folder in store.get_all_folders()? {
                    println!("{:>4}  {}  {}", folder.id, folder.icon, folder.name);
                }
            }
            CollectionAction::Add { name, style } => {
                let id = store.add_folder(NewFolder::new(name, style))?;
                println!("created folder {id}");
            }
            CollectionAction::Delete { id } => {
                store.delete_folder(id)?;
                println!("deleted folder {id}");
            }
        },
        Command::Tag { action } => match action {
            CollectionAction::List => {
                for tag in store.get_all_tags()? {
                    println!("{:>4}  {}  {}", tag.id, tag.color, tag.name);
                }
            }
            CollectionAction::Add { name, style } => {
                let id = store.add_tag(NewTag::new(name, style))?;
                println!("created tag {id}");
            }
            CollectionAction::Delete { id } => {
                store.delete_tag(id)?;
                println!("deleted tag {id}");
            }
        },
    }
    Ok(())
}

fn print_notes(notes: &[Note]) {
    if notes.is_empty() {
        println!("no notes");
        return;
    }
    for note in notes {
        println!("{}", summary_line(note));
    }
}

fn summary_line(note: &Note) -> String {
    let pin = if note.is_pinned { "*" } else { " " };
    let when = note.deleted_at.unwrap_or(note.updated_at);
    format!(
        "{:>4} {pin} {}  {}",
        note.id,
        when.format("%Y-%m-%d %H:%M"),
        note.title
    )
}
