use anyhow::{Context, Result, bail};
use fieldtext_config::Config;
use fieldtext_engine::{Cmd, FieldCatalog, FieldDocument, IoError, LogicalDocument, io};
use relative_path::RelativePath;
use std::io::Read;
use std::path::{Path, PathBuf};
use std::{env, process};

const USAGE: &str = "\
Usage: fieldtext-cli [--config <path>] <command>

Commands:
  list                              List documents and configured fields
  show <doc>                        Print the rendered text and field spans
  plain <doc>                       Print clipboard text
  import <doc>                      Read clipboard text from stdin and save it
  insert-field <doc> <pos> <id>     Insert a field at a byte position
  insert-text <doc> <pos> <text>    Insert text at a byte position
  delete <doc> <start> <end>        Delete a byte range";

#[derive(Debug, PartialEq)]
enum Command {
    List,
    Show { doc: String },
    Plain { doc: String },
    Import { doc: String },
    Edit { doc: String, cmd: Cmd<String> },
}

#[derive(Debug, PartialEq)]
struct Invocation {
    config_path: Option<PathBuf>,
    command: Command,
}

fn parse_args(args: &[String]) -> Result<Invocation> {
    let mut config_path = None;
    let mut rest = args;
    if let [flag, path, tail @ ..] = args
        && flag == "--config"
    {
        config_path = Some(PathBuf::from(path));
        rest = tail;
    }

    let command = match rest {
        [cmd] if cmd == "list" => Command::List,
        [cmd, doc] if cmd == "show" => Command::Show { doc: doc.clone() },
        [cmd, doc] if cmd == "plain" => Command::Plain { doc: doc.clone() },
        [cmd, doc] if cmd == "import" => Command::Import { doc: doc.clone() },
        [cmd, doc, pos, id] if cmd == "insert-field" => Command::Edit {
            doc: doc.clone(),
            cmd: Cmd::InsertField {
                at: parse_position(pos)?,
                field_id: id.clone(),
            },
        },
        [cmd, doc, pos, text] if cmd == "insert-text" => Command::Edit {
            doc: doc.clone(),
            cmd: Cmd::InsertText {
                at: parse_position(pos)?,
                text: text.clone(),
            },
        },
        [cmd, doc, start, end] if cmd == "delete" => Command::Edit {
            doc: doc.clone(),
            cmd: Cmd::DeleteRange {
                range: parse_position(start)?..parse_position(end)?,
            },
        },
        _ => bail!("{USAGE}"),
    };

    Ok(Invocation {
        config_path,
        command,
    })
}

fn parse_position(raw: &str) -> Result<usize> {
    raw.parse()
        .with_context(|| format!("Invalid position: {raw}"))
}

fn load_document(
    relative_path: &RelativePath,
    documents_path: &Path,
) -> Result<LogicalDocument<String>> {
    match io::read_document(relative_path, documents_path) {
        Ok(doc) => Ok(doc),
        Err(IoError::NotFound(path)) => {
            log::info!("{} does not exist yet, starting empty", path.display());
            Ok(LogicalDocument::default())
        }
        Err(e) => Err(e.into()),
    }
}

fn open_document(
    relative_path: &RelativePath,
    documents_path: &Path,
    catalog: FieldCatalog<String>,
) -> Result<FieldDocument<String>> {
    let logical = load_document(relative_path, documents_path)?;
    FieldDocument::from_logical(catalog, &logical)
        .with_context(|| format!("Cannot render {relative_path}"))
}

fn run(command: Command, config: &Config) -> Result<()> {
    let documents_path = &config.documents_path;
    match command {
        Command::List => {
            for path in io::scan_documents(documents_path)? {
                let shown = path.strip_prefix(documents_path).unwrap_or(&path);
                println!("{}", shown.display());
            }
            println!();
            for entry in config.catalog().iter() {
                println!("{:<16} {}", entry.field_id, entry.display_text);
            }
        }
        Command::Show { doc } => {
            let document = open_document(RelativePath::new(&doc), documents_path, config.catalog())?;
            println!("{}", document.physical_text());
            for field in document.fields() {
                println!("  {field}");
            }
        }
        Command::Plain { doc } => {
            let document = open_document(RelativePath::new(&doc), documents_path, config.catalog())?;
            println!("{}", document.get_plain_text());
        }
        Command::Import { doc } => {
            let mut raw = String::new();
            std::io::stdin().read_to_string(&mut raw)?;
            let mut document = FieldDocument::new(config.catalog());
            document.assign_clipboard_text(&raw)?;
            io::write_document(RelativePath::new(&doc), documents_path, &document.export_all())?;
            log::info!(
                "Imported {doc}: {} bytes, {} fields",
                document.len(),
                document.fields().len()
            );
        }
        Command::Edit { doc, cmd } => {
            let relative_path = RelativePath::new(&doc);
            let mut document = open_document(relative_path, documents_path, config.catalog())?;
            let patch = document
                .apply(cmd)
                .with_context(|| format!("Cannot edit {doc}"))?;
            io::write_document(relative_path, documents_path, &document.export_all())?;
            log::info!(
                "Saved {doc}: changed {:?}, caret at {}",
                patch.changed,
                patch.caret
            );
            println!("{}", document.physical_text());
        }
    }
    Ok(())
}

fn main() -> Result<()> {
    env_logger::Builder::from_default_env()
        .filter_level(log::LevelFilter::Info)
        .init();

    let args: Vec<String> = env::args().skip(1).collect();
    let invocation = match parse_args(&args) {
        Ok(invocation) => invocation,
        Err(e) => {
            eprintln!("{e}");
            process::exit(2);
        }
    };

    let config = match &invocation.config_path {
        Some(path) => Config::load_from_path(path)?,
        None => Config::load()?,
    };
    let Some(config) = config else {
        let path = invocation
            .config_path
            .unwrap_or_else(Config::config_path);
        eprintln!("No config file found at {}", path.display());
        eprintln!("Create one with a documents_path and [[fields]] entries.");
        process::exit(1);
    };

    run(invocation.command, &config)
}
