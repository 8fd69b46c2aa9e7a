//! `dropimport` command line front end

use anyhow::{bail, Context, Result};
use clap::{value_parser, Arg, ArgAction, ArgMatches, Command};
use dropimport_core::memory::MemoryDocumentStore;
use dropimport_core::prelude::*;
use dropimport_core::{Collaborators, GridViewport, ViewTransform};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

mod local;
mod terminal;

use local::LocalAssetStore;
use terminal::{ConsoleNotifier, TerminalPrompt};

fn cli() -> Command {
    Command::new("dropimport")
        .version(dropimport_core::VERSION)
        .about("Import dropped files as actors and notes")
        .arg(
            Arg::new("log-json")
                .long("log-json")
                .global(true)
                .action(ArgAction::SetTrue)
                .help("Emit logs as JSON"),
        )
        .subcommand_required(true)
        .subcommand(
            Command::new("import")
                .about("Import a batch of files or URLs")
                .arg(
                    Arg::new("items")
                        .required(true)
                        .num_args(1..)
                        .help("Files or http(s) URLs, in drop order"),
                )
                .arg(
                    Arg::new("x")
                        .long("x")
                        .default_value("0")
                        .allow_negative_numbers(true)
                        .value_parser(value_parser!(f64))
                        .help("Drop point, screen x"),
                )
                .arg(
                    Arg::new("y")
                        .long("y")
                        .default_value("0")
                        .allow_negative_numbers(true)
                        .value_parser(value_parser!(f64))
                        .help("Drop point, screen y"),
                )
                .arg(
                    Arg::new("free")
                        .long("free")
                        .action(ArgAction::SetTrue)
                        .help("Do not snap positions to the grid"),
                )
                .arg(
                    Arg::new("grid")
                        .long("grid")
                        .default_value("100")
                        .value_parser(value_parser!(f64))
                        .help("Grid size used for snapping"),
                )
                .arg(
                    Arg::new("direct")
                        .long("direct")
                        .value_name("KIND")
                        .help("Skip prompts and import everything as actor or note"),
                )
                .arg(
                    Arg::new("config")
                        .long("config")
                        .value_parser(value_parser!(PathBuf))
                        .help("TOML configuration file"),
                )
                .arg(
                    Arg::new("out")
                        .long("out")
                        .default_value("dropimport-out")
                        .value_parser(value_parser!(PathBuf))
                        .help("Directory receiving uploads"),
                )
                .arg(
                    Arg::new("catalog")
                        .long("catalog")
                        .value_parser(value_parser!(PathBuf))
                        .help("Catalog names, one per line"),
                )
                .arg(
                    Arg::new("json")
                        .long("json")
                        .action(ArgAction::SetTrue)
                        .help("Print created folders, documents and placements as JSON"),
                ),
        )
}

fn init_tracing(json: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);
    if json {
        builder.json().init();
    } else {
        builder.init();
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let matches = cli().get_matches();
    init_tracing(matches.get_flag("log-json"));

    match matches.subcommand() {
        Some(("import", args)) => import(args).await,
        _ => Ok(()),
    }
}

async fn import(args: &ArgMatches) -> Result<()> {
    let mut config = match args.get_one::<PathBuf>("config") {
        Some(path) => ImportConfig::load(path)
            .await
            .with_context(|| format!("loading {}", path.display()))?,
        None => ImportConfig::new(),
    };
    if let Some(kind) = args.get_one::<String>("direct") {
        let kind: DocumentKind = kind.parse().map_err(anyhow::Error::msg)?;
        config = config.with_mode(ImportMode::Direct { kind });
    }

    let documents = match args.get_one::<PathBuf>("catalog") {
        Some(path) => MemoryDocumentStore::with_catalog(read_catalog(path).await?),
        None => MemoryDocumentStore::new(),
    };
    let documents = Arc::new(documents);

    let out = args
        .get_one::<PathBuf>("out")
        .cloned()
        .unwrap_or_else(|| PathBuf::from("dropimport-out"));
    tokio::fs::create_dir_all(&out)
        .await
        .with_context(|| format!("creating {}", out.display()))?;

    let grid = args.get_one::<f64>("grid").copied().unwrap_or(100.0);
    let orchestrator = PlacementOrchestrator::new(
        config,
        Collaborators {
            documents: documents.clone(),
            assets: Arc::new(LocalAssetStore::new(&out)),
            prompt: Arc::new(TerminalPrompt::new()),
            viewport: Arc::new(GridViewport::new(ViewTransform::identity(), grid)),
            notifier: Arc::new(ConsoleNotifier),
        },
    );

    let mut items = Vec::new();
    if let Some(values) = args.get_many::<String>("items") {
        for value in values {
            items.push(load_item(value).await?);
        }
    }
    let point = ScreenPoint::new(
        args.get_one::<f64>("x").copied().unwrap_or_default(),
        args.get_one::<f64>("y").copied().unwrap_or_default(),
    );
    let batch = DropBatch::new(items, point).with_free_placement(args.get_flag("free"));

    let report = orchestrator.import_batch(batch).await?;
    if report.failed_count() > 0 {
        tracing::warn!(failed = report.failed_count(), "some items were not imported");
    }

    if args.get_flag("json") {
        println!("{}", serde_json::to_string_pretty(&documents.snapshot())?);
    }
    Ok(())
}

async fn load_item(value: &str) -> Result<DroppedItem> {
    if value.starts_with("http://") || value.starts_with("https://") {
        return Ok(DroppedItem::from_url(value));
    }
    let path = Path::new(value);
    let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
        bail!("not a file: {value}");
    };
    let bytes = tokio::fs::read(path)
        .await
        .with_context(|| format!("reading {value}"))?;
    Ok(DroppedItem::from_bytes(name, bytes, None))
}

async fn read_catalog(path: &Path) -> Result<Vec<String>> {
    let text = tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("reading catalog {}", path.display()))?;
    Ok(text
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .map(str::to_string)
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_import_arguments() {
        let matches = cli()
            .try_get_matches_from([
                "dropimport", "import", "a.png", "b.png", "--x", "-40", "--free", "--direct",
                "note",
            ])
            .unwrap();
        let (name, args) = matches.subcommand().unwrap();
        assert_eq!(name, "import");
        assert_eq!(args.get_many::<String>("items").unwrap().count(), 2);
        assert_eq!(args.get_one::<f64>("x"), Some(&-40.0));
        assert!(args.get_flag("free"));
        assert_eq!(args.get_one::<String>("direct").map(String::as_str), Some("note"));
    }

    #[tokio::test]
    async fn catalog_file_skips_comments() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("catalog.txt");
        std::fs::write(&path, "# monsters\nGoblin\n\n  Orc Boss  \n").unwrap();
        assert_eq!(read_catalog(&path).await.unwrap(), vec!["Goblin", "Orc Boss"]);
    }

    #[tokio::test]
    async fn urls_are_not_read_from_disk() {
        let item = load_item("https://cdn.example.com/a/troll.png").await.unwrap();
        assert_eq!(item.original_filename(), "troll.png");
    }
}
