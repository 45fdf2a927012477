//! genweb metadata editor CLI
//!
//! Drives the editor engine against a running genweb server.
//!
//! # Usage
//!
//! ```bash
//! # List identifiers
//! genweb_editor ids metadata
//!
//! # Type-ahead over the people directory
//! genweb_editor suggest people smith john
//!
//! # Person with parents and children
//! genweb_editor person SmithJohn1900 --parents --children
//!
//! # Edit a record
//! genweb_editor save wedding-1950 --type picture --set caption="Church steps"
//! ```

use std::process::ExitCode;
use std::sync::Arc;

use anyhow::{anyhow, bail, Context};
use clap::{Parser, Subcommand, ValueEnum};
use colored::Colorize;

use genweb_editor::editor::SaveOutcome;
use genweb_editor::people::PersonSummary;
use genweb_editor::typeahead::suggest;
use genweb_editor::{
    BlurOutcome, Directory, EditorConfig, Expansion, HttpApiClient, MetadataEditor, Pool,
};

#[derive(Parser)]
#[command(name = "genweb_editor")]
#[command(version = "0.1.0")]
#[command(about = "Metadata editor and people directory client for a genweb server")]
#[command(long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Server root (overrides GENWEB_API_URL and the config file)
    #[arg(long, global = true)]
    api_url: Option<String>,

    /// Output format
    #[arg(long, short = 'o', global = true, default_value = "pretty", value_enum)]
    format: OutputFormat,
}

#[derive(Clone, Copy, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    Json,
    Pretty,
}

#[derive(Clone, Copy, ValueEnum)]
enum PoolArg {
    People,
    Metadata,
}

impl From<PoolArg> for Pool {
    fn from(pool: PoolArg) -> Self {
        match pool {
            PoolArg::People => Pool::People,
            PoolArg::Metadata => Pool::Metadata,
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// List every identifier in a pool
    Ids { pool: PoolArg },

    /// Type-ahead suggestions for a query
    Suggest {
        pool: PoolArg,
        /// Query words (all must match)
        query: Vec<String>,
        /// Maximum suggestions (defaults to the configured cap)
        #[arg(long)]
        max: Option<usize>,
    },

    /// Show a person and optionally their relations
    Person {
        id: String,
        #[arg(long)]
        parents: bool,
        #[arg(long)]
        spouses: bool,
        #[arg(long)]
        children: bool,
    },

    /// Load a metadata record into the form and print it
    Show { id: String },

    /// Create or update a metadata record
    Save {
        id: String,
        /// Record type: inline, href or picture
        #[arg(long = "type")]
        record_type: Option<String>,
        /// field=value; list fields take `\n`-separated items
        #[arg(long = "set", value_name = "FIELD=VALUE")]
        sets: Vec<String>,
    },
}

#[tokio::main]
async fn main() -> ExitCode {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::WARN.into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let format = cli.format;

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            if format == OutputFormat::Json {
                println!("{}", serde_json::json!({ "error": format!("{e:#}") }));
            } else {
                eprintln!("{}: {:#}", "error".red().bold(), e);
            }
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let mut config = EditorConfig::from_env()?;
    if let Some(url) = cli.api_url {
        config.api_base_url = url;
    }

    let api = Arc::new(HttpApiClient::new(&config.api_base_url)?);
    let mut editor = MetadataEditor::new(api, &config);
    editor.load_directory().await;

    match cli.command {
        Commands::Ids { pool } => cmd_ids(&editor, pool.into(), cli.format),
        Commands::Suggest { pool, query, max } => cmd_suggest(
            &editor,
            pool.into(),
            &query.join(" "),
            max.unwrap_or(config.max_type_ahead),
            cli.format,
        ),
        Commands::Person {
            id,
            parents,
            spouses,
            children,
        } => {
            let expansion = Expansion {
                parents,
                spouses,
                children,
            };
            cmd_person(&mut editor, &id, expansion, cli.format).await
        }
        Commands::Show { id } => cmd_show(&mut editor, &id, cli.format).await,
        Commands::Save {
            id,
            record_type,
            sets,
        } => cmd_save(&mut editor, &id, record_type, &sets, cli.format).await,
    }
}

type Editor = MetadataEditor<HttpApiClient>;

// =============================================================================
// COMMAND IMPLEMENTATIONS
// =============================================================================

fn loaded_pool(editor: &Editor, pool: Pool) -> anyhow::Result<Vec<String>> {
    let ids = editor
        .directory()
        .candidates(pool)
        .ok_or_else(|| anyhow!("{pool} directory could not be loaded\n{}", editor.errors().text()))?;
    Ok(ids.iter().map(|id| id.to_string()).collect())
}

fn cmd_ids(editor: &Editor, pool: Pool, format: OutputFormat) -> anyhow::Result<()> {
    let ids = loaded_pool(editor, pool)?;
    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&ids)?),
        OutputFormat::Pretty => {
            for id in &ids {
                println!("{id}");
            }
            eprintln!("{} {} {} identifier(s)", "OK".green(), ids.len(), pool);
        }
    }
    Ok(())
}

fn cmd_suggest(
    editor: &Editor,
    pool: Pool,
    query: &str,
    max: usize,
    format: OutputFormat,
) -> anyhow::Result<()> {
    loaded_pool(editor, pool)?;
    let candidates = editor.directory().candidates(pool).unwrap_or_default();
    let matches: Vec<&str> = suggest(candidates, query, max)
        .into_iter()
        .map(|id| id.as_str())
        .collect();

    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&matches)?),
        OutputFormat::Pretty => {
            if matches.is_empty() {
                println!("{}", "No matches".yellow());
            }
            for id in matches {
                println!("{id}");
            }
        }
    }
    Ok(())
}

async fn cmd_person(
    editor: &mut Editor,
    id: &str,
    expansion: Expansion,
    format: OutputFormat,
) -> anyhow::Result<()> {
    editor.type_person(id);
    let rendered = editor.load_person(expansion).await;
    if rendered == 0 {
        if editor.errors().is_empty() {
            bail!("unknown person '{id}'");
        }
        bail!("person lookup failed\n{}", editor.errors().text());
    }

    let view = editor.person_view();
    let sections: [(&str, &[PersonSummary]); 4] = [
        ("person", &view.person),
        ("parents", &view.parents),
        ("spouses", &view.spouses),
        ("children", &view.children),
    ];

    match format {
        OutputFormat::Json => {
            let output: serde_json::Map<String, serde_json::Value> = sections
                .iter()
                .map(|(name, people)| {
                    let lines = people.iter().map(|p| p.to_string()).collect::<Vec<_>>();
                    (name.to_string(), serde_json::json!(lines))
                })
                .collect();
            println!("{}", serde_json::to_string_pretty(&output)?);
        }
        OutputFormat::Pretty => {
            for (name, people) in sections {
                if people.is_empty() {
                    continue;
                }
                println!("{}", name.bold());
                for person in people {
                    for line in person.to_string().lines() {
                        println!("  {line}");
                    }
                    println!();
                }
            }
        }
    }

    if !editor.errors().is_empty() {
        eprintln!("{}\n{}", "some relations failed to load:".yellow(), editor.errors().text());
    }
    Ok(())
}

async fn cmd_show(editor: &mut Editor, id: &str, format: OutputFormat) -> anyhow::Result<()> {
    editor.type_identifier(id);
    match editor.identifier_blurred().await {
        BlurOutcome::CacheNotLoaded => bail!("metadata directory could not be loaded\n{}", editor.errors().text()),
        BlurOutcome::NewRecord => bail!("no metadata record '{id}'"),
        BlurOutcome::Existing(_) if !editor.errors().is_empty() => {
            bail!("loading '{id}' failed\n{}", editor.errors().text())
        }
        BlurOutcome::Existing(_) => {}
    }

    print_form(editor, format)
}

async fn cmd_save(
    editor: &mut Editor,
    id: &str,
    record_type: Option<String>,
    sets: &[String],
    format: OutputFormat,
) -> anyhow::Result<()> {
    editor.type_identifier(id);
    if editor.identifier_blurred().await == BlurOutcome::CacheNotLoaded {
        bail!("metadata directory could not be loaded\n{}", editor.errors().text());
    }
    if !editor.errors().is_empty() {
        bail!("loading '{id}' failed\n{}", editor.errors().text());
    }
    let label = editor.submit().label;

    if let Some(record_type) = record_type {
        editor.select_type(&record_type);
    }
    for assignment in sets {
        let (field, value) = assignment
            .split_once('=')
            .with_context(|| format!("expected FIELD=VALUE, got '{assignment}'"))?;
        if !editor.set_field(field, value.replace("\\n", "\n")) {
            bail!("unknown field '{field}'");
        }
    }

    match editor.save().await {
        SaveOutcome::Saved => {
            if format == OutputFormat::Pretty {
                println!("{} {} '{}'", "OK".green().bold(), label.as_str(), id);
            }
            print_form(editor, format)
        }
        SaveOutcome::Failed => bail!("save failed\n{}", editor.errors().text()),
        SaveOutcome::Busy => bail!("a save is already in flight"),
    }
}

fn print_form(editor: &Editor, format: OutputFormat) -> anyhow::Result<()> {
    let form = editor.form();
    match format {
        OutputFormat::Json => {
            let record = form.serialize(editor.rules());
            println!("{}", serde_json::to_string_pretty(&record)?);
        }
        OutputFormat::Pretty => {
            println!("{:>10}: {}", "type".bold(), form.record_type());
            for row in form.rows().iter().filter(|row| row.is_visible()) {
                let mut lines = row.value().lines();
                println!("{:>10}: {}", row.name().bold(), lines.next().unwrap_or_default());
                for line in lines {
                    println!("{:>10}  {}", "", line);
                }
            }
        }
    }
    Ok(())
}
