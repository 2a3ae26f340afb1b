use anyhow::{anyhow, bail, Context, Result};
use clap::{Parser, Subcommand};
use docforge_lib::config::loader::validate_config;
use docforge_lib::config::{
    merge, resolve_token, ConfigLoader, ConfigOverrides, DocforgeConfig, SecretsConfig,
};
use docforge_lib::events::{EventSink, WorkflowEvent};
use docforge_lib::formatter::{self, DisplayNode};
use docforge_lib::models::{
    preview_title, DocumentType, Feedback, OutlineEntry, UnitId, UnitKind,
};
use docforge_lib::parsers::parse_outline;
use docforge_lib::refinement::RefinementEngine;
use docforge_lib::service::{DocumentService, HttpDocumentService};
use docforge_lib::session::Session;
use std::io::Read;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::mpsc;

/// DocForge - draft structured documents and slide decks with AI
#[derive(Parser, Debug)]
#[command(name = "docforge")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// DocForge API base URL (overrides the config file)
    #[arg(long, global = true, env = "DOCFORGE_BASE_URL")]
    base_url: Option<String>,

    /// Identity token (overrides the stored token)
    #[arg(long, global = true, env = "DOCFORGE_TOKEN", hide_env_values = true)]
    token: Option<String>,

    /// Config file path (defaults to <config dir>/docforge/config.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Request timeout in seconds
    #[arg(long, global = true)]
    timeout: Option<u64>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Parse outline text into a structure (reads stdin when no file is given)
    Outline {
        file: Option<PathBuf>,
        #[arg(long = "type", default_value = "docx")]
        document_type: DocumentType,
    },
    /// Render markdown the way the preview shows it
    Preview {
        file: Option<PathBuf>,
        /// Print display nodes as JSON
        #[arg(long)]
        json: bool,
    },
    /// Create a new document: topic, structure, generation
    Create {
        #[arg(long)]
        prompt: String,
        #[arg(long = "type", default_value = "docx")]
        document_type: DocumentType,
        /// Ask the AI for an outline before generating
        #[arg(long)]
        suggest: bool,
        /// Slide count for presentations
        #[arg(long)]
        slides: Option<i64>,
        /// Explicit unit titles, in order (repeatable)
        #[arg(long = "title")]
        titles: Vec<String>,
        /// Export the generated document into this directory
        #[arg(long)]
        export: Option<PathBuf>,
    },
    /// Open an existing project and print its content
    Open { project_id: String },
    /// Refine one or more units; several units run concurrently
    Refine {
        project_id: String,
        #[arg(long = "unit", required = true)]
        units: Vec<String>,
        #[arg(long)]
        instruction: String,
    },
    /// Like or dislike a unit
    Feedback {
        project_id: String,
        #[arg(long)]
        unit: String,
        /// like or dislike
        value: Feedback,
    },
    /// Comment on a unit
    Comment {
        project_id: String,
        #[arg(long)]
        unit: String,
        text: String,
    },
    /// Download the rendered document
    Export {
        project_id: String,
        #[arg(long)]
        dir: Option<PathBuf>,
    },
    /// List your projects, newest first
    Projects,
    /// Verify a token and store it
    Login,
    /// Forget the stored token
    Logout,
}

fn main() {
    env_logger::init();

    let cli = Cli::parse();

    let runtime = match tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
    {
        Ok(rt) => rt,
        Err(e) => {
            eprintln!("Error: Failed to create tokio runtime: {}", e);
            std::process::exit(1);
        }
    };

    if let Err(e) = runtime.block_on(run(cli)) {
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<()> {
    let config = load_config(&cli)?;

    match cli.command {
        Command::Outline {
            ref file,
            document_type,
        } => print_outline(&read_input(file.as_deref())?, document_type.unit_kind()),
        Command::Preview { ref file, json } => print_preview(&read_input(file.as_deref())?, json),
        Command::Logout => {
            let mut secrets = SecretsConfig::load()?;
            if secrets.clear_token() {
                secrets.save()?;
                println!("Signed out");
            } else {
                println!("No stored token");
            }
            Ok(())
        }
        _ => run_online(cli, config).await,
    }
}

/// Commands that talk to the document service
async fn run_online(cli: Cli, config: DocforgeConfig) -> Result<()> {
    let mut secrets = SecretsConfig::load()?;
    let token = resolve_token(cli.token.as_deref(), &secrets).ok_or_else(|| {
        anyhow!("No identity token. Pass --token, set DOCFORGE_TOKEN or run `docforge --token <TOKEN> login`")
    })?;

    let service: Arc<dyn DocumentService> = Arc::new(HttpDocumentService::new(&config.api, &token)?);
    let (events, rx) = EventSink::channel();
    tokio::spawn(forward_events(rx));

    let session = Session::establish(service, &token, events).await?;

    match cli.command {
        Command::Login => {
            secrets.set_token(&token);
            secrets.save()?;
            println!("Signed in as {}", session.identity().uid);
        }
        Command::Create {
            prompt,
            document_type,
            suggest,
            slides,
            titles,
            export,
        } => {
            let request = CreateRequest {
                prompt,
                document_type,
                suggest,
                slides,
                titles,
            };
            let engine = create(&session, &config, request).await?;
            print_engine(&engine);
            if let Some(dir) = export {
                let path = engine.export(&dir).await?;
                println!("Exported to {}", path.display());
            }
        }
        Command::Open { project_id } => {
            let engine = session.open_project(&project_id).await?;
            print_engine(&engine);
        }
        Command::Refine {
            project_id,
            units,
            instruction,
        } => {
            let engine = session.open_project(&project_id).await?;
            let ids: Vec<UnitId> = units.into_iter().map(UnitId::from).collect();
            let results = futures_util::future::join_all(
                ids.iter().map(|id| engine.refine(id, &instruction)),
            )
            .await;

            let mut failed = 0;
            for (id, result) in ids.iter().zip(results) {
                match result {
                    Ok(content) => println!("== {} ==\n{}\n", id, content),
                    Err(e) => {
                        failed += 1;
                        eprintln!("Failed to refine {}: {}", id, e);
                    }
                }
            }
            if failed > 0 {
                bail!("{} of {} refinements failed", failed, ids.len());
            }
        }
        Command::Feedback {
            project_id,
            unit,
            value,
        } => {
            let engine = session.open_project(&project_id).await?;
            let changed = engine.set_feedback(&UnitId::from(unit), value).await?;
            if changed {
                println!("Recorded {}", value.as_wire());
            } else {
                println!("Feedback unchanged");
            }
        }
        Command::Comment {
            project_id,
            unit,
            text,
        } => {
            let engine = session.open_project(&project_id).await?;
            let count = engine.add_comment(&UnitId::from(unit), &text).await?;
            println!("Comment added ({} total)", count);
        }
        Command::Export { project_id, dir } => {
            let engine = session.open_project(&project_id).await?;
            let dir = dir.unwrap_or_else(|| config.export.resolved_directory());
            let path = engine.export(&dir).await?;
            println!("Exported to {}", path.display());
        }
        Command::Projects => {
            for project in session.list_projects().await? {
                println!(
                    "{}  {}  {}  {}",
                    project.created_at.format("%Y-%m-%d %H:%M"),
                    project.document_type,
                    project.id,
                    project.title
                );
            }
        }
        Command::Outline { .. } | Command::Preview { .. } | Command::Logout => {}
    }

    Ok(())
}

struct CreateRequest {
    prompt: String,
    document_type: DocumentType,
    suggest: bool,
    slides: Option<i64>,
    titles: Vec<String>,
}

async fn create(
    session: &Session,
    config: &DocforgeConfig,
    request: CreateRequest,
) -> Result<RefinementEngine> {
    println!("Creating: {}", preview_title(&request.prompt));
    let mut workflow = session.new_workflow();
    workflow.set_prompt(request.prompt)?;
    workflow.set_document_type(request.document_type)?;
    workflow.proceed_to_structure()?;

    if request.suggest {
        let applied = workflow.suggest_outline().await?;
        if applied == 0 {
            log::warn!("Outline suggestion had no usable entries, keeping the default structure");
        }
    }

    if !request.titles.is_empty() {
        let entries = request
            .titles
            .iter()
            .enumerate()
            .map(|(i, title)| OutlineEntry::new(i as u32 + 1, title.clone()))
            .collect();
        workflow.structure_mut()?.apply_outline(entries);
    }

    if let Some(count) = request.slides {
        if request.document_type.unit_kind() != UnitKind::Slides {
            bail!("--slides only applies to presentations");
        }
        let count = count.min(config.limits.max_slides as i64);
        workflow.structure_mut()?.set_unit_count(count)?;
    }

    let kind = workflow.structure().kind();
    println!("{} structure:", kind.label());
    for entry in workflow.structure().entries() {
        println!("  {}. {}", entry.id, entry.title);
    }

    Ok(workflow.generate().await?)
}

fn load_config(cli: &Cli) -> Result<DocforgeConfig> {
    let loader = match cli.config {
        Some(ref path) => ConfigLoader::with_path(path),
        None => ConfigLoader::new(),
    };
    let overrides = ConfigOverrides {
        base_url: cli.base_url.clone(),
        request_timeout_secs: cli.timeout,
        export_directory: None,
    };
    let config = merge(loader.load()?, &overrides);
    validate_config(&config)?;
    Ok(config)
}

fn read_input(file: Option<&Path>) -> Result<String> {
    match file {
        Some(path) => std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read '{}'", path.display())),
        None => {
            let mut buffer = String::new();
            std::io::stdin()
                .read_to_string(&mut buffer)
                .context("Failed to read stdin")?;
            Ok(buffer)
        }
    }
}

fn print_outline(text: &str, kind: UnitKind) -> Result<()> {
    let entries = parse_outline(text, kind);
    if entries.is_empty() {
        println!("No {} found", kind.plural());
        return Ok(());
    }
    for entry in entries {
        println!("{}. {}", entry.id, entry.title);
    }
    Ok(())
}

fn print_preview(content: &str, json: bool) -> Result<()> {
    let nodes = formatter::format(content);
    if json {
        println!("{}", serde_json::to_string_pretty(&nodes)?);
        return Ok(());
    }

    println!("Title: {}", formatter::document_title(content));
    println!("Words: {}\n", formatter::word_count(content));
    for node in &nodes {
        println!("{}", render_node(node));
    }
    Ok(())
}

fn render_node(node: &DisplayNode) -> String {
    match node {
        DisplayNode::Heading { level, .. } => {
            format!("{} {}", "#".repeat(*level as usize), node.plain_text())
        }
        DisplayNode::ListItem { .. } => format!("  • {}", node.plain_text()),
        DisplayNode::Paragraph { .. } => node.plain_text(),
        DisplayNode::Spacer => String::new(),
    }
}

fn print_engine(engine: &RefinementEngine) {
    println!(
        "\n{} [{}] ({})\n",
        engine.title(),
        engine.project_id(),
        engine.document_type().display_name()
    );
    for unit in engine.units() {
        println!("== {} ({}) ==", unit.title, unit.id);
        for node in formatter::format(&unit.content) {
            println!("{}", render_node(&node));
        }
        if let Some(feedback) = unit.feedback {
            println!("[feedback: {}]", feedback.as_wire());
        }
        for comment in &unit.comments {
            println!("[comment] {}", comment);
        }
        println!();
    }
    println!("{} words", engine.word_count());
}

/// Surface workflow events in the log
async fn forward_events(mut rx: mpsc::UnboundedReceiver<WorkflowEvent>) {
    while let Some(event) = rx.recv().await {
        match event {
            WorkflowEvent::OperationFailed(ref payload) => {
                log::warn!("{}: {} failed: {}", event.name(), payload.operation, payload.error)
            }
            _ => log::info!(
                "{} {}",
                event.name(),
                serde_json::to_string(&event).unwrap_or_default()
            ),
        }
    }
}
