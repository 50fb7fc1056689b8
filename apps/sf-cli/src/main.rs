use clap::{Parser, Subcommand};
use serde_json::json;
use sf_app::{AppConfig, AppResult, CONFIG_FILE, EditorSession};
use sf_commands::DocumentCommand;
use sf_core::{TransformPatch, next_id};
use sf_model::{Connection, ConnectionEndpoint, NewComponent, ValueMap};
use sf_project::FileStore;
use std::path::PathBuf;
use tracing::debug;

#[derive(Parser)]
#[command(name = "sf-cli")]
#[command(about = "SchemFlow CLI - schematic diagram authoring", long_about = None)]
struct Cli {
    /// Configuration file
    #[arg(long, global = true, default_value = CONFIG_FILE)]
    config: PathBuf,
    /// Project directory (overrides the config file)
    #[arg(long, global = true)]
    store: Option<PathBuf>,
    /// Component catalog file, YAML or JSON (overrides the config file)
    #[arg(long, global = true)]
    catalog: Option<PathBuf>,
    /// Snap placed coordinates to this grid step (overrides the config file)
    #[arg(long, global = true)]
    grid: Option<f64>,
    /// Skip the autosave copy written before each edit is saved
    #[arg(long, global = true)]
    no_autosave: bool,
    /// Log debug output when RUST_LOG is unset
    #[arg(short, long, global = true)]
    verbose: bool,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create an empty project
    New {
        /// Project name
        name: String,
        /// Title stored in the project metadata
        #[arg(long)]
        title: Option<String>,
    },
    /// Check a project against the catalog
    Validate {
        /// Project name
        name: String,
    },
    /// List the components and connections of a project
    Show {
        /// Project name
        name: String,
        /// Show the properties of a single component instead
        #[arg(long)]
        component: Option<String>,
    },
    /// Place a component
    Add {
        /// Project name
        name: String,
        /// Component type from the catalog
        component_type: String,
        /// Component id (generated when omitted)
        #[arg(long)]
        id: Option<String>,
        #[arg(long, default_value_t = 0.0)]
        x: f64,
        #[arg(long, default_value_t = 0.0)]
        y: f64,
        /// Rotation in degrees
        #[arg(long)]
        rot: Option<f64>,
        #[arg(long)]
        label: Option<String>,
    },
    /// Change the placement of a component
    Move {
        /// Project name
        name: String,
        /// Component id
        id: String,
        #[arg(long)]
        x: Option<f64>,
        #[arg(long)]
        y: Option<f64>,
        #[arg(long)]
        rot: Option<f64>,
        #[arg(long)]
        flip_h: Option<bool>,
        #[arg(long)]
        flip_v: Option<bool>,
    },
    /// Delete a component and its connections
    Remove {
        /// Project name
        name: String,
        /// Component id
        id: String,
    },
    /// Connect two ports, given as <component>:<port>
    Connect {
        /// Project name
        name: String,
        #[arg(value_parser = parse_endpoint)]
        from: ConnectionEndpoint,
        #[arg(value_parser = parse_endpoint)]
        to: ConnectionEndpoint,
        /// Connection id (generated when omitted)
        #[arg(long)]
        id: Option<String>,
    },
    /// Browse the component catalog
    Catalog {
        /// Filter by type, name or category
        query: Option<String>,
    },
    /// Restore the autosaved project
    Recover {
        /// Save the recovered project under this name
        #[arg(long)]
        save_as: Option<String>,
    },
}

fn main() -> AppResult<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let mut config = AppConfig::load_or_default(&cli.config)?;
    if let Some(store) = cli.store {
        config.store_dir = store;
    }
    if let Some(catalog) = cli.catalog {
        config.catalog = Some(catalog);
    }
    if let Some(grid) = cli.grid {
        config.grid_size = Some(grid);
    }
    if cli.no_autosave {
        config.autosave = false;
    }
    debug!(?config, "effective configuration");

    match cli.command {
        Commands::New { name, title } => cmd_new(&config, &name, title),
        Commands::Validate { name } => cmd_validate(&config, &name),
        Commands::Show { name, component } => cmd_show(&config, &name, component.as_deref()),
        Commands::Add {
            name,
            component_type,
            id,
            x,
            y,
            rot,
            label,
        } => cmd_add(&config, &name, component_type, id, x, y, rot, label),
        Commands::Move {
            name,
            id,
            x,
            y,
            rot,
            flip_h,
            flip_v,
        } => {
            let patch = TransformPatch {
                x,
                y,
                rot,
                flip_h,
                flip_v,
            };
            cmd_move(&config, &name, &id, patch)
        }
        Commands::Remove { name, id } => cmd_remove(&config, &name, &id),
        Commands::Connect { name, from, to, id } => cmd_connect(&config, &name, from, to, id),
        Commands::Catalog { query } => cmd_catalog(&config, query.as_deref().unwrap_or("")),
        Commands::Recover { save_as } => cmd_recover(&config, save_as.as_deref()),
    }
}

fn init_tracing(verbose: bool) {
    let fallback = if verbose { "debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| fallback.into()),
        )
        .with_writer(std::io::stderr)
        .init();
}

fn open_session(config: &AppConfig) -> AppResult<EditorSession<FileStore>> {
    let store = FileStore::new(config.store_dir.clone())?;
    let catalog = config.load_catalog()?;
    Ok(EditorSession::new(store, catalog).with_history_limit(config.history_limit))
}

/// Open `name`, apply one command, then save.
///
/// With autosave enabled the edited snapshot goes to the autosave slot
/// first. A successful save clears that slot again, so the copy is only
/// left behind for `recover` when the save itself fails.
///
/// Returns `None` when the command left the document unchanged. A command
/// the model rejects is an error and nothing is written.
fn edit<F>(config: &AppConfig, name: &str, build: F) -> AppResult<Option<EditorSession<FileStore>>>
where
    F: FnOnce(&EditorSession<FileStore>) -> DocumentCommand,
{
    let mut session = open_session(config)?;
    session.open(name)?;
    let command = build(&session);
    session.try_execute(command)?;
    if !session.is_dirty() {
        println!("No change");
        return Ok(None);
    }
    if config.autosave {
        session.autosave()?;
    }
    session.save()?;
    Ok(Some(session))
}

fn cmd_new(config: &AppConfig, name: &str, title: Option<String>) -> AppResult<()> {
    let mut session = open_session(config)?;
    let mut metadata = ValueMap::new();
    metadata.insert("name".to_string(), json!(title.unwrap_or_else(|| name.to_string())));
    metadata.insert("createdAt".to_string(), json!(chrono::Utc::now().to_rfc3339()));
    session.new_document(metadata);
    session.save_as(name)?;
    println!("✓ Created project: {}", name);
    Ok(())
}

fn cmd_validate(config: &AppConfig, name: &str) -> AppResult<()> {
    let mut session = open_session(config)?;
    session.open(name)?;

    let unknown = sf_model::unknown_types(&session.project().diagram, session.catalog().definitions());
    for id in unknown {
        println!("  note: component {} has a type missing from the catalog", id);
    }

    let diagnostics = session.diagnostics();
    if diagnostics.is_empty() {
        println!("✓ Diagram is valid");
    } else {
        println!("{} diagnostic(s):", diagnostics.len());
        for diagnostic in diagnostics {
            println!("  {}", diagnostic);
        }
    }
    Ok(())
}

fn cmd_show(config: &AppConfig, name: &str, component: Option<&str>) -> AppResult<()> {
    let mut session = open_session(config)?;
    session.open(name)?;

    if let Some(id) = component {
        let summary = session.component_summary(id)?;
        println!("ID:          {}", summary.id);
        println!("Type:        {}", summary.component_type);
        if let Some(display_name) = &summary.display_name {
            println!("Name:        {}", display_name);
        }
        if let Some(label) = &summary.label {
            println!("Label:       {}", label);
        }
        println!("x:           {}", summary.x.round());
        println!("y:           {}", summary.y.round());
        println!("Rotation:    {}°", summary.rot);
        println!("Connections: {}", summary.connection_count);
        return Ok(());
    }

    let diagram = &session.project().diagram;
    if diagram.is_empty() {
        println!("Empty diagram");
    } else {
        println!("Components:");
        for c in &diagram.components {
            println!(
                "  {} - {} at ({}, {}){}",
                c.id,
                c.component_type,
                c.transform.x,
                c.transform.y,
                c.label
                    .as_deref()
                    .map(|l| format!(" \"{}\"", l))
                    .unwrap_or_default()
            );
        }
        println!("Connections:");
        for c in &diagram.connections {
            println!("  {} - {} -> {}", c.id, c.from.key(), c.to.key());
        }
    }
    println!("{}", session.status());
    Ok(())
}

#[allow(clippy::too_many_arguments)]
fn cmd_add(
    config: &AppConfig,
    name: &str,
    component_type: String,
    id: Option<String>,
    x: f64,
    y: f64,
    rot: Option<f64>,
    label: Option<String>,
) -> AppResult<()> {
    let placement = config.place(TransformPatch {
        x: Some(x),
        y: Some(y),
        rot,
        ..TransformPatch::default()
    })?;
    let mut added = String::new();
    let session = edit(config, name, |session| {
        if session.catalog().get(&component_type).is_none() {
            println!("  note: type {} is not in the catalog", component_type);
        }
        let id = id.unwrap_or_else(|| {
            let prefix = format!("{}-", component_type.to_ascii_lowercase());
            next_id(
                &prefix,
                session.project().diagram.components.iter().map(|c| c.id.as_str()),
            )
        });
        added = id.clone();

        let mut component = NewComponent::new(id, component_type);
        component.transform = placement;
        if let Some(label) = label {
            component = component.with_label(label);
        }
        DocumentCommand::add_component(component)
    })?;
    if session.is_some() {
        println!("✓ Added component: {}", added);
    }
    Ok(())
}

fn cmd_move(config: &AppConfig, name: &str, id: &str, patch: TransformPatch) -> AppResult<()> {
    if patch.is_empty() {
        println!("Nothing to change");
        return Ok(());
    }
    let patch = config.place(patch)?;
    let session = edit(config, name, |_| DocumentCommand::move_component(id, patch))?;
    if let Some(c) = session.as_ref().and_then(|s| s.project().diagram.component(id)) {
        println!(
            "✓ {} at ({}, {}) rot {}",
            id, c.transform.x, c.transform.y, c.transform.rot
        );
    }
    Ok(())
}

fn cmd_remove(config: &AppConfig, name: &str, id: &str) -> AppResult<()> {
    if edit(config, name, |_| DocumentCommand::delete_component(id))?.is_some() {
        println!("✓ Removed component: {}", id);
    }
    Ok(())
}

fn cmd_connect(
    config: &AppConfig,
    name: &str,
    from: ConnectionEndpoint,
    to: ConnectionEndpoint,
    id: Option<String>,
) -> AppResult<()> {
    let mut added = String::new();
    let session = edit(config, name, |session| {
        let id = id.unwrap_or_else(|| {
            next_id(
                "conn-",
                session.project().diagram.connections.iter().map(|c| c.id.as_str()),
            )
        });
        added = id.clone();
        DocumentCommand::add_connection(Connection::new(id, from, to))
    })?;
    if session.is_some() {
        println!("✓ Added connection: {}", added);
    }
    Ok(())
}

fn cmd_catalog(config: &AppConfig, query: &str) -> AppResult<()> {
    let catalog = config.load_catalog()?;
    let matches = catalog.search(query);
    if matches.is_empty() {
        println!("No matching definitions");
        return Ok(());
    }
    for definition in matches {
        let ports: Vec<_> = definition
            .ports
            .iter()
            .map(|p| format!("{} ({})", p.id, p.domain))
            .collect();
        println!(
            "  {} - {} [{}] ports: {}",
            definition.component_type,
            definition.display_name,
            definition.category_path.join(" / "),
            ports.join(", ")
        );
    }
    Ok(())
}

fn cmd_recover(config: &AppConfig, save_as: Option<&str>) -> AppResult<()> {
    let mut session = open_session(config)?;
    if !session.recover_autosave()? {
        println!("No autosave to recover");
        return Ok(());
    }
    let diagram = &session.project().diagram;
    println!(
        "Recovered project: {} components, {} connections",
        diagram.components.len(),
        diagram.connections.len()
    );
    match save_as {
        Some(name) => {
            session.save_as(name)?;
            println!("✓ Saved as: {}", name);
        }
        None => println!("Use --save-as <name> to keep it"),
    }
    Ok(())
}

fn parse_endpoint(s: &str) -> Result<ConnectionEndpoint, String> {
    match s.rsplit_once(':') {
        Some((component, port)) if !component.is_empty() && !port.is_empty() => {
            Ok(ConnectionEndpoint::new(component, port))
        }
        _ => Err(format!("expected <component>:<port>, got {:?}", s)),
    }
}
