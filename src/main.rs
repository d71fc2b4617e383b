use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use usecase_viz::catalog::{load_catalog, Catalog, CatalogSource, DirCatalog, HttpCatalog};
use usecase_viz::data::ResultSet;
use usecase_viz::details::UseCaseDetails;
use usecase_viz::explorer::Explorer;
use usecase_viz::query::{HttpQueryService, QueryService, StaticQueryService};
use usecase_viz::settings::Settings;
use usecase_viz::surface::SurfaceState;
use usecase_viz::{graph, tooltip, OutputFormat};

#[derive(Parser, Debug)]
#[command(name = "usecase-viz")]
#[command(about = "Browse analytics use cases and render their query results as charts", long_about = None)]
struct Args {
    /// Settings file (defaults to ./usecase-viz.toml when present)
    #[arg(long, global = true)]
    settings: Option<PathBuf>,

    /// Directory of use case *.json configs
    #[arg(long, global = true)]
    config_dir: Option<PathBuf>,

    /// Base URL serving /list-config-files and /config/<file>
    #[arg(long, global = true)]
    catalog_url: Option<String>,

    /// Query execution endpoint
    #[arg(long, global = true)]
    endpoint: Option<String>,

    /// More log output (-v info, -vv debug)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List use cases grouped by category
    List,
    /// Show the details of one use case
    Show {
        id: String,
        /// Emit the HTML fragment instead of text
        #[arg(long)]
        html: bool,
    },
    /// Run a use case query and render its chart
    Render {
        /// Use case id; the default selection when omitted
        id: Option<String>,
        /// Rows from a JSON or CSV file instead of the query endpoint
        #[arg(long)]
        rows: Option<PathBuf>,
        #[arg(long)]
        width: Option<u32>,
        #[arg(long)]
        height: Option<u32>,
        #[arg(long, value_enum)]
        format: Option<FormatArg>,
        /// Write the image here instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum FormatArg {
    Svg,
    Png,
}

impl From<FormatArg> for OutputFormat {
    fn from(arg: FormatArg) -> Self {
        match arg {
            FormatArg::Svg => OutputFormat::Svg,
            FormatArg::Png => OutputFormat::Png,
        }
    }
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_logging(args.verbose);

    let mut settings = Settings::discover(args.settings.as_deref(), Path::new("."))?;
    if let Some(dir) = args.config_dir {
        settings.config_dir = dir;
    }
    if let Some(url) = args.catalog_url {
        settings.catalog_url = Some(url);
    }
    if let Some(endpoint) = args.endpoint {
        settings.query_endpoint = endpoint;
    }

    let catalog = open_catalog(&settings)?;

    match args.command {
        Command::List => list(&catalog),
        Command::Show { id, html } => show(&catalog, &id, html),
        Command::Render { id, rows, width, height, format, output } => {
            if let Some(width) = width {
                settings.width = width;
            }
            if let Some(height) = height {
                settings.height = height;
            }
            if let Some(format) = format {
                settings.format = format.into();
            }
            render(catalog, &settings, id, rows.as_deref(), output.as_deref())
        }
    }
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => tracing::Level::WARN,
        1 => tracing::Level::INFO,
        _ => tracing::Level::DEBUG,
    };
    let filter = tracing_subscriber::EnvFilter::builder()
        .with_default_directive(level.into())
        .from_env_lossy();
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

fn open_catalog(settings: &Settings) -> Result<Catalog> {
    let source: Box<dyn CatalogSource> = match &settings.catalog_url {
        Some(url) => Box::new(HttpCatalog::new(url)?),
        None => Box::new(DirCatalog::new(&settings.config_dir)),
    };
    load_catalog(source.as_ref())
}

fn list(catalog: &Catalog) -> Result<()> {
    let default_id = catalog.default_use_case().map(|uc| uc.id.as_str());
    let stdout = io::stdout();
    let mut out = stdout.lock();
    for (category, use_cases) in catalog.categories() {
        let heading = if category.is_empty() { "(uncategorized)" } else { category };
        writeln!(out, "{}", heading)?;
        for uc in use_cases {
            let marker = if Some(uc.id.as_str()) == default_id { "*" } else { " " };
            writeln!(out, " {} {}  [{}]", marker, uc.descriptor.name, uc.id)?;
        }
    }
    out.flush().context("Failed to flush stdout")?;
    Ok(())
}

fn show(catalog: &Catalog, id: &str, html: bool) -> Result<()> {
    let use_case = catalog
        .get(id)
        .with_context(|| format!("Use case not found: {}", id))?;
    let details = UseCaseDetails::new(&use_case.id, &use_case.descriptor);
    let text = if html { details.to_html() } else { details.to_text() };
    println!("{}", text);
    Ok(())
}

fn read_rows(path: &Path) -> Result<ResultSet> {
    let is_csv = path
        .extension()
        .map(|ext| ext.eq_ignore_ascii_case("csv"))
        .unwrap_or(false);
    if is_csv {
        let file = fs::File::open(path).with_context(|| format!("Failed to open {}", path.display()))?;
        ResultSet::from_csv(file).with_context(|| format!("Failed to read rows from {}", path.display()))
    } else {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        ResultSet::from_json_str(&content)
            .with_context(|| format!("Failed to read rows from {}", path.display()))
    }
}

fn render(
    catalog: Catalog,
    settings: &Settings,
    id: Option<String>,
    rows: Option<&Path>,
    output: Option<&Path>,
) -> Result<()> {
    let id = match id {
        Some(id) => id,
        None => catalog
            .default_use_case()
            .map(|uc| uc.id.clone())
            .context("No use cases found in the catalog")?,
    };

    let query: Box<dyn QueryService> = match rows {
        Some(path) => Box::new(StaticQueryService::always(read_rows(path)?)),
        None => Box::new(HttpQueryService::new(&settings.query_endpoint)?),
    };

    let options = settings.render_options();
    let mut explorer = Explorer::new(catalog, query, options, tooltip::global());
    explorer.load(&id);

    let scene = match explorer.surface().state() {
        SurfaceState::Chart(scene) => scene,
        SurfaceState::Placeholder(text) | SurfaceState::Error(text) => {
            eprintln!("{}", text);
            std::process::exit(1);
        }
        SurfaceState::Blank | SurfaceState::Loading { .. } => {
            anyhow::bail!("Nothing was rendered for {}", id)
        }
    };

    let bytes = graph::render_scene(scene, options.format).context("Failed to render chart")?;

    match output {
        Some(path) => {
            fs::write(path, &bytes).with_context(|| format!("Failed to write {}", path.display()))?;
        }
        None => {
            let stdout = io::stdout();
            let mut handle = stdout.lock();
            handle
                .write_all(&bytes)
                .context("Failed to write image to stdout")?;
            handle.flush().context("Failed to flush stdout")?;
        }
    }

    Ok(())
}
