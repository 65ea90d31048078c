use std::process::ExitCode;

use camino::Utf8PathBuf;
use clap::{Args, Parser, Subcommand};
use miette::IntoDiagnostic;
use tracing_subscriber::EnvFilter;

use geodatasets::app::{GeoDatasets, ResolvedDataset};
use geodatasets::bunch::{Bunch, DatasetFilter, Node};
use geodatasets::cache::DiskCache;
use geodatasets::catalog;
use geodatasets::config::{ConfigLoader, ResolvedConfig};
use geodatasets::error::GeoDatasetsError;
use geodatasets::fetcher::HttpDownloader;
use geodatasets::output::{FetchResult, JsonOutput, OutputMode};
use geodatasets::render;
use geodatasets::store::Store;

#[derive(Parser)]
#[command(name = "geodatasets")]
#[command(about = "Look up open geospatial datasets by name and keep verified local copies")]
#[command(version, author)]
struct Cli {
    /// Config file (defaults to ./geodatasets.json when present)
    #[arg(long, global = true)]
    config: Option<String>,

    /// Catalog definition to use instead of the bundled one
    #[arg(long, global = true)]
    catalog: Option<String>,

    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    #[command(about = "Print the download URL of a dataset")]
    Url(NameArgs),
    #[command(about = "Download a dataset if needed and print its local path")]
    Path(NameArgs),
    #[command(about = "Download one or more datasets without printing paths")]
    Fetch(FetchArgs),
    #[command(about = "List the catalog, optionally filtered")]
    List(ListArgs),
    #[command(about = "Show every attribute of a dataset")]
    Info(NameArgs),
}

#[derive(Args)]
struct NameArgs {
    name: String,
}

#[derive(Args)]
struct FetchArgs {
    #[arg(required = true)]
    names: Vec<String>,
}

#[derive(Args)]
struct ListArgs {
    #[arg(long)]
    keyword: Option<String>,

    #[arg(long)]
    name: Option<String>,

    #[arg(long)]
    geometry_type: Option<String>,

    /// Print one dataset name per line
    #[arg(long, conflicts_with = "html")]
    flat: bool,

    #[arg(long)]
    html: bool,
}

fn main() -> ExitCode {
    if let Err(report) = run() {
        eprintln!("{report:?}");
        if let Some(err) = report.downcast_ref::<GeoDatasetsError>() {
            return ExitCode::from(map_exit_code(err));
        }
        return ExitCode::from(1);
    }
    ExitCode::SUCCESS
}

fn map_exit_code(error: &GeoDatasetsError) -> u8 {
    match error {
        GeoDatasetsError::NotFound { .. } => 2,
        GeoDatasetsError::Http(_)
        | GeoDatasetsError::HttpStatus { .. }
        | GeoDatasetsError::Integrity { .. } => 3,
        _ => 1,
    }
}

fn run() -> miette::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let output_mode = if cli.json {
        OutputMode::Json
    } else {
        OutputMode::Text
    };

    let mut config = ConfigLoader::resolve(cli.config.as_deref())?;
    if let Some(path) = cli.catalog {
        config.catalog = Some(Utf8PathBuf::from(path));
    }
    let owned_catalog;
    let catalog: &Bunch = match &config.catalog {
        Some(path) => {
            owned_catalog = catalog::load_path(path)?;
            &owned_catalog
        }
        None => catalog::bundled()?,
    };

    match cli.command {
        Commands::Url(args) => run_url(catalog, args, output_mode),
        Commands::Path(args) => {
            let datasets = GeoDatasets::new(catalog, disk_cache(&config)?);
            run_path(&datasets, args, output_mode)
        }
        Commands::Fetch(args) => {
            let datasets = GeoDatasets::new(catalog, disk_cache(&config)?);
            run_fetch(&datasets, args, output_mode)
        }
        Commands::List(args) => run_list(catalog, args, output_mode),
        Commands::Info(args) => run_info(catalog, args, output_mode),
    }
}

fn disk_cache(config: &ResolvedConfig) -> miette::Result<DiskCache<HttpDownloader>> {
    let store = Store::new(config)?;
    let downloader = HttpDownloader::new(config)?;
    Ok(DiskCache::new(store, downloader))
}

fn run_url(catalog: &Bunch, args: NameArgs, output_mode: OutputMode) -> miette::Result<()> {
    let dataset = catalog.query_name(&args.name)?;
    match output_mode {
        OutputMode::Json => JsonOutput::print_resolved(&ResolvedDataset {
            query: args.name.clone(),
            name: dataset.name().to_string(),
            url: dataset.url().to_string(),
            filename: dataset.filename().to_string(),
            path: None,
        })
        .into_diagnostic(),
        OutputMode::Text => {
            println!("{}", dataset.url());
            Ok(())
        }
    }
}

fn run_path(
    datasets: &GeoDatasets<'_, DiskCache<HttpDownloader>>,
    args: NameArgs,
    output_mode: OutputMode,
) -> miette::Result<()> {
    let resolved = datasets.resolve(&args.name, true)?;
    match output_mode {
        OutputMode::Json => JsonOutput::print_resolved(&resolved).into_diagnostic(),
        OutputMode::Text => {
            if let Some(path) = &resolved.path {
                println!("{path}");
            }
            Ok(())
        }
    }
}

fn run_fetch(
    datasets: &GeoDatasets<'_, DiskCache<HttpDownloader>>,
    args: FetchArgs,
    output_mode: OutputMode,
) -> miette::Result<()> {
    datasets.fetch(&args.names)?;
    let fetched = args
        .names
        .iter()
        .map(|name| datasets.query_name(name).map(|dataset| dataset.name().to_string()))
        .collect::<Result<Vec<_>, _>>()?;
    match output_mode {
        OutputMode::Json => JsonOutput::print_fetch(&FetchResult { fetched }).into_diagnostic(),
        OutputMode::Text => {
            for name in fetched {
                eprintln!("fetched {name}");
            }
            Ok(())
        }
    }
}

fn run_list(catalog: &Bunch, args: ListArgs, output_mode: OutputMode) -> miette::Result<()> {
    let mut filter = DatasetFilter::new();
    if let Some(keyword) = args.keyword {
        filter = filter.keyword(keyword);
    }
    if let Some(name) = args.name {
        filter = filter.name(name);
    }
    if let Some(geometry_type) = args.geometry_type {
        filter = filter.geometry_type(geometry_type);
    }
    let filtered = catalog.filter(&filter);

    if matches!(output_mode, OutputMode::Json) {
        return JsonOutput::print_catalog(&filtered).into_diagnostic();
    }
    if args.html {
        println!("{}", render::to_html(&Node::Bunch(filtered)));
    } else if args.flat {
        for name in filtered.flatten().keys() {
            println!("{name}");
        }
    } else {
        print!("{}", render::to_text_tree(&filtered));
    }
    Ok(())
}

fn run_info(catalog: &Bunch, args: NameArgs, output_mode: OutputMode) -> miette::Result<()> {
    let dataset = catalog.query_name(&args.name)?;
    match output_mode {
        OutputMode::Json => JsonOutput::print_dataset(dataset).into_diagnostic(),
        OutputMode::Text => {
            println!("{}", dataset.name());
            for (key, value) in dataset.as_map() {
                if key == "name" {
                    continue;
                }
                match value.as_str() {
                    Some(text) => println!("  {key}: {text}"),
                    None => println!("  {key}: {value}"),
                }
            }
            Ok(())
        }
    }
}
