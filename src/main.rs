// file: src/main.rs
// description: commandline application entry point with command handling
// reference: application bootstrap and orchestration

use anyhow::{Context, Result, bail};
use clap::{ArgAction, Parser, Subcommand};
use std::io::IsTerminal;
use std::path::{Path, PathBuf};
use tidydata::utils::logging::{
    format_error, format_info, format_score, format_success, format_warning, init_logger,
};
use tidydata::{
    Config, HealthReport, ImageUpload, OperationTimer, RelaxSpinner, SearchClient, SearchOutcome,
    ServiceClients, UnifiedContent, Validator,
};
use tracing::{debug, info};

#[derive(Parser)]
#[command(name = "tidydata")]
#[command(version)]
#[command(about = "Semantic search over your notes and images", long_about = None)]
struct Cli {
    /// Configuration file; `config/default.toml` is used when present
    #[arg(short, long, value_name = "FILE", env = "TIDYDATA_CONFIG")]
    config: Option<PathBuf>,

    /// Embedding service address, e.g. `localhost:8000`
    #[arg(short, long, value_name = "URL", env = "TIDYDATA_ENDPOINT")]
    endpoint: Option<String>,

    #[arg(long, default_value_t = true, action = ArgAction::Set)]
    color: bool,

    #[arg(short, long, action = ArgAction::SetTrue)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Add text content to your knowledge base
    Add {
        /// Text to add
        #[arg(required_unless_present = "file", conflicts_with = "file")]
        text: Option<String>,

        /// Read the text from a file instead
        #[arg(short, long, value_name = "PATH")]
        file: Option<PathBuf>,
    },

    /// Search text and images by meaning
    Search {
        query: String,

        /// Minimum similarity score (0.0 to 1.0); lowered automatically when nothing matches
        #[arg(short, long)]
        threshold: Option<f64>,

        #[arg(short, long)]
        limit: Option<usize>,

        /// Print the outcome as JSON
        #[arg(long)]
        json: bool,
    },

    /// Image operations
    Image {
        #[command(subcommand)]
        action: ImageCommands,
    },

    /// Check that the embedding service is reachable
    Health,
}

#[derive(Subcommand)]
enum ImageCommands {
    /// Add one or more images; several are uploaded concurrently
    Add {
        #[arg(required = true, value_name = "IMAGE")]
        paths: Vec<PathBuf>,
    },

    /// Find images similar to the given one
    Similar {
        path: PathBuf,

        #[arg(short, long)]
        limit: Option<usize>,

        #[arg(short, long)]
        threshold: Option<f64>,

        /// Write the matching images into this directory
        #[arg(long, value_name = "DIR")]
        save: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    init_logger(cli.color, cli.verbose);

    if let Err(err) = run(cli).await {
        eprintln!("{}", format_error(&format!("{:#}", err)));
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<()> {
    let mut config = load_config(cli.config.as_deref())?;
    if let Some(endpoint) = cli.endpoint {
        config.service.endpoint = endpoint;
    }

    let clients = ServiceClients::from_config(&config)
        .context("Cannot use the configured service endpoint")?;
    debug!("Using embedding service at {}", clients.endpoint);

    match cli.command {
        Commands::Add { text, file } => cmd_add(&clients, text, file.as_deref()).await,
        Commands::Search {
            query,
            threshold,
            limit,
            json,
        } => cmd_search(&clients, &query, threshold, limit, json).await,
        Commands::Image { action } => match action {
            ImageCommands::Add { paths } => cmd_image_add(&clients, &paths).await,
            ImageCommands::Similar {
                path,
                limit,
                threshold,
                save,
            } => {
                let limit = limit.unwrap_or(config.images.similar_limit);
                let threshold = threshold.unwrap_or(config.images.similar_threshold);
                cmd_image_similar(&clients, &path, limit, threshold, save.as_deref()).await
            }
        },
        Commands::Health => cmd_health(&clients).await,
    }
}

fn load_config(path: Option<&Path>) -> Result<Config> {
    if let Some(path) = path {
        info!("Loading configuration from: {}", path.display());
    }
    Config::load(path).context("Failed to load configuration")
}

async fn cmd_add(
    clients: &ServiceClients,
    text: Option<String>,
    file: Option<&Path>,
) -> Result<()> {
    let text = match (text, file) {
        (_, Some(path)) => std::fs::read_to_string(path)
            .with_context(|| format!("Error reading file {}", path.display()))?,
        (Some(text), None) => text,
        (None, None) => bail!("Either provide text as an argument or use --file"),
    };
    Validator::validate_content_not_empty(&text)?;

    let document_id = clients
        .ingest
        .add_document(&text)
        .await
        .context("Error adding document")?;

    println!(
        "{}",
        format_success(&format!("Added document with ID: {}", document_id))
    );
    Ok(())
}

async fn cmd_search(
    clients: &ServiceClients,
    query: &str,
    threshold: Option<f64>,
    limit: Option<usize>,
    json: bool,
) -> Result<()> {
    if let Some(threshold) = threshold {
        Validator::validate_threshold(threshold)?;
    }

    match limit {
        Some(limit) => {
            Validator::validate_limit(limit)?;
            let search = clients.search.clone().with_limit(limit);
            run_search(&search, query, threshold, json).await
        }
        None => run_search(&clients.search, query, threshold, json).await,
    }
}

async fn run_search(
    search: &SearchClient,
    query: &str,
    threshold: Option<f64>,
    json: bool,
) -> Result<()> {
    let spinner = if !json && std::io::stderr().is_terminal() {
        RelaxSpinner::new(query)
    } else {
        RelaxSpinner::hidden()
    };

    let outcome = search
        .search_with(query, threshold, &spinner)
        .await
        .context("Error searching")?;
    spinner.finish();

    if json {
        println!("{}", serde_json::to_string_pretty(&outcome_json(&outcome))?);
        return Ok(());
    }

    if outcome.was_relaxed() {
        let message = if outcome.results.is_empty() {
            format!(
                "No results even after lowering the threshold from {:.2} to {:.2}",
                outcome.requested_threshold, outcome.threshold
            )
        } else {
            format!(
                "No results at {:.2}; showing results at threshold {:.2}",
                outcome.requested_threshold, outcome.threshold
            )
        };
        println!("{}", format_warning(&message));
    }

    if outcome.results.is_empty() {
        println!("\nNo results found for query: \"{}\"\n", query);
        println!("Try:");
        println!("  - Using different search terms");
        println!("  - Checking that content has been added");
        return Ok(());
    }

    println!(
        "\nSearch results for: {} (threshold: {:.2})\n",
        query, outcome.threshold
    );

    for result in &outcome.results {
        println!("Score: {}", format_score(result.score));
        match &result.content {
            UnifiedContent::Text { text } => {
                println!("Type: Text");
                println!("Content: {}", text);
            }
            UnifiedContent::Image { metadata, .. } => {
                println!("Type: Image");
                println!("File: {}", metadata.filename);
                if let Some(description) = description_of(&metadata.description) {
                    println!("Description: {}", description);
                }
            }
        }
        println!("---");
    }

    if let Some(time_taken) = outcome.time_taken {
        println!("{}", format_info(&format!("Service time: {:.3}s", time_taken)));
    }

    Ok(())
}

fn description_of(description: &Option<String>) -> Option<&str> {
    description.as_deref().filter(|d| !d.is_empty())
}

fn outcome_json(outcome: &SearchOutcome) -> serde_json::Value {
    serde_json::json!({
        "query": outcome.query,
        "threshold": outcome.threshold,
        "requested_threshold": outcome.requested_threshold,
        "attempts": outcome.attempts,
        "time_taken": outcome.time_taken,
        "results": outcome.results,
    })
}

fn read_image(path: &Path) -> Result<(String, Vec<u8>)> {
    Validator::validate_image_path(path)?;
    let data = std::fs::read(path)
        .with_context(|| format!("Error reading image file {}", path.display()))?;
    let filename = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "image".to_string());
    Ok((filename, data))
}

async fn cmd_image_add(clients: &ServiceClients, paths: &[PathBuf]) -> Result<()> {
    let mut uploads = Vec::with_capacity(paths.len());
    for path in paths {
        let (filename, data) = read_image(path)?;
        uploads.push(ImageUpload::new(filename, data));
    }

    if uploads.len() == 1 {
        let upload = uploads.remove(0);
        let response = clients
            .ingest
            .add_image(upload.data, &upload.filename)
            .await
            .context("Error adding image")?;
        println!(
            "{}",
            format_success(&format!("Added image with ID: {}", response.image_id))
        );
        return Ok(());
    }

    let timer = OperationTimer::new("image batch upload");
    let count = uploads.len();
    let responses = clients.ingest.add_images(uploads).await.map_err(|err| {
        anyhow::Error::new(err).context(
            "Batch upload failed; other images in this batch may or may not have been stored",
        )
    })?;
    timer.finish_with_count(count);

    for (path, response) in paths.iter().zip(&responses) {
        println!(
            "{}",
            format_success(&format!(
                "Added {} with ID: {}",
                path.display(),
                response.image_id
            ))
        );
    }
    Ok(())
}

async fn cmd_image_similar(
    clients: &ServiceClients,
    path: &Path,
    limit: usize,
    threshold: f64,
    save: Option<&Path>,
) -> Result<()> {
    Validator::validate_limit(limit)?;
    Validator::validate_threshold(threshold)?;
    if let Some(dir) = save {
        Validator::validate_output_directory(dir)?;
    }

    let (filename, data) = read_image(path)?;
    let results = clients
        .ingest
        .find_similar_images(data, limit, threshold)
        .await
        .context("Error finding similar images")?;

    if results.is_empty() {
        println!("No similar images found for: {}", filename);
        return Ok(());
    }

    println!("Similar images to: {}\n", filename);
    for result in &results {
        println!("Score: {}", format_score(result.score));
        println!("File: {}", result.metadata.filename);
        if let Some(description) = description_of(&result.metadata.description) {
            println!("Description: {}", description);
        }
        println!("---");
    }

    if let Some(dir) = save {
        std::fs::create_dir_all(dir)
            .with_context(|| format!("Cannot create directory {}", dir.display()))?;
        for (rank, result) in results.iter().enumerate() {
            let bytes = result
                .decode_image_data()
                .with_context(|| format!("Image {} has invalid image data", result.id))?;
            let target = dir.join(format!(
                "{:02}_{}",
                rank + 1,
                Validator::sanitize_filename(&result.metadata.filename)
            ));
            std::fs::write(&target, bytes)
                .with_context(|| format!("Cannot write {}", target.display()))?;
        }
        println!(
            "{}",
            format_success(&format!("Saved {} images to {}", results.len(), dir.display()))
        );
    }

    Ok(())
}

async fn cmd_health(clients: &ServiceClients) -> Result<()> {
    let check = clients.health.check().await;
    let report = HealthReport::new(check, env!("CARGO_PKG_VERSION"));
    print!("{}", report.format());

    if !report.is_healthy() {
        bail!("Embedding service at {} is not healthy", clients.endpoint);
    }
    Ok(())
}
