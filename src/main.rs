use std::net::SocketAddr;
use std::path::PathBuf;
use std::str::FromStr;

use anyhow::{anyhow, Result};
use chrono::Utc;
use clap::{Parser, Subcommand, ValueEnum};
use suppstack::ai::{
    analyze_content, provider_from_config, resolve_mentions, schedule_commentary, ContentType,
    Language,
};
use suppstack::catalog::{Catalog, Nutrient, Product};
use suppstack::config::{Config, ConfigOverrides};
use suppstack::detector::{detect_conflicts, detect_synergies, Conflict, Synergy};
use suppstack::output::csv::{conflicts_to_csv, schedule_to_csv};
use suppstack::output::render_json;
use suppstack::output::table::{
    render_analysis_table, render_conflicts_table, render_history_table, render_nutrients_table,
    render_products_table, render_schedule_table, render_stacks_table, render_synergies_table,
};
use suppstack::rules::RuleTable;
use suppstack::scheduler::{generate_schedule, validate_schedule, ScheduleSlot};
use suppstack::server::run_server;
use suppstack::store::{stack_hash, ScheduleRecord, StackStore};
use tracing::{info, warn};

#[derive(Debug, Clone, Copy, ValueEnum)]
enum OutputFormat {
    Table,
    Json,
    Csv,
}

#[derive(Debug, Parser)]
#[command(
    name = "suppstack",
    about = "Supplement stack conflict intelligence and daily dose scheduling"
)]
struct Cli {
    /// Comma-separated catalog product ids
    #[arg(short, long)]
    products: Option<String>,
    /// Saved stack name to load
    #[arg(long)]
    stack: Option<String>,
    #[arg(short, long)]
    config: Option<PathBuf>,
    #[arg(short, long, value_enum, default_value_t = OutputFormat::Table)]
    output: OutputFormat,
    #[command(flatten)]
    times: TimeArgs,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, clap::Args, Clone, Default)]
struct TimeArgs {
    #[arg(long)]
    breakfast: Option<String>,
    #[arg(long)]
    lunch: Option<String>,
    #[arg(long)]
    dinner: Option<String>,
    #[arg(long)]
    sleep: Option<String>,
    #[arg(long)]
    workout: Option<String>,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Detect nutrient conflicts in the selected stack
    Conflicts,
    /// Detect beneficial pairings in the selected stack
    Synergies,
    /// Generate the daily dosing schedule
    Schedule {
        #[arg(long)]
        commentary: bool,
        #[arg(long)]
        language: Option<String>,
        #[arg(long)]
        no_cache: bool,
    },
    /// Extract supplement mentions from influencer content
    Analyze {
        #[arg(long)]
        text: Option<String>,
        #[arg(long)]
        file: Option<PathBuf>,
        #[arg(long = "content-type")]
        content_type: Option<String>,
        #[arg(long)]
        language: Option<String>,
    },
    /// List built-in products (or nutrients with --nutrients)
    Catalog {
        #[arg(long)]
        nutrients: bool,
    },
    /// Persist the selected stack under a name
    Save {
        #[arg(long)]
        name: String,
    },
    /// List saved stacks
    Stacks,
    /// Show past schedule runs
    History {
        #[arg(long)]
        limit: Option<usize>,
    },
    Serve {
        #[arg(long, default_value = "127.0.0.1")]
        host: String,
        #[arg(long, default_value_t = 3001)]
        port: u16,
    },
    Config {
        #[arg(long)]
        init: bool,
        #[arg(long)]
        show: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt::init();
    let cli = Cli::parse();

    let config_path = cli.config.clone().unwrap_or_else(Config::default_path);
    let mut config = Config::load(Some(&config_path))?;
    config.apply_overrides(ConfigOverrides {
        products: cli
            .products
            .as_deref()
            .map(parse_product_list)
            .transpose()?,
        breakfast: cli.times.breakfast.clone(),
        lunch: cli.times.lunch.clone(),
        dinner: cli.times.dinner.clone(),
        sleep: cli.times.sleep.clone(),
        workout: cli.times.workout.clone(),
    });

    if matches!(cli.command, Commands::Config { .. }) {
        return handle_config_command(&cli.command, &config, &config_path);
    }
    if let Commands::Serve { host, port } = &cli.command {
        let bind = format!("{host}:{port}");
        let addr: SocketAddr = bind
            .parse()
            .map_err(|e| anyhow!("invalid bind address {bind}: {e}"))?;
        return run_server(config, addr).await;
    }

    let catalog = Catalog::builtin();
    let rules = RuleTable::builtin();
    let store = StackStore::open(&config.resolved_db_path())?;

    match &cli.command {
        Commands::Conflicts => {
            let stack = resolve_stack(&config, catalog, &store, cli.stack.as_deref())?;
            let conflicts = detect_conflicts(&stack, catalog, rules)?;
            refresh_cache(&store, &stack, &conflicts);
            print_conflicts(&conflicts, cli.output)?;
        }
        Commands::Synergies => {
            let stack = resolve_stack(&config, catalog, &store, cli.stack.as_deref())?;
            let synergies = detect_synergies(&stack, catalog, rules)?;
            print_synergies(&synergies, cli.output)?;
        }
        Commands::Schedule {
            commentary,
            language,
            no_cache,
        } => {
            let stack = resolve_stack(&config, catalog, &store, cli.stack.as_deref())?;
            let conflicts = load_or_detect_conflicts(&store, &stack, catalog, rules, *no_cache)?;
            let synergies = detect_synergies(&stack, catalog, rules)?;
            let constraints = config.constraints();
            let schedule = generate_schedule(&stack, &conflicts, &constraints)?;
            let violations = validate_schedule(&schedule, &conflicts);

            print_schedule(&schedule, &conflicts, cli.output)?;
            for violation in &violations {
                warn!("unresolved: {violation}");
            }

            if *commentary {
                let language = resolve_language(language.as_deref(), &config)?;
                let provider = provider_from_config(&config.ai);
                let text = schedule_commentary(
                    provider.as_ref(),
                    &schedule,
                    &conflicts,
                    &synergies,
                    language,
                )
                .await;
                println!("\n{text}");
            }

            let record = ScheduleRecord {
                stack_name: cli
                    .stack
                    .clone()
                    .unwrap_or_else(|| "(unsaved)".to_string()),
                product_count: stack.len(),
                conflict_count: conflicts.len(),
                slots: schedule.clone(),
                generated_at: Utc::now(),
            };
            store.insert_schedule_record(&record)?;
        }
        Commands::Analyze {
            text,
            file,
            content_type,
            language,
        } => {
            let content = match (text, file) {
                (Some(text), _) => text.clone(),
                (None, Some(path)) => std::fs::read_to_string(path)?,
                (None, None) => return Err(anyhow!("pass --text or --file to analyze")),
            };
            let content_type = match content_type.as_deref() {
                Some(raw) => ContentType::from_str(raw)?,
                None => ContentType::default(),
            };
            let language = resolve_language(language.as_deref(), &config)?;

            let provider = provider_from_config(&config.ai);
            let analysis =
                analyze_content(provider.as_ref(), &content, content_type, language).await?;
            let resolved = resolve_mentions(catalog, &analysis);
            match cli.output {
                OutputFormat::Table => {
                    println!("{}", render_analysis_table(&analysis, &resolved))
                }
                OutputFormat::Json | OutputFormat::Csv => {
                    println!("{}", render_json(&resolved)?)
                }
            }
        }
        Commands::Catalog { nutrients } => {
            if *nutrients {
                let all: Vec<&Nutrient> = catalog.nutrients().collect();
                match cli.output {
                    OutputFormat::Table => println!("{}", render_nutrients_table(&all)),
                    OutputFormat::Json | OutputFormat::Csv => println!("{}", render_json(&all)?),
                }
            } else {
                let all: Vec<&Product> = catalog.products().collect();
                match cli.output {
                    OutputFormat::Table => println!("{}", render_products_table(&all)),
                    OutputFormat::Json | OutputFormat::Csv => println!("{}", render_json(&all)?),
                }
            }
        }
        Commands::Save { name } => {
            let stack = resolve_stack(&config, catalog, &store, cli.stack.as_deref())?;
            let ids: Vec<String> = stack.iter().map(|p| p.id.clone()).collect();
            store.save_stack(name, &ids)?;
            info!("saved stack {name} with {} products", ids.len());
        }
        Commands::Stacks => {
            let stacks = store.list_stacks()?;
            match cli.output {
                OutputFormat::Table => println!("{}", render_stacks_table(&stacks)),
                OutputFormat::Json | OutputFormat::Csv => println!("{}", render_json(&stacks)?),
            }
        }
        Commands::History { limit } => {
            let records =
                store.load_schedule_history(cli.stack.as_deref(), limit.unwrap_or(20).max(1))?;
            match cli.output {
                OutputFormat::Table => println!("{}", render_history_table(&records)),
                OutputFormat::Json | OutputFormat::Csv => println!("{}", render_json(&records)?),
            }
        }
        Commands::Config { .. } => {}
        Commands::Serve { .. } => unreachable!("serve command handled before dispatch"),
    }

    Ok(())
}

fn handle_config_command(command: &Commands, config: &Config, config_path: &PathBuf) -> Result<()> {
    let Commands::Config { init, show } = command else {
        return Ok(());
    };
    if *init {
        Config::write_template(config_path)?;
        println!("Wrote config template to {}", config_path.display());
    }
    if *show || !*init {
        println!("{}", render_json(config)?);
    }
    Ok(())
}

fn parse_product_list(raw: &str) -> Result<Vec<String>> {
    let out: Vec<String> = raw
        .split(',')
        .map(str::trim)
        .filter(|piece| !piece.is_empty())
        .map(str::to_string)
        .collect();
    if out.is_empty() {
        return Err(anyhow!("product filter is empty"));
    }
    Ok(out)
}

/// Product selection for the current invocation: `--stack NAME` wins, then
/// `--products` / `[stack] products` already merged into the config.
fn resolve_stack(
    config: &Config,
    catalog: &Catalog,
    store: &StackStore,
    stack_name: Option<&str>,
) -> Result<Vec<Product>> {
    let ids = if let Some(name) = stack_name {
        store
            .load_stack(name)?
            .ok_or_else(|| anyhow!("unknown stack: {name}"))?
            .product_ids
    } else {
        config.stack.products.clone()
    };
    if ids.is_empty() {
        return Err(anyhow!(
            "no products selected; pass --products, --stack, or set [stack] products in config"
        ));
    }
    Ok(catalog.resolve_products(&ids)?)
}

/// Detection is deterministic for a fixed rule table, so cached results for
/// the same product set stay valid until the rules change.
fn load_or_detect_conflicts(
    store: &StackStore,
    stack: &[Product],
    catalog: &Catalog,
    rules: &RuleTable,
    no_cache: bool,
) -> Result<Vec<Conflict>> {
    let ids: Vec<String> = stack.iter().map(|p| p.id.clone()).collect();
    let hash = stack_hash(&ids);
    if !no_cache {
        match store.cached_conflicts(&hash) {
            Ok(Some(cached)) => {
                info!("using cached conflict scan for this product set");
                return Ok(cached);
            }
            Ok(None) => {}
            Err(error) => warn!("conflict cache lookup failed: {error}"),
        }
    }
    let conflicts = detect_conflicts(stack, catalog, rules)?;
    refresh_cache(store, stack, &conflicts);
    Ok(conflicts)
}

fn refresh_cache(store: &StackStore, stack: &[Product], conflicts: &[Conflict]) {
    let ids: Vec<String> = stack.iter().map(|p| p.id.clone()).collect();
    if let Err(error) = store.cache_conflicts(&stack_hash(&ids), conflicts) {
        warn!("failed caching conflict scan: {error}");
    }
}

fn resolve_language(cli_language: Option<&str>, config: &Config) -> Result<Language> {
    let raw = cli_language.unwrap_or(config.ai.language.as_str());
    Ok(Language::from_str(raw)?)
}

fn print_conflicts(conflicts: &[Conflict], format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Table => println!("{}", render_conflicts_table(conflicts)),
        OutputFormat::Json => println!("{}", render_json(conflicts)?),
        OutputFormat::Csv => println!("{}", conflicts_to_csv(conflicts)?),
    }
    Ok(())
}

fn print_synergies(synergies: &[Synergy], format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Table => println!("{}", render_synergies_table(synergies)),
        OutputFormat::Json => println!("{}", render_json(synergies)?),
        OutputFormat::Csv => {
            warn!("CSV output for synergies not implemented, using JSON");
            println!("{}", render_json(synergies)?);
        }
    }
    Ok(())
}

fn print_schedule(
    schedule: &[ScheduleSlot],
    conflicts: &[Conflict],
    format: OutputFormat,
) -> Result<()> {
    match format {
        OutputFormat::Table => {
            println!("{}", render_schedule_table(schedule));
            if !conflicts.is_empty() {
                println!("{}", render_conflicts_table(conflicts));
            }
        }
        OutputFormat::Json => println!("{}", render_json(schedule)?),
        OutputFormat::Csv => println!("{}", schedule_to_csv(schedule)?),
    }
    Ok(())
}
