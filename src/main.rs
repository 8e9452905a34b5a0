use anyhow::Context;
use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand};
use serde::Serialize;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};
use workshop_archive_search::{
    archive::ArchiveSource,
    config::{Config, ObservabilityConfig},
    models::SessionType,
    saved::{find_template, SavedSearch, QUICK_SEARCH_TEMPLATES},
    search::{
        highlight_text, LiveSearch, MatchField, ScoredResult, SearchFilters, SearchQuery,
        SearchService,
    },
    taxonomy::UnifiedTaxonomy,
    AppError,
};

#[derive(Parser)]
#[command(name = "archive-search", version)]
#[command(about = "Search the workshop teaching archive", long_about = None)]
struct Cli {
    /// Extra configuration file layered over the defaults
    #[arg(short, long, env = "ARCHIVE_SEARCH_CONFIG")]
    config: Option<PathBuf>,

    /// Print JSON instead of text
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a search
    Search {
        #[arg(value_name = "QUERY")]
        query: String,

        #[command(flatten)]
        filters: FilterArgs,

        /// Maximum results
        #[arg(short, long)]
        limit: Option<usize>,

        /// Exact title token matching only
        #[arg(long)]
        no_fuzzy: bool,
    },

    /// Suggest presenters, techniques and topics for a partial query
    Suggest {
        #[arg(value_name = "PARTIAL")]
        partial: String,

        #[arg(short, long)]
        limit: Option<usize>,
    },

    /// List the values available for each facet
    Filters,

    /// Index statistics
    Stats,

    /// Read queries from stdin, one per line, and search as you type
    Live,

    /// Expertise taxonomy lookups
    Taxonomy {
        #[command(subcommand)]
        command: TaxonomyCommands,
    },

    /// Saved searches
    Saved {
        #[command(subcommand)]
        command: SavedCommands,
    },
}

#[derive(Subcommand)]
enum TaxonomyCommands {
    /// Map free-text expertise terms to node IDs
    Map {
        #[arg(value_name = "TERM", required = true)]
        terms: Vec<String>,
    },

    /// Find nodes by label, alias or description
    Find {
        #[arg(value_name = "TEXT")]
        text: String,
    },

    /// Direct children of a node
    Children {
        #[arg(value_name = "NODE_ID")]
        id: String,
    },

    /// Path from the root category down to a node
    Path {
        #[arg(value_name = "NODE_ID")]
        id: String,
    },

    /// Workshop taxonomy merged with the configured faculty topics
    Unified {
        /// Only nodes mentioning this text
        #[arg(short, long)]
        search: Option<String>,
    },
}

#[derive(Subcommand)]
enum SavedCommands {
    /// All saved searches, most recently used first
    List {
        #[arg(long, conflicts_with = "favorites")]
        recent: bool,

        #[arg(long)]
        favorites: bool,
    },

    /// Save a search, overwriting one with the same name
    Save {
        #[arg(value_name = "NAME")]
        name: String,

        #[arg(short, long, default_value = "")]
        query: String,

        #[command(flatten)]
        filters: FilterArgs,

        /// Pick a free name instead of overwriting
        #[arg(long)]
        unique: bool,
    },

    /// Run a saved search
    Load {
        #[arg(value_name = "SEARCH_ID")]
        id: String,
    },

    Delete {
        #[arg(value_name = "SEARCH_ID")]
        id: String,
    },

    Rename {
        #[arg(value_name = "SEARCH_ID")]
        id: String,

        #[arg(value_name = "NAME")]
        name: String,
    },

    /// Summary statistics
    Stats,

    /// Write all saved searches as JSON
    Export {
        /// Output file; stdout when absent
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Replace saved searches with the valid records of a JSON export
    Import {
        #[arg(value_name = "FILE")]
        file: PathBuf,
    },

    /// Remove every saved search
    Clear,

    /// List quick-search templates
    Templates,

    /// Save a quick-search template
    Apply {
        #[arg(value_name = "TEMPLATE")]
        name: String,
    },
}

#[derive(Args, Default)]
struct FilterArgs {
    #[arg(short = 'w', long = "workshop")]
    workshops: Vec<String>,

    #[arg(short = 'p', long = "presenter")]
    presenters: Vec<String>,

    #[arg(short = 't', long = "type")]
    session_types: Vec<SessionType>,

    #[arg(long = "topic")]
    topics: Vec<String>,

    #[arg(long = "technique")]
    techniques: Vec<String>,

    #[arg(short = 'y', long = "year")]
    years: Vec<i32>,

    /// Earliest session date, YYYY-MM-DD
    #[arg(long, requires = "to")]
    from: Option<NaiveDate>,

    /// Latest session date, YYYY-MM-DD
    #[arg(long, requires = "from")]
    to: Option<NaiveDate>,
}

impl FilterArgs {
    fn into_filters(self) -> SearchFilters {
        let mut filters = SearchFilters::new();
        if !self.workshops.is_empty() {
            filters = filters.with_workshops(self.workshops);
        }
        if !self.presenters.is_empty() {
            filters = filters.with_presenters(self.presenters);
        }
        if !self.session_types.is_empty() {
            filters = filters.with_session_types(self.session_types);
        }
        if !self.topics.is_empty() {
            filters = filters.with_topics(self.topics);
        }
        if !self.techniques.is_empty() {
            filters = filters.with_techniques(self.techniques);
        }
        if !self.years.is_empty() {
            filters = filters.with_years(self.years);
        }
        if let (Some(from), Some(to)) = (self.from, self.to) {
            filters = filters.with_date_range(from, to);
        }
        filters
    }
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    if let Err(err) = run(cli).await {
        eprintln!("Error: {:#}", err);
        let code = err.downcast_ref::<AppError>().map_or(1, AppError::exit_code);
        std::process::exit(code);
    }
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let config = Config::load_from(cli.config.as_deref())?;
    init_tracing(&config.observability);

    let json = cli.json;
    match cli.command {
        Commands::Search {
            query,
            filters,
            limit,
            no_fuzzy,
        } => {
            let service = open_service(&config)?;
            let mut options = config.search.clone();
            if let Some(limit) = limit {
                options.max_results = limit;
            }
            if no_fuzzy {
                options.fuzzy_match = false;
            }

            let query = SearchQuery::new(query).with_filters(filters.into_filters());
            let results = service.search_with_options(&query, &options);
            print_results(&results, json)?;
        }

        Commands::Suggest { partial, limit } => {
            let service = open_service(&config)?;
            let limit = limit.unwrap_or(config.live.suggestion_limit);
            let suggestions = service.suggest(&partial, limit);
            if json {
                print_json(&suggestions)?;
            } else {
                for s in &suggestions {
                    println!("{:<40} {:<10} {}", s.text, s.kind.to_string(), s.count);
                }
            }
        }

        Commands::Filters => {
            let options = open_service(&config)?.filter_options();
            if json {
                print_json(&options)?;
            } else {
                println!("workshops:  {}", options.workshops.join(", "));
                println!("types:      {}", options.session_types.join(", "));
                println!("topics:     {}", options.topics.join(", "));
                println!("techniques: {}", options.techniques.join(", "));
                let years: Vec<String> = options.years.iter().map(i32::to_string).collect();
                println!("years:      {}", years.join(", "));
                println!("presenters: {}", options.presenters.len());
            }
        }

        Commands::Stats => {
            let stats = open_service(&config)?.stats();
            if json {
                print_json(&stats)?;
            } else {
                println!("documents: {} ({} skipped)", stats.total_documents, stats.skipped_documents);
                println!("terms:     {}", stats.indexed_terms);
                println!("presenters {} / topics {} / techniques {}", stats.presenters, stats.topics, stats.techniques);
                println!("built at:  {}", stats.built_at);
            }
        }

        Commands::Live => run_live(&config, json).await?,

        Commands::Taxonomy { command } => run_taxonomy(&config, command, json)?,

        Commands::Saved { command } => run_saved(&config, command, json)?,
    }

    Ok(())
}

fn init_tracing(observability: &ObservabilityConfig) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        format!(
            "workshop_archive_search={level},archive_search={level}",
            level = observability.log_level
        )
        .into()
    });

    let registry = tracing_subscriber::registry().with(filter);
    if observability.json_logs {
        registry
            .with(tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        registry
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .init();
    }
}

fn open_service(config: &Config) -> anyhow::Result<Arc<SearchService>> {
    let source = ArchiveSource::new(&config.archive.teaching_path, &config.archive.workshops_path);
    let service = SearchService::from_source(&source, config.search.clone(), config.vocabulary.clone())
        .context("Failed to build the search index")?;
    Ok(Arc::new(service))
}

fn print_json<T: Serialize + ?Sized>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn print_results(results: &[ScoredResult], json: bool) -> anyhow::Result<()> {
    if json {
        return print_json(results);
    }

    if results.is_empty() {
        println!("No results");
        return Ok(());
    }

    for result in results {
        let doc = &result.document;
        let spans: Vec<_> = result
            .matches
            .iter()
            .filter(|m| m.field == MatchField::Title)
            .flat_map(|m| m.highlights.iter().copied())
            .collect();

        println!(
            "{:>6.2} {:<6} {} {} [{}]",
            result.score,
            result.relevance.to_string(),
            doc.workshop_id,
            doc.year,
            doc.id
        );
        println!("       {}", highlight_text(&doc.topic, &spans, "**", "**"));
    }
    Ok(())
}

async fn run_live(config: &Config, json: bool) -> anyhow::Result<()> {
    let service = open_service(config)?;
    let live = LiveSearch::new(service, config.live.debounce());
    let mut updates = live.subscribe();

    let printer = tokio::spawn(async move {
        while updates.changed().await.is_ok() {
            let state = updates.borrow_and_update().clone();
            println!("-- {:?} ({} results)", state.query, state.results.len());
            if let Err(e) = print_results(&state.results, json) {
                tracing::warn!(error = %e, "Failed to print live results");
            }
        }
    });

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        live.set_query(line);
    }

    // Let the last query fire before shutting down
    while live.is_pending() {
        tokio::time::sleep(config.live.debounce()).await;
    }
    drop(live);
    printer.await?;
    Ok(())
}

fn run_taxonomy(config: &Config, command: TaxonomyCommands, json: bool) -> anyhow::Result<()> {
    let taxonomy = config.taxonomy.load_taxonomy()?;

    match command {
        TaxonomyCommands::Map { terms } => {
            let ids = taxonomy.map_to_taxonomy(terms.as_slice());
            if json {
                print_json(&ids)?;
            } else {
                for term in &terms {
                    match taxonomy.map_term(term) {
                        Some(node) => println!("{:<30} -> {} ({})", term, node.id, node.label),
                        None => println!("{:<30} -> (unmapped)", term),
                    }
                }
            }
        }

        TaxonomyCommands::Find { text } => {
            let nodes = taxonomy.find_nodes_by_text(&text);
            if json {
                print_json(&nodes)?;
            } else {
                for node in nodes {
                    println!("{:<28} {}", node.id, node.label);
                }
            }
        }

        TaxonomyCommands::Children { id } => {
            taxonomy.node(&id).map_err(AppError::from)?;
            let children = taxonomy.children_of(&id);
            if json {
                print_json(children)?;
            } else {
                for node in children {
                    println!("{:<28} {}", node.id, node.label);
                }
            }
        }

        TaxonomyCommands::Path { id } => {
            taxonomy.node(&id).map_err(AppError::from)?;
            let path = taxonomy.ancestor_path(&id);
            if json {
                let ids: Vec<&str> = path.iter().map(|n| n.id.as_str()).collect();
                print_json(&ids)?;
            } else {
                let labels: Vec<&str> = path.iter().map(|n| n.label.as_str()).collect();
                println!("{}", labels.join(" > "));
            }
        }

        TaxonomyCommands::Unified { search } => {
            let faculty = config.taxonomy.load_faculty_topics()?;
            let unified = UnifiedTaxonomy::build(&taxonomy, &faculty);
            match search {
                Some(text) => {
                    let nodes = unified.search(&text);
                    if json {
                        print_json(&nodes)?;
                    } else {
                        for node in nodes {
                            println!("{:<36} {}", node.id, node.label);
                        }
                    }
                }
                None if json => print_json(&unified)?,
                None => {
                    let meta = &unified.metadata;
                    println!("version {} ({})", meta.version, meta.sync_strategy);
                    println!("{} nodes, {} categories", meta.total_nodes, unified.categories.len());
                    for category in &unified.categories {
                        println!("  {:<36} {}", category.id, category.label);
                    }
                }
            }
        }
    }

    Ok(())
}

fn run_saved(config: &Config, command: SavedCommands, json: bool) -> anyhow::Result<()> {
    let store = config.saved_searches.open_store()?;

    match command {
        SavedCommands::List { recent, favorites } => {
            let searches = if recent {
                store.recent()
            } else if favorites {
                store.favorites()
            } else {
                store.list_all()
            };
            print_saved(&searches, json)?;
        }

        SavedCommands::Save {
            name,
            query,
            filters,
            unique,
        } => {
            let name = if unique {
                store.generate_unique_name(&name)
            } else {
                name
            };
            let filters = filters.into_filters();
            let result_count = open_service(config)?
                .search(&SearchQuery::new(query.clone()).with_filters(filters.clone()))
                .len();

            let saved = store
                .save(&name, &query, filters, result_count)
                .map_err(AppError::from)?;
            print_saved(std::slice::from_ref(&saved), json)?;
        }

        SavedCommands::Load { id } => {
            let saved = store
                .load(&id)
                .ok_or_else(|| AppError::NotFound(format!("saved search '{}'", id)))?;
            let service = open_service(config)?;
            let query = SearchQuery::new(saved.query).with_filters(saved.filters);
            print_results(&service.search(&query), json)?;
        }

        SavedCommands::Delete { id } => {
            if !store.delete(&id) {
                return Err(AppError::NotFound(format!("saved search '{}'", id)).into());
            }
            println!("Deleted {}", id);
        }

        SavedCommands::Rename { id, name } => {
            let renamed = store
                .rename(&id, &name)
                .map_err(AppError::from)?
                .ok_or_else(|| AppError::NotFound(format!("saved search '{}'", id)))?;
            print_saved(std::slice::from_ref(&renamed), json)?;
        }

        SavedCommands::Stats => {
            let stats = store.statistics();
            if json {
                print_json(&stats)?;
            } else {
                println!("saved searches:   {}", stats.total_searches);
                println!("avg result count: {}", stats.avg_result_count);
                println!("most recent:      {}", stats.most_used.as_deref().unwrap_or("None"));
                if let Some(oldest) = stats.oldest_search {
                    println!("oldest:           {}", oldest);
                }
            }
        }

        SavedCommands::Export { output } => {
            let exported = store.export().map_err(AppError::from)?;
            match output {
                Some(path) => std::fs::write(&path, exported)
                    .with_context(|| format!("Failed to write {}", path.display()))?,
                None => println!("{}", exported),
            }
        }

        SavedCommands::Import { file } => {
            let data = std::fs::read_to_string(&file)
                .with_context(|| format!("Failed to read {}", file.display()))?;
            let count = store.import(&data).map_err(AppError::from)?;
            println!("Imported {} saved searches", count);
        }

        SavedCommands::Clear => {
            store.clear_all();
            println!("Cleared saved searches");
        }

        SavedCommands::Templates => {
            if json {
                print_json(&*QUICK_SEARCH_TEMPLATES)?;
            } else {
                for template in QUICK_SEARCH_TEMPLATES.iter() {
                    println!("{:<24} {}", template.name, template.description);
                }
            }
        }

        SavedCommands::Apply { name } => {
            let template = find_template(&name)
                .ok_or_else(|| AppError::NotFound(format!("template '{}'", name)))?;
            let saved = store.apply_template(template).map_err(AppError::from)?;
            print_saved(std::slice::from_ref(&saved), json)?;
        }
    }

    Ok(())
}

fn print_saved(searches: &[SavedSearch], json: bool) -> anyhow::Result<()> {
    if json {
        return print_json(searches);
    }
    for search in searches {
        println!(
            "{:<36} {:<28} {:<30} {:>4} results, used {}",
            search.id,
            search.name,
            format!("{:?}", search.query),
            search.result_count,
            search.last_used.format("%Y-%m-%d %H:%M")
        );
    }
    Ok(())
}
