use anyhow::{bail, Result};
use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::EnvFilter;
use unionable::config::Config;
use unionable::source::{CsvDirSource, PostgresSource, TableSource};
use unionable::{MatchScore, UnionSearch};

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum SourceKind {
    Csv,
    Postgres,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    Text,
    Json,
}

#[derive(Parser)]
#[command(name = "unionable")]
#[command(about = "Rank tables by how well their columns union with a query table")]
struct Args {
    /// Where tables are read from
    #[arg(long, value_enum, default_value = "csv", global = true)]
    source: SourceKind,

    /// Directory of <table>.csv files (or set UNIONABLE_DATA_DIR)
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    /// PostgreSQL connection string (or set DATABASE_URL)
    #[arg(long, global = true)]
    database_url: Option<String>,

    /// Schema whose tables are searched (or set UNIONABLE_SCHEMA)
    #[arg(long, global = true)]
    schema: Option<String>,

    #[arg(long, value_enum, default_value = "text", global = true)]
    format: OutputFormat,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Names of the top K tables most unionable with the query table
    TopK {
        query_table: String,
        #[arg(short, long, default_value_t = 10)]
        k: usize,
    },
    /// Every candidate table with its match score
    Rank { query_table: String },
    /// Matched column pairs per candidate table
    Explain { query_table: String },
    /// Feature vectors of one table's columns
    Encode { table: String },
    /// Create the encodings table (postgres only)
    EnsureSchema,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("unionable=info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    let mut config = Config::from_env()?;
    if let Some(dir) = args.data_dir.clone() {
        config.data_dir = dir;
    }
    if let Some(url) = args.database_url.clone() {
        config.database_url = Some(url);
    }
    if let Some(schema) = args.schema.clone() {
        config.schema = schema;
    }

    match args.command {
        Command::TopK { query_table, k } => {
            let search = open_search(args.source, &config).await?;
            let tables = search.find_top_k(&query_table, k).await?;
            match args.format {
                OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&tables)?),
                OutputFormat::Text => {
                    for table in tables {
                        println!("{}", table);
                    }
                }
            }
        }
        Command::Rank { query_table } => {
            let search = open_search(args.source, &config).await?;
            let ranked = search.rank(&query_table).await?;
            match args.format {
                OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&ranked)?),
                OutputFormat::Text => {
                    for rank in ranked {
                        println!("( {}, {} )", rank.table_name, rank.match_score);
                    }
                }
            }
        }
        Command::Explain { query_table } => {
            let search = open_search(args.source, &config).await?;
            let matches = search.explain(&query_table).await?;
            match args.format {
                OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&matches)?),
                OutputFormat::Text => {
                    for m in matches {
                        println!("{}  {}", m.table_name, MatchScore::from(m.score));
                        if m.pairs.is_empty() {
                            println!("  (no compatible columns)");
                        }
                        for pair in m.pairs {
                            println!(
                                "  {} <-> {}  {:.6}",
                                pair.query_column, pair.candidate_column, pair.score
                            );
                        }
                    }
                }
            }
        }
        Command::Encode { table } => {
            let search = open_search(args.source, &config).await?;
            let encodings = search.encode_table(&table).await?;
            match args.format {
                OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&encodings)?),
                OutputFormat::Text => {
                    for e in encodings {
                        let vector: Vec<String> = e.vector.iter().map(|x| format!("{:.4}", x)).collect();
                        println!(
                            "{}.{} [{}] [{}]",
                            e.table_name,
                            e.column_name,
                            e.type_category,
                            vector.join(", ")
                        );
                    }
                }
            }
        }
        Command::EnsureSchema => {
            if args.source != SourceKind::Postgres {
                bail!("ensure-schema requires --source postgres");
            }
            let source = connect_postgres(&config).await?;
            source.ensure_encodings_table().await?;
            println!("DONE");
        }
    }

    Ok(())
}

async fn open_search(kind: SourceKind, config: &Config) -> Result<UnionSearch> {
    let source: Box<dyn TableSource> = match kind {
        SourceKind::Csv => {
            info!("Reading tables from {}", config.data_dir.display());
            Box::new(CsvDirSource::new(config.data_dir.clone()))
        }
        SourceKind::Postgres => Box::new(connect_postgres(config).await?),
    };
    Ok(UnionSearch::from_boxed(source))
}

async fn connect_postgres(config: &Config) -> Result<PostgresSource> {
    let url = config.require_database_url()?;
    Ok(PostgresSource::connect(url, &config.schema, config.max_connections).await?)
}
