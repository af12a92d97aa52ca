//! sift CLI - compile filter/sort/search parameters to SQL
//!
//! Usage:
//!   sift compile --schema <schema.toml> --entity <name> [--filters <json>] [--sort <spec>]
//!   sift describe --schema <schema.toml> --entity <name>
//!   sift validate --schema <schema.toml>
//!
//! Examples:
//!   sift compile --schema demos/company.toml --entity users \
//!       --filters '{"role.name": {"$eq": "admin"}}' --sort name:asc --dialect postgres
//!   sift compile --config demos/sift.toml --query-type users --search alice
//!   sift describe --schema demos/company.toml --entity users --exclude filter:age

use clap::{Args, Parser, Subcommand, ValueEnum};
use serde_json::json;
use sift::catalog::{QueryCatalog, QueryType};
use sift::compile::QueryCompiler;
use sift::config::{Settings, SettingsError};
use sift::error::CompileError;
use sift::params::QueryParams;
use sift::schema::{loader, Schema};
use sift::sql::{validate_sql, Dialect};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "sift")]
#[command(about = "sift - compile declarative filter, sort and search specifications to SQL")]
#[command(version)]
struct Cli {
    /// Path to a sift.toml (defaults to SIFT_CONFIG, ./sift.toml, then the user config dir)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Compile query parameters to SQL
    Compile {
        #[command(flatten)]
        target: TargetArgs,

        /// Filter tree as JSON
        #[arg(short, long)]
        filters: Option<String>,

        /// Sort spec, e.g. "name:asc,role.name:desc"
        #[arg(short, long)]
        sort: Option<String>,

        /// Free-text search term
        #[arg(long)]
        search: Option<String>,

        /// Comma-separated paths to search, e.g. "name,role.name"
        #[arg(long)]
        search_fields: Option<String>,

        /// SQL dialect to generate (defaults to the configured dialect)
        #[arg(short, long)]
        dialect: Option<DialectArg>,

        /// Output format
        #[arg(short, long, default_value = "sql")]
        output: OutputFormat,

        /// Parse the generated SQL back with sqlparser before printing it
        #[arg(long)]
        check: bool,
    },

    /// Print what a query type can filter, sort and search, as JSON
    Describe {
        #[command(flatten)]
        target: TargetArgs,
    },

    /// Validate a schema file
    Validate {
        /// Path to the schema TOML file
        #[arg(long)]
        schema: Option<PathBuf>,
    },
}

#[derive(Args)]
struct TargetArgs {
    /// Path to the schema TOML file (defaults to [schema] path in the config)
    #[arg(long)]
    schema: Option<PathBuf>,

    /// Root entity to query
    #[arg(short, long, conflicts_with = "query_type")]
    entity: Option<String>,

    /// Named query type from the config
    #[arg(short, long)]
    query_type: Option<String>,

    /// Allow-list entries, optionally scoped (filter:, sort:, search:)
    #[arg(long)]
    only: Vec<String>,

    /// Deny-list entries, optionally scoped (filter:, sort:, search:)
    #[arg(long)]
    exclude: Vec<String>,
}

#[derive(Clone, ValueEnum)]
enum DialectArg {
    Postgres,
    Mysql,
    Tsql,
    Duckdb,
    Sqlite,
}

impl From<DialectArg> for Dialect {
    fn from(arg: DialectArg) -> Self {
        match arg {
            DialectArg::Postgres => Dialect::Postgres,
            DialectArg::Mysql => Dialect::MySql,
            DialectArg::Tsql => Dialect::TSql,
            DialectArg::Duckdb => Dialect::DuckDb,
            DialectArg::Sqlite => Dialect::Sqlite,
        }
    }
}

#[derive(Clone, ValueEnum)]
enum OutputFormat {
    /// Output SQL only
    Sql,
    /// Output SQL with comments
    Verbose,
    /// Output SQL and compilation details as JSON
    Json,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let settings = match &cli.config {
        Some(path) => Settings::from_file(path),
        None => Settings::load(),
    };
    let settings = match settings {
        Ok(s) => s,
        Err(e) => {
            eprintln!("Error loading config: {}", e);
            return ExitCode::FAILURE;
        }
    };
    init_logging(&settings);

    match cli.command {
        Commands::Compile {
            target,
            filters,
            sort,
            search,
            search_fields,
            dialect,
            output,
            check,
        } => {
            let params = QueryParams {
                filters: filters.map(sift::params::FilterInput::Json),
                sort: sort.map(sift::params::SortInput::Text),
                search,
                search_fields,
            };
            cmd_compile(&settings, target, params, dialect, output, check)
        }
        Commands::Describe { target } => cmd_describe(&settings, target),
        Commands::Validate { schema } => cmd_validate(&settings, schema),
    }
}

fn init_logging(settings: &Settings) {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&settings.logging.filter))
        .unwrap_or_else(|_| EnvFilter::new("warn"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(true)
        .try_init();
}

fn load_schema(settings: &Settings, schema: Option<PathBuf>) -> Result<Schema, String> {
    let path = match schema {
        Some(path) => path,
        None => settings
            .schema_path()
            .map_err(|e| e.to_string())?
            .ok_or_else(|| "No schema given: pass --schema or set [schema] path".to_string())?,
    };
    loader::from_file(&path).map_err(|e| format!("Error loading schema '{}': {}", path.display(), e))
}

fn load_catalog(settings: &Settings, target: TargetArgs) -> Result<(Schema, QueryCatalog), String> {
    let schema = load_schema(settings, target.schema)?;

    let query_type = match (target.query_type, target.entity) {
        (Some(name), _) => settings
            .query_type(&name)
            .map_err(|e: SettingsError| e.to_string())?
            .only(target.only)
            .exclude(target.exclude),
        (None, Some(entity)) => QueryType::new(&entity, &entity)
            .only(target.only)
            .exclude(target.exclude),
        (None, None) => return Err("Pass --entity or --query-type".to_string()),
    };

    let catalog = QueryCatalog::build(&schema, &query_type).map_err(|e| e.to_string())?;
    Ok((schema, catalog))
}

fn print_rejection(err: &CompileError) {
    match serde_json::to_string_pretty(&err.rejection()) {
        Ok(json) => eprintln!("{}", json),
        Err(_) => eprintln!("Compilation error: {}", err),
    }
}

fn cmd_compile(
    settings: &Settings,
    target: TargetArgs,
    params: QueryParams,
    dialect: Option<DialectArg>,
    output: OutputFormat,
    check: bool,
) -> ExitCode {
    let (schema, catalog) = match load_catalog(settings, target) {
        Ok(loaded) => loaded,
        Err(e) => {
            eprintln!("{}", e);
            return ExitCode::FAILURE;
        }
    };

    let mut options = settings.compile_options();
    if let Some(dialect) = dialect {
        options = options.with_dialect(dialect.into());
    }
    let compiler = QueryCompiler::new(&schema, options);

    let compiled = match compiler.compile(&catalog, &params) {
        Ok(compiled) => compiled,
        Err(e) => {
            print_rejection(&e);
            return ExitCode::FAILURE;
        }
    };

    if check {
        if let Err(e) = validate_sql(&compiled.sql, compiled.dialect) {
            eprintln!("{}", e);
            return ExitCode::FAILURE;
        }
    }

    match output {
        OutputFormat::Sql => {
            println!("{}", compiled.sql);
        }
        OutputFormat::Verbose => {
            println!("-- sift compiled SQL");
            println!("-- Query type: {} (entity {})", catalog.query_type, catalog.entity);
            println!("-- Dialect: {}", compiled.dialect);
            println!("-- Joins: {}", compiled.joins);
            println!();
            println!("{}", compiled.sql);
        }
        OutputFormat::Json => {
            let doc = json!({
                "query_type": catalog.query_type,
                "dialect": compiled.dialect,
                "joins": compiled.joins,
                "distinct": compiled.query.distinct,
                "sql": compiled.sql,
            });
            println!("{:#}", doc);
        }
    }
    ExitCode::SUCCESS
}

fn cmd_describe(settings: &Settings, target: TargetArgs) -> ExitCode {
    let (_, catalog) = match load_catalog(settings, target) {
        Ok(loaded) => loaded,
        Err(e) => {
            eprintln!("{}", e);
            return ExitCode::FAILURE;
        }
    };

    match serde_json::to_string_pretty(&catalog) {
        Ok(json) => {
            println!("{}", json);
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("Error serializing catalog: {}", e);
            ExitCode::FAILURE
        }
    }
}

fn cmd_validate(settings: &Settings, schema: Option<PathBuf>) -> ExitCode {
    let schema = match load_schema(settings, schema) {
        Ok(s) => s,
        Err(e) => {
            eprintln!("{}", e);
            return ExitCode::FAILURE;
        }
    };

    // Configured query types must build against the schema too.
    if let Err(e) = settings.registry(&schema) {
        eprintln!("Invalid query type: {}", e);
        return ExitCode::FAILURE;
    }

    println!(
        "OK: {} entities, {} query types",
        schema.len(),
        settings.query_types.len()
    );
    ExitCode::SUCCESS
}
