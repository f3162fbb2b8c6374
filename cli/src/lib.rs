use anyhow::{anyhow, Context, Error, Result};
use clap::{Args, Parser, Subcommand};
use dbtransformer::convert::{convert, destination_file, ConversionReport};
use dbtransformer::{ConnectionParameters, DbTransformer, ExportConfig, OutputFormat, RdfSyntax, Settings};
use log::{debug, info};
use std::ffi::OsString;
use std::io::Write;
use std::path::{Path, PathBuf};

#[derive(Debug, Parser)]
#[command(name = "dbtransformer")]
#[command(about = "Export relational databases as RDF graphs and OWL ontologies")]
#[command(arg_required_else_help = true)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
    /// Verbose mode - sets the RUST_LOG level to info, defaults to warning level
    #[clap(long, short, action, default_value = "false", global = true)]
    verbose: bool,
    /// Debug mode - sets the RUST_LOG level to debug, defaults to warning level
    #[clap(long, action, default_value = "false", global = true)]
    debug: bool,
    /// Settings document supplying defaults for connection, output path, base URI and format
    #[clap(long, short, global = true)]
    settings: Option<PathBuf>,
}

#[derive(Debug, Clone, Args)]
struct ConnectionArgs {
    /// Connection string, e.g. jdbc:sqlite:/data/shop.db
    #[clap(long)]
    jdbc: Option<String>,
    #[clap(long, short)]
    user: Option<String>,
    #[clap(long, short)]
    password: Option<String>,
    /// Driver class name
    #[clap(long)]
    driver: Option<String>,
    /// Rows fetched per round trip
    #[clap(long)]
    fetch_size: Option<u32>,
    /// D2RQ mapping document; when given the schema is not reflected
    #[clap(long, short)]
    mapping: Option<PathBuf>,
    /// Base URI for generated resources
    #[clap(long)]
    base_uri: Option<String>,
}

#[derive(Debug, Subcommand)]
enum SettingsCommands {
    /// Print a settings document
    Show {
        file: PathBuf,
        /// Print as JSON
        #[clap(long, action)]
        json: bool,
    },
    /// Write a settings document
    Save {
        file: PathBuf,
        #[clap(long, default_value = "")]
        jdbc: String,
        #[clap(long, default_value = "")]
        user: String,
        #[clap(long, default_value = "")]
        driver: String,
        #[clap(long, default_value = "")]
        output_path: String,
        #[clap(long, default_value = "")]
        base_uri: String,
        /// Output format code or name
        #[clap(long, default_value = "0")]
        format: String,
        /// Character encoding of the document
        #[clap(long, default_value = "UTF-8")]
        encoding: String,
    },
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Export a database as an ontology file
    Export {
        #[command(flatten)]
        connection: ConnectionArgs,
        /// Output format code (0-13) or name
        #[clap(long, short)]
        format: Option<String>,
        /// Output file
        #[clap(long, short)]
        output: Option<PathBuf>,
        /// Leave out the class and property declarations
        #[clap(long, action)]
        no_vocabulary: bool,
    },
    /// Dump a database as an RDF graph
    Transform {
        #[command(flatten)]
        connection: ConnectionArgs,
        /// RDF/XML, RDF/XML-ABBREV, N-TRIPLE, TURTLE or N3
        #[clap(long, default_value = "N-TRIPLE")]
        syntax: String,
        /// Output file, `-` for stdout
        #[clap(long, short, default_value = "-")]
        output: String,
        #[clap(long, action)]
        no_vocabulary: bool,
    },
    /// Convert an RDF document into another ontology format
    Convert {
        /// Output format code (0-13) or name
        #[clap(long, short)]
        format: String,
        #[clap(long, short)]
        input: PathBuf,
        #[clap(long, short)]
        output: PathBuf,
    },
    /// Print the mapping generated from a database schema as D2RQ Turtle
    Mapping {
        #[command(flatten)]
        connection: ConnectionArgs,
        /// Output file, stdout when not given
        #[clap(long, short)]
        output: Option<PathBuf>,
    },
    /// List the output formats
    Formats {
        #[clap(long, action)]
        json: bool,
    },
    /// Read or write settings documents
    #[command(subcommand)]
    Settings(SettingsCommands),
}

pub fn run() -> Result<()> {
    dbtransformer::api::init_logging();
    let cmd = Cli::parse();
    execute(cmd)
}

pub fn run_from_args<I, T>(args: I) -> Result<()>
where
    I: IntoIterator<Item = T>,
    T: Into<OsString> + Clone,
{
    dbtransformer::api::init_logging();
    let cmd = Cli::try_parse_from(args).map_err(Error::from)?;
    execute(cmd)
}

fn execute(cmd: Cli) -> Result<()> {
    // DBTRANSFORMER_LOG has already been copied into RUST_LOG; the flags win over both
    if cmd.debug {
        std::env::set_var("RUST_LOG", "debug");
    } else if cmd.verbose {
        std::env::set_var("RUST_LOG", "info");
    } else if std::env::var("RUST_LOG").is_err() {
        std::env::set_var("RUST_LOG", "warn");
    }
    let _ = env_logger::try_init();

    let defaults = match &cmd.settings {
        Some(path) => {
            let settings = Settings::load(path)
                .with_context(|| format!("Failed to read settings from {}", path.display()))?;
            debug!("Loaded settings: {:?}", settings);
            settings
        }
        None => Settings::default(),
    };

    match cmd.command {
        Commands::Export {
            connection,
            format,
            output,
            no_vocabulary,
        } => {
            let format = match format {
                Some(f) => f.parse::<OutputFormat>()?,
                None => defaults.output_format().effective(),
            };
            let output = match output {
                Some(path) => path,
                None if !defaults.output_path.is_empty() => PathBuf::from(&defaults.output_path),
                None => return Err(anyhow!("No output file given (use --output or a settings file)")),
            };
            let transformer = transformer(&connection, &defaults, Some(&output), format, RdfSyntax::NTriples, no_vocabulary)?;
            let params = connection_parameters(&connection, &defaults);
            let report = transformer.export(&params)?;
            print_report(&report);
        }
        Commands::Transform {
            connection,
            syntax,
            output,
            no_vocabulary,
        } => {
            let syntax: RdfSyntax = syntax.parse()?;
            // the output file decides the fallback base URI
            let file = (output != "-").then(|| PathBuf::from(&output));
            let transformer = transformer(&connection, &defaults, file.as_deref(), OutputFormat::RdfXml, syntax, no_vocabulary)?;
            let params = connection_parameters(&connection, &defaults);
            let base_uri = base_uri(&connection, &defaults);
            let bytes = transformer.transform(&params, base_uri.as_deref())?;
            if output == "-" {
                std::io::stdout().write_all(&bytes)?;
            } else {
                std::fs::write(&output, &bytes)?;
                info!("Wrote {} bytes of {} to {}", bytes.len(), syntax, output);
            }
        }
        Commands::Convert {
            format,
            input,
            output,
        } => {
            let format: OutputFormat = format.parse()?;
            let bytes = std::fs::read(&input).with_context(|| format!("Failed to read {}", input.display()))?;
            let destination = destination_file(&absolute(&output)?)?;
            let report = convert(format.code(), &bytes, &destination)?;
            print_report(&report);
        }
        Commands::Mapping { connection, output } => {
            let transformer = transformer(&connection, &defaults, None, OutputFormat::RdfXml, RdfSyntax::NTriples, false)?;
            let params = connection_parameters(&connection, &defaults);
            let mapping = transformer.generate_mapping(&params, base_uri(&connection, &defaults).as_deref())?;
            for warning in &mapping.warnings {
                eprintln!("warning: {}", warning);
            }
            let turtle = mapping.to_turtle()?;
            match output {
                Some(path) => std::fs::write(&path, &turtle)?,
                None => std::io::stdout().write_all(&turtle)?,
            }
        }
        Commands::Formats { json } => {
            if json {
                let formats: Vec<serde_json::Value> = OutputFormat::NAMED
                    .iter()
                    .map(|f| {
                        serde_json::json!({
                            "code": f.code(),
                            "name": f.name(),
                            "extension": f.extension(),
                        })
                    })
                    .collect();
                println!("{}", serde_json::to_string_pretty(&formats)?);
            } else {
                for format in OutputFormat::NAMED {
                    println!("{:>2}  {:<18} .{}", format.code(), format.name(), format.extension());
                }
                println!(" 0  (unknown)          writes RDF/XML");
            }
        }
        Commands::Settings(settings_cmd) => handle_settings_command(settings_cmd)?,
    }
    Ok(())
}

fn handle_settings_command(cmd: SettingsCommands) -> Result<()> {
    match cmd {
        SettingsCommands::Show { file, json } => {
            let settings = Settings::load(&file)?;
            if json {
                println!("{}", serde_json::to_string_pretty(&settings)?);
            } else {
                println!("jdbc:       {}", settings.jdbc);
                println!("user:       {}", settings.user);
                println!("driver:     {}", settings.driver);
                println!("outputPath: {}", settings.output_path);
                println!("baseUri:    {}", settings.base_uri);
                println!("format:     {} ({})", settings.format, settings.output_format().effective());
            }
        }
        SettingsCommands::Save {
            file,
            jdbc,
            user,
            driver,
            output_path,
            base_uri,
            format,
            encoding,
        } => {
            let settings = Settings {
                jdbc,
                user,
                driver,
                output_path,
                base_uri,
                format: format.parse::<OutputFormat>()?.code(),
            };
            settings.save_with_encoding(&file, &encoding)?;
            println!("Saved settings to {}", file.display());
        }
    }
    Ok(())
}

fn pick(arg: &Option<String>, default: &str) -> Option<String> {
    arg.clone().or_else(|| (!default.is_empty()).then(|| default.to_string()))
}

fn connection_parameters(args: &ConnectionArgs, defaults: &Settings) -> ConnectionParameters {
    ConnectionParameters {
        driver_class: pick(&args.driver, &defaults.driver),
        connection_string: pick(&args.jdbc, &defaults.jdbc),
        username: pick(&args.user, &defaults.user),
        password: args.password.clone(),
        fetch_size: args.fetch_size.map(|n| n.max(1)),
    }
}

fn base_uri(args: &ConnectionArgs, defaults: &Settings) -> Option<String> {
    pick(&args.base_uri, &defaults.base_uri)
}

/// Absolute form of a path, so output path coercion leaves it as is.
fn absolute(path: &Path) -> Result<String> {
    let absolute = std::path::absolute(path)?;
    absolute
        .to_str()
        .map(str::to_string)
        .ok_or_else(|| anyhow!("Path {} is not valid UTF-8", absolute.display()))
}

fn transformer(
    args: &ConnectionArgs,
    defaults: &Settings,
    output: Option<&Path>,
    format: OutputFormat,
    syntax: RdfSyntax,
    no_vocabulary: bool,
) -> Result<DbTransformer> {
    let mut builder = ExportConfig::builder();
    builder.format(format).syntax(syntax).vocabulary(!no_vocabulary);
    if let Some(mapping) = &args.mapping {
        builder.mapping_file(mapping.clone());
    }
    if let Some(base) = base_uri(args, defaults) {
        builder.base_uri(base);
    }
    if let Some(output) = output {
        builder.output_path(&absolute(output)?);
    }
    Ok(DbTransformer::new(builder.build()?))
}

fn print_report(report: &ConversionReport) {
    println!(
        "Wrote {} ({}, {} axioms, {} bytes)",
        report.path.display(),
        report.format,
        report.axioms,
        report.bytes
    );
    debug!("blake3 {}", report.hash);
}
