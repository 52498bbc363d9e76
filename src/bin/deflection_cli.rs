#[cfg(target_arch = "wasm32")]
fn main() {}

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    let code = native::run();
    std::process::exit(code);
}

#[cfg(not(target_arch = "wasm32"))]
mod native {
    use std::fs;
    use std::io::{self, Read, Write};
    use std::path::PathBuf;

    use clap::{Parser, ValueEnum};
    use penstock_deflection::geom::CosineDomain;
    use penstock_deflection::table::columns::AxisCandidates;
    use penstock_deflection::{DeflectionConfig, DeflectionTable, DegeneratePolicy, Error};
    use tracing_subscriber::{EnvFilter, fmt};

    /// Deflection angles along a 3D penstock alignment.
    ///
    /// Reads a CSV file with x, y and z columns (matched case-insensitively), one survey
    /// point per row in traversal order, and writes the interior rows with the angle at
    /// each point and its supplement appended.
    #[derive(Debug, Parser)]
    #[command(name = "deflection_cli")]
    #[command(version)]
    struct Cli {
        /// Input CSV file, or `-` to read from stdin
        input: PathBuf,

        /// Write the result here instead of stdout
        #[arg(short, long)]
        out: Option<PathBuf>,

        /// Output layout
        #[arg(long, value_enum, default_value_t = Format::Csv)]
        format: Format,

        /// Decimal places for the angle columns
        #[arg(long)]
        precision: Option<usize>,

        /// Report vertices whose cosine ratio leaves [-1, 1] instead of clamping it
        #[arg(long)]
        strict_cosine: bool,

        /// Abort when a vertex has a zero-length segment instead of leaving it blank
        #[arg(long)]
        fail_on_degenerate: bool,

        /// Segments at or below this length are treated as coincident points
        #[arg(long)]
        tolerance: Option<f64>,

        /// Header names for the x, y and z columns (both letter cases are accepted)
        #[arg(long, num_args = 3, value_names = ["X", "Y", "Z"])]
        columns: Option<Vec<String>>,

        /// Verbosity level (-v, -vv, -vvv)
        #[arg(short, long, action = clap::ArgAction::Count)]
        verbose: u8,
    }

    #[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
    enum Format {
        Csv,
        Table,
    }

    pub fn run() -> i32 {
        let cli = Cli::parse();
        init_tracing(cli.verbose);

        match execute(&cli) {
            Ok(()) => 0,
            Err(err) => {
                eprintln!("deflection_cli error: {err}");
                exit_code(&err)
            }
        }
    }

    fn init_tracing(verbose: u8) {
        let filter = match verbose {
            0 => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
            1 => EnvFilter::new("info"),
            2 => EnvFilter::new("debug"),
            _ => EnvFilter::new("trace"),
        };

        fmt()
            .with_env_filter(filter)
            .with_target(true)
            .with_level(true)
            .with_writer(io::stderr)
            .init();
    }

    fn config_from(cli: &Cli) -> DeflectionConfig {
        let mut config = DeflectionConfig {
            precision: cli.precision,
            ..DeflectionConfig::default()
        };
        if cli.strict_cosine {
            config.cosine = CosineDomain::Strict;
        }
        if cli.fail_on_degenerate {
            config.degenerate = DegeneratePolicy::Fail;
        }
        if let Some(tolerance) = cli.tolerance {
            config.zero_length_tolerance = tolerance;
        }
        if let Some([x, y, z]) = cli.columns.as_deref() {
            config.axes = AxisCandidates::case_variants(x, y, z);
        }
        config
    }

    fn execute(cli: &Cli) -> Result<(), CliError> {
        let input = read_input(&cli.input)?;
        let config = config_from(cli);
        let result = penstock_deflection::process_csv(&input, &config)?;

        let rendered = match cli.format {
            Format::Csv => result.to_csv(),
            Format::Table => result.render_text(),
        };
        match cli.out.as_deref() {
            Some(path) => {
                fs::write(path, rendered).map_err(|source| CliError::Io {
                    context: format!("write {}", path.display()),
                    source,
                })?;
                eprintln!("wrote {}", path.display());
            }
            None => io::stdout()
                .write_all(rendered.as_bytes())
                .map_err(|source| CliError::Io {
                    context: "write stdout".to_owned(),
                    source,
                })?,
        }

        report_summary(&result);
        Ok(())
    }

    fn read_input(path: &std::path::Path) -> Result<String, CliError> {
        if path.as_os_str() == "-" {
            let mut buffer = String::new();
            io::stdin()
                .read_to_string(&mut buffer)
                .map_err(|source| CliError::Io {
                    context: "read stdin".to_owned(),
                    source,
                })?;
            return Ok(buffer);
        }
        fs::read_to_string(path).map_err(|source| CliError::Io {
            context: format!("read {}", path.display()),
            source,
        })
    }

    fn report_summary(result: &DeflectionTable) {
        let summary = result.summary();
        tracing::info!(
            points = summary.points,
            computed = summary.computed,
            failed = summary.failed,
            "deflection run finished"
        );
        if let Some(sharpest) = summary.sharpest {
            eprintln!(
                "{} points, {} angles; sharpest bend at point {} ({:.3}°, bend {:.3}°)",
                summary.points,
                summary.computed,
                sharpest.index,
                sharpest.angle,
                sharpest.supplementary
            );
        }
        if summary.failed > 0 {
            eprintln!("{} vertices without an angle (see warnings)", summary.failed);
        }
    }

    #[derive(Debug, thiserror::Error)]
    enum CliError {
        #[error("{context}: {source}")]
        Io {
            context: String,
            source: io::Error,
        },
        #[error(transparent)]
        Deflection(#[from] Error),
    }

    fn exit_code(err: &CliError) -> i32 {
        match err {
            CliError::Io { .. } => 1,
            CliError::Deflection(_) => 2,
        }
    }
}
