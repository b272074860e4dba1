mod debug_report;

use clap::Parser;
use guideline_gherkin::{
    DecisionRecord, Generation, MapperOptions, Options, ScenarioCounter, ScenarioDescriptor, SituationFallback,
    generate_from_descriptor, generate_verbose, generate_with_counter,
};
use serde::Serialize;
use std::io::{self, IsTerminal, Read};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Turn clinical guideline prose into paired Gherkin scenarios.
///
/// Reads the guideline text from the trailing arguments, or from stdin when
/// none are given. With `--descriptor`, renders one hand-authored scenario
/// pair instead.
#[derive(Parser)]
#[command(name = "guideline-gherkin")]
#[command(version)]
struct Cli {
    /// Guideline category label, used as each record's guideline
    #[arg(short, long, env = "GSRL_CATEGORY", default_value = "clinical_guideline")]
    category: String,

    /// Feature title
    #[arg(short, long, env = "GSRL_FEATURE", default_value = "Clinical guideline")]
    feature: String,

    /// Category tag carried by every scenario (without `@`)
    #[arg(long, default_value = "treatment")]
    tag: String,

    /// Contraindication to emphasise on positive scenarios (repeatable)
    #[arg(long = "contraindication", value_name = "TEXT")]
    contraindications: Vec<String>,

    /// Render a JSON scenario descriptor instead of extracting from text
    #[arg(short, long, value_name = "FILE")]
    descriptor: Option<PathBuf>,

    /// Print `{feature, metadata, records}` as JSON
    #[arg(long)]
    json: bool,

    /// Print a per-sentence report to stderr
    #[arg(short, long)]
    verbose: bool,

    /// Process sentences on the calling thread
    #[arg(long)]
    sequential: bool,

    /// Drop records that have no condition or measurement
    #[arg(long)]
    skip_fallback: bool,

    /// Tag every scenario with a unique `@id-NNNN`
    #[arg(long)]
    id_tags: bool,

    /// Force ANSI color in the verbose report
    #[arg(long, overrides_with = "no_color")]
    color: bool,

    /// Disable ANSI color in the verbose report
    #[arg(long)]
    no_color: bool,

    /// Log level when RUST_LOG is unset
    #[arg(long, env = "GSRL_LOG_LEVEL", default_value = "warn")]
    log_level: String,

    /// Guideline text
    input: Vec<String>,
}

impl Cli {
    fn options(&self) -> Options {
        Options {
            situation_fallback: if self.skip_fallback {
                SituationFallback::Skip
            } else {
                SituationFallback::Placeholder
            },
            mapper: MapperOptions { category_tag: self.tag.clone(), contraindications: self.contraindications.clone() },
            parallel: !self.sequential,
            ..Options::default()
        }
    }

    fn color(&self) -> bool {
        if self.no_color {
            false
        } else {
            self.color || io::stderr().is_terminal()
        }
    }
}

#[derive(Serialize)]
struct JsonOutput<'a> {
    feature: String,
    metadata: guideline_gherkin::FeatureMetadata,
    records: &'a [DecisionRecord],
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let env_filter =
        tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| cli.log_level.clone().into());
    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
        .init();

    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {err}");
            ExitCode::from(2)
        }
    }
}

fn run(cli: &Cli) -> Result<(), Box<dyn std::error::Error>> {
    let options = cli.options();

    let generation = if let Some(path) = &cli.descriptor {
        let descriptor = ScenarioDescriptor::from_path(path)?;
        generate_from_descriptor(&descriptor, &cli.feature, &options)?
    } else {
        let text = read_input(&cli.input)?;
        let verbose = cli.verbose.then(|| generate_verbose(&text, &cli.category, &cli.feature, &options));
        if let Some(verbose) = &verbose {
            debug_report::print_run(verbose, cli.color());
        }
        match verbose {
            _ if cli.id_tags => {
                let mut counter = ScenarioCounter::default();
                generate_with_counter(&text, &cli.category, &cli.feature, &options, &mut counter)
            }
            Some(verbose) => verbose.generation,
            None => guideline_gherkin::generate(&text, &cli.category, &cli.feature, &options),
        }
    };

    print_generation(&generation, cli.json)
}

fn read_input(args: &[String]) -> io::Result<String> {
    if !args.is_empty() {
        return Ok(args.join(" "));
    }
    let mut buffer = String::new();
    io::stdin().read_to_string(&mut buffer)?;
    Ok(buffer)
}

fn print_generation(generation: &Generation, json: bool) -> Result<(), Box<dyn std::error::Error>> {
    if json {
        let out = JsonOutput {
            feature: generation.feature.to_text(),
            metadata: generation.metadata(),
            records: &generation.records,
        };
        println!("{}", serde_json::to_string_pretty(&out)?);
    } else {
        print!("{}", generation.feature);
    }
    Ok(())
}
