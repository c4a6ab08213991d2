#![forbid(unsafe_code)]

use std::{
    fs,
    path::{Path, PathBuf},
};

use clap::{ArgAction, Parser, Subcommand};
use miette::{IntoDiagnostic, NamedSource};
use tracing_subscriber::EnvFilter;

use tempo_ast::{CostModel, FreshNames, Program};
use tempo_verify::{Prover, SmtProfile, ValidateOptions, ValidationStatus};

mod manifest;
mod report;

use report::{CheckReport, CheckSettings};

#[derive(Parser, Debug)]
#[command(
    name = "tempo",
    version,
    about = "Checks claimed cost bounds of small recursive programs"
)]
struct Cli {
    /// SMT solver profile: `fast`, `ci`, or `thorough`. Overrides `tempo.toml`.
    #[arg(long, value_enum, global = true)]
    smt_profile: Option<SmtProfileArg>,

    /// Abstract steps charged per call on top of the callee's bound. Overrides `tempo.toml`.
    #[arg(long, global = true)]
    call_cost: Option<i64>,

    /// More log output (repeatable). `TEMPO_LOG` takes a full filter instead.
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    cmd: Cmd,
}

#[derive(clap::ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
enum SmtProfileArg {
    Fast,
    Ci,
    Thorough,
}

impl From<SmtProfileArg> for SmtProfile {
    fn from(v: SmtProfileArg) -> Self {
        match v {
            SmtProfileArg::Fast => SmtProfile::Fast,
            SmtProfileArg::Ci => SmtProfile::Ci,
            SmtProfileArg::Thorough => SmtProfile::Thorough,
        }
    }
}

#[derive(Subcommand, Debug)]
enum Cmd {
    /// Validate every annotation against the program's one-step costs
    Check {
        /// Input .tempo file
        path: PathBuf,

        /// Rewrite each annotation `T` as `c0 * T + c1` with fresh unknowns
        #[arg(long)]
        infer: bool,

        /// Write a JSON report to this path
        #[arg(long)]
        report: Option<PathBuf>,
    },
    /// Print each function's derived cost next to its annotation
    Costs {
        /// Input .tempo file
        path: PathBuf,

        #[arg(long)]
        infer: bool,
    },
    /// Print the validation query as an SMT-LIB2 script
    Smt {
        /// Input .tempo file
        path: PathBuf,

        #[arg(long)]
        infer: bool,
    },
    /// Print the canonical formatting of a program
    Fmt {
        /// Input .tempo file
        path: PathBuf,
    },
}

/// Flags layered over `tempo.toml`, layered over defaults.
struct Settings {
    cost_model: CostModel,
    profile: SmtProfile,
    infer: bool,
    manifest: Option<PathBuf>,
}

fn resolve_settings(cli: &Cli, path: &Path, cli_infer: bool) -> miette::Result<Settings> {
    let resolved = manifest::load_resolved_manifest(path)?;
    if let Some(m) = &resolved.manifest_path {
        tracing::debug!(manifest = %m.display(), "using project manifest");
    }

    let call_cost = cli
        .call_cost
        .or(resolved.call_cost)
        .unwrap_or(CostModel::default().call_cost);
    if call_cost < 0 {
        miette::bail!("--call-cost must be non-negative, found {call_cost}");
    }

    Ok(Settings {
        cost_model: CostModel { call_cost },
        profile: cli
            .smt_profile
            .map(SmtProfile::from)
            .or(resolved.smt_profile)
            .unwrap_or_default(),
        infer: cli_infer || resolved.infer.unwrap_or(false),
        manifest: resolved.manifest_path,
    })
}

fn init_tracing(verbose: u8) {
    let filter = match verbose {
        0 => EnvFilter::try_from_env("TEMPO_LOG").unwrap_or_else(|_| EnvFilter::new("warn")),
        1 => EnvFilter::new("info"),
        2 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"),
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> miette::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match &cli.cmd {
        Cmd::Check {
            path,
            infer,
            report,
        } => {
            let settings = resolve_settings(&cli, path, *infer)?;
            check_one(path, &settings, report.as_deref())
        }
        Cmd::Costs { path, infer } => {
            let settings = resolve_settings(&cli, path, *infer)?;
            let (program, source) = load_program(path, settings.infer)?;
            let costs = program
                .derived_costs(&settings.cost_model)
                .map_err(|e| miette::Report::new(e).with_source_code(source.clone()))?;
            for (func, cost) in program.functions().iter().zip(costs) {
                println!("{}({})", func.name(), func.params().join(", "));
                println!("    cost:  {cost}");
                println!("    bound: {}", func.annotation());
            }
            Ok(())
        }
        Cmd::Smt { path, infer } => {
            let settings = resolve_settings(&cli, path, *infer)?;
            let (program, source) = load_program(path, settings.infer)?;
            let query = tempo_verify::build_query(&program, &settings.cost_model)
                .map_err(|e| miette::Report::new(e).with_source_code(source.clone()))?;
            let script = tempo_verify::render_smtlib(&query).map_err(miette::Report::new)?;
            print!("{script}");
            Ok(())
        }
        Cmd::Fmt { path } => {
            let (program, _) = load_program(path, false)?;
            print!("{}", tempo_parse::format_program(&program));
            Ok(())
        }
    }
}

fn load_program(path: &Path, infer: bool) -> miette::Result<(Program, NamedSource<String>)> {
    let src = fs::read_to_string(path).into_diagnostic()?;
    let source = NamedSource::new(display_path(path), src.clone());
    let program = tempo_parse::parse_source(&src).map_err(|e| e.with_source_code(source.clone()))?;
    tracing::debug!(functions = program.functions().len(), "parsed program");

    let program = if infer {
        program.with_inferred_constants(&mut FreshNames::new(0))
    } else {
        program
    };
    Ok((program, source))
}

fn check_one(path: &Path, settings: &Settings, report_path: Option<&Path>) -> miette::Result<()> {
    let (program, source) = load_program(path, settings.infer)?;

    let opts = ValidateOptions {
        cost_model: settings.cost_model,
        profile: settings.profile,
    };
    let mut prover = make_prover(settings.profile);
    let result = tempo_verify::validate_with_options(&program, prover.as_mut(), &opts)
        .map_err(|e| miette::Report::new(e).with_source_code(source.clone()))?;

    println!("{}", result.status);
    if let Some(reason) = &result.reason {
        println!("  reason: {reason}");
    }
    for (name, value) in &result.witnesses {
        println!("  {name} = {value}");
    }

    let status = result.status;
    if let Some(out) = report_path {
        let settings = CheckSettings {
            call_cost: settings.cost_model.call_cost,
            smt_profile: settings.profile,
            infer: settings.infer,
            manifest: settings.manifest.as_deref().map(display_path),
        };
        CheckReport::new(path, settings, result).write_json(out)?;
    }

    match status {
        ValidationStatus::Valid => Ok(()),
        ValidationStatus::Invalid => Err(miette::miette!(
            "the annotated costs of {} do not bound the program",
            display_path(path)
        )),
        ValidationStatus::Unknown => Err(miette::miette!(
            "the solver could not decide {}; try `--smt-profile thorough`",
            display_path(path)
        )),
    }
}

#[cfg(feature = "z3")]
fn make_prover(profile: SmtProfile) -> Box<dyn Prover> {
    Box::new(tempo_verify::Z3Prover::with_profile(profile))
}

#[cfg(not(feature = "z3"))]
fn make_prover(_profile: SmtProfile) -> Box<dyn Prover> {
    Box::new(tempo_verify::NoZ3Prover)
}

fn display_path(p: &Path) -> String {
    p.to_string_lossy().to_string()
}
