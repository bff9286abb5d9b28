//! `ebios` - command-line driver for the EBIOS RM core.
//!
//! ```text
//! ebios [--strategy simple|weighted] new-mission [NAME]
//! ebios [--strategy simple|weighted] assess <FILE>
//! ```
//!
//! Results are printed to stdout as pretty JSON. Logs go to stderr and are
//! filtered with `RUST_LOG`.

use std::collections::BTreeMap;
use std::path::PathBuf;

use anyhow::{Context, Result, bail};
use serde::{Deserialize, Serialize};
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

use ebios_config::Settings;
use ebios_core::{
    AttackPathDraft, AttackPathEnricher, AttackPathFactory, BusinessValueDraft,
    BusinessValueFactory, DreadedEventAssessment, HeuristicEnricher, MissionDraft,
    MissionFactory, RiskEvaluator, RiskStrategy, WorkshopEventBus, WorkshopFactory,
};
use ebios_types::{
    AttackPath, BusinessValueId, Mission, MissionId, Workshop, WorkshopNumber,
};

const USAGE: &str = "\
usage: ebios [--strategy simple|weighted] <command>

commands:
  new-mission [NAME]   print a default mission and its five workshops
  assess <FILE>        score business values and attack paths from a JSON file
  help                 show this message";

fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(env_filter)
        .init();
}

// ── Arguments ────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq)]
enum Command {
    NewMission { name: Option<String> },
    Assess { file: PathBuf },
    Help,
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct Invocation {
    command: Command,
    strategy: Option<RiskStrategy>,
}

fn parse_args(args: impl IntoIterator<Item = String>) -> Result<Invocation> {
    let mut strategy = None;
    let mut positional = Vec::new();
    let mut args = args.into_iter();

    while let Some(arg) = args.next() {
        if arg == "--strategy" {
            let value = args.next().context("--strategy requires a value")?;
            strategy = Some(value.parse::<RiskStrategy>()?);
        } else if let Some(value) = arg.strip_prefix("--strategy=") {
            strategy = Some(value.parse::<RiskStrategy>()?);
        } else if arg == "-h" || arg == "--help" {
            positional.clear();
            positional.push("help".to_owned());
            break;
        } else if arg.starts_with("--") {
            bail!("unknown option `{arg}`\n\n{USAGE}");
        } else {
            positional.push(arg);
        }
    }

    let mut positional = positional.into_iter();
    let command = match positional.next().as_deref() {
        None | Some("help") => Command::Help,
        Some("new-mission") => Command::NewMission {
            name: positional.next(),
        },
        Some("assess") => Command::Assess {
            file: positional
                .next()
                .map(PathBuf::from)
                .context("assess requires a FILE argument")?,
        },
        Some(other) => bail!("unknown command `{other}`\n\n{USAGE}"),
    };
    if let Some(extra) = positional.next() {
        bail!("unexpected argument `{extra}`\n\n{USAGE}");
    }

    Ok(Invocation { command, strategy })
}

// ── new-mission ──────────────────────────────────────────────

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct MissionReport {
    mission: Mission,
    workshops: Vec<Workshop>,
    required_steps: BTreeMap<WorkshopNumber, u32>,
}

fn new_mission(name: Option<String>, settings: &Settings) -> Result<MissionReport> {
    let draft = MissionDraft {
        name,
        ..MissionDraft::default()
    };
    let mission = MissionFactory::create(&draft).context("failed to create mission")?;
    let workshops = WorkshopFactory::create_all(&mission.id);

    let mut bus = WorkshopEventBus::with_history_capacity(settings.history_capacity);
    bus.subscribe(|snapshot: Workshop| -> Result<(), ebios_core::ObserverError> {
        tracing::info!(
            workshop = %snapshot.id,
            number = snapshot.number.get(),
            status = snapshot.status.as_str(),
            "Workshop ready"
        );
        Ok(())
    });
    for workshop in &workshops {
        bus.notify(workshop);
    }

    let required_steps = workshops
        .iter()
        .map(|w| (w.number, settings.step_plan.total_for(w.number)))
        .collect();

    Ok(MissionReport {
        mission,
        workshops,
        required_steps,
    })
}

// ── assess ───────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct AssessmentInput {
    #[serde(default)]
    mission_id: Option<MissionId>,
    #[serde(default)]
    business_values: Vec<BusinessValueDraft>,
    #[serde(default)]
    attack_paths: Vec<AttackPathDraft>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct BusinessValueReport {
    id: BusinessValueId,
    name: String,
    dreaded_events: Vec<DreadedEventAssessment>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct AssessmentReport {
    mission_id: MissionId,
    strategy: RiskStrategy,
    business_values: Vec<BusinessValueReport>,
    attack_paths: Vec<AttackPath>,
}

fn assess(input: &str, strategy: RiskStrategy) -> Result<AssessmentReport> {
    let input: AssessmentInput =
        serde_json::from_str(input).context("assessment file is not valid JSON")?;
    let mission_id = input
        .mission_id
        .unwrap_or_else(|| MissionId::new("unassigned"));

    let evaluator = RiskEvaluator::new(strategy);
    let business_values = input
        .business_values
        .iter()
        .map(|draft| -> Result<BusinessValueReport> {
            let value = BusinessValueFactory::create(&mission_id, draft)
                .with_context(|| format!("invalid business value `{}`", draft.name))?;
            let dreaded_events = evaluator.assess_dreaded_events(&value)?;
            Ok(BusinessValueReport {
                id: value.id,
                name: value.name.into_inner(),
                dreaded_events,
            })
        })
        .collect::<Result<Vec<_>>>()?;

    let enricher = HeuristicEnricher::new(strategy);
    let attack_paths = input
        .attack_paths
        .iter()
        .map(|draft| -> Result<AttackPath> {
            let path = AttackPathFactory::create(&mission_id, draft)
                .with_context(|| format!("invalid attack path `{}`", draft.name))?;
            Ok(enricher.enrich(&path))
        })
        .collect::<Result<Vec<_>>>()?;

    tracing::info!(
        strategy = strategy.as_str(),
        business_values = business_values.len(),
        attack_paths = attack_paths.len(),
        "Assessment complete"
    );

    Ok(AssessmentReport {
        mission_id,
        strategy,
        business_values,
        attack_paths,
    })
}

fn print_json(value: &impl Serialize) -> Result<()> {
    let json = serde_json::to_string_pretty(value).context("failed to serialize output")?;
    println!("{json}");
    Ok(())
}

fn main() -> Result<()> {
    init_tracing();

    let invocation = parse_args(std::env::args().skip(1))?;
    let mut settings = Settings::load().context("failed to load configuration")?;
    if let Some(strategy) = invocation.strategy {
        settings.strategy = strategy;
    }

    match invocation.command {
        Command::Help => {
            println!("{USAGE}");
            Ok(())
        }
        Command::NewMission { name } => print_json(&new_mission(name, &settings)?),
        Command::Assess { file } => {
            let input = std::fs::read_to_string(&file)
                .with_context(|| format!("failed to read {}", file.display()))?;
            print_json(&assess(&input, settings.strategy)?)
        }
    }
}
