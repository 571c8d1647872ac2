//! Sitesafe CLI: log and review site safety violations.
//!
//! Configuration comes from the environment (`Config::from_env`). Every command
//! runs under a session obtained with the application password, passed with
//! `--password` or SITESAFE_PASSWORD.

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Context;
use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand, ValueEnum};
use serde::Serialize;
use sitesafe_cli::{
    init_tracing, initialize_services, print_json, print_personnel_table, print_site_table,
    read_evidence, report_error, AppState,
};
use sitesafe_core::models::{
    parse_date, NewPersonnelViolation, NewSiteIssue, PersonnelFilters, RecordKind, Severity,
    SiteFilters, ViolationType,
};
use sitesafe_core::{AuthorizedSession, Config};
use sitesafe_db::Field;

#[derive(Parser)]
#[command(name = "sitesafe", about = "Construction site safety log")]
struct Cli {
    /// Name recorded against this session
    #[arg(long, global = true, env = "SITESAFE_USER", default_value = "cli")]
    user: String,

    /// Application password
    #[arg(long, global = true, env = "SITESAFE_PASSWORD", hide_env_values = true)]
    password: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Personnel violations (hard-hat infractions)
    Personnel {
        #[command(subcommand)]
        sub: PersonnelCommands,
    },
    /// Site-level hazards
    Site {
        #[command(subcommand)]
        sub: SiteCommands,
    },
    /// List the distinct values of one attribute, for filter pickers
    Distinct {
        #[arg(value_enum)]
        kind: KindArg,
        /// Attribute name, e.g. company, building, hard_hat_number
        field: String,
    },
    /// Repeat-offender status for a hard hat number
    Evaluate { hard_hat: String },
    /// Compile the PDF safety report for an inclusive date range
    Report {
        #[arg(long, value_parser = parse_day)]
        start: NaiveDate,
        #[arg(long, value_parser = parse_day)]
        end: NaiveDate,
        /// Directory the report is written to
        #[arg(long, default_value = ".")]
        out: PathBuf,
    },
    /// Evidence operations
    Evidence {
        #[command(subcommand)]
        sub: EvidenceCommands,
    },
}

#[derive(Subcommand)]
enum PersonnelCommands {
    /// Log a personnel violation
    Add(PersonnelAdd),
    /// List personnel violations, newest first
    List {
        #[command(flatten)]
        filters: PersonnelListArgs,
        #[command(flatten)]
        output: OutputArgs,
    },
}

#[derive(Subcommand)]
enum SiteCommands {
    /// Log a site issue
    Add(SiteAdd),
    /// List site issues, newest first
    List {
        #[command(flatten)]
        filters: SiteListArgs,
        #[command(flatten)]
        output: OutputArgs,
    },
}

#[derive(Subcommand)]
enum EvidenceCommands {
    /// Time-limited link for a stored evidence pointer
    Link { pointer: String },
}

#[derive(Clone, Copy, ValueEnum)]
enum KindArg {
    Personnel,
    Site,
}

impl From<KindArg> for RecordKind {
    fn from(kind: KindArg) -> Self {
        match kind {
            KindArg::Personnel => RecordKind::PersonnelViolation,
            KindArg::Site => RecordKind::SiteIssue,
        }
    }
}

#[derive(Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Format {
    Table,
    Json,
}

#[derive(Args)]
struct OutputArgs {
    #[arg(long, value_enum, default_value = "table")]
    format: Format,
    /// Resolve a signed link for each record's evidence (json output)
    #[arg(long)]
    links: bool,
}

#[derive(Args)]
struct PersonnelAdd {
    #[arg(long)]
    hard_hat: String,
    #[arg(long = "type", value_parser = parse_violation_type)]
    violation_type: ViolationType,
    #[arg(long, value_parser = parse_severity)]
    severity: Severity,
    #[arg(long)]
    description: String,
    /// Event date, defaults to today
    #[arg(long, value_parser = parse_day)]
    date: Option<NaiveDate>,
    #[arg(long)]
    company: Option<String>,
    #[arg(long)]
    trade: Option<String>,
    #[arg(long)]
    location: Option<String>,
    #[arg(long)]
    corrective_action: Option<String>,
    /// Photo or document to attach
    #[arg(long)]
    evidence: Option<PathBuf>,
}

#[derive(Args)]
struct SiteAdd {
    #[arg(long)]
    company: String,
    #[arg(long)]
    building: String,
    #[arg(long)]
    floor: String,
    #[arg(long, value_parser = parse_severity)]
    risk: Severity,
    #[arg(long)]
    issue: String,
    /// Event date, defaults to today
    #[arg(long, value_parser = parse_day)]
    date: Option<NaiveDate>,
    #[arg(long)]
    photo: Option<PathBuf>,
}

#[derive(Args)]
struct PersonnelListArgs {
    #[arg(long)]
    hard_hat: Option<String>,
    #[arg(long)]
    company: Option<String>,
    #[arg(long)]
    trade: Option<String>,
    #[arg(long)]
    location: Option<String>,
    #[arg(long = "type", value_parser = parse_violation_type)]
    violation_type: Option<ViolationType>,
    #[arg(long, value_parser = parse_severity)]
    severity: Option<Severity>,
    /// Substring searched in description, location, company and trade
    #[arg(long)]
    keyword: Option<String>,
    #[arg(long)]
    case_sensitive: bool,
}

#[derive(Args)]
struct SiteListArgs {
    #[arg(long)]
    company: Option<String>,
    #[arg(long)]
    building: Option<String>,
    #[arg(long)]
    floor: Option<String>,
    #[arg(long, value_parser = parse_severity)]
    risk: Option<Severity>,
    /// Substring searched in the issue text
    #[arg(long)]
    keyword: Option<String>,
    #[arg(long)]
    case_sensitive: bool,
}

impl From<PersonnelListArgs> for PersonnelFilters {
    fn from(args: PersonnelListArgs) -> Self {
        PersonnelFilters {
            hard_hat_number: args.hard_hat,
            company: args.company,
            trade: args.trade,
            location: args.location,
            violation_type: args.violation_type,
            severity: args.severity,
            keyword: args.keyword,
            case_sensitive: args.case_sensitive,
        }
    }
}

impl From<SiteListArgs> for SiteFilters {
    fn from(args: SiteListArgs) -> Self {
        SiteFilters {
            company: args.company,
            building: args.building,
            floor: args.floor,
            risk_level: args.risk,
            keyword: args.keyword,
            case_sensitive: args.case_sensitive,
        }
    }
}

fn parse_day(raw: &str) -> Result<NaiveDate, String> {
    parse_date(raw).map_err(|e| e.to_string())
}

fn parse_violation_type(raw: &str) -> Result<ViolationType, String> {
    raw.parse().map_err(|e: sitesafe_core::AppError| e.to_string())
}

fn parse_severity(raw: &str) -> Result<Severity, String> {
    raw.parse().map_err(|e: sitesafe_core::AppError| e.to_string())
}

#[derive(Serialize)]
struct Linked<T> {
    #[serde(flatten)]
    record: T,
    evidence_link: Option<String>,
}

async fn run_personnel(
    app: &AppState,
    session: &AuthorizedSession,
    sub: PersonnelCommands,
) -> anyhow::Result<()> {
    match sub {
        PersonnelCommands::Add(args) => {
            let evidence = match &args.evidence {
                Some(path) => Some(read_evidence(path).await?),
                None => None,
            };
            let record = NewPersonnelViolation {
                created_at: None,
                date_of_event: args.date.unwrap_or_else(|| app.store.clock().today()),
                hard_hat_number: args.hard_hat,
                company: args.company,
                trade: args.trade,
                location: args.location,
                violation_type: args.violation_type,
                severity: args.severity,
                description: args.description,
                corrective_action: args.corrective_action,
                evidence_pointer: None,
            };
            let receipt = app
                .submissions
                .submit_personnel(session, record, evidence)
                .await?;
            if let Some(status) = receipt.escalation.as_ref().filter(|s| s.escalate) {
                tracing::warn!(
                    hard_hat = %status.hard_hat_number,
                    total = status.total,
                    recent = status.recent,
                    "Repeat offender: escalate to the safety manager"
                );
            }
            print_json(&receipt)
        }
        PersonnelCommands::List { filters, output } => {
            let records = app
                .store
                .query_personnel(session, &PersonnelFilters::from(filters))
                .await?;
            match output.format {
                Format::Table => {
                    print_personnel_table(&records);
                    Ok(())
                }
                Format::Json if output.links => {
                    let mut linked = Vec::with_capacity(records.len());
                    for record in records {
                        let evidence_link =
                            app.evidence.resolve(record.evidence_pointer.as_deref()).await;
                        linked.push(Linked {
                            record,
                            evidence_link,
                        });
                    }
                    print_json(&linked)
                }
                Format::Json => print_json(&records),
            }
        }
    }
}

async fn run_site(
    app: &AppState,
    session: &AuthorizedSession,
    sub: SiteCommands,
) -> anyhow::Result<()> {
    match sub {
        SiteCommands::Add(args) => {
            let photo = match &args.photo {
                Some(path) => Some(read_evidence(path).await?),
                None => None,
            };
            let record = NewSiteIssue {
                created_at: None,
                date_of_event: args.date.unwrap_or_else(|| app.store.clock().today()),
                company: args.company,
                building: args.building,
                floor: args.floor,
                risk_level: args.risk,
                issue: args.issue,
                photo_pointer: None,
            };
            let receipt = app.submissions.submit_site(session, record, photo).await?;
            print_json(&receipt)
        }
        SiteCommands::List { filters, output } => {
            let issues = app
                .store
                .query_site(session, &SiteFilters::from(filters))
                .await?;
            match output.format {
                Format::Table => {
                    print_site_table(&issues);
                    Ok(())
                }
                Format::Json if output.links => {
                    let mut linked = Vec::with_capacity(issues.len());
                    for record in issues {
                        let evidence_link =
                            app.evidence.resolve(record.photo_pointer.as_deref()).await;
                        linked.push(Linked {
                            record,
                            evidence_link,
                        });
                    }
                    print_json(&linked)
                }
                Format::Json => print_json(&issues),
            }
        }
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    dotenvy::dotenv().ok();
    init_tracing();

    let cli = Cli::parse();
    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            report_error(&err);
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let config = Config::from_env().context("Failed to load configuration")?;
    config.validate()?;

    let app = initialize_services(&config).await?;
    let password = cli
        .password
        .as_deref()
        .context("Password required: pass --password or set SITESAFE_PASSWORD")?;
    let session = app.login(&cli.user, password)?;

    match cli.command {
        Commands::Personnel { sub } => run_personnel(&app, &session, sub).await?,
        Commands::Site { sub } => run_site(&app, &session, sub).await?,
        Commands::Distinct { kind, field } => {
            let field: Field = field.parse()?;
            let values = app.store.distinct(&session, kind.into(), field).await?;
            print_json(&values)?;
        }
        Commands::Evaluate { hard_hat } => {
            let status = app.aggregator.evaluate(&session, &hard_hat).await?;
            print_json(&status)?;
        }
        Commands::Report { start, end, out } => {
            let report = app.reports.compile(&session, start, end).await?;
            let path = out.join(report.filename());
            tokio::fs::write(&path, report.bytes())
                .await
                .with_context(|| format!("Failed to write {}", path.display()))?;
            print_json(&serde_json::json!({
                "filename": report.filename(),
                "path": path.display().to_string(),
                "mime_type": report.mime_type(),
                "size_bytes": report.bytes().len(),
            }))?;
        }
        Commands::Evidence { sub } => match sub {
            EvidenceCommands::Link { pointer } => {
                let link = app.evidence.resolve(Some(&pointer)).await;
                print_json(&serde_json::json!({ "pointer": pointer, "link": link }))?;
            }
        },
    }

    Ok(())
}
