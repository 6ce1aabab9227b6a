use std::fs;
use std::path::PathBuf;
use std::sync::Arc;

use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand};
use serde::Deserialize;
use tracing::info;

use admission_portal::admission::{
    AddressBook, AddressError, ApplicationDraft, ScoreSet, SubjectCode, ValidationError,
};
use admission_portal::api::applications::{
    AdminApplicationQuery, ApplicationDetail, ApplicationListQuery, PaginatedApplications,
    ReviewDecision,
};
use admission_portal::api::auth::RegisterRequest;
use admission_portal::api::statistics::StatisticsQuery;
use admission_portal::config::{AppConfig, ConfigError};
use admission_portal::session::{FileStorage, Role, SessionError, SessionStore};
use admission_portal::telemetry::{self, TelemetryError};
use admission_portal::{
    AccessGate, AdmissionForm, ApiClient, ApiError, ApplicationStatus, RouteDecision,
    SelectionError,
};

#[derive(Parser, Debug)]
#[command(
    name = "portal",
    about = "University admissions portal from the command line",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Authenticate against the backend and persist the session
    Login {
        username: String,
        password: String,
    },
    /// Drop the local session
    Logout,
    /// Show the currently authenticated user
    Whoami,
    /// Create a candidate account
    Register {
        username: String,
        password: String,
        #[arg(long)]
        email: String,
        #[arg(long)]
        full_name: String,
    },
    /// List the schools open for application
    Schools,
    /// List the majors a school offers
    Majors { school_code: String },
    /// Show one subject combination with its subjects
    Combination { code: String },
    /// Validate a submission file and send the application
    Submit(SubmitArgs),
    /// The candidate's own applications
    Applications {
        #[command(subcommand)]
        command: ApplicationsCommand,
    },
    /// Review and reference-data management (admin role)
    Admin {
        #[command(subcommand)]
        command: AdminCommand,
    },
}

#[derive(Args, Debug)]
struct SubmitArgs {
    /// JSON submission file: personal fields, selections, scores, documents
    file: PathBuf,
    /// Offline province/district/ward dataset
    #[arg(long, default_value = "vietnamAddress.json")]
    addresses: PathBuf,
    /// Validate and print the payload without sending it
    #[arg(long)]
    dry_run: bool,
}

#[derive(Subcommand, Debug)]
enum ApplicationsCommand {
    /// List own applications, newest first
    List(ListArgs),
    /// Show one application by its code
    Show { code: String },
}

#[derive(Args, Debug, Default)]
struct ListArgs {
    #[arg(long, default_value_t = 1)]
    page: u32,
    #[arg(long, default_value_t = 10)]
    limit: u32,
    #[arg(long)]
    search: Option<String>,
    /// pending, approved, or rejected
    #[arg(long, value_parser = parse_status)]
    status: Option<String>,
    /// Earliest submission date (YYYY-MM-DD)
    #[arg(long, value_parser = parse_date)]
    date_from: Option<NaiveDate>,
    /// Latest submission date (YYYY-MM-DD)
    #[arg(long, value_parser = parse_date)]
    date_to: Option<NaiveDate>,
}

#[derive(Subcommand, Debug)]
enum AdminCommand {
    /// List applications across all candidates
    Applications(AdminListArgs),
    /// Show one application by its code
    Show { code: String },
    /// Approve or reject a pending application
    Review {
        code: String,
        #[arg(long, conflicts_with = "reject")]
        approve: bool,
        #[arg(long)]
        reject: bool,
    },
    /// Application counts by status, school, major, and subject group
    Stats {
        #[arg(long, value_parser = parse_date)]
        date_from: Option<NaiveDate>,
        #[arg(long, value_parser = parse_date)]
        date_to: Option<NaiveDate>,
    },
    /// List the school/major hierarchy
    Schools {
        #[arg(long)]
        search: Option<String>,
    },
}

#[derive(Args, Debug, Default)]
struct AdminListArgs {
    #[command(flatten)]
    base: ListArgs,
    #[arg(long)]
    school_code: Option<String>,
    #[arg(long)]
    major_code: Option<String>,
    #[arg(long)]
    subject_group: Option<String>,
}

/// Everything the candidate provides for one submission, in one JSON file.
/// Selections are resolved through the cascade so only offered codes pass.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SubmissionFile {
    #[serde(flatten)]
    draft: ApplicationDraft,
    province: String,
    district: String,
    ward: String,
    address_detail: String,
    school: String,
    major: String,
    subject_group: String,
    #[serde(default)]
    scores: ScoreSet,
}

#[derive(Debug, thiserror::Error)]
enum CliError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Telemetry(#[from] TelemetryError),
    #[error(transparent)]
    Api(#[from] ApiError),
    #[error(transparent)]
    Session(#[from] SessionError),
    #[error(transparent)]
    Selection(#[from] SelectionError),
    #[error(transparent)]
    Address(#[from] AddressError),
    #[error("failed to read submission file: {0}")]
    Io(#[from] std::io::Error),
    #[error("submission file is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("{}", render_validation(.0))]
    Validation(Vec<ValidationError>),
    #[error("not logged in; run `portal login` first")]
    LoginRequired,
    #[error("the current user's role does not allow this command")]
    Forbidden,
    #[error("pass exactly one of --approve or --reject")]
    AmbiguousDecision,
}

fn render_validation(errors: &[ValidationError]) -> String {
    let mut out = String::from("the submission is incomplete:");
    for error in errors {
        out.push_str("\n  - ");
        out.push_str(&error.to_string());
    }
    out
}

fn parse_date(raw: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d")
        .map_err(|err| format!("failed to parse '{raw}' as YYYY-MM-DD ({err})"))
}

/// Accepts the stable status codes and hands the backend the display string
/// it filters on.
fn parse_status(raw: &str) -> Result<String, String> {
    let status = match raw.trim().to_ascii_lowercase().as_str() {
        "pending" => ApplicationStatus::Pending,
        "approved" => ApplicationStatus::Approved,
        "rejected" => ApplicationStatus::Rejected,
        other => return Err(format!("unknown status '{other}' (pending/approved/rejected)")),
    };
    Ok(status.display_name().to_string())
}

#[tokio::main]
async fn main() {
    if let Err(err) = run_cli().await {
        eprintln!("application error: {err}");
        std::process::exit(1);
    }
}

struct Portal {
    client: Arc<ApiClient<FileStorage>>,
    gate: AccessGate<FileStorage>,
}

fn portal() -> Result<Portal, CliError> {
    let config = AppConfig::load()?;
    telemetry::init(&config.telemetry)?;

    let store = Arc::new(SessionStore::new(FileStorage::new(&config.session.path)));
    let client = Arc::new(ApiClient::new(&config.backend, Arc::clone(&store))?);
    let gate = AccessGate::new(store);
    Ok(Portal { client, gate })
}

impl Portal {
    fn require(&self, roles: &[Role], route: &str) -> Result<(), CliError> {
        match self.gate.evaluate(roles, route) {
            RouteDecision::Grant => Ok(()),
            RouteDecision::RedirectToLogin { from: Some(_) } => Err(CliError::LoginRequired),
            RouteDecision::RedirectToLogin { from: None } => Err(CliError::Forbidden),
        }
    }
}

async fn run_cli() -> Result<(), CliError> {
    let cli = Cli::parse();
    let portal = portal()?;

    match cli.command {
        Command::Login { username, password } => {
            let response = portal.client.login(&username, &password).await?;
            println!(
                "Logged in as {} ({})",
                response.user.username,
                response.user.role.label()
            );
            println!("Landing route: {}", response.user.role.home_route());
        }
        Command::Logout => {
            portal.client.logout()?;
            println!("Session cleared");
        }
        Command::Whoami => {
            portal.require(&[Role::Candidate, Role::Admin], "/profile")?;
            let user = portal.client.current_user().await?;
            println!("{} ({})", user.username, user.role.label());
            if let Some(full_name) = user.full_name {
                println!("Name: {full_name}");
            }
            if let Some(email) = user.email {
                println!("Email: {email}");
            }
        }
        Command::Register {
            username,
            password,
            email,
            full_name,
        } => {
            let response = portal
                .client
                .register(&RegisterRequest {
                    username,
                    password,
                    email,
                    full_name,
                })
                .await?;
            println!("{}", response.msg.unwrap_or_else(|| "Account created".to_string()));
        }
        Command::Schools => {
            let schools = portal.client.list_schools().await?;
            for school in schools {
                println!("{}  {}", school.code, school.name);
            }
        }
        Command::Majors { school_code } => {
            let majors = ApiClient::majors_for_school(&portal.client, &school_code).await?;
            for major in majors {
                println!(
                    "{}  {} (groups: {})",
                    major.code,
                    major.name,
                    major.subject_group_ids.join(", ")
                );
            }
        }
        Command::Combination { code } => {
            let combination = ApiClient::subject_combination(&portal.client, &code).await?;
            println!("{}  {}", combination.code, combination.name);
            for subject in combination.subjects {
                println!("  - {} ({})", subject.display_name, subject.code);
            }
        }
        Command::Submit(args) => {
            portal.require(&[Role::Candidate], "/applications/new")?;
            run_submit(&portal, args).await?;
        }
        Command::Applications { command } => {
            portal.require(&[Role::Candidate], "/applications")?;
            match command {
                ApplicationsCommand::List(args) => {
                    let query = ApplicationListQuery {
                        page: args.page,
                        limit: args.limit,
                        search: args.search,
                        status: args.status,
                        date_from: args.date_from,
                        date_to: args.date_to,
                    };
                    let page = portal.client.my_applications(&query).await?;
                    render_application_page(&page);
                }
                ApplicationsCommand::Show { code } => {
                    let detail = portal.client.my_application_detail(&code).await?;
                    render_application_detail(&detail);
                }
            }
        }
        Command::Admin { command } => {
            portal.require(&[Role::Admin], "/admin/dashboard")?;
            run_admin(&portal, command).await?;
        }
    }

    Ok(())
}

async fn run_submit(portal: &Portal, args: SubmitArgs) -> Result<(), CliError> {
    let raw = fs::read_to_string(&args.file)?;
    let submission: SubmissionFile = serde_json::from_str(&raw)?;
    let addresses = AddressBook::from_path(&args.addresses)?;

    // Replay the selections through the cascade: anything the selectors
    // would not offer is rejected here, exactly as in the form.
    let form = AdmissionForm::new(Arc::clone(&portal.client), addresses);
    form.select_province(Some(&submission.province))?;
    form.select_district(Some(&submission.district))?;
    form.select_ward(Some(&submission.ward))?;
    form.set_address_detail(&submission.address_detail);
    form.select_school(Some(&submission.school)).await?;
    form.select_major(Some(&submission.major)).await?;
    for subject in SubjectCode::ALL {
        form.set_score(subject, submission.scores.get(subject))?;
    }
    form.select_combination(Some(&submission.subject_group))?;

    let snapshot = form.snapshot();
    let payload = submission
        .draft
        .into_payload(&snapshot)
        .map_err(CliError::Validation)?;

    if args.dry_run {
        println!("{}", serde_json::to_string_pretty(&payload)?);
        return Ok(());
    }

    let response = portal.client.submit_application(&payload).await?;
    info!(
        school = payload.school,
        major = payload.major,
        "application submitted"
    );
    if let Some(code) = response.application_code {
        println!("Submitted: {code}");
    } else {
        println!("{}", response.message.unwrap_or_else(|| "Submitted".to_string()));
    }
    Ok(())
}

async fn run_admin(portal: &Portal, command: AdminCommand) -> Result<(), CliError> {
    match command {
        AdminCommand::Applications(args) => {
            let query = AdminApplicationQuery {
                page: args.base.page,
                limit: args.base.limit,
                search: args.base.search,
                status: args.base.status,
                date_from: args.base.date_from,
                date_to: args.base.date_to,
                school_code: args.school_code,
                major_code: args.major_code,
                subject_group: args.subject_group,
            };
            let page = portal.client.admin_applications(&query).await?;
            render_application_page(&page);
        }
        AdminCommand::Show { code } => {
            let detail = portal.client.admin_application_detail(&code).await?;
            render_application_detail(&detail);
        }
        AdminCommand::Review {
            code,
            approve,
            reject,
        } => {
            let decision = match (approve, reject) {
                (true, false) => ReviewDecision::Approve,
                (false, true) => ReviewDecision::Reject,
                _ => return Err(CliError::AmbiguousDecision),
            };
            portal
                .client
                .update_application_status(&code, decision)
                .await?;
            println!("{code}: {}", decision.status().display_name());
        }
        AdminCommand::Stats { date_from, date_to } => {
            let overview = portal
                .client
                .overview_statistics(&StatisticsQuery { date_from, date_to })
                .await?;
            println!("Total applications: {}", overview.total_applications);

            println!("\nBy status");
            for item in &overview.by_status {
                println!("- {}: {}", item.id.as_deref().unwrap_or("(none)"), item.count);
            }
            println!("\nBy school");
            for item in &overview.by_school {
                println!("- {} ({}): {}", item.name, item.id, item.count);
            }
            println!("\nBy major");
            for item in &overview.by_major {
                println!("- {}: {}", item.id.as_deref().unwrap_or("(none)"), item.count);
            }
            println!("\nBy subject group");
            for item in &overview.by_subject_group {
                println!("- {}: {}", item.id.as_deref().unwrap_or("(none)"), item.count);
            }
        }
        AdminCommand::Schools { search } => {
            let schools = portal.client.admin_schools(search.as_deref()).await?;
            for school in schools {
                println!("{}  {}", school.code, school.name);
                for major in &school.majors {
                    println!(
                        "  - {}  {} (groups: {})",
                        major.code,
                        major.name,
                        major.subject_group_ids.join(", ")
                    );
                }
            }
        }
    }
    Ok(())
}

fn render_application_page(page: &PaginatedApplications) {
    for item in &page.applications {
        println!(
            "{}  {}  {}  {}  {}",
            item.application_code,
            item.status,
            item.fullname,
            item.school_name.as_deref().unwrap_or("-"),
            item.total_score
                .map(|total| format!("{total:.2}"))
                .unwrap_or_else(|| "-".to_string()),
        );
    }
    println!(
        "\nPage {}/{} ({} records)",
        page.pagination.current_page, page.pagination.total_pages, page.pagination.total_records
    );
}

fn render_application_detail(detail: &ApplicationDetail) {
    println!("{}  [{}]", detail.application_code, detail.status.display_name);
    println!("Candidate: {} ({}, born {})", detail.fullname, detail.gender, detail.dob);
    println!("ID number: {}", detail.id_number);
    println!(
        "Address: {}, {}, {}, {}",
        detail.address_detail, detail.ward, detail.district, detail.province
    );
    println!(
        "Applied to: {} / {} (group {})",
        detail.school_name.as_deref().unwrap_or(&detail.school),
        detail.major_name.as_deref().unwrap_or(&detail.major),
        detail.subject_group
    );
    println!(
        "Scores: math {}, literature {}, english {}",
        detail.math_score, detail.literature_score, detail.english_score
    );
    let optional = [
        ("physics", detail.physics_score),
        ("chemistry", detail.chemistry_score),
        ("biology", detail.biology_score),
        ("history", detail.history_score),
        ("geography", detail.geography_score),
        ("civic education", detail.civic_education_score),
    ];
    for (label, score) in optional {
        if let Some(score) = score {
            println!("        {label} {score}");
        }
    }
    println!("Total: {:.2}", detail.total_score);
    if let Some(priority) = &detail.priority {
        println!("Priority: {priority}");
    }
    println!(
        "Documents: CCCD front/back, {} transcript page(s), {} extra",
        detail.transcript.len(),
        detail.extra_documents.len()
    );
    if let Some(created_at) = &detail.created_at {
        println!("Submitted: {created_at}");
    }
}
