mod render;

use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Arc;

use chrono::Utc;
use clap::{Parser, Subcommand, ValueEnum};
use tracing::info;
use uuid::Uuid;

use bono_api::admin::{self, admin_overview};
use bono_api::auth::{self, require_admin};
use bono_api::dashboard::dashboard;
use bono_api::registration::register;
use bono_api::validation::check_field;
use bono_api::SqliteState;
use bono_db::Database;
use bono_types::api::{FieldId, RegisterRequest};
use bono_types::models::ApplicationStatus;

use crate::render::Output;

#[derive(Parser)]
#[command(name = "bono", about = "Bono Navideño 5K registration and review")]
struct Args {
    #[arg(long, env = "BONO_DB_PATH", default_value = "bono.db", help = "SQLite database file")]
    db_path: PathBuf,

    #[arg(long, global = true, help = "Print JSON instead of text")]
    json: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Submit the registration form
    Register(RegisterArgs),
    /// Start a session
    Login { username: String, password: String },
    /// End the current session
    Logout,
    /// Show the dashboard for the logged-in user
    Dashboard,
    /// Validate a single field value
    Check {
        #[arg(value_enum)]
        field: FieldArg,
        value: String,
        #[arg(long, help = "Password to compare against when checking a confirmation")]
        password: Option<String>,
    },
    /// Review applications (administrators only)
    #[command(subcommand)]
    Admin(AdminCommand),
}

#[derive(clap::Args)]
struct RegisterArgs {
    #[arg(long, default_value_t)]
    first_name: String,
    #[arg(long, default_value_t)]
    last_name: String,
    #[arg(long, default_value_t, help = "XXX-XXXXXXX-X")]
    cedula: String,
    #[arg(long, default_value_t)]
    email: String,
    #[arg(long, default_value_t, help = "809/829/849-XXX-XXXX")]
    phone: String,
    #[arg(long, default_value_t)]
    password: String,
    #[arg(long, default_value_t)]
    confirm_password: String,
    #[arg(long, help = "Accept the program terms and conditions")]
    accept_terms: bool,
}

impl From<RegisterArgs> for RegisterRequest {
    fn from(args: RegisterArgs) -> Self {
        RegisterRequest {
            first_name: args.first_name,
            last_name: args.last_name,
            cedula: args.cedula,
            email: args.email,
            phone: args.phone,
            password: args.password,
            confirm_password: args.confirm_password,
            terms_accepted: args.accept_terms,
        }
    }
}

#[derive(Subcommand)]
enum AdminCommand {
    /// List every application with totals
    List,
    /// Approve an application
    Approve { id: Uuid },
    /// Reject an application
    Reject { id: Uuid },
    /// Move an application to any review state
    SetStatus { id: Uuid, status: ApplicationStatus },
}

#[derive(Clone, Copy, ValueEnum)]
enum FieldArg {
    FirstName,
    LastName,
    Cedula,
    Email,
    Phone,
    Password,
    ConfirmPassword,
}

impl From<FieldArg> for FieldId {
    fn from(arg: FieldArg) -> Self {
        match arg {
            FieldArg::FirstName => FieldId::FirstName,
            FieldArg::LastName => FieldId::LastName,
            FieldArg::Cedula => FieldId::Cedula,
            FieldArg::Email => FieldId::Email,
            FieldArg::Phone => FieldId::Phone,
            FieldArg::Password => FieldId::Password,
            FieldArg::ConfirmPassword => FieldId::ConfirmPassword,
        }
    }
}

fn main() -> anyhow::Result<ExitCode> {
    // Load .env if present
    let _ = dotenvy::dotenv();

    // Init logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "bono=info,bono_api=info,bono_db=info".into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    let out = Output::new(args.json);

    match args.command {
        // Field checks never touch storage
        Command::Check { field, value, password } => {
            let error = check_field(field.into(), &value, password.as_deref());
            let ok = error.is_none();
            out.field_check(error)?;
            if !ok {
                return Ok(ExitCode::FAILURE);
            }
        }
        Command::Register(form) => {
            let mut state = open_state(&args.db_path)?;
            let outcome = register(&mut state.records, form.into(), Utc::now())?;
            let registered = outcome.is_registered();
            out.registration(&outcome)?;
            if !registered {
                return Ok(ExitCode::FAILURE);
            }
        }
        Command::Login { username, password } => {
            let state = open_state(&args.db_path)?;
            let user = auth::login(&state, &username, &password)?;
            info!("Logged in as '{}'", user.username);
            out.logged_in(&user)?;
        }
        Command::Logout => {
            let state = open_state(&args.db_path)?;
            auth::logout(&state)?;
            out.message("Sesión cerrada")?;
        }
        Command::Dashboard => {
            let state = open_state(&args.db_path)?;
            out.dashboard(&dashboard(&state)?)?;
        }
        Command::Admin(cmd) => {
            let mut state = open_state(&args.db_path)?;
            let actor = require_admin(&state)?;
            match cmd {
                AdminCommand::List => out.admin_overview(&admin_overview(&state.records))?,
                AdminCommand::Approve { id } => {
                    let app = admin::approve_application(&mut state.records, &actor, id)?;
                    out.status_changed(&app, "✅ Solicitud aprobada exitosamente")?;
                }
                AdminCommand::Reject { id } => {
                    let app = admin::reject_application(&mut state.records, &actor, id)?;
                    out.status_changed(&app, "❌ Solicitud rechazada")?;
                }
                AdminCommand::SetStatus { id, status } => {
                    let app = admin::set_application_status(&mut state.records, &actor, id, status)?;
                    out.status_changed(&app, "Estado actualizado")?;
                }
            }
        }
    }

    Ok(ExitCode::SUCCESS)
}

fn open_state(db_path: &Path) -> anyhow::Result<SqliteState> {
    let db = Arc::new(Database::open(db_path)?);
    Ok(SqliteState::open(db)?)
}
