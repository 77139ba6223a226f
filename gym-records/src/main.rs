//! gym-records - front-desk command line for the member store
//!
//! Resolves the root folder (CLI, `GYM_ROOT_FOLDER`, config file, OS
//! default), opens the document store and the ledger database, then runs
//! one subcommand.

use std::path::{Path, PathBuf};

use anyhow::{anyhow, Context, Result};
use chrono::{Datelike, NaiveDate};
use clap::{Parser, Subcommand};
use gym_common::config::{self, GymConfig, StorageLayout};
use gym_common::db;
use gym_common::time;
use gym_common::{MemberRecord, Package, Status};
use gym_records::access::{SearchOutcome, Viewer};
use gym_records::photos::FolderPhotoStore;
use gym_records::workflow::{default_renewal_start, RenewalRequest};
use gym_records::{analytics, reports, FolderStore, RecordService};
use serde::Serialize;
use sqlx::SqlitePool;
use tracing::info;

/// Command-line arguments for gym-records
#[derive(Parser, Debug)]
#[command(name = "gym-records")]
#[command(about = "Gym membership records on a folder tree")]
#[command(version)]
struct Args {
    /// Root folder holding records, photos and the ledger database
    #[arg(short, long, global = true, env = config::ROOT_FOLDER_ENV)]
    root_folder: Option<PathBuf>,

    /// Config file (defaults to the per-user config location)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Print results as JSON
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Create the folder layout and database, and remember the root folder
    Init,
    /// Register a member (a new document; re-admission if one exists that day)
    Save(SaveArgs),
    /// Latest record for an id
    Show { id: String },
    /// Search by id fragment or name
    Search {
        query: String,
        /// Viewer role: admin or user
        #[arg(long, default_value = "admin")]
        role: String,
        /// Gender a restricted viewer is bound to
        #[arg(long)]
        gender: Option<String>,
    },
    /// Members whose latest record has this status
    Status { status: Status },
    /// Every pending registration
    Pending,
    /// Approve a pending member
    Approve { id: String },
    /// Reject a pending member, deleting their folders
    Reject { id: String },
    /// Ban a member
    Ban { id: String },
    /// Start a new membership term
    Renew {
        id: String,
        #[arg(long)]
        months: u32,
        /// Term start (YYYY-MM-DD); defaults to the day after expiry, or today
        #[arg(long)]
        start: Option<NaiveDate>,
        #[arg(long)]
        package: Option<Package>,
        /// Staff member recorded in the fee ledger
        #[arg(long)]
        staff: Option<String>,
    },
    /// Delete every folder of a member, including history
    Delete { id: String },
    /// Monthly registration log
    Monthly {
        #[arg(long)]
        year: Option<i32>,
        /// Month number or name
        #[arg(long)]
        month: Option<String>,
    },
    /// Joiners of one day (YYYY-MM-DD, defaults to today)
    Brief { date: Option<NaiveDate> },
    /// Record a visit and show the member's card
    CheckIn { id: String },
    /// Busiest check-in hour
    Peak,
    /// Churn risk of a member
    Churn { id: String },
    /// Fee ledger, newest first
    Fees,
    /// Recent check-ins, newest first
    Attendance {
        #[arg(long, default_value_t = 20)]
        limit: i64,
    },
}

#[derive(clap::Args, Debug)]
struct SaveArgs {
    #[arg(long)]
    id: String,
    #[arg(long)]
    name: String,
    #[arg(long, default_value = "")]
    phone: String,
    #[arg(long, default_value = "")]
    blood: String,
    #[arg(long, default_value = "")]
    gender: String,
    #[arg(long, default_value = "")]
    cnic: String,
    /// Join date (YYYY-MM-DD), defaults to today
    #[arg(long)]
    join_date: Option<NaiveDate>,
    #[arg(long, default_value_t = 1)]
    months: u32,
    #[arg(long, default_value = "Bronze")]
    package: Package,
    #[arg(long, default_value = "Pending")]
    status: Status,
    /// Photo to copy into the photo store
    #[arg(long)]
    photo: Option<PathBuf>,
}

struct App {
    config: GymConfig,
    config_path: Option<PathBuf>,
    layout: StorageLayout,
    service: RecordService,
    json: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let config_path = args.config.clone().or_else(config::default_config_path);
    let config = GymConfig::load_or_default(config_path.as_deref());

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&config.logging.level)),
        )
        .with_writer(std::io::stderr)
        .init();

    info!(
        "Starting gym-records v{} [{}] built {} ({})",
        env!("CARGO_PKG_VERSION"),
        env!("GIT_HASH"),
        env!("BUILD_TIMESTAMP"),
        env!("BUILD_PROFILE")
    );

    let root = config::resolve_root_folder(args.root_folder.as_deref(), &config);
    let layout = StorageLayout::new(root);
    info!("Root folder: {}", layout.root.display());

    let store = FolderStore::open(&layout, &config)
        .with_context(|| format!("Failed to open record store at {}", layout.root.display()))?;

    let app = App {
        config,
        config_path,
        layout,
        service: RecordService::new(store),
        json: args.json,
    };

    app.run(args.command).await
}

impl App {
    async fn run(&self, command: Command) -> Result<()> {
        match command {
            Command::Init => self.init().await,
            Command::Save(save) => self.save(save).await,
            Command::Show { id } => {
                let record = self.require(&id).await?;
                self.emit(&record, || render_card(&record))
            }
            Command::Search {
                query,
                role,
                gender,
            } => {
                let result = self.service.search(&query).await?;
                let outcome = Viewer::from_role(&role, gender).apply(result);
                self.emit(&outcome, || render_search(&outcome))
            }
            Command::Status { status } => {
                let docs = self.service.list_by_status(status).await?;
                let records: Vec<&MemberRecord> = docs.iter().map(|d| &d.record).collect();
                self.emit(&records, || reports::render_status_list(&docs))
            }
            Command::Pending => {
                let pending = self.service.list_pending().await?;
                self.emit(&pending, || reports::render_pending(&pending))
            }
            Command::Approve { id } => {
                let t = self.service.approve(&id).await?;
                self.emit(&t, || format!("Member {} approved", t.member_id))
            }
            Command::Reject { id } => {
                self.service.reject(&id).await?;
                self.emit(&id, || format!("Member {} rejected and removed", id.trim()))
            }
            Command::Ban { id } => {
                let t = self.service.ban(&id).await?;
                self.emit(&t, || format!("Member {} banned", t.member_id))
            }
            Command::Renew {
                id,
                months,
                start,
                package,
                staff,
            } => self.renew(&id, months, start, package, staff).await,
            Command::Delete { id } => {
                let deleted = self.service.delete(&id).await?;
                if !deleted {
                    return Err(anyhow!("No folders found for member {}", id.trim()));
                }
                self.emit(&id, || format!("Member {} deleted", id.trim()))
            }
            Command::Monthly { year, month } => {
                let today = time::today();
                let year = year.unwrap_or(today.year());
                let month = match month {
                    Some(m) => parse_month(&m)?,
                    None => today.month(),
                };
                let lines = self.service.monthly_list(year, month).await?;
                self.emit(&lines, || reports::render_monthly_list(&lines))
            }
            Command::Brief { date } => {
                let brief = self.service.daily_brief(date.unwrap_or_else(time::today)).await?;
                self.emit(&brief, || brief.render())
            }
            Command::CheckIn { id } => self.check_in(&id).await,
            Command::Peak => {
                let pool = self.ledger().await?;
                let peak = analytics::ledger_peak_hours(&pool).await?;
                self.emit(&peak, || peak.to_string())
            }
            Command::Churn { id } => {
                let pool = self.ledger().await?;
                let risk = analytics::ledger_churn_risk(&pool, &id).await?;
                self.emit(&risk, || format!("{}: {}", id.trim(), risk))
            }
            Command::Fees => {
                let pool = self.ledger().await?;
                let entries = db::fee_logs(&pool).await?;
                self.emit(&entries, || {
                    entries
                        .iter()
                        .map(|e| {
                            format!(
                                "{} — {} renewed {} for {} month(s)",
                                e.timestamp, e.staff_name, e.member_id, e.months_added
                            )
                        })
                        .collect::<Vec<_>>()
                        .join("\n")
                })
            }
            Command::Attendance { limit } => {
                let pool = self.ledger().await?;
                let events = db::recent_attendance(&pool, limit).await?;
                self.emit(&events, || {
                    events
                        .iter()
                        .map(|e| format!("{} — {}", e.check_in_time, e.member_id))
                        .collect::<Vec<_>>()
                        .join("\n")
                })
            }
        }
    }

    async fn init(&self) -> Result<()> {
        self.layout.ensure_directories()?;
        self.ledger().await?;

        if let Some(path) = &self.config_path {
            let mut config = self.config.clone();
            config.root_folder = Some(self.layout.root.clone());
            config
                .save(path)
                .with_context(|| format!("Failed to write config {}", path.display()))?;
            info!("Saved root folder to {}", path.display());
        }

        let root = self.layout.root.display().to_string();
        self.emit(&root, || format!("Initialized gym data at {}", root))
    }

    async fn save(&self, args: SaveArgs) -> Result<()> {
        let join_date = args.join_date.unwrap_or_else(time::today);
        let mut record = MemberRecord::new(args.id.trim(), args.name, join_date)
            .with_membership(args.months, args.package, args.status)?;
        record.phone = args.phone;
        record.blood_type = args.blood;
        record.gender = args.gender;
        record.national_id = args.cnic;

        if let Some(photo) = &args.photo {
            let photos = FolderPhotoStore::new(self.layout.photos_dir.clone());
            record.photo_path = Some(
                photos
                    .import(&record.id, photo)
                    .with_context(|| format!("Failed to import photo {}", photo.display()))?,
            );
        }

        let location = self.service.save(record).await?;
        let shown = location.display().to_string();
        self.emit(&location, || format!("Saved to {}", shown))
    }

    async fn renew(
        &self,
        id: &str,
        months: u32,
        start: Option<NaiveDate>,
        package: Option<Package>,
        staff: Option<String>,
    ) -> Result<()> {
        let start_date = match start {
            Some(date) => date,
            None => {
                let current = self.require(id).await?;
                default_renewal_start(current.end_date, time::today())
            }
        };

        let request = RenewalRequest {
            start_date,
            months,
            package,
        };
        let transition = self.service.renew(id, request).await?;

        let pool = self.ledger().await?;
        let staff = staff.unwrap_or_else(|| self.config.creator.clone());
        db::log_fee_update(&pool, &staff, &transition.member_id, months).await?;

        let end = transition
            .record
            .end_date
            .map(|d| d.to_string())
            .unwrap_or_else(|| "N/A".to_string());
        self.emit(&transition, || {
            format!("Member {} renewed until {}", transition.member_id, end)
        })
    }

    async fn check_in(&self, id: &str) -> Result<()> {
        let record = self.require(id).await?;

        let pool = self.ledger().await?;
        db::mark_attendance(&pool, &record.id).await?;
        let peak = analytics::ledger_peak_hours(&pool).await?;

        #[derive(Serialize)]
        struct CheckIn<'a> {
            record: &'a MemberRecord,
            effective_status: Option<Status>,
            peak: analytics::PeakHours,
        }

        let today = time::today();
        let effective_status = record.effective_status(today);
        let report = CheckIn {
            record: &record,
            effective_status,
            peak,
        };
        self.emit(&report, || {
            format!(
                "{}\nCheck-in status: {}\n{}",
                render_card(&record),
                record.effective_status_label(today),
                peak
            )
        })
    }

    async fn require(&self, id: &str) -> Result<MemberRecord> {
        self.service
            .get_latest(id)
            .await?
            .ok_or_else(|| anyhow!("Member {} not found", id.trim()))
    }

    async fn ledger(&self) -> Result<SqlitePool> {
        let path = &self.layout.database_path;
        db::init_database(path)
            .await
            .with_context(|| format!("Failed to open ledger database {}", path.display()))
    }

    fn emit<T: Serialize>(&self, value: &T, text: impl FnOnce() -> String) -> Result<()> {
        if self.json {
            println!("{}", serde_json::to_string_pretty(value)?);
        } else {
            println!("{}", text());
        }
        Ok(())
    }
}

fn parse_month(value: &str) -> Result<u32> {
    if let Ok(n) = value.trim().parse::<u32>() {
        if (1..=12).contains(&n) {
            return Ok(n);
        }
    }
    time::month_number(value).ok_or_else(|| anyhow!("Unknown month '{}'", value))
}

fn render_card(record: &MemberRecord) -> String {
    let date = |d: Option<NaiveDate>| d.map(|d| d.to_string()).unwrap_or_else(|| "-".to_string());
    let photo = record
        .photo_path
        .as_deref()
        .map(Path::display)
        .map(|p| p.to_string())
        .unwrap_or_else(|| "No Photo".to_string());
    [
        format!("{} ({})", record.name, record.id),
        format!("Phone: {}", record.phone),
        format!("Gender: {}", record.gender),
        format!(
            "Package: {}",
            record.package.map(|p| p.as_str()).unwrap_or("Bronze")
        ),
        format!("Joined: {}", date(record.join_date)),
        match record.end_date {
            Some(end) => format!(
                "Expires: {} ({} days left)",
                end,
                time::days_until(end, time::today())
            ),
            None => "Expires: -".to_string(),
        },
        format!("Status: {}", record.status_label()),
        format!("Photo: {}", photo),
    ]
    .join("\n")
}

fn render_search(outcome: &SearchOutcome) -> String {
    let result = match outcome {
        SearchOutcome::AccessDenied => return "Access denied".to_string(),
        SearchOutcome::Visible(result) if result.is_empty() => {
            return "No matching member found".to_string()
        }
        SearchOutcome::Visible(result) => result,
    };

    let mut lines = Vec::new();
    if let Some(best) = &result.best {
        lines.push(render_card(best));
        lines.push(String::new());
    }
    lines.push(format!("{} matching document(s):", result.matches.len()));
    lines.extend(result.matches.iter().map(|p| format!("  {}", p.display())));
    lines.join("\n")
}
