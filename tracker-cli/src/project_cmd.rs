//! Project tracker CLI subcommands.
//!
//! Thin controllers over `tracker-core`: each command resolves the table
//! path, runs one store or query operation and renders the result.
//!
//! ## Commands
//!
//! - `tracker init [--force]`
//! - `tracker list [--owner <OWNER>] [--status <STATUS>] [--json]`
//! - `tracker owners [--json]`
//! - `tracker add --name <NAME> --owner <OWNER> --deadline <DATE> [--status <STATUS>]`
//! - `tracker update-status --name <NAME> --status <STATUS>`
//! - `tracker delete --name <NAME>`
//! - `tracker analytics [--json]`

use std::path::{Path, PathBuf};

use anyhow::Context;
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use tracker_core::query::{self, ALL, Analytics, ProjectFilter};
use tracker_core::{
    FileTable, NewProject, Outcome, ProjectStatus, ProjectStore, StoreError, TrackerConfig,
};

use crate::render;

/// Internal project tracker.
#[derive(Debug, Parser)]
#[command(name = "tracker", version)]
pub struct TrackerCli {
    /// Project table (overrides TRACKER_DATA_FILE and the config file).
    #[arg(long = "file", short = 'f', global = true, value_name = "PATH")]
    pub file: Option<PathBuf>,

    /// Config file (default: ~/.config/project-tracker/tracker.toml).
    #[arg(long = "config", global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: TrackerSubcommand,
}

#[derive(Debug, Subcommand)]
pub enum TrackerSubcommand {
    /// Create an empty project table.
    Init(InitArgs),
    /// List projects with days left until their deadline.
    List(ListArgs),
    /// List distinct project owners.
    Owners(OwnersArgs),
    /// Add a project.
    Add(AddArgs),
    /// Change the status of a project.
    #[command(name = "update-status", alias = "update")]
    UpdateStatus(UpdateStatusArgs),
    /// Delete a project.
    Delete(DeleteArgs),
    /// Status counts and deadlines per week.
    Analytics(AnalyticsArgs),
}

#[derive(Debug, Parser)]
pub struct InitArgs {
    /// Replace an existing table.
    #[arg(long = "force")]
    pub force: bool,
}

#[derive(Debug, Parser)]
pub struct ListArgs {
    /// Only projects of this owner ("All" for every owner).
    #[arg(long = "owner", short = 'o', default_value = ALL)]
    pub owner: String,

    /// Only projects in this status ("All" for every status).
    #[arg(long = "status", short = 's', default_value = ALL)]
    pub status: String,

    /// Output as JSON.
    #[arg(long = "json", short = 'j')]
    pub json: bool,
}

#[derive(Debug, Parser)]
pub struct OwnersArgs {
    /// Output as JSON.
    #[arg(long = "json", short = 'j')]
    pub json: bool,
}

#[derive(Debug, Parser)]
pub struct AddArgs {
    /// Project name.
    #[arg(long = "name", short = 'n')]
    pub name: String,

    /// Project owner.
    #[arg(long = "owner", short = 'o')]
    pub owner: String,

    /// Initial status.
    #[arg(long = "status", short = 's', default_value = "Not Started")]
    pub status: ProjectStatus,

    /// Start date (YYYY-MM-DD).
    #[arg(long = "start", value_name = "DATE")]
    pub start_date: Option<NaiveDate>,

    /// End date (YYYY-MM-DD).
    #[arg(long = "end", value_name = "DATE")]
    pub end_date: Option<NaiveDate>,

    /// Deadline (YYYY-MM-DD).
    #[arg(long = "deadline", short = 'd', value_name = "DATE")]
    pub deadline: NaiveDate,

    /// Output the created record as JSON.
    #[arg(long = "json", short = 'j')]
    pub json: bool,
}

#[derive(Debug, Parser)]
pub struct UpdateStatusArgs {
    /// Project name (exact match; every project with this name is updated).
    #[arg(long = "name", short = 'n')]
    pub name: String,

    /// New status.
    #[arg(long = "status", short = 's')]
    pub status: ProjectStatus,
}

#[derive(Debug, Parser)]
pub struct DeleteArgs {
    /// Project name (exact match; every project with this name is removed).
    #[arg(long = "name", short = 'n')]
    pub name: String,
}

#[derive(Debug, Parser)]
pub struct AnalyticsArgs {
    /// Output as JSON.
    #[arg(long = "json", short = 'j')]
    pub json: bool,
}

// ─────────────────────────────────────────────────────────────────────────────
// Dispatch
// ─────────────────────────────────────────────────────────────────────────────

/// Resolved settings shared by every command.
struct CmdContext {
    data_file: PathBuf,
    due_soon_days: u32,
}

impl CmdContext {
    fn store(&self) -> ProjectStore<FileTable> {
        ProjectStore::new(FileTable::open(&self.data_file))
    }
}

impl TrackerCli {
    pub fn run(&self) -> anyhow::Result<()> {
        let config =
            TrackerConfig::load(self.config.as_deref()).context("failed to load tracker config")?;
        let ctx = CmdContext {
            data_file: config.resolve_data_file(self.file.as_deref()),
            due_soon_days: config.due_soon_days,
        };
        tracing::debug!(path = %ctx.data_file.display(), "using project table");

        match &self.command {
            TrackerSubcommand::Init(args) => cmd_init(&ctx, args),
            TrackerSubcommand::List(args) => cmd_list(&ctx, args),
            TrackerSubcommand::Owners(args) => cmd_owners(&ctx, args),
            TrackerSubcommand::Add(args) => cmd_add(&ctx, args),
            TrackerSubcommand::UpdateStatus(args) => cmd_update_status(&ctx, args),
            TrackerSubcommand::Delete(args) => cmd_delete(&ctx, args),
            TrackerSubcommand::Analytics(args) => cmd_analytics(&ctx, args),
        }
    }
}

fn load_context(path: &Path) -> String {
    format!("failed to read project table {}", path.display())
}

fn print_json<T: serde::Serialize>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

// ─────────────────────────────────────────────────────────────────────────────
// Command implementations
// ─────────────────────────────────────────────────────────────────────────────

fn cmd_init(ctx: &CmdContext, args: &InitArgs) -> anyhow::Result<()> {
    match FileTable::create_empty(&ctx.data_file, args.force) {
        Ok(table) => {
            println!("Created project table at {}", table.path().display());
            Ok(())
        }
        Err(StoreError::AlreadyExists { path }) => anyhow::bail!(
            "project table already exists at {} (use --force to replace it)",
            path.display()
        ),
        Err(err) => Err(anyhow::Error::new(err).context(format!(
            "failed to create project table {}",
            ctx.data_file.display()
        ))),
    }
}

fn cmd_list(ctx: &CmdContext, args: &ListArgs) -> anyhow::Result<()> {
    let filter = ProjectFilter::parse(&args.owner, &args.status)?;
    let store = ctx.store();
    let records = store
        .load()
        .with_context(|| load_context(&ctx.data_file))?;

    let selected = query::filter(&records, &filter);
    let rows = query::rows(&selected, store.today(), ctx.due_soon_days);

    if args.json {
        print_json(&rows)
    } else {
        print!("{}", render::project_table(&rows));
        Ok(())
    }
}

fn cmd_owners(ctx: &CmdContext, args: &OwnersArgs) -> anyhow::Result<()> {
    let records = ctx
        .store()
        .load()
        .with_context(|| load_context(&ctx.data_file))?;
    let owners = query::owners(&records);

    if args.json {
        print_json(&owners)
    } else {
        for owner in &owners {
            println!("{owner}");
        }
        Ok(())
    }
}

fn cmd_add(ctx: &CmdContext, args: &AddArgs) -> anyhow::Result<()> {
    let project = NewProject::new(&args.name, &args.owner, args.deadline)
        .with_status(args.status)
        .with_dates(args.start_date, args.end_date);
    // Reject bad input before the table is read.
    project.validate()?;

    let record = ctx
        .store()
        .add(project)
        .with_context(|| format!("failed to add project to {}", ctx.data_file.display()))?;

    if args.json {
        print_json(&record)
    } else {
        println!(
            "Project added: {} (owner: {}, status: {}, deadline: {})",
            record.name, record.owner, record.status, record.deadline
        );
        Ok(())
    }
}

fn cmd_update_status(ctx: &CmdContext, args: &UpdateStatusArgs) -> anyhow::Result<()> {
    let outcome = ctx
        .store()
        .update_status(&args.name, args.status)
        .with_context(|| format!("failed to update {}", ctx.data_file.display()))?;

    match outcome {
        Outcome::Applied(count) => {
            println!(
                "Status updated: {} -> {}{}",
                args.name,
                args.status,
                plural_suffix(count)
            );
        }
        Outcome::NotFound => eprintln!("Warning: project not found: {}", args.name),
    }
    Ok(())
}

fn cmd_delete(ctx: &CmdContext, args: &DeleteArgs) -> anyhow::Result<()> {
    let outcome = ctx
        .store()
        .delete(&args.name)
        .with_context(|| format!("failed to update {}", ctx.data_file.display()))?;

    match outcome {
        Outcome::Applied(count) => {
            println!("Project deleted: {}{}", args.name, plural_suffix(count));
        }
        Outcome::NotFound => eprintln!("Warning: project not found: {}", args.name),
    }
    Ok(())
}

fn cmd_analytics(ctx: &CmdContext, args: &AnalyticsArgs) -> anyhow::Result<()> {
    let records = ctx
        .store()
        .load()
        .with_context(|| load_context(&ctx.data_file))?;
    let analytics = Analytics::compute(&records);

    if args.json {
        print_json(&analytics)
    } else {
        print!("{}", render::analytics(&analytics));
        Ok(())
    }
}

/// ` (N records)` when a name matched more than one record.
fn plural_suffix(count: usize) -> String {
    if count > 1 {
        format!(" ({count} records)")
    } else {
        String::new()
    }
}
