//! Subcommands

mod attendance;
mod ministry;

use anyhow::{Context, Result};
use chrono::NaiveDate;
use clap::Subcommand;
use mdash_admin::ApiClient;
use mdash_common::config::SettingsResolver;
use mdash_common::models::SubmissionStatus;

pub use ministry::{EvangelismCommand, FollowUpCommand, GradeCommand, PrayerCommand};

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Log in and store the session token
    Login {
        #[arg(long)]
        email: String,

        #[arg(long, env = "MDASH_PASSWORD", hide_env_values = true)]
        password: String,
    },

    /// Forget the stored session
    Logout,

    /// List attendance submissions
    Submissions {
        /// Only show submissions with this status (pending, approved, rejected)
        #[arg(long)]
        status: Option<SubmissionStatus>,
    },

    /// Show one submission with its attendee ids
    Show { id: String },

    /// List meetings attendance can be filed against
    Meetings,

    /// File an attendance report for a meeting
    ///
    /// Participants are matched to membership records by name. The report
    /// starts out pending.
    File {
        /// Meeting id
        meeting: String,

        /// Meeting date, YYYY-MM-DD (default: the meeting's date)
        #[arg(long)]
        date: Option<NaiveDate>,

        /// Worker who took attendance (default: the logged-in user)
        #[arg(long = "worker")]
        workers: Vec<String>,

        #[arg(long = "participant")]
        participants: Vec<String>,

        #[arg(long = "first-timer")]
        first_timers: Vec<String>,
    },

    /// Approve some or all attendees of a pending submission
    ///
    /// Attendees may be given by id or by name. Anyone not approved stays
    /// pending under the original submission.
    Review {
        id: String,

        #[arg(long = "participant")]
        participants: Vec<String>,

        #[arg(long = "first-timer")]
        first_timers: Vec<String>,

        /// Approve everyone
        #[arg(long, conflicts_with_all = ["participants", "first_timers"])]
        all: bool,
    },

    /// Reject a whole pending submission
    Reject { id: String },

    /// Per-unit breakdown of a submission
    Breakdown {
        id: String,

        /// Use the hashed demo assignment instead of membership records
        #[arg(long)]
        demo_units: bool,
    },

    /// Per-meeting attendance totals
    Summary,

    /// Evangelism contacts
    #[command(subcommand)]
    Evangelism(EvangelismCommand),

    /// Follow-ups of evangelism contacts
    #[command(subcommand)]
    FollowUps(FollowUpCommand),

    /// Study-group assignment grading
    #[command(subcommand)]
    Grades(GradeCommand),

    /// Prayer-group sessions
    #[command(subcommand)]
    Prayer(PrayerCommand),
}

pub async fn run(command: Command, client: &ApiClient, resolver: &SettingsResolver) -> Result<()> {
    match command {
        Command::Login { email, password } => {
            let login = client
                .login(&email, &password)
                .await
                .context("Login failed")?;
            println!("Logged in as {}", login.user.name);
            Ok(())
        }
        Command::Logout => {
            client.logout()?;
            println!("Logged out");
            Ok(())
        }
        Command::Submissions { status } => attendance::list(client, status).await,
        Command::Show { id } => attendance::show(client, &id).await,
        Command::Meetings => attendance::meetings(client).await,
        Command::File {
            meeting,
            date,
            workers,
            participants,
            first_timers,
        } => {
            let report = attendance::Report {
                meeting_id: &meeting,
                date,
                workers: &workers,
                participants: &participants,
                first_timers: &first_timers,
            };
            attendance::file(client, report).await
        }
        Command::Review {
            id,
            participants,
            first_timers,
            all,
        } => attendance::review(client, &id, &participants, &first_timers, all).await,
        Command::Reject { id } => attendance::reject(client, &id).await,
        Command::Breakdown { id, demo_units } => {
            attendance::breakdown(client, &id, demo_units, &resolver.toml().units).await
        }
        Command::Summary => attendance::summary(client).await,
        Command::Evangelism(cmd) => ministry::evangelism(client, cmd).await,
        Command::FollowUps(cmd) => ministry::follow_ups(client, cmd).await,
        Command::Grades(cmd) => ministry::grades(client, cmd).await,
        Command::Prayer(cmd) => ministry::prayer(client, cmd).await,
    }
}

/// Name of the logged-in user, for fields that record who acted
fn current_user(client: &ApiClient) -> Result<Option<String>> {
    let credentials = client.credentials().load()?;
    Ok(credentials.and_then(|c| c.user).map(|u| u.name))
}
