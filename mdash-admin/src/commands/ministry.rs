//! Evangelism, follow-up, study-group and prayer-group commands

use anyhow::{Context, Result};
use chrono::NaiveDate;
use clap::Subcommand;
use mdash_admin::render;
use mdash_admin::ApiClient;
use mdash_common::models::{
    Attendee, EndPrayerSession, FollowUpStatus, FollowUpUpdate, GradeRequest, NewEvangelismRecord,
    NewPrayerSession,
};

use super::current_user;

#[derive(Subcommand, Debug)]
pub enum EvangelismCommand {
    /// List recorded contacts
    List,

    /// Record a new contact
    Add {
        #[arg(long)]
        name: String,

        #[arg(long)]
        phone: Option<String>,

        #[arg(long)]
        location: Option<String>,

        /// Who made the contact (default: the logged-in user)
        #[arg(long)]
        evangelist: Option<String>,

        /// Contact date, YYYY-MM-DD (default: today)
        #[arg(long)]
        date: Option<NaiveDate>,

        #[arg(long)]
        notes: Option<String>,
    },
}

#[derive(Subcommand, Debug)]
pub enum FollowUpCommand {
    List,

    /// Change status, assignee or notes of a follow-up
    Update {
        id: String,

        /// new, contacted, visited, integrated or unreachable
        #[arg(long)]
        status: Option<FollowUpStatus>,

        #[arg(long)]
        assigned_to: Option<String>,

        #[arg(long)]
        notes: Option<String>,
    },
}

#[derive(Subcommand, Debug)]
pub enum GradeCommand {
    /// List submissions for an assignment
    List { assignment_id: String },

    /// Grade one submission
    Set {
        submission_id: String,

        #[arg(long)]
        score: f64,

        #[arg(long, default_value_t = 100.0)]
        max_score: f64,

        #[arg(long)]
        feedback: Option<String>,

        /// Grader (default: the logged-in user)
        #[arg(long)]
        graded_by: Option<String>,
    },
}

#[derive(Subcommand, Debug)]
pub enum PrayerCommand {
    List,

    /// Open a session now
    Start {
        #[arg(long)]
        group: String,

        /// Session leader (default: the logged-in user)
        #[arg(long)]
        leader: Option<String>,

        #[arg(long = "topic")]
        topics: Vec<String>,
    },

    /// Close an open session now
    End {
        id: String,

        /// Attendee names
        #[arg(long = "attendee")]
        attendees: Vec<String>,
    },
}

pub async fn evangelism(client: &ApiClient, command: EvangelismCommand) -> Result<()> {
    match command {
        EvangelismCommand::List => {
            let records = client.get_evangelism().await?;
            print!("{}", render::evangelism_table(&records));
        }
        EvangelismCommand::Add {
            name,
            phone,
            location,
            evangelist,
            date,
            notes,
        } => {
            let evangelist = acting_user(client, evangelist, "--evangelist")?;
            let record = NewEvangelismRecord {
                contact_name: name,
                phone,
                location,
                evangelist,
                date: date.unwrap_or_else(|| chrono::Local::now().date_naive()),
                notes,
            };
            record.validate()?;
            let created = client.create_evangelism(&record).await?;
            println!("Recorded contact {} ({})", created.contact_name, created.id);
        }
    }
    Ok(())
}

pub async fn follow_ups(client: &ApiClient, command: FollowUpCommand) -> Result<()> {
    match command {
        FollowUpCommand::List => {
            let follow_ups = client.get_follow_ups().await?;
            print!("{}", render::follow_ups_table(&follow_ups));
        }
        FollowUpCommand::Update {
            id,
            status,
            assigned_to,
            notes,
        } => {
            let current = client
                .get_follow_ups()
                .await?
                .into_iter()
                .find(|f| f.id == id)
                .with_context(|| format!("No follow-up with id {}", id))?;
            let update = FollowUpUpdate {
                status,
                assigned_to,
                notes,
            };
            current.check_update(&update)?;
            let updated = client.update_follow_up(&id, &update).await?;
            println!(
                "Follow-up {} for {} is now {}",
                updated.id, updated.contact_name, updated.status
            );
        }
    }
    Ok(())
}

pub async fn grades(client: &ApiClient, command: GradeCommand) -> Result<()> {
    match command {
        GradeCommand::List { assignment_id } => {
            let submissions = client.get_assignment_submissions(&assignment_id).await?;
            print!("{}", render::assignment_submissions_table(&submissions));
        }
        GradeCommand::Set {
            submission_id,
            score,
            max_score,
            feedback,
            graded_by,
        } => {
            let graded_by = acting_user(client, graded_by, "--graded-by")?;
            let grade = GradeRequest::new(score, max_score, feedback, graded_by)?;
            let graded = client.grade_submission(&submission_id, &grade).await?;
            println!(
                "Graded {} for {}: {}/{}",
                graded.id, graded.member.name, score, max_score
            );
        }
    }
    Ok(())
}

pub async fn prayer(client: &ApiClient, command: PrayerCommand) -> Result<()> {
    match command {
        PrayerCommand::List => {
            let sessions = client.get_prayer_sessions().await?;
            print!("{}", render::prayer_sessions_table(&sessions));
        }
        PrayerCommand::Start {
            group,
            leader,
            topics,
        } => {
            let leader = acting_user(client, leader, "--leader")?;
            let session = NewPrayerSession {
                group_id: group,
                leader,
                started_at: mdash_common::time::now(),
                topics,
            };
            let started = client.start_prayer_session(&session).await?;
            println!("Started prayer session {}", started.id);
        }
        PrayerCommand::End { id, attendees } => {
            let mut session = client
                .get_prayer_sessions()
                .await?
                .into_iter()
                .find(|s| s.id == id)
                .with_context(|| format!("No prayer session with id {}", id))?;

            let ended_at = mdash_common::time::now();
            session.end(ended_at)?;
            let body = EndPrayerSession {
                ended_at,
                attendees: attendees.iter().map(|n| Attendee::named(n)).collect(),
            };
            let ended = client.end_prayer_session(&id, &body).await?;
            if body.attendees.is_empty() {
                println!("Ended prayer session {}", ended.id);
            } else {
                println!(
                    "Ended prayer session {} with {}",
                    ended.id,
                    render::attendee_names(&body.attendees)
                );
            }
        }
    }
    Ok(())
}

/// Explicit value, else the logged-in user's name
fn acting_user(client: &ApiClient, explicit: Option<String>, flag: &str) -> Result<String> {
    match explicit {
        Some(name) => Ok(name),
        None => current_user(client)?
            .with_context(|| format!("No user name stored with the session, pass {}", flag)),
    }
}
