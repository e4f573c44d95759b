//! Attendance review commands

use anyhow::{bail, Context, Result};
use chrono::NaiveDate;
use mdash_admin::render;
use mdash_admin::{ApiClient, ReviewController};
use mdash_attendance::{
    group_by_unit, summarize, DirectoryUnitAssigner, Fresh, HashedUnitAssigner, ReviewAction,
    Selection,
};
use mdash_common::models::{
    AttendanceSubmission, Attendee, Member, NewSubmission, SubmissionStatus,
};
use mdash_common::{AttendeeId, SubmissionId};
use tracing::{info, warn};

use super::current_user;

/// Arguments of `file`
pub struct Report<'a> {
    pub meeting_id: &'a str,
    pub date: Option<NaiveDate>,
    pub workers: &'a [String],
    pub participants: &'a [String],
    pub first_timers: &'a [String],
}

pub async fn list(client: &ApiClient, status: Option<SubmissionStatus>) -> Result<()> {
    let mut controller = ReviewController::new(client.clone());
    controller.refresh().await?;
    controller.dispatch(ReviewAction::SetFilter(status)).await?;

    let visible = controller.state().visible();
    if visible.is_empty() {
        println!("No submissions");
    } else {
        print!("{}", render::submissions_table(&visible));
    }
    Ok(())
}

pub async fn show(client: &ApiClient, id: &str) -> Result<()> {
    let submission = fetch_one(client, id).await?;
    print!("{}", render::submission_detail(&submission));
    Ok(())
}

pub async fn meetings(client: &ApiClient) -> Result<()> {
    let meetings = client.get_meetings().await?;
    if meetings.is_empty() {
        println!("No meetings");
    } else {
        print!("{}", render::meetings_table(&meetings));
    }
    Ok(())
}

pub async fn file(client: &ApiClient, report: Report<'_>) -> Result<()> {
    let meeting = client
        .get_meetings()
        .await?
        .into_iter()
        .find(|m| m.id == report.meeting_id)
        .with_context(|| format!("No meeting with id {}", report.meeting_id))?;
    let members = client.get_members().await?;

    let submitted_by = if report.workers.is_empty() {
        current_user(client)?.context("No user name stored with the session, pass --worker")?
    } else {
        report.workers.join(", ")
    };
    let new = NewSubmission {
        meeting_id: meeting.id.clone(),
        meeting_title: meeting.title.clone(),
        submitted_by,
        date: report.date.unwrap_or(meeting.date),
        participants: report
            .participants
            .iter()
            .map(|name| directory_attendee(&members, name))
            .collect(),
        first_timers: report
            .first_timers
            .iter()
            .map(|name| Attendee::named(name))
            .collect(),
    };
    new.validate()?;

    let filed = client.file_submission(&new).await?;
    println!(
        "Filed submission {} for {} on {}: {} participants, {} first-timers",
        filed.id,
        filed.meeting_title,
        filed.date,
        filed.participants.len(),
        filed.first_timers.len()
    );
    let unmatched = filed
        .participants
        .iter()
        .filter(|a| a.id.is_name_derived())
        .count();
    if unmatched > 0 {
        println!(
            "{} participants are not in the membership directory and were filed by name",
            unmatched
        );
    }
    Ok(())
}

pub async fn review(
    client: &ApiClient,
    id: &str,
    participants: &[String],
    first_timers: &[String],
    all: bool,
) -> Result<()> {
    if !all && participants.is_empty() && first_timers.is_empty() {
        bail!("Nothing selected: pass --participant/--first-timer or --all");
    }

    let id = SubmissionId::new(id);
    let mut controller = ReviewController::new(client.clone());
    controller.refresh().await?;
    controller.dispatch(ReviewAction::Open(id.clone())).await?;

    let submission = controller
        .state()
        .open_submission()
        .cloned()
        .context("Submission was not opened")?;

    if all {
        controller.dispatch(ReviewAction::ToggleSelectAll).await?;
    } else {
        let selection = Selection::new(
            resolve_attendees(&submission.participants, participants),
            resolve_attendees(&submission.first_timers, first_timers),
        );
        controller.dispatch(ReviewAction::Select(selection)).await?;
    }

    let selected = controller.state().selection.len();
    controller
        .dispatch(ReviewAction::ApproveSelection(Fresh::generate()))
        .await?;

    println!(
        "Approved {} of {} attendees from {} ({}, {})",
        selected,
        submission.attendee_count(),
        id,
        submission.meeting_title,
        submission.date
    );
    let remaining = controller
        .state()
        .get(&id)
        .filter(|s| s.is_pending())
        .map(|s| s.attendee_count())
        .unwrap_or(0);
    if remaining > 0 {
        println!("{} attendees remain pending under {}", remaining, id);
    }
    Ok(())
}

pub async fn reject(client: &ApiClient, id: &str) -> Result<()> {
    let id = SubmissionId::new(id);
    let mut controller = ReviewController::new(client.clone());
    controller.refresh().await?;
    controller.dispatch(ReviewAction::Open(id.clone())).await?;
    controller.dispatch(ReviewAction::RejectOpen).await?;

    println!("Rejected submission {}", id);
    Ok(())
}

pub async fn breakdown(
    client: &ApiClient,
    id: &str,
    demo_units: bool,
    configured_units: &[String],
) -> Result<()> {
    let submission = fetch_one(client, id).await?;
    let units = client.get_units().await?;

    let breakdown = if demo_units {
        hashed_breakdown(&submission, &units, configured_units)?
    } else {
        let members = client.get_members().await?;
        let directory = DirectoryUnitAssigner::new(&units, &members);
        if directory.is_empty() {
            warn!("Backend returned no membership records, using demo unit assignment");
            hashed_breakdown(&submission, &units, configured_units)?
        } else {
            group_by_unit(&submission, &directory)
        }
    };

    println!(
        "{} on {} ({} attendees, {} workers)",
        submission.meeting_title,
        submission.date,
        submission.attendee_count(),
        submission.workers().len()
    );
    print!("{}", render::breakdown_table(&breakdown));
    Ok(())
}

pub async fn summary(client: &ApiClient) -> Result<()> {
    let submissions = client.get_submissions().await?;
    let summaries = summarize(&submissions);
    if summaries.is_empty() {
        println!("No submissions");
    } else {
        print!("{}", render::summary_table(&summaries));
    }
    Ok(())
}

async fn fetch_one(client: &ApiClient, id: &str) -> Result<AttendanceSubmission> {
    let id = SubmissionId::new(id);
    client
        .get_submissions()
        .await?
        .into_iter()
        .find(|s| s.id == id)
        .with_context(|| format!("No submission with id {}", id))
}

/// Demo assignment over the configured unit labels, or the backend's units
fn hashed_breakdown(
    submission: &AttendanceSubmission,
    units: &[mdash_common::models::Unit],
    configured_units: &[String],
) -> Result<mdash_attendance::UnitBreakdown> {
    let labels = if configured_units.is_empty() {
        units.iter().map(|u| u.name.clone()).collect()
    } else {
        configured_units.to_vec()
    };
    let assigner = HashedUnitAssigner::new(labels)
        .context("No units known: add `units` to the config file")?;
    info!("Demo unit assignment over {} units", assigner.units().len());
    println!("Note: units are a demo assignment, not membership records");
    Ok(group_by_unit(submission, &assigner))
}

/// Map each argument to an attendee id, accepting a listed id or a unique
/// name
///
/// Arguments that match neither are passed through as ids so the review
/// reports them as not in the submission.
fn resolve_attendees(listed: &[Attendee], args: &[String]) -> Vec<AttendeeId> {
    args.iter()
        .map(|arg| {
            if let Some(a) = listed.iter().find(|a| a.id.as_str() == arg) {
                return a.id.clone();
            }
            let mut by_name = listed.iter().filter(|a| a.name.trim() == arg.trim());
            match (by_name.next(), by_name.next()) {
                (Some(a), None) => a.id.clone(),
                _ => AttendeeId::new(arg.as_str()),
            }
        })
        .collect()
}

/// Member with this exact (trimmed) name, else an attendee known by name
fn directory_attendee(members: &[Member], name: &str) -> Attendee {
    let mut matches = members.iter().filter(|m| m.name.trim() == name.trim());
    match (matches.next(), matches.next()) {
        (Some(m), None) => Attendee::new(m.id.clone(), m.name.clone()),
        _ => Attendee::named(name),
    }
}
