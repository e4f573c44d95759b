//! Per-meeting attendance totals for the dashboard cards

use chrono::NaiveDate;
use mdash_common::models::{AttendanceSubmission, SubmissionStatus};
use mdash_common::AttendeeId;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};

/// Totals for one meeting occurrence
///
/// Only approved records count as attendance. The same person approved in
/// two records (filed by different workers) is counted once.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MeetingSummary {
    pub meeting_id: String,
    pub meeting_title: String,
    pub date: NaiveDate,
    pub approved_participants: usize,
    pub approved_first_timers: usize,
    /// Attendees still waiting for review
    pub pending_attendees: usize,
    pub rejected_submissions: usize,
}

impl MeetingSummary {
    pub fn approved_total(&self) -> usize {
        self.approved_participants + self.approved_first_timers
    }
}

#[derive(Default)]
struct Accumulator<'a> {
    title: &'a str,
    date: Option<NaiveDate>,
    participants: HashSet<&'a AttendeeId>,
    first_timers: HashSet<&'a AttendeeId>,
    pending: usize,
    rejected: usize,
}

/// Summaries ordered by date, then meeting id
pub fn summarize(submissions: &[AttendanceSubmission]) -> Vec<MeetingSummary> {
    let mut by_meeting: HashMap<&str, Accumulator<'_>> = HashMap::new();

    for submission in submissions {
        let acc = by_meeting.entry(submission.meeting_id.as_str()).or_default();
        acc.title = &submission.meeting_title;
        acc.date = Some(acc.date.map_or(submission.date, |d| d.min(submission.date)));

        match submission.status {
            SubmissionStatus::Approved => {
                acc.participants
                    .extend(submission.participants.iter().map(|a| &a.id));
                acc.first_timers
                    .extend(submission.first_timers.iter().map(|a| &a.id));
            }
            SubmissionStatus::Pending => acc.pending += submission.attendee_count(),
            SubmissionStatus::Rejected => acc.rejected += 1,
        }
    }

    let mut summaries: Vec<MeetingSummary> = by_meeting
        .into_iter()
        .filter_map(|(meeting_id, acc)| {
            Some(MeetingSummary {
                meeting_id: meeting_id.to_string(),
                meeting_title: acc.title.to_string(),
                date: acc.date?,
                approved_participants: acc.participants.len(),
                approved_first_timers: acc.first_timers.len(),
                pending_attendees: acc.pending,
                rejected_submissions: acc.rejected,
            })
        })
        .collect();

    summaries.sort_by(|a, b| a.date.cmp(&b.date).then_with(|| a.meeting_id.cmp(&b.meeting_id)));
    summaries
}
