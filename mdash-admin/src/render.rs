//! Plain-text tables for command output

use mdash_attendance::{MeetingSummary, UnitBreakdown};
use mdash_common::models::{
    AssignmentSubmission, AttendanceSubmission, Attendee, EvangelismRecord, FollowUp, Meeting,
    PrayerSession,
};
use std::fmt::Write;

/// Column-aligned table
struct Table {
    header: Vec<String>,
    rows: Vec<Vec<String>>,
}

impl Table {
    fn new(header: &[&str]) -> Self {
        Self {
            header: header.iter().map(|h| h.to_string()).collect(),
            rows: Vec::new(),
        }
    }

    fn row(&mut self, cells: Vec<String>) {
        self.rows.push(cells);
    }

    fn render(&self) -> String {
        let mut widths: Vec<usize> = self.header.iter().map(|h| h.chars().count()).collect();
        for row in &self.rows {
            for (i, cell) in row.iter().enumerate() {
                if let Some(w) = widths.get_mut(i) {
                    *w = (*w).max(cell.chars().count());
                }
            }
        }

        let mut out = String::new();
        let line = |out: &mut String, cells: &[String]| {
            let padded: Vec<String> = cells
                .iter()
                .zip(&widths)
                .map(|(c, w)| format!("{:<width$}", c, width = *w))
                .collect();
            let _ = writeln!(out, "{}", padded.join("  ").trim_end());
        };
        line(&mut out, &self.header);
        let rule: Vec<String> = widths.iter().map(|w| "-".repeat(*w)).collect();
        line(&mut out, &rule);
        for row in &self.rows {
            line(&mut out, row);
        }
        out
    }
}

/// Comma-joined attendee names, for one-line messages
pub fn attendee_names(attendees: &[Attendee]) -> String {
    attendees
        .iter()
        .map(|a| a.name.as_str())
        .collect::<Vec<_>>()
        .join(", ")
}

pub fn submissions_table(submissions: &[&AttendanceSubmission]) -> String {
    let mut table = Table::new(&[
        "ID", "DATE", "MEETING", "SUBMITTED BY", "PARTICIPANTS", "FIRST-TIMERS", "STATUS",
    ]);
    for s in submissions {
        table.row(vec![
            s.id.to_string(),
            s.date.to_string(),
            s.meeting_title.clone(),
            s.submitted_by.clone(),
            s.participants.len().to_string(),
            s.first_timers.len().to_string(),
            s.status.to_string(),
        ]);
    }
    table.render()
}

/// One submission with the ids needed to select attendees
pub fn submission_detail(s: &AttendanceSubmission) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Submission {} ({})", s.id, s.status);
    let _ = writeln!(out, "Meeting:      {} [{}] on {}", s.meeting_title, s.meeting_id, s.date);
    let _ = writeln!(out, "Submitted by: {}", s.submitted_by);
    let _ = writeln!(out, "Filed at:     {}", s.created_at.format("%Y-%m-%d %H:%M UTC"));

    let mut table = Table::new(&["ROLE", "ID", "NAME"]);
    for a in &s.participants {
        table.row(vec!["participant".to_string(), a.id.to_string(), a.name.clone()]);
    }
    for a in &s.first_timers {
        table.row(vec!["first-timer".to_string(), a.id.to_string(), a.name.clone()]);
    }
    out.push('\n');
    out.push_str(&table.render());
    out
}

pub fn breakdown_table(breakdown: &UnitBreakdown) -> String {
    let mut table = Table::new(&["UNIT", "WORKERS", "PARTICIPANTS", "FIRST-TIMERS", "TOTAL"]);
    for t in &breakdown.units {
        table.row(vec![
            t.unit.clone(),
            t.workers.to_string(),
            t.participants.to_string(),
            t.first_timers.to_string(),
            t.total().to_string(),
        ]);
    }
    table.render()
}

pub fn summary_table(summaries: &[MeetingSummary]) -> String {
    let mut table = Table::new(&[
        "DATE", "MEETING", "PARTICIPANTS", "FIRST-TIMERS", "TOTAL", "PENDING", "REJECTED",
    ]);
    for s in summaries {
        table.row(vec![
            s.date.to_string(),
            s.meeting_title.clone(),
            s.approved_participants.to_string(),
            s.approved_first_timers.to_string(),
            s.approved_total().to_string(),
            s.pending_attendees.to_string(),
            s.rejected_submissions.to_string(),
        ]);
    }
    table.render()
}

pub fn meetings_table(meetings: &[Meeting]) -> String {
    let mut table = Table::new(&["ID", "DATE", "KIND", "TITLE", "LOCATION"]);
    for m in meetings {
        table.row(vec![
            m.id.clone(),
            m.date.to_string(),
            format!("{:?}", m.kind),
            m.title.clone(),
            m.location.clone().unwrap_or_default(),
        ]);
    }
    table.render()
}

pub fn evangelism_table(records: &[EvangelismRecord]) -> String {
    let mut table = Table::new(&["ID", "DATE", "CONTACT", "PHONE", "LOCATION", "EVANGELIST"]);
    for r in records {
        table.row(vec![
            r.id.clone(),
            r.date.to_string(),
            r.contact_name.clone(),
            r.phone.clone().unwrap_or_default(),
            r.location.clone().unwrap_or_default(),
            r.evangelist.clone(),
        ]);
    }
    table.render()
}

pub fn follow_ups_table(follow_ups: &[FollowUp]) -> String {
    let mut table = Table::new(&["ID", "CONTACT", "ASSIGNED TO", "STATUS", "UPDATED"]);
    for f in follow_ups {
        table.row(vec![
            f.id.clone(),
            f.contact_name.clone(),
            f.assigned_to.clone(),
            f.status.to_string(),
            f.updated_at.format("%Y-%m-%d").to_string(),
        ]);
    }
    table.render()
}

pub fn assignment_submissions_table(submissions: &[AssignmentSubmission]) -> String {
    let mut table = Table::new(&["ID", "MEMBER", "SUBMITTED", "SCORE", "GRADED BY"]);
    for s in submissions {
        let (score, graded_by) = match &s.grade {
            Some(g) => (g.score.to_string(), g.graded_by.clone()),
            None => ("-".to_string(), String::new()),
        };
        table.row(vec![
            s.id.clone(),
            s.member.name.clone(),
            s.submitted_at.format("%Y-%m-%d").to_string(),
            score,
            graded_by,
        ]);
    }
    table.render()
}

pub fn prayer_sessions_table(sessions: &[PrayerSession]) -> String {
    let mut table = Table::new(&["ID", "GROUP", "LEADER", "STARTED", "DURATION", "ATTENDEES"]);
    for s in sessions {
        let duration = match s.duration() {
            Some(d) => format!("{}m", d.num_minutes()),
            None => "open".to_string(),
        };
        table.row(vec![
            s.id.clone(),
            s.group_id.clone(),
            s.leader.clone(),
            s.started_at.format("%Y-%m-%d %H:%M").to_string(),
            duration,
            s.attendees.len().to_string(),
        ]);
    }
    table.render()
}

#[cfg(test)]
mod tests {
    use super::*;
    use mdash_attendance::UnitTally;

    #[test]
    fn test_columns_are_aligned() {
        let breakdown = UnitBreakdown {
            units: vec![
                UnitTally {
                    unit: "Grace Fellowship".to_string(),
                    workers: 1,
                    participants: 12,
                    first_timers: 2,
                },
                UnitTally {
                    unit: "Zion".to_string(),
                    workers: 0,
                    participants: 3,
                    first_timers: 0,
                },
            ],
        };
        let out = breakdown_table(&breakdown);
        let lines: Vec<&str> = out.lines().collect();
        assert_eq!(lines.len(), 4);
        assert!(lines[0].starts_with("UNIT              WORKERS"));
        assert!(lines[1].starts_with("----------------  -------"));
        assert!(lines[3].starts_with("Zion              0"));
        assert!(lines[2].ends_with("15"));
    }
}
