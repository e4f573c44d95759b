//! Grouping of people into organizational units (fellowships and cells)
//!
//! Used by the per-unit breakdown of a submission. Every person lands in
//! exactly one bucket, and the bucket depends only on who the person is.

use mdash_common::models::{AttendanceSubmission, Member, Unit};
use mdash_common::AttendeeId;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};

/// Bucket for people the directory does not place in any unit
pub const UNASSIGNED_UNIT: &str = "Unassigned";

/// Maps a person to a unit label
///
/// Implementations must be deterministic: the same input always yields the
/// same label.
pub trait UnitAssigner {
    /// `id` is `None` for people known only by name (the workers listed in
    /// `submitted_by`).
    fn unit_for(&self, name: &str, id: Option<&AttendeeId>) -> String;
}

impl<F> UnitAssigner for F
where
    F: Fn(&str) -> String,
{
    fn unit_for(&self, name: &str, _id: Option<&AttendeeId>) -> String {
        self(name)
    }
}

/// Demo assignment: sum of the name's code points modulo the unit count
///
/// This is placeholder data for demos and tests. It says nothing about which
/// unit a person really belongs to; use [`DirectoryUnitAssigner`] for that.
#[derive(Debug, Clone)]
pub struct HashedUnitAssigner {
    units: Vec<String>,
}

impl HashedUnitAssigner {
    /// `None` if `units` is empty
    pub fn new(units: Vec<String>) -> Option<Self> {
        if units.is_empty() {
            None
        } else {
            Some(Self { units })
        }
    }

    pub fn units(&self) -> &[String] {
        &self.units
    }
}

impl UnitAssigner for HashedUnitAssigner {
    fn unit_for(&self, name: &str, _id: Option<&AttendeeId>) -> String {
        let sum: u64 = name.chars().map(|c| u64::from(u32::from(c))).sum();
        let index = (sum % self.units.len() as u64) as usize;
        self.units[index].clone()
    }
}

/// Assignment from the backend's membership records
///
/// Attendees are looked up by id first, then by exact (trimmed) name. A name
/// shared by several members is ambiguous and resolves to
/// [`UNASSIGNED_UNIT`], as does anyone unknown or without a unit.
#[derive(Debug, Clone, Default)]
pub struct DirectoryUnitAssigner {
    by_id: HashMap<AttendeeId, String>,
    by_name: HashMap<String, Option<String>>,
}

impl DirectoryUnitAssigner {
    pub fn new(units: &[Unit], members: &[Member]) -> Self {
        let unit_names: HashMap<&str, &str> = units
            .iter()
            .map(|u| (u.id.as_str(), u.name.as_str()))
            .collect();

        let mut by_id = HashMap::with_capacity(members.len());
        let mut by_name: HashMap<String, Option<String>> = HashMap::with_capacity(members.len());

        for member in members {
            let unit = member
                .unit_id
                .as_deref()
                .and_then(|id| unit_names.get(id))
                .map(|name| name.to_string())
                .unwrap_or_else(|| UNASSIGNED_UNIT.to_string());

            by_id.insert(member.id.clone(), unit.clone());

            let entry = by_name
                .entry(member.name.trim().to_string())
                .or_insert_with(|| Some(unit.clone()));
            if entry.as_deref() != Some(unit.as_str()) {
                *entry = None;
            }
        }

        Self { by_id, by_name }
    }

    pub fn is_empty(&self) -> bool {
        self.by_id.is_empty()
    }
}

impl UnitAssigner for DirectoryUnitAssigner {
    fn unit_for(&self, name: &str, id: Option<&AttendeeId>) -> String {
        if let Some(unit) = id.and_then(|id| self.by_id.get(id)) {
            return unit.clone();
        }
        self.by_name
            .get(name.trim())
            .cloned()
            .flatten()
            .unwrap_or_else(|| UNASSIGNED_UNIT.to_string())
    }
}

/// Counts for one unit
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UnitTally {
    pub unit: String,
    pub workers: usize,
    pub participants: usize,
    pub first_timers: usize,
}

impl UnitTally {
    pub fn total(&self) -> usize {
        self.workers + self.participants + self.first_timers
    }
}

/// Per-unit counts, ordered by unit label
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnitBreakdown {
    pub units: Vec<UnitTally>,
}

impl UnitBreakdown {
    pub fn total(&self) -> usize {
        self.units.iter().map(UnitTally::total).sum()
    }

    pub fn get(&self, unit: &str) -> Option<&UnitTally> {
        self.units.iter().find(|t| t.unit == unit)
    }
}

/// Bucket plain names by unit
pub fn group_names<'a, A>(names: &[&'a str], assigner: &A) -> BTreeMap<String, Vec<&'a str>>
where
    A: UnitAssigner + ?Sized,
{
    let mut buckets: BTreeMap<String, Vec<&'a str>> = BTreeMap::new();
    for &name in names {
        buckets
            .entry(assigner.unit_for(name, None))
            .or_default()
            .push(name);
    }
    buckets
}

/// Per-unit breakdown of a submission's workers, participants and
/// first-timers
pub fn group_by_unit<A>(submission: &AttendanceSubmission, assigner: &A) -> UnitBreakdown
where
    A: UnitAssigner + ?Sized,
{
    let mut tallies: BTreeMap<String, UnitTally> = BTreeMap::new();

    for worker in submission.workers() {
        tally_for(&mut tallies, assigner.unit_for(worker, None)).workers += 1;
    }
    for attendee in &submission.participants {
        let unit = assigner.unit_for(&attendee.name, Some(&attendee.id));
        tally_for(&mut tallies, unit).participants += 1;
    }
    for attendee in &submission.first_timers {
        let unit = assigner.unit_for(&attendee.name, Some(&attendee.id));
        tally_for(&mut tallies, unit).first_timers += 1;
    }

    UnitBreakdown {
        units: tallies.into_values().collect(),
    }
}

fn tally_for(tallies: &mut BTreeMap<String, UnitTally>, unit: String) -> &mut UnitTally {
    tallies.entry(unit.clone()).or_insert_with(|| UnitTally {
        unit,
        ..Default::default()
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use mdash_common::models::UnitKind;

    fn units() -> Vec<Unit> {
        vec![
            Unit {
                id: "u-1".to_string(),
                name: "Grace Fellowship".to_string(),
                kind: UnitKind::Fellowship,
            },
            Unit {
                id: "u-2".to_string(),
                name: "Zion Cell".to_string(),
                kind: UnitKind::Cell,
            },
        ]
    }

    fn member(id: &str, name: &str, unit_id: Option<&str>) -> Member {
        Member {
            id: AttendeeId::new(id),
            name: name.to_string(),
            unit_id: unit_id.map(str::to_string),
            phone: None,
        }
    }

    #[test]
    fn test_hashed_assigner_uses_code_point_sum() {
        let assigner =
            HashedUnitAssigner::new(vec!["A".to_string(), "B".to_string(), "C".to_string()])
                .unwrap();
        // 'a' = 97, 97 % 3 = 1
        assert_eq!(assigner.unit_for("a", None), "B");
        // "ab" = 97 + 98 = 195, 195 % 3 = 0
        assert_eq!(assigner.unit_for("ab", None), "A");
    }

    #[test]
    fn test_hashed_assigner_requires_units() {
        assert!(HashedUnitAssigner::new(vec![]).is_none());
    }

    #[test]
    fn test_directory_prefers_id_over_name() {
        let members = vec![
            member("m-1", "Joy E.", Some("u-1")),
            member("m-2", "Kelechi U.", Some("u-2")),
        ];
        let assigner = DirectoryUnitAssigner::new(&units(), &members);

        assert_eq!(
            assigner.unit_for("Someone Else", Some(&AttendeeId::new("m-2"))),
            "Zion Cell"
        );
        assert_eq!(assigner.unit_for(" Joy E. ", None), "Grace Fellowship");
        assert_eq!(assigner.unit_for("Stranger", None), UNASSIGNED_UNIT);
    }

    #[test]
    fn test_directory_ambiguous_or_unplaced_names_are_unassigned() {
        let members = vec![
            member("m-1", "John A.", Some("u-1")),
            member("m-2", "John A.", Some("u-2")),
            member("m-3", "Bisi K.", None),
            member("m-4", "Femi L.", Some("u-missing")),
        ];
        let assigner = DirectoryUnitAssigner::new(&units(), &members);

        assert_eq!(assigner.unit_for("John A.", None), UNASSIGNED_UNIT);
        assert_eq!(
            assigner.unit_for("John A.", Some(&AttendeeId::new("m-2"))),
            "Zion Cell"
        );
        assert_eq!(assigner.unit_for("Bisi K.", None), UNASSIGNED_UNIT);
        assert_eq!(assigner.unit_for("Femi L.", None), UNASSIGNED_UNIT);
    }

    #[test]
    fn test_closure_assigner() {
        let by_initial = |name: &str| name.chars().next().map(String::from).unwrap_or_default();
        let buckets = group_names(&["Joy", "Jide", "Ada"], &by_initial);
        assert_eq!(buckets["J"], vec!["Joy", "Jide"]);
        assert_eq!(buckets["A"], vec!["Ada"]);
    }
}
