//! Candidate eligibility and ranking.
//!
//! Turns raw query hits into the ordered list a traveler browses: drops
//! themselves and repeats, keeps only compatible departures, and orders
//! the rest nearest-first.

use std::collections::HashSet;
use std::sync::Arc;

use chrono::{DateTime, TimeDelta, Utc};

use crate::domain::{Candidate, Coordinate, UserId};

use super::BrowseCursor;

/// An ordered, immutable list of ranked candidates.
///
/// Cheap to clone; clones share the same allocation.
#[derive(Debug, Clone, PartialEq)]
pub struct RankedList(Arc<[Candidate]>);

impl RankedList {
    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn as_slice(&self) -> &[Candidate] {
        &self.0
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Candidate> {
        self.0.iter()
    }

    pub fn get(&self, index: usize) -> Option<&Candidate> {
        self.0.get(index)
    }

    /// Start browsing at the first candidate. `None` for an empty list.
    pub fn cursor(&self) -> Option<BrowseCursor> {
        BrowseCursor::new(self.clone())
    }
}

impl From<Vec<Candidate>> for RankedList {
    fn from(candidates: Vec<Candidate>) -> Self {
        Self(candidates.into())
    }
}

impl<'a> IntoIterator for &'a RankedList {
    type Item = &'a Candidate;
    type IntoIter = std::slice::Iter<'a, Candidate>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Whether a candidate's departure is compatible with `my_time`.
///
/// A candidate without a departure time is always compatible. The window
/// boundary is inclusive.
pub fn within_window(
    candidate_time: Option<DateTime<Utc>>,
    my_time: DateTime<Utc>,
    window: TimeDelta,
) -> bool {
    match candidate_time {
        Some(t) => {
            let diff = t.signed_duration_since(my_time);
            diff <= window && -diff <= window
        }
        None => true,
    }
}

/// Rank query hits for the traveler `self_id`.
///
/// 1. Drop the traveler's own record and any repeated user ids (first wins)
/// 2. Drop candidates departing outside `window` of `my_time`
/// 3. Annotate distances from `my_location` (unknown sorts last)
/// 4. Stable sort nearest-first, so ties keep query order
pub fn rank(
    candidates: Vec<Candidate>,
    self_id: &UserId,
    my_time: DateTime<Utc>,
    my_location: Option<&Coordinate>,
    window: TimeDelta,
) -> RankedList {
    let mut seen = HashSet::new();

    let mut eligible: Vec<Candidate> = candidates
        .into_iter()
        .filter(|c| c.user_id() != self_id)
        .filter(|c| seen.insert(c.user_id().clone()))
        .filter(|c| within_window(c.profile().departure_time, my_time, window))
        .map(|mut c| {
            c.annotate_distance(my_location);
            c
        })
        .collect();

    eligible.sort_by(|a, b| a.distance_meters().total_cmp(&b.distance_meters()));

    RankedList::from(eligible)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Profile;

    fn at(secs: i64) -> DateTime<Utc> {
        DateTime::from_timestamp(secs, 0).unwrap()
    }

    fn coord(lat: f64, lon: f64) -> Coordinate {
        Coordinate::new(lat, lon).unwrap()
    }

    fn candidate(id: &str, time: Option<i64>, location: Option<(f64, f64)>) -> Candidate {
        let mut profile = Profile::new(UserId::parse(id).unwrap(), id, "XX1");
        profile.departure_time = time.map(at);
        profile.location = location.map(|(lat, lon)| coord(lat, lon));
        Candidate::new(profile)
    }

    fn ids(list: &RankedList) -> Vec<&str> {
        list.iter().map(|c| c.user_id().as_str()).collect()
    }

    fn me() -> UserId {
        UserId::parse("A").unwrap()
    }

    fn window() -> TimeDelta {
        TimeDelta::seconds(14_400)
    }

    #[test]
    fn reference_scenario() {
        let candidates = vec![
            candidate("A", Some(1000), Some((0.0, 0.0))),
            candidate("B", Some(15_000), Some((0.0, 0.001))),
            candidate("C", None, Some((0.0, 10.0))),
            candidate("D", Some(21_000), Some((0.0, 0.0))),
        ];

        let ranked = rank(candidates, &me(), at(1000), Some(&coord(0.0, 0.0)), window());

        assert_eq!(ids(&ranked), ["B", "C"]);
        let b = ranked.get(0).unwrap().distance_meters();
        assert!((b - 111.19).abs() < 0.1, "B distance was {b}");
        let c = ranked.get(1).unwrap().distance_meters();
        assert!((c - 1_111_950.0).abs() < 100.0, "C distance was {c}");
    }

    #[test]
    fn window_boundary_is_inclusive() {
        let candidates = vec![
            candidate("edge", Some(1000 + 14_400), None),
            candidate("past", Some(1000 + 14_401), None),
            candidate("early", Some(1000 - 14_400), None),
            candidate("too-early", Some(1000 - 14_401), None),
        ];

        let ranked = rank(candidates, &me(), at(1000), None, window());
        assert_eq!(ids(&ranked), ["edge", "early"]);
    }

    #[test]
    fn self_is_excluded() {
        let candidates = vec![candidate("A", None, None), candidate("A", Some(1000), None)];
        let ranked = rank(candidates, &me(), at(1000), None, window());
        assert!(ranked.is_empty());
    }

    #[test]
    fn duplicates_keep_first_occurrence() {
        let candidates = vec![
            candidate("B", None, Some((0.0, 1.0))),
            candidate("C", None, Some((0.0, 0.5))),
            candidate("B", None, Some((0.0, 0.1))),
        ];
        let ranked = rank(candidates, &me(), at(0), Some(&coord(0.0, 0.0)), window());
        assert_eq!(ids(&ranked), ["C", "B"]);
        assert!(ranked.get(1).unwrap().distance_meters() > 100_000.0);
    }

    #[test]
    fn unknown_distance_sorts_last_in_query_order() {
        let candidates = vec![
            candidate("far-unknown-1", None, None),
            candidate("near", None, Some((0.0, 0.01))),
            candidate("far-unknown-2", None, None),
            candidate("nearer", None, Some((0.0, 0.001))),
        ];

        let ranked = rank(candidates, &me(), at(0), Some(&coord(0.0, 0.0)), window());
        assert_eq!(ids(&ranked), ["nearer", "near", "far-unknown-1", "far-unknown-2"]);
        assert_eq!(ranked.get(2).unwrap().known_distance(), None);
    }

    #[test]
    fn no_own_location_keeps_query_order() {
        let candidates = vec![
            candidate("x", None, Some((10.0, 10.0))),
            candidate("y", None, Some((0.0, 0.0))),
            candidate("z", None, None),
        ];
        let ranked = rank(candidates, &me(), at(0), None, window());
        assert_eq!(ids(&ranked), ["x", "y", "z"]);
        assert!(ranked.iter().all(|c| c.distance_meters() == f64::INFINITY));
    }

    #[test]
    fn empty_input() {
        let ranked = rank(vec![], &me(), at(0), None, window());
        assert!(ranked.is_empty());
        assert!(ranked.cursor().is_none());
    }

    #[test]
    fn within_window_without_time() {
        assert!(within_window(None, at(0), TimeDelta::zero()));
        assert!(within_window(Some(at(5)), at(5), TimeDelta::zero()));
        assert!(!within_window(Some(at(6)), at(5), TimeDelta::zero()));
    }
}
