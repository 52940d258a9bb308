use std::borrow::Cow;

use foundation::time::{Millis, TimeRange};
use scene::records::Cluster;

/// Keep items inside the recency window.
///
/// `TimeRange::All` returns the input untouched. Otherwise the cutoff is
/// computed once and an item survives if its timestamp is absent/unparsable
/// or `>= now - window`. Input order is preserved; when nothing is dropped
/// the input slice is borrowed rather than copied.
pub fn filter_by_time<'a, T, F>(
    items: &'a [T],
    range: TimeRange,
    now: Millis,
    timestamp_of: F,
) -> Cow<'a, [T]>
where
    T: Clone,
    F: Fn(&T) -> Option<Millis>,
{
    let Some(cutoff) = range.cutoff(now) else {
        return Cow::Borrowed(items);
    };
    let keep = |item: &T| timestamp_of(item).is_none_or(|t| t >= cutoff);

    if items.iter().all(keep) {
        return Cow::Borrowed(items);
    }
    Cow::Owned(items.iter().filter(|item| keep(item)).cloned().collect())
}

/// Window cluster records by their members.
///
/// Members are filtered first; a cluster left with no members is dropped and
/// every surviving cluster is rebuilt through [`Cluster::with_members`] so its
/// cached counts match what is actually drawn.
pub fn filter_clusters<'a, C, F>(
    clusters: &'a [C],
    range: TimeRange,
    now: Millis,
    member_timestamp: F,
) -> Cow<'a, [C]>
where
    C: Cluster,
    C::Member: Clone,
    F: Fn(&C::Member) -> Option<Millis>,
{
    if range.cutoff(now).is_none() {
        return Cow::Borrowed(clusters);
    }
    let out = clusters
        .iter()
        .filter_map(|cluster| {
            let members = filter_by_time(cluster.members(), range, now, &member_timestamp);
            if members.is_empty() {
                return None;
            }
            Some(cluster.with_members(members.into_owned()))
        })
        .collect();
    Cow::Owned(out)
}

/// First `max` items (source order is priority order).
pub fn cap<T>(items: &[T], max: usize) -> &[T] {
    &items[..items.len().min(max)]
}

/// [`cap`] with an optional limit.
pub fn cap_opt<T>(items: &[T], max: Option<usize>) -> &[T] {
    match max {
        Some(max) => cap(items, max),
        None => items,
    }
}

#[cfg(test)]
mod tests {
    use super::{cap, cap_opt, filter_by_time, filter_clusters};
    use foundation::bounds::LonLat;
    use foundation::time::{HOUR_MS, MINUTE_MS, Millis, TimeRange};
    use scene::records::{MilitaryFlight, MilitaryFlightCluster};
    use std::borrow::Cow;

    const NOW: Millis = Millis(1_000 * HOUR_MS);

    #[derive(Debug, Clone, PartialEq)]
    struct Item {
        name: &'static str,
        at: Option<Millis>,
    }

    fn item(name: &'static str, minutes_ago: Option<i64>) -> Item {
        Item {
            name,
            at: minutes_ago.map(|m| NOW.saturating_sub_ms(m * MINUTE_MS)),
        }
    }

    fn names(items: &[Item]) -> Vec<&'static str> {
        items.iter().map(|i| i.name).collect()
    }

    fn flight(id: &str, minutes_ago: Option<i64>) -> MilitaryFlight {
        MilitaryFlight {
            id: id.to_string(),
            callsign: id.to_string(),
            position: LonLat::default(),
            heading_deg: 0.0,
            last_seen: minutes_ago.map(|m| NOW.saturating_sub_ms(m * MINUTE_MS)),
        }
    }

    #[test]
    fn one_hour_window_keeps_only_recent() {
        let items = vec![item("a", Some(90)), item("b", Some(30))];
        let out = filter_by_time(&items, TimeRange::OneHour, NOW, |i| i.at);
        assert_eq!(names(&out), vec!["b"]);
    }

    #[test]
    fn missing_timestamps_are_always_kept() {
        let items = vec![item("old", Some(10_000)), item("unknown", None)];
        let out = filter_by_time(&items, TimeRange::OneHour, NOW, |i| i.at);
        assert_eq!(names(&out), vec!["unknown"]);
    }

    #[test]
    fn cutoff_boundary_is_inclusive() {
        let items = vec![item("edge", Some(60)), item("past", Some(61))];
        let out = filter_by_time(&items, TimeRange::OneHour, NOW, |i| i.at);
        assert_eq!(names(&out), vec!["edge"]);
    }

    #[test]
    fn all_range_is_identity() {
        let items = vec![item("a", Some(1_000_000)), item("b", None)];
        let out = filter_by_time(&items, TimeRange::All, NOW, |i| i.at);
        assert!(matches!(out, Cow::Borrowed(_)));
        assert!(std::ptr::eq(out.as_ptr(), items.as_ptr()));
    }

    #[test]
    fn nothing_dropped_borrows_input() {
        let items = vec![item("a", Some(1)), item("b", Some(2))];
        let out = filter_by_time(&items, TimeRange::OneDay, NOW, |i| i.at);
        assert!(matches!(out, Cow::Borrowed(_)));
    }

    #[test]
    fn order_is_preserved() {
        let items = vec![
            item("c", Some(5)),
            item("x", Some(500)),
            item("a", Some(1)),
            item("b", None),
        ];
        let out = filter_by_time(&items, TimeRange::OneHour, NOW, |i| i.at);
        assert_eq!(names(&out), vec!["c", "a", "b"]);
    }

    #[test]
    fn clusters_drop_when_emptied_and_recount() {
        let mut stale = MilitaryFlightCluster::new(
            "c1",
            "Mixed",
            LonLat::default(),
            vec![flight("f1", Some(10)), flight("f2", Some(600)), flight("f3", None)],
        );
        // Producer sent a wrong count; filtering must not carry it forward.
        stale.flight_count = 99;
        let gone = MilitaryFlightCluster::new(
            "c2",
            "Old",
            LonLat::default(),
            vec![flight("f4", Some(600))],
        );

        let clusters = vec![stale, gone];
        let out = filter_clusters(&clusters, TimeRange::OneHour, NOW, |f| f.last_seen);
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].id, "c1");
        assert_eq!(out[0].flight_count, 2);
        let ids: Vec<&str> = out[0].flights.iter().map(|f| f.id.as_str()).collect();
        assert_eq!(ids, vec!["f1", "f3"]);
    }

    #[test]
    fn cap_never_exceeds_limit() {
        let v: Vec<u32> = (0..150).collect();
        assert_eq!(cap(&v, 100).len(), 100);
        assert_eq!(cap(&v, 100)[0], 0);
        assert_eq!(cap(&v, 100)[99], 99);
        assert_eq!(cap(&v, 500), v.as_slice());
        assert_eq!(cap(&v, 0).len(), 0);
        assert_eq!(cap_opt(&v, None).len(), 150);
    }
}
