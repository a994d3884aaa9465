//! Position planning for drag reorders.
//!
//! A reorder moves one entry to the index currently held by another entry
//! and renumbers the sequence densely from zero. Only entries whose position
//! actually changes are reported, so callers issue one persistence call per
//! changed entry and nothing for the rest.

/// Plan moving `dragged` to the index of `target` within `ordered`.
///
/// `ordered` holds `(id, current position)` pairs sorted by position.
/// Moving down lands the entry after the target, moving up lands it before.
/// Returns `None` when either id is absent, and an empty plan when they are
/// the same entry.
pub fn plan_reorder<I>(ordered: &[(I, u32)], dragged: &I, target: &I) -> Option<Vec<(I, u32)>>
where
    I: Clone + PartialEq,
{
    let from = ordered.iter().position(|(id, _)| id == dragged)?;
    let to = ordered.iter().position(|(id, _)| id == target)?;
    if from == to {
        return Some(Vec::new());
    }

    let mut sequence: Vec<&(I, u32)> = ordered.iter().collect();
    let moved = sequence.remove(from);
    sequence.insert(to, moved);

    Some(changed_positions(sequence.into_iter()))
}

/// Renumber an already ordered sequence densely and report the changes.
pub fn plan_compaction<I>(ordered: &[(I, u32)]) -> Vec<(I, u32)>
where
    I: Clone + PartialEq,
{
    changed_positions(ordered.iter())
}

fn changed_positions<'a, I>(sequence: impl Iterator<Item = &'a (I, u32)>) -> Vec<(I, u32)>
where
    I: Clone + PartialEq + 'a,
{
    sequence
        .enumerate()
        .filter_map(|(index, (id, old))| {
            let new = index as u32;
            (new != *old).then(|| (id.clone(), new))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn seq(ids: &[&'static str]) -> Vec<(&'static str, u32)> {
        ids.iter().enumerate().map(|(i, id)| (*id, i as u32)).collect()
    }

    #[test]
    fn test_move_up_touches_only_shifted_entries() {
        let plan = plan_reorder(&seq(&["c1", "c2", "c3"]), &"c2", &"c1").unwrap();
        assert_eq!(plan, vec![("c2", 0), ("c1", 1)]);
    }

    #[test]
    fn test_move_down_lands_after_target() {
        let plan = plan_reorder(&seq(&["a", "b", "c", "d"]), &"a", &"c").unwrap();
        assert_eq!(plan, vec![("b", 0), ("c", 1), ("a", 2)]);
    }

    #[test]
    fn test_self_drop_is_empty_plan() {
        let plan = plan_reorder(&seq(&["a", "b"]), &"b", &"b").unwrap();
        assert!(plan.is_empty());
    }

    #[test]
    fn test_unknown_ids() {
        assert!(plan_reorder(&seq(&["a", "b"]), &"z", &"a").is_none());
        assert!(plan_reorder(&seq(&["a", "b"]), &"a", &"z").is_none());
    }

    #[test]
    fn test_gapped_positions_are_densified() {
        let ordered = vec![("a", 0), ("b", 4), ("c", 9)];
        let plan = plan_reorder(&ordered, &"c", &"b").unwrap();
        assert_eq!(plan, vec![("c", 1), ("b", 2)]);
    }

    #[test]
    fn test_compaction() {
        let ordered = vec![("a", 1), ("b", 2), ("c", 2)];
        assert_eq!(plan_compaction(&ordered), vec![("a", 0), ("b", 1)]);
    }
}
