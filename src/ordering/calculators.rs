//! Display-order calculation functions.
//!
//! Pure functions over persisted rank maps - no database access. A rank map
//! assigns zero-based integer ranks to the keys of one sibling group;
//! missing entries sort last.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// Persisted display-rank index for one sibling group
pub type OrderMap = HashMap<String, i64>;

/// Direction of a single adjacent move
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MoveDirection {
    Up,
    Down,
}

/// Compute the rank map after moving one item up or down by one position.
///
/// Boundary moves (first item up, last item down, index out of range) return
/// the input unchanged; the UI disables those controls but the engine must
/// stay safe when invoked anyway. The input map is never mutated.
///
/// When both affected keys carry a persisted rank, exactly those two ranks
/// are swapped and every other entry is untouched. When either is missing
/// (malformed or partially persisted data), the result is re-derived as
/// contiguous ranks over `ordered_keys` with the swap applied, which is
/// deterministic and never panics.
pub fn move_adjacent(
    order: &OrderMap,
    ordered_keys: &[String],
    index: usize,
    direction: MoveDirection,
) -> OrderMap {
    let out_of_bounds = match direction {
        MoveDirection::Up => index == 0 || index >= ordered_keys.len(),
        MoveDirection::Down => index + 1 >= ordered_keys.len(),
    };
    if out_of_bounds {
        return order.clone();
    }

    let neighbor = match direction {
        MoveDirection::Up => index - 1,
        MoveDirection::Down => index + 1,
    };
    let key_a = &ordered_keys[index];
    let key_b = &ordered_keys[neighbor];

    match (order.get(key_a), order.get(key_b)) {
        (Some(&rank_a), Some(&rank_b)) => {
            let mut next = order.clone();
            next.insert(key_a.clone(), rank_b);
            next.insert(key_b.clone(), rank_a);
            next
        }
        _ => {
            let mut next: OrderMap = ordered_keys
                .iter()
                .enumerate()
                .map(|(rank, key)| (key.clone(), rank as i64))
                .collect();
            next.insert(key_a.clone(), neighbor as i64);
            next.insert(key_b.clone(), index as i64);
            next
        }
    }
}

/// Sort items ascending by their persisted rank.
///
/// Items missing from the map sort last; ties (including multiple missing
/// entries) preserve the original relative order. Unknown keys in the map
/// are ignored.
pub fn derive_sequence<T, K>(order: &OrderMap, items: Vec<T>, key_of: K) -> Vec<T>
where
    K: Fn(&T) -> String,
{
    let mut items = items;
    // stable sort keeps golden orderings deterministic across calls
    items.sort_by_cached_key(|item| order.get(&key_of(item)).copied().unwrap_or(i64::MAX));
    items
}

#[cfg(test)]
mod tests {
    use super::*;

    fn keys(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    fn map(entries: &[(&str, i64)]) -> OrderMap {
        entries
            .iter()
            .map(|(k, v)| (k.to_string(), *v))
            .collect()
    }

    // ==================== move_adjacent tests ====================

    #[test]
    fn test_move_up_swaps_adjacent_ranks() {
        let order = map(&[("wheels", 0), ("paint", 1), ("glass", 2)]);
        let sequence = keys(&["wheels", "paint", "glass"]);

        let next = move_adjacent(&order, &sequence, 1, MoveDirection::Up);

        assert_eq!(next["paint"], 0);
        assert_eq!(next["wheels"], 1);
        assert_eq!(next["glass"], 2);
    }

    #[test]
    fn test_move_down_swaps_adjacent_ranks() {
        let order = map(&[("wheels", 0), ("paint", 1), ("glass", 2)]);
        let sequence = keys(&["wheels", "paint", "glass"]);

        let next = move_adjacent(&order, &sequence, 1, MoveDirection::Down);

        assert_eq!(next["wheels"], 0);
        assert_eq!(next["glass"], 1);
        assert_eq!(next["paint"], 2);
    }

    #[test]
    fn test_move_up_at_first_index_is_noop() {
        let order = map(&[("wheels", 0), ("paint", 1)]);
        let sequence = keys(&["wheels", "paint"]);

        let next = move_adjacent(&order, &sequence, 0, MoveDirection::Up);

        assert_eq!(next, order);
    }

    #[test]
    fn test_move_down_at_last_index_is_noop() {
        let order = map(&[("wheels", 0), ("paint", 1)]);
        let sequence = keys(&["wheels", "paint"]);

        let next = move_adjacent(&order, &sequence, 1, MoveDirection::Down);

        assert_eq!(next, order);
    }

    #[test]
    fn test_move_out_of_range_is_noop() {
        let order = map(&[("wheels", 0), ("paint", 1)]);
        let sequence = keys(&["wheels", "paint"]);

        assert_eq!(move_adjacent(&order, &sequence, 7, MoveDirection::Up), order);
        assert_eq!(move_adjacent(&order, &sequence, 7, MoveDirection::Down), order);
    }

    #[test]
    fn test_move_on_empty_group_is_noop() {
        let order = OrderMap::new();
        assert!(move_adjacent(&order, &[], 0, MoveDirection::Down).is_empty());
    }

    #[test]
    fn test_swap_round_trip_restores_original() {
        let order = map(&[("a", 0), ("b", 1), ("c", 2), ("d", 3)]);
        let sequence = keys(&["a", "b", "c", "d"]);

        let down = move_adjacent(&order, &sequence, 1, MoveDirection::Down);
        let swapped = keys(&["a", "c", "b", "d"]);
        let back = move_adjacent(&down, &swapped, 2, MoveDirection::Up);

        assert_eq!(back, order);
    }

    #[test]
    fn test_input_map_is_not_mutated() {
        let order = map(&[("a", 0), ("b", 1)]);
        let sequence = keys(&["a", "b"]);

        let _ = move_adjacent(&order, &sequence, 0, MoveDirection::Down);

        assert_eq!(order["a"], 0);
        assert_eq!(order["b"], 1);
    }

    #[test]
    fn test_only_swapped_ranks_change() {
        // non-contiguous ranks stay untouched outside the swapped pair
        let order = map(&[("a", 10), ("b", 20), ("c", 97)]);
        let sequence = keys(&["a", "b", "c"]);

        let next = move_adjacent(&order, &sequence, 0, MoveDirection::Down);

        assert_eq!(next["a"], 20);
        assert_eq!(next["b"], 10);
        assert_eq!(next["c"], 97);
    }

    #[test]
    fn test_missing_rank_rederives_contiguous_order() {
        // "b" was never persisted; the result is a full contiguous map with
        // the swap applied
        let order = map(&[("a", 0), ("c", 2)]);
        let sequence = keys(&["a", "c", "b"]);

        let next = move_adjacent(&order, &sequence, 2, MoveDirection::Up);

        assert_eq!(next["a"], 0);
        assert_eq!(next["b"], 1);
        assert_eq!(next["c"], 2);
    }

    // ==================== derive_sequence tests ====================

    #[test]
    fn test_derive_sequence_sorts_by_rank() {
        let order = map(&[("glass", 0), ("wheels", 1), ("paint", 2)]);
        let items = vec!["wheels", "paint", "glass"];

        let sorted = derive_sequence(&order, items, |s| s.to_string());

        assert_eq!(sorted, vec!["glass", "wheels", "paint"]);
    }

    #[test]
    fn test_derive_sequence_missing_entries_sort_last() {
        let order = map(&[("paint", 0)]);
        let items = vec!["wheels", "paint", "glass"];

        let sorted = derive_sequence(&order, items, |s| s.to_string());

        assert_eq!(sorted, vec!["paint", "wheels", "glass"]);
    }

    #[test]
    fn test_derive_sequence_is_stable_on_ties() {
        let order = map(&[("a", 5), ("b", 5), ("c", 5)]);
        let items = vec!["b", "a", "c"];

        let sorted = derive_sequence(&order, items.clone(), |s| s.to_string());
        let again = derive_sequence(&order, sorted.clone(), |s| s.to_string());

        assert_eq!(sorted, vec!["b", "a", "c"]);
        assert_eq!(again, sorted);
    }

    #[test]
    fn test_derive_sequence_ignores_unknown_map_keys() {
        let order = map(&[("deleted-long-ago", 0), ("paint", 1)]);
        let items = vec!["wheels", "paint"];

        let sorted = derive_sequence(&order, items, |s| s.to_string());

        assert_eq!(sorted, vec!["paint", "wheels"]);
    }

    #[test]
    fn test_derive_sequence_empty() {
        let order = OrderMap::new();
        let sorted: Vec<&str> = derive_sequence(&order, vec![], |s: &&str| s.to_string());
        assert!(sorted.is_empty());
    }
}
