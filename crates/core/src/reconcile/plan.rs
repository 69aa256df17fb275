//! Pure reconciliation planner.
//!
//! Given the desired board (rank-ordered symbol/label pairs) and the
//! channels currently in the category, compute the minimal edit sequence
//! that makes the category match. Planning is separated from applying so
//! the algorithm is testable without a live host.

use std::collections::{HashMap, HashSet};

use tickerdeck_market_data::Quote;

use crate::config::ChannelId;
use crate::host::ChannelInfo;

use super::label::extract_symbol;

/// One channel edit.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Edit {
    /// Create a channel with the given name at the given position.
    Create { name: String, position: usize },
    /// Rename an existing channel.
    Rename { id: ChannelId, name: String },
    /// Move an existing channel to a new position.
    Move { id: ChannelId, position: usize },
    /// Delete a channel.
    Delete { id: ChannelId },
}

/// A desired board entry: symbol plus its rendered label.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DesiredChannel {
    pub symbol: String,
    pub name: String,
}

impl DesiredChannel {
    pub fn new(symbol: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            symbol: symbol.into(),
            name: name.into(),
        }
    }
}

/// Plan a full reconciliation pass.
///
/// `desired` is ordered by rank (descending market cap, ties stable);
/// `tracked` is the set of symbols this board owns; `pending` are tracked
/// symbols the upstream omitted this pass, which must be left exactly as
/// they are until data returns.
///
/// Channels whose leading label token is not a tracked symbol are foreign
/// and invisible to the planner. A second channel carrying an
/// already-mapped key violates the one-channel-per-symbol invariant and is
/// deleted.
///
/// The returned edits keep creations, renames, and moves in ascending rank
/// order, so a host that honors position edits immediately converges to
/// exactly the desired order. Deletions follow at the end.
pub fn plan_full(
    desired: &[DesiredChannel],
    tracked: &HashSet<String>,
    pending: &HashSet<String>,
    existing: &[ChannelInfo],
) -> Vec<Edit> {
    let mut duplicate_deletes = Vec::new();
    let mut by_key: HashMap<&str, &ChannelInfo> = HashMap::new();
    for info in existing {
        let Some(key) = extract_symbol(&info.name) else {
            continue;
        };
        if !tracked.contains(key) {
            continue;
        }
        if by_key.contains_key(key) {
            duplicate_deletes.push(Edit::Delete { id: info.id });
            continue;
        }
        by_key.insert(key, info);
    }

    let mut edits = Vec::new();
    let mut processed: HashSet<&str> = HashSet::new();

    for (rank, entry) in desired.iter().enumerate() {
        match by_key.get(entry.symbol.as_str()) {
            Some(info) => {
                // The label and position checks are independent; either,
                // both, or neither may fire.
                if info.name != entry.name {
                    edits.push(Edit::Rename {
                        id: info.id,
                        name: entry.name.clone(),
                    });
                }
                if info.position != rank {
                    edits.push(Edit::Move {
                        id: info.id,
                        position: rank,
                    });
                }
            }
            None => {
                edits.push(Edit::Create {
                    name: entry.name.clone(),
                    position: rank,
                });
            }
        }
        processed.insert(entry.symbol.as_str());
    }

    for (key, info) in &by_key {
        if processed.contains(key) || pending.contains(*key) {
            continue;
        }
        edits.push(Edit::Delete { id: info.id });
    }
    edits.extend(duplicate_deletes);

    edits
}

/// Target rank for a symbol within a rank-sorted quote list.
///
/// `sorted` must already be ordered descending by market cap. Returns the
/// rank and the matching quote, or `None` when the upstream had no data
/// for the symbol.
pub fn plan_insert<'a>(sorted: &'a [Quote], symbol: &str) -> Option<(usize, &'a Quote)> {
    sorted
        .iter()
        .position(|quote| quote.symbol == symbol)
        .map(|rank| (rank, &sorted[rank]))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn channel(id: ChannelId, name: &str, position: usize) -> ChannelInfo {
        ChannelInfo {
            id,
            name: name.to_string(),
            position,
        }
    }

    fn tracked(symbols: &[&str]) -> HashSet<String> {
        symbols.iter().map(|s| s.to_string()).collect()
    }

    fn desired(entries: &[(&str, &str)]) -> Vec<DesiredChannel> {
        entries
            .iter()
            .map(|(symbol, name)| DesiredChannel::new(*symbol, *name))
            .collect()
    }

    #[test]
    fn test_empty_category_creates_in_rank_order() {
        let plan = plan_full(
            &desired(&[
                ("BTC", "BTC 📈 $64124"),
                ("ETH", "ETH 📈 $2512.30"),
                ("SOL", "SOL 📉 $132.11"),
            ]),
            &tracked(&["BTC", "ETH", "SOL"]),
            &HashSet::new(),
            &[],
        );
        assert_eq!(
            plan,
            vec![
                Edit::Create {
                    name: "BTC 📈 $64124".to_string(),
                    position: 0,
                },
                Edit::Create {
                    name: "ETH 📈 $2512.30".to_string(),
                    position: 1,
                },
                Edit::Create {
                    name: "SOL 📉 $132.11".to_string(),
                    position: 2,
                },
            ]
        );
    }

    #[test]
    fn test_matching_state_plans_nothing() {
        let existing = vec![
            channel(1, "BTC 📈 $64124", 0),
            channel(2, "ETH 📈 $2512.30", 1),
        ];
        let plan = plan_full(
            &desired(&[("BTC", "BTC 📈 $64124"), ("ETH", "ETH 📈 $2512.30")]),
            &tracked(&["BTC", "ETH"]),
            &HashSet::new(),
            &existing,
        );
        assert!(plan.is_empty());
    }

    #[test]
    fn test_rename_and_move_are_independent() {
        let existing = vec![
            // Stale label, right position.
            channel(1, "BTC 📉 $63000", 0),
            // Right label, wrong position.
            channel(2, "ETH 📈 $2512.30", 2),
            // Wrong label and position.
            channel(3, "SOL 📈 $140.00", 1),
        ];
        let plan = plan_full(
            &desired(&[
                ("BTC", "BTC 📈 $64124"),
                ("ETH", "ETH 📈 $2512.30"),
                ("SOL", "SOL 📉 $132.11"),
            ]),
            &tracked(&["BTC", "ETH", "SOL"]),
            &HashSet::new(),
            &existing,
        );
        assert_eq!(
            plan,
            vec![
                Edit::Rename {
                    id: 1,
                    name: "BTC 📈 $64124".to_string(),
                },
                Edit::Move { id: 2, position: 1 },
                Edit::Rename {
                    id: 3,
                    name: "SOL 📉 $132.11".to_string(),
                },
                Edit::Move { id: 3, position: 2 },
            ]
        );
    }

    #[test]
    fn test_drift_heal_touches_only_the_drifted_channel() {
        // XRP was manually renamed and moved; BTC is untouched.
        let existing = vec![
            channel(1, "BTC 📈 $64124", 0),
            channel(2, "XRP renamed by hand", 5),
        ];
        let plan = plan_full(
            &desired(&[("BTC", "BTC 📈 $64124"), ("XRP", "XRP 📈 $0.5100")]),
            &tracked(&["BTC", "XRP"]),
            &HashSet::new(),
            &existing,
        );
        assert_eq!(
            plan,
            vec![
                Edit::Rename {
                    id: 2,
                    name: "XRP 📈 $0.5100".to_string(),
                },
                Edit::Move { id: 2, position: 1 },
            ]
        );
    }

    #[test]
    fn test_untracked_symbols_are_deleted() {
        let existing = vec![
            channel(1, "BTC 📈 $64124", 0),
            channel(2, "ETH 📈 $2512.30", 1),
        ];
        // ETH is still in the tracked set but no longer desired and not
        // pending data, so its channel goes.
        let plan = plan_full(
            &desired(&[("BTC", "BTC 📈 $64124")]),
            &tracked(&["BTC", "ETH"]),
            &HashSet::new(),
            &existing,
        );
        assert_eq!(plan, vec![Edit::Delete { id: 2 }]);
    }

    #[test]
    fn test_pending_symbols_are_left_alone() {
        // The upstream omitted ETH this pass: its channel is neither
        // renamed, moved, nor deleted.
        let existing = vec![
            channel(1, "BTC 📈 $64124", 0),
            channel(2, "ETH 📈 $2512.30", 1),
        ];
        let pending: HashSet<String> = tracked(&["ETH"]);
        let plan = plan_full(
            &desired(&[("BTC", "BTC 📈 $64124")]),
            &tracked(&["BTC", "ETH"]),
            &pending,
            &existing,
        );
        assert!(plan.is_empty());
    }

    #[test]
    fn test_foreign_channels_are_invisible() {
        let existing = vec![
            channel(1, "General", 0),
            channel(2, "music lounge", 1),
            channel(3, "BTC 📈 $64124", 2),
        ];
        let plan = plan_full(
            &desired(&[("BTC", "BTC 📈 $64124")]),
            &tracked(&["BTC"]),
            &HashSet::new(),
            &existing,
        );
        // Only BTC is ours, and only its position is wrong.
        assert_eq!(plan, vec![Edit::Move { id: 3, position: 0 }]);
    }

    #[test]
    fn test_duplicate_keys_are_deleted() {
        let existing = vec![
            channel(1, "BTC 📈 $64124", 0),
            channel(2, "BTC 📉 $63000", 1),
        ];
        let plan = plan_full(
            &desired(&[("BTC", "BTC 📈 $64124")]),
            &tracked(&["BTC"]),
            &HashSet::new(),
            &existing,
        );
        assert_eq!(plan, vec![Edit::Delete { id: 2 }]);
    }

    #[test]
    fn test_plan_insert_ranks_by_position_in_sorted_list() {
        let sorted = vec![
            test_quote("BTC", 3.0),
            test_quote("SOL", 2.0),
            test_quote("ETH", 1.0),
        ];
        let (rank, quote) = plan_insert(&sorted, "SOL").unwrap();
        assert_eq!(rank, 1);
        assert_eq!(quote.symbol, "SOL");
        assert!(plan_insert(&sorted, "XRP").is_none());
    }

    fn test_quote(symbol: &str, market_cap: f64) -> Quote {
        Quote {
            symbol: symbol.to_string(),
            name: symbol.to_string(),
            slug: symbol.to_lowercase(),
            price_usd: 1.0,
            percent_change_1h: 0.0,
            percent_change_24h: 0.0,
            percent_change_7d: 0.0,
            market_cap,
            volume_24h: 0.0,
            last_updated: String::new(),
        }
    }
}
