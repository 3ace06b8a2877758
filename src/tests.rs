use std::collections::HashSet;

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};

use super::*;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
struct TestData {
    begin: i32,
    end: i32,
    id: u32,
}

impl HasInterval<i32> for TestData {
    fn interval(&self) -> Interval<i32> {
        Interval::new(self.begin, self.end)
    }
}

struct EntryGenerator {
    rng: StdRng,
    unique: HashSet<(i32, i32)>,
    limit: i32,
    next_id: u32,
}

impl EntryGenerator {
    fn new(seed: [u8; 32]) -> Self {
        const LIMIT: i32 = 1000;
        Self {
            rng: SeedableRng::from_seed(seed),
            unique: HashSet::new(),
            limit: LIMIT,
            next_id: 0,
        }
    }

    fn next(&mut self) -> TestData {
        let begin = self.rng.gen_range(0..self.limit);
        let end = self.rng.gen_range(begin..self.limit);
        self.with_bounds(begin, end)
    }

    fn next_unique(&mut self) -> TestData {
        let mut entry = self.next();
        while self.unique.contains(&(entry.begin, entry.end)) {
            entry = self.next();
        }
        let _ignore = self.unique.insert((entry.begin, entry.end));
        entry
    }

    fn with_bounds(&mut self, begin: i32, end: i32) -> TestData {
        let id = self.next_id;
        self.next_id = self.next_id.wrapping_add(1);
        TestData { begin, end, id }
    }
}

fn with_tree_and_generator(test_fn: impl Fn(IntervalTree<i32, TestData>, EntryGenerator)) {
    let seeds = vec![[0; 32], [1; 32], [2; 32]];
    for seed in seeds {
        let gen = EntryGenerator::new(seed);
        let tree = IntervalTree::new();
        test_fn(tree, gen);
    }
}

#[test]
fn red_black_tree_properties_are_satisfied() {
    with_tree_and_generator(|mut tree, mut gen| {
        let entries: Vec<_> = std::iter::repeat_with(|| gen.next_unique())
            .take(1000)
            .collect();
        for e in entries {
            tree.insert(e);
        }
        tree.check_invariants();
    });
}

#[test]
fn invariants_hold_after_every_mutation() {
    with_tree_and_generator(|mut tree, mut gen| {
        let mut entries: Vec<_> = std::iter::repeat_with(|| gen.next_unique())
            .take(1000)
            .collect();
        for e in entries.clone() {
            tree.insert(e);
            tree.check_invariants();
        }
        assert_eq!(tree.len(), 1000);
        entries.shuffle(&mut gen.rng);
        for e in &entries {
            assert!(tree.remove(e));
            tree.check_invariants();
        }
        assert_eq!(tree.len(), 0);
        assert!(tree.is_empty());
        assert_eq!(tree.node_count(), 0);
        assert_eq!(tree.max_end(), None);
    });
}

#[test]
fn tree_len_counts_entries_not_nodes() {
    with_tree_and_generator(|mut tree, mut gen| {
        let entries: Vec<_> = std::iter::repeat_with(|| gen.next_unique())
            .take(100)
            .collect();
        for e in entries.clone() {
            // A twin under the same interval shares the node
            let twin = gen.with_bounds(e.begin, e.end);
            tree.insert(e);
            tree.insert(twin);
        }
        assert_eq!(tree.len(), 200);
        assert_eq!(tree.node_count(), 100);
        for e in &entries {
            assert!(tree.remove(e));
        }
        assert_eq!(tree.len(), 100);
        assert_eq!(tree.node_count(), 100);
    });
}

#[test]
fn find_overlapping_is_sound_and_complete() {
    with_tree_and_generator(|mut tree, mut gen| {
        let entries: Vec<_> = std::iter::repeat_with(|| gen.next_unique())
            .take(1000)
            .collect();
        for e in entries.clone() {
            tree.insert(e);
        }
        let queries: Vec<_> = std::iter::repeat_with(|| gen.next()).take(1000).collect();

        for q in queries {
            let query = q.interval();
            let mut expect: Vec<u32> = entries
                .iter()
                .filter(|e| e.interval().overlaps(&query))
                .map(|e| e.id)
                .collect();
            let mut result: Vec<u32> = tree
                .find_overlapping(&query)
                .into_iter()
                .map(|e| e.id)
                .collect();
            expect.sort_unstable();
            result.sort_unstable();
            assert_eq!(expect, result);
        }
    });
}

#[test]
fn remove_non_exist_entry_will_do_nothing() {
    with_tree_and_generator(|mut tree, mut gen| {
        let entries: Vec<_> = std::iter::repeat_with(|| gen.next_unique())
            .take(1000)
            .collect();
        for e in entries {
            tree.insert(e);
        }
        assert_eq!(tree.len(), 1000);
        let absent: Vec<_> = std::iter::repeat_with(|| gen.next_unique())
            .take(1000)
            .collect();
        for e in &absent {
            assert!(!tree.remove(e));
        }
        assert_eq!(tree.len(), 1000);
        tree.check_invariants();
    });
}

#[test]
fn remove_with_wrong_entry_under_present_interval_is_noop() {
    let mut tree = IntervalTree::new();
    let a = TestData {
        begin: 1,
        end: 5,
        id: 0,
    };
    let impostor = TestData {
        begin: 1,
        end: 5,
        id: 99,
    };
    tree.insert(a.clone());
    assert!(!tree.remove(&impostor));
    assert_eq!(tree.len(), 1);
    assert_eq!(tree.lookup(&Interval::new(1, 5)), [&a].into());
}

#[test]
fn entries_with_equal_intervals_share_one_node() {
    let mut tree = IntervalTree::new();
    let d1 = TestData {
        begin: 3,
        end: 3,
        id: 1,
    };
    let d2 = TestData {
        begin: 3,
        end: 3,
        id: 2,
    };
    tree.insert(d1.clone());
    tree.insert(d2.clone());
    assert_eq!(tree.node_count(), 1);
    assert_eq!(tree.lookup(&Interval::new(3, 3)), [&d1, &d2].into());

    assert!(tree.remove(&d1));
    tree.check_invariants();
    assert_eq!(tree.lookup(&Interval::new(3, 3)), [&d2].into());
    assert_eq!(tree.find_overlapping(&Interval::new(3, 3)), [&d2]);
    assert_eq!(tree.node_count(), 1);

    assert!(tree.remove(&d2));
    assert!(tree.lookup(&Interval::new(3, 3)).is_empty());
    assert!(tree.get_all().is_empty());
    assert_eq!(tree.node_count(), 0);
}

#[test]
fn multiplicity_survives_random_churn() {
    with_tree_and_generator(|mut tree, mut gen| {
        let mut kept = Vec::new();
        for _ in 0..100 {
            let proto = gen.next_unique();
            let copies = gen.rng.gen_range(2..10);
            let mut batch: Vec<_> = (0..copies)
                .map(|_| gen.with_bounds(proto.begin, proto.end))
                .collect();
            for e in batch.clone() {
                tree.insert(e);
            }
            // Drop one of each batch again
            let victim = batch.pop().unwrap();
            assert!(tree.remove(&victim));
            kept.extend(batch);
        }
        tree.check_invariants();
        for e in &kept {
            assert!(tree.lookup(&e.interval()).contains(e));
            assert!(tree.find_overlapping(&e.interval()).contains(&e));
        }
    });
}

#[test]
fn overlap_query_prunes_to_exact_matches() {
    let mut tree = IntervalTree::new();
    let a = TestData {
        begin: 1,
        end: 5,
        id: 0,
    };
    let b = TestData {
        begin: 10,
        end: 20,
        id: 1,
    };
    let c = TestData {
        begin: 15,
        end: 25,
        id: 2,
    };
    tree.insert(a);
    tree.insert(b.clone());
    tree.insert(c);

    // A ends at 5 < 6 and C begins at 15 > 12
    assert_eq!(tree.find_overlapping(&Interval::new(6, 12)), [&b]);
}

#[test]
fn max_end_tracks_removals() {
    let mut tree = IntervalTree::new();
    let e = TestData {
        begin: 0,
        end: 100,
        id: 0,
    };
    let f = TestData {
        begin: 0,
        end: 50,
        id: 1,
    };
    assert_eq!(tree.max_end(), None);
    tree.insert(e.clone());
    assert_eq!(tree.max_end(), Some(&100));
    tree.insert(f);
    assert_eq!(tree.max_end(), Some(&100));
    assert!(tree.remove(&e));
    assert_eq!(tree.max_end(), Some(&50));
}

#[test]
fn lookup_absent_interval_returns_empty_set() {
    with_tree_and_generator(|mut tree, mut gen| {
        for _ in 0..100 {
            let e = gen.next_unique();
            tree.insert(e);
        }
        let absent = gen.next_unique();
        assert!(tree.lookup(&absent.interval()).is_empty());
    });
}

#[test]
fn get_all_returns_every_entry() {
    with_tree_and_generator(|mut tree, mut gen| {
        let mut entries: Vec<_> = std::iter::repeat_with(|| gen.next_unique())
            .take(500)
            .collect();
        // Double some of them up under shared intervals
        let twins: Vec<_> = entries
            .iter()
            .take(50)
            .map(|e| gen.with_bounds(e.begin, e.end))
            .collect();
        entries.extend(twins);
        for e in entries.clone() {
            tree.insert(e);
        }
        let all = tree.get_all();
        assert_eq!(all.len(), entries.len());
        for e in &entries {
            assert!(all.contains(e));
        }
    });
}

#[test]
fn iterate_through_tree_is_sorted() {
    with_tree_and_generator(|mut tree, mut gen| {
        let mut entries: Vec<_> = std::iter::repeat_with(|| gen.next_unique())
            .take(1000)
            .collect();
        for e in entries.clone() {
            tree.insert(e);
        }
        entries.sort_unstable_by_key(|e| (e.begin, e.end));

        for ((interval, values), e) in tree.iter().zip(entries.iter()) {
            assert_eq!(interval, &e.interval());
            assert!(values.contains(e));
        }
    });
}

#[test]
fn insert_always_increments_len() {
    let mut tree = IntervalTree::new();
    let e = TestData {
        begin: 1,
        end: 2,
        id: 0,
    };
    tree.insert(e.clone());
    tree.insert(e);
    // Set semantics deduplicate the entry, the logical count does not
    assert_eq!(tree.len(), 2);
    assert_eq!(tree.node_count(), 1);
}

#[test]
fn clear_resets_the_tree() {
    let mut tree = IntervalTree::new();
    tree.insert(TestData {
        begin: 1,
        end: 3,
        id: 0,
    });
    tree.insert(TestData {
        begin: 2,
        end: 4,
        id: 1,
    });
    assert_eq!(tree.len(), 2);
    tree.clear();
    assert_eq!(tree.len(), 0);
    assert!(tree.is_empty());
    assert_eq!(tree.node_count(), 0);
    assert!(tree.nodes[0].is_sentinel());
}

#[test]
fn allocation_factor_does_not_change_results() {
    let mut small = IntervalTree::with_allocation_factor(0.0);
    let mut large = IntervalTree::with_allocation_factor(1.0);
    for (i, (begin, end)) in [(1, 5), (2, 8), (10, 12)].into_iter().enumerate() {
        let e = TestData {
            begin,
            end,
            id: i as u32,
        };
        small.insert(e.clone());
        large.insert(e);
    }
    let query = Interval::new(3, 11);
    let mut a: Vec<u32> = small.find_overlapping(&query).iter().map(|e| e.id).collect();
    let mut b: Vec<u32> = large.find_overlapping(&query).iter().map(|e| e.id).collect();
    a.sort_unstable();
    b.sort_unstable();
    assert_eq!(a, b);
}

#[test]
fn dump_renders_every_node() {
    let mut tree = IntervalTree::new();
    assert_eq!(tree.dump(), "<empty tree>\n");

    for (i, (begin, end)) in [(16, 21), (8, 9), (0, 23), (5, 6), (25, 30)]
        .into_iter()
        .enumerate()
    {
        tree.insert(TestData {
            begin,
            end,
            id: i as u32,
        });
    }
    let rendered = tree.dump();
    assert_eq!(rendered.lines().count(), 5);
    assert!(rendered.contains("25 / 30"));
    assert!(rendered.contains("0 / 23"));
}

#[cfg(feature = "serde")]
#[test]
fn serde_round_trip_preserves_entries() {
    let mut tree = IntervalTree::<i32, TestData>::new();
    for (i, (begin, end)) in [(1, 5), (3, 7), (2, 6), (3, 7)].into_iter().enumerate() {
        tree.insert(TestData {
            begin,
            end,
            id: i as u32,
        });
    }

    let serialized = serde_json::to_string(&tree).unwrap();
    let deserialized: IntervalTree<i32, TestData> = serde_json::from_str(&serialized).unwrap();

    deserialized.check_invariants();
    assert_eq!(deserialized.len(), tree.len());
    let dv: Vec<_> = deserialized.iter().map(|(i, _)| i.clone()).collect();
    let ev: Vec<_> = tree.iter().map(|(i, _)| i.clone()).collect();
    assert_eq!(ev, dv);
}
