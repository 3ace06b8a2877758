use interval_tree::{HasInterval, Interval, IntervalTree};

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct Marker {
    at: u32,
    label: &'static str,
}

impl HasInterval<u32> for Marker {
    fn interval(&self) -> Interval<u32> {
        // A closed interval can be a single point
        Interval::point(self.at)
    }
}

fn main() {
    let mut tree = IntervalTree::new();
    tree.insert(Marker { at: 5, label: "a" });
    tree.insert(Marker { at: 5, label: "b" });
    tree.insert(Marker { at: 9, label: "c" });

    assert_eq!(tree.lookup(&Interval::point(5)).len(), 2);
    assert_eq!(tree.node_count(), 2);

    // Point markers overlap any interval covering them
    let hits = tree.find_overlapping(&Interval::new(4, 8));
    assert_eq!(hits.len(), 2);
    assert!(hits.iter().all(|m| m.at == 5));

    println!("{}", tree.dump());
}
