use interval_tree::{HasInterval, Interval, IntervalTree};

/// A meeting-room booking over closed minute bounds.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct Booking {
    from: u32,
    until: u32,
    room: &'static str,
}

impl HasInterval<u32> for Booking {
    fn interval(&self) -> Interval<u32> {
        Interval::new(self.from, self.until)
    }
}

fn main() {
    let mut schedule = IntervalTree::new();
    schedule.insert(Booking {
        from: 540,
        until: 600,
        room: "fern",
    });
    schedule.insert(Booking {
        from: 540,
        until: 600,
        room: "ivy",
    });
    schedule.insert(Booking {
        from: 610,
        until: 720,
        room: "fern",
    });

    // Two rooms booked for exactly 9:00-10:00
    let nine_to_ten = Interval::new(540, 600);
    assert_eq!(schedule.lookup(&nine_to_ten).len(), 2);

    // Who is busy at any point between 9:50 and 10:20?
    let busy = schedule.find_overlapping(&Interval::new(590, 620));
    assert_eq!(busy.len(), 3);

    // The day ends when the last booking does
    assert_eq!(schedule.max_end(), Some(&720));

    let fern_morning = Booking {
        from: 540,
        until: 600,
        room: "fern",
    };
    assert!(schedule.remove(&fern_morning));
    assert_eq!(schedule.lookup(&nine_to_ten).len(), 1);

    println!("{}", schedule.dump());
}
