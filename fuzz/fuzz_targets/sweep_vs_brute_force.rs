#![no_main]

use arbitrary::Unstructured;
use libfuzzer_sys::fuzz_target;
use sightline::{
    arbitrary::segments,
    sweep::{SweepState, Sweeper},
    Segments, EPS,
};

fuzz_target!(|data: &[u8]| {
    let mut u = Unstructured::new(data);
    let pairs = segments(&mut u).unwrap();
    let segs = Segments::from_pairs(pairs);
    let n = segs.len();

    let mut sweeper = Sweeper::new(&segs, segs.indices(), EPS);
    while sweeper.step().is_some() {}
    assert_eq!(sweeper.state(), SweepState::Done);
    assert!(sweeper.status().is_empty());

    let stats = *sweeper.stats();
    assert_eq!(stats.starts + stats.ends, 2 * n);
    assert!(stats.crossings <= n * n.saturating_sub(1) / 2);

    let crossings = sweeper.into_crossings();
    for i in segs.indices() {
        let mut found = crossings.get(i).to_vec();
        found.sort();
        let expected: Vec<_> = segs
            .indices()
            .filter(|&j| {
                i != j
                    && !segs[i].shares_endpoint(&segs[j], EPS)
                    && segs[i].intersection(&segs[j], EPS).is_some()
            })
            .collect();
        assert_eq!(found, expected, "crossings of {i:?}");
    }
});
