#![no_main]

use arbitrary::Unstructured;
use libfuzzer_sys::fuzz_target;
use sightline::{arbitrary::scene_points, Scene, SegmentRole, EPS};

fuzz_target!(|data: &[u8]| {
    let mut u = Unstructured::new(data);
    let (points, observer) = scene_points(&mut u).unwrap();
    let scene = Scene::new(points, observer).unwrap();
    let vis = scene.compute(EPS);

    for idx in 0..scene.points().len() {
        assert_eq!(vis.is_visible(idx), vis.blockers(idx).is_empty());
        for &blocker in vis.blockers(idx) {
            let SegmentRole::Occluder { a, b } = scene.role(blocker) else {
                panic!("{blocker:?} is not an occluder");
            };
            assert!(a != idx && b != idx);
        }
    }
    assert_eq!(vis, scene.compute(EPS));
});
