use libtest_mimic::{Arguments, Failed, Trial};
use serde::Deserialize;
use sightline::{Point, Scene, Segment, EPS};
use std::path::{Path, PathBuf};

#[derive(Deserialize, Debug)]
struct RegressionCaseDeclaration {
    points: Vec<(f64, f64)>,
    observer: (f64, f64),
    epsilon: Option<f64>,
    /// The indices of the points that should be visible. If this is missing,
    /// we only compare against the brute-force answer.
    visible: Option<Vec<usize>>,
}

fn main() {
    let args = Arguments::from_args();
    let tests = regression_tests();

    libtest_mimic::run(&args, tests).exit();
}

fn regression_tests() -> Vec<Trial> {
    let ws = std::env::var("CARGO_MANIFEST_DIR").unwrap();
    let file_paths = glob::glob(&format!("{ws}/tests/regression/**/*.yml")).unwrap();

    file_paths
        .into_iter()
        .map(|p| {
            let p = p.unwrap();
            let name = input_path_base(&p).display().to_string();
            Trial::test(name, || generate_regression_test(p))
        })
        .collect()
}

fn input_path_base(input_path: &Path) -> &Path {
    let ws = std::env::var("CARGO_MANIFEST_DIR").unwrap();
    let base = format!("{ws}/tests/regression");
    input_path.strip_prefix(base).unwrap()
}

// A point is hidden if some segment between two other points meets its ray
// anywhere but at the observer.
fn brute_force_visibility(points: &[Point], observer: Point, eps: f64) -> Vec<bool> {
    (0..points.len())
        .map(|p| {
            let ray = Segment::new(observer, points[p]);
            !(0..points.len()).any(|a| {
                ((a + 1)..points.len()).any(|b| {
                    let occluder = Segment::new(points[a], points[b]);
                    a != p
                        && b != p
                        && !ray.shares_endpoint(&occluder, eps)
                        && ray
                            .intersection(&occluder, eps)
                            .is_some_and(|x| !x.approx_eq(&observer, eps))
                })
            })
        })
        .collect()
}

fn generate_regression_test(path: PathBuf) -> Result<(), Failed> {
    let input = std::fs::read_to_string(&path).unwrap();
    let case: RegressionCaseDeclaration = serde_yaml::from_str(&input).unwrap();
    let points: Vec<Point> = case.points.iter().copied().map(Point::from).collect();
    let observer = Point::from(case.observer);
    let eps = case.epsilon.unwrap_or(EPS);

    let scene = Scene::new(points.clone(), observer)?;
    let vis = scene.compute(eps);

    if let Some(expected) = case.visible {
        let actual: Vec<_> = vis.visible_indices().collect();
        if actual != expected {
            return Err(format!("expected {expected:?} to be visible, got {actual:?}").into());
        }
    }

    let expected = brute_force_visibility(&points, observer, eps);
    if vis.visible_mask() != expected.as_slice() {
        return Err(format!(
            "sweep says {:?}, brute force says {expected:?}",
            vis.visible_mask()
        )
        .into());
    }
    Ok(())
}
