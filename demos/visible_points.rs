use std::{io::Read, path::PathBuf, str::FromStr};

use anyhow::Context;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use sightline::{Point, Scene, EPS};

/// Prints the points that are visible from an observer.
///
/// The input is whitespace-separated: the number of points, then the
/// coordinates of each point, then the coordinates of the observer.
#[derive(Parser)]
struct Cli {
    /// Where to read the input from. Defaults to stdin.
    input: Option<PathBuf>,

    /// The tolerance used for all geometric comparisons.
    #[arg(long)]
    epsilon: Option<f64>,

    /// Also draw the scene to this file.
    #[arg(long)]
    svg: Option<PathBuf>,
}

#[derive(Debug, thiserror::Error)]
enum InputError {
    #[error("missing {0}")]
    Missing(&'static str),
    #[error("invalid {what}: {token:?}")]
    Invalid { what: &'static str, token: String },
}

fn parse_next<'a, T: FromStr>(
    tokens: &mut impl Iterator<Item = &'a str>,
    what: &'static str,
) -> Result<T, InputError> {
    let token = tokens.next().ok_or(InputError::Missing(what))?;
    token.parse().map_err(|_| InputError::Invalid {
        what,
        token: token.to_owned(),
    })
}

fn parse_point<'a>(
    tokens: &mut impl Iterator<Item = &'a str>,
    what: &'static str,
) -> Result<Point, InputError> {
    let x: f64 = parse_next(tokens, what)?;
    let y: f64 = parse_next(tokens, what)?;
    Ok(Point::from((x, y)))
}

fn parse_input(input: &str) -> Result<(Vec<Point>, Point), InputError> {
    let mut tokens = input.split_whitespace();
    let count: usize = parse_next(&mut tokens, "point count")?;
    let points = (0..count)
        .map(|_| parse_point(&mut tokens, "point coordinate"))
        .collect::<Result<Vec<_>, _>>()?;
    let observer = parse_point(&mut tokens, "observer coordinate")?;
    Ok((points, observer))
}

pub fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();
    let args = Cli::parse();

    let input = match &args.input {
        Some(path) => std::fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display()))?,
        None => {
            let mut buf = String::new();
            std::io::stdin()
                .read_to_string(&mut buf)
                .context("failed to read stdin")?;
            buf
        }
    };
    let (points, observer) = parse_input(&input).context("failed to parse input")?;

    let scene = Scene::new(points, observer)?;
    let vis = scene.compute(args.epsilon.unwrap_or(EPS));
    for p in scene.visible_points(&vis) {
        println!("{p}");
    }

    if let Some(path) = &args.svg {
        svg::save(path, &scene.dump_svg(&vis))
            .with_context(|| format!("failed to write {}", path.display()))?;
    }
    Ok(())
}
