//! Loads saved skin weights and checks that they are safe to deform with.

use std::{fs::File, io::BufReader, path::PathBuf};

use anyhow::{Context, Result};
use clap::Parser;
use hotham_skin_weights::{SkinWeights, Validator};
use log::{info, LevelFilter};

/// Check that a saved skin weights file is valid.
///
/// Exits with a non-zero status if the file can't be loaded or fails validation.
#[derive(Parser, Debug)]
#[command(name = "skin-weights-check", version, about)]
struct Args {
    /// Skin weights saved as JSON
    path: PathBuf,

    /// Reject offsets equal to the number of weights, even on points with no influences
    #[arg(long)]
    strict: bool,

    /// Log every check as it runs
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();

    let level = if args.verbose {
        LevelFilter::Trace
    } else {
        LevelFilter::Info
    };
    env_logger::builder()
        .filter_level(level)
        .parse_default_env()
        .init();

    let path = args.path.display();
    let file = File::open(&args.path).with_context(|| format!("Unable to open {path}"))?;
    let skin_weights = SkinWeights::from_reader(BufReader::new(file))
        .with_context(|| format!("Unable to load skin weights from {path}"))?;

    let validator = Validator::builder()
        .strict_offset_bounds(args.strict)
        .build();
    validator
        .validate(&skin_weights)
        .with_context(|| format!("{path} is not valid"))?;

    info!(
        "{path} is valid: {} influences, {} points, {} weights",
        skin_weights.influence_count(),
        skin_weights.point_count(),
        skin_weights.point_influence_weights().len()
    );

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    pub fn test_args() {
        let args =
            Args::try_parse_from(["skin-weights-check", "arm.json", "--strict", "-v"]).unwrap();
        assert_eq!(args.path, PathBuf::from("arm.json"));
        assert!(args.strict);
        assert!(args.verbose);

        let args = Args::try_parse_from(["skin-weights-check", "arm.json"]).unwrap();
        assert!(!args.strict);
        assert!(!args.verbose);

        assert!(Args::try_parse_from(["skin-weights-check"]).is_err());
        assert!(Args::try_parse_from(["skin-weights-check", "a.json", "b.json"]).is_err());
    }

    #[test]
    pub fn test_command() {
        use clap::CommandFactory;
        Args::command().debug_assert();
    }
}
