use anyhow::{Context, Result, bail, ensure};
use std::collections::HashSet;

/// Seed used when no token names one.
pub const DEFAULT_SEED: u64 = 1337;

/// Widest range a single `start..end` token may expand to.
const MAX_RANGE_LEN: u64 = 10_000;

/// Resolve CLI seed tokens into a deduplicated, ordered seed list.
///
/// Supports literal integers (negative values use their magnitude) and
/// inclusive ranges written `start..end`.
pub fn resolve_seed_inputs(tokens: &[String]) -> Result<Vec<u64>> {
    let mut pending: Vec<u64> = Vec::new();

    for token in tokens {
        if token.is_empty() {
            continue;
        }

        if let Some((start, end)) = token.split_once("..") {
            pending.extend(parse_range(start, end).with_context(|| format!("bad seed range: {token}"))?);
            continue;
        }

        if let Ok(value) = token.parse::<i64>() {
            pending.push(value.unsigned_abs());
            continue;
        }

        if let Ok(value) = token.parse::<u64>() {
            pending.push(value);
            continue;
        }

        bail!("Unrecognized seed token: {token}");
    }

    let mut seen = HashSet::new();
    pending.retain(|seed| seen.insert(*seed));

    if pending.is_empty() {
        pending.push(DEFAULT_SEED);
    }

    Ok(pending)
}

fn parse_range(start: &str, end: &str) -> Result<std::ops::RangeInclusive<u64>> {
    let start: u64 = start.trim().parse().context("range start")?;
    let end: u64 = end.trim().parse().context("range end")?;
    ensure!(start <= end, "range start {start} is after end {end}");
    ensure!(
        end - start < MAX_RANGE_LEN,
        "range spans more than {MAX_RANGE_LEN} seeds"
    );
    Ok(start..=end)
}

/// Seed for one iteration of a base seed; iteration zero is the base itself.
#[must_use]
pub const fn iteration_seed(base: u64, iteration: u32) -> u64 {
    if iteration == 0 {
        return base;
    }
    base.wrapping_mul(0x9E37_79B9_7F4A_7C15)
        .wrapping_add(iteration as u64)
        .rotate_left(17)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolves_numeric_and_negative() {
        let raw = vec!["42".to_string(), "-7".to_string(), "42".to_string()];
        let seeds = resolve_seed_inputs(&raw).unwrap();
        assert_eq!(seeds, vec![42, 7]);
    }

    #[test]
    fn expands_inclusive_ranges() {
        let seeds = resolve_seed_inputs(&["3..6".to_string(), "5".to_string()]).unwrap();
        assert_eq!(seeds, vec![3, 4, 5, 6]);
        assert!(resolve_seed_inputs(&["9..2".to_string()]).is_err());
        assert!(resolve_seed_inputs(&["0..99999".to_string()]).is_err());
    }

    #[test]
    fn rejects_garbage_and_defaults_when_empty() {
        assert!(resolve_seed_inputs(&["CL-ORANGE42".to_string()]).is_err());
        assert_eq!(resolve_seed_inputs(&[]).unwrap(), vec![DEFAULT_SEED]);
    }

    #[test]
    fn iteration_seeds_differ_after_the_first() {
        assert_eq!(iteration_seed(1337, 0), 1337);
        assert_ne!(iteration_seed(1337, 1), 1337);
        assert_ne!(iteration_seed(1337, 1), iteration_seed(1337, 2));
    }
}
