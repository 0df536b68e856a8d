//! Operator selection of the sweep grid
//!
//! Each grid dimension comes from the command line or, when absent there,
//! from a whitespace-separated line typed at a prompt.

use anyhow::{anyhow, bail, Context, Result};
use dialoguer::Input;
use receval_core::Algorithm;
use std::str::FromStr;
use strum::IntoEnumIterator;

/// The three grid dimensions chosen by the operator
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SweepSelection {
    pub algorithms: Vec<Algorithm>,
    pub neighbourhood_sizes: Vec<usize>,
    pub recommendation_counts: Vec<usize>,
}

/// Parse algorithm selectors (`1`-`4`) or slugs separated by whitespace or commas
pub fn parse_algorithms(line: &str) -> Result<Vec<Algorithm>> {
    let algorithms = tokens(line)
        .map(|token| {
            Algorithm::from_str(token).map_err(|_| anyhow!("Unknown algorithm selector '{token}'"))
        })
        .collect::<Result<Vec<_>>>()?;

    if algorithms.is_empty() {
        bail!("At least one algorithm is required");
    }
    Ok(algorithms)
}

/// Parse positive integers separated by whitespace or commas
pub fn parse_positive_list(line: &str, what: &str) -> Result<Vec<usize>> {
    let values = tokens(line)
        .map(|token| {
            let value: usize = token
                .parse()
                .with_context(|| format!("Invalid {what} '{token}'"))?;
            if value == 0 {
                bail!("{what} must be greater than 0");
            }
            Ok(value)
        })
        .collect::<Result<Vec<_>>>()?;

    if values.is_empty() {
        bail!("At least one {what} is required");
    }
    Ok(values)
}

fn tokens(line: &str) -> impl Iterator<Item = &str> {
    line.split(|c: char| c.is_whitespace() || c == ',')
        .filter(|token| !token.is_empty())
}

/// The numbered algorithm menu shown before the algorithm prompt
pub fn algorithm_menu() -> String {
    Algorithm::iter()
        .map(|algorithm| format!("{}. {}", algorithm.selector(), algorithm.description()))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Fill every dimension missing from the command line by prompting
pub fn resolve_selection(
    algorithms: Vec<String>,
    neighbourhood_sizes: Vec<usize>,
    recommendation_counts: Vec<usize>,
) -> Result<SweepSelection> {
    let algorithms = if algorithms.is_empty() {
        println!("{}", algorithm_menu());
        prompt("Algorithms to evaluate", parse_algorithms)?
    } else {
        parse_algorithms(&algorithms.join(" "))?
    };

    let neighbourhood_sizes = if neighbourhood_sizes.is_empty() {
        prompt("Neighbourhood sizes", |line| {
            parse_positive_list(line, "neighbourhood size")
        })?
    } else {
        parse_positive_list(&join(&neighbourhood_sizes), "neighbourhood size")?
    };

    let recommendation_counts = if recommendation_counts.is_empty() {
        prompt("Recommendation counts", |line| {
            parse_positive_list(line, "recommendation count")
        })?
    } else {
        parse_positive_list(&join(&recommendation_counts), "recommendation count")?
    };

    Ok(SweepSelection {
        algorithms,
        neighbourhood_sizes,
        recommendation_counts,
    })
}

fn join(values: &[usize]) -> String {
    values
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(" ")
}

/// Ask for one line until it parses
fn prompt<T>(label: &str, parse: impl Fn(&str) -> Result<T>) -> Result<T> {
    let line: String = Input::new()
        .with_prompt(format!("{label} (separated by spaces)"))
        .validate_with(|input: &String| parse(input).map(|_| ()).map_err(|e| e.to_string()))
        .interact_text()
        .map_err(|e| anyhow!("Failed to read {label}: {e}"))?;
    parse(&line)
}
