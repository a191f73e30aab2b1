use std::env;
use std::fs::File;
use std::io::BufRead;
use std::io::BufReader;

use anyhow::Context;
use anyhow::Result;
use anyhow::bail;

use frontier_rs::allocation::AllocationConfig;
use frontier_rs::allocation::AllocationEngine;
use frontier_rs::allocation::ReturnSeries;
use frontier_rs::plot::write_frontier_html;
use frontier_rs::report::print_report;

/// Parse a CSV of closing prices: a header row of tickers followed by one
/// row of prices per period. A leading `date` column is skipped.
fn read_prices(path: &str) -> Result<(Vec<String>, Vec<Vec<f64>>)> {
  let file = File::open(path).with_context(|| format!("failed opening {path}"))?;
  let mut lines = BufReader::new(file).lines();

  let header = lines
    .next()
    .context("price file is empty")?
    .context("failed reading header")?;
  let mut columns: Vec<String> = header.split(',').map(|c| c.trim().to_string()).collect();
  let skip_first = columns
    .first()
    .is_some_and(|c| c.eq_ignore_ascii_case("date"));
  if skip_first {
    columns.remove(0);
  }
  if columns.is_empty() {
    bail!("price file header carries no tickers");
  }

  let mut rows = Vec::new();
  for (lineno, line) in lines.enumerate() {
    let line = line.with_context(|| format!("failed reading line {}", lineno + 2))?;
    if line.trim().is_empty() {
      continue;
    }

    let fields: Vec<&str> = line.split(',').collect();
    let values = if skip_first { &fields[1..] } else { &fields[..] };
    if values.len() != columns.len() {
      bail!(
        "line {} has {} value(s) for {} ticker(s)",
        lineno + 2,
        values.len(),
        columns.len()
      );
    }

    let row = values
      .iter()
      .map(|v| v.trim().parse::<f64>())
      .collect::<Result<Vec<f64>, _>>()
      .with_context(|| format!("failed parsing line {}", lineno + 2))?;
    rows.push(row);
  }

  Ok((columns, rows))
}

fn main() -> Result<()> {
  let args: Vec<String> = env::args().collect();
  let path = args
    .get(1)
    .map(String::as_str)
    .context("usage: frontier-rs <prices.csv> [num_trials]")?;
  let num_trials = match args.get(2) {
    Some(raw) => raw
      .parse::<usize>()
      .context("num_trials must be a positive integer")?,
    None => 20_000,
  };

  let (tickers, prices) = read_prices(path)?;
  println!(
    "Loaded {} price row(s) for: {}",
    prices.len(),
    tickers.join(", ")
  );

  let series = ReturnSeries::from_prices(tickers.clone(), &prices)?;
  let engine = AllocationEngine::new(AllocationConfig {
    num_trials,
    parallel: true,
    ..AllocationConfig::default()
  });

  println!("Running Monte Carlo simulation ({num_trials} trials) and HRP...");
  let report = engine.run(&series)?;
  print_report(&tickers, &report);

  let output = "efficient_frontier_hrp.html";
  write_frontier_html(&report, output);
  println!("\nPlot saved as '{output}'");

  Ok(())
}
