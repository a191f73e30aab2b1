//! # Report
//!
//! $$
//! (\mathbf{w}, \mu_p, \sigma_p) \mapsto \text{console tables}
//! $$
//!
//! Console rendering of allocation results. A reporting collaborator over
//! the core's output records; the core itself never prints.

use prettytable::Table;
use prettytable::row;

use crate::allocation::AllocationReport;
use crate::allocation::PortfolioResult;

/// Per-asset weight table for one portfolio.
pub fn allocation_table(assets: &[String], result: &PortfolioResult) -> Table {
  let mut table = Table::new();
  table.set_titles(row!["Asset", "Weight"]);
  for (asset, weight) in assets.iter().zip(result.weights.iter()) {
    table.add_row(row![asset, format!("{:.4}", weight)]);
  }
  table
}

/// Return/volatility/Sharpe summary across the three candidate portfolios.
pub fn summary_table(report: &AllocationReport) -> Table {
  let mut table = Table::new();
  table.set_titles(row!["Portfolio", "Return", "Volatility", "Sharpe"]);
  for (label, result) in [
    ("Max Sharpe", &report.frontier.max_sharpe),
    ("Min Volatility", &report.frontier.min_volatility),
    ("HRP", &report.hrp),
  ] {
    table.add_row(row![
      label,
      format!("{:.4}", result.expected_return),
      format!("{:.4}", result.volatility),
      format!("{:.4}", result.sharpe)
    ]);
  }
  table
}

/// Print the full run report to stdout.
pub fn print_report(assets: &[String], report: &AllocationReport) {
  println!("Summary");
  summary_table(report).printstd();

  for (label, result) in [
    ("Max Sharpe Ratio Portfolio", &report.frontier.max_sharpe),
    ("Min Volatility Portfolio", &report.frontier.min_volatility),
    ("HRP Portfolio", &report.hrp),
  ] {
    println!("\n{label}");
    allocation_table(assets, result).printstd();
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::allocation::AllocationConfig;
  use crate::allocation::AllocationEngine;
  use crate::allocation::ReturnSeries;

  #[test]
  fn tables_cover_every_asset_and_portfolio() {
    let assets = vec!["AAA".to_string(), "BBB".to_string()];
    let series = ReturnSeries::from_rows(
      assets.clone(),
      &[
        vec![0.010, -0.002],
        vec![-0.004, 0.006],
        vec![0.007, 0.001],
      ],
    )
    .unwrap();
    let report = AllocationEngine::new(AllocationConfig {
      num_trials: 50,
      ..AllocationConfig::default()
    })
    .run(&series)
    .unwrap();

    assert_eq!(
      allocation_table(&assets, &report.hrp).len(),
      assets.len()
    );
    assert_eq!(summary_table(&report).len(), 3);
  }
}
