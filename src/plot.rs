//! # Plot
//!
//! $$
//! \{(\sigma_p^{(k)}, \mu_p^{(k)})\}_{k=1}^K \mapsto \text{frontier chart}
//! $$
//!
//! Plotly rendering of the Monte Carlo cloud with the max-Sharpe,
//! min-volatility and HRP portfolios highlighted. A plotting collaborator
//! over the core's output records.

use std::path::Path;

use plotly::Layout;
use plotly::Plot;
use plotly::Scatter;
use plotly::common::Marker;
use plotly::common::MarkerSymbol;
use plotly::common::Mode;
use plotly::common::Title;
use plotly::layout::Axis;

use crate::allocation::AllocationReport;
use crate::allocation::PortfolioResult;

fn star_trace(result: &PortfolioResult, name: &str) -> Box<Scatter<f64, f64>> {
  Scatter::new(vec![result.volatility], vec![result.expected_return])
    .mode(Mode::Markers)
    .marker(Marker::new().size(14).symbol(MarkerSymbol::Star))
    .name(name)
}

/// Build the efficient-frontier chart for one engine run.
pub fn frontier_plot(report: &AllocationReport) -> Plot {
  let vols: Vec<f64> = report.frontier.all.iter().map(|r| r.volatility).collect();
  let rets: Vec<f64> = report
    .frontier
    .all
    .iter()
    .map(|r| r.expected_return)
    .collect();

  let cloud = Scatter::new(vols, rets)
    .mode(Mode::Markers)
    .marker(Marker::new().size(4).opacity(0.3))
    .name("Simulated portfolios");

  let mut plot = Plot::new();
  plot.add_trace(cloud);
  plot.add_trace(star_trace(&report.frontier.max_sharpe, "Max Sharpe"));
  plot.add_trace(star_trace(&report.frontier.min_volatility, "Min Volatility"));
  plot.add_trace(star_trace(&report.hrp, "HRP"));
  plot.set_layout(
    Layout::new()
      .title(Title::from("Efficient Frontier vs HRP"))
      .x_axis(Axis::new().title(Title::from("Volatility (Std. Deviation)")))
      .y_axis(Axis::new().title(Title::from("Expected Return"))),
  );

  plot
}

/// Render the frontier chart and write it as a standalone HTML file.
pub fn write_frontier_html(report: &AllocationReport, path: impl AsRef<Path>) {
  frontier_plot(report).write_html(path);
}
