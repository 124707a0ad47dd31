//! Markdown report generator.

use std::collections::BTreeMap;

use vwaplab_core::costs::TradePnl;

use crate::metrics::PerformanceMetrics;

pub struct MarkdownReportGenerator;

impl MarkdownReportGenerator {
    pub fn generate(&self, title: &str, pnl: &[TradePnl], metrics: &PerformanceMetrics) -> String {
        let mut report = format!(
            "# VWAPLab Run Report\n\n\
{title}\n\n\
## Summary\n\
- Trades: {}\n\
- Win Rate: {:.1}%\n\
- Expectancy: {:+.4}\n\
- Profit Factor: {}\n\
- Total Net P&L: {:+.4}\n\
- Max Drawdown: {:.4}\n",
            metrics.trades,
            metrics.win_rate * 100.0,
            metrics.expectancy,
            metrics.profit_factor_display(),
            metrics.total_net_pnl,
            metrics.max_drawdown,
        );

        if pnl.is_empty() {
            report.push_str("\nNo closed trades.\n");
            return report;
        }

        // Exit breakdown
        let mut by_exit: BTreeMap<&str, (usize, f64)> = BTreeMap::new();
        for p in pnl {
            let exit = p.reasons.rsplit('|').next().unwrap_or_default();
            let entry = by_exit.entry(exit).or_insert((0, 0.0));
            entry.0 += 1;
            entry.1 += p.net_pnl;
        }
        report.push_str("\n## Exits\n\n");
        report.push_str("| Exit | Count | Net P&L |\n");
        report.push_str("|------|-------|---------|\n");
        for (exit, (count, net)) in &by_exit {
            report.push_str(&format!("| {exit} | {count} | {net:+.4} |\n"));
        }

        let mut sorted: Vec<&TradePnl> = pnl.iter().collect();
        sorted.sort_by(|a, b| b.net_pnl.total_cmp(&a.net_pnl));

        report.push_str("\n## Trade Tape\n\n### Top Winners\n");
        push_trade_table(&mut report, sorted.iter().take(5).filter(|t| t.net_pnl > 0.0));
        report.push_str("\n### Top Losers\n");
        push_trade_table(&mut report, sorted.iter().rev().take(5).filter(|t| t.net_pnl <= 0.0));

        report
    }
}

fn push_trade_table<'a, 'b: 'a>(
    report: &mut String,
    trades: impl Iterator<Item = &'a &'b TradePnl>,
) {
    report.push_str("| Side | Entry ts | Exit ts | Entry | Exit | Net P&L | Reasons |\n");
    report.push_str("|------|----------|---------|-------|------|---------|---------|\n");
    for t in trades {
        report.push_str(&format!(
            "| {} | {} | {} | {:.4} | {:.4} | {:+.4} | {} |\n",
            t.side, t.entry_ts, t.exit_ts, t.entry_px_eff, t.exit_px_eff, t.net_pnl, t.reasons
        ));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use vwaplab_core::domain::Side;

    fn pnl(net: f64, exit: &str) -> TradePnl {
        TradePnl {
            symbol: "TEST".into(),
            side: Side::Long,
            entry_ts: 0,
            exit_ts: 60,
            entry_px_raw: 10.0,
            exit_px_raw: 10.0 + net,
            entry_px_eff: 10.0,
            exit_px_eff: 10.0 + net,
            gross_pnl: net,
            slippage_cost: 0.0,
            fee_cost: 0.0,
            net_pnl: net,
            reasons: format!("ENTRY_CROSS|ORDER_PLACED|LIMIT_FILLED|{exit}"),
        }
    }

    #[test]
    fn report_lists_summary_and_exits() {
        let ledger = vec![pnl(4.0, "TAKE_PROFIT"), pnl(-2.0, "STOP"), pnl(1.0, "TIME_STOP")];
        let metrics = PerformanceMetrics::compute(&[4.0, -2.0, 1.0]);
        let md = MarkdownReportGenerator.generate("TEST", &ledger, &metrics);

        assert!(md.contains("- Trades: 3"));
        assert!(md.contains("- Profit Factor: 2.5000"));
        assert!(md.contains("| STOP | 1 | -2.0000 |"));
        assert!(md.contains("| TAKE_PROFIT | 1 | +4.0000 |"));
        assert!(md.contains("### Top Losers"));
    }

    #[test]
    fn empty_ledger_report() {
        let md = MarkdownReportGenerator.generate("EMPTY", &[], &PerformanceMetrics::empty());
        assert!(md.contains("No closed trades."));
    }
}
