//! Markdown report for a single run.

use swinglab_core::engine::BacktestResult;

/// Render the Markdown report: metadata, performance table, trade tape.
pub fn render(result: &BacktestResult) -> String {
    let m = &result.metrics;
    let mut md = String::with_capacity(2048);

    md.push_str("# Backtest Report\n\n");

    md.push_str("## Metadata\n\n");
    md.push_str("| Field | Value |\n");
    md.push_str("| --- | --- |\n");
    md.push_str(&format!("| Strategy | {} |\n", result.strategy_name));
    md.push_str(&format!("| Symbol | {} |\n", result.symbol));
    md.push_str(&format!(
        "| Period | {} to {} |\n",
        result.start_date, result.end_date
    ));
    md.push_str(&format!("| Bars | {} |\n", result.dates.len()));
    md.push_str(&format!("| Signals | {} |\n", result.signals.len()));
    md.push_str(&format!(
        "| Initial Capital | {:.2} |\n",
        result.initial_capital
    ));
    md.push_str(&format!("| Final Capital | {:.2} |\n", result.final_capital));
    md.push('\n');

    md.push_str("## Performance\n\n");
    md.push_str("| Metric | Value |\n");
    md.push_str("| --- | --- |\n");
    md.push_str(&format!(
        "| Total Return | {:.2} ({:.2}%) |\n",
        m.total_return,
        m.total_return_pct * 100.0
    ));
    md.push_str(&format!(
        "| Annualized Return | {:.2}% |\n",
        m.annualized_return * 100.0
    ));
    md.push_str(&format!("| Sharpe | {:.3} |\n", m.sharpe_ratio));
    md.push_str(&format!("| Sortino | {:.3} |\n", m.sortino_ratio));
    md.push_str(&format!("| Calmar | {:.3} |\n", m.calmar_ratio));
    md.push_str(&format!(
        "| Max Drawdown | {:.2}% ({:.2}) |\n",
        m.max_drawdown_pct * 100.0,
        m.max_drawdown
    ));
    md.push_str(&format!("| Win Rate | {:.1}% |\n", m.win_rate * 100.0));
    md.push_str(&format!("| Profit Factor | {:.2} |\n", m.profit_factor));
    md.push_str(&format!("| Expectancy | {:.2} |\n", m.expectancy));
    md.push_str(&format!("| Avg Win | {:.2} |\n", m.avg_win));
    md.push_str(&format!("| Avg Loss | {:.2} |\n", m.avg_loss));
    md.push_str(&format!(
        "| Avg Holding | {:.1} days |\n",
        m.avg_holding_days
    ));
    md.push_str(&format!(
        "| Trades | {} ({} wins, {} losses) |\n",
        m.total_trades, m.winning_trades, m.losing_trades
    ));
    md.push_str(&format!(
        "| Max Consecutive Wins | {} |\n",
        m.max_consecutive_wins
    ));
    md.push_str(&format!(
        "| Max Consecutive Losses | {} |\n",
        m.max_consecutive_losses
    ));
    md.push('\n');

    if !result.trades.is_empty() {
        md.push_str("## Trades\n\n");
        md.push_str("| Entry | Exit | Qty | Entry Px | Exit Px | PnL | Return | Held | Exit Reason |\n");
        md.push_str("| --- | --- | --- | --- | --- | --- | --- | --- | --- |\n");
        for t in &result.trades {
            md.push_str(&format!(
                "| {} | {} | {:.0} | {:.2} | {:.2} | {:+.2} | {:+.2}% | {}d | {} |\n",
                t.entry_date,
                t.exit_date,
                t.quantity,
                t.entry_price,
                t.exit_price,
                t.pnl,
                t.return_pct() * 100.0,
                t.holding_days(),
                t.exit_reason
            ));
        }
        md.push('\n');
    }

    if result.final_position.is_some() {
        md.push_str(
            "Note: a position was still open at the end of the series and was \
             closed at the final bar's close.\n",
        );
    }

    md
}
