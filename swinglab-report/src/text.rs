//! Fixed-width console summary of a run.

use swinglab_core::engine::BacktestResult;

/// Render the console summary: header, capital, performance, trade tape.
pub fn render(result: &BacktestResult) -> String {
    let m = &result.metrics;
    let mut out = String::with_capacity(1024);

    out.push_str("=== Backtest Result ===\n");
    out.push_str(&format!("Strategy:       {}\n", result.strategy_name));
    out.push_str(&format!("Symbol:         {}\n", result.symbol));
    out.push_str(&format!(
        "Period:         {} to {}\n",
        result.start_date, result.end_date
    ));
    out.push_str(&format!("Bars:           {}\n", result.dates.len()));
    out.push_str(&format!("Signals:        {}\n", result.signals.len()));
    out.push_str(&format!("Initial:        {:.2}\n", result.initial_capital));
    out.push_str(&format!("Final:          {:.2}\n", result.final_capital));
    if let Some(pos) = &result.final_position {
        out.push_str(&format!(
            "Open at end:    {} x {:.2} from {} (force-closed)\n",
            pos.quantity, pos.entry_price, pos.entry_date
        ));
    }

    out.push('\n');
    out.push_str("--- Performance ---\n");
    out.push_str(&format!(
        "Total Return:   {:.2} ({:.2}%)\n",
        m.total_return,
        m.total_return_pct * 100.0
    ));
    out.push_str(&format!(
        "Annualized:     {:.2}%\n",
        m.annualized_return * 100.0
    ));
    out.push_str(&format!("Sharpe:         {:.3}\n", m.sharpe_ratio));
    out.push_str(&format!("Sortino:        {:.3}\n", m.sortino_ratio));
    out.push_str(&format!("Calmar:         {:.3}\n", m.calmar_ratio));
    out.push_str(&format!(
        "Max Drawdown:   {:.2}% ({:.2})\n",
        m.max_drawdown_pct * 100.0,
        m.max_drawdown
    ));
    out.push_str(&format!("Win Rate:       {:.1}%\n", m.win_rate * 100.0));
    out.push_str(&format!("Profit Factor:  {:.2}\n", m.profit_factor));
    out.push_str(&format!("Expectancy:     {:.2}\n", m.expectancy));
    out.push_str(&format!(
        "Avg Win/Loss:   {:.2} / {:.2}\n",
        m.avg_win, m.avg_loss
    ));
    out.push_str(&format!("Avg Holding:    {:.1} days\n", m.avg_holding_days));
    out.push_str(&format!(
        "Trades:         {} ({} wins, {} losses)\n",
        m.total_trades, m.winning_trades, m.losing_trades
    ));
    out.push_str(&format!(
        "Max Streaks:    {} wins / {} losses\n",
        m.max_consecutive_wins, m.max_consecutive_losses
    ));

    if !result.trades.is_empty() {
        out.push('\n');
        out.push_str("--- Trades ---\n");
        for t in &result.trades {
            out.push_str(&format!(
                "{} {:>8.2} -> {} {:>8.2}  qty {:>7.0}  pnl {:>10.2}  {}\n",
                t.entry_date, t.entry_price, t.exit_date, t.exit_price, t.quantity, t.pnl,
                t.exit_reason
            ));
        }
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use swinglab_core::domain::{PositionSide, Signal, Trade};
    use swinglab_core::engine::{Metrics, SCHEMA_VERSION};

    fn d(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, day).unwrap()
    }

    fn sample_result() -> BacktestResult {
        let trades = vec![Trade {
            entry_date: d(2),
            entry_price: 100.0,
            exit_date: d(10),
            exit_price: 110.0,
            quantity: 50.0,
            side: PositionSide::Long,
            pnl: 500.0,
            entry_reason: "golden cross: 10-bar MA above 30-bar MA".to_string(),
            exit_reason: "end of backtest".to_string(),
        }];
        let equity = vec![10_000.0, 10_200.0, 10_500.0];
        let returns = vec![0.0, 0.02, 10_500.0 / 10_200.0 - 1.0];
        let metrics = Metrics::compute(&equity, &returns, &trades, 10_000.0, d(2), d(10));
        BacktestResult {
            schema_version: SCHEMA_VERSION,
            strategy_name: "ma_crossover_sma_10_30".to_string(),
            symbol: "SPY".to_string(),
            start_date: d(2),
            end_date: d(10),
            initial_capital: 10_000.0,
            final_capital: 10_500.0,
            final_position: None,
            trades,
            signals: vec![
                Signal::buy(d(2), 100.0, "golden cross: 10-bar MA above 30-bar MA"),
            ],
            dates: vec![d(2), d(3), d(10)],
            equity_curve: equity,
            daily_returns: returns,
            metrics,
        }
    }

    #[test]
    fn summary_carries_header_and_capital_lines() {
        let text = render(&sample_result());
        assert!(text.contains("=== Backtest Result ==="));
        assert!(text.contains("Strategy:       ma_crossover_sma_10_30"));
        assert!(text.contains("Symbol:         SPY"));
        assert!(text.contains("Signals:        1"));
        assert!(text.contains("Initial:        10000.00"));
        assert!(text.contains("Final:          10500.00"));
    }

    #[test]
    fn summary_lists_each_trade_with_its_exit_reason() {
        let text = render(&sample_result());
        assert!(text.contains("--- Trades ---"));
        assert!(text.contains("end of backtest"));
        assert!(text.contains("500.00"));
    }

    #[test]
    fn quiet_result_omits_the_trade_section() {
        let mut result = sample_result();
        result.trades.clear();
        result.metrics = Metrics::compute(
            &result.equity_curve,
            &result.daily_returns,
            &result.trades,
            result.initial_capital,
            result.start_date,
            result.end_date,
        );
        let text = render(&result);
        assert!(!text.contains("--- Trades ---"));
        assert!(text.contains("Trades:         0"));
    }
}
