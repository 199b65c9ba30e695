use anyhow::Result;
use colored::Colorize;
use serde::Serialize;
use std::io::Write;
use std::time::Duration;

use mastermind_game::Cents;

use super::policy::GameplayStrategy;
use super::simulation::RunRecord;

/// Aggregate results for one strategy across every seed and iteration.
#[derive(Debug, Clone, Serialize)]
pub struct StrategySummary {
    pub strategy: GameplayStrategy,
    pub runs: usize,
    pub wins: usize,
    pub win_rate: f64,
    pub mean_balance: Cents,
    pub median_balance: Cents,
    pub best_balance: Cents,
    pub mean_days: f64,
    pub rejections: u32,
    pub failures: Vec<String>,
}

impl StrategySummary {
    #[must_use]
    pub fn passed(&self) -> bool {
        self.failures.is_empty()
    }
}

#[derive(Debug, Serialize)]
struct JsonReport<'a> {
    summaries: &'a [StrategySummary],
    runs: &'a [RunRecord],
}

#[allow(clippy::cast_precision_loss)]
fn ratio(part: usize, whole: usize) -> f64 {
    if whole == 0 {
        0.0
    } else {
        part as f64 / whole as f64
    }
}

/// Group run records by strategy, in strategy order.
#[must_use]
pub fn summarize(records: &[RunRecord]) -> Vec<StrategySummary> {
    let mut strategies: Vec<GameplayStrategy> = records.iter().map(|r| r.strategy).collect();
    strategies.sort_unstable();
    strategies.dedup();

    strategies
        .into_iter()
        .map(|strategy| {
            let runs: Vec<&RunRecord> = records.iter().filter(|r| r.strategy == strategy).collect();
            let mut balances: Vec<Cents> = runs.iter().map(|r| r.final_balance).collect();
            balances.sort_unstable();
            let count = u32::try_from(runs.len()).unwrap_or(u32::MAX);
            let total: Cents = balances.iter().copied().sum();
            let days: usize = runs.iter().map(|r| r.days_played as usize).sum();
            let wins = runs.iter().filter(|r| r.won()).count();
            StrategySummary {
                strategy,
                runs: runs.len(),
                wins,
                win_rate: ratio(wins, runs.len()),
                mean_balance: total.per_unit(count),
                median_balance: balances.get(balances.len() / 2).copied().unwrap_or(Cents::ZERO),
                best_balance: balances.last().copied().unwrap_or(Cents::ZERO),
                mean_days: ratio(days, runs.len()),
                rejections: runs.iter().map(|r| r.rejections).sum(),
                failures: runs
                    .iter()
                    .filter_map(|r| {
                        r.failure
                            .as_ref()
                            .map(|reason| format!("seed {}: {reason}", r.seed))
                    })
                    .collect(),
            }
        })
        .collect()
}

pub fn generate_console_report(
    out: &mut dyn Write,
    summaries: &[StrategySummary],
    total_duration: Duration,
) -> Result<()> {
    writeln!(out)?;
    writeln!(out, "{}", "📊 Strategy Results Summary".bright_cyan().bold())?;
    writeln!(out, "{}", "===========================".cyan())?;

    let passed = summaries.iter().filter(|s| s.passed()).count();
    writeln!(out, "Strategies: {}", summaries.len())?;
    writeln!(out, "Passed: {}", passed.to_string().green())?;
    writeln!(out, "Failed: {}", (summaries.len() - passed).to_string().red())?;
    writeln!(out, "Total time: {total_duration:?}")?;
    writeln!(out)?;

    for summary in summaries {
        let status = if summary.passed() {
            "✅ PASS".green()
        } else {
            "❌ FAIL".red()
        };
        writeln!(out, "{} {}", status, summary.strategy.label().bold())?;
        writeln!(
            out,
            "   Wins: {}/{} ({:.1}%)",
            summary.wins,
            summary.runs,
            summary.win_rate * 100.0
        )?;
        writeln!(
            out,
            "   Balance: mean {} / median {} / best {}",
            summary.mean_balance, summary.median_balance, summary.best_balance
        )?;
        writeln!(out, "   Mean days: {:.1}", summary.mean_days)?;
        writeln!(out, "   Rejected actions: {}", summary.rejections)?;
        if !summary.failures.is_empty() {
            writeln!(out, "   Failures:")?;
            for failure in &summary.failures {
                writeln!(out, "     • {}", failure.red())?;
            }
        }
        writeln!(out)?;
    }

    if let Some(best) = summaries
        .iter()
        .max_by_key(|s| (s.median_balance, s.wins))
    {
        writeln!(out, "{}", "💰 Best Strategy".bright_yellow().bold())?;
        writeln!(out, "{}", "================".yellow())?;
        writeln!(
            out,
            "{} (median {})",
            best.strategy.label().green(),
            best.median_balance
        )?;
    }
    Ok(())
}

pub fn generate_json_report(
    out: &mut dyn Write,
    summaries: &[StrategySummary],
    runs: &[RunRecord],
) -> Result<()> {
    let json_output = serde_json::to_string_pretty(&JsonReport { summaries, runs })?;
    writeln!(out, "{json_output}")?;
    Ok(())
}

pub fn generate_markdown_report(out: &mut dyn Write, summaries: &[StrategySummary]) -> Result<()> {
    writeln!(out, "# Money Mastermind Strategy Results\n")?;

    let passed = summaries.iter().filter(|s| s.passed()).count();
    writeln!(out, "## Summary\n")?;
    writeln!(out, "- **Strategies**: {}", summaries.len())?;
    writeln!(out, "- **Passed**: {passed}")?;
    writeln!(out, "- **Failed**: {}\n", summaries.len() - passed)?;

    writeln!(
        out,
        "| Strategy | Runs | Wins | Mean balance | Median balance | Mean days |"
    )?;
    writeln!(out, "|---|---|---|---|---|---|")?;
    for summary in summaries {
        writeln!(
            out,
            "| {} | {} | {} | {} | {} | {:.1} |",
            summary.strategy.label(),
            summary.runs,
            summary.wins,
            summary.mean_balance,
            summary.median_balance,
            summary.mean_days
        )?;
    }

    let failing: Vec<&StrategySummary> = summaries.iter().filter(|s| !s.passed()).collect();
    if !failing.is_empty() {
        writeln!(out, "\n## Failures\n")?;
        for summary in failing {
            writeln!(out, "### ❌ {}\n", summary.strategy.label())?;
            for failure in &summary.failures {
                writeln!(out, "- {failure}")?;
            }
            writeln!(out)?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use mastermind_game::Ending;

    fn record(strategy: GameplayStrategy, seed: u64, dollars: i64, ending: Ending) -> RunRecord {
        RunRecord {
            seed,
            strategy,
            ending: Some(ending),
            days_played: 100,
            final_balance: Cents::from_dollars(dollars),
            net_worth: Cents::from_dollars(dollars),
            actions: 10,
            rejections: 1,
            failure: None,
        }
    }

    fn sample() -> Vec<RunRecord> {
        let mut failed = record(GameplayStrategy::Gambler, 3, 0, Ending::OutOfTime);
        failed.failure = Some("journal grew to 99".into());
        vec![
            record(GameplayStrategy::Trader, 1, 900, Ending::OutOfTime),
            record(GameplayStrategy::Trader, 2, 600_000, Ending::Victory),
            record(GameplayStrategy::Trader, 3, 1_500, Ending::OutOfTime),
            failed,
        ]
    }

    #[test]
    fn summaries_group_by_strategy() {
        let summaries = summarize(&sample());
        assert_eq!(summaries.len(), 2);
        let trader = &summaries[0];
        assert_eq!(trader.strategy, GameplayStrategy::Trader);
        assert_eq!(trader.runs, 3);
        assert_eq!(trader.wins, 1);
        assert_eq!(trader.median_balance, Cents::from_dollars(1_500));
        assert_eq!(trader.best_balance, Cents::from_dollars(600_000));
        assert_eq!(trader.mean_balance, Cents::from_dollars(200_800));
        assert_eq!(trader.rejections, 3);
        assert!(trader.passed());
        assert!(!summaries[1].passed());
        assert_eq!(summaries[1].failures, vec!["seed 3: journal grew to 99"]);
    }

    #[test]
    fn json_report_carries_runs() {
        let runs = sample();
        let summaries = summarize(&runs);
        let mut buf = Vec::new();
        generate_json_report(&mut buf, &summaries, &runs).unwrap();
        let value: serde_json::Value = serde_json::from_slice(&buf).unwrap();
        assert_eq!(value["runs"].as_array().unwrap().len(), 4);
        assert_eq!(value["summaries"][0]["strategy"], "trader");
    }

    #[test]
    fn markdown_lists_failures() {
        let summaries = summarize(&sample());
        let mut buf = Vec::new();
        generate_markdown_report(&mut buf, &summaries).unwrap();
        let text = String::from_utf8(buf).unwrap();
        assert!(text.contains("| Dip Trader | 3 | 1 |"));
        assert!(text.contains("### ❌ Gambler"));
    }

    #[test]
    fn console_report_names_best_strategy() {
        colored::control::set_override(false);
        let summaries = summarize(&sample());
        let mut buf = Vec::new();
        generate_console_report(&mut buf, &summaries, Duration::from_millis(5)).unwrap();
        let text = String::from_utf8(buf).unwrap();
        assert!(text.contains("Dip Trader (median $1,500.00)"));
    }
}
