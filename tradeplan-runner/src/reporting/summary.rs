//! Markdown summary report for one plan run.

use tradeplan_core::domain::Action;

use crate::runner::PlanRunResult;

/// Render the human-readable companion to plan.json.
pub fn render_summary(result: &PlanRunResult) -> String {
    let plan = &result.plan;
    let mut report = format!(
        "# Trade Plan\n\n\
Run ID: `{}`\n\
Snapshot: `{}`\n\
Generated: {}\n\n\
## Summary\n\
- Horizon: {} days\n\
- Actions: {}\n\
- Cash weight: {:.2}%\n",
        &result.run_id[..12.min(result.run_id.len())],
        &result.snapshot_fingerprint[..12.min(result.snapshot_fingerprint.len())],
        result.generated_at.format("%Y-%m-%d %H:%M:%S UTC"),
        plan.horizon_days,
        plan.recommended_actions.len(),
        plan.cash_weight * 100.0,
    );

    if !plan.recommended_actions.is_empty() {
        report.push_str("\n## Recommended Actions\n\n");
        report.push_str("| Symbol | Action | Weight | Confidence | Exp. Return | P10 | P90 |\n");
        report.push_str("|--------|--------|--------|------------|-------------|-----|-----|\n");
        for a in &plan.recommended_actions {
            report.push_str(&format!(
                "| {} | {} | {:.2}% | {:.2} | {:+.2}% | {:+.2}% | {:+.2}% |\n",
                a.symbol,
                a.action.tag(),
                a.target_weight * 100.0,
                a.confidence,
                a.expected_return * 100.0,
                a.uncertainty_band.p10 * 100.0,
                a.uncertainty_band.p90 * 100.0,
            ));
        }

        // Execution detail only for rows that place orders.
        let entries: Vec<_> = plan
            .recommended_actions
            .iter()
            .filter(|a| a.action != Action::Hold)
            .collect();
        if !entries.is_empty() {
            report.push_str("\n## Execution\n");
            for a in entries {
                report.push_str(&format!(
                    "\n### {}\n- {}\n- {}\n- {}\n- Max portfolio loss: {:.2}%\n",
                    a.symbol,
                    a.order_plan.entry_rule,
                    a.risk_controls.stop_loss_rule,
                    a.risk_controls.take_profit_rule,
                    a.risk_controls.max_loss_pct_portfolio * 100.0,
                ));
            }
        }
    }

    report.push_str(&format!("\n## Notes\n\n{}\n", plan.notes));
    report
}

// ─── Tests ───────────────────────────────────────────────────────────
