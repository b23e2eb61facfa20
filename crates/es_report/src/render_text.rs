//! Console summary: per-method seat counts, satisfaction, candidate win
//! counts and a short sample of district results.

use es_core::{ElectionMethod, Party};

use crate::structure::{MethodRun, SimulationReport};

const SAMPLE_ROWS: usize = 10;

pub fn render_text(report: &SimulationReport) -> String {
    let mut lines = vec![
        "=== Congressional Simulation Results ===".to_string(),
        format!("Engine: {} v{}", report.engine.name, report.engine.version),
        format!("Seed: {}", report.seed),
        format!("Candidate generator: {}", report.config.candidate_strategy),
    ];
    if !report.rejected_rows.is_empty() {
        lines.push(format!("Skipped rows: {}", report.rejected_rows.len()));
    }
    if report.cancelled {
        lines.push("Batch cancelled: results are partial".to_string());
    }
    for run in &report.runs {
        lines.push(String::new());
        method_section(run, &mut lines);
    }
    if let Some(d) = &report.report_digest {
        lines.push(String::new());
        lines.push(format!("Report digest: {d}"));
    }
    let mut out = lines.join("\n");
    out.push('\n');
    out
}

fn method_section(run: &MethodRun, lines: &mut Vec<String>) {
    let s = &run.summary;
    lines.push(format!("--- {} ---", run.method));
    lines.push(format!("Total Districts: {}", s.districts));
    for party in Party::ALL {
        let wins = s.party_wins.get(&party).copied().unwrap_or(0);
        let share = s.party_share.get(&party).copied().unwrap_or(0.0);
        lines.push(format!("{} Wins: {} ({:.1}%)", party_label(party), wins, share));
    }
    lines.push(format!("Average Voter Satisfaction: {:.3}", s.mean_voter_satisfaction));
    lines.push(format!("Average Median Satisfaction: {:.3}", s.mean_median_satisfaction));
    lines.push(format!("Average Winner Ideology: {:+.3}", s.mean_winner_ideology));
    lines.push(format!("Average Margin: {:.1}", s.mean_margin));
    if run.method == ElectionMethod::Condorcet {
        lines.push(format!("Condorcet Cycles: {}", s.condorcet_cycles));
    }
    if !run.failures.is_empty() {
        lines.push(format!("Failed Districts: {}", run.failures.len()));
    }

    let mut by_count: Vec<(&String, &usize)> = s.wins_by_candidate.iter().collect();
    by_count.sort_by(|a, b| b.1.cmp(a.1).then_with(|| a.0.cmp(b.0)));
    lines.push("Candidate Win Counts:".to_string());
    for (name, n) in by_count {
        lines.push(format!("  {name}: {n}"));
    }

    lines.push("Sample Results:".to_string());
    for d in run.districts.iter().take(SAMPLE_ROWS) {
        lines.push(format!(
            "  {}: {} {} (Lean: {:+.1}, Satisfaction: {:.3})",
            d.district, d.winner_party, d.winner_name, d.expected_lean, d.voter_satisfaction
        ));
    }
}

fn party_label(p: Party) -> &'static str {
    match p {
        Party::Democratic => "Democratic",
        Party::Republican => "Republican",
        Party::Independent => "Independent",
    }
}
