//! Search summary report generation

use comfy_table::{presets::UTF8_FULL_CONDENSED, Attribute, Cell, Color, Table};
use console::style;

use crate::pipeline::{CandidateScore, ScannedCandidate, SearchOutcome, SearchPhase};

/// What a finished search decided
#[derive(Debug, Clone, PartialEq)]
pub enum SearchDecision {
    /// Exploratory search: every accepted candidate in scan order
    Accepted(Vec<CandidateScore>),
    /// Automated search: the retained-feature count
    Count(usize),
}

/// Summary of one search phase, ready for display
#[derive(Debug, Clone)]
pub struct SearchSummary {
    pub phase: SearchPhase,
    pub total_features: usize,
    pub auc_limit: f64,
    pub ci: f64,
    pub threshold: f64,
    pub scanned: Vec<ScannedCandidate>,
    pub decision: SearchDecision,
    pub threshold_unmet: bool,
}

impl SearchSummary {
    pub fn from_exploratory(outcome: &SearchOutcome<Vec<CandidateScore>>) -> Self {
        Self {
            phase: outcome.phase,
            total_features: outcome.total_features,
            auc_limit: outcome.threshold.auc_limit(),
            ci: outcome.threshold.ci(),
            threshold: outcome.threshold.value(),
            scanned: outcome.scanned.clone(),
            decision: SearchDecision::Accepted(outcome.value.clone()),
            threshold_unmet: outcome.threshold_unmet(),
        }
    }

    pub fn from_automated(outcome: &SearchOutcome<usize>) -> Self {
        Self {
            phase: outcome.phase,
            total_features: outcome.total_features,
            auc_limit: outcome.threshold.auc_limit(),
            ci: outcome.threshold.ci(),
            threshold: outcome.threshold.value(),
            scanned: outcome.scanned.clone(),
            decision: SearchDecision::Count(outcome.value),
            threshold_unmet: outcome.threshold_unmet(),
        }
    }

    /// Retained-feature count, if this was an automated search
    pub fn chosen_count(&self) -> Option<usize> {
        match self.decision {
            SearchDecision::Count(count) => Some(count),
            SearchDecision::Accepted(_) => None,
        }
    }

    /// Percentage of ranked features dropped by the chosen count
    pub fn reduction_pct(&self) -> Option<f64> {
        let count = self.chosen_count()?;
        if self.total_features == 0 {
            return Some(0.0);
        }
        Some(
            (self.total_features.saturating_sub(count)) as f64 / self.total_features as f64
                * 100.0,
        )
    }

    pub fn display(&self) {
        println!();
        println!(
            "    {} {}",
            style("📋").cyan(),
            style(format!("{} SEARCH SUMMARY", self.phase.to_string().to_uppercase()))
                .white()
                .bold()
        );
        println!("    {}", style("─".repeat(50)).dim());
        println!();

        let mut table = Table::new();
        table.load_preset(UTF8_FULL_CONDENSED);
        table.set_header(vec![
            Cell::new("Features").add_attribute(Attribute::Bold),
            Cell::new("Score").add_attribute(Attribute::Bold),
            Cell::new("Accepted").add_attribute(Attribute::Bold),
        ]);

        let chosen = self.chosen_count();
        for candidate in &self.scanned {
            let mut count_cell = Cell::new(candidate.count);
            if Some(candidate.count) == chosen {
                count_cell = count_cell.add_attribute(Attribute::Bold);
            }
            table.add_row(vec![
                count_cell,
                Cell::new(format!("{:.5}", candidate.score)),
                if candidate.passed {
                    Cell::new("✓").fg(Color::Green)
                } else {
                    Cell::new("✗").fg(Color::Red)
                },
            ]);
        }

        // Indent the table
        for line in table.to_string().lines() {
            println!("    {}", line);
        }

        println!();
        println!(
            "      Threshold: {} {}",
            style(format!("{:.5}", self.threshold)).yellow(),
            style(format!("(auc limit {:.4} at ci {:.3})", self.auc_limit, self.ci)).dim()
        );

        match &self.decision {
            SearchDecision::Count(count) => {
                let pct = self.reduction_pct().unwrap_or(0.0);
                println!(
                    "      Keep {} of {} features {}",
                    style(count).green().bold(),
                    self.total_features,
                    style(format!("({:.1}% reduction)", pct)).dim()
                );
            }
            SearchDecision::Accepted(accepted) => {
                println!(
                    "      {} of {} candidates accepted",
                    style(accepted.len()).green().bold(),
                    self.scanned.len()
                );
            }
        }

        if self.threshold_unmet {
            println!(
                "      {}",
                style("No candidate reached the threshold").yellow()
            );
        }
    }
}
