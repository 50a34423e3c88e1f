use crate::infra::{fleet_repository, InMemoryFleetRepository, InMemoryWeightsRepository};
use clap::Args;
use fleet_induction::error::AppError;
use fleet_induction::workflows::induction::{
    Conflict, DecisionSummary, DiagnosedTrainset, InductionService, PagingPolicy, RankFilters,
    RankQuery, RankedResponse, RuleOverrides, ScoreBreakdown, ScoredTrainset, SimulationReport,
    Suggestion,
};
use serde_json::{Map, Value};
use std::path::{Path, PathBuf};
use std::sync::Arc;

type CliService = InductionService<InMemoryFleetRepository, InMemoryWeightsRepository>;

#[derive(Args, Debug, Default)]
pub(crate) struct DemoArgs {
    /// Roster CSV to load (defaults to the bundled sample fleet)
    #[arg(long)]
    pub(crate) roster: Option<PathBuf>,
    /// Number of trainsets to show in ranked sections
    #[arg(long, default_value_t = 5)]
    pub(crate) top: usize,
}

#[derive(Args, Debug)]
pub(crate) struct RankArgs {
    /// Roster CSV to rank (defaults to the bundled sample fleet)
    #[arg(long)]
    pub(crate) roster: Option<PathBuf>,
    /// Only include trainsets with this decision (REVENUE, STANDBY, IBL)
    #[arg(long)]
    pub(crate) decision: Option<String>,
    /// Only include this branding tier (HIGH, MEDIUM, LOW)
    #[arg(long)]
    pub(crate) branding_priority: Option<String>,
    /// Only include this cleaning status (COMPLETED, PENDING, OVERDUE)
    #[arg(long)]
    pub(crate) cleaning_status: Option<String>,
    /// Only include trainsets whose job card flag matches (true/false)
    #[arg(long)]
    pub(crate) job_card_open: Option<String>,
    /// Only include trainsets scoring at least this much
    #[arg(long)]
    pub(crate) min_score: Option<String>,
    /// Number of ranked entries to skip
    #[arg(long, default_value_t = 0)]
    pub(crate) skip: usize,
    /// Page size (defaults to 20, capped at 200)
    #[arg(long)]
    pub(crate) limit: Option<usize>,
    /// Partial weight table as a JSON object, e.g. '{"lowMileage": 0}'
    #[arg(long, value_parser = crate::infra::parse_weights)]
    pub(crate) weights: Option<Map<String, Value>>,
    /// Print each trainset's score breakdown
    #[arg(long)]
    pub(crate) breakdown: bool,
}

#[derive(Args, Debug)]
pub(crate) struct SimulateArgs {
    /// Roster CSV to simulate (defaults to the bundled sample fleet)
    #[arg(long)]
    pub(crate) roster: Option<PathBuf>,
    /// Promote HIGH branding trainsets held at standby
    #[arg(long)]
    pub(crate) force_high_branding: bool,
    /// Ignore open job cards
    #[arg(long)]
    pub(crate) ignore_job_cards: bool,
    /// Ignore overdue cleaning
    #[arg(long)]
    pub(crate) ignore_cleaning: bool,
    /// Promote low-mileage trainsets held at standby
    #[arg(long)]
    pub(crate) prioritize_low_mileage: bool,
    /// Partial weight table as a JSON object
    #[arg(long, value_parser = crate::infra::parse_weights)]
    pub(crate) weights: Option<Map<String, Value>>,
    /// Number of ranked trainsets to print
    #[arg(long, default_value_t = 10)]
    pub(crate) top: usize,
}

impl SimulateArgs {
    pub(crate) fn overrides(&self) -> RuleOverrides {
        RuleOverrides {
            force_high_branding: self.force_high_branding,
            ignore_job_cards: self.ignore_job_cards,
            ignore_cleaning: self.ignore_cleaning,
            prioritize_low_mileage: self.prioritize_low_mileage,
        }
    }
}

fn cli_service(roster: Option<&Path>) -> Result<CliService, AppError> {
    Ok(InductionService::new(
        Arc::new(fleet_repository(roster)?),
        Arc::new(InMemoryWeightsRepository::default()),
        PagingPolicy::default(),
    ))
}

pub(crate) fn run_rank(args: RankArgs) -> Result<(), AppError> {
    let service = cli_service(args.roster.as_deref())?;
    let query = RankQuery {
        weights: args.weights,
        filters: RankFilters::from_raw(
            args.decision.as_deref(),
            args.branding_priority.as_deref(),
            args.cleaning_status.as_deref(),
            args.job_card_open.as_deref(),
            args.min_score.as_deref(),
        ),
        skip: Some(args.skip),
        limit: args.limit,
    };

    let response = service.ranked(query)?;
    render_ranked(&response, args.breakdown);
    Ok(())
}

pub(crate) fn run_simulate(args: SimulateArgs) -> Result<(), AppError> {
    let service = cli_service(args.roster.as_deref())?;
    let report = service.simulate(args.overrides(), args.weights.as_ref())?;
    render_simulation(&report, args.top);
    Ok(())
}

pub(crate) fn run_demo(args: DemoArgs) -> Result<(), AppError> {
    let DemoArgs { roster, top } = args;
    let service = cli_service(roster.as_deref())?;

    println!("Fleet induction demo");
    match &roster {
        Some(path) => println!("Data source: roster CSV {}", path.display()),
        None => println!("Data source: bundled sample roster"),
    }

    let listing = service.list_with_diagnostics()?;
    render_listing(&listing);

    let ranked = service.ranked(RankQuery {
        limit: Some(top),
        ..RankQuery::default()
    })?;
    println!();
    render_ranked(&ranked, true);

    println!("\nWhat-if: baseline rules");
    let baseline = service.simulate(RuleOverrides::default(), None)?;
    render_simulation(&baseline, top);

    println!("\nWhat-if: branding and low-mileage promotions");
    let promotions = service.simulate(
        RuleOverrides {
            force_high_branding: true,
            prioritize_low_mileage: true,
            ..RuleOverrides::default()
        },
        None,
    )?;
    render_simulation(&promotions, top);

    println!();
    render_suggestions(&service.suggestions()?);

    Ok(())
}

pub(crate) fn render_listing(listing: &[DiagnosedTrainset]) {
    println!("\nFleet status ({} trainsets)", listing.len());
    for trainset in listing {
        let snapshot = &trainset.snapshot;
        let explanation = &trainset.explanation;
        println!(
            "- {} {} | {} km | branding {} | cleaning {} | {} blocker(s), {} warning(s)",
            snapshot.id,
            snapshot.recommendation.code(),
            snapshot.mileage_km,
            snapshot.branding_priority.code(),
            snapshot.cleaning_status.code(),
            explanation.blockers.len(),
            explanation.warnings.len()
        );
        for conflict in &trainset.conflicts {
            println!("    {}", conflict_line(conflict));
        }
    }
}

pub(crate) fn render_ranked(response: &RankedResponse, show_breakdown: bool) {
    println!(
        "Ranked induction list: {} of {} (skip {}, limit {})",
        response.ranked.len(),
        response.total,
        response.skip,
        response.limit
    );
    for (offset, scored) in response.ranked.iter().enumerate() {
        println!("{}", ranked_line(response.skip + offset + 1, scored));
        if show_breakdown {
            println!("      {}", breakdown_line(&scored.breakdown));
        }
    }
    for ignored in &response.ignored_weights {
        println!(
            "  ignored weight '{}': {}",
            ignored.key,
            ignored.reason.label()
        );
    }
}

pub(crate) fn render_simulation(report: &SimulationReport, top: usize) {
    println!("Decisions: {}", summary_line(&report.summary));
    if report.changes.is_empty() {
        println!("Changes vs. recorded decisions: none");
    } else {
        println!("Changes vs. recorded decisions");
        for change in &report.changes {
            println!(
                "- {}: {} -> {}",
                change.id,
                change.from.code(),
                change.to.code()
            );
        }
    }
    for (index, scored) in report.ranked.iter().take(top).enumerate() {
        println!("{}", ranked_line(index + 1, scored));
    }
}

pub(crate) fn render_suggestions(suggestions: &[Suggestion]) {
    if suggestions.is_empty() {
        println!("Suggestions: recorded decisions match the rules");
        return;
    }

    println!("Suggestions");
    for suggestion in suggestions {
        println!(
            "- {}: {} -> {} (score {}) {}",
            suggestion.id,
            suggestion.current.code(),
            suggestion.suggested.code(),
            suggestion.score,
            suggestion.reason
        );
    }
}

pub(crate) fn ranked_line(position: usize, scored: &ScoredTrainset) -> String {
    format!(
        "{:>3}. {} {:<7} score {:>4} | {}",
        position,
        scored.snapshot.id,
        scored.snapshot.recommendation.code(),
        scored.score,
        scored.snapshot.reason
    )
}

pub(crate) fn breakdown_line(breakdown: &ScoreBreakdown) -> String {
    format!(
        "fitness {} | mileage {} | branding {} | cleaning {} | job card {} | penalties {}",
        breakdown.fitness,
        breakdown.mileage,
        breakdown.branding,
        breakdown.cleaning,
        breakdown.job_card,
        breakdown.penalties
    )
}

pub(crate) fn summary_line(summary: &DecisionSummary) -> String {
    format!(
        "{} revenue | {} standby | {} IBL | {} total",
        summary.revenue, summary.standby, summary.ibl, summary.total
    )
}

pub(crate) fn conflict_line(conflict: &Conflict) -> String {
    format!(
        "[{}] {}: {}",
        conflict.severity.label(),
        conflict.kind.code(),
        conflict.message
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ranked_line_shows_position_decision_and_score() {
        let service = cli_service(None).expect("sample service");
        let ranked = service.ranked(RankQuery::default()).expect("ranked");

        let line = ranked_line(1, &ranked.ranked[0]);
        assert!(line.starts_with("  1. TS-01 REVENUE"));
        assert!(line.contains("score   53"));
        assert!(line.ends_with("All systems operational."));
    }

    #[test]
    fn breakdown_and_summary_lines_list_every_component() {
        let breakdown = ScoreBreakdown {
            fitness: 30,
            mileage: 8,
            branding: 6,
            cleaning: 4,
            job_card: 5,
            penalties: -3,
        };
        assert_eq!(
            breakdown_line(&breakdown),
            "fitness 30 | mileage 8 | branding 6 | cleaning 4 | job card 5 | penalties -3"
        );

        let summary = DecisionSummary {
            revenue: 2,
            standby: 3,
            ibl: 3,
            total: 8,
        };
        assert_eq!(
            summary_line(&summary),
            "2 revenue | 3 standby | 3 IBL | 8 total"
        );
    }

    #[test]
    fn conflict_line_names_severity_and_kind() {
        let service = cli_service(None).expect("sample service");
        let listing = service.list_with_diagnostics().expect("listing");
        let forced = listing
            .iter()
            .find(|trainset| trainset.snapshot.id.as_str() == "TS-05")
            .expect("TS-05 listed");

        assert_eq!(
            conflict_line(&forced.conflicts[0]),
            "[High] MISSING_CERTIFICATE: Telecom fitness certificate failed."
        );
    }

    #[test]
    fn cli_commands_run_against_sample_fleet() {
        run_rank(RankArgs {
            roster: None,
            decision: Some("STANDBY".to_string()),
            branding_priority: None,
            cleaning_status: None,
            job_card_open: None,
            min_score: None,
            skip: 0,
            limit: Some(3),
            weights: None,
            breakdown: true,
        })
        .expect("rank runs");

        run_simulate(SimulateArgs {
            roster: None,
            force_high_branding: true,
            ignore_job_cards: false,
            ignore_cleaning: false,
            prioritize_low_mileage: false,
            weights: None,
            top: 3,
        })
        .expect("simulate runs");

        run_demo(DemoArgs::default()).expect("demo runs");
    }

    #[test]
    fn missing_roster_file_is_reported() {
        let result = run_demo(DemoArgs {
            roster: Some(PathBuf::from("./missing-roster.csv")),
            top: 3,
        });
        assert!(matches!(result, Err(AppError::Roster(_))));
    }
}
