use super::common::*;

use crate::workflows::induction::decision::{
    decide, REASON_ALL_OPERATIONAL, REASON_BRANDING_PROMOTION, REASON_CLEANING_OVERDUE,
    REASON_CRITICAL_FAILURE, REASON_LOW_MILEAGE_PROMOTION, REASON_OPEN_JOB_CARD,
    REASON_SYSTEM_WARNING,
};
use crate::workflows::induction::domain::{
    BrandingPriority, CleaningStatus, Decision, FitnessCertificates, FitnessCheck, FitnessStatus,
    RuleOverrides, Subsystem, TrainsetSnapshot,
};

/// Every combination of fitness, job card, cleaning, branding, and mileage band.
fn snapshot_grid() -> Vec<TrainsetSnapshot> {
    let mut grid = Vec::new();
    for rolling_stock in FitnessStatus::ordered() {
        for signalling in FitnessStatus::ordered() {
            for telecom in FitnessStatus::ordered() {
                for job_card_open in [false, true] {
                    for cleaning_status in CleaningStatus::ordered() {
                        for branding_priority in BrandingPriority::ordered() {
                            for mileage_km in [8_000, 30_000, 62_000] {
                                grid.push(TrainsetSnapshot {
                                    fitness: FitnessCertificates {
                                        rolling_stock: FitnessCheck::new(rolling_stock),
                                        signalling: FitnessCheck::new(signalling),
                                        telecom: FitnessCheck::new(telecom),
                                    },
                                    job_card_open,
                                    cleaning_status,
                                    branding_priority,
                                    mileage_km,
                                    ..trainset("TS-GRID")
                                });
                            }
                        }
                    }
                }
            }
        }
    }
    grid
}

#[test]
fn every_snapshot_gets_exactly_one_decision_under_every_override() {
    let known = [
        REASON_CRITICAL_FAILURE,
        REASON_SYSTEM_WARNING,
        REASON_ALL_OPERATIONAL,
        REASON_OPEN_JOB_CARD,
        REASON_CLEANING_OVERDUE,
        REASON_BRANDING_PROMOTION,
        REASON_LOW_MILEAGE_PROMOTION,
    ];

    for overrides in RuleOverrides::combinations() {
        for snapshot in snapshot_grid() {
            let outcome = decide(&snapshot, &overrides);
            assert!(Decision::ordered().contains(&outcome.decision));
            assert!(known.contains(&outcome.reason.as_str()), "{}", outcome.reason);
        }
    }
}

#[test]
fn open_job_card_always_sends_trainset_to_ibl() {
    for overrides in RuleOverrides::combinations()
        .into_iter()
        .filter(|overrides| !overrides.ignore_job_cards)
    {
        for snapshot in snapshot_grid()
            .into_iter()
            .filter(|snapshot| snapshot.job_card_open)
        {
            let outcome = decide(&snapshot, &overrides);
            assert_eq!(outcome.decision, Decision::Ibl);
            assert_eq!(outcome.reason, REASON_OPEN_JOB_CARD);
        }
    }
}

#[test]
fn overdue_cleaning_only_downgrades_revenue() {
    for overrides in RuleOverrides::combinations()
        .into_iter()
        .filter(|overrides| !overrides.ignore_cleaning)
    {
        for snapshot in snapshot_grid()
            .into_iter()
            .filter(|snapshot| snapshot.cleaning_status == CleaningStatus::Completed)
        {
            let clean = decide(&snapshot, &overrides);
            let overdue = decide(
                &TrainsetSnapshot {
                    cleaning_status: CleaningStatus::Overdue,
                    ..snapshot.clone()
                },
                &overrides,
            );

            if clean.decision != Decision::Revenue {
                assert_eq!(overdue.decision, clean.decision);
            }
        }
    }
}

#[test]
fn fitness_precedence_picks_worst_subsystem() {
    let overrides = RuleOverrides::default();

    let outcome = decide(&trainset("TS-01"), &overrides);
    assert_eq!(outcome.decision, Decision::Revenue);
    assert_eq!(outcome.reason, REASON_ALL_OPERATIONAL);

    let warned = with_fitness(trainset("TS-02"), Subsystem::Telecom, FitnessStatus::Warn);
    let outcome = decide(&warned, &overrides);
    assert_eq!(outcome.decision, Decision::Standby);
    assert_eq!(outcome.reason, REASON_SYSTEM_WARNING);

    let failed = with_fitness(warned, Subsystem::RollingStock, FitnessStatus::Fail);
    let outcome = decide(&failed, &overrides);
    assert_eq!(outcome.decision, Decision::Ibl);
    assert_eq!(outcome.reason, REASON_CRITICAL_FAILURE);
}

#[test]
fn overdue_cleaning_holds_revenue_trainset_unless_ignored() {
    let mut snapshot = trainset("TS-04");
    snapshot.cleaning_status = CleaningStatus::Overdue;

    let outcome = decide(&snapshot, &RuleOverrides::default());
    assert_eq!(outcome.decision, Decision::Standby);
    assert_eq!(outcome.reason, REASON_CLEANING_OVERDUE);

    let ignored = RuleOverrides {
        ignore_cleaning: true,
        ..RuleOverrides::default()
    };
    assert_eq!(decide(&snapshot, &ignored).decision, Decision::Revenue);
}

#[test]
fn ignored_job_card_still_blocks_promotion() {
    let mut snapshot = with_fitness(trainset("TS-02"), Subsystem::Signalling, FitnessStatus::Warn);
    snapshot.job_card_open = true;
    snapshot.branding_priority = BrandingPriority::High;
    snapshot.mileage_km = 9_000;

    let overrides = RuleOverrides {
        ignore_job_cards: true,
        force_high_branding: true,
        prioritize_low_mileage: true,
        ..RuleOverrides::default()
    };

    let outcome = decide(&snapshot, &overrides);
    assert_eq!(outcome.decision, Decision::Standby);
    assert_eq!(outcome.reason, REASON_SYSTEM_WARNING);
}

#[test]
fn branding_promotion_wins_when_both_promotions_qualify() {
    let mut snapshot = with_fitness(trainset("TS-02"), Subsystem::Signalling, FitnessStatus::Warn);
    snapshot.branding_priority = BrandingPriority::High;
    snapshot.mileage_km = 9_000;

    let both = RuleOverrides {
        force_high_branding: true,
        prioritize_low_mileage: true,
        ..RuleOverrides::default()
    };
    let outcome = decide(&snapshot, &both);
    assert_eq!(outcome.decision, Decision::Revenue);
    assert_eq!(outcome.reason, REASON_BRANDING_PROMOTION);

    let mileage_only = RuleOverrides {
        prioritize_low_mileage: true,
        ..RuleOverrides::default()
    };
    let outcome = decide(&snapshot, &mileage_only);
    assert_eq!(outcome.decision, Decision::Revenue);
    assert_eq!(outcome.reason, REASON_LOW_MILEAGE_PROMOTION);
}

#[test]
fn promotion_lifts_cleaning_hold() {
    let mut snapshot = trainset("TS-04");
    snapshot.cleaning_status = CleaningStatus::Overdue;
    snapshot.branding_priority = BrandingPriority::High;

    let overrides = RuleOverrides {
        force_high_branding: true,
        ..RuleOverrides::default()
    };
    let outcome = decide(&snapshot, &overrides);
    assert_eq!(outcome.decision, Decision::Revenue);
    assert_eq!(outcome.reason, REASON_BRANDING_PROMOTION);
}

#[test]
fn decide_does_not_touch_its_input() {
    let snapshot = flagship("TS-01");
    let before = snapshot.clone();
    let overrides = RuleOverrides {
        force_high_branding: true,
        ..RuleOverrides::default()
    };

    let first = decide(&snapshot, &overrides);
    let second = decide(&snapshot, &overrides);

    assert_eq!(first, second);
    assert_eq!(snapshot, before);
}
