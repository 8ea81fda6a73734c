//! Target-seeking search over workforce and duration.
//!
//! Calibrated delay probability is non-increasing in both dimensions, so a
//! forward scan from the current value returns the smallest satisfying change.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::classifier::RiskLevel;
use super::EngineError;
use crate::domain::ProjectRequest;

/// Upper limits keeping every search to a small, fixed number of probes
pub const MAX_EXTRA_WORKERS_LIMIT: u32 = 500;
pub const MAX_EXTRA_MONTHS_LIMIT: f64 = 120.0;
pub const MAX_DURATION_PROBES: u32 = 1000;

#[derive(Debug, Error, PartialEq)]
pub enum SearchSettingsError {
    #[error("max_extra_workers {0} exceeds 500")]
    TooManyWorkers(u32),

    #[error("max_extra_months {0} must be within [0, 120]")]
    InvalidMonths(f64),

    #[error("duration_step {0} must be positive and allow at most 1000 probes")]
    InvalidStep(f64),

    #[error("targets low={low}, medium={medium} must satisfy 0 <= low < 30 <= medium < 60")]
    InvalidTargets { low: f64, medium: f64 },
}

/// Bounds and targets for recommendation search.
///
/// Targets are compared against the probability as reported, rounded to one
/// decimal place.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchSettings {
    /// Largest workforce increase probed
    pub max_extra_workers: u32,
    /// Largest duration extension probed (months)
    pub max_extra_months: f64,
    /// Duration probe spacing (months)
    pub duration_step: f64,
    /// Probability (percent) that counts as reaching Medium from High
    pub medium_target: f64,
    /// Probability (percent) that counts as reaching Low
    pub low_target: f64,
}

impl Default for SearchSettings {
    fn default() -> Self {
        Self {
            max_extra_workers: 15,
            max_extra_months: 12.0,
            duration_step: 0.5,
            medium_target: 55.0,
            low_target: 29.9,
        }
    }
}

impl SearchSettings {
    pub fn validate(&self) -> Result<(), SearchSettingsError> {
        if self.max_extra_workers > MAX_EXTRA_WORKERS_LIMIT {
            return Err(SearchSettingsError::TooManyWorkers(self.max_extra_workers));
        }
        if !(0.0..=MAX_EXTRA_MONTHS_LIMIT).contains(&self.max_extra_months) {
            return Err(SearchSettingsError::InvalidMonths(self.max_extra_months));
        }
        if !(self.duration_step.is_finite() && self.duration_step > 0.0)
            || self.duration_probes() > MAX_DURATION_PROBES
        {
            return Err(SearchSettingsError::InvalidStep(self.duration_step));
        }

        let low_ok = (0.0..RiskLevel::MEDIUM_THRESHOLD).contains(&self.low_target);
        let medium_ok = (RiskLevel::MEDIUM_THRESHOLD..RiskLevel::HIGH_THRESHOLD)
            .contains(&self.medium_target);
        if !(low_ok && medium_ok) {
            return Err(SearchSettingsError::InvalidTargets {
                low: self.low_target,
                medium: self.medium_target,
            });
        }
        Ok(())
    }

    pub fn duration_probes(&self) -> u32 {
        if self.duration_step <= 0.0 {
            return 0;
        }
        // Tolerate float noise such as 12.0 / 0.5 = 23.999...
        (self.max_extra_months / self.duration_step + 1e-9).floor() as u32
    }

    /// Targets to seek from the given tier, hardest-to-miss first
    pub fn targets_for(&self, risk: RiskLevel) -> Vec<(RiskLevel, f64)> {
        match risk {
            RiskLevel::High => vec![
                (RiskLevel::Medium, self.medium_target),
                (RiskLevel::Low, self.low_target),
            ],
            RiskLevel::Medium => vec![(RiskLevel::Low, self.low_target)],
            RiskLevel::Low => Vec::new(),
        }
    }
}

/// Result of one bounded search
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SearchOutcome<T> {
    Found { value: T, probability: f64 },
    /// No probe within bounds reached the target
    Exhausted,
}

/// First workforce above the current one whose probability is at or below
/// `target`. `probe` returns the reported (rounded) probability.
pub fn search_workers<F>(
    request: &ProjectRequest,
    target: f64,
    settings: &SearchSettings,
    mut probe: F,
) -> Result<SearchOutcome<u32>, EngineError>
where
    F: FnMut(&ProjectRequest) -> Result<f64, EngineError>,
{
    for extra in 1..=settings.max_extra_workers {
        let workers = request.workers.saturating_add(extra);
        let probability = probe(&request.with_workers(workers))?;
        tracing::trace!(workers, probability, target, "workforce probe");
        if probability <= target {
            return Ok(SearchOutcome::Found {
                value: workers,
                probability,
            });
        }
    }
    Ok(SearchOutcome::Exhausted)
}

/// First duration above the current one, in `duration_step` increments,
/// whose probability is at or below `target`.
pub fn search_duration<F>(
    request: &ProjectRequest,
    target: f64,
    settings: &SearchSettings,
    mut probe: F,
) -> Result<SearchOutcome<f64>, EngineError>
where
    F: FnMut(&ProjectRequest) -> Result<f64, EngineError>,
{
    for step in 1..=settings.duration_probes() {
        let months = request.duration_months + f64::from(step) * settings.duration_step;
        let probability = probe(&request.with_duration(months))?;
        tracing::trace!(months, probability, target, "duration probe");
        if probability <= target {
            return Ok(SearchOutcome::Found {
                value: months,
                probability,
            });
        }
    }
    Ok(SearchOutcome::Exhausted)
}

/// Both searches for one target tier
#[derive(Debug, Clone, PartialEq)]
pub struct TierPlan {
    pub tier: RiskLevel,
    pub target: f64,
    pub workers: SearchOutcome<u32>,
    pub duration: SearchOutcome<f64>,
}

pub const STEADY_STATE_TIP: &str =
    "Your plan looks solid. Keep monitoring progress and document any schedule changes.";

pub const PROCUREMENT_TIP: &str =
    "Order long-lead materials and secure permits and approvals early to protect the schedule.";

fn workers_text(plan: &TierPlan, request: &ProjectRequest, workers: u32, probability: f64) -> String {
    format!(
        "To reach {} risk (delay probability at most {}%), increase the workforce from {} to {} workers; estimated delay probability {:.1}%.",
        plan.tier, plan.target, request.workers, workers, probability
    )
}

fn duration_text(plan: &TierPlan, request: &ProjectRequest, months: f64, probability: f64) -> String {
    format!(
        "To reach {} risk (delay probability at most {}%), extend the duration from {:.1} to {:.1} months; estimated delay probability {:.1}%.",
        plan.tier, plan.target, request.duration_months, months, probability
    )
}

fn fallback_text(plan: &TierPlan, settings: &SearchSettings) -> String {
    format!(
        "No single change of up to {} extra workers or {:.1} extra months brings the project to {} risk; combine a larger crew with a longer schedule or reduce the scope of work.",
        settings.max_extra_workers, settings.max_extra_months, plan.tier
    )
}

/// Phrase search results as recommendations.
///
/// Within a tier the option with the smaller relative change comes first
/// (workforce on a tie). A tier where both searches came up empty gets a
/// fallback line. The procurement tip closes every non-empty plan list.
pub fn assemble_recommendations(
    request: &ProjectRequest,
    plans: &[TierPlan],
    settings: &SearchSettings,
) -> Vec<String> {
    if plans.is_empty() {
        return vec![STEADY_STATE_TIP.to_string()];
    }

    let mut out = Vec::new();
    for plan in plans {
        let mut options: Vec<(f64, String)> = Vec::with_capacity(2);

        if let SearchOutcome::Found { value, probability } = plan.workers {
            let relative = f64::from(value.saturating_sub(request.workers)) / f64::from(request.workers.max(1));
            options.push((relative, workers_text(plan, request, value, probability)));
        }
        if let SearchOutcome::Found { value, probability } = plan.duration {
            let relative = (value - request.duration_months) / request.duration_months;
            options.push((relative, duration_text(plan, request, value, probability)));
        }

        if options.is_empty() {
            out.push(fallback_text(plan, settings));
            continue;
        }

        // Stable sort keeps workforce ahead on equal relative change
        options.sort_by(|a, b| a.0.total_cmp(&b.0));
        out.extend(options.into_iter().map(|(_, text)| text));
    }
    out.push(PROCUREMENT_TIP.to_string());
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ProjectSize;

    fn request() -> ProjectRequest {
        ProjectRequest::new("HVAC Installation", ProjectSize::Large, 1000.0, 3.0, 2, None)
    }

    /// 90% minus 10 points per worker and 8 points per month
    fn linear_probe(req: &ProjectRequest) -> Result<f64, EngineError> {
        Ok((90.0 - 10.0 * f64::from(req.workers) - 8.0 * req.duration_months).max(0.0))
    }

    #[test]
    fn duration_probe_count_tolerates_float_noise() {
        let settings = SearchSettings::default();
        assert_eq!(settings.duration_probes(), 24);
        let odd = SearchSettings {
            max_extra_months: 0.3 * 3.0,
            duration_step: 0.3,
            ..SearchSettings::default()
        };
        assert_eq!(odd.duration_probes(), 3);
    }

    #[test]
    fn workers_search_returns_minimal_value() {
        let settings = SearchSettings::default();
        // 90 - 24 = 66 at 0 workers; need 66 - 10w <= 30 -> w >= 3.6 -> 4
        let outcome = search_workers(&request(), 30.0, &settings, linear_probe).unwrap();
        assert_eq!(
            outcome,
            SearchOutcome::Found {
                value: 4,
                probability: 26.0
            }
        );

        // One fewer worker misses the target
        let below = linear_probe(&request().with_workers(3)).unwrap();
        assert!(below > 30.0);
    }

    #[test]
    fn duration_search_steps_by_half_months() {
        let settings = SearchSettings::default();
        // 70 - 8d <= 30 -> d >= 5.0
        let outcome = search_duration(&request(), 30.0, &settings, linear_probe).unwrap();
        assert_eq!(
            outcome,
            SearchOutcome::Found {
                value: 5.0,
                probability: 30.0
            }
        );
    }

    #[test]
    fn searches_exhaust_within_bounds() {
        let settings = SearchSettings::default();
        let mut calls = 0;
        let outcome = search_workers(&request(), 10.0, &settings, |_| {
            calls += 1;
            Ok(80.0)
        })
        .unwrap();
        assert_eq!(outcome, SearchOutcome::Exhausted);
        assert_eq!(calls, 15);

        let mut calls = 0;
        let outcome = search_duration(&request(), 10.0, &settings, |_| {
            calls += 1;
            Ok(80.0)
        })
        .unwrap();
        assert_eq!(outcome, SearchOutcome::Exhausted);
        assert_eq!(calls, 24);
    }

    #[test]
    fn probe_errors_abort_the_search() {
        let settings = SearchSettings::default();
        let result = search_workers(&request(), 10.0, &settings, |_| {
            Err(EngineError::ModelUnavailable("offline".to_string()))
        });
        assert!(matches!(result, Err(EngineError::ModelUnavailable(_))));
    }

    #[test]
    fn targets_depend_on_tier() {
        let settings = SearchSettings::default();
        assert_eq!(
            settings.targets_for(RiskLevel::High),
            vec![(RiskLevel::Medium, 55.0), (RiskLevel::Low, 29.9)]
        );
        assert_eq!(settings.targets_for(RiskLevel::Medium), vec![(RiskLevel::Low, 29.9)]);
        assert!(settings.targets_for(RiskLevel::Low).is_empty());
    }

    #[test]
    fn cheaper_option_comes_first() {
        let settings = SearchSettings::default();
        let req = request();
        // +1 worker is +50%, +0.5 month is +16.7%
        let plan = TierPlan {
            tier: RiskLevel::Medium,
            target: 55.0,
            workers: SearchOutcome::Found {
                value: 3,
                probability: 50.0,
            },
            duration: SearchOutcome::Found {
                value: 3.5,
                probability: 54.0,
            },
        };
        let recs = assemble_recommendations(&req, &[plan], &settings);
        assert_eq!(recs.len(), 3);
        assert!(recs[0].contains("extend the duration from 3.0 to 3.5 months"));
        assert!(recs[1].contains("increase the workforce from 2 to 3 workers"));
        assert_eq!(recs[2], PROCUREMENT_TIP);
    }

    #[test]
    fn workforce_wins_ties() {
        let settings = SearchSettings::default();
        let req = ProjectRequest::new("HVAC Installation", ProjectSize::Medium, 200.0, 2.0, 4, None);
        // +1 of 4 workers and +0.5 of 2 months are both +25%
        let plan = TierPlan {
            tier: RiskLevel::Low,
            target: 29.9,
            workers: SearchOutcome::Found {
                value: 5,
                probability: 28.0,
            },
            duration: SearchOutcome::Found {
                value: 2.5,
                probability: 27.0,
            },
        };
        let recs = assemble_recommendations(&req, &[plan], &settings);
        assert!(recs[0].contains("workforce"));
        assert!(recs[1].contains("duration"));
    }

    #[test]
    fn exhausted_tier_gets_fallback() {
        let settings = SearchSettings::default();
        let plans = [
            TierPlan {
                tier: RiskLevel::Medium,
                target: 55.0,
                workers: SearchOutcome::Exhausted,
                duration: SearchOutcome::Found {
                    value: 6.0,
                    probability: 50.0,
                },
            },
            TierPlan {
                tier: RiskLevel::Low,
                target: 29.9,
                workers: SearchOutcome::Exhausted,
                duration: SearchOutcome::Exhausted,
            },
        ];
        let recs = assemble_recommendations(&request(), &plans, &settings);
        assert_eq!(recs.len(), 3);
        assert!(recs[0].contains("Medium risk"));
        assert!(recs[1].starts_with("No single change of up to 15 extra workers or 12.0 extra months"));
        assert!(recs[1].contains("Low risk"));
        assert_eq!(recs[2], PROCUREMENT_TIP);
    }

    #[test]
    fn default_settings_are_valid() {
        assert_eq!(SearchSettings::default().validate(), Ok(()));
    }

    #[test]
    fn unbounded_settings_are_rejected() {
        let infinite = SearchSettings {
            max_extra_months: f64::INFINITY,
            ..SearchSettings::default()
        };
        assert_eq!(
            infinite.validate(),
            Err(SearchSettingsError::InvalidMonths(f64::INFINITY))
        );

        let tiny_step = SearchSettings {
            duration_step: 0.001,
            ..SearchSettings::default()
        };
        assert_eq!(tiny_step.validate(), Err(SearchSettingsError::InvalidStep(0.001)));

        let crowd = SearchSettings {
            max_extra_workers: 10_000,
            ..SearchSettings::default()
        };
        assert_eq!(crowd.validate(), Err(SearchSettingsError::TooManyWorkers(10_000)));
    }

    #[test]
    fn targets_must_sit_inside_their_tiers() {
        for (low, medium) in [(30.0, 55.0), (-1.0, 55.0), (29.9, 60.0), (29.9, 25.0), (f64::NAN, 55.0)] {
            let settings = SearchSettings {
                low_target: low,
                medium_target: medium,
                ..SearchSettings::default()
            };
            assert!(
                matches!(settings.validate(), Err(SearchSettingsError::InvalidTargets { .. })),
                "low={low} medium={medium}"
            );
        }
    }

    #[test]
    fn recommendation_states_target() {
        let plan = TierPlan {
            tier: RiskLevel::Low,
            target: 29.9,
            workers: SearchOutcome::Found {
                value: 3,
                probability: 29.5,
            },
            duration: SearchOutcome::Exhausted,
        };
        let recs = assemble_recommendations(&request(), &[plan], &SearchSettings::default());
        assert!(recs[0].contains("(delay probability at most 29.9%)"), "{}", recs[0]);
    }

    #[test]
    fn no_plans_means_steady_state() {
        let recs = assemble_recommendations(&request(), &[], &SearchSettings::default());
        assert_eq!(recs, vec![STEADY_STATE_TIP.to_string()]);
    }
}
