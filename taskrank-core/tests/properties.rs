use chrono::{Duration, NaiveDate};
use proptest::prelude::*;
use taskrank_core::{
    FixedClock, Strategy, Task, dependency_pressure, effort_score, urgency_for_days,
};

fn today() -> NaiveDate {
    NaiveDate::from_ymd_opt(2026, 10, 16).unwrap()
}

proptest! {
    #[test]
    fn urgency_stays_in_unit_range(days in -10_000i64..10_000) {
        let u = urgency_for_days(days);
        prop_assert!((0.1..=1.0).contains(&u));
    }

    /// Past the one-week step the decay is monotonic.
    #[test]
    fn urgency_decays_beyond_a_week(days in 8i64..5_000) {
        prop_assert!(urgency_for_days(days + 1) <= urgency_for_days(days));
    }

    #[test]
    fn effort_never_increases_with_hours(hours in 0.1f64..200.0, extra in 0.0f64..50.0) {
        prop_assert!(effort_score(hours + extra) <= effort_score(hours));
    }

    #[test]
    fn dependency_pressure_takes_known_values(
        deps in prop::collection::vec(prop::collection::vec(0i64..12, 0..4), 1..10),
    ) {
        let tasks: Vec<Task> = deps
            .iter()
            .enumerate()
            .map(|(i, d)| Task::new(format!("t{i}")).with_id(i as i64).with_dependencies(d.clone()))
            .collect();
        for t in &tasks {
            let p = dependency_pressure(&t.dependencies, &tasks);
            prop_assert!(p == 0.3 || (0.5..=1.0).contains(&p), "{p}");
        }
    }

    /// Identical tasks always come back in input order.
    #[test]
    fn ranking_is_stable(
        rows in prop::collection::vec((0i64..40, 1u8..30, 1i64..=10), 1..25),
    ) {
        let tasks: Vec<Task> = rows
            .iter()
            .enumerate()
            .map(|(i, (days, hours, importance))| {
                Task::new(format!("t{i}"))
                    .with_id(i as i64)
                    .with_due_date(today() + Duration::days(*days))
                    .with_hours(f64::from(*hours))
                    .with_importance(*importance)
            })
            .collect();

        let ranked = Strategy::SmartBalance
            .engine_with_clock(FixedClock::on(today()))
            .analyze(&tasks)
            .unwrap();

        prop_assert_eq!(ranked.len(), tasks.len());
        for w in ranked.windows(2) {
            prop_assert!(w[0].priority_score >= w[1].priority_score);
            if w[0].priority_score == w[1].priority_score {
                prop_assert!(w[0].task.id < w[1].task.id);
            }
        }
    }
}
