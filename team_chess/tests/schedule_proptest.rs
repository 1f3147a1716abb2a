/// Property-based tests for the round-robin schedule
///
/// Team lists of every size from 2 to 12, with random seeds and input order,
/// must produce a schedule where every pair of teams meets exactly once.
use proptest::prelude::*;
use std::collections::{BTreeMap, BTreeSet};
use team_chess::schedule::{expected_pairings, round_robin_schedule, rounds_for_teams};
use team_chess::tournament::Team;

// Strategy for a team list with unique ids and optional seeds
fn teams_strategy() -> impl Strategy<Value = Vec<Team>> {
    (2usize..=12).prop_flat_map(|n| {
        prop::collection::vec(prop::option::of(1u32..=20), n).prop_map(|seeds| {
            seeds
                .into_iter()
                .enumerate()
                .map(|(i, seed)| {
                    let team = Team::new(format!("t{i:02}"), format!("Team {i}"), format!("C{i:02}"));
                    match seed {
                        Some(seed) => team.with_seed(seed),
                        None => team,
                    }
                })
                .collect()
        })
    })
}

proptest! {
    #[test]
    fn test_every_pair_meets_exactly_once(teams in teams_strategy()) {
        let schedule = round_robin_schedule(&teams);
        prop_assert_eq!(schedule.len() as u32, rounds_for_teams(teams.len()));

        let mut meetings: BTreeMap<(String, String), u32> = BTreeMap::new();
        for round in &schedule {
            for pairing in round {
                if let Some(b) = &pairing.team_b_id {
                    let a = pairing.team_a_id.clone();
                    let key = if a < *b { (a, b.clone()) } else { (b.clone(), a) };
                    *meetings.entry(key).or_default() += 1;
                }
            }
        }

        let n = teams.len();
        prop_assert_eq!(meetings.len(), n * (n - 1) / 2);
        prop_assert!(meetings.values().all(|&count| count == 1));
    }

    #[test]
    fn test_each_team_appears_once_per_round(teams in teams_strategy()) {
        let all: BTreeSet<&str> = teams.iter().map(|t| t.id.as_str()).collect();

        for round in round_robin_schedule(&teams) {
            let mut seen = BTreeSet::new();
            for pairing in &round {
                prop_assert!(seen.insert(pairing.team_a_id.clone()));
                if let Some(b) = &pairing.team_b_id {
                    prop_assert!(seen.insert(b.clone()));
                }
            }
            let seen: BTreeSet<&str> = seen.iter().map(String::as_str).collect();
            prop_assert_eq!(&seen, &all);
            prop_assert_eq!(round.len(), teams.len().div_ceil(2));
        }
    }

    #[test]
    fn test_odd_counts_get_one_bye_per_round(teams in teams_strategy()) {
        let schedule = round_robin_schedule(&teams);
        let mut byes: BTreeMap<String, u32> = BTreeMap::new();

        for round in &schedule {
            let round_byes: Vec<_> = round.iter().filter(|p| p.is_bye()).collect();
            if teams.len() % 2 == 0 {
                prop_assert!(round_byes.is_empty());
            } else {
                prop_assert_eq!(round_byes.len(), 1);
                *byes.entry(round_byes[0].team_a_id.clone()).or_default() += 1;
            }
        }

        if teams.len() % 2 == 1 {
            prop_assert_eq!(byes.len(), teams.len());
            prop_assert!(byes.values().all(|&count| count == 1));
        }
    }

    #[test]
    fn test_schedule_ignores_input_order(
        (teams, shuffled) in teams_strategy()
            .prop_flat_map(|teams| (Just(teams.clone()), Just(teams).prop_shuffle()))
    ) {
        for round_number in 1..=rounds_for_teams(teams.len()) {
            prop_assert_eq!(
                expected_pairings(&teams, round_number),
                expected_pairings(&shuffled, round_number)
            );
        }
    }
}
