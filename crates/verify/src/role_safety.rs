//! Role-safety rules applied to every enumerated path.
//!
//! Three rules, all violations collected without short-circuiting:
//! a Granted precondition must have a prior grant on the path, a
//! Revoked update must be covered by the same transition's own
//! precondition, and role updates may only touch the transition's
//! declared participants or initiator.

use crate::paths::{enumerate_paths, VerifyOptions};
use crate::report::{Issue, VerifyReport};
use edam_model::{Edam, RoleMode, Transition};

/// Run the full role-safety check.
pub fn check(edam: &Edam, options: &VerifyOptions) -> VerifyReport {
    let set = enumerate_paths(edam, options.max_paths);

    let mut issues = Vec::new();
    for path in &set.paths {
        check_path(edam, path, &mut issues);
    }

    VerifyReport {
        ok: issues.is_empty(),
        issues,
        paths_explored: set.paths.len(),
        truncated: set.truncated,
    }
}

fn check_path(edam: &Edam, path: &[usize], issues: &mut Vec<Issue>) {
    for (position, &index) in path.iter().enumerate() {
        let transition = &edam.transitions[index];
        let participants = transition.participants_with_initiator();

        // Rule 1: a Granted precondition needs a grant earlier on this
        // path for the same participant and role.
        for participant in &participants {
            let Some(modes) = transition.roles.get(*participant) else {
                continue;
            };
            for (role, mode) in modes {
                if *mode != RoleMode::Granted {
                    continue;
                }
                let granted_before = path[..position].iter().any(|&prior| {
                    granted_by_update(&edam.transitions[prior], participant, role)
                });
                if !granted_before {
                    issues.push(Issue::on_path(
                        edam,
                        path,
                        format!(
                            "role '{}' for participant '{}' used before granted",
                            role, participant
                        ),
                    ));
                }
            }
        }

        // Rule 2: a Revoked update needs a Granted precondition on the
        // same transition.
        for (participant, updates) in &transition.role_updates {
            for (role, mode) in updates {
                if *mode != RoleMode::Revoked {
                    continue;
                }
                let granted_here = transition
                    .roles
                    .get(participant)
                    .and_then(|modes| modes.get(role))
                    .map(|m| *m == RoleMode::Granted)
                    .unwrap_or(false);
                if !granted_here {
                    issues.push(Issue::on_path(
                        edam,
                        path,
                        format!(
                            "role '{}' revoked for participant '{}' without prior grant",
                            role, participant
                        ),
                    ));
                }
            }
        }

        // Rule 3: updates only for declared participants.
        for participant in transition.role_updates.keys() {
            if !participants.contains(&participant.as_str()) {
                issues.push(Issue::on_path(
                    edam,
                    path,
                    format!(
                        "role update for unrelated participant '{}' in operation '{}'",
                        participant, transition.operation
                    ),
                ));
            }
        }
    }
}

fn granted_by_update(transition: &Transition, participant: &str, role: &str) -> bool {
    transition
        .role_updates
        .get(participant)
        .and_then(|modes| modes.get(role))
        .map(|mode| *mode == RoleMode::Granted)
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;
    use edam_model::{Exp, RoleMap};

    fn role_map(participant: &str, role: &str, mode: RoleMode) -> RoleMap {
        let mut modes = BTreeMap::new();
        modes.insert(role.to_string(), mode);
        let mut map = RoleMap::new();
        map.insert(participant.to_string(), modes);
        map
    }

    fn transition(source: &str, target: &str, operation: &str) -> Transition {
        Transition {
            source_state: source.to_string(),
            target_state: target.to_string(),
            operation: operation.to_string(),
            guard: Exp::bool(true),
            external_calls: vec![],
            roles: RoleMap::new(),
            role_updates: RoleMap::new(),
            participants: vec!["b".to_string()],
            initiator: "a".to_string(),
            parameters: vec![],
            assignments: vec![],
        }
    }

    fn edam(states: &[&str], transitions: Vec<Transition>) -> Edam {
        Edam {
            name: "T".to_string(),
            states: states.iter().map(|s| s.to_string()).collect(),
            transitions,
            initial_state: states[0].to_string(),
            final_states: vec![],
            roles: vec!["R".to_string()],
            participants: vec![],
            variables: vec![],
            contract_data_types: vec![],
        }
    }

    #[test]
    fn test_grant_then_require_is_clean() {
        let mut grant = transition("q0", "q1", "enroll");
        grant.role_updates = role_map("b", "R", RoleMode::Granted);
        let mut require = transition("q1", "q2", "act");
        require.roles = role_map("b", "R", RoleMode::Granted);

        let report = check(&edam(&["q0", "q1", "q2"], vec![grant, require]), &VerifyOptions::default());
        assert!(report.ok);
        assert!(report.issues.is_empty());
        assert_eq!(report.paths_explored, 1);
    }

    #[test]
    fn test_require_without_grant_is_one_issue() {
        let mut require = transition("q0", "q1", "act");
        require.roles = role_map("b", "R", RoleMode::Granted);

        let report = check(&edam(&["q0", "q1"], vec![require]), &VerifyOptions::default());
        assert!(!report.ok);
        assert_eq!(report.issues.len(), 1);
        assert!(report.issues[0].description.contains("used before granted"));
        assert_eq!(report.issues[0].path, vec!["q0 act -> q1"]);
    }

    #[test]
    fn test_revoke_needs_own_precondition_grant() {
        let mut revoke = transition("q0", "q1", "expel");
        revoke.role_updates = role_map("b", "R", RoleMode::Revoked);

        let report = check(&edam(&["q0", "q1"], vec![revoke]), &VerifyOptions::default());
        assert_eq!(report.issues.len(), 1);
        assert!(report.issues[0].description.contains("without prior grant"));

        // With the precondition present the revoke is fine.
        let mut guarded = transition("q0", "q1", "expel");
        guarded.roles = role_map("b", "R", RoleMode::Granted);
        guarded.role_updates = role_map("b", "R", RoleMode::Revoked);
        let mut grant = transition("q0", "q1", "enroll");
        grant.role_updates = role_map("b", "R", RoleMode::Granted);
        // Grant happens on a fresh path; the guarded revoke's own
        // precondition violation is rule 1's concern, not rule 2's.
        let report = check(&edam(&["q0", "q1"], vec![grant, guarded]), &VerifyOptions::default());
        assert!(report
            .issues
            .iter()
            .all(|i| !i.description.contains("without prior grant")));
    }

    #[test]
    fn test_unrelated_participant_update() {
        let mut t = transition("q0", "q1", "act");
        t.role_updates = role_map("stranger", "R", RoleMode::Granted);

        let report = check(&edam(&["q0", "q1"], vec![t]), &VerifyOptions::default());
        assert_eq!(report.issues.len(), 1);
        assert!(report.issues[0]
            .description
            .contains("unrelated participant 'stranger'"));
    }

    #[test]
    fn test_violations_accumulate_across_rules() {
        let mut t = transition("q0", "q1", "act");
        t.roles = role_map("b", "R", RoleMode::Granted);
        t.role_updates = role_map("stranger", "R", RoleMode::Revoked);

        let report = check(&edam(&["q0", "q1"], vec![t]), &VerifyOptions::default());
        // Rule 1 (no prior grant), rule 2 (revoke unguarded), rule 3
        // (stranger) all fire on the same transition.
        assert_eq!(report.issues.len(), 3);
        assert!(!report.ok);
    }
}
