//! Exhaustive simple-path enumeration over the transition graph.
//!
//! Every path from the initial state is produced by choosing an
//! outgoing transition, removing it from the pool, and recursing from
//! its target until no unused outgoing transition remains. Each
//! transition appears at most once per path, so paths are finite, but
//! the count is exponential in branching factor. Enumeration stops at
//! a caller-imposed ceiling; the result records whether truncation
//! occurred.

use edam_model::{Adjacency, Edam};

/// Default ceiling on explored paths.
pub const MAX_PATHS: usize = 10_000;

/// Caller-tunable verification knobs.
#[derive(Debug, Clone)]
pub struct VerifyOptions {
    /// Maximum number of terminal paths to enumerate.
    pub max_paths: usize,
}

impl Default for VerifyOptions {
    fn default() -> Self {
        VerifyOptions {
            max_paths: MAX_PATHS,
        }
    }
}

/// Enumerated terminal paths, each a sequence of indices into
/// `Edam::transitions`.
#[derive(Debug)]
pub struct PathSet {
    pub paths: Vec<Vec<usize>>,
    /// True when enumeration hit the ceiling before exhausting the
    /// graph.
    pub truncated: bool,
}

/// Enumerate all terminal paths from the model's initial state, up to
/// `max_paths`.
pub fn enumerate_paths(edam: &Edam, max_paths: usize) -> PathSet {
    let adjacency = edam.adjacency();
    let mut used = vec![false; edam.transitions.len()];
    let mut current = Vec::new();
    let mut set = PathSet {
        paths: Vec::new(),
        truncated: false,
    };
    explore(
        edam,
        &adjacency,
        &edam.initial_state,
        &mut used,
        &mut current,
        max_paths,
        &mut set,
    );
    set
}

fn explore(
    edam: &Edam,
    adjacency: &Adjacency,
    state: &str,
    used: &mut Vec<bool>,
    current: &mut Vec<usize>,
    max_paths: usize,
    set: &mut PathSet,
) {
    if set.paths.len() >= max_paths {
        set.truncated = true;
        return;
    }

    let outgoing: Vec<usize> = adjacency
        .from_state(state)
        .iter()
        .copied()
        .filter(|&i| !used[i])
        .collect();

    if outgoing.is_empty() {
        if !current.is_empty() {
            set.paths.push(current.clone());
        }
        return;
    }

    for index in outgoing {
        used[index] = true;
        current.push(index);
        explore(
            edam,
            adjacency,
            &edam.transitions[index].target_state,
            used,
            current,
            max_paths,
            set,
        );
        current.pop();
        used[index] = false;
    }
}
