use std::fmt;

/// A car's gap to the leader for one tick
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Gap {
    Leader,
    /// Sample-time difference to the leader in seconds.
    ///
    /// Negative when the car's sample time is ahead of the leader's; the
    /// leader is picked by progress, not by time.
    Delta(f64),
}

impl Gap {
    pub fn seconds(&self) -> f64 {
        match self {
            Gap::Leader => 0.0,
            Gap::Delta(secs) => *secs,
        }
    }

    pub fn is_leader(&self) -> bool {
        matches!(self, Gap::Leader)
    }
}

impl fmt::Display for Gap {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Gap::Leader => write!(f, "Leader"),
            Gap::Delta(secs) => write!(f, "{:+.2}s", secs),
        }
    }
}

/// Gaps for the cars running this tick.
///
/// `entries` holds each car's `(current sample time, progress)`. The leader
/// is the first entry with the greatest progress; every other car gets
/// `time - leader time`. The result is index-aligned with `entries`.
pub fn compute_gaps(entries: &[(f64, f64)]) -> Vec<Gap> {
    let leader = entries
        .iter()
        .enumerate()
        .fold(None, |best: Option<(usize, f64)>, (i, &(_, progress))| match best {
            Some((_, best_progress)) if best_progress >= progress => best,
            _ => Some((i, progress)),
        })
        .map(|(i, _)| i);

    let Some(leader) = leader else {
        return Vec::new();
    };
    let leader_time = entries[leader].0;

    entries
        .iter()
        .enumerate()
        .map(|(i, &(time, _))| {
            if i == leader {
                Gap::Leader
            } else {
                Gap::Delta(time - leader_time)
            }
        })
        .collect()
}
