use crate::config::*;
use log::debug;
use std::collections::HashMap;
use std::hash::Hash;

/// Priority of a regular reading of a grade label.
pub const REGULAR_PRIORITY: u32 = 2;
/// Priority of the middle/high school readings of the "primary school or nothing" label.
pub const LOW_PRIORITY: u32 = 1;

/// The middle-school enrollment years compatible with a grade mask, for a
/// contest held during `school_year`.
///
/// For the [GradeMask::PRIMARY_OR_NONE] label, the readings above level 5 are
/// down-weighted so that the primary school reading dominates.
pub fn enrollment_candidates(school_year: i32, grades: GradeMask) -> EnrollmentCandidates {
    let primary_or_none = grades == GradeMask::PRIMARY_OR_NONE;
    grades
        .levels()
        .map(|level| {
            let priority = if primary_or_none && level > 5 {
                LOW_PRIORITY
            } else {
                REGULAR_PRIORITY
            };
            (school_year - level + 1, priority)
        })
        .collect()
}

/// The years with the highest accumulated weight over all the candidate sets.
///
/// Ties are all returned, in ascending order. No candidates means no year.
pub fn weighted_mode<'a, I>(candidate_sets: I) -> Vec<i32>
where
    I: IntoIterator<Item = &'a EnrollmentCandidates>,
{
    let mut counter: HashMap<i32, u64> = HashMap::new();
    for candidates in candidate_sets {
        for (year, weight) in candidates.iter() {
            *counter.entry(year).or_insert(0) += u64::from(weight);
        }
    }
    let res = maximal_keys(counter);
    debug!("weighted_mode: {:?}", res);
    res
}

/// Unweighted variant of [weighted_mode]: each occurrence counts once.
pub fn mode<T, S, I>(sets: I) -> Vec<T>
where
    T: Eq + Hash + Ord,
    S: IntoIterator<Item = T>,
    I: IntoIterator<Item = S>,
{
    let mut counter: HashMap<T, u64> = HashMap::new();
    for set in sets {
        for elt in set {
            *counter.entry(elt).or_insert(0) += 1;
        }
    }
    maximal_keys(counter)
}

fn maximal_keys<T: Ord>(counter: HashMap<T, u64>) -> Vec<T> {
    let most = match counter.values().max() {
        Some(m) => *m,
        None => return Vec::new(),
    };
    let mut res: Vec<T> = counter
        .into_iter()
        .filter_map(|(k, v)| if v == most { Some(k) } else { None })
        .collect();
    res.sort();
    res
}
