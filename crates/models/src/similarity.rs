//! Cosine similarity and neighbour selection

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};

/// A similar item or user and how similar it is
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Neighbour {
    pub id: i64,
    pub similarity: f64,
}

/// Cosine similarity of two binary vectors given their overlap and sizes
pub fn binary_cosine(overlap: usize, left_len: usize, right_len: usize) -> f64 {
    if overlap == 0 || left_len == 0 || right_len == 0 {
        return 0.0;
    }
    overlap as f64 / ((left_len as f64) * (right_len as f64)).sqrt()
}

/// Cosine similarity of two sparse count vectors
pub fn sparse_cosine(left: &HashMap<i64, f64>, right: &HashMap<i64, f64>) -> f64 {
    let (small, large) = if left.len() <= right.len() {
        (left, right)
    } else {
        (right, left)
    };

    let dot: f64 = small
        .iter()
        .filter_map(|(key, value)| large.get(key).map(|other| value * other))
        .sum();
    if dot == 0.0 {
        return 0.0;
    }

    let left_norm = left.values().map(|v| v * v).sum::<f64>().sqrt();
    let right_norm = right.values().map(|v| v * v).sum::<f64>().sqrt();
    if left_norm == 0.0 || right_norm == 0.0 {
        return 0.0;
    }
    dot / (left_norm * right_norm)
}

/// Sort best first (ties broken by ascending id) and keep the `k` strongest
pub fn top_k(mut candidates: Vec<Neighbour>, k: usize) -> Vec<Neighbour> {
    candidates.retain(|n| n.similarity > 0.0);
    candidates.sort_by(|a, b| {
        b.similarity
            .total_cmp(&a.similarity)
            .then_with(|| a.id.cmp(&b.id))
    });
    candidates.truncate(k);
    candidates
}

/// Neighbours of every entity from binary membership sets
///
/// `members` maps each entity (item or user) to the sorted, de-duplicated
/// entities it co-occurs through (users or items). Pairwise overlaps are
/// counted through the inverted index so entities sharing nothing are never
/// compared.
pub fn binary_neighbours(
    members: &BTreeMap<i64, Vec<i64>>,
    k: usize,
) -> BTreeMap<i64, Vec<Neighbour>> {
    let mut inverted: HashMap<i64, Vec<i64>> = HashMap::new();
    for (&entity, linked) in members {
        for &link in linked {
            inverted.entry(link).or_default().push(entity);
        }
    }

    let mut neighbours = BTreeMap::new();
    for (&entity, linked) in members {
        let mut overlaps: HashMap<i64, usize> = HashMap::new();
        for link in linked {
            if let Some(sharing) = inverted.get(link) {
                for &other in sharing {
                    if other != entity {
                        *overlaps.entry(other).or_default() += 1;
                    }
                }
            }
        }

        let candidates = overlaps
            .into_iter()
            .map(|(other, overlap)| Neighbour {
                id: other,
                similarity: binary_cosine(
                    overlap,
                    linked.len(),
                    members.get(&other).map_or(0, Vec::len),
                ),
            })
            .collect();
        neighbours.insert(entity, top_k(candidates, k));
    }
    neighbours
}

/// Neighbours of every entity from weighted profile vectors
pub fn profile_neighbours(
    profiles: &BTreeMap<i64, HashMap<i64, f64>>,
    k: usize,
) -> BTreeMap<i64, Vec<Neighbour>> {
    let mut neighbours = BTreeMap::new();
    for (&entity, profile) in profiles {
        let candidates = profiles
            .iter()
            .filter(|(&other, _)| other != entity)
            .map(|(&other, other_profile)| Neighbour {
                id: other,
                similarity: sparse_cosine(profile, other_profile),
            })
            .collect();
        neighbours.insert(entity, top_k(candidates, k));
    }
    neighbours
}
