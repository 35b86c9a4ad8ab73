use crate::config::SimilarityWeights;
use crate::record::{ContactQuality, ValidatedStudentRecord};
use serde::Serialize;
use std::collections::HashSet;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScoredProfile<'a> {
    pub record: &'a ValidatedStudentRecord,
    pub score: u32,
}

fn specialization_words(specialization: &str) -> HashSet<String> {
    specialization
        .split_whitespace()
        .map(str::to_lowercase)
        .collect()
}

pub fn similarity_score(
    target: &ValidatedStudentRecord,
    candidate: &ValidatedStudentRecord,
    weights: &SimilarityWeights,
) -> u32 {
    let mut score = 0;

    if candidate.domain == target.domain {
        score += weights.same_domain;
    }
    if candidate.level == target.level {
        score += weights.same_level;
    }

    let target_words = specialization_words(&target.specialization);
    let shared = specialization_words(&candidate.specialization)
        .intersection(&target_words)
        .count() as u32;
    score += shared * weights.shared_specialization_word;

    if candidate.source.as_deref() == Some(weights.professional_network_source.as_str()) {
        score += weights.professional_network;
    }

    score += match candidate.contact_quality {
        ContactQuality::Excellent => weights.excellent_contact,
        ContactQuality::Good => weights.good_contact,
        ContactQuality::Incomplete => 0,
    };

    score
}

/// Up to `count` profiles from `pool` most similar to `target`, best first.
///
/// The target itself is excluded by id, candidates at or below the
/// relevance floor are dropped, and ties keep pool order.
pub fn find_similar_profiles<'a>(
    target: &ValidatedStudentRecord,
    pool: &'a [ValidatedStudentRecord],
    count: usize,
    weights: &SimilarityWeights,
) -> Vec<ScoredProfile<'a>> {
    let mut scored: Vec<ScoredProfile<'a>> = pool
        .iter()
        .filter(|candidate| candidate.id != target.id)
        .map(|candidate| ScoredProfile {
            record: candidate,
            score: similarity_score(target, candidate, weights),
        })
        .filter(|scored| scored.score > weights.relevance_floor)
        .collect();

    scored.sort_by(|a, b| b.score.cmp(&a.score));
    scored.truncate(count);
    scored
}
