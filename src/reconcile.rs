//! Merges the credits read from the different views of one enrollment.

use itertools::Itertools;
use log::debug;

use crate::{
    parser::text::parse_float_prefix,
    schema::{Block, Credit, CreditStats, CreditStatus, ExamEvent},
};

/// Resolves split combined exams, drops duplicates and attaches exam events.
///
/// `credits` is expected in view order: grade modules, projects, timetables of other periods,
/// timetable of the current period. Blocks that encompass a resolved combined exam learn the
/// identifier it resolved to.
pub fn reconcile(
    mut credits: Vec<Credit>,
    blocks: &mut [Block],
    exams: &[ExamEvent],
) -> Vec<Credit> {
    let mut keep = vec![true; credits.len()];
    for i in 0..credits.len() {
        if credits[i].is_orphan() {
            let name = &credits[i].name;
            if let Some(j) = credits
                .iter()
                .position(|c| &c.name == name && !c.is_orphan())
            {
                let (name, short_name, uni_identifier) = (
                    credits[j].name.clone(),
                    credits[j].short_name.clone(),
                    credits[j].uni_identifier.clone(),
                );
                let entry = &mut credits[i];
                debug!("{} resolved to {uni_identifier}", entry.uni_identifier);
                entry.name = name;
                entry.short_name = short_name;
                entry.uni_identifier = uni_identifier.clone();
                if let Some(combined) = &entry.combined_exam {
                    if let Some(block) = blocks
                        .iter_mut()
                        .find(|b| b.encompasses.contains(combined))
                    {
                        if !block.encompasses.contains(&uni_identifier) {
                            block.encompasses.push(uni_identifier);
                        }
                    }
                }
            }
        }
        // Yield to a half of a combined exam that still waits for resolution under this name.
        let short_name = &credits[i].short_name;
        keep[i] = !credits
            .iter()
            .any(|c| c.is_orphan() && &c.short_name == short_name);
    }

    credits
        .into_iter()
        .zip(keep)
        .filter(|(credit, keep)| *keep && !credit.is_orphan())
        .map(|(mut credit, _)| {
            let semester = credit.period.semester();
            credit.exams_events = exams
                .iter()
                .filter(|e| e.uni_identifier == credit.uni_identifier)
                .map(|e| ExamEvent {
                    semester: Some(semester.clone()),
                    ..e.clone()
                })
                .collect();
            credit
        })
        .unique_by(|c| (c.uni_identifier.clone(), c.period))
        .collect()
}

/// Earned credits and their credit-weighted grade average, over passed credits.
pub fn credit_stats(credits: &[Credit]) -> CreditStats {
    let passed = credits
        .iter()
        .filter(|c| c.status == CreditStatus::Passed)
        .collect_vec();
    let total_credits = passed.iter().filter_map(|c| c.credits_received).sum();
    let (weighted_sum, weight) = passed
        .iter()
        .filter_map(|c| {
            let grade = parse_float_prefix(c.grade.as_deref()?)?;
            let credits = c.credits_received.filter(|&x| x > 0.)?;
            Some((grade * credits, credits))
        })
        .fold((0., 0.), |(s, w), (x, c)| (s + x, w + c));
    CreditStats {
        total_credits,
        weighted_average: if weight > 0. { weighted_sum / weight } else { 0. },
    }
}
