// crates/es_algo/src/tabulation/primary.rs
//
// Closed party primaries followed by a plurality general election.
//
// Each major party with primary-eligible candidates runs a plurality count
// over its own primary ballots and sends one nominee forward; a party nobody
// votes in nominates whoever leads the general ballots among its slate. Candidates who
// skip the primary (independents) go straight to the general. The general is
// a plurality count over nominees plus those candidates, with every general
// ballot restricted to that set.

use std::collections::BTreeMap;

use es_core::{Ballot, Candidate, CandidateId, Party};
use serde::Serialize;

use super::field_index::FieldIndex;
use super::plurality::{count_first_choices, decide, tabulate_plurality};
use crate::errors::TabError;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PrimaryStage {
    pub party: Party,
    /// First-choice counts over the party's eligible candidates, field order.
    pub counts: Vec<(CandidateId, u64)>,
    /// Primary ballots cast.
    pub ballots: u64,
    /// No primary ballots were cast; `counts` are general first choices over the slate.
    pub from_general: bool,
    pub nominee: CandidateId,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PrimaryGeneralOutcome {
    pub winner: CandidateId,
    pub margin: u64,
    pub primaries: Vec<PrimaryStage>,
    /// General-election first choices over the general field, field order.
    pub general: Vec<(CandidateId, u64)>,
    pub general_exhausted: u64,
}

/// Run one party's primary. With no primary ballots the general ballots,
/// restricted to the slate, stand in for them.
fn run_primary(
    party: Party,
    eligible: &[CandidateId],
    ballots: &[Ballot],
    general: &[Ballot],
) -> Result<PrimaryStage, TabError> {
    let index = FieldIndex::new(eligible)?;
    let from_general = ballots.is_empty();
    let stand_in: Vec<Ballot>;
    let counted = if from_general {
        stand_in = general.iter().map(|b| b.restricted_to(eligible)).collect();
        &stand_in
    } else {
        index.validate_ballots(ballots)?;
        ballots
    };
    let (raw, _) = count_first_choices(&index, counted);
    let counts = index.with_ids(&raw);
    let (nominee, _) = decide(&counts).ok_or(TabError::UnresolvedTie { stage: "primary" })?;
    Ok(PrimaryStage { party, counts, ballots: ballots.len() as u64, from_general, nominee })
}

pub fn tabulate_primary_general(
    field: &[Candidate],
    general: &[Ballot],
    primaries: &BTreeMap<Party, Vec<Ballot>>,
) -> Result<PrimaryGeneralOutcome, TabError> {
    let ids: Vec<CandidateId> = field.iter().map(|c| c.id).collect();
    let full = FieldIndex::new(&ids)?;
    full.validate_ballots(general)?;

    let mut stages = Vec::new();
    for party in Party::MAJOR {
        let eligible: Vec<CandidateId> = field
            .iter()
            .filter(|c| c.party == party && c.primary_eligible)
            .map(|c| c.id)
            .collect();
        if eligible.is_empty() {
            continue;
        }
        let ballots = primaries.get(&party).map(Vec::as_slice).unwrap_or(&[]);
        stages.push(run_primary(party, &eligible, ballots, general)?);
    }

    let mut finalists: Vec<CandidateId> = field
        .iter()
        .filter(|c| !c.primary_eligible)
        .map(|c| c.id)
        .chain(stages.iter().map(|s| s.nominee))
        .collect();
    finalists.sort_unstable();

    let restricted: Vec<Ballot> = general.iter().map(|b| b.restricted_to(&finalists)).collect();
    let out = tabulate_plurality(&finalists, &restricted)?;

    Ok(PrimaryGeneralOutcome {
        winner: out.winner,
        margin: out.margin,
        primaries: stages,
        general: out.counts,
        general_exhausted: out.exhausted,
    })
}
