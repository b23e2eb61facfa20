// crates/es_algo/src/tabulation/method.rs
//
// Single entry point over the closed `ElectionMethod` set.

use std::collections::BTreeMap;

use es_core::{Ballot, Candidate, CandidateId, ElectionMethod, Party};
use serde::Serialize;

use super::primary::{tabulate_primary_general, PrimaryStage};
use super::ranked_condorcet::{tabulate_condorcet, CopelandEntry, PairwiseMatrix};
use super::ranked_irv::{tabulate_irv, IrvRound};
use super::top_two::tabulate_top_two;
use crate::errors::TabError;

/// Everything a tabulator may read for one district.
#[derive(Debug, Clone, Copy)]
pub struct ElectionInput<'a> {
    pub field: &'a [Candidate],
    /// Full-electorate ballots over the whole field.
    pub ballots: &'a [Ballot],
    /// Closed-primary ballots per party; only `PrimaryGeneral` reads these.
    pub primary_ballots: Option<&'a BTreeMap<Party, Vec<Ballot>>>,
}

impl<'a> ElectionInput<'a> {
    pub fn new(field: &'a [Candidate], ballots: &'a [Ballot]) -> Self {
        Self { field, ballots, primary_ballots: None }
    }

    pub fn with_primaries(mut self, primaries: &'a BTreeMap<Party, Vec<Ballot>>) -> Self {
        self.primary_ballots = Some(primaries);
        self
    }

    fn ids(&self) -> Vec<CandidateId> {
        self.field.iter().map(|c| c.id).collect()
    }
}

/// Method-specific round log.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TabulationTrace {
    PrimaryGeneral {
        primaries: Vec<PrimaryStage>,
        general: Vec<(CandidateId, u64)>,
        general_exhausted: u64,
    },
    TopTwo {
        first_round: Vec<(CandidateId, u64)>,
        finalists: Vec<CandidateId>,
        runoff: Vec<(CandidateId, u64)>,
        exhausted: u64,
    },
    InstantRunoff {
        rounds: Vec<IrvRound>,
    },
    Condorcet {
        matrix: PairwiseMatrix,
        copeland: Vec<CopelandEntry>,
        condorcet_winner: Option<CandidateId>,
        cycle: bool,
    },
}

impl TabulationTrace {
    /// True only for a Condorcet tabulation without a Condorcet winner.
    pub fn is_cycle(&self) -> bool {
        matches!(self, TabulationTrace::Condorcet { cycle: true, .. })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Tabulation {
    pub method: ElectionMethod,
    pub winner: CandidateId,
    pub margin: i64,
    /// General-electorate ballots counted.
    pub total_votes: u64,
    pub trace: TabulationTrace,
}

fn signed(v: u64) -> i64 {
    i64::try_from(v).unwrap_or(i64::MAX)
}

/// Tabulate `input` under `method`.
pub fn tabulate(method: ElectionMethod, input: &ElectionInput<'_>) -> Result<Tabulation, TabError> {
    let total_votes = input.ballots.len() as u64;
    let (winner, margin, trace) = match method {
        ElectionMethod::PrimaryGeneral => {
            let empty = BTreeMap::new();
            let primaries = input.primary_ballots.unwrap_or(&empty);
            let out = tabulate_primary_general(input.field, input.ballots, primaries)?;
            let trace = TabulationTrace::PrimaryGeneral {
                primaries: out.primaries,
                general: out.general,
                general_exhausted: out.general_exhausted,
            };
            (out.winner, signed(out.margin), trace)
        }
        ElectionMethod::TopTwo => {
            let out = tabulate_top_two(&input.ids(), input.ballots)?;
            let trace = TabulationTrace::TopTwo {
                first_round: out.first_round,
                finalists: out.finalists,
                runoff: out.runoff,
                exhausted: out.exhausted,
            };
            (out.winner, signed(out.margin), trace)
        }
        ElectionMethod::InstantRunoff => {
            let out = tabulate_irv(&input.ids(), input.ballots)?;
            (out.winner, signed(out.margin), TabulationTrace::InstantRunoff { rounds: out.rounds })
        }
        ElectionMethod::Condorcet => {
            let out = tabulate_condorcet(&input.ids(), input.ballots)?;
            let trace = TabulationTrace::Condorcet {
                matrix: out.matrix,
                copeland: out.copeland,
                condorcet_winner: out.condorcet_winner,
                cycle: out.cycle,
            };
            (out.winner, out.margin, trace)
        }
    };
    tracing::trace!(%method, %winner, margin, total_votes, "tabulated");
    Ok(Tabulation { method, winner, margin, total_votes, trace })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn field() -> Vec<Candidate> {
        vec![
            Candidate::new(CandidateId(0), "D-1", Party::Democratic, -1.0, 0.0),
            Candidate::new(CandidateId(1), "I-1", Party::Independent, 0.0, 0.0),
            Candidate::new(CandidateId(2), "R-1", Party::Republican, 1.0, 0.0),
        ]
    }

    fn b(r: &[u16]) -> Ballot {
        Ballot::new(r.iter().map(|&x| CandidateId(x)).collect())
    }

    #[test]
    fn dispatches_every_method() {
        let f = field();
        let ballots = vec![b(&[0, 1, 2]), b(&[0, 1, 2]), b(&[2, 1, 0]), b(&[2, 1, 0]), b(&[1, 0, 2])];
        let input = ElectionInput::new(&f, &ballots);
        for &m in ElectionMethod::ALL {
            let t = tabulate(m, &input).unwrap();
            assert_eq!(t.method, m);
            assert_eq!(t.total_votes, 5);
        }
        assert_eq!(tabulate(ElectionMethod::Condorcet, &input).unwrap().winner, CandidateId(1));
        // 0 and 2 tie on first choices; the lower id takes the plurality general
        assert_eq!(tabulate(ElectionMethod::PrimaryGeneral, &input).unwrap().winner, CandidateId(0));
    }

    #[test]
    fn trace_serializes_with_kind_tag() {
        let f = field();
        let ballots = vec![b(&[1, 0, 2])];
        let t = tabulate(ElectionMethod::InstantRunoff, &ElectionInput::new(&f, &ballots)).unwrap();
        let v = serde_json::to_value(&t.trace).unwrap();
        assert_eq!(v["kind"], "instant_runoff");
        assert_eq!(v["rounds"][0]["round"], 1);
        assert!(!t.trace.is_cycle());
    }

    #[test]
    fn empty_inputs_fail_for_every_method() {
        let f = field();
        for &m in ElectionMethod::ALL {
            assert_eq!(tabulate(m, &ElectionInput::new(&f, &[])), Err(TabError::NoBallots));
            assert_eq!(tabulate(m, &ElectionInput::new(&[], &[b(&[])])), Err(TabError::NoCandidates));
        }
    }
}
