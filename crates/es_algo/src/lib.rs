// crates/es_algo/src/lib.rs
#![forbid(unsafe_code)]

//! Simulation algorithms for one district: the electorate model, candidate
//! field strategies, the voter utility model, and the election-method family.
//! Pure functions of their inputs plus the `GaussianSampler` stream they are
//! handed; no I/O.

pub mod errors;

pub mod population;
pub mod candidates;
pub mod ballot;
pub mod satisfaction;

// ----------------------------- Tabulation (public surface) ---------------------------

pub mod tabulation {
    pub mod field_index;
    pub mod plurality;
    pub mod primary;
    pub mod top_two;
    pub mod ranked_irv;
    pub mod ranked_condorcet;
    pub mod method;

    pub use field_index::FieldIndex;
    pub use method::{tabulate, ElectionInput, Tabulation, TabulationTrace};
    pub use plurality::{tabulate_plurality, PluralityOutcome};
    pub use primary::{tabulate_primary_general, PrimaryGeneralOutcome, PrimaryStage};
    pub use ranked_condorcet::{tabulate_condorcet, CondorcetOutcome, CopelandEntry, PairwiseMatrix};
    pub use ranked_irv::{tabulate_irv, IrvOutcome, IrvRound};
    pub use top_two::{tabulate_top_two, TopTwoOutcome};
}

// Convenience re-exports (pipeline imports these from crate root)
pub use ballot::{draw_noise, generate_ballot, rank_with_noise, utility, Viability};
pub use candidates::generate as generate_candidates;
pub use errors::{GenerateError, TabError};
pub use population::{primary_voter, CombinedPopulation, PopulationGroup, PopulationSample};
pub use satisfaction::{median_satisfaction, voter_satisfaction};
pub use tabulation::{tabulate, ElectionInput, Tabulation, TabulationTrace};
