//!
//! Definition of the discrete HMM parameters
//!
use crate::common::{Label, Labels};
use crate::error::{HmmError, Result};
use crate::init::Initializer;
use crate::prob::Prob;
use itertools::Itertools;

///
/// Parameters of a discrete HMM
///
/// * `init[k]`: initial probability of state `k`
/// * `trans[k][l]`: transition probability from state `k` to state `l`
/// * `emit[k][x]`: probability that state `k` emits symbol `x` when it is
///   departed (the emission belongs to the origin of the transition)
///
/// Rows are not renormalized: the caller is responsible for rows summing
/// to 1, only a positive sum is required.
///
#[derive(Debug, Clone)]
pub struct ModelParams<S: Label, A: Label> {
    states: Labels<S>,
    alphabet: Labels<A>,
    /// `n_states`
    init: Vec<Prob>,
    /// `n_states * n_states`, origin-major
    trans: Vec<Prob>,
    /// `n_states * n_symbols`, state-major
    emit: Vec<Prob>,
}

/// Checks that the row is non-negative and finite with a positive sum.
fn check_row(row: &[f64], expected_len: usize, what: &str) -> Result<()> {
    if row.len() != expected_len {
        return Err(HmmError::invalid_configuration(format!(
            "{} has {} entries, expected {}",
            what,
            row.len(),
            expected_len
        )));
    }
    if let Some(v) = row.iter().find(|v| !v.is_finite() || **v < 0.0) {
        return Err(HmmError::invalid_configuration(format!(
            "{} contains an invalid probability {}",
            what, v
        )));
    }
    let total: f64 = row.iter().sum();
    if total <= 0.0 {
        return Err(HmmError::invalid_configuration(format!(
            "{} does not sum to a positive value",
            what
        )));
    }
    Ok(())
}

impl<S: Label, A: Label> ModelParams<S, A> {
    ///
    /// Create parameters from dense rows ordered as `states`/`alphabet`.
    ///
    /// * `initial[k]`
    /// * `transitions[k][l]` (origin `k`, destination `l`)
    /// * `emissions[k][x]`
    ///
    pub fn new(
        states: Vec<S>,
        alphabet: Vec<A>,
        initial: Vec<f64>,
        transitions: Vec<Vec<f64>>,
        emissions: Vec<Vec<f64>>,
    ) -> Result<Self> {
        let states = Labels::new(states, "state")?;
        let alphabet = Labels::new(alphabet, "symbol")?;
        let n = states.len();
        let m = alphabet.len();

        check_row(&initial, n, "initial distribution")?;
        if transitions.len() != n {
            return Err(HmmError::invalid_configuration(format!(
                "transition matrix has {} rows, expected {}",
                transitions.len(),
                n
            )));
        }
        if emissions.len() != n {
            return Err(HmmError::invalid_configuration(format!(
                "emission matrix has {} rows, expected {}",
                emissions.len(),
                n
            )));
        }
        for (k, state) in states.iter().enumerate() {
            check_row(
                &transitions[k],
                n,
                &format!("transition row of state {}", state),
            )?;
            check_row(
                &emissions[k],
                m,
                &format!("emission row of state {}", state),
            )?;
        }

        Ok(ModelParams {
            init: initial.into_iter().map(Prob::from_prob).collect(),
            trans: transitions
                .into_iter()
                .flatten()
                .map(Prob::from_prob)
                .collect(),
            emit: emissions
                .into_iter()
                .flatten()
                .map(Prob::from_prob)
                .collect(),
            states,
            alphabet,
        })
    }
    ///
    /// Create parameters whose every row is drawn from `init`.
    ///
    /// Rows are drawn in the order: initial distribution, transition rows,
    /// emission rows (states in the given order).
    ///
    pub fn random<I: Initializer>(states: Vec<S>, alphabet: Vec<A>, init: &mut I) -> Result<Self> {
        let n = states.len();
        let m = alphabet.len();
        let initial = init.simplex(n);
        let transitions = (0..n).map(|_| init.simplex(n)).collect();
        let emissions = (0..n).map(|_| init.simplex(m)).collect();
        ModelParams::new(states, alphabet, initial, transitions, emissions)
    }
}

//
// index-based accessors used by the recursions
//
impl<S: Label, A: Label> ModelParams<S, A> {
    pub fn n_states(&self) -> usize {
        self.states.len()
    }
    pub fn n_symbols(&self) -> usize {
        self.alphabet.len()
    }
    pub fn states(&self) -> &Labels<S> {
        &self.states
    }
    pub fn alphabet(&self) -> &Labels<A> {
        &self.alphabet
    }
    #[inline]
    pub fn p_init(&self, k: usize) -> Prob {
        self.init[k]
    }
    #[inline]
    pub fn p_trans(&self, k: usize, l: usize) -> Prob {
        self.trans[k * self.n_states() + l]
    }
    #[inline]
    pub fn p_emit(&self, k: usize, x: usize) -> Prob {
        self.emit[k * self.n_symbols() + x]
    }
    ///
    /// `\sum_k init[k]`, the probability of the empty sequence.
    pub fn p_init_total(&self) -> Prob {
        self.init.iter().sum()
    }
}

//
// label-based accessors
//
impl<S: Label, A: Label> ModelParams<S, A> {
    pub fn state_index(&self, state: &S) -> Result<usize> {
        self.states
            .index_of(state)
            .ok_or_else(|| HmmError::UnknownState {
                state: state.to_string(),
            })
    }
    pub fn symbol_index(&self, symbol: &A) -> Result<usize> {
        self.alphabet
            .index_of(symbol)
            .ok_or_else(|| HmmError::UnknownSymbol {
                symbol: symbol.to_string(),
                position: None,
            })
    }
    ///
    /// Convert a sequence of symbols into alphabet indices.
    /// Fails on the first symbol outside the alphabet.
    ///
    pub fn encode(&self, sequence: &[A]) -> Result<Vec<usize>> {
        sequence
            .iter()
            .enumerate()
            .map(|(i, symbol)| {
                self.alphabet
                    .index_of(symbol)
                    .ok_or_else(|| HmmError::UnknownSymbol {
                        symbol: symbol.to_string(),
                        position: Some(i),
                    })
            })
            .collect()
    }
    pub fn initial(&self, state: &S) -> Result<f64> {
        let k = self.state_index(state)?;
        Ok(self.p_init(k).to_value())
    }
    pub fn transition(&self, origin: &S, dest: &S) -> Result<f64> {
        let k = self.state_index(origin)?;
        let l = self.state_index(dest)?;
        Ok(self.p_trans(k, l).to_value())
    }
    pub fn emission(&self, state: &S, symbol: &A) -> Result<f64> {
        let k = self.state_index(state)?;
        let x = self.symbol_index(symbol)?;
        Ok(self.p_emit(k, x).to_value())
    }
}

impl<S: Label, A: Label> std::fmt::Display for ModelParams<S, A> {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        let n = self.n_states();
        let m = self.n_symbols();
        for (k, state) in self.states.iter().enumerate() {
            writeln!(f, "STATE {}", state)?;
            writeln!(f, "Transitions")?;
            for (l, dest) in self.states.iter().enumerate() {
                writeln!(f, "\t{} to {}: {}", state, dest, self.p_trans(k, l))?;
            }
            writeln!(f, "Emissions")?;
            let order = (0..m).sorted_by(|&x, &y| {
                self.p_emit(k, y)
                    .partial_cmp(&self.p_emit(k, x))
                    .unwrap_or(std::cmp::Ordering::Equal)
            });
            for x in order {
                writeln!(f, "\t{}: {}", self.alphabet.get(x), self.p_emit(k, x))?;
            }
            let total: f64 = (0..m).map(|x| self.p_emit(k, x).to_value()).sum();
            writeln!(f, "\tTotal: {}", total)?;
            writeln!(f)?;
        }
        writeln!(f, "Initial probabilities")?;
        for k in 0..n {
            writeln!(f, "STATE {}: {}", self.states.get(k), self.p_init(k))?;
        }
        Ok(())
    }
}
