//!
//! Model configuration (JSON via serde)
//!
//! ```json
//! {
//!   "states": [0, 1],
//!   "alphabet": ["a", "b", "#"],
//!   "initialDistribution": {"0": 0.5, "1": 0.5},
//!   "transitionMatrix": {"0": {"0": 0.6, "1": 0.4}, "1": {"0": 0.3, "1": 0.7}},
//!   "emissionMatrix": {"0": {"a": 0.5, "b": 0.3, "#": 0.2}, "1": {"a": 0.2, "b": 0.3, "#": 0.5}},
//!   "corpus": [["a", "#"], ["b", "a", "#"]],
//!   "verbose": false,
//!   "epsilon": 0.0
//! }
//! ```
//!
//! The three tables are optional. Entries missing from a given table are
//! zero.
//!
use crate::common::{Label, Labels};
use crate::error::{HmmError, Result};
use crate::hmm::params::ModelParams;
use crate::init::Initializer;
use fnv::FnvHashMap;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[serde(bound(deserialize = "S: Deserialize<'de>, A: Deserialize<'de>"))]
pub struct ModelConfig<S: Label, A: Label> {
    pub states: Vec<S>,
    pub alphabet: Vec<A>,
    #[serde(default)]
    pub initial_distribution: Option<FnvHashMap<S, f64>>,
    /// `origin -> dest -> probability`
    #[serde(default)]
    pub transition_matrix: Option<FnvHashMap<S, FnvHashMap<S, f64>>>,
    /// `state -> symbol -> probability`
    #[serde(default)]
    pub emission_matrix: Option<FnvHashMap<S, FnvHashMap<A, f64>>>,
    #[serde(default)]
    pub corpus: Vec<Vec<A>>,
    /// emit trace records of every pass
    #[serde(default)]
    pub verbose: bool,
    /// sequences with probability below this are degenerate
    #[serde(default)]
    pub epsilon: f64,
}

impl<S, A> ModelConfig<S, A>
where
    S: Label + serde::de::DeserializeOwned,
    A: Label + serde::de::DeserializeOwned,
{
    pub fn from_json_str(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }
    pub fn from_json_reader<R: std::io::Read>(reader: R) -> Result<Self> {
        Ok(serde_json::from_reader(reader)?)
    }
}

impl<S: Label, A: Label> ModelConfig<S, A> {
    ///
    /// Configuration with the label sets only; every table is left to the
    /// initializer.
    ///
    pub fn new(states: Vec<S>, alphabet: Vec<A>) -> Self {
        ModelConfig {
            states,
            alphabet,
            initial_distribution: None,
            transition_matrix: None,
            emission_matrix: None,
            corpus: Vec::new(),
            verbose: false,
            epsilon: 0.0,
        }
    }
    ///
    /// Validate the tables and build the parameters.
    ///
    /// Omitted tables are drawn from `init` in the order: initial
    /// distribution, transition rows, emission rows.
    ///
    pub fn to_params<I: Initializer>(&self, init: &mut I) -> Result<ModelParams<S, A>> {
        if !(self.epsilon >= 0.0) {
            return Err(HmmError::invalid_configuration(format!(
                "epsilon {} is not a non-negative number",
                self.epsilon
            )));
        }
        let states = Labels::new(self.states.clone(), "state")?;
        let alphabet = Labels::new(self.alphabet.clone(), "symbol")?;
        let n = states.len();
        let m = alphabet.len();

        let initial = match &self.initial_distribution {
            Some(map) => dense_row(map, &states, state_error)?,
            None => init.simplex(n),
        };
        let transitions = match &self.transition_matrix {
            Some(map) => dense_matrix(map, &states, &states, state_error)?,
            None => (0..n).map(|_| init.simplex(n)).collect(),
        };
        let emissions = match &self.emission_matrix {
            Some(map) => dense_matrix(map, &states, &alphabet, symbol_error)?,
            None => (0..n).map(|_| init.simplex(m)).collect(),
        };
        ModelParams::new(
            self.states.clone(),
            self.alphabet.clone(),
            initial,
            transitions,
            emissions,
        )
    }
}

fn state_error<S: Label>(state: &S) -> HmmError {
    HmmError::UnknownState {
        state: state.to_string(),
    }
}

fn symbol_error<A: Label>(symbol: &A) -> HmmError {
    HmmError::UnknownSymbol {
        symbol: symbol.to_string(),
        position: None,
    }
}

/// `{label: p}` into a vector ordered as `labels`
fn dense_row<T, F>(map: &FnvHashMap<T, f64>, labels: &Labels<T>, unknown: F) -> Result<Vec<f64>>
where
    T: Label,
    F: Fn(&T) -> HmmError,
{
    let mut row = vec![0.0; labels.len()];
    for (label, &p) in map.iter() {
        let i = labels.index_of(label).ok_or_else(|| unknown(label))?;
        row[i] = p;
    }
    Ok(row)
}

/// `{state: {label: p}}` into rows ordered as `states`
fn dense_matrix<S, T, F>(
    map: &FnvHashMap<S, FnvHashMap<T, f64>>,
    states: &Labels<S>,
    columns: &Labels<T>,
    unknown: F,
) -> Result<Vec<Vec<f64>>>
where
    S: Label,
    T: Label,
    F: Fn(&T) -> HmmError,
{
    let mut rows = vec![vec![0.0; columns.len()]; states.len()];
    for (state, inner) in map.iter() {
        let k = states.index_of(state).ok_or_else(|| state_error(state))?;
        rows[k] = dense_row(inner, columns, &unknown)?;
    }
    Ok(rows)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::init::{RandomSimplex, Uniform};

    const TWO_STATE: &str = r##"{
        "states": [0, 1],
        "alphabet": ["a", "b", "#"],
        "initialDistribution": {"0": 0.5, "1": 0.5},
        "transitionMatrix": {"0": {"0": 0.6, "1": 0.4}, "1": {"0": 0.3, "1": 0.7}},
        "emissionMatrix": {
            "0": {"a": 0.5, "b": 0.3, "#": 0.2},
            "1": {"a": 0.2, "b": 0.3, "#": 0.5}
        },
        "corpus": [["a", "#"], ["b", "a", "#"]]
    }"##;

    #[test]
    fn config_from_json() {
        let config: ModelConfig<u32, char> = ModelConfig::from_json_str(TWO_STATE).unwrap();
        assert_eq!(config.states, vec![0, 1]);
        assert_eq!(config.alphabet, vec!['a', 'b', '#']);
        assert_eq!(config.corpus.len(), 2);
        assert!(!config.verbose);
        assert_eq!(config.epsilon, 0.0);
        let params = config.to_params(&mut Uniform).unwrap();
        assert_abs_diff_eq!(params.transition(&1, &0).unwrap(), 0.3, epsilon = 1e-12);
        assert_abs_diff_eq!(params.emission(&0, &'b').unwrap(), 0.3, epsilon = 1e-12);
        assert_abs_diff_eq!(
            params.full_prob(&['a', '#']).unwrap().to_value(),
            0.121,
            epsilon = 1e-12
        );
    }
    #[test]
    fn config_from_reader() {
        let config: ModelConfig<u32, char> =
            ModelConfig::from_json_reader(TWO_STATE.as_bytes()).unwrap();
        assert_eq!(config.corpus[1], vec!['b', 'a', '#']);
    }
    #[test]
    fn config_omitted_tables_are_drawn() {
        let json = r#"{"states": ["x", "y", "z"], "alphabet": ["0", "1"], "verbose": true}"#;
        let config: ModelConfig<String, String> = ModelConfig::from_json_str(json).unwrap();
        assert!(config.verbose);
        assert!(config.corpus.is_empty());
        let a = config.to_params(&mut RandomSimplex::from_seed(1)).unwrap();
        let b = config.to_params(&mut RandomSimplex::from_seed(1)).unwrap();
        let x = "x".to_string();
        let z = "z".to_string();
        assert_eq!(a.transition(&x, &z).unwrap(), b.transition(&x, &z).unwrap());
        // the first draw is the initial distribution
        let mut init = RandomSimplex::from_seed(1);
        let first = init.simplex(3);
        assert_abs_diff_eq!(a.initial(&x).unwrap(), first[0], epsilon = 1e-12);
    }
    #[test]
    fn config_errors() {
        // malformed text
        assert!(matches!(
            ModelConfig::<u32, char>::from_json_str("{\"states\": [0,"),
            Err(HmmError::Json(_))
        ));
        // unknown state in a table
        let json = r#"{"states": [0, 1], "alphabet": ["a"], "initialDistribution": {"0": 0.5, "2": 0.5}}"#;
        let config: ModelConfig<u32, char> = ModelConfig::from_json_str(json).unwrap();
        assert!(matches!(
            config.to_params(&mut Uniform),
            Err(HmmError::UnknownState { .. })
        ));
        // unknown symbol in a table
        let json = r#"{"states": [0], "alphabet": ["a"], "emissionMatrix": {"0": {"a": 0.5, "c": 0.5}}}"#;
        let config: ModelConfig<u32, char> = ModelConfig::from_json_str(json).unwrap();
        assert!(matches!(
            config.to_params(&mut Uniform),
            Err(HmmError::UnknownSymbol { .. })
        ));
        // missing row
        let json = r#"{"states": [0, 1], "alphabet": ["a"], "transitionMatrix": {"0": {"1": 1.0}}}"#;
        let config: ModelConfig<u32, char> = ModelConfig::from_json_str(json).unwrap();
        assert!(matches!(
            config.to_params(&mut Uniform),
            Err(HmmError::InvalidConfiguration(_))
        ));
        // empty state set
        let config: ModelConfig<u32, char> = ModelConfig::new(vec![], vec!['a']);
        assert!(matches!(
            config.to_params(&mut Uniform),
            Err(HmmError::InvalidConfiguration(_))
        ));
        // negative epsilon
        let mut config: ModelConfig<u32, char> = ModelConfig::new(vec![0], vec!['a']);
        config.epsilon = -1.0;
        assert!(matches!(
            config.to_params(&mut Uniform),
            Err(HmmError::InvalidConfiguration(_))
        ));
    }
    #[test]
    fn config_roundtrip_json() {
        let config: ModelConfig<u32, char> = ModelConfig::from_json_str(TWO_STATE).unwrap();
        let json = serde_json::to_string_pretty(&config).unwrap();
        println!("{}", json);
        let again: ModelConfig<u32, char> = ModelConfig::from_json_str(&json).unwrap();
        assert_eq!(config, again);
    }
}
