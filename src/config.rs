//! Reconciliation settings.
//!
//! Hosts usually read these from their own settings store and hand them
//! over as JSON or TOML; every field has a default.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::algo::{Cost, DEFAULT_MAX_COST, INFINITE};
use crate::error::ReconcileError;

/// How live and staged nodes are matched before patching.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DiffMethod {
    /// No identity map; the patcher matches by position and shape only.
    None,
    /// Lockstep structural prematching.
    #[default]
    Heuristic,
    /// Sequence diff over the flattened visible nodes.
    Myers,
}

impl DiffMethod {
    pub const ALL: [DiffMethod; 3] = [DiffMethod::None, DiffMethod::Heuristic, DiffMethod::Myers];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::None => "none",
            Self::Heuristic => "heuristic",
            Self::Myers => "myers",
        }
    }
}

impl FromStr for DiffMethod {
    type Err = ReconcileError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|method| method.as_str() == s)
            .ok_or_else(|| ReconcileError::UnknownDiffMethod(s.to_string()))
    }
}

impl fmt::Display for DiffMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Which engine turns the live tree into the staged tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Engine {
    /// A [`TreePatcher`](crate::patch::TreePatcher) steered by the
    /// [`DiffMethod`] identity map.
    #[default]
    Patcher,
    /// Bounded tree edit distance; the script is applied directly.
    EditDistance,
}

/// Settings for a [`Reconciler`](crate::reconcile::Reconciler).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReconcileConfig {
    pub diff_method: DiffMethod,
    pub engine: Engine,
    /// Cost bound for the edit-distance engine.
    pub max_cost: Cost,
    /// Forward inserted and changed nodes to the typesetter.
    pub render_math: bool,
}

impl Default for ReconcileConfig {
    fn default() -> Self {
        Self {
            diff_method: DiffMethod::default(),
            engine: Engine::default(),
            max_cost: DEFAULT_MAX_COST,
            render_math: true,
        }
    }
}

impl ReconcileConfig {
    /// Unbounded edit distance.
    ///
    /// Use for small documents where a minimal patch matters more than
    /// latency.
    pub fn exact() -> Self {
        Self {
            engine: Engine::EditDistance,
            max_cost: INFINITE,
            ..Self::default()
        }
    }

    /// Positional patching with no matching pass.
    ///
    /// Use for very large documents or rapid typing.
    pub fn fast() -> Self {
        Self {
            diff_method: DiffMethod::None,
            engine: Engine::Patcher,
            ..Self::default()
        }
    }

    pub fn with_diff_method(mut self, method: DiffMethod) -> Self {
        self.diff_method = method;
        self
    }

    pub fn with_engine(mut self, engine: Engine) -> Self {
        self.engine = engine;
        self
    }

    pub fn with_max_cost(mut self, max_cost: Cost) -> Self {
        self.max_cost = max_cost;
        self
    }

    pub fn with_render_math(mut self, render_math: bool) -> Self {
        self.render_math = render_math;
        self
    }
}
