//! Dispatch from [`StrategyKind`] to the concrete strategy.
use crate::estimation::{
    bootstrap::BootstrapStrategy,
    errors::StrategyResult,
    laplace::LaplaceStrategy,
    likelihood_samples::LikelihoodSampleStrategy,
    posterior::PosteriorStrategy,
    random_walk::RandomWalkStrategy,
    regression::RegressionStrategy,
    traits::{EstimationStrategy, FitContext, StrategyKind, WeightedSamples},
};

/// Any of the six built-in strategies.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Strategy {
    Regression(RegressionStrategy),
    Laplace(LaplaceStrategy),
    Bootstrap(BootstrapStrategy),
    LikelihoodSamples(LikelihoodSampleStrategy),
    RandomWalk(RandomWalkStrategy),
    Posterior(PosteriorStrategy),
}

impl Strategy {
    pub fn for_kind(kind: StrategyKind) -> Self {
        match kind {
            StrategyKind::Regression => Strategy::Regression(RegressionStrategy),
            StrategyKind::Laplace => Strategy::Laplace(LaplaceStrategy),
            StrategyKind::Bootstrap => Strategy::Bootstrap(BootstrapStrategy),
            StrategyKind::LikelihoodSamples => Strategy::LikelihoodSamples(LikelihoodSampleStrategy),
            StrategyKind::RandomWalk => Strategy::RandomWalk(RandomWalkStrategy),
            StrategyKind::Posterior => Strategy::Posterior(PosteriorStrategy),
        }
    }

    fn inner(&self) -> &dyn EstimationStrategy {
        match self {
            Strategy::Regression(s) => s,
            Strategy::Laplace(s) => s,
            Strategy::Bootstrap(s) => s,
            Strategy::LikelihoodSamples(s) => s,
            Strategy::RandomWalk(s) => s,
            Strategy::Posterior(s) => s,
        }
    }
}

impl EstimationStrategy for Strategy {
    fn kind(&self) -> StrategyKind {
        self.inner().kind()
    }

    fn estimate(&self, ctx: &mut FitContext<'_>) -> StrategyResult<WeightedSamples> {
        self.inner().estimate(ctx)
    }
}
