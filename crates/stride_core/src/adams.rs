use crate::multistep::{linear_multistep, MultistepWorkspace};
use crate::traits::{OdeSystem, Scalar};
use anyhow::Result;
use num_traits::{Float, FromPrimitive};
use serde::{Deserialize, Serialize};

// Adams tables from Quinney chap. 2; both orders share their
// left-hand-side weights.
const ADAMS4_LEFT: [f64; 5] = [1.0, -1.0, 0.0, 0.0, 0.0];
const ADAMS4_PREDICTOR: [f64; 5] = [0.0, 55.0 / 24.0, -59.0 / 24.0, 37.0 / 24.0, -9.0 / 24.0];
const ADAMS4_CORRECTOR: [f64; 5] = [9.0 / 24.0, 19.0 / 24.0, -5.0 / 24.0, 1.0 / 24.0, 0.0];

const ADAMS6_LEFT: [f64; 7] = [1.0, -1.0, 0.0, 0.0, 0.0, 0.0, 0.0];
const ADAMS6_PREDICTOR: [f64; 7] = [
    0.0,
    4277.0 / 1440.0,
    -7923.0 / 1440.0,
    9982.0 / 1440.0,
    -7298.0 / 1440.0,
    2877.0 / 1440.0,
    -475.0 / 1440.0,
];
const ADAMS6_CORRECTOR: [f64; 7] = [
    475.0 / 1440.0,
    1427.0 / 1440.0,
    -798.0 / 1440.0,
    482.0 / 1440.0,
    -173.0 / 1440.0,
    27.0 / 1440.0,
    0.0,
];

/// An explicit/implicit coefficient pair wired into a predict-then-correct
/// driver over the generic multistep engine. The two tables share their
/// left-hand-side weights, so any explicit/implicit pair of right-hand
/// sides composes without engine changes.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PredictorCorrector<R> {
    state_weights: Vec<R>,
    predictor_weights: Vec<R>,
    corrector_weights: Vec<R>,
}

impl<R: Float + FromPrimitive> PredictorCorrector<R> {
    fn from_tables(left: &[f64], predictor: &[f64], corrector: &[f64]) -> Self {
        let convert = |table: &[f64]| {
            table
                .iter()
                .map(|&w| R::from_f64(w).unwrap())
                .collect::<Vec<R>>()
        };
        Self {
            state_weights: convert(left),
            predictor_weights: convert(predictor),
            corrector_weights: convert(corrector),
        }
    }

    /// 4th order Adams-Bashforth predictor with Adams-Moulton corrector.
    pub fn adams4() -> Self {
        Self::from_tables(&ADAMS4_LEFT, &ADAMS4_PREDICTOR, &ADAMS4_CORRECTOR)
    }

    /// 6th order Adams-Bashforth predictor with Adams-Moulton corrector.
    /// Bootstrap its window with a 5th order single-step method such as
    /// [`crate::solvers::RK5`] to keep the seed error below the formula's.
    pub fn adams6() -> Self {
        Self::from_tables(&ADAMS6_LEFT, &ADAMS6_PREDICTOR, &ADAMS6_CORRECTOR)
    }

    /// Number of previous steps the pair consumes.
    pub fn order(&self) -> usize {
        self.state_weights.len() - 1
    }

    /// One predict-then-correct cycle: seeds `ynext` with the explicit
    /// predictor, then runs `corrector_iterations` implicit passes (none
    /// when zero). The window must hold `order` chunks seeded by
    /// [`MultistepWorkspace::bootstrap`] or by earlier accepted steps;
    /// whether those chunks are valid is not (and cannot be) checked here.
    pub fn step<T>(
        &self,
        system: &impl OdeSystem<T>,
        ws: &mut MultistepWorkspace<T>,
        h: R,
        x: R,
        corrector_iterations: u32,
        ynext: &mut [T],
    ) -> Result<()>
    where
        T: Scalar<Real = R>,
    {
        linear_multistep(
            system,
            ws,
            h,
            x,
            &self.state_weights,
            &self.predictor_weights,
            0,
            ynext,
        )?;
        if corrector_iterations == 0 {
            return Ok(());
        }
        linear_multistep(
            system,
            ws,
            h,
            x,
            &self.state_weights,
            &self.corrector_weights,
            corrector_iterations,
            ynext,
        )
    }
}
