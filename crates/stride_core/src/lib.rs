pub mod adams;
pub mod multistep;
pub mod solvers;
/// The `stride_core` crate provides the fixed-step integration engine for
/// Stride. It advances systems of first-order ODEs y' = f(x, y) one grid
/// step at a time; callers own the state and the workspaces, so repeated
/// steps allocate nothing.
///
/// Key components:
/// - **Traits**: `Scalar` (real/complex element abstraction), `OdeSystem`
///   (derivative contract), `SingleStep` (self-starting steppers).
/// - **Solvers**: fixed-step Runge-Kutta integrators (RK2, RK4, RK5).
/// - **Multistep**: the generic linear multistep engine, its sliding
///   history window, and the single-step bootstrap that seeds it.
/// - **Adams**: ready-made Adams-Bashforth-Moulton predictor-corrector
///   pairs of orders 4 and 6.
pub mod traits;
