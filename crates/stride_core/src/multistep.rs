use crate::traits::{OdeSystem, Scalar, SingleStep};
use anyhow::{bail, Result};
use num_traits::FromPrimitive;

/// Sliding-window storage for linear multistep methods.
///
/// Holds the last `order` accepted states and their derivatives as
/// concatenated chunks ordered newest first: chunk `j` is the pair at
/// `x_current - j*h`. The derivative array carries one extra chunk,
/// reserved for the corrector's in-progress derivative at the unknown
/// point. Buffers are allocated once here and reused by every step call.
pub struct MultistepWorkspace<T: Scalar> {
    order: usize,
    dim: usize,
    prev_y: Vec<T>,
    prev_dy: Vec<T>,
}

impl<T: Scalar> MultistepWorkspace<T> {
    /// Allocates storage for an `order`-step method on `dim` equations.
    ///
    /// All chunks start zeroed; fill the window with
    /// [`bootstrap`](Self::bootstrap) before the first multistep call.
    pub fn new(order: usize, dim: usize) -> Self {
        assert!(order >= 1, "multistep order must be positive");
        assert!(dim >= 1, "system dimension must be positive");
        Self {
            order,
            dim,
            prev_y: vec![T::zero(); order * dim],
            prev_dy: vec![T::zero(); (order + 1) * dim],
        }
    }

    /// Number of previous steps the window holds.
    pub fn order(&self) -> usize {
        self.order
    }

    /// Number of equations in the system.
    pub fn dimension(&self) -> usize {
        self.dim
    }

    /// State recorded `age` steps behind the current grid point (0 = newest).
    pub fn state_chunk(&self, age: usize) -> &[T] {
        assert!(age < self.order, "chunk {age} outside order-{} window", self.order);
        &self.prev_y[age * self.dim..(age + 1) * self.dim]
    }

    /// Derivative recorded `age` steps behind the current grid point.
    pub fn deriv_chunk(&self, age: usize) -> &[T] {
        assert!(age < self.order, "chunk {age} outside order-{} window", self.order);
        &self.prev_dy[age * self.dim..(age + 1) * self.dim]
    }

    /// Seeds the window from a single initial condition at `x0`.
    ///
    /// Multistep methods cannot self-start: chunk `order - 1` receives
    /// `y0` and its derivative, and each younger chunk is produced by one
    /// `stepper` application, so that after return chunk 0 holds the state
    /// at `x0 + (order - 1) * h` and the window ordering invariant holds.
    pub fn bootstrap(
        &mut self,
        system: &impl OdeSystem<T>,
        stepper: &mut impl SingleStep<T>,
        h: T::Real,
        x0: T::Real,
        y0: &[T],
    ) -> Result<()> {
        let (m, n) = (self.order, self.dim);
        if system.dimension() != n {
            bail!(
                "System has {} equations but the workspace dimension is {}.",
                system.dimension(),
                n
            );
        }
        if y0.len() != n {
            bail!(
                "Initial state has {} elements but the workspace dimension is {}.",
                y0.len(),
                n
            );
        }

        let oldest = (m - 1) * n;
        self.prev_y[oldest..oldest + n].copy_from_slice(y0);
        system.derivative(x0, y0, &mut self.prev_dy[oldest..oldest + n]);

        let mut ywork = y0.to_vec();
        for i in 1..m {
            let chunk = (m - 1 - i) * n;
            let x = x0 + <T::Real>::from_usize(i - 1).unwrap() * h;
            stepper.step(system, h, x, &ywork, &mut self.prev_y[chunk..chunk + n]);
            ywork.copy_from_slice(&self.prev_y[chunk..chunk + n]);
            let xnext = x0 + <T::Real>::from_usize(i).unwrap() * h;
            system.derivative(xnext, &ywork, &mut self.prev_dy[chunk..chunk + n]);
        }
        Ok(())
    }

    /// Commits an accepted solution and slides the window one step.
    ///
    /// Every chunk moves one slot older, `ynext` is written into state
    /// chunk 0 and its derivative is evaluated at `xnext` into derivative
    /// chunk 0, in that order. This is the only operation that moves the
    /// window's "current x"; call it exactly once per accepted step, in
    /// increasing-x order. A second call for the same step duplicates
    /// history and breaks the window invariant.
    pub fn advance(
        &mut self,
        system: &impl OdeSystem<T>,
        xnext: T::Real,
        ynext: &[T],
    ) -> Result<()> {
        let (m, n) = (self.order, self.dim);
        if system.dimension() != n {
            bail!(
                "System has {} equations but the workspace dimension is {}.",
                system.dimension(),
                n
            );
        }
        if ynext.len() != n {
            bail!(
                "Accepted state has {} elements but the workspace dimension is {}.",
                ynext.len(),
                n
            );
        }

        for j in (1..m).rev() {
            self.prev_y.copy_within((j - 1) * n..j * n, j * n);
            self.prev_dy.copy_within((j - 1) * n..j * n, j * n);
        }
        self.prev_y[..n].copy_from_slice(ynext);
        system.derivative(xnext, ynext, &mut self.prev_dy[..n]);
        Ok(())
    }
}

/// Solves one step of the general linear multistep formula
///
/// `y_j+1 + a[1]*y_j + ... + a[m]*y_j+1-m =
///         h * (b[0]*y'_j+1 + b[1]*y'_j + ... + b[m]*y'_j+1-m)`
///
/// against the workspace window, writing the unknown `y_j+1` into `ynext`.
/// The formula is normalized so the unknown's weight is 1; `a[0]` is
/// ignored. Both coefficient slices need `order + 1` entries.
///
/// With `iterations == 0` the explicit scheme runs and `b[0]` is also
/// ignored. With `iterations > 0`, `ynext` must enter holding a predictor
/// value; each pass evaluates the derivative at `(x + h, ynext)` into the
/// reserved chunk and rewrites `ynext` in place. The passes are plain
/// fixed-point iteration: all of them run, convergence is not monitored
/// and remains the caller's responsibility via the iteration count.
///
/// The window itself is left untouched; commit an accepted result with
/// [`MultistepWorkspace::advance`].
pub fn linear_multistep<T: Scalar>(
    system: &impl OdeSystem<T>,
    ws: &mut MultistepWorkspace<T>,
    h: T::Real,
    x: T::Real,
    a: &[T::Real],
    b: &[T::Real],
    iterations: u32,
    ynext: &mut [T],
) -> Result<()> {
    let (m, n) = (ws.order, ws.dim);
    if a.len() != m + 1 || b.len() != m + 1 {
        bail!(
            "Coefficient vectors need {} entries for an order-{} window, got {} and {}.",
            m + 1,
            m,
            a.len(),
            b.len()
        );
    }
    if system.dimension() != n {
        bail!(
            "System has {} equations but the workspace dimension is {}.",
            system.dimension(),
            n
        );
    }
    if ynext.len() != n {
        bail!(
            "Output buffer has {} elements but the workspace dimension is {}.",
            ynext.len(),
            n
        );
    }

    if iterations == 0 {
        for i in 0..n {
            let mut acc = T::zero();
            for j in 1..=m {
                let c = (j - 1) * n + i;
                acc = acc + ws.prev_dy[c] * (h * b[j]) - ws.prev_y[c] * a[j];
            }
            ynext[i] = acc;
        }
        return Ok(());
    }

    // Implicit scheme used as corrector; `ynext` provides the prediction.
    let (hist, fresh) = ws.prev_dy.split_at_mut(m * n);
    for _ in 0..iterations {
        system.derivative(x + h, ynext, fresh);
        for i in 0..n {
            let mut acc = fresh[i] * (h * b[0]);
            for j in 1..=m {
                let c = (j - 1) * n + i;
                acc = acc + hist[c] * (h * b[j]) - ws.prev_y[c] * a[j];
            }
            ynext[i] = acc;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::{linear_multistep, MultistepWorkspace};
    use crate::solvers::RK4;
    use crate::traits::{OdeSystem, SingleStep};

    /// y' = y^2, y(0) = 1; exact solution 1 / (1 - x). Quinney's example
    /// equation for predictor-corrector iteration.
    struct Riccati;

    impl OdeSystem<f64> for Riccati {
        fn dimension(&self) -> usize {
            1
        }

        fn derivative(&self, _x: f64, y: &[f64], dydx: &mut [f64]) {
            dydx[0] = y[0] * y[0];
        }
    }

    struct Coupled;

    impl OdeSystem<f64> for Coupled {
        fn dimension(&self) -> usize {
            2
        }

        fn derivative(&self, _x: f64, y: &[f64], dydx: &mut [f64]) {
            dydx[0] = y[1];
            dydx[1] = -y[0];
        }
    }

    fn assert_err_contains<T: std::fmt::Debug>(result: anyhow::Result<T>, needle: &str) {
        let err = result.expect_err("expected error");
        let message = format!("{err}");
        assert!(
            message.contains(needle),
            "expected error to contain \"{needle}\", got \"{message}\""
        );
    }

    /// Seeds a 2-step window for `Riccati` with the exact values at x = 0
    /// and x = h, the setup of Quinney's example 2.8.2.
    fn quinney_window(h: f64) -> MultistepWorkspace<f64> {
        let mut ws = MultistepWorkspace::new(2, 1);
        let y0 = 1.0;
        let y1 = 1.0 / (1.0 - h);
        ws.prev_y[1] = y0;
        ws.prev_y[0] = y1;
        ws.prev_dy[1] = y0 * y0;
        ws.prev_dy[0] = y1 * y1;
        ws
    }

    #[test]
    fn advance_is_shift_plus_insert() {
        let mut ws = MultistepWorkspace::new(3, 2);
        let mut rk4 = RK4::new(2);
        ws.bootstrap(&Coupled, &mut rk4, 0.1, 0.0, &[1.0, 0.0])
            .expect("bootstrap should succeed");

        let before_y: Vec<Vec<f64>> = (0..3).map(|j| ws.state_chunk(j).to_vec()).collect();
        let before_dy: Vec<Vec<f64>> = (0..3).map(|j| ws.deriv_chunk(j).to_vec()).collect();

        let accepted = [7.0, 8.0];
        ws.advance(&Coupled, 0.3, &accepted)
            .expect("advance should succeed");

        for j in 1..3 {
            assert_eq!(ws.state_chunk(j), &before_y[j - 1][..]);
            assert_eq!(ws.deriv_chunk(j), &before_dy[j - 1][..]);
        }
        assert_eq!(ws.state_chunk(0), &accepted[..]);
        assert_eq!(ws.deriv_chunk(0), &[8.0, -7.0][..]);
    }

    #[test]
    fn bootstrap_reproduces_single_step_sequence() {
        let h = 0.05;
        let mut ws = MultistepWorkspace::new(4, 2);
        let mut rk4 = RK4::new(2);
        ws.bootstrap(&Coupled, &mut rk4, h, 0.0, &[1.0, 0.0])
            .expect("bootstrap should succeed");

        // Chunk m-1-i must equal exactly i applications of the stepper.
        let mut rk4 = RK4::new(2);
        let mut y = vec![1.0, 0.0];
        let mut ynext = vec![0.0; 2];
        for i in 0..4 {
            assert_eq!(ws.state_chunk(3 - i), &y[..], "chunk for step {i}");
            rk4.step(&Coupled, h, i as f64 * h, &y, &mut ynext);
            y.copy_from_slice(&ynext);
        }
    }

    #[test]
    fn explicit_call_matches_single_corrector_pass_when_b0_is_zero() {
        let h = 0.1;
        let a = [1.0, -1.0, 0.0];
        let b = [0.0, 1.5, -0.5];

        let mut ws = quinney_window(h);
        let mut predicted = [0.0];
        linear_multistep(&Riccati, &mut ws, h, h, &a, &b, 0, &mut predicted)
            .expect("explicit step should succeed");

        // With b[0] = 0 the corrector pass recomputes the same sum.
        let mut corrected = predicted;
        linear_multistep(&Riccati, &mut ws, h, h, &a, &b, 1, &mut corrected)
            .expect("implicit step should succeed");
        assert_eq!(predicted, corrected);
    }

    #[test]
    fn quinney_predictor_value() {
        let h = 0.1;
        let mut ws = quinney_window(h);
        let mut ynext = [0.0];
        linear_multistep(
            &Riccati,
            &mut ws,
            h,
            h,
            &[1.0, -1.0, 0.0],
            &[0.0, 1.5, -0.5],
            0,
            &mut ynext,
        )
        .expect("predictor should succeed");
        // Quinney example 2.8.1 at x = 0.2.
        assert!((ynext[0] - 1.24629630).abs() < 1e-8, "got {}", ynext[0]);
    }

    #[test]
    fn corrector_iteration_converges_to_trapezoidal_fixed_point() {
        let h = 0.1;
        let mut ws = quinney_window(h);
        let mut ynext = [0.0];
        linear_multistep(
            &Riccati,
            &mut ws,
            h,
            h,
            &[1.0, -1.0, 0.0],
            &[0.0, 1.5, -0.5],
            0,
            &mut ynext,
        )
        .expect("predictor should succeed");

        linear_multistep(
            &Riccati,
            &mut ws,
            h,
            h,
            &[1.0, -1.0, 0.0],
            &[0.5, 0.5, 0.0],
            10,
            &mut ynext,
        )
        .expect("corrector should succeed");

        // The corrector solves y = y1 + h/2 * (y1^2 + y^2); take the root
        // of the quadratic that continues the solution branch.
        let y1: f64 = 1.0 / (1.0 - h);
        let c = y1 + 0.5 * h * y1 * y1;
        let fixed_point = (1.0 - (1.0 - 2.0 * h * c).sqrt()) / h;
        assert!(
            (ynext[0] - fixed_point).abs() < 1e-8,
            "got {}, fixed point {fixed_point}",
            ynext[0]
        );
    }

    #[test]
    fn corrector_is_idempotent_at_the_fixed_point() {
        let h = 0.1;
        let mut ws = quinney_window(h);
        let mut ynext = [0.0];
        let a = [1.0, -1.0, 0.0];
        let b = [0.5, 0.5, 0.0];
        linear_multistep(&Riccati, &mut ws, h, h, &a, &[0.0, 1.5, -0.5], 0, &mut ynext)
            .expect("predictor should succeed");
        linear_multistep(&Riccati, &mut ws, h, h, &a, &b, 30, &mut ynext)
            .expect("corrector should succeed");

        let converged = ynext[0];
        linear_multistep(&Riccati, &mut ws, h, h, &a, &b, 10, &mut ynext)
            .expect("corrector should succeed");
        assert!(
            (ynext[0] - converged).abs() < 1e-13,
            "fixed point drifted by {}",
            (ynext[0] - converged).abs()
        );
    }

    #[test]
    fn rejects_mismatched_buffers() {
        let mut ws = MultistepWorkspace::new(2, 1);
        let mut ynext = [0.0];
        assert_err_contains(
            linear_multistep(
                &Riccati,
                &mut ws,
                0.1,
                0.0,
                &[1.0, -1.0],
                &[0.0, 1.5, -0.5],
                0,
                &mut ynext,
            ),
            "Coefficient vectors",
        );

        let mut long = [0.0, 0.0];
        assert_err_contains(
            linear_multistep(
                &Riccati,
                &mut ws,
                0.1,
                0.0,
                &[1.0, -1.0, 0.0],
                &[0.0, 1.5, -0.5],
                0,
                &mut long,
            ),
            "Output buffer",
        );

        let mut rk4 = RK4::new(2);
        assert_err_contains(
            ws.bootstrap(&Coupled, &mut rk4, 0.1, 0.0, &[1.0, 0.0]),
            "workspace dimension",
        );
        assert_err_contains(ws.advance(&Riccati, 0.1, &[1.0, 2.0]), "workspace dimension");
    }
}
