use num_complex::Complex;
use num_traits::{Float, FromPrimitive, Num};
use std::fmt::Debug;
use std::ops::Mul;

/// A trait for types that can be elements of state and derivative vectors.
/// Covers real and complex floating point with a single set of routines.
///
/// The grid itself is always real: positions, step sizes and method
/// coefficients have type `Self::Real` even when the state is complex.
pub trait Scalar:
    Num + Copy + Debug + Mul<<Self as Scalar>::Real, Output = Self> + 'static
{
    /// Real field the grid lives on.
    type Real: Float + FromPrimitive + Debug + 'static;
}

impl Scalar for f32 {
    type Real = f32;
}

impl Scalar for f64 {
    type Real = f64;
}

impl<T: Float + FromPrimitive + Debug + 'static> Scalar for Complex<T> {
    type Real = T;
}

/// An ODE system y' = f(x, y) presented to the integrators.
///
/// Implementors carry their own parameters as fields; the engine never
/// inspects them, it only forwards the grid point and the buffers.
pub trait OdeSystem<T: Scalar> {
    /// Returns the number of coupled equations.
    fn dimension(&self) -> usize;

    /// Evaluates the derivatives at grid point `x`.
    /// y: function values at `x`
    /// dydx: buffer of the same length to write y' into
    fn derivative(&self, x: T::Real, y: &[T], dydx: &mut [T]);
}

/// A trait for self-starting methods that advance one state vector by one
/// grid step using only the current step's information.
pub trait SingleStep<T: Scalar> {
    /// Writes the state at `x + h` into `ynext`, given the state `y` at `x`.
    ///
    /// Both slices must have the dimension the stepper was created with.
    /// `y` cannot alias `ynext` or any internal stage buffer; the borrow
    /// rules enforce this.
    fn step(
        &mut self,
        system: &impl OdeSystem<T>,
        h: T::Real,
        x: T::Real,
        y: &[T],
        ynext: &mut [T],
    );
}
