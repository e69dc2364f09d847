use crate::traits::{OdeSystem, Scalar, SingleStep};
use num_traits::FromPrimitive;

/// 2nd order Runge-Kutta (Heun) solver
pub struct RK2<T: Scalar> {
    k1: Vec<T>,
    k2: Vec<T>,
    karg: Vec<T>,
}

impl<T: Scalar> RK2<T> {
    pub fn new(dim: usize) -> Self {
        Self {
            k1: vec![T::zero(); dim],
            k2: vec![T::zero(); dim],
            karg: vec![T::zero(); dim],
        }
    }
}

impl<T: Scalar> SingleStep<T> for RK2<T> {
    fn step(
        &mut self,
        system: &impl OdeSystem<T>,
        h: T::Real,
        x: T::Real,
        y: &[T],
        ynext: &mut [T],
    ) {
        debug_assert_eq!(y.len(), self.k1.len());
        debug_assert_eq!(ynext.len(), self.k1.len());
        let half = <T::Real>::from_f64(0.5).unwrap();

        // k1 = f(x, y)
        system.derivative(x, y, &mut self.k1);

        // k2 = f(x + h, y + h*k1)
        for i in 0..y.len() {
            self.karg[i] = y[i] + self.k1[i] * h;
        }
        system.derivative(x + h, &self.karg, &mut self.k2);

        // y_next = y + h/2 * (k1 + k2)
        for i in 0..y.len() {
            ynext[i] = y[i] + (self.k1[i] + self.k2[i]) * (half * h);
        }
    }
}

/// Classic Runge-Kutta 4th Order Solver
pub struct RK4<T: Scalar> {
    k1: Vec<T>,
    k2: Vec<T>,
    k3: Vec<T>,
    k4: Vec<T>,
    karg: Vec<T>,
}

impl<T: Scalar> RK4<T> {
    pub fn new(dim: usize) -> Self {
        Self {
            k1: vec![T::zero(); dim],
            k2: vec![T::zero(); dim],
            k3: vec![T::zero(); dim],
            k4: vec![T::zero(); dim],
            karg: vec![T::zero(); dim],
        }
    }
}

impl<T: Scalar> SingleStep<T> for RK4<T> {
    fn step(
        &mut self,
        system: &impl OdeSystem<T>,
        h: T::Real,
        x: T::Real,
        y: &[T],
        ynext: &mut [T],
    ) {
        debug_assert_eq!(y.len(), self.k1.len());
        debug_assert_eq!(ynext.len(), self.k1.len());
        let half = <T::Real>::from_f64(0.5).unwrap();
        let sixth = <T::Real>::from_f64(1.0 / 6.0).unwrap();
        let two = <T::Real>::from_f64(2.0).unwrap();

        // k1 = f(x, y)
        system.derivative(x, y, &mut self.k1);

        // k2 = f(x + h/2, y + h*k1/2)
        for i in 0..y.len() {
            self.karg[i] = y[i] + self.k1[i] * (half * h);
        }
        system.derivative(x + half * h, &self.karg, &mut self.k2);

        // k3 = f(x + h/2, y + h*k2/2)
        for i in 0..y.len() {
            self.karg[i] = y[i] + self.k2[i] * (half * h);
        }
        system.derivative(x + half * h, &self.karg, &mut self.k3);

        // k4 = f(x + h, y + h*k3)
        for i in 0..y.len() {
            self.karg[i] = y[i] + self.k3[i] * h;
        }
        system.derivative(x + h, &self.karg, &mut self.k4);

        // y_next = y + h/6 * (k1 + 2k2 + 2k3 + k4)
        for i in 0..y.len() {
            ynext[i] = y[i]
                + (self.k1[i] + self.k2[i] * two + self.k3[i] * two + self.k4[i]) * (h * sixth);
        }
    }
}

/// 5th order Runge-Kutta solver, the classical 6-stage scheme of
/// Butcher's table 236a. Also the bootstrap driver of choice for
/// 6th order multistep windows.
pub struct RK5<T: Scalar> {
    k1: Vec<T>,
    k2: Vec<T>,
    k3: Vec<T>,
    k4: Vec<T>,
    k5: Vec<T>,
    k6: Vec<T>,
    karg: Vec<T>,
}

impl<T: Scalar> RK5<T> {
    pub fn new(dim: usize) -> Self {
        let z = T::zero();
        Self {
            k1: vec![z; dim],
            k2: vec![z; dim],
            k3: vec![z; dim],
            k4: vec![z; dim],
            k5: vec![z; dim],
            k6: vec![z; dim],
            karg: vec![z; dim],
        }
    }
}

impl<T: Scalar> SingleStep<T> for RK5<T> {
    fn step(
        &mut self,
        system: &impl OdeSystem<T>,
        h: T::Real,
        x: T::Real,
        y: &[T],
        ynext: &mut [T],
    ) {
        debug_assert_eq!(y.len(), self.k1.len());
        debug_assert_eq!(ynext.len(), self.k1.len());

        let quarter = <T::Real>::from_f64(0.25).unwrap();
        let eighth = <T::Real>::from_f64(0.125).unwrap();
        let half = <T::Real>::from_f64(0.5).unwrap();
        let threequarters = <T::Real>::from_f64(0.75).unwrap();
        let sixteenth = <T::Real>::from_f64(1.0 / 16.0).unwrap();
        let seventh = <T::Real>::from_f64(1.0 / 7.0).unwrap();
        let ninetieth = <T::Real>::from_f64(1.0 / 90.0).unwrap();

        let w3 = <T::Real>::from_f64(3.0).unwrap();
        let w6 = <T::Real>::from_f64(6.0).unwrap();
        let w7 = <T::Real>::from_f64(7.0).unwrap();
        let w8 = <T::Real>::from_f64(8.0).unwrap();
        let w9 = <T::Real>::from_f64(9.0).unwrap();
        let w12 = <T::Real>::from_f64(12.0).unwrap();
        let w32 = <T::Real>::from_f64(32.0).unwrap();

        // k1 = f(x, y)
        system.derivative(x, y, &mut self.k1);

        // k2 = f(x + h/4, y + h/4 * k1)
        for i in 0..y.len() {
            self.karg[i] = y[i] + self.k1[i] * (quarter * h);
        }
        system.derivative(x + quarter * h, &self.karg, &mut self.k2);

        // k3 = f(x + h/4, y + h/8 * (k1 + k2))
        for i in 0..y.len() {
            self.karg[i] = y[i] + (self.k1[i] + self.k2[i]) * (eighth * h);
        }
        system.derivative(x + quarter * h, &self.karg, &mut self.k3);

        // k4 = f(x + h/2, y + h/2 * k3)
        for i in 0..y.len() {
            self.karg[i] = y[i] + self.k3[i] * (half * h);
        }
        system.derivative(x + half * h, &self.karg, &mut self.k4);

        // k5 = f(x + 3h/4, y + h/16 * (3k1 - 6k2 + 6k3 + 9k4))
        for i in 0..y.len() {
            self.karg[i] = y[i]
                + (self.k1[i] * w3 - self.k2[i] * w6 + self.k3[i] * w6 + self.k4[i] * w9)
                    * (sixteenth * h);
        }
        system.derivative(x + threequarters * h, &self.karg, &mut self.k5);

        // k6 = f(x + h, y + h/7 * (-3k1 + 8k2 + 6k3 - 12k4 + 8k5))
        for i in 0..y.len() {
            self.karg[i] = y[i]
                + (self.k2[i] * w8 + self.k3[i] * w6 + self.k5[i] * w8
                    - self.k1[i] * w3
                    - self.k4[i] * w12)
                    * (seventh * h);
        }
        system.derivative(x + h, &self.karg, &mut self.k6);

        // y_next = y + h/90 * (7k1 + 32k3 + 12k4 + 32k5 + 7k6)
        for i in 0..y.len() {
            ynext[i] = y[i]
                + (self.k1[i] * w7
                    + self.k3[i] * w32
                    + self.k4[i] * w12
                    + self.k5[i] * w32
                    + self.k6[i] * w7)
                    * (ninetieth * h);
        }
    }
}
