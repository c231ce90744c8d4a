//! Busy work standing in for preparing and cooking an order.
use std::hint::black_box;
use std::thread;
use std::time::Duration;

use rand::Rng;

use crate::config::WorkModel;

#[derive(Debug, Clone, Copy, Default, PartialEq)]
struct Complex {
    re: f64,
    im: f64,
}

impl Complex {
    fn conj(self) -> Complex {
        Complex { re: self.re, im: -self.im }
    }

    fn mul_add(self, a: Complex, b: Complex) -> Complex {
        Complex {
            re: self.re + a.re * b.re - a.im * b.im,
            im: self.im + a.re * b.im + a.im * b.re,
        }
    }
}

fn random_matrix(rows: usize, cols: usize) -> Vec<Vec<Complex>> {
    let mut rng = rand::thread_rng();
    (0..rows)
        .map(|_| {
            (0..cols)
                .map(|_| Complex {
                    re: rng.gen_range(-1.0..1.0),
                    im: rng.gen_range(-1.0..1.0),
                })
                .collect()
        })
        .collect()
}

/// `m * m^H` for a `rows x cols` matrix
fn gram(matrix: &[Vec<Complex>]) -> Vec<Vec<Complex>> {
    matrix
        .iter()
        .map(|row| {
            matrix
                .iter()
                .map(|other| {
                    row.iter()
                        .zip(other)
                        .fold(Complex::default(), |acc, (a, b)| acc.mul_add(*a, b.conj()))
                })
                .collect()
        })
        .collect()
}

fn busy((rows, cols): (usize, usize), delay: Duration, jitter: Duration) {
    black_box(gram(&random_matrix(rows, cols)));
    let jitter_micros = u64::try_from(jitter.as_micros()).unwrap_or(u64::MAX);
    let extra = if jitter_micros == 0 {
        Duration::ZERO
    } else {
        Duration::from_micros(rand::thread_rng().gen_range(0..=jitter_micros))
    };
    let pause = delay + extra;
    if !pause.is_zero() {
        thread::sleep(pause);
    }
}

pub fn prepare(work: &WorkModel) {
    busy(work.preparation_matrix, work.preparation_delay, work.jitter);
}

pub fn cook(work: &WorkModel) {
    busy(work.cooking_matrix, work.cooking_delay, work.jitter);
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Instant;

    #[test]
    fn test_gram_matrix_diagonal_is_real_and_positive() {
        let matrix = random_matrix(4, 6);
        let product = gram(&matrix);
        assert_eq!(product.len(), 4);
        for (i, row) in product.iter().enumerate() {
            assert_eq!(row.len(), 4);
            assert!(row[i].re > 0.0);
            assert!(row[i].im.abs() < 1e-9);
        }
    }

    #[test]
    fn test_delay_is_respected() {
        let work = WorkModel {
            preparation_matrix: (2, 2),
            preparation_delay: Duration::from_millis(20),
            jitter: Duration::from_millis(5),
            ..WorkModel::default()
        };
        let start = Instant::now();
        prepare(&work);
        assert!(start.elapsed() >= Duration::from_millis(20));
    }
}
