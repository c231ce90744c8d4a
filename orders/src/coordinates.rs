//! Delivery address of an order, as a point in town. The shop sits at the origin.
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Default, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct Coordinates {
    x: i32,
    y: i32,
}

impl Coordinates {
    /// Creates a new delivery address
    /// # Arguments
    /// * `x` - horizontal position relative to the shop
    /// * `y` - vertical position relative to the shop
    pub fn new(x: i32, y: i32) -> Coordinates {
        Coordinates { x, y }
    }

    /// Picks a random address inside a town of `town_size_x` by `town_size_y`.
    /// Sizes below one are treated as one, so the address is always valid.
    pub fn random_within<R: Rng + ?Sized>(rng: &mut R, town_size_x: i32, town_size_y: i32) -> Coordinates {
        Coordinates {
            x: rng.gen_range(0..town_size_x.max(1)),
            y: rng.gen_range(0..town_size_y.max(1)),
        }
    }

    pub fn x(&self) -> i32 {
        self.x
    }

    pub fn y(&self) -> i32 {
        self.y
    }

    /// Euclidean distance from the shop to this address
    pub fn distance_from_shop(&self) -> f64 {
        let x = f64::from(self.x);
        let y = f64::from(self.y);
        x.hypot(y)
    }
}

impl fmt::Display for Coordinates {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_distance_from_shop() {
        assert_eq!(Coordinates::new(0, 0).distance_from_shop(), 0.0);
        assert!((Coordinates::new(3, 4).distance_from_shop() - 5.0).abs() < 1e-9);
        assert!((Coordinates::new(-6, 8).distance_from_shop() - 10.0).abs() < 1e-9);
    }

    #[test]
    fn test_distance_does_not_overflow() {
        let far = Coordinates::new(i32::MAX, i32::MAX);
        assert!(far.distance_from_shop() > f64::from(i32::MAX));
    }

    #[test]
    fn test_random_address_stays_in_town() {
        let mut rng = rand::thread_rng();
        for _ in 0..100 {
            let address = Coordinates::random_within(&mut rng, 10, 3);
            assert!((0..10).contains(&address.x()));
            assert!((0..3).contains(&address.y()));
        }
        assert_eq!(Coordinates::random_within(&mut rng, 0, 0), Coordinates::new(0, 0));
    }

    #[test]
    fn test_display() {
        assert_eq!(Coordinates::new(3, -4).to_string(), "(3, -4)");
    }
}
