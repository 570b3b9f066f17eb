//! RNG module - deterministic ball generation for a level board
//!
//! Generates the set of number and operator balls a level is populated
//! with. Operators are drawn bag-style: the allowed set is shuffled, drawn
//! until empty, then reshuffled, so every allowed operator keeps appearing
//! regularly instead of streaking.
//!
//! Uses a simple LCG so the same seed always produces the same board.

use crate::level::LevelConfig;
use crate::types::Operator;

/// Simple LCG (Linear Congruential Generator) RNG
/// Uses constants from Numerical Recipes
#[derive(Debug, Clone)]
pub struct SimpleRng {
    state: u32,
}

impl SimpleRng {
    /// Create a new RNG with the given seed
    pub fn new(seed: u32) -> Self {
        // Avoid 0 seed which would produce all zeros
        let state = if seed == 0 { 1 } else { seed };
        Self { state }
    }

    /// Generate next random u32
    pub fn next_u32(&mut self) -> u32 {
        self.state = self.state.wrapping_mul(1664525).wrapping_add(1013904223);
        self.state
    }

    /// Generate random value in range [0, max)
    pub fn next_range(&mut self, max: u32) -> u32 {
        self.next_u32() % max
    }

    /// Shuffle a slice using Fisher-Yates
    pub fn shuffle<T>(&mut self, slice: &mut [T]) {
        for i in (1..slice.len()).rev() {
            let j = self.next_range((i + 1) as u32) as usize;
            slice.swap(i, j);
        }
    }
}

/// Bag-style operator generator over a level's allowed operators.
#[derive(Debug, Clone)]
pub struct OperatorBag {
    bag: Vec<Operator>,
    bag_index: usize,
    rng: SimpleRng,
}

impl OperatorBag {
    /// Create a bag over the given operators; falls back to addition if the
    /// allowed set is empty.
    pub fn new(allowed: &[Operator], seed: u32) -> Self {
        let bag = if allowed.is_empty() {
            vec![Operator::Add]
        } else {
            allowed.to_vec()
        };
        let mut out = Self {
            bag,
            bag_index: 0,
            rng: SimpleRng::new(seed),
        };
        out.refill();
        out
    }

    fn refill(&mut self) {
        self.rng.shuffle(&mut self.bag);
        self.bag_index = 0;
    }

    /// Draw the next operator, reshuffling when the bag empties.
    pub fn draw(&mut self) -> Operator {
        if self.bag_index >= self.bag.len() {
            self.refill();
        }
        let op = self.bag[self.bag_index];
        self.bag_index += 1;
        op
    }
}

/// The generated ball population for one level board.
#[derive(Debug, Clone, PartialEq)]
pub struct BallDeck {
    pub numbers: Vec<i32>,
    pub operators: Vec<Operator>,
}

impl BallDeck {
    /// Generate the deck for a level, deterministically by seed.
    pub fn generate(config: &LevelConfig, seed: u32) -> Self {
        let mut rng = SimpleRng::new(seed);

        let lo = config.min_number_value.min(config.max_number_value);
        let hi = config.min_number_value.max(config.max_number_value);
        let span = (hi - lo + 1) as u32;

        let numbers = (0..config.number_ball_count)
            .map(|_| lo + rng.next_range(span) as i32)
            .collect();

        // Separate stream so number count changes don't reorder operators.
        let mut bag = OperatorBag::new(&config.allowed_operators, seed.wrapping_add(1));
        let operators = (0..config.operator_ball_count).map(|_| bag.draw()).collect();

        Self { numbers, operators }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rng_deterministic() {
        let mut a = SimpleRng::new(42);
        let mut b = SimpleRng::new(42);
        for _ in 0..100 {
            assert_eq!(a.next_u32(), b.next_u32());
        }
    }

    #[test]
    fn test_rng_zero_seed_guard() {
        let mut rng = SimpleRng::new(0);
        assert_ne!(rng.next_u32(), 0);
    }

    #[test]
    fn test_next_range_bounds() {
        let mut rng = SimpleRng::new(7);
        for _ in 0..1000 {
            assert!(rng.next_range(9) < 9);
        }
    }

    #[test]
    fn test_shuffle_preserves_elements() {
        let mut rng = SimpleRng::new(9);
        let mut values = vec![1, 2, 3, 4, 5];
        rng.shuffle(&mut values);
        values.sort_unstable();
        assert_eq!(values, vec![1, 2, 3, 4, 5]);
    }

    #[test]
    fn test_operator_bag_cycles_all_allowed() {
        let allowed = [Operator::Add, Operator::Sub, Operator::Mul];
        let mut bag = OperatorBag::new(&allowed, 5);

        // Every full bag contains each allowed operator exactly once.
        let mut first: Vec<Operator> = (0..3).map(|_| bag.draw()).collect();
        first.sort_by_key(|op| op.as_str());
        let mut expected = allowed.to_vec();
        expected.sort_by_key(|op| op.as_str());
        assert_eq!(first, expected);
    }

    #[test]
    fn test_operator_bag_empty_allowed_falls_back() {
        let mut bag = OperatorBag::new(&[], 5);
        assert_eq!(bag.draw(), Operator::Add);
    }

    #[test]
    fn test_deck_deterministic_by_seed() {
        let config = LevelConfig::default();
        let a = BallDeck::generate(&config, 12345);
        let b = BallDeck::generate(&config, 12345);
        assert_eq!(a, b);

        let c = BallDeck::generate(&config, 54321);
        assert_ne!(a, c);
    }

    #[test]
    fn test_deck_respects_config() {
        let config = LevelConfig {
            number_ball_count: 20,
            operator_ball_count: 7,
            min_number_value: 2,
            max_number_value: 6,
            allowed_operators: vec![Operator::Add, Operator::Mul],
            ..LevelConfig::default()
        };
        let deck = BallDeck::generate(&config, 1);

        assert_eq!(deck.numbers.len(), 20);
        assert_eq!(deck.operators.len(), 7);
        assert!(deck.numbers.iter().all(|&n| (2..=6).contains(&n)));
        assert!(deck
            .operators
            .iter()
            .all(|op| matches!(op, Operator::Add | Operator::Mul)));
    }
}
