//! Token usage accounting.
//!
//! Every [`ChatResponse`](crate::ChatResponse) carries a [`Usage`]
//! record. The tool loop sums them so a whole turn (several model calls)
//! can be reported as one figure.

use std::ops::{Add, AddAssign};

use serde::{Deserialize, Serialize};

/// Token counts for a single request/response pair.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Usage {
    /// Tokens consumed by the prompt (messages + tool declarations).
    pub input_tokens: u64,
    /// Tokens produced by the model's response.
    pub output_tokens: u64,
}

impl Usage {
    /// Input plus output tokens.
    pub fn total(&self) -> u64 {
        self.input_tokens.saturating_add(self.output_tokens)
    }
}

impl Add for Usage {
    type Output = Self;

    fn add(mut self, rhs: Self) -> Self {
        self += &rhs;
        self
    }
}

impl AddAssign for Usage {
    fn add_assign(&mut self, rhs: Self) {
        *self += &rhs;
    }
}

impl AddAssign<&Usage> for Usage {
    fn add_assign(&mut self, rhs: &Self) {
        self.input_tokens = self.input_tokens.saturating_add(rhs.input_tokens);
        self.output_tokens = self.output_tokens.saturating_add(rhs.output_tokens);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_add() {
        let a = Usage {
            input_tokens: 10,
            output_tokens: 5,
        };
        let b = Usage {
            input_tokens: 1,
            output_tokens: 2,
        };
        let sum = a + b;
        assert_eq!(sum.input_tokens, 11);
        assert_eq!(sum.output_tokens, 7);
        assert_eq!(sum.total(), 18);
    }

    #[test]
    fn test_add_assign_saturates() {
        let mut a = Usage {
            input_tokens: u64::MAX,
            output_tokens: 0,
        };
        a += &Usage {
            input_tokens: 1,
            output_tokens: 1,
        };
        assert_eq!(a.input_tokens, u64::MAX);
        assert_eq!(a.output_tokens, 1);
    }
}
