//! Condition operands for branches and compares.
//!
//! Codes follow the x86 condition encoding; double conditions add an invert
//! bit (operands swapped) and a special bit (parity must be checked too).

use std::fmt;

const DOUBLE_INVERT_BIT: i32 = 0x10;
const DOUBLE_SPECIAL_BIT: i32 = 0x20;

/// Integer relational condition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RelCond {
    Equal,
    NotEqual,
    Above,
    AboveOrEqual,
    Below,
    BelowOrEqual,
    GreaterThan,
    GreaterThanOrEqual,
    LessThan,
    LessThanOrEqual,
}

impl RelCond {
    pub fn code(self) -> i32 {
        match self {
            RelCond::Equal => 4,
            RelCond::NotEqual => 5,
            RelCond::Above => 7,
            RelCond::AboveOrEqual => 3,
            RelCond::Below => 2,
            RelCond::BelowOrEqual => 6,
            RelCond::GreaterThan => 15,
            RelCond::GreaterThanOrEqual => 13,
            RelCond::LessThan => 12,
            RelCond::LessThanOrEqual => 14,
        }
    }

    pub fn invert(self) -> RelCond {
        match self {
            RelCond::Equal => RelCond::NotEqual,
            RelCond::NotEqual => RelCond::Equal,
            RelCond::Above => RelCond::BelowOrEqual,
            RelCond::AboveOrEqual => RelCond::Below,
            RelCond::Below => RelCond::AboveOrEqual,
            RelCond::BelowOrEqual => RelCond::Above,
            RelCond::GreaterThan => RelCond::LessThanOrEqual,
            RelCond::GreaterThanOrEqual => RelCond::LessThan,
            RelCond::LessThan => RelCond::GreaterThanOrEqual,
            RelCond::LessThanOrEqual => RelCond::GreaterThan,
        }
    }
}

/// Condition on the result of an arithmetic operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResCond {
    Overflow,
    Signed,
    PositiveOrZero,
    Zero,
    NonZero,
}

impl ResCond {
    pub fn code(self) -> i32 {
        match self {
            ResCond::Overflow => 0,
            ResCond::Signed => 8,
            ResCond::PositiveOrZero => 9,
            ResCond::Zero => 4,
            ResCond::NonZero => 5,
        }
    }

    /// Overflow has no single-flag inverse.
    pub fn invert(self) -> Option<ResCond> {
        match self {
            ResCond::Overflow => None,
            ResCond::Signed => Some(ResCond::PositiveOrZero),
            ResCond::PositiveOrZero => Some(ResCond::Signed),
            ResCond::Zero => Some(ResCond::NonZero),
            ResCond::NonZero => Some(ResCond::Zero),
        }
    }
}

/// Floating point comparison, ordered or unordered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DoubleCond {
    DoubleEqual,
    DoubleNotEqual,
    DoubleGreaterThan,
    DoubleGreaterThanOrEqual,
    DoubleLessThan,
    DoubleLessThanOrEqual,
    DoubleEqualOrUnordered,
    DoubleNotEqualOrUnordered,
    DoubleGreaterThanOrUnordered,
    DoubleGreaterThanOrEqualOrUnordered,
    DoubleLessThanOrUnordered,
    DoubleLessThanOrEqualOrUnordered,
}

impl DoubleCond {
    pub fn code(self) -> i32 {
        use DoubleCond::*;
        match self {
            DoubleEqual => RelCond::Equal.code() | DOUBLE_SPECIAL_BIT,
            DoubleNotEqual => RelCond::NotEqual.code(),
            DoubleGreaterThan => RelCond::Above.code(),
            DoubleGreaterThanOrEqual => RelCond::AboveOrEqual.code(),
            DoubleLessThan => RelCond::Above.code() | DOUBLE_INVERT_BIT,
            DoubleLessThanOrEqual => RelCond::AboveOrEqual.code() | DOUBLE_INVERT_BIT,
            DoubleEqualOrUnordered => RelCond::Equal.code(),
            DoubleNotEqualOrUnordered => RelCond::NotEqual.code() | DOUBLE_SPECIAL_BIT,
            DoubleGreaterThanOrUnordered => RelCond::BelowOrEqual.code() | DOUBLE_INVERT_BIT,
            DoubleGreaterThanOrEqualOrUnordered => RelCond::Below.code() | DOUBLE_INVERT_BIT,
            DoubleLessThanOrUnordered => RelCond::Below.code(),
            DoubleLessThanOrEqualOrUnordered => RelCond::BelowOrEqual.code(),
        }
    }

    pub fn invert(self) -> DoubleCond {
        use DoubleCond::*;
        match self {
            DoubleEqual => DoubleNotEqualOrUnordered,
            DoubleNotEqual => DoubleEqualOrUnordered,
            DoubleGreaterThan => DoubleLessThanOrEqualOrUnordered,
            DoubleGreaterThanOrEqual => DoubleLessThanOrUnordered,
            DoubleLessThan => DoubleGreaterThanOrEqualOrUnordered,
            DoubleLessThanOrEqual => DoubleGreaterThanOrUnordered,
            DoubleEqualOrUnordered => DoubleNotEqual,
            DoubleNotEqualOrUnordered => DoubleEqual,
            DoubleGreaterThanOrUnordered => DoubleLessThanOrEqual,
            DoubleGreaterThanOrEqualOrUnordered => DoubleLessThan,
            DoubleLessThanOrUnordered => DoubleGreaterThanOrEqual,
            DoubleLessThanOrEqualOrUnordered => DoubleGreaterThan,
        }
    }
}

impl fmt::Display for RelCond {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

impl fmt::Display for ResCond {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

impl fmt::Display for DoubleCond {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_inversion_is_an_involution() {
        let rel = [
            RelCond::Equal,
            RelCond::Above,
            RelCond::AboveOrEqual,
            RelCond::GreaterThan,
            RelCond::LessThanOrEqual,
        ];
        for cond in rel {
            assert_eq!(cond.invert().invert(), cond);
        }
        assert_eq!(ResCond::Zero.invert(), Some(ResCond::NonZero));
        assert_eq!(ResCond::Overflow.invert(), None);
        assert_eq!(
            DoubleCond::DoubleLessThan.invert().invert(),
            DoubleCond::DoubleLessThan
        );
    }

    #[test]
    fn test_double_codes_are_distinct() {
        use DoubleCond::*;
        let all = [
            DoubleEqual,
            DoubleNotEqual,
            DoubleGreaterThan,
            DoubleGreaterThanOrEqual,
            DoubleLessThan,
            DoubleLessThanOrEqual,
            DoubleEqualOrUnordered,
            DoubleNotEqualOrUnordered,
            DoubleGreaterThanOrUnordered,
            DoubleGreaterThanOrEqualOrUnordered,
            DoubleLessThanOrUnordered,
            DoubleLessThanOrEqualOrUnordered,
        ];
        let mut codes: Vec<_> = all.iter().map(|c| c.code()).collect();
        codes.sort_unstable();
        codes.dedup();
        assert_eq!(codes.len(), all.len());
        assert_eq!(DoubleEqual.to_string(), "DoubleEqual");
    }
}
