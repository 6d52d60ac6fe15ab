//! Operand classes, access widths and value types.
//!
//! Every operand occurrence is annotated with a [`Bank`] (which register file
//! it lives in) and a [`Width`] (how many bits the instruction touches, which
//! may be narrower than the storage behind the operand).

use std::fmt;

use super::error::{AirError, AirResult};

/// Operand class: general purpose or floating point.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Bank {
    Gp,
    Fp,
}

impl Bank {
    pub const ALL: [Bank; 2] = [Bank::Gp, Bank::Fp];

    pub fn is_gp(self) -> bool {
        self == Bank::Gp
    }

    pub fn is_fp(self) -> bool {
        self == Bank::Fp
    }
}

impl fmt::Display for Bank {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Bank::Gp => f.write_str("GP"),
            Bank::Fp => f.write_str("FP"),
        }
    }
}

/// Number of bits an instruction reads or writes through an operand.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Width {
    W8,
    W16,
    W32,
    W64,
}

impl Width {
    /// Pointer width of the target.
    pub const PTR: Width = Width::W64;

    pub fn bits(self) -> u32 {
        match self {
            Width::W8 => 8,
            Width::W16 => 16,
            Width::W32 => 32,
            Width::W64 => 64,
        }
    }

    /// Bytes actually touched by an access of this width.
    pub fn bytes(self) -> u32 {
        self.bits() / 8
    }

    /// Smallest width covering `bytes` bytes.
    pub fn for_bytes(bytes: u32) -> AirResult<Width> {
        match bytes {
            0 | 1 => Ok(Width::W8),
            2 => Ok(Width::W16),
            3 | 4 => Ok(Width::W32),
            5..=8 => Ok(Width::W64),
            _ => Err(AirError::BadWidth { bytes }),
        }
    }

    /// Width that is always safe to use when spilling a value of this bank.
    pub fn conservative(bank: Bank) -> Width {
        match bank {
            Bank::Gp => Width::PTR,
            Bank::Fp => Width::W64,
        }
    }

    pub fn minimum(bank: Bank) -> Width {
        match bank {
            Bank::Gp => Width::W8,
            Bank::Fp => Width::W32,
        }
    }
}

impl fmt::Display for Width {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.bits())
    }
}

/// Value types of the higher level IR, as seen by call conventions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValueType {
    Void,
    Int32,
    Int64,
    Float,
    Double,
}

impl ValueType {
    pub fn bank(self) -> Option<Bank> {
        match self {
            ValueType::Void => None,
            ValueType::Int32 | ValueType::Int64 => Some(Bank::Gp),
            ValueType::Float | ValueType::Double => Some(Bank::Fp),
        }
    }

    pub fn width(self) -> Option<Width> {
        match self {
            ValueType::Void => None,
            ValueType::Int32 | ValueType::Float => Some(Width::W32),
            ValueType::Int64 | ValueType::Double => Some(Width::W64),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_width_for_bytes() {
        assert_eq!(Width::for_bytes(0), Ok(Width::W8));
        assert_eq!(Width::for_bytes(1), Ok(Width::W8));
        assert_eq!(Width::for_bytes(2), Ok(Width::W16));
        assert_eq!(Width::for_bytes(3), Ok(Width::W32));
        assert_eq!(Width::for_bytes(4), Ok(Width::W32));
        assert_eq!(Width::for_bytes(5), Ok(Width::W64));
        assert_eq!(Width::for_bytes(8), Ok(Width::W64));
        assert_eq!(Width::for_bytes(9), Err(AirError::BadWidth { bytes: 9 }));
    }

    #[test]
    fn test_width_bounds_per_bank() {
        assert_eq!(Width::conservative(Bank::Gp), Width::PTR);
        assert_eq!(Width::conservative(Bank::Fp), Width::W64);
        assert_eq!(Width::minimum(Bank::Gp).bits(), 8);
        assert_eq!(Width::minimum(Bank::Fp).bytes(), 4);
    }

    #[test]
    fn test_value_type_mapping() {
        assert_eq!(ValueType::Void.bank(), None);
        assert_eq!(ValueType::Int32.bank(), Some(Bank::Gp));
        assert_eq!(ValueType::Double.bank(), Some(Bank::Fp));
        assert_eq!(ValueType::Float.width(), Some(Width::W32));
        assert_eq!(ValueType::Int64.width(), Some(Width::W64));
    }
}
