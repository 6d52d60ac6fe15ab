//! Phase driver.
//!
//! Passes such as stack allocation live outside this crate and plug in
//! through [`Phase`]. [`run_phase`] brackets a phase with structural hashes
//! of the [`Code`] so a harness can compare them against recorded values:
//!
//! ```text
//! build code deterministically
//! early = code.hash()
//! phase.run(&mut code)
//! code.validate()
//! late = code.hash()
//! report.check(golden_early, golden_late)
//! ```

use super::code::Code;
use super::error::{AirError, AirResult};

/// A pass over one compilation unit.
pub trait Phase {
    fn name(&self) -> &str;

    fn run(&mut self, code: &mut Code) -> AirResult<()>;

    /// Whether the phase is expected to change the IR.
    fn mutates(&self) -> bool {
        true
    }
}

/// Hashes recorded around one phase run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PhaseReport {
    pub phase: String,
    pub early_hash: u32,
    pub late_hash: u32,
}

impl PhaseReport {
    pub fn changed(&self) -> bool {
        self.early_hash != self.late_hash
    }

    /// Compare against golden hashes.
    pub fn check(&self, expected_early: u32, expected_late: u32) -> AirResult<()> {
        if self.early_hash != expected_early {
            return Err(self.mismatch("early", expected_early, self.early_hash));
        }
        if self.late_hash != expected_late {
            return Err(self.mismatch("late", expected_late, self.late_hash));
        }
        Ok(())
    }

    fn mismatch(&self, stage: &'static str, expected: u32, actual: u32) -> AirError {
        AirError::HashMismatch {
            phase: self.phase.clone(),
            stage,
            expected,
            actual,
        }
    }
}

/// Run `phase` over `code` and validate the result.
pub fn run_phase<P: Phase + ?Sized>(code: &mut Code, phase: &mut P) -> AirResult<PhaseReport> {
    let early_hash = code.hash();
    log::debug!("{}: early hash {early_hash:#010x}", phase.name());

    phase.run(code)?;
    code.validate()?;

    let late_hash = code.hash();
    log::debug!("{}: late hash {late_hash:#010x}", phase.name());

    let report = PhaseReport {
        phase: phase.name().to_string(),
        early_hash,
        late_hash,
    };
    if report.changed() && !phase.mutates() {
        log::warn!("{} changed the code but declares itself read-only", report.phase);
    }
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::basic_block::BlockId;

    struct SetFrameSize(u32);

    impl Phase for SetFrameSize {
        fn name(&self) -> &str {
            "setFrameSize"
        }

        fn run(&mut self, code: &mut Code) -> AirResult<()> {
            code.set_frame_size(self.0);
            Ok(())
        }
    }

    struct BreakEdges;

    impl Phase for BreakEdges {
        fn name(&self) -> &str {
            "breakEdges"
        }

        fn run(&mut self, code: &mut Code) -> AirResult<()> {
            code[BlockId(0)].add_successor(BlockId(9), 1.0);
            Ok(())
        }
    }

    #[test]
    fn test_frame_size_is_not_hashed() {
        let mut code = Code::new();
        code.add_block();
        let report = run_phase(&mut code, &mut SetFrameSize(32)).unwrap();
        assert!(!report.changed());
        assert_eq!(code.frame_size(), 32);
        assert_eq!(report.check(report.early_hash, report.early_hash), Ok(()));
    }

    #[test]
    fn test_check_reports_stage() {
        let report = PhaseReport {
            phase: "p".to_string(),
            early_hash: 1,
            late_hash: 2,
        };
        assert!(report.changed());
        assert_eq!(
            report.check(1, 3),
            Err(AirError::HashMismatch {
                phase: "p".to_string(),
                stage: "late",
                expected: 3,
                actual: 2,
            })
        );
    }

    #[test]
    fn test_invalid_result_is_an_error() {
        let mut code = Code::new();
        code.add_block();
        assert!(matches!(
            run_phase(&mut code, &mut BreakEdges),
            Err(AirError::DanglingReference { .. })
        ));
    }
}
