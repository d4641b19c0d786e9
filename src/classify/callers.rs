//! Caller dependency signal.

use crate::program::Program;
use crate::taxonomy::Signal;

/// Cap on the caller dependency weight.
const MAX_CALLER_WEIGHT: i32 = 15;

/// Count distinct other packages that reference the function and
/// weight proportionally: 1 caller = 5, 2-3 = 10, 4+ = 15. Zero
/// callers is no evidence, not negative evidence.
///
/// The uses index is keyed by (defining package, identifier), so
/// same-named functions in different packages never collide.
pub fn caller_signal(program: &Program, package: &str, function: &str) -> Option<Signal> {
    let count = program.caller_packages(package, function);
    if count == 0 {
        return None;
    }

    let weight = match count {
        1 => 5,
        2..=3 => 10,
        _ => MAX_CALLER_WEIGHT,
    };

    Some(
        Signal::new("caller", weight)
            .with_reasoning(format!("{count} caller package(s) reference this function")),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::program::{Package, Program};

    fn program_with_callers(count: usize) -> Program {
        let mut packages = vec![Package::from_source(
            "core",
            "pub fn save_record(x: u64) -> u64 { x }\n",
        )
        .unwrap()];
        for i in 0..count {
            packages.push(
                Package::from_source(
                    &format!("caller{i}"),
                    "pub fn run() { let _ = core::save_record(1); }\n",
                )
                .unwrap(),
            );
        }
        Program::new(packages)
    }

    #[test]
    fn zero_callers_yields_no_signal() {
        let program = program_with_callers(0);
        assert!(caller_signal(&program, "core", "save_record").is_none());
    }

    #[test]
    fn weight_scales_with_caller_count() {
        for (callers, weight) in [(1, 5), (2, 10), (3, 10), (4, 15), (7, 15)] {
            let program = program_with_callers(callers);
            let signal = caller_signal(&program, "core", "save_record").unwrap();
            assert_eq!(signal.weight, weight, "{callers} callers");
        }
    }
}
