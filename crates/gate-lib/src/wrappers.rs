//! Call wrappers that report through a [`DiagnosticSink`]
//!
//! These compose freely with each other and with the gate. Only `catching`
//! changes control flow; the other two always run the wrapped call and
//! return its value untouched.

use crate::observability::{Diagnostic, DiagnosticEvent, DiagnosticSink, Severity};
use std::fmt::{Debug, Display};
use std::time::Instant;

/// Run `f` and report how long it took
pub fn timing<R>(sink: &dyn DiagnosticSink, name: &str, f: impl FnOnce() -> R) -> R {
    let start = Instant::now();
    let value = f();
    let elapsed = start.elapsed();

    sink.emit(Diagnostic::new(
        DiagnosticEvent::CallTimed,
        Severity::Info,
        name,
        format!("{name} took {:.4} s", elapsed.as_secs_f64()),
    ));
    value
}

/// Run `f`, turning an `Err` into a diagnostic and `None`
pub fn catching<R, E: Display>(
    sink: &dyn DiagnosticSink,
    name: &str,
    f: impl FnOnce() -> Result<R, E>,
) -> Option<R> {
    match f() {
        Ok(value) => Some(value),
        Err(e) => {
            sink.emit(Diagnostic::new(
                DiagnosticEvent::FailureCaught,
                Severity::Warn,
                name,
                format!("caught failure in {name}: {e}"),
            ));
            None
        }
    }
}

/// Report the arguments, then call `f` with them
pub fn log_args<A: Debug, R>(
    sink: &dyn DiagnosticSink,
    name: &str,
    args: A,
    f: impl FnOnce(A) -> R,
) -> R {
    sink.emit(Diagnostic::new(
        DiagnosticEvent::ArgumentsLogged,
        Severity::Debug,
        name,
        format!("{name} called with args={args:?}"),
    ));
    f(args)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::observability::MemorySink;

    #[test]
    fn test_timing_returns_value_and_reports() {
        let sink = MemorySink::new();

        let total = timing(&sink, "sum", || (0..100_000u64).sum::<u64>());

        assert_eq!(total, 4_999_950_000);
        let records = sink.records();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].event, DiagnosticEvent::CallTimed);
        assert_eq!(records[0].target, "sum");
        assert!(records[0].message.ends_with(" s"));
    }

    #[test]
    #[should_panic(expected = "inner")]
    fn test_timing_does_not_suppress_panics() {
        let sink = MemorySink::new();
        timing(&sink, "explode", || -> u32 { panic!("inner") });
    }

    #[test]
    fn test_catching_swallows_errors() {
        let sink = MemorySink::new();

        let value: Option<i32> = catching(&sink, "risky", || "x".parse::<i32>());

        assert_eq!(value, None);
        let records = sink.records();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].event, DiagnosticEvent::FailureCaught);
        assert!(records[0].message.contains("invalid digit"));
    }

    #[test]
    fn test_catching_passes_success_through_silently() {
        let sink = MemorySink::new();

        let value = catching(&sink, "safe", || Ok::<_, String>(7));

        assert_eq!(value, Some(7));
        assert!(sink.is_empty());
    }

    #[test]
    fn test_log_args_forwards_arguments() {
        let sink = MemorySink::new();

        let greeting = log_args(&sink, "greet", ("Ada", 3), |(name, times)| {
            format!("Hello, {name}").repeat(times)
        });

        assert_eq!(greeting, "Hello, AdaHello, AdaHello, Ada");
        let records = sink.records();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].message, "greet called with args=(\"Ada\", 3)");
    }
}
