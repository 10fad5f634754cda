//! Fan-out engine - runs keyed steps into one accumulator, never aborting on failure

use crate::context::ProgressCallback;
use crate::error::Result;
use crate::types::{Failure, Operation, Reduced, Task};
use rayon::prelude::*;
use std::sync::mpsc;
use std::thread;

/// Run operations one at a time, in declaration order
///
/// Each operation receives the accumulator as left by the previous one.
/// A failing operation leaves the accumulator as it was and is recorded
/// under its key; the next operation runs regardless.
///
/// # Arguments
/// * `initial` - Starting accumulator
/// * `operations` - Steps to run, in order
/// * `progress` - Progress callback, told the remaining count after each step
///
/// # Returns
/// The folded accumulator and every failure, in run order
pub fn reduce<A, E, P>(
    initial: A,
    operations: Vec<Operation<'_, A, E>>,
    progress: &mut P,
) -> Reduced<A, E>
where
    P: ProgressCallback + ?Sized,
{
    let total = operations.len();
    let mut remaining = total;
    let mut accumulator = initial;
    let mut failures = Vec::new();

    progress.on_start(total);

    for Operation { key, run } in operations {
        log::debug!("fan-out step '{key}' starting ({remaining} of {total} remaining)");
        let outcome = run(&mut accumulator);
        remaining -= 1;

        match outcome {
            Ok(()) => progress.on_step_complete(&key, remaining, true),
            Err(error) => {
                log::debug!("fan-out step '{key}' failed, continuing");
                progress.on_step_complete(&key, remaining, false);
                failures.push(Failure { key, error });
            }
        }
    }

    progress.on_finish();

    Reduced {
        accumulator,
        failures,
    }
}

/// Run operations in order, then hand the result to `on_complete`
///
/// `on_complete` is called exactly once, after the last step, even if
/// every step failed.
pub fn reduce_then<A, E, P, R>(
    initial: A,
    operations: Vec<Operation<'_, A, E>>,
    progress: &mut P,
    on_complete: impl FnOnce(Reduced<A, E>) -> R,
) -> R
where
    P: ProgressCallback + ?Sized,
{
    on_complete(reduce(initial, operations, progress))
}

/// Run tasks on a worker pool, then fold their values in declaration order
///
/// Tasks run concurrently and never touch the accumulator. Once every task
/// has finished, successful values are passed to `fold` in the order the
/// tasks were given, so the final accumulator does not depend on which
/// task happened to finish first.
///
/// With `jobs <= 1` (or a single task) the tasks run sequentially on the
/// calling thread. On the pool, workers report each finished task back to
/// the calling thread, which drives `progress` in completion order while
/// the pool is still busy.
pub fn reduce_parallel<A, T, E, F, P>(
    initial: A,
    tasks: Vec<Task<'_, T, E>>,
    fold: F,
    jobs: usize,
    progress: &mut P,
) -> Result<Reduced<A, E>>
where
    T: Send,
    E: Send,
    F: FnMut(&mut A, &str, T),
    P: ProgressCallback + ?Sized,
{
    let total = tasks.len();
    progress.on_start(total);
    let mut remaining = total;

    if jobs <= 1 || total <= 1 {
        // Lazy: each task runs as the fold reaches it
        let outcomes = tasks.into_iter().map(|Task { key, run }| {
            let outcome = run();
            remaining -= 1;
            progress.on_step_complete(&key, remaining, outcome.is_ok());
            (key, outcome)
        });
        let reduced = fold_outcomes(initial, outcomes, fold);
        progress.on_finish();
        return Ok(reduced);
    }

    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(jobs)
        .build()?;

    log::debug!("fan-out: {total} task(s) on {jobs} worker(s)");

    let (done_tx, done_rx) = mpsc::channel::<(String, bool)>();
    let results: Vec<(String, std::result::Result<T, E>)> = thread::scope(|scope| {
        let workers = scope.spawn(move || {
            pool.install(|| {
                tasks
                    .into_par_iter()
                    .map(|Task { key, run }| {
                        let outcome = run();
                        // The receiver only goes away once every worker is done
                        let _ = done_tx.send((key.clone(), outcome.is_ok()));
                        (key, outcome)
                    })
                    .collect::<Vec<_>>()
            })
        });

        // Ends once the workers drop the sender
        for (key, succeeded) in done_rx {
            remaining -= 1;
            progress.on_step_complete(&key, remaining, succeeded);
        }

        workers
            .join()
            .unwrap_or_else(|panic| std::panic::resume_unwind(panic))
    });

    let reduced = fold_outcomes(initial, results.into_iter(), fold);
    progress.on_finish();
    Ok(reduced)
}

/// Fold task outcomes into the accumulator in iteration order
fn fold_outcomes<A, T, E, F>(
    initial: A,
    outcomes: impl Iterator<Item = (String, std::result::Result<T, E>)>,
    mut fold: F,
) -> Reduced<A, E>
where
    F: FnMut(&mut A, &str, T),
{
    let mut accumulator = initial;
    let mut failures = Vec::new();

    for (key, outcome) in outcomes {
        match outcome {
            Ok(value) => fold(&mut accumulator, &key, value),
            Err(error) => {
                log::debug!("fan-out task '{key}' failed, continuing");
                failures.push(Failure { key, error });
            }
        }
    }

    Reduced {
        accumulator,
        failures,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::NoProgress;
    use std::cell::Cell;
    use std::time::Duration;

    /// Records every callback for assertions
    #[derive(Default)]
    struct RecordingProgress {
        started: Option<usize>,
        steps: Vec<(String, usize, bool)>,
        finished: usize,
    }

    impl ProgressCallback for RecordingProgress {
        fn on_start(&mut self, total: usize) {
            self.started = Some(total);
        }

        fn on_step_complete(&mut self, key: &str, remaining: usize, succeeded: bool) {
            self.steps.push((key.to_string(), remaining, succeeded));
        }

        fn on_finish(&mut self) {
            self.finished += 1;
        }
    }

    fn push(value: &'static str) -> impl FnOnce(&mut Vec<&'static str>) -> std::result::Result<(), String> {
        move |acc| {
            acc.push(value);
            Ok(())
        }
    }

    fn fail(reason: &'static str) -> impl FnOnce(&mut Vec<&'static str>) -> std::result::Result<(), String> {
        move |_acc| Err(reason.to_string())
    }

    #[test]
    fn test_failures_never_abort_the_sequence() {
        let ops = vec![
            Operation::new("first", fail("boom")),
            Operation::new("second", push("ok")),
            Operation::new("third", fail("bang")),
        ];

        let reduced = reduce(Vec::new(), ops, &mut NoProgress);

        assert_eq!(reduced.accumulator, vec!["ok"]);
        assert_eq!(reduced.failed_keys(), vec!["first", "third"]);
        assert_eq!(reduced.failures[0].error, "boom");
        assert!(!reduced.is_success());
    }

    #[test]
    fn test_operations_run_in_declaration_order() {
        let ops = vec![
            Operation::new("a", push("a")),
            Operation::new("b", |acc: &mut Vec<&'static str>| {
                // Later steps see earlier mutations
                assert_eq!(acc.as_slice(), ["a"]);
                acc.push("b");
                Ok(())
            }),
            Operation::new("c", push("c")),
        ];

        let reduced = reduce(Vec::new(), ops, &mut NoProgress);

        assert_eq!(reduced.accumulator, vec!["a", "b", "c"]);
        assert!(reduced.is_success());
    }

    #[test]
    fn test_on_complete_fires_once_even_when_all_fail() {
        let calls = Cell::new(0);
        let ops = vec![
            Operation::new("a", fail("x")),
            Operation::new("b", fail("y")),
        ];

        let failed = reduce_then(Vec::new(), ops, &mut NoProgress, |reduced| {
            calls.set(calls.get() + 1);
            reduced.failures.len()
        });

        assert_eq!(calls.get(), 1);
        assert_eq!(failed, 2);
    }

    #[test]
    fn test_empty_sequence_still_completes() {
        let mut progress = RecordingProgress::default();
        let ops: Vec<Operation<'_, Vec<&'static str>, String>> = Vec::new();

        let reduced = reduce(Vec::new(), ops, &mut progress);

        assert!(reduced.accumulator.is_empty());
        assert_eq!(progress.started, Some(0));
        assert_eq!(progress.finished, 1);
    }

    #[test]
    fn test_progress_counts_down_in_order() {
        let mut progress = RecordingProgress::default();
        let ops = vec![
            Operation::new("h1", push("1")),
            Operation::new("h2", fail("down")),
            Operation::new("h3", push("3")),
        ];

        reduce(Vec::new(), ops, &mut progress);

        assert_eq!(progress.started, Some(3));
        assert_eq!(
            progress.steps,
            vec![
                ("h1".to_string(), 2, true),
                ("h2".to_string(), 1, false),
                ("h3".to_string(), 0, true),
            ]
        );
        assert_eq!(progress.finished, 1);
    }

    #[test]
    fn test_parallel_folds_in_declaration_order() {
        let tasks: Vec<Task<'_, u32, String>> = (0..16u32)
            .map(|i| Task::new(format!("t{i}"), move || Ok(i)))
            .collect();

        let reduced = reduce_parallel(
            Vec::new(),
            tasks,
            |acc: &mut Vec<u32>, _key, value| acc.push(value),
            4,
            &mut NoProgress,
        )
        .unwrap();

        assert_eq!(reduced.accumulator, (0..16).collect::<Vec<_>>());
        assert!(reduced.is_success());
    }

    #[test]
    fn test_parallel_records_failures_by_key() {
        let tasks: Vec<Task<'_, u32, String>> = vec![
            Task::new("a", || Err("refused".to_string())),
            Task::new("b", || Ok(2)),
            Task::new("c", || Err("timeout".to_string())),
        ];
        let mut progress = RecordingProgress::default();

        let reduced = reduce_parallel(
            0u32,
            tasks,
            |acc: &mut u32, _key, value| *acc += value,
            3,
            &mut progress,
        )
        .unwrap();

        assert_eq!(reduced.accumulator, 2);
        assert_eq!(reduced.failed_keys(), vec!["a", "c"]);
        assert_eq!(progress.steps.len(), 3);
        assert_eq!(progress.finished, 1);
    }

    #[test]
    fn test_parallel_with_one_job_runs_sequentially() {
        let tasks: Vec<Task<'_, &'static str, String>> = vec![
            Task::new("a", || Ok("a")),
            Task::new("b", || Err("nope".to_string())),
            Task::new("c", || Ok("c")),
        ];
        let mut progress = RecordingProgress::default();

        let reduced = reduce_parallel(
            Vec::new(),
            tasks,
            |acc: &mut Vec<String>, key, value| acc.push(format!("{key}={value}")),
            1,
            &mut progress,
        )
        .unwrap();

        assert_eq!(reduced.accumulator, vec!["a=a", "c=c"]);
        assert_eq!(reduced.failed_keys(), vec!["b"]);
        assert_eq!(
            progress
                .steps
                .iter()
                .map(|(_, remaining, _)| *remaining)
                .collect::<Vec<_>>(),
            vec![2, 1, 0]
        );
    }

    /// Unblocks a waiting task from the first progress report it sees
    struct ReleaseOnFirstStep {
        release: Option<mpsc::Sender<()>>,
        remaining: Vec<usize>,
    }

    impl ProgressCallback for ReleaseOnFirstStep {
        fn on_start(&mut self, _total: usize) {}

        fn on_step_complete(&mut self, _key: &str, remaining: usize, _succeeded: bool) {
            self.remaining.push(remaining);
            if let Some(release) = self.release.take() {
                let _ = release.send(());
            }
        }

        fn on_finish(&mut self) {}
    }

    #[test]
    fn test_parallel_progress_arrives_before_the_pool_joins() {
        let (release, wait) = mpsc::channel::<()>();
        // "slow" only finishes if progress for "fast" is reported while it waits
        let tasks: Vec<Task<'_, &'static str, String>> = vec![
            Task::new("slow", move || {
                wait.recv_timeout(Duration::from_secs(5))
                    .map(|()| "slow")
                    .map_err(|e| e.to_string())
            }),
            Task::new("fast", || Ok("fast")),
        ];
        let mut progress = ReleaseOnFirstStep {
            release: Some(release),
            remaining: Vec::new(),
        };

        let reduced = reduce_parallel(
            Vec::new(),
            tasks,
            |acc: &mut Vec<&'static str>, _key, value| acc.push(value),
            2,
            &mut progress,
        )
        .unwrap();

        assert!(reduced.is_success());
        assert_eq!(reduced.accumulator, vec!["slow", "fast"]);
        assert_eq!(progress.remaining, vec![1, 0]);
    }
}
