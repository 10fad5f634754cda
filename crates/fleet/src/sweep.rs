//! Query every selected host through the fan-out engine

use deployconf::Host;
use fanout::{Operation, ProgressCallback, Reduced, Task};

use crate::error::{HostOperationError, Result};

/// Run `query` against each host and fold the answers into `initial`
///
/// With `jobs <= 1` hosts are queried one at a time in declaration order;
/// otherwise on a pool of `jobs` workers, with answers folded in
/// declaration order afterwards. Failed hosts end up in the returned
/// failures, never in the accumulator.
pub(crate) fn sweep<A, T, Q, F, P>(
    initial: A,
    hosts: &[&Host],
    query: Q,
    fold: F,
    jobs: usize,
    progress: &mut P,
) -> Result<Reduced<A, HostOperationError>>
where
    T: Send,
    Q: Fn(&Host) -> std::result::Result<T, HostOperationError> + Sync,
    F: Fn(&mut A, &str, T),
    P: ProgressCallback + ?Sized,
{
    if jobs <= 1 {
        let operations = hosts
            .iter()
            .map(|&host| {
                let (query, fold) = (&query, &fold);
                Operation::new(host.name.clone(), move |acc: &mut A| {
                    let value = query(host).inspect_err(log_failure)?;
                    fold(acc, &host.name, value);
                    Ok(())
                })
            })
            .collect::<Vec<Operation<'_, A, HostOperationError>>>();
        return Ok(fanout::reduce(initial, operations, progress));
    }

    let tasks = hosts
        .iter()
        .map(|&host| {
            let query = &query;
            Task::new(host.name.clone(), move || {
                query(host).inspect_err(log_failure)
            })
        })
        .collect::<Vec<Task<'_, T, HostOperationError>>>();

    Ok(fanout::reduce_parallel(initial, tasks, fold, jobs, progress)?)
}

fn log_failure(err: &HostOperationError) {
    log::warn!("host query failed: {err}");
}
