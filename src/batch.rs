//! Parallel unpacking of many in-memory blobs.
//!
//! Enable with the `rayon` feature flag. Every worker split gets its own
//! [`DecoderContext`]; contexts never cross threads.

use rayon::ThreadPoolBuildError;
use rayon::prelude::*;

use crate::context::DecoderContext;
use crate::error::DecodeError;
use crate::limits::ResourceLimits;
use crate::unpack::{Unpacked, unpack};

/// [`unpack`] every input on a dedicated pool of `threads` workers.
///
/// `threads == 0` lets rayon pick. Results are in input order, one per input;
/// a failed blob does not stop the others and nothing is retried.
pub fn unpack_many<B>(
    inputs: &[B],
    threads: usize,
) -> Result<Vec<Result<Unpacked, DecodeError>>, ThreadPoolBuildError>
where
    B: AsRef<[u8]> + Sync,
{
    unpack_many_with_limits(inputs, threads, ResourceLimits::none())
}

/// [`unpack_many`] with `limits` applied in every worker's context.
pub fn unpack_many_with_limits<B>(
    inputs: &[B],
    threads: usize,
    limits: ResourceLimits,
) -> Result<Vec<Result<Unpacked, DecodeError>>, ThreadPoolBuildError>
where
    B: AsRef<[u8]> + Sync,
{
    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(threads)
        .thread_name(|idx| format!("tenpack-{idx}"))
        .build()?;

    let results: Vec<_> = pool.install(|| {
        inputs
            .par_iter()
            .map_init(
                || Some(DecoderContext::with_limits(limits)),
                |ctx, blob| unpack(blob.as_ref(), ctx),
            )
            .collect()
    });

    let failed = results.iter().filter(|r| r.is_err()).count();
    log::debug!("unpacked {} blobs, {failed} failed", results.len());
    Ok(results)
}
