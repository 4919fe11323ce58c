/*! Integration tests for Concord.
 *
 * This test suite is organized as a single integration test binary
 * following the pattern described by matklad in
 * https://matklad.github.io/2021/02/27/delete-cargo-integration-tests.html
 *
 * The module structure mirrors the main library structure:
 * - graph: VersionGraph appends and ancestry queries
 * - resolution: merge strategies and the registry's dispatch and audit trail
 * - lock: LockManager check-out, queueing, expiry, and renewal
 * - store: the InMemory store and its file persistence
 * - workflow: the three components composed by a calling layer
 */

use tracing_subscriber::EnvFilter;

#[ctor::ctor]
fn init_test_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::from_default_env().add_directive("concord=info".parse().unwrap()),
        )
        .with_test_writer()
        .try_init();
}

mod graph;
mod helpers;
mod lock;
mod store;
mod workflow;
