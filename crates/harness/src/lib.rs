mod backend;
mod faulty;

pub use backend::TestBackend;
pub use faulty::{FaultyStore, Faults};

use tracing_subscriber::EnvFilter;

/// Route engine logs to the test output. Safe to call from every test.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}
