//! a library for simulating dram memory controllers at multiple fidelities
pub mod mem;

use std::io;
use tracing::metadata::LevelFilter;
use tracing_subscriber::fmt::MakeWriter;

pub use mem::config::{ControllerConfig, Fidelity, Technology};
pub use mem::{create_controller, MemoryController};

#[allow(dead_code)]
pub fn init_logger_info() {
    init_logger(LevelFilter::INFO, io::stderr);
}

#[allow(dead_code)]
pub fn init_logger_debug() {
    init_logger(LevelFilter::DEBUG, io::stderr);
}

#[allow(dead_code)]
pub fn init_logger(
    filter: LevelFilter,
    writter: impl for<'writer> MakeWriter<'writer> + 'static + Send + Sync,
) {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::builder()
                .with_default_directive(filter.into())
                .from_env_lossy(),
        )
        .with_writer(writter)
        .with_ansi(false)
        .try_init()
        .unwrap_or_else(|e| {
            eprintln!("failed to init logger: {}", e);
        });
}

#[allow(dead_code)]
pub fn init_logger_stderr(filter: LevelFilter) {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::builder()
                .with_default_directive(filter.into())
                .from_env_lossy(),
        )
        .with_ansi(true)
        .try_init()
        .unwrap_or_else(|e| {
            eprintln!("failed to init logger: {}", e);
        });
}

#[cfg(test)]
mod tests {
    use crate::mem::config::{ControllerConfig, Fidelity, Technology};
    use crate::mem::request::Request;

    #[test]
    fn end_to_end_behavioral() {
        let config = ControllerConfig::preset(Technology::Lpddr5, Fidelity::Behavioral, 6400);
        let mut controller = crate::create_controller(config).unwrap();
        let id = controller.submit(Request::read(0, 64)).unwrap();
        assert_eq!(id, 1);
        assert_eq!(controller.stats().reads, 1);
    }

    #[test]
    fn end_to_end_cycle_accurate() {
        let config = ControllerConfig::preset(Technology::Lpddr5, Fidelity::CycleAccurate, 6400);
        let mut controller = crate::create_controller(config).unwrap();
        for i in 0..8u64 {
            controller.submit(Request::read(i * 0x40, 64)).unwrap();
        }
        controller.drain();
        assert_eq!(controller.pending_count(), 0);
        assert_eq!(controller.stats().reads, 8);
    }
}
