use log::LevelFilter;
use tiny_serial::console;
use tiny_serial::logger::init_logger;
use tiny_serial::serial::SerialError;

// One logger per process, so everything about the global one lives here.
#[test]
fn global_logger_installs_once_and_drops_early_records() {
    assert_eq!(init_logger(LevelFilter::Info), Ok(()));
    assert_eq!(log::max_level(), LevelFilter::Info);

    // No console yet: records vanish instead of failing or hanging
    log::warn!("disk {} missing", 2);
    log::error!(target: "boot", "no framebuffer");
    assert!(!console::is_initialized());

    assert_eq!(
        init_logger(LevelFilter::Trace),
        Err(SerialError::AlreadyInitialized)
    );
    assert_eq!(log::max_level(), LevelFilter::Info);
}
