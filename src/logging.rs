use tracing::Level;
use tracing_subscriber::fmt;

pub fn init(verbose: bool) {
    if !verbose {
        return;
    }
    let _ = fmt()
        .with_target(false)
        .with_level(true)
        .with_thread_ids(false)
        .with_thread_names(false)
        .with_max_level(Level::DEBUG)
        .try_init();
}
