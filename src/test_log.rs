use std::sync::Mutex;
use std::thread::{self, ThreadId};
use log::{Level, LevelFilter, Log, Metadata, Record};

/// Logger keeping every record in memory, tagged with the thread that logged it
struct CaptureLogger {
    records: Mutex<Vec<(ThreadId, Level, String)>>,
}

static LOGGER: CaptureLogger = CaptureLogger { records: Mutex::new(Vec::new()) };

impl Log for CaptureLogger {
    fn enabled(&self, _: &Metadata) -> bool {
        true
    }

    fn log(&self, record: &Record) {
        if let Ok(mut records) = self.records.lock() {
            records.push((thread::current().id(), record.level(), record.args().to_string()));
        }
    }

    fn flush(&self) {}
}

/// Installs the capturing logger, tests run in parallel so this is idempotent
pub fn capture() {
    let _ = log::set_logger(&LOGGER);
    log::set_max_level(LevelFilter::Trace);
}

/// Returns messages logged at 'level' by the current thread
///
/// # Arguments
///
/// * 'level' - the level to pick messages for
pub fn messages(level: Level) -> Vec<String> {
    let me = thread::current().id();
    LOGGER.records
        .lock()
        .map(|records| records
            .iter()
            .filter(|(id, l, _)| *id == me && *l == level)
            .map(|(_, _, m)| m.clone())
            .collect())
        .unwrap_or_default()
}
