//! BevyLogger — мост logger симуляции → Bevy tracing (info!/warn!/error!)

use microfluidic_simulation::{LogLevel, LogPrinter};

pub struct BevyLogger;

impl LogPrinter for BevyLogger {
    fn log(&self, level: LogLevel, message: &str) {
        match level {
            LogLevel::Debug => bevy::log::debug!("{}", message),
            LogLevel::Info => bevy::log::info!("{}", message),
            LogLevel::Warning => bevy::log::warn!("{}", message),
            LogLevel::Error => bevy::log::error!("{}", message),
        }
    }
}
