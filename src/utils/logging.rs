use chrono::Local;
use std::{
    fs::{self, OpenOptions},
    io::{self, Write},
    path::Path,
};

pub trait Logger: Send + Sync {
    fn log(&mut self, message: &str);
    fn debug_log(&mut self, message: &str);
}

fn timestamp() -> String {
    Local::now().format("%Y-%m-%d %H:%M:%S").to_string()
}

/// Writes log lines to stderr so stdout stays free for callers that parse it.
#[derive(Debug)]
pub struct ConsoleLogger {
    debug: bool,
}

impl ConsoleLogger {
    pub fn new(debug: bool) -> Self {
        Self { debug }
    }
}

impl Logger for ConsoleLogger {
    fn log(&mut self, message: &str) {
        eprintln!("{}: {}", timestamp(), message);
    }

    fn debug_log(&mut self, message: &str) {
        if self.debug {
            eprintln!("{}: [DEBUG] {}", timestamp(), message);
        }
    }
}

#[derive(Debug)]
pub struct FileLogger {
    log_file: String,
    debug: bool,
}

impl FileLogger {
    pub fn new(log_file: &str, debug: bool) -> io::Result<Self> {
        if let Some(parent) = Path::new(log_file).parent() {
            fs::create_dir_all(parent)?;
        }

        Ok(FileLogger {
            log_file: log_file.to_string(),
            debug,
        })
    }

    fn write_to_file(&self, message: &str) -> io::Result<()> {
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.log_file)?;

        writeln!(file, "{}: {}", timestamp(), message)
    }
}

impl Logger for FileLogger {
    fn log(&mut self, message: &str) {
        if let Err(e) = self.write_to_file(message) {
            eprintln!("Failed to write to log file: {}", e);
        }
    }

    fn debug_log(&mut self, message: &str) {
        if self.debug {
            if let Err(e) = self.write_to_file(&format!("[DEBUG] {}", message)) {
                eprintln!("Failed to write debug log: {}", e);
            }
        }
    }
}

// MultiLogger allows logging to multiple destinations
#[derive(Default)]
pub struct MultiLogger {
    loggers: Vec<Box<dyn Logger>>,
}

impl MultiLogger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, logger: Box<dyn Logger>) -> Self {
        self.loggers.push(logger);
        self
    }
}

impl Logger for MultiLogger {
    fn log(&mut self, message: &str) {
        for logger in &mut self.loggers {
            logger.log(message);
        }
    }

    fn debug_log(&mut self, message: &str) {
        for logger in &mut self.loggers {
            logger.debug_log(message);
        }
    }
}

/// Console logger plus an optional append-only log file.
pub fn build_logger(debug: bool, log_file: Option<&str>) -> io::Result<Box<dyn Logger>> {
    let mut logger = MultiLogger::new().with(Box::new(ConsoleLogger::new(debug)));
    if let Some(path) = log_file {
        let path = shellexpand::tilde(path).to_string();
        logger = logger.with(Box::new(FileLogger::new(&path, debug)?));
    }
    Ok(Box::new(logger))
}

#[cfg(test)]
pub(crate) mod testing {
    use super::Logger;
    use std::sync::{Arc, Mutex};

    /// Records every line; clones share the same buffer.
    #[derive(Clone, Default)]
    pub struct MemoryLogger {
        lines: Arc<Mutex<Vec<String>>>,
    }

    impl MemoryLogger {
        pub fn lines(&self) -> Vec<String> {
            self.lines.lock().unwrap().clone()
        }

        pub fn contains(&self, needle: &str) -> bool {
            self.lines().iter().any(|line| line.contains(needle))
        }
    }

    impl Logger for MemoryLogger {
        fn log(&mut self, message: &str) {
            self.lines.lock().unwrap().push(message.to_string());
        }

        fn debug_log(&mut self, message: &str) {
            self.lines
                .lock()
                .unwrap()
                .push(format!("DEBUG: {}", message));
        }
    }
}
