//! Logging facade that reports the caller of each message

use anyhow::Result;
use caller::{Config, Frame, Resolver};
use serde::Serialize;
use std::io::Write;

/// Output format of a log line
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    Text,
    Json,
}

#[derive(Serialize)]
struct JsonLine<'a> {
    level: &'a str,
    message: &'a str,
    caller: &'a Frame,
}

/// Writes log lines tagged with the file and line of the real caller
pub struct Log<W: Write> {
    resolver: Resolver,
    format: Format,
    root: Option<String>,
    out: std::cell::RefCell<W>,
}

impl<W: Write> Log<W> {
    pub fn new(config: &Config, format: Format, out: W) -> Result<Self> {
        let log = Self {
            resolver: Resolver::from_config(config)?,
            format,
            root: None,
            out: std::cell::RefCell::new(out),
        };
        log.resolver.ignore_function("Log.info");
        log.resolver.ignore_function("Log.warn");
        log.resolver.ignore_function("Log.log");
        Ok(log)
    }

    /// Print file paths relative to `root`
    pub fn with_root(mut self, root: impl Into<String>) -> Self {
        self.root = Some(root.into());
        self
    }

    pub fn resolver(&self) -> &Resolver {
        &self.resolver
    }

    #[inline(never)]
    pub fn info(&self, msg: &str) -> Result<()> {
        self.log("INFO", msg)
    }

    #[inline(never)]
    pub fn warn(&self, msg: &str) -> Result<()> {
        self.log("WARN", msg)
    }

    #[inline(never)]
    fn log(&self, level: &str, msg: &str) -> Result<()> {
        let frame = self.resolver.caller();
        let mut out = self.out.borrow_mut();
        match self.format {
            Format::Text => writeln!(
                out,
                "[{}]{{{}:{}}} {}",
                level,
                self.display_file(&frame),
                frame.line.unwrap_or(0),
                msg
            )?,
            Format::Json => {
                serde_json::to_writer(
                    &mut *out,
                    &JsonLine {
                        level,
                        message: msg,
                        caller: &frame,
                    },
                )?;
                writeln!(out)?;
            }
        }
        Ok(())
    }

    fn display_file<'a>(&self, frame: &'a Frame) -> &'a str {
        let file = frame.file.as_deref().unwrap_or("???");
        match &self.root {
            Some(root) => file
                .strip_prefix(root.as_str())
                .map(|f| f.trim_start_matches('/'))
                .unwrap_or(file),
            None => file,
        }
    }

    #[cfg(test)]
    pub fn into_inner(self) -> W {
        self.out.into_inner()
    }
}
