//! User-facing output on stdout
//!
//! Diagnostics go through `tracing` on stderr. Results the operator asked for
//! (usage, the default image, where a job went) are printed here.

/// `-v` only changes the log level; stdout is either full or quiet.
#[derive(Clone, Debug, Default)]
pub struct OutputManager {
    quiet: bool,
}

impl OutputManager {
    pub fn new_quiet() -> Self {
        Self::from_flags(true)
    }

    pub fn from_flags(quiet: bool) -> Self {
        Self { quiet }
    }

    /// The value a command exists to produce; printed even in quiet mode
    pub fn result(&self, value: &str) {
        println!("{}", value);
    }

    pub fn usage(&self, text: &str) {
        println!("{}", text);
    }

    /// Usage after an invalid invocation
    pub fn usage_error(&self, text: &str) {
        eprintln!("{}", text);
    }

    pub fn success(&self, message: &str) {
        if !self.quiet {
            println!("✅ {}", message);
        }
    }

    pub fn hint(&self, message: &str) {
        if !self.quiet {
            println!("💡 {}", message);
        }
    }

    pub fn summary(&self, title: &str, items: &[(&str, String)]) {
        if self.quiet {
            return;
        }

        println!("\n📊 {}", title);
        for (key, value) in items {
            println!("  • {}: {}", key, value);
        }
    }
}
