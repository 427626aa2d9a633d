//! Output formatting for CLI
//!
//! Provides consistent output formatting across all commands:
//! - Human-readable default output
//! - JSON output (--json flag)
//! - Quiet mode for scripting (--quiet flag)

use triagem_core::{region_label, Application, Stats};

/// Output format options
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    /// Human-readable output (default)
    Human,
    /// JSON output
    Json,
    /// Quiet mode - minimal output
    Quiet,
}

impl OutputFormat {
    /// Create format from CLI flags
    pub fn from_flags(json: bool, quiet: bool) -> Self {
        if quiet {
            OutputFormat::Quiet
        } else if json {
            OutputFormat::Json
        } else {
            OutputFormat::Human
        }
    }
}

/// Output helper for consistent formatting
pub struct Output {
    /// The output format
    pub format: OutputFormat,
}

impl Output {
    pub fn new(format: OutputFormat) -> Self {
        Self { format }
    }

    /// Check if output is in quiet mode
    pub fn is_quiet(&self) -> bool {
        matches!(self.format, OutputFormat::Quiet)
    }

    /// Print one application in full detail
    pub fn print_application(&self, app: &Application) {
        match self.format {
            OutputFormat::Human => {
                println!("ID:           {}", app.id);
                println!("Name:         {}", app.name);
                println!("Age:          {}", app.age);
                println!("Email:        {}", app.email);
                println!("Contact:      {}", app.contact);
                println!("Region:       {}", region_label(&app.region));
                println!("Status:       {}", app.status.label());
                if let Some(availability) = app.availability {
                    println!("Availability: {}", availability.label());
                }
                if let Some(experience) = app.has_prior_experience {
                    println!(
                        "Experience:   {}",
                        if experience { "yes" } else { "no" }
                    );
                }
                if let Some(ref motivation) = app.motivation {
                    println!();
                    println!("Motivation:");
                    println!("{}", motivation);
                    println!();
                }
                if let Some(ref url) = app.photo_url {
                    println!("Photo:        {}", url);
                }
                println!("Submitted:    {}", app.submitted_at.format("%Y-%m-%d %H:%M"));
                println!("Updated:      {}", app.updated_at.format("%Y-%m-%d %H:%M"));
            }
            OutputFormat::Json => {
                println!("{}", serde_json::to_string_pretty(app).unwrap());
            }
            OutputFormat::Quiet => {
                println!("{}", app.id);
            }
        }
    }

    /// Print a filtered list of applications, with a showing-X-of-Y
    /// footer
    pub fn print_applications(&self, shown: &[Application], total: usize) {
        match self.format {
            OutputFormat::Human => {
                if shown.is_empty() {
                    println!("No applications found.");
                    return;
                }
                for app in shown {
                    println!(
                        "{} | {} | {} | {} | {}",
                        short_id(&app.id),
                        pad(&truncate(&app.name, 25), 25),
                        pad(region_label(&app.region), 16),
                        pad(app.status.label(), 9),
                        app.submitted_at.format("%Y-%m-%d")
                    );
                }
                println!("\nShowing {} of {} application(s)", shown.len(), total);
            }
            OutputFormat::Json => {
                println!("{}", serde_json::to_string_pretty(shown).unwrap());
            }
            OutputFormat::Quiet => {
                for app in shown {
                    println!("{}", app.id);
                }
            }
        }
    }

    /// Print aggregate statistics
    pub fn print_stats(&self, stats: &Stats) {
        match self.format {
            OutputFormat::Json => {
                println!("{}", serde_json::to_string_pretty(stats).unwrap());
            }
            OutputFormat::Quiet => {
                println!(
                    "{} {} {} {} {}",
                    stats.total, stats.pending, stats.approved, stats.rejected, stats.approval_rate
                );
            }
            OutputFormat::Human => {
                println!("Applications");
                println!("============");
                println!("Total:         {}", stats.total);
                println!("Pending:       {}", stats.pending);
                println!("Approved:      {}", stats.approved);
                println!("Rejected:      {}", stats.rejected);
                println!("Approval rate: {}%", stats.approval_rate);
            }
        }
    }

    /// Print a success message
    pub fn success(&self, message: &str) {
        match self.format {
            OutputFormat::Human => println!("✓ {}", message),
            OutputFormat::Json => {
                println!(
                    "{}",
                    serde_json::json!({"status": "success", "message": message})
                );
            }
            OutputFormat::Quiet => {}
        }
    }

    /// Print an informational message
    pub fn message(&self, msg: &str) {
        match self.format {
            OutputFormat::Human => println!("{}", msg),
            OutputFormat::Json => {
                println!("{}", serde_json::json!({"message": msg}));
            }
            OutputFormat::Quiet => {}
        }
    }
}

/// First 8 characters of an id (server ids are UUIDs)
fn short_id(id: &str) -> &str {
    match id.char_indices().nth(8) {
        Some((idx, _)) => &id[..idx],
        None => id,
    }
}

/// Truncate a string to max length, adding "..." if truncated
fn truncate(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let cut: String = s.chars().take(max_len.saturating_sub(3)).collect();
        format!("{}...", cut)
    }
}

/// Right-pad to a fixed width
fn pad(s: &str, width: usize) -> String {
    format!("{:width$}", s, width = width)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_from_flags() {
        assert_eq!(OutputFormat::from_flags(false, false), OutputFormat::Human);
        assert_eq!(OutputFormat::from_flags(true, false), OutputFormat::Json);
        assert_eq!(OutputFormat::from_flags(false, true), OutputFormat::Quiet);
        // Quiet takes precedence
        assert_eq!(OutputFormat::from_flags(true, true), OutputFormat::Quiet);
    }

    #[test]
    fn test_truncate() {
        assert_eq!(truncate("short", 10), "short");
        assert_eq!(truncate("a longer string here", 10), "a longe...");
    }

    #[test]
    fn test_short_id() {
        assert_eq!(short_id("abcdef01-2345"), "abcdef01");
        assert_eq!(short_id("tiny"), "tiny");
        // Must cut on a char boundary, not a byte offset
        assert_eq!(short_id("zambézia-record"), "zambézia");
        assert_eq!(short_id("éééé"), "éééé");
    }
}
