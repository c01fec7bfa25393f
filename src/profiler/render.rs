//! Text renderings of a profiler report.

use std::io::{self, Write};

use crate::profiler::report::{ProfilerReport, ReportSection};

const RULE: &str = "------------------------------------------------------------";

/// Turns a report into output for some audience.
pub trait ProfilerRenderer {
    fn render(&self, report: &ProfilerReport, out: &mut dyn Write) -> io::Result<()>;
}

/// Fixed-width table for terminals, children indented under parents.
#[derive(Debug, Clone, Copy, Default)]
pub struct ConsoleRenderer;

impl ConsoleRenderer {
    fn row(section: &ReportSection, indent: usize, out: &mut dyn Write) -> io::Result<()> {
        let label = format!("{}{}", "  ".repeat(indent), section.name);
        writeln!(out, "{:<40} {:>12.3}", label, section.elapsed_millis())?;
        for child in &section.children {
            Self::row(child, indent + 1, out)?;
        }
        Ok(())
    }
}

impl ProfilerRenderer for ConsoleRenderer {
    fn render(&self, report: &ProfilerReport, out: &mut dyn Write) -> io::Result<()> {
        writeln!(
            out,
            "Profiler report @ {}",
            report.captured_at.format("%Y-%m-%d %H:%M:%S UTC")
        )?;
        writeln!(out, "{}", RULE)?;
        writeln!(out, "{:<40} {:>12}", "Section", "Duration(ms)")?;
        writeln!(out, "{}", RULE)?;
        for root in &report.roots {
            Self::row(root, 0, out)?;
        }
        writeln!(out, "{}", RULE)
    }
}

/// Render into a string.
pub fn render_to_string(renderer: &dyn ProfilerRenderer, report: &ProfilerReport) -> String {
    let mut buf = Vec::new();
    // Writing into a Vec cannot fail.
    let _ = renderer.render(report, &mut buf);
    String::from_utf8_lossy(&buf).into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_console_table() {
        let report = ProfilerReport::new(vec![ReportSection {
            name: "boot".into(),
            elapsed_nanos: 2_500_000,
            children: vec![ReportSection {
                name: "init".into(),
                elapsed_nanos: 1_250_000,
                children: Vec::new(),
            }],
        }]);

        let text = render_to_string(&ConsoleRenderer, &report);
        let lines: Vec<&str> = text.lines().collect();
        assert!(lines[0].starts_with("Profiler report @ "));
        assert!(lines[2].starts_with("Section"));
        assert!(lines[4].starts_with("boot "));
        assert!(lines[4].ends_with("2.500"));
        assert!(lines[5].starts_with("  init "));
        assert!(lines[5].ends_with("1.250"));
        assert_eq!(lines.len(), 7);
    }
}
