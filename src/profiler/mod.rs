//! Nested section profiler.
//!
//! Each thread profiles independently. [`section`] opens a named section
//! that closes when its guard drops; sections opened while another is open
//! become its children. Every section also enters a `tracing` span, so
//! subscribers see the same structure.
//!
//! ```ignore
//! let _boot = profiler::section("boot");
//! {
//!     let _init = profiler::section("init");
//!     // ...
//! }
//! let report = profiler::capture();
//! ```

pub mod render;
pub mod report;

use std::cell::RefCell;
use std::time::{Duration, Instant};

pub use render::{render_to_string, ConsoleRenderer, ProfilerRenderer};
pub use report::{ProfilerReport, ReportSection};

struct OpenSection {
    name: String,
    start: Instant,
    children: Vec<ReportSection>,
}

impl OpenSection {
    fn finish(self) -> ReportSection {
        ReportSection {
            name: self.name,
            elapsed_nanos: u64::try_from(self.start.elapsed().as_nanos()).unwrap_or(u64::MAX),
            children: self.children,
        }
    }
}

thread_local! {
    static OPEN: RefCell<Vec<OpenSection>> = const { RefCell::new(Vec::new()) };
    static ROOTS: RefCell<Vec<ReportSection>> = const { RefCell::new(Vec::new()) };
}

/// Guard for an open section. Dropping it closes the section.
#[must_use = "the section closes as soon as the guard is dropped"]
pub struct Section {
    depth: usize,
    start: Instant,
    _span: tracing::span::EnteredSpan,
}

impl Section {
    /// Time since the section was opened.
    pub fn elapsed(&self) -> Duration {
        self.start.elapsed()
    }
}

/// Open a section on the current thread.
pub fn section(name: impl Into<String>) -> Section {
    let name = name.into();
    let span = tracing::debug_span!("section", name = %name).entered();
    let start = Instant::now();

    let depth = OPEN.with(|open| {
        let mut open = open.borrow_mut();
        open.push(OpenSection {
            name,
            start,
            children: Vec::new(),
        });
        open.len() - 1
    });

    Section {
        depth,
        start,
        _span: span,
    }
}

impl Drop for Section {
    fn drop(&mut self) {
        let finished = OPEN.with(|open| {
            let mut open = open.borrow_mut();
            if open.len() <= self.depth {
                // Already closed by an outer section, or reset.
                return None;
            }
            if open.len() > self.depth + 1 {
                tracing::warn!(
                    "profiler section closed with {} child section(s) still open",
                    open.len() - self.depth - 1
                );
            }

            // Close anything still open above this section first.
            let mut finished: Option<ReportSection> = None;
            while open.len() > self.depth {
                let Some(section) = open.pop() else { break };
                let mut section = section.finish();
                if let Some(child) = finished.take() {
                    section.children.push(child);
                }
                finished = Some(section);
            }

            let section = finished?;
            match open.last_mut() {
                Some(parent) => {
                    parent.children.push(section);
                    None
                }
                None => Some(section),
            }
        });

        if let Some(root) = finished {
            tracing::debug!("profiled {} in {:?}", root.name, root.elapsed());
            ROOTS.with(|roots| roots.borrow_mut().push(root));
        }
    }
}

/// Snapshot of the closed root sections recorded on this thread.
pub fn capture() -> ProfilerReport {
    let roots = ROOTS.with(|roots| roots.borrow().clone());
    ProfilerReport::new(roots)
}

/// Like `capture`, but also forgets the captured sections.
pub fn take() -> ProfilerReport {
    let roots = ROOTS.with(|roots| std::mem::take(&mut *roots.borrow_mut()));
    ProfilerReport::new(roots)
}

/// Forget everything recorded on this thread, open sections included.
pub fn reset() {
    OPEN.with(|open| open.borrow_mut().clear());
    ROOTS.with(|roots| roots.borrow_mut().clear());
}

/// Number of sections currently open on this thread.
pub fn depth() -> usize {
    OPEN.with(|open| open.borrow().len())
}
