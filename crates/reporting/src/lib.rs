//! Output collaborators: JSON export of single runs and batch summaries.

pub mod report_builder;

pub use report_builder::{BatchSummary, ReportWriter, SummaryRow};
