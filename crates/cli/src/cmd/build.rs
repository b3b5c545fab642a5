//! Summary for `stagebuild` (build mode).

use std::time::Duration;

use stagebuild_lib::pipeline::BuildReport;

use crate::output::{format_bytes, format_duration, print_stat, print_success};

pub fn print_report(report: &BuildReport, elapsed: Duration) {
  println!();
  print_success("Build complete!");
  print_stat("Files copied", &report.staged.copied.to_string());
  print_stat("Files unchanged", &report.staged.unchanged.to_string());
  print_stat("Bytes copied", &format_bytes(report.staged.bytes));
  print_stat("Binaries", &report.collected.output_dir.display().to_string());
  print_stat("Duration", &format_duration(elapsed));
}
