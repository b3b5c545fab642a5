//! Summary for `stagebuild --install`.

use stagebuild_lib::pipeline::InstallReport;

use crate::output::{print_info, print_stat, print_success};

pub fn print_report(report: &InstallReport) {
  println!();
  print_success("Install complete!");
  print_stat("Prefix", &report.prefix.display().to_string());
  for path in &report.installed {
    print_info(&path.display().to_string());
  }
}
