//! `ward history` - list stored scan records

use clap::Args;

use ward_core::infrastructure::HistoryStore;

use crate::cli::exit_codes;

/// Arguments for the history command
#[derive(Args, Debug)]
pub struct HistoryArgs {
    /// Only show scans of this project path
    #[arg(long)]
    pub project: Option<String>,

    /// Maximum number of records to show
    #[arg(long, default_value_t = 10)]
    pub limit: usize,
}

pub fn run(args: HistoryArgs) -> anyhow::Result<i32> {
    let store = HistoryStore::default_location()?;
    let records = store.list()?;

    let shown = records
        .iter()
        .filter(|record| {
            args.project
                .as_ref()
                .map(|project| &record.project_path == project)
                .unwrap_or(true)
        })
        .take(args.limit);

    let mut count = 0;
    for record in shown {
        count += 1;
        println!(
            "{}  {:<30} {:>3} finding(s)  {}",
            record.timestamp.format("%Y-%m-%d %H:%M:%S"),
            record.project_name,
            record.finding_count,
            record.project_path
        );
    }
    if count == 0 {
        println!("[info] no stored scans");
    }
    Ok(exit_codes::SUCCESS)
}
