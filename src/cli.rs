use clap::Parser;
use std::path::PathBuf;

/// 命令行参数
#[derive(Parser, Debug)]
#[command(
    name = "invoice-dispatcher",
    version,
    about = "Merge invoice + summary PDFs into packets, email them to clients and log the outcome"
)]
pub struct Args {
    /// TOML settings file (default: dispatcher.toml, ignored when absent)
    #[arg(long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Build packets and log, but do not send any email
    #[arg(long, conflicts_with = "live")]
    pub dry_run: bool,

    /// Send email even if the settings file enables dry run
    #[arg(long)]
    pub live: bool,

    /// Print the run report as JSON
    #[arg(long)]
    pub json: bool,
}

impl Args {
    /// 命令行覆盖配置中的 dry_run
    pub fn dry_run_override(&self) -> Option<bool> {
        match (self.dry_run, self.live) {
            (true, _) => Some(true),
            (_, true) => Some(false),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flags_override_dry_run() {
        let args = Args::parse_from(["invoice-dispatcher", "--dry-run"]);
        assert_eq!(args.dry_run_override(), Some(true));

        let args = Args::parse_from(["invoice-dispatcher", "--live", "--json"]);
        assert_eq!(args.dry_run_override(), Some(false));
        assert!(args.json);

        let args = Args::parse_from(["invoice-dispatcher"]);
        assert_eq!(args.dry_run_override(), None);
    }

    #[test]
    fn dry_run_and_live_conflict() {
        assert!(Args::try_parse_from(["invoice-dispatcher", "--dry-run", "--live"]).is_err());
    }
}
