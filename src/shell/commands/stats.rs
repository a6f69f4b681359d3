use anyhow::Result;
use async_trait::async_trait;
use humansize::{BINARY, format_size};

use super::output::print_line;
use super::{Command, ShellState};
use crate::remote::RequestKind;

pub struct StatsCommand;

#[async_trait]
impl Command for StatsCommand {
    fn name(&self) -> &str {
        "stats"
    }

    fn usage(&self) -> &str {
        "stats - Show remote request statistics"
    }

    async fn execute(&self, state: &mut ShellState, _args: &[String]) -> Result<()> {
        let Some(metrics) = state.metrics() else {
            print_line!("Request metrics are not enabled");
            return Ok(());
        };

        let snapshot = state.session().provider().snapshot();
        print_line!("Snapshot nodes:     {}", snapshot.len());
        print_line!("Remote requests:    {}", metrics.request_count());
        for (label, kind) in [
            ("metadata", RequestKind::Metadata),
            ("list", RequestKind::List),
            ("list/continue", RequestKind::ListContinue),
            ("download", RequestKind::Download),
        ] {
            print_line!("  {label:<16}  {}", metrics.count(kind));
        }
        print_line!(
            "Downloaded:         {}",
            format_size(metrics.total_bytes(), BINARY)
        );
        print_line!(
            "Time waiting:       {:.2?}",
            metrics.total_request_time()
        );
        Ok(())
    }
}
