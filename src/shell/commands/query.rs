use anyhow::Result;
use async_trait::async_trait;

use super::output::print_line;
use super::{Command, ShellState};
use crate::projection::listing_statement;
use crate::projection::query::XPATH;

pub struct QueryCommand;

#[async_trait]
impl Command for QueryCommand {
    fn name(&self) -> &str {
        "query"
    }

    fn usage(&self) -> &str {
        "query [STATEMENT|PATH] [LANGUAGE] - Run a listing query (PATH expands to a listing)"
    }

    async fn execute(&self, state: &mut ShellState, args: &[String]) -> Result<()> {
        let statement = match args.first() {
            Some(arg) if arg.starts_with("/jcr:root") => arg.clone(),
            Some(path) => listing_statement(&state.resolve_path(path).to_string()),
            None => listing_statement(&state.current_path().to_string()),
        };
        let language = args.get(1).map(String::as_str).unwrap_or(XPATH);

        let rows = state
            .session()
            .query_manager()
            .evaluate(&statement, language);

        for row in &rows {
            let values: Vec<String> = row.values().iter().map(ToString::to_string).collect();
            print_line!("{}", values.join("\t"));
        }
        eprintln!("{} row(s)", rows.len());
        Ok(())
    }
}
