mod app;
mod cli;
mod cmd;
mod config;
mod daemon;
mod dispatch;
mod git;
mod invocation;
mod logs;
mod mode;
mod process_env;
mod scratch;
mod state;
mod version;

use anyhow::Result;

fn main() -> Result<()> {
    cli::run()
}
