pub mod info;
pub mod run;

use std::path::PathBuf;
use std::time::Duration;

use clap::{ArgAction, Parser, Subcommand};
use revmap_common::config::{
    DEFAULT_MAX_CONCURRENCY, DEFAULT_QUERY_COUNT, DEFAULT_SEARCH_DELAY, Settings, StorePaths,
};

#[derive(Parser)]
#[command(name = "revmap", version)]
#[command(about = "Finds hosts and domains behind random search results.")]
pub struct CommandLine {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Less output; repeat for even less
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub quiet: u8,

    /// Skip the startup banner
    #[arg(long, global = true)]
    pub no_banner: bool,

    /// Don't listen for 'q' on the keyboard
    #[arg(long, global = true)]
    pub no_input: bool,

    /// Directory holding ips.txt, reversed-domains.txt and sentences.txt
    #[arg(short, long, global = true, default_value = ".")]
    pub data_dir: PathBuf,

    /// Read credentials from this file instead of ./.env
    #[arg(long, global = true)]
    pub env_file: Option<PathBuf>,

    /// Maximum simultaneous reverse lookups
    #[arg(short, long, global = true, default_value_t = DEFAULT_MAX_CONCURRENCY)]
    pub concurrency: usize,

    /// Fewest queries to request per run
    #[arg(long, global = true, default_value_t = *DEFAULT_QUERY_COUNT.start())]
    pub min_queries: usize,

    /// Most queries to request per run
    #[arg(long, global = true, default_value_t = *DEFAULT_QUERY_COUNT.end())]
    pub max_queries: usize,

    /// Pause between searches, in milliseconds
    #[arg(long, global = true, default_value_t = DEFAULT_SEARCH_DELAY.as_millis() as u64)]
    pub search_delay_ms: u64,
}

#[derive(Subcommand, Clone, Copy)]
pub enum Commands {
    /// Generate queries, search them and reverse the new addresses (default)
    #[command(alias = "r")]
    Run,
    /// Show configuration and what has been collected so far
    #[command(alias = "i")]
    Info,
}

impl CommandLine {
    pub fn parse_args() -> Self {
        Self::parse()
    }

    pub fn settings(&self) -> Settings {
        Settings {
            no_banner: self.no_banner,
            quiet: self.quiet,
            disable_input: self.no_input,
            stores: StorePaths::in_dir(&self.data_dir),
            query_count: self.min_queries..=self.max_queries,
            max_concurrency: self.concurrency,
            search_delay: Duration::from_millis(self.search_delay_ms),
            ..Settings::default()
        }
    }
}
