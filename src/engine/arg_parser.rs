use clap::Parser;
use std::path::PathBuf;

struct DefaultArgs;

impl DefaultArgs {
    pub const DIR: &'static str = ".";
}

/// Concurrent literal-substring search over a directory tree.
#[derive(Clone, Parser)]
#[command(name = "textseek")]
#[command(about = "Print every occurrence of PATTERN in files under DIR as path:line:offset.")]
pub struct Cli {
    /// Literal text to search for. No regex; must not be empty or contain a newline.
    #[arg(value_name = "PATTERN")]
    pub pattern: String,

    /// Directory to search. Default: current directory.
    #[arg(value_name = "DIR", default_value = DefaultArgs::DIR)]
    pub dir: PathBuf,

    /// Also search hidden files and directories.
    #[arg(long, short = 'H', num_args = 0..=1, default_missing_value = "true", value_parser = clap::value_parser!(bool))]
    pub hidden: Option<bool>,

    /// Verbose output.
    #[arg(long, short = 'v', num_args = 0..=1, default_missing_value = "true", value_parser = clap::value_parser!(bool))]
    pub verbose: Option<bool>,

    /// Print one JSON object per occurrence.
    #[arg(long, short = 'j', num_args = 0..=1, default_missing_value = "true", value_parser = clap::value_parser!(bool))]
    pub json: Option<bool>,

    /// Print only the number of occurrences.
    #[arg(long, short = 'c', num_args = 0..=1, default_missing_value = "true", value_parser = clap::value_parser!(bool))]
    pub count: Option<bool>,

    /// Number of files scanned at once. Default: half the available threads.
    #[arg(long, short = 'w', value_parser = clap::value_parser!(usize))]
    pub workers: Option<usize>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_to_current_dir() {
        let cli = Cli::try_parse_from(["textseek", "needle"]).unwrap();
        assert_eq!(cli.pattern, "needle");
        assert_eq!(cli.dir, PathBuf::from("."));
        assert_eq!(cli.hidden, None);
        assert_eq!(cli.workers, None);
    }

    #[test]
    fn bare_flags_mean_true() {
        let cli = Cli::try_parse_from(["textseek", "needle", "/tmp", "-H", "--count"]).unwrap();
        assert_eq!(cli.hidden, Some(true));
        assert_eq!(cli.count, Some(true));
        assert_eq!(cli.dir, PathBuf::from("/tmp"));
    }

    #[test]
    fn explicit_false_overrides() {
        let cli = Cli::try_parse_from(["textseek", "--hidden=false", "-w", "3", "needle"]).unwrap();
        assert_eq!(cli.hidden, Some(false));
        assert_eq!(cli.workers, Some(3));
    }

    #[test]
    fn pattern_is_required() {
        assert!(Cli::try_parse_from(["textseek"]).is_err());
    }
}
