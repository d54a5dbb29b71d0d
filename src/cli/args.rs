//! CLI argument definitions and config merging.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::config::Config;

/// Download media from paginated Instagram-style feeds.
#[derive(Debug, Parser)]
#[command(name = "instalooter", version, about)]
pub struct Args {
    #[command(subcommand)]
    pub command: Command,

    /// Path to a TOML configuration file.
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Enable debug logging.
    #[arg(long, global = true)]
    pub debug: bool,

    /// Suppress progress bars.
    #[arg(short, long, global = true)]
    pub quiet: bool,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Download media from a profile feed.
    User {
        /// Profile username.
        username: String,

        /// Destination directory.
        #[arg(default_value = ".")]
        dest: PathBuf,

        #[command(flatten)]
        opts: CommonOpts,
    },

    /// Download media from a tag feed.
    Hashtag {
        /// Tag name, without the leading '#'.
        tag: String,

        /// Destination directory.
        #[arg(default_value = ".")]
        dest: PathBuf,

        #[command(flatten)]
        opts: CommonOpts,
    },

    /// Download the media of a single post.
    Post {
        /// Post shortcode or URL.
        post: String,

        /// Destination directory.
        #[arg(default_value = ".")]
        dest: PathBuf,

        #[command(flatten)]
        opts: CommonOpts,
    },
}

impl Command {
    /// The options shared by every subcommand.
    pub fn common_opts(&self) -> &CommonOpts {
        match self {
            Command::User { opts, .. }
            | Command::Hashtag { opts, .. }
            | Command::Post { opts, .. } => opts,
        }
    }

    /// The destination directory of this invocation.
    pub fn dest(&self) -> &PathBuf {
        match self {
            Command::User { dest, .. }
            | Command::Hashtag { dest, .. }
            | Command::Post { dest, .. } => dest,
        }
    }
}

/// Flags shared by all subcommands.
#[derive(Debug, clap::Args)]
pub struct CommonOpts {
    /// Also download videos.
    #[arg(short = 'v', long)]
    pub get_videos: bool,

    /// Only download videos (implies --get-videos).
    #[arg(short = 'V', long)]
    pub videos_only: bool,

    /// Number of parallel download workers.
    #[arg(short, long)]
    pub jobs: Option<usize>,

    /// Filename template, e.g. "{date}_{id}".
    #[arg(short = 'T', long)]
    pub template: Option<String>,

    /// Save each record's metadata to a JSON file next to the artifact.
    #[arg(short = 'd', long)]
    pub dump_json: bool,

    /// Only save metadata, discard the binary payloads.
    #[arg(short = 'D', long)]
    pub dump_only: bool,

    /// Always fetch the detailed record form, at the cost of extra requests.
    #[arg(short = 'e', long)]
    pub extended_dump: bool,

    /// Maximum number of posts to download.
    #[arg(short = 'n', long)]
    pub num_to_dl: Option<u64>,

    /// Stop discovery at the first already-downloaded post.
    #[arg(short = 'N', long)]
    pub new: bool,

    /// Time window as START:END dates (YYYY-MM-DD), either side optional.
    #[arg(short = 't', long)]
    pub time: Option<String>,
}

impl CommonOpts {
    /// Overlay these flags onto a loaded configuration.
    pub fn merge_into_config(&self, config: &mut Config) {
        if self.get_videos {
            config.options.include_videos = true;
        }
        if self.videos_only {
            config.options.videos_only = true;
            config.options.include_videos = true;
        }
        if let Some(jobs) = self.jobs {
            config.options.jobs = jobs;
        }
        if let Some(template) = &self.template {
            config.options.template = template.clone();
        }
        if self.dump_json {
            config.options.dump_metadata = true;
        }
        if self.dump_only {
            config.options.metadata_only = true;
            config.options.dump_metadata = true;
        }
        if self.extended_dump {
            config.options.extended_metadata = true;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_user_subcommand() {
        let args = Args::parse_from(["instalooter", "user", "someone", "/tmp/out", "-v", "-j", "4"]);
        match &args.command {
            Command::User { username, dest, opts } => {
                assert_eq!(username, "someone");
                assert_eq!(dest, &PathBuf::from("/tmp/out"));
                assert!(opts.get_videos);
                assert_eq!(opts.jobs, Some(4));
            }
            _ => unreachable!(),
        }
    }

    #[test]
    fn test_merge_into_config() {
        let args = Args::parse_from([
            "instalooter", "hashtag", "cats", "-V", "-D", "-T", "{date}_{id}",
        ]);
        let mut config = Config::default();
        args.command.common_opts().merge_into_config(&mut config);

        assert!(config.options.videos_only);
        assert!(config.options.include_videos);
        assert!(config.options.metadata_only);
        assert!(config.options.dump_metadata);
        assert_eq!(config.options.template, "{date}_{id}");
        // Unset flags leave file values untouched.
        assert_eq!(config.options.jobs, 16);
    }

    #[test]
    fn test_default_dest_is_cwd() {
        let args = Args::parse_from(["instalooter", "post", "BXyZ12345"]);
        assert_eq!(args.command.dest(), &PathBuf::from("."));
    }
}
