use clap::{Parser, Subcommand};

#[derive(clap::Parser)]
#[command(name = "comic-reader", about = "Comic reader with slug to uuid mapping")]
pub struct Cli {
    #[arg(short, long, default_value = "comic", env = "COMIC_CONFIG")]
    pub config_file: String,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, PartialEq, Eq)]
pub enum Command {
    /// Run the mapping HTTP service.
    Serve,

    /// Render the view for a client URL path, e.g. `/series/<id>`.
    Open {
        #[arg(default_value = "/")]
        path: String,

        /// Page to show when the path is a listing.
        #[arg(short, long, default_value_t = 1)]
        page: u32,
    },

    /// Search or filter comics. A query wins over a genre, which wins over
    /// type and status.
    Search {
        query: Option<String>,

        #[arg(long)]
        genre: Option<String>,

        /// Comic type, e.g. manga or manhwa.
        #[arg(long = "type")]
        kind: Option<String>,

        #[arg(long)]
        status: Option<String>,

        #[arg(short, long, default_value_t = 1)]
        page: u32,
    },

    /// List the provider's genres.
    Genres,

    /// Browse one genre.
    Genre {
        slug: String,

        #[arg(short, long, default_value_t = 1)]
        page: u32,
    },

    /// List a comic's chapters, optionally filtered by title.
    Chapters {
        /// Comic slug or id.
        series: String,

        #[arg(short, long)]
        filter: Option<String>,
    },

    /// Read a comic: resume where you left off, or start from the first chapter.
    Read {
        /// Comic slug or id.
        series: String,

        /// Pick a chapter instead of resuming.
        #[arg(long, conflicts_with_all = ["next", "prev"])]
        chapter: Option<String>,

        /// Move one chapter forward after resuming.
        #[arg(long, conflicts_with = "prev")]
        next: bool,

        /// Move one chapter back after resuming.
        #[arg(long)]
        prev: bool,
    },

    /// Print local reading history.
    History,

    /// Print bookmarked comics.
    Bookmarks,

    /// Add or remove a bookmark for a comic slug.
    Bookmark { slug: String },
}

impl Cli {
    pub fn new() -> Self {
        Cli::parse()
    }
}

impl Default for Cli {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clap_test() {
        use clap::CommandFactory;
        Cli::command().debug_assert()
    }

    #[test]
    fn open_defaults_to_root() {
        let cli = Cli::try_parse_from(["comic-reader", "open"]).unwrap();
        assert_eq!(
            cli.command,
            Command::Open {
                path: "/".into(),
                page: 1
            }
        );
        assert_eq!(cli.config_file, "comic");
    }

    #[test]
    fn search_takes_filters() {
        let cli = Cli::try_parse_from([
            "comic-reader",
            "search",
            "--type",
            "manhwa",
            "--status",
            "Ongoing",
            "-p",
            "2",
        ])
        .unwrap();
        assert_eq!(
            cli.command,
            Command::Search {
                query: None,
                genre: None,
                kind: Some("manhwa".into()),
                status: Some("Ongoing".into()),
                page: 2,
            }
        );
    }

    #[test]
    fn read_moves_one_way_only() {
        assert!(Cli::try_parse_from(["comic-reader", "read", "x", "--next", "--prev"]).is_err());
        assert!(
            Cli::try_parse_from(["comic-reader", "read", "x", "--chapter", "c", "--next"]).is_err()
        );
        let cli = Cli::try_parse_from(["comic-reader", "read", "x", "--next"]).unwrap();
        assert_eq!(
            cli.command,
            Command::Read {
                series: "x".into(),
                chapter: None,
                next: true,
                prev: false,
            }
        );
    }
}
