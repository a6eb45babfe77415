use std::path::PathBuf;

use clap::{ArgGroup, Parser};


/// Publishes local files into a workspace of a repository server, or removes them again.
#[derive(Debug, Parser)]
#[command(name = "nodepub")]
#[command(about = "Publish files to a JCR repository over REST", version)]
#[command(group(ArgGroup::new("source").required(true).args(["file", "dir"])))]
pub struct Cli {
    /// Server URL, e.g. http://localhost:8080/resources
    #[arg(long)]
    pub server: String,

    /// Repository name
    #[arg(long)]
    pub repo: String,

    #[arg(long, default_value = "default")]
    pub workspacename: String,

    /// Folder path inside the workspace that receives the files
    #[arg(long)]
    pub workspacepath: String,

    /// Single file to publish
    #[arg(long)]
    pub file: Option<PathBuf>,

    /// Directory whose files are published; subdirectories are skipped
    #[arg(long)]
    pub dir: Option<PathBuf>,

    #[arg(long, default_value = "admin")]
    pub username: String,

    #[arg(long, default_value = "admin")]
    pub pwd: String,

    /// Remove the files instead of publishing them
    #[arg(long)]
    pub unpublish: bool,
}
