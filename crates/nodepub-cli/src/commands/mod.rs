use std::io::{self, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use nodepub_core::{Repository, RestClient, Server, Status, Transport, Workspace};
use serde_json::json;
use tracing::{info, warn};
use walkdir::WalkDir;

use crate::cli::Cli;


pub(crate) fn run(cli: &Cli) -> Result<()> {
    let client = RestClient::from_env().context("failed to create http client")?;
    let stdout = io::stdout();
    run_with_client(&client, cli, &mut stdout.lock())
}

/// Validates the server, then publishes or unpublishes every selected file.
///
/// Setup failures abort with an error. Per-file failures are reported and the batch goes on.
pub(crate) fn run_with_client<T: Transport>(
    client: &RestClient<T>,
    cli: &Cli,
    out: &mut impl Write,
) -> Result<()> {
    let files = collect_files(cli)?;
    let workspace = connect(client, cli)?;

    let mut failed = 0_usize;
    for file in &files {
        let status = if cli.unpublish {
            client.unpublish(&workspace, &cli.workspacepath, file)
        } else {
            client.publish(&workspace, &cli.workspacepath, file)
        };
        if status.is_error() {
            failed += 1;
        }
        let operation = if cli.unpublish { "unpublish" } else { "publish" };
        report(out, operation, file, &status)?;
    }
    info!(
        files = files.len(),
        failed,
        workspace = %workspace,
        path = %cli.workspacepath,
        unpublish = cli.unpublish,
        "batch finished"
    );
    Ok(())
}

fn connect<T: Transport>(client: &RestClient<T>, cli: &Cli) -> Result<Workspace> {
    let server = Server::new(cli.server.as_str(), cli.username.as_str(), cli.pwd.as_str());
    let server = client
        .validate(&server)
        .with_context(|| format!("failed to validate server {}", cli.server))?;
    let repositories = client
        .get_repositories(&server)
        .with_context(|| format!("failed to list repositories on {}", cli.server))?;
    if !repositories.iter().any(|repo| repo.name() == cli.repo) {
        warn!(repo = %cli.repo, server = %server, "repository not listed by server");
    }
    let repository = Repository::new(cli.repo.as_str(), server);
    Ok(Workspace::new(cli.workspacename.as_str(), repository))
}

/// The single `--file`, or the regular files directly inside `--dir` in name order.
pub(crate) fn collect_files(cli: &Cli) -> Result<Vec<PathBuf>> {
    match (&cli.file, &cli.dir) {
        (Some(file), _) => Ok(vec![file.clone()]),
        (None, Some(dir)) => list_directory(dir),
        (None, None) => bail!("either --file or --dir is required"),
    }
}

fn list_directory(dir: &Path) -> Result<Vec<PathBuf>> {
    if !dir.is_dir() {
        bail!("{} is not a directory", dir.display());
    }
    let mut files = Vec::new();
    for entry in WalkDir::new(dir)
        .min_depth(1)
        .max_depth(1)
        .sort_by_file_name()
    {
        let entry = entry.with_context(|| format!("failed to list {}", dir.display()))?;
        if entry.file_type().is_file() {
            files.push(entry.into_path());
        }
    }
    Ok(files)
}

fn report(out: &mut impl Write, operation: &str, file: &Path, status: &Status) -> Result<()> {
    let mut line = json!({
        "file": file.display().to_string(),
        "status": serde_json::to_value(status)?,
    });
    if let Some(cause) = &status.cause {
        line["error"] = serde_json::to_value(cause.to_payload(operation, None))?;
    }
    writeln!(out, "{}", serde_json::to_string(&line)?)?;
    Ok(())
}
