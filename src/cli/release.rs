//! cli::release
//!
//! The release command: classify commits, then reconcile the release.
//!
//! # Flow
//!
//! 1. Resolve owner, repository and token (fails before any prompt)
//! 2. Ask the user to classify commits (interactive only). Commits come from
//!    the local repository, or from the forge when `PATH` was omitted and the
//!    current directory is not inside a repository
//! 3. Render the release body and build the request
//! 4. Reconcile; Ctrl-C cancels the in-flight step

use std::io;

use anyhow::{anyhow, Context as _, Result};
use log::{debug, info, warn};
use tokio::runtime::Runtime;
use tokio_util::sync::CancellationToken;

use crate::cli::args::{Cli, Target};
use crate::core::changes::ChangeSet;
use crate::core::config::{process_env, resolve_forge_config, Config, ForgeOverrides};
use crate::engine::{Context, ReconcileAction, ReleaseReconciler};
use crate::forge::github::GitHubForge;
use crate::forge::{Forge, ReleaseRequest};
use crate::git::{CommitInfo, Git, GitError};
use crate::ui::output::{self, Verbosity};
use crate::ui::{prompts, release_notes};

/// Where the commits to classify come from.
#[derive(Debug)]
enum CommitSource<'a> {
    Local(&'a Git),
    Remote,
}

/// Run the release command.
pub fn release(cli: &Cli, ctx: &Context) -> Result<()> {
    let verbosity = Verbosity::from_flags(ctx.quiet, ctx.debug);
    let target = cli.target()?;
    let env = process_env;

    let config = Config::load(&env)?;
    if let Some(path) = config.loaded_from() {
        debug!("using config {}", path.display());
    }
    let interactive = cli.force_interactive || (ctx.interactive && config.interactive());

    let repo = Git::open(target.repo_path());
    if let Err(e) = &repo {
        debug!("no repository at {}: {}", target.repo_path().display(), e);
    }

    let overrides = ForgeOverrides {
        owner: cli.owner.clone(),
        repo: cli.repository.clone(),
        token: cli.token.clone(),
    };
    let forge_config = resolve_forge_config(&overrides, &config, repo.as_ref().ok(), &env)?;
    let forge = GitHubForge::new(forge_config).context("failed to set up GitHub client")?;
    debug!("using GitHub API at {}", forge.api_base());

    let rt = Runtime::new()?;

    let body = if interactive {
        let changes = match commit_source(&repo, &target)? {
            CommitSource::Local(git) => classify(git.commits()?)?,
            CommitSource::Remote => {
                info!(
                    "no local repository, listing commits from {}/{}",
                    forge.owner(),
                    forge.repo()
                );
                let commits = rt
                    .block_on(forge.list_commits(cli.commitish.as_deref()))
                    .context("failed to list commits")?;
                classify(commits.into_iter().map(Ok))?
            }
        };
        if changes.is_empty() {
            output::warn("no commits were classified; the release notes are empty", verbosity);
        }
        release_notes::render_body(&changes)
    } else {
        info!("non-interactive mode, releasing without notes");
        String::new()
    };

    let request = build_request(cli, &target, body)?;
    output::print(
        format!(
            "Releasing {} on {}/{}",
            request.tag(),
            forge.owner(),
            forge.repo()
        ),
        verbosity,
    );

    let outcome = rt.block_on(async {
        let cancel = CancellationToken::new();
        let on_signal = cancel.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                warn!("interrupted, cancelling");
                on_signal.cancel();
            }
        });

        ReleaseReconciler::new(&forge)
            .reconcile(&request, cli.recreate, &cancel)
            .await
    })?;

    debug!("release {} {}", outcome.release.id, outcome.action);
    match outcome.action {
        ReconcileAction::Reused => output::warn(
            format!(
                "release for '{}' already exists; reusing it (notes not updated, pass --recreate to replace)",
                request.tag()
            ),
            verbosity,
        ),
        action => output::print(format!("Release '{}' {}", request.tag(), action), verbosity),
    }
    output::success(
        format!("Release success! {}", outcome.release.html_url),
        verbosity,
    );
    Ok(())
}

/// Pick the commit source. A `PATH` given explicitly must be a repository.
fn commit_source<'a>(repo: &'a Result<Git, GitError>, target: &Target) -> Result<CommitSource<'a>> {
    match (repo, &target.path) {
        (Ok(git), _) => Ok(CommitSource::Local(git)),
        (Err(_), None) => Ok(CommitSource::Remote),
        (Err(e), Some(path)) => Err(anyhow!(
            "cannot read commits from '{}': {}",
            path.display(),
            e
        )),
    }
}

/// Ask the user to classify `commits` on the terminal.
fn classify<I>(commits: I) -> Result<ChangeSet>
where
    I: IntoIterator<Item = Result<CommitInfo, GitError>>,
{
    let stdin = io::stdin();
    let mut input = stdin.lock();
    let mut stdout = io::stdout();

    let changes = prompts::classify_commits(commits, true, &mut input, &mut stdout)?;
    debug!(
        "{} commits classified, {} reported",
        changes.reported_len() + changes.ignored.len(),
        changes.reported_len()
    );
    Ok(changes)
}

fn build_request(cli: &Cli, target: &Target, body: String) -> Result<ReleaseRequest> {
    let mut request = ReleaseRequest::new(target.tag.as_str())?
        .with_draft(cli.draft)
        .with_prerelease(cli.prerelease)
        .with_body(body);
    if let Some(name) = cli.name.as_deref().filter(|n| !n.trim().is_empty()) {
        request = request.with_name(name);
    }
    if let Some(commitish) = &cli.commitish {
        request = request.with_target_commitish(commitish.as_str());
    }
    Ok(request)
}
