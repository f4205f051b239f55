//! `smudge watch`: drive a [`Reconciler`] from a polled file.

use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use anyhow::{Context, bail};
use smudge_core::{Config, DocumentView, LineRanges, Reconciler, VisibleEditor};
use smudge_primitives::{LineKind, SurfaceId};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::cli::WatchArgs;
use crate::host::ConsoleHost;

const SURFACE: SurfaceId = SurfaceId(0);

pub async fn run(args: WatchArgs) -> anyhow::Result<()> {
	let config = resolve_config(args.config.as_deref(), default_config_path().as_deref())?;
	let differ = config.build_differ().context("preparing line differ")?;
	let mut reconciler = Reconciler::new(config, differ);
	let mut host = ConsoleHost::default();

	let root = args.file.parent().filter(|p| !p.as_os_str().is_empty()).unwrap_or(Path::new("."));
	if reconciler.set_workspace_root(root, &mut host) {
		bail!("tracking is disabled in version-controlled workspaces ({})", root.display());
	}

	let mut last = read(&args.file).await?;
	let mut view = DocumentView::file(&args.file, &last);
	reconciler.on_active_editor_changed(
		Some(VisibleEditor {
			surface: SURFACE,
			document: view.clone(),
		}),
		&mut host,
	);
	if !reconciler.is_tracked(&view.id) {
		bail!("{} is not trackable", args.file.display());
	}
	info!(file = %args.file.display(), "smudge.watch.start");

	let cancel = CancellationToken::new();
	tokio::spawn({
		let cancel = cancel.clone();
		async move {
			if tokio::signal::ctrl_c().await.is_ok() {
				cancel.cancel();
			}
		}
	});

	let mut poll = tokio::time::interval(Duration::from_millis(args.poll_ms.max(1)));
	let mut printed = LineRanges::default();

	loop {
		let deadline = reconciler.next_deadline();
		tokio::select! {
			_ = cancel.cancelled() => break,
			_ = poll.tick() => {
				match tokio::fs::read_to_string(&args.file).await {
					Ok(current) if current != last => {
						view = view.edited(&current);
						last = current;
						reconciler.on_content_changed(view.clone(), Instant::now(), &mut host)?;
					}
					Ok(_) => {}
					Err(err) => warn!(file = %args.file.display(), error = %err, "smudge.watch.read_failed"),
				}
			}
			_ = sleep_until(deadline) => {}
		}

		let stats = reconciler.tick(Instant::now(), &mut host);
		if stats.started > 0 {
			let settled = reconciler.settle(&mut host).await;
			debug!(
				applied = settled.applied,
				failed = settled.failed,
				has_markers = host.has_markers(&view.id),
				"smudge.watch.settled"
			);
		}

		if let Some(ranges) = reconciler.ranges(&view.id)
			&& *ranges != printed
		{
			print!("{}", render_markers(&args.file, ranges));
			printed = ranges.clone();
		}
	}

	reconciler.shutdown(&mut host);
	info!(live_styles = host.live_styles(), "smudge.watch.stop");
	Ok(())
}

async fn read(path: &Path) -> anyhow::Result<String> {
	tokio::fs::read_to_string(path)
		.await
		.with_context(|| format!("reading {}", path.display()))
}

async fn sleep_until(deadline: Option<Instant>) {
	match deadline {
		Some(deadline) => tokio::time::sleep_until(deadline.into()).await,
		None => std::future::pending().await,
	}
}

/// `$XDG_CONFIG_HOME/smudge/config.toml` or the platform equivalent.
fn default_config_path() -> Option<PathBuf> {
	dirs::config_dir().map(|dir| dir.join("smudge").join("config.toml"))
}

/// An explicit path must load; the default path is used only if it exists.
fn resolve_config(explicit: Option<&Path>, fallback: Option<&Path>) -> anyhow::Result<Config> {
	let path = match (explicit, fallback) {
		(Some(path), _) => path,
		(None, Some(path)) if path.exists() => path,
		_ => return Ok(Config::default()),
	};
	Config::load(path).with_context(|| format!("loading config {}", path.display()))
}

/// Marker lines per kind, 1-based, or `clean`.
fn render_markers(file: &Path, ranges: &LineRanges) -> String {
	if ranges.is_empty() {
		return format!("{}: clean\n", file.display());
	}
	let mut out = String::new();
	for kind in LineKind::ALL {
		let lines = ranges.lines(kind);
		if lines.is_empty() {
			continue;
		}
		let list: Vec<String> = lines.iter().map(|line| (line + 1).to_string()).collect();
		out.push_str(&format!("{}: {} {}\n", file.display(), kind.name(), list.join(",")));
	}
	out
}
