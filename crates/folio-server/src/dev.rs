//! Dev server: build, serve, watch, rebuild.

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use folio_config::{CliSettings, Config};
use folio_site::SiteBuilder;
use notify::{Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use tokio::sync::mpsc;

use crate::debouncer::{ChangeDebouncer, FsEvent, FsEventKind};
use crate::{ServeError, ServeOptions, app};

/// Quiet period before a batch of changes triggers a rebuild.
const DEBOUNCE: Duration = Duration::from_millis(200);

/// Run the dev server until Ctrl+C.
///
/// The site is built with drafts into `.folio/dev` and rebuilt on every
/// change. Build failures are logged and the previous output stays served.
/// `settings` are re-applied when the config file changes.
///
/// # Errors
///
/// Returns an error if the output directory can't be created, the watcher
/// can't be set up, or the server fails.
pub async fn start(config: Config, settings: CliSettings) -> Result<(), ServeError> {
    let site_dir = config.paths.dev_dir();
    tokio::fs::create_dir_all(&site_dir).await?;
    let options = ServeOptions::from_config(&config, site_dir.clone());
    let targets = WatchTargets::from_config(&config);
    let config = Arc::new(config);

    rebuild(Arc::clone(&config), site_dir.clone()).await?;

    let (tx, rx) = mpsc::channel::<Event>(256);
    let _watcher = targets.watch(tx)?;

    let session = DevSession {
        config,
        settings,
        site_dir,
        targets,
    };
    let watch_task = tokio::spawn(session.run(rx));

    let result = async {
        let listener = crate::bind(&options).await?;
        let router = app::create_router(&options.site_dir, &options.base_url);
        crate::run(listener, router).await
    }
    .await;
    watch_task.abort();
    result
}

/// Build the site into `site_dir`, logging the outcome.
async fn rebuild(config: Arc<Config>, site_dir: PathBuf) -> Result<(), ServeError> {
    let result = tokio::task::spawn_blocking(move || {
        SiteBuilder::new(&config)
            .with_drafts(true)
            .with_out_dir(site_dir)
            .build()
    })
    .await?;

    match result {
        Ok(report) => tracing::info!(
            pages = report.pages,
            written = report.written.written,
            warnings = report.warnings.len(),
            "Dev build finished"
        ),
        Err(e) => tracing::error!(error = %e, "Dev build failed"),
    }
    Ok(())
}

/// Paths whose changes trigger a rebuild.
#[derive(Debug)]
struct WatchTargets {
    source_dir: PathBuf,
    /// Sidebar and config files.
    files: Vec<PathBuf>,
    config_file: Option<PathBuf>,
    /// Output directories, ignored even when inside the docs directory.
    outputs: Vec<PathBuf>,
}

impl WatchTargets {
    fn from_config(config: &Config) -> Self {
        let config_file = config.config_path.as_deref().map(canonical);
        let mut files = vec![canonical(&config.paths.sidebar_path)];
        files.extend(config_file.clone());
        Self {
            source_dir: canonical(&config.paths.source_dir),
            files,
            config_file,
            outputs: vec![
                canonical(&config.paths.project_dir),
                canonical(&config.paths.out_dir),
            ],
        }
    }

    /// Start watching. Events are forwarded to `tx` until the watcher drops.
    fn watch(&self, tx: mpsc::Sender<Event>) -> Result<RecommendedWatcher, ServeError> {
        let mut watcher = notify::recommended_watcher(move |res: Result<Event, notify::Error>| {
            match res {
                Ok(event) => {
                    let _ = tx.blocking_send(event);
                }
                Err(e) => tracing::warn!(error = %e, "File watcher error"),
            }
        })?;

        if self.source_dir.is_dir() {
            watcher.watch(&self.source_dir, RecursiveMode::Recursive)?;
        } else {
            tracing::warn!(path = %self.source_dir.display(), "Docs directory not found, not watching it");
        }
        // Watch the parent so files replaced by rename keep being seen.
        let parents: BTreeSet<&Path> = self.files.iter().filter_map(|f| f.parent()).collect();
        for dir in parents {
            if dir.is_dir() && !dir.starts_with(&self.source_dir) {
                watcher.watch(dir, RecursiveMode::NonRecursive)?;
            }
        }
        tracing::debug!(source_dir = %self.source_dir.display(), "Watching for changes");
        Ok(watcher)
    }

    fn is_relevant(&self, path: &Path) -> bool {
        if self.files.iter().any(|f| f == path) {
            return true;
        }
        path.starts_with(&self.source_dir) && !self.outputs.iter().any(|o| path.starts_with(o))
    }

    fn is_config(&self, path: &Path) -> bool {
        self.config_file.as_deref() == Some(path)
    }
}

fn canonical(path: &Path) -> PathBuf {
    path.canonicalize().unwrap_or_else(|_| path.to_path_buf())
}

fn event_kind(kind: EventKind) -> Option<FsEventKind> {
    match kind {
        EventKind::Create(_) => Some(FsEventKind::Created),
        EventKind::Modify(_) => Some(FsEventKind::Modified),
        EventKind::Remove(_) => Some(FsEventKind::Removed),
        _ => None,
    }
}

/// State of the watch loop.
struct DevSession {
    config: Arc<Config>,
    settings: CliSettings,
    site_dir: PathBuf,
    targets: WatchTargets,
}

impl DevSession {
    async fn run(mut self, mut events: mpsc::Receiver<Event>) {
        let mut debouncer = ChangeDebouncer::new(DEBOUNCE);
        loop {
            let deadline = debouncer.deadline();
            let wake = deadline.map_or_else(tokio::time::Instant::now, tokio::time::Instant::from_std);
            tokio::select! {
                event = events.recv() => {
                    let Some(event) = event else { break };
                    self.record(&event, &mut debouncer);
                }
                () = tokio::time::sleep_until(wake), if deadline.is_some() => {
                    if let Some(changes) = debouncer.take_ready(std::time::Instant::now()) {
                        self.apply(&changes).await;
                    }
                }
            }
        }
    }

    fn record(&self, event: &Event, debouncer: &mut ChangeDebouncer) {
        let Some(kind) = event_kind(event.kind) else {
            return;
        };
        let now = std::time::Instant::now();
        for path in event.paths.iter().filter(|p| self.targets.is_relevant(p)) {
            tracing::debug!(path = %path.display(), ?kind, "Recorded filesystem event");
            debouncer.record(path.clone(), kind, now);
        }
    }

    async fn apply(&mut self, changes: &[FsEvent]) {
        for change in changes {
            tracing::info!(path = %change.path.display(), kind = ?change.kind, "Change detected");
        }
        if changes.iter().any(|c| self.targets.is_config(&c.path)) {
            self.reload_config();
        }
        if let Err(e) = rebuild(Arc::clone(&self.config), self.site_dir.clone()).await {
            tracing::error!(error = %e, "Dev build failed");
        }
    }

    fn reload_config(&mut self) {
        match Config::load(self.config.config_path.as_deref(), Some(&self.settings)) {
            Ok(config) => {
                if config.base_url != self.config.base_url
                    || config.server.port != self.config.server.port
                    || config.server.host != self.config.server.host
                {
                    tracing::warn!("Server address or base_url changed, restart to apply");
                }
                self.config = Arc::new(config);
                tracing::info!("Reloaded configuration");
            }
            Err(e) => tracing::warn!(error = %e, "Keeping previous configuration"),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::fs;

    use notify::event::{AccessKind, CreateKind, ModifyKind, RemoveKind};

    use super::*;
    use pretty_assertions::assert_eq;

    const CONFIG: &str = r#"
title = "Tutorials"
url = "https://example.github.io"
"#;

    fn project() -> (tempfile::TempDir, Config) {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path().canonicalize().unwrap();
        fs::write(root.join("folio.toml"), CONFIG).unwrap();
        fs::write(root.join("sidebars.yaml"), "docs:\n  - intro\n").unwrap();
        fs::create_dir_all(root.join("docs")).unwrap();
        fs::write(root.join("docs/intro.md"), "# Intro\n").unwrap();
        fs::write(root.join("docs/wip.md"), "---\ndraft: true\n---\n# WIP\n").unwrap();
        let config = Config::load(Some(root.join("folio.toml").as_path()), None).unwrap();
        (dir, config)
    }

    #[test]
    fn test_event_kinds() {
        assert_eq!(
            event_kind(EventKind::Create(CreateKind::File)),
            Some(FsEventKind::Created)
        );
        assert_eq!(
            event_kind(EventKind::Modify(ModifyKind::Any)),
            Some(FsEventKind::Modified)
        );
        assert_eq!(
            event_kind(EventKind::Remove(RemoveKind::File)),
            Some(FsEventKind::Removed)
        );
        assert_eq!(event_kind(EventKind::Access(AccessKind::Any)), None);
    }

    #[test]
    fn test_watch_targets() {
        let (dir, config) = project();
        let root = dir.path().canonicalize().unwrap();
        let targets = WatchTargets::from_config(&config);

        assert!(targets.is_relevant(&root.join("docs/intro.md")));
        assert!(targets.is_relevant(&root.join("docs/new/page.md")));
        assert!(targets.is_relevant(&root.join("sidebars.yaml")));
        assert!(targets.is_relevant(&root.join("folio.toml")));
        assert!(!targets.is_relevant(&root.join("README.md")));
        assert!(!targets.is_relevant(&root.join(".folio/dev/index.html")));

        assert!(targets.is_config(&root.join("folio.toml")));
        assert!(!targets.is_config(&root.join("sidebars.yaml")));
    }

    #[test]
    fn test_outputs_inside_docs_ignored() {
        let (dir, mut config) = project();
        let root = dir.path().canonicalize().unwrap();
        config.paths.out_dir = root.join("docs/build");
        fs::create_dir_all(&config.paths.out_dir).unwrap();
        let targets = WatchTargets::from_config(&config);
        assert!(!targets.is_relevant(&root.join("docs/build/index.html")));
    }

    #[tokio::test]
    async fn test_rebuild_includes_drafts() {
        let (dir, config) = project();
        let site_dir = config.paths.dev_dir();
        rebuild(Arc::new(config), site_dir.clone()).await.unwrap();

        assert!(site_dir.join("docs/intro/index.html").is_file());
        assert!(site_dir.join("docs/wip/index.html").is_file());
        assert!(site_dir.starts_with(dir.path().canonicalize().unwrap()));
    }

    #[tokio::test]
    async fn test_rebuild_failure_is_not_fatal() {
        let (dir, config) = project();
        fs::write(
            dir.path().join("docs/intro.md"),
            "# Intro\n\n[gone](./missing.md)\n[also gone](/docs/missing/)\n",
        )
        .unwrap();
        let site_dir = config.paths.dev_dir();
        assert!(rebuild(Arc::new(config), site_dir.clone()).await.is_ok());
        assert!(!site_dir.join("index.html").exists());
    }

    #[tokio::test]
    async fn test_config_change_reloads() {
        let (dir, config) = project();
        let root = dir.path().canonicalize().unwrap();
        let targets = WatchTargets::from_config(&config);
        let mut session = DevSession {
            site_dir: config.paths.dev_dir(),
            config: Arc::new(config),
            settings: CliSettings::default(),
            targets,
        };

        fs::write(
            root.join("folio.toml"),
            format!("{CONFIG}tagline = \"Learn things\"\n"),
        )
        .unwrap();
        session
            .apply(&[FsEvent {
                path: root.join("folio.toml"),
                kind: FsEventKind::Modified,
            }])
            .await;
        assert_eq!(session.config.tagline, "Learn things");
        assert!(session.site_dir.join("index.html").is_file());
    }
}
