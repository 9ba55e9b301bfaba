//! A [`NodeHandle`] for a coordination server running as a local process.
//!
//! The node's filesystem is emulated by a root directory: an absolute node
//! path such as `/etc/clickhouse-server/config.d/ssl_conf.yml` lives at
//! `<root_dir>/etc/clickhouse-server/config.d/ssl_conf.yml`. Absolute paths in
//! the start command and in executed commands are mapped the same way, so the
//! server reads the files the harness writes. The server's stdout and stderr
//! are appended to a log file that log waits poll.

use std::fs::OpenOptions;
use std::path::Path;
use std::path::PathBuf;
use std::process::Stdio;
use std::time::Duration;

use async_trait::async_trait;
use tokio::process::Child;
use tokio::process::Command;
use tokio::sync::Mutex;
use tokio::time;
use tracing::debug;
use tracing::info;
use tracing::warn;

use crate::file_io::copy_file;
use crate::file_io::create_parent_dir_if_not_exist;
use crate::file_io::read_to_string_or_empty;
use crate::file_io::rebase_under;
use crate::file_io::replace_in_file;
use crate::LocalNodeConfig;
use crate::LogPattern;
use crate::NodeHandle;
use crate::Result;
use crate::SetupError;
use crate::SystemError;
use crate::TimeoutError;

const DEFAULT_LOG_POLL_INTERVAL: Duration = Duration::from_millis(200);

/// Commands run with the root as working directory, so mapped paths must not
/// be relative to it.
fn absolute_root(root_dir: &Path) -> PathBuf {
    if root_dir.is_absolute() {
        return root_dir.to_path_buf();
    }
    match std::env::current_dir() {
        Ok(cwd) => cwd.join(root_dir),
        Err(e) => {
            warn!("cannot resolve {}: {}", root_dir.display(), e);
            root_dir.to_path_buf()
        }
    }
}

pub struct LocalNode {
    name: String,
    root_dir: PathBuf,
    log_file: PathBuf,
    start_command: Vec<String>,
    log_poll_interval: Duration,
    child: Mutex<Option<Child>>,
}

impl LocalNode {
    pub fn new(
        name: impl Into<String>,
        config: &LocalNodeConfig,
    ) -> Self {
        Self {
            name: name.into(),
            root_dir: absolute_root(&config.root_dir),
            log_file: config.log_file.clone(),
            start_command: config.start_command.clone(),
            log_poll_interval: DEFAULT_LOG_POLL_INTERVAL,
            child: Mutex::new(None),
        }
    }

    pub fn with_log_poll_interval(
        mut self,
        interval: Duration,
    ) -> Self {
        self.log_poll_interval = interval;
        self
    }

    /// Where a node path lives on the harness host
    pub fn host_path(
        &self,
        remote_path: &Path,
    ) -> PathBuf {
        rebase_under(&self.root_dir, remote_path)
    }

    fn host_argv(
        &self,
        argv: &[String],
    ) -> Vec<String> {
        argv.iter()
            .enumerate()
            .map(|(i, arg)| {
                if i > 0 && arg.starts_with('/') {
                    self.host_path(Path::new(arg)).display().to_string()
                } else {
                    arg.clone()
                }
            })
            .collect()
    }

    fn start_failed(
        &self,
        reason: impl ToString,
    ) -> SetupError {
        SetupError::NodeStartFailed {
            node: self.name.clone(),
            reason: reason.to_string(),
        }
    }
}

#[async_trait]
impl NodeHandle for LocalNode {
    async fn copy_config_file(
        &self,
        local_path: &Path,
        remote_path: &Path,
    ) -> Result<()> {
        copy_file(local_path, &self.host_path(remote_path)).await
    }

    async fn patch_config_file(
        &self,
        remote_path: &Path,
        find: &str,
        replace: &str,
    ) -> Result<()> {
        replace_in_file(&self.host_path(remote_path), find, replace).await
    }

    async fn exec_command(
        &self,
        argv: &[String],
    ) -> Result<String> {
        let host_argv = self.host_argv(argv);
        let (program, args) = match host_argv.split_first() {
            Some(split) => split,
            None => {
                return Err(SystemError::CommandFailed {
                    node: self.name.clone(),
                    argv: Vec::new(),
                    status: "not run".into(),
                    stderr: "empty command".into(),
                }
                .into())
            }
        };

        debug!("[{}] exec {:?}", self.name, host_argv);
        tokio::fs::create_dir_all(&self.root_dir).await?;
        let output = Command::new(program).args(args).current_dir(&self.root_dir).output().await?;

        if !output.status.success() {
            return Err(SystemError::CommandFailed {
                node: self.name.clone(),
                argv: argv.to_vec(),
                status: output.status.to_string(),
                stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
            }
            .into());
        }

        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }

    async fn start(&self) -> Result<()> {
        let mut guard = self.child.lock().await;

        if let Some(child) = guard.as_mut() {
            if child.try_wait()?.is_none() {
                debug!("[{}] already running", self.name);
                return Ok(());
            }
        }

        let host_argv = self.host_argv(&self.start_command);
        let (program, args) = host_argv.split_first().ok_or_else(|| self.start_failed("empty start command"))?;

        tokio::fs::create_dir_all(&self.root_dir).await?;
        create_parent_dir_if_not_exist(&self.log_file).await?;
        let log = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.log_file)
            .map_err(|e| self.start_failed(e))?;
        let log_err = log.try_clone().map_err(|e| self.start_failed(e))?;

        let child = Command::new(program)
            .args(args)
            .current_dir(&self.root_dir)
            .env("NODE_NAME", &self.name)
            .env("NODE_ROOT", &self.root_dir)
            .stdin(Stdio::null())
            .stdout(Stdio::from(log))
            .stderr(Stdio::from(log_err))
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| self.start_failed(e))?;

        info!("[{}] started (pid {:?})", self.name, child.id());
        *guard = Some(child);
        Ok(())
    }

    async fn stop(&self) -> Result<()> {
        let mut guard = self.child.lock().await;

        let Some(mut child) = guard.take() else {
            debug!("[{}] already stopped", self.name);
            return Ok(());
        };

        if child.try_wait()?.is_some() {
            warn!("[{}] process had already exited", self.name);
            return Ok(());
        }

        child.kill().await.map_err(|e| SetupError::NodeStopFailed {
            node: self.name.clone(),
            reason: e.to_string(),
        })?;
        info!("[{}] stopped", self.name);
        Ok(())
    }

    async fn wait_for_log_line(
        &self,
        pattern: &LogPattern,
        look_back_lines: usize,
        timeout: Duration,
    ) -> Result<()> {
        let scan = async {
            loop {
                let content = read_to_string_or_empty(&self.log_file).await?;
                if pattern.scan_recent(&content, look_back_lines) {
                    return Ok::<(), crate::Error>(());
                }
                time::sleep(self.log_poll_interval).await;
            }
        };

        match time::timeout(timeout, scan).await {
            Ok(r) => r,
            Err(_) => Err(TimeoutError::LogMarker {
                node: self.name.clone(),
                pattern: pattern.to_string(),
                look_back_lines,
                timeout,
            }
            .into()),
        }
    }
}
