use std::path::Component;
use std::path::Path;
use std::path::PathBuf;

use tokio::fs;
use tracing::debug;
use tracing::error;

use crate::Result;
use crate::SystemError;

fn path_error(
    path: &Path,
    source: std::io::Error,
) -> SystemError {
    SystemError::PathError {
        path: path.to_path_buf(),
        source,
    }
}

pub(crate) async fn create_parent_dir_if_not_exist(path: &Path) -> Result<()> {
    if let Some(parent_dir) = path.parent() {
        if !parent_dir.as_os_str().is_empty() && !fs::try_exists(parent_dir).await.unwrap_or(false)
        {
            if let Err(e) = fs::create_dir_all(parent_dir).await {
                error!("Failed to create directory {:?}: {:?}", parent_dir, e);
                return Err(path_error(parent_dir, e).into());
            }
        }
    }
    Ok(())
}

/// Copies `from` to `to`, creating the destination's parent directories
pub(crate) async fn copy_file(
    from: &Path,
    to: &Path,
) -> Result<()> {
    create_parent_dir_if_not_exist(to).await?;
    fs::copy(from, to).await.map_err(|e| path_error(from, e))?;
    debug!("copied {:?} -> {:?}", from, to);
    Ok(())
}

/// Replaces every occurrence of `find` in the file at `path`
pub(crate) async fn replace_in_file(
    path: &Path,
    find: &str,
    replace: &str,
) -> Result<()> {
    let content = fs::read_to_string(path).await.map_err(|e| path_error(path, e))?;
    let patched = content.replace(find, replace);
    fs::write(path, patched).await.map_err(|e| path_error(path, e))?;
    Ok(())
}

/// Reads a file that may not exist yet; a missing file reads as empty
pub(crate) async fn read_to_string_or_empty(path: &Path) -> Result<String> {
    match fs::read(path).await {
        Ok(bytes) => Ok(String::from_utf8_lossy(&bytes).into_owned()),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(String::new()),
        Err(e) => Err(path_error(path, e).into()),
    }
}

/// Maps an absolute node path like `/etc/x.yml` beneath `root`.
///
/// `..` components are dropped so the result never escapes `root`.
pub(crate) fn rebase_under(
    root: &Path,
    path: &Path,
) -> PathBuf {
    let mut rebased = root.to_path_buf();
    for component in path.components() {
        if let Component::Normal(part) = component {
            rebased.push(part);
        }
    }
    rebased
}
