use std::{
    env,
    path::{Path, PathBuf},
};

/// Returns the workspace root, the parent of the calling crate's
/// `CARGO_MANIFEST_DIR`.
///
/// Only meaningful when launched through cargo; deployed binaries should set
/// `NIRAMAY_CONFIG_DIR` instead (see [`config_dir`]).
pub fn workspace_dir() -> crate::Result<PathBuf> {
    let manifest_dir = env::var("CARGO_MANIFEST_DIR").map_err(|e| {
        crate::Error::Config(
            anyhow::Error::new(e).context("CARGO_MANIFEST_DIR is not set"),
        )
    })?;
    Path::new(&manifest_dir)
        .parent()
        .map(Path::to_path_buf)
        .ok_or_else(|| {
            crate::Error::Config(anyhow::anyhow!(
                "manifest dir {} has no parent",
                manifest_dir
            ))
        })
}

/// Directory holding `default.toml` and the per-environment layers.
pub fn config_dir() -> crate::Result<PathBuf> {
    match env::var("NIRAMAY_CONFIG_DIR") {
        Ok(dir) => Ok(PathBuf::from(dir)),
        Err(_) => Ok(workspace_dir()?.join("configs")),
    }
}
