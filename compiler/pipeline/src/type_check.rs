//! Batch launch of the external type checker.

use std::io::{self, Read};
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use config::TypeCheckConfig;
use wait_timeout::ChildExt;

use crate::{PipelineError, Result};

/// Checks every file in `files` with one launch of the configured program.
///
/// Nothing is launched when `files` is empty.
pub async fn type_check(config: &TypeCheckConfig, cwd: &Path, files: Vec<PathBuf>) -> Result<()> {
    if files.is_empty() {
        return Ok(());
    }

    let program = which::which(&config.program)
        .map_err(|_| PipelineError::TypeCheckerMissing(config.program.clone()))?;
    tracing::info!(program = %program.display(), files = files.len(), "launching type checker");

    let args = config.args.clone();
    let timeout = config.timeout_secs;
    let cwd = cwd.to_path_buf();
    tokio::task::spawn_blocking(move || launch(&program, &args, &cwd, &files, timeout))
        .await
        .map_err(|e| PipelineError::Message(format!("type checker task failed: {}", e)))?
}

fn launch(
    program: &Path,
    args: &[String],
    cwd: &Path,
    files: &[PathBuf],
    timeout_secs: u64,
) -> Result<()> {
    let mut child = Command::new(program)
        .args(args)
        .args(files)
        .current_dir(cwd)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()?;

    // Both pipes are drained while waiting so a chatty checker never blocks on write.
    let stdout = drain(child.stdout.take());
    let stderr = drain(child.stderr.take());

    let status = match child.wait_timeout(Duration::from_secs(timeout_secs))? {
        Some(status) => status,
        None => {
            child.kill()?;
            child.wait()?;
            tracing::error!(timeout_secs, "type checker timed out");
            return Err(PipelineError::TypeCheckTimeout(timeout_secs));
        }
    };

    let mut output = collect(stdout)?;
    output.push_str(&collect(stderr)?);
    if status.success() {
        logging::debug("pipeline", "type check passed");
        return Ok(());
    }

    tracing::error!(%status, bytes = output.len(), "type check failed");
    Err(PipelineError::TypeCheckFailed { status: status.to_string(), output })
}

fn drain<R: Read + Send + 'static>(pipe: Option<R>) -> JoinHandle<io::Result<Vec<u8>>> {
    thread::spawn(move || {
        let mut buf = Vec::new();
        if let Some(mut pipe) = pipe {
            pipe.read_to_end(&mut buf)?;
        }
        Ok(buf)
    })
}

fn collect(reader: JoinHandle<io::Result<Vec<u8>>>) -> Result<String> {
    let bytes = reader
        .join()
        .map_err(|_| PipelineError::Message("type checker output reader panicked".to_string()))??;
    Ok(String::from_utf8_lossy(&bytes).into_owned())
}
