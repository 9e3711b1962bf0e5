//! Upload through the AWS command line interface.
//!
//! The child process never sees the caller's AWS credentials: the
//! credential variables are removed from its environment and its config
//! and credentials files point into an empty scratch directory. The
//! parent environment and `~/.aws` are left untouched.

use std::ffi::OsString;
use std::path::Path;
use std::process::Output;

use tempfile::TempDir;
use tokio::process::Command;
use tracing::{debug, info, instrument};

use crate::error::{Result, SubmitError};
use crate::options::SubmitOptions;

/// Variables removed from the child environment.
pub const ISOLATED_ENV_VARS: [&str; 5] = [
    "AWS_ACCESS_KEY_ID",
    "AWS_SECRET_ACCESS_KEY",
    "AWS_SESSION_TOKEN",
    "AWS_DEFAULT_PROFILE",
    "AWS_PROFILE",
];

/// Submissions bucket on the challenge endpoint.
pub const SUBMISSIONS_BUCKET: &str = "submissions";

/// An AWS CLI program run with isolated credentials.
pub struct AwsCli {
    program: String,
    scratch: TempDir,
}

impl AwsCli {
    pub fn new(program: impl Into<String>) -> Result<Self> {
        let scratch = tempfile::Builder::new().prefix("aws-isolated-").tempdir()?;
        Ok(Self {
            program: program.into(),
            scratch,
        })
    }

    pub fn program(&self) -> &str {
        &self.program
    }

    /// Command for `args` with credential isolation applied.
    pub fn command<I, S>(&self, args: I) -> Command
    where
        I: IntoIterator<Item = S>,
        S: Into<OsString>,
    {
        let mut command = Command::new(&self.program);
        command.args(args.into_iter().map(Into::into));
        for var in ISOLATED_ENV_VARS {
            command.env_remove(var);
        }
        command
            .env("AWS_CONFIG_FILE", self.scratch.path().join("config"))
            .env(
                "AWS_SHARED_CREDENTIALS_FILE",
                self.scratch.path().join("credentials"),
            )
            .kill_on_drop(true);
        command
    }

    async fn run<I, S>(&self, args: I) -> std::io::Result<Output>
    where
        I: IntoIterator<Item = S>,
        S: Into<OsString>,
    {
        self.command(args).output().await
    }

    /// Fail unless `<program> --version` runs successfully.
    pub async fn check_available(&self) -> Result<String> {
        let unavailable = |message: String| SubmitError::CliUnavailable {
            program: self.program.clone(),
            message,
        };

        let output = self
            .run(["--version"])
            .await
            .map_err(|e| unavailable(e.to_string()))?;
        if !output.status.success() {
            return Err(unavailable(
                String::from_utf8_lossy(&output.stderr).trim().to_string(),
            ));
        }

        let version = String::from_utf8_lossy(&output.stdout).trim().to_string();
        debug!(program = %self.program, version = %version, "AWS CLI available");
        Ok(version)
    }

    /// Copy a file to the submissions bucket without signing the request.
    #[instrument(skip(self, options), fields(program = %self.program))]
    pub async fn copy(
        &self,
        forecast_file: &Path,
        project_id: &str,
        options: &SubmitOptions,
    ) -> Result<String> {
        let output = self
            .run(upload_args(forecast_file, project_id, options)?)
            .await?;

        if !output.status.success() {
            return Err(SubmitError::UploadFailed {
                status: output.status.code(),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }

        let stdout = String::from_utf8_lossy(&output.stdout).trim().to_string();
        info!(stdout = %stdout, "Thank you for submitting!");
        Ok(stdout)
    }
}

/// Object key under the submissions bucket: `{project_id}/{basename}`.
pub fn destination(forecast_file: &Path, project_id: &str) -> Result<String> {
    let name = forecast_file
        .file_name()
        .ok_or(SubmitError::MissingArgument("forecast_file"))?;
    Ok(format!(
        "s3://{}/{}/{}",
        SUBMISSIONS_BUCKET,
        project_id,
        name.to_string_lossy()
    ))
}

/// Arguments of the `s3 cp` invocation.
pub fn upload_args(
    forecast_file: &Path,
    project_id: &str,
    options: &SubmitOptions,
) -> Result<Vec<OsString>> {
    Ok(vec![
        "s3".into(),
        "cp".into(),
        forecast_file.as_os_str().to_os_string(),
        destination(forecast_file, project_id)?.into(),
        "--endpoint-url".into(),
        options.endpoint_url().into(),
        "--region".into(),
        options.s3_region.clone().into(),
        "--no-sign-request".into(),
        "--no-verify-ssl".into(),
    ])
}
