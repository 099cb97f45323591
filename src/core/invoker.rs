use async_trait::async_trait;
use std::process::Stdio;
use std::time::Duration;
use tokio::process::Command;
use tracing::error;

/// Hard ceiling for a single CLI invocation.
pub const CLI_TIMEOUT: Duration = Duration::from_secs(10);

/// Runs the external CLI and hands back its stdout.
///
/// `None` means "data unavailable": the binary was missing, exited non-zero,
/// or ran past its timeout. Implementations log the failure themselves so
/// callers only have to decide how to degrade.
#[async_trait]
pub trait CliInvoker: Send + Sync {
    async fn run(&self, args: &str) -> Option<String>;
}

/// Invokes the real binary as a child process.
pub struct SystemCli {
    program: String,
    base_args: Vec<String>,
    timeout: Duration,
}

impl SystemCli {
    /// `command` is split on whitespace: the first word is the program and
    /// the rest precede every invocation's own arguments (`npx openclaw`).
    pub fn new(command: &str) -> Self {
        let mut words = command.split_whitespace().map(str::to_string);
        Self {
            program: words.next().unwrap_or_default(),
            base_args: words.collect(),
            timeout: CLI_TIMEOUT,
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    async fn execute(&self, args: &str) -> Result<String, String> {
        let mut cmd = Command::new(&self.program);
        cmd.args(&self.base_args)
            .args(args.split_whitespace())
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        let child = cmd.spawn().map_err(|e| e.to_string())?;
        let output = match tokio::time::timeout(self.timeout, child.wait_with_output()).await {
            Ok(result) => result.map_err(|e| e.to_string())?,
            Err(_) => {
                return Err(format!(
                    "timed out after {}ms",
                    self.timeout.as_millis()
                ));
            }
        };

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
            return Err(if stderr.is_empty() {
                format!("exited with {}", output.status)
            } else {
                format!("exited with {}: {}", output.status, stderr)
            });
        }

        Ok(String::from_utf8_lossy(&output.stdout).to_string())
    }
}

#[async_trait]
impl CliInvoker for SystemCli {
    async fn run(&self, args: &str) -> Option<String> {
        match self.execute(args).await {
            Ok(stdout) => Some(stdout),
            Err(e) => {
                error!(program = %self.program, args = %args, error = %e, "CLI invocation failed");
                None
            }
        }
    }
}
