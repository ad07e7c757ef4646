//! Mock Generation Invoker
//!
//! Runs the external `mockery` executable for one interface at a time.

use {
    crate::error::GenerationError,
    crate::scanner::absolute_path,
    crate::types::{GenerationRequest, GenerationResult, DEFAULT_OUTPUT_PACKAGE},
    async_trait::async_trait,
    chrono::Utc,
    dashmap::DashMap,
    std::path::{Path, PathBuf},
    std::process::Stdio,
    std::sync::Arc,
    std::time::{Duration, Instant},
    tokio::process::Command,
    tokio::sync::{Mutex, OwnedMutexGuard},
    tracing::{debug, info, warn},
};

/// Default executable name looked up on `PATH`.
pub const DEFAULT_MOCKERY_COMMAND: &str = "mockery";

/// How to obtain the executable when it is missing.
pub const MOCKERY_INSTALL_HINT: &str = "go install github.com/vektra/mockery/v2@latest";

/// Produces a mock for a single interface.
#[async_trait]
pub trait MockGenerator: Send + Sync {
    async fn generate(
        &self,
        request: &GenerationRequest,
    ) -> Result<GenerationResult, GenerationError>;
}

/// Resolved locations and arguments of one invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerationPlan {
    pub package_dir: PathBuf,
    pub output_dir: PathBuf,
    pub filename: String,
    pub output_file: PathBuf,
    pub args: Vec<String>,
}

/// Invokes mockery as a child process.
///
/// Runs targeting the same output file are serialized; everything else runs
/// concurrently. A lock entry lives only while some run holds or awaits it.
pub struct MockeryInvoker {
    command: String,
    timeout: Option<Duration>,
    output_locks: DashMap<PathBuf, Arc<Mutex<()>>>,
}

impl MockeryInvoker {
    pub fn new(command: impl Into<String>) -> Self {
        Self {
            command: command.into(),
            timeout: None,
            output_locks: DashMap::new(),
        }
    }

    /// Bound the wait for the child process. `None` waits indefinitely.
    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn command(&self) -> &str {
        &self.command
    }

    /// Locate the executable on `PATH` (or verify an explicit path).
    pub fn resolve_command(&self) -> Result<PathBuf, GenerationError> {
        which::which(&self.command).map_err(|e| {
            debug!(command = %self.command, error = %e, "mockery lookup failed");
            GenerationError::DependencyUnavailable {
                command: self.command.clone(),
                install_hint: MOCKERY_INSTALL_HINT,
            }
        })
    }

    /// Compute directories, filename and command line for a request.
    pub fn plan(&self, request: &GenerationRequest) -> Result<GenerationPlan, GenerationError> {
        let package_dir = absolute_path(Path::new(&request.package_path)).map_err(|source| {
            GenerationError::PathResolution {
                path: PathBuf::from(&request.package_path),
                source,
            }
        })?;

        let output_dir = match request.output_dir.as_deref().filter(|d| !d.trim().is_empty()) {
            Some(dir) => {
                absolute_path(Path::new(dir)).map_err(|source| GenerationError::PathResolution {
                    path: PathBuf::from(dir),
                    source,
                })?
            }
            None => package_dir.join(DEFAULT_OUTPUT_PACKAGE),
        };

        let filename = request.output_filename();
        let output_file = output_dir.join(&filename);

        let mut args = vec![
            format!("--name={}", request.interface_name),
            format!("--dir={}", package_dir.display()),
            format!("--output={}", output_dir.display()),
            format!("--filename={filename}"),
        ];
        if request.with_expecter {
            args.push("--with-expecter".to_string());
        }

        Ok(GenerationPlan {
            package_dir,
            output_dir,
            filename,
            output_file,
            args,
        })
    }

    fn output_lock(&self, output_file: &Path) -> Arc<Mutex<()>> {
        self.output_locks
            .entry(output_file.to_path_buf())
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone()
    }

    async fn lease_output(&self, output_file: &Path) -> OutputLease<'_> {
        let guard = self.output_lock(output_file).lock_owned().await;
        OutputLease {
            locks: &self.output_locks,
            path: output_file.to_path_buf(),
            guard: Some(guard),
        }
    }

    async fn run(&self, executable: &Path, plan: &GenerationPlan) -> Result<String, GenerationError> {
        let child = Command::new(executable)
            .args(&plan.args)
            .current_dir(&plan.package_dir)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|source| GenerationError::Spawn {
                command: self.command.clone(),
                source,
            })?;

        let waited = match self.timeout {
            Some(limit) => match tokio::time::timeout(limit, child.wait_with_output()).await {
                Ok(waited) => waited,
                Err(_) => {
                    warn!(timeout_ms = limit.as_millis(), "mockery timed out, child killed");
                    return Err(GenerationError::TimedOut(limit));
                }
            },
            None => child.wait_with_output().await,
        };
        let output = waited.map_err(|source| GenerationError::Spawn {
            command: self.command.clone(),
            source,
        })?;

        let mut combined = String::from_utf8_lossy(&output.stdout).into_owned();
        combined.push_str(&String::from_utf8_lossy(&output.stderr));
        debug!(output = %combined, "mockery output");

        if !output.status.success() {
            return Err(GenerationError::ToolFailed {
                status: output.status.to_string(),
                output: combined,
            });
        }
        Ok(combined)
    }
}

/// Exclusive hold on one output file. Dropping it releases the lock and
/// forgets the entry once no other run references it.
struct OutputLease<'a> {
    locks: &'a DashMap<PathBuf, Arc<Mutex<()>>>,
    path: PathBuf,
    guard: Option<OwnedMutexGuard<()>>,
}

impl Drop for OutputLease<'_> {
    fn drop(&mut self) {
        self.guard.take();
        self.locks
            .remove_if(&self.path, |_, lock| Arc::strong_count(lock) == 1);
    }
}

impl Default for MockeryInvoker {
    fn default() -> Self {
        Self::new(DEFAULT_MOCKERY_COMMAND)
    }
}

#[async_trait]
impl MockGenerator for MockeryInvoker {
    async fn generate(
        &self,
        request: &GenerationRequest,
    ) -> Result<GenerationResult, GenerationError> {
        let start = Instant::now();
        info!(
            interface = %request.interface_name,
            package = %request.package_path,
            "Generating mock"
        );

        // Checked first so a missing tool leaves the filesystem untouched.
        let executable = self.resolve_command()?;
        let plan = self.plan(request)?;

        tokio::fs::create_dir_all(&plan.output_dir)
            .await
            .map_err(|source| GenerationError::CreateOutputDir {
                path: plan.output_dir.clone(),
                source,
            })?;

        let _lease = self.lease_output(&plan.output_file).await;

        info!(args = ?plan.args, "Executing mockery");
        let mockery_output = self.run(&executable, &plan).await?;

        info!(
            file = %plan.output_file.display(),
            duration_ms = start.elapsed().as_millis(),
            "Mock generated"
        );
        Ok(GenerationResult {
            success: true,
            generated_file: Some(plan.output_file),
            error_message: None,
            generated_at: Utc::now(),
            mockery_output,
        })
    }
}
