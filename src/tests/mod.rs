//! MCP Server Tests
//!
//! Dispatcher, tool and transport tests plus the fixtures they share.

pub mod tools_tests;

use {
    crate::error::GenerationError,
    crate::generator::{MockGenerator, MockeryInvoker},
    crate::protocol_impl::McpProtocolHandlerImpl,
    crate::types::{GenerationRequest, GenerationResult},
    chrono::Utc,
    std::path::{Path, PathBuf},
    std::sync::{Arc, Mutex},
};

/// Executable name guaranteed to be absent from `PATH`.
pub(crate) const MISSING_MOCKERY: &str = "definitely-not-mockery-xyz";

pub(crate) const GREETER_SOURCE: &str = r#"package demo

type Greeter interface {
	Greet(name string) (string, error)
}
"#;

/// Handler whose generator can never find mockery.
pub(crate) fn handler() -> McpProtocolHandlerImpl {
    McpProtocolHandlerImpl::with_generator(Arc::new(MockeryInvoker::new(MISSING_MOCKERY)))
}

pub(crate) fn write_go_file(root: &Path, relative: &str, contents: &str) -> PathBuf {
    let path = root.join(relative);
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).unwrap();
    }
    std::fs::write(&path, contents).unwrap();
    path
}

#[cfg(unix)]
pub(crate) fn write_script(path: &Path, body: &str) {
    use std::os::unix::fs::PermissionsExt;

    std::fs::write(path, body).unwrap();
    std::fs::set_permissions(path, std::fs::Permissions::from_mode(0o755)).unwrap();
}

/// A stand-in for mockery that echoes its arguments and, on success, writes
/// the requested output file.
#[cfg(unix)]
pub(crate) fn fake_mockery(dir: &Path, exit_code: i32) -> PathBuf {
    let path = dir.join(format!("fake-mockery-{exit_code}"));
    let body = format!(
        r#"#!/bin/sh
echo "fake mockery $*"
for arg in "$@"; do
  case "$arg" in
    --output=*) out="${{arg#--output=}}" ;;
    --filename=*) name="${{arg#--filename=}}" ;;
  esac
done
if [ {exit_code} -ne 0 ]; then
  echo "fake failure" >&2
  exit {exit_code}
fi
mkdir -p "$out"
printf 'package mocks\n' > "$out/$name"
"#
    );
    write_script(&path, &body);
    path
}

/// Records requests and reports success without running anything.
#[derive(Default)]
pub(crate) struct RecordingGenerator {
    pub requests: Mutex<Vec<GenerationRequest>>,
}

#[async_trait::async_trait]
impl MockGenerator for RecordingGenerator {
    async fn generate(
        &self,
        request: &GenerationRequest,
    ) -> Result<GenerationResult, GenerationError> {
        self.requests.lock().unwrap().push(request.clone());
        Ok(GenerationResult {
            success: true,
            generated_file: Some(
                PathBuf::from(&request.package_path)
                    .join("mocks")
                    .join(request.output_filename()),
            ),
            error_message: None,
            generated_at: Utc::now(),
            mockery_output: "recorded".to_string(),
        })
    }
}
