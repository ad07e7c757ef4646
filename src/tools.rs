//! MCP Tools Implementation
//!
//! The fixed catalog of tools exposed over `tools/list` / `tools/call` and
//! their implementations on top of the scanner, the configuration store and
//! the mock generator.

use {
    crate::config::{ConfigStore, CONFIG_FILE_NAME},
    crate::content_types::McpResponse,
    crate::error::{ConfigError, McpError, McpResult},
    crate::generator::MockGenerator,
    crate::scanner::{absolute_path, GoInterfaceScanner, ScanFilter},
    crate::types::{GenerationConfig, GenerationRequest, InterfaceDefinition, InterfaceSettings},
    once_cell::sync::Lazy,
    schemars::JsonSchema,
    serde::{de::DeserializeOwned, Deserialize, Serialize},
    serde_json::{json, Value},
    std::collections::BTreeMap,
    std::path::{Path, PathBuf},
    std::sync::Arc,
    std::time::Instant,
    tracing::{debug, info},
};

/// Arguments of `discover_interfaces`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct DiscoverInterfacesArgs {
    /// Path to the Go project to scan
    pub project_path: String,
    /// File patterns to include in scan
    #[serde(default)]
    pub include_patterns: Vec<String>,
    /// File patterns to exclude from scan
    #[serde(default)]
    pub exclude_patterns: Vec<String>,
}

/// Arguments of `update_mockery_config`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct UpdateConfigArgs {
    /// Path to the project
    pub project_path: String,
    /// Interface configurations, keyed by package path then interface name
    #[serde(default)]
    pub interfaces: BTreeMap<String, BTreeMap<String, InterfaceSettings>>,
    /// Global mockery settings
    #[serde(default)]
    pub global_config: Option<GlobalConfigArgs>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct GlobalConfigArgs {
    /// Generate with expecter methods
    #[serde(default)]
    pub with_expecter: Option<bool>,
    /// Filename template for generated mocks
    #[serde(default)]
    pub filename: Option<String>,
    /// Package name of generated mocks
    #[serde(default)]
    pub outpkg: Option<String>,
}

/// The tools this server offers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToolKind {
    DiscoverInterfaces,
    GenerateMock,
    UpdateMockeryConfig,
}

impl ToolKind {
    pub const ALL: [ToolKind; 3] = [
        ToolKind::DiscoverInterfaces,
        ToolKind::GenerateMock,
        ToolKind::UpdateMockeryConfig,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Self::DiscoverInterfaces => "discover_interfaces",
            Self::GenerateMock => "generate_mock",
            Self::UpdateMockeryConfig => "update_mockery_config",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.name() == name)
    }

    fn description(self) -> &'static str {
        match self {
            Self::DiscoverInterfaces => "Scan Go project for interface definitions",
            Self::GenerateMock => "Generate mock using Mockery tool",
            Self::UpdateMockeryConfig => "Create or update .mockery.yaml configuration",
        }
    }

    fn input_schema(self) -> Value {
        match self {
            Self::DiscoverInterfaces => schema_value::<DiscoverInterfacesArgs>(),
            Self::GenerateMock => schema_value::<GenerationRequest>(),
            Self::UpdateMockeryConfig => schema_value::<UpdateConfigArgs>(),
        }
    }
}

/// One entry of the `tools/list` result.
#[derive(Debug, Clone, Serialize)]
pub struct ToolDefinition {
    pub name: &'static str,
    pub description: &'static str,
    #[serde(rename = "inputSchema")]
    pub input_schema: Value,
}

static TOOL_CATALOG: Lazy<Vec<ToolDefinition>> = Lazy::new(|| {
    ToolKind::ALL
        .into_iter()
        .map(|kind| ToolDefinition {
            name: kind.name(),
            description: kind.description(),
            input_schema: kind.input_schema(),
        })
        .collect()
});

fn schema_value<T: JsonSchema>() -> Value {
    serde_json::to_value(schemars::schema_for!(T)).unwrap_or_else(|_| json!({"type": "object"}))
}

/// Executes catalog tools. Holds no per-request state.
pub struct McpTools {
    generator: Arc<dyn MockGenerator>,
    config_store: ConfigStore,
}

impl McpTools {
    pub fn new(generator: Arc<dyn MockGenerator>) -> Self {
        Self {
            generator,
            config_store: ConfigStore::new(),
        }
    }

    /// The static tool catalog.
    pub fn catalog() -> &'static [ToolDefinition] {
        &TOOL_CATALOG
    }

    /// Result payload of `tools/list`.
    pub fn get_tools_list(&self) -> Value {
        json!({ "tools": Self::catalog() })
    }

    /// Execute a tool by name
    pub async fn execute_tool(&self, tool_name: &str, arguments: Value) -> McpResult<McpResponse> {
        let kind = ToolKind::from_name(tool_name)
            .ok_or_else(|| McpError::UnknownTool(tool_name.to_string()))?;

        let start = Instant::now();
        let result = match kind {
            ToolKind::DiscoverInterfaces => {
                self.discover_interfaces(parse_arguments(kind, arguments)?).await
            }
            ToolKind::GenerateMock => self.generate_mock(parse_arguments(kind, arguments)?).await,
            ToolKind::UpdateMockeryConfig => {
                self.update_mockery_config(parse_arguments(kind, arguments)?).await
            }
        };
        crate::log_tool_execution!(kind.name(), start.elapsed(), &result);
        result
    }

    async fn discover_interfaces(&self, args: DiscoverInterfacesArgs) -> McpResult<McpResponse> {
        require_non_empty("project_path", &args.project_path)?;
        let root = existing_project_path(&args.project_path)?;
        let filter = ScanFilter::new(&args.include_patterns, &args.exclude_patterns)?;

        info!(path = %root.display(), "Scanning project");
        let scanner = GoInterfaceScanner::with_filter(filter);
        let scan_root = root.clone();
        let interfaces = tokio::task::spawn_blocking(move || scanner.scan_project(&scan_root))
            .await
            .map_err(|e| McpError::Internal(format!("scan task failed: {e}")))??;
        info!(count = interfaces.len(), "Found interfaces");

        let text = format!(
            "Found {} interfaces in {}:\n\n{}",
            interfaces.len(),
            root.display(),
            format_interface_list(&interfaces)
        );
        Ok(McpResponse::with_text_and_data(
            text,
            json!({
                "project_path": root,
                "count": interfaces.len(),
                "interfaces": interfaces,
            }),
        ))
    }

    async fn generate_mock(&self, request: GenerationRequest) -> McpResult<McpResponse> {
        require_non_empty("interface_name", &request.interface_name)?;
        require_non_empty("package_path", &request.package_path)?;

        let result = self.generator.generate(&request).await?;
        let generated = result
            .generated_file
            .as_deref()
            .map(|p| p.display().to_string())
            .unwrap_or_default();

        let text = format!(
            "Mock generated successfully:\n- Interface: {}\n- Package: {}\n- Generated: {}",
            request.interface_name, request.package_path, generated
        );
        let data = serde_json::to_value(&result)
            .map_err(|e| McpError::Internal(format!("failed to encode generation result: {e}")))?;
        Ok(McpResponse::with_text_and_data(text, data))
    }

    async fn update_mockery_config(&self, args: UpdateConfigArgs) -> McpResult<McpResponse> {
        require_non_empty("project_path", &args.project_path)?;
        let root = existing_project_path(&args.project_path)?;
        let config_path = root.join(CONFIG_FILE_NAME);

        let store = &self.config_store;
        let base = match store.read(&config_path).await {
            Ok(existing) => existing,
            Err(ConfigError::NotFound(_)) => store.default_config(),
            Err(e) => return Err(e.into()),
        };

        let global = args.global_config.unwrap_or_default();
        let mut overrides = GenerationConfig {
            with_expecter: global.with_expecter.unwrap_or(false),
            filename: global.filename.unwrap_or_default(),
            outpkg: global.outpkg.unwrap_or_default(),
            ..GenerationConfig::default()
        };
        for (package, interfaces) in args.interfaces {
            // an empty map still registers the package so validation rejects it
            overrides.packages.entry(package.clone()).or_default();
            debug!(package = %package, interfaces = interfaces.len(), "Package override");
            for (interface, settings) in interfaces {
                store.update_interface(&mut overrides, &package, &interface, settings);
            }
        }

        let mut merged = store.merge(&base, &overrides);
        // merge only lets `true` through; an explicit `false` still applies
        if global.with_expecter == Some(false) {
            merged.with_expecter = false;
        }

        store.write(&merged, &config_path).await?;

        let text = format!(
            "Mockery configuration updated successfully\n- File: {}",
            config_path.display()
        );
        Ok(McpResponse::with_text_and_data(
            text,
            json!({
                "config_path": config_path,
                "config": merged,
            }),
        ))
    }
}

fn parse_arguments<T: DeserializeOwned>(kind: ToolKind, arguments: Value) -> McpResult<T> {
    serde_json::from_value(arguments)
        .map_err(|e| McpError::InvalidParams(format!("Invalid arguments for {}: {e}", kind.name())))
}

fn require_non_empty(field: &str, value: &str) -> McpResult<()> {
    if value.trim().is_empty() {
        return Err(McpError::InvalidParams(format!("{field} cannot be empty")));
    }
    Ok(())
}

fn existing_project_path(path: &str) -> McpResult<PathBuf> {
    let absolute = absolute_path(Path::new(path))
        .map_err(|e| McpError::InvalidParams(format!("Failed to resolve path {path}: {e}")))?;
    if !absolute.exists() {
        return Err(McpError::NotFound(format!(
            "Project path does not exist: {}",
            absolute.display()
        )));
    }
    Ok(absolute)
}

fn format_interface_list(interfaces: &[InterfaceDefinition]) -> String {
    interfaces
        .iter()
        .map(|iface| {
            format!(
                "- {} ({} package) - {} methods\n  File: {}",
                iface.name,
                iface.package,
                iface.methods.len(),
                iface.file_path.display()
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}
