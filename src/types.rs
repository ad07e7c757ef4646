//! Data model shared by the scanner, the configuration store and the
//! generation invoker.

use {
    chrono::{DateTime, Utc},
    schemars::JsonSchema,
    serde::{Deserialize, Serialize},
    std::collections::BTreeMap,
    std::path::PathBuf,
};

/// Substitution token replaced by the interface name in filename templates.
pub const INTERFACE_NAME_TOKEN: &str = "{{.InterfaceName}}";

/// Filename template used when none is configured.
pub const DEFAULT_FILENAME_TEMPLATE: &str = "mock_{{.InterfaceName}}.go";

/// Output package name used when none is configured.
pub const DEFAULT_OUTPUT_PACKAGE: &str = "mocks";

/// One discovered Go interface.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InterfaceDefinition {
    pub name: String,
    pub package: String,
    pub methods: Vec<MethodSignature>,
    pub file_path: PathBuf,
    pub line_number: usize,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub comments: Vec<String>,
}

/// A method of an interface, with parameters and results in declaration order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MethodSignature {
    pub name: String,
    pub parameters: Vec<Parameter>,
    pub returns: Vec<Parameter>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub comments: Vec<String>,
}

/// A parameter or result. Unnamed parameters carry an empty name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Parameter {
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub name: String,
    #[serde(rename = "type")]
    pub type_repr: String,
}

impl Parameter {
    pub fn named(name: impl Into<String>, type_repr: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            type_repr: type_repr.into(),
        }
    }

    pub fn unnamed(type_repr: impl Into<String>) -> Self {
        Self::named(String::new(), type_repr)
    }
}

/// Contents of a `.mockery.yaml` file.
///
/// `Default` yields an empty (and therefore invalid) configuration; the
/// seeded defaults come from [`crate::config::ConfigStore::default_config`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenerationConfig {
    #[serde(rename = "with-expecter", default)]
    pub with_expecter: bool,
    #[serde(default)]
    pub filename: String,
    #[serde(default)]
    pub outpkg: String,
    #[serde(default)]
    pub packages: BTreeMap<String, PackageConfig>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PackageConfig {
    #[serde(default)]
    pub interfaces: BTreeMap<String, InterfaceConfig>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InterfaceConfig {
    #[serde(default)]
    pub config: InterfaceSettings,
}

/// Per-interface overrides.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct InterfaceSettings {
    /// Source directory of the interface
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub dir: String,
    /// Filename of the generated mock
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub filename: String,
}

fn default_with_expecter() -> bool {
    true
}

/// Request to generate the mock for a single interface.
///
/// Doubles as the argument payload of the `generate_mock` tool.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct GenerationRequest {
    /// Name of the interface to mock
    pub interface_name: String,
    /// Package path containing the interface
    pub package_path: String,
    /// Directory to output generated mocks
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output_dir: Option<String>,
    /// Generate with expecter methods
    #[serde(default = "default_with_expecter")]
    pub with_expecter: bool,
    /// Template for generated mock filename, e.g. `mock_{{.InterfaceName}}.go`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filename_format: Option<String>,
}

impl GenerationRequest {
    pub fn new(interface_name: impl Into<String>, package_path: impl Into<String>) -> Self {
        Self {
            interface_name: interface_name.into(),
            package_path: package_path.into(),
            output_dir: None,
            with_expecter: true,
            filename_format: None,
        }
    }

    /// Output filename for this request: the template with the interface
    /// name substituted, or `mock_<lowercased name>.go`.
    pub fn output_filename(&self) -> String {
        match self.filename_format.as_deref().filter(|f| !f.trim().is_empty()) {
            Some(template) => template.replace(INTERFACE_NAME_TOKEN, &self.interface_name),
            None => format!("mock_{}.go", self.interface_name.to_lowercase()),
        }
    }
}

/// Outcome of one generation run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenerationResult {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub generated_file: Option<PathBuf>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,
    pub generated_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub mockery_output: String,
}
