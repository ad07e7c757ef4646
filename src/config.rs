//! Mockery Configuration Store
//!
//! Builds, validates, merges and persists `.mockery.yaml` configurations.

use {
    crate::error::{ConfigError, ValidationError},
    crate::types::{
        GenerationConfig, GenerationRequest, InterfaceConfig, InterfaceSettings, PackageConfig,
        DEFAULT_FILENAME_TEMPLATE, DEFAULT_OUTPUT_PACKAGE,
    },
    std::path::Path,
    tokio::fs,
    tracing::{debug, info},
};

/// Conventional name of the persisted configuration file.
pub const CONFIG_FILE_NAME: &str = ".mockery.yaml";

/// Manages mockery configurations.
#[derive(Debug, Clone)]
pub struct ConfigStore {
    defaults: GenerationConfig,
}

impl ConfigStore {
    pub fn new() -> Self {
        Self {
            defaults: GenerationConfig {
                with_expecter: true,
                filename: DEFAULT_FILENAME_TEMPLATE.to_string(),
                outpkg: DEFAULT_OUTPUT_PACKAGE.to_string(),
                packages: Default::default(),
            },
        }
    }

    /// The seeded default configuration.
    pub fn default_config(&self) -> GenerationConfig {
        self.defaults.clone()
    }

    /// Default configuration with one package/interface entry derived from
    /// a generation request.
    pub fn config_for_request(&self, request: &GenerationRequest) -> GenerationConfig {
        let mut config = self.default_config();
        let settings = InterfaceSettings {
            dir: request.package_path.clone(),
            filename: request
                .filename_format
                .clone()
                .filter(|f| !f.trim().is_empty())
                .unwrap_or_else(|| format!("mock_{}.go", request.interface_name.to_lowercase())),
        };
        self.update_interface(
            &mut config,
            &request.package_path,
            &request.interface_name,
            settings,
        );
        config.with_expecter = request.with_expecter;
        config
    }

    /// Add or replace one interface's settings, creating the package entry
    /// when missing.
    pub fn update_interface(
        &self,
        config: &mut GenerationConfig,
        package_path: &str,
        interface_name: &str,
        settings: InterfaceSettings,
    ) {
        config
            .packages
            .entry(package_path.to_string())
            .or_default()
            .interfaces
            .insert(interface_name.to_string(), InterfaceConfig { config: settings });
    }

    pub fn validate(&self, config: &GenerationConfig) -> Result<(), ValidationError> {
        if config.filename.trim().is_empty() {
            return Err(ValidationError::MissingFilename);
        }
        if config.outpkg.trim().is_empty() {
            return Err(ValidationError::MissingOutPkg);
        }

        for (package, package_config) in &config.packages {
            if package.trim().is_empty() {
                return Err(ValidationError::EmptyPackagePath);
            }
            if package_config.interfaces.is_empty() {
                return Err(ValidationError::EmptyPackage {
                    package: package.clone(),
                });
            }
            for (interface, interface_config) in &package_config.interfaces {
                if interface.trim().is_empty() {
                    return Err(ValidationError::EmptyInterfaceName {
                        package: package.clone(),
                    });
                }
                if interface_config.config.dir.trim().is_empty() {
                    return Err(ValidationError::MissingDirectory {
                        package: package.clone(),
                        interface: interface.clone(),
                    });
                }
            }
        }

        Ok(())
    }

    /// Validate, then write the configuration as YAML.
    pub async fn write(&self, config: &GenerationConfig, path: &Path) -> Result<(), ConfigError> {
        self.validate(config)?;

        if let Some(dir) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(dir).await.map_err(|source| ConfigError::Io {
                path: dir.to_path_buf(),
                source,
            })?;
        }

        let yaml = serde_yaml::to_string(config).map_err(|source| ConfigError::Yaml {
            path: path.to_path_buf(),
            source,
        })?;
        fs::write(path, yaml).await.map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;

        info!(path = %path.display(), packages = config.packages.len(), "Wrote mockery configuration");
        Ok(())
    }

    /// Read and validate a configuration file.
    pub async fn read(&self, path: &Path) -> Result<GenerationConfig, ConfigError> {
        let yaml = match fs::read_to_string(path).await {
            Ok(yaml) => yaml,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(ConfigError::NotFound(path.to_path_buf()))
            }
            Err(source) => {
                return Err(ConfigError::Io {
                    path: path.to_path_buf(),
                    source,
                })
            }
        };

        let config: GenerationConfig =
            serde_yaml::from_str(&yaml).map_err(|source| ConfigError::Yaml {
                path: path.to_path_buf(),
                source,
            })?;

        self.validate(&config)
            .map_err(|source| ConfigError::InvalidFile {
                path: path.to_path_buf(),
                source,
            })?;

        debug!(path = %path.display(), "Loaded mockery configuration");
        Ok(config)
    }

    /// Merge `overrides` onto `base`.
    ///
    /// Scalars from `overrides` win only when set (`true` / non-empty).
    /// Packages are unioned; a package present in both is replaced whole.
    pub fn merge(&self, base: &GenerationConfig, overrides: &GenerationConfig) -> GenerationConfig {
        let mut result = base.clone();

        if overrides.with_expecter {
            result.with_expecter = true;
        }
        if !overrides.filename.is_empty() {
            result.filename = overrides.filename.clone();
        }
        if !overrides.outpkg.is_empty() {
            result.outpkg = overrides.outpkg.clone();
        }

        for (package, package_config) in &overrides.packages {
            result
                .packages
                .insert(package.clone(), PackageConfig::clone(package_config));
        }

        result
    }
}

impl Default for ConfigStore {
    fn default() -> Self {
        Self::new()
    }
}
