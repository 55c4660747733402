use std::{fs, path::Path, path::PathBuf};

use crate::encode::EncodingConfig;
use crate::parser::ParseOptions;
use crate::prelude::*;
use crate::reconcile::ColumnNames;
use graph_artifacts::artifacts::LayoutOptions;
use nestify::nest;
use serde::{Deserialize, Serialize};

pub const DEFAULT_INIT_LOG: &str = "/var/log/process_trace_init.log";
pub const DEFAULT_TRACE_LOG: &str = "/var/log/process_trace.log";

nest! {
    #[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]*
    #[serde(rename_all = "kebab-case", default)]*
    /// Settings for one run of the pipeline.
    ///
    /// Every field has a default, so a YAML file only needs to list what it overrides:
    ///
    /// ```yaml
    /// root-id: "1"
    /// encoding:
    ///   variant: green-on-gray
    ///   max-label-line-length: 21
    /// layout:
    ///   type: hierarchical
    ///   level-separation: 300
    ///   node-spacing: 600
    ///   tree-spacing: 600
    ///   direction: UD
    ///   sort-method: directed
    /// ```
    pub struct GraphConfig {
        /// PID the distance metric is measured from
        pub root_id: String,
        pub logs: pub struct LogPaths {
            pub init: PathBuf,
            pub trace: PathBuf,
        },
        pub parse: ParseOptions,
        pub columns: ColumnNames,
        pub encoding: EncodingConfig,
        pub layout: LayoutOptions,
    }
}

impl Default for LogPaths {
    fn default() -> Self {
        Self {
            init: PathBuf::from(DEFAULT_INIT_LOG),
            trace: PathBuf::from(DEFAULT_TRACE_LOG),
        }
    }
}

impl Default for GraphConfig {
    fn default() -> Self {
        Self {
            root_id: "0".to_string(),
            logs: LogPaths::default(),
            parse: ParseOptions::default(),
            columns: ColumnNames::default(),
            encoding: EncodingConfig::default(),
            layout: LayoutOptions::default(),
        }
    }
}

impl GraphConfig {
    /// Load the configuration from a YAML file, or the defaults when no file is given
    pub fn load(config_path: Option<&Path>) -> Result<Self> {
        let Some(config_path) = config_path else {
            debug!("No config file given, using defaults");
            return Ok(Self::default());
        };

        let config_str = fs::read(config_path).with_context(|| {
            format!("Failed to read graph config at {}", config_path.display())
        })?;
        let config: GraphConfig = serde_yaml::from_slice(&config_str).with_context(|| {
            format!("Failed to parse graph config at {}", config_path.display())
        })?;
        debug!("Config loaded from {}", config_path.display());

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        ensure!(!self.root_id.trim().is_empty(), "root-id must not be empty");
        ensure!(
            self.encoding.max_node_size > 0.0,
            "encoding.max-node-size must be positive"
        );
        ensure!(
            self.encoding.max_label_line_length > 0,
            "encoding.max-label-line-length must be positive"
        );
        ensure!(
            self.encoding.max_label_lines > 0,
            "encoding.max-label-lines must be positive"
        );
        Ok(())
    }
}
