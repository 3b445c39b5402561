// Session configuration
// Loaded from <config dir>/replterm/config.toml

use crate::interpreter::GraphicsSize;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Errors reading the configuration file
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("cannot read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid configuration in {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}

/// How the runtime process is launched and driven
///
/// One runtime process lives for the whole session and reads requests from
/// stdin, one line each. Templates use `{name}`-style placeholders which are
/// substituted before a request is sent:
/// - `request_template`: wraps `{code}` so the runtime prints `{marker}`
///   followed by an exit status (0 for success) on stdout, then `{marker}`
///   alone on stderr
/// - `source_template`: runs the snippet file `{script}`, printing visible
///   values when `{autoprint}` is `TRUE`
/// - `graphics_prelude`: opens a device writing into `{plot_dir}` at
///   `{width}`x`{height}`
/// - `library_template`, `install_template`: `{name}` and, for installs,
///   `{repos}`
/// - `help_template`: prints the documentation for `{topic}` on stdout
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RuntimeConfig {
    /// Runtime executable
    pub program: String,

    /// Arguments that start the runtime reading requests from stdin
    pub args: Vec<String>,

    /// File name of the snippet written into each shelter
    pub script_name: String,

    pub request_template: String,

    pub source_template: String,

    /// Code run once at startup; its first stdout line is logged as the version
    pub version_code: String,

    /// Code placed before the snippet when graphics capture is on
    pub graphics_prelude: Option<String>,

    /// Request sent after the snippet when graphics capture is on
    pub graphics_epilogue: Option<String>,

    /// Code that attaches a package, run once during bootstrap
    pub library_template: String,

    /// Code that installs a package
    pub install_template: String,

    pub help_template: String,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        RuntimeConfig {
            program: "R".to_string(),
            args: vec![
                "--vanilla".to_string(),
                "--quiet".to_string(),
                "--no-echo".to_string(),
            ],
            script_name: "snippet.R".to_string(),
            // Warnings are reported as they happen; deferred top-level
            // warnings would otherwise land after the marker
            request_template: ".replterm_status <- tryCatch(withCallingHandlers({ {code}; 0L }, \
                               warning = function(w) { message('Warning: ', conditionMessage(w)); \
                               invokeRestart('muffleWarning') }), \
                               error = function(e) { message(conditionMessage(e)); 1L }); \
                               cat('{marker}', .replterm_status, '\\n'); flush(stdout()); \
                               message('{marker}')"
                .to_string(),
            source_template: "source('{script}', local = globalenv(), print.eval = {autoprint})"
                .to_string(),
            version_code: "cat(R.version.string, '\\n')".to_string(),
            graphics_prelude: Some(
                "grDevices::png(file.path('{plot_dir}', 'plot-%03d.png'), \
                 width = {width}, height = {height})"
                    .to_string(),
            ),
            graphics_epilogue: Some("invisible(grDevices::graphics.off())".to_string()),
            library_template: "suppressPackageStartupMessages(library({name}))".to_string(),
            install_template: "utils::install.packages('{name}', repos = c({repos}))"
                .to_string(),
            help_template: "h <- utils::help('{topic}'); \
                            if (length(h)) tools::Rd2txt(utils:::.getHelpFile(h), \
                            options = list(underline_titles = FALSE))"
                .to_string(),
        }
    }
}

/// What the session sets up once before accepting code
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BootstrapConfig {
    /// Package to install and attach; `None` skips both stages
    pub package: Option<String>,

    /// Package repositories, in priority order
    pub repos: Vec<String>,

    /// Install the package before attaching it
    pub install: bool,
}

/// Top-level configuration file
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub runtime: RuntimeConfig,
    pub bootstrap: BootstrapConfig,
    pub graphics: GraphicsSize,
}

impl Config {
    /// Default location of the configuration file
    pub fn config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("replterm")
            .join("config.toml")
    }

    /// Load configuration
    ///
    /// An explicit `path` must exist. Without one the default location is
    /// tried and built-in defaults are used when nothing is there.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let path = match path {
            Some(path) => path.to_path_buf(),
            None => {
                let default = Self::config_path();
                if !default.exists() {
                    return Ok(Self::default());
                }
                default
            }
        };

        let contents = fs::read_to_string(&path).map_err(|source| ConfigError::Io {
            path: path.clone(),
            source,
        })?;
        Self::parse(&contents).map_err(|source| ConfigError::Parse { path, source })
    }

    /// Parse configuration from TOML text
    pub fn parse(contents: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(contents)
    }
}
