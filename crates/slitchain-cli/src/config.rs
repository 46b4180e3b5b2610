use crate::cli::{CreateArgs, ForceArgs};
use crate::error::{CliError, Result};
use serde::Deserialize;
use slitchain::engine::config::{self as core_config, FixMode};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

const DEFAULT_CHAIN_LENGTH: usize = 1;
const DEFAULT_BOX_XY: u32 = 128;
const DEFAULT_FORCE_OUTPUT: &str = "force.dat";

/// A fix mode as written in a config file: either its numeric index or one of its names.
#[derive(Deserialize, Debug, Clone)]
#[serde(untagged)]
enum PartialFixMode {
    Index(u8),
    Name(String),
}

impl TryFrom<PartialFixMode> for FixMode {
    type Error = core_config::ConfigError;

    fn try_from(p: PartialFixMode) -> std::result::Result<Self, Self::Error> {
        match p {
            PartialFixMode::Index(index) => index.to_string().parse(),
            PartialFixMode::Name(name) => name.parse(),
        }
    }
}

#[derive(Deserialize, Debug, Default)]
#[serde(deny_unknown_fields)]
struct PartialChainConfig {
    #[serde(rename = "chain-length")]
    chain_length: Option<usize>,
    #[serde(rename = "slit-size")]
    slit_size: Option<u32>,
    #[serde(rename = "box-xy")]
    box_xy: Option<u32>,
    #[serde(rename = "fix-mode")]
    fix_mode: Option<PartialFixMode>,
    #[serde(rename = "distance-fixpoint-wall")]
    distance_fixpoint_wall: Option<u32>,
    seed: Option<u64>,
}

#[derive(Deserialize, Debug, Default)]
#[serde(deny_unknown_fields)]
struct PartialForceConfig {
    #[serde(rename = "tracked-units")]
    tracked_units: Option<Vec<usize>>,
    #[serde(rename = "begin-age")]
    begin_age: Option<u64>,
    output: Option<PathBuf>,
}

/// Settings resolved for the `create` command.
#[derive(Debug, Clone, PartialEq)]
pub struct CreateSettings {
    pub chain: core_config::ChainInSlitConfig,
    pub seed: u64,
}

#[derive(Deserialize, Debug, Default)]
#[serde(deny_unknown_fields)]
pub struct PartialConfig {
    chain: Option<PartialChainConfig>,
    force: Option<PartialForceConfig>,
}

impl PartialConfig {
    pub fn from_file(path: &Path) -> Result<Self> {
        debug!("Loading configuration from file: {:?}", path);
        let content = std::fs::read_to_string(path)?;
        toml::from_str(&content).map_err(|e| CliError::FileParsing {
            path: path.to_path_buf(),
            source: e.into(),
        })
    }

    /// Loads `path` if given, otherwise starts from an empty configuration.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        path.map_or_else(|| Ok(Self::default()), Self::from_file)
    }

    /// Resolves the chain builder settings. Command-line values win over the file, which
    /// wins over the built-in defaults.
    pub fn merge_with_create_args(self, args: &CreateArgs) -> Result<CreateSettings> {
        let file = self.chain.unwrap_or_default();

        let fix_mode = match (args.fix_mode, file.fix_mode) {
            (Some(mode), _) => mode,
            (None, Some(partial)) => {
                FixMode::try_from(partial).map_err(|e| CliError::Config(e.to_string()))?
            }
            (None, None) => FixMode::SingleFixpointBottom,
        };
        let slit_size = args.slit_size.or(file.slit_size).ok_or_else(|| {
            CliError::Config(
                "A value for 'slit-size' is required either in the config file or via CLI argument."
                    .to_string(),
            )
        })?;

        let mut builder = core_config::ChainInSlitConfigBuilder::new()
            .chain_length(
                args.chain_length
                    .or(file.chain_length)
                    .unwrap_or(DEFAULT_CHAIN_LENGTH),
            )
            .slit_size(slit_size)
            .box_xy(args.box_xy.or(file.box_xy).unwrap_or(DEFAULT_BOX_XY))
            .fix_mode(fix_mode);
        if let Some(distance) = args.distance_fixpoint_wall.or(file.distance_fixpoint_wall) {
            builder = builder.distance_fixpoint_wall(distance);
        }
        let chain = builder
            .build()
            .map_err(|e| CliError::Config(e.to_string()))?;

        let seed = match args.seed.or(file.seed) {
            Some(seed) => seed,
            None => {
                let seed = rand::random::<u64>();
                info!(seed, "No seed given, drew a fresh one.");
                seed
            }
        };

        Ok(CreateSettings { chain, seed })
    }

    /// Resolves the force analysis settings with the same precedence as
    /// [`merge_with_create_args`](Self::merge_with_create_args).
    pub fn merge_with_force_args(
        self,
        args: &ForceArgs,
    ) -> Result<core_config::ForceAnalysisConfig> {
        let file = self.force.unwrap_or_default();

        let tracked_units = if args.tracked_units.is_empty() {
            file.tracked_units.ok_or_else(|| {
                CliError::Config(
                    "A value for 'tracked-units' is required either in the config file or via CLI argument."
                        .to_string(),
                )
            })?
        } else {
            args.tracked_units.clone()
        };
        let output = args
            .output
            .clone()
            .or(file.output)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_FORCE_OUTPUT));

        core_config::ForceAnalysisConfigBuilder::new()
            .tracked_units(tracked_units)
            .begin_age(args.begin_age.or(file.begin_age).unwrap_or(0))
            .output_path(output)
            .build()
            .map_err(|e| CliError::Config(e.to_string()))
    }
}
