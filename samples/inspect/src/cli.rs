use std::path::PathBuf;

use clap::ValueHint;
use scenery::{ComponentMapping, ImageLookup, ResolverConfig, SamplerLookup};
use tracing_subscriber::fmt::time::OffsetTime;

/// Shape of the log lines written to stderr
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, clap::ValueEnum)]
pub enum LogFormat {
    Compact,
    Pretty,
    Json,
}

impl std::fmt::Display for LogFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            LogFormat::Compact => "compact",
            LogFormat::Pretty => "pretty",
            LogFormat::Json => "json",
        })
    }
}

#[derive(Debug, clap::Parser)]
#[command(author, version, about)]
pub struct Cli {
    /// Logging output filters; comma-separated
    #[arg(
        short,
        long,
        default_value = "warn,scenery=info,inspect=info",
        env = "SCENERY_LOG_FILTER"
    )]
    pub log_filter: String,
    /// Logging output format
    #[arg(long, default_value_t = LogFormat::Compact)]
    pub log_format: LogFormat,
    /// How accessor component types map onto decoded element types
    #[arg(long, default_value_t = ComponentMapping::Full, env = "SCENERY_COMPONENT_MAPPING")]
    pub component_mapping: ComponentMapping,
    /// How sampler indices are interpreted
    #[arg(long, default_value_t = SamplerLookup::AlwaysFirst, env = "SCENERY_SAMPLER_LOOKUP")]
    pub sampler_lookup: SamplerLookup,
    /// How image indices are interpreted
    #[arg(long, default_value_t = ImageLookup::Passthrough, env = "SCENERY_IMAGE_LOOKUP")]
    pub image_lookup: ImageLookup,
    /// Read buffers into memory instead of memory-mapping them
    #[arg(long)]
    pub no_mmap: bool,
    /// Also fetch every image
    #[arg(long)]
    pub images: bool,
    /// Documents to inspect
    #[arg(num_args = 1.., required = true, value_hint = ValueHint::FilePath)]
    pub files: Vec<PathBuf>,
}

impl Cli {
    pub fn resolver_config(&self) -> ResolverConfig {
        ResolverConfig::default()
            .with_component_mapping(self.component_mapping)
            .with_sampler_lookup(self.sampler_lookup)
            .with_image_lookup(self.image_lookup)
    }

    /// Send log output to stderr, leaving stdout for the report.
    pub fn init_tracing(&self) {
        // must be read before any other threads exist
        let offset = time::UtcOffset::current_local_offset();
        let builder = tracing_subscriber::fmt()
            .with_writer(std::io::stderr)
            .with_timer(OffsetTime::new(
                offset.unwrap_or(time::UtcOffset::UTC),
                time::macros::format_description!("[hour]:[minute]:[second].[subsecond digits:3]"),
            ))
            .with_env_filter(self.log_filter.as_str());

        match self.log_format {
            LogFormat::Compact => builder.compact().init(),
            LogFormat::Pretty => builder.pretty().init(),
            LogFormat::Json => builder.json().init(),
        }

        if let Err(e) = offset {
            tracing::debug!(error = %e, "logging timestamps in UTC");
        }
    }
}
