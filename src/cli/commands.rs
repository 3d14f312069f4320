use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// .NET build detection for container image builds
#[derive(Parser, Debug)]
#[command(
    name = "buildprobe",
    about = ".NET build detection for container image builds",
    version,
    long_about = "buildprobe finds the .NET project to build in a repository, maps its target \
                  framework to a supported runtime and picks the SDK to build it with, \
                  honoring global.json roll-forward rules."
)]
pub struct CliArgs {
    #[command(subcommand)]
    pub command: Commands,

    #[arg(long, global = true, value_name = "LEVEL", help = "Set logging level")]
    pub log_level: Option<String>,

    #[arg(short = 'v', long, global = true, help = "Enable debug logging")]
    pub verbose: bool,

    #[arg(
        short = 'q',
        long,
        global = true,
        conflicts_with = "verbose",
        help = "Quiet mode - suppress non-error output"
    )]
    pub quiet: bool,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    #[command(
        about = "Detect the .NET project, runtime and SDK of a repository",
        long_about = "Discovers the project file to build (explicit override, repository root, \
                      then a recursive probe), maps its target framework to a supported \
                      runtime version and selects an SDK.\n\n\
                      Examples:\n  \
                      buildprobe detect\n  \
                      buildprobe detect /path/to/repo --format json\n  \
                      buildprobe detect --app-type functions\n  \
                      buildprobe detect --project src/Api/Api.csproj --dynamic-install"
    )]
    Detect(DetectArgs),

    #[command(
        about = "Select an SDK version using global.json roll-forward",
        long_about = "Reads global.json from the repository and selects the SDK from the \
                      given versions, or from the version catalog when none are given.\n\n\
                      Examples:\n  \
                      buildprobe resolve-sdk --sdk 8.0.100,8.0.204\n  \
                      buildprobe resolve-sdk /path/to/repo --runtime-version 8.0.1"
    )]
    ResolveSdk(ResolveSdkArgs),

    #[command(
        about = "Find the highest available version matching a partial version",
        long_about = "Missing components of the requested version are treated as wildcards.\n\n\
                      Examples:\n  \
                      buildprobe max-satisfying 6 --available 6.0.1,6.0.25,7.0.0\n  \
                      buildprobe max-satisfying 8.0.x --available 8.0.1 --available 8.0.3"
    )]
    MaxSatisfying(MaxSatisfyingArgs),
}

#[derive(Parser, Debug, Clone)]
pub struct DetectArgs {
    #[arg(
        value_name = "PATH",
        help = "Path to repository (defaults to current directory)"
    )]
    pub repository_path: Option<PathBuf>,

    #[arg(
        short = 'f',
        long,
        value_enum,
        default_value = "human",
        help = "Output format"
    )]
    pub format: OutputFormatArg,

    #[arg(
        short = 'p',
        long,
        value_name = "FILE",
        help = "Project file to build, relative to the repository root"
    )]
    pub project: Option<PathBuf>,

    #[arg(
        short = 't',
        long,
        value_name = "TYPE",
        help = "Kind of project to pick: webapps, functions, static-sites, blazor-wasm"
    )]
    pub app_type: Option<String>,

    #[arg(
        short = 'r',
        long,
        value_name = "VERSION",
        help = "Runtime version to use instead of the target framework"
    )]
    pub runtime_version: Option<String>,

    #[arg(long, help = "Select the SDK with global.json roll-forward rules")]
    pub dynamic_install: bool,

    #[arg(long, help = "Only look for project files in the repository root")]
    pub no_recursive: bool,
}

#[derive(Parser, Debug, Clone)]
pub struct ResolveSdkArgs {
    #[arg(
        value_name = "PATH",
        help = "Path to repository (defaults to current directory)"
    )]
    pub repository_path: Option<PathBuf>,

    #[arg(
        short = 'r',
        long,
        value_name = "VERSION",
        help = "Runtime version used when the repository has no global.json"
    )]
    pub runtime_version: Option<String>,

    #[arg(
        short = 's',
        long = "sdk",
        value_name = "VERSION",
        value_delimiter = ',',
        help = "Available SDK versions (defaults to the version catalog)"
    )]
    pub sdks: Vec<String>,

    #[arg(
        short = 'f',
        long,
        value_enum,
        default_value = "human",
        help = "Output format"
    )]
    pub format: OutputFormatArg,
}

#[derive(Parser, Debug, Clone)]
pub struct MaxSatisfyingArgs {
    #[arg(value_name = "VERSION", help = "Requested version, e.g. 6, 6.0 or 6.0.x")]
    pub version: String,

    #[arg(
        short = 'a',
        long,
        value_name = "VERSION",
        value_delimiter = ',',
        required = true,
        help = "Candidate versions"
    )]
    pub available: Vec<String>,

    #[arg(
        short = 'f',
        long,
        value_enum,
        default_value = "human",
        help = "Output format"
    )]
    pub format: OutputFormatArg,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormatArg {
    Json,
    Yaml,
    Human,
}

impl From<OutputFormatArg> for super::output::OutputFormat {
    fn from(arg: OutputFormatArg) -> Self {
        match arg {
            OutputFormatArg::Json => super::output::OutputFormat::Json,
            OutputFormatArg::Yaml => super::output::OutputFormat::Yaml,
            OutputFormatArg::Human => super::output::OutputFormat::Human,
        }
    }
}
