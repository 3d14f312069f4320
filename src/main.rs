use buildprobe::cli::commands::{CliArgs, Commands, DetectArgs, MaxSatisfyingArgs, ResolveSdkArgs};
use buildprobe::cli::output::{
    DetectionReport, MaxSatisfyingReport, OutputFormat, OutputFormatter, SdkReport,
};
use buildprobe::cli::exit_code;
use buildprobe::util::logging;
use buildprobe::{
    max_satisfying, BuildprobeConfig, DotNetDetector, ResolutionError, SdkResolver, SourceRepo,
    VersionCatalog, VERSION,
};

use clap::Parser;
use std::env;
use std::path::PathBuf;
use tracing::{debug, error, info};

fn main() {
    let args = CliArgs::parse();
    init_logging_from_args(&args);

    debug!("buildprobe v{} starting", VERSION);
    debug!("Arguments: {:?}", args);

    let exit_code = match &args.command {
        Commands::Detect(detect_args) => handle_detect(detect_args),
        Commands::ResolveSdk(resolve_args) => handle_resolve_sdk(resolve_args),
        Commands::MaxSatisfying(max_args) => handle_max_satisfying(max_args),
    };

    std::process::exit(exit_code);
}

fn init_logging_from_args(args: &CliArgs) {
    if let Some(level) = &args.log_level {
        logging::with_level(level);
    } else if args.verbose {
        logging::with_level("debug");
    } else if args.quiet {
        logging::with_level("error");
    } else {
        logging::init_from_env();
    }
}

fn open_repo(path: Option<&PathBuf>) -> Result<SourceRepo, i32> {
    let path = match path {
        Some(path) => path.clone(),
        None => match env::current_dir() {
            Ok(dir) => dir,
            Err(e) => {
                error!("Failed to get current directory: {}", e);
                return Err(1);
            }
        },
    };
    debug!("Repository path: {}", path.display());

    SourceRepo::open(&path).map_err(|e| {
        error!("{:#}", e);
        1
    })
}

fn load_config(configure: impl FnOnce(&mut BuildprobeConfig)) -> Result<BuildprobeConfig, i32> {
    let mut config = BuildprobeConfig::default();
    configure(&mut config);

    if let Err(e) = config.validate() {
        error!("Configuration error: {}", e);
        eprintln!("\nPlease check your environment variables and command-line arguments.");
        return Err(1);
    }
    debug!("{}", config);
    Ok(config)
}

fn report_failure(err: &ResolutionError) -> i32 {
    error!(kind = ?err.kind(), "{}", err);
    eprintln!("\n{}", err.help_message());
    exit_code(err.kind())
}

fn print_output(output: anyhow::Result<String>) -> i32 {
    match output {
        Ok(text) => {
            print!("{}", text);
            0
        }
        Err(e) => {
            error!("Failed to format output: {:#}", e);
            1
        }
    }
}

fn handle_detect(args: &DetectArgs) -> i32 {
    info!("Starting .NET detection");

    let repo = match open_repo(args.repository_path.as_ref()) {
        Ok(repo) => repo,
        Err(code) => return code,
    };

    let config = match load_config(|config| {
        if let Some(project) = &args.project {
            config.project = Some(project.clone());
        }
        if let Some(app_type) = &args.app_type {
            config.app_type = Some(app_type.to_lowercase());
        }
        if let Some(runtime) = &args.runtime_version {
            config.runtime_version = Some(runtime.clone());
        }
        config.disable_recursive_lookup |= args.no_recursive;
        config.enable_dynamic_install |= args.dynamic_install;
    }) {
        Ok(config) => config,
        Err(code) => return code,
    };

    let catalog = match config.version_catalog() {
        Ok(catalog) => catalog,
        Err(e) => {
            error!("Failed to load version catalog: {:#}", e);
            return 1;
        }
    };

    let detector = DotNetDetector::new(catalog, config.detector_options());
    let result = match detector.detect(&repo) {
        Ok(result) => result,
        Err(e) => return report_failure(&e),
    };

    let report = DetectionReport::new(repo.root().to_path_buf(), result);
    let formatter = OutputFormatter::new(OutputFormat::from(args.format));
    print_output(formatter.format_detection(&report))
}

fn handle_resolve_sdk(args: &ResolveSdkArgs) -> i32 {
    let repo = match open_repo(args.repository_path.as_ref()) {
        Ok(repo) => repo,
        Err(code) => return code,
    };

    let config = match load_config(|config| {
        if let Some(runtime) = &args.runtime_version {
            config.runtime_version = Some(runtime.clone());
        }
    }) {
        Ok(config) => config,
        Err(code) => return code,
    };

    let available = if args.sdks.is_empty() {
        let catalog = config
            .version_catalog()
            .and_then(|catalog| catalog.available_sdk_versions());
        match catalog {
            Ok(sdks) => sdks,
            Err(e) => {
                error!("Failed to load version catalog: {:#}", e);
                return 1;
            }
        }
    } else {
        args.sdks.clone()
    };

    let sdk_version =
        match SdkResolver::new().resolve(&repo, config.runtime_version.as_deref(), &available) {
            Ok(sdk) => sdk,
            Err(e) => return report_failure(&e),
        };
    info!(sdk = ?sdk_version, "SDK resolution finished");

    let report = SdkReport {
        repository: repo.root().to_path_buf(),
        runtime_version: config.runtime_version,
        available,
        sdk_version,
    };
    let formatter = OutputFormatter::new(OutputFormat::from(args.format));
    print_output(formatter.format_sdk(&report))
}

fn handle_max_satisfying(args: &MaxSatisfyingArgs) -> i32 {
    let resolved = max_satisfying(&args.version, &args.available);
    debug!(requested = %args.version, resolved = ?resolved, "Range resolution finished");

    let report = MaxSatisfyingReport {
        requested: args.version.clone(),
        available: args.available.clone(),
        resolved,
    };
    let formatter = OutputFormatter::new(OutputFormat::from(args.format));
    let code = print_output(formatter.format_max_satisfying(&report));
    if code == 0 && report.resolved.is_none() {
        return exit_code(buildprobe::ErrorKind::NotFound);
    }
    code
}
