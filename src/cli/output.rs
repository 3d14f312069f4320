//! Output formatting for detection and version reports
//!
//! Every report serializes to JSON or YAML as-is; the human format is a short
//! aligned summary.

use anyhow::{Context, Result};
use serde::Serialize;
use std::path::PathBuf;

use crate::dotnet::PlatformDetectorResult;

const RULE: &str = "\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\n";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Json,
    Yaml,
    Human,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DetectionReport {
    pub repository: PathBuf,
    pub detected: bool,
    pub result: Option<PlatformDetectorResult>,
}

impl DetectionReport {
    pub fn new(repository: PathBuf, result: Option<PlatformDetectorResult>) -> Self {
        Self {
            repository,
            detected: result.is_some(),
            result,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SdkReport {
    pub repository: PathBuf,
    pub runtime_version: Option<String>,
    pub available: Vec<String>,
    pub sdk_version: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MaxSatisfyingReport {
    pub requested: String,
    pub available: Vec<String>,
    pub resolved: Option<String>,
}

pub struct OutputFormatter {
    format: OutputFormat,
}

impl OutputFormatter {
    pub fn new(format: OutputFormat) -> Self {
        Self { format }
    }

    pub fn format_detection(&self, report: &DetectionReport) -> Result<String> {
        match self.format {
            OutputFormat::Json => to_json(report),
            OutputFormat::Yaml => to_yaml(report),
            OutputFormat::Human => Ok(detection_human(report)),
        }
    }

    pub fn format_sdk(&self, report: &SdkReport) -> Result<String> {
        match self.format {
            OutputFormat::Json => to_json(report),
            OutputFormat::Yaml => to_yaml(report),
            OutputFormat::Human => Ok(sdk_human(report)),
        }
    }

    pub fn format_max_satisfying(&self, report: &MaxSatisfyingReport) -> Result<String> {
        match self.format {
            OutputFormat::Json => to_json(report),
            OutputFormat::Yaml => to_yaml(report),
            OutputFormat::Human => Ok(match &report.resolved {
                Some(version) => format!("{}\n", version),
                None => format!(
                    "\u{2717} No version matching '{}' in: {}\n",
                    report.requested,
                    report.available.join(", ")
                ),
            }),
        }
    }
}

fn to_json<T: Serialize>(value: &T) -> Result<String> {
    serde_json::to_string_pretty(value).context("Failed to serialize report to JSON")
}

fn to_yaml<T: Serialize>(value: &T) -> Result<String> {
    serde_yaml::to_string(value).context("Failed to serialize report to YAML")
}

fn detection_human(report: &DetectionReport) -> String {
    let mut output = String::new();

    let Some(result) = &report.result else {
        output.push_str(&format!(
            "\u{2717} No .NET application detected in {}\n",
            report.repository.display()
        ));
        return output;
    };

    output.push_str("\u{2713} .NET Application Detected\n");
    output.push_str(RULE);
    output.push('\n');

    output.push_str(&format!("Project:         {}\n", result.project_file.display()));
    let app_directory = if result.app_directory.as_os_str().is_empty() {
        ".".to_string()
    } else {
        result.app_directory.display().to_string()
    };
    output.push_str(&format!("App Directory:   {}\n", app_directory));
    if let Some(assembly) = &result.assembly_name {
        output.push_str(&format!("Assembly:        {}\n", assembly));
    }
    output.push_str(&format!("Output Type:     {}\n\n", result.output_type));

    output.push_str("Versions:\n");
    output.push_str(&format!("\u{251C}\u{2500} Runtime:  {}\n", result.runtime_version));
    output.push_str(&format!(
        "\u{2514}\u{2500} SDK:      {}\n",
        result.sdk_version.as_deref().unwrap_or("(not resolved)")
    ));

    if result.install_aot_workloads {
        output.push_str("\nWorkloads: wasm-tools (Blazor WebAssembly AOT)\n");
    }

    output
}

fn sdk_human(report: &SdkReport) -> String {
    let mut output = String::new();
    match &report.sdk_version {
        Some(sdk) => output.push_str(&format!("\u{2713} SDK {}\n", sdk)),
        None => output.push_str("\u{2717} No SDK satisfies the roll-forward rules\n"),
    }
    if let Some(runtime) = &report.runtime_version {
        output.push_str(&format!("  Runtime:   {}\n", runtime));
    }
    output.push_str(&format!("  Available: {}\n", report.available.join(", ")));
    output
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dotnet::Platform;

    fn detected() -> DetectionReport {
        DetectionReport::new(
            PathBuf::from("/src/app"),
            Some(PlatformDetectorResult {
                platform: Platform::DotNet,
                runtime_version: "8.0.1".to_string(),
                sdk_version: Some("8.0.101".to_string()),
                project_file: PathBuf::from("src/Web/Web.csproj"),
                app_directory: PathBuf::from("src/Web"),
                output_type: "Library".to_string(),
                assembly_name: Some("Web".to_string()),
                install_aot_workloads: false,
            }),
        )
    }

    #[test]
    fn test_json_uses_camel_case_fields() {
        let formatter = OutputFormatter::new(OutputFormat::Json);
        let output = formatter.format_detection(&detected()).unwrap();
        let value: serde_json::Value = serde_json::from_str(&output).unwrap();

        assert_eq!(value["detected"], true);
        assert_eq!(value["result"]["platform"], "dotnet");
        assert_eq!(value["result"]["runtimeVersion"], "8.0.1");
        assert_eq!(value["result"]["projectFile"], "src/Web/Web.csproj");
        assert_eq!(value["result"]["installAotWorkloads"], false);
    }

    #[test]
    fn test_yaml_output() {
        let formatter = OutputFormatter::new(OutputFormat::Yaml);
        let output = formatter.format_detection(&detected()).unwrap();
        assert!(output.contains("sdkVersion: 8.0.101"));
        assert!(output.contains("detected: true"));
    }

    #[test]
    fn test_human_output() {
        let formatter = OutputFormatter::new(OutputFormat::Human);
        let output = formatter.format_detection(&detected()).unwrap();
        assert!(output.contains(".NET Application Detected"));
        assert!(output.contains("Project:         src/Web/Web.csproj"));
        assert!(output.contains("Runtime:  8.0.1"));
        assert!(output.contains("SDK:      8.0.101"));
        assert!(!output.contains("Workloads"));

        let missing = DetectionReport::new(PathBuf::from("/src/empty"), None);
        let output = formatter.format_detection(&missing).unwrap();
        assert!(output.contains("No .NET application detected in /src/empty"));
    }

    #[test]
    fn test_max_satisfying_human_prints_bare_version() {
        let formatter = OutputFormatter::new(OutputFormat::Human);
        let report = MaxSatisfyingReport {
            requested: "6".to_string(),
            available: vec!["6.0.1".to_string(), "6.0.25".to_string()],
            resolved: Some("6.0.25".to_string()),
        };
        assert_eq!(formatter.format_max_satisfying(&report).unwrap(), "6.0.25\n");
    }

    #[test]
    fn test_sdk_report_json() {
        let formatter = OutputFormatter::new(OutputFormat::Json);
        let report = SdkReport {
            repository: PathBuf::from("/src/app"),
            runtime_version: None,
            available: vec!["8.0.100".to_string()],
            sdk_version: None,
        };
        let value: serde_json::Value =
            serde_json::from_str(&formatter.format_sdk(&report).unwrap()).unwrap();
        assert!(value["sdkVersion"].is_null());
        assert_eq!(value["available"][0], "8.0.100");
    }
}
