//! MSBuild project file (`.csproj` / `.fsproj`) reading and classification.

use super::constants::{
    BLAZOR_WASM_PACKAGE_NAME, DEFAULT_OUTPUT_TYPE, FUNCTIONS_PACKAGE_NAME,
    FUNCTIONS_VERSION_PROPERTY, WEB_SDK_NAME,
};
use crate::error::ResolutionError;
use regex::Regex;
use roxmltree::{Document, Node};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;
use std::sync::OnceLock;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ProjectKind {
    WebApplication,
    FunctionApplication,
    StaticClientApplication,
    Other,
}

impl ProjectKind {
    /// Order used by the recursive probe when no kind was requested
    pub const PRECEDENCE: [ProjectKind; 4] = [
        ProjectKind::WebApplication,
        ProjectKind::StaticClientApplication,
        ProjectKind::FunctionApplication,
        ProjectKind::Other,
    ];

    pub fn display_name(&self) -> &'static str {
        match self {
            ProjectKind::WebApplication => "web application",
            ProjectKind::FunctionApplication => "function application",
            ProjectKind::StaticClientApplication => "static client application",
            ProjectKind::Other => "project",
        }
    }

    /// Maps an application-type switch (`webapps`, `functions`, `static-sites`,
    /// `blazor-wasm`) to a kind filter.
    pub fn from_app_type(app_type: &str) -> Option<ProjectKind> {
        let app_type = app_type.trim().to_ascii_lowercase();
        if app_type.contains("functions") {
            Some(ProjectKind::FunctionApplication)
        } else if app_type.contains("static-sites") || app_type.contains("blazor-wasm") {
            Some(ProjectKind::StaticClientApplication)
        } else if app_type.contains("webapps") {
            Some(ProjectKind::WebApplication)
        } else {
            None
        }
    }
}

impl fmt::Display for ProjectKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

/// What a project file declares about itself
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectDescriptor {
    pub kind: ProjectKind,
    pub sdks: Vec<String>,
    pub target_framework: Option<String>,
    pub output_type: String,
    pub assembly_name: Option<String>,
    pub package_references: Vec<String>,
}

impl ProjectDescriptor {
    pub fn parse(content: &str) -> Result<Self, ResolutionError> {
        let content = content.trim_start_matches('\u{feff}').trim_start();
        let doc = Document::parse(content)
            .map_err(|e| ResolutionError::MalformedInput(format!("invalid project file: {}", e)))?;
        let project = doc.root_element();

        let mut sdks: Vec<String> = project
            .attribute("Sdk")
            .map(|value| {
                value
                    .split(';')
                    .map(str::trim)
                    .filter(|s| !s.is_empty())
                    .map(String::from)
                    .collect()
            })
            .unwrap_or_default();
        let attribute_sdk_count = sdks.len();
        sdks.extend(
            children(project, "Sdk")
                .filter_map(|sdk| sdk.attribute("Name"))
                .map(|name| name.trim().to_string()),
        );

        let target_framework = property(project, "TargetFramework").or_else(|| {
            property(project, "TargetFrameworks").and_then(|all| {
                all.split(';')
                    .map(str::trim)
                    .find(|tfm| !tfm.is_empty())
                    .map(String::from)
            })
        });

        let package_references: Vec<String> = children(project, "ItemGroup")
            .flat_map(|group| children(group, "PackageReference"))
            .filter_map(|reference| reference.attribute("Include"))
            .map(|name| name.trim().to_string())
            .collect();

        let has_package = |name: &str| {
            package_references
                .iter()
                .any(|reference| reference.eq_ignore_ascii_case(name))
        };

        // The Sdk attribute may carry a version suffix (`Microsoft.NET.Sdk.Web/1.0.0`),
        // so it is prefix-matched; `<Sdk Name>` elements must match exactly.
        let web_sdk = sdks.iter().enumerate().any(|(i, sdk)| {
            if i < attribute_sdk_count {
                starts_with_ignore_case(sdk, WEB_SDK_NAME)
            } else {
                sdk.eq_ignore_ascii_case(WEB_SDK_NAME)
            }
        });

        let kind = if has_package(BLAZOR_WASM_PACKAGE_NAME) {
            ProjectKind::StaticClientApplication
        } else if property(project, FUNCTIONS_VERSION_PROPERTY).is_some()
            || has_package(FUNCTIONS_PACKAGE_NAME)
        {
            ProjectKind::FunctionApplication
        } else if web_sdk {
            ProjectKind::WebApplication
        } else {
            ProjectKind::Other
        };

        Ok(Self {
            kind,
            sdks,
            target_framework,
            output_type: property(project, "OutputType")
                .unwrap_or_else(|| DEFAULT_OUTPUT_TYPE.to_string()),
            assembly_name: property(project, "AssemblyName"),
            package_references,
        })
    }

    /// Assembly name, falling back to the project file's stem
    pub fn assembly_name_or_default(&self, project_file: &Path) -> Option<String> {
        self.assembly_name.clone().or_else(|| {
            project_file
                .file_stem()
                .and_then(|stem| stem.to_str())
                .map(String::from)
        })
    }

    /// Coarse runtime version the project targets, e.g. `net8.0` → `8.0`
    pub fn runtime_version(&self) -> Option<String> {
        self.target_framework
            .as_deref()
            .and_then(runtime_version_from_target_framework)
    }

    /// Blazor WebAssembly builds need the wasm-tools workload
    pub fn install_aot_workloads(&self) -> bool {
        self.kind == ProjectKind::StaticClientApplication
    }
}

fn children<'a, 'input: 'a>(
    node: Node<'a, 'input>,
    name: &'a str,
) -> impl Iterator<Item = Node<'a, 'input>> + 'a {
    node.children()
        .filter(move |child| child.is_element() && child.has_tag_name(name))
}

/// First non-empty `/Project/PropertyGroup/<name>` value
fn property(project: Node, name: &str) -> Option<String> {
    children(project, "PropertyGroup")
        .flat_map(|group| children(group, name))
        .filter_map(|node| node.text())
        .map(str::trim)
        .find(|text| !text.is_empty())
        .map(String::from)
}

fn starts_with_ignore_case(value: &str, prefix: &str) -> bool {
    value
        .get(..prefix.len())
        .is_some_and(|head| head.eq_ignore_ascii_case(prefix))
}

fn version_pattern() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^\d+(\.\d+)?$").expect("valid regex"))
}

/// Maps a target framework moniker to a runtime version.
///
/// `netcoreapp3.1` → `3.1`, `net8.0-windows` → `8.0`, `net48` → `4.8`. Monikers without a
/// numeric version (`netstandard2.1`, `uap10.0`) yield `None`.
pub fn runtime_version_from_target_framework(tfm: &str) -> Option<String> {
    let tfm = tfm.trim().to_ascii_lowercase();
    let tfm = tfm.split('-').next().unwrap_or_default();

    let version = tfm
        .strip_prefix("netcoreapp")
        .or_else(|| tfm.strip_prefix("net"))?;

    let version = if !version.contains('.') && version.len() > 1 {
        let (head, tail) = version.split_at(version.chars().next().map_or(0, char::len_utf8));
        format!("{}.{}", head, tail)
    } else {
        version.to_string()
    };

    version_pattern().is_match(&version).then_some(version)
}

#[cfg(test)]
mod tests {
    use super::*;
    use yare::parameterized;

    const WEB_SDK_PROJECT: &str = r#"
        <Project Sdk="Microsoft.NET.Sdk.Web">
          <PropertyGroup>
            <LangVersion>7.3</LangVersion>
            <TargetFramework>netcoreapp2.1</TargetFramework>
          </PropertyGroup>
          <ItemGroup>
            <PackageReference Include="Microsoft.AspNetCore" Version="2.1.0" />
          </ItemGroup>
        </Project>"#;

    const FUNCTIONS_PROJECT: &str = r#"
        <Project Sdk="Microsoft.NET.Sdk">
          <PropertyGroup>
            <TargetFramework>netcoreapp2.1</TargetFramework>
            <AzureFunctionsVersion>v2</AzureFunctionsVersion>
          </PropertyGroup>
          <ItemGroup>
            <PackageReference Include="Microsoft.NET.Sdk.Functions" Version="1.0.28" />
          </ItemGroup>
        </Project>"#;

    const BLAZOR_PROJECT: &str = r#"
        <Project Sdk="Microsoft.NET.Sdk.BlazorWebAssembly">
          <PropertyGroup>
            <TargetFramework>net5.0</TargetFramework>
          </PropertyGroup>
          <ItemGroup>
            <PackageReference Include="Microsoft.AspNetCore.Components.WebAssembly" Version="5.0.0" />
            <PackageReference Include="System.Net.Http.Json" Version="5.0.0" />
          </ItemGroup>
        </Project>"#;

    #[test]
    fn test_web_sdk_project() {
        let descriptor = ProjectDescriptor::parse(WEB_SDK_PROJECT).unwrap();

        assert_eq!(descriptor.kind, ProjectKind::WebApplication);
        assert_eq!(descriptor.sdks, vec!["Microsoft.NET.Sdk.Web"]);
        assert_eq!(descriptor.target_framework.as_deref(), Some("netcoreapp2.1"));
        assert_eq!(descriptor.runtime_version().as_deref(), Some("2.1"));
        assert_eq!(descriptor.output_type, "Library");
        assert_eq!(descriptor.package_references, vec!["Microsoft.AspNetCore"]);
        assert!(!descriptor.install_aot_workloads());
    }

    #[test]
    fn test_web_sdk_attribute_with_version_suffix() {
        let descriptor = ProjectDescriptor::parse(
            r#"<Project Sdk="microsoft.net.sdk.web/1.0.0"><PropertyGroup /></Project>"#,
        )
        .unwrap();
        assert_eq!(descriptor.kind, ProjectKind::WebApplication);
    }

    #[test]
    fn test_web_sdk_element() {
        let descriptor = ProjectDescriptor::parse(
            r#"<Project>
                 <Sdk Name="Microsoft.NET.Sdk.Web" Version="1.0.0" />
                 <PropertyGroup><TargetFramework>net6.0</TargetFramework></PropertyGroup>
               </Project>"#,
        )
        .unwrap();
        assert_eq!(descriptor.kind, ProjectKind::WebApplication);

        // Elements are matched exactly, not by prefix
        let descriptor = ProjectDescriptor::parse(
            r#"<Project><Sdk Name="Microsoft.NET.Sdk.Web/1.0.0" /></Project>"#,
        )
        .unwrap();
        assert_eq!(descriptor.kind, ProjectKind::Other);
    }

    #[test]
    fn test_functions_project() {
        let descriptor = ProjectDescriptor::parse(FUNCTIONS_PROJECT).unwrap();
        assert_eq!(descriptor.kind, ProjectKind::FunctionApplication);
    }

    #[test]
    fn test_functions_project_by_package_only() {
        let descriptor = ProjectDescriptor::parse(
            r#"<Project Sdk="Microsoft.NET.Sdk">
                 <ItemGroup>
                   <PackageReference Include="microsoft.net.sdk.functions" Version="1.0.28" />
                 </ItemGroup>
               </Project>"#,
        )
        .unwrap();
        assert_eq!(descriptor.kind, ProjectKind::FunctionApplication);
    }

    #[test]
    fn test_blazor_wins_over_web_sdk() {
        let descriptor = ProjectDescriptor::parse(
            r#"<Project Sdk="Microsoft.NET.Sdk.Web">
                 <ItemGroup>
                   <PackageReference Include="Microsoft.AspNetCore.Components.WebAssembly" Version="3.2.0" />
                 </ItemGroup>
               </Project>"#,
        )
        .unwrap();
        assert_eq!(descriptor.kind, ProjectKind::StaticClientApplication);

        let descriptor = ProjectDescriptor::parse(BLAZOR_PROJECT).unwrap();
        assert_eq!(descriptor.kind, ProjectKind::StaticClientApplication);
        assert!(descriptor.install_aot_workloads());
    }

    #[test]
    fn test_non_web_sdk_project() {
        let descriptor = ProjectDescriptor::parse(
            r#"<Project Sdk="Microsoft.NET.Sdk.Razor">
                 <PropertyGroup>
                   <TargetFramework>netcoreapp2.1</TargetFramework>
                   <OutputType>Exe</OutputType>
                   <AssemblyName>Tools</AssemblyName>
                 </PropertyGroup>
               </Project>"#,
        )
        .unwrap();

        assert_eq!(descriptor.kind, ProjectKind::Other);
        assert_eq!(descriptor.output_type, "Exe");
        assert_eq!(descriptor.assembly_name.as_deref(), Some("Tools"));
    }

    #[test]
    fn test_missing_target_framework_is_not_an_error() {
        let descriptor =
            ProjectDescriptor::parse(r#"<Project Sdk="Microsoft.NET.Sdk.Web"></Project>"#).unwrap();

        assert_eq!(descriptor.target_framework, None);
        assert_eq!(descriptor.runtime_version(), None);
    }

    #[test]
    fn test_multi_target_uses_first_framework() {
        let descriptor = ProjectDescriptor::parse(
            r#"<Project Sdk="Microsoft.NET.Sdk">
                 <PropertyGroup><TargetFrameworks>net8.0;net6.0</TargetFrameworks></PropertyGroup>
               </Project>"#,
        )
        .unwrap();

        assert_eq!(descriptor.target_framework.as_deref(), Some("net8.0"));
        assert_eq!(descriptor.runtime_version().as_deref(), Some("8.0"));
    }

    #[test]
    fn test_default_assembly_name_is_file_stem() {
        let descriptor = ProjectDescriptor::parse(WEB_SDK_PROJECT).unwrap();
        assert_eq!(
            descriptor
                .assembly_name_or_default(Path::new("src/WebApp1/WebApp1.csproj"))
                .as_deref(),
            Some("WebApp1")
        );
    }

    #[test]
    fn test_malformed_xml() {
        let err = ProjectDescriptor::parse("<Project><PropertyGroup></Project>").unwrap_err();
        assert!(matches!(err, ResolutionError::MalformedInput(_)));
    }

    #[test]
    fn test_xml_namespace_is_ignored() {
        let descriptor = ProjectDescriptor::parse(
            r#"<?xml version="1.0" encoding="utf-8"?>
               <Project ToolsVersion="15.0" xmlns="http://schemas.microsoft.com/developer/msbuild/2003">
                 <PropertyGroup><TargetFramework>netcoreapp3.1</TargetFramework></PropertyGroup>
               </Project>"#,
        )
        .unwrap();
        assert_eq!(descriptor.runtime_version().as_deref(), Some("3.1"));
    }

    #[parameterized(
        netcoreapp = { "netcoreapp3.1", Some("3.1") },
        net = { "net8.0", Some("8.0") },
        uppercase = { "NET6.0", Some("6.0") },
        platform_suffix = { "net8.0-windows", Some("8.0") },
        platform_version_suffix = { "net7.0-android33.0", Some("7.0") },
        framework_alias = { "net48", Some("4.8") },
        framework_three_digits = { "net472", Some("4.72") },
        major_only = { "net5", Some("5") },
        netstandard = { "netstandard2.1", None },
        other_prefix = { "uap10.0", None },
        empty = { "", None },
        bare_net = { "net", None },
    )]
    fn test_runtime_version_from_target_framework(tfm: &str, expected: Option<&str>) {
        assert_eq!(runtime_version_from_target_framework(tfm).as_deref(), expected);
    }

    #[parameterized(
        webapps = { "webapps", Some(ProjectKind::WebApplication) },
        functions = { "Functions", Some(ProjectKind::FunctionApplication) },
        static_sites = { "static-sites", Some(ProjectKind::StaticClientApplication) },
        blazor = { "blazor-wasm", Some(ProjectKind::StaticClientApplication) },
        unknown = { "containers", None },
    )]
    fn test_kind_from_app_type(app_type: &str, expected: Option<ProjectKind>) {
        assert_eq!(ProjectKind::from_app_type(app_type), expected);
    }
}
