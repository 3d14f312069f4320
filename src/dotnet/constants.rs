pub const PLATFORM_NAME: &str = "dotnet";

/// Project-file extensions in probing priority order
pub const PROJECT_FILE_EXTENSIONS: [&str; 2] = ["csproj", "fsproj"];

pub const WEB_SDK_NAME: &str = "Microsoft.NET.Sdk.Web";
pub const FUNCTIONS_PACKAGE_NAME: &str = "Microsoft.NET.Sdk.Functions";
pub const FUNCTIONS_VERSION_PROPERTY: &str = "AzureFunctionsVersion";
pub const BLAZOR_WASM_PACKAGE_NAME: &str = "Microsoft.AspNetCore.Components.WebAssembly";

pub const DEFAULT_OUTPUT_TYPE: &str = "Library";
