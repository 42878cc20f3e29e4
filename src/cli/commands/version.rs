use crate::cli::output::Output;
use crate::errors::Result;
use crate::model::SourceCodeType;

/// Show version information
pub async fn run() -> Result<()> {
    Output::section("scm-sync");
    Output::sub_item(format!("Version: {}", env!("CARGO_PKG_VERSION")));
    Output::sub_item(format!("Description: {}", env!("CARGO_PKG_DESCRIPTION")));

    Output::section("Build Information");
    Output::sub_item(format!("Rust version: {}", env!("CARGO_PKG_RUST_VERSION")));
    Output::sub_item(format!("Target: {}", std::env::consts::ARCH));
    Output::sub_item(format!("OS: {}", std::env::consts::OS));

    Output::section("Providers");
    for source_code_type in SourceCodeType::ALL {
        Output::sub_item(format!("{} ({})", source_code_type.display_name(), source_code_type));
    }

    Ok(())
}
