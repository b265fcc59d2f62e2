//! `kiln -version`

use crate::core::version::BuildInfo;

pub fn execute() -> anyhow::Result<()> {
    println!("{}", BuildInfo::current().version_line());
    Ok(())
}
