use std::{io::Write, sync::Arc};

use anyhow::Context;
use respack_core::{AssetType, OsSystemApi, ResourceData, ResourceLocator};

use crate::{CatCommand, config::LocatorConfig};

pub fn cat(cmd: &CatCommand) -> anyhow::Result<()> {
    let asset_type: AssetType = cmd.asset_type.parse()?;

    let mut locator = ResourceLocator::new(Arc::new(OsSystemApi::new()));
    match (&cmd.config, &cmd.pack) {
        (Some(config), _) => LocatorConfig::from_file(config)?.add_to(&mut locator)?,
        (None, Some(pack)) => locator
            .add_pack(pack, &cmd.key, false, 0)
            .with_context(|| format!("Failed to open pack `{}`", pack))?,
        (None, None) => anyhow::bail!("Either a pack or a config file is required"),
    }

    let data = locator
        .get_resource(&cmd.name, asset_type, cmd.stream)
        .with_context(|| format!("Failed to read {}:{}", asset_type, cmd.name))?;
    log::debug!("Read {:?}", data);

    let mut stdout = std::io::stdout().lock();
    match data {
        ResourceData::Static(data) => stdout.write_all(data.bytes())?,
        ResourceData::Stream(mut data) => {
            std::io::copy(&mut data, &mut stdout)?;
        }
    }
    stdout.flush()?;

    Ok(())
}
