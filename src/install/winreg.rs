use super::paths::chrome_winreg_path;
use std::{io, path::Path};
use winreg::{enums::HKEY_CURRENT_USER, RegKey};

/// Point Chrome at the host manifest via the HKCU registry value it reads for
/// `host_name`.
pub fn write_host_registry_key(host_name: &str, manifest_path: &Path) -> io::Result<()> {
    let hkcu = RegKey::predef(HKEY_CURRENT_USER);
    let (key, _) = hkcu.create_subkey(chrome_winreg_path(host_name))?;
    let value = manifest_path.to_string_lossy().into_owned();
    key.set_value("", &value)?;
    Ok(())
}

