//! Backend information commands

use spihal_bus::{BackendInfo, BackendKind};

fn backend_info(backend: Option<&str>) -> Result<(BackendInfo, u64), Box<dyn std::error::Error>> {
    match backend {
        Some(name) => {
            let kind = BackendKind::from_name(name)?;
            Ok((kind.info(), kind.max_transfer_size()))
        }
        None => Ok((spihal_bus::info(), spihal_bus::max_transfer_size())),
    }
}

/// Print backend identification
pub fn cmd_info(backend: Option<&str>) -> Result<(), Box<dyn std::error::Error>> {
    let (info, _) = backend_info(backend)?;

    println!("Backend:        {}", info.name);
    println!("Description:    {}", info.description);
    if let Some(kernel_version) = &info.kernel_version {
        println!("Kernel version: {}", kernel_version);
    }
    if let Some(machine) = &info.machine {
        println!("Machine:        {}", machine);
    }
    Ok(())
}

/// Print the advisory single-exchange size
pub fn cmd_max_transfer_size(backend: Option<&str>) -> Result<(), Box<dyn std::error::Error>> {
    let (_, size) = backend_info(backend)?;
    println!("{}", size);
    Ok(())
}
