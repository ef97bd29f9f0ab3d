use ethercomms_transport::Interface;

use crate::cmd::InterfacesArgs;
use crate::exit::{transport_error, CliResult, SUCCESS};
use crate::output::{print_interfaces, OutputFormat};

pub fn run(_args: InterfacesArgs, format: OutputFormat) -> CliResult<i32> {
    let interfaces =
        Interface::list().map_err(|err| transport_error("failed to list interfaces", err))?;
    print_interfaces(&interfaces, format);
    Ok(SUCCESS)
}
