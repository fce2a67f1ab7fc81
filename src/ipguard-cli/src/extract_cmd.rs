//! `ipguard extract` - strip ports from raw peer addresses.

use std::process::ExitCode;

use anyhow::Result;
use clap::Parser;
use ipguard_access::extract_address;

/// Extract CLI command.
#[derive(Debug, Parser)]
#[command(about = "Strip the port from raw peer addresses")]
pub struct ExtractCli {
    /// Raw peer addresses (`host:port`, `[v6]:port` or bare IPs).
    #[arg(value_name = "PEER", required = true)]
    pub inputs: Vec<String>,
}

impl ExtractCli {
    /// Run the extract command.
    ///
    /// Prints one line per input; unusable inputs print an empty line and
    /// make the command exit non-zero.
    pub fn run(self) -> Result<ExitCode> {
        let mut all_usable = true;
        for input in &self.inputs {
            let address = extract_address(input);
            all_usable &= !address.is_empty();
            println!("{address}");
        }

        Ok(if all_usable {
            ExitCode::SUCCESS
        } else {
            ExitCode::FAILURE
        })
    }
}
