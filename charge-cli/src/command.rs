use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(
    name = "charge",
    version = "0.1.0",
    about = "Battery charging control for Apple laptops"
)]
pub struct CliArgs {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Stop the battery from charging
    Disable,

    /// Allow the battery to charge again
    Enable,

    /// Get or set the maximum charge level
    Limit {
        #[arg(
            value_parser = clap::value_parser!(u8).range(0..=100),
            help = "Charge cap as a percentage (0-100); omit to print the current cap"
        )]
        percent: Option<u8>,
    },

    /// Read a single SMC key and display its value
    Read {
        #[arg(help = "Four-character SMC key name (e.g. CH0B, BCLM)")]
        key: String,
    },

    /// Write a value to a SMC key
    Write {
        #[arg(
            help = "Four-character SMC key name (e.g. CH0B, BCLM)"
        )]
        key: String,
        #[arg(
            help = "Hexadecimal value to write (without `0x` prefix), for 0x02 write 02"
        )]
        value: String,
    },
}
