use clap::Subcommand;

#[derive(Subcommand)]
pub enum Commands {
    /// Read newline-delimited JSON records from stdin and write them to the table
    Run {
        #[arg(long, help = "Properties file with the output configuration")]
        config: String,

        #[arg(long, default_value = "logsink", help = "Tag reported with every flush")]
        tag: String,

        #[arg(
            long,
            default_value_t = 500,
            help = "Number of input records delivered per flush"
        )]
        chunk_size: usize,
    },
    /// Print the discovered columns and the generated INSERT statement
    Describe {
        #[arg(long, help = "Properties file with the output configuration")]
        config: String,

        #[arg(long, help = "If set, prints the schema as JSON instead of a table")]
        json: bool,
    },
    /// Check that the configured store is reachable
    TestConn {
        #[arg(long, help = "Properties file with the output configuration")]
        config: String,
    },
}
