use clap::Parser;

#[derive(Parser, Debug, Default)]
#[command(about = "Check an MCP server by calling its health tool", long_about = None)]
pub struct Args {
    #[arg(help = "Server port (default 5001)")]
    pub port: Option<u16>,

    #[arg(long = "host", help = "Server host (default localhost)")]
    pub host: Option<String>,

    #[arg(
        long = "connect-timeout",
        value_name = "SECS",
        help = "Seconds to wait when opening a connection"
    )]
    pub connect_timeout: Option<u64>,

    #[arg(
        long = "call-timeout",
        value_name = "SECS",
        help = "Seconds to wait for the tool call response"
    )]
    pub call_timeout: Option<u64>,

    #[arg(long = "tool", help = "Name of the tool to call")]
    pub tool: Option<String>,

    #[arg(short = 'v', long = "verbose", help = "Log protocol details to stderr")]
    pub verbose: bool,

    #[arg(long = "no-color", help = "Disable coloured output")]
    pub no_color: bool,
}
