use clap::Parser;
use std::net::{IpAddr, SocketAddr};

#[derive(Parser, Debug, Clone)]
#[command(name = "server")]
#[command(about = "Real-time gomoku match server", long_about = None)]
#[command(version)]
pub struct ServerConfig {
    /// Address to bind
    #[arg(long, env = "HOST", default_value = "0.0.0.0")]
    pub host: IpAddr,

    /// Port to listen on
    #[arg(short, long, env = "PORT", default_value = "8080")]
    pub port: u16,
}

impl ServerConfig {
    pub const fn addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }
}
