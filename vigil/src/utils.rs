//! # Utility module

use anyhow::{anyhow, Result};
use log::info;
use std::io::Read;
use std::net::{TcpListener, TcpStream};

/// Open a file or an input stream.
///
/// `tcp://` inputs are network streams: `tcp://@:port` listens and accepts
/// a single peer, anything else connects out.
pub fn open_input(input: &str) -> Result<Box<dyn Read + Send>> {
    if let Some(input) = input.strip_prefix("tcp://") {
        let (addr, port) = input
            .split_once(':')
            .ok_or_else(|| anyhow!("Invalid format"))?;
        let port: usize = str::parse(port)?;

        let stream = if addr == "@" {
            let listener = TcpListener::bind(format!("0.0.0.0:{}", port))?;
            let (sock, addr) = listener.accept()?;
            info!("accept {}", addr);
            sock
        } else {
            info!("connecting to {}", input);
            TcpStream::connect(input)?
        };

        Ok(Box::new(stream))
    } else {
        std::fs::File::open(input)
            .map(|i| Box::new(i) as _)
            .map_err(Into::into)
    }
}
