use serde::Deserialize;
use hookwatch_core::error::{HookwatchError, Result};

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    pub version: u32,

    #[serde(default)]
    pub server: ServerSection,
}

impl Config {
    pub fn validate(&self) -> Result<()> {
        if self.version != 1 {
            return Err(HookwatchError::Config(format!(
                "unsupported config version: {}",
                self.version
            )));
        }

        self.server.validate()?;

        Ok(())
    }
}

/// Bind port, accepted as an integer or a string.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum Port {
    Number(u64),
    Text(String),
}

impl Port {
    pub fn parse(&self) -> Result<u16> {
        let n = match self {
            Port::Number(n) => *n,
            Port::Text(s) => s
                .trim()
                .parse::<u64>()
                .map_err(|_| HookwatchError::Config(format!("server.port is not a number: {s:?}")))?,
        };
        u16::try_from(n)
            .map_err(|_| HookwatchError::Config(format!("server.port out of range: {n}")))
    }
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ServerSection {
    #[serde(default = "default_port")]
    pub port: Port,

    /// Serve `/debug/pprof/*` diagnostic handlers.
    #[serde(default)]
    pub debug: bool,
}

impl Default for ServerSection {
    fn default() -> Self {
        Self {
            port: default_port(),
            debug: false,
        }
    }
}

impl ServerSection {
    pub fn validate(&self) -> Result<()> {
        self.port.parse()?;
        Ok(())
    }

    /// Validated port; 0 binds an ephemeral port.
    pub fn port(&self) -> Result<u16> {
        self.port.parse()
    }
}

fn default_port() -> Port {
    Port::Number(9090)
}
