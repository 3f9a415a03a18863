//! Blocking client
//!
//! A minimal synchronous client for the wire protocol, used by the CLI
//! and by integration tests. Speaks plain TCP.

use std::net::TcpStream;

use serde_json::Value;

use crate::error::{EmberError, Result};
use crate::protocol::{
    read_response, write_request, AuthRequest, GetRequest, Request, Response, SetRequest,
};

/// A blocking client for a single server connection
pub struct Client {
    stream: TcpStream,
}

impl Client {
    /// Connect to a server at `addr` (host:port)
    pub fn connect(addr: &str) -> Result<Self> {
        let stream = TcpStream::connect(addr)?;
        stream.set_nodelay(true)?;
        Ok(Self { stream })
    }

    /// Authenticate this connection
    ///
    /// Must be the first request when the server has credentials
    /// configured. A rejected login also closes the server side.
    pub fn authenticate(&mut self, username: &str, password: &str) -> Result<()> {
        let response = self.round_trip(&Request::Auth(AuthRequest {
            username: username.to_string(),
            password: password.to_string(),
        }))?;

        if response.success {
            Ok(())
        } else {
            Err(EmberError::Auth(
                response
                    .message
                    .unwrap_or_else(|| "authentication failed".to_string()),
            ))
        }
    }

    /// Store a value under a key
    pub fn set(&mut self, key: &str, value: Value) -> Result<()> {
        let response = self.round_trip(&Request::Set(SetRequest {
            key: key.to_string(),
            value,
        }))?;

        if response.success {
            Ok(())
        } else {
            Err(EmberError::Request(
                response
                    .message
                    .unwrap_or_else(|| "set rejected".to_string()),
            ))
        }
    }

    /// Fetch the value for a key; a missing key comes back as `None`
    pub fn get(&mut self, key: &str) -> Result<Option<Value>> {
        let response = self.round_trip(&Request::Get(GetRequest {
            key: key.to_string(),
        }))?;

        if !response.success {
            return Err(EmberError::Request(
                response
                    .message
                    .unwrap_or_else(|| "get rejected".to_string()),
            ));
        }

        // The wire form for a missing key is an explicit null value
        match response.value {
            None | Some(Value::Null) => Ok(None),
            Some(value) => Ok(Some(value)),
        }
    }

    /// Delete a key (tombstone write)
    pub fn delete(&mut self, key: &str) -> Result<()> {
        self.set(key, Value::Null)
    }

    /// Health check
    pub fn ping(&mut self) -> Result<()> {
        let response = self.round_trip(&Request::Ping)?;
        if response.success {
            Ok(())
        } else {
            Err(EmberError::Request(
                response
                    .message
                    .unwrap_or_else(|| "ping rejected".to_string()),
            ))
        }
    }

    fn round_trip(&mut self, request: &Request) -> Result<Response> {
        write_request(&mut self.stream, request)?;
        read_response(&mut self.stream)
    }
}
