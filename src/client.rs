//! Command dispatch
//!
//! [`DcpClient`] pairs a transport with the command catalog and runs one
//! request/response exchange at a time.
//!
//! ## Exchange
//! ```text
//!   resolve name ──► construct frame ──► send ──► receive header/key/BER
//!                                                  │
//!   Response ◄── decode payload ◄── resolve key ◄──┴── receive id/payload
//! ```
//!
//! The transport sits behind a mutex, so concurrent callers on the same
//! client queue up instead of interleaving their frames. After a timeout
//! or a framing error the stream position is unknown: the client refuses
//! further calls until it is reconnected. Nothing is retried here.

use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;

use crate::config::ClientConfig;
use crate::error::{DcpError, ProtocolError, Result};
use crate::network::{TcpConnection, Transport};
use crate::protocol::{
    codec, Args, Catalog, RequestDefinition, RequestFrame, RequestIdSequence, Response,
    ResponseRegistry,
};

/// Command sent by [`DcpClient::close`] to end the session politely
const TERMINATE_COMMAND: &str = "TerminateTLS";

/// Transport plus its health
struct Session<T> {
    transport: T,
    /// Why the connection can no longer be used
    broken: Option<String>,
}

/// Client for one device connection
pub struct DcpClient<T: Transport> {
    session: Mutex<Session<T>>,
    catalog: Arc<Catalog>,
    config: ClientConfig,
    request_ids: &'static RequestIdSequence,
}

impl DcpClient<TcpConnection> {
    /// Open a TCP connection to the configured device
    pub fn connect(config: ClientConfig) -> Result<Self> {
        let transport = TcpConnection::connect(&config.host, config.port, config.connect_timeout)?;
        tracing::info!("Connected to {}", config.addr());
        Self::new(transport, config)
    }

    /// Replace the connection with a fresh one
    pub fn reconnect(&self) -> Result<()> {
        let transport = TcpConnection::connect(
            &self.config.host,
            self.config.port,
            self.config.connect_timeout,
        )?;

        let mut session = self.session.lock();
        if let Err(e) = session.transport.close() {
            tracing::debug!("Closing previous connection failed: {}", e);
        }
        session.transport = transport;
        session.broken = None;
        tracing::info!("Reconnected to {}", self.config.addr());
        Ok(())
    }
}

impl<T: Transport> DcpClient<T> {
    /// Client over `transport` using the built-in catalog
    pub fn new(transport: T, config: ClientConfig) -> Result<Self> {
        Ok(Self::with_catalog(transport, config, Catalog::builtin()?))
    }

    pub fn with_catalog(transport: T, config: ClientConfig, catalog: Arc<Catalog>) -> Self {
        Self {
            session: Mutex::new(Session {
                transport,
                broken: None,
            }),
            catalog,
            config,
            request_ids: RequestIdSequence::global(),
        }
    }

    /// Draw request ids from `ids` instead of the process-wide sequence
    pub fn with_request_ids(mut self, ids: &'static RequestIdSequence) -> Self {
        self.request_ids = ids;
        self
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    /// Whether calls will be attempted
    pub fn is_usable(&self) -> bool {
        self.session.lock().broken.is_none()
    }

    /// Resolve `name` and run one exchange
    pub fn call(&self, name: &str, args: &Args) -> Result<Response> {
        self.command(name)?.invoke(args)
    }

    /// Resolve a command once, to invoke it any number of times
    pub fn command(&self, name: &str) -> Result<CommandCall<'_, T>> {
        let definition = Arc::clone(self.catalog.requests.resolve(name)?);
        Ok(CommandCall {
            client: self,
            definition,
        })
    }

    /// Send the session terminator when the connection is healthy, then close
    pub fn close(&self) -> Result<()> {
        let mut session = self.session.lock();

        if session.broken.is_none() {
            if let Ok(definition) = self.catalog.requests.resolve(TERMINATE_COMMAND) {
                if let Err(e) = self.run(&mut session.transport, definition, &Args::new()) {
                    tracing::debug!("{} failed during close: {}", TERMINATE_COMMAND, e);
                }
            }
        }

        session.broken = Some("connection closed".to_string());
        session.transport.close()
    }

    /// Give back the transport
    pub fn into_transport(self) -> T {
        self.session.into_inner().transport
    }

    fn execute(&self, definition: &RequestDefinition, args: &Args) -> Result<Response> {
        let mut session = self.session.lock();

        if let Some(reason) = &session.broken {
            return Err(DcpError::Connection(format!(
                "connection unusable ({}); reconnect first",
                reason
            )));
        }

        let result = self.run(&mut session.transport, definition, args);
        if let Err(ref e) = result {
            if e.is_connection_fatal() {
                tracing::warn!(
                    "{} failed, discarding connection: {}",
                    definition.name,
                    e
                );
                session.broken = Some(e.to_string());
            }
        }
        result
    }

    /// One exchange; the caller holds the session lock
    fn run(
        &self,
        transport: &mut T,
        definition: &RequestDefinition,
        args: &Args,
    ) -> Result<Response> {
        let frame = codec::construct_with(definition, args, self.request_ids)?;
        let timeout = self.config.timeout_for(definition);

        exchange(
            transport,
            &self.catalog.responses,
            &frame,
            timeout,
            self.config.strict_request_id,
        )
    }
}

fn exchange<T: Transport>(
    transport: &mut T,
    responses: &ResponseRegistry,
    frame: &RequestFrame,
    timeout: Duration,
    strict_request_id: bool,
) -> Result<Response> {
    transport.set_read_timeout(timeout)?;

    if tracing::enabled!(tracing::Level::DEBUG) {
        tracing::debug!("{}", frame.explain());
    }
    transport.send(frame.as_bytes())?;

    let response = codec::parse_response(responses, |n| transport.receive(n))?;

    if response.request_id != frame.request_id {
        if strict_request_id {
            return Err(ProtocolError::RequestIdMismatch {
                sent: frame.request_id,
                received: response.request_id,
            }
            .into());
        }
        tracing::debug!(
            sent = frame.request_id,
            received = response.request_id,
            "request id not echoed"
        );
    }

    tracing::debug!(
        command = %response.command,
        request_id = response.request_id,
        status = response.status().code(),
        "call complete"
    );
    Ok(response)
}

/// A resolved command bound to a client
pub struct CommandCall<'c, T: Transport> {
    client: &'c DcpClient<T>,
    definition: Arc<RequestDefinition>,
}

impl<T: Transport> CommandCall<'_, T> {
    pub fn name(&self) -> &str {
        &self.definition.name
    }

    pub fn definition(&self) -> &RequestDefinition {
        &self.definition
    }

    /// Send the request and wait for its response
    pub fn invoke(&self, args: &Args) -> Result<Response> {
        self.client.execute(&self.definition, args)
    }
}
