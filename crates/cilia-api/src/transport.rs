// Transport seam between the controller and the network.
//
// The controller only needs two things from a transport: open a session
// to a URL, and push whole text frames into it. Keeping that behind a
// trait lets tests substitute an in-memory sink for the WebSocket.

use std::future::Future;

use tokio_util::sync::CancellationToken;
use url::Url;

use crate::error::Error;

/// Default control port of the Cilia SDK service.
pub const DEFAULT_PORT: u16 = 1995;

/// Default host of the Cilia SDK service.
pub const DEFAULT_HOST: &str = "localhost";

/// Build the `ws://{host}:{port}` endpoint URL.
pub fn endpoint_url(host: &str, port: u16) -> Result<Url, Error> {
    if host.trim().is_empty() {
        return Err(Error::InvalidEndpoint(format!("ws://{host}:{port}")));
    }
    let url = Url::parse(&format!("ws://{host}:{port}"))?;
    if url.host_str().is_none() {
        return Err(Error::InvalidEndpoint(url.to_string()));
    }
    Ok(url)
}

/// Write half of an open session.
///
/// Each `send_text` call must put exactly one complete frame on the wire.
pub trait FrameSink: Send + 'static {
    fn send_text(&mut self, text: String) -> impl Future<Output = Result<(), Error>> + Send;

    /// Begin a graceful close. Implementations should not wait for the
    /// peer to acknowledge.
    fn close(&mut self) -> impl Future<Output = Result<(), Error>> + Send;
}

/// An established session.
pub struct Connection<S> {
    pub sink: S,
    /// Cancelled by the transport when the peer closes the session or the
    /// read side fails. Owners may also cancel it to stop the transport's
    /// background work.
    pub closed: CancellationToken,
}

/// Opens sessions to a device endpoint.
pub trait Connector: Send + Sync + 'static {
    type Sink: FrameSink;

    fn connect(
        &self,
        url: &Url,
    ) -> impl Future<Output = Result<Connection<Self::Sink>, Error>> + Send;
}
