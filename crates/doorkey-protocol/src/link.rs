//! Duplex serial link between the two nodes.
//!
//! [`SerialLink`] wraps any byte stream (a UART, a TCP socket, an in-memory
//! [`tokio::io::DuplexStream`]) with the [`LinkCodec`] and exposes the
//! operations each node needs:
//!
//! - blocking send/receive of single frames
//! - 5-symbol password transfer
//! - `wait_for`, which skips unrelated tokens until the wanted one arrives
//! - `clear`, which discards stale frames before a new password exchange
//!
//! # Timeouts
//!
//! By default a receive blocks until a frame arrives, exactly like the
//! reference firmware: a silent peer stalls this node forever. Configure
//! `link.recv_timeout_ms` to get a [`LinkError::Timeout`] instead.
//!
//! The timeout covers replies the peer owes right away. Waits that last as
//! long as a person takes at the keypad use the `_idle` variants, which never
//! time out; waits on a known local phase use [`SerialLink::wait_for_after`].
//!
//! # Example
//!
//! ```
//! use doorkey_core::DeviceConfig;
//! use doorkey_protocol::{Token, memory_pair};
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() -> doorkey_protocol::Result<()> {
//! let (mut interface, mut control) = memory_pair(&DeviceConfig::default());
//!
//! interface.send_token(Token::Match).await?;
//! assert_eq!(control.recv_token().await?, Token::Match);
//! # Ok(())
//! # }
//! ```

use std::time::Duration;

use bytes::Buf;
use doorkey_core::{DeviceConfig, Password, constants::PASSWORD_LENGTH};
use futures::{FutureExt, SinkExt, StreamExt};
use tokio::io::{AsyncRead, AsyncWrite, DuplexStream};
use tokio_util::codec::Framed;
use tracing::{debug, trace, warn};

use crate::{FRAME_SIZE, Frame, LinkCodec, LinkError, Result, Token};

/// Frames the in-memory line can buffer per direction.
const MEMORY_LINE_FRAMES: usize = 64;

/// One end of the inter-node link.
#[derive(Debug)]
pub struct SerialLink<T> {
    framed: Framed<T, LinkCodec>,

    /// Receive timeout (`None` blocks forever).
    recv_timeout: Option<Duration>,

    /// Delay after each frame sent.
    settle_delay: Duration,
}

impl<T> SerialLink<T>
where
    T: AsyncRead + AsyncWrite + Unpin,
{
    /// Wrap a byte stream with default timing (no timeout, no settle delay).
    pub fn new(io: T) -> Self {
        Self {
            framed: Framed::new(io, LinkCodec::new()),
            recv_timeout: None,
            settle_delay: Duration::ZERO,
        }
    }

    /// Wrap a byte stream using the device's link and timing settings.
    pub fn from_config(io: T, config: &DeviceConfig) -> Self {
        Self::new(io)
            .with_recv_timeout(config.link.recv_timeout())
            .with_settle_delay(config.timing.settle_delay())
    }

    pub fn with_recv_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.recv_timeout = timeout;
        self
    }

    pub fn with_settle_delay(mut self, delay: Duration) -> Self {
        self.settle_delay = delay;
        self
    }

    /// Send one frame and wait out the settle delay.
    ///
    /// # Errors
    /// Returns `LinkError::Io` if the line is broken.
    pub async fn send(&mut self, frame: Frame) -> Result<()> {
        trace!(%frame, "Sending frame");
        self.framed.send(frame).await?;
        if !self.settle_delay.is_zero() {
            tokio::time::sleep(self.settle_delay).await;
        }
        Ok(())
    }

    pub async fn send_token(&mut self, token: Token) -> Result<()> {
        self.send(Frame::Token(token)).await
    }

    /// Send the symbols of a password, in order.
    pub async fn send_password(&mut self, password: &Password) -> Result<()> {
        for symbol in password.symbols() {
            self.send(Frame::Symbol(*symbol)).await?;
        }
        Ok(())
    }

    /// Receive the next frame within the configured timeout.
    ///
    /// # Errors
    /// - `LinkError::Timeout` if a receive timeout is configured and expires
    /// - `LinkError::Closed` if the peer went away
    /// - any codec error (checksum, sequence, invalid frame)
    pub async fn recv(&mut self) -> Result<Frame> {
        self.recv_within(self.recv_timeout).await
    }

    /// Receive the next frame, however long it takes.
    pub async fn recv_idle(&mut self) -> Result<Frame> {
        self.recv_within(None).await
    }

    async fn recv_within(&mut self, timeout: Option<Duration>) -> Result<Frame> {
        let next = match timeout {
            Some(timeout) => tokio::time::timeout(timeout, self.framed.next())
                .await
                .map_err(|_| LinkError::Timeout(timeout.as_millis() as u64))?,
            None => self.framed.next().await,
        };

        match next {
            Some(Ok(frame)) => {
                trace!(%frame, "Received frame");
                Ok(frame)
            }
            Some(Err(e)) => {
                warn!(error = %e, "Link receive failed");
                Err(e)
            }
            None => Err(LinkError::Closed),
        }
    }

    /// Receive a frame that must be a token.
    ///
    /// # Errors
    /// Returns `LinkError::UnexpectedFrame` if a password symbol arrives.
    pub async fn recv_token(&mut self) -> Result<Token> {
        let frame = self.recv().await?;
        expect_token(frame)
    }

    /// Receive exactly [`PASSWORD_LENGTH`] symbols.
    ///
    /// # Errors
    /// Returns `LinkError::UnexpectedFrame` if a token arrives mid-password.
    pub async fn recv_password(&mut self) -> Result<Password> {
        let first = self.recv().await?;
        self.finish_password(first).await
    }

    /// Like [`recv_password`](Self::recv_password), but the first symbol may
    /// take as long as the user needs to type. The rest are timed.
    pub async fn recv_password_idle(&mut self) -> Result<Password> {
        let first = self.recv_idle().await?;
        self.finish_password(first).await
    }

    async fn finish_password(&mut self, first: Frame) -> Result<Password> {
        let mut digits = [0u8; PASSWORD_LENGTH];
        let mut next = Some(first);
        for slot in digits.iter_mut() {
            let frame = match next.take() {
                Some(frame) => frame,
                None => self.recv().await?,
            };
            match frame {
                Frame::Symbol(symbol) => *slot = symbol.as_u8(),
                other => return Err(LinkError::unexpected("password symbol", other)),
            }
        }
        Password::new(digits).map_err(|e| LinkError::invalid_frame(e.to_string()))
    }

    /// Receive until `expected` arrives, skipping any other token.
    ///
    /// Password symbols are never skipped: a symbol here means the nodes are
    /// in different steps of the protocol.
    ///
    /// # Errors
    /// Returns `LinkError::UnexpectedFrame` for a password symbol, or any
    /// receive error.
    pub async fn wait_for(&mut self, expected: Token) -> Result<()> {
        self.wait_within(expected, self.recv_timeout).await
    }

    /// Like [`wait_for`](Self::wait_for) without a timeout.
    pub async fn wait_for_idle(&mut self, expected: Token) -> Result<()> {
        self.wait_within(expected, None).await
    }

    /// Like [`wait_for`](Self::wait_for), with `grace` added to each receive
    /// timeout. For replies that follow a timed phase on the peer.
    pub async fn wait_for_after(&mut self, expected: Token, grace: Duration) -> Result<()> {
        let timeout = self.recv_timeout.map(|t| t + grace);
        self.wait_within(expected, timeout).await
    }

    async fn wait_within(&mut self, expected: Token, timeout: Option<Duration>) -> Result<()> {
        loop {
            let token = expect_token(self.recv_within(timeout).await?)?;
            if token == expected {
                return Ok(());
            }
            warn!(%expected, received = %token, "Skipping unexpected token");
        }
    }

    /// Discard every complete frame already received and resynchronize.
    ///
    /// Returns the number of frames discarded. Bytes of a frame still in
    /// flight are kept so the stream stays frame-aligned.
    pub fn clear(&mut self) -> usize {
        let mut discarded = 0;
        let mut errored = false;
        loop {
            match self.framed.next().now_or_never() {
                Some(Some(Ok(_))) => {
                    discarded += 1;
                    errored = false;
                }
                Some(Some(Err(e))) => {
                    debug!(error = %e, "Dropping undecodable stale frame");
                    discarded += 1;
                    errored = true;
                }
                // Framed ends the stream once after a decode error
                Some(None) if errored => errored = false,
                Some(None) | None => break,
            }
        }

        // after an error Framed stops decoding what it already buffered
        let buffer = self.framed.read_buffer_mut();
        let whole = buffer.len() / FRAME_SIZE;
        buffer.advance(whole * FRAME_SIZE);
        discarded += whole;

        self.framed.codec_mut().resync();

        if discarded > 0 {
            warn!(discarded, "Cleared stale frames from link");
        }
        discarded
    }

    /// Flush pending frames and shut down the write half.
    ///
    /// The peer sees [`LinkError::Closed`] once it has read what was sent.
    pub async fn close(&mut self) -> Result<()> {
        debug!("Closing link");
        self.framed.close().await
    }

    /// Configured receive timeout.
    pub fn recv_timeout(&self) -> Option<Duration> {
        self.recv_timeout
    }

    /// Unwrap the underlying byte stream.
    pub fn into_inner(self) -> T {
        self.framed.into_inner()
    }
}

fn expect_token(frame: Frame) -> Result<Token> {
    frame
        .as_token()
        .ok_or_else(|| LinkError::unexpected("token", frame))
}

/// Connect two link ends through an in-memory line.
///
/// Returns `(interface_end, control_end)`, both configured from `config`.
pub fn memory_pair(config: &DeviceConfig) -> (SerialLink<DuplexStream>, SerialLink<DuplexStream>) {
    let (a, b) = tokio::io::duplex(MEMORY_LINE_FRAMES * FRAME_SIZE);
    (
        SerialLink::from_config(a, config),
        SerialLink::from_config(b, config),
    )
}
