//! Tokio codec for the inter-node link.
//!
//! # Wire Format
//!
//! Every [`Frame`] travels as exactly four bytes:
//!
//! ```text
//! +-----+------+-------+-------+
//! | seq | kind | value | check |
//! +-----+------+-------+-------+
//! ```
//!
//! - `seq`: per-direction sequence tag, incremented for each frame and
//!   wrapping at 256
//! - `kind`: `b'T'` for a token, `b'S'` for a password symbol
//! - `value`: token value or symbol
//! - `check`: `seq ^ kind ^ value ^ 0xA5`
//!
//! The decoder verifies the check byte and that `seq` is exactly the next
//! expected tag. A dropped frame shows up as a skipped tag, a duplicated
//! frame as a repeated one, and a corrupted byte as a checksum mismatch.
//! None of these are repaired: the codec reports them and the nodes stop.
//!
//! The first frame after construction or [`LinkCodec::resync`] sets the
//! baseline tag.
//!
//! # Usage with Tokio Framed
//!
//! ```rust,no_run
//! use doorkey_protocol::{Frame, LinkCodec, Token};
//! use futures::{SinkExt, StreamExt};
//! use tokio_util::codec::Framed;
//!
//! # async fn example() -> doorkey_protocol::Result<()> {
//! let (a, b) = tokio::io::duplex(64);
//! let mut tx = Framed::new(a, LinkCodec::new());
//! let mut rx = Framed::new(b, LinkCodec::new());
//!
//! tx.send(Frame::Token(Token::Match)).await?;
//! assert_eq!(rx.next().await.transpose()?, Some(Frame::Token(Token::Match)));
//! # Ok(())
//! # }
//! ```

use bytes::{Buf, BufMut, BytesMut};
use tokio_util::codec::{Decoder, Encoder};
use tracing::trace;

use crate::{Frame, LinkError, Result};

/// Bytes per frame on the wire.
pub const FRAME_SIZE: usize = 4;

/// Mixed into the check byte so that an all-zero line never validates.
const CHECK_SEED: u8 = 0xA5;

#[inline]
fn check_byte(seq: u8, kind: u8, value: u8) -> u8 {
    seq ^ kind ^ value ^ CHECK_SEED
}

/// Link codec with sequence tagging and a check byte.
///
/// One instance serves both directions of a link: the encoder side keeps the
/// outgoing tag, the decoder side the next expected incoming tag.
#[derive(Debug, Default)]
pub struct LinkCodec {
    /// Tag of the next frame to send.
    tx_seq: u8,

    /// Tag expected on the next received frame. `None` until a baseline is
    /// seen.
    rx_seq: Option<u8>,
}

impl LinkCodec {
    pub fn new() -> Self {
        Self::default()
    }

    /// Forget the expected incoming tag.
    ///
    /// Used after discarding buffered frames: the next frame received sets
    /// the new baseline.
    pub fn resync(&mut self) {
        self.rx_seq = None;
    }

    /// Tag that will be used for the next outgoing frame.
    pub fn next_tx_seq(&self) -> u8 {
        self.tx_seq
    }

    /// Tag expected on the next incoming frame, if a baseline exists.
    pub fn expected_rx_seq(&self) -> Option<u8> {
        self.rx_seq
    }
}

impl Decoder for LinkCodec {
    type Item = Frame;
    type Error = LinkError;

    fn decode(&mut self, src: &mut BytesMut) -> Result<Option<Frame>> {
        if src.len() < FRAME_SIZE {
            return Ok(None);
        }

        let seq = src.get_u8();
        let kind = src.get_u8();
        let value = src.get_u8();
        let check = src.get_u8();

        let expected_check = check_byte(seq, kind, value);
        if check != expected_check {
            return Err(LinkError::ChecksumMismatch {
                expected: expected_check,
                actual: check,
            });
        }

        if let Some(expected) = self.rx_seq
            && seq != expected
        {
            return Err(LinkError::Desynchronized {
                expected,
                actual: seq,
            });
        }
        self.rx_seq = Some(seq.wrapping_add(1));

        let frame = Frame::from_parts(kind, value)?;
        trace!(seq, %frame, "Decoded frame");
        Ok(Some(frame))
    }
}

impl Encoder<Frame> for LinkCodec {
    type Error = LinkError;

    fn encode(&mut self, item: Frame, dst: &mut BytesMut) -> Result<()> {
        let (kind, value) = item.to_parts();
        let seq = self.tx_seq;

        dst.reserve(FRAME_SIZE);
        dst.put_u8(seq);
        dst.put_u8(kind);
        dst.put_u8(value);
        dst.put_u8(check_byte(seq, kind, value));

        self.tx_seq = seq.wrapping_add(1);
        trace!(seq, frame = %item, "Encoded frame");
        Ok(())
    }
}
