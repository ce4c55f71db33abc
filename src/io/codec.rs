// src/io/codec.rs
//
// Line codec trait for ASCII serial protocols.
//
// A codec turns one framed line (terminator already stripped by the framer)
// into a typed record, and a typed command into the exact bytes to write,
// terminator included. The elevator protocol lives in io/elevator/codec.rs.

/// Trait for line-oriented protocol codecs.
pub trait LineCodec {
    /// Decoded inbound message
    type Record;
    /// Why an inbound line was rejected
    type Reject;
    /// Outbound request
    type Command;
    /// Why an outbound request cannot be encoded
    type Invalid;

    /// Decode one framed line.
    fn decode(line: &[u8]) -> Result<Self::Record, Self::Reject>;

    /// Encode a command to wire bytes, including the line terminator.
    /// Invalid commands are rejected before any bytes are produced.
    fn encode(command: &Self::Command) -> Result<Vec<u8>, Self::Invalid>;
}
