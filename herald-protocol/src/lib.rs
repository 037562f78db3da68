/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 16/10/26
******************************************************************************/

//! # Herald Protocol
//!
//! Gateway envelope encoding and decoding for the Herald client.
//!
//! Every gateway text frame is a JSON object `{op, d, s, t}`:
//! - **op**: opcode tagging the purpose of the frame
//! - **d**: payload, shape depends on the opcode
//! - **s**: sequence number, present on dispatch events
//! - **t**: event type, present on dispatch events

pub mod decoder;
pub mod encoder;
pub mod envelope;

pub use decoder::Decoder;
pub use encoder::Encoder;
pub use envelope::Envelope;
