//! Adapter module - remote control via TCP socket with JSON protocol
//!
//! This module lets external clients (bots, trainers, test harnesses) play
//! the game through a TCP socket connection using a **line-delimited JSON
//! protocol**:
//!
//! 1. **Connection**: Client connects to TCP socket (default: 127.0.0.1:7878)
//! 2. **Handshake**: Client sends `hello`, server responds with `welcome`
//! 3. **Controller Assignment**: First client to hello becomes the controller
//! 4. **Streaming**: Server sends display updates and round resolutions
//! 5. **Commanding**: Controller strikes ball symbols and sends session controls
//!
//! # Message Types
//!
//! ## Client → Server
//!
//! - **hello**: Initial handshake with client info and requested capabilities
//! - **strike**: Hit one or more ball symbols at the flipper, in order
//! - **control**: Claim/release controller status, or clear/pause/restart
//!
//! ## Server → Client
//!
//! - **welcome**: Response to hello with server capabilities
//! - **display**: Current equation display text
//! - **round**: Equation resolution with outcome, award, score and status
//! - **ack**: Command acknowledgment
//! - **error**: Error response with code and message
//!
//! # Environment Variables
//!
//! - `MATH_PINBALL_HOST`: Bind address (default: "127.0.0.1")
//! - `MATH_PINBALL_PORT`: Port number (default: 7878)
//! - `MATH_PINBALL_MAX_PENDING`: Bounded command queue size (default: 10)
//! - `MATH_PINBALL_REMOTE_DISABLED`: Set to "1" or "true" to disable entirely
//!
//! # Example Protocol Flow
//!
//! ```text
//! Client -> Server: {"type":"hello","seq":1,"ts":1234567890,"client":{"name":"my-bot","version":"1.0.0"},...}
//! Server -> Client: {"type":"welcome","seq":1,"ts":1234567890,"protocol_version":"1.0.0",...}
//! Client -> Server: {"type":"strike","seq":2,"ts":1234567892,"symbols":["2","+","3"]}
//! Server -> Client: {"type":"ack","seq":2,"ts":1234567892,"status":"ok"}
//! Server -> Client: {"type":"round","seq":3,"ts":1234567893,"outcome":"success","value":5.0,"award":5,"score":5,"status":"playing"}
//! ```
//!
//! # Testing
//!
//! Connect to the adapter using netcat for manual testing:
//!
//! ```bash
//! nc 127.0.0.1 7878
//! {"type":"hello","seq":1,"ts":1234567890,"client":{"name":"test","version":"1.0.0"},"protocol_version":"1.0.0","formats":["json"],"requested":{"stream_rounds":true}}
//! ```

pub mod protocol;
pub mod runtime;
pub mod server;

pub use math_pinball_core as core;
pub use math_pinball_types as types;

// Re-export protocol types for convenience
pub use protocol::*;
pub use runtime::{Adapter, ClientCommand, InboundCommand, OutboundMessage};
pub use server::{run_server, ServerConfig, ServerState};
