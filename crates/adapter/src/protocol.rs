//! Protocol module - JSON message types for the remote control adapter
//!
//! Implements a line-delimited JSON protocol so external clients (bots,
//! trainers, test harnesses) can strike balls and watch rounds resolve.
//! All messages have: type, seq (sequence number), ts (timestamp in ms)

use serde::{Deserialize, Serialize};

use crate::core::LevelStatus;
use crate::types::FailureKind;

use arrayvec::ArrayVec;

/// Maximum symbols accepted in a single strike message.
pub const MAX_STRIKE_SYMBOLS: usize = 16;

// ============== Client -> Game Messages ==============

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum HelloType {
    #[serde(rename = "hello")]
    Hello,
}

impl Default for HelloType {
    fn default() -> Self {
        Self::Hello
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum StrikeType {
    #[serde(rename = "strike")]
    Strike,
}

impl Default for StrikeType {
    fn default() -> Self {
        Self::Strike
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ControlType {
    #[serde(rename = "control")]
    Control,
}

impl Default for ControlType {
    fn default() -> Self {
        Self::Control
    }
}

/// Client hello message (first message to establish connection)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HelloMessage {
    #[serde(rename = "type")]
    #[serde(default)]
    pub msg_type: HelloType,
    pub seq: u64,
    pub ts: u64,
    pub client: ClientInfo,
    pub protocol_version: String,
    pub formats: FormatsList,
    pub requested: RequestedCapabilities,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FormatsList {
    pub json: bool,
}

impl<'de> Deserialize<'de> for FormatsList {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        struct V;
        impl<'de> serde::de::Visitor<'de> for V {
            type Value = FormatsList;

            fn expecting(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
                write!(f, "an array of format strings")
            }

            fn visit_seq<A>(self, mut seq: A) -> Result<Self::Value, A::Error>
            where
                A: serde::de::SeqAccess<'de>,
            {
                let mut json = false;
                while let Some(v) = seq.next_element::<&str>()? {
                    if v.eq_ignore_ascii_case("json") {
                        json = true;
                    }
                }
                Ok(FormatsList { json })
            }
        }

        deserializer.deserialize_seq(V)
    }
}

impl Serialize for FormatsList {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        use serde::ser::SerializeSeq;
        let mut seq = serializer.serialize_seq(Some(if self.json { 1 } else { 0 }))?;
        if self.json {
            seq.serialize_element("json")?;
        }
        seq.end()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClientInfo {
    pub name: String,
    pub version: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RequestedCapabilities {
    #[serde(rename = "stream_rounds")]
    pub stream_rounds: bool,
}

/// Strike message (controller only)
///
/// Each symbol is a single ball face: a whole number or one of `+ - * /`.
/// Symbols are applied in order, as if the flipper hit those balls.
#[derive(Debug, Clone, Deserialize)]
pub struct StrikeMessage {
    #[serde(rename = "type")]
    #[serde(default)]
    pub msg_type: StrikeType,
    pub seq: u64,
    pub ts: u64,
    pub symbols: SymbolList,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SymbolList(pub ArrayVec<String, MAX_STRIKE_SYMBOLS>);

impl<'de> Deserialize<'de> for SymbolList {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        struct V;
        impl<'de> serde::de::Visitor<'de> for V {
            type Value = SymbolList;

            fn expecting(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
                write!(f, "an array of symbol strings")
            }

            fn visit_seq<A>(self, mut seq: A) -> Result<Self::Value, A::Error>
            where
                A: serde::de::SeqAccess<'de>,
            {
                let mut out = ArrayVec::<String, MAX_STRIKE_SYMBOLS>::new();
                while let Some(s) = seq.next_element::<String>()? {
                    out.try_push(s)
                        .map_err(|_| serde::de::Error::custom("too many symbols"))?;
                }
                Ok(SymbolList(out))
            }
        }

        deserializer.deserialize_seq(V)
    }
}

/// Control message (session controls and controller claim/release)
#[derive(Debug, Clone, Deserialize)]
pub struct ControlMessage {
    #[serde(rename = "type")]
    #[serde(default)]
    pub msg_type: ControlType,
    pub seq: u64,
    pub ts: u64,
    pub action: ControlAction,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ControlAction {
    Claim,
    Release,
    Clear,
    Pause,
    Restart,
}

impl<'de> Deserialize<'de> for ControlAction {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = <&str>::deserialize(deserializer)?;
        if s.eq_ignore_ascii_case("claim") {
            Ok(Self::Claim)
        } else if s.eq_ignore_ascii_case("release") {
            Ok(Self::Release)
        } else if s.eq_ignore_ascii_case("clear") {
            Ok(Self::Clear)
        } else if s.eq_ignore_ascii_case("pause") {
            Ok(Self::Pause)
        } else if s.eq_ignore_ascii_case("restart") {
            Ok(Self::Restart)
        } else {
            Err(serde::de::Error::custom("invalid control action"))
        }
    }
}

impl Serialize for ControlAction {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        match self {
            ControlAction::Claim => serializer.serialize_str("claim"),
            ControlAction::Release => serializer.serialize_str("release"),
            ControlAction::Clear => serializer.serialize_str("clear"),
            ControlAction::Pause => serializer.serialize_str("pause"),
            ControlAction::Restart => serializer.serialize_str("restart"),
        }
    }
}

// ============== Game -> Client Messages ==============

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum WelcomeType {
    #[serde(rename = "welcome")]
    Welcome,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AckType {
    #[serde(rename = "ack")]
    Ack,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AckStatus {
    #[serde(rename = "ok")]
    Ok,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ErrorType {
    #[serde(rename = "error")]
    Error,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ErrorCode {
    #[serde(rename = "handshake_required")]
    HandshakeRequired,
    #[serde(rename = "protocol_mismatch")]
    ProtocolMismatch,
    #[serde(rename = "not_controller")]
    NotController,
    #[serde(rename = "controller_active")]
    ControllerActive,
    #[serde(rename = "invalid_command")]
    InvalidCommand,
    #[serde(rename = "invalid_symbol")]
    InvalidSymbol,
    #[serde(rename = "backpressure")]
    Backpressure,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DisplayType {
    #[serde(rename = "display")]
    Display,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RoundType {
    #[serde(rename = "round")]
    Round,
}

/// Welcome message (response to hello)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WelcomeMessage {
    #[serde(rename = "type")]
    pub msg_type: WelcomeType,
    pub seq: u64,
    pub ts: u64,
    pub protocol_version: String,
    pub game_id: String,
    pub capabilities: ServerCapabilities,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerCapabilities {
    pub formats: [CapabilityFormat; 1],
    pub features: Vec<CapabilityFeature>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CapabilityFormat {
    #[serde(rename = "json")]
    Json,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CapabilityFeature {
    #[serde(rename = "display")]
    Display,
    #[serde(rename = "rounds")]
    Rounds,
    #[serde(rename = "score")]
    Score,
    #[serde(rename = "session_status")]
    SessionStatus,
}

/// Acknowledgment for command receipt
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AckMessage {
    #[serde(rename = "type")]
    pub msg_type: AckType,
    pub seq: u64,
    pub ts: u64,
    pub status: AckStatus,
}

/// Error message
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorMessage {
    #[serde(rename = "type")]
    pub msg_type: ErrorType,
    pub seq: u64,
    pub ts: u64,
    pub code: ErrorCode,
    pub message: String,
}

/// Live equation display update (sent to all streaming clients)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DisplayMessage {
    #[serde(rename = "type")]
    pub msg_type: DisplayType,
    pub seq: u64,
    pub ts: u64,
    pub text: String,
}

/// Round resolution (sent to all streaming clients when an equation settles)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoundMessage {
    #[serde(rename = "type")]
    pub msg_type: RoundType,
    pub seq: u64,
    pub ts: u64,
    pub outcome: RoundOutcome,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub failure: Option<FailureLower>,
    pub award: i64,
    pub score: i64,
    pub status: SessionStatusLower,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RoundOutcome {
    #[serde(rename = "success")]
    Success,
    #[serde(rename = "failure")]
    Failure,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FailureLower {
    #[serde(rename = "malformedToken")]
    MalformedToken,
    #[serde(rename = "malformedSequence")]
    MalformedSequence,
    #[serde(rename = "divisionByZero")]
    DivisionByZero,
}

impl From<FailureKind> for FailureLower {
    fn from(value: FailureKind) -> Self {
        match value {
            FailureKind::MalformedToken => Self::MalformedToken,
            FailureKind::MalformedSequence => Self::MalformedSequence,
            FailureKind::DivisionByZero => Self::DivisionByZero,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SessionStatusLower {
    #[serde(rename = "playing")]
    Playing,
    #[serde(rename = "complete")]
    Complete,
    #[serde(rename = "failed")]
    Failed,
}

impl From<LevelStatus> for SessionStatusLower {
    fn from(value: LevelStatus) -> Self {
        match value {
            LevelStatus::Playing => Self::Playing,
            LevelStatus::Complete => Self::Complete,
            LevelStatus::Failed => Self::Failed,
        }
    }
}

// ============== Message Parsing ==============

/// Parse a JSON message from a string
pub fn parse_message(json: &str) -> Result<ParsedMessage, serde_json::Error> {
    #[derive(Debug, Deserialize)]
    #[serde(tag = "type")]
    enum InboundMessage {
        #[serde(rename = "hello")]
        Hello(HelloMessage),
        #[serde(rename = "strike")]
        Strike(StrikeMessage),
        #[serde(rename = "control")]
        Control(ControlMessage),
    }

    match serde_json::from_str::<InboundMessage>(json) {
        Ok(InboundMessage::Hello(m)) => Ok(ParsedMessage::Hello(m)),
        Ok(InboundMessage::Strike(m)) => Ok(ParsedMessage::Strike(m)),
        Ok(InboundMessage::Control(m)) => Ok(ParsedMessage::Control(m)),
        Err(e) => {
            // Unknown message type is not a hard parse error for the protocol.
            #[derive(Debug, Deserialize)]
            struct TypeOnly<'a> {
                #[serde(rename = "type")]
                msg_type: Option<&'a str>,
            }
            let msg_type = serde_json::from_str::<TypeOnly>(json)?
                .msg_type
                .unwrap_or("unknown");
            if msg_type != "hello" && msg_type != "strike" && msg_type != "control" {
                #[derive(Debug, Deserialize)]
                struct SeqOnly {
                    seq: Option<u64>,
                }
                let seq = serde_json::from_str::<SeqOnly>(json)?.seq.unwrap_or(0);
                return Ok(ParsedMessage::Unknown(UnknownMessage { seq }));
            }
            Err(e)
        }
    }
}

/// Parsed incoming message
#[derive(Debug, Clone)]
pub enum ParsedMessage {
    Hello(HelloMessage),
    Strike(StrikeMessage),
    Control(ControlMessage),
    Unknown(UnknownMessage),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UnknownMessage {
    pub seq: u64,
}

// ============== Utility Functions ==============

/// Create a hello message
pub fn create_hello(seq: u64, client_name: &str, protocol_version: &str) -> HelloMessage {
    HelloMessage {
        msg_type: HelloType::Hello,
        seq,
        ts: current_timestamp_ms(),
        client: ClientInfo {
            name: client_name.to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        },
        protocol_version: protocol_version.to_string(),
        formats: FormatsList { json: true },
        requested: RequestedCapabilities {
            stream_rounds: true,
        },
    }
}

/// Create a welcome message
pub fn create_welcome(seq: u64, protocol_version: &str) -> WelcomeMessage {
    WelcomeMessage {
        msg_type: WelcomeType::Welcome,
        seq,
        ts: current_timestamp_ms(),
        protocol_version: protocol_version.to_string(),
        game_id: "math-pinball".to_string(),
        capabilities: ServerCapabilities {
            formats: [CapabilityFormat::Json],
            features: vec![
                CapabilityFeature::Display,
                CapabilityFeature::Rounds,
                CapabilityFeature::Score,
                CapabilityFeature::SessionStatus,
            ],
        },
    }
}

/// Create an acknowledgment
pub fn create_ack(seq: u64) -> AckMessage {
    AckMessage {
        msg_type: AckType::Ack,
        seq,
        ts: current_timestamp_ms(),
        status: AckStatus::Ok,
    }
}

/// Create an error message
pub fn create_error(seq: u64, code: ErrorCode, message: &str) -> ErrorMessage {
    ErrorMessage {
        msg_type: ErrorType::Error,
        seq,
        ts: current_timestamp_ms(),
        code,
        message: message.to_string(),
    }
}

/// Create a display update
pub fn create_display(seq: u64, text: &str) -> DisplayMessage {
    DisplayMessage {
        msg_type: DisplayType::Display,
        seq,
        ts: current_timestamp_ms(),
        text: text.to_string(),
    }
}

/// Create a round resolution message
pub fn create_round(
    seq: u64,
    outcome: RoundOutcome,
    value: Option<f64>,
    failure: Option<FailureKind>,
    award: i64,
    score: i64,
    status: LevelStatus,
) -> RoundMessage {
    RoundMessage {
        msg_type: RoundType::Round,
        seq,
        ts: current_timestamp_ms(),
        outcome,
        value,
        failure: failure.map(FailureLower::from),
        award,
        score,
        status: SessionStatusLower::from(status),
    }
}

/// Get current timestamp in milliseconds
pub(crate) fn current_timestamp_ms() -> u64 {
    use std::time::{SystemTime, UNIX_EPOCH};
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis() as u64
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_hello() {
        let json = r#"{"type":"hello","seq":1,"ts":1234567890,"client":{"name":"test-bot","version":"1.0.0"},"protocol_version":"1.0.0","formats":["json"],"requested":{"stream_rounds":true}}"#;

        let result = parse_message(json).unwrap();
        match result {
            ParsedMessage::Hello(msg) => {
                assert_eq!(msg.msg_type, HelloType::Hello);
                assert_eq!(msg.seq, 1);
                assert_eq!(msg.client.name, "test-bot");
                assert_eq!(msg.protocol_version, "1.0.0");
                assert!(msg.requested.stream_rounds);
            }
            _ => panic!("Expected Hello message"),
        }
    }

    #[test]
    fn test_parse_strike() {
        let json = r#"{"type":"strike","seq":2,"ts":1234567900,"symbols":["2","+","3"]}"#;

        let result = parse_message(json).unwrap();
        match result {
            ParsedMessage::Strike(msg) => {
                assert_eq!(msg.symbols.0.len(), 3);
                assert_eq!(msg.symbols.0[0], "2");
                assert_eq!(msg.symbols.0[1], "+");
                assert_eq!(msg.symbols.0[2], "3");
            }
            _ => panic!("Expected Strike message"),
        }
    }

    #[test]
    fn test_parse_strike_rejects_oversized_list() {
        let symbols: Vec<String> = (0..MAX_STRIKE_SYMBOLS + 1).map(|_| "1".to_string()).collect();
        let json = format!(
            r#"{{"type":"strike","seq":2,"ts":0,"symbols":{}}}"#,
            serde_json::to_string(&symbols).unwrap()
        );
        assert!(parse_message(&json).is_err());
    }

    #[test]
    fn test_parse_control() {
        let json = r#"{"type":"control","seq":3,"ts":1234567910,"action":"pause"}"#;

        let result = parse_message(json).unwrap();
        match result {
            ParsedMessage::Control(msg) => {
                assert_eq!(msg.action, ControlAction::Pause);
            }
            _ => panic!("Expected Control message"),
        }
    }

    #[test]
    fn test_parse_unknown_type() {
        let json = r#"{"type":"telemetry","seq":9}"#;
        let result = parse_message(json).unwrap();
        match result {
            ParsedMessage::Unknown(msg) => assert_eq!(msg.seq, 9),
            _ => panic!("Expected Unknown message"),
        }
    }

    #[test]
    fn test_create_welcome() {
        let welcome = create_welcome(1, "1.0.0");
        assert_eq!(welcome.msg_type, WelcomeType::Welcome);
        assert_eq!(welcome.seq, 1);
        assert_eq!(welcome.protocol_version, "1.0.0");
        assert_eq!(welcome.game_id, "math-pinball");
    }

    #[test]
    fn test_create_round_success_json_shape() {
        let round = create_round(
            4,
            RoundOutcome::Success,
            Some(14.0),
            None,
            34,
            120,
            LevelStatus::Playing,
        );
        let json = serde_json::to_string(&round).unwrap();
        assert!(json.contains(r#""outcome":"success""#));
        assert!(json.contains(r#""value":14.0"#));
        assert!(json.contains(r#""award":34"#));
        assert!(json.contains(r#""status":"playing""#));
        assert!(!json.contains("failure"));
    }

    #[test]
    fn test_create_round_failure_json_shape() {
        let round = create_round(
            5,
            RoundOutcome::Failure,
            None,
            Some(FailureKind::DivisionByZero),
            0,
            120,
            LevelStatus::Playing,
        );
        let json = serde_json::to_string(&round).unwrap();
        assert!(json.contains(r#""outcome":"failure""#));
        assert!(json.contains(r#""failure":"divisionByZero""#));
        assert!(!json.contains("value"));
    }

    #[test]
    fn test_serde_roundtrip() {
        let ack = create_ack(10);
        let json = serde_json::to_string(&ack).unwrap();
        let parsed: AckMessage = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed.seq, ack.seq);
        assert_eq!(parsed.status, ack.status);
    }
}
